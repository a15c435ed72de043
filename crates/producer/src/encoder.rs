//! Payload framing
//!
//! Two framings, selected by the protocol tag that is opaque to the dispatch
//! core: a fixed 4-byte big-endian length prefix, and a LEB128 varint length
//! prefix. Capture files are raw concatenations of framed records.

use bytes::{BufMut, Bytes, BytesMut};
use contracts::{ContractError, ProtocolKind};

/// Upper bound on a single frame, header included
pub const MAX_FRAME_LEN: usize = 64 * 1024 * 1024;

/// Frame one payload body
pub fn frame(kind: ProtocolKind, body: &[u8]) -> Bytes {
    match kind {
        ProtocolKind::Binary => {
            let mut buf = BytesMut::with_capacity(4 + body.len());
            buf.put_u32(body.len() as u32);
            buf.put_slice(body);
            buf.freeze()
        }
        ProtocolKind::Compact => {
            let mut buf = BytesMut::with_capacity(10 + body.len());
            put_uvarint(&mut buf, body.len() as u64);
            buf.put_slice(body);
            buf.freeze()
        }
    }
}

/// Total length (header + body) of the frame at the front of `buf`
///
/// Returns `Ok(None)` when more bytes are needed, an error when the header is
/// malformed or the frame exceeds [`MAX_FRAME_LEN`].
pub fn frame_len(kind: ProtocolKind, buf: &[u8]) -> Result<Option<usize>, ContractError> {
    let (body_len, header_len) = match kind {
        ProtocolKind::Binary => {
            if buf.len() < 4 {
                return Ok(None);
            }
            let len = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]) as u64;
            (len, 4)
        }
        ProtocolKind::Compact => match read_uvarint(buf)? {
            Some((len, consumed)) => (len, consumed),
            None => return Ok(None),
        },
    };

    let total = (body_len as usize)
        .checked_add(header_len)
        .filter(|&total| total <= MAX_FRAME_LEN)
        .ok_or_else(|| {
            ContractError::frame_decode(format!(
                "frame length {body_len} exceeds the {MAX_FRAME_LEN} byte limit"
            ))
        })?;

    if buf.len() < total {
        return Ok(None);
    }
    Ok(Some(total))
}

/// Append an unsigned LEB128 varint
fn put_uvarint(buf: &mut BytesMut, mut value: u64) {
    while value >= 0x80 {
        buf.put_u8((value as u8 & 0x7f) | 0x80);
        value >>= 7;
    }
    buf.put_u8(value as u8);
}

/// Read an unsigned LEB128 varint from the front of `buf`
///
/// Returns the value and the number of bytes consumed, or `Ok(None)` when the
/// varint is still incomplete.
fn read_uvarint(buf: &[u8]) -> Result<Option<(u64, usize)>, ContractError> {
    let mut value: u64 = 0;
    for (i, &byte) in buf.iter().enumerate() {
        if i >= 10 {
            return Err(ContractError::frame_decode("varint longer than 10 bytes"));
        }
        value |= u64::from(byte & 0x7f) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok(Some((value, i + 1)));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_frame_layout() {
        let framed = frame(ProtocolKind::Binary, b"abc");
        assert_eq!(&framed[..], &[0, 0, 0, 3, b'a', b'b', b'c']);
        assert_eq!(frame_len(ProtocolKind::Binary, &framed).unwrap(), Some(7));
    }

    #[test]
    fn test_compact_frame_layout() {
        let framed = frame(ProtocolKind::Compact, b"abc");
        assert_eq!(&framed[..], &[3, b'a', b'b', b'c']);
        assert_eq!(frame_len(ProtocolKind::Compact, &framed).unwrap(), Some(4));
    }

    #[test]
    fn test_compact_multi_byte_varint() {
        let body = vec![0u8; 300];
        let framed = frame(ProtocolKind::Compact, &body);
        // 300 = 0xAC 0x02 in LEB128
        assert_eq!(&framed[..2], &[0xac, 0x02]);
        assert_eq!(
            frame_len(ProtocolKind::Compact, &framed).unwrap(),
            Some(302)
        );
    }

    #[test]
    fn test_incomplete_frames_need_more() {
        assert_eq!(frame_len(ProtocolKind::Binary, &[0, 0]).unwrap(), None);
        assert_eq!(
            frame_len(ProtocolKind::Binary, &[0, 0, 0, 5, b'a']).unwrap(),
            None
        );
        assert_eq!(frame_len(ProtocolKind::Compact, &[0x80]).unwrap(), None);
        assert_eq!(frame_len(ProtocolKind::Compact, &[]).unwrap(), None);
    }

    #[test]
    fn test_oversized_frame_rejected() {
        let mut header = BytesMut::new();
        put_uvarint(&mut header, (MAX_FRAME_LEN as u64) + 1);
        let result = frame_len(ProtocolKind::Compact, &header);
        assert!(matches!(result, Err(ContractError::FrameDecode { .. })));
    }

    #[test]
    fn test_malformed_varint_rejected() {
        let result = frame_len(ProtocolKind::Compact, &[0xff; 11]);
        assert!(matches!(result, Err(ContractError::FrameDecode { .. })));
    }

    #[test]
    fn test_frame_stream_round_trip() {
        for kind in [ProtocolKind::Binary, ProtocolKind::Compact] {
            let bodies: [&[u8]; 3] = [b"first", b"", b"third-and-longer"];
            let mut stream = Vec::new();
            for body in bodies {
                stream.extend_from_slice(&frame(kind, body));
            }

            let mut offset = 0;
            let mut decoded = Vec::new();
            while offset < stream.len() {
                let total = frame_len(kind, &stream[offset..]).unwrap().unwrap();
                decoded.push(stream[offset..offset + total].to_vec());
                offset += total;
            }
            assert_eq!(decoded.len(), 3);
            assert_eq!(decoded[0], frame(kind, b"first").to_vec());
        }
    }
}
