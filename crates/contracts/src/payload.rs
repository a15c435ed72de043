//! Payload - the unit of delivery
//!
//! Opaque pre-framed request bytes. `Bytes` makes request-level cloning cheap,
//! which is what the replication loop relies on.

use bytes::Bytes;

/// One opaque request payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    /// Producer-stamped sequence number (diagnostics only)
    pub seq: u64,

    /// Framed request bytes, written to the wire verbatim
    pub data: Bytes,
}

impl Payload {
    /// Create a new payload
    pub fn new(seq: u64, data: Bytes) -> Self {
        Self { seq, data }
    }

    /// Payload length in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the payload carries no bytes
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_clone_shares_bytes() {
        let payload = Payload::new(7, Bytes::from_static(b"abcd"));
        let copy = payload.clone();
        assert_eq!(copy.seq, 7);
        assert_eq!(copy.data, payload.data);
        assert_eq!(copy.len(), 4);
        assert!(!copy.is_empty());
    }
}
