//! Client - binds one sender variant to a pool index
//!
//! A client clones at request level, not at packet level, so the same payload
//! bytes can fan out across connections without touching the TCP sequence.

use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use contracts::{ContractError, Payload};

use crate::handle::SenderHandle;
use crate::metrics::SenderMetrics;
use crate::senders::{LocalFileWriter, LongConnSender, ShortConnSender};

/// Per-client configuration, identical across the pool
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Remote target, `host:port`
    pub remote_addr: String,

    /// Reuse one connection instead of one connection per request
    pub long_lived: bool,

    /// Ingress queue capacity for the owned sender
    pub queue_capacity: usize,

    /// Directory for the local capture fallback
    pub fallback_dir: PathBuf,
}

/// The sender variant a client ended up with
///
/// Chosen once at construction, immutable for the client's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SenderKind {
    LongConn,
    ShortConn,
    LocalFile,
}

/// One pool slot: an index plus exactly one running sender
pub struct Client {
    idx: usize,
    kind: SenderKind,
    handle: SenderHandle,
}

impl Client {
    /// Construct a client, selecting the sender variant from the destination
    ///
    /// A destination whose host parses as IPv4 gets a connection-oriented
    /// sender per `long_lived`; anything else falls back to the local capture
    /// file with a warning. Transport-open failure is returned to the caller,
    /// which logs and skips the slot; no retries here.
    #[instrument(
        name = "client_connect",
        skip(config, token),
        fields(remote = %config.remote_addr)
    )]
    pub async fn connect(
        idx: usize,
        config: &ClientConfig,
        token: CancellationToken,
    ) -> Result<Self, ContractError> {
        let name = format!("sender-{idx}");

        let (kind, handle) = match ipv4_host(&config.remote_addr) {
            Some(_) if config.long_lived => {
                let transport = LongConnSender::connect(name, &config.remote_addr).await?;
                (
                    SenderKind::LongConn,
                    SenderHandle::spawn(transport, config.queue_capacity, token),
                )
            }
            Some(_) => {
                let transport = ShortConnSender::new(name, &config.remote_addr);
                (
                    SenderKind::ShortConn,
                    SenderHandle::spawn(transport, config.queue_capacity, token),
                )
            }
            None => {
                warn!(
                    remote = %config.remote_addr,
                    "remote host is not a valid IPv4 address, falling back to local capture file"
                );
                let transport = LocalFileWriter::open(&name, &config.fallback_dir, idx)
                    .map_err(|e| ContractError::sender_connection(&name, e.to_string()))?;
                (
                    SenderKind::LocalFile,
                    SenderHandle::spawn(transport, config.queue_capacity, token),
                )
            }
        };

        debug!(idx, kind = ?kind, "client ready");

        Ok(Self { idx, kind, handle })
    }

    /// Wrap an already-running sender handle (custom senders, tests)
    pub fn from_parts(idx: usize, kind: SenderKind, handle: SenderHandle) -> Self {
        Self { idx, kind, handle }
    }

    /// Pool index
    pub fn idx(&self) -> usize {
        self.idx
    }

    /// Which sender variant this client owns
    pub fn kind(&self) -> SenderKind {
        self.kind
    }

    /// Sender name
    pub fn name(&self) -> &str {
        self.handle.name()
    }

    /// A clone of the owned sender's ingress queue
    pub fn ingress(&self) -> mpsc::Sender<Payload> {
        self.handle.ingress()
    }

    /// Forward one payload copy to the owned sender, awaiting queue space
    pub async fn send(&self, payload: Payload) -> bool {
        self.handle.send(payload).await
    }

    /// Sender metrics
    pub fn metrics(&self) -> &Arc<SenderMetrics> {
        self.handle.metrics()
    }

    /// Stop the owned sender
    pub async fn shutdown(self) {
        self.handle.shutdown().await;
    }
}

/// Parse the host part of `host:port` as an IPv4 address
///
/// Anything that fails here (missing port, hostname, IPv6) selects the
/// local-file fallback.
pub(crate) fn ipv4_host(addr: &str) -> Option<Ipv4Addr> {
    let (host, _port) = addr.rsplit_once(':')?;
    host.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use tokio::net::TcpListener;

    fn config(remote_addr: &str, long_lived: bool, fallback_dir: PathBuf) -> ClientConfig {
        ClientConfig {
            remote_addr: remote_addr.to_string(),
            long_lived,
            queue_capacity: 8,
            fallback_dir,
        }
    }

    #[test]
    fn test_ipv4_host_parsing() {
        assert_eq!(ipv4_host("127.0.0.1:9000"), Some(Ipv4Addr::LOCALHOST));
        assert_eq!(ipv4_host("10.1.2.3:80"), Some(Ipv4Addr::new(10, 1, 2, 3)));
        assert_eq!(ipv4_host("example.com:80"), None);
        assert_eq!(ipv4_host("127.0.0.1"), None);
        assert_eq!(ipv4_host("999.0.0.1:80"), None);
        assert_eq!(ipv4_host(""), None);
    }

    #[tokio::test]
    async fn test_fallback_selection_for_hostname() {
        let dir = tempdir().unwrap();
        let client = Client::connect(
            0,
            &config("replay-target:9000", true, dir.path().to_path_buf()),
            CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(client.kind(), SenderKind::LocalFile);
        client.shutdown().await;
    }

    #[tokio::test]
    async fn test_short_conn_selection() {
        let dir = tempdir().unwrap();
        let client = Client::connect(
            1,
            &config("127.0.0.1:9000", false, dir.path().to_path_buf()),
            CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(client.kind(), SenderKind::ShortConn);
        client.shutdown().await;
    }

    #[tokio::test]
    async fn test_long_conn_selection() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let dir = tempdir().unwrap();
        let client = Client::connect(
            2,
            &config(&addr, true, dir.path().to_path_buf()),
            CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(client.kind(), SenderKind::LongConn);
        client.shutdown().await;
    }

    #[tokio::test]
    async fn test_long_conn_construction_failure_surfaces() {
        let dir = tempdir().unwrap();
        let result = Client::connect(
            3,
            &config("127.0.0.1:1", true, dir.path().to_path_buf()),
            CancellationToken::new(),
        )
        .await;

        assert!(matches!(
            result,
            Err(ContractError::SenderConnection { .. })
        ));
    }
}
