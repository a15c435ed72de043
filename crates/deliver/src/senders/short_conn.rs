//! ShortConnSender - one fresh connection per payload

use contracts::{ContractError, Payload, Transport};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{debug, instrument};

/// Sender that opens a new TCP connection for every payload
///
/// Exercises the connection-churn behavior of the remote endpoint: connect,
/// write, shut down, for each request copy. Construction opens nothing and
/// cannot fail; connect failures surface per send.
pub struct ShortConnSender {
    name: String,
    addr: String,
}

impl ShortConnSender {
    /// Create a sender aimed at the remote address
    pub fn new(name: impl Into<String>, addr: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            addr: addr.into(),
        }
    }
}

impl Transport for ShortConnSender {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "short_conn_send",
        skip(self, payload),
        fields(sender = %self.name, seq = payload.seq)
    )]
    async fn send(&mut self, payload: &Payload) -> Result<(), ContractError> {
        let mut stream = TcpStream::connect(&self.addr)
            .await
            .map_err(|e| ContractError::sender_write(&self.name, e.to_string()))?;

        stream
            .write_all(&payload.data)
            .await
            .map_err(|e| ContractError::sender_write(&self.name, e.to_string()))?;

        let _ = stream.shutdown().await;
        Ok(())
    }

    #[instrument(name = "short_conn_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        // Nothing buffered between sends
        Ok(())
    }

    #[instrument(name = "short_conn_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        debug!(sender = %self.name, "ShortConnSender closed");
        Ok(())
    }
}
