//! LongConnSender - one persistent connection, reused for every payload

use contracts::{ContractError, Payload, Transport};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{debug, instrument};

/// Sender that keeps a single TCP connection open for its whole lifetime
///
/// The connection is opened at construction and never proactively closed
/// except at shutdown; there is no reconnect, a broken connection fails every
/// later send until the pool goes away.
pub struct LongConnSender {
    name: String,
    stream: Option<TcpStream>,
}

impl LongConnSender {
    /// Open the persistent connection to the remote address
    #[instrument(name = "long_conn_connect", skip(name))]
    pub async fn connect(name: impl Into<String>, addr: &str) -> Result<Self, ContractError> {
        let name = name.into();
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|e| ContractError::sender_connection(&name, e.to_string()))?;

        debug!(sender = %name, remote = %addr, "persistent connection established");

        Ok(Self {
            name,
            stream: Some(stream),
        })
    }
}

impl Transport for LongConnSender {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "long_conn_send",
        skip(self, payload),
        fields(sender = %self.name, seq = payload.seq)
    )]
    async fn send(&mut self, payload: &Payload) -> Result<(), ContractError> {
        let Some(stream) = self.stream.as_mut() else {
            return Err(ContractError::sender_write(&self.name, "connection closed"));
        };
        stream
            .write_all(&payload.data)
            .await
            .map_err(|e| ContractError::sender_write(&self.name, e.to_string()))
    }

    #[instrument(name = "long_conn_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        let Some(stream) = self.stream.as_mut() else {
            return Err(ContractError::sender_write(&self.name, "connection closed"));
        };
        stream
            .flush()
            .await
            .map_err(|e| ContractError::sender_write(&self.name, e.to_string()))
    }

    #[instrument(name = "long_conn_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        if let Some(mut stream) = self.stream.take() {
            let _ = stream.shutdown().await;
        }
        debug!(sender = %self.name, "LongConnSender closed");
        Ok(())
    }
}
