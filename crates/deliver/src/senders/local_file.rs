//! LocalFileWriter - append-only capture fallback

use contracts::{ContractError, Payload, Transport};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Sender that appends payloads to a local capture file
///
/// Selected when the configured destination does not resolve to a valid IPv4
/// host, so a misconfigured run captures traffic instead of failing hard.
/// The file is raw concatenation of the framed payload bytes and is never
/// read back during operation. One file per client avoids interleaved writes.
pub struct LocalFileWriter {
    name: String,
    path: PathBuf,
    file: File,
}

impl LocalFileWriter {
    /// Open (or create) the capture file `client-<idx>.cap` under `dir`
    #[instrument(name = "local_file_open", skip(name, dir))]
    pub fn open(name: impl Into<String>, dir: &Path, idx: usize) -> std::io::Result<Self> {
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("client-{idx}.cap"));
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        debug!(path = %path.display(), "capture file opened");

        Ok(Self {
            name: name.into(),
            path,
            file,
        })
    }

    /// Path of the capture file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Transport for LocalFileWriter {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "local_file_send",
        skip(self, payload),
        fields(sender = %self.name, seq = payload.seq)
    )]
    async fn send(&mut self, payload: &Payload) -> Result<(), ContractError> {
        self.file
            .write_all(&payload.data)
            .map_err(|e| ContractError::sender_write(&self.name, e.to_string()))
    }

    #[instrument(name = "local_file_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        self.file
            .flush()
            .map_err(|e| ContractError::sender_write(&self.name, e.to_string()))
    }

    #[instrument(name = "local_file_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        debug!(sender = %self.name, path = %self.path.display(), "LocalFileWriter closed");
        Ok(())
    }
}
