//! Share/export sink for the history log

use async_trait::async_trait;
use tokio::io::{self, AsyncWriteExt};

use crate::error::ExportError;

pub const EXPORT_TITLE: &str = "Exported Timer History";

/// Receives exported text; what happens to it is up to the host
#[async_trait]
pub trait ExportSink: Send + Sync {
    async fn share(&self, title: &str, message: &str) -> Result<(), ExportError>;
}

/// Writes exports to standard output
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

#[async_trait]
impl ExportSink for StdoutSink {
    async fn share(&self, title: &str, message: &str) -> Result<(), ExportError> {
        let mut stdout = io::stdout();
        let text = format!("# {}\n{}\n", title, message);
        stdout
            .write_all(text.as_bytes())
            .await
            .map_err(|e| ExportError::Sink(e.to_string()))?;
        stdout
            .flush()
            .await
            .map_err(|e| ExportError::Sink(e.to_string()))
    }
}
