pub mod seq;

pub use seq::SeqSink;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server rejected batch with status {status}: {body}")]
    Server { status: u16, body: String },
}

pub type Result<T> = std::result::Result<T, SinkError>;

/// Destination for one batch of raw JSON event lines.
///
/// Implementations perform no retry; the orchestrator retries by leaving the
/// bookmark unchanged so the identical batch is rebuilt on the next tick.
#[async_trait]
pub trait BatchSink: Send + Sync {
    async fn send(&self, lines: &[String]) -> Result<()>;
}
