use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the ingestion server, e.g. "http://localhost:5341".
    pub server_url: String,

    /// Buffer base path. `<buffer_base>*.json` are the buffer files written
    /// by the logging agent and `<buffer_base>.bookmark` tracks shipping
    /// progress alongside them.
    pub buffer_base: PathBuf,

    /// Optional API key, sent as the `X-Seq-ApiKey` header when non-blank.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Maximum number of lines per upload.
    #[serde(default = "default_batch_posting_limit")]
    pub batch_posting_limit: usize,

    /// Delay between ticks of the shipping loop.
    #[serde(default = "default_period", with = "humantime_serde")]
    pub period: Duration,

    /// Timeout for a single upload request.
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,
}

fn default_batch_posting_limit() -> usize {
    50
}

fn default_period() -> Duration {
    Duration::from_secs(2)
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}
