//! seqship: a durable, crash-resilient local-to-remote log shipper.
//!
//! Tails a rotating set of append-only buffer files of newline-delimited
//! JSON events, batches unsent lines, and POSTs them to a Seq-compatible
//! `/api/events/raw` endpoint. Progress is persisted in a bookmark sidecar
//! so a restart resumes without loss (at-least-once delivery).
//!
//! # Example
//!
//! ```ignore
//! use seqship::{Scheduler, SeqSink, Shipper};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sink = Arc::new(SeqSink::new("http://localhost:5341", None, Duration::from_secs(30))?);
//!     let shipper = Arc::new(Shipper::new("/var/log/app/buffer".into(), 50, sink));
//!     let scheduler = Scheduler::start(shipper, Duration::from_secs(2));
//!     tokio::signal::ctrl_c().await?;
//!     scheduler.shutdown().await; // mandatory: flushes remaining backlog
//!     Ok(())
//! }
//! ```

pub mod bookmark;
pub mod buffer;
pub mod cli;
pub mod config;
pub mod shipper;
pub mod sink;

pub use bookmark::{Bookmark, BookmarkFile};
pub use config::Config;
pub use shipper::scheduler::Scheduler;
pub use shipper::{ShipError, Shipper, TickStats};
pub use sink::{BatchSink, SeqSink, SinkError};
