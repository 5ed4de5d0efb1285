pub mod scheduler;

use crate::bookmark::{Bookmark, BookmarkError, BookmarkFile};
use crate::buffer::reader::{LineReader, ReadError};
use crate::buffer::{bookmark_path, list_buffer_files};
use crate::sink::{BatchSink, SinkError};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ShipError {
    #[error("bookmark error: {0}")]
    Bookmark(#[from] BookmarkError),

    #[error("buffer read error: {0}")]
    Read(#[from] ReadError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("sink error: {0}")]
    Sink(#[from] SinkError),
}

pub type Result<T> = std::result::Result<T, ShipError>;

/// Totals for one tick of the drain loop.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickStats {
    pub batches: usize,
    pub lines: usize,
}

/// The shipping orchestrator.
///
/// Each tick reloads all progress state from disk, so a shipper is fully
/// re-derivable from the bookmark sidecar plus the buffer files after a
/// crash. An error anywhere aborts the tick only; the bookmark is never
/// advanced past unacknowledged lines, which gives at-least-once delivery.
pub struct Shipper {
    buffer_base: PathBuf,
    bookmark_path: PathBuf,
    batch_limit: usize,
    sink: Arc<dyn BatchSink>,
}

impl Shipper {
    pub fn new(buffer_base: PathBuf, batch_limit: usize, sink: Arc<dyn BatchSink>) -> Self {
        let bookmark_path = bookmark_path(&buffer_base);
        Self {
            buffer_base,
            bookmark_path,
            batch_limit,
            sink,
        }
    }

    /// One tick: ship batches until one comes back short of the posting
    /// limit, so a single tick can drain an entire backlog across files.
    pub async fn tick(&self) -> Result<TickStats> {
        let mut stats = TickStats::default();
        loop {
            let mut bookmark_file = BookmarkFile::open(&self.bookmark_path)?;
            let mut bookmark = bookmark_file.read()?;
            let files = list_buffer_files(&self.buffer_base)?;

            let stale = match &bookmark.file {
                Some(current) => !files.iter().any(|file| file == current),
                None => true,
            };
            if stale {
                bookmark = Bookmark {
                    offset: 0,
                    file: files.first().cloned(),
                };
            }
            let Some(current) = bookmark.file.clone() else {
                // The writer has produced nothing yet.
                return Ok(stats);
            };

            let (batch, next_offset) = self.read_batch(&current, bookmark.offset)?;

            if batch.is_empty() {
                self.roll_or_prune(&mut bookmark_file, &files, &current)?;
                return Ok(stats);
            }

            let full = batch.len() == self.batch_limit;
            self.sink.send(&batch).await?;
            bookmark_file.write(next_offset, &current)?;
            stats.batches += 1;
            stats.lines += batch.len();
            debug!(
                file = %current.display(),
                offset = next_offset,
                lines = batch.len(),
                "Shipped batch"
            );

            if !full {
                return Ok(stats);
            }
        }
    }

    /// Accumulate up to `batch_limit` complete lines from `current` starting
    /// at `offset`, returning them with the advanced offset.
    fn read_batch(&self, current: &Path, offset: u64) -> Result<(Vec<String>, u64)> {
        let file = File::open(current)?;
        let mut reader = LineReader::new(file)?;
        let mut batch = Vec::new();
        let mut next_offset = offset;
        while batch.len() < self.batch_limit {
            match reader.read_line(next_offset)? {
                Some((line, advanced)) => {
                    batch.push(line);
                    next_offset = advanced;
                }
                None => break,
            }
        }
        Ok((batch, next_offset))
    }

    /// Empty-batch handling: hand the bookmark to the next file once the
    /// current one is exhausted and penultimate, or delete the oldest file
    /// when at least two newer ones exist. With one file (or none) there is
    /// nothing to roll into yet; wait for the writer.
    fn roll_or_prune(
        &self,
        bookmark_file: &mut BookmarkFile,
        files: &[PathBuf],
        current: &Path,
    ) -> Result<()> {
        if files.len() == 2 && files[0] == current {
            info!(
                from = %current.display(),
                to = %files[1].display(),
                "Buffer file drained, rolling bookmark forward"
            );
            bookmark_file.write(0, &files[1])?;
        } else if files.len() > 2 {
            // Reached only when the bookmark has drained the oldest file or
            // already moved past it, so no unshipped lines can be lost.
            let oldest = &files[0];
            info!(file = %oldest.display(), "Deleting exhausted buffer file");
            std::fs::remove_file(oldest)?;
        }
        Ok(())
    }
}
