use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// Delimiter between the offset and the file name in the sidecar line.
const DELIMITER: &str = ":::";

#[derive(Debug, Error)]
pub enum BookmarkError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BookmarkError>;

/// Shipping progress: a byte offset into the named buffer file.
///
/// The offset is monotonically non-decreasing while `file` is unchanged and
/// resets to 0 whenever `file` changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bookmark {
    pub offset: u64,
    pub file: Option<PathBuf>,
}

impl Bookmark {
    /// Fresh bookmark: start from the earliest buffer file.
    pub fn start() -> Self {
        Self {
            offset: 0,
            file: None,
        }
    }
}

/// Handle on the bookmark sidecar file.
///
/// Opened read+write once per tick iteration and held for that iteration;
/// this is the unit of consistency, not a cross-process lock.
pub struct BookmarkFile {
    file: File,
    path: PathBuf,
}

impl BookmarkFile {
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)?;
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    /// Read the persisted bookmark.
    ///
    /// Absent, empty, or malformed content reads as `Bookmark::start()` so a
    /// corrupt sidecar self-heals into a replay from the earliest buffer file
    /// instead of a fatal error.
    pub fn read(&mut self) -> Result<Bookmark> {
        self.file.seek(SeekFrom::Start(0))?;
        let mut raw = Vec::new();
        BufReader::new(&self.file).read_until(b'\n', &mut raw)?;

        let Ok(line) = String::from_utf8(raw) else {
            warn!(path = %self.path.display(), "Bookmark is not valid UTF-8, restarting from earliest buffer file");
            return Ok(Bookmark::start());
        };
        let line = line.trim_end_matches(&['\r', '\n'][..]);
        if line.is_empty() {
            return Ok(Bookmark::start());
        }

        match line.split_once(DELIMITER) {
            Some((offset, file)) if !file.is_empty() => match offset.parse::<u64>() {
                Ok(offset) => Ok(Bookmark {
                    offset,
                    file: Some(PathBuf::from(file)),
                }),
                Err(_) => {
                    warn!(path = %self.path.display(), content = line, "Bookmark offset is not a number, restarting from earliest buffer file");
                    Ok(Bookmark::start())
                }
            },
            _ => {
                warn!(path = %self.path.display(), content = line, "Malformed bookmark, restarting from earliest buffer file");
                Ok(Bookmark::start())
            }
        }
    }

    /// Truncate and rewrite the sidecar as `<offset>:::<file>` plus newline.
    pub fn write(&mut self, offset: u64, file: &Path) -> Result<()> {
        self.file.seek(SeekFrom::Start(0))?;
        self.file.set_len(0)?;
        writeln!(self.file, "{}{}{}", offset, DELIMITER, file.display())?;
        self.file.flush()?;
        Ok(())
    }
}
