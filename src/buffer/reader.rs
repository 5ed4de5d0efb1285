use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use thiserror::Error;

/// UTF-8 byte-order mark that some writers emit at the start of a file.
const BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("buffer file contains invalid utf-8 at offset {offset}")]
    InvalidUtf8 { offset: u64 },
}

pub type Result<T> = std::result::Result<T, ReadError>;

/// Offset-addressed line extraction over one buffer file.
///
/// Wraps a persistent `BufReader`; the handle is only re-seeked when the
/// requested offset diverges from the tracked position, so sequential batch
/// reads reuse the internal buffer. All offset arithmetic is in raw bytes:
/// the returned offset is exactly the number of bytes consumed from the
/// file, including the line terminator and, at the start of file, a BOM.
pub struct LineReader {
    reader: BufReader<File>,
    position: u64,
}

impl LineReader {
    pub fn new(file: File) -> std::io::Result<Self> {
        Ok(Self {
            reader: BufReader::new(file),
            position: 0,
        })
    }

    /// Read one complete line starting at `offset`.
    ///
    /// Returns the line without its terminator plus the byte offset of the
    /// next line. `None` means no complete line is available yet: the file
    /// ends at or before `offset`, or the writer has not yet terminated the
    /// trailing line. A trailing partial line does not advance the offset.
    pub fn read_line(&mut self, offset: u64) -> Result<Option<(String, u64)>> {
        let len = self.reader.get_ref().metadata()?.len();
        if len <= offset {
            return Ok(None);
        }
        if self.position != offset {
            self.reader.seek(SeekFrom::Start(offset))?;
            self.position = offset;
        }

        let mut consumed = 0u64;
        if offset == 0 {
            // The writer may or may not emit a BOM; detect it instead of
            // assuming, and count its bytes into the offset when present.
            let head = self.reader.fill_buf()?;
            if head.starts_with(&BOM) {
                self.reader.consume(BOM.len());
                self.position += BOM.len() as u64;
                consumed += BOM.len() as u64;
            }
        }

        let mut raw = Vec::new();
        let read = self.reader.read_until(b'\n', &mut raw)?;
        if read == 0 || raw.last() != Some(&b'\n') {
            // Partial trailing line: leave the offset untouched until the
            // writer terminates it.
            self.reader.seek(SeekFrom::Start(offset))?;
            self.position = offset;
            return Ok(None);
        }
        consumed += read as u64;
        self.position += read as u64;

        raw.pop();
        if raw.last() == Some(&b'\r') {
            raw.pop();
        }
        let line = String::from_utf8(raw).map_err(|_| ReadError::InvalidUtf8 { offset })?;
        Ok(Some((line, offset + consumed)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn reader_over(content: &[u8]) -> (NamedTempFile, LineReader) {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(content).unwrap();
        temp.flush().unwrap();
        let reader = LineReader::new(File::open(temp.path()).unwrap()).unwrap();
        (temp, reader)
    }

    #[test]
    fn test_reads_lines_with_exact_byte_offsets() {
        let (_temp, mut reader) = reader_over(b"{\"n\":1}\n{\"n\":2}\n");

        let (line, offset) = reader.read_line(0).unwrap().unwrap();
        assert_eq!(line, "{\"n\":1}");
        assert_eq!(offset, 8);

        let (line, offset) = reader.read_line(offset).unwrap().unwrap();
        assert_eq!(line, "{\"n\":2}");
        assert_eq!(offset, 16);

        assert!(reader.read_line(offset).unwrap().is_none());
    }

    #[test]
    fn test_bom_counted_into_first_offset() {
        let mut content = vec![0xEF, 0xBB, 0xBF];
        content.extend_from_slice(b"{\"n\":1}\n{\"n\":2}\n");
        let (_temp, mut reader) = reader_over(&content);

        let (line, offset) = reader.read_line(0).unwrap().unwrap();
        assert_eq!(line, "{\"n\":1}");
        assert_eq!(offset, 11);

        let (line, _) = reader.read_line(offset).unwrap().unwrap();
        assert_eq!(line, "{\"n\":2}");
    }

    #[test]
    fn test_file_without_bom_starts_at_zero_cost() {
        let (_temp, mut reader) = reader_over(b"{\"n\":1}\n");
        let (_, offset) = reader.read_line(0).unwrap().unwrap();
        assert_eq!(offset, 8);
    }

    #[test]
    fn test_crlf_terminator_stripped_but_counted() {
        let (_temp, mut reader) = reader_over(b"{\"n\":1}\r\n{\"n\":2}\r\n");

        let (line, offset) = reader.read_line(0).unwrap().unwrap();
        assert_eq!(line, "{\"n\":1}");
        assert_eq!(offset, 9);

        let (line, offset) = reader.read_line(offset).unwrap().unwrap();
        assert_eq!(line, "{\"n\":2}");
        assert_eq!(offset, 18);
    }

    #[test]
    fn test_multibyte_utf8_accounted_in_bytes() {
        let content = "{\"msg\":\"héllo wörld\"}\n{\"n\":2}\n";
        let (_temp, mut reader) = reader_over(content.as_bytes());

        let (line, offset) = reader.read_line(0).unwrap().unwrap();
        assert_eq!(line, "{\"msg\":\"héllo wörld\"}");
        // Two two-byte characters: offset is byte length, not char count.
        assert_eq!(offset, line.len() as u64 + 1);

        let (line, _) = reader.read_line(offset).unwrap().unwrap();
        assert_eq!(line, "{\"n\":2}");
    }

    #[test]
    fn test_partial_trailing_line_not_consumed() {
        let (temp, mut reader) = reader_over(b"{\"n\":1}\n{\"n\":2");

        let (_, offset) = reader.read_line(0).unwrap().unwrap();
        assert!(reader.read_line(offset).unwrap().is_none());

        // Once the writer terminates the line it becomes readable at the
        // same offset.
        let mut file = std::fs::OpenOptions::new()
            .append(true)
            .open(temp.path())
            .unwrap();
        file.write_all(b"}\n").unwrap();
        file.flush().unwrap();

        let (line, _) = reader.read_line(offset).unwrap().unwrap();
        assert_eq!(line, "{\"n\":2}");
    }

    #[test]
    fn test_empty_file_yields_none() {
        let (_temp, mut reader) = reader_over(b"");
        assert!(reader.read_line(0).unwrap().is_none());
    }

    #[test]
    fn test_offset_at_or_past_end_yields_none() {
        let (_temp, mut reader) = reader_over(b"{\"n\":1}\n");
        assert!(reader.read_line(8).unwrap().is_none());
        assert!(reader.read_line(999).unwrap().is_none());
    }

    #[test]
    fn test_invalid_utf8_line_is_an_error() {
        let (_temp, mut reader) = reader_over(&[0xC3, 0x28, b'\n']);
        assert!(matches!(
            reader.read_line(0),
            Err(ReadError::InvalidUtf8 { offset: 0 })
        ));
    }
}
