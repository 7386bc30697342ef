//! Resource handle - the open read stream behind one cursor

use crate::{Error, Result};
use std::fs::File;
use std::io::{self, BufRead, BufReader, ErrorKind, Seek, SeekFrom};

/// Exclusive owner of one buffered read stream over a source file.
///
/// Not `Clone`: each cursor opens its own handle, and the file is closed
/// exactly once when the handle is dropped.
#[derive(Debug)]
pub struct ResourceHandle {
    path: String,
    reader: BufReader<File>,
}

impl ResourceHandle {
    /// Open `path` for reading
    pub fn open(path: &str) -> Result<Self> {
        let unavailable = |source: io::Error| Error::ResourceUnavailable {
            path: path.to_string(),
            source,
        };

        let file = File::open(path).map_err(unavailable)?;
        // Opening a directory succeeds on unix; reading it does not
        if file.metadata().map_err(unavailable)?.is_dir() {
            return Err(unavailable(io::Error::other("is a directory")));
        }

        tracing::debug!("Opened {}", path);
        Ok(Self {
            path: path.to_string(),
            reader: BufReader::new(file),
        })
    }

    /// Path this handle reads from
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Seek back to the first byte of the file
    pub fn rewind(&mut self) -> Result<()> {
        self.reader
            .seek(SeekFrom::Start(0))
            .map_err(|source| self.stream_error(source))?;
        Ok(())
    }

    /// Read the next line into a freshly allocated buffer.
    ///
    /// Returns `Ok(None)` once the stream is exhausted. One trailing `\n`
    /// (or `\r\n`) is stripped. Lines have no length limit; if the buffer
    /// can't grow the read fails with `OutOfMemory` instead of truncating.
    pub fn read_record(&mut self) -> Result<Option<String>> {
        let mut buf: Vec<u8> = Vec::new();

        loop {
            let available = match self.reader.fill_buf() {
                Ok(available) => available,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(source) => {
                    return Err(Error::Stream {
                        path: self.path.clone(),
                        source,
                    });
                }
            };
            if available.is_empty() {
                break;
            }

            let (used, found_newline) = match available.iter().position(|&b| b == b'\n') {
                Some(i) => (i + 1, true),
                None => (available.len(), false),
            };

            buf.try_reserve(used).map_err(|e| {
                Error::OutOfMemory(format!("line buffer of {} bytes: {}", buf.len() + used, e))
            })?;
            buf.extend_from_slice(&available[..used]);
            self.reader.consume(used);

            if found_newline {
                break;
            }
        }

        if buf.is_empty() {
            return Ok(None);
        }

        strip_terminator(&mut buf);
        let record = match String::from_utf8(buf) {
            Ok(text) => text,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        };
        Ok(Some(record))
    }

    /// Release the stream. Close errors are not observable.
    pub fn close(self) {
        tracing::debug!("Closed {}", self.path);
    }

    fn stream_error(&self, source: io::Error) -> Error {
        Error::Stream {
            path: self.path.clone(),
            source,
        }
    }
}

fn strip_terminator(buf: &mut Vec<u8>) {
    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn file_with(content: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file.flush().unwrap();
        file
    }

    fn open(file: &tempfile::NamedTempFile) -> ResourceHandle {
        ResourceHandle::open(file.path().to_str().unwrap()).unwrap()
    }

    #[test]
    fn test_reads_lines_in_order() {
        let file = file_with(b"a\nb\nc\n");
        let mut handle = open(&file);

        assert_eq!(handle.read_record().unwrap().as_deref(), Some("a"));
        assert_eq!(handle.read_record().unwrap().as_deref(), Some("b"));
        assert_eq!(handle.read_record().unwrap().as_deref(), Some("c"));
        assert_eq!(handle.read_record().unwrap(), None);
        assert_eq!(handle.read_record().unwrap(), None);
    }

    #[test]
    fn test_crlf_is_one_terminator() {
        let file = file_with(b"one\r\ntwo\r\n\r\n");
        let mut handle = open(&file);

        assert_eq!(handle.read_record().unwrap().as_deref(), Some("one"));
        assert_eq!(handle.read_record().unwrap().as_deref(), Some("two"));
        assert_eq!(handle.read_record().unwrap().as_deref(), Some(""));
        assert_eq!(handle.read_record().unwrap(), None);
    }

    #[test]
    fn test_lone_carriage_return_is_kept() {
        let file = file_with(b"tail\r");
        let mut handle = open(&file);

        assert_eq!(handle.read_record().unwrap().as_deref(), Some("tail\r"));
        assert_eq!(handle.read_record().unwrap(), None);
    }

    #[test]
    fn test_long_line_is_not_truncated() {
        let long = "x".repeat(64 * 1024 + 17);
        let file = file_with(format!("{}\nshort\n", long).as_bytes());
        let mut handle = open(&file);

        assert_eq!(handle.read_record().unwrap().unwrap().len(), long.len());
        assert_eq!(handle.read_record().unwrap().as_deref(), Some("short"));
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let file = file_with(b"ok\xff\n");
        let mut handle = open(&file);

        assert_eq!(handle.read_record().unwrap().as_deref(), Some("ok\u{FFFD}"));
    }

    #[test]
    fn test_rewind_restarts_stream() {
        let file = file_with(b"first\nsecond\n");
        let mut handle = open(&file);

        handle.read_record().unwrap();
        handle.read_record().unwrap();
        handle.rewind().unwrap();
        assert_eq!(handle.read_record().unwrap().as_deref(), Some("first"));
    }

    #[test]
    fn test_missing_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.txt");
        let err = ResourceHandle::open(missing.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, Error::ResourceUnavailable { .. }));
    }

    #[test]
    fn test_directory_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = ResourceHandle::open(dir.path().to_str().unwrap()).unwrap_err();
        assert!(matches!(err, Error::ResourceUnavailable { .. }));
    }
}
