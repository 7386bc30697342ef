//! Cursor state and the scan operations that drive it
//!
//! ```text
//! open ──► OPEN ──rewind──► SCANNING | EXHAUSTED
//!          SCANNING ──advance──► SCANNING | EXHAUSTED
//!          EXHAUSTED ──rewind──► SCANNING | EXHAUSTED
//! close consumes the cursor from any state
//! ```

use super::descriptor::TableDescriptor;
use super::handle::ResourceHandle;
use crate::{Error, Result};

/// Index of the only column, `line`
pub const LINE_COLUMN: usize = 0;

/// Observable position of a cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// Opened but never rewound; nothing buffered
    Open,
    /// Positioned on a record
    Scanning,
    /// No further records
    Exhausted,
}

/// Position of one active scan over a text file.
///
/// Owns its stream exclusively. `at_end` implies `current_record` is `None`.
#[derive(Debug)]
pub struct CursorState {
    handle: ResourceHandle,
    rowid: i64,
    current_record: Option<String>,
    at_end: bool,
}

/// Open a new cursor over the descriptor's file.
///
/// Fails with `ResourceUnavailable` when the file can't be opened; in that
/// case nothing is left allocated.
pub fn open(descriptor: &TableDescriptor) -> Result<CursorState> {
    let handle = ResourceHandle::open(descriptor.source_path())?;
    Ok(CursorState {
        handle,
        rowid: 0,
        current_record: None,
        at_end: false,
    })
}

impl CursorState {
    /// Restart the scan from the first line and pre-fetch it
    pub fn rewind(&mut self) -> Result<()> {
        tracing::debug!("Rewinding scan over {}", self.handle.path());
        self.rowid = 0;
        self.current_record = None;
        self.at_end = false;

        if let Err(e) = self.handle.rewind() {
            self.fail();
            return Err(e);
        }
        self.advance()
    }

    /// Move to the next line, replacing the buffered record
    pub fn advance(&mut self) -> Result<()> {
        if self.at_end {
            return Ok(());
        }

        // Release the previous record before reading the next one
        self.current_record = None;

        match self.handle.read_record() {
            Ok(Some(record)) => {
                self.rowid += 1;
                tracing::trace!(rowid = self.rowid, "Read record");
                self.current_record = Some(record);
                Ok(())
            }
            Ok(None) => {
                tracing::debug!("Reached end of {} after {} rows", self.handle.path(), self.rowid);
                self.at_end = true;
                Ok(())
            }
            Err(e) => {
                self.fail();
                Err(e)
            }
        }
    }

    /// Whether the scan has run out of records
    pub fn at_end(&self) -> bool {
        self.at_end
    }

    /// Value of column `index`: the current line, or `None` when no record
    /// is buffered.
    pub fn column(&self, index: usize) -> Result<Option<&str>> {
        if index != LINE_COLUMN {
            return Err(Error::InvalidArgument(format!(
                "Column index {} out of range, table has a single column",
                index
            )));
        }
        Ok(self.current_record.as_deref())
    }

    /// 1-based sequence number of the current record, 0 before the first one
    pub fn row_id(&self) -> i64 {
        self.rowid
    }

    pub fn state(&self) -> ScanState {
        match (self.at_end, &self.current_record) {
            (true, _) => ScanState::Exhausted,
            (false, Some(_)) => ScanState::Scanning,
            (false, None) => ScanState::Open,
        }
    }

    /// End the scan and release the stream and the buffered record
    pub fn close(self) {
        let CursorState { handle, rowid, .. } = self;
        tracing::debug!("Closing cursor at rowid {}", rowid);
        handle.close();
    }

    // A failed read or seek is fatal for this cursor
    fn fail(&mut self) {
        self.current_record = None;
        self.at_end = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::descriptor;
    use std::io::Write;
    use std::sync::Arc;

    fn file_with(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn descriptor_for(file: &tempfile::NamedTempFile) -> TableDescriptor {
        descriptor::create(&[file.path().to_str().unwrap()]).unwrap()
    }

    fn collect(cursor: &mut CursorState) -> Vec<(i64, String)> {
        let mut rows = Vec::new();
        cursor.rewind().unwrap();
        while !cursor.at_end() {
            let line = cursor.column(LINE_COLUMN).unwrap().unwrap().to_string();
            rows.push((cursor.row_id(), line));
            cursor.advance().unwrap();
        }
        rows
    }

    #[test]
    fn test_full_scan_in_file_order() {
        let file = file_with("a\nb\nc\n");
        let desc = descriptor_for(&file);
        let mut cursor = open(&desc).unwrap();

        let rows = collect(&mut cursor);
        assert_eq!(
            rows,
            vec![(1, "a".to_string()), (2, "b".to_string()), (3, "c".to_string())]
        );
        assert!(cursor.at_end());
        cursor.close();
    }

    #[test]
    fn test_final_line_without_newline() {
        let file = file_with("x");
        let desc = descriptor_for(&file);
        let mut cursor = open(&desc).unwrap();

        assert_eq!(collect(&mut cursor), vec![(1, "x".to_string())]);
        assert!(cursor.at_end());
    }

    #[test]
    fn test_no_spurious_trailing_record() {
        let file = file_with("a\nb");
        let desc = descriptor_for(&file);
        let mut cursor = open(&desc).unwrap();

        let rows = collect(&mut cursor);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], (2, "b".to_string()));
    }

    #[test]
    fn test_empty_file_is_exhausted_after_rewind() {
        let file = file_with("");
        let desc = descriptor_for(&file);
        let mut cursor = open(&desc).unwrap();

        cursor.rewind().unwrap();
        assert!(cursor.at_end());
        assert_eq!(cursor.state(), ScanState::Exhausted);
        assert_eq!(cursor.column(LINE_COLUMN).unwrap(), None);
        assert_eq!(cursor.row_id(), 0);
    }

    #[test]
    fn test_column_is_null_after_end() {
        let file = file_with("only\n");
        let desc = descriptor_for(&file);
        let mut cursor = open(&desc).unwrap();

        cursor.rewind().unwrap();
        assert_eq!(cursor.column(LINE_COLUMN).unwrap(), Some("only"));
        cursor.advance().unwrap();
        assert!(cursor.at_end());
        assert_eq!(cursor.column(LINE_COLUMN).unwrap(), None);

        // Advancing past the end changes nothing
        cursor.advance().unwrap();
        assert!(cursor.at_end());
        assert_eq!(cursor.column(LINE_COLUMN).unwrap(), None);
        assert_eq!(cursor.row_id(), 1);
    }

    #[test]
    fn test_rewind_mid_scan_returns_to_first_row() {
        let file = file_with("1\n2\n3\n4\n");
        let desc = descriptor_for(&file);
        let mut cursor = open(&desc).unwrap();

        cursor.rewind().unwrap();
        cursor.advance().unwrap();
        cursor.advance().unwrap();
        assert_eq!(cursor.row_id(), 3);

        cursor.rewind().unwrap();
        assert_eq!(cursor.row_id(), 1);
        assert_eq!(cursor.column(LINE_COLUMN).unwrap(), Some("1"));

        // And again, from the exhausted state
        while !cursor.at_end() {
            cursor.advance().unwrap();
        }
        cursor.rewind().unwrap();
        assert_eq!(cursor.state(), ScanState::Scanning);
        assert_eq!(collect(&mut cursor).len(), 4);
    }

    #[test]
    fn test_fresh_cursor_is_open_state() {
        let file = file_with("a\n");
        let desc = descriptor_for(&file);
        let cursor = open(&desc).unwrap();

        assert_eq!(cursor.state(), ScanState::Open);
        assert!(!cursor.at_end());
        assert_eq!(cursor.column(LINE_COLUMN).unwrap(), None);
        // Closing a cursor that never advanced is fine
        cursor.close();
    }

    #[test]
    fn test_column_out_of_range() {
        let file = file_with("a\n");
        let desc = descriptor_for(&file);
        let mut cursor = open(&desc).unwrap();
        cursor.rewind().unwrap();

        assert!(matches!(cursor.column(1), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.txt");
        let desc = descriptor::create(&[path.to_str().unwrap()]).unwrap();

        let err = open(&desc).unwrap_err();
        assert!(matches!(err, Error::ResourceUnavailable { .. }));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_read_failure_is_stream_error_and_exhausts() {
        // Opens fine, but reading offset 0 of our own address space fails
        let desc = descriptor::create(&["/proc/self/mem"]).unwrap();
        let mut cursor = open(&desc).unwrap();

        let err = cursor.rewind().unwrap_err();
        assert!(matches!(err, Error::Stream { .. }));
        assert!(cursor.at_end());
        assert_eq!(cursor.state(), ScanState::Exhausted);
        assert_eq!(cursor.column(LINE_COLUMN).unwrap(), None);
        cursor.close();
    }

    #[test]
    fn test_cursors_are_independent() {
        let file = file_with("a\nb\nc\n");
        let desc = descriptor_for(&file);
        let mut first = open(&desc).unwrap();
        let mut second = open(&desc).unwrap();

        first.rewind().unwrap();
        first.advance().unwrap();
        second.rewind().unwrap();

        assert_eq!(first.column(LINE_COLUMN).unwrap(), Some("b"));
        assert_eq!(second.column(LINE_COLUMN).unwrap(), Some("a"));
        assert_eq!(first.row_id(), 2);
        assert_eq!(second.row_id(), 1);
    }

    #[test]
    fn test_cursors_on_separate_threads() {
        let content: String = (1..=500).map(|i| format!("line {}\n", i)).collect();
        let file = file_with(&content);
        let desc = Arc::new(descriptor_for(&file));

        let workers: Vec<_> = (0..4)
            .map(|_| {
                let desc = Arc::clone(&desc);
                std::thread::spawn(move || {
                    let mut cursor = open(&desc).unwrap();
                    let rows = collect(&mut cursor);
                    cursor.close();
                    rows
                })
            })
            .collect();

        for worker in workers {
            let rows = worker.join().unwrap();
            assert_eq!(rows.len(), 500);
            assert_eq!(rows[499], (500, "line 500".to_string()));
            assert!(rows.windows(2).all(|w| w[1].0 == w[0].0 + 1));
        }
    }
}
