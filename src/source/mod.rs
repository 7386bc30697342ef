//! Row sources - the scan engine behind a virtual table
//!
//! A row source turns some external data into rows a query host can pull one
//! at a time. The host drives it through the [`RowSource`] capability set:
//! create a descriptor once per table, then open/rewind/advance/close one
//! cursor per scan.
//!
//! [`LineSource`] is the text-file implementation: one row per line, a
//! single `line TEXT` column.

pub mod cursor;
pub mod descriptor;
pub mod handle;

pub use cursor::{CursorState, ScanState, LINE_COLUMN};
pub use descriptor::TableDescriptor;
pub use handle::ResourceHandle;

use crate::Result;

/// Capability set a query host needs from a read-only row source.
///
/// Implementors are marker types; all state lives in the associated
/// `Descriptor` (per table, immutable) and `Cursor` (per scan) types.
pub trait RowSource {
    /// Per-table configuration, shared by all cursors of the table
    type Descriptor;
    /// Per-scan position, owning whatever stream the scan reads from
    type Cursor;

    /// `CREATE TABLE` statement declaring the exposed columns
    const SCHEMA: &'static str;

    /// Validate the module arguments and build a descriptor
    fn create(args: &[&str]) -> Result<Self::Descriptor>;

    /// Release a descriptor. Never fails.
    fn destroy(descriptor: Self::Descriptor);

    /// Start a scan, acquiring its stream
    fn open(descriptor: &Self::Descriptor) -> Result<Self::Cursor>;

    /// Restart the scan and position it on the first row (or at the end)
    fn rewind(cursor: &mut Self::Cursor) -> Result<()>;

    /// Move to the next row
    fn advance(cursor: &mut Self::Cursor) -> Result<()>;

    fn at_end(cursor: &Self::Cursor) -> bool;

    /// Text value of column `index` for the current row, `None` for NULL
    fn column(cursor: &Self::Cursor, index: usize) -> Result<Option<&str>>;

    fn row_id(cursor: &Self::Cursor) -> i64;

    /// End the scan, releasing its stream. Never fails.
    fn close(cursor: Self::Cursor);
}

/// Text files, one row per line
#[derive(Debug, Clone, Copy, Default)]
pub struct LineSource;

impl RowSource for LineSource {
    type Descriptor = TableDescriptor;
    type Cursor = CursorState;

    const SCHEMA: &'static str = "CREATE TABLE x(line TEXT)";

    fn create(args: &[&str]) -> Result<TableDescriptor> {
        descriptor::create(args)
    }

    fn destroy(descriptor: TableDescriptor) {
        descriptor::destroy(descriptor)
    }

    fn open(descriptor: &TableDescriptor) -> Result<CursorState> {
        cursor::open(descriptor)
    }

    fn rewind(cursor: &mut CursorState) -> Result<()> {
        cursor.rewind()
    }

    fn advance(cursor: &mut CursorState) -> Result<()> {
        cursor.advance()
    }

    fn at_end(cursor: &CursorState) -> bool {
        cursor.at_end()
    }

    fn column(cursor: &CursorState, index: usize) -> Result<Option<&str>> {
        cursor.column(index)
    }

    fn row_id(cursor: &CursorState) -> i64 {
        cursor.row_id()
    }

    fn close(cursor: CursorState) {
        cursor.close()
    }
}
