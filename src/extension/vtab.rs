//! SQLite virtual table over any [`RowSource`]
//!
//! Maps SQLite's module callbacks onto the row source capability set:
//! xCreate/xConnect → `create`, xOpen → `open`, xFilter → `rewind`,
//! xNext → `advance`, xEof → `at_end`, xColumn → `column`,
//! xRowid → `row_id`, xClose → `close`, xDisconnect/xDestroy → `destroy`.

use std::marker::PhantomData;
use std::os::raw::c_int;

use rusqlite::ffi;
use rusqlite::vtab::{
    Context, CreateVTab, IndexInfo, VTab, VTabConnection, VTabCursor, VTabKind, Values,
};

use super::schema::FULL_SCAN_COST;
use crate::source::RowSource;
use crate::Error;

/// One virtual table instance; owns the row source descriptor
#[repr(C)]
pub struct SourceTable<R: RowSource> {
    /// Base class. Must be first
    base: ffi::sqlite3_vtab,
    descriptor: Option<R::Descriptor>,
}

/// One scan over a [`SourceTable`]
#[repr(C)]
pub struct SourceCursor<'vtab, R: RowSource> {
    /// Base class. Must be first
    base: ffi::sqlite3_vtab_cursor,
    cursor: Option<R::Cursor>,
    phantom: PhantomData<&'vtab SourceTable<R>>,
}

impl<R: RowSource> SourceTable<R> {
    fn descriptor(&self) -> rusqlite::Result<&R::Descriptor> {
        self.descriptor
            .as_ref()
            .ok_or_else(|| rusqlite::Error::ModuleError("table has been destroyed".to_string()))
    }
}

impl<R: RowSource> Drop for SourceTable<R> {
    fn drop(&mut self) {
        if let Some(descriptor) = self.descriptor.take() {
            R::destroy(descriptor);
        }
    }
}

unsafe impl<'vtab, R: RowSource + 'vtab> VTab<'vtab> for SourceTable<R> {
    type Aux = ();
    type Cursor = SourceCursor<'vtab, R>;

    fn connect(
        _db: &mut VTabConnection,
        _aux: Option<&()>,
        args: &[&[u8]],
    ) -> rusqlite::Result<(String, Self)> {
        // argv[0..3] are the module, database and table names
        let module_args = args
            .get(3..)
            .unwrap_or_default()
            .iter()
            .map(|arg| std::str::from_utf8(arg))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::InvalidArgument(format!("module argument is not UTF-8: {}", e)))?;

        let descriptor = R::create(&module_args)?;
        Ok((
            R::SCHEMA.to_owned(),
            Self {
                base: ffi::sqlite3_vtab::default(),
                descriptor: Some(descriptor),
            },
        ))
    }

    fn best_index(&self, info: &mut IndexInfo) -> rusqlite::Result<()> {
        // Every scan is a full scan in file order; constraints are left to SQLite
        info.set_estimated_cost(FULL_SCAN_COST);
        Ok(())
    }

    fn open(&'vtab mut self) -> rusqlite::Result<SourceCursor<'vtab, R>> {
        let cursor = R::open(self.descriptor()?)?;
        Ok(SourceCursor {
            base: ffi::sqlite3_vtab_cursor::default(),
            cursor: Some(cursor),
            phantom: PhantomData,
        })
    }
}

impl<'vtab, R: RowSource + 'vtab> CreateVTab<'vtab> for SourceTable<R> {
    const KIND: VTabKind = VTabKind::Default;
}

impl<R: RowSource> SourceCursor<'_, R> {
    fn cursor(&self) -> rusqlite::Result<&R::Cursor> {
        self.cursor.as_ref().ok_or_else(closed_cursor)
    }

    fn cursor_mut(&mut self) -> rusqlite::Result<&mut R::Cursor> {
        self.cursor.as_mut().ok_or_else(closed_cursor)
    }
}

impl<R: RowSource> Drop for SourceCursor<'_, R> {
    fn drop(&mut self) {
        if let Some(cursor) = self.cursor.take() {
            R::close(cursor);
        }
    }
}

unsafe impl<R: RowSource> VTabCursor for SourceCursor<'_, R> {
    fn filter(
        &mut self,
        _idx_num: c_int,
        _idx_str: Option<&str>,
        _args: &Values<'_>,
    ) -> rusqlite::Result<()> {
        R::rewind(self.cursor_mut()?)?;
        Ok(())
    }

    fn next(&mut self) -> rusqlite::Result<()> {
        R::advance(self.cursor_mut()?)?;
        Ok(())
    }

    fn eof(&self) -> bool {
        self.cursor.as_ref().is_none_or(R::at_end)
    }

    fn column(&self, ctx: &mut Context, i: c_int) -> rusqlite::Result<()> {
        let index = usize::try_from(i)
            .map_err(|_| Error::InvalidArgument(format!("Column index {} out of range", i)))?;
        let value = R::column(self.cursor()?, index)?;
        ctx.set_result(&value)
    }

    fn rowid(&self) -> rusqlite::Result<i64> {
        Ok(R::row_id(self.cursor()?))
    }
}

fn closed_cursor() -> rusqlite::Error {
    rusqlite::Error::ModuleError("cursor is closed".to_string())
}

/// Report row source failures with the matching SQLite result code
impl From<Error> for rusqlite::Error {
    fn from(err: Error) -> Self {
        let code = match err {
            Error::Sqlite(inner) => return inner,
            Error::InvalidArgument(_) => ffi::SQLITE_ERROR,
            Error::ResourceUnavailable { .. } => ffi::SQLITE_CANTOPEN,
            Error::Stream { .. } => ffi::SQLITE_IOERR,
            Error::OutOfMemory(_) => ffi::SQLITE_NOMEM,
        };
        rusqlite::Error::SqliteFailure(ffi::Error::new(code), Some(err.to_string()))
    }
}
