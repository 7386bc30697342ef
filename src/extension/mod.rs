//! SQLite extension - module registration and session handling
//!
//! Registers on a connection:
//! - the `loaderTXT` virtual table module (text file, one row per line)
//! - the `length_function(value)` scalar

pub mod functions;
pub mod render;
pub mod schema;
pub mod session;
pub mod vtab;

pub use schema::{LENGTH_FUNCTION, MODULE_NAME};
pub use session::{QueryOutput, Session};
pub use vtab::{SourceCursor, SourceTable};

use rusqlite::vtab::read_only_module;
use rusqlite::Connection;

use crate::source::LineSource;
use crate::Result;

/// Install the extension on `conn`.
///
/// Calling it again on the same connection replaces each entry with an
/// identical one, so repeated registration is harmless.
pub fn register(conn: &Connection) -> Result<()> {
    conn.create_module(
        MODULE_NAME,
        read_only_module::<SourceTable<LineSource>>(),
        None,
    )?;
    functions::register_length_function(conn)?;
    tracing::debug!("Registered {} and {}", MODULE_NAME, LENGTH_FUNCTION);
    Ok(())
}
