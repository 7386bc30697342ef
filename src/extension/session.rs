//! Session - a SQLite connection with the extension installed

use std::path::Path;

use rusqlite::types::ValueRef;
use rusqlite::Connection;
use serde::Serialize;

use super::render::real_text;
use super::schema;
use crate::{Error, Result};

/// Connection with `loaderTXT` registered and a set of attached files.
///
/// Attached files live in the `temp` schema, so they disappear with the
/// session and never end up persisted in a database file.
pub struct Session {
    conn: Connection,
    attached: Vec<String>,
}

impl Session {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// Open an in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        super::register(&conn)?;
        Ok(Self {
            conn,
            attached: Vec::new(),
        })
    }

    /// Expose the text file at `path` as table `name`
    pub fn attach_file(&mut self, name: &str, path: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(Error::InvalidArgument("Table name must not be empty".to_string()));
        }

        self.conn.execute_batch(&schema::create_file_table(name, path))?;
        if !self.attached.iter().any(|t| t == name) {
            self.attached.push(name.to_string());
        }
        tracing::debug!("Attached {} as {}", path, name);
        Ok(())
    }

    /// Drop a table attached with [`Session::attach_file`]
    pub fn detach(&mut self, name: &str) -> Result<()> {
        self.conn.execute_batch(&schema::drop_file_table(name))?;
        self.attached.retain(|t| t != name);
        tracing::debug!("Detached {}", name);
        Ok(())
    }

    /// Names of the tables attached in this session
    pub fn tables(&self) -> &[String] {
        &self.attached
    }

    /// Run one SQL statement and collect every row as text
    pub fn query(&self, sql: &str) -> Result<QueryOutput> {
        let mut stmt = self.conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let width = columns.len();

        let mut out = QueryOutput {
            columns,
            rows: Vec::new(),
        };
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(width);
            for i in 0..width {
                values.push(render_value(row.get_ref(i)?));
            }
            out.rows.push(values);
        }

        Ok(out)
    }

    /// Close the connection, dropping every attached table.
    ///
    /// Failures are logged; teardown itself never fails.
    pub fn close(self) {
        let Session { conn, attached } = self;
        for name in &attached {
            if let Err(e) = conn.execute_batch(&schema::drop_file_table(name)) {
                tracing::debug!("Ignoring error while dropping {}: {}", name, e);
            }
        }
        if let Err((_, e)) = conn.close() {
            tracing::debug!("Ignoring error while closing connection: {}", e);
        }
    }
}

/// Result of [`Session::query`]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryOutput {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl QueryOutput {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows as JSON objects keyed by column name
    pub fn to_json_records(&self) -> serde_json::Value {
        let records = self
            .rows
            .iter()
            .map(|row| {
                let record: serde_json::Map<String, serde_json::Value> = self
                    .columns
                    .iter()
                    .zip(row)
                    .map(|(column, value)| {
                        let value = value
                            .as_ref()
                            .map_or(serde_json::Value::Null, |v| serde_json::Value::String(v.clone()));
                        (column.clone(), value)
                    })
                    .collect();
                serde_json::Value::Object(record)
            })
            .collect();
        serde_json::Value::Array(records)
    }
}

fn render_value(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(real_text(f)),
        ValueRef::Text(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Some(format!("<blob {} bytes>", bytes.len())),
    }
}
