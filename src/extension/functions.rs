//! Scalar SQL functions shipped with the extension

use rusqlite::functions::{Context, FunctionFlags};
use rusqlite::types::ValueRef;
use rusqlite::Connection;

use super::render::real_text;
use super::schema::LENGTH_FUNCTION;

/// Register `length_function(value)` on `conn`.
///
/// Registered as variadic so a wrong argument count surfaces as the
/// function's own error instead of "no such function".
pub fn register_length_function(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        LENGTH_FUNCTION,
        -1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        length_function,
    )
}

/// Byte length of the argument's text form; NULL stays NULL
fn length_function(ctx: &Context<'_>) -> rusqlite::Result<Option<i64>> {
    if ctx.len() != 1 {
        return Err(rusqlite::Error::UserFunctionError(
            "Incorrect number of arguments".into(),
        ));
    }

    let len = match ctx.get_raw(0) {
        ValueRef::Null => return Ok(None),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => bytes.len(),
        ValueRef::Integer(i) => i.to_string().len(),
        ValueRef::Real(f) => real_text(f).len(),
    };
    Ok(Some(len as i64))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        register_length_function(&conn).unwrap();
        conn
    }

    fn eval(conn: &Connection, sql: &str) -> rusqlite::Result<Option<i64>> {
        conn.query_row(sql, [], |row| row.get(0))
    }

    #[test]
    fn test_text_length_in_bytes() {
        let conn = conn();
        assert_eq!(eval(&conn, "SELECT length_function('hello')").unwrap(), Some(5));
        assert_eq!(eval(&conn, "SELECT length_function('')").unwrap(), Some(0));
        // 'é' is two bytes in UTF-8
        assert_eq!(eval(&conn, "SELECT length_function('é')").unwrap(), Some(2));
    }

    #[test]
    fn test_numbers_use_text_form() {
        let conn = conn();
        assert_eq!(eval(&conn, "SELECT length_function(12345)").unwrap(), Some(5));
        assert_eq!(eval(&conn, "SELECT length_function(-7)").unwrap(), Some(2));
        assert_eq!(eval(&conn, "SELECT length_function(2.5)").unwrap(), Some(3));
    }

    #[test]
    fn test_reals_match_sqlite_text_length() {
        let conn = conn();
        for expr in ["0.1+0.2", "1e20", "1.5e-7", "1.0", "-123.456"] {
            let (ours, sqlite): (i64, i64) = conn
                .query_row(
                    &format!("SELECT length_function({0}), length(CAST({0} AS TEXT))", expr),
                    [],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .unwrap();
            assert_eq!(ours, sqlite, "length of {}", expr);
        }
    }

    #[test]
    fn test_null_propagates() {
        let conn = conn();
        assert_eq!(eval(&conn, "SELECT length_function(NULL)").unwrap(), None);
    }

    #[test]
    fn test_wrong_arity() {
        let conn = conn();
        let err = eval(&conn, "SELECT length_function('a', 'b')").unwrap_err();
        assert!(err.to_string().contains("Incorrect number of arguments"));

        assert!(eval(&conn, "SELECT length_function()").is_err());
    }
}
