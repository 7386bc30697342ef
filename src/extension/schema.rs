//! Names under which the extension is registered with SQLite

/// Module name used in `CREATE VIRTUAL TABLE ... USING loaderTXT('file')`
pub const MODULE_NAME: &str = "loaderTXT";

/// Scalar function returning the byte length of its argument
pub const LENGTH_FUNCTION: &str = "length_function";

/// Estimated cost reported for a full scan; there are no indexes to offer
pub const FULL_SCAN_COST: f64 = 1_000_000.0;

/// Quote an identifier for use in SQL (`"name"`)
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quote a string literal for use in SQL (`'value'`)
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Statement attaching `path` as a session-scoped virtual table named `name`
pub fn create_file_table(name: &str, path: &str) -> String {
    format!(
        "CREATE VIRTUAL TABLE IF NOT EXISTS temp.{} USING {}({})",
        quote_identifier(name),
        MODULE_NAME,
        quote_literal(path)
    )
}

/// Statement dropping a session-scoped table
pub fn drop_file_table(name: &str) -> String {
    format!("DROP TABLE IF EXISTS temp.{}", quote_identifier(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_statement_quotes_both_parts() {
        assert_eq!(
            create_file_table("my \"log\"", "/tmp/it's.txt"),
            "CREATE VIRTUAL TABLE IF NOT EXISTS temp.\"my \"\"log\"\"\" USING loaderTXT('/tmp/it''s.txt')"
        );
    }

    #[test]
    fn test_drop_statement() {
        assert_eq!(drop_file_table("lines"), "DROP TABLE IF EXISTS temp.\"lines\"");
    }
}
