//! Table descriptor - immutable configuration of one file-backed table

use crate::{Error, Result};

/// Resolved configuration for one table instance.
///
/// Built once from the module arguments and never mutated afterwards.
/// Cursors only ever borrow it, so it can be shared behind an `Arc`
/// by cursors living on different threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDescriptor {
    source_path: String,
}

impl TableDescriptor {
    /// Normalized path of the backing file
    pub fn source_path(&self) -> &str {
        &self.source_path
    }
}

/// Build a descriptor from the module arguments.
///
/// `args` are the arguments written inside `USING loaderTXT(...)`, i.e.
/// SQLite's `argv[3..]`. Only the first one is used.
pub fn create<S: AsRef<str>>(args: &[S]) -> Result<TableDescriptor> {
    let raw: &str = match args.first() {
        Some(arg) if !arg.as_ref().is_empty() => arg.as_ref(),
        _ => {
            return Err(Error::InvalidArgument(
                "Expected a filename as an argument".to_string(),
            ));
        }
    };

    if args.len() > 1 {
        tracing::warn!("Ignoring {} extra module argument(s) after {}", args.len() - 1, raw);
    }

    let source_path = normalize_path(raw)?;
    if source_path.is_empty() {
        return Err(Error::InvalidArgument(format!("Empty filename in argument {}", raw)));
    }

    tracing::debug!("Created table descriptor for {}", source_path);
    Ok(TableDescriptor { source_path })
}

/// Release a descriptor. Never fails.
pub fn destroy(descriptor: TableDescriptor) {
    tracing::debug!("Destroying table descriptor for {}", descriptor.source_path);
    drop(descriptor);
}

/// Strip one enclosing pair of single quotes and rewrite `\` as `/`.
///
/// Inside a quoted argument a doubled `''` stands for one quote, as in
/// any SQL string literal.
pub fn normalize_path(raw: &str) -> Result<String> {
    let unquoted = match raw.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')) {
        Some(inner) => inner.replace("''", "'"),
        None => raw.to_string(),
    };

    let mut path = String::new();
    path.try_reserve_exact(unquoted.len())
        .map_err(|e| Error::OutOfMemory(format!("path buffer: {}", e)))?;
    path.extend(unquoted.chars().map(|c| if c == '\\' { '/' } else { c }));
    Ok(path)
}
