use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct LoaderConfig {
    /// Database file; in-memory when absent
    pub database: Option<String>,
    #[serde(default)]
    pub tables: Vec<TableEntry>,
}

/// A text file to attach as a table on startup
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableEntry {
    pub name: String,
    pub file: String,
}

impl TableEntry {
    /// Parse a `name=path` pair as given on the command line
    pub fn parse(pair: &str) -> anyhow::Result<Self> {
        let (name, file) = pair
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("expected NAME=PATH, got {}", pair))?;
        let name = name.trim();
        if name.is_empty() || file.is_empty() {
            anyhow::bail!("expected NAME=PATH, got {}", pair);
        }
        Ok(Self {
            name: name.to_string(),
            file: file.to_string(),
        })
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("loadertxt.toml")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<LoaderConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: LoaderConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &LoaderConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
