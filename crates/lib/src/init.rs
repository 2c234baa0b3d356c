//! Initialize the configuration directory: create ~/.codepad, a default config, and an empty
//! bookmarks file.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::config;

/// Create the config directory and default files if they do not exist.
/// - Creates the config directory (parent of config file path).
/// - Writes `config.json` with `{}` if missing.
/// - Writes the bookmarks file (resolved from the config) with `[]` if missing.
pub fn init_config_dir(config_path: &Path) -> Result<PathBuf> {
    let config_dir = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(config_dir)
        .with_context(|| format!("creating config directory {}", config_dir.display()))?;

    if !config_path.exists() {
        std::fs::write(config_path, b"{}")
            .with_context(|| format!("writing default config to {}", config_path.display()))?;
        log::info!("created default config at {}", config_path.display());
    }

    let (config, _) = config::load_config(Some(config_path.to_path_buf()))?;
    let bookmarks = config::resolve_bookmarks_path(&config, config_path);
    if !bookmarks.exists() {
        if let Some(parent) = bookmarks.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating directory {}", parent.display()))?;
        }
        std::fs::write(&bookmarks, b"[]")
            .with_context(|| format!("writing bookmarks file {}", bookmarks.display()))?;
        log::info!("created bookmarks file at {}", bookmarks.display());
    } else {
        log::debug!("bookmarks file already exists at {}, skipping", bookmarks.display());
    }

    Ok(config_dir.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_config_and_bookmarks_once() {
        let dir = std::env::temp_dir().join(format!("codepad-init-{}", uuid::Uuid::new_v4()));
        let config_path = dir.join("config.json");

        let created = init_config_dir(&config_path).unwrap();
        assert_eq!(created, dir);
        assert_eq!(std::fs::read_to_string(&config_path).unwrap(), "{}");
        assert_eq!(std::fs::read_to_string(dir.join("bookmarks.json")).unwrap(), "[]");

        std::fs::write(dir.join("bookmarks.json"), "[ ]").unwrap();
        init_config_dir(&config_path).unwrap();
        assert_eq!(std::fs::read_to_string(dir.join("bookmarks.json")).unwrap(), "[ ]");
        let _ = std::fs::remove_dir_all(&dir);
    }
}
