use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default page size for catalog requests.
pub const DEFAULT_PAGE_LIMIT: u32 = 20;

/// Quiet period before a buffered search input is committed.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(400);

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
  /// Base URL of the remote catalog service.
  #[serde(default = "default_base_url")]
  pub base_url: String,
}

impl Default for CatalogConfig {
  fn default() -> Self {
    Self {
      base_url: default_base_url(),
    }
  }
}

fn default_base_url() -> String {
  "https://dummyjson.com".to_string()
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./vitrine.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/vitrine/config.yaml
  ///
  /// Falls back to built-in defaults when no file exists; the catalog
  /// endpoint is public and needs no credentials.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("vitrine.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("vitrine").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    let config: Config = serde_yaml::from_str(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?;

    Ok(config)
  }
}
