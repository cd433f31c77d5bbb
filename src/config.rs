use crate::error::ConfigError;
use crate::table::{ActivityPriority, CANONICAL_ACTIVITY_TYPES};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_CONFIG_PATH: &str = "sigap.toml";

/// Who is looking at the dashboard. Resolved once by the caller and passed
/// down instead of being sniffed from cookies inside each widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    #[default]
    Public,
    External,
    Admin,
}

impl AccessLevel {
    pub fn can_see_budget(self) -> bool {
        self == AccessLevel::Admin
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    pub output_dir: PathBuf,
    pub page_size: usize,
    pub access: AccessLevel,
    pub activity_priority: Vec<String>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            data_path: PathBuf::from("data_cip.csv"),
            output_dir: PathBuf::from("."),
            page_size: 10,
            access: AccessLevel::Public,
            activity_priority: CANONICAL_ACTIVITY_TYPES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl DashboardConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Read `path`; a missing file means defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(s) => {
                let cfg = Self::from_toml_str(&s)?;
                info!(path = %path.display(), "config loaded");
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Io {
                path: path.display().to_string(),
                source,
            }),
        }
    }

    /// `SIGAP_CONFIG` if set, otherwise `sigap.toml` in the working directory.
    pub fn from_env() -> Result<Self, ConfigError> {
        let path = std::env::var("SIGAP_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
        Self::load(Path::new(&path))
    }

    pub fn priority(&self) -> ActivityPriority {
        ActivityPriority::new(&self.activity_priority)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let cfg = DashboardConfig::from_toml_str("page_size = 25\naccess = \"admin\"\n")
            .expect("config");
        assert_eq!(cfg.page_size, 25);
        assert!(cfg.access.can_see_budget());
        assert_eq!(cfg.activity_priority.len(), 15);
        assert_eq!(cfg.data_path, PathBuf::from("data_cip.csv"));
    }

    #[test]
    fn unknown_access_level_is_rejected() {
        assert!(DashboardConfig::from_toml_str("access = \"root\"").is_err());
    }
}
