use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{KeychainError, Result};

/// Project-level configuration, loaded from `.keychain.toml`.
///
/// Every field has a sensible default so the keychain works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Directory (relative to project root) holding the keychain files.
    #[serde(default = "default_store_dir")]
    pub store_dir: String,

    /// File name of the serialized keychain inside `store_dir`.
    #[serde(default = "default_store_file")]
    pub store_file: String,

    /// File name of the pinned trusted checksum inside `store_dir`.
    #[serde(default = "default_checksum_file")]
    pub checksum_file: String,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_store_dir() -> String {
    ".keychain".to_string()
}

fn default_store_file() -> String {
    "keychain.json".to_string()
}

fn default_checksum_file() -> String {
    "trusted-checksum".to_string()
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            store_dir: default_store_dir(),
            store_file: default_store_file(),
            checksum_file: default_checksum_file(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the project root.
    const FILE_NAME: &'static str = ".keychain.toml";

    /// Load settings from `<project_dir>/.keychain.toml`.
    ///
    /// If the file does not exist, sensible defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(project_dir: &Path) -> Result<Self> {
        let config_path = project_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            KeychainError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        Ok(settings)
    }

    /// Directory holding the keychain files, e.g. `project_dir/.keychain`.
    pub fn store_dir(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.store_dir)
    }

    /// Full path of the serialized keychain.
    pub fn store_path(&self, project_dir: &Path) -> PathBuf {
        self.store_dir(project_dir).join(&self.store_file)
    }

    /// Full path of the pinned checksum.
    pub fn checksum_path(&self, project_dir: &Path) -> PathBuf {
        self.store_dir(project_dir).join(&self.checksum_file)
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_settings_are_sensible() {
        let s = Settings::default();
        assert_eq!(s.store_dir, ".keychain");
        assert_eq!(s.store_file, "keychain.json");
        assert_eq!(s.checksum_file, "trusted-checksum");
    }

    #[test]
    fn load_returns_defaults_when_no_config_file() {
        let tmp = TempDir::new().unwrap();
        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.store_dir, ".keychain");
    }

    #[test]
    fn load_parses_toml_file() {
        let tmp = TempDir::new().unwrap();
        let config = r#"
store_dir = "secrets"
store_file = "passwords.json"
checksum_file = "pin"
"#;
        fs::write(tmp.path().join(".keychain.toml"), config).unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.store_dir, "secrets");
        assert_eq!(settings.store_file, "passwords.json");
        assert_eq!(settings.checksum_file, "pin");
    }

    #[test]
    fn load_uses_defaults_for_missing_fields() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".keychain.toml"), "checksum_file = \"pin\"\n").unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.checksum_file, "pin");
        // Rest should be defaults
        assert_eq!(settings.store_dir, ".keychain");
        assert_eq!(settings.store_file, "keychain.json");
    }

    #[test]
    fn load_errors_on_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".keychain.toml"), "not valid {{toml").unwrap();

        let result = Settings::load(tmp.path());
        assert!(result.is_err());
    }

    #[test]
    fn paths_are_built_under_store_dir() {
        let s = Settings::default();
        let project = Path::new("/home/user/project");
        assert_eq!(
            s.store_path(project),
            PathBuf::from("/home/user/project/.keychain/keychain.json")
        );
        assert_eq!(
            s.checksum_path(project),
            PathBuf::from("/home/user/project/.keychain/trusted-checksum")
        );
    }
}
