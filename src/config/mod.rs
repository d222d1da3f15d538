use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    #[serde(default = "default_max_conflict_retries")]
    pub max_conflict_retries: u32,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub directory: DirectoryConfig,
}

/// Static identity profiles, keyed by the external user/channel key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirectoryConfig {
    #[serde(default)]
    pub users: BTreeMap<String, UserEntry>,
    #[serde(default)]
    pub channels: BTreeMap<String, ChannelEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserEntry {
    pub display_name: Option<String>,
    pub real_name: Option<String>,
    pub email: Option<String>,
    pub team_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChannelEntry {
    pub name: Option<String>,
    pub kind: Option<String>,
}

fn default_database() -> String {
    Config::database_file().to_string_lossy().to_string()
}
fn default_busy_timeout_ms() -> u64 {
    5000
}
fn default_max_conflict_retries() -> u32 {
    2
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database(),
            busy_timeout_ms: default_busy_timeout_ms(),
            max_conflict_retries: default_max_conflict_retries(),
            log_level: default_log_level(),
            directory: DirectoryConfig::default(),
        }
    }
}

impl Config {
    /// Return the standard configuration directory depending on the platform
    pub fn config_dir() -> PathBuf {
        if cfg!(target_os = "windows") {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("rattendance")
        } else {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".rattendance")
        }
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("rattendance.conf")
    }

    /// Return the full path of the SQLite database
    pub fn database_file() -> PathBuf {
        Self::config_dir().join("rattendance.sqlite")
    }

    /// Load configuration from the default file, or return defaults if not found
    pub fn load() -> AppResult<Self> {
        Self::load_from(&Self::config_file())
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> AppResult<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Effective retry budget of the executor; always at least one retry.
    pub fn conflict_retries(&self) -> u32 {
        self.max_conflict_retries.max(1)
    }

    /// Initialize configuration and database files
    pub fn init_all(custom_db: Option<String>, is_test: bool) -> AppResult<Self> {
        let dir = Self::config_dir();
        fs::create_dir_all(&dir)?;

        // DB name: user provided or default
        let db_path = match custom_db {
            Some(name) => {
                let p = Path::new(&name);
                if p.is_absolute() {
                    p.to_path_buf()
                } else {
                    dir.join(p)
                }
            }
            None => Self::database_file(),
        };

        let mut config = if is_test {
            Self::default()
        } else {
            Self::load()?
        };
        config.database = db_path.to_string_lossy().to_string();

        // Write config file
        if !is_test {
            let yaml = serde_yaml::to_string(&config)?;
            let mut file = fs::File::create(Self::config_file())?;
            file.write_all(yaml.as_bytes())?;
        }

        if let Some(parent) = db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        Ok(config)
    }

    pub fn to_yaml(&self) -> AppResult<String> {
        serde_yaml::to_string(self).map_err(|e| AppError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let cfg = Config::from_yaml("database: /tmp/x.sqlite\n").unwrap();
        assert_eq!(cfg.database, "/tmp/x.sqlite");
        assert_eq!(cfg.busy_timeout_ms, 5000);
        assert_eq!(cfg.max_conflict_retries, 2);
        assert_eq!(cfg.log_level, "warn");
        assert!(cfg.directory.users.is_empty());
    }

    #[test]
    fn retry_budget_never_drops_below_one() {
        let cfg = Config::from_yaml("max_conflict_retries: 0\n").unwrap();
        assert_eq!(cfg.conflict_retries(), 1);
    }

    #[test]
    fn directory_profiles_are_parsed() {
        let yaml = r#"
directory:
  users:
    U01:
      display_name: alice
      team_id: T1
  channels:
    C01:
      name: general
      kind: public
"#;
        let cfg = Config::from_yaml(yaml).unwrap();
        let alice = &cfg.directory.users["U01"];
        assert_eq!(alice.display_name.as_deref(), Some("alice"));
        assert_eq!(alice.email, None);
        assert_eq!(cfg.directory.channels["C01"].name.as_deref(), Some("general"));
    }

    #[test]
    fn empty_file_is_default() {
        let cfg = Config::from_yaml("   \n").unwrap();
        assert_eq!(cfg.busy_timeout_ms, 5000);
    }
}
