use crate::core::schema::{ExtraColumnPolicy, SheetLayout};
use crate::db::pool::DEFAULT_BUSY_TIMEOUT_MS;
use crate::errors::{AppError, AppResult};
use crate::models::Family;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

/// Per-family template offsets. Overriding them is the usual fix for
/// template drift between spreadsheet versions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Layouts {
    #[serde(default = "default_solar_layout")]
    pub solar: SheetLayout,
    #[serde(default = "default_hv_layout")]
    pub hv: SheetLayout,
    #[serde(default = "default_storage_layout")]
    pub storage: SheetLayout,
}

fn default_solar_layout() -> SheetLayout {
    Family::Solar.schema().layout
}
fn default_hv_layout() -> SheetLayout {
    Family::Hv.schema().layout
}
fn default_storage_layout() -> SheetLayout {
    Family::Storage.schema().layout
}

impl Default for Layouts {
    fn default() -> Self {
        Self {
            solar: default_solar_layout(),
            hv: default_hv_layout(),
            storage: default_storage_layout(),
        }
    }
}

impl Layouts {
    pub fn for_family(&self, family: Family) -> SheetLayout {
        match family {
            Family::Solar => self.solar,
            Family::Hv => self.hv,
            Family::Storage => self.storage,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: String,
    #[serde(default)]
    pub extra_columns: ExtraColumnPolicy,
    #[serde(default = "default_busy_timeout")]
    pub busy_timeout_ms: u64,
    #[serde(default)]
    pub layouts: Layouts,
}

fn default_busy_timeout() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

impl Default for Config {
    fn default() -> Self {
        let db_path = Self::database_file();
        Self {
            database: db_path.to_string_lossy().to_string(),
            extra_columns: ExtraColumnPolicy::default(),
            busy_timeout_ms: default_busy_timeout(),
            layouts: Layouts::default(),
        }
    }
}

impl Config {
    /// Return the standard configuration directory depending on the platform
    pub fn config_dir() -> PathBuf {
        if cfg!(target_os = "windows") {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("sovloader")
        } else {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".sovloader")
        }
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("sovloader.conf")
    }

    /// Return the full path of the SQLite database
    pub fn database_file() -> PathBuf {
        Self::config_dir().join("sovloader.sqlite")
    }

    /// Load configuration from file, or return defaults if not found
    pub fn load() -> AppResult<Self> {
        let path = Self::config_file();

        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&path)?;
        serde_yaml::from_str(&content)
            .map_err(|e| AppError::Config(format!("{}: {e}", path.display())))
    }

    pub fn to_yaml(&self) -> AppResult<String> {
        serde_yaml::to_string(self).map_err(|e| AppError::Config(e.to_string()))
    }

    /// Initialize configuration and database files
    pub fn init_all(custom_name: Option<String>, is_test: bool) -> AppResult<Config> {
        let dir = Self::config_dir();
        fs::create_dir_all(&dir)?;

        // DB name: user provided or default
        let db_path = if let Some(name) = custom_name {
            let p = std::path::Path::new(&name);
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                dir.join(p)
            }
        } else {
            Self::database_file()
        };

        let config = Config {
            database: db_path.to_string_lossy().to_string(),
            ..Config::default()
        };

        // Write config file
        if !is_test {
            let yaml = config.to_yaml()?;
            let mut file = fs::File::create(Self::config_file())?;
            file.write_all(yaml.as_bytes())?;
            println!("✅ Config file: {:?}", Self::config_file());
        }

        // Create empty DB file if not exists
        if let Some(parent) = db_path.parent() {
            fs::create_dir_all(parent)?;
        }
        if !db_path.exists() {
            fs::File::create(&db_path).map_err(|e| {
                io::Error::new(e.kind(), format!("{}: {e}", db_path.display()))
            })?;
        }

        println!("✅ Database:    {:?}", db_path);

        Ok(config)
    }
}
