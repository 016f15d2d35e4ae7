use std::path::Path;
use std::sync::RwLock;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use lazy_static::lazy_static;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::error::Result;

/// Prefix of the environment variables that override configuration values,
/// e.g. `WRCLONE_SETTINGS__TMP=/var/cache/wrclone`.
pub const ENV_PREFIX: &str = "WRCLONE";

lazy_static! {
    static ref BUILDER: RwLock<ConfigBuilder<DefaultState>> = RwLock::new(Config::builder());
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    pub level: String,
    /// Mirror log records to stderr in addition to the log file.
    #[serde(default)]
    pub console: bool,
    /// Directory of the log file; empty means `<exe dir>/logs`.
    #[serde(default)]
    pub dir: String,
    pub file: String,
}

/// The `[settings]` section of `save.ini`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Path of the JSON document listing the directory sets.
    pub config: String,
    /// Local cache directory holding the `<name>.txt` change markers.
    pub tmp: String,
    /// rclone executable, resolved through `PATH` when not absolute.
    pub rclone: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            config: "./config/config.json".to_string(),
            tmp: "./log/".to_string(),
            rclone: "rclone".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub log: LogConfig,
    pub settings: Settings,
}

impl AppConfig {
    /// Reset the configuration to the given TOML defaults.
    pub fn init(default_config: Option<&str>) -> Result<()> {
        let mut builder = Config::builder();

        if let Some(config_contents) = default_config {
            builder = builder.add_source(File::from_str(config_contents, FileFormat::Toml));
        }

        *BUILDER.write()? = builder;
        Ok(())
    }

    /// Layer an INI file (such as `save.ini`) on top of the defaults.
    pub fn merge_ini(path: &Path, required: bool) -> Result<()> {
        let mut builder = BUILDER.write()?;
        *builder = builder.clone().add_source(
            File::from(path)
                .format(FileFormat::Ini)
                .required(required),
        );
        Ok(())
    }

    pub fn set(key: &str, value: &str) -> Result<()> {
        let mut builder = BUILDER.write()?;
        *builder = builder.clone().set_override(key, value)?;
        Ok(())
    }

    pub fn get<T>(key: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        Ok(Self::build()?.get::<T>(key)?)
    }

    pub fn fetch() -> Result<AppConfig> {
        Ok(Self::build()?.try_deserialize::<AppConfig>()?)
    }

    // Environment goes last so it wins over every file source.
    fn build() -> Result<Config> {
        let builder = BUILDER.read()?.clone();
        let config = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;
        Ok(config)
    }
}
