use std::path::PathBuf;

use anyhow::{Context, Result};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::Deserialize;

const ENV_PREFIX: &str = "PHONES";
const CONFIG_FILE: &str = "phone_prices";

/// Run settings: defaults, then an optional `phone_prices.{toml,json,yaml}`
/// file, then `PHONES_*` environment variables, then CLI flags.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub launch_prices: PathBuf,
    pub file_prefix: String,
    #[serde(default)]
    pub accessory_keywords: Vec<String>,
}

impl Settings {
    pub fn load() -> Result<Self> {
        let config = defaults()?
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("accessory_keywords"),
            )
            .build()
            .context("Failed to read settings")?;
        config
            .try_deserialize()
            .context("Invalid settings")
    }

    pub fn with_overrides(
        mut self,
        data_dir: Option<PathBuf>,
        output_dir: Option<PathBuf>,
        launch_prices: Option<PathBuf>,
    ) -> Self {
        if let Some(dir) = data_dir {
            self.data_dir = dir;
        }
        if let Some(dir) = output_dir {
            self.output_dir = dir;
        }
        if let Some(path) = launch_prices {
            self.launch_prices = path;
        }
        self
    }
}

fn defaults() -> Result<ConfigBuilder<DefaultState>> {
    Ok(Config::builder()
        .set_default("data_dir", "data")?
        .set_default("output_dir", "output")?
        .set_default("launch_prices", "data/launch_prices.csv")?
        .set_default("file_prefix", "marketplace")?)
}
