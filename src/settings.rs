use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use tracing::warn;

use crate::parser::SectionName;

const DEFAULT_CONFIG_NAME: &str = "card_sync";
const ENV_PREFIX: &str = "CARDS";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory holding the site pages.
    pub root: PathBuf,
    pub bind: String,
    /// File names never listed or served.
    pub exclude: Vec<String>,
    /// Section label -> target file name.
    pub targets: BTreeMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        let targets = [
            ("living room", "living room"),
            ("bedroom", "bedrooms"),
            ("dining room", "dining-room"),
            ("recliner", "recliners"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Settings {
            root: PathBuf::from("."),
            bind: "127.0.0.1:8000".to_string(),
            exclude: vec!["card_sync.toml".to_string()],
            targets,
        }
    }
}

impl Settings {
    /// Defaults, then the config file (`card_sync.toml` if present, or `path`), then `CARDS_*` env vars.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(p) => File::from(p).required(true),
            None => File::with_name(DEFAULT_CONFIG_NAME).required(false),
        };
        Config::builder()
            .add_source(file)
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()
            .context("Failed to load configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }

    /// Target file per section. Keys go through the same header matching as the
    /// spreadsheet, so "Dinning Room" works too; unknown keys are ignored.
    pub fn target_table(&self) -> BTreeMap<SectionName, String> {
        let mut table = BTreeMap::new();
        for (label, file) in &self.targets {
            match SectionName::from_header(label) {
                Some(section) => {
                    table.insert(section, file.clone());
                }
                None => warn!(key = %label, "unknown section in targets config"),
            }
        }
        table
    }
}
