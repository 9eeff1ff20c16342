use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub names: NameConfig,
    pub streets: StreetConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct NameConfig {
    /// Language codes in order of preference for the display name
    pub priority_languages: Vec<String>,

    /// Keep a non-empty imported name instead of replacing it with a prioritized `name:<lang>`
    pub prefer_existing_name: bool,

    /// Tags whose values count as alternative names besides `name:<lang>`
    pub alternative_name_keys: Vec<String>,
}

impl Default for NameConfig {
    fn default() -> Self {
        Self {
            priority_languages: ["en", "fr", "de", "es", "ru", "zh"]
                .iter()
                .map(|lang| lang.to_string())
                .collect(),
            prefer_existing_name: true,
            alternative_name_keys: vec!["alt_name".to_string()],
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default, deny_unknown_fields)]
pub struct StreetConfig {
    pub merge_resolution: MergeResolution,
}

/// How far `merged_into` is followed when resolving a street.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MergeResolution {
    /// Take `merged_into` as the result, assuming chains were flattened upstream.
    SingleHop,
    /// Walk `merged_into` until a street that is not merged any further.
    #[default]
    FollowChain,
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse config file")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let languages = &self.names.priority_languages;
        if languages.is_empty() {
            bail!("names.priority_languages must list at least one language");
        }
        if let Some(blank) = languages.iter().find(|lang| lang.trim().is_empty()) {
            bail!("names.priority_languages contains a blank entry: {:?}", blank);
        }
        Ok(())
    }
}
