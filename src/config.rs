use chrono::NaiveDate;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};
use thiserror::Error;
use validator::Validate;

use crate::services::{SlackOptions, TemplateError, Templates};

/// Errors raised while building the settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Bad configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] validator::ValidationErrors),

    #[error("Bad templates: {0}")]
    Templates(#[from] TemplateError),
}

/// Application configuration
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Settings {
    #[validate(nested)]
    pub matching: MatchingSettings,
    #[validate(nested)]
    pub slack: SlackSettings,
    #[validate(nested)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct MatchingSettings {
    /// Monday the rotation periods are aligned on
    pub epoch: NaiveDate,
    /// Length of a rotation period, in weeks
    #[validate(range(min = 1))]
    pub week_period: u32,
    /// Extra non-working days, either a list or a whitespace separated string
    #[serde(default, deserialize_with = "dates")]
    pub days_off: Vec<NaiveDate>,
    pub templates_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SlackSettings {
    #[validate(length(min = 1))]
    pub token: String,
    #[validate(length(min = 1))]
    pub hook: String,
    #[validate(length(min = 1))]
    pub channel: String,
    #[serde(default, deserialize_with = "words")]
    pub skip_status_emojis: Vec<String>,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default = "default_icon_emoji")]
    pub icon_emoji: String,
}

fn default_api_base() -> String { "https://slack.com/api".to_string() }
fn default_username() -> String { "coffeeconnection".to_string() }
fn default_icon_emoji() -> String { ":coffee:".to_string() }

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StorageSettings {
    /// File holding the members matched during the current period
    #[validate(length(min = 1))]
    pub match_record: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    /// Also write logs to this file when set
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "compact".to_string() }

/// A single string split on whitespace, or a list of strings
#[derive(Deserialize)]
#[serde(untagged)]
enum WordList {
    Joined(String),
    List(Vec<String>),
}

impl WordList {
    fn into_words(self) -> Vec<String> {
        match self {
            WordList::Joined(s) => s.split_whitespace().map(String::from).collect(),
            WordList::List(items) => items
                .into_iter()
                .map(|item| item.trim().to_string())
                .filter(|item| !item.is_empty())
                .collect(),
        }
    }
}

fn words<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(WordList::deserialize(deserializer)?.into_words())
}

fn dates<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<NaiveDate>, D::Error> {
    words(deserializer)?
        .iter()
        .map(|day| {
            NaiveDate::parse_from_str(day, "%Y-%m-%d")
                .map_err(|e| serde::de::Error::custom(format!("bad day off {}: {}", day, e)))
        })
        .collect()
}

/// Per-user configuration file, extension picked by the `config` crate
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("coffee-match").join("coffee-match"))
}

impl Settings {
    /// Load configuration from files and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Configuration files (config/default, config/local)
    /// 2. The per-user file from [`user_config_path`]
    /// 3. `explicit`, when given (must exist)
    /// 4. Environment variables (prefixed with COFFEE__)
    /// 5. SLACK_TOKEN, when set and non-empty
    pub fn load(explicit: Option<&Path>) -> Result<Self, SettingsError> {
        let mut builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false));

        if let Some(path) = user_config_path() {
            builder = builder.add_source(File::with_name(&path.to_string_lossy()).required(false));
        }
        if let Some(path) = explicit {
            builder = builder.add_source(File::from(path));
        }

        Self::from_builder(builder)
    }

    /// Load configuration from a custom path, with the same environment overrides
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        Self::from_builder(Config::builder().add_source(File::from(path.as_ref())))
    }

    /// Apply the environment overrides on top of the file sources
    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, SettingsError> {
        // e.g., COFFEE__SLACK__TOKEN -> slack.token
        let config = builder.add_source(environment()).build()?;
        let config = substitute_env_vars(config)?;

        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Announcement templates, from `templates_file` or the built-in list
    pub fn templates(&self) -> Result<Templates, SettingsError> {
        match &self.matching.templates_file {
            Some(path) => Ok(Templates::from_file(path)?),
            None => Ok(Templates::default()),
        }
    }

    pub fn slack_options(&self) -> SlackOptions {
        SlackOptions {
            api_base: self.slack.api_base.clone(),
            token: self.slack.token.clone(),
            hook: self.slack.hook.clone(),
            channel: self.slack.channel.clone(),
            username: self.slack.username.clone(),
            icon_emoji: self.slack.icon_emoji.clone(),
            skip_status_emojis: self.slack.skip_status_emojis.clone(),
        }
    }
}

fn environment() -> Environment {
    Environment::with_prefix("COFFEE")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// Let the conventional SLACK_TOKEN variable override the configured token
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    match std::env::var("SLACK_TOKEN") {
        Ok(token) if !token.is_empty() => Config::builder()
            .add_source(settings)
            .set_override("slack.token", token)?
            .build(),
        _ => Ok(settings),
    }
}
