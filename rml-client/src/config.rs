use serde::Deserialize;

use crate::errors::{LmError, LmResult};

pub const DEFAULT_MODEL: &str = "models/text-bison-001";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta3";

/// Connection settings for one language model client.
///
/// Every client owns its own copy, so creating a second client with a
/// different key leaves the first one untouched.
#[derive(Clone, Deserialize)]
pub struct PalmConfig {
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Extra attempts after a transient failure. Zero sends each request once.
    #[serde(default)]
    pub max_retries: usize,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

impl PalmConfig {
    /// The key is not checked here; a bad key is rejected by the service.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: default_model(),
            api_base: default_api_base(),
            max_retries: 0,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Read `PALM_API_KEY` and the optional `PALM_MODEL`, `PALM_API_BASE` and
    /// `PALM_MAX_RETRIES` from the environment (or a `.env` file).
    pub fn from_env() -> LmResult<Self> {
        Self::from_vars(|name| dotenvy::var(name).ok())
    }

    /// Load the configuration from a YAML file.
    pub fn load(yml_path: &str) -> LmResult<Self> {
        let yml = std::fs::read_to_string(yml_path)?;
        let config = serde_yaml::from_str(&yml)?;
        Ok(config)
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> LmResult<Self> {
        let api_key = var("PALM_API_KEY").ok_or_else(|| {
            LmError::Config("Could not find PALM_API_KEY in the environment.".to_string())
        })?;
        let mut config = Self::new(api_key);
        if let Some(model) = var("PALM_MODEL") {
            config.model = model;
        }
        if let Some(api_base) = var("PALM_API_BASE") {
            config.api_base = api_base;
        }
        if let Some(retries) = var("PALM_MAX_RETRIES") {
            config.max_retries = retries.trim().parse().map_err(|_| {
                LmError::Config(format!("PALM_MAX_RETRIES is not a number: {retries:?}"))
            })?;
        }
        Ok(config)
    }
}

impl std::fmt::Debug for PalmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PalmConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}
