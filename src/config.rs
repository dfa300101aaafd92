//! Configuration for backends and transport behavior

use std::time::Duration;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

pub const ENV_API_URL: &str = "LLM_API_URL";
pub const ENV_MODEL: &str = "LLM_MODEL";
pub const ENV_API_KEY: &str = "LLM_API_KEY";
pub const ENV_TTFB_TIMEOUT_SECS: &str = "LLM_TTFB_TIMEOUT_SECS";
pub const ENV_IDLE_TIMEOUT_SECS: &str = "LLM_IDLE_TIMEOUT_SECS";

pub const FALLBACK_URL: &str
  = "http://padova.zucchetti.it:14000/v1/chat/completions";
pub const FALLBACK_MODEL: &str = "gpt-oss:20b";

pub const DEFAULT_TTFB_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_TEMPERATURE: f32 = 0.1;

/// One chat-completions endpoint, tried in list order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig
{   /// Label used in logs
    pub name: String
  , /// Full chat-completions URL
    pub endpoint_url: String
  , /// Model identifier sent in the request body
    pub model_id: String
  , /// Bearer credential; may be empty for local servers
    #[serde(default)]
    pub api_key: String
}

impl BackendConfig
{   pub fn new(
      name: impl Into<String>
    , endpoint_url: impl Into<String>
    , model_id: impl Into<String>
    , api_key: impl Into<String>
    ) -> Self
    {   BackendConfig
        {   name: name.into()
          , endpoint_url: endpoint_url.into()
          , model_id: model_id.into()
          , api_key: api_key.into()
        }
    }

    /// Endpoint and model must both be present.
    pub fn validate(&self) -> Result<(), crate::error::Error>
    {   let mut missing = vec![];
        if self.endpoint_url.trim().is_empty()
        {   missing.push("endpoint_url");
        }
        if self.model_id.trim().is_empty()
        {   missing.push("model_id");
        }
        if missing.is_empty()
        {   Ok(())
        } else
        {   Err(crate::error::Error::Config(format!(
              "{} is missing {}", self.name, missing.join(", ")
            )))
        }
    }
}

/// Streaming and deadline settings shared by all backends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportConfig
{   /// Deadline for the first streamed byte
    #[serde(default = "default_ttfb_timeout_secs")]
    pub ttfb_timeout_secs: u64
  , /// Optional limit on silence between chunks after the first one
    #[serde(default)]
    pub idle_timeout_secs: Option<u64>
  , /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32
}

fn default_ttfb_timeout_secs() -> u64
{   DEFAULT_TTFB_TIMEOUT_SECS
}

fn default_temperature() -> f32
{   DEFAULT_TEMPERATURE
}

impl TransportConfig
{   pub fn ttfb_timeout(&self) -> Duration
    {   Duration::from_secs(self.ttfb_timeout_secs)
    }

    pub fn idle_timeout(&self) -> Option<Duration>
    {   self.idle_timeout_secs.map(Duration::from_secs)
    }
}

impl Default for TransportConfig
{   fn default() -> Self
    {   TransportConfig
        {   ttfb_timeout_secs: DEFAULT_TTFB_TIMEOUT_SECS
          , idle_timeout_secs: None
          , temperature: DEFAULT_TEMPERATURE
        }
    }
}

/// notellm configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantConfig
{   /// Backends in priority order
    pub backends: Vec<BackendConfig>
  , /// Transport settings
    #[serde(default)]
    pub transport: TransportConfig
}

impl AssistantConfig
{   /// Primary backend from the process environment plus the
    /// built-in fallback.
    pub fn from_env() -> Result<Self, crate::error::Error>
    {   Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env` with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, crate::error::Error>
    where
      F: Fn(&str) -> Option<String>
    {   let get = |key: &str| lookup(key).unwrap_or_default();
        let api_key = get(ENV_API_KEY);

        let primary = BackendConfig::new(
          "primary"
        , get(ENV_API_URL)
        , get(ENV_MODEL)
        , api_key.clone()
        );
        if let Err(e) = primary.validate()
        {   warn!("{}; it will be skipped", e);
        }
        let fallback = BackendConfig::new(
          "fallback"
        , FALLBACK_URL
        , FALLBACK_MODEL
        , api_key
        );

        let mut transport = TransportConfig::default();
        if let Some(secs) = parse_secs(&lookup, ENV_TTFB_TIMEOUT_SECS)?
        {   transport.ttfb_timeout_secs = secs;
        }
        transport.idle_timeout_secs
          = parse_secs(&lookup, ENV_IDLE_TIMEOUT_SECS)?;

        debug!(
          "Loaded configuration from environment (ttfb {}s, idle {:?})",
          transport.ttfb_timeout_secs,
          transport.idle_timeout_secs
        );
        Ok(AssistantConfig
        {   backends: vec![primary, fallback]
          , transport
        })
    }

    /// Loads the whole configuration from JSON.
    pub fn from_json_str(s: &str) -> Result<Self, crate::error::Error>
    {   serde_json::from_str(s).map_err(|e| {
          crate::error::Error::InvalidConfiguration(e.to_string())
        })
    }
}

fn parse_secs<F>(
  lookup: &F
, key: &str
) -> Result<Option<u64>, crate::error::Error>
where
  F: Fn(&str) -> Option<String>
{   match lookup(key)
    {   None => Ok(None)
      , Some(raw) if raw.trim().is_empty() => Ok(None)
      , Some(raw) => raw.trim().parse::<u64>()
          .map(Some)
          .map_err(|_| crate::error::Error::InvalidConfiguration(
            format!("{} must be a whole number of seconds, got {:?}", key, raw)
          ))
    }
}
