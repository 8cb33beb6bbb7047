use std::path::PathBuf;

use thiserror::Error;
use tracing::{info, warn};

use crate::gemini::{DEFAULT_API_BASE, DEFAULT_MODEL};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_STATIC_DIR: &str = "public";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("GEMINI_API_KEY is not set. Get one from Google AI Studio (https://aistudio.google.com/) and add it to .env.")]
    MissingApiKey,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_key: String,
    pub model: String,
    pub api_base: String,
    pub port: u16,
    pub static_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("GEMINI_API_KEY")
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let model = lookup("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let api_base = lookup("GEMINI_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let port = match lookup("PORT") {
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                warn!("Invalid PORT value {raw:?}: {e}, using default {DEFAULT_PORT}");
                DEFAULT_PORT
            }),
            None => {
                info!("PORT not set, using default: {DEFAULT_PORT}");
                DEFAULT_PORT
            }
        };
        let static_dir = lookup("STATIC_DIR").unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string()).into();

        Ok(Self { api_key, model, api_base, port, static_dir })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn missing_api_key_is_fatal() {
        assert_eq!(Config::from_lookup(lookup_from(&[])), Err(ConfigError::MissingApiKey));
        assert_eq!(Config::from_lookup(lookup_from(&[("GEMINI_API_KEY", "   ")])), Err(ConfigError::MissingApiKey));
    }

    #[test]
    fn defaults_fill_optional_values() {
        let config = Config::from_lookup(lookup_from(&[("GEMINI_API_KEY", "abc")])).unwrap();
        assert_eq!(config, Config {
            api_key: "abc".into(),
            model: DEFAULT_MODEL.into(),
            api_base: DEFAULT_API_BASE.into(),
            port: DEFAULT_PORT,
            static_dir: PathBuf::from("public"),
        });
    }

    #[test]
    fn overrides_are_honoured_and_bad_port_falls_back() {
        let config = Config::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", "abc"),
            ("GEMINI_MODEL", "gemini-2.0-flash"),
            ("PORT", "8080"),
            ("STATIC_DIR", "/srv/www"),
        ]))
        .unwrap();
        assert_eq!(config.model, "gemini-2.0-flash");
        assert_eq!(config.port, 8080);
        assert_eq!(config.static_dir, PathBuf::from("/srv/www"));

        let config = Config::from_lookup(lookup_from(&[("GEMINI_API_KEY", "abc"), ("PORT", "http")])).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
    }
}
