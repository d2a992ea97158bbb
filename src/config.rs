//! Runtime configuration read from the environment.

use crate::models::DEFAULT_CHALLENGE_TTL_HOURS;
use std::env;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a number, got {value:?}")]
    NotANumber { name: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    NotPositive(&'static str),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub match_api_url: String,
    pub match_api_token: String,
    /// Player names are only looked up on Steam when a key is set.
    pub steam_api_key: Option<String>,
    pub challenge_ttl_hours: i64,
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::NotANumber { name, value }),
        Err(_) => Ok(default),
    }
}

impl Config {
    /// HOST, PORT, MATCH_API_URL, MATCH_API_TOKEN, STEAM_API_KEY, CHALLENGE_TTL_HOURS.
    pub fn from_env() -> Result<Self, ConfigError> {
        let challenge_ttl_hours = parse_var("CHALLENGE_TTL_HOURS", DEFAULT_CHALLENGE_TTL_HOURS)?;
        if challenge_ttl_hours <= 0 {
            return Err(ConfigError::NotPositive("CHALLENGE_TTL_HOURS"));
        }
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_var("PORT", 8080)?,
            match_api_url: env::var("MATCH_API_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:9000/api".to_string()),
            match_api_token: env::var("MATCH_API_TOKEN").unwrap_or_default(),
            steam_api_key: env::var("STEAM_API_KEY").ok().filter(|k| !k.is_empty()),
            challenge_ttl_hours,
        })
    }
}
