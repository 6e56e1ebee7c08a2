/**
* filename : config
* author : HAMA
* date: 2025. 5. 8.
* description:
**/

use serde::{Deserialize, Serialize};
use std::env;

use crate::error::TradingError;

pub const TESTNET_FUTURES_URL: &str = "https://testnet.binancefuture.com";
pub const LIVE_FUTURES_URL: &str = "https://fapi.binance.com";
pub const DEFAULT_RECV_WINDOW_MS: u64 = 5000;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub exchange: ExchangeConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeConfig {
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub testnet: bool,
    pub recv_window: u64,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file_path: Option<String>,
}

impl Config {
    /// Load configuration from `config.{json,toml,yaml}` if present, then apply env overrides
    pub fn load() -> Result<Self, TradingError> {
        Self::load_from("config")
    }

    pub fn load_from(basename: &str) -> Result<Self, TradingError> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::with_name(basename).required(false))
            .build()
            .map_err(|e| TradingError::ConfigError(format!("Failed to read config file: {}", e)))?;

        let mut cfg: Config = settings
            .try_deserialize()
            .map_err(|e| TradingError::ConfigError(format!("Failed to parse config file: {}", e)))?;

        cfg.apply_env_overrides()?;
        Ok(cfg)
    }

    /// Apply environment variable overrides for sensitive/runtime fields
    fn apply_env_overrides(&mut self) -> Result<(), TradingError> {
        self.apply_overrides(|key| env::var(key).ok())
    }

    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), TradingError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(v) = lookup("BINANCE_API_KEY") { self.exchange.api_key = Some(v); }
        if let Some(v) = lookup("BINANCE_API_SECRET") { self.exchange.api_secret = Some(v); }
        if let Some(v) = lookup("BINANCE_BASE_URL") { self.exchange.base_url = Some(v); }
        if let Some(v) = lookup("BINANCE_TESTNET") {
            let lower = v.to_lowercase();
            self.exchange.testnet = ["1", "true", "yes", "on"].contains(&lower.as_str());
        }
        if let Some(v) = lookup("BINANCE_RECV_WINDOW") {
            self.exchange.recv_window = v.trim().parse().map_err(|_| {
                TradingError::ConfigError(format!("BINANCE_RECV_WINDOW must be an integer, got '{}'", v))
            })?;
        }
        if let Some(v) = lookup("RUST_LOG") { self.logging.level = v; }
        if let Some(v) = lookup("BOT_LOG_FILE") { self.logging.file_path = Some(v); }

        Ok(())
    }
}

impl ExchangeConfig {
    pub fn has_credentials(&self) -> bool {
        self.credentials().is_ok()
    }

    /// API 키와 시크릿 반환. 둘 중 하나라도 없으면 설정 오류
    pub fn credentials(&self) -> Result<(&str, &str), TradingError> {
        match (self.api_key.as_deref(), self.api_secret.as_deref()) {
            (Some(key), Some(secret)) if !key.is_empty() && !secret.is_empty() => Ok((key, secret)),
            _ => Err(TradingError::ConfigError(
                "BINANCE_API_KEY and BINANCE_API_SECRET must be set as environment variables.".to_string(),
            )),
        }
    }

    /// 사용할 REST base URL (override > testnet > live)
    pub fn effective_base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None if self.testnet => TESTNET_FUTURES_URL.to_string(),
            None => LIVE_FUTURES_URL.to_string(),
        }
    }
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        ExchangeConfig {
            api_key: None,
            api_secret: None,
            testnet: true,
            recv_window: DEFAULT_RECV_WINDOW_MS,
            base_url: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
            file_path: None,
        }
    }
}
