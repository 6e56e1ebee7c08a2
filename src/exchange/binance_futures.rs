use async_trait::async_trait;
use hmac::{Hmac, Mac};
use reqwest::Url;
use serde_json::{json, Value};
use sha2::Sha256;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::config::ExchangeConfig;
use crate::error::{TradingError, VenueError};
use crate::exchange::payload::{wire_value, OrderPayload};
use crate::exchange::traits::VenueGateway;
use crate::utils::current_timestamp_ms;

type HmacSha256 = Hmac<Sha256>;

/// Binance USDT-M Futures REST connector (order placement subset)
pub struct BinanceFuturesGateway {
  base_url: String,
  api_key: String,
  api_secret: String,
  recv_window: u64,
  time_offset: AtomicI64,
  http: reqwest::Client,
}

impl BinanceFuturesGateway {
  pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
    BinanceFuturesGateway {
      base_url: base_url.into().trim_end_matches('/').to_string(),
      api_key: api_key.into(),
      api_secret: api_secret.into(),
      recv_window: crate::config::DEFAULT_RECV_WINDOW_MS,
      time_offset: AtomicI64::new(0),
      http: reqwest::Client::new(),
    }
  }

  pub fn from_config(config: &ExchangeConfig) -> Result<Self, TradingError> {
    let (api_key, api_secret) = config.credentials()?;
    let base_url = config.effective_base_url();
    if config.testnet && config.base_url.is_none() {
      log::info!("Using Binance Futures testnet endpoint at {}", base_url);
    } else {
      log::info!("Using Binance Futures endpoint at {}", base_url);
    }
    Ok(Self::new(base_url, api_key, api_secret).with_recv_window(config.recv_window))
  }

  pub fn with_recv_window(mut self, recv_window: u64) -> Self {
    self.recv_window = recv_window;
    self
  }

  fn timestamp_ms(&self) -> i64 {
    current_timestamp_ms() + self.time_offset()
  }

  fn sign(&self, query: &str) -> Result<String, VenueError> {
    let mut mac = HmacSha256::new_from_slice(self.api_secret.as_bytes())
      .map_err(|e| VenueError::without_code(format!("invalid api secret: {}", e)))?;
    mac.update(query.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
  }

  fn endpoint(&self, path: &str) -> Result<Url, TradingError> {
    Url::parse(&format!("{}{}", self.base_url, path))
      .map_err(|e| TradingError::ConfigError(format!("invalid base url '{}': {}", self.base_url, e)))
  }

  /// Build the signed order URL: payload params, recvWindow, timestamp, then signature
  fn signed_order_url(&self, payload: &OrderPayload, timestamp: i64) -> Result<Url, VenueError> {
    let mut url = self
      .endpoint("/fapi/v1/order")
      .map_err(|e| VenueError::without_code(e.to_string()))?;
    url
      .query_pairs_mut()
      .extend_pairs(payload.iter().map(|(k, v)| (k.as_str(), wire_value(v))))
      .append_pair("recvWindow", &self.recv_window.to_string())
      .append_pair("timestamp", &timestamp.to_string());
    let query = url.query().unwrap_or_default().to_string();
    let signature = self.sign(&query)?;
    url.query_pairs_mut().append_pair("signature", &signature);
    Ok(url)
  }

  async fn get_json(&self, path: &str) -> Result<Value, TradingError> {
    let url = self.endpoint(path)?;
    let res = self.http.get(url)
      .send().await
      .map_err(|e| TradingError::Http(format!("{} http error: {}", path, e)))?;
    let status = res.status();
    let json = res.json::<Value>().await
      .map_err(|e| TradingError::Http(format!("{} parse error: {}", path, e)))?;
    if !status.is_success() {
      return Err(VenueError::from_body(json).into());
    }
    Ok(json)
  }
}

#[async_trait]
impl VenueGateway for BinanceFuturesGateway {
  async fn submit_order(&self, payload: &OrderPayload) -> Result<Value, VenueError> {
    let url = self.signed_order_url(payload, self.timestamp_ms())?;
    let res = self.http
      .post(url)
      .header("X-MBX-APIKEY", &self.api_key)
      .send().await
      .map_err(|e| VenueError::without_code(format!("submit_order http error: {}", e)))?;
    let status = res.status();
    let text = res.text().await
      .map_err(|e| VenueError::without_code(format!("submit_order read error: {}", e)))?;
    let body = serde_json::from_str::<Value>(&text)
      .unwrap_or_else(|_| json!({ "msg": format!("HTTP {}: {}", status, text) }));
    if !status.is_success() {
      return Err(VenueError::from_body(body));
    }
    Ok(body)
  }

  async fn server_time(&self) -> Result<i64, TradingError> {
    let json = self.get_json("/fapi/v1/time").await?;
    json.get("serverTime")
      .and_then(|v| v.as_i64())
      .ok_or_else(|| TradingError::ParseError(format!("serverTime missing in {}", json)))
  }

  fn time_offset(&self) -> i64 {
    self.time_offset.load(Ordering::Relaxed)
  }

  fn set_time_offset(&self, offset_ms: i64) {
    self.time_offset.store(offset_ms, Ordering::Relaxed);
  }

  async fn perpetual_symbols(&self) -> Result<Vec<String>, TradingError> {
    let json = self.get_json("/fapi/v1/exchangeInfo").await?;
    let symbols = json.get("symbols")
      .and_then(|v| v.as_array())
      .map(|entries| {
        entries.iter()
          .filter(|entry| entry.get("contractType").and_then(|c| c.as_str()) == Some("PERPETUAL"))
          .filter_map(|entry| entry.get("symbol").and_then(|s| s.as_str()).map(str::to_string))
          .collect()
      })
      .unwrap_or_default();
    Ok(symbols)
  }
}
