use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use crate::error::{TradingError, VenueError};
use crate::exchange::payload::OrderPayload;
use crate::exchange::traits::VenueGateway;
use crate::utils::current_timestamp_ms;

/// A no-op venue connector that accepts orders locally without sending them
pub struct DryRunGateway {
  order_id_counter: AtomicU64,
  time_offset: AtomicI64,
}

impl DryRunGateway {
  pub fn new() -> Self {
    DryRunGateway {
      order_id_counter: AtomicU64::new(0),
      time_offset: AtomicI64::new(0),
    }
  }
}

impl Default for DryRunGateway {
  fn default() -> Self { Self::new() }
}

#[async_trait]
impl VenueGateway for DryRunGateway {
  async fn submit_order(&self, payload: &OrderPayload) -> Result<Value, VenueError> {
    let order_id = self.order_id_counter.fetch_add(1, Ordering::Relaxed) + 1;
    let status = match payload.get("type").and_then(|t| t.as_str()) {
      Some("MARKET") => "FILLED",
      _ => "NEW",
    };
    Ok(json!({
      "orderId": order_id,
      "clientOrderId": format!("dry-{}", order_id),
      "symbol": payload.get("symbol").cloned().unwrap_or(Value::Null),
      "side": payload.get("side").cloned().unwrap_or(Value::Null),
      "type": payload.get("type").cloned().unwrap_or(Value::Null),
      "origQty": payload.get("quantity").cloned().unwrap_or(Value::Null),
      "price": payload.get("price").cloned().unwrap_or(Value::Null),
      "status": status,
      "updateTime": current_timestamp_ms(),
      "dryRun": true,
    }))
  }

  async fn server_time(&self) -> Result<i64, TradingError> { Ok(current_timestamp_ms()) }

  fn time_offset(&self) -> i64 { self.time_offset.load(Ordering::Relaxed) }

  fn set_time_offset(&self, offset_ms: i64) { self.time_offset.store(offset_ms, Ordering::Relaxed); }
}
