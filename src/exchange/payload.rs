use serde_json::{Map, Value};

use crate::error::TradingError;
use crate::models::order::{OrderRequest, OrderType, TimeInForce};

/// Flat key/value order payload sent to the venue
pub type OrderPayload = Map<String, Value>;

/// Build the venue payload for a request.
///
/// MARKET payloads never carry price or timeInForce. LIMIT payloads require a price and
/// default timeInForce to GTC. Extra params are merged last and may overwrite any key.
pub fn build_order_payload(
    request: &OrderRequest,
    order_type: OrderType,
) -> Result<OrderPayload, TradingError> {
    let mut payload = Map::new();
    payload.insert("symbol".into(), Value::from(request.symbol.clone()));
    payload.insert("side".into(), Value::from(request.side.as_str()));
    payload.insert("type".into(), Value::from(order_type.as_str()));
    payload.insert("quantity".into(), Value::from(request.quantity));

    if order_type == OrderType::Limit {
        let price = request.price.ok_or_else(|| {
            TradingError::InvalidArgument("Limit orders require a price.".to_string())
        })?;
        let time_in_force = request.time_in_force.unwrap_or(TimeInForce::Gtc);
        payload.insert("price".into(), Value::from(price));
        payload.insert("timeInForce".into(), Value::from(time_in_force.as_str()));
    }

    if request.reduce_only {
        payload.insert("reduceOnly".into(), Value::Bool(true));
    }
    if request.close_position {
        payload.insert("closePosition".into(), Value::Bool(true));
    }

    if let Some(extra) = &request.extra_params {
        for (key, value) in extra {
            payload.insert(key.clone(), value.clone());
        }
    }

    Ok(payload)
}

/// Render a payload value the way it goes on the wire (no JSON quoting for strings)
pub fn wire_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::order::OrderSide;
    use serde_json::json;

    #[test]
    fn test_market_payload_omits_price_and_tif() {
        let request = OrderRequest::limit("BTCUSDT", OrderSide::Buy, 0.01, 50000.0, TimeInForce::Ioc);
        let payload = build_order_payload(&request, OrderType::Market).unwrap();

        assert_eq!(payload["symbol"], json!("BTCUSDT"));
        assert_eq!(payload["side"], json!("BUY"));
        assert_eq!(payload["type"], json!("MARKET"));
        assert_eq!(payload["quantity"], json!(0.01));
        assert!(!payload.contains_key("price"));
        assert!(!payload.contains_key("timeInForce"));
    }

    #[test]
    fn test_limit_payload_defaults_tif_to_gtc() {
        let mut request = OrderRequest::limit("ETHUSDT", OrderSide::Sell, 1.5, 3200.5, TimeInForce::Fok);
        request.time_in_force = None;
        let payload = build_order_payload(&request, OrderType::Limit).unwrap();

        assert_eq!(payload["type"], json!("LIMIT"));
        assert_eq!(payload["price"], json!(3200.5));
        assert_eq!(payload["timeInForce"], json!("GTC"));
    }

    #[test]
    fn test_limit_payload_without_price_is_invalid() {
        let request = OrderRequest::market("ETHUSDT", OrderSide::Sell, 1.5);
        let result = build_order_payload(&request, OrderType::Limit);

        assert!(matches!(result, Err(TradingError::InvalidArgument(_))));
    }

    #[test]
    fn test_extra_params_overwrite_standard_keys() {
        let request = OrderRequest::market("BTCUSDT", OrderSide::Buy, 0.01)
            .with_reduce_only(true)
            .with_extra_param("quantity", "0.02")
            .with_extra_param("positionSide", "LONG");
        let payload = build_order_payload(&request, OrderType::Market).unwrap();

        assert_eq!(payload["quantity"], json!("0.02"));
        assert_eq!(payload["positionSide"], json!("LONG"));
        assert_eq!(payload["reduceOnly"], json!(true));
    }

    #[test]
    fn test_close_position_flag_is_sent_only_when_set() {
        let request = OrderRequest::market("BTCUSDT", OrderSide::Sell, 0.01).with_close_position(true);
        let payload = build_order_payload(&request, OrderType::Market).unwrap();

        assert_eq!(payload["closePosition"], json!(true));
        assert!(!payload.contains_key("reduceOnly"));

        let reopened = request.with_close_position(false);
        let payload = build_order_payload(&reopened, OrderType::Market).unwrap();
        assert!(!payload.contains_key("closePosition"));
    }

    #[test]
    fn test_wire_value() {
        assert_eq!(wire_value(&json!("BTCUSDT")), "BTCUSDT");
        assert_eq!(wire_value(&json!(0.5)), "0.5");
        assert_eq!(wire_value(&json!(true)), "true");
    }
}
