use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::{TradingError, VenueError};

/// 거래소에 그대로 전달되는 추가 파라미터
pub type ExtraParams = Map<String, Value>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "BUY",
            OrderSide::Sell => "SELL",
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderSide {
    type Err = TradingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BUY" => Ok(OrderSide::Buy),
            "SELL" => Ok(OrderSide::Sell),
            other => Err(TradingError::InvalidArgument(format!(
                "Side must be BUY or SELL. Got '{}'.",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    Market,
    Limit,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Market => "MARKET",
            OrderType::Limit => "LIMIT",
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderType {
    type Err = TradingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MARKET" => Ok(OrderType::Market),
            "LIMIT" => Ok(OrderType::Limit),
            other => Err(TradingError::InvalidArgument(format!(
                "Unsupported order type '{}'. Use MARKET or LIMIT.",
                other
            ))),
        }
    }
}

/// 주문 유지 정책
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum TimeInForce {
    /// Good Till Cancelled
    #[default]
    Gtc,
    /// Immediate Or Cancel
    Ioc,
    /// Fill Or Kill
    Fok,
}

impl TimeInForce {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeInForce::Gtc => "GTC",
            TimeInForce::Ioc => "IOC",
            TimeInForce::Fok => "FOK",
        }
    }
}

impl fmt::Display for TimeInForce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeInForce {
    type Err = TradingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GTC" => Ok(TimeInForce::Gtc),
            "IOC" => Ok(TimeInForce::Ioc),
            "FOK" => Ok(TimeInForce::Fok),
            other => Err(TradingError::InvalidArgument(format!(
                "Time in force must be one of GTC, IOC, FOK. Got '{}'.",
                other
            ))),
        }
    }
}

/// 주문 제출 요청
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderRequest {
    pub symbol: String,
    pub side: OrderSide,
    pub quantity: f64,
    pub price: Option<f64>,
    pub time_in_force: Option<TimeInForce>,
    pub reduce_only: bool,
    pub close_position: bool,
    pub extra_params: Option<ExtraParams>,
}

impl OrderRequest {
    /// 시장가 주문 요청 생성
    pub fn market(symbol: impl Into<String>, side: OrderSide, quantity: f64) -> Self {
        OrderRequest {
            symbol: symbol.into(),
            side,
            quantity,
            price: None,
            time_in_force: None,
            reduce_only: false,
            close_position: false,
            extra_params: None,
        }
    }

    /// 지정가 주문 요청 생성
    pub fn limit(
        symbol: impl Into<String>,
        side: OrderSide,
        quantity: f64,
        price: f64,
        time_in_force: TimeInForce,
    ) -> Self {
        OrderRequest {
            price: Some(price),
            time_in_force: Some(time_in_force),
            ..Self::market(symbol, side, quantity)
        }
    }

    pub fn with_time_in_force(mut self, time_in_force: TimeInForce) -> Self {
        self.time_in_force = Some(time_in_force);
        self
    }

    pub fn with_reduce_only(mut self, reduce_only: bool) -> Self {
        self.reduce_only = reduce_only;
        self
    }

    pub fn with_close_position(mut self, close_position: bool) -> Self {
        self.close_position = close_position;
        self
    }

    pub fn with_extra_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra_params
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }
}

/// 주문 실행 결과. 성공 여부는 오류 메시지 유무로 결정된다.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OrderResult {
    request: OrderRequest,
    raw_response: Value,
    error_message: Option<String>,
}

impl OrderResult {
    pub fn success(request: OrderRequest, raw_response: Value) -> Self {
        OrderResult {
            request,
            raw_response,
            error_message: None,
        }
    }

    /// 거래소 오류로부터 실패 결과 생성. 오류 본문이 없으면 빈 객체를 남긴다.
    pub fn failure(request: OrderRequest, error: &VenueError) -> Self {
        OrderResult {
            request,
            raw_response: error
                .body
                .clone()
                .unwrap_or_else(|| Value::Object(Map::new())),
            error_message: Some(error.to_string()),
        }
    }

    pub fn request(&self) -> &OrderRequest {
        &self.request
    }

    pub fn raw_response(&self) -> &Value {
        &self.raw_response
    }

    pub fn is_success(&self) -> bool {
        self.error_message.is_none()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_limit_request_carries_price_and_tif() {
        let request = OrderRequest::limit("BTCUSDT", OrderSide::Sell, 0.5, 65000.0, TimeInForce::Ioc);

        assert_eq!(request.price, Some(65000.0));
        assert_eq!(request.time_in_force, Some(TimeInForce::Ioc));
        assert!(!request.reduce_only);
        assert!(request.extra_params.is_none());
    }

    #[test]
    fn test_extra_params_accumulate() {
        let request = OrderRequest::market("ETHUSDT", OrderSide::Buy, 1.0)
            .with_extra_param("newClientOrderId", "abc")
            .with_extra_param("positionSide", "LONG");

        let extra = request.extra_params.unwrap();
        assert_eq!(extra.get("newClientOrderId"), Some(&json!("abc")));
        assert_eq!(extra.len(), 2);
    }

    #[test]
    fn test_success_result_has_no_error_message() {
        let result = OrderResult::success(
            OrderRequest::market("BTCUSDT", OrderSide::Buy, 0.01),
            json!({"orderId": 1}),
        );

        assert!(result.is_success());
        assert!(result.error_message().is_none());
    }

    #[test]
    fn test_failure_result_uses_error_body_or_empty_payload() {
        let request = OrderRequest::market("BTCUSDT", OrderSide::Buy, 0.01);

        let with_body = OrderResult::failure(
            request.clone(),
            &VenueError::from_body(json!({"code": -2019, "msg": "Margin is insufficient."})),
        );
        assert!(!with_body.is_success());
        assert_eq!(with_body.raw_response()["code"], json!(-2019));
        assert_eq!(
            with_body.error_message(),
            Some("APIError(code=-2019): Margin is insufficient.")
        );

        let without_body = OrderResult::failure(request, &VenueError::without_code("timeout"));
        assert_eq!(without_body.raw_response(), &json!({}));
        assert_eq!(without_body.error_message(), Some("timeout"));
    }

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(serde_json::to_value(OrderSide::Sell).unwrap(), json!("SELL"));
        assert_eq!(serde_json::to_value(TimeInForce::Fok).unwrap(), json!("FOK"));
        assert_eq!("LIMIT".parse::<OrderType>().unwrap(), OrderType::Limit);
        assert!("STOP".parse::<OrderType>().is_err());
    }
}
