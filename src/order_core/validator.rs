//! 주문 입력 검증
//!
//! 네트워크 호출 전에 심볼, 방향, 수량, 가격, 주문 유지 정책을 정규화하고 범위를 검사한다.
//! 모든 실패는 `TradingError::InvalidArgument` 로 보고된다.

use crate::error::TradingError;
use crate::models::order::{OrderSide, OrderType, TimeInForce};

fn invalid(message: impl Into<String>) -> TradingError {
    TradingError::InvalidArgument(message.into())
}

/// 심볼 정규화 (공백 제거 후 대문자)
pub fn normalize_symbol(symbol: &str) -> Result<String, TradingError> {
    let trimmed = symbol.trim();
    if trimmed.is_empty() {
        return Err(invalid("Symbol must be a non-empty string."));
    }
    Ok(trimmed.to_uppercase())
}

/// 심볼 정규화 후 거래 가능한 심볼 목록에 있는지 확인. 목록이 비어 있으면 검사하지 않는다.
pub fn validate_symbol(symbol: &str, available: &[String]) -> Result<String, TradingError> {
    let normalized = normalize_symbol(symbol)?;
    if !available.is_empty() && !available.iter().any(|s| s.eq_ignore_ascii_case(&normalized)) {
        return Err(invalid(format!(
            "Symbol '{}' is not in cached exchange info list.",
            normalized
        )));
    }
    Ok(normalized)
}

/// 주문 방향 검증
pub fn validate_side(side: &str) -> Result<OrderSide, TradingError> {
    side.to_uppercase().parse()
}

/// 수량 검증
pub fn validate_quantity(quantity: f64) -> Result<f64, TradingError> {
    if !quantity.is_finite() {
        return Err(invalid("Quantity must be a number."));
    }
    if quantity <= 0.0 {
        return Err(invalid("Quantity must be greater than zero."));
    }
    Ok(quantity)
}

/// 문자열 수량 파싱 후 검증
pub fn parse_quantity(quantity: &str) -> Result<f64, TradingError> {
    let value = quantity
        .trim()
        .parse::<f64>()
        .map_err(|_| invalid("Quantity must be a number."))?;
    validate_quantity(value)
}

/// 가격 검증. 가격이 없으면 (시장가 주문) 그대로 통과
pub fn validate_price(price: Option<f64>) -> Result<Option<f64>, TradingError> {
    match price {
        None => Ok(None),
        Some(p) if !p.is_finite() => Err(invalid("Price must be a number when provided.")),
        Some(p) if p <= 0.0 => Err(invalid("Price must be greater than zero.")),
        Some(p) => Ok(Some(p)),
    }
}

/// 문자열 가격 파싱 후 검증
pub fn parse_price(price: &str) -> Result<f64, TradingError> {
    let value = price
        .trim()
        .parse::<f64>()
        .map_err(|_| invalid("Price must be a number when provided."))?;
    validate_price(Some(value))?.ok_or_else(|| invalid("Price is required for limit orders."))
}

/// 주문 유지 정책 검증 (GTC, IOC, FOK)
pub fn validate_time_in_force(time_in_force: &str) -> Result<TimeInForce, TradingError> {
    time_in_force.to_uppercase().parse()
}

/// 주문 유형 검증 (MARKET, LIMIT)
pub fn validate_order_type(order_type: &str) -> Result<OrderType, TradingError> {
    order_type.trim().to_uppercase().parse()
}
