//! 수량 계산 유틸리티

use crate::error::TradingError;

/// 주문 수량 정밀도 (소수점 자리수)
pub const QUANTITY_PRECISION: usize = 8;

/// 소수점 `decimals` 자리로 반올림.
///
/// 이진 값 그대로를 십진수로 반올림하고, 정확히 중간이면 짝수 쪽으로 보낸다.
pub fn round_to(value: f64, decimals: usize) -> Result<f64, TradingError> {
  format!("{:.*}", decimals, value)
    .parse::<f64>()
    .map_err(|e| TradingError::ParseError(format!("cannot round {}: {}", value, e)))
}

/// 주문 수량 정밀도로 반올림
pub fn round_quantity(quantity: f64) -> Result<f64, TradingError> {
  round_to(quantity, QUANTITY_PRECISION)
}
