use serde::{Deserialize, Serialize};

use crate::models::order::{OrderResult, OrderSide, OrderType, TimeInForce};

/// TWAP 실행 요청
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TwapRequest {
    pub symbol: String,
    pub side: OrderSide,
    pub total_quantity: f64,
    /// 분할 수
    pub slices: usize,
    /// 분할 주문 사이 대기 시간 (초)
    pub interval_seconds: f64,
    pub order_type: OrderType,
    /// LIMIT 분할 주문에 공통으로 쓰는 지정가
    pub limit_price: Option<f64>,
    pub time_in_force: TimeInForce,
}

impl TwapRequest {
    /// 시장가 분할 주문으로 새 TWAP 요청 생성
    pub fn new(
        symbol: impl Into<String>,
        side: OrderSide,
        total_quantity: f64,
        slices: usize,
        interval_seconds: f64,
    ) -> Self {
        TwapRequest {
            symbol: symbol.into(),
            side,
            total_quantity,
            slices,
            interval_seconds,
            order_type: OrderType::Market,
            limit_price: None,
            time_in_force: TimeInForce::Gtc,
        }
    }

    pub fn with_order_type(mut self, order_type: OrderType) -> Self {
        self.order_type = order_type;
        self
    }

    /// 지정가 분할 주문으로 전환
    pub fn with_limit_price(mut self, limit_price: f64) -> Self {
        self.order_type = OrderType::Limit;
        self.limit_price = Some(limit_price);
        self
    }

    pub fn with_time_in_force(mut self, time_in_force: TimeInForce) -> Self {
        self.time_in_force = time_in_force;
        self
    }
}

/// TWAP 실행 결과. 분할 주문 결과는 제출 순서대로 보관된다.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TwapResult {
    pub request: TwapRequest,
    pub slice_results: Vec<OrderResult>,
}

impl TwapResult {
    pub fn new(request: TwapRequest, slice_results: Vec<OrderResult>) -> Self {
        TwapResult {
            request,
            slice_results,
        }
    }

    /// 모든 분할 주문이 성공했는지 여부
    pub fn is_success(&self) -> bool {
        self.slice_results.iter().all(OrderResult::is_success)
    }

    /// 성공한 분할 주문의 수량 합계
    pub fn executed_quantity(&self) -> f64 {
        self.slice_results
            .iter()
            .filter(|result| result.is_success())
            .map(|result| result.request().quantity)
            .sum()
    }

    pub fn failed_slices(&self) -> usize {
        self.slice_results
            .iter()
            .filter(|result| !result.is_success())
            .count()
    }
}
