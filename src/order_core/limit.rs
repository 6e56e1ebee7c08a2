use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TradingError;
use crate::exchange::traits::VenueGateway;
use crate::models::order::{OrderRequest, OrderResult, OrderType};
use crate::order_core::executor::{run_order, OrderExecutor};

/// 지정가 주문 실행기. 가격이 없는 요청은 거래소 호출 전에 거절한다.
pub struct LimitOrderExecutor {
    gateway: Arc<dyn VenueGateway>,
}

impl LimitOrderExecutor {
    pub fn new(gateway: Arc<dyn VenueGateway>) -> Self {
        LimitOrderExecutor { gateway }
    }
}

#[async_trait]
impl OrderExecutor for LimitOrderExecutor {
    async fn execute(&self, request: OrderRequest) -> Result<OrderResult, TradingError> {
        if request.price.is_none() {
            return Err(TradingError::InvalidArgument(
                "Limit orders require a price.".to_string(),
            ));
        }
        run_order(self.gateway.as_ref(), OrderType::Limit, request).await
    }
}
