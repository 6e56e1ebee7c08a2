use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TradingError;
use crate::exchange::traits::VenueGateway;
use crate::models::order::{OrderRequest, OrderResult, OrderType};
use crate::order_core::executor::{run_order, OrderExecutor};

/// 시장가 주문 실행기
pub struct MarketOrderExecutor {
    gateway: Arc<dyn VenueGateway>,
}

impl MarketOrderExecutor {
    pub fn new(gateway: Arc<dyn VenueGateway>) -> Self {
        MarketOrderExecutor { gateway }
    }
}

#[async_trait]
impl OrderExecutor for MarketOrderExecutor {
    async fn execute(&self, request: OrderRequest) -> Result<OrderResult, TradingError> {
        run_order(self.gateway.as_ref(), OrderType::Market, request).await
    }
}
