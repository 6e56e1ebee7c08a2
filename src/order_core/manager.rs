use std::sync::Arc;

use crate::core::twap_scheduler::{Sleeper, TokioSleeper, TwapScheduler};
use crate::error::TradingError;
use crate::exchange::traits::VenueGateway;
use crate::models::order::{OrderRequest, OrderResult};
use crate::models::twap::{TwapRequest, TwapResult};
use crate::order_core::executor::OrderExecutor;
use crate::order_core::limit::LimitOrderExecutor;
use crate::order_core::market::MarketOrderExecutor;
use crate::order_core::validator;

/// 주문 관리자 - 검증, 주문 실행기, TWAP 스케줄러를 하나의 게이트웨이 위에 묶는다
pub struct OrderManager {
    market: Arc<MarketOrderExecutor>,
    limit: Arc<LimitOrderExecutor>,
    /// 거래 가능한 심볼 캐시. 비어 있으면 심볼 검사를 건너뛴다.
    symbols: Vec<String>,
}

impl OrderManager {
    pub fn new(gateway: Arc<dyn VenueGateway>) -> Self {
        OrderManager {
            market: Arc::new(MarketOrderExecutor::new(gateway.clone())),
            limit: Arc::new(LimitOrderExecutor::new(gateway)),
            symbols: Vec::new(),
        }
    }

    /// 관리자 생성 후 거래소에서 무기한 계약 심볼 목록을 불러온다.
    /// 실패하면 경고만 남기고 빈 캐시로 계속 진행한다.
    pub async fn connect(gateway: Arc<dyn VenueGateway>) -> Self {
        let symbols = match gateway.perpetual_symbols().await {
            Ok(symbols) => {
                log::info!("Loaded {} perpetual symbols", symbols.len());
                symbols
            }
            Err(e) => {
                log::warn!("Could not load exchange info, skipping symbol checks: {}", e);
                Vec::new()
            }
        };
        Self::new(gateway).with_symbols(symbols)
    }

    pub fn with_symbols(mut self, symbols: Vec<String>) -> Self {
        self.symbols = symbols;
        self
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// 시장가 주문
    pub async fn place_market_order(
        &self,
        symbol: &str,
        side: &str,
        quantity: f64,
    ) -> Result<OrderResult, TradingError> {
        let symbol = validator::validate_symbol(symbol, &self.symbols)?;
        let side = validator::validate_side(side)?;
        let quantity = validator::validate_quantity(quantity)?;

        self.market
            .execute(OrderRequest::market(symbol, side, quantity))
            .await
    }

    /// 지정가 주문
    pub async fn place_limit_order(
        &self,
        symbol: &str,
        side: &str,
        quantity: f64,
        price: Option<f64>,
        time_in_force: &str,
    ) -> Result<OrderResult, TradingError> {
        let symbol = validator::validate_symbol(symbol, &self.symbols)?;
        let side = validator::validate_side(side)?;
        let quantity = validator::validate_quantity(quantity)?;
        let price = validator::validate_price(price)?.ok_or_else(|| {
            TradingError::InvalidArgument("Price is required for limit orders.".to_string())
        })?;
        let time_in_force = validator::validate_time_in_force(time_in_force)?;

        self.limit
            .execute(OrderRequest::limit(symbol, side, quantity, price, time_in_force))
            .await
    }

    /// 이 관리자의 실행기를 쓰는 TWAP 스케줄러
    pub fn twap_scheduler(&self, sleeper: Arc<dyn Sleeper>) -> TwapScheduler {
        TwapScheduler::new(self.market.clone(), self.limit.clone()).with_sleeper(sleeper)
    }

    /// TWAP 주문 실행
    pub async fn execute_twap(&self, request: TwapRequest) -> Result<TwapResult, TradingError> {
        self.execute_twap_with(request, Arc::new(TokioSleeper)).await
    }

    pub async fn execute_twap_with(
        &self,
        mut request: TwapRequest,
        sleeper: Arc<dyn Sleeper>,
    ) -> Result<TwapResult, TradingError> {
        request.symbol = validator::validate_symbol(&request.symbol, &self.symbols)?;
        validator::validate_quantity(request.total_quantity)?;
        validator::validate_price(request.limit_price)?;

        self.twap_scheduler(sleeper).execute(request).await
    }
}
