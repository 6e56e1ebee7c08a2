//! 주문 처리 계층
//!
//! 입력 검증, 주문 유형별 실행기, 그리고 이를 묶는 주문 관리자

pub mod executor;
pub mod limit;
pub mod manager;
pub mod market;
pub mod validator;

pub use executor::{submit_with_resync, OrderExecutor, MAX_CLOCK_SKEW_RETRIES};
pub use limit::LimitOrderExecutor;
pub use manager::OrderManager;
pub use market::MarketOrderExecutor;
