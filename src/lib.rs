//! 선물 주문 봇 라이브러리
//!
//! 시장가/지정가 주문과 TWAP 분할 실행을 지원하는 Binance USDT-M 선물 주문 시스템입니다.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod exchange;
pub mod models;
pub mod order_core;
pub mod utils;

// 핵심 타입 재노출
pub use crate::error::{TradingError, VenueError};
pub use crate::exchange::traits::VenueGateway;
pub use crate::models::order::{OrderRequest, OrderResult, OrderSide, OrderType, TimeInForce};
pub use crate::models::twap::{TwapRequest, TwapResult};
pub use crate::order_core::manager::OrderManager;

/// 버전 정보
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 결과 타입 별칭
pub type Result<T> = std::result::Result<T, TradingError>;
