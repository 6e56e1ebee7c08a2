//! 거래소 연결 계층
//!
//! 주문 실행기가 사용하는 게이트웨이 인터페이스와 구현체

pub mod binance_futures;
pub mod dry_run;
pub mod mocks;
pub mod payload;
pub mod traits;

pub use binance_futures::BinanceFuturesGateway;
pub use dry_run::DryRunGateway;
pub use payload::{build_order_payload, OrderPayload};
pub use traits::VenueGateway;
