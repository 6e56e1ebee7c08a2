//! 주문 및 TWAP 요청/결과 모델

pub mod order;
pub mod twap;
