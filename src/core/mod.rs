//! 주문 실행 알고리즘의 핵심 구현체

pub mod twap_scheduler;

pub use twap_scheduler::{compute_slice_sizes, validate_twap_request, Sleeper, TokioSleeper, TwapScheduler};
