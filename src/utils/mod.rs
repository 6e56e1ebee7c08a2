//! 공통 유틸리티
//!
//! 서명 timestamp 와 서버 시간 오프셋 계산에 쓰는 현재 시각, 수량 반올림, 로깅

pub mod logging;
pub mod math;

use chrono::{DateTime, Utc};

/// DateTime<Utc>를 타임스탬프(밀리초)로 변환
pub fn datetime_to_timestamp(dt: DateTime<Utc>) -> i64 {
  dt.timestamp_millis()
}

/// 현재 시간을 타임스탬프(밀리초)로 반환
pub fn current_timestamp_ms() -> i64 {
  datetime_to_timestamp(Utc::now())
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  #[test]
  fn test_datetime_to_timestamp() {
    let dt = Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 20).unwrap();
    assert_eq!(datetime_to_timestamp(dt), 1_700_000_000_000);
  }

  #[test]
  fn test_current_timestamp_is_after_fixed_point() {
    assert!(current_timestamp_ms() > 1_700_000_000_000);
  }
}
