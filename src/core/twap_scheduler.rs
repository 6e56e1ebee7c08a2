/**
* filename : twap_scheduler
* author : HAMA
* date: 2025. 5. 12.
* description:
**/

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::TradingError;
use crate::models::order::{OrderRequest, OrderType};
use crate::models::twap::{TwapRequest, TwapResult};
use crate::order_core::executor::OrderExecutor;
use crate::utils::math::round_quantity;

/// 분할 주문 사이 대기 방식
#[async_trait]
pub trait Sleeper: Send + Sync {
  async fn sleep(&self, duration: Duration);
}

/// tokio 타이머로 실제 대기
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
  async fn sleep(&self, duration: Duration) {
    tokio::time::sleep(duration).await;
  }
}

/// TWAP 스케줄러. 분할 주문을 고정 간격으로 하나씩 순서대로 제출한다.
pub struct TwapScheduler {
  /// 시장가 분할 주문 실행기
  market_executor: Arc<dyn OrderExecutor>,
  /// 지정가 분할 주문 실행기
  limit_executor: Arc<dyn OrderExecutor>,
  sleeper: Arc<dyn Sleeper>,
}

impl TwapScheduler {
  /// 새 TWAP 스케줄러 생성
  pub fn new(market_executor: Arc<dyn OrderExecutor>, limit_executor: Arc<dyn OrderExecutor>) -> Self {
    TwapScheduler {
      market_executor,
      limit_executor,
      sleeper: Arc::new(TokioSleeper),
    }
  }

  pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
    self.sleeper = sleeper;
    self
  }

  /// TWAP 실행.
  ///
  /// 요청이 잘못된 경우에만 `Err` 를 반환한다. 분할 주문 실패는 결과에 기록되고
  /// 나머지 분할 주문은 계속 제출된다.
  pub async fn execute(&self, request: TwapRequest) -> Result<TwapResult, TradingError> {
    validate_twap_request(&request)?;
    let interval = Duration::try_from_secs_f64(request.interval_seconds)
      .map_err(|e| TradingError::InvalidArgument(format!("TWAP interval is out of range: {}", e)))?;

    let slice_sizes = compute_slice_sizes(request.total_quantity, request.slices)?;
    let total_slices = slice_sizes.len();
    let run_id = Uuid::new_v4();

    log::info!(
      "[{}] Submitting TWAP order: {} slices of ~{} {} at {}s intervals.",
      run_id,
      total_slices,
      request.total_quantity / total_slices as f64,
      request.symbol,
      request.interval_seconds,
    );

    let mut slice_results = Vec::with_capacity(total_slices);

    for (idx, quantity) in slice_sizes.into_iter().enumerate() {
      let slice_no = idx + 1;
      let (executor, slice_request) = self.slice_order(&request, quantity)?;

      match request.limit_price {
        Some(price) if request.order_type == OrderType::Limit => {
          log::info!("[{}] TWAP slice {}/{}: quantity={} @ {}", run_id, slice_no, total_slices, quantity, price);
        }
        _ => log::info!("[{}] TWAP slice {}/{}: quantity={}", run_id, slice_no, total_slices, quantity),
      }

      let result = executor.execute(slice_request).await?;
      if let Some(message) = result.error_message() {
        log::warn!("[{}] TWAP slice {}/{} failed, continuing: {}", run_id, slice_no, total_slices, message);
      }
      slice_results.push(result);

      // 마지막 분할 뒤에는 대기하지 않음
      if slice_no < total_slices && request.interval_seconds > 0.0 {
        self.sleeper.sleep(interval).await;
      }
    }

    let result = TwapResult::new(request, slice_results);
    log::info!(
      "[{}] TWAP finished: executed {} of {} ({} failed slices)",
      run_id,
      result.executed_quantity(),
      result.request.total_quantity,
      result.failed_slices(),
    );

    Ok(result)
  }

  /// 분할 주문 요청과 담당 실행기 선택
  fn slice_order(&self, request: &TwapRequest, quantity: f64) -> Result<(&Arc<dyn OrderExecutor>, OrderRequest), TradingError> {
    match request.order_type {
      OrderType::Market => Ok((
        &self.market_executor,
        OrderRequest::market(request.symbol.clone(), request.side, quantity),
      )),
      OrderType::Limit => {
        let price = request.limit_price.ok_or_else(missing_limit_price)?;
        Ok((
          &self.limit_executor,
          OrderRequest::limit(request.symbol.clone(), request.side, quantity, price, request.time_in_force),
        ))
      }
    }
  }
}

fn missing_limit_price() -> TradingError {
  TradingError::InvalidArgument("Limit TWAP orders require a limit_price.".to_string())
}

/// TWAP 요청 사전 검증
pub fn validate_twap_request(request: &TwapRequest) -> Result<(), TradingError> {
  if request.slices == 0 {
    return Err(TradingError::InvalidArgument("TWAP slices must be a positive integer.".to_string()));
  }
  if !(request.interval_seconds >= 0.0) || !request.interval_seconds.is_finite() {
    return Err(TradingError::InvalidArgument("TWAP interval must be zero or positive seconds.".to_string()));
  }
  if !request.total_quantity.is_finite() || request.total_quantity <= 0.0 {
    return Err(TradingError::InvalidArgument("TWAP total quantity must be greater than zero.".to_string()));
  }
  if request.order_type == OrderType::Limit && request.limit_price.is_none() {
    return Err(missing_limit_price());
  }
  Ok(())
}

/// 분할 수량 계산.
///
/// 모든 분할은 `total / slices` 를 소수점 8자리로 반올림한 값이고, 반올림 오차(drift)는
/// 마지막 분할에만 더한 뒤 다시 반올림한다. 반올림 후 0 이하가 되는 분할이 있으면 거절한다.
pub fn compute_slice_sizes(total_quantity: f64, slices: usize) -> Result<Vec<f64>, TradingError> {
  if slices == 0 {
    return Ok(Vec::new());
  }

  let base = round_quantity(total_quantity / slices as f64)?;
  let mut sizes = vec![base; slices];

  let drift = total_quantity - sizes.iter().sum::<f64>();
  if let Some(last) = sizes.last_mut() {
    *last = round_quantity(*last + drift)?;
  }

  if sizes.iter().any(|size| *size <= 0.0) {
    return Err(TradingError::InvalidArgument(format!(
      "TWAP slice quantity rounds to zero: {} split into {} slices.",
      total_quantity, slices
    )));
  }

  Ok(sizes)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::VenueError;
  use crate::exchange::mocks::RecordingSleeper;
  use crate::models::order::{OrderResult, OrderSide, TimeInForce};
  use crate::order_core::executor::MockOrderExecutor;
  use serde_json::json;

  fn accepting_executor(times: usize) -> MockOrderExecutor {
    let mut executor = MockOrderExecutor::new();
    executor
      .expect_execute()
      .times(times)
      .returning(|request| Ok(OrderResult::success(request, json!({"status": "NEW"}))));
    executor
  }

  fn unused_executor() -> MockOrderExecutor {
    let mut executor = MockOrderExecutor::new();
    executor.expect_execute().never();
    executor
  }

  #[test]
  fn test_slice_sizes_absorb_drift_in_last_slice() {
    let sizes = compute_slice_sizes(1.0, 3).unwrap();

    assert_eq!(sizes, vec![0.33333333, 0.33333333, 0.33333334]);
    assert!((sizes.iter().sum::<f64>() - 1.0).abs() < 1e-9);
  }

  #[test]
  fn test_slice_sizes_even_split() {
    assert_eq!(compute_slice_sizes(10.0, 4).unwrap(), vec![2.5, 2.5, 2.5, 2.5]);
    assert_eq!(compute_slice_sizes(0.7, 1).unwrap(), vec![0.7]);
    assert!(compute_slice_sizes(1.0, 0).unwrap().is_empty());
  }

  #[test]
  fn test_slice_sizes_round_midpoints_to_even() {
    assert_eq!(
      compute_slice_sizes(3.0183961, 4).unwrap(),
      vec![0.75459902, 0.75459902, 0.75459902, 0.75459904]
    );
    assert_eq!(
      compute_slice_sizes(0.00000015, 6).unwrap(),
      vec![0.00000002, 0.00000002, 0.00000002, 0.00000002, 0.00000002, 0.00000005]
    );
  }

  #[test]
  fn test_slice_sizes_reject_zero_quantity_slices() {
    assert!(matches!(
      compute_slice_sizes(0.00000001, 4),
      Err(TradingError::InvalidArgument(_))
    ));
  }

  #[test]
  fn test_slice_sizes_keep_total_at_eight_decimals() {
    for (total, slices) in [(0.1, 3), (2.0, 7), (123.456789, 11), (0.00000009, 4)] {
      let sizes = compute_slice_sizes(total, slices).unwrap();
      let sum: f64 = sizes.iter().sum();

      assert_eq!(sizes.len(), slices);
      assert!((sum - total).abs() < 1e-8, "total={} sum={}", total, sum);
      assert!(sizes[..slices - 1].iter().all(|s| *s == sizes[0]));
    }
  }

  #[tokio::test]
  async fn test_market_twap_uses_market_executor_and_sleeps_between_slices() {
    let sleeper = Arc::new(RecordingSleeper::new());
    let scheduler = TwapScheduler::new(Arc::new(accepting_executor(3)), Arc::new(unused_executor()))
      .with_sleeper(sleeper.clone());

    let result = scheduler
      .execute(TwapRequest::new("BTCUSDT", OrderSide::Buy, 1.0, 3, 2.5))
      .await
      .unwrap();

    assert!(result.is_success());
    assert_eq!(result.slice_results.len(), 3);
    assert!((result.executed_quantity() - 1.0).abs() < 1e-9);
    assert_eq!(sleeper.sleeps().await, vec![Duration::from_secs_f64(2.5); 2]);
  }

  #[tokio::test]
  async fn test_limit_twap_passes_price_and_tif_to_every_slice() {
    let mut limit = MockOrderExecutor::new();
    limit
      .expect_execute()
      .times(2)
      .withf(|request| request.price == Some(3000.0) && request.time_in_force == Some(TimeInForce::Fok))
      .returning(|request| Ok(OrderResult::success(request, json!({}))));
    let sleeper = Arc::new(RecordingSleeper::new());
    let scheduler = TwapScheduler::new(Arc::new(unused_executor()), Arc::new(limit))
      .with_sleeper(sleeper.clone());

    let request = TwapRequest::new("ETHUSDT", OrderSide::Sell, 1.0, 2, 0.0)
      .with_limit_price(3000.0)
      .with_time_in_force(TimeInForce::Fok);
    let result = scheduler.execute(request).await.unwrap();

    assert!(result.is_success());
    assert!(sleeper.sleeps().await.is_empty());
  }

  #[tokio::test]
  async fn test_failed_slice_does_not_stop_the_run() {
    let mut market = MockOrderExecutor::new();
    let mut call = 0;
    market.expect_execute().times(3).returning(move |request| {
      call += 1;
      if call == 2 {
        Ok(OrderResult::failure(request, &VenueError::with_code(-2019, "Margin is insufficient.")))
      } else {
        Ok(OrderResult::success(request, json!({})))
      }
    });
    let scheduler = TwapScheduler::new(Arc::new(market), Arc::new(unused_executor()))
      .with_sleeper(Arc::new(RecordingSleeper::new()));

    let result = scheduler
      .execute(TwapRequest::new("BTCUSDT", OrderSide::Buy, 0.3, 3, 0.0))
      .await
      .unwrap();

    assert!(!result.is_success());
    assert_eq!(result.slice_results.len(), 3);
    assert!(result.slice_results[2].is_success());
    assert!((result.executed_quantity() - 0.2).abs() < 1e-9);
  }

  #[tokio::test]
  async fn test_invalid_requests_never_reach_an_executor() {
    let scheduler = TwapScheduler::new(Arc::new(unused_executor()), Arc::new(unused_executor()))
      .with_sleeper(Arc::new(RecordingSleeper::new()));

    let invalid = vec![
      TwapRequest::new("BTCUSDT", OrderSide::Buy, 1.0, 0, 1.0),
      TwapRequest::new("BTCUSDT", OrderSide::Buy, 1.0, 3, -1.0),
      TwapRequest::new("BTCUSDT", OrderSide::Buy, 1.0, 3, f64::NAN),
      TwapRequest::new("BTCUSDT", OrderSide::Buy, 0.0, 3, 1.0),
      TwapRequest::new("BTCUSDT", OrderSide::Buy, 0.00000001, 4, 1.0),
      TwapRequest::new("BTCUSDT", OrderSide::Buy, 1.0, 3, 1.0).with_order_type(OrderType::Limit),
    ];

    for request in invalid {
      let result = scheduler.execute(request).await;
      assert!(matches!(result, Err(TradingError::InvalidArgument(_))));
    }
  }
}
