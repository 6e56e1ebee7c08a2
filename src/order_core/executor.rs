/**
* filename : executor
* author : HAMA
* date: 2025. 5. 12.
* description: 주문 실행기 공통 로직 (clock skew 재시도 포함)
**/

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{FailureKind, TradingError, VenueError};
use crate::exchange::payload::{build_order_payload, OrderPayload};
use crate::exchange::traits::VenueGateway;
use crate::models::order::{OrderRequest, OrderResult, OrderType};
use crate::utils::logging;

/// clock skew 오류 시 허용되는 최대 재시도 횟수
pub const MAX_CLOCK_SKEW_RETRIES: u32 = 1;

/// 주문 실행기 인터페이스.
///
/// 거래소 오류는 `OrderResult` 안에 기록되고, `Err` 는 요청 자체가 잘못된 경우에만 반환된다.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderExecutor: Send + Sync {
    async fn execute(&self, request: OrderRequest) -> Result<OrderResult, TradingError>;
}

/// 주문 제출. clock skew 오류면 서버 시간을 재동기화한 뒤 한 번만 재시도한다.
pub async fn submit_with_resync(
    gateway: &dyn VenueGateway,
    order_type: OrderType,
    payload: &OrderPayload,
) -> Result<Value, VenueError> {
    let kind = order_type.as_str();
    let mut retries = 0;

    loop {
        match gateway.submit_order(payload).await {
            Ok(response) => {
                logging::log_order_accepted(kind, &response, retries > 0);
                return Ok(response);
            }
            Err(error)
                if error.kind() == FailureKind::ClockSkew && retries < MAX_CLOCK_SKEW_RETRIES =>
            {
                log::warn!(
                    "{} order hit timestamp error ({}). Resyncing client clock and retrying once.",
                    kind,
                    error
                );
                gateway.resync_clock().await;
                retries += 1;
            }
            Err(error) => {
                logging::log_order_failed(kind, &error);
                return Err(error);
            }
        }
    }
}

/// 요청을 payload 로 변환해 제출하고 결과를 만든다
pub(crate) async fn run_order(
    gateway: &dyn VenueGateway,
    order_type: OrderType,
    request: OrderRequest,
) -> Result<OrderResult, TradingError> {
    let payload = build_order_payload(&request, order_type)?;
    logging::log_order_submitted(order_type.as_str(), &Value::Object(payload.clone()));

    let result = match submit_with_resync(gateway, order_type, &payload).await {
        Ok(response) => OrderResult::success(request, response),
        Err(error) => OrderResult::failure(request, &error),
    };
    Ok(result)
}
