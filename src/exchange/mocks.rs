use std::collections::VecDeque;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::Mutex;

use crate::core::twap_scheduler::Sleeper;
use crate::error::{TradingError, VenueError};
use crate::exchange::payload::OrderPayload;
use crate::exchange::traits::VenueGateway;
use crate::utils::current_timestamp_ms;

/// A scripted implementation of the VenueGateway trait for tests and development.
///
/// Queued responses are handed out in order; once the queue is empty every order is
/// accepted with a generated order id.
pub struct MockGateway {
    responses: Mutex<VecDeque<Result<Value, VenueError>>>,
    submitted: Mutex<Vec<OrderPayload>>,
    /// Server clock skew relative to local time. `None` makes server_time fail.
    server_skew_ms: Option<i64>,
    symbols: Vec<String>,
    time_offset: AtomicI64,
    submit_calls: AtomicUsize,
    server_time_calls: AtomicUsize,
}

impl MockGateway {
    pub fn new() -> Self {
        MockGateway {
            responses: Mutex::new(VecDeque::new()),
            submitted: Mutex::new(Vec::new()),
            server_skew_ms: Some(0),
            symbols: Vec::new(),
            time_offset: AtomicI64::new(0),
            submit_calls: AtomicUsize::new(0),
            server_time_calls: AtomicUsize::new(0),
        }
    }

    /// Queue responses for the next submit calls
    pub fn with_responses(self, responses: Vec<Result<Value, VenueError>>) -> Self {
        MockGateway {
            responses: Mutex::new(responses.into()),
            ..self
        }
    }

    pub fn with_server_skew(mut self, skew_ms: i64) -> Self {
        self.server_skew_ms = Some(skew_ms);
        self
    }

    /// Make every server_time call fail like an unreachable venue
    pub fn with_unreachable_server(mut self) -> Self {
        self.server_skew_ms = None;
        self
    }

    pub fn with_symbols(mut self, symbols: &[&str]) -> Self {
        self.symbols = symbols.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn submit_calls(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    /// Number of server time queries, i.e. clock resyncs
    pub fn server_time_calls(&self) -> usize {
        self.server_time_calls.load(Ordering::SeqCst)
    }

    pub async fn submitted_payloads(&self) -> Vec<OrderPayload> {
        self.submitted.lock().await.clone()
    }
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VenueGateway for MockGateway {
    async fn submit_order(&self, payload: &OrderPayload) -> Result<Value, VenueError> {
        let call = self.submit_calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.submitted.lock().await.push(payload.clone());

        match self.responses.lock().await.pop_front() {
            Some(response) => response,
            None => Ok(json!({
                "orderId": call,
                "symbol": payload.get("symbol").cloned().unwrap_or(Value::Null),
                "status": "NEW",
            })),
        }
    }

    async fn server_time(&self) -> Result<i64, TradingError> {
        self.server_time_calls.fetch_add(1, Ordering::SeqCst);
        match self.server_skew_ms {
            Some(skew) => Ok(current_timestamp_ms() + skew),
            None => Err(TradingError::Http("mock venue unreachable".to_string())),
        }
    }

    fn time_offset(&self) -> i64 {
        self.time_offset.load(Ordering::SeqCst)
    }

    fn set_time_offset(&self, offset_ms: i64) {
        self.time_offset.store(offset_ms, Ordering::SeqCst);
    }

    async fn perpetual_symbols(&self) -> Result<Vec<String>, TradingError> {
        Ok(self.symbols.clone())
    }
}

/// Sleeper that records requested durations instead of waiting
#[derive(Default)]
pub struct RecordingSleeper {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().await.clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().await.push(duration);
    }
}
