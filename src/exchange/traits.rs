use async_trait::async_trait;
use serde_json::Value;

use crate::error::{TradingError, VenueError};
use crate::exchange::payload::OrderPayload;
use crate::utils::current_timestamp_ms;

/// The `VenueGateway` trait is everything the order executors need from a venue client.
/// Implemented by the Binance Futures connector, the dry-run connector and test mocks.
///
/// The only mutable state a gateway carries is the clock offset used for request signing.
/// It is process-wide and written without a lock: a stale value can at worst cause one
/// extra clock-skew retry, never different order parameters.
#[async_trait]
pub trait VenueGateway: Send + Sync {
    /// Submit an order payload and return the venue's raw response
    async fn submit_order(&self, payload: &OrderPayload) -> Result<Value, VenueError>;

    /// Venue server time in milliseconds
    async fn server_time(&self) -> Result<i64, TradingError>;

    /// Offset (ms) currently applied to signed request timestamps
    fn time_offset(&self) -> i64;

    fn set_time_offset(&self, offset_ms: i64);

    /// Resynchronise the signing clock against server time.
    ///
    /// Returns the new offset (`server - local`), or `None` if the venue could not be
    /// reached, in which case the previous offset stays in place.
    async fn resync_clock(&self) -> Option<i64> {
        match self.server_time().await {
            Ok(server_time) => {
                let offset = server_time - current_timestamp_ms();
                self.set_time_offset(offset);
                log::info!("Applied time offset {}ms", offset);
                Some(offset)
            }
            Err(e) => {
                log::warn!("Could not sync server time: {}", e);
                None
            }
        }
    }

    /// Optional: symbols of tradable perpetual contracts (default: none known)
    async fn perpetual_symbols(&self) -> Result<Vec<String>, TradingError> {
        Ok(Vec::new())
    }
}
