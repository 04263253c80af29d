//! Chainlink price feed client.
//!
//! No caching: every [`PriceFeedClient::get_quote`] call hits the feed. The
//! workflow treats each quote as stale after one use and re-fetches before
//! any later price-dependent computation.

use alloy::primitives::{Address, I256};
use tracing::debug;

use crate::errors::WorkflowError;
use crate::execution::contracts::IAggregatorV3;
use crate::execution::tx_submitter::HttpProvider;
use crate::types::PriceQuote;

/// Read-only client for a single Chainlink aggregator.
pub struct PriceFeedClient {
    feed: IAggregatorV3::IAggregatorV3Instance<HttpProvider>,
    base_asset: String,
    quote_asset: String,
}

impl PriceFeedClient {
    pub fn new(
        provider: HttpProvider,
        feed_address: Address,
        base_asset: impl Into<String>,
        quote_asset: impl Into<String>,
    ) -> Self {
        Self {
            feed: IAggregatorV3::new(feed_address, provider),
            base_asset: base_asset.into(),
            quote_asset: quote_asset.into(),
        }
    }

    /// Fetch the latest round data and return it as a [`PriceQuote`].
    ///
    /// Fails with [`WorkflowError::OracleUnavailable`] when the call fails
    /// or the feed answer is non-positive (no usable round data).
    pub async fn get_quote(&self) -> Result<PriceQuote, WorkflowError> {
        let data = self.feed.latestRoundData().call().await.map_err(|e| {
            WorkflowError::OracleUnavailable {
                reason: format!("latestRoundData call failed: {e}"),
            }
        })?;

        if data.answer <= I256::ZERO {
            return Err(WorkflowError::OracleUnavailable {
                reason: format!(
                    "feed returned non-positive answer {} (round {})",
                    data.answer, data.roundId
                ),
            });
        }

        let quote = PriceQuote {
            base_asset: self.base_asset.clone(),
            quote_asset: self.quote_asset.clone(),
            rate: data.answer.into_raw(),
            updated_at: data.updatedAt.to::<u64>(),
        };

        debug!(quote = %quote, "price quote fetched");
        Ok(quote)
    }
}
