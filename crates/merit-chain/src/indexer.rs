use crate::{ChainError, ChainResult, HoldingsSource};
use alloy_primitives::{Address, U256};
use serde::Deserialize;
use std::time::Duration;
use tracing::trace;
use url::Url;

/// Holdings read from an aggregating indexer. Indexer responses may lag the
/// chain head, so this source should only ever back up the live RPC (see
/// [`crate::FallbackHoldings`]), never replace it.
pub struct IndexerHoldings {
    http: reqwest::Client,
    base_url: Url,
}

#[derive(Debug, Deserialize)]
struct HoldingBody {
    balance: String,
}

impl IndexerHoldings {
    pub fn new(base_url: Url, request_timeout: Duration) -> ChainResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| ChainError::Indexer(e.to_string()))?;
        // joins below are relative to the base path
        let mut base_url = base_url;
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }
        Ok(Self { http, base_url })
    }
}

#[async_trait::async_trait]
impl HoldingsSource for IndexerHoldings {
    async fn erc1155_balance(
        &self,
        contract: Address,
        owner: Address,
        token_id: U256,
    ) -> ChainResult<U256> {
        let path = format!("v1/contracts/{contract:#x}/tokens/{token_id}/holders/{owner:#x}");
        let url = self
            .base_url
            .join(&path)
            .map_err(|e| ChainError::Indexer(e.to_string()))?;
        trace!(%url, "querying indexer holdings");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ChainError::Indexer(e.to_string()))?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            // the indexer has never seen this holder
            return Ok(U256::ZERO);
        }
        if !response.status().is_success() {
            return Err(ChainError::Indexer(format!(
                "HTTP status {}",
                response.status()
            )));
        }

        let body: HoldingBody = response
            .json()
            .await
            .map_err(|e| ChainError::Indexer(e.to_string()))?;
        body.balance.parse::<U256>().map_err(|e| {
            ChainError::Indexer(format!("unparseable balance `{}`: {e}", body.balance))
        })
    }
}
