use crate::{ChainError, ChainResult, HoldingsSource};
use alloy_primitives::{Address, U256};
use std::sync::Arc;
use tracing::warn;

/// Holdings chain that always consults the live RPC first and asks the
/// indexer only after the live source has failed. A stale index can
/// therefore never shadow a live answer.
pub struct FallbackHoldings {
    primary: Arc<dyn HoldingsSource>,
    secondary: Arc<dyn HoldingsSource>,
}

impl FallbackHoldings {
    pub fn new(primary: Arc<dyn HoldingsSource>, secondary: Arc<dyn HoldingsSource>) -> Self {
        Self { primary, secondary }
    }
}

#[async_trait::async_trait]
impl HoldingsSource for FallbackHoldings {
    async fn erc1155_balance(
        &self,
        contract: Address,
        owner: Address,
        token_id: U256,
    ) -> ChainResult<U256> {
        let primary_err = match self.primary.erc1155_balance(contract, owner, token_id).await {
            Ok(balance) => return Ok(balance),
            Err(e) => e,
        };
        warn!(
            %contract,
            %owner,
            error = %primary_err,
            "live holdings source failed, falling back to indexer"
        );
        match self
            .secondary
            .erc1155_balance(contract, owner, token_id)
            .await
        {
            Ok(balance) => Ok(balance),
            Err(secondary_err) => Err(ChainError::SourcesExhausted {
                primary: primary_err.to_string(),
                secondary: secondary_err.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
        result: Result<u64, &'static str>,
    }

    impl CountingSource {
        fn ok(balance: u64) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                result: Ok(balance),
            }
        }

        fn failing(message: &'static str) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                result: Err(message),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl HoldingsSource for CountingSource {
        async fn erc1155_balance(&self, _: Address, _: Address, _: U256) -> ChainResult<U256> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.result {
                Ok(balance) => Ok(U256::from(balance)),
                Err(message) => Err(ChainError::Transport(message.to_string())),
            }
        }
    }

    fn query(chain: &FallbackHoldings) -> ChainResult<U256> {
        tokio_test::block_on(chain.erc1155_balance(
            Address::repeat_byte(1),
            Address::repeat_byte(2),
            U256::from(3),
        ))
    }

    #[test]
    fn prefers_live_source() {
        let primary = Arc::new(CountingSource::ok(7));
        let secondary = Arc::new(CountingSource::ok(9));
        let chain = FallbackHoldings::new(primary.clone(), secondary.clone());

        let balance = query(&chain).expect("primary should answer");

        assert_eq!(balance, U256::from(7));
        assert_eq!(primary.calls(), 1);
        assert_eq!(secondary.calls(), 0, "indexer must not be consulted");
    }

    #[test]
    fn falls_back_when_live_source_fails() {
        let primary = Arc::new(CountingSource::failing("connection refused"));
        let secondary = Arc::new(CountingSource::ok(9));
        let chain = FallbackHoldings::new(primary.clone(), secondary.clone());

        let balance = query(&chain).expect("indexer should answer");

        assert_eq!(balance, U256::from(9));
        assert_eq!(primary.calls(), 1);
        assert_eq!(secondary.calls(), 1);
    }

    #[test]
    fn reports_both_failures() {
        let primary = Arc::new(CountingSource::failing("connection refused"));
        let secondary = Arc::new(CountingSource::failing("HTTP status 503"));
        let chain = FallbackHoldings::new(primary, secondary);

        let err = query(&chain).expect_err("both sources failed");
        assert!(matches!(err, ChainError::SourcesExhausted { .. }));
    }
}
