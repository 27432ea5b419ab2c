use crate::ChainResult;
use alloy_primitives::{Address, Log, B256, U256};

/// Receipt fields the verification path consumes, independent of which
/// transport produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptView {
    /// Post-state success flag; reverted transactions are `false`.
    pub status: bool,
    pub from: Address,
    /// `None` for contract-creation transactions.
    pub to: Option<Address>,
    pub block_number: Option<u64>,
    pub logs: Vec<Log>,
}

/// Authoritative source of transaction receipts.
#[async_trait::async_trait]
pub trait ReceiptSource: Send + Sync {
    /// Fetch the receipt for `hash`. `Ok(None)` means the transaction is not
    /// observable yet (unknown or unmined); callers decide whether that is
    /// worth retrying.
    async fn transaction_receipt(&self, hash: B256) -> ChainResult<Option<ReceiptView>>;
}

/// Point-in-time token holdings.
#[async_trait::async_trait]
pub trait HoldingsSource: Send + Sync {
    /// Current ERC-1155 balance of `owner` for `token_id` on `contract`.
    async fn erc1155_balance(
        &self,
        contract: Address,
        owner: Address,
        token_id: U256,
    ) -> ChainResult<U256>;
}
