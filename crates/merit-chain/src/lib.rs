/*!
# Merit Chain Adapters

Read-side chain access for claim verification: transaction receipts from the
authoritative JSON-RPC node, and ERC-1155 holdings from either that node or
an aggregating indexer. Transient failures retry with exponential backoff;
definitive answers (including "no such transaction yet") are returned as-is
so the caller can classify them.

## Quick Start

```rust
use merit_chain::{ChainConfig, ReceiptSource, RpcClient};
use alloy_primitives::B256;

# async fn example() -> Result<(), Box<dyn std::error::Error>> {
let config = ChainConfig {
    rpc_url: "https://mainnet.base.org".parse()?,
    ..Default::default()
};
let client = RpcClient::new(config)?;

match client.transaction_receipt(B256::ZERO).await? {
    Some(receipt) if receipt.status => println!("mined in {:?}", receipt.block_number),
    Some(_) => println!("reverted"),
    None => println!("not observable yet"),
}
# Ok(())
# }
```

Holdings lookups compose: wrap the RPC client and an [`IndexerHoldings`]
in a [`FallbackHoldings`] and the indexer only answers when the live node
cannot.
*/

mod config;
mod error;
mod fallback;
mod indexer;
mod rpc;
mod sources;

pub use config::ChainConfig;
pub use error::{ChainError, ChainResult};
pub use fallback::FallbackHoldings;
pub use indexer::IndexerHoldings;
pub use rpc::RpcClient;
pub use sources::{HoldingsSource, ReceiptSource, ReceiptView};
