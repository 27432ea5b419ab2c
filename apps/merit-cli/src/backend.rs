use crate::error::{CliError, CliResult};
use alloy_primitives::{Address, B256};
use alloy_signer_local::PrivateKeySigner;
use merit_chain::{ChainConfig, FallbackHoldings, HoldingsSource, IndexerHoldings, RpcClient};
use merit_engine::{open_ledger_db, ClaimEngine, EngineConfig};
use merit_social::{HubClient, HubConfig};
use merit_voucher::{LocalVoucherSigner, VoucherIssuer};
use std::path::Path;
use std::sync::Arc;
use url::Url;

/// Open the ledger database and wire the engine to live backends.
///
/// The RPC endpoint serves both receipt lookups and live holdings queries.
/// When an indexer URL is given it becomes the holdings fallback; otherwise
/// holdings come from the RPC endpoint alone.
pub async fn open_engine(
    db: &Path,
    rpc_url: &str,
    indexer_url: Option<&str>,
    hub_url: &str,
    hub_api_key: Option<String>,
    issuer: Arc<dyn VoucherIssuer>,
    config: EngineConfig,
) -> CliResult<ClaimEngine> {
    let conn = open_ledger_db(db).await?;

    let chain = ChainConfig {
        rpc_url: parse_url("RPC URL", rpc_url)?,
        ..Default::default()
    };
    let request_timeout = chain.request_timeout;
    let rpc = Arc::new(RpcClient::new(chain)?);

    let holdings: Arc<dyn HoldingsSource> = match indexer_url {
        Some(indexer) => {
            let indexer = IndexerHoldings::new(parse_url("indexer URL", indexer)?, request_timeout)?;
            Arc::new(FallbackHoldings::new(rpc.clone(), Arc::new(indexer)))
        }
        None => rpc.clone(),
    };

    let social = Arc::new(HubClient::new(HubConfig {
        base_url: parse_url("hub URL", hub_url)?,
        api_key: hub_api_key,
        ..Default::default()
    })?);

    Ok(ClaimEngine::new(conn, rpc, holdings, social, issuer, config))
}

/// Open the engine for commands that only touch the ledger. Backends are
/// constructed from defaults and never called.
pub async fn open_ledger_engine(db: &Path) -> CliResult<ClaimEngine> {
    open_ledger_engine_with(db, throwaway_issuer(), EngineConfig::default()).await
}

/// Ledger-only engine with an explicit issuer and config; used by signing
/// commands that never reach the chain or the hub.
pub async fn open_ledger_engine_with(
    db: &Path,
    issuer: Arc<dyn VoucherIssuer>,
    config: EngineConfig,
) -> CliResult<ClaimEngine> {
    let conn = open_ledger_db(db).await?;
    let rpc = Arc::new(RpcClient::new(ChainConfig::default())?);
    let social = Arc::new(HubClient::new(HubConfig::default())?);
    Ok(ClaimEngine::new(conn, rpc.clone(), rpc, social, issuer, config))
}

/// A random key for engine construction in commands that never sign.
pub fn throwaway_issuer() -> Arc<dyn VoucherIssuer> {
    Arc::new(LocalVoucherSigner::new(
        PrivateKeySigner::random(),
        0,
        Address::ZERO,
    ))
}

/// Parse a hex private key into a voucher issuer. The key material is never
/// echoed back on failure.
pub fn parse_issuer(
    signer_key: &str,
    chain_id: u64,
    airdrop_contract: Address,
) -> CliResult<Arc<dyn VoucherIssuer>> {
    let key = signer_key
        .parse::<PrivateKeySigner>()
        .map_err(|e| CliError::InvalidArgument(format!("Invalid signer key: {}", e)))?;
    Ok(Arc::new(LocalVoucherSigner::new(
        key,
        chain_id,
        airdrop_contract,
    )))
}

pub fn parse_url(what: &str, value: &str) -> CliResult<Url> {
    Url::parse(value)
        .map_err(|e| CliError::InvalidArgument(format!("Invalid {} '{}': {}", what, value, e)))
}

pub fn parse_address(what: &str, value: &str) -> CliResult<Address> {
    value
        .parse::<Address>()
        .map_err(|e| CliError::InvalidArgument(format!("Invalid {} '{}': {}", what, value, e)))
}

pub fn parse_tx_hash(value: &str) -> CliResult<B256> {
    value.parse::<B256>().map_err(|e| {
        CliError::InvalidArgument(format!("Invalid transaction hash '{}': {}", value, e))
    })
}
