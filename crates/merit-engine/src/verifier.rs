use crate::{EngineError, EngineResult};
use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::{sol, SolEvent};
use merit_chain::{ReceiptSource, ReceiptView};
use merit_social::{Engagement, SocialGraph};
use tracing::debug;

sol! {
    /// ERC-1155 transfer events. A zero-address `from` denotes a mint,
    /// which is the shape storefront purchases produce.
    #[derive(Debug, PartialEq, Eq)]
    event TransferSingle(
        address indexed operator,
        address indexed from,
        address indexed to,
        uint256 id,
        uint256 value
    );

    #[derive(Debug, PartialEq, Eq)]
    event TransferBatch(
        address indexed operator,
        address indexed from,
        address indexed to,
        uint256[] ids,
        uint256[] values
    );
}

/// What verification established about a claimed action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct VerifiedAction {
    /// Units proven, from the authoritative source. Never taken from the
    /// client's declaration.
    pub quantity: u64,
    /// Natural key of the underlying action; collides exactly when two
    /// submissions claim the same action.
    pub idempotency_key: String,
    pub block_number: Option<u64>,
}

/// Verify a claimed mint against its transaction receipt.
///
/// The receipt must exist, have succeeded, address the campaign contract,
/// and be sent from the claimed wallet. The verified quantity is the sum of
/// ERC-1155 transfer values to the wallet for the campaign's token id,
/// counted from the contract's own logs.
pub(crate) async fn verify_onchain(
    receipts: &dyn ReceiptSource,
    contract: Address,
    token_id: U256,
    wallet: Address,
    tx_hash: B256,
    declared_quantity: u64,
) -> EngineResult<VerifiedAction> {
    let receipt = receipts
        .transaction_receipt(tx_hash)
        .await?
        .ok_or_else(|| {
            EngineError::NotYetAvailable(format!("transaction {tx_hash} has no receipt yet"))
        })?;

    if !receipt.status {
        return Err(EngineError::InvalidProof(format!(
            "transaction {tx_hash} reverted"
        )));
    }
    match receipt.to {
        Some(to) if to == contract => {}
        _ => {
            return Err(EngineError::InvalidProof(format!(
                "transaction {tx_hash} was not sent to the campaign contract {contract}"
            )));
        }
    }
    if receipt.from != wallet {
        return Err(EngineError::InvalidProof(format!(
            "transaction sender {} does not match the claimed wallet {wallet}",
            receipt.from
        )));
    }

    let quantity = transferred_quantity(&receipt, contract, token_id, wallet);
    if quantity == 0 {
        return Err(EngineError::InvalidProof(format!(
            "no matching mint event found for wallet {wallet} and token id {token_id} \
             (claimed {declared_quantity})"
        )));
    }
    let quantity = u64::try_from(quantity).map_err(|_| {
        EngineError::InvalidProof("transferred quantity exceeds the ledger range".into())
    })?;

    debug!(tx = %tx_hash, quantity, "on-chain action verified");
    Ok(VerifiedAction {
        quantity,
        idempotency_key: format!("{tx_hash:#x}"),
        block_number: receipt.block_number,
    })
}

fn transferred_quantity(
    receipt: &ReceiptView,
    contract: Address,
    token_id: U256,
    wallet: Address,
) -> u128 {
    let mut total: u128 = 0;
    for log in &receipt.logs {
        if log.address != contract {
            continue;
        }
        let Some(topic0) = log.data.topics().first() else {
            continue;
        };
        if *topic0 == TransferSingle::SIGNATURE_HASH {
            if let Ok(event) = TransferSingle::decode_log_data(&log.data) {
                if event.to == wallet && event.id == token_id {
                    total = total.saturating_add(event.value.try_into().unwrap_or(u128::MAX));
                }
            }
        } else if *topic0 == TransferBatch::SIGNATURE_HASH {
            if let Ok(event) = TransferBatch::decode_log_data(&log.data) {
                if event.to == wallet {
                    for (id, value) in event.ids.iter().zip(event.values.iter()) {
                        if *id == token_id {
                            total = total.saturating_add((*value).try_into().unwrap_or(u128::MAX));
                        }
                    }
                }
            }
        }
    }
    total
}

/// Verify claimed engagements by graph membership.
///
/// Each required engagement is checked independently (and concurrently);
/// the rejection lists every missing one so the claimant learns the full
/// gap in a single round trip. Quantity is always 1: engagement claims are
/// all-or-nothing.
pub(crate) async fn verify_engagement(
    social: &dyn SocialGraph,
    cast_hash: &str,
    required: &[Engagement],
    fid: u64,
    scan_limit: usize,
    reply_scan_depth: u8,
) -> EngineResult<VerifiedAction> {
    let checks = required.iter().map(|&kind| async move {
        let satisfied = match kind {
            Engagement::Like | Engagement::Recast => social
                .reactions(cast_hash, kind, scan_limit)
                .await?
                .iter()
                .any(|reaction| reaction.fid == fid),
            Engagement::Reply => social
                .replies(cast_hash, reply_scan_depth, scan_limit)
                .await?
                .iter()
                .any(|reply| reply.author_fid == fid),
        };
        Ok::<_, merit_social::SocialError>((kind, satisfied))
    });

    let results = futures::future::try_join_all(checks).await?;
    let missing: Vec<Engagement> = results
        .iter()
        .filter(|(_, satisfied)| !satisfied)
        .map(|(kind, _)| *kind)
        .collect();
    if !missing.is_empty() {
        return Err(EngineError::MissingEngagements(missing));
    }

    debug!(cast = cast_hash, fid, "engagement verified");
    Ok(VerifiedAction {
        quantity: 1,
        idempotency_key: format!("cast:{cast_hash}:fid:{fid}"),
        block_number: None,
    })
}
