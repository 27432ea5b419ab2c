/*!
# Merit Entities

SeaORM entities for the claim ledger database. The `claims` table is the
source of truth for everything the engine promises: quota math, duplicate
suppression and redemption exclusivity are all derived from (or enforced by
constraints on) these rows. `campaigns.claimed_units` and the
`participant_stats` table are denormalized read-path counters and carry no
authority of their own.
*/

pub mod campaigns;
pub mod claims;
pub mod participant_stats;

pub use campaigns::CampaignKind;
pub use claims::ClaimState;
