pub mod campaign_status;
pub mod check_eligibility;
pub mod confirm_redemption;
pub mod confirm_share;
pub mod create_campaign;
pub mod issue_voucher;
pub mod pause_campaign;
pub mod reconcile_counters;
pub mod resume_campaign;
pub mod submit_claim;
