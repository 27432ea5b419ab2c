use chrono::Duration;

/// Tunables for claim processing
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// How long issued vouchers stay redeemable
    pub voucher_validity: Duration,

    /// Maximum graph entries enumerated per membership check
    pub engagement_scan_limit: usize,

    /// Thread depth enumerated when checking reply engagements
    pub reply_scan_depth: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            voucher_validity: Duration::days(30),
            engagement_scan_limit: 5_000,
            reply_scan_depth: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.voucher_validity, Duration::days(30));
        assert_eq!(config.engagement_scan_limit, 5_000);
        assert_eq!(config.reply_scan_depth, 1);
    }
}
