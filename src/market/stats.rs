use super::{Market, PLATFORM_FEE_RATE, PlatformStats};

impl Market {
    pub fn get_platform_stats(&self) -> PlatformStats {
        PlatformStats {
            total_listings: self.total_listings(),
            total_contracts: self.total_contracts(),
            platform_fee_rate: PLATFORM_FEE_RATE,
            contract_owner: self.administrator.clone(),
            total_disputes: self.total_disputes(),
            total_files: self.total_files(),
            total_fees: self.total_fees,
        }
    }
}
