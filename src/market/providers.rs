use super::{
    Market, MarketError, Principal, Provider, Result,
    types::MAX_REPUTATION,
};

impl Market {
    pub fn register_provider(
        &mut self,
        caller: &Principal,
        total_space: u64,
        price_per_gb: u64,
    ) -> Result<bool> {
        if self.providers.contains_key(caller) {
            return Err(MarketError::Unauthorized);
        }
        if total_space == 0 || price_per_gb == 0 {
            return Err(MarketError::InvalidAmount);
        }
        self.providers.insert(
            caller.clone(),
            Provider::builder()
                .total_space(total_space)
                .available_space(total_space)
                .price_per_gb(price_per_gb)
                .build(),
        );
        Ok(true)
    }

    /// Overwrites total space and price. Available space is clamped to the new total so
    /// it never exceeds it, even when more space is already reserved by listings.
    pub fn update_provider_info(
        &mut self,
        caller: &Principal,
        new_total_space: u64,
        new_price_per_gb: u64,
    ) -> Result<bool> {
        let provider = self
            .providers
            .get_mut(caller)
            .ok_or(MarketError::Unauthorized)?;
        if new_total_space == 0 || new_price_per_gb == 0 {
            return Err(MarketError::InvalidAmount);
        }
        provider.total_space = new_total_space;
        provider.price_per_gb = new_price_per_gb;
        provider.available_space = provider.available_space.min(new_total_space);
        Ok(true)
    }

    pub fn set_provider_active(&mut self, caller: &Principal, is_active: bool) -> Result<bool> {
        let provider = self
            .providers
            .get_mut(caller)
            .ok_or(MarketError::Unauthorized)?;
        provider.is_active = is_active;
        Ok(true)
    }

    pub fn get_provider_info(&self, provider: &Principal) -> Option<&Provider> {
        self.providers.get(provider)
    }

    pub(super) fn record_success(&mut self, provider: &Principal) -> Result<()> {
        let provider = self
            .providers
            .get_mut(provider)
            .ok_or(MarketError::NotFound)?;
        provider.total_contracts += 1;
        provider.successful_contracts += 1;
        provider.reputation_score =
            reputation(provider.successful_contracts, provider.total_contracts);
        Ok(())
    }
}

/// Share of successful contracts scaled to [0, 100]. A provider with no history keeps
/// the initial score.
pub fn reputation(successful: u64, total: u64) -> u64 {
    if total == 0 {
        return MAX_REPUTATION;
    }
    (successful.min(total) * MAX_REPUTATION / total).min(MAX_REPUTATION)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Principal {
        Principal::new("alice")
    }

    #[test]
    fn test_register_provider() {
        let mut market = Market::new(Principal::new("admin"));
        assert_eq!(market.register_provider(&alice(), 1000, 50), Ok(true));
        let provider = market.get_provider_info(&alice()).unwrap();
        assert_eq!(provider.total_space, 1000);
        assert_eq!(provider.available_space, 1000);
        assert_eq!(provider.price_per_gb, 50);
        assert_eq!(provider.reputation_score, 100);
        assert_eq!(provider.total_contracts, 0);
        assert!(provider.is_active);
    }

    #[test]
    fn test_register_twice_fails() {
        let mut market = Market::new(Principal::new("admin"));
        market.register_provider(&alice(), 1000, 50).unwrap();
        assert_eq!(
            market.register_provider(&alice(), 2000, 60),
            Err(MarketError::Unauthorized)
        );
        assert_eq!(market.get_provider_info(&alice()).unwrap().total_space, 1000);
    }

    #[test]
    fn test_register_zero_amounts() {
        let mut market = Market::new(Principal::new("admin"));
        assert_eq!(
            market.register_provider(&alice(), 0, 50),
            Err(MarketError::InvalidAmount)
        );
        assert_eq!(
            market.register_provider(&alice(), 10, 0),
            Err(MarketError::InvalidAmount)
        );
        assert!(market.get_provider_info(&alice()).is_none());
    }

    #[test]
    fn test_update_requires_registration() {
        let mut market = Market::new(Principal::new("admin"));
        assert_eq!(
            market.update_provider_info(&alice(), 2000, 45),
            Err(MarketError::Unauthorized)
        );
    }

    #[test]
    fn test_update_clamps_available_space() {
        let mut market = Market::new(Principal::new("admin"));
        market.register_provider(&alice(), 1000, 50).unwrap();
        market.create_listing(&alice(), 600, 50, 30).unwrap();
        market.update_provider_info(&alice(), 300, 45).unwrap();
        let provider = market.get_provider_info(&alice()).unwrap();
        assert_eq!(provider.total_space, 300);
        assert_eq!(provider.available_space, 300);
        assert_eq!(provider.price_per_gb, 45);
    }

    #[test]
    fn test_reputation_bounds() {
        assert_eq!(reputation(0, 0), 100);
        assert_eq!(reputation(1, 1), 100);
        assert_eq!(reputation(1, 2), 50);
        assert_eq!(reputation(0, 5), 0);
        assert_eq!(reputation(9, 3), 100);
    }
}
