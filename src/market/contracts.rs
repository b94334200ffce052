use super::{
    Contract, Market, MarketError, Principal, Result, allocate,
    types::{BASIS_POINTS, PLATFORM_FEE_RATE},
};

/// Exact price of `space_gb` at `price_per_gb`.
pub fn total_price(space_gb: u64, price_per_gb: u64) -> Result<u64> {
    space_gb
        .checked_mul(price_per_gb)
        .ok_or(MarketError::Overflow)
}

/// Platform cut of a contract price, rounded down.
pub fn platform_fee(total_price: u64) -> u64 {
    (total_price as u128 * PLATFORM_FEE_RATE as u128 / BASIS_POINTS as u128) as u64
}

impl Market {
    pub fn purchase_storage(
        &mut self,
        caller: &Principal,
        listing_id: u64,
        space_gb: u64,
    ) -> Result<u64> {
        let listing = self
            .listings
            .get_mut(&listing_id)
            .ok_or(MarketError::NotFound)?;
        if !listing.is_active {
            return Err(MarketError::NotActive);
        }
        let provider_active = self
            .providers
            .get(&listing.provider)
            .is_some_and(|p| p.is_active);
        if !provider_active {
            return Err(MarketError::NotActive);
        }
        if space_gb == 0 {
            return Err(MarketError::InvalidAmount);
        }
        if space_gb > listing.space_gb {
            return Err(MarketError::InsufficientStorage);
        }
        let total_price = total_price(space_gb, listing.price_per_gb)?;
        let platform_fee = platform_fee(total_price);
        let total_fees = self
            .total_fees
            .checked_add(platform_fee)
            .ok_or(MarketError::Overflow)?;

        listing.space_gb -= space_gb;
        if listing.space_gb == 0 {
            listing.is_active = false;
        }
        let contract = Contract::builder()
            .listing_id(listing_id)
            .provider(listing.provider.clone())
            .buyer(caller.clone())
            .space_gb(space_gb)
            .duration_days(listing.duration_days)
            .total_price(total_price)
            .platform_fee(platform_fee)
            .build();
        self.total_fees = total_fees;
        let contract_id = allocate(&mut self.next_contract_id);
        self.contracts.insert(contract_id, contract);
        Ok(contract_id)
    }

    pub fn complete_contract(&mut self, caller: &Principal, contract_id: u64) -> Result<bool> {
        let contract = self
            .contracts
            .get(&contract_id)
            .ok_or(MarketError::NotFound)?;
        if &contract.buyer != caller {
            return Err(MarketError::Unauthorized);
        }
        if contract.is_completed {
            return Err(MarketError::AlreadyCompleted);
        }
        if contract.is_disputed {
            return Err(MarketError::AlreadyDisputed);
        }
        let provider = contract.provider.clone();
        self.record_success(&provider)?;
        if let Some(contract) = self.contracts.get_mut(&contract_id) {
            contract.is_completed = true;
        }
        Ok(true)
    }

    pub fn get_contract(&self, contract_id: u64) -> Option<&Contract> {
        self.contracts.get(&contract_id)
    }

    pub(super) fn total_contracts(&self) -> u64 {
        self.next_contract_id - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> Principal {
        Principal::new("provider")
    }

    fn buyer() -> Principal {
        Principal::new("buyer")
    }

    fn market(price_per_gb: u64) -> Market {
        let mut market = Market::new(Principal::new("admin"));
        market.register_provider(&provider(), 1000, 50).unwrap();
        market
            .create_listing(&provider(), 100, price_per_gb, 30)
            .unwrap();
        market
    }

    #[test]
    fn test_fee_rounds_down() {
        assert_eq!(platform_fee(2250), 11);
        assert_eq!(platform_fee(1000), 5);
        assert_eq!(platform_fee(199), 0);
        assert_eq!(platform_fee(200), 1);
        assert_eq!(platform_fee(u64::MAX), u64::MAX / 200);
    }

    #[test]
    fn test_purchase_storage() {
        let mut market = market(45);
        assert_eq!(market.purchase_storage(&buyer(), 1, 50), Ok(1));
        let contract = market.get_contract(1).unwrap();
        assert_eq!(contract.provider, provider());
        assert_eq!(contract.buyer, buyer());
        assert_eq!(contract.space_gb, 50);
        assert_eq!(contract.duration_days, 30);
        assert_eq!(contract.total_price, 2250);
        assert_eq!(contract.platform_fee, 11);
        assert_eq!(contract.provider_payout(), 2239);
        assert!(!contract.is_completed);
        assert!(!contract.is_disputed);
        assert_eq!(market.get_listing(1).unwrap().space_gb, 50);
    }

    #[test]
    fn test_purchase_exhausts_listing() {
        let mut market = market(45);
        market.purchase_storage(&buyer(), 1, 60).unwrap();
        assert_eq!(
            market.purchase_storage(&buyer(), 1, 41),
            Err(MarketError::InsufficientStorage)
        );
        assert_eq!(market.purchase_storage(&buyer(), 1, 40), Ok(2));
        assert!(!market.get_listing(1).unwrap().is_active);
        assert_eq!(
            market.purchase_storage(&buyer(), 1, 1),
            Err(MarketError::NotActive)
        );
    }

    #[test]
    fn test_purchase_missing_listing() {
        let mut market = market(45);
        assert_eq!(
            market.purchase_storage(&buyer(), 9, 1),
            Err(MarketError::NotFound)
        );
        assert_eq!(
            market.purchase_storage(&buyer(), 1, 0),
            Err(MarketError::InvalidAmount)
        );
        assert!(market.get_contract(1).is_none());
    }

    #[test]
    fn test_purchase_overflow_leaves_listing_untouched() {
        let mut market = Market::new(Principal::new("admin"));
        market.register_provider(&provider(), u64::MAX, 1).unwrap();
        market
            .create_listing(&provider(), u64::MAX, u64::MAX, 1)
            .unwrap();
        assert_eq!(
            market.purchase_storage(&buyer(), 1, 2),
            Err(MarketError::Overflow)
        );
        assert_eq!(market.get_listing(1).unwrap().space_gb, u64::MAX);
    }

    #[test]
    fn test_complete_contract() {
        let mut market = market(45);
        market.purchase_storage(&buyer(), 1, 50).unwrap();
        assert_eq!(
            market.complete_contract(&provider(), 1),
            Err(MarketError::Unauthorized)
        );
        assert_eq!(market.complete_contract(&buyer(), 1), Ok(true));
        assert!(market.get_contract(1).unwrap().is_completed);
        let info = market.get_provider_info(&provider()).unwrap();
        assert_eq!(info.total_contracts, 1);
        assert_eq!(info.successful_contracts, 1);
        assert_eq!(info.reputation_score, 100);
        assert_eq!(
            market.complete_contract(&buyer(), 1),
            Err(MarketError::AlreadyCompleted)
        );
        assert_eq!(
            market.complete_contract(&buyer(), 2),
            Err(MarketError::NotFound)
        );
    }
}
