use super::{Listing, Market, MarketError, Principal, Result, allocate};

impl Market {
    pub fn create_listing(
        &mut self,
        caller: &Principal,
        space_gb: u64,
        price_per_gb: u64,
        duration_days: u64,
    ) -> Result<u64> {
        let provider = self
            .providers
            .get_mut(caller)
            .ok_or(MarketError::Unauthorized)?;
        if !provider.is_active {
            return Err(MarketError::NotActive);
        }
        if space_gb == 0 || price_per_gb == 0 || duration_days == 0 {
            return Err(MarketError::InvalidAmount);
        }
        if space_gb > provider.available_space {
            return Err(MarketError::InsufficientStorage);
        }
        provider.available_space -= space_gb;

        let listing_id = allocate(&mut self.next_listing_id);
        self.listings.insert(
            listing_id,
            Listing::builder()
                .provider(caller.clone())
                .space_gb(space_gb)
                .price_per_gb(price_per_gb)
                .duration_days(duration_days)
                .build(),
        );
        Ok(listing_id)
    }

    /// Withdraws an active listing and hands its unsold space back to the provider.
    pub fn cancel_listing(&mut self, caller: &Principal, listing_id: u64) -> Result<bool> {
        let listing = self
            .listings
            .get_mut(&listing_id)
            .ok_or(MarketError::NotFound)?;
        if &listing.provider != caller {
            return Err(MarketError::Unauthorized);
        }
        if !listing.is_active {
            return Err(MarketError::NotActive);
        }
        let provider = self
            .providers
            .get_mut(caller)
            .ok_or(MarketError::NotFound)?;
        provider.available_space = provider
            .available_space
            .saturating_add(listing.space_gb)
            .min(provider.total_space);
        listing.is_active = false;
        Ok(true)
    }

    pub fn get_listing(&self, listing_id: u64) -> Option<&Listing> {
        self.listings.get(&listing_id)
    }

    pub(super) fn total_listings(&self) -> u64 {
        self.next_listing_id - 1
    }
}
