use super::{Dispute, Market, MarketError, Principal, Result, allocate};

impl Market {
    /// Either party of a contract may raise a dispute; it blocks completion until the
    /// administrator resolves it.
    pub fn create_dispute(
        &mut self,
        caller: &Principal,
        contract_id: u64,
        reason: &str,
    ) -> Result<u64> {
        let contract = self
            .contracts
            .get_mut(&contract_id)
            .ok_or(MarketError::NotFound)?;
        if &contract.buyer != caller && &contract.provider != caller {
            return Err(MarketError::Unauthorized);
        }
        if contract.is_completed {
            return Err(MarketError::AlreadyCompleted);
        }
        if contract.is_disputed {
            return Err(MarketError::AlreadyDisputed);
        }
        if reason.trim().is_empty() {
            return Err(MarketError::InvalidAmount);
        }
        contract.is_disputed = true;

        let dispute_id = allocate(&mut self.next_dispute_id);
        self.disputes.insert(
            dispute_id,
            Dispute::builder()
                .contract_id(contract_id)
                .complainant(caller.clone())
                .reason(reason.to_string())
                .build(),
        );
        Ok(dispute_id)
    }

    /// Marks a dispute resolved and lifts the completion block on its contract.
    pub fn resolve_dispute(
        &mut self,
        caller: &Principal,
        dispute_id: u64,
        resolution: &str,
    ) -> Result<bool> {
        if caller != &self.administrator {
            return Err(MarketError::Unauthorized);
        }
        let dispute = self
            .disputes
            .get_mut(&dispute_id)
            .ok_or(MarketError::NotFound)?;
        if dispute.is_resolved {
            return Err(MarketError::AlreadyCompleted);
        }
        dispute.is_resolved = true;
        dispute.resolution = Some(resolution.to_string());
        if let Some(contract) = self.contracts.get_mut(&dispute.contract_id) {
            contract.is_disputed = false;
        }
        Ok(true)
    }

    pub fn get_dispute(&self, dispute_id: u64) -> Option<&Dispute> {
        self.disputes.get(&dispute_id)
    }

    pub(super) fn total_disputes(&self) -> u64 {
        self.next_dispute_id - 1
    }
}
