mod contracts;
mod disputes;
pub mod error;
mod files;
mod listings;
mod providers;
mod stats;
pub mod types;

use indexmap::IndexMap;

pub use error::{MarketError, Result};
pub use types::{
    Contract, Dispute, FileMetadata, Listing, MAX_REPUTATION, PLATFORM_FEE_RATE, PlatformStats,
    Principal, Provider,
};

/// The full ledger state. Owned by a single writer; every operation validates before it
/// mutates so a failed call leaves the state untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Market {
    administrator: Principal,
    providers: IndexMap<Principal, Provider>,
    listings: IndexMap<u64, Listing>,
    contracts: IndexMap<u64, Contract>,
    disputes: IndexMap<u64, Dispute>,
    files: IndexMap<u64, FileMetadata>,
    next_listing_id: u64,
    next_contract_id: u64,
    next_dispute_id: u64,
    next_file_id: u64,
    total_fees: u64,
}

impl Market {
    pub fn new(administrator: Principal) -> Self {
        Self {
            administrator,
            providers: IndexMap::new(),
            listings: IndexMap::new(),
            contracts: IndexMap::new(),
            disputes: IndexMap::new(),
            files: IndexMap::new(),
            next_listing_id: 1,
            next_contract_id: 1,
            next_dispute_id: 1,
            next_file_id: 1,
            total_fees: 0,
        }
    }

    pub fn administrator(&self) -> &Principal {
        &self.administrator
    }

    pub fn providers(&self) -> impl Iterator<Item = (&Principal, &Provider)> {
        self.providers.iter()
    }

    pub fn listings(&self) -> impl Iterator<Item = (&u64, &Listing)> {
        self.listings.iter()
    }

    pub fn contracts(&self) -> impl Iterator<Item = (&u64, &Contract)> {
        self.contracts.iter()
    }

    pub fn files(&self) -> impl Iterator<Item = (&u64, &FileMetadata)> {
        self.files.iter()
    }
}

fn allocate(counter: &mut u64) -> u64 {
    let id = *counter;
    *counter += 1;
    id
}
