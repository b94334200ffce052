use serde::{Deserialize, Serialize};

use crate::market::{Market, MarketError, Principal};

/// Functions callable against the ledger, with their arguments in call order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "function",
    content = "args",
    rename_all = "kebab-case",
    rename_all_fields = "kebab-case"
)]
pub enum Op {
    RegisterProvider {
        total_space: u64,
        price_per_gb: u64,
    },
    UpdateProviderInfo {
        new_total_space: u64,
        new_price_per_gb: u64,
    },
    SetProviderActive {
        is_active: bool,
    },
    CreateListing {
        space_gb: u64,
        price_per_gb: u64,
        duration_days: u64,
    },
    CancelListing {
        listing_id: u64,
    },
    PurchaseStorage {
        listing_id: u64,
        space_gb: u64,
    },
    CompleteContract {
        contract_id: u64,
    },
    CreateDispute {
        contract_id: u64,
        reason: String,
    },
    ResolveDispute {
        dispute_id: u64,
        resolution: String,
    },
    StoreFileMetadata {
        contract_id: u64,
        #[serde(with = "hex::serde")]
        content_hash: [u8; 32],
        file_size: u64,
        file_name: String,
        #[serde(with = "hex::serde")]
        encryption_key: [u8; 32],
    },
}

impl Op {
    pub fn function_name(&self) -> &'static str {
        match self {
            Op::RegisterProvider { .. } => "register-provider",
            Op::UpdateProviderInfo { .. } => "update-provider-info",
            Op::SetProviderActive { .. } => "set-provider-active",
            Op::CreateListing { .. } => "create-listing",
            Op::CancelListing { .. } => "cancel-listing",
            Op::PurchaseStorage { .. } => "purchase-storage",
            Op::CompleteContract { .. } => "complete-contract",
            Op::CreateDispute { .. } => "create-dispute",
            Op::ResolveDispute { .. } => "resolve-dispute",
            Op::StoreFileMetadata { .. } => "store-file-metadata",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Call {
    pub caller: Principal,
    pub op: Op,
}

impl Call {
    pub fn new(caller: &Principal, op: Op) -> Self {
        Self {
            caller: caller.clone(),
            op,
        }
    }

    /// Applies the call to the ledger. Either the whole call commits or nothing changes.
    pub fn apply(&self, market: &mut Market) -> ReceiptResult {
        let caller = &self.caller;
        let result = match &self.op {
            Op::RegisterProvider {
                total_space,
                price_per_gb,
            } => market
                .register_provider(caller, *total_space, *price_per_gb)
                .map(Value::Bool),
            Op::UpdateProviderInfo {
                new_total_space,
                new_price_per_gb,
            } => market
                .update_provider_info(caller, *new_total_space, *new_price_per_gb)
                .map(Value::Bool),
            Op::SetProviderActive { is_active } => market
                .set_provider_active(caller, *is_active)
                .map(Value::Bool),
            Op::CreateListing {
                space_gb,
                price_per_gb,
                duration_days,
            } => market
                .create_listing(caller, *space_gb, *price_per_gb, *duration_days)
                .map(Value::Id),
            Op::CancelListing { listing_id } => {
                market.cancel_listing(caller, *listing_id).map(Value::Bool)
            }
            Op::PurchaseStorage {
                listing_id,
                space_gb,
            } => market
                .purchase_storage(caller, *listing_id, *space_gb)
                .map(Value::Id),
            Op::CompleteContract { contract_id } => market
                .complete_contract(caller, *contract_id)
                .map(Value::Bool),
            Op::CreateDispute {
                contract_id,
                reason,
            } => market
                .create_dispute(caller, *contract_id, reason)
                .map(Value::Id),
            Op::ResolveDispute {
                dispute_id,
                resolution,
            } => market
                .resolve_dispute(caller, *dispute_id, resolution)
                .map(Value::Bool),
            Op::StoreFileMetadata {
                contract_id,
                content_hash,
                file_size,
                file_name,
                encryption_key,
            } => market
                .store_file_metadata(
                    caller,
                    *contract_id,
                    *content_hash,
                    *file_size,
                    file_name,
                    *encryption_key,
                )
                .map(Value::Id),
        };
        result.into()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Id(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReceiptResult {
    Ok(Value),
    Err(u32),
}

impl ReceiptResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, ReceiptResult::Ok(_))
    }

    pub fn error(&self) -> Option<MarketError> {
        match self {
            ReceiptResult::Ok(_) => None,
            ReceiptResult::Err(code) => MarketError::from_code(*code),
        }
    }
}

impl From<Result<Value, MarketError>> for ReceiptResult {
    fn from(result: Result<Value, MarketError>) -> Self {
        match result {
            Ok(value) => ReceiptResult::Ok(value),
            Err(e) => ReceiptResult::Err(e.code()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub call_index: u64,
    pub call: Call,
    pub result: ReceiptResult,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub height: u64,
    pub receipts: Vec<Receipt>,
}

/// Applies calls in order, each one seeing the effects of those before it.
pub fn apply_calls(market: &mut Market, height: u64, calls: Vec<Call>) -> Block {
    let receipts = calls
        .into_iter()
        .enumerate()
        .map(|(i, call)| {
            let result = call.apply(market);
            Receipt {
                call_index: i as u64,
                call,
                result,
            }
        })
        .collect();
    Block { height, receipts }
}
