use super::{
    FileMetadata, Market, MarketError, Principal, Result, allocate, types::MAX_FILE_NAME_LEN,
};

impl Market {
    pub fn store_file_metadata(
        &mut self,
        caller: &Principal,
        contract_id: u64,
        content_hash: [u8; 32],
        file_size: u64,
        file_name: &str,
        encryption_key: [u8; 32],
    ) -> Result<u64> {
        let contract = self
            .contracts
            .get(&contract_id)
            .ok_or(MarketError::NotFound)?;
        if &contract.buyer != caller {
            return Err(MarketError::Unauthorized);
        }
        // ascii only, so the byte length is the character count
        if file_size == 0
            || file_name.is_empty()
            || !file_name.is_ascii()
            || file_name.len() > MAX_FILE_NAME_LEN
        {
            return Err(MarketError::InvalidAmount);
        }
        let file_id = allocate(&mut self.next_file_id);
        self.files.insert(
            file_id,
            FileMetadata::builder()
                .contract_id(contract_id)
                .content_hash(content_hash)
                .file_size(file_size)
                .file_name(file_name.to_string())
                .encryption_key(encryption_key)
                .uploader(caller.clone())
                .build(),
        );
        Ok(file_id)
    }

    pub fn get_file_metadata(&self, file_id: u64) -> Option<&FileMetadata> {
        self.files.get(&file_id)
    }

    pub(super) fn total_files(&self) -> u64 {
        self.next_file_id - 1
    }
}
