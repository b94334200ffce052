use std::path::{Path, PathBuf};

use anyhow::Context;
use deadpool::managed::{self, Pool, RecycleError};
use libsql::params;

use super::connection::new_connection;

pub const MAX_READERS: usize = 10;

#[derive(Debug)]
pub struct Manager {
    path: PathBuf,
}

impl Manager {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }
}

impl managed::Manager for Manager {
    type Type = libsql::Connection;
    type Error = anyhow::Error;

    async fn create(&self) -> anyhow::Result<Self::Type> {
        new_connection(&self.path).await
    }

    /// A reader is reusable while it can still see the journal.
    async fn recycle(
        &self,
        conn: &mut Self::Type,
        _: &managed::Metrics,
    ) -> managed::RecycleResult<anyhow::Error> {
        let mut rows = conn
            .query("SELECT COUNT(*) FROM blocks", params![])
            .await
            .map_err(|e| RecycleError::Message(format!("{}", e).into()))?;
        match rows.next().await {
            Ok(Some(_)) => Ok(()),
            Ok(None) => Err(RecycleError::Message("No rows returned".into())),
            Err(e) => Err(RecycleError::Message(format!("{}", e).into())),
        }
    }
}

pub async fn new_pool(path: &Path) -> anyhow::Result<Pool<Manager>> {
    Pool::builder(Manager::new(path))
        .max_size(MAX_READERS)
        .build()
        .context("Failed to build ledger reader pool")
}
