//! Resume persistence, keyed by user id.
//!
//! The session layer only sees the [`ResumeRepository`] trait, so storage is
//! swapped at startup (`RESUME_STORE_DIR` set → JSON files, otherwise memory).

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::models::ResumeRecord;

pub mod file;

pub use file::FileResumeRepository;

#[async_trait]
pub trait ResumeRepository: Send + Sync {
    async fn load(&self, user_id: &str) -> Result<Option<ResumeRecord>>;
    async fn save(&self, user_id: &str, record: &ResumeRecord) -> Result<()>;
}

/// Process-local store. Contents are lost on restart.
#[derive(Default)]
pub struct InMemoryResumeRepository {
    records: RwLock<HashMap<String, ResumeRecord>>,
}

impl InMemoryResumeRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResumeRepository for InMemoryResumeRepository {
    async fn load(&self, user_id: &str) -> Result<Option<ResumeRecord>> {
        Ok(self.records.read().await.get(user_id).cloned())
    }

    async fn save(&self, user_id: &str, record: &ResumeRecord) -> Result<()> {
        self.records
            .write()
            .await
            .insert(user_id.to_string(), record.clone());
        Ok(())
    }
}
