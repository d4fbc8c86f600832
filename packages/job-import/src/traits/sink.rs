//! Persistence sink contract.
//!
//! The sink is an external collaborator: it accepts normalized entities and
//! upserts them by source URL. Its storage engine is not our concern.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::NormalizedEntity;

/// What a submission did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubmitReport {
    pub inserted: usize,
    pub updated: usize,
}

impl SubmitReport {
    pub fn total(&self) -> usize {
        self.inserted + self.updated
    }
}

#[async_trait]
pub trait PersistenceSink: Send + Sync {
    /// Store entities, replacing any existing entity with the same source URL.
    async fn submit(&self, entities: Vec<NormalizedEntity>) -> Result<SubmitReport>;

    /// Number of stored entities.
    async fn count(&self) -> Result<usize>;
}

#[async_trait]
impl<T: PersistenceSink + ?Sized> PersistenceSink for std::sync::Arc<T> {
    async fn submit(&self, entities: Vec<NormalizedEntity>) -> Result<SubmitReport> {
        (**self).submit(entities).await
    }

    async fn count(&self) -> Result<usize> {
        (**self).count().await
    }
}
