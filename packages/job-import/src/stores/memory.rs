//! In-memory sink for testing and development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::Result;
use crate::traits::sink::{PersistenceSink, SubmitReport};
use crate::types::NormalizedEntity;

/// Entities keyed by source URL.
///
/// Data is lost when the sink is dropped.
pub struct MemorySink {
    entities: RwLock<HashMap<String, NormalizedEntity>>,
    submit_calls: RwLock<usize>,
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySink {
    pub fn new() -> Self {
        Self {
            entities: RwLock::new(HashMap::new()),
            submit_calls: RwLock::new(0),
        }
    }

    /// Number of `submit` calls, successful or not.
    pub fn submit_calls(&self) -> usize {
        *self.submit_calls.read().unwrap()
    }

    pub fn get(&self, source_url: &str) -> Option<NormalizedEntity> {
        self.entities.read().unwrap().get(source_url).cloned()
    }

    /// All stored entities, ordered by source URL.
    pub fn entities(&self) -> Vec<NormalizedEntity> {
        let mut entities: Vec<_> = self.entities.read().unwrap().values().cloned().collect();
        entities.sort_by(|a, b| a.source_url().cmp(b.source_url()));
        entities
    }

    pub fn clear(&self) {
        self.entities.write().unwrap().clear();
    }
}

#[async_trait]
impl PersistenceSink for MemorySink {
    async fn submit(&self, entities: Vec<NormalizedEntity>) -> Result<SubmitReport> {
        *self.submit_calls.write().unwrap() += 1;

        let mut stored = self.entities.write().unwrap();
        let mut report = SubmitReport::default();
        for entity in entities {
            match stored.insert(entity.source_url().to_string(), entity) {
                Some(_) => report.updated += 1,
                None => report.inserted += 1,
            }
        }
        Ok(report)
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.entities.read().unwrap().len())
    }
}
