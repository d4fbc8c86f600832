//! Sink backed by one JSON file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{ImportError, Result};
use crate::traits::sink::{PersistenceSink, SubmitReport};
use crate::types::NormalizedEntity;

type Entries = BTreeMap<String, NormalizedEntity>;

/// A JSON object mapping source URL to entity.
///
/// Every submit reads the file, merges and writes it back under a lock. A
/// missing file is an empty store.
pub struct JsonFileSink {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Entries> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Entries::new()),
            Err(e) => return Err(self.io_error("read", e)),
        };

        if raw.trim().is_empty() {
            return Ok(Entries::new());
        }

        serde_json::from_str(&raw).map_err(|e| {
            ImportError::Persistence(format!("{} is not a valid store: {}", self.path.display(), e))
        })
    }

    async fn save(&self, entries: &Entries) -> Result<()> {
        let json = serde_json::to_string_pretty(entries)
            .map_err(|e| ImportError::Persistence(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error("create directory for", e))?;
        }

        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| self.io_error("write", e))
    }

    fn io_error(&self, action: &str, e: std::io::Error) -> ImportError {
        ImportError::Persistence(format!("failed to {} {}: {}", action, self.path.display(), e))
    }
}

#[async_trait]
impl PersistenceSink for JsonFileSink {
    async fn submit(&self, entities: Vec<NormalizedEntity>) -> Result<SubmitReport> {
        let _guard = self.lock.lock().await;

        let mut stored = self.load().await?;
        let mut report = SubmitReport::default();
        for entity in entities {
            match stored.insert(entity.source_url().to_string(), entity) {
                Some(_) => report.updated += 1,
                None => report.inserted += 1,
            }
        }
        self.save(&stored).await?;

        debug!(
            path = %self.path.display(),
            inserted = report.inserted,
            updated = report.updated,
            total = stored.len(),
            "Saved entities"
        );
        Ok(report)
    }

    async fn count(&self) -> Result<usize> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.len())
    }
}
