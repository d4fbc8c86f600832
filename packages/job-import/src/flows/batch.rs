//! Batch import over the links of a listing page.
//!
//! Items run one at a time in discovery order with a pause between them.
//! Every state change produces a new [`BatchSnapshot`]; subscribers receive
//! them over a broadcast channel. The snapshot transition itself
//! ([`BatchSnapshot::apply`]) is pure and has no IO.

use std::time::Duration;

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{ImportError, Result};
use crate::normalize::{extract_links, normalize, ClassifierHints};
use crate::traits::{Extractor, PersistenceSink};
use crate::types::request::LISTING_TEMPLATE;
use crate::types::{
    EntityKind, ExtractionRequest, LinkDescriptor, LinkStatus, NormalizedEntity, TemplateRef,
};

/// Pacing and channel settings for a batch run.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Pause between two items
    pub delay: Duration,
    /// How long a surface should wait before closing after a clean run
    pub auto_close_delay: Duration,
    /// Snapshot channel capacity
    pub channel_capacity: usize,
    /// Named template used for link discovery
    pub listing_template: String,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(1500),
            auto_close_delay: Duration::from_secs(2),
            channel_capacity: 256,
            listing_template: LISTING_TEMPLATE.to_string(),
        }
    }
}

impl BatchConfig {
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_auto_close_delay(mut self, delay: Duration) -> Self {
        self.auto_close_delay = delay;
        self
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    pub fn with_listing_template(mut self, template: impl Into<String>) -> Self {
        self.listing_template = template.into();
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchPhase {
    Ready,
    Running,
    Cancelled,
    Finished,
}

/// Input to [`BatchSnapshot::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchEvent {
    ItemStarted { index: usize },
    ItemSucceeded { index: usize },
    ItemFailed { index: usize, message: String },
    Cancelled,
    Finished,
}

/// Immutable view of a batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSnapshot {
    pub links: Vec<LinkDescriptor>,
    /// 0 to 100
    pub progress: u8,
    pub succeeded: usize,
    pub failed: usize,
    pub phase: BatchPhase,
    /// Once set, never cleared
    pub cancelled: bool,
}

impl BatchSnapshot {
    pub fn new(links: Vec<LinkDescriptor>) -> Self {
        Self {
            links,
            progress: 0,
            succeeded: 0,
            failed: 0,
            phase: BatchPhase::Ready,
            cancelled: false,
        }
    }

    pub fn total(&self) -> usize {
        self.links.len()
    }

    pub fn processed(&self) -> usize {
        self.succeeded + self.failed
    }

    /// Items never started.
    pub fn skipped(&self) -> usize {
        self.links
            .iter()
            .filter(|link| link.status == LinkStatus::Pending)
            .count()
    }

    pub fn is_done(&self) -> bool {
        matches!(self.phase, BatchPhase::Cancelled | BatchPhase::Finished)
    }

    /// The snapshot after `event`. Events naming an unknown index change nothing.
    pub fn apply(&self, event: BatchEvent) -> BatchSnapshot {
        let mut next = self.clone();

        match event {
            BatchEvent::ItemStarted { index } => {
                if let Some(link) = next.links.get_mut(index) {
                    *link = link.with_status(LinkStatus::Importing, None);
                    next.phase = BatchPhase::Running;
                }
            }
            BatchEvent::ItemSucceeded { index } => {
                if let Some(link) = next.links.get_mut(index) {
                    *link = link.with_status(LinkStatus::Success, None);
                    next.succeeded += 1;
                    next.progress = progress_after(index, self.total());
                }
            }
            BatchEvent::ItemFailed { index, message } => {
                if let Some(link) = next.links.get_mut(index) {
                    *link = link.with_status(LinkStatus::Error, Some(message));
                    next.failed += 1;
                    next.progress = progress_after(index, self.total());
                }
            }
            BatchEvent::Cancelled => {
                next.cancelled = true;
                next.phase = BatchPhase::Cancelled;
            }
            BatchEvent::Finished => {
                if !next.cancelled {
                    next.phase = BatchPhase::Finished;
                }
            }
        }

        next
    }
}

fn progress_after(index: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    (((index + 1) * 100) / total).min(100) as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    /// Every item succeeded
    Completed,
    /// Ran to the end with at least one failure
    PartiallyFailed,
    /// Stopped early by the operator
    Cancelled,
}

/// Result of [`BatchImporter::run`].
#[derive(Debug, Clone)]
pub struct BatchSummary {
    pub outcome: BatchOutcome,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub snapshot: BatchSnapshot,
    /// Set on a clean run: close the surface and refresh the listing after this long
    pub auto_close_after: Option<Duration>,
}

impl BatchSummary {
    fn from_snapshot(snapshot: BatchSnapshot, auto_close_delay: Duration) -> Self {
        let outcome = if snapshot.cancelled {
            BatchOutcome::Cancelled
        } else if snapshot.failed == 0 {
            BatchOutcome::Completed
        } else {
            BatchOutcome::PartiallyFailed
        };

        Self {
            outcome,
            succeeded: snapshot.succeeded,
            failed: snapshot.failed,
            skipped: snapshot.skipped(),
            auto_close_after: (outcome == BatchOutcome::Completed).then_some(auto_close_delay),
            snapshot,
        }
    }

    pub fn processed(&self) -> usize {
        self.succeeded + self.failed
    }

    /// One line for the operator.
    pub fn message(&self) -> String {
        match self.outcome {
            BatchOutcome::Completed => format!("Imported all {} items", self.succeeded),
            BatchOutcome::PartiallyFailed => format!(
                "Imported {} items, {} failed",
                self.succeeded, self.failed
            ),
            BatchOutcome::Cancelled => format!(
                "Cancelled after {} items: {} imported, {} failed, {} skipped",
                self.processed(),
                self.succeeded,
                self.failed,
                self.skipped
            ),
        }
    }
}

/// Discovers links on a listing page and imports them one by one.
pub struct BatchImporter<E, S> {
    extractor: E,
    sink: S,
    config: BatchConfig,
    updates: broadcast::Sender<BatchSnapshot>,
}

impl<E: Extractor, S: PersistenceSink> BatchImporter<E, S> {
    pub fn new(extractor: E, sink: S, config: BatchConfig) -> Self {
        let (updates, _) = broadcast::channel(config.channel_capacity.max(1));
        Self {
            extractor,
            sink,
            config,
            updates,
        }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Stream of snapshots from every run started after subscribing.
    pub fn subscribe(&self) -> broadcast::Receiver<BatchSnapshot> {
        self.updates.subscribe()
    }

    /// Extract the listing page with the listing template and return its links.
    pub async fn discover(&self, listing: &ExtractionRequest) -> Result<Vec<LinkDescriptor>> {
        let listing_url = listing.validate()?;
        let request = listing.with_template(TemplateRef::Named(self.config.listing_template.clone()));

        let record = self.extractor.extract(&request).await?.into_record()?;
        let links = extract_links(&record, &listing_url);

        if links.is_empty() {
            warn!(url = %listing_url, "No links found on listing page");
            return Err(ImportError::NoLinks {
                url: listing_url.to_string(),
            });
        }

        info!(url = %listing_url, count = links.len(), "Discovered links");
        Ok(links)
    }

    /// Import `links` in order using `request` for every setting but the URL
    /// and the container selector, which only applies to the listing page.
    ///
    /// An empty `links` is rejected with [`ImportError::NoLinks`] before any
    /// snapshot is published. Per-item failures are recorded on the item and the run continues.
    /// `cancel` is checked before each item and during the pause; an item
    /// already in flight always completes.
    pub async fn run(
        &self,
        request: &ExtractionRequest,
        links: Vec<LinkDescriptor>,
        kind: EntityKind,
        cancel: &CancellationToken,
    ) -> Result<BatchSummary> {
        if links.is_empty() {
            warn!(url = %request.url(), "Batch started without links");
            return Err(ImportError::NoLinks {
                url: request.url().to_string(),
            });
        }

        let total = links.len();
        let mut snapshot = BatchSnapshot::new(links);
        self.publish(&snapshot);

        info!(total, kind = %kind, "Starting batch import");

        for index in 0..total {
            if cancel.is_cancelled() {
                info!(index, "Batch cancelled before item");
                snapshot = self.transition(&snapshot, BatchEvent::Cancelled);
                break;
            }

            let link = snapshot.links[index].clone();
            snapshot = self.transition(&snapshot, BatchEvent::ItemStarted { index });

            let item_request = request
                .for_url(link.url.as_str())
                .without_container_selector();
            let hints = ClassifierHints {
                category: link.hint.clone(),
                region: None,
            };

            let event = match self.import_one(&item_request, kind, &hints).await {
                Ok(entity) => {
                    info!(index, url = %link.url, id = %entity.id(), "Imported item");
                    BatchEvent::ItemSucceeded { index }
                }
                Err(e) => {
                    warn!(index, url = %link.url, error = %e, "Item import failed");
                    BatchEvent::ItemFailed {
                        index,
                        message: e.to_string(),
                    }
                }
            };
            snapshot = self.transition(&snapshot, event);

            if index + 1 < total && !self.config.delay.is_zero() {
                tokio::select! {
                    _ = cancel.cancelled() => {}
                    _ = tokio::time::sleep(self.config.delay) => {}
                }
            }
        }

        if !snapshot.cancelled {
            snapshot = self.transition(&snapshot, BatchEvent::Finished);
        }

        let summary = BatchSummary::from_snapshot(snapshot, self.config.auto_close_delay);
        info!(
            outcome = ?summary.outcome,
            succeeded = summary.succeeded,
            failed = summary.failed,
            skipped = summary.skipped,
            "Batch import finished"
        );
        Ok(summary)
    }

    async fn import_one(
        &self,
        request: &ExtractionRequest,
        kind: EntityKind,
        hints: &ClassifierHints,
    ) -> Result<NormalizedEntity> {
        let record = self.extractor.extract(request).await?.into_record()?;
        let entity = normalize(kind, &record, request.url(), hints)?;
        self.sink.submit(vec![entity.clone()]).await?;
        Ok(entity)
    }

    fn transition(&self, current: &BatchSnapshot, event: BatchEvent) -> BatchSnapshot {
        debug!(event = ?event, "Batch transition");
        let next = current.apply(event);
        self.publish(&next);
        next
    }

    fn publish(&self, snapshot: &BatchSnapshot) {
        // No subscribers is fine
        let _ = self.updates.send(snapshot.clone());
    }
}
