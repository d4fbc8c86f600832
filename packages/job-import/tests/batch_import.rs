//! Integration tests for batch and single-page imports.
//!
//! These drive the flows end to end against scripted extractors:
//! 1. Discover links on a listing page
//! 2. Import each link in order
//! 3. Check item statuses, tallies and what reached the sink

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::broadcast::error::TryRecvError;
use tokio_util::sync::CancellationToken;

use job_import::testing::{job_record, session_record, MockExtractor, MockFailure, MockTransport};
use job_import::types::request::{JOB_TEMPLATE, LISTING_TEMPLATE};
use job_import::{
    BatchConfig, BatchImporter, BatchOutcome, BatchPhase, ClassifierHints, ClientConfig,
    EntityKind, ExtractionClient, ExtractionRequest, ImportError, JobCategory, LinkDescriptor,
    LinkStatus, MemorySink, NormalizedEntity, PersistenceSink, SingleImport, SubmitReport,
    TemplateRef, TransportResponse,
};

const LISTING: &str = "https://jobs.example.com/offers";

fn item_url(i: usize) -> String {
    format!("https://jobs.example.com/offers/{i}")
}

/// Extractor with a listing of `n` links, each pointing at a valid job page.
fn listing_with_jobs(n: usize) -> MockExtractor {
    let links: Vec<_> = (1..=n)
        .map(|i| json!({"name": format!("Offer {i}"), "url": format!("/offers/{i}")}))
        .collect();

    (1..=n).fold(
        MockExtractor::new().with_page(LISTING, json!({ "links": links })),
        |extractor, i| extractor.with_page(item_url(i), job_record(&format!("Cook {i}"), "Merano")),
    )
}

fn no_delay() -> BatchConfig {
    BatchConfig::default().with_delay(Duration::ZERO)
}

fn listing_request() -> ExtractionRequest {
    ExtractionRequest::builder(LISTING).build()
}

/// Sink that cancels the run once it has accepted `after` submissions.
struct CancellingSink {
    inner: MemorySink,
    token: CancellationToken,
    after: usize,
    submits: AtomicUsize,
}

impl CancellingSink {
    fn new(token: CancellationToken, after: usize) -> Self {
        Self {
            inner: MemorySink::new(),
            token,
            after,
            submits: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl PersistenceSink for CancellingSink {
    async fn submit(&self, entities: Vec<NormalizedEntity>) -> job_import::Result<SubmitReport> {
        let report = self.inner.submit(entities).await?;
        if self.submits.fetch_add(1, Ordering::SeqCst) + 1 == self.after {
            self.token.cancel();
        }
        Ok(report)
    }

    async fn count(&self) -> job_import::Result<usize> {
        self.inner.count().await
    }
}

// =============================================================================
// Batch runs
// =============================================================================

#[tokio::test]
async fn test_one_failing_item_does_not_stop_the_run() {
    let extractor = listing_with_jobs(5).with_failure(
        item_url(3),
        MockFailure::Http(502, "upstream exploded".to_string()),
    );
    let sink = Arc::new(MemorySink::new());
    let importer = BatchImporter::new(extractor.clone(), sink.clone(), no_delay());

    let links = importer.discover(&listing_request()).await.unwrap();
    assert_eq!(links.len(), 5);

    let summary = importer
        .run(&listing_request(), links, EntityKind::Job, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(summary.outcome, BatchOutcome::PartiallyFailed);
    assert_eq!(summary.succeeded, 4);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.skipped, 0);
    assert_eq!(summary.auto_close_after, None);
    assert_eq!(summary.snapshot.progress, 100);

    let statuses: Vec<_> = summary.snapshot.links.iter().map(|l| l.status).collect();
    assert_eq!(
        statuses,
        vec![
            LinkStatus::Success,
            LinkStatus::Success,
            LinkStatus::Error,
            LinkStatus::Success,
            LinkStatus::Success,
        ]
    );
    let failed = &summary.snapshot.links[2];
    assert!(failed.error.as_deref().unwrap().contains("upstream exploded"));
    assert!(summary.snapshot.links[0].error.is_none());

    assert_eq!(sink.count().await.unwrap(), 4);
    assert!(sink.get(&item_url(3)).is_none());
}

#[tokio::test]
async fn test_items_run_in_discovery_order_with_item_template() {
    let extractor = listing_with_jobs(3);
    let importer = BatchImporter::new(extractor.clone(), MemorySink::new(), no_delay());

    let links = importer.discover(&listing_request()).await.unwrap();
    importer
        .run(&listing_request(), links, EntityKind::Job, &CancellationToken::new())
        .await
        .unwrap();

    let calls = extractor.calls();
    assert_eq!(
        extractor.called_urls(),
        vec![LISTING.to_string(), item_url(1), item_url(2), item_url(3)]
    );
    assert_eq!(calls[0].template, TemplateRef::Named(LISTING_TEMPLATE.to_string()));
    for call in &calls[1..] {
        assert_eq!(call.template, TemplateRef::Named(JOB_TEMPLATE.to_string()));
    }
}

#[tokio::test]
async fn test_clean_run_sets_auto_close() {
    let importer = BatchImporter::new(
        listing_with_jobs(2),
        MemorySink::new(),
        no_delay().with_auto_close_delay(Duration::from_millis(750)),
    );

    let links = importer.discover(&listing_request()).await.unwrap();
    let summary = importer
        .run(&listing_request(), links, EntityKind::Job, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(summary.outcome, BatchOutcome::Completed);
    assert_eq!(summary.auto_close_after, Some(Duration::from_millis(750)));
    assert_eq!(summary.snapshot.phase, BatchPhase::Finished);
    assert_eq!(importer.sink().count().await.unwrap(), 2);
}

#[tokio::test]
async fn test_cancel_after_second_item_leaves_rest_pending() {
    let token = CancellationToken::new();
    let extractor = listing_with_jobs(5);
    let sink = Arc::new(CancellingSink::new(token.clone(), 2));
    let importer = BatchImporter::new(extractor.clone(), sink.clone(), no_delay());

    let links = importer.discover(&listing_request()).await.unwrap();
    let summary = importer
        .run(&listing_request(), links, EntityKind::Job, &token)
        .await
        .unwrap();

    assert_eq!(summary.outcome, BatchOutcome::Cancelled);
    assert_eq!(summary.processed(), 2);
    assert_eq!(summary.skipped, 3);
    assert!(summary.snapshot.cancelled);

    let statuses: Vec<_> = summary.snapshot.links.iter().map(|l| l.status).collect();
    assert_eq!(
        statuses,
        vec![
            LinkStatus::Success,
            LinkStatus::Success,
            LinkStatus::Pending,
            LinkStatus::Pending,
            LinkStatus::Pending,
        ]
    );

    // listing + two items, nothing after the cancel
    assert_eq!(extractor.calls().len(), 3);
    assert_eq!(sink.count().await.unwrap(), 2);
    assert!(summary.message().contains("3 skipped"));
}

#[tokio::test]
async fn test_cancel_interrupts_the_pause() {
    let token = CancellationToken::new();
    let sink = Arc::new(CancellingSink::new(token.clone(), 1));
    let importer = BatchImporter::new(
        listing_with_jobs(3),
        sink,
        BatchConfig::default().with_delay(Duration::from_secs(60)),
    );

    let links = importer.discover(&listing_request()).await.unwrap();
    let summary = tokio::time::timeout(
        Duration::from_secs(5),
        importer.run(&listing_request(), links, EntityKind::Job, &token),
    )
    .await
    .expect("cancel should cut the pause short")
    .unwrap();

    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.skipped, 2);
}

#[tokio::test]
async fn test_pacing_delay_between_items() {
    let importer = BatchImporter::new(
        listing_with_jobs(3),
        MemorySink::new(),
        BatchConfig::default().with_delay(Duration::from_millis(30)),
    );

    let links = importer.discover(&listing_request()).await.unwrap();
    let started = std::time::Instant::now();
    let summary = importer
        .run(&listing_request(), links, EntityKind::Job, &CancellationToken::new())
        .await
        .unwrap();

    // two pauses for three items
    assert!(started.elapsed() >= Duration::from_millis(60));
    assert_eq!(summary.outcome, BatchOutcome::Completed);
}

#[tokio::test]
async fn test_cancelled_before_start_skips_everything() {
    let token = CancellationToken::new();
    token.cancel();
    let extractor = listing_with_jobs(2);
    let importer = BatchImporter::new(extractor.clone(), MemorySink::new(), no_delay());

    let links = vec![
        LinkDescriptor::new("One", item_url(1)),
        LinkDescriptor::new("Two", item_url(2)),
    ];
    let summary = importer
        .run(&listing_request(), links, EntityKind::Job, &token)
        .await
        .unwrap();

    assert_eq!(summary.outcome, BatchOutcome::Cancelled);
    assert_eq!(summary.skipped, 2);
    assert!(extractor.calls().is_empty());
}

#[tokio::test]
async fn test_invalid_record_is_an_item_error() {
    let extractor = MockExtractor::new()
        .with_page(item_url(1), json!({"title": "Cook"}))
        .with_page(item_url(2), job_record("Cook", "Merano"));
    let importer = BatchImporter::new(extractor, MemorySink::new(), no_delay());

    let links = vec![
        LinkDescriptor::new("Broken", item_url(1)),
        LinkDescriptor::new("Fine", item_url(2)),
    ];
    let summary = importer
        .run(&listing_request(), links, EntityKind::Job, &CancellationToken::new())
        .await
        .unwrap();

    let error = summary.snapshot.links[0].error.clone().unwrap();
    assert!(error.contains("company"));
    assert!(error.contains("employment_type"));
    assert_eq!(summary.snapshot.links[1].status, LinkStatus::Success);
}

#[tokio::test]
async fn test_link_hint_feeds_the_classifier() {
    let extractor = MockExtractor::new().with_page(item_url(1), job_record("Cook", "Merano"));
    let sink = Arc::new(MemorySink::new());
    let importer = BatchImporter::new(extractor, sink.clone(), no_delay());

    let links = vec![LinkDescriptor::new("Shop cook", item_url(1)).with_hint("retail")];
    importer
        .run(&listing_request(), links, EntityKind::Job, &CancellationToken::new())
        .await
        .unwrap();

    match sink.get(&item_url(1)).unwrap() {
        NormalizedEntity::Job(job) => assert_eq!(job.category, JobCategory::Retail),
        other => panic!("expected a job, got {other:?}"),
    }
}

#[tokio::test]
async fn test_session_batch() {
    let extractor = MockExtractor::new()
        .with_page(
            "https://events.example.com/calendar",
            json!({"data": {"sessions": [
                {"title": "CV clinic", "href": "/e/1"},
                {"title": "Deutschkurs", "href": "/e/2"}
            ]}}),
        )
        .with_page(
            "https://events.example.com/e/1",
            session_record("CV clinic", "Bolzano"),
        )
        .with_page(
            "https://events.example.com/e/2",
            session_record("Deutschkurs A2", "Brixen"),
        );
    let sink = Arc::new(MemorySink::new());
    let importer = BatchImporter::new(extractor, sink.clone(), no_delay());

    let listing = ExtractionRequest::builder("https://events.example.com/calendar")
        .template(EntityKind::Session.default_template())
        .build();
    let links = importer.discover(&listing).await.unwrap();
    let summary = importer
        .run(&listing, links, EntityKind::Session, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(summary.outcome, BatchOutcome::Completed);
    assert!(sink
        .entities()
        .iter()
        .all(|e| e.kind() == EntityKind::Session));
}

// =============================================================================
// Discovery
// =============================================================================

#[tokio::test]
async fn test_listing_without_links_is_terminal() {
    let extractor = MockExtractor::new().with_page(LISTING, json!({"links": []}));
    let importer = BatchImporter::new(extractor.clone(), MemorySink::new(), no_delay());

    let err = importer.discover(&listing_request()).await.unwrap_err();

    assert!(matches!(err, ImportError::NoLinks { .. }));
    assert_eq!(extractor.calls().len(), 1);
}

#[tokio::test]
async fn test_run_without_links_is_terminal() {
    let extractor = MockExtractor::new();
    let importer = BatchImporter::new(extractor.clone(), MemorySink::new(), no_delay());
    let mut updates = importer.subscribe();

    let err = importer
        .run(&listing_request(), Vec::new(), EntityKind::Job, &CancellationToken::new())
        .await
        .unwrap_err();

    match err {
        ImportError::NoLinks { url } => assert_eq!(url, LISTING),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(extractor.calls().is_empty());
    assert!(matches!(updates.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn test_listing_extraction_failure_propagates() {
    let extractor = MockExtractor::new().with_failure(LISTING, MockFailure::Timeout);
    let importer = BatchImporter::new(extractor, MemorySink::new(), no_delay());

    let err = importer.discover(&listing_request()).await.unwrap_err();
    assert!(matches!(err, ImportError::Timeout { .. }));
}

#[tokio::test]
async fn test_invalid_listing_url_is_rejected_locally() {
    let extractor = MockExtractor::new();
    let importer = BatchImporter::new(extractor.clone(), MemorySink::new(), no_delay());

    let err = importer
        .discover(&ExtractionRequest::builder("offers").build())
        .await
        .unwrap_err();

    assert!(matches!(err, ImportError::ClientValidation { .. }));
    assert!(extractor.calls().is_empty());
}

// =============================================================================
// Snapshot stream
// =============================================================================

#[tokio::test]
async fn test_snapshot_stream_follows_each_transition() {
    let extractor = listing_with_jobs(2).with_failure(item_url(2), MockFailure::Network("reset".into()));
    let importer = BatchImporter::new(extractor, MemorySink::new(), no_delay());
    let mut updates = importer.subscribe();

    let links = importer.discover(&listing_request()).await.unwrap();
    importer
        .run(&listing_request(), links, EntityKind::Job, &CancellationToken::new())
        .await
        .unwrap();

    let mut seen = Vec::new();
    loop {
        match updates.try_recv() {
            Ok(snapshot) => seen.push(snapshot),
            Err(TryRecvError::Empty) => break,
            Err(other) => panic!("unexpected channel state: {other:?}"),
        }
    }

    let trace: Vec<(BatchPhase, Vec<LinkStatus>, u8)> = seen
        .iter()
        .map(|s| (s.phase, s.links.iter().map(|l| l.status).collect(), s.progress))
        .collect();

    use LinkStatus::*;
    assert_eq!(
        trace,
        vec![
            (BatchPhase::Ready, vec![Pending, Pending], 0),
            (BatchPhase::Running, vec![Importing, Pending], 0),
            (BatchPhase::Running, vec![Success, Pending], 50),
            (BatchPhase::Running, vec![Success, Importing], 50),
            (BatchPhase::Running, vec![Success, Error], 100),
            (BatchPhase::Finished, vec![Success, Error], 100),
        ]
    );
}

// =============================================================================
// Through the real client
// =============================================================================

fn envelope(data: serde_json::Value) -> TransportResponse {
    TransportResponse::new(
        200,
        json!({
            "status": "success",
            "process_id": "p-1",
            "data": {"structured_data": data}
        })
        .to_string(),
    )
}

#[tokio::test]
async fn test_batch_through_extraction_client() {
    let transport = MockTransport::new()
        .with_response(
            LISTING,
            envelope(json!({"items": [{"name": "Cook", "url": item_url(1)}]})),
        )
        .with_response(item_url(1), envelope(job_record("Cook", "Merano")));
    let client = ExtractionClient::new(
        transport.clone(),
        ClientConfig::new("https://extractor.example.com/api/extract"),
    )
    .unwrap();
    let sink = Arc::new(MemorySink::new());
    let importer = BatchImporter::new(client, sink.clone(), no_delay());

    let request = ExtractionRequest::builder(LISTING)
        .source_language("de")
        .use_cache(true)
        .build();
    let links = importer.discover(&request).await.unwrap();
    let summary = importer
        .run(&request, links, EntityKind::Job, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(summary.outcome, BatchOutcome::Completed);
    assert_eq!(sink.count().await.unwrap(), 1);

    let calls = transport.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].field("template"), Some(LISTING_TEMPLATE));
    assert_eq!(calls[1].field("template"), Some(JOB_TEMPLATE));
    assert_eq!(calls[1].field("source_language"), Some("de"));
    assert_eq!(calls[1].field("use_cache"), Some("true"));
}

#[tokio::test]
async fn test_listing_selector_is_not_applied_to_items() {
    let transport = MockTransport::new()
        .with_response(
            LISTING,
            envelope(json!({"items": [
                {"name": "Cook", "url": item_url(1)},
                {"name": "Waiter", "url": item_url(2)}
            ]})),
        )
        .with_response(item_url(1), envelope(job_record("Cook", "Merano")))
        .with_response(item_url(2), envelope(job_record("Waiter", "Bolzano")));
    let client = ExtractionClient::new(
        transport.clone(),
        ClientConfig::new("https://extractor.example.com/api/extract"),
    )
    .unwrap();
    let importer = BatchImporter::new(client, MemorySink::new(), no_delay());

    let request = ExtractionRequest::builder(LISTING)
        .container_selector("//ul[@id='offers']")
        .build();
    let links = importer.discover(&request).await.unwrap();
    let summary = importer
        .run(&request, links, EntityKind::Job, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(summary.outcome, BatchOutcome::Completed);

    let calls = transport.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[0].field("container_selector"), Some("//ul[@id='offers']"));
    assert_eq!(calls[1].field("container_selector"), None);
    assert_eq!(calls[2].field("container_selector"), None);
}

// =============================================================================
// Single page
// =============================================================================

#[tokio::test]
async fn test_single_import_round_trip_upserts() {
    let url = item_url(7);
    let sink = Arc::new(MemorySink::new());
    let flow = SingleImport::new(
        MockExtractor::new().with_page(url.clone(), job_record("Cook", "Merano")),
        sink.clone(),
    );
    let request = ExtractionRequest::builder(url.clone()).build();

    for _ in 0..2 {
        let preview = flow.preview(request.clone()).await.unwrap();
        flow.confirm(preview, EntityKind::Job, &ClassifierHints::default())
            .await
            .unwrap();
    }

    // same source URL twice is one entry
    assert_eq!(sink.count().await.unwrap(), 1);
    assert_eq!(sink.submit_calls(), 2);
}

#[tokio::test]
async fn test_rejected_preview_stores_nothing() {
    let url = item_url(8);
    let sink = Arc::new(MemorySink::new());
    let flow = SingleImport::new(
        MockExtractor::new().with_page(url.clone(), job_record("Cook", "Merano")),
        sink.clone(),
    );

    let preview = flow
        .preview(ExtractionRequest::builder(url).build())
        .await
        .unwrap();
    preview.reject();

    assert_eq!(sink.submit_calls(), 0);
}
