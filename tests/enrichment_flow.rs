//! Orchestration tests: resolution, fan-out, correlation and failure
//! aggregation against an in-memory store and a scripted transport.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use parcel_enrichment::enrichment::{
    EnrichmentRequest, EnrichmentTransport, TransportFailure, UpstreamReply,
};
use parcel_enrichment::store::InMemoryGeometryStore;
use parcel_enrichment::{
    AppConfig, Enrichment, EnrichmentError, EnrichmentOrchestrator, GeometryRecord,
};

// ── Scripted transport ─────────────────────────────────────────

#[derive(Clone)]
enum Script {
    Reply(u16, &'static str),
    Fail(TransportFailure),
}

#[derive(Default)]
struct ScriptedTransport {
    calls: Mutex<Vec<EnrichmentRequest>>,
    scripts: HashMap<String, Script>,
    delays: HashMap<String, Duration>,
}

impl ScriptedTransport {
    fn new() -> Self {
        Self::default()
    }

    fn with_script(mut self, id: &str, script: Script) -> Self {
        self.scripts.insert(id.to_string(), script);
        self
    }

    fn with_delay(mut self, id: &str, delay: Duration) -> Self {
        self.delays.insert(id.to_string(), delay);
        self
    }

    fn calls(&self) -> Vec<EnrichmentRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl EnrichmentTransport for ScriptedTransport {
    async fn post(&self, request: &EnrichmentRequest) -> Result<UpstreamReply, TransportFailure> {
        self.calls.lock().unwrap().push(request.clone());

        let Some(id) = request.identifier() else {
            let body: Value = serde_json::from_slice(&request.payload).unwrap();
            let count = body["features"].as_array().map(Vec::len).unwrap_or(0);
            return Ok(UpstreamReply {
                status: 200,
                body: json!({ "aggregated": { "count": count } }).to_string(),
            });
        };

        if let Some(delay) = self.delays.get(&id) {
            tokio::time::sleep(*delay).await;
        }

        match self.scripts.get(&id) {
            Some(Script::Reply(status, body)) => Ok(UpstreamReply {
                status: *status,
                body: body.to_string(),
            }),
            Some(Script::Fail(failure)) => Err(failure.clone()),
            None => Ok(UpstreamReply {
                status: 200,
                body: json!({ "echo": id }).to_string(),
            }),
        }
    }
}

// ── Fixtures ───────────────────────────────────────────────────

fn parcel(id: &str) -> GeometryRecord {
    GeometryRecord::new(
        id,
        json!({ "type": "Polygon", "coordinates": [[[0, 0], [0, 1], [1, 1], [0, 0]]] }),
    )
    .with_properties(json!({ "crs": { "type": "EPSG", "properties": { "code": 2154 } } }))
}

fn ids(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

struct Harness {
    orchestrator: EnrichmentOrchestrator,
    store: Arc<InMemoryGeometryStore>,
    transport: Arc<ScriptedTransport>,
}

fn harness(transport: ScriptedTransport) -> Harness {
    let config = Arc::new(AppConfig::from_lookup(|_| None).unwrap());
    let store = Arc::new(InMemoryGeometryStore::with_records(
        ["A", "B", "C", "D"].into_iter().map(parcel),
    ));
    let transport = Arc::new(transport);

    Harness {
        orchestrator: EnrichmentOrchestrator::new(config, store.clone(), transport.clone()),
        store,
        transport,
    }
}

fn items(enrichment: Enrichment) -> Vec<parcel_enrichment::enrichment::EnrichmentResult> {
    match enrichment {
        Enrichment::Items(items) => items,
        other => panic!("Expected per-item result, got {:?}", other),
    }
}

// ── Resolution ─────────────────────────────────────────────────

#[tokio::test]
async fn test_two_present_parcels_enriched_and_correlated() {
    let h = harness(ScriptedTransport::new());

    let result = h
        .orchestrator
        .enrich("soc", ids(&["A", "B"]), vec![])
        .await
        .unwrap();

    let items = items(result);
    assert_eq!(items.len(), 2);
    for item in &items {
        assert_eq!(item.data["echo"], item.identifier.as_str());
    }
    let seen: HashSet<_> = items.iter().map(|i| i.identifier.as_str()).collect();
    assert_eq!(seen, HashSet::from(["A", "B"]));
    assert_eq!(h.transport.calls().len(), 2);
}

#[tokio::test]
async fn test_result_keys_equal_requested_ids() {
    let sets: [&[&str]; 4] = [&["A"], &["D", "A"], &["B", "C", "D"], &["A", "B", "C", "D"]];

    for set in sets {
        let h = harness(ScriptedTransport::new());
        let result = h.orchestrator.enrich("topsoil", ids(set), vec![]).await.unwrap();

        let got: HashSet<_> = result.identifiers().into_iter().collect();
        let want: HashSet<_> = set.iter().copied().collect();
        assert_eq!(got, want);
    }
}

#[tokio::test]
async fn test_absent_parcel_fails_before_any_call() {
    let h = harness(ScriptedTransport::new());

    let err = h
        .orchestrator
        .enrich("soc", ids(&["A", "X"]), vec![])
        .await
        .unwrap_err();

    match err {
        EnrichmentError::PartialLookupFailure { missing } => assert_eq!(missing, ids(&["X"])),
        other => panic!("Expected PartialLookupFailure, got {:?}", other),
    }
    assert!(h.transport.calls().is_empty());
}

#[tokio::test]
async fn test_missing_set_is_exact_difference() {
    let h = harness(ScriptedTransport::new());

    let err = h
        .orchestrator
        .enrich("hydro", ids(&["Q", "A", "Z", "B", "Q"]), vec![])
        .await
        .unwrap_err();

    match err {
        EnrichmentError::PartialLookupFailure { missing } => assert_eq!(missing, ids(&["Q", "Z"])),
        other => panic!("Expected PartialLookupFailure, got {:?}", other),
    }
    assert!(h.transport.calls().is_empty());
}

#[tokio::test]
async fn test_empty_batch_rejected_before_store_access() {
    let h = harness(ScriptedTransport::new());

    let err = h.orchestrator.enrich("soc", vec![], vec![]).await.unwrap_err();

    assert!(matches!(err, EnrichmentError::EmptyBatch));
    assert_eq!(h.store.lookup_count(), 0);
    assert!(h.transport.calls().is_empty());
}

#[tokio::test]
async fn test_unknown_target_rejected_before_store_access() {
    let h = harness(ScriptedTransport::new());

    let err = h
        .orchestrator
        .enrich("weather", ids(&["A"]), vec![])
        .await
        .unwrap_err();

    assert!(matches!(err, EnrichmentError::UnknownTarget(ref t) if t == "weather"));
    assert_eq!(h.store.lookup_count(), 0);
}

#[tokio::test]
async fn test_store_outage_is_store_unavailable() {
    let h = harness(ScriptedTransport::new());
    h.store.set_available(false);

    let err = h
        .orchestrator
        .enrich("soc", ids(&["A"]), vec![])
        .await
        .unwrap_err();

    assert!(matches!(err, EnrichmentError::StoreUnavailable(_)));
    assert!(h.transport.calls().is_empty());
}

#[tokio::test]
async fn test_duplicate_ids_enriched_independently() {
    let h = harness(ScriptedTransport::new());

    let result = h
        .orchestrator
        .enrich("soc", ids(&["A", "A"]), vec![])
        .await
        .unwrap();

    assert_eq!(items(result).len(), 2);
    assert_eq!(h.transport.calls().len(), 2);
}

// ── Dispatch ───────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_results_follow_completion_order() {
    let h = harness(
        ScriptedTransport::new()
            .with_delay("A", Duration::from_millis(300))
            .with_delay("B", Duration::from_millis(100)),
    );

    let result = h
        .orchestrator
        .enrich("soc", ids(&["A", "B", "C"]), vec![])
        .await
        .unwrap();

    let order: Vec<_> = items(result).into_iter().map(|i| i.identifier).collect();
    assert_eq!(order, ids(&["C", "B", "A"]));
}

#[tokio::test(start_paused = true)]
async fn test_calls_are_concurrent() {
    let h = harness(
        ScriptedTransport::new()
            .with_delay("A", Duration::from_secs(1))
            .with_delay("B", Duration::from_secs(1))
            .with_delay("C", Duration::from_secs(1)),
    );

    let started = tokio::time::Instant::now();
    h.orchestrator
        .enrich("soc", ids(&["A", "B", "C"]), vec![])
        .await
        .unwrap();

    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn test_one_timeout_fails_whole_batch() {
    let h = harness(
        ScriptedTransport::new()
            .with_delay("B", Duration::from_secs(30))
            .with_script(
                "B",
                Script::Fail(TransportFailure::NoResponse("operation timed out".into())),
            ),
    );

    let err = h
        .orchestrator
        .enrich("soc", ids(&["A", "B"]), vec![])
        .await
        .unwrap_err();

    assert!(matches!(err, EnrichmentError::ServiceUnreachable { .. }));
    // A was still sent and completed, its result discarded
    assert_eq!(h.transport.calls().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_first_settled_failure_is_reported() {
    let h = harness(
        ScriptedTransport::new()
            .with_script("A", Script::Reply(500, "boom"))
            .with_delay("C", Duration::from_millis(200))
            .with_script(
                "C",
                Script::Fail(TransportFailure::NoResponse("connection refused".into())),
            ),
    );

    let err = h
        .orchestrator
        .enrich("natura2000", ids(&["C", "B", "A"]), vec![])
        .await
        .unwrap_err();

    match err {
        EnrichmentError::UpstreamError { status, body, .. } => {
            assert_eq!(status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("Expected UpstreamError, got {:?}", other),
    }
    assert_eq!(h.transport.calls().len(), 3);
}

#[tokio::test]
async fn test_setup_failure_is_request_setup_error() {
    let h = harness(
        ScriptedTransport::new()
            .with_script("D", Script::Fail(TransportFailure::Setup("invalid header".into()))),
    );

    let err = h
        .orchestrator
        .enrich("soc", ids(&["D"]), vec![])
        .await
        .unwrap_err();

    assert!(matches!(err, EnrichmentError::RequestSetupError { .. }));
}

#[tokio::test]
async fn test_query_forwarded_to_every_call() {
    let h = harness(ScriptedTransport::new());
    let query = vec![
        ("distance".to_string(), "1000".to_string()),
        ("type".to_string(), "river".to_string()),
    ];

    h.orchestrator
        .enrich("hydro", ids(&["A", "B", "C"]), query.clone())
        .await
        .unwrap();

    let calls = h.transport.calls();
    assert_eq!(calls.len(), 3);
    for call in calls {
        assert_eq!(call.query, query);
        assert_eq!(call.url.query(), Some("distance=1000&type=river"));
    }
}

#[tokio::test]
async fn test_soc_does_not_forward_query() {
    let h = harness(ScriptedTransport::new());

    h.orchestrator
        .enrich("soc", ids(&["A", "B"]), vec![("distance".into(), "1000".into())])
        .await
        .unwrap();

    for call in h.transport.calls() {
        assert!(call.url.query().is_none());
    }
}

#[tokio::test]
async fn test_batch_target_sends_one_feature_collection() {
    let h = harness(ScriptedTransport::new());

    let result = h
        .orchestrator
        .enrich("gis", ids(&["A", "B"]), vec![])
        .await
        .unwrap();

    assert_eq!(
        result,
        Enrichment::Aggregate(json!({ "aggregated": { "count": 2 } }))
    );

    let calls = h.transport.calls();
    assert_eq!(calls.len(), 1);
    let body: Value = serde_json::from_slice(&calls[0].payload).unwrap();
    assert_eq!(body["type"], "FeatureCollection");
    assert_eq!(body["features"][0]["properties"]["crs"]["type"], "EPSG");
}

#[tokio::test]
async fn test_per_item_payload_is_the_stored_feature() {
    let h = harness(ScriptedTransport::new());

    h.orchestrator
        .enrich("topsoil", ids(&["C"]), vec![])
        .await
        .unwrap();

    let calls = h.transport.calls();
    let body: Value = serde_json::from_slice(&calls[0].payload).unwrap();
    assert_eq!(body, serde_json::to_value(parcel("C")).unwrap());
}
