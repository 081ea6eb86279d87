//! Shared test fixtures: seeded in-memory object store and a real HTTP
//! server standing in for the remote record API.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use object_store::memory::InMemory;
use object_store::path::Path as StorePath;
use object_store::{ObjectStore, PutPayload};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tagmill_enrich::services::dataset;
use tagmill_enrich::services::lookup::LookupTable;
use tagmill_enrich::services::remote::RemoteClient;
use tagmill_enrich::store::{ObjectStorage, RemoteObjectStore};
use tagmill_enrich::AppState;

/// Canned response for one identifier on the fake record API.
#[derive(Clone)]
pub enum FakeResponse {
    /// 200 with the given XML body
    Body(String),
    /// Arbitrary status and body
    Status(u16, String),
    /// Sleep before answering; pairs with a short client timeout to
    /// simulate a transport-level failure for a single identifier
    Delay(Duration, String),
}

async fn serve_record(
    Path(identifier): Path<String>,
    State(responses): State<Arc<HashMap<String, FakeResponse>>>,
) -> (StatusCode, String) {
    match responses.get(&identifier) {
        Some(FakeResponse::Body(body)) => (StatusCode::OK, body.clone()),
        Some(FakeResponse::Status(status, body)) => (
            StatusCode::from_u16(*status).expect("valid status"),
            body.clone(),
        ),
        Some(FakeResponse::Delay(delay, body)) => {
            tokio::time::sleep(*delay).await;
            (StatusCode::OK, body.clone())
        }
        None => (StatusCode::NOT_FOUND, String::new()),
    }
}

/// Serve canned responses on an ephemeral local port.
///
/// Unknown identifiers answer 404 with an empty body. Returns the base URL
/// the enrichment client should use.
pub async fn spawn_fake_api(responses: HashMap<String, FakeResponse>) -> String {
    let app = Router::new()
        .route("/records/:identifier", get(serve_record))
        .with_state(Arc::new(responses));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}/records")
}

/// In-memory object store seeded with the given key/content pairs.
pub async fn seeded_memory_store(objects: &[(&str, &str)]) -> Arc<InMemory> {
    let inner = Arc::new(InMemory::new());
    for (key, body) in objects {
        inner
            .put(&StorePath::from(*key), PutPayload::from(body.as_bytes().to_vec()))
            .await
            .unwrap();
    }
    inner
}

/// Reference dataset fixture keyed by `file_id`.
pub fn lookup_table_from_csv(csv: &str) -> LookupTable {
    let rows = dataset::parse_csv(csv.as_bytes()).unwrap();
    LookupTable::build(rows, "file_id")
}

/// Full application state over the given store, dataset, and API base URL.
pub fn app_state(
    inner: Arc<InMemory>,
    csv: &str,
    base_url: &str,
    timeout: Duration,
) -> AppState {
    let store: Arc<dyn ObjectStorage> =
        Arc::new(RemoteObjectStore::new(inner as Arc<dyn ObjectStore>));
    let table = lookup_table_from_csv(csv);
    let client = RemoteClient::new(base_url, timeout);
    AppState::new(store, table, client)
}
