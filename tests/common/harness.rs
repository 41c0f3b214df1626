//! Test harness: fake storing/word-cloud services and a spawned analysis server.

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use antiplagiat::analysis::CheckService;
use antiplagiat::artifact::WordCloudRenderer;
use antiplagiat::content::{HttpContentClient, RetryPolicy};
use antiplagiat::gateway::{HandlerState, create_router_with_state};
use antiplagiat::store::MemoryStore;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use parking_lot::Mutex;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

#[derive(Debug, Clone)]
pub struct FakeWork {
    pub student_name: String,
    pub assignment_name: String,
    pub body: String,
}

/// In-memory stand-in for the file storing service and the word cloud endpoint.
#[derive(Default)]
pub struct FakeServices {
    works: Mutex<HashMap<i64, FakeWork>>,
    transient_download_failures: Mutex<HashMap<i64, usize>>,
    permanent_download_failures: Mutex<HashSet<i64>>,
    broken_metadata: Mutex<HashSet<i64>>,
    download_hits: Mutex<HashMap<i64, usize>>,
    metadata_hits: Mutex<HashMap<i64, usize>>,
    word_cloud_fail: AtomicBool,
    word_cloud_hits: AtomicUsize,
}

impl FakeServices {
    pub fn add_work(&self, id: i64, student_name: &str, assignment_name: &str, body: &str) {
        self.works.lock().insert(
            id,
            FakeWork {
                student_name: student_name.to_string(),
                assignment_name: assignment_name.to_string(),
                body: body.to_string(),
            },
        );
    }

    /// The next `count` downloads of `id` answer 503.
    pub fn fail_downloads(&self, id: i64, count: usize) {
        self.transient_download_failures.lock().insert(id, count);
    }

    pub fn fail_downloads_forever(&self, id: i64) {
        self.permanent_download_failures.lock().insert(id);
    }

    /// `GET /get/{id}` answers 200 with a body that is not metadata JSON.
    pub fn break_metadata(&self, id: i64) {
        self.broken_metadata.lock().insert(id);
    }

    pub fn fail_word_cloud(&self, fail: bool) {
        self.word_cloud_fail.store(fail, Ordering::SeqCst);
    }

    pub fn download_hits(&self, id: i64) -> usize {
        self.download_hits.lock().get(&id).copied().unwrap_or(0)
    }

    pub fn metadata_hits(&self, id: i64) -> usize {
        self.metadata_hits.lock().get(&id).copied().unwrap_or(0)
    }

    pub fn word_cloud_hits(&self) -> usize {
        self.word_cloud_hits.load(Ordering::SeqCst)
    }
}

async fn metadata_route(State(fake): State<Arc<FakeServices>>, Path(id): Path<i64>) -> Response {
    *fake.metadata_hits.lock().entry(id).or_default() += 1;

    if fake.broken_metadata.lock().contains(&id) {
        return (StatusCode::OK, "<html>not json</html>").into_response();
    }

    let work = fake.works.lock().get(&id).cloned();
    match work {
        Some(work) => Json(serde_json::json!({
            "id": id,
            "student_name": work.student_name,
            "assignment_name": work.assignment_name,
            "uploaded_at": "2025-11-03T10:15:00Z",
        }))
        .into_response(),
        None => (StatusCode::NOT_FOUND, "Work not found").into_response(),
    }
}

async fn download_route(State(fake): State<Arc<FakeServices>>, Path(id): Path<i64>) -> Response {
    *fake.download_hits.lock().entry(id).or_default() += 1;

    if fake.permanent_download_failures.lock().contains(&id) {
        return (StatusCode::SERVICE_UNAVAILABLE, "storage offline").into_response();
    }

    {
        let mut transient = fake.transient_download_failures.lock();
        if let Some(remaining) = transient.get_mut(&id) {
            if *remaining > 0 {
                *remaining -= 1;
                return (StatusCode::SERVICE_UNAVAILABLE, "try again").into_response();
            }
        }
    }

    let work = fake.works.lock().get(&id).cloned();
    match work {
        Some(work) => (StatusCode::OK, work.body).into_response(),
        None => (StatusCode::NOT_FOUND, "File object not found").into_response(),
    }
}

async fn word_cloud_route(State(fake): State<Arc<FakeServices>>) -> Response {
    fake.word_cloud_hits.fetch_add(1, Ordering::SeqCst);

    if fake.word_cloud_fail.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "render failed").into_response();
    }

    (StatusCode::OK, [("content-type", "image/png")], vec![0x89u8, b'P', b'N', b'G'])
        .into_response()
}

pub struct TestServer {
    pub addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl TestServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

async fn serve(router: Router) -> std::io::Result<TestServer> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        let _ = axum::serve(listener, router)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await;
    });

    Ok(TestServer {
        addr,
        shutdown_tx: Some(shutdown_tx),
    })
}

/// Spawns the fake storing service (`/get`, `/download`) and word cloud (`/wordcloud`).
pub async fn spawn_fake_services() -> std::io::Result<(TestServer, Arc<FakeServices>)> {
    let fake = Arc::new(FakeServices::default());
    let router = Router::new()
        .route("/get/{id}", get(metadata_route))
        .route("/download/{id}", get(download_route))
        .route("/wordcloud", get(word_cloud_route))
        .with_state(fake.clone());

    Ok((serve(router).await?, fake))
}

/// Retry policy with millisecond backoff so retry tests stay fast.
pub fn fast_retry() -> RetryPolicy {
    RetryPolicy::default()
        .with_backoff_step(Duration::from_millis(5))
        .with_timeout(Duration::from_secs(2))
}

/// A running analysis server wired to fake collaborators and an in-memory store.
pub struct TestEnv {
    pub app: TestServer,
    pub fakes: TestServer,
    pub fake: Arc<FakeServices>,
    pub store: Arc<MemoryStore>,
}

impl TestEnv {
    pub async fn start() -> std::io::Result<Self> {
        let (fakes, fake) = spawn_fake_services().await?;
        let store = Arc::new(MemoryStore::new());

        let content = Arc::new(HttpContentClient::new(fakes.url(), fast_retry()));
        let renderer = Arc::new(
            WordCloudRenderer::new(format!("{}/wordcloud", fakes.url()))
                .with_timeout(Duration::from_secs(2)),
        );
        let service = CheckService::new(content, store.clone(), store.clone(), renderer);
        let app = serve(create_router_with_state(HandlerState::new(Arc::new(service)))).await?;

        Ok(Self {
            app,
            fakes,
            fake,
            store,
        })
    }

    /// Registers a work with the fake storing service and the `works` table.
    pub fn add_work(&self, id: i64, student_name: &str, assignment_name: &str, body: &str) {
        self.fake.add_work(id, student_name, assignment_name, body);
        self.store.insert_work(id, student_name, assignment_name);
    }

    pub fn client(&self) -> reqwest::Client {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client")
    }
}
