//! End-to-end tests: router, lifecycle manager, and background reaper
//! wired together the way `main` wires them.

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum_test::TestServer;
use axum_test::multipart::{MultipartForm, Part};

use vanish_blob::BlobStore;
use vanish_blob_memory::MemoryBlobStore;
use vanish_lifecycle::{
    ExpiryStrategy, LinkLifecycleManager, ReaperBuilder, ReaperConfig, TimerNotifier,
};
use vanish_repo::FileGroupRepository;
use vanish_repo_memory::MemoryFileGroupRepository;
use vanish_server::api::{AppState, router};

// -- Helpers --------------------------------------------------------------

struct TestApp {
    server: TestServer,
    repo: Arc<MemoryFileGroupRepository>,
    blobs: Arc<MemoryBlobStore>,
    manager: Arc<LinkLifecycleManager>,
}

fn build_test_app(notifier: Option<Arc<dyn vanish_lifecycle::ExpiryNotifier>>) -> TestApp {
    let repo = Arc::new(MemoryFileGroupRepository::new());
    let blobs = Arc::new(MemoryBlobStore::new());

    let mut builder = LinkLifecycleManager::builder()
        .repository(Arc::clone(&repo) as Arc<dyn FileGroupRepository>)
        .blob_store(Arc::clone(&blobs) as Arc<dyn BlobStore>);
    if let Some(notifier) = notifier {
        builder = builder.notifier(notifier);
    }
    let manager = Arc::new(builder.build().unwrap());

    let state = AppState {
        lifecycle: Arc::clone(&manager),
        link_base: "http://localhost:8080/open".to_owned(),
        max_body_bytes: 16 * 1024 * 1024,
        allowed_origin: None,
    };

    TestApp {
        server: TestServer::new(router(state)).unwrap(),
        repo,
        blobs,
        manager,
    }
}

fn upload_form(ttl: &str) -> MultipartForm {
    MultipartForm::new()
        .add_text("ttl", ttl.to_owned())
        .add_part(
            "files",
            Part::bytes(b"alpha".as_slice())
                .file_name("alpha.txt")
                .mime_type("text/plain"),
        )
        .add_part(
            "files",
            Part::bytes(b"bravo".as_slice())
                .file_name("bravo.txt")
                .mime_type("text/plain"),
        )
}

async fn upload_id(app: &TestApp, ttl: &str) -> String {
    let response = app.server.post("/v1/files").multipart(upload_form(ttl)).await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    response.json::<serde_json::Value>()["id"]
        .as_str()
        .unwrap()
        .to_owned()
}

// -- Sweep path -----------------------------------------------------------

#[tokio::test]
async fn sweep_reaper_tears_down_expired_groups_end_to_end() {
    let app = build_test_app(None);

    let (mut reaper, shutdown_tx) = ReaperBuilder::new()
        .config(ReaperConfig {
            sweep_interval: Duration::from_millis(100),
            ..ReaperConfig::default()
        })
        .manager(Arc::clone(&app.manager))
        .build()
        .unwrap();
    let handle = tokio::spawn(async move {
        reaper.run().await;
    });

    let id = upload_id(&app, "1").await;
    assert_eq!(app.blobs.len(), 2);

    let check = app.server.get(&format!("/v1/files/{id}/check")).await;
    assert_eq!(check.status_code(), StatusCode::OK);

    // Give the TTL time to pass and the sweep time to fire.
    tokio::time::sleep(Duration::from_millis(1500)).await;

    let check = app.server.get(&format!("/v1/files/{id}/check")).await;
    assert_eq!(
        check.status_code(),
        StatusCode::NOT_FOUND,
        "reaped group must read as never having existed"
    );
    assert!(app.repo.is_empty(), "metadata record must be deleted");
    assert!(app.blobs.is_empty(), "all blobs must be deleted");

    let _ = shutdown_tx.send(()).await;
    let _ = tokio::time::timeout(Duration::from_secs(1), handle).await;
}

// -- Timer path -----------------------------------------------------------

#[tokio::test]
async fn timer_reaper_tears_down_groups_without_waiting_for_a_sweep() {
    let (notifier, registrations) = TimerNotifier::channel();
    let app = build_test_app(Some(Arc::new(notifier)));

    // Fallback sweep far in the future: only the per-group timer can
    // explain the teardown.
    let (mut reaper, shutdown_tx) = ReaperBuilder::new()
        .config(ReaperConfig {
            strategy: ExpiryStrategy::Timer,
            fallback_sweep_interval: Duration::from_secs(3600),
            ..ReaperConfig::default()
        })
        .manager(Arc::clone(&app.manager))
        .registrations(registrations)
        .build()
        .unwrap();
    let handle = tokio::spawn(async move {
        reaper.run().await;
    });

    let id = upload_id(&app, "1").await;

    tokio::time::sleep(Duration::from_millis(1500)).await;

    let check = app.server.get(&format!("/v1/files/{id}/check")).await;
    assert_eq!(check.status_code(), StatusCode::NOT_FOUND);
    assert!(app.blobs.is_empty());

    let _ = shutdown_tx.send(()).await;
    let _ = tokio::time::timeout(Duration::from_secs(1), handle).await;
}

// -- Reader behavior while expired but not yet reaped ---------------------

#[tokio::test]
async fn expired_but_unreaped_group_is_unavailable_on_every_path() {
    // No reaper running at all: the record outlives its deadline.
    let app = build_test_app(None);
    let id = upload_id(&app, "1").await;

    tokio::time::sleep(Duration::from_millis(1100)).await;

    assert!(
        app.repo.find_by_id(&id.as_str().into()).await.unwrap().is_some(),
        "precondition: the record must still physically exist"
    );

    let check = app.server.get(&format!("/v1/files/{id}/check")).await;
    assert_eq!(check.status_code(), StatusCode::GONE);

    let download = app
        .server
        .get(&format!("/v1/files/{id}"))
        .add_query_param("index", 0)
        .await;
    assert_eq!(download.status_code(), StatusCode::GONE);

    let zip = app.server.get(&format!("/v1/files/{id}/zip")).await;
    assert_eq!(zip.status_code(), StatusCode::GONE);
}
