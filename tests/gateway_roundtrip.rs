//! Drives the HTTP gateway and the upload pipeline against an in-process
//! backend that mimics the swing API and a presigned storage bucket.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use swingview_lib::config::AppConfig;
use swingview_lib::error::UploadError;
use swingview_lib::events::{self, NoopSink, RecordingSink};
use swingview_lib::gateway::{GatewayClient, GatewayError, SwingGateway};
use swingview_lib::library::LibraryController;
use swingview_lib::models::AnalysisStatus;
use swingview_lib::upload::{SwingMetadata, UploadPipeline, VideoFile};
use swingview_lib::AppState;

#[derive(Default)]
struct Recorded {
    created: Vec<Value>,
    storage_fields: Vec<String>,
    storage_file_name: Option<String>,
    storage_bytes: usize,
    storage_auth: Option<String>,
    api_auth: Vec<Option<String>>,
    reject_storage: bool,
    fail_create: bool,
}

#[derive(Clone)]
struct Backend {
    base: String,
    recorded: Arc<Mutex<Recorded>>,
}

fn auth_header(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

fn swing_json(id: Value, title: &str, video: &str) -> Value {
    json!({
        "id": id,
        "user_id": "user-1",
        "title": title,
        "video_url": video,
        "tag": "practice_swing",
        "created_at": "2024-05-01T10:00:00Z",
    })
}

async fn list_swings(State(backend): State<Backend>, headers: HeaderMap) -> Json<Value> {
    backend.recorded.lock().unwrap().api_auth.push(auth_header(&headers));
    Json(json!({
        "success": true,
        "data": [
            swing_json(json!(1), "Driver", "https://cdn.example.com/1.mp4"),
            swing_json(json!("2"), "Iron", "not a url"),
        ],
        "pagination": { "page": 1, "limit": 20, "total": 2, "totalPages": 1 },
    }))
}

async fn create_swing(
    State(backend): State<Backend>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let mut recorded = backend.recorded.lock().unwrap();
    recorded.created.push(body.clone());
    if recorded.fail_create {
        return Err((StatusCode::INTERNAL_SERVER_ERROR, "database unavailable".into()));
    }
    let title = body["title"].as_str().unwrap_or_default().to_string();
    let file_url = body["file_url"].as_str().unwrap_or_default().to_string();
    Ok(Json(json!({
        "success": true,
        "data": swing_json(json!(99), &title, &file_url),
    })))
}

async fn upload_url(State(backend): State<Backend>, Json(body): Json<Value>) -> Json<Value> {
    assert_eq!(body["contentType"], "video/mp4");
    Json(json!({
        "uploadUrl": format!("{}/storage", backend.base),
        "fileUrl": format!("{}/storage/videos/{}", backend.base, body["filename"].as_str().unwrap()),
        "uploadFields": {
            "key": "videos/swing.mp4",
            "AWSAccessKeyId": "AKIA",
            "policy": "cG9saWN5",
            "signature": "c2ln",
        },
    }))
}

async fn storage(
    State(backend): State<Backend>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> StatusCode {
    let mut names = Vec::new();
    let mut file_name = None;
    let mut bytes = 0;
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            file_name = field.file_name().map(str::to_string);
        }
        bytes = field.bytes().await.unwrap().len();
        names.push(name);
    }

    let mut recorded = backend.recorded.lock().unwrap();
    recorded.storage_fields = names;
    recorded.storage_file_name = file_name;
    recorded.storage_bytes = bytes;
    recorded.storage_auth = auth_header(&headers);
    if recorded.reject_storage {
        StatusCode::FORBIDDEN
    } else {
        StatusCode::NO_CONTENT
    }
}

async fn presigned_urls(Path(id): Path<String>) -> Result<Json<Value>, StatusCode> {
    if id == "1" {
        return Err(StatusCode::BAD_GATEWAY);
    }
    Ok(Json(json!({ "status": "processing" })))
}

async fn snapshot_metadata(Path(id): Path<String>) -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "swing_id": id,
            "status": "completed",
            "snapshots": {
                "setup": "https://img.example.com/setup.jpg",
                "topOfBackswing": "https://img.example.com/top.jpg",
                "impact": "https://img.example.com/impact.jpg",
                "followThrough": "https://img.example.com/follow.jpg",
            },
        },
    }))
}

async fn start_backend() -> Backend {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    let backend = Backend {
        base: format!("http://{addr}"),
        recorded: Arc::new(Mutex::new(Recorded::default())),
    };

    let app = Router::new()
        .route("/swings", get(list_swings).post(create_swing))
        .route("/upload-url", post(upload_url))
        .route("/storage", post(storage))
        .route("/swings/{id}/snapshots/presigned-urls", get(presigned_urls))
        .route("/swings/{id}/snapshots", get(snapshot_metadata))
        .with_state(backend.clone());

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    backend
}

fn pipeline(backend: &Backend) -> (UploadPipeline, LibraryController) {
    let config = AppConfig::with_base_url(&backend.base);
    let gateway: Arc<dyn SwingGateway> = Arc::new(GatewayClient::new(&config).unwrap());
    let library = LibraryController::new(&config, gateway.clone(), Arc::new(NoopSink));
    let uploads = UploadPipeline::new(gateway, library.clone(), config.upload.clone());
    (uploads, library)
}

fn clip() -> VideoFile {
    VideoFile::from_bytes("swing.mp4", None, vec![7u8; 4096])
}

#[tokio::test]
async fn listing_unwraps_envelope_and_drops_unplayable_urls() {
    let backend = start_backend().await;
    let client = GatewayClient::new(&AppConfig::with_base_url(&backend.base)).unwrap();
    client.set_auth_token(Some("secret".into())).await;

    let page = client.list_swings(1, 20).await.unwrap();
    assert_eq!(page.swings.len(), 2);
    assert_eq!(page.swings[0].id, "1");
    assert_eq!(page.swings[1].video_url, None);
    assert_eq!(page.pagination.unwrap().total, 2);

    let recorded = backend.recorded.lock().unwrap();
    assert_eq!(recorded.api_auth, vec![Some("Bearer secret".to_string())]);
}

#[tokio::test]
async fn upload_posts_fields_before_file_then_creates_record() {
    let backend = start_backend().await;
    let (uploads, library) = pipeline(&backend);
    library.load(None, None).await.unwrap();

    let outcome = uploads
        .upload(
            clip(),
            SwingMetadata {
                title: Some("Range day".into()),
                ..SwingMetadata::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(outcome.swing.id, "99");
    assert!(outcome.file_url.ends_with("/storage/videos/swing.mp4"));

    let recorded = backend.recorded.lock().unwrap();
    assert_eq!(
        recorded.storage_fields,
        vec!["key", "AWSAccessKeyId", "policy", "signature", "file"]
    );
    assert_eq!(recorded.storage_file_name.as_deref(), Some("swing.mp4"));
    assert_eq!(recorded.storage_bytes, 4096);
    assert_eq!(recorded.storage_auth, None);
    assert_eq!(recorded.created[0]["tag"], "practice_swing");
    assert_eq!(recorded.created[0]["title"], "Range day");
    drop(recorded);

    let snapshot = library.snapshot().await;
    assert_eq!(snapshot.swings[0].id, "99");
    assert_eq!(snapshot.swings.len(), 3);
}

#[tokio::test]
async fn storage_rejection_never_creates_a_record() {
    let backend = start_backend().await;
    backend.recorded.lock().unwrap().reject_storage = true;
    let (uploads, _) = pipeline(&backend);

    let err = uploads.upload(clip(), SwingMetadata::default()).await.unwrap_err();
    assert!(matches!(err, UploadError::StorageRejected { status: 403, .. }));
    assert!(backend.recorded.lock().unwrap().created.is_empty());
}

#[tokio::test]
async fn create_failure_keeps_stored_file_url_for_retry() {
    let backend = start_backend().await;
    backend.recorded.lock().unwrap().fail_create = true;
    let (uploads, library) = pipeline(&backend);

    let err = uploads.upload(clip(), SwingMetadata::default()).await.unwrap_err();
    let file_url = err.stored_file_url().map(str::to_string).unwrap();
    assert!(matches!(
        err,
        UploadError::SwingCreationFailed { source: GatewayError::Http { status: 500, .. }, .. }
    ));
    assert!(library.snapshot().await.swings.is_empty());

    backend.recorded.lock().unwrap().fail_create = false;
    let outcome = uploads
        .retry_create(file_url.clone(), SwingMetadata::default())
        .await
        .unwrap();
    assert_eq!(outcome.file_url, file_url);
    assert_eq!(backend.recorded.lock().unwrap().created.len(), 2);
}

#[tokio::test]
async fn unreachable_api_surfaces_network_error() {
    let client = GatewayClient::new(&AppConfig::with_base_url("http://127.0.0.1:9")).unwrap();
    let err = client.list_swings(1, 20).await.unwrap_err();
    assert!(err.is_network());
}

#[tokio::test]
async fn app_falls_back_to_metadata_endpoint_for_analysis() {
    let backend = start_backend().await;
    let dir = tempfile::tempdir().unwrap();
    let sink = Arc::new(RecordingSink::new());
    let app = AppState::connect(
        AppConfig::with_base_url(&backend.base),
        dir.path().join("settings.json"),
        sink.clone(),
    )
    .unwrap();

    let analysis = app.analysis.fetch_status("1").await.unwrap();
    assert_eq!(analysis.status, AnalysisStatus::Available);
    assert!(analysis.snapshots.is_some());
    assert_eq!(sink.count(events::ANALYSIS_UPDATED), 1);

    let grid = app.snapshots.grid_view("1").await;
    assert!(grid.cells.iter().all(|cell| cell.frame.is_image()));

    let pending = app.analysis.fetch_status("2").await.unwrap();
    assert_eq!(pending.status, AnalysisStatus::Processing);
    assert!(app.analysis.is_polling("2").await);
    app.shutdown().await;
}
