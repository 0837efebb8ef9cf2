pub mod pages;

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Context;
use axum::extract::{DefaultBodyLimit, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::error::CardError;
use crate::parser::SectionName;
use crate::store::SiteRoot;
use crate::sync::{self, SectionOutcome, SyncReport};

/// Request body cap for `/save` and `/upload-csv`, above axum's 2 MB default.
const MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

pub struct AppState {
    pub site: SiteRoot,
    pub targets: BTreeMap<SectionName, String>,
    /// Held for the whole of a CSV sync; one run at a time.
    sync_lock: Mutex<()>,
}

impl AppState {
    pub fn new(site: SiteRoot, targets: BTreeMap<SectionName, String>) -> Self {
        AppState {
            site,
            targets,
            sync_lock: Mutex::new(()),
        }
    }
}

/// Error body for handlers: a status and a short plain-text message.
#[derive(Debug)]
pub struct ApiError(StatusCode, String);

impl From<CardError> for ApiError {
    fn from(err: CardError) -> Self {
        let status = match &err {
            CardError::InvalidName(_) | CardError::EmptyPayload | CardError::Csv(_) => StatusCode::BAD_REQUEST,
            CardError::NotFound(_) => StatusCode::NOT_FOUND,
            CardError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ApiError(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.0.is_server_error() {
            error!(status = %self.0, "{}", self.1);
        }
        (self.0, self.1).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Deserialize)]
pub struct FileQuery {
    #[serde(default)]
    file: String,
}

#[derive(Debug, Deserialize)]
pub struct SaveRequest {
    #[serde(default)]
    file: String,
    #[serde(default)]
    html: String,
}

#[derive(Debug, Serialize)]
pub struct SaveResponse {
    ok: bool,
    file: String,
}

#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    #[serde(default)]
    csv: String,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    ok: bool,
    updated: BTreeMap<SectionName, usize>,
    files: Vec<String>,
    sections: BTreeMap<SectionName, SectionOutcome>,
}

impl From<SyncReport> for UploadResponse {
    fn from(report: SyncReport) -> Self {
        UploadResponse {
            ok: true,
            updated: report.updated(),
            files: report.files(),
            sections: report.sections,
        }
    }
}

/// GET /
async fn index(State(state): State<Arc<AppState>>) -> ApiResult<Html<String>> {
    let files = state.site.list_files()?;
    Ok(Html(pages::render_index(&files)))
}

/// GET /render?file=NAME
async fn render_file(
    State(state): State<Arc<AppState>>,
    Query(q): Query<FileQuery>,
) -> ApiResult<Html<String>> {
    state.site.resolve(&q.file)?;
    let content = state.site.read_text(&q.file)?;
    Ok(Html(pages::render_wrapper(&q.file, &content)))
}

/// GET /raw?file=NAME
async fn raw_file(
    State(state): State<Arc<AppState>>,
    Query(q): Query<FileQuery>,
) -> ApiResult<impl IntoResponse> {
    state.site.resolve(&q.file)?;
    let content = state.site.read_text(&q.file)?;
    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], content))
}

/// POST /save
async fn save_snapshot(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SaveRequest>,
) -> ApiResult<Json<SaveResponse>> {
    let stamp = chrono::Local::now().format(sync::STAMP_FORMAT).to_string();
    let file = state.site.save_snapshot(&req.file, &req.html, &stamp)?;
    info!(source = %req.file, snapshot = %file, "saved snapshot");
    Ok(Json(SaveResponse { ok: true, file }))
}

/// POST /upload-csv
async fn upload_csv(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UploadRequest>,
) -> ApiResult<Json<UploadResponse>> {
    if req.csv.is_empty() {
        return Err(CardError::EmptyPayload.into());
    }

    let _guard = state.sync_lock.lock().await;
    let site = state.site.clone();
    let targets = state.targets.clone();
    let report = tokio::task::spawn_blocking(move || {
        sync::parse_and_synchronize(&site, &req.csv, |section| targets.get(&section).cloned())
    })
    .await
    .map_err(|e| ApiError(StatusCode::INTERNAL_SERVER_ERROR, format!("sync task failed: {}", e)))??;

    info!(files = ?report.files(), "csv sync finished");
    Ok(Json(report.into()))
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/render", get(render_file))
        .route("/raw", get(raw_file))
        .route("/save", post(save_snapshot))
        .route("/upload-csv", post(upload_csv))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(state: AppState, bind: &str) -> anyhow::Result<()> {
    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    info!(root = %state.site.root().display(), "serving site");
    println!("Dashboard running at http://{}", listener.local_addr()?);
    println!("Press Ctrl+C to stop.");

    axum::serve(listener, router(Arc::new(state)))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("Server error")
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use super::*;

    fn app(dir: &Path) -> Router {
        let site = SiteRoot::new(dir, vec!["card_sync.toml".to_string()]);
        let targets = BTreeMap::from([(SectionName::Recliner, "recliners".to_string())]);
        router(Arc::new(AppState::new(site, targets)))
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(app: Router, req: Request<Body>) -> (StatusCode, String, String) {
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let content_type = resp
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, content_type, String::from_utf8_lossy(&bytes).into_owned())
    }

    fn recliner_csv() -> String {
        let mut cells = vec![String::new(); 27];
        cells[7] = "Chair A".into();
        cells[8] = "$499".into();
        cells[17] = "$699".into();
        cells[26] = "a.jpg".into();
        format!("Recliner\n{}\n", cells.join(","))
    }

    #[tokio::test]
    async fn upload_rejects_empty_csv() {
        let dir = tempfile::tempdir().unwrap();
        let (status, _, body) = send(app(dir.path()), post_json("/upload-csv", serde_json::json!({ "csv": "" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "Missing csv");

        let (status, _, body) = send(app(dir.path()), post_json("/upload-csv", serde_json::json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "Missing csv");
    }

    #[tokio::test]
    async fn upload_applies_sections() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("recliners"), "<!-- Cards -->old<!-- Logic -->").unwrap();

        let (status, _, body) =
            send(app(dir.path()), post_json("/upload-csv", serde_json::json!({ "csv": recliner_csv() }))).await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["ok"], true);
        assert_eq!(json["updated"], serde_json::json!({ "recliner": 1 }));
        assert_eq!(json["files"], serde_json::json!(["recliners"]));
        assert_eq!(json["sections"]["living room"]["reason"], "unconfigured");

        let written = fs::read_to_string(dir.path().join("recliners")).unwrap();
        assert!(written.contains(">Chair A</div>"));
        assert!(!written.contains("old"));
    }

    #[tokio::test]
    async fn upload_accepts_body_past_default_limit() {
        let dir = tempfile::tempdir().unwrap();
        let csv = "x,".repeat(1_200_000);
        let (status, _, body) = send(app(dir.path()), post_json("/upload-csv", serde_json::json!({ "csv": csv }))).await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["ok"], true);
    }

    #[tokio::test]
    async fn raw_is_plain_text() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("page.html"), "<p>hi</p>").unwrap();
        let (status, content_type, body) = send(app(dir.path()), get_req("/raw?file=page.html")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(content_type.starts_with("text/plain"), "{}", content_type);
        assert_eq!(body, "<p>hi</p>");
    }

    #[tokio::test]
    async fn render_wraps_fragment() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("page.html"), "<p>hi</p>").unwrap();
        let (status, content_type, body) = send(app(dir.path()), get_req("/render?file=page.html")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(content_type.starts_with("text/html"), "{}", content_type);
        assert!(body.contains("<title>Preview - page.html</title>"));
        assert!(body.contains("<p>hi</p>"));
    }

    #[tokio::test]
    async fn file_routes_reject_paths_and_hidden_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("card_sync.toml"), "").unwrap();
        fs::write(dir.path().join(".env"), "").unwrap();

        for route in ["/raw", "/render"] {
            let (status, _, _) = send(app(dir.path()), get_req(&format!("{}?file=a%2Fb", route))).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", route);
            let (status, _, _) = send(app(dir.path()), get_req(route)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{} without file", route);
            for name in ["missing.html", "card_sync.toml", ".env"] {
                let (status, _, _) = send(app(dir.path()), get_req(&format!("{}?file={}", route, name))).await;
                assert_eq!(status, StatusCode::NOT_FOUND, "{} {}", route, name);
            }
        }
    }

    #[tokio::test]
    async fn save_writes_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("page.html"), "orig").unwrap();

        let (status, _, body) = send(
            app(dir.path()),
            post_json("/save", serde_json::json!({ "file": "page.html", "html": "<p>edited</p>" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["ok"], true);
        let file = json["file"].as_str().unwrap();
        assert!(file.starts_with("page-") && file.ends_with(".html"), "{}", file);
        assert_eq!(fs::read_to_string(dir.path().join(file)).unwrap(), "<p>edited</p>");
        assert_eq!(fs::read_to_string(dir.path().join("page.html")).unwrap(), "orig");

        let (status, _, _) = send(
            app(dir.path()),
            post_json("/save", serde_json::json!({ "file": "ghost.html", "html": "x" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn index_lists_browsable_files() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["bedrooms", "card_sync.toml", ".env"] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        let (status, _, body) = send(app(dir.path()), get_req("/")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(r#"const files = ["bedrooms"];"#));
    }

    #[test]
    fn error_statuses() {
        let status = |e: CardError| ApiError::from(e).0;
        assert_eq!(status(CardError::InvalidName("a/b".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status(CardError::EmptyPayload), StatusCode::BAD_REQUEST);
        assert_eq!(status(CardError::NotFound("x".into())), StatusCode::NOT_FOUND);
        assert_eq!(
            status(CardError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk"))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn upload_response_shape() {
        let mut report = SyncReport::default();
        report.sections.insert(
            SectionName::Recliner,
            SectionOutcome::Applied {
                file: "recliners".into(),
                items: 2,
                backup: "recliners.bak-20261018-093000".into(),
            },
        );
        report.sections.insert(
            SectionName::Bedroom,
            SectionOutcome::Skipped(sync::SkipReason::MissingFile { file: "bedrooms".into() }),
        );

        let json = serde_json::to_value(UploadResponse::from(report)).unwrap();
        assert_eq!(json["ok"], true);
        assert_eq!(json["updated"], serde_json::json!({ "recliner": 2 }));
        assert_eq!(json["files"], serde_json::json!(["recliners"]));
        assert_eq!(json["sections"]["bedroom"]["reason"], "missing_file");
        assert_eq!(json["sections"]["recliner"]["status"], "applied");
    }
}
