use crate::error::AppError;
use crate::upload::{attachment_filename, Upload};
use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Json, Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use formfill_core::forms;
use formfill_core::{label_mapping, ActorRegistry, Config, FieldMapper, Module, Organization};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Response for the field listing endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct FieldsResponse {
    /// Number of distinct fields found
    pub count: usize,
    /// Field names in discovery order
    pub fields: Vec<String>,
    /// Present only when the document has no form fields
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub message: Option<String>,
}

/// Read-only data shared by every request
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    registry: ActorRegistry,
    mapper: FieldMapper,
    organization: Organization,
    label_max_len: Option<usize>,
    max_upload_bytes: usize,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                registry: config.registry(),
                mapper: config.mapper(),
                organization: config.organization.clone(),
                label_max_len: config.mapping.label_max_len,
                max_upload_bytes: config.server.max_upload_bytes,
            }),
        }
    }

    pub fn registry(&self) -> &ActorRegistry {
        &self.inner.registry
    }

    pub fn mapper(&self) -> &FieldMapper {
        &self.inner.mapper
    }

    pub fn organization(&self) -> &Organization {
        &self.inner.organization
    }
}

/// Build the application router with the built-in configuration
pub fn app() -> Router {
    app_with_state(AppState::new(&Config::default()))
}

/// Build the application router with all routes configured
pub fn app_with_state(state: AppState) -> Router {
    let body_limit = state.inner.max_upload_bytes;
    Router::new()
        .route("/", get(health_check))
        .route("/fields", post(list_fields))
        .route("/debug/label", post(debug_label))
        .route("/generate", post(generate))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint for monitoring and load balancing
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "formfill API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// List the form field names of an uploaded PDF
pub async fn list_fields(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<FieldsResponse>, AppError> {
    let upload = Upload::read(multipart).await?;
    let document = upload.document()?;
    tracing::info!(file = upload.filename(), size = document.len(), "listing form fields");

    let fields = run_blocking(move || forms::field_names(&document)).await?;

    let message = fields
        .is_empty()
        .then(|| "no form fields found".to_string());
    Ok(Json(FieldsResponse {
        count: fields.len(),
        fields,
        message,
    }))
}

/// Stamp every field with its own name so it can be spotted on the page
pub async fn debug_label(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, AppError> {
    let upload = Upload::read(multipart).await?;
    let document = upload.document()?;
    let max_len = state.inner.label_max_len;
    tracing::info!(file = upload.filename(), size = document.len(), "labelling form fields");

    let outcome = run_blocking(move || {
        let mapping = label_mapping(&forms::field_names(&document)?, max_len);
        forms::fill_with_report(&document, &mapping)
    })
    .await?;
    if !outcome.report.skipped.is_empty() {
        tracing::warn!(skipped = ?outcome.report.skipped, "some fields could not be labelled");
    }

    let filename = attachment_filename(&format!("labeled_{}", upload.filename()));
    Ok(pdf_attachment(&filename, outcome.bytes))
}

/// Fill an uploaded form with the organization and module representative data
pub async fn generate(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, AppError> {
    let upload = Upload::read(multipart).await?;

    let module = Module::parse(upload.module.as_deref().unwrap_or(""))?;
    let document = upload.document()?;
    tracing::info!(
        file = upload.filename(),
        size = document.len(),
        module = %module,
        "generating filled form"
    );

    let worker_state = state.clone();
    let outcome = run_blocking(move || {
        let actor = worker_state.registry().resolve(module);
        let mapping = worker_state.mapper().build_mapping(
            &forms::field_names(&document)?,
            worker_state.organization(),
            actor,
        );
        forms::fill_with_report(&document, &mapping)
    })
    .await?;

    let report = &outcome.report;
    tracing::info!(
        module = %module,
        filled = report.filled.len(),
        unmatched = report.unmatched.len(),
        skipped = report.skipped.len(),
        "form filled"
    );

    let filename = attachment_filename(&format!(
        "{}_{}",
        module.as_str().to_ascii_lowercase(),
        upload.filename()
    ));
    Ok(pdf_attachment(&filename, outcome.bytes))
}

/// Run PDF work on the blocking pool
async fn run_blocking<T, F>(work: F) -> Result<T, AppError>
where
    T: Send + 'static,
    F: FnOnce() -> formfill_core::Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AppError::Internal(format!("document worker failed: {e}")))?
        .map_err(AppError::from)
}

fn pdf_attachment(filename: &str, pdf_bytes: Vec<u8>) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        pdf_bytes,
    )
        .into_response()
}
