use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Multipart, Query},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Extension, Router,
};
use hyper::Server;
use serde::Deserialize;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::error;

use crate::config::Config;
use crate::domain::ProductDraft;
use crate::error::PipelineError;
use crate::pipeline::{IngestUseCase, ReportUseCase};
use crate::storage::ProductStore;
use crate::validate;

pub struct AppState {
    pub store: Arc<dyn ProductStore>,
    pub config: Config,
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "catalog-ingest",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Translates the error taxonomy into the client-facing channel: bad input is
/// 400, "nothing to report" is 404, everything else is a generic 500.
fn error_response(err: &PipelineError) -> Response {
    if err.is_client_error() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": err.to_string() })),
        )
            .into_response();
    }
    if matches!(err, PipelineError::NoData) {
        return (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": err.to_string() })),
        )
            .into_response();
    }
    error!("request failed: {err}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({
            "error": format!("An unexpected error occurred: {err}")
        })),
    )
        .into_response()
}

#[derive(Debug, Deserialize)]
struct UploadParams {
    append: Option<String>,
}

/// `POST /upload-file?append=true` — multipart field `file`. Any append value
/// other than "true" (or no value at all) means replace.
async fn upload_file(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<UploadParams>,
    mut multipart: Multipart,
) -> Response {
    let append = params.append.as_deref() == Some("true");

    let mut upload: Option<(String, Vec<u8>)> = None;
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or_default().to_string();
            if let Ok(bytes) = field.bytes().await {
                upload = Some((filename, bytes.to_vec()));
            }
            break;
        }
    }
    let (filename, bytes) = match upload {
        Some(upload) => upload,
        None => {
            return error_response(&PipelineError::InvalidUpload(
                "No file provided".to_string(),
            ))
        }
    };

    if let Err(e) = validate::check_upload(
        &filename,
        bytes.len() as u64,
        state.config.max_upload_bytes,
    ) {
        return error_response(&e);
    }

    match IngestUseCase::new(state.store.clone())
        .ingest(&bytes, append)
        .await
    {
        Ok(_) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "success": "Products processed and uploaded successfully"
            })),
        )
            .into_response(),
        Err(e) => error_response(&e),
    }
}

/// `GET /product` — every persisted record.
async fn list_products(Extension(state): Extension<Arc<AppState>>) -> Response {
    match state.store.list().await {
        Ok(products) => Json(products).into_response(),
        Err(e) => error_response(&e),
    }
}

/// `POST /product` — direct creation of a single record. Field validation
/// runs before the record is constructed.
async fn create_product(
    Extension(state): Extension<Arc<AppState>>,
    Json(draft): Json<ProductDraft>,
) -> Response {
    if let Err(e) = validate::validate_product(&draft) {
        return error_response(&e);
    }
    let mut product = draft.into_product();
    match state.store.insert(&mut product).await {
        Ok(()) => (StatusCode::CREATED, Json(product)).into_response(),
        Err(e) => error_response(&e),
    }
}

/// `GET /report` — the per-category summary as a CSV attachment.
async fn report(Extension(state): Extension<Arc<AppState>>) -> Response {
    match ReportUseCase::new(state.store.clone()).summary_csv().await {
        Ok(body) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"exported_data.csv\"",
                ),
            ],
            body,
        )
            .into_response(),
        Err(e) => error_response(&e),
    }
}

/// Create the HTTP server with all routes
pub fn create_server(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    // Leave headroom above the configured cap so oversize uploads reach the
    // precheck and get its message instead of a framework 413.
    let body_limit = (state.config.max_upload_bytes as usize).saturating_mul(2);

    Router::new()
        .route("/health", get(health))
        .route("/upload-file", post(upload_file))
        .route("/product", get(list_products).post(create_product))
        .route("/report", get(report))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(Extension(state))
        .layer(ServiceBuilder::new().layer(cors))
}

/// Start the HTTP server on the specified address
pub async fn start_server(state: Arc<AppState>, addr: SocketAddr) -> anyhow::Result<()> {
    let app = create_server(state);

    println!("🚀 HTTP server running on http://{addr}");
    println!("💚 Health check: http://{addr}/health");
    println!("📦 Products:     http://{addr}/product");
    println!("📄 Report:       http://{addr}/report");

    Server::bind(&addr).serve(app.into_make_service()).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_classes_map_to_status_codes() {
        assert_eq!(
            error_response(&PipelineError::Schema).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_response(&PipelineError::Ingestion {
                line: 3,
                cause: "x".to_string()
            })
            .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_response(&PipelineError::NoData).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            error_response(&PipelineError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "disk"
            )))
            .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
