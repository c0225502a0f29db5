//! `/api/browse` and `/api/file`: thin pass-through to the upstream store.
//!
//! Upstream answers below 500 are relayed; anything else (transport failure,
//! timeout, 5xx) becomes a 500 with `{"error": ..., "message": ...}`.

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;

use crate::upstream::{Upstream, normalize_request_path};

/// Shared application state
pub struct AppState {
    pub upstream: Upstream,
}

#[derive(Debug, Deserialize)]
pub struct PathQuery {
    #[serde(default)]
    pub path: String,
}

fn failure(error: &str, message: String) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": error, "message": message })),
    )
        .into_response()
}

fn invalid_path(path: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": "Invalid path",
            "message": format!("Path must not contain '..' segments: {}", path),
        })),
    )
        .into_response()
}

fn content_type(headers: &HeaderMap, fallback: &str) -> String {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or(fallback)
        .to_string()
}

fn server_error_message(status: StatusCode) -> String {
    format!("Request failed with status code {}", status.as_u16())
}

/// Proxy a storage API directory listing.
pub async fn browse(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PathQuery>,
) -> Response {
    let Some(path) = normalize_request_path(&query.path) else {
        return invalid_path(&query.path);
    };

    let response = match state.upstream.browse(&path).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("Error fetching directory {:?}: {}", path, e);
            return failure("Failed to fetch directory", e.to_string());
        }
    };

    let status = response.status();
    if status.is_server_error() {
        tracing::error!("Error fetching directory {:?}: upstream {}", path, status);
        return failure("Failed to fetch directory", server_error_message(status));
    }

    let content_type = content_type(response.headers(), "application/json");
    match response.bytes().await {
        Ok(body) => (status, [(CONTENT_TYPE, content_type)], body).into_response(),
        Err(e) => {
            tracing::error!("Error reading directory {:?}: {}", path, e);
            failure("Failed to fetch directory", e.to_string())
        }
    }
}

/// Proxy raw file content.
pub async fn file(State(state): State<Arc<AppState>>, Query(query): Query<PathQuery>) -> Response {
    let Some(path) = normalize_request_path(&query.path) else {
        return invalid_path(&query.path);
    };

    let response = match state.upstream.file(&path).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("Error fetching file {:?}: {}", path, e);
            return failure("Failed to fetch file", e.to_string());
        }
    };

    let status = response.status();
    if status.is_server_error() {
        tracing::error!("Error fetching file {:?}: upstream {}", path, status);
        return failure("Failed to fetch file", server_error_message(status));
    }
    if status != StatusCode::OK {
        return (
            status,
            Json(json!({
                "error": "File not found",
                "message": format!("File not found at path: {}", query.path),
                "status": status.as_u16(),
            })),
        )
            .into_response();
    }

    let content_type = content_type(response.headers(), "text/plain; charset=utf-8");
    let body: Bytes = match response.bytes().await {
        Ok(body) => body,
        Err(e) => {
            tracing::error!("Error reading file {:?}: {}", path, e);
            return failure("Failed to fetch file", e.to_string());
        }
    };
    ([(CONTENT_TYPE, content_type)], body).into_response()
}
