//! HTTP surface: `POST /api/chat` and `GET /health`.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tracing::{error, info};

use crate::chat::ChatService;
use crate::error::{Error, Result};
use crate::model::ChatRequest;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
}

pub fn router(service: Arc<ChatService>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/chat", post(chat))
        .with_state(service)
}

/// Serve until `shutdown` resolves, then stop the chat service.
pub async fn serve(
    service: Arc<ChatService>,
    addr: SocketAddr,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "catbot chat endpoint listening");
    axum::serve(listener, router(Arc::clone(&service)))
        .with_graceful_shutdown(shutdown)
        .await?;
    service.shutdown().await;
    Ok(())
}

async fn health(State(service): State<Arc<ChatService>>) -> (StatusCode, Json<HealthResponse>) {
    if service.is_ready() {
        (StatusCode::OK, Json(HealthResponse { status: "ok" }))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse { status: "stopping" }),
        )
    }
}

async fn chat(
    State(service): State<Arc<ChatService>>,
    payload: std::result::Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            return error_response(StatusCode::BAD_REQUEST, rejection.body_text());
        }
    };

    match service.handle_turn(request).await {
        Ok(reply) => (StatusCode::OK, Json(reply)).into_response(),
        Err(e) => {
            let status = match &e {
                Error::MalformedInput(_) => StatusCode::BAD_REQUEST,
                Error::NotFound(_) => StatusCode::NOT_FOUND,
                Error::NotReady => StatusCode::SERVICE_UNAVAILABLE,
                _ => {
                    error!(error = %e, "chat turn failed");
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            };
            error_response(status, e.to_string())
        }
    }
}

fn error_response(status: StatusCode, error: String) -> Response {
    (
        status,
        Json(ErrorResponse {
            success: false,
            error,
        }),
    )
        .into_response()
}
