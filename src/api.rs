// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! HTTP adapter over [`RecordService`].
//!
//! | Route | Method | Purpose |
//! |-------|--------|---------|
//! | `/dns/add` | POST | Add a record |
//! | `/dns/delete` | POST | Delete a record |
//! | `/healthz` | GET | Liveness |
//! | `/metrics` | GET | Prometheus exposition |
//!
//! Request bodies are JSON. Errors are JSON bodies built by
//! [`crate::http_errors`].

use crate::constants::{ROUTE_ADD_RECORD, ROUTE_DELETE_RECORD, ROUTE_HEALTH, ROUTE_METRICS};
use crate::http_errors::ApiError;
use crate::metrics::gather_metrics;
use crate::service::RecordService;
use crate::transaction::UpdateTransaction;
use crate::transport::{Ack, UpdateTransport};
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

/// Body of `POST /dns/add`.
#[derive(Debug, Clone, Deserialize)]
pub struct AddRecordRequest {
    /// Record name relative to the zone, or `@`
    pub name: String,
    /// Record type (e.g. `A`, `TXT`)
    #[serde(rename = "type")]
    pub record_type: String,
    /// Record value
    pub value: String,
    /// TTL in seconds; the configured default applies when absent
    #[serde(default)]
    pub ttl: Option<i64>,
}

/// Body of `POST /dns/delete`.
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteRecordRequest {
    /// Record name relative to the zone, or `@`
    pub name: String,
    /// Record type
    #[serde(rename = "type")]
    pub record_type: String,
    /// Value of the record to remove
    pub value: String,
}

/// Body of a successful update response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResponse {
    /// `Record added` or `Record deleted`
    pub message: &'static str,
    /// Fully-qualified record name
    pub fqdn: String,
    /// Record type
    pub record_type: &'static str,
    /// Server that acknowledged the update
    pub server: String,
    /// DNS message id of the acknowledged update
    pub message_id: u16,
    /// Round-trip time in milliseconds
    pub elapsed_ms: u64,
}

impl UpdateResponse {
    fn new(message: &'static str, transaction: &UpdateTransaction, ack: &Ack) -> Self {
        Self {
            message,
            fqdn: transaction.fqdn().to_ascii(),
            record_type: transaction.record_type().as_str(),
            server: ack.server.to_string(),
            message_id: ack.message_id,
            elapsed_ms: u64::try_from(ack.elapsed.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

/// Build the router for `service`.
pub fn router<T: UpdateTransport + 'static>(service: Arc<RecordService<T>>) -> Router {
    Router::new()
        .route(ROUTE_ADD_RECORD, post(add_record::<T>))
        .route(ROUTE_DELETE_RECORD, post(delete_record::<T>))
        .route(ROUTE_HEALTH, get(health))
        .route(ROUTE_METRICS, get(metrics))
        .with_state(service)
}

/// Bind `listen` and serve `service` until SIGINT or SIGTERM.
///
/// In-flight requests are allowed to finish before the function returns.
///
/// # Errors
///
/// Returns an error if the listener cannot be bound or the server fails.
pub async fn serve<T: UpdateTransport + 'static>(
    listen: SocketAddr,
    service: Arc<RecordService<T>>,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(listen).await?;
    info!("HTTP API listening on {}", listener.local_addr()?);
    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("HTTP API stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for SIGINT: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received SIGINT, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}

async fn add_record<T: UpdateTransport + 'static>(
    State(service): State<Arc<RecordService<T>>>,
    Json(request): Json<AddRecordRequest>,
) -> Result<Json<UpdateResponse>, ApiError> {
    let transaction = service.prepare_add(
        &request.name,
        &request.record_type,
        &request.value,
        request.ttl,
    )?;
    let ack = service.apply(&transaction).await?;
    Ok(Json(UpdateResponse::new("Record added", &transaction, &ack)))
}

async fn delete_record<T: UpdateTransport + 'static>(
    State(service): State<Arc<RecordService<T>>>,
    Json(request): Json<DeleteRecordRequest>,
) -> Result<Json<UpdateResponse>, ApiError> {
    let transaction =
        service.prepare_delete(&request.name, &request.record_type, &request.value)?;
    let ack = service.apply(&transaction).await?;
    Ok(Json(UpdateResponse::new(
        "Record deleted",
        &transaction,
        &ack,
    )))
}

async fn health() -> &'static str {
    "ok"
}

async fn metrics() -> Response {
    match gather_metrics() {
        Ok(body) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[cfg(test)]
#[path = "api_tests.rs"]
mod api_tests;
