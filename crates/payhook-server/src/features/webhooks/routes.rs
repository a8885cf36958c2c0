//! Webhook routes
//!
//! POST ingress for bank payment notifications. The body is accepted as
//! raw text and acknowledged with 202 before any parsing happens; the
//! import result is observable through the import-jobs endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::commands::enqueue_import::{handle as handle_enqueue, DEFAULT_TENANT_ID};
use super::commands::{EnqueueImportCommand, EnqueueImportError};
use crate::import::JobQueue;

/// Create webhook routes
pub fn webhook_routes() -> Router<JobQueue> {
    Router::new().route("/:bank_type", post(receive_webhook))
}

#[derive(Debug, Deserialize)]
struct WebhookParams {
    /// Tenant identifier; defaults to 1 when absent
    client_id: Option<i64>,
}

/// Receive a bank webhook
///
/// POST /webhooks/:bank_type?client_id=1
async fn receive_webhook(
    State(queue): State<JobQueue>,
    Path(bank_type): Path<String>,
    Query(params): Query<WebhookParams>,
    body: String,
) -> Result<Response, StatusCode> {
    let command = EnqueueImportCommand {
        bank_type,
        tenant_id: params.client_id.unwrap_or(DEFAULT_TENANT_ID),
        raw_body: body,
    };

    match handle_enqueue(&queue, command).await {
        Ok(response) => Ok((
            StatusCode::ACCEPTED,
            Json(json!({
                "success": true,
                "message": "Webhook received and queued for processing",
                "job_id": response.job_id,
            })),
        )
            .into_response()),
        Err(EnqueueImportError::EmptyBody) => Ok((
            StatusCode::BAD_REQUEST,
            Json(json!({
                "success": false,
                "message": "Empty webhook body",
            })),
        )
            .into_response()),
        Err(e) => {
            tracing::error!("Failed to enqueue webhook: {:?}", e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        },
    }
}
