//! Payment routes

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::json;

use super::commands::build_transfer::handle as handle_build_transfer;
use super::commands::{BuildTransferCommand, BuildTransferError};

/// Create payment routes
pub fn payments_routes() -> Router<()> {
    Router::new().route("/transfer", post(transfer))
}

/// Generate payment transfer XML
///
/// POST /payments/transfer
async fn transfer(Json(command): Json<BuildTransferCommand>) -> Result<Response, StatusCode> {
    match handle_build_transfer(command) {
        Ok(xml) => Ok((
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/xml")],
            xml,
        )
            .into_response()),
        Err(e @ (BuildTransferError::Validation(_) | BuildTransferError::NegativeAmount)) => Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "success": false,
                "message": e.to_string(),
            })),
        )
            .into_response()),
        Err(e) => {
            tracing::error!("Failed to build payment document: {:?}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        },
    }
}
