//! REST API handlers for multisig coordination

use crate::multisig::{
    CancelTxArgs, CoordinatorError, CreateTxArgs, IssueTxArgs, MultisigCoordinator,
    MultisigTransaction, SignTxArgs,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shared application state for API handlers
#[derive(Clone)]
pub struct ApiState {
    pub coordinator: Arc<MultisigCoordinator>,
}

// ============================================================================
// Response Types
// ============================================================================

/// Error body: a human-readable message plus a stable error kind
#[derive(Serialize)]
pub struct ApiError {
    pub message: String,
    pub error: String,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Serialize)]
pub struct IssueTxResponse {
    #[serde(rename = "txID")]
    pub tx_id: String,
}

// ============================================================================
// Request Types
// ============================================================================

/// Query parameters authorizing a list request
#[derive(Deserialize)]
pub struct ListQuery {
    pub signature: Option<String>,
    pub timestamp: Option<String>,
}

/// Build an error body without leaking internal storage or node state
fn api_error(context: &str, err: &CoordinatorError) -> ApiError {
    let detail = match err {
        CoordinatorError::Store(_) => "storage request failed".to_string(),
        CoordinatorError::Node(crate::node::NodeError::AliasNotFound) => err.to_string(),
        CoordinatorError::Node(_) => "chain node request failed".to_string(),
        _ => err.to_string(),
    };
    ApiError {
        message: format!("{}: {}", context, detail),
        error: err.kind().to_string(),
    }
}

fn bad_request(context: &str, err: CoordinatorError) -> (StatusCode, Json<ApiError>) {
    (StatusCode::BAD_REQUEST, Json(api_error(context, &err)))
}

fn missing_query_param(param: &str) -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiError {
            message: format!("Missing query parameter '{}'", param),
            error: "missing_query_parameter".to_string(),
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /health - Health check
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// POST /v1/multisig - Create a multisig transaction
pub async fn create_multisig_tx(
    State(state): State<ApiState>,
    Json(args): Json<CreateTxArgs>,
) -> Result<(StatusCode, Json<MultisigTransaction>), (StatusCode, Json<ApiError>)> {
    let tx = state
        .coordinator
        .create_transaction(&args)
        .await
        .map_err(|e| bad_request("Error creating multisig transaction", e))?;

    Ok((StatusCode::CREATED, Json(tx)))
}

/// GET /v1/multisig/{alias} - List pending transactions for an alias
pub async fn get_all_multisig_tx_for_alias(
    State(state): State<ApiState>,
    Path(alias): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<MultisigTransaction>>, (StatusCode, Json<ApiError>)> {
    let Some(signature) = query.signature else {
        return Err(missing_query_param("signature"));
    };
    let Some(timestamp) = query.timestamp else {
        return Err(missing_query_param("timestamp"));
    };

    let txs = state
        .coordinator
        .get_all_for_alias(&alias, &timestamp, &signature)
        .map_err(|e| {
            bad_request(
                &format!("Error getting multisig transactions for alias {}", alias),
                e,
            )
        })?;

    Ok(Json(txs))
}

/// PUT /v1/multisig/{id} - Add an owner's signature
pub async fn sign_multisig_tx(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(args): Json<SignTxArgs>,
) -> Result<Json<MultisigTransaction>, (StatusCode, Json<ApiError>)> {
    let tx = state.coordinator.sign_transaction(&id, &args).map_err(|e| {
        let status = match e {
            CoordinatorError::TxNotExists => StatusCode::NOT_FOUND,
            _ => StatusCode::BAD_REQUEST,
        };
        let context = format!("Error adding signer to multisig transaction with id {}", id);
        (status, Json(api_error(&context, &e)))
    })?;

    Ok(Json(tx))
}

/// POST /v1/multisig/issue - Issue a fully-signed transaction
pub async fn issue_multisig_tx(
    State(state): State<ApiState>,
    Json(args): Json<IssueTxArgs>,
) -> Result<Json<IssueTxResponse>, (StatusCode, Json<ApiError>)> {
    let tx_id = state
        .coordinator
        .issue_transaction(&args)
        .await
        .map_err(|e| bad_request("Error issuing multisig transaction", e))?;

    Ok(Json(IssueTxResponse { tx_id }))
}

/// POST /v1/multisig/cancel - Cancel a pending transaction
pub async fn cancel_multisig_tx(
    State(state): State<ApiState>,
    Json(args): Json<CancelTxArgs>,
) -> Result<StatusCode, (StatusCode, Json<ApiError>)> {
    state
        .coordinator
        .cancel_transaction(&args)
        .map_err(|e| bad_request("Error cancelling multisig transaction", e))?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StoreError;

    #[test]
    fn test_api_error_hides_internal_detail() {
        let err = CoordinatorError::Store(StoreError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "/var/lib/secret/path",
        )));
        let body = api_error("Error creating multisig transaction", &err);
        assert_eq!(body.error, "storage_failure");
        assert!(!body.message.contains("secret"));
    }

    #[test]
    fn test_api_error_keeps_validation_detail() {
        let body = api_error("Error creating multisig transaction", &CoordinatorError::PendingTx);
        assert_eq!(body.error, "pending_tx");
        assert!(body.message.contains("already a pending tx"));
    }
}
