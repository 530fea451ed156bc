use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use tracing::warn;

use super::app_state::AppState;
use super::errors::ServerError;
use crate::app::ingest::{IngestError, IngestOutcome};

pub(super) async fn health() -> &'static str {
    "ok"
}

pub(super) async fn updated(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, &'static str), ServerError> {
    match state.ingestor.ingest(&body).await {
        Ok(IngestOutcome::Forwarded) => Ok((StatusCode::OK, "ok")),
        Ok(IngestOutcome::Dropped) => Ok((StatusCode::OK, "")),
        Err(e) => {
            warn!(error = %e, "Ingestion failed");
            let status = match &e {
                IngestError::Unreadable => StatusCode::BAD_REQUEST,
                IngestError::Decode(_) | IngestError::FileOpen { .. } | IngestError::Forward(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            };
            Err(ServerError::new(status, e.to_string()))
        }
    }
}
