//! Event delivery endpoint. One request carries one S3 event batch; the
//! response is the batch summary or the first tagging failure.

use super::AppState;
use crate::{
    errors::AppError,
    models::{event::S3Event, tag::BatchResult},
};
use axum::{Json, extract::State};

/// `POST /events`
pub async fn receive_event(
    State(state): State<AppState>,
    Json(event): Json<S3Event>,
) -> Result<Json<BatchResult>, AppError> {
    let result = state.tagging.handle_event(&event, &state.store).await?;
    Ok(Json(result))
}
