//! Read-back of stored tag-sets.

use super::AppState;
use crate::{errors::AppError, models::tag::ObjectTagging};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct TagQuery {
    #[serde(rename = "versionId")]
    pub version_id: Option<String>,
}

/// `GET /tags/{bucket}/{*key}` — the object's tag-set, 404 if untagged.
pub async fn get_object_tags(
    State(state): State<AppState>,
    Path((bucket, key)): Path<(String, String)>,
    Query(q): Query<TagQuery>,
) -> Result<Json<ObjectTagging>, AppError> {
    let version_id = q.version_id.filter(|v| !v.is_empty());
    let rows = state
        .store
        .get_tags(&bucket, &key, version_id.as_deref())
        .await?;
    Ok(Json(ObjectTagging::from_rows(&bucket, &key, version_id, rows)))
}
