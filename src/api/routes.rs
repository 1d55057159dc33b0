use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{error::ApiResult, AppState};
use crate::media::{DownloadResult, FormatDescriptor};

pub const SERVICE_MESSAGE: &str = "reelserve video downloader API";

#[derive(Debug, Deserialize)]
pub struct FormatsQuery {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    url: Option<String>,
    format_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FormatsResponse {
    formats: Vec<FormatDescriptor>,
}

pub async fn root() -> Json<Value> {
    Json(json!({"status": "ok", "message": SERVICE_MESSAGE}))
}

pub async fn formats(
    State(state): State<AppState>,
    query: Result<Query<FormatsQuery>, QueryRejection>,
) -> ApiResult<Json<FormatsResponse>> {
    let Query(query) = query?;
    let url = query.url.unwrap_or_default();
    let formats = state.media.list_formats(&url).await?;
    Ok(Json(FormatsResponse { formats }))
}

pub async fn download(
    State(state): State<AppState>,
    query: Result<Query<DownloadQuery>, QueryRejection>,
) -> ApiResult<Json<DownloadResult>> {
    let Query(query) = query?;
    let url = query.url.unwrap_or_default();
    let format_id = query.format_id.unwrap_or_default();
    let result = state.media.download(&url, &format_id).await?;
    Ok(Json(result))
}
