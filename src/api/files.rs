use std::path::{Path as FsPath, PathBuf};

use axum::{
    body::Body,
    extract::{Path, State},
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE},
        HeaderMap, HeaderValue,
    },
    response::{IntoResponse, Response},
};
use tokio_util::io::ReaderStream;
use tracing::debug;

use super::{
    error::{ApiError, ApiResult},
    AppState,
};
use crate::utils::{content_disposition, is_plain_filename};

const FILE_NOT_FOUND: &str = "File not found";

/// Resolves a requested name to a regular file directly inside `dir`.
/// Anything that is not a plain file name resolves to nothing.
pub async fn resolve_download(dir: &FsPath, filename: &str) -> Option<PathBuf> {
    if !is_plain_filename(filename) {
        debug!("Rejected file name: {:?}", filename);
        return None;
    }

    let path = dir.join(filename);
    match tokio::fs::metadata(&path).await {
        Ok(metadata) if metadata.is_file() => Some(path),
        _ => None,
    }
}

/// Streams a downloaded file as an mp4 attachment.
pub async fn get_file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> ApiResult<Response> {
    let path = resolve_download(state.media.download_dir(), &filename)
        .await
        .ok_or_else(|| ApiError::not_found(FILE_NOT_FOUND))?;

    let file = tokio::fs::File::open(&path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ApiError::not_found(FILE_NOT_FOUND),
        _ => ApiError::internal(e.to_string()),
    })?;
    let length = file
        .metadata()
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?
        .len();

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("video/mp4"));
    headers.insert(CONTENT_LENGTH, HeaderValue::from(length));
    headers.insert(
        CONTENT_DISPOSITION,
        HeaderValue::from_str(&content_disposition(&filename))
            .map_err(|_| ApiError::internal("Failed to build Content-Disposition header"))?,
    );

    let body = Body::from_stream(ReaderStream::new(file));
    Ok((headers, body).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolve_download() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("abc.mp4"), b"data").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();

        assert_eq!(
            resolve_download(dir.path(), "abc.mp4").await,
            Some(dir.path().join("abc.mp4"))
        );
        assert_eq!(resolve_download(dir.path(), "missing.mp4").await, None);
        assert_eq!(resolve_download(dir.path(), "nested").await, None);
        assert_eq!(resolve_download(dir.path(), "../abc.mp4").await, None);
        assert_eq!(resolve_download(dir.path(), "").await, None);
    }
}
