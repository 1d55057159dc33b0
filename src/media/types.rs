use serde::{Deserialize, Serialize};

/// Metadata dump produced by the extractor for a single media item.
#[derive(Debug, Default, Deserialize)]
pub struct MediaInfo {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub formats: Vec<RawFormat>,
}

/// One format entry as reported by the extractor. Every field is optional
/// because sites report wildly different subsets.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawFormat {
    #[serde(default)]
    pub format_id: Option<String>,
    #[serde(default)]
    pub ext: Option<String>,
    #[serde(default)]
    pub vcodec: Option<String>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub fps: Option<f64>,
}

/// A playable format offered to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormatDescriptor {
    pub format_id: String,
    pub label: String,
    #[serde(skip)]
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DownloadResult {
    pub download_url: String,
    pub filename: String,
}

impl DownloadResult {
    pub fn for_file(filename: &str) -> Self {
        Self {
            download_url: format!("/file/{filename}"),
            filename: filename.to_string(),
        }
    }
}
