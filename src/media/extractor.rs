use super::types::MediaInfo;
use anyhow::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

#[async_trait]
pub trait Extractor: Send + Sync {
    /// Human-readable name of the extractor
    fn name(&self) -> &'static str;

    /// Fetch the metadata and raw format list for a URL without downloading anything
    async fn list_formats_raw(&self, url: &str) -> Result<MediaInfo>;

    /// Download the given format into `output_dir` as `{id}.{ext}` and return
    /// the path of the file that was produced
    async fn download(&self, url: &str, format_id: &str, output_dir: &Path) -> Result<PathBuf>;

    /// Check whether the extractor and its helper tools are usable on this system
    async fn test_availability(&self) -> bool;
}
