mod extractor;
mod formats;
mod inflight;
mod platform;
mod types;
mod ytdlp;

pub use extractor::Extractor;
pub use types::{DownloadResult, FormatDescriptor};
pub use ytdlp::YtDlpExtractor;

use formats::playable_formats;
use inflight::InFlight;
use platform::Platform;
use std::{
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::{info, warn};

#[derive(Debug)]
pub enum MediaError {
    /// A required parameter was missing or empty
    InvalidInput(&'static str),
    /// The extractor failed; carries its error verbatim
    Extraction(anyhow::Error),
}

impl fmt::Display for MediaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaError::InvalidInput(message) => f.write_str(message),
            MediaError::Extraction(e) => write!(f, "{e:#}"),
        }
    }
}

impl std::error::Error for MediaError {}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

pub struct MediaService {
    extractor: Arc<dyn Extractor>,
    download_dir: PathBuf,
    in_flight: InFlight,
}

impl MediaService {
    pub fn new(extractor: Arc<dyn Extractor>, download_dir: impl Into<PathBuf>) -> Self {
        let download_dir = download_dir.into();
        info!(
            "Media service initialized - using {} with downloads in {}",
            extractor.name(),
            download_dir.display()
        );

        Self {
            extractor,
            download_dir,
            in_flight: InFlight::new(),
        }
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    pub async fn list_formats(&self, url: &str) -> Result<Vec<FormatDescriptor>, MediaError> {
        if is_blank(url) {
            return Err(MediaError::InvalidInput("URL is required"));
        }

        let platform = Platform::detect(url);
        info!(%platform, "Listing formats for URL: {}", url);

        let media = self.extractor.list_formats_raw(url).await.map_err(|e| {
            warn!(%platform, "{} failed to list formats: {:#}", self.extractor.name(), e);
            MediaError::Extraction(e)
        })?;

        let formats = playable_formats(&media.formats);
        info!(
            %platform,
            "Found {} playable formats out of {} for {}",
            formats.len(),
            media.formats.len(),
            media.title.as_deref().unwrap_or(url)
        );

        Ok(formats)
    }

    pub async fn download(&self, url: &str, format_id: &str) -> Result<DownloadResult, MediaError> {
        if is_blank(url) || is_blank(format_id) {
            return Err(MediaError::InvalidInput("Missing url or format_id"));
        }

        let platform = Platform::detect(url);
        let _slot = self.in_flight.acquire(url, format_id).await;
        info!(%platform, "Starting download of format {} for URL: {}", format_id, url);

        let path = self
            .extractor
            .download(url, format_id, &self.download_dir)
            .await
            .map_err(|e| {
                warn!(%platform, "{} failed to download: {:#}", self.extractor.name(), e);
                MediaError::Extraction(e)
            })?;

        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                MediaError::Extraction(anyhow::anyhow!(
                    "Extractor returned a path without a file name: {}",
                    path.display()
                ))
            })?;

        info!(%platform, "Successfully downloaded {}", filename);
        Ok(DownloadResult::for_file(&filename))
    }

    pub async fn test_setup(&self) -> anyhow::Result<()> {
        info!("Testing media extractor setup...");

        if self.extractor.test_availability().await {
            info!("✅ {} is available", self.extractor.name());
            Ok(())
        } else {
            Err(anyhow::anyhow!(
                "{} is not available. Please install it or set extractor.binary.",
                self.extractor.name()
            ))
        }
    }
}

#[cfg(test)]
pub mod testing {
    use super::{types::MediaInfo, types::RawFormat, Extractor};
    use anyhow::Result;
    use async_trait::async_trait;
    use std::{
        path::{Path, PathBuf},
        sync::atomic::{AtomicUsize, Ordering},
    };

    /// In-process extractor that never touches the network. Downloads write a
    /// small file named after the last path segment of the URL.
    #[derive(Default)]
    pub struct FakeExtractor {
        pub formats: Vec<RawFormat>,
        pub failure: Option<String>,
        pub downloads: AtomicUsize,
    }

    impl FakeExtractor {
        pub fn with_formats(formats: Vec<RawFormat>) -> Self {
            Self {
                formats,
                ..Self::default()
            }
        }

        pub fn failing(message: &str) -> Self {
            Self {
                failure: Some(message.to_string()),
                ..Self::default()
            }
        }
    }

    pub fn raw_format(
        format_id: &str,
        vcodec: &str,
        ext: &str,
        height: Option<u32>,
        fps: Option<f64>,
    ) -> RawFormat {
        RawFormat {
            format_id: Some(format_id.to_string()),
            ext: Some(ext.to_string()),
            vcodec: Some(vcodec.to_string()),
            height,
            fps,
        }
    }

    #[async_trait]
    impl Extractor for FakeExtractor {
        fn name(&self) -> &'static str {
            "fake"
        }

        async fn list_formats_raw(&self, _url: &str) -> Result<MediaInfo> {
            if let Some(message) = &self.failure {
                return Err(anyhow::anyhow!("{message}"));
            }
            Ok(MediaInfo {
                title: Some("Fake clip".to_string()),
                formats: self.formats.clone(),
            })
        }

        async fn download(&self, url: &str, format_id: &str, output_dir: &Path) -> Result<PathBuf> {
            if let Some(message) = &self.failure {
                return Err(anyhow::anyhow!("{message}"));
            }
            self.downloads.fetch_add(1, Ordering::SeqCst);

            let id = url.rsplit('/').next().unwrap_or("media");
            let path = output_dir.join(format!("{id}.mp4"));
            tokio::fs::write(&path, format!("{url} {format_id}")).await?;
            Ok(path)
        }

        async fn test_availability(&self) -> bool {
            self.failure.is_none()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{raw_format, FakeExtractor};
    use super::*;
    use std::sync::atomic::Ordering;

    fn service(extractor: FakeExtractor, dir: &Path) -> MediaService {
        MediaService::new(Arc::new(extractor), dir)
    }

    #[tokio::test]
    async fn test_list_formats_requires_url() {
        let dir = tempfile::tempdir().unwrap();
        let media = service(FakeExtractor::default(), dir.path());

        for url in ["", "   "] {
            let err = media.list_formats(url).await.unwrap_err();
            assert!(matches!(err, MediaError::InvalidInput(_)));
            assert_eq!(err.to_string(), "URL is required");
        }
    }

    #[tokio::test]
    async fn test_list_formats_filters_extractor_output() {
        let dir = tempfile::tempdir().unwrap();
        let media = service(
            FakeExtractor::with_formats(vec![
                raw_format("sb0", "none", "mp4", None, None),
                raw_format("243", "vp9", "webm", Some(360), None),
                raw_format("136", "h264", "mp4", Some(720), Some(30.0)),
                raw_format("137", "h264", "mp4", Some(1080), None),
            ]),
            dir.path(),
        );

        let formats = media.list_formats("https://youtu.be/abc").await.unwrap();
        let ids: Vec<&str> = formats.iter().map(|f| f.format_id.as_str()).collect();
        assert_eq!(ids, vec!["137", "136"]);
    }

    #[tokio::test]
    async fn test_extractor_error_is_passed_through() {
        let dir = tempfile::tempdir().unwrap();
        let media = service(
            FakeExtractor::failing("ERROR: Unsupported URL: https://example.com"),
            dir.path(),
        );

        let err = media.list_formats("https://example.com").await.unwrap_err();
        assert!(matches!(err, MediaError::Extraction(_)));
        assert_eq!(err.to_string(), "ERROR: Unsupported URL: https://example.com");

        let err = media.download("https://example.com", "18").await.unwrap_err();
        assert_eq!(err.to_string(), "ERROR: Unsupported URL: https://example.com");
    }

    #[tokio::test]
    async fn test_download_requires_both_parameters() {
        let dir = tempfile::tempdir().unwrap();
        let media = service(FakeExtractor::default(), dir.path());

        for (url, format_id) in [("", "18"), ("https://youtu.be/abc", ""), ("", "")] {
            let err = media.download(url, format_id).await.unwrap_err();
            assert_eq!(err.to_string(), "Missing url or format_id");
        }
    }

    #[tokio::test]
    async fn test_repeated_download_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = Arc::new(FakeExtractor::default());
        let media = MediaService::new(extractor.clone(), dir.path());

        let first = media.download("https://youtu.be/abc", "18").await.unwrap();
        let second = media.download("https://youtu.be/abc", "18").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(second.filename, "abc.mp4");
        assert_eq!(second.download_url, "/file/abc.mp4");
        assert!(dir.path().join("abc.mp4").exists());
        assert_eq!(extractor.downloads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_setup_reports_unavailable_extractor() {
        let dir = tempfile::tempdir().unwrap();
        assert!(service(FakeExtractor::default(), dir.path())
            .test_setup()
            .await
            .is_ok());
        assert!(service(FakeExtractor::failing("missing"), dir.path())
            .test_setup()
            .await
            .is_err());
    }
}
