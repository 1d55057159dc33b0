use super::{extractor::Extractor, types::MediaInfo};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::{
    path::{Path, PathBuf},
    process::Output,
    time::Duration,
};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Output template handed to yt-dlp, relative to the download directory.
const OUTPUT_TEMPLATE: &str = "%(id)s.%(ext)s";

pub struct YtDlpExtractor {
    binary: String,
    timeout: Option<Duration>,
}

impl YtDlpExtractor {
    pub fn new(binary: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("--no-playlist")
            .arg("--no-check-certificates")
            .arg("--no-warnings")
            .arg("--quiet");
        cmd
    }

    async fn run(&self, mut cmd: Command, action: &str) -> Result<Output> {
        // A timed out call must not leave yt-dlp writing behind the caller's back
        if self.timeout.is_some() {
            cmd.kill_on_drop(true);
        }

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, cmd.output())
                .await
                .with_context(|| format!("{action} timed out after {}s", limit.as_secs()))?,
            None => cmd.output().await,
        }
        .with_context(|| format!("Failed to run {}", self.binary))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = stderr.trim();
            if message.is_empty() {
                return Err(anyhow::anyhow!("{action} failed: {}", output.status));
            }
            return Err(anyhow::anyhow!("{message}"));
        }

        Ok(output)
    }
}

/// yt-dlp prints the final path after post-processing on its own line.
fn parse_printed_path(stdout: &str) -> Option<PathBuf> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .last()
        .map(PathBuf::from)
}

#[async_trait]
impl Extractor for YtDlpExtractor {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    async fn list_formats_raw(&self, url: &str) -> Result<MediaInfo> {
        debug!("Extracting metadata with yt-dlp for: {}", url);

        let mut cmd = self.command();
        cmd.arg("--dump-single-json")
            .arg("--skip-download")
            .arg("--")
            .arg(url);

        let output = self.run(cmd, "Media metadata extraction").await?;

        let info: MediaInfo = serde_json::from_slice(&output.stdout)
            .context("Failed to parse media metadata")?;

        debug!("yt-dlp reported {} formats", info.formats.len());
        Ok(info)
    }

    async fn download(&self, url: &str, format_id: &str, output_dir: &Path) -> Result<PathBuf> {
        info!("Downloading format {} with yt-dlp: {}", format_id, url);

        let mut cmd = self.command();
        cmd.arg("--format")
            .arg(format_id)
            .arg("--output")
            .arg(output_dir.join(OUTPUT_TEMPLATE))
            .arg("--no-progress")
            .arg("--no-simulate")
            .arg("--print")
            .arg("after_move:filepath")
            .arg("--")
            .arg(url);

        let output = self.run(cmd, "Media download").await?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let path = parse_printed_path(&stdout)
            .ok_or_else(|| anyhow::anyhow!("yt-dlp did not report a downloaded file"))?;

        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Err(anyhow::anyhow!(
                "yt-dlp reported {} but the file does not exist",
                path.display()
            ));
        }

        info!("Download finished: {}", path.display());
        Ok(path)
    }

    async fn test_availability(&self) -> bool {
        let yt_dlp = probe_tool(&self.binary, "--version").await;
        // ffmpeg is needed for formats that ship video and audio separately
        let ffmpeg = probe_tool("ffmpeg", "-version").await;

        if yt_dlp && !ffmpeg {
            warn!("⚠️  yt-dlp will work but formats that need merging will fail");
        }

        yt_dlp
    }
}

/// Runs `tool version_flag` and logs the first line it prints.
async fn probe_tool(tool: &str, version_flag: &str) -> bool {
    match Command::new(tool).arg(version_flag).output().await {
        Ok(output) if output.status.success() => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let version = stdout.lines().next().unwrap_or("unknown").trim();
            info!("✅ {} is available: {}", tool, version);
            true
        }
        Ok(output) => {
            warn!("❌ {} {} exited with {}", tool, version_flag, output.status);
            false
        }
        Err(e) => {
            warn!("❌ {} not found: {}", tool, e);
            false
        }
    }
}
