use std::fmt;
use url::Url;

/// Site a media URL points at. Only used to tag log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    YouTube,
    Facebook,
    TikTok,
    Unknown,
}

impl Platform {
    pub fn detect(input: &str) -> Self {
        let input = input.trim();
        if input.is_empty() {
            return Platform::Unknown;
        }

        // Accept pasted links without a scheme
        let parsed = Url::parse(input).or_else(|_| Url::parse(&format!("https://{input}")));
        let Some(host) = parsed.ok().and_then(|u| u.host_str().map(str::to_lowercase)) else {
            return Platform::Unknown;
        };

        if host.contains("youtube.com") || host.contains("youtu.be") {
            Platform::YouTube
        } else if host.contains("facebook.com") || host.contains("fb.watch") {
            Platform::Facebook
        } else if host.contains("tiktok.com") {
            Platform::TikTok
        } else {
            Platform::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::YouTube => "youtube",
            Platform::Facebook => "facebook",
            Platform::TikTok => "tiktok",
            Platform::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
