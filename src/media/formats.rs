use super::types::{FormatDescriptor, RawFormat};

const PLAYABLE_CONTAINER: &str = "mp4";

/// Keeps the mp4 entries that carry a video stream, labels them and orders
/// them from the highest resolution down. Entries without a height sink to
/// the bottom in the order the extractor reported them.
pub fn playable_formats(raw: &[RawFormat]) -> Vec<FormatDescriptor> {
    let mut formats: Vec<FormatDescriptor> = raw
        .iter()
        .filter(|f| has_video(f) && f.ext.as_deref() == Some(PLAYABLE_CONTAINER))
        .map(describe)
        .collect();

    // sort_by is stable, equal heights keep extractor order
    formats.sort_by(|a, b| b.height.cmp(&a.height));
    formats
}

/// yt-dlp reports audio-only entries as `"none"`; a missing codec only means
/// the extractor could not tell, as with direct file links.
fn has_video(format: &RawFormat) -> bool {
    format.vcodec.as_deref() != Some("none")
}

fn describe(format: &RawFormat) -> FormatDescriptor {
    let format_id = format.format_id.clone().unwrap_or_default();
    let height = format.height.filter(|h| *h > 0);

    let mut parts = Vec::with_capacity(2);
    if let Some(h) = height {
        parts.push(format!("{h}p"));
    }
    if let Some(fps) = format.fps.filter(|fps| *fps > 0.0) {
        parts.push(format!("{}fps", format_fps(fps)));
    }

    let label = if parts.is_empty() {
        format_id.clone()
    } else {
        parts.join(" ")
    };

    FormatDescriptor {
        format_id,
        label,
        height: height.unwrap_or(0),
    }
}

fn format_fps(fps: f64) -> String {
    if fps.fract() == 0.0 {
        format!("{}", fps as u64)
    } else {
        format!("{fps}")
    }
}
