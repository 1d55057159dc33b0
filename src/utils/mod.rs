use std::path::{Component, Path};

/// True when `name` is a single plain path component, so joining it onto a
/// directory can never leave that directory.
pub fn is_plain_filename(name: &str) -> bool {
    if name.is_empty() || name.contains(['/', '\\', '\0']) {
        return false;
    }

    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Builds an `attachment` Content-Disposition value. Non-ASCII names get an
/// RFC 5987 `filename*` parameter next to an ASCII fallback.
pub fn content_disposition(filename: &str) -> String {
    let fallback = ascii_filename(filename);
    if fallback == filename {
        format!("attachment; filename=\"{fallback}\"")
    } else {
        format!(
            "attachment; filename=\"{fallback}\"; filename*=UTF-8''{}",
            urlencoding::encode(filename)
        )
    }
}

fn ascii_filename(value: &str) -> String {
    value
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | ' ' | '(' | ')') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
