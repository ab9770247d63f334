//! Validation and normalization helpers for uploaded content.

use derive_more::Display;

/// MIME types accepted for content uploads.
pub const ALLOWED_MIME_TYPES: [&str; 8] = [
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "text/plain",
    "text/csv",
    "application/json",
    "application/pdf",
];

/// Check if files of the provided MIME type can be uploaded.
pub fn is_allowed_mime_type(mime: &str) -> bool {
    ALLOWED_MIME_TYPES.contains(&mime)
}

/// Broad content category derived from a MIME type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Display)]
pub enum Category {
    #[display(fmt = "image")]
    Image,
    #[display(fmt = "video")]
    Video,
    #[display(fmt = "audio")]
    Audio,
    #[display(fmt = "text")]
    Text,
    #[display(fmt = "dataset")]
    Dataset,
    #[display(fmt = "other")]
    Other,
}

/// Get a [`Category`] of the provided MIME type.
///
/// Used as a content type when an uploader doesn't specify one.
pub fn content_category(mime: &str) -> Category {
    if mime.starts_with("image/") {
        Category::Image
    } else if mime.starts_with("video/") {
        Category::Video
    } else if mime.starts_with("audio/") {
        Category::Audio
    } else if mime.starts_with("text/") {
        Category::Text
    } else if mime.contains("json") || mime.contains("csv") {
        Category::Dataset
    } else {
        Category::Other
    }
}

/// Check that a per-use price is a positive decimal number.
pub fn is_valid_price(price: &str) -> bool {
    price
        .trim()
        .parse::<f64>()
        .map(|value| value.is_finite() && value > 0.0)
        .unwrap_or(false)
}

/// Replace every character that is not safe for a file name with `_`.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Normalize a comma-separated tag list.
///
/// Returns [`None`] if no tags remain after trimming.
pub fn normalize_tags(raw: &str) -> Option<String> {
    let tags = raw
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .collect::<Vec<_>>();

    if tags.is_empty() {
        None
    } else {
        Some(tags.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_types() {
        assert!(is_allowed_mime_type("image/png"));
        assert!(is_allowed_mime_type("application/pdf"));
        assert!(!is_allowed_mime_type("application/zip"));
        assert!(!is_allowed_mime_type("video/mp4"));
    }

    #[test]
    fn categories() {
        assert_eq!(content_category("image/webp"), Category::Image);
        assert_eq!(content_category("video/mp4"), Category::Video);
        assert_eq!(content_category("audio/ogg"), Category::Audio);
        assert_eq!(content_category("text/csv"), Category::Text);
        assert_eq!(content_category("application/json"), Category::Dataset);
        assert_eq!(content_category("application/pdf"), Category::Other);
        assert_eq!(Category::Dataset.to_string(), "dataset");
    }

    #[test]
    fn prices() {
        assert!(is_valid_price("0.5"));
        assert!(is_valid_price(" 10 "));
        assert!(!is_valid_price("0"));
        assert!(!is_valid_price("-1"));
        assert!(!is_valid_price("free"));
        assert!(!is_valid_price("inf"));
        assert!(!is_valid_price(""));
    }

    #[test]
    fn file_names() {
        assert_eq!(sanitize_file_name("my report (1).pdf"), "my_report__1_.pdf");
        assert_eq!(sanitize_file_name("../etc/passwd"), ".._etc_passwd");
        assert_eq!(sanitize_file_name("data-set.csv"), "data-set.csv");
    }

    #[test]
    fn tags() {
        assert_eq!(
            normalize_tags(" ai, data ,,images "),
            Some(String::from("ai,data,images"))
        );
        assert_eq!(normalize_tags(" , "), None);
    }
}
