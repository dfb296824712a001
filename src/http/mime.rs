//! Content-Type classification module
//!
//! Derives the Content-Type of a stored file from its path. The same
//! classification is applied when a file is written and when it is read back.

pub const HTML: &str = "text/html; charset=utf-8";
pub const CSS: &str = "text/css; charset=utf-8";
pub const JAVASCRIPT: &str = "text/javascript; charset=utf-8";
pub const IMAGE: &str = "image/*";
pub const PLAIN_TEXT: &str = "text/plain; charset=utf-8";

/// Fallback for uploads that declare no type
pub const OCTET_STREAM: &str = "application/octet-stream";

const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "gif", "webp", "svg"];

/// Get the Content-Type for a stored path
///
/// First match wins. Text suffixes are matched exactly, image suffixes
/// case-insensitively.
///
/// # Examples
/// ```
/// use bucket_gateway::http::mime::content_type_for_path;
/// assert_eq!(content_type_for_path("index.html"), "text/html; charset=utf-8");
/// assert_eq!(content_type_for_path("logo.PNG"), "image/*");
/// assert_eq!(content_type_for_path("README"), "text/plain; charset=utf-8");
/// ```
pub fn content_type_for_path(path: &str) -> &'static str {
    if path.ends_with(".html") {
        return HTML;
    }
    if path.ends_with(".css") {
        return CSS;
    }
    if path.ends_with(".js") {
        return JAVASCRIPT;
    }

    let is_image = path.rsplit_once('.').is_some_and(|(_, ext)| {
        IMAGE_EXTENSIONS
            .iter()
            .any(|candidate| ext.eq_ignore_ascii_case(candidate))
    });
    if is_image {
        return IMAGE;
    }

    PLAIN_TEXT
}
