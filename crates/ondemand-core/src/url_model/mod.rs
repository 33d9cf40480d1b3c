//! Local filename derivation for downloaded artifacts.
//!
//! The cache key of an artifact is its filename, so this is where the
//! server's `Content-Disposition` and the URL path turn into a path component.

mod content_disposition;
mod path;
mod sanitize;

pub use content_disposition::parse_content_disposition_filename;
pub use path::filename_from_url_path;
pub use sanitize::sanitize_filename;

/// Derives the local filename for an artifact.
///
/// Prefers the `Content-Disposition` filename; without one, falls back to the
/// last segment of `url`. Returns `None` when neither yields a usable name,
/// so callers fail before touching the filesystem.
///
/// - `derive_filename("https://h/x", Some("attachment; filename=\"foo.safetensors\""))` → `foo.safetensors`
/// - `derive_filename("https://h/dir/bar.ckpt", None)` → `bar.ckpt`
/// - `derive_filename("https://h/", None)` → `None`
pub fn derive_filename(url: &str, content_disposition: Option<&str>) -> Option<String> {
    let from_header = content_disposition
        .and_then(parse_content_disposition_filename)
        .map(|s| sanitize_filename(&s))
        .filter(|s| !s.is_empty());
    from_header.or_else(|| {
        filename_from_url_path(url)
            .map(|s| sanitize_filename(&s))
            .filter(|s| !s.is_empty())
    })
}
