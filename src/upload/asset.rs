//! Per-file details of an asset upload: name, URL and content type.

use std::borrow::Cow;
use std::path::Path;
use url::form_urlencoded;

/// Content type for extensions missing from [`CONTENT_TYPES`].
pub const DEFAULT_CONTENT_TYPE: &str = "text/html";

const CONTENT_TYPES: &[(&str, &str)] = &[
    ("zip", "application/zip"),
    ("gz", "application/gzip"),
    ("tgz", "application/gzip"),
    ("tar", "application/x-tar"),
    ("json", "application/json"),
    ("txt", "text/plain"),
    ("md", "text/markdown"),
];

/// Looks up the content type by file extension (case-insensitive).
pub fn content_type(path: &Path) -> &'static str {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| {
            CONTENT_TYPES
                .iter()
                .find(|(known, _)| known.eq_ignore_ascii_case(ext))
        })
        .map_or(DEFAULT_CONTENT_TYPE, |&(_, mime)| mime)
}

/// The name the asset is published under: the file's base name.
pub fn asset_name(path: &Path) -> Option<Cow<'_, str>> {
    path.file_name().map(|name| name.to_string_lossy())
}

/// Expands a release `upload_url` template for one asset.
///
/// The first `{?...}` expression (`{?name}`, `{?name,label}`) becomes
/// `?name=<encoded name>`. Without one, the query is appended.
pub fn upload_url(template: &str, name: &str) -> String {
    let query = format!(
        "?name={}",
        form_urlencoded::byte_serialize(name.as_bytes()).collect::<String>()
    );

    let expression = template
        .find("{?")
        .and_then(|start| template[start..].find('}').map(|len| (start, start + len + 1)));

    match expression {
        Some((start, end)) => format!("{}{}{}", &template[..start], query, &template[end..]),
        None => format!("{}{}", template, query),
    }
}
