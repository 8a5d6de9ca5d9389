/// Fallback name for paths whose final segment is empty.
pub const UNKNOWN_NAME: &str = "Unknown";

/// Derive a track's display name: the text after the last `/` or `\`.
///
/// Both separators are honoured regardless of platform so that Windows paths
/// render the same everywhere. Paths ending in a separator (or empty paths)
/// have no usable segment and become `"Unknown"`.
pub fn display_name(path: &str) -> String {
    match path.rsplit(['/', '\\']).next() {
        Some(segment) if !segment.is_empty() => segment.to_string(),
        _ => UNKNOWN_NAME.to_string(),
    }
}
