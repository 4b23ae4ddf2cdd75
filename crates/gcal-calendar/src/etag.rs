//! ETag quoting for conditional requests.

/// Wrap an ETag in double quotes unless it already has them.
pub fn quote_etag(etag: &str) -> String {
    let mut quoted = String::with_capacity(etag.len() + 2);
    if !etag.starts_with('"') {
        quoted.push('"');
    }
    quoted.push_str(etag);
    if !etag.ends_with('"') || etag.len() == 1 {
        quoted.push('"');
    }
    quoted
}

/// `If-Match` value: the quoted ETag, or `*` to overwrite unconditionally.
pub fn if_match_value(etag: Option<&str>) -> String {
    match etag {
        Some(tag) if !tag.is_empty() => quote_etag(tag),
        _ => "*".to_string(),
    }
}
