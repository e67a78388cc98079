use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::http::{header, HeaderMap, HeaderValue};
use httpdate::{fmt_http_date, parse_http_date};

/// Outcome of conditional-request evaluation. Both variants carry the
/// validation headers to attach to the response; the caller decides whether
/// a body follows. Metadata failures never reach this point, so no third
/// variant is needed here.
#[derive(Debug)]
pub enum Validation {
    Fresh(HeaderMap),
    NotModified(HeaderMap),
}

/// Compute `Last-Modified` and `ETag` for a resource timestamp and evaluate
/// the request's conditional headers against them.
///
/// `If-None-Match` takes precedence over `If-Modified-Since`; when present
/// the date check is skipped entirely. Timestamps compare at second
/// granularity, matching the HTTP date format.
pub fn check(last_modified: SystemTime, request_headers: &HeaderMap) -> Validation {
    let etag = entity_tag(last_modified);

    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&fmt_http_date(last_modified)) {
        headers.insert(header::LAST_MODIFIED, value);
    }
    if let Ok(value) = HeaderValue::from_str(&etag) {
        headers.insert(header::ETAG, value);
    }

    if let Some(if_none_match) = header_str(request_headers, header::IF_NONE_MATCH) {
        let matched = if_none_match
            .split(',')
            .map(str::trim)
            .any(|candidate| candidate == "*" || strip_weak(candidate) == etag);
        return if matched {
            Validation::NotModified(headers)
        } else {
            Validation::Fresh(headers)
        };
    }

    if let Some(if_modified_since) = header_str(request_headers, header::IF_MODIFIED_SINCE) {
        if let Ok(client_time) = parse_http_date(if_modified_since) {
            if truncate_to_seconds(last_modified) <= client_time {
                return Validation::NotModified(headers);
            }
        }
    }

    Validation::Fresh(headers)
}

/// Tag derived from the modification timestamp alone.
fn entity_tag(last_modified: SystemTime) -> String {
    let millis = last_modified
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_millis())
        .unwrap_or(0);
    format!("\"{millis:x}\"")
}

fn strip_weak(tag: &str) -> &str {
    tag.strip_prefix("W/").unwrap_or(tag)
}

fn header_str(headers: &HeaderMap, name: header::HeaderName) -> Option<&str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

fn truncate_to_seconds(time: SystemTime) -> SystemTime {
    let secs = time
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_secs())
        .unwrap_or(0);
    UNIX_EPOCH + Duration::from_secs(secs)
}
