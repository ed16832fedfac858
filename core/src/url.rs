//! Target URL assembly from a base URL, path segments and query parameters.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::types::KeyValues;

/// RFC 3986 component escaping: everything but unreserved characters.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encode a single query key or value.
pub fn escape_component(raw: &str) -> String {
    utf8_percent_encode(raw, COMPONENT).to_string()
}

/// Join `base_url`, `segments` and `query` into one URL string.
///
/// Segments are trimmed of surrounding whitespace; blank segments and blank
/// query keys are skipped. The base URL is not
/// validated; a bad scheme or host surfaces when the request is sent.
pub fn build_url<S: AsRef<str>>(base_url: &str, segments: &[S], query: &KeyValues) -> String {
    let mut url = base_url.trim_end_matches('/').to_string();

    for segment in segments {
        let segment = segment.as_ref().trim().trim_start_matches('/');
        if segment.is_empty() {
            continue;
        }
        url.push('/');
        url.push_str(segment);
    }

    let params: Vec<String> = query
        .included()
        .map(|(k, v)| format!("{}={}", escape_component(k), escape_component(v)))
        .collect();
    if !params.is_empty() {
        url.push('?');
        url.push_str(&params.join("&"));
    }

    url
}
