//! Filtering of user-supplied request headers.
//!
//! `content-type` is owned by the request body, so a user entry for it is
//! ignored. Entries the HTTP layer would reject are dropped one by one; a
//! bad header never aborts the request.

use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};

use crate::types::KeyValues;

/// Keep the headers that can be sent as-is, in input order.
pub fn filter_headers(raw: &KeyValues) -> Vec<(String, String)> {
    raw.included()
        .filter(|(name, _)| !name.eq_ignore_ascii_case(CONTENT_TYPE.as_str()))
        .filter(|(name, value)| is_valid_header(name, value))
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}

fn is_valid_header(name: &str, value: &str) -> bool {
    HeaderName::from_bytes(name.as_bytes()).is_ok() && HeaderValue::from_str(value).is_ok()
}
