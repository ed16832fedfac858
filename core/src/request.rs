//! The immutable description of one request to send.
//!
//! # Design
//! A `RequestSpec` holds exactly what the user entered. `build` turns it into
//! the plain-data `HttpRequest` the host executes: the URL is assembled and
//! the headers are filtered. Cookies are not part of the `HttpRequest`; the
//! host seeds its cookie jar from `cookies` so the jar stays the single
//! source of truth for what is sent.

use serde::{Deserialize, Serialize};

use crate::headers::filter_headers;
use crate::http::{HttpMethod, HttpRequest};
use crate::types::{KeyValues, RequestBody};
use crate::url::build_url;

/// Everything needed to send one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestSpec {
    pub base_url: String,
    pub method: HttpMethod,
    #[serde(default)]
    pub segments: Vec<String>,
    #[serde(default)]
    pub query: KeyValues,
    #[serde(default)]
    pub headers: KeyValues,
    #[serde(default)]
    pub cookies: KeyValues,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<RequestBody>,
}

impl RequestSpec {
    /// A bare `GET` of `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            method: HttpMethod::Get,
            segments: Vec::new(),
            query: KeyValues::new(),
            headers: KeyValues::new(),
            cookies: KeyValues::new(),
            body: None,
        }
    }

    /// The request the form starts out with, pointed at `base_url`.
    pub fn sample(base_url: impl Into<String>) -> Self {
        Self {
            segments: vec!["api".to_string(), "test".to_string()],
            query: [("type", "1"), ("number", "2"), ("key", "3")].into_iter().collect(),
            headers: [("User-Agent", "APITestApp/2.0"), ("Accept", "application/json")]
                .into_iter()
                .collect(),
            cookies: [("session", "example_session_id")].into_iter().collect(),
            ..Self::new(base_url)
        }
    }

    /// The full target URL.
    pub fn url(&self) -> String {
        build_url(&self.base_url, &self.segments, &self.query)
    }

    /// Cookies that will be seeded into the jar before sending.
    pub fn outgoing_cookies(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cookies.included()
    }

    pub fn build(&self) -> HttpRequest {
        HttpRequest {
            method: self.method,
            url: self.url(),
            headers: filter_headers(&self.headers),
            body: self
                .body
                .as_ref()
                .map(|b| (b.content_type.clone(), b.content.clone())),
        }
    }
}
