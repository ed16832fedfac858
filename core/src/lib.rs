//! I/O-free core of the reqcraft request composer.
//!
//! # Overview
//! Turns user input into plain-data `HttpRequest` values and renders
//! `HttpResponse` values and cookie changes as text, without touching the
//! network (host-does-IO pattern). The host owns the HTTP client and the
//! cookie jar.
//!
//! # Design
//! - `RequestSpec` is an immutable value built fresh for every send.
//! - `build_url`, `filter_headers` and `diff_snapshots` are pure functions.
//! - `CookieTracker` is the only stateful piece and is owned by whoever
//!   drives a session, never shared globally.

pub mod cookies;
pub mod error;
pub mod headers;
pub mod http;
pub mod render;
pub mod request;
pub mod types;
pub mod url;

pub use cookies::{
    diff_snapshots, parse_cookie_header, validate_cookie, CookieChange, CookieSnapshot,
    CookieTracker,
};
pub use error::ComposeError;
pub use headers::filter_headers;
pub use crate::http::{HttpMethod, HttpRequest, HttpResponse};
pub use request::RequestSpec;
pub use types::{KeyValues, RequestBody};
pub use crate::url::{build_url, escape_component};
