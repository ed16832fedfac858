//! One user's sequence of request/response cycles.
//!
//! # Design
//! A `Session` owns a `reqwest::Client` wired to its own cookie jar, plus the
//! `CookieTracker` holding the snapshot from the previous exchange. `send`
//! takes `&mut self`, so a session runs one request at a time. Independent
//! sessions share nothing.
//!
//! Failures never escape `send`. A malformed URL or a cookie that would be
//! cut short is noted and the request still goes out; a transport failure or a cookie
//! read failure is carried in the returned `Exchange` as an error.

use std::sync::Arc;
use std::time::Duration;

use reqcraft_core::{
    parse_cookie_header, render, validate_cookie, ComposeError, CookieChange, CookieSnapshot,
    CookieTracker, HttpMethod, HttpRequest, HttpResponse, KeyValues, RequestSpec,
};
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method};
use thiserror::Error;
use url::Url;

/// Errors raised while performing an exchange.
#[derive(Debug, Error)]
pub enum SendError {
    /// The target URL could not be parsed for cookie handling.
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A cookie was left out because it would be cut short on the wire.
    #[error("{0}")]
    InvalidCookie(#[from] ComposeError),

    /// DNS, connection, TLS, timeout or body read failure.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Cookie changes observed after an exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieReport {
    pub changes: Vec<CookieChange>,
    pub current: CookieSnapshot,
}

/// Everything learned from sending one request.
#[derive(Debug)]
pub struct Exchange {
    pub request: HttpRequest,
    /// Non-fatal problems hit before sending.
    pub notes: Vec<String>,
    pub response: Result<HttpResponse, SendError>,
    pub cookies: Result<CookieReport, SendError>,
}

impl Exchange {
    /// Request preamble, notes, then the response report or the failure.
    pub fn render_response(&self) -> String {
        let mut out = render::request_preamble(&self.request);
        out.push('\n');
        for note in &self.notes {
            out.push_str(note);
            out.push('\n');
        }
        match &self.response {
            Ok(response) => out.push_str(&render::response_report(response)),
            Err(err) => {
                out.push_str(&err.to_string());
                out.push('\n');
            }
        }
        out
    }

    pub fn render_cookies(&self) -> String {
        match &self.cookies {
            Ok(report) => render::cookie_report(&report.changes, &report.current),
            Err(err) => format!("cookie check failed: {err}\n"),
        }
    }

    /// The cookies to send next time, when this exchange changed them.
    pub fn refreshed_cookies(&self) -> Option<KeyValues> {
        match &self.cookies {
            Ok(report) if !report.changes.is_empty() => Some(report.current.iter().collect()),
            _ => None,
        }
    }
}

pub struct Session {
    http: Client,
    jar: Arc<Jar>,
    tracker: CookieTracker,
}

impl Session {
    /// A session with an empty cookie jar. `timeout` of `None` waits forever.
    pub fn new(timeout: Option<Duration>) -> Result<Self, SendError> {
        let jar = Arc::new(Jar::default());
        let mut builder = Client::builder().cookie_provider(Arc::clone(&jar));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            jar,
            tracker: CookieTracker::new(),
        })
    }

    /// The snapshot taken after the previous exchange.
    pub fn last_cookies(&self) -> &CookieSnapshot {
        self.tracker.previous()
    }

    pub async fn send(&mut self, spec: &RequestSpec) -> Exchange {
        let request = spec.build();
        let mut notes = Vec::new();

        for err in self.seed_cookies(spec, &request.url) {
            tracing::warn!(error = %err, url = %request.url, "could not seed cookie");
            notes.push(format!("cookie setup failed: {err}"));
        }

        tracing::info!(method = %request.method, url = %request.url, "sending request");
        let response = self.execute(&request).await;
        match &response {
            Ok(response) => tracing::info!(status = response.status, "response received"),
            Err(err) => tracing::warn!(error = %err, "request failed"),
        }

        let cookies = self.current_cookies(&request.url).map(|current| {
            let changes = self.tracker.diff(current.clone());
            tracing::debug!(changed = changes.len(), total = current.len(), "cookies checked");
            CookieReport { changes, current }
        });

        Exchange {
            request,
            notes,
            response,
            cookies,
        }
    }

    /// Put the spec's cookies into the jar, skipping any that would not
    /// survive intact. Returns one error per cookie that was not set.
    fn seed_cookies(&self, spec: &RequestSpec, url: &str) -> Vec<SendError> {
        let mut cookies = spec.outgoing_cookies().peekable();
        if cookies.peek().is_none() {
            return Vec::new();
        }
        let url = match Url::parse(url) {
            Ok(url) => url,
            Err(err) => return vec![err.into()],
        };

        let mut problems: Vec<SendError> = Vec::new();
        for (name, value) in cookies {
            match validate_cookie(name, value) {
                Ok(()) => self.jar.add_cookie_str(&format!("{name}={value}; Path=/"), &url),
                Err(err) => problems.push(err.into()),
            }
        }
        problems
    }

    fn current_cookies(&self, url: &str) -> Result<CookieSnapshot, SendError> {
        let url = Url::parse(url)?;
        Ok(self
            .jar
            .cookies(&url)
            .map(|header| parse_cookie_header(&String::from_utf8_lossy(header.as_bytes())))
            .unwrap_or_default())
    }

    async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, SendError> {
        let mut builder = self
            .http
            .request(to_reqwest_method(request.method), request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some((content_type, content)) = &request.body {
            builder = builder
                .header(CONTENT_TYPE, content_type.as_str())
                .body(content.clone());
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response.text().await?;

        Ok(HttpResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
        })
    }
}

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Head => Method::HEAD,
        HttpMethod::Options => Method::OPTIONS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exchange(cookies: Result<CookieReport, SendError>) -> Exchange {
        Exchange {
            request: RequestSpec::new("http://h").build(),
            notes: vec!["cookie setup failed: boom".to_string()],
            response: Ok(HttpResponse {
                status: 204,
                reason: "No Content".to_string(),
                headers: Vec::new(),
                body: String::new(),
            }),
            cookies,
        }
    }

    #[test]
    fn changed_cookies_are_fed_back() {
        let current: CookieSnapshot = [("a", "1"), ("b", "2")].into_iter().collect();
        let report = CookieReport {
            changes: vec![CookieChange::Added {
                name: "b".into(),
                value: "2".into(),
            }],
            current,
        };
        let refreshed = exchange(Ok(report)).refreshed_cookies().unwrap();
        assert_eq!(refreshed.get("a"), Some("1"));
        assert_eq!(refreshed.get("b"), Some("2"));
    }

    #[test]
    fn unchanged_cookies_are_not_fed_back() {
        let report = CookieReport {
            changes: Vec::new(),
            current: [("a", "1")].into_iter().collect(),
        };
        assert!(exchange(Ok(report)).refreshed_cookies().is_none());
    }

    #[test]
    fn cookie_failure_is_rendered_inline() {
        let err = Url::parse("not a url").unwrap_err();
        let exchange = exchange(Err(SendError::InvalidUrl(err)));
        assert!(exchange.refreshed_cookies().is_none());
        assert!(exchange.render_cookies().starts_with("cookie check failed: invalid url"));
    }

    #[test]
    fn response_rendering_includes_notes() {
        let text = exchange(Err(SendError::InvalidUrl(url::ParseError::EmptyHost))).render_response();
        assert!(text.starts_with("request url: http://h\nrequest method: GET\n\n"));
        assert!(text.contains("cookie setup failed: boom\n"));
        assert!(text.contains("status: 204 No Content"));
    }

    #[test]
    fn every_method_maps_to_reqwest() {
        for method in HttpMethod::ALL {
            assert_eq!(to_reqwest_method(method).as_str(), method.as_str());
        }
    }
}
