//! Companion HTTP server that echoes each request back as JSON.
//!
//! Every path and method is accepted. `OPTIONS` answers a CORS preflight with
//! an empty 200; anything else gets a pretty-printed description of the
//! request plus a fixed test cookie, so a client can watch its cookie jar
//! change.

use std::collections::BTreeMap;

use axum::{
    body::Bytes,
    http::{
        header::{
            HeaderName, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE, COOKIE, SET_COOKIE,
        },
        HeaderMap, Method, StatusCode, Uri,
    },
    response::{IntoResponse, Response},
    Router,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use uuid::Uuid;

pub const DEFAULT_PORT: u16 = 3001;

/// Cookie attached to every non-preflight response.
pub const TEST_COOKIE: &str = "test-cookie=test-value; Path=/";

/// A query parameter seen once is a string; seen repeatedly, a list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryValue {
    One(String),
    Many(Vec<String>),
}

/// The JSON document returned for every echoed request.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub path: String,
    pub query: BTreeMap<String, QueryValue>,
    pub headers: BTreeMap<String, String>,
    pub timestamp: String,
    pub message: String,
    pub request_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

pub fn app() -> Router {
    Router::new().fallback(echo)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn cors_headers() -> [(HeaderName, &'static str); 3] {
    [
        (ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
        (ACCESS_CONTROL_ALLOW_METHODS, "GET, POST, PUT, DELETE, PATCH"),
        (
            ACCESS_CONTROL_ALLOW_HEADERS,
            "Content-Type, Authorization, User-Agent, Accept",
        ),
    ]
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Response {
    if method == Method::OPTIONS {
        tracing::debug!(%uri, "preflight");
        return (StatusCode::OK, cors_headers()).into_response();
    }

    let path = uri.path().to_string();
    let query = parse_query(uri.query());
    tracing::info!(%method, %uri, "echo");
    tracing::debug!(?headers, ?query, "request details");

    let carries_body = method == Method::POST || method == Method::PUT || method == Method::PATCH;
    let echo = Echo {
        method: method.to_string(),
        message: format!("Hello from API test server! Path: {path}"),
        path,
        query,
        headers: collect_headers(&headers),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        request_id: Uuid::new_v4(),
        body: carries_body.then(|| String::from_utf8_lossy(&body).into_owned()),
    };

    match serde_json::to_string_pretty(&echo) {
        Ok(json) => (
            StatusCode::OK,
            cors_headers(),
            [(SET_COOKIE, TEST_COOKIE), (CONTENT_TYPE, "application/json")],
            json,
        )
            .into_response(),
        Err(err) => {
            tracing::error!(error = %err, "failed to encode echo");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Decode a raw query string. An undecodable query echoes as empty.
pub fn parse_query(raw: Option<&str>) -> BTreeMap<String, QueryValue> {
    let pairs: Vec<(String, String)> = raw
        .map(|q| serde_urlencoded::from_str::<Vec<(String, String)>>(q).unwrap_or_default())
        .unwrap_or_default();

    let mut query = BTreeMap::new();
    for (key, value) in pairs {
        match query.remove(&key) {
            None => {
                query.insert(key, QueryValue::One(value));
            }
            Some(QueryValue::One(first)) => {
                query.insert(key, QueryValue::Many(vec![first, value]));
            }
            Some(QueryValue::Many(mut all)) => {
                all.push(value);
                query.insert(key, QueryValue::Many(all));
            }
        }
    }
    query
}

fn collect_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut collected: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        let separator = if *name == COOKIE { "; " } else { ", " };
        collected
            .entry(name.as_str().to_string())
            .and_modify(|joined| {
                joined.push_str(separator);
                joined.push_str(&value);
            })
            .or_insert(value);
    }
    collected
}
