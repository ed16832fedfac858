//! Human-readable reports for a finished exchange.
//!
//! Rendering is pure; the host prepends timestamps if it wants them.

use std::fmt::Write;

use crate::cookies::{CookieChange, CookieSnapshot};
use crate::http::{HttpRequest, HttpResponse};

const BODY_RULE_WIDTH: usize = 50;
const COOKIE_RULE_WIDTH: usize = 40;

/// The two lines describing what is about to be sent.
pub fn request_preamble(request: &HttpRequest) -> String {
    format!(
        "request url: {}\nrequest method: {}\n",
        request.url, request.method
    )
}

/// Status line, headers and body of a response.
pub fn response_report(response: &HttpResponse) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "status: {} {}", response.status, response.reason);
    out.push_str("\nresponse headers:\n");
    for (name, value) in group_headers(&response.headers) {
        let _ = writeln!(out, "   {name}: {value}");
    }
    out.push_str("\nresponse body:\n");
    out.push_str(&"=".repeat(BODY_RULE_WIDTH));
    out.push('\n');
    out.push_str(&pretty_body(&response.body));
    out.push('\n');
    out
}

/// Indented JSON when `body` parses as JSON, otherwise `body` unchanged.
pub fn pretty_body(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .and_then(|value| serde_json::to_string_pretty(&value))
        .unwrap_or_else(|_| body.to_string())
}

/// The change list (or a no-change line) followed by every current cookie.
pub fn cookie_report(changes: &[CookieChange], current: &CookieSnapshot) -> String {
    let mut out = String::new();
    if changes.is_empty() {
        out.push_str("no cookie changes\n");
    } else {
        out.push_str("cookie changes\n");
        out.push_str(&"=".repeat(COOKIE_RULE_WIDTH));
        out.push('\n');
        for change in changes {
            let _ = writeln!(out, "{change}");
        }
    }
    out.push_str("\ncurrent cookies:\n");
    for (name, value) in current.iter() {
        let _ = writeln!(out, "   {name} = {value}");
    }
    out
}

/// Merge repeated header names, joining their values with `, `.
fn group_headers(headers: &[(String, String)]) -> Vec<(&str, String)> {
    let mut grouped: Vec<(&str, String)> = Vec::new();
    for (name, value) in headers {
        match grouped
            .iter_mut()
            .find(|(seen, _)| seen.eq_ignore_ascii_case(name))
        {
            Some((_, joined)) => {
                joined.push_str(", ");
                joined.push_str(value);
            }
            None => grouped.push((name.as_str(), value.clone())),
        }
    }
    grouped
}
