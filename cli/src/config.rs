//! Command-line and environment configuration.
//!
//! The base URL comes from the first positional argument, then
//! `REQCRAFT_URL` (a `.env` file is honored by `main`), then the local echo
//! server address.

use std::time::Duration;

use clap::{Arg, ArgAction, ArgMatches, Command};
use reqcraft_core::{ComposeError, HttpMethod, KeyValues, RequestBody, RequestSpec};
use tracing::Level;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3001";

/// Parsed invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub spec: RequestSpec,
    pub repeat: u32,
    pub timeout: Option<Duration>,
    pub log_level: Level,
}

pub fn command() -> Command {
    Command::new("reqcraft")
        .about("Compose an HTTP request, send it and inspect the response and cookie changes")
        .arg(
            Arg::new("url")
                .help("Base URL that path segments and query are appended to")
                .env("REQCRAFT_URL")
                .default_value(DEFAULT_BASE_URL),
        )
        .arg(
            Arg::new("method")
                .short('X')
                .long("method")
                .action(ArgAction::Set)
                .default_value("GET"),
        )
        .arg(
            Arg::new("path")
                .short('p')
                .long("path")
                .help("Path segment, repeatable and kept in order")
                .action(ArgAction::Append),
        )
        .arg(pair_arg("query", 'q', "Query parameter KEY=VALUE"))
        .arg(pair_arg("header", 'H', "Request header KEY=VALUE"))
        .arg(pair_arg("cookie", 'b', "Cookie NAME=VALUE set before sending"))
        .arg(
            Arg::new("data")
                .short('d')
                .long("data")
                .help("Request body")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("content_type")
                .long("content-type")
                .action(ArgAction::Set)
                .default_value("application/json"),
        )
        .arg(
            Arg::new("sample")
                .long("sample")
                .help("Start from the sample request against /api/test")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("repeat")
                .short('n')
                .long("repeat")
                .help("Send the request this many times, carrying cookies forward")
                .action(ArgAction::Set)
                .value_parser(clap::value_parser!(u32).range(1..))
                .default_value("1"),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .help("Give up after this many seconds (default: wait forever)")
                .action(ArgAction::Set)
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count),
        )
}

fn pair_arg(id: &'static str, short: char, help: &'static str) -> Arg {
    Arg::new(id)
        .short(short)
        .long(id)
        .help(help)
        .value_name("KEY=VALUE")
        .action(ArgAction::Append)
}

impl Options {
    pub fn from_matches(matches: &ArgMatches) -> Result<Self, ComposeError> {
        let base_url = string_arg(matches, "url").unwrap_or(DEFAULT_BASE_URL);
        let mut spec = if matches.get_flag("sample") {
            RequestSpec::sample(base_url)
        } else {
            RequestSpec::new(base_url)
        };

        spec.method = string_arg(matches, "method")
            .unwrap_or("GET")
            .parse::<HttpMethod>()?;
        spec.segments.extend(strings_arg(matches, "path").map(str::to_string));
        extend_pairs(&mut spec.query, matches, "query")?;
        extend_pairs(&mut spec.headers, matches, "header")?;
        extend_pairs(&mut spec.cookies, matches, "cookie")?;
        if let Some(data) = string_arg(matches, "data") {
            let content_type = string_arg(matches, "content_type").unwrap_or("application/json");
            spec.body = Some(RequestBody::new(content_type, data));
        }

        let log_level = match matches.get_count("verbose") {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        };

        Ok(Self {
            spec,
            repeat: matches.get_one::<u32>("repeat").copied().unwrap_or(1),
            timeout: matches
                .get_one::<u64>("timeout")
                .map(|secs| Duration::from_secs(*secs)),
            log_level,
        })
    }

    /// A note for a body attached to a method that conventionally has none.
    /// The body is still sent.
    pub fn body_warning(&self) -> Option<String> {
        match &self.spec.body {
            Some(_) if !self.spec.method.carries_body() => Some(format!(
                "a request body was given for {}, which servers usually ignore",
                self.spec.method
            )),
            _ => None,
        }
    }
}

fn string_arg<'a>(matches: &'a ArgMatches, id: &str) -> Option<&'a str> {
    matches.get_one::<String>(id).map(String::as_str)
}

fn strings_arg<'a>(matches: &'a ArgMatches, id: &str) -> impl Iterator<Item = &'a str> {
    matches
        .get_many::<String>(id)
        .into_iter()
        .flatten()
        .map(String::as_str)
}

fn extend_pairs(target: &mut KeyValues, matches: &ArgMatches, id: &str) -> Result<(), ComposeError> {
    for raw in strings_arg(matches, id) {
        let (key, value) = KeyValues::parse_pair(raw)?;
        target.insert(key, value);
    }
    Ok(())
}
