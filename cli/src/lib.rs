//! Host side of reqcraft: argument handling and the HTTP session.
//!
//! # Design
//! `reqcraft-core` decides what to send and how to show it. This crate does
//! the I/O: a `Session` owns the HTTP client, its cookie jar and the cookie
//! tracker, and turns each `RequestSpec` into an `Exchange`.

pub mod config;
pub mod session;

pub use config::Options;
pub use session::{CookieReport, Exchange, SendError, Session};
