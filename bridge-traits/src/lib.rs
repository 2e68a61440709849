//! # Host Bridge Traits
//!
//! Capabilities the catalog core needs from its host but does not implement
//! itself.
//!
//! ## Traits
//!
//! - [`HttpClient`](http::HttpClient) - Async request/response HTTP used by the
//!   Discogs and Napster clients
//! - [`Clock`](time::Clock) - Time source, injectable so upsert timestamps are
//!   deterministic in tests
//! - [`LoggerSink`](time::LoggerSink) - Mirror structured logs into a host pipeline
//! - [`SessionContext`](auth::SessionContext) - Identity of the user behind the
//!   current call (used to key favourites)
//!
//! ## Implementations
//!
//! | Capability      | Implementation                          |
//! |-----------------|-----------------------------------------|
//! | `HttpClient`    | `bridge-desktop::ReqwestHttpClient`     |
//! | `Clock`         | [`SystemClock`](time::SystemClock)      |
//! | `LoggerSink`    | [`ConsoleLogger`](time::ConsoleLogger)  |
//! | `SessionContext`| [`StaticSession`](auth::StaticSession)  |
//!
//! ## Error Handling
//!
//! All bridge traits report failures through [`BridgeError`](error::BridgeError).
//! Implementations convert their library errors into it and keep enough context
//! (URL, status) for the caller to log.
//!
//! ## Thread Safety
//!
//! Every trait requires `Send + Sync` so handles can be shared behind `Arc`
//! across request tasks.

pub mod auth;
pub mod error;
pub mod http;
pub mod time;

pub use error::BridgeError;

pub use auth::{SessionContext, StaticSession};
pub use http::{HttpClient, HttpRequest, HttpResponse};
pub use time::{Clock, ConsoleLogger, FixedClock, LogEntry, LogLevel, LoggerSink, SystemClock};
