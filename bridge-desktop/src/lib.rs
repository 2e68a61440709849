//! # Desktop Bridge Implementations
//!
//! Desktop (macOS, Windows, Linux) implementations of the bridge traits the
//! catalog core needs:
//! - `HttpClient` using `reqwest`
//!
//! `Clock` and `SessionContext` have portable defaults in `bridge-traits`
//! (`SystemClock`, `StaticSession`) and need no desktop-specific code.
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::ReqwestHttpClient;
//! use std::time::Duration;
//!
//! let http_client = ReqwestHttpClient::with_timeout(Duration::from_secs(30))?;
//! ```

mod http;

pub use http::ReqwestHttpClient;
