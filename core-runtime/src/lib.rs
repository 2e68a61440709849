//! # Core Runtime Module
//!
//! Runtime infrastructure shared by the catalog crates:
//! - Logging and tracing setup
//! - Configuration (database location, external catalog API settings)
//!
//! Nothing here knows about artists or favourites; the domain crates consume
//! the values this crate validates.

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
