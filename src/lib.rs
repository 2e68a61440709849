//! Workspace placeholder crate.
//!
//! Host applications depend on `dubion-workspace` and get the catalog core
//! (criteria queries, favourites, Discogs/Napster imports) through the
//! `core-service` façade without wiring each crate individually.

#[cfg(feature = "desktop-shims")]
pub use core_service::*;
