//! # Catalog Metadata Module
//!
//! Fetches artist and release data from external catalogs and imports it
//! into the local library.
//!
//! ## Overview
//!
//! - Discogs client: release lookup and first-page title search
//! - Napster client: top artists, artist search and lookup
//! - Import services that upsert provider records by their provider id
//!
//! All HTTP goes through the host's [`HttpClient`](bridge_traits::HttpClient),
//! so tests drive the clients with a mocked transport.

pub mod error;
pub mod import;
pub mod providers;

pub use error::{MetadataError, Result};
pub use import::{AlbumImportService, ArtistImportService, ImportSummary};
pub use providers::{DiscogsClient, NapsterClient};
