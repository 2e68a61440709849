//! # Catalog Library
//!
//! Owns the catalog database (artists, albums, songs, favourites) and the
//! read/write APIs over it.
//!
//! ## Overview
//!
//! - SQLite schema, migrations and pool setup ([`db`])
//! - Criteria filters and the predicate builder they compile to
//!   ([`criteria`], [`predicate`])
//! - Repositories with criteria-driven, id-ordered paging ([`repositories`])
//! - Query and CRUD services ([`query`], [`service`])
//! - Natural-key upsert for imported data and favourites ([`upsert`],
//!   [`favourites`])
//!
//! ## Example
//!
//! ```ignore
//! use core_library::criteria::SongCriteria;
//! use core_library::query::SongQueryService;
//!
//! let criteria = SongCriteria::default()
//!     .name_contains("spirit")
//!     .duration_between(Some(180), Some(360));
//! let songs = song_queries.find_by_criteria(&criteria).await?;
//! ```

pub mod criteria;
pub mod db;
pub mod error;
pub mod favourites;
pub mod models;
pub mod predicate;
pub mod query;
pub mod repositories;
pub mod service;
pub mod upsert;

pub use criteria::{
    AlbumCriteria, ArtistCriteria, ContainsFilter, EqualsFilter, FavouriteCriteria, RangeFilter,
    SongCriteria,
};
pub use db::{create_pool, DatabaseConfig};
pub use error::{LibraryError, Result};
pub use favourites::FavouriteService;
pub use models::{Album, Artist, Entity, Favourite, FavouriteKey, FavouriteKind, Song};
pub use predicate::{Criteria, Predicate};
pub use query::{
    AlbumQueryService, ArtistQueryService, CriteriaQueryService, FavouriteQueryService,
    SongQueryService,
};
pub use repositories::{EntityRepository, NaturalKeyRepository, Page, PageRequest};
pub use service::CrudService;
pub use upsert::{upsert, UpsertOutcome, MAX_UPSERT_ATTEMPTS};
