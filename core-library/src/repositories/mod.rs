//! # Repository Pattern Implementation
//!
//! Storage access for the catalog tables.
//!
//! ## Architecture
//!
//! - [`EntityRepository`] covers id-based CRUD plus predicate queries
//! - [`NaturalKeyRepository`] looks rows up by the key an import uses to tell
//!   "same entity" apart (Napster id, Discogs id, user + target)
//! - SQLite implementations use sqlx; a unique index backs every natural key,
//!   and a violated index surfaces as [`LibraryError::ConstraintViolation`]
//! - Query results are ordered by `id` so paging is stable
//!
//! ## Available Repositories
//!
//! - `ArtistRepository` - keyed by Napster id
//! - `AlbumRepository` - keyed by Discogs release id
//! - `SongRepository`
//! - `FavouriteRepository` - keyed by `(user_login, target_kind, target_id)`
//!
//! [`LibraryError::ConstraintViolation`]: crate::LibraryError::ConstraintViolation

pub mod album;
pub mod artist;
pub mod favourite;
pub mod pagination;
pub mod song;

pub use album::{AlbumRepository, SqliteAlbumRepository};
pub use artist::{ArtistRepository, SqliteArtistRepository};
pub use favourite::{FavouriteRepository, SqliteFavouriteRepository};
pub use pagination::{Page, PageRequest};
pub use song::{SongRepository, SqliteSongRepository};

use crate::error::{LibraryError, Result};
use crate::models::Entity;
use crate::predicate::{Predicate, SqlFilter, Value};
use async_trait::async_trait;
use sqlx::query::QueryAs;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{FromRow, Sqlite, SqlitePool};

/// Id-based CRUD and predicate queries for one entity type
#[async_trait]
pub trait EntityRepository<E: Entity>: Send + Sync {
    /// - `Ok(Some(entity))` if found
    /// - `Ok(None)` if not found
    async fn find_by_id(&self, id: i64) -> Result<Option<E>>;

    /// Insert a new row and return the entity with its assigned id.
    ///
    /// # Errors
    /// - `InvalidInput` if the entity already has an id or fails validation
    /// - `ConstraintViolation` if its natural key is already taken
    async fn insert(&self, entity: &E) -> Result<E>;

    /// # Errors
    /// - `InvalidInput` if the entity has no id or fails validation
    /// - `NotFound` if no row has that id
    async fn update(&self, entity: &E) -> Result<()>;

    /// - `Ok(true)` if a row was deleted
    /// - `Ok(false)` if none existed
    async fn delete(&self, id: i64) -> Result<bool>;

    /// All rows matching `predicate`, ordered by id
    async fn find_all_matching(&self, predicate: &Predicate<E>) -> Result<Vec<E>>;

    /// One page of rows matching `predicate`, ordered by id, with the total count
    async fn find_page_matching(
        &self,
        predicate: &Predicate<E>,
        page_request: PageRequest,
    ) -> Result<Page<E>>;

    async fn count_matching(&self, predicate: &Predicate<E>) -> Result<u64>;
}

/// Lookup by natural key
#[async_trait]
pub trait NaturalKeyRepository<E, K>: Send + Sync
where
    K: Sync,
{
    async fn find_by_natural_key(&self, key: &K) -> Result<Option<E>>;
}

pub(crate) fn ensure_insertable<E: Entity>(entity: &E) -> Result<()> {
    if entity.id().is_some() {
        return Err(LibraryError::invalid(
            "id",
            format!("A new {} cannot already have an ID", E::NAME.to_lowercase()),
        ));
    }
    entity
        .validate()
        .map_err(|message| LibraryError::invalid(E::NAME, message))
}

pub(crate) fn ensure_updatable<E: Entity>(entity: &E) -> Result<i64> {
    let id = entity
        .id()
        .ok_or_else(|| LibraryError::invalid("id", format!("{} has no ID", E::NAME)))?;
    entity
        .validate()
        .map_err(|message| LibraryError::invalid(E::NAME, message))?;
    Ok(id)
}

pub(crate) fn not_found<E: Entity>(id: i64) -> LibraryError {
    LibraryError::NotFound {
        entity_type: E::NAME.to_string(),
        id: id.to_string(),
    }
}

/// Bind predicate parameters in placeholder order
pub(crate) fn bind_values<'q, O>(
    mut query: QueryAs<'q, Sqlite, O, SqliteArguments<'q>>,
    binds: &[Value],
) -> QueryAs<'q, Sqlite, O, SqliteArguments<'q>> {
    for value in binds {
        query = match value {
            Value::Integer(v) => query.bind(*v),
            Value::Text(v) => query.bind(v.clone()),
            Value::Bool(v) => query.bind(*v),
        };
    }
    query
}

/// Shared SELECT/COUNT plumbing for the table-backed repositories
pub(crate) struct TableQueries<'a> {
    pub pool: &'a SqlitePool,
    pub table: &'static str,
}

impl TableQueries<'_> {
    pub async fn find_by_id<E>(&self, id: i64) -> Result<Option<E>>
    where
        E: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        let sql = format!("SELECT * FROM {} WHERE id = ?", self.table);
        let row = sqlx::query_as::<_, E>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(row)
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        let sql = format!("DELETE FROM {} WHERE id = ?", self.table);
        let result = sqlx::query(&sql).bind(id).execute(self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn fetch_matching<E>(
        &self,
        filter: &SqlFilter,
        page_request: Option<PageRequest>,
    ) -> Result<Vec<E>>
    where
        E: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        let mut sql = format!(
            "SELECT * FROM {}{} ORDER BY id ASC",
            self.table, filter.where_clause
        );
        if page_request.is_some() {
            sql.push_str(" LIMIT ? OFFSET ?");
        }

        let mut query = bind_values(sqlx::query_as::<_, E>(&sql), &filter.binds);
        if let Some(page_request) = page_request {
            query = query
                .bind(i64::from(page_request.limit()))
                .bind(i64::try_from(page_request.offset()).unwrap_or(i64::MAX));
        }

        Ok(query.fetch_all(self.pool).await?)
    }

    pub async fn count_matching(&self, filter: &SqlFilter) -> Result<u64> {
        let sql = format!("SELECT COUNT(*) FROM {}{}", self.table, filter.where_clause);
        let (count,): (i64,) = bind_values(sqlx::query_as(&sql), &filter.binds)
            .fetch_one(self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }

    pub async fn find_page<E>(
        &self,
        filter: &SqlFilter,
        page_request: PageRequest,
    ) -> Result<Page<E>>
    where
        E: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        let total = self.count_matching(filter).await?;
        let items = self.fetch_matching(filter, Some(page_request)).await?;
        Ok(Page::new(items, total, page_request))
    }
}
