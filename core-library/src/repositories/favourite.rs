//! Favourite repository trait and implementation

use crate::error::Result;
use crate::models::{Entity, Favourite, FavouriteKey};
use crate::predicate::Predicate;
use crate::repositories::{
    ensure_insertable, ensure_updatable, not_found, EntityRepository, NaturalKeyRepository, Page,
    PageRequest, TableQueries,
};
use async_trait::async_trait;
use sqlx::{query, query_as, SqlitePool};

/// Favourite storage, keyed by `(user_login, target_kind, target_id)`
pub trait FavouriteRepository:
    EntityRepository<Favourite> + NaturalKeyRepository<Favourite, FavouriteKey>
{
}

impl<T> FavouriteRepository for T where
    T: EntityRepository<Favourite> + NaturalKeyRepository<Favourite, FavouriteKey>
{
}

/// SQLite implementation of FavouriteRepository
pub struct SqliteFavouriteRepository {
    pool: SqlitePool,
}

impl SqliteFavouriteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn queries(&self) -> TableQueries<'_> {
        TableQueries {
            pool: &self.pool,
            table: "favourites",
        }
    }
}

#[async_trait]
impl EntityRepository<Favourite> for SqliteFavouriteRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Favourite>> {
        self.queries().find_by_id(id).await
    }

    async fn insert(&self, favourite: &Favourite) -> Result<Favourite> {
        ensure_insertable(favourite)?;

        let result = query(
            r#"
            INSERT INTO favourites (user_login, target_kind, target_id, liked, date)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&favourite.user_login)
        .bind(favourite.target_kind)
        .bind(favourite.target_id)
        .bind(favourite.liked)
        .bind(favourite.date)
        .execute(&self.pool)
        .await?;

        Ok(favourite.clone().with_id(result.last_insert_rowid()))
    }

    /// The natural key columns are immutable; only `liked` and `date` change.
    async fn update(&self, favourite: &Favourite) -> Result<()> {
        let id = ensure_updatable(favourite)?;

        let result = query("UPDATE favourites SET liked = ?, date = ? WHERE id = ?")
            .bind(favourite.liked)
            .bind(favourite.date)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found::<Favourite>(id));
        }

        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        self.queries().delete(id).await
    }

    async fn find_all_matching(&self, predicate: &Predicate<Favourite>) -> Result<Vec<Favourite>> {
        self.queries().fetch_matching(&predicate.to_sql(), None).await
    }

    async fn find_page_matching(
        &self,
        predicate: &Predicate<Favourite>,
        page_request: PageRequest,
    ) -> Result<Page<Favourite>> {
        self.queries()
            .find_page(&predicate.to_sql(), page_request)
            .await
    }

    async fn count_matching(&self, predicate: &Predicate<Favourite>) -> Result<u64> {
        self.queries().count_matching(&predicate.to_sql()).await
    }
}

#[async_trait]
impl NaturalKeyRepository<Favourite, FavouriteKey> for SqliteFavouriteRepository {
    async fn find_by_natural_key(&self, key: &FavouriteKey) -> Result<Option<Favourite>> {
        let favourite = query_as::<_, Favourite>(
            r#"
            SELECT * FROM favourites
            WHERE user_login = ? AND target_kind = ? AND target_id = ?
            "#,
        )
        .bind(&key.user_login)
        .bind(key.target_kind)
        .bind(key.target_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(favourite)
    }
}
