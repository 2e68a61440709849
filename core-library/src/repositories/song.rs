//! Song repository trait and implementation

use crate::error::Result;
use crate::models::{Entity, Song};
use crate::predicate::{fold_case, Predicate};
use crate::repositories::{
    ensure_insertable, ensure_updatable, not_found, EntityRepository, Page, PageRequest,
    TableQueries,
};
use async_trait::async_trait;
use sqlx::{query, SqlitePool};

/// Song storage. Songs are never imported, so there is no natural key.
pub trait SongRepository: EntityRepository<Song> {}

impl<T> SongRepository for T where T: EntityRepository<Song> {}

/// SQLite implementation of SongRepository
pub struct SqliteSongRepository {
    pool: SqlitePool,
}

impl SqliteSongRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn queries(&self) -> TableQueries<'_> {
        TableQueries {
            pool: &self.pool,
            table: "songs",
        }
    }
}

#[async_trait]
impl EntityRepository<Song> for SqliteSongRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Song>> {
        self.queries().find_by_id(id).await
    }

    async fn insert(&self, song: &Song) -> Result<Song> {
        ensure_insertable(song)?;

        let result = query(
            r#"
            INSERT INTO songs (name, name_folded, duration, album_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&song.name)
        .bind(fold_case(&song.name))
        .bind(song.duration)
        .bind(song.album_id)
        .bind(song.created_at)
        .bind(song.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(song.clone().with_id(result.last_insert_rowid()))
    }

    async fn update(&self, song: &Song) -> Result<()> {
        let id = ensure_updatable(song)?;

        let result = query(
            r#"
            UPDATE songs
            SET name = ?, name_folded = ?, duration = ?, album_id = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&song.name)
        .bind(fold_case(&song.name))
        .bind(song.duration)
        .bind(song.album_id)
        .bind(song.updated_at)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(not_found::<Song>(id));
        }

        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        self.queries().delete(id).await
    }

    async fn find_all_matching(&self, predicate: &Predicate<Song>) -> Result<Vec<Song>> {
        self.queries().fetch_matching(&predicate.to_sql(), None).await
    }

    async fn find_page_matching(
        &self,
        predicate: &Predicate<Song>,
        page_request: PageRequest,
    ) -> Result<Page<Song>> {
        self.queries()
            .find_page(&predicate.to_sql(), page_request)
            .await
    }

    async fn count_matching(&self, predicate: &Predicate<Song>) -> Result<u64> {
        self.queries().count_matching(&predicate.to_sql()).await
    }
}
