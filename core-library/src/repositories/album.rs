//! Album repository trait and implementation

use crate::error::Result;
use crate::models::{Album, Entity};
use crate::predicate::{fold_case, Predicate};
use crate::repositories::{
    ensure_insertable, ensure_updatable, not_found, EntityRepository, NaturalKeyRepository, Page,
    PageRequest, TableQueries,
};
use async_trait::async_trait;
use sqlx::{query, query_as, SqlitePool};

/// Album storage, keyed for imports by Discogs release id
pub trait AlbumRepository: EntityRepository<Album> + NaturalKeyRepository<Album, i64> {}

impl<T> AlbumRepository for T where T: EntityRepository<Album> + NaturalKeyRepository<Album, i64> {}

/// SQLite implementation of AlbumRepository
pub struct SqliteAlbumRepository {
    pool: SqlitePool,
}

impl SqliteAlbumRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn queries(&self) -> TableQueries<'_> {
        TableQueries {
            pool: &self.pool,
            table: "albums",
        }
    }
}

#[async_trait]
impl EntityRepository<Album> for SqliteAlbumRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Album>> {
        self.queries().find_by_id(id).await
    }

    async fn insert(&self, album: &Album) -> Result<Album> {
        ensure_insertable(album)?;

        let result = query(
            r#"
            INSERT INTO albums (
                name, name_folded, year, artist_id, discogs_id, cover_image_url,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&album.name)
        .bind(fold_case(&album.name))
        .bind(album.year)
        .bind(album.artist_id)
        .bind(album.discogs_id)
        .bind(&album.cover_image_url)
        .bind(album.created_at)
        .bind(album.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(album.clone().with_id(result.last_insert_rowid()))
    }

    async fn update(&self, album: &Album) -> Result<()> {
        let id = ensure_updatable(album)?;

        let result = query(
            r#"
            UPDATE albums
            SET name = ?, name_folded = ?, year = ?, artist_id = ?, discogs_id = ?,
                cover_image_url = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&album.name)
        .bind(fold_case(&album.name))
        .bind(album.year)
        .bind(album.artist_id)
        .bind(album.discogs_id)
        .bind(&album.cover_image_url)
        .bind(album.updated_at)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(not_found::<Album>(id));
        }

        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        self.queries().delete(id).await
    }

    async fn find_all_matching(&self, predicate: &Predicate<Album>) -> Result<Vec<Album>> {
        self.queries().fetch_matching(&predicate.to_sql(), None).await
    }

    async fn find_page_matching(
        &self,
        predicate: &Predicate<Album>,
        page_request: PageRequest,
    ) -> Result<Page<Album>> {
        self.queries()
            .find_page(&predicate.to_sql(), page_request)
            .await
    }

    async fn count_matching(&self, predicate: &Predicate<Album>) -> Result<u64> {
        self.queries().count_matching(&predicate.to_sql()).await
    }
}

#[async_trait]
impl NaturalKeyRepository<Album, i64> for SqliteAlbumRepository {
    async fn find_by_natural_key(&self, discogs_id: &i64) -> Result<Option<Album>> {
        let album = query_as::<_, Album>("SELECT * FROM albums WHERE discogs_id = ?")
            .bind(*discogs_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(album)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::AlbumCriteria;
    use crate::db::create_test_pool;
    use crate::error::LibraryError;
    use crate::models::{Artist, Entity};
    use crate::predicate::Criteria;
    use crate::repositories::SqliteArtistRepository;

    fn release(name: &str, discogs_id: i64, year: i32) -> Album {
        let mut album = Album::new(name);
        album.discogs_id = Some(discogs_id);
        album.year = Some(year);
        album.touch(1_000);
        album
    }

    #[tokio::test]
    async fn test_insert_and_find_by_discogs_id() {
        let repo = SqliteAlbumRepository::new(create_test_pool().await.unwrap());
        let stored = repo.insert(&release("Nevermind", 249504, 1991)).await.unwrap();

        let found = repo.find_by_natural_key(&249504).await.unwrap().unwrap();
        assert_eq!(found, stored);
        assert!(repo.find_by_natural_key(&1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_discogs_id_rejected() {
        let repo = SqliteAlbumRepository::new(create_test_pool().await.unwrap());
        repo.insert(&release("Nevermind", 249504, 1991)).await.unwrap();

        let err = repo
            .insert(&release("Nevermind (Remaster)", 249504, 2011))
            .await
            .unwrap_err();
        assert!(matches!(err, LibraryError::ConstraintViolation(_)));
    }

    #[tokio::test]
    async fn test_artist_reference_is_enforced() {
        let pool = create_test_pool().await.unwrap();
        let artists = SqliteArtistRepository::new(pool.clone());
        let albums = SqliteAlbumRepository::new(pool);

        let mut orphan = release("In Utero", 1, 1993);
        orphan.artist_id = Some(404);
        assert!(albums.insert(&orphan).await.is_err());

        let artist = artists.insert(&Artist::new("Nirvana")).await.unwrap();
        orphan.artist_id = artist.id;
        albums.insert(&orphan).await.unwrap();

        let by_artist = AlbumCriteria::default()
            .artist_equals(artist.id.unwrap())
            .predicate();
        assert_eq!(albums.count_matching(&by_artist).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_year_range_query() {
        let repo = SqliteAlbumRepository::new(create_test_pool().await.unwrap());
        repo.insert(&release("Bleach", 1, 1989)).await.unwrap();
        repo.insert(&release("Nevermind", 2, 1991)).await.unwrap();
        repo.insert(&release("In Utero", 3, 1993)).await.unwrap();

        let early_nineties = AlbumCriteria::default()
            .year_between(Some(1990), Some(1993))
            .predicate();
        let names: Vec<_> = repo
            .find_all_matching(&early_nineties)
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.name)
            .collect();

        assert_eq!(names, vec!["Nevermind", "In Utero"]);
    }
}
