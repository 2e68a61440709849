//! Artist repository trait and implementation

use crate::error::Result;
use crate::models::{Artist, Entity};
use crate::predicate::{fold_case, Predicate};
use crate::repositories::{
    ensure_insertable, ensure_updatable, not_found, EntityRepository, NaturalKeyRepository, Page,
    PageRequest, TableQueries,
};
use async_trait::async_trait;
use sqlx::{query, query_as, SqlitePool};

/// Artist storage, keyed for imports by Napster id
pub trait ArtistRepository:
    EntityRepository<Artist> + NaturalKeyRepository<Artist, String>
{
}

impl<T> ArtistRepository for T where
    T: EntityRepository<Artist> + NaturalKeyRepository<Artist, String>
{
}

/// SQLite implementation of ArtistRepository
pub struct SqliteArtistRepository {
    pool: SqlitePool,
}

impl SqliteArtistRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn queries(&self) -> TableQueries<'_> {
        TableQueries {
            pool: &self.pool,
            table: "artists",
        }
    }
}

#[async_trait]
impl EntityRepository<Artist> for SqliteArtistRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Artist>> {
        self.queries().find_by_id(id).await
    }

    async fn insert(&self, artist: &Artist) -> Result<Artist> {
        ensure_insertable(artist)?;

        let result = query(
            r#"
            INSERT INTO artists (
                name, name_folded, napster_id, bio, image_url, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&artist.name)
        .bind(fold_case(&artist.name))
        .bind(&artist.napster_id)
        .bind(&artist.bio)
        .bind(&artist.image_url)
        .bind(artist.created_at)
        .bind(artist.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(artist.clone().with_id(result.last_insert_rowid()))
    }

    async fn update(&self, artist: &Artist) -> Result<()> {
        let id = ensure_updatable(artist)?;

        let result = query(
            r#"
            UPDATE artists
            SET name = ?, name_folded = ?, napster_id = ?, bio = ?, image_url = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&artist.name)
        .bind(fold_case(&artist.name))
        .bind(&artist.napster_id)
        .bind(&artist.bio)
        .bind(&artist.image_url)
        .bind(artist.updated_at)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(not_found::<Artist>(id));
        }

        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        self.queries().delete(id).await
    }

    async fn find_all_matching(&self, predicate: &Predicate<Artist>) -> Result<Vec<Artist>> {
        self.queries().fetch_matching(&predicate.to_sql(), None).await
    }

    async fn find_page_matching(
        &self,
        predicate: &Predicate<Artist>,
        page_request: PageRequest,
    ) -> Result<Page<Artist>> {
        self.queries()
            .find_page(&predicate.to_sql(), page_request)
            .await
    }

    async fn count_matching(&self, predicate: &Predicate<Artist>) -> Result<u64> {
        self.queries().count_matching(&predicate.to_sql()).await
    }
}

#[async_trait]
impl NaturalKeyRepository<Artist, String> for SqliteArtistRepository {
    async fn find_by_natural_key(&self, napster_id: &String) -> Result<Option<Artist>> {
        let artist = query_as::<_, Artist>("SELECT * FROM artists WHERE napster_id = ?")
            .bind(napster_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(artist)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;
    use crate::error::LibraryError;
    use crate::models::Entity;

    async fn setup_repo() -> SqliteArtistRepository {
        SqliteArtistRepository::new(create_test_pool().await.unwrap())
    }

    fn napster_artist(name: &str, napster_id: &str) -> Artist {
        let mut artist = Artist::new(name);
        artist.napster_id = Some(napster_id.to_string());
        artist.touch(1_000);
        artist
    }

    #[tokio::test]
    async fn test_insert_assigns_id_and_find() {
        let repo = setup_repo().await;

        let mut artist = napster_artist("Nirvana", "Art.578");
        artist.bio = Some("Seattle trio".to_string());
        let stored = repo.insert(&artist).await.unwrap();

        let id = stored.id.expect("insert assigns an id");
        let found = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(found, stored);
        assert_eq!(found.bio.as_deref(), Some("Seattle trio"));
    }

    #[tokio::test]
    async fn test_insert_rejects_preassigned_id() {
        let repo = setup_repo().await;
        let artist = napster_artist("Nirvana", "Art.578").with_id(42);

        let err = repo.insert(&artist).await.unwrap_err();
        assert!(matches!(err, LibraryError::InvalidInput { ref field, .. } if field == "id"));
    }

    #[tokio::test]
    async fn test_duplicate_napster_id_is_constraint_violation() {
        let repo = setup_repo().await;
        repo.insert(&napster_artist("Nirvana", "Art.578"))
            .await
            .unwrap();

        let err = repo
            .insert(&napster_artist("Nirvana (dup)", "Art.578"))
            .await
            .unwrap_err();
        assert!(matches!(err, LibraryError::ConstraintViolation(_)));
    }

    #[tokio::test]
    async fn test_artists_without_napster_id_do_not_collide() {
        let repo = setup_repo().await;
        repo.insert(&Artist::new("Local Band")).await.unwrap();
        repo.insert(&Artist::new("Other Local Band")).await.unwrap();

        assert_eq!(repo.count_matching(&Predicate::all()).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_update_and_missing_row() {
        let repo = setup_repo().await;
        let mut stored = repo
            .insert(&napster_artist("Nirvana", "Art.578"))
            .await
            .unwrap();

        stored.image_url = Some("https://img/578.jpg".to_string());
        stored.touch(2_000);
        repo.update(&stored).await.unwrap();

        let found = repo.find_by_natural_key(&"Art.578".to_string()).await.unwrap().unwrap();
        assert_eq!(found.image_url.as_deref(), Some("https://img/578.jpg"));
        assert_eq!((found.created_at, found.updated_at), (1_000, 2_000));

        let ghost = stored.clone().with_id(9_999);
        let err = repo.update(&ghost).await.unwrap_err();
        assert!(matches!(err, LibraryError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_artist() {
        let repo = setup_repo().await;
        let stored = repo.insert(&Artist::new("Hole")).await.unwrap();
        let id = stored.id.unwrap();

        assert!(repo.delete(id).await.unwrap());
        assert!(!repo.delete(id).await.unwrap());
        assert!(repo.find_by_id(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_natural_key_lookup_misses_cleanly() {
        let repo = setup_repo().await;
        let found = repo
            .find_by_natural_key(&"Art.missing".to_string())
            .await
            .unwrap();
        assert!(found.is_none());
    }
}
