//! Core service façade and bootstrap.
//!
//! Turns a validated [`CoreConfig`] into a ready catalog: opens the database,
//! builds the repositories once and hands out the query, CRUD, favourite and
//! import services that share them. Desktop hosts can leave the HTTP client
//! unset and let the `desktop-shims` feature supply the reqwest one.
//!
//! ```ignore
//! use core_runtime::config::{CatalogApiConfig, CoreConfig};
//! use core_service::CatalogCore;
//!
//! let config = CoreConfig::builder()
//!     .database_path("catalog.db")
//!     .catalog_api(CatalogApiConfig::from_env())
//!     .build()?;
//! let core = CatalogCore::bootstrap(config).await?;
//! let summary = core.album_import().import_by_title("nevermind").await?;
//! ```

pub mod error;

pub use error::{CoreError, Result};

use bridge_traits::http::HttpClient;
use core_library::db::{create_pool, DatabaseConfig};
use core_library::models::{Album, Artist, Song};
use core_library::repositories::{
    EntityRepository, SqliteAlbumRepository, SqliteArtistRepository, SqliteFavouriteRepository,
    SqliteSongRepository,
};
use core_library::{
    AlbumQueryService, ArtistQueryService, CrudService, FavouriteQueryService, FavouriteService,
    SongQueryService,
};
use core_metadata::{AlbumImportService, ArtistImportService, DiscogsClient, NapsterClient};
use core_runtime::config::{CoreConfig, DatabaseLocation};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{info, instrument};

/// Every catalog service, wired to one database pool.
pub struct CatalogCore {
    pool: SqlitePool,
    artists: CrudService<Artist>,
    albums: CrudService<Album>,
    songs: CrudService<Song>,
    artist_queries: ArtistQueryService,
    album_queries: AlbumQueryService,
    song_queries: SongQueryService,
    favourite_queries: FavouriteQueryService,
    favourites: FavouriteService,
    artist_import: ArtistImportService,
    album_import: AlbumImportService,
}

impl CatalogCore {
    /// Open the catalog described by `config`.
    ///
    /// # Errors
    ///
    /// - `Runtime` if the configuration is invalid
    /// - `Library` if the database cannot be opened or migrated
    /// - `CapabilityMissing` if no HTTP client was given and the
    ///   `desktop-shims` fallback is compiled out
    #[instrument(skip(config))]
    pub async fn bootstrap(config: CoreConfig) -> Result<Self> {
        config.validate()?;

        let database = match &config.database {
            DatabaseLocation::File(path) => DatabaseConfig::new(path.clone()),
            DatabaseLocation::InMemory => DatabaseConfig::in_memory(),
        }
        .max_connections(config.database_tuning.max_connections)
        .acquire_timeout(config.database_tuning.acquire_timeout);

        let pool = create_pool(database).await?;
        let http_client = resolve_http_client(&config)?;
        let api = &config.catalog_api;

        let artist_repo = Arc::new(SqliteArtistRepository::new(pool.clone()));
        let album_repo = Arc::new(SqliteAlbumRepository::new(pool.clone()));
        let song_repo = Arc::new(SqliteSongRepository::new(pool.clone()));
        let favourite_repo = Arc::new(SqliteFavouriteRepository::new(pool.clone()));

        let artist_entities: Arc<dyn EntityRepository<Artist>> = artist_repo.clone();
        let album_entities: Arc<dyn EntityRepository<Album>> = album_repo.clone();
        let song_entities: Arc<dyn EntityRepository<Song>> = song_repo;

        let discogs = Arc::new(DiscogsClient::new(
            Arc::clone(&http_client),
            api.discogs.clone(),
            api.request_timeout,
        ));
        let napster = Arc::new(NapsterClient::new(
            http_client,
            api.napster.clone(),
            api.request_timeout,
        ));

        let core = Self {
            artists: CrudService::new(artist_entities.clone(), config.clock.clone()),
            albums: CrudService::new(album_entities.clone(), config.clock.clone()),
            songs: CrudService::new(song_entities.clone(), config.clock.clone()),
            artist_queries: ArtistQueryService::new(artist_entities),
            album_queries: AlbumQueryService::new(album_entities),
            song_queries: SongQueryService::new(song_entities),
            favourite_queries: FavouriteQueryService::new(favourite_repo.clone()),
            favourites: FavouriteService::new(
                favourite_repo,
                config.session.clone(),
                config.clock.clone(),
            ),
            artist_import: ArtistImportService::new(napster, artist_repo, config.clock.clone()),
            album_import: AlbumImportService::new(discogs, album_repo, config.clock.clone()),
            pool,
        };

        info!(
            discogs_token = api.has_discogs_token(),
            napster_key = api.has_napster_key(),
            "Catalog core ready"
        );
        Ok(core)
    }

    pub fn artists(&self) -> &CrudService<Artist> {
        &self.artists
    }

    pub fn albums(&self) -> &CrudService<Album> {
        &self.albums
    }

    pub fn songs(&self) -> &CrudService<Song> {
        &self.songs
    }

    pub fn artist_queries(&self) -> &ArtistQueryService {
        &self.artist_queries
    }

    pub fn album_queries(&self) -> &AlbumQueryService {
        &self.album_queries
    }

    pub fn song_queries(&self) -> &SongQueryService {
        &self.song_queries
    }

    pub fn favourite_queries(&self) -> &FavouriteQueryService {
        &self.favourite_queries
    }

    pub fn favourites(&self) -> &FavouriteService {
        &self.favourites
    }

    pub fn artist_import(&self) -> &ArtistImportService {
        &self.artist_import
    }

    pub fn album_import(&self) -> &AlbumImportService {
        &self.album_import
    }

    /// Close the database pool, waiting for in-flight queries.
    pub async fn shutdown(self) {
        self.pool.close().await;
        info!("Catalog core shut down");
    }
}

fn resolve_http_client(config: &CoreConfig) -> Result<Arc<dyn HttpClient>> {
    match &config.http_client {
        Some(client) => Ok(Arc::clone(client)),
        None => fallback_http_client(config),
    }
}

#[cfg(feature = "desktop-shims")]
fn fallback_http_client(config: &CoreConfig) -> Result<Arc<dyn HttpClient>> {
    let client =
        bridge_desktop::ReqwestHttpClient::with_timeout(config.catalog_api.request_timeout)
            .map_err(|e| CoreError::InitializationFailed(e.to_string()))?;
    Ok(Arc::new(client))
}

#[cfg(not(feature = "desktop-shims"))]
fn fallback_http_client(_config: &CoreConfig) -> Result<Arc<dyn HttpClient>> {
    Err(CoreError::CapabilityMissing {
        capability: "HttpClient".to_string(),
        message: "No HTTP client configured. Pass one with CoreConfig::builder().http_client(..) \
                  or enable the desktop-shims feature."
            .to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::http::{HttpRequest, HttpResponse};
    use bridge_traits::{FixedClock, StaticSession};
    use core_library::{FavouriteKind, SongCriteria};
    use core_runtime::config::CatalogApiConfig;
    use mockall::mock;

    mock! {
        pub HttpClient {}

        #[async_trait]
        impl HttpClient for HttpClient {
            async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse>;
        }
    }

    const RELEASE: &str = r#"{"id": 249504, "title": "Nevermind", "year": 1991}"#;

    async fn core_with(http: MockHttpClient) -> CatalogCore {
        let config = CoreConfig::builder()
            .in_memory_database()
            .http_client(Arc::new(http))
            .clock(Arc::new(FixedClock::from_millis(5_000)))
            .session(Arc::new(StaticSession::new("alice")))
            .catalog_api(CatalogApiConfig::new().with_discogs_token("tok"))
            .build()
            .unwrap();
        CatalogCore::bootstrap(config).await.unwrap()
    }

    #[tokio::test]
    async fn test_services_share_one_database() {
        let core = core_with(MockHttpClient::new()).await;

        let song = core
            .songs()
            .create(Song::new("Drain You", Some(224)))
            .await
            .unwrap();
        let found = core
            .song_queries()
            .find_by_criteria(&SongCriteria::default().name_contains("drain"))
            .await
            .unwrap();
        assert_eq!(found, vec![song.clone()]);

        core.favourites()
            .set_liked(FavouriteKind::Song, song.id.unwrap(), true)
            .await
            .unwrap();
        let count = core
            .favourite_queries()
            .count_by_criteria(&Default::default())
            .await
            .unwrap();
        assert_eq!(count, 1);

        core.shutdown().await;
    }

    #[tokio::test]
    async fn test_imported_release_is_queryable() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .times(1)
            .returning(|_| Ok(HttpResponse::new(200, RELEASE)));
        let core = core_with(http).await;

        let outcome = core.album_import().import_release(249504).await.unwrap();
        assert!(outcome.was_created());

        let albums = core
            .album_queries()
            .find_by_criteria(&core_library::AlbumCriteria::default().discogs_id_equals(249504))
            .await
            .unwrap();
        assert_eq!(albums.len(), 1);
        assert_eq!(albums[0].created_at, 5_000);
    }

    #[tokio::test]
    async fn test_invalid_config_is_rejected() {
        let mut config = CoreConfig::builder().in_memory_database().build().unwrap();
        config.database_tuning.max_connections = 0;

        let err = CatalogCore::bootstrap(config).await.err().unwrap();
        assert!(matches!(err, CoreError::Runtime(_)));
    }
}
