//! Import services against an in-memory catalog and a mocked HTTP transport.

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
use bridge_traits::FixedClock;
use chrono::Duration;
use core_library::db::create_test_pool;
use core_library::repositories::{SqliteAlbumRepository, SqliteArtistRepository};
use core_library::{EntityRepository, NaturalKeyRepository, Predicate};
use core_metadata::{
    AlbumImportService, ArtistImportService, DiscogsClient, MetadataError, NapsterClient,
};
use core_runtime::config::CatalogApiConfig;
use mockall::mock;
use std::sync::Arc;

mock! {
    pub HttpClient {}

    #[async_trait]
    impl HttpClient for HttpClient {
        async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse>;
    }
}

const TOP_ARTISTS: &str = r#"{
    "artists": [
        {"id": "Art.578", "name": "Nirvana", "bios": [{"bio": "Formed in Aberdeen, WA."}]},
        {"id": "Art.954", "name": "Hole", "blurbs": ["Los Angeles band."]},
        {"id": "Art.999", "name": "   "}
    ]
}"#;

const NEVERMIND: &str = r#"{
    "id": 249504,
    "title": "Nevermind",
    "year": 1991,
    "images": [{"type": "primary", "uri": "https://img.test/nevermind.jpg"}]
}"#;

const SEARCH: &str = r#"{
    "pagination": {"page": 1, "pages": 1, "items": 3},
    "results": [
        {"id": 249504, "type": "release", "title": "Nirvana - Nevermind", "year": "1991"},
        {"id": 367113, "type": "release", "title": "Nirvana - Nevermind", "year": "1992",
         "cover_image": "https://img.test/nevermind-uk.jpg"},
        {"id": 8795, "type": "master", "title": "Nirvana - Nevermind"}
    ]
}"#;

fn api_config() -> CatalogApiConfig {
    CatalogApiConfig::new()
        .with_discogs_base_url("https://discogs.test")
        .with_discogs_token("tok")
        .with_napster_base_url("https://napster.test/v2.2")
        .with_napster_api_key("key")
}

fn responding(status: u16, body: &'static str) -> Arc<MockHttpClient> {
    let mut http = MockHttpClient::new();
    http.expect_execute()
        .returning(move |_| Ok(HttpResponse::new(status, body)));
    Arc::new(http)
}

struct Harness {
    artists: Arc<SqliteArtistRepository>,
    albums: Arc<SqliteAlbumRepository>,
    clock: Arc<FixedClock>,
}

impl Harness {
    async fn new() -> Self {
        let pool = create_test_pool().await.unwrap();
        Self {
            artists: Arc::new(SqliteArtistRepository::new(pool.clone())),
            albums: Arc::new(SqliteAlbumRepository::new(pool)),
            clock: Arc::new(FixedClock::from_millis(1_000_000)),
        }
    }

    fn artist_import(&self, http: Arc<MockHttpClient>) -> ArtistImportService {
        let config = api_config();
        let napster = NapsterClient::new(http, config.napster, config.request_timeout);
        ArtistImportService::new(Arc::new(napster), self.artists.clone(), self.clock.clone())
    }

    fn album_import(&self, http: Arc<MockHttpClient>) -> AlbumImportService {
        let config = api_config();
        let discogs = DiscogsClient::new(http, config.discogs, config.request_timeout);
        AlbumImportService::new(Arc::new(discogs), self.albums.clone(), self.clock.clone())
    }
}

#[tokio::test]
async fn importing_top_artists_twice_keeps_one_row_per_artist() {
    let harness = Harness::new().await;
    let service = harness.artist_import(responding(200, TOP_ARTISTS));

    let first = service.import_top_artists(10).await.unwrap();
    assert_eq!((first.created, first.updated, first.skipped), (2, 0, 1));

    harness.clock.advance(Duration::seconds(60));
    let second = service.import_top_artists(10).await.unwrap();
    assert_eq!((second.created, second.updated, second.skipped), (0, 2, 1));

    assert_eq!(
        harness
            .artists
            .count_matching(&Predicate::all())
            .await
            .unwrap(),
        2
    );

    let nirvana = harness
        .artists
        .find_by_natural_key(&"Art.578".to_string())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(nirvana.bio.as_deref(), Some("Formed in Aberdeen, WA."));
    assert_eq!(nirvana.created_at, 1_000_000);
    assert_eq!(nirvana.updated_at, 1_060_000);
}

#[tokio::test]
async fn import_keeps_local_bio_when_provider_has_none() {
    let harness = Harness::new().await;
    let service = harness.artist_import(responding(200, TOP_ARTISTS));
    service.import_top_artists(10).await.unwrap();

    let bare = core_metadata::providers::NapsterArtist {
        id: "Art.954".to_string(),
        name: "Hole".to_string(),
        ..Default::default()
    };
    let outcome = service.import_artist(&bare).await.unwrap();

    assert!(!outcome.was_created());
    assert_eq!(outcome.entity().bio.as_deref(), Some("Los Angeles band."));
}

#[tokio::test]
async fn importing_a_release_is_idempotent() {
    let harness = Harness::new().await;
    let service = harness.album_import(responding(200, NEVERMIND));

    let first = service.import_release(249504).await.unwrap();
    let second = service.import_release(249504).await.unwrap();

    assert!(first.was_created());
    assert!(!second.was_created());
    assert_eq!(first.entity().id, second.entity().id);

    let album = second.into_inner();
    assert_eq!(album.name, "Nevermind");
    assert_eq!(album.year, Some(1991));
    assert_eq!(album.discogs_id, Some(249504));
    assert_eq!(
        album.cover_image_url.as_deref(),
        Some("https://img.test/nevermind.jpg")
    );
}

#[tokio::test]
async fn title_search_imports_releases_and_merges_with_existing() {
    let harness = Harness::new().await;
    harness
        .album_import(responding(200, NEVERMIND))
        .import_release(249504)
        .await
        .unwrap();

    let summary = harness
        .album_import(responding(200, SEARCH))
        .import_by_title("nevermind")
        .await
        .unwrap();

    assert_eq!((summary.created, summary.updated), (1, 1));
    assert_eq!(
        harness
            .albums
            .count_matching(&Predicate::all())
            .await
            .unwrap(),
        2
    );

    let us_pressing = harness
        .albums
        .find_by_natural_key(&249504)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        us_pressing.cover_image_url.as_deref(),
        Some("https://img.test/nevermind.jpg")
    );
}

#[tokio::test]
async fn provider_failure_leaves_catalog_untouched() {
    let harness = Harness::new().await;
    harness
        .album_import(responding(200, NEVERMIND))
        .import_release(249504)
        .await
        .unwrap();
    let before = harness
        .albums
        .find_all_matching(&Predicate::all())
        .await
        .unwrap();

    let err = harness
        .album_import(responding(500, "upstream down"))
        .import_by_title("nevermind")
        .await
        .unwrap_err();
    assert!(err.is_external_service_error());
    assert!(matches!(err, MetadataError::HttpStatus { status: 500, .. }));

    let mut offline = MockHttpClient::new();
    offline
        .expect_execute()
        .returning(|_| Err(BridgeError::Connection("connection refused".to_string())));
    let err = harness
        .album_import(Arc::new(offline))
        .import_release(249504)
        .await
        .unwrap_err();
    assert!(matches!(err, MetadataError::Network { .. }));

    let err = harness
        .artist_import(responding(403, ""))
        .import_top_artists(5)
        .await
        .unwrap_err();
    assert!(matches!(err, MetadataError::Unauthorized { .. }));

    let after = harness
        .albums
        .find_all_matching(&Predicate::all())
        .await
        .unwrap();
    assert_eq!(before, after);
    assert_eq!(
        harness
            .artists
            .count_matching(&Predicate::all())
            .await
            .unwrap(),
        0
    );
}
