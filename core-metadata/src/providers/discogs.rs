//! Discogs API Client
//!
//! ## API Endpoints
//!
//! - **Release**: `{base}/releases/{id}`
//! - **Search**: `{base}/database/search?release_title={title}&per_page=2000&page=1&token={token}`
//!
//! Search reads the first page only. With a page size of 2000 that covers
//! every realistic title query; anything beyond it is dropped.
//!
//! ## Authentication
//!
//! Search requires a personal access token, sent as the `token` query
//! parameter. A missing token fails before any request is made. Release
//! lookups are sent anonymously.

use crate::error::{MetadataError, Result};
use crate::providers::{fetch_json, usable_secret};
use bridge_traits::http::{HttpClient, HttpRequest};
use core_runtime::config::DiscogsConfig;
use serde::{Deserialize, Deserializer};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

const PROVIDER: &str = "Discogs";

/// A release as returned by `/releases/{id}`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DiscogsRelease {
    pub id: i64,
    pub title: String,
    #[serde(deserialize_with = "lenient_year")]
    pub year: Option<i32>,
    pub artists: Vec<DiscogsArtistCredit>,
    pub images: Vec<DiscogsImage>,
    pub thumb: Option<String>,
    pub genres: Vec<String>,
    pub styles: Vec<String>,
    pub tracklist: Vec<DiscogsTrack>,
    pub uri: Option<String>,
}

impl DiscogsRelease {
    /// The primary image, falling back to the first image, then the thumbnail.
    pub fn cover_image_url(&self) -> Option<String> {
        self.images
            .iter()
            .find(|img| img.kind == "primary")
            .or_else(|| self.images.first())
            .map(|img| img.uri.clone())
            .filter(|uri| !uri.is_empty())
            .or_else(|| self.thumb.clone().filter(|t| !t.is_empty()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DiscogsArtistCredit {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DiscogsImage {
    #[serde(rename = "type")]
    pub kind: String,
    pub uri: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DiscogsTrack {
    pub position: String,
    pub title: String,
    /// `m:ss` as printed on the release, often empty
    pub duration: String,
}

/// One hit of `/database/search`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DiscogsSearchResult {
    pub id: i64,
    /// `release`, `master`, `artist` or `label`
    #[serde(rename = "type")]
    pub kind: String,
    /// Usually `"Artist - Title"`
    pub title: String,
    #[serde(deserialize_with = "lenient_year")]
    pub year: Option<i32>,
    pub cover_image: Option<String>,
    pub thumb: Option<String>,
    pub country: Option<String>,
    pub genre: Vec<String>,
    pub format: Vec<String>,
}

impl DiscogsSearchResult {
    pub fn is_release(&self) -> bool {
        self.kind == "release"
    }

    /// The title without its leading `"Artist - "` credit.
    pub fn release_title(&self) -> &str {
        self.title
            .split_once(" - ")
            .map(|(_, title)| title.trim())
            .filter(|title| !title.is_empty())
            .unwrap_or(self.title.trim())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearchEnvelope {
    pagination: Option<Pagination>,
    results: Vec<DiscogsSearchResult>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Pagination {
    pages: u32,
    items: u32,
}

/// Discogs sends `year` as a number on releases and as a string in search
/// results; `0` and `""` mean unknown.
fn lenient_year<'de, D>(deserializer: D) -> std::result::Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawYear {
        Number(i64),
        Text(String),
    }

    let year = match Option::<RawYear>::deserialize(deserializer)? {
        Some(RawYear::Number(n)) => i32::try_from(n).ok(),
        Some(RawYear::Text(s)) => s.trim().parse::<i32>().ok(),
        None => None,
    };
    Ok(year.filter(|y| *y > 0))
}

/// Discogs API client
pub struct DiscogsClient {
    http_client: Arc<dyn HttpClient>,
    config: DiscogsConfig,
    timeout: Duration,
}

impl DiscogsClient {
    pub fn new(http_client: Arc<dyn HttpClient>, config: DiscogsConfig, timeout: Duration) -> Self {
        Self {
            http_client,
            config,
            timeout,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Fetch one release by its Discogs id.
    ///
    /// # Errors
    /// - `HttpStatus` with status 404 if the release does not exist
    /// - any other `MetadataError` external variant on failure
    #[instrument(skip(self))]
    pub async fn fetch_release(&self, id: i64) -> Result<DiscogsRelease> {
        let request =
            HttpRequest::get(self.endpoint(&format!("releases/{}", id))).timeout(self.timeout);

        let release: DiscogsRelease = fetch_json(self.http_client.as_ref(), PROVIDER, request).await?;
        debug!(title = %release.title, "Fetched Discogs release");
        Ok(release)
    }

    /// Search releases by title with the configured token.
    pub async fn search_by_title(&self, title: &str) -> Result<Vec<DiscogsSearchResult>> {
        let token = self.config.token.clone();
        self.search_by_title_with_token(title, token.as_deref()).await
    }

    /// Search releases by title, first page only.
    ///
    /// # Errors
    /// - `Unauthorized` without sending anything if `token` is absent or blank
    /// - `Unauthorized` if Discogs rejects the token
    #[instrument(skip(self, token))]
    pub async fn search_by_title_with_token(
        &self,
        title: &str,
        token: Option<&str>,
    ) -> Result<Vec<DiscogsSearchResult>> {
        let token = usable_secret(token).ok_or_else(|| MetadataError::Unauthorized {
            provider: PROVIDER,
            message: "no Discogs token configured".to_string(),
        })?;

        let request = HttpRequest::get(self.endpoint("database/search"))
            .query("release_title", title)
            .query("per_page", self.config.search_page_size.to_string())
            .query("page", "1")
            .query("token", token)
            .timeout(self.timeout);

        let envelope: SearchEnvelope =
            fetch_json(self.http_client.as_ref(), PROVIDER, request).await?;

        if let Some(pagination) = envelope.pagination.as_ref().filter(|p| p.pages > 1) {
            debug!(
                pages = pagination.pages,
                items = pagination.items,
                "Discogs search has more pages than the first"
            );
        }
        debug!(results = envelope.results.len(), "Discogs search completed");
        Ok(envelope.results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::test_support::MockHttpClient;
    use bridge_traits::http::HttpResponse;
    use core_runtime::config::CatalogApiConfig;

    const RELEASE_JSON: &str = r#"{
        "id": 249504,
        "title": "Nevermind",
        "year": 1991,
        "artists": [{"id": 125246, "name": "Nirvana", "anv": ""}],
        "images": [
            {"type": "secondary", "uri": "https://img.test/back.jpg", "width": 600},
            {"type": "primary", "uri": "https://img.test/front.jpg", "width": 600}
        ],
        "tracklist": [{"position": "A1", "title": "Smells Like Teen Spirit", "duration": "5:01"}],
        "community": {"have": 1}
    }"#;

    const SEARCH_JSON: &str = r#"{
        "pagination": {"page": 1, "pages": 1, "per_page": 2000, "items": 2},
        "results": [
            {"id": 249504, "type": "release", "title": "Nirvana - Nevermind", "year": "1991",
             "cover_image": "https://img.test/front.jpg"},
            {"id": 8795, "type": "master", "title": "Nirvana - Nevermind", "year": ""}
        ]
    }"#;

    fn config() -> DiscogsConfig {
        CatalogApiConfig::new()
            .with_discogs_base_url("https://discogs.test/")
            .with_discogs_token("tok123")
            .discogs
    }

    fn client(http: MockHttpClient, config: DiscogsConfig) -> DiscogsClient {
        DiscogsClient::new(Arc::new(http), config, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_fetch_release() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .withf(|req| {
                req.url == "https://discogs.test/releases/249504"
                    && req.timeout == Some(Duration::from_secs(5))
            })
            .times(1)
            .returning(|_| Ok(HttpResponse::new(200, RELEASE_JSON)));

        let release = client(http, config()).fetch_release(249504).await.unwrap();
        assert_eq!(release.title, "Nevermind");
        assert_eq!(release.year, Some(1991));
        assert_eq!(release.artists[0].name, "Nirvana");
        assert_eq!(
            release.cover_image_url().as_deref(),
            Some("https://img.test/front.jpg")
        );
    }

    #[tokio::test]
    async fn test_search_sends_first_page_with_token() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .withf(|req| {
                req.url
                    == "https://discogs.test/database/search?release_title=in%20utero\
                        &per_page=2000&page=1&token=tok123"
            })
            .times(1)
            .returning(|_| Ok(HttpResponse::new(200, SEARCH_JSON)));

        let results = client(http, config())
            .search_by_title("in utero")
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_release());
        assert_eq!(results[0].year, Some(1991));
        assert_eq!(results[0].release_title(), "Nevermind");
        assert_eq!(results[1].year, None);
    }

    #[tokio::test]
    async fn test_missing_token_sends_nothing() {
        let http = MockHttpClient::new();
        let mut config = config();
        config.token = None;
        let client = client(http, config);

        let err = client.search_by_title("nevermind").await.unwrap_err();
        assert!(matches!(err, MetadataError::Unauthorized { .. }));

        let err = client
            .search_by_title_with_token("nevermind", Some(" "))
            .await
            .unwrap_err();
        assert!(matches!(err, MetadataError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn test_not_found_release_is_status_error() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .returning(|_| Ok(HttpResponse::new(404, r#"{"message": "Release not found."}"#)));

        let err = client(http, config()).fetch_release(1).await.unwrap_err();
        assert!(matches!(err, MetadataError::HttpStatus { status: 404, .. }));
    }

    #[test]
    fn test_cover_falls_back_to_thumb() {
        let release = DiscogsRelease {
            thumb: Some("https://img.test/thumb.jpg".to_string()),
            ..Default::default()
        };
        assert_eq!(
            release.cover_image_url().as_deref(),
            Some("https://img.test/thumb.jpg")
        );
        assert_eq!(DiscogsRelease::default().cover_image_url(), None);
    }

    #[test]
    fn test_release_title_without_credit() {
        let result = DiscogsSearchResult {
            title: "Bleach".to_string(),
            ..Default::default()
        };
        assert_eq!(result.release_title(), "Bleach");
    }
}
