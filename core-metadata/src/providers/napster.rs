//! Napster API Client
//!
//! ## API Endpoints
//!
//! - **Top artists**: `{base}/artists/top?limit={n}&apikey={key}`
//! - **Search**: `{base}/search?query={q}&type=artist&apikey={key}`
//! - **Artist**: `{base}/artists/{id}?apikey={key}`
//!
//! Every call needs an API key; without one the client fails before sending.

use crate::error::{MetadataError, Result};
use crate::providers::{fetch_json, usable_secret};
use bridge_traits::http::{HttpClient, HttpRequest};
use core_runtime::config::NapsterConfig;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

const PROVIDER: &str = "Napster";

const IMAGE_SERVER: &str = "https://api.napster.com/imageserver/v2";

/// Napster's own upper bound for `limit` on chart endpoints
pub const MAX_TOP_ARTISTS: u32 = 200;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct NapsterArtist {
    /// `Art.28463069`
    pub id: String,
    pub name: String,
    pub shortcut: Option<String>,
    pub blurbs: Vec<String>,
    pub bios: Vec<NapsterBio>,
    pub links: NapsterLinks,
}

impl NapsterArtist {
    /// First non-empty bio, falling back to the first non-empty blurb.
    pub fn biography(&self) -> Option<String> {
        self.bios
            .iter()
            .map(|b| b.bio.trim())
            .chain(self.blurbs.iter().map(|b| b.trim()))
            .find(|text| !text.is_empty())
            .map(str::to_string)
    }

    /// Napster ids of related artists, in Napster's order.
    pub fn contemporaries(&self) -> &[String] {
        &self.links.contemporaries.ids
    }

    /// 633x422 artist picture on the Napster image server.
    pub fn image_url(&self) -> Option<String> {
        let id = self.id.trim();
        (!id.is_empty()).then(|| format!("{}/artists/{}/images/633x422.jpg", IMAGE_SERVER, id))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NapsterBio {
    pub title: String,
    pub author: String,
    pub publish_date: String,
    pub bio: String,
}

/// Resources linked from an artist; only related artists are decoded.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct NapsterLinks {
    pub contemporaries: NapsterLinkedIds,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct NapsterLinkedIds {
    pub ids: Vec<String>,
    pub href: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ArtistsEnvelope {
    artists: Vec<NapsterArtist>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearchEnvelope {
    search: SearchBody,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearchBody {
    data: ArtistsEnvelope,
}

/// Napster API client
pub struct NapsterClient {
    http_client: Arc<dyn HttpClient>,
    config: NapsterConfig,
    timeout: Duration,
}

impl NapsterClient {
    pub fn new(http_client: Arc<dyn HttpClient>, config: NapsterConfig, timeout: Duration) -> Self {
        Self {
            http_client,
            config,
            timeout,
        }
    }

    fn request(&self, path: &str) -> Result<HttpRequest> {
        let api_key = usable_secret(self.config.api_key.as_deref()).ok_or_else(|| {
            MetadataError::Unauthorized {
                provider: PROVIDER,
                message: "no Napster API key configured".to_string(),
            }
        })?;

        let url = format!("{}/{}", self.config.base_url.trim_end_matches('/'), path);
        Ok(HttpRequest::get(url)
            .query("apikey", api_key)
            .timeout(self.timeout))
    }

    /// Current top artists, at most `limit` (clamped to 1..=200).
    #[instrument(skip(self))]
    pub async fn top_artists(&self, limit: u32) -> Result<Vec<NapsterArtist>> {
        let limit = limit.clamp(1, MAX_TOP_ARTISTS);
        let request = self
            .request("artists/top")?
            .query("limit", limit.to_string());

        let envelope: ArtistsEnvelope =
            fetch_json(self.http_client.as_ref(), PROVIDER, request).await?;
        debug!(returned = envelope.artists.len(), "Fetched Napster top artists");
        Ok(envelope.artists)
    }

    #[instrument(skip(self))]
    pub async fn search_artists(&self, query: &str) -> Result<Vec<NapsterArtist>> {
        let request = self
            .request("search")?
            .query("query", query)
            .query("type", "artist");

        let envelope: SearchEnvelope =
            fetch_json(self.http_client.as_ref(), PROVIDER, request).await?;
        Ok(envelope.search.data.artists)
    }

    /// Look up one artist; `Ok(None)` if Napster knows no such id.
    #[instrument(skip(self))]
    pub async fn artist(&self, id: &str) -> Result<Option<NapsterArtist>> {
        let request = self.request(&format!("artists/{}", urlencoding::encode(id)))?;

        let envelope: ArtistsEnvelope =
            fetch_json(self.http_client.as_ref(), PROVIDER, request).await?;
        Ok(envelope.artists.into_iter().next())
    }
}
