//! External catalog providers
//!
//! - Discogs - release lookup and title search
//! - Napster - artist charts, search and lookup
//!
//! Requests are single-shot with an explicit timeout. Any transport failure,
//! non-2xx status or undecodable body fails the whole call; no partial
//! result is ever returned.

pub mod discogs;
pub mod napster;

pub use discogs::{DiscogsClient, DiscogsRelease, DiscogsSearchResult};
pub use napster::{NapsterArtist, NapsterBio, NapsterClient, NapsterLinkedIds, NapsterLinks};

use crate::error::{MetadataError, Result};
use bridge_traits::http::{HttpClient, HttpRequest};
use core_runtime::logging::redact_query_secrets;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

const USER_AGENT: &str = concat!("DubionCatalog/", env!("CARGO_PKG_VERSION"));

/// Longest slice of an error body kept in `HttpStatus`
const MAX_ERROR_BODY: usize = 256;

/// Send `request` and decode a 2xx JSON body into `T`.
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    http_client: &dyn HttpClient,
    provider: &'static str,
    request: HttpRequest,
) -> Result<T> {
    let url = redact_query_secrets(&request.url);
    let request = request
        .header("User-Agent", USER_AGENT)
        .header("Accept", "application/json");

    debug!(provider, url = %url, "Sending catalog request");

    let response = http_client.execute(request).await.map_err(|e| {
        warn!(provider, url = %url, error = %e, "Catalog request failed");
        MetadataError::Network {
            provider,
            message: e.to_string(),
        }
    })?;

    if !response.is_success() {
        warn!(provider, url = %url, status = response.status, "Catalog request rejected");
        return Err(match response.status {
            401 | 403 => MetadataError::Unauthorized {
                provider,
                message: format!("HTTP {}", response.status),
            },
            status => MetadataError::HttpStatus {
                provider,
                status,
                body: response.text_lossy().chars().take(MAX_ERROR_BODY).collect(),
            },
        });
    }

    serde_json::from_slice(&response.body).map_err(|e| {
        warn!(provider, url = %url, error = %e, "Catalog response did not decode");
        MetadataError::JsonParse {
            provider,
            message: e.to_string(),
        }
    })
}

/// `None` when the credential is absent or blank.
pub(crate) fn usable_secret(secret: Option<&str>) -> Option<&str> {
    secret.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
pub(crate) mod test_support {
    use async_trait::async_trait;
    use bridge_traits::error::Result;
    use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
    use mockall::mock;

    mock! {
        pub HttpClient {}

        #[async_trait]
        impl HttpClient for HttpClient {
            async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
        }
    }
}
