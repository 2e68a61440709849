//! # Catalog Import
//!
//! Copies provider data into the local catalog, keyed by the provider's id:
//! Napster artists by `napster_id`, Discogs releases by `discogs_id`.
//! Importing the same record again updates the existing row instead of
//! adding a new one.
//!
//! Provider data is fetched completely before the first write. If the fetch
//! fails, nothing in the catalog changes.

use crate::error::{MetadataError, Result};
use crate::providers::{DiscogsClient, DiscogsSearchResult, NapsterArtist, NapsterClient};
use bridge_traits::Clock;
use core_library::models::{Album, Artist};
use core_library::repositories::{AlbumRepository, ArtistRepository};
use core_library::{upsert, Entity, LibraryError, UpsertOutcome};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Counters for a batch import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub created: usize,
    pub updated: usize,
    /// Provider records rejected by validation (blank name, bad year, ...)
    pub skipped: usize,
}

impl ImportSummary {
    fn record<E>(&mut self, outcome: &UpsertOutcome<E>) {
        if outcome.was_created() {
            self.created += 1;
        } else {
            self.updated += 1;
        }
    }

    pub fn total(&self) -> usize {
        self.created + self.updated + self.skipped
    }
}

// =============================================================================
// Artists (Napster)
// =============================================================================

pub struct ArtistImportService {
    napster: Arc<NapsterClient>,
    artists: Arc<dyn ArtistRepository>,
    clock: Arc<dyn Clock>,
}

impl ArtistImportService {
    pub fn new(
        napster: Arc<NapsterClient>,
        artists: Arc<dyn ArtistRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            napster,
            artists,
            clock,
        }
    }

    /// Import the current Napster top artists.
    #[instrument(skip(self))]
    pub async fn import_top_artists(&self, limit: u32) -> Result<ImportSummary> {
        let artists = self.napster.top_artists(limit).await?;
        let summary = self.import_all(&artists).await?;
        info!(?summary, "Imported Napster top artists");
        Ok(summary)
    }

    /// Import every artist a Napster search for `query` returns.
    #[instrument(skip(self))]
    pub async fn import_search_results(&self, query: &str) -> Result<ImportSummary> {
        let artists = self.napster.search_artists(query).await?;
        let summary = self.import_all(&artists).await?;
        info!(?summary, "Imported Napster search results");
        Ok(summary)
    }

    /// Fetch one artist by Napster id and import it. `Ok(None)` if Napster
    /// does not know the id.
    #[instrument(skip(self))]
    pub async fn import_artist_by_id(&self, napster_id: &str) -> Result<Option<UpsertOutcome<Artist>>> {
        match self.napster.artist(napster_id).await? {
            Some(artist) => self.import_artist(&artist).await.map(Some),
            None => Ok(None),
        }
    }

    /// Create or refresh the local artist for `source`.
    pub async fn import_artist(&self, source: &NapsterArtist) -> Result<UpsertOutcome<Artist>> {
        let now = self.clock.unix_timestamp_millis();
        let napster_id = source.id.trim().to_string();
        let name = source.name.trim().to_string();
        let bio = source.biography();
        let image_url = source.image_url();

        let outcome = upsert(
            self.artists.as_ref(),
            &napster_id,
            || {
                let mut artist = Artist::new(name.clone());
                artist.napster_id = Some(napster_id.clone());
                artist.bio = bio.clone();
                artist.image_url = image_url.clone();
                artist.touch(now);
                artist
            },
            |existing| {
                existing.name = name.clone();
                if bio.is_some() {
                    existing.bio = bio.clone();
                }
                if image_url.is_some() {
                    existing.image_url = image_url.clone();
                }
                existing.touch(now);
            },
        )
        .await?;

        debug!(%napster_id, created = outcome.was_created(), "Imported Napster artist");
        Ok(outcome)
    }

    async fn import_all(&self, artists: &[NapsterArtist]) -> Result<ImportSummary> {
        let mut summary = ImportSummary::default();
        for artist in artists {
            match self.import_artist(artist).await {
                Ok(outcome) => summary.record(&outcome),
                Err(e) if is_rejected_record(&e) => {
                    warn!(napster_id = %artist.id, error = %e, "Skipping invalid Napster artist");
                    summary.skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(summary)
    }
}

// =============================================================================
// Albums (Discogs)
// =============================================================================

pub struct AlbumImportService {
    discogs: Arc<DiscogsClient>,
    albums: Arc<dyn AlbumRepository>,
    clock: Arc<dyn Clock>,
}

/// The album fields a Discogs record contributes
struct AlbumImport {
    discogs_id: i64,
    name: String,
    year: Option<i32>,
    cover_image_url: Option<String>,
}

impl From<&DiscogsSearchResult> for AlbumImport {
    fn from(result: &DiscogsSearchResult) -> Self {
        Self {
            discogs_id: result.id,
            name: result.release_title().to_string(),
            year: result.year,
            cover_image_url: result.cover_image.clone().filter(|c| !c.is_empty()),
        }
    }
}

impl AlbumImportService {
    pub fn new(
        discogs: Arc<DiscogsClient>,
        albums: Arc<dyn AlbumRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            discogs,
            albums,
            clock,
        }
    }

    /// Fetch a Discogs release and create or refresh its album.
    #[instrument(skip(self))]
    pub async fn import_release(&self, release_id: i64) -> Result<UpsertOutcome<Album>> {
        let release = self.discogs.fetch_release(release_id).await?;
        let import = AlbumImport {
            discogs_id: if release.id > 0 { release.id } else { release_id },
            name: release.title.trim().to_string(),
            year: release.year,
            cover_image_url: release.cover_image_url(),
        };

        let outcome = self.upsert_album(&import).await?;
        info!(created = outcome.was_created(), "Imported Discogs release");
        Ok(outcome)
    }

    /// Import every release (masters and other result types are ignored) on
    /// the first page of a Discogs title search.
    #[instrument(skip(self))]
    pub async fn import_by_title(&self, title: &str) -> Result<ImportSummary> {
        let results = self.discogs.search_by_title(title).await?;

        let mut summary = ImportSummary::default();
        for result in results.iter().filter(|r| r.is_release()) {
            match self.upsert_album(&AlbumImport::from(result)).await {
                Ok(outcome) => summary.record(&outcome),
                Err(e) if is_rejected_record(&e) => {
                    warn!(discogs_id = result.id, error = %e, "Skipping invalid Discogs release");
                    summary.skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        info!(?summary, "Imported Discogs search results");
        Ok(summary)
    }

    async fn upsert_album(&self, import: &AlbumImport) -> Result<UpsertOutcome<Album>> {
        let now = self.clock.unix_timestamp_millis();

        let outcome = upsert(
            self.albums.as_ref(),
            &import.discogs_id,
            || {
                let mut album = Album::new(import.name.clone());
                album.discogs_id = Some(import.discogs_id);
                album.year = import.year;
                album.cover_image_url = import.cover_image_url.clone();
                album.touch(now);
                album
            },
            |existing| {
                existing.name = import.name.clone();
                if import.year.is_some() {
                    existing.year = import.year;
                }
                if import.cover_image_url.is_some() {
                    existing.cover_image_url = import.cover_image_url.clone();
                }
                existing.touch(now);
            },
        )
        .await?;

        Ok(outcome)
    }
}

fn is_rejected_record(err: &MetadataError) -> bool {
    matches!(err, MetadataError::Library(LibraryError::InvalidInput { .. }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts() {
        let mut summary = ImportSummary::default();
        summary.record(&UpsertOutcome::Created(()));
        summary.record(&UpsertOutcome::Updated(()));
        summary.record(&UpsertOutcome::Updated(()));
        summary.skipped += 1;

        assert_eq!(summary.created, 1);
        assert_eq!(summary.updated, 2);
        assert_eq!(summary.total(), 4);
    }

    #[test]
    fn test_search_result_mapping() {
        let result = DiscogsSearchResult {
            id: 42,
            kind: "release".to_string(),
            title: "Nirvana - In Utero".to_string(),
            year: Some(1993),
            cover_image: Some(String::new()),
            ..Default::default()
        };
        let import = AlbumImport::from(&result);
        assert_eq!(import.discogs_id, 42);
        assert_eq!(import.name, "In Utero");
        assert_eq!(import.year, Some(1993));
        assert_eq!(import.cover_image_url, None);
    }
}
