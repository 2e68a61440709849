//! # Criteria Model
//!
//! One optional filter per filterable attribute. The filter kind follows the
//! attribute's type: identifiers take [`EqualsFilter`], strings take
//! [`ContainsFilter`], numbers take [`RangeFilter`]. An absent filter places no
//! restriction on its field, so `Default::default()` matches every row.
//!
//! ```ignore
//! let criteria = SongCriteria::default()
//!     .name_contains("nirv")
//!     .duration_between(Some(100), Some(200));
//! let songs = song_queries.find_by_criteria(&criteria).await?;
//! ```

use crate::models::{Album, Artist, Favourite, FavouriteKind, Song};
use crate::predicate::{Criteria, Filterable, Predicate, Value};
use serde::{Deserialize, Serialize};

/// Exact match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EqualsFilter<T> {
    pub equals: T,
}

impl<T> EqualsFilter<T> {
    pub fn new(equals: T) -> Self {
        Self { equals }
    }
}

/// Case-insensitive substring match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainsFilter {
    pub contains: String,
}

impl ContainsFilter {
    pub fn new(contains: impl Into<String>) -> Self {
        Self {
            contains: contains.into(),
        }
    }
}

/// Inclusive range, either bound optional
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeFilter<T> {
    pub min: Option<T>,
    pub max: Option<T>,
}

impl<T> RangeFilter<T> {
    pub fn new(min: Option<T>, max: Option<T>) -> Self {
        Self { min, max }
    }
}

// =============================================================================
// Artist
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistCriteria {
    pub id: Option<EqualsFilter<i64>>,
    pub name: Option<ContainsFilter>,
    pub napster_id: Option<EqualsFilter<String>>,
}

impl ArtistCriteria {
    pub fn id_equals(mut self, id: i64) -> Self {
        self.id = Some(EqualsFilter::new(id));
        self
    }

    pub fn name_contains(mut self, fragment: impl Into<String>) -> Self {
        self.name = Some(ContainsFilter::new(fragment));
        self
    }

    pub fn napster_id_equals(mut self, napster_id: impl Into<String>) -> Self {
        self.napster_id = Some(EqualsFilter::new(napster_id.into()));
        self
    }
}

impl Criteria for ArtistCriteria {
    type Target = Artist;

    fn predicate(&self) -> Predicate<Artist> {
        Predicate::all()
            .equals("id", &self.id)
            .contains("name", &self.name)
            .equals("napster_id", &self.napster_id)
    }
}

impl Filterable for Artist {
    fn field(&self, column: &str) -> Option<Value> {
        match column {
            "id" => self.id.map(Value::from),
            "name" => Some(Value::from(self.name.as_str())),
            "napster_id" => self.napster_id.as_deref().map(Value::from),
            _ => None,
        }
    }
}

// =============================================================================
// Album
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumCriteria {
    pub id: Option<EqualsFilter<i64>>,
    pub name: Option<ContainsFilter>,
    pub year: Option<RangeFilter<i32>>,
    pub artist_id: Option<EqualsFilter<i64>>,
    pub discogs_id: Option<EqualsFilter<i64>>,
}

impl AlbumCriteria {
    pub fn id_equals(mut self, id: i64) -> Self {
        self.id = Some(EqualsFilter::new(id));
        self
    }

    pub fn name_contains(mut self, fragment: impl Into<String>) -> Self {
        self.name = Some(ContainsFilter::new(fragment));
        self
    }

    pub fn year_between(mut self, min: Option<i32>, max: Option<i32>) -> Self {
        self.year = Some(RangeFilter::new(min, max));
        self
    }

    pub fn artist_equals(mut self, artist_id: i64) -> Self {
        self.artist_id = Some(EqualsFilter::new(artist_id));
        self
    }

    pub fn discogs_id_equals(mut self, discogs_id: i64) -> Self {
        self.discogs_id = Some(EqualsFilter::new(discogs_id));
        self
    }
}

impl Criteria for AlbumCriteria {
    type Target = Album;

    fn predicate(&self) -> Predicate<Album> {
        Predicate::all()
            .equals("id", &self.id)
            .contains("name", &self.name)
            .range("year", &self.year)
            .equals("artist_id", &self.artist_id)
            .equals("discogs_id", &self.discogs_id)
    }
}

impl Filterable for Album {
    fn field(&self, column: &str) -> Option<Value> {
        match column {
            "id" => self.id.map(Value::from),
            "name" => Some(Value::from(self.name.as_str())),
            "year" => self.year.map(Value::from),
            "artist_id" => self.artist_id.map(Value::from),
            "discogs_id" => self.discogs_id.map(Value::from),
            _ => None,
        }
    }
}

// =============================================================================
// Song
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongCriteria {
    pub id: Option<EqualsFilter<i64>>,
    pub name: Option<ContainsFilter>,
    /// Seconds
    pub duration: Option<RangeFilter<i64>>,
    pub album_id: Option<EqualsFilter<i64>>,
}

impl SongCriteria {
    pub fn id_equals(mut self, id: i64) -> Self {
        self.id = Some(EqualsFilter::new(id));
        self
    }

    pub fn name_contains(mut self, fragment: impl Into<String>) -> Self {
        self.name = Some(ContainsFilter::new(fragment));
        self
    }

    pub fn duration_between(mut self, min: Option<i64>, max: Option<i64>) -> Self {
        self.duration = Some(RangeFilter::new(min, max));
        self
    }

    pub fn album_equals(mut self, album_id: i64) -> Self {
        self.album_id = Some(EqualsFilter::new(album_id));
        self
    }
}

impl Criteria for SongCriteria {
    type Target = Song;

    fn predicate(&self) -> Predicate<Song> {
        Predicate::all()
            .equals("id", &self.id)
            .contains("name", &self.name)
            .range("duration", &self.duration)
            .equals("album_id", &self.album_id)
    }
}

impl Filterable for Song {
    fn field(&self, column: &str) -> Option<Value> {
        match column {
            "id" => self.id.map(Value::from),
            "name" => Some(Value::from(self.name.as_str())),
            "duration" => self.duration.map(Value::from),
            "album_id" => self.album_id.map(Value::from),
            _ => None,
        }
    }
}

// =============================================================================
// Favourite
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavouriteCriteria {
    pub id: Option<EqualsFilter<i64>>,
    pub user_login: Option<EqualsFilter<String>>,
    pub target_kind: Option<EqualsFilter<FavouriteKind>>,
    pub target_id: Option<EqualsFilter<i64>>,
    pub liked: Option<EqualsFilter<bool>>,
}

impl FavouriteCriteria {
    pub fn user_equals(mut self, login: impl Into<String>) -> Self {
        self.user_login = Some(EqualsFilter::new(login.into()));
        self
    }

    pub fn kind_equals(mut self, kind: FavouriteKind) -> Self {
        self.target_kind = Some(EqualsFilter::new(kind));
        self
    }

    pub fn target_equals(mut self, target_id: i64) -> Self {
        self.target_id = Some(EqualsFilter::new(target_id));
        self
    }

    pub fn liked_equals(mut self, liked: bool) -> Self {
        self.liked = Some(EqualsFilter::new(liked));
        self
    }
}

impl From<FavouriteKind> for Value {
    fn from(kind: FavouriteKind) -> Self {
        Value::Text(kind.as_str().to_string())
    }
}

impl Criteria for FavouriteCriteria {
    type Target = Favourite;

    fn predicate(&self) -> Predicate<Favourite> {
        Predicate::all()
            .equals("id", &self.id)
            .equals("user_login", &self.user_login)
            .equals("target_kind", &self.target_kind)
            .equals("target_id", &self.target_id)
            .equals("liked", &self.liked)
    }
}

impl Filterable for Favourite {
    fn field(&self, column: &str) -> Option<Value> {
        match column {
            "id" => self.id.map(Value::from),
            "user_login" => Some(Value::from(self.user_login.as_str())),
            "target_kind" => Some(Value::from(self.target_kind)),
            "target_id" => Some(Value::from(self.target_id)),
            "liked" => Some(Value::from(self.liked)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_criteria_has_no_filters() {
        assert!(ArtistCriteria::default().predicate().is_universal());
        assert!(AlbumCriteria::default().predicate().is_universal());
        assert!(SongCriteria::default().predicate().is_universal());
        assert!(FavouriteCriteria::default().predicate().is_universal());
    }

    #[test]
    fn test_criteria_deserializes_from_query_shape() {
        let json = r#"{"name":{"contains":"nirv"},"duration":{"min":100,"max":null}}"#;
        let criteria: SongCriteria = serde_json::from_str(json).unwrap();

        assert_eq!(criteria.name, Some(ContainsFilter::new("nirv")));
        assert_eq!(criteria.duration, Some(RangeFilter::new(Some(100), None)));
        assert!(criteria.id.is_none());
    }

    #[test]
    fn test_album_year_range_filters_years() {
        let predicate = AlbumCriteria::default()
            .year_between(Some(1990), Some(1994))
            .predicate();

        let mut album = Album::new("Nevermind");
        album.year = Some(1991);
        assert!(predicate.matches(&album));

        album.year = Some(1989);
        assert!(!predicate.matches(&album));
    }

    #[test]
    fn test_favourite_criteria_binds_kind_as_text() {
        let sql = FavouriteCriteria::default()
            .user_equals("alice")
            .kind_equals(FavouriteKind::Album)
            .liked_equals(true)
            .predicate()
            .to_sql();

        assert_eq!(
            sql.where_clause,
            " WHERE user_login = ? AND target_kind = ? AND liked = ?"
        );
        assert_eq!(sql.binds[1], Value::Text("album".to_string()));
        assert_eq!(sql.binds[2], Value::Bool(true));
    }

    #[test]
    fn test_artist_napster_id_equals_is_exact() {
        let predicate = ArtistCriteria::default()
            .napster_id_equals("Art.1")
            .predicate();

        let mut artist = Artist::new("Nirvana");
        artist.napster_id = Some("Art.1".to_string());
        assert!(predicate.matches(&artist));

        artist.napster_id = Some("Art.10".to_string());
        assert!(!predicate.matches(&artist));
    }
}
