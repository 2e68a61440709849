//! Domain models for the music catalog
//!
//! Rows carry a database-assigned `id` (`None` until inserted) and timestamps
//! in Unix milliseconds taken from the injected [`Clock`](bridge_traits::Clock).

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

/// Behaviour shared by every persisted catalog row.
pub trait Entity: Clone + fmt::Debug + Send + Sync + Unpin + 'static {
    /// Human-readable entity name used in errors and logs
    const NAME: &'static str;

    fn id(&self) -> Option<i64>;

    /// Consume the entity, returning it with the database-assigned id
    fn with_id(self, id: i64) -> Self;

    fn validate(&self) -> Result<(), String>;

    /// Stamp the entity as modified at `now` (Unix millis)
    fn touch(&mut self, now: i64);
}

// =============================================================================
// Artist
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Artist {
    pub id: Option<i64>,
    pub name: String,
    /// Napster artist id (`Art.28463069`), the import natural key
    pub napster_id: Option<String>,
    pub bio: Option<String>,
    pub image_url: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Artist {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            napster_id: None,
            bio: None,
            image_url: None,
            created_at: 0,
            updated_at: 0,
        }
    }
}

impl Entity for Artist {
    const NAME: &'static str = "Artist";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Artist name cannot be empty".to_string());
        }
        if matches!(&self.napster_id, Some(id) if id.trim().is_empty()) {
            return Err("Napster id cannot be blank".to_string());
        }
        Ok(())
    }

    fn touch(&mut self, now: i64) {
        if self.created_at == 0 {
            self.created_at = now;
        }
        self.updated_at = now;
    }
}

// =============================================================================
// Album
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Album {
    pub id: Option<i64>,
    pub name: String,
    pub year: Option<i32>,
    pub artist_id: Option<i64>,
    /// Discogs release id, the import natural key
    pub discogs_id: Option<i64>,
    pub cover_image_url: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Album {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            year: None,
            artist_id: None,
            discogs_id: None,
            cover_image_url: None,
            created_at: 0,
            updated_at: 0,
        }
    }
}

impl Entity for Album {
    const NAME: &'static str = "Album";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Album name cannot be empty".to_string());
        }

        if let Some(year) = self.year {
            if !(1000..=9999).contains(&year) {
                return Err(format!("Album year {} is out of valid range", year));
            }
        }

        Ok(())
    }

    fn touch(&mut self, now: i64) {
        if self.created_at == 0 {
            self.created_at = now;
        }
        self.updated_at = now;
    }
}

// =============================================================================
// Song
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Song {
    pub id: Option<i64>,
    pub name: String,
    /// Length in seconds
    pub duration: Option<i64>,
    pub album_id: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Song {
    pub fn new(name: impl Into<String>, duration: Option<i64>) -> Self {
        Self {
            id: None,
            name: name.into(),
            duration,
            album_id: None,
            created_at: 0,
            updated_at: 0,
        }
    }
}

impl Entity for Song {
    const NAME: &'static str = "Song";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Song name cannot be empty".to_string());
        }
        if matches!(self.duration, Some(d) if d < 0) {
            return Err("Song duration cannot be negative".to_string());
        }
        Ok(())
    }

    fn touch(&mut self, now: i64) {
        if self.created_at == 0 {
            self.created_at = now;
        }
        self.updated_at = now;
    }
}

// =============================================================================
// Favourite
// =============================================================================

/// What a favourite points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum FavouriteKind {
    Album,
    Song,
    Artist,
}

impl FavouriteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FavouriteKind::Album => "album",
            FavouriteKind::Song => "song",
            FavouriteKind::Artist => "artist",
        }
    }
}

impl fmt::Display for FavouriteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user's like/unlike of an album, song or artist.
///
/// At most one row exists per `(user_login, target_kind, target_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Favourite {
    pub id: Option<i64>,
    pub user_login: String,
    pub target_kind: FavouriteKind,
    pub target_id: i64,
    pub liked: bool,
    /// Last time the favourite was set (Unix millis)
    pub date: i64,
}

impl Favourite {
    /// A favourite not yet bound to a user; the service fills in the login.
    pub fn new(target_kind: FavouriteKind, target_id: i64, liked: bool) -> Self {
        Self {
            id: None,
            user_login: String::new(),
            target_kind,
            target_id,
            liked,
            date: 0,
        }
    }

    pub fn key(&self) -> FavouriteKey {
        FavouriteKey {
            user_login: self.user_login.clone(),
            target_kind: self.target_kind,
            target_id: self.target_id,
        }
    }
}

impl Entity for Favourite {
    const NAME: &'static str = "Favourite";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    fn validate(&self) -> Result<(), String> {
        if self.user_login.trim().is_empty() {
            return Err("Favourite must belong to a user".to_string());
        }
        if self.target_id <= 0 {
            return Err(format!("Invalid {} id {}", self.target_kind, self.target_id));
        }
        Ok(())
    }

    fn touch(&mut self, now: i64) {
        self.date = now;
    }
}

/// Natural key of a [`Favourite`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FavouriteKey {
    pub user_login: String,
    pub target_kind: FavouriteKind,
    pub target_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artist_validation() {
        let mut artist = Artist::new("Nirvana");
        assert!(artist.validate().is_ok());

        artist.napster_id = Some("  ".to_string());
        assert!(artist.validate().is_err());

        artist.napster_id = None;
        artist.name = " ".to_string();
        assert!(artist.validate().is_err());
    }

    #[test]
    fn test_touch_keeps_creation_time() {
        let mut album = Album::new("Nevermind");
        album.touch(1_000);
        assert_eq!((album.created_at, album.updated_at), (1_000, 1_000));

        album.touch(2_000);
        assert_eq!((album.created_at, album.updated_at), (1_000, 2_000));
    }

    #[test]
    fn test_album_year_range() {
        let mut album = Album::new("Bleach");
        album.year = Some(1989);
        assert!(album.validate().is_ok());

        album.year = Some(0);
        assert!(album.validate().is_err());
    }

    #[test]
    fn test_song_negative_duration_rejected() {
        assert!(Song::new("Lithium", Some(257)).validate().is_ok());
        assert!(Song::new("Lithium", Some(-1)).validate().is_err());
    }

    #[test]
    fn test_favourite_requires_user_and_target() {
        let mut favourite = Favourite::new(FavouriteKind::Album, 7, true);
        assert!(favourite.validate().is_err());

        favourite.user_login = "alice".to_string();
        assert!(favourite.validate().is_ok());

        favourite.target_id = 0;
        assert!(favourite.validate().is_err());
    }

    #[test]
    fn test_favourite_kind_serialization() {
        assert_eq!(FavouriteKind::Song.to_string(), "song");
        assert_eq!(
            serde_json::to_string(&FavouriteKind::Artist).unwrap(),
            "\"artist\""
        );
    }
}
