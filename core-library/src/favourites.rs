//! Per-user likes on albums, songs and artists.
//!
//! The acting user always comes from the [`SessionContext`]; whatever
//! `user_login` a caller puts on a [`Favourite`] is overwritten. Setting a
//! favourite twice for the same target updates the existing row.

use crate::error::{LibraryError, Result};
use crate::models::{Entity, Favourite, FavouriteKey, FavouriteKind};
use crate::repositories::FavouriteRepository;
use crate::upsert::{upsert, UpsertOutcome};
use bridge_traits::{Clock, SessionContext};
use std::sync::Arc;
use tracing::{debug, info, instrument};

pub struct FavouriteService {
    repository: Arc<dyn FavouriteRepository>,
    session: Arc<dyn SessionContext>,
    clock: Arc<dyn Clock>,
}

impl FavouriteService {
    pub fn new(
        repository: Arc<dyn FavouriteRepository>,
        session: Arc<dyn SessionContext>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            session,
            clock,
        }
    }

    fn current_user(&self) -> Result<String> {
        self.session
            .current_user_login()
            .filter(|login| !login.trim().is_empty())
            .ok_or(LibraryError::Unauthenticated)
    }

    /// Like or unlike a target for the current user.
    ///
    /// Creates the favourite, or updates `liked` on the existing one. `date`
    /// is set to the current time either way.
    ///
    /// # Errors
    /// - `InvalidInput` if `favourite` already has an id
    /// - `Unauthenticated` if the session has no user
    #[instrument(skip(self, favourite), fields(kind = %favourite.target_kind, target_id = favourite.target_id))]
    pub async fn create(&self, favourite: Favourite) -> Result<UpsertOutcome<Favourite>> {
        if favourite.id.is_some() {
            return Err(LibraryError::invalid(
                "id",
                "A new favourite cannot already have an ID",
            ));
        }

        let mut favourite = favourite;
        favourite.user_login = self.current_user()?;
        let now = self.clock.unix_timestamp_millis();
        let liked = favourite.liked;
        let key = favourite.key();

        let outcome = upsert(
            self.repository.as_ref(),
            &key,
            || {
                let mut created = favourite.clone();
                created.touch(now);
                created
            },
            |existing| {
                existing.liked = liked;
                existing.touch(now);
            },
        )
        .await?;

        info!(
            created = outcome.was_created(),
            liked, "Favourite stored"
        );
        Ok(outcome)
    }

    /// Change `liked` on an existing favourite of the current user.
    ///
    /// A favourite without an id is handed to [`create`](Self::create).
    #[instrument(skip(self, favourite), fields(id = ?favourite.id))]
    pub async fn update(&self, favourite: Favourite) -> Result<Favourite> {
        let Some(id) = favourite.id else {
            return self.create(favourite).await.map(UpsertOutcome::into_inner);
        };

        let user = self.current_user()?;
        let mut existing = self
            .repository
            .find_by_id(id)
            .await?
            .filter(|f| f.user_login == user)
            .ok_or_else(|| LibraryError::NotFound {
                entity_type: Favourite::NAME.to_string(),
                id: id.to_string(),
            })?;

        existing.liked = favourite.liked;
        existing.touch(self.clock.unix_timestamp_millis());
        self.repository.update(&existing).await?;
        Ok(existing)
    }

    pub async fn set_liked(
        &self,
        kind: FavouriteKind,
        target_id: i64,
        liked: bool,
    ) -> Result<UpsertOutcome<Favourite>> {
        self.create(Favourite::new(kind, target_id, liked)).await
    }

    pub async fn find_for_current_user(
        &self,
        kind: FavouriteKind,
        target_id: i64,
    ) -> Result<Option<Favourite>> {
        let key = FavouriteKey {
            user_login: self.current_user()?,
            target_kind: kind,
            target_id,
        };
        self.repository.find_by_natural_key(&key).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let deleted = self.repository.delete(id).await?;
        debug!(deleted, "Favourite delete completed");
        Ok(deleted)
    }
}
