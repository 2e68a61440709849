//! Generic create/read/update/delete service over an [`EntityRepository`].
//!
//! Stamps timestamps from the injected clock and enforces the id rules:
//! a new entity must not carry an id, and an update without an id is treated
//! as a create.

use crate::error::{LibraryError, Result};
use crate::models::Entity;
use crate::predicate::Predicate;
use crate::repositories::{not_found, EntityRepository, Page, PageRequest};
use bridge_traits::Clock;
use std::sync::Arc;
use tracing::{debug, info, instrument};

pub struct CrudService<E: Entity> {
    repository: Arc<dyn EntityRepository<E>>,
    clock: Arc<dyn Clock>,
}

impl<E: Entity> CrudService<E> {
    pub fn new(repository: Arc<dyn EntityRepository<E>>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// # Errors
    /// - `InvalidInput` if `entity` already has an id or fails validation
    /// - `ConstraintViolation` if a natural key it carries is taken
    #[instrument(skip(self, entity), fields(entity = E::NAME))]
    pub async fn create(&self, mut entity: E) -> Result<E> {
        if entity.id().is_some() {
            return Err(LibraryError::invalid(
                "id",
                format!("A new {} cannot already have an ID", E::NAME.to_lowercase()),
            ));
        }

        entity.touch(self.clock.unix_timestamp_millis());
        let created = self.repository.insert(&entity).await?;
        info!(id = ?created.id(), "Created entity");
        Ok(created)
    }

    /// Update an existing entity, or create it when it has no id yet.
    ///
    /// Returns the stored row, so `created_at` is always the persisted value.
    #[instrument(skip(self, entity), fields(entity = E::NAME, id = ?entity.id()))]
    pub async fn update(&self, mut entity: E) -> Result<E> {
        let Some(id) = entity.id() else {
            debug!("Update without id, creating instead");
            return self.create(entity).await;
        };

        entity.touch(self.clock.unix_timestamp_millis());
        self.repository.update(&entity).await?;

        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found::<E>(id))
    }

    pub async fn find_one(&self, id: i64) -> Result<Option<E>> {
        self.repository.find_by_id(id).await
    }

    pub async fn find_all(&self, page_request: PageRequest) -> Result<Page<E>> {
        self.repository
            .find_page_matching(&Predicate::all(), page_request)
            .await
    }

    /// Returns whether a row was removed
    #[instrument(skip(self), fields(entity = E::NAME))]
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let deleted = self.repository.delete(id).await?;
        debug!(deleted, "Delete completed");
        Ok(deleted)
    }
}
