//! Criteria-driven read API for the catalog.
//!
//! A [`CriteriaQueryService`] compiles a criteria object into a predicate and
//! hands it to the entity's repository. Paged and unpaged calls build the
//! predicate the same way, so a row is in some page exactly when it is in the
//! unpaged result. Results are ordered by id, which keeps adjacent pages free
//! of gaps and duplicates while the underlying rows do not change.

use crate::criteria::{AlbumCriteria, ArtistCriteria, FavouriteCriteria, SongCriteria};
use crate::error::Result;
use crate::predicate::Criteria;
use crate::repositories::{EntityRepository, Page, PageRequest};
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, instrument};

pub struct CriteriaQueryService<C: Criteria> {
    repository: Arc<dyn EntityRepository<C::Target>>,
    _criteria: PhantomData<fn(&C)>,
}

impl<C: Criteria> CriteriaQueryService<C> {
    pub fn new(repository: Arc<dyn EntityRepository<C::Target>>) -> Self {
        Self {
            repository,
            _criteria: PhantomData,
        }
    }

    /// All entities matching `criteria`. A range with `min > max` is not an
    /// error; it matches nothing.
    #[instrument(skip(self), level = "debug")]
    pub async fn find_by_criteria(&self, criteria: &C) -> Result<Vec<C::Target>> {
        let predicate = criteria.predicate();
        let items = self.repository.find_all_matching(&predicate).await?;
        debug!(matched = items.len(), "Criteria query completed");
        Ok(items)
    }

    /// One page of the entities matching `criteria`, plus the total count.
    #[instrument(skip(self), level = "debug")]
    pub async fn find_by_criteria_paged(
        &self,
        criteria: &C,
        page_request: PageRequest,
    ) -> Result<Page<C::Target>> {
        let predicate = criteria.predicate();
        let page = self
            .repository
            .find_page_matching(&predicate, page_request)
            .await?;
        debug!(
            returned = page.items.len(),
            total = page.total,
            "Paged criteria query completed"
        );
        Ok(page)
    }

    #[instrument(skip(self), level = "debug")]
    pub async fn count_by_criteria(&self, criteria: &C) -> Result<u64> {
        self.repository
            .count_matching(&criteria.predicate())
            .await
    }
}

impl<C: Criteria> Clone for CriteriaQueryService<C> {
    fn clone(&self) -> Self {
        Self::new(Arc::clone(&self.repository))
    }
}

pub type ArtistQueryService = CriteriaQueryService<ArtistCriteria>;
pub type AlbumQueryService = CriteriaQueryService<AlbumCriteria>;
pub type SongQueryService = CriteriaQueryService<SongCriteria>;
pub type FavouriteQueryService = CriteriaQueryService<FavouriteCriteria>;
