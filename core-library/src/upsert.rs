//! # Natural-key upsert
//!
//! Find-or-create keyed by a natural key, with at most one row per key.
//!
//! The lookup and the insert are separate statements, so two callers can both
//! miss on lookup and both try to insert. The unique index on the key lets
//! exactly one insert through; the other gets
//! [`LibraryError::ConstraintViolation`], re-reads the now-existing row and
//! applies its changes as an update. The violation never reaches the caller
//! unless the key keeps flipping for [`MAX_UPSERT_ATTEMPTS`] rounds.

use crate::error::{LibraryError, Result};
use crate::models::Entity;
use crate::repositories::{EntityRepository, NaturalKeyRepository};
use std::fmt;
use tracing::{debug, warn};

/// Rounds of lookup + write before a constraint violation is surfaced
pub const MAX_UPSERT_ATTEMPTS: u32 = 3;

/// What an upsert did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome<E> {
    Created(E),
    Updated(E),
}

impl<E> UpsertOutcome<E> {
    pub fn entity(&self) -> &E {
        match self {
            UpsertOutcome::Created(e) | UpsertOutcome::Updated(e) => e,
        }
    }

    pub fn into_inner(self) -> E {
        match self {
            UpsertOutcome::Created(e) | UpsertOutcome::Updated(e) => e,
        }
    }

    pub fn was_created(&self) -> bool {
        matches!(self, UpsertOutcome::Created(_))
    }
}

/// Create or update the entity identified by `key`.
///
/// - `create` builds the row to insert when no entity has `key`
/// - `merge` applies the changes to an existing entity
///
/// Both closures may run more than once when a concurrent writer wins the
/// insert, so they must not have side effects.
pub async fn upsert<E, K, R, C, M>(
    repository: &R,
    key: &K,
    create: C,
    merge: M,
) -> Result<UpsertOutcome<E>>
where
    E: Entity,
    K: fmt::Debug + Sync,
    R: EntityRepository<E> + NaturalKeyRepository<E, K> + ?Sized,
    C: Fn() -> E + Send + Sync,
    M: Fn(&mut E) + Send + Sync,
{
    let mut attempt = 0;

    loop {
        attempt += 1;

        if let Some(mut existing) = repository.find_by_natural_key(key).await? {
            merge(&mut existing);
            repository.update(&existing).await?;
            debug!(entity = E::NAME, ?key, attempt, "Upsert updated existing row");
            return Ok(UpsertOutcome::Updated(existing));
        }

        match repository.insert(&create()).await {
            Ok(created) => {
                debug!(entity = E::NAME, ?key, attempt, "Upsert created row");
                return Ok(UpsertOutcome::Created(created));
            }
            Err(LibraryError::ConstraintViolation(reason)) if attempt < MAX_UPSERT_ATTEMPTS => {
                warn!(
                    entity = E::NAME,
                    ?key,
                    attempt,
                    %reason,
                    "Concurrent insert won the natural key, retrying as update"
                );
            }
            Err(e) => return Err(e),
        }
    }
}
