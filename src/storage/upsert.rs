//! Page-sized batch upsert
//!
//! Every draft is resolved against the stored books by identity key and
//! either updates the match in place or creates a new book. Row failures are
//! logged and skipped; only a failed commit fails the batch.

use crate::storage::traits::{BookStore, StorageResult};
use crate::storage::{DraftRecord, IdentityPolicy};

/// What happened to one draft
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertAction {
    /// A new book was created with this ID
    Created(i64),
    /// The existing book with this ID was overwritten
    Updated(i64),
}

/// Counters for one committed batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub created: usize,
    pub updated: usize,
    pub failed: usize,
}

impl BatchOutcome {
    /// Drafts that were created or updated
    pub fn saved(&self) -> usize {
        self.created + self.updated
    }
}

/// Upserts one page of drafts and commits them as a single transaction
///
/// # Returns
///
/// * `Ok(BatchOutcome)` - The batch committed; `saved()` excludes rejected rows
/// * `Err(StorageError)` - The batch could not be opened or committed and
///   was rolled back; none of its rows were kept
pub fn save_batch<S>(
    store: &mut S,
    drafts: &[DraftRecord],
    policy: IdentityPolicy,
) -> StorageResult<BatchOutcome>
where
    S: BookStore + ?Sized,
{
    store.begin_batch()?;

    let mut outcome = BatchOutcome::default();
    for draft in drafts {
        match upsert_draft(store, draft, policy) {
            Ok(UpsertAction::Created(id)) => {
                tracing::debug!("Created book {} '{}'", id, draft.title);
                outcome.created += 1;
            }
            Ok(UpsertAction::Updated(id)) => {
                tracing::debug!("Updated book {} '{}'", id, draft.title);
                outcome.updated += 1;
            }
            Err(e) => {
                tracing::error!("Failed to save book '{}': {}", draft.title, e);
                outcome.failed += 1;
            }
        }
    }

    if let Err(e) = store.flush().and_then(|()| store.commit_batch()) {
        tracing::error!(
            "Batch commit failed for {} drafts ({} created, {} updated): {}",
            drafts.len(),
            outcome.created,
            outcome.updated,
            e
        );
        if let Err(rollback_err) = store.rollback_batch() {
            tracing::warn!("Rollback after failed commit also failed: {}", rollback_err);
        }
        return Err(e);
    }

    if outcome.saved() > 0 {
        tracing::info!(
            "Committed batch: {} new, {} updated (total: {})",
            outcome.created,
            outcome.updated,
            outcome.saved()
        );
    }

    Ok(outcome)
}

/// Resolves one draft against storage and writes it
pub fn upsert_draft<S>(
    store: &mut S,
    draft: &DraftRecord,
    policy: IdentityPolicy,
) -> StorageResult<UpsertAction>
where
    S: BookStore + ?Sized,
{
    match store.find_by_identity(&policy.key_for(draft))? {
        Some(existing) => {
            store.update_book(existing.id, draft)?;
            Ok(UpsertAction::Updated(existing.id))
        }
        None => Ok(UpsertAction::Created(store.insert_book(draft)?)),
    }
}
