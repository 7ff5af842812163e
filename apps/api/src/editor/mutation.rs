//! Copy-on-write mutation of one resume inside a collection.
//!
//! The collection is a `Vec<Arc<Resume>>`. A mutation clones only the target resume,
//! runs the edit on that clone, and splices it into a new vector whose other elements are
//! the same `Arc`s as before. The input collection is never touched, so a failed edit or a
//! missing target leaves the caller holding exactly what it had.

use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};
use thiserror::Error;

use crate::editor::edits::EditError;
use crate::models::resume::{Id, Resume};

#[derive(Debug, Error)]
pub enum MutationError {
    #[error("Resume {0} not found")]
    ResumeNotFound(Id),

    #[error(transparent)]
    Edit(#[from] EditError),
}

/// Result of a successful mutation: the new collection and the updated resume in it.
#[derive(Debug, Clone)]
pub struct Mutated {
    pub collection: Vec<Arc<Resume>>,
    pub resume: Arc<Resume>,
}

/// Applies `edit` to the resume with `id`, stamping `last_modified` with the current time.
pub fn mutate<F>(collection: &[Arc<Resume>], id: &Id, edit: F) -> Result<Mutated, MutationError>
where
    F: FnOnce(&mut Resume) -> Result<(), EditError>,
{
    mutate_at(collection, id, Utc::now(), edit)
}

/// Same as [`mutate`] with an explicit clock reading.
///
/// The stamp is `max(now, previous)`, so `last_modified` never moves backwards.
pub fn mutate_at<F>(
    collection: &[Arc<Resume>],
    id: &Id,
    now: DateTime<Utc>,
    edit: F,
) -> Result<Mutated, MutationError>
where
    F: FnOnce(&mut Resume) -> Result<(), EditError>,
{
    let index = collection
        .iter()
        .position(|r| &r.id == id)
        .ok_or_else(|| MutationError::ResumeNotFound(id.clone()))?;

    let mut draft = Resume::clone(&collection[index]);
    edit(&mut draft)?;
    // Edits address entries, never the document identity.
    draft.id = id.clone();
    draft.last_modified = stamp(now).max(collection[index].last_modified);

    let resume = Arc::new(draft);
    let mut next = collection.to_vec();
    next[index] = Arc::clone(&resume);

    Ok(Mutated {
        collection: next,
        resume,
    })
}

/// A clock reading cut to the millisecond precision `lastModified` is stored with, so a
/// saved and reloaded resume compares equal to the one in memory.
pub fn stamp(now: DateTime<Utc>) -> DateTime<Utc> {
    now.trunc_subsecs(3)
}

/// Latest `last_modified` in the collection, if any.
pub fn newest_stamp(collection: &[Arc<Resume>]) -> Option<DateTime<Utc>> {
    collection.iter().map(|r| r.last_modified).max()
}
