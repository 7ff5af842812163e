//! Resume vault: loads and saves a signed-in identity's resume collection.
//!
//! Layout in the key/value store:
//! - `last-signed-in-user` → raw email of the most recent sign-in
//! - `resumes-<email>`     → JSON array of resumes
//!
//! Reads never fail. Anything unreadable is copied to `resumes-<email>.unreadable` before
//! the caller gets a chance to overwrite it, and the readable remainder is returned.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, warn};

use crate::models::resume::Resume;
use crate::session::SessionContext;
use crate::storage::{KvStore, StorageError};

pub const LAST_USER_KEY: &str = "last-signed-in-user";
pub const RESUMES_KEY_PREFIX: &str = "resumes-";
const UNREADABLE_SUFFIX: &str = ".unreadable";

pub fn resumes_key(ctx: &SessionContext) -> String {
    format!("{RESUMES_KEY_PREFIX}{}", ctx.email())
}

#[derive(Clone)]
pub struct ResumeVault {
    store: Arc<dyn KvStore>,
}

impl ResumeVault {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Returns the stored collection for `ctx`, or an empty one if nothing usable is stored.
    pub async fn load(&self, ctx: &SessionContext) -> Vec<Resume> {
        let key = resumes_key(ctx);
        let raw = match self.store.get(&key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                error!("Failed to read {key}: {e}");
                return Vec::new();
            }
        };

        let (resumes, damaged) = decode_collection(&raw);
        if damaged {
            self.set_aside(&key, &raw).await;
        }
        debug!("Loaded {} resumes for {}", resumes.len(), ctx.email());
        resumes
    }

    /// Serializes and stores the whole collection, replacing what was there.
    pub async fn save(&self, ctx: &SessionContext, resumes: &[Arc<Resume>]) -> Result<(), StorageError> {
        let docs: Vec<&Resume> = resumes.iter().map(|r| r.as_ref()).collect();
        let payload = serde_json::to_string(&docs)?;
        self.store.set(&resumes_key(ctx), &payload).await?;
        debug!("Saved {} resumes for {}", resumes.len(), ctx.email());
        Ok(())
    }

    pub async fn remember_last_user(&self, ctx: &SessionContext) -> Result<(), StorageError> {
        self.store.set(LAST_USER_KEY, ctx.email()).await
    }

    pub async fn forget_last_user(&self) -> Result<(), StorageError> {
        self.store.remove(LAST_USER_KEY).await
    }

    /// The identity to auto-resume at startup, if one was remembered.
    pub async fn last_user(&self) -> Option<SessionContext> {
        match self.store.get(LAST_USER_KEY).await {
            Ok(Some(email)) => SessionContext::start(&email),
            Ok(None) => None,
            Err(e) => {
                error!("Failed to read {LAST_USER_KEY}: {e}");
                None
            }
        }
    }

    async fn set_aside(&self, key: &str, raw: &str) {
        let aside = format!("{key}{UNREADABLE_SUFFIX}");
        match self.store.set(&aside, raw).await {
            Ok(()) => warn!("Stored data under {key} was partly unreadable; original kept at {aside}"),
            Err(e) => error!("Stored data under {key} was partly unreadable and could not be kept: {e}"),
        }
    }
}

/// Decodes a stored payload element by element. The flag is set when anything was dropped.
fn decode_collection(raw: &str) -> (Vec<Resume>, bool) {
    let items: Vec<Value> = match serde_json::from_str(raw) {
        Ok(items) => items,
        Err(e) => {
            warn!("Stored resume collection is not a JSON array: {e}");
            return (Vec::new(), true);
        }
    };

    let mut damaged = false;
    let mut seen = HashSet::new();
    let mut resumes = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<Resume>(item) {
            Ok(resume) if seen.insert(resume.id.clone()) => resumes.push(resume),
            Ok(resume) => {
                warn!("Dropping duplicate resume {} at index {index}", resume.id);
                damaged = true;
            }
            Err(e) => {
                warn!("Dropping unreadable resume at index {index}: {e}");
                damaged = true;
            }
        }
    }
    (resumes, damaged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::TemplateId;
    use crate::models::seed::new_resume;
    use crate::storage::memory::MemoryStore;
    use chrono::{TimeZone, Utc};

    fn ctx(email: &str) -> SessionContext {
        SessionContext::start(email).unwrap()
    }

    fn vault() -> (ResumeVault, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (ResumeVault::new(store.clone()), store)
    }

    fn sample(n: usize) -> Vec<Arc<Resume>> {
        (0..n)
            .map(|i| {
                let stamp = Utc.timestamp_millis_opt(1_700_000_000_000 + i as i64).unwrap();
                Arc::new(new_resume(TemplateId::Classic, stamp))
            })
            .collect()
    }

    #[tokio::test]
    async fn test_round_trip_preserves_collection() {
        let (vault, _) = vault();
        let a = ctx("a@x.com");
        let resumes = sample(3);

        vault.save(&a, &resumes).await.unwrap();
        let loaded = vault.load(&a).await;

        let expected: Vec<Resume> = resumes.iter().map(|r| Resume::clone(r)).collect();
        assert_eq!(loaded, expected);
    }

    #[tokio::test]
    async fn test_saving_twice_is_idempotent() {
        let (vault, store) = vault();
        let a = ctx("a@x.com");
        let resumes = sample(2);

        vault.save(&a, &resumes).await.unwrap();
        let first = store.get("resumes-a@x.com").await.unwrap();
        vault.save(&a, &resumes).await.unwrap();
        let second = store.get("resumes-a@x.com").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(vault.load(&a).await.len(), 2);
    }

    #[tokio::test]
    async fn test_collections_are_namespaced_by_identity() {
        let (vault, _) = vault();
        vault.save(&ctx("a@x.com"), &sample(2)).await.unwrap();
        assert!(vault.load(&ctx("b@x.com")).await.is_empty());
        assert_eq!(vault.load(&ctx("a@x.com")).await.len(), 2);
    }

    #[tokio::test]
    async fn test_malformed_payload_loads_empty_and_is_kept() {
        let (vault, store) = vault();
        store.set("resumes-a@x.com", "{oops").await.unwrap();

        assert!(vault.load(&ctx("a@x.com")).await.is_empty());
        assert_eq!(
            store.get("resumes-a@x.com.unreadable").await.unwrap().as_deref(),
            Some("{oops")
        );
    }

    #[tokio::test]
    async fn test_readable_entries_survive_a_bad_sibling() {
        let (vault, store) = vault();
        let good = serde_json::to_value(sample(1)[0].as_ref()).unwrap();
        let payload = serde_json::json!([good, {"id": "r2", "lastModified": "yesterday"}]).to_string();
        store.set("resumes-a@x.com", &payload).await.unwrap();

        let loaded = vault.load(&ctx("a@x.com")).await;
        assert_eq!(loaded.len(), 1);
        assert!(store.get("resumes-a@x.com.unreadable").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_ids_from_other_writers_load_unchanged() {
        let (vault, store) = vault();
        let payload = r#"[{"id":"r1","lastModified":1700000000000,"workExperience":[{"id":"e1"},{"id":"e2"}]}]"#;
        store.set("resumes-a@x.com", payload).await.unwrap();

        let loaded = vault.load(&ctx("a@x.com")).await;
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id.as_str(), "r1");
        assert_eq!(loaded[0].work_experience[1].id.as_str(), "e2");
        assert!(store.get("resumes-a@x.com.unreadable").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_last_user_pointer() {
        let (vault, _) = vault();
        assert!(vault.last_user().await.is_none());

        vault.remember_last_user(&ctx("a@x.com")).await.unwrap();
        assert_eq!(vault.last_user().await.unwrap().email(), "a@x.com");

        vault.forget_last_user().await.unwrap();
        assert!(vault.last_user().await.is_none());
    }

    #[tokio::test]
    async fn test_quota_failure_is_reported() {
        let store = Arc::new(MemoryStore::with_quota(64));
        let vault = ResumeVault::new(store);
        let err = vault.save(&ctx("a@x.com"), &sample(1)).await.unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { .. }));
    }
}
