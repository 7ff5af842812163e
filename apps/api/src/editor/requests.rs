//! Request tracker for the editor's long-running calls (AI rewrite, export).
//!
//! Each call is identified by a stable [`RequestKey`]. Starting a key that is already in
//! flight is refused, which is the server-side equivalent of a disabled button. Distinct
//! keys run independently, so two experience entries can be rewritten at the same time.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::editor::rewrite::RewriteTarget;
use crate::models::resume::Id;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RequestKey {
    Rewrite {
        #[serde(rename = "resumeId")]
        resume_id: Id,
        target: RewriteTarget,
    },
    Export {
        #[serde(rename = "resumeId")]
        resume_id: Id,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Idle,
    InFlight,
    Done,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrackedRequest {
    pub key: RequestKey,
    pub status: RequestStatus,
}

#[derive(Debug, Error)]
#[error("A request for {0:?} is already in flight")]
pub struct AlreadyInFlight(pub RequestKey);

#[derive(Debug, Default)]
pub struct RequestTracker {
    statuses: HashMap<RequestKey, RequestStatus>,
}

pub type SharedTracker = Arc<Mutex<RequestTracker>>;

impl RequestTracker {
    pub fn shared() -> SharedTracker {
        Arc::new(Mutex::new(Self::default()))
    }

    /// Keys that were never started report `Idle`.
    pub fn status(&self, key: &RequestKey) -> RequestStatus {
        self.statuses.get(key).copied().unwrap_or(RequestStatus::Idle)
    }

    pub fn in_flight(&self) -> usize {
        self.statuses
            .values()
            .filter(|s| **s == RequestStatus::InFlight)
            .count()
    }

    pub fn snapshot(&self) -> Vec<TrackedRequest> {
        self.statuses
            .iter()
            .map(|(key, status)| TrackedRequest {
                key: key.clone(),
                status: *status,
            })
            .collect()
    }

    fn begin(&mut self, key: RequestKey) -> Result<(), AlreadyInFlight> {
        if self.status(&key) == RequestStatus::InFlight {
            return Err(AlreadyInFlight(key));
        }
        self.statuses.insert(key, RequestStatus::InFlight);
        Ok(())
    }

    fn finish(&mut self, key: RequestKey, status: RequestStatus) {
        self.statuses.insert(key, status);
    }
}

fn lock(tracker: &SharedTracker) -> MutexGuard<'_, RequestTracker> {
    tracker.lock().unwrap_or_else(|e| e.into_inner())
}

/// Marks `key` in flight and returns a guard that settles it.
pub fn start(tracker: &SharedTracker, key: RequestKey) -> Result<InFlight, AlreadyInFlight> {
    lock(tracker).begin(key.clone())?;
    debug!("Request {key:?} started");
    Ok(InFlight {
        tracker: Arc::clone(tracker),
        key,
        settled: false,
    })
}

/// Settles its request on `succeed`/`fail`. Dropped unsettled (the awaiting future was
/// abandoned) it marks the request failed, so no key stays in flight forever.
#[must_use]
pub struct InFlight {
    tracker: SharedTracker,
    key: RequestKey,
    settled: bool,
}

impl InFlight {
    pub fn succeed(mut self) {
        self.settle(RequestStatus::Done);
    }

    pub fn fail(mut self) {
        self.settle(RequestStatus::Failed);
    }

    fn settle(&mut self, status: RequestStatus) {
        self.settled = true;
        lock(&self.tracker).finish(self.key.clone(), status);
        debug!("Request {:?} finished: {status:?}", self.key);
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if !self.settled {
            warn!("Request {:?} was abandoned before finishing", self.key);
            self.settle(RequestStatus::Failed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rewrite_key(resume_id: &str, entry_id: &str) -> RequestKey {
        RequestKey::Rewrite {
            resume_id: Id::from(resume_id),
            target: RewriteTarget::WorkDescription {
                entry_id: Id::from(entry_id),
            },
        }
    }

    #[test]
    fn test_same_key_is_refused_while_in_flight() {
        let tracker = RequestTracker::shared();
        let key = RequestKey::Export {
            resume_id: Id::generate(),
        };

        let guard = start(&tracker, key.clone()).unwrap();
        assert!(start(&tracker, key.clone()).is_err());
        guard.succeed();

        assert_eq!(lock(&tracker).status(&key), RequestStatus::Done);
        start(&tracker, key.clone()).unwrap().fail();
        assert_eq!(lock(&tracker).status(&key), RequestStatus::Failed);
    }

    #[test]
    fn test_distinct_keys_are_independent() {
        let tracker = RequestTracker::shared();
        let e1 = rewrite_key("r1", "e1");
        let e2 = rewrite_key("r1", "e2");

        let g1 = start(&tracker, e1.clone()).unwrap();
        let g2 = start(&tracker, e2.clone()).unwrap();
        assert_eq!(lock(&tracker).in_flight(), 2);

        g2.fail();
        assert_eq!(lock(&tracker).status(&e1), RequestStatus::InFlight);
        assert_eq!(lock(&tracker).status(&e2), RequestStatus::Failed);
        g1.succeed();
        assert_eq!(lock(&tracker).in_flight(), 0);
    }

    #[test]
    fn test_dropped_guard_marks_failed() {
        let tracker = RequestTracker::shared();
        let key = rewrite_key("r1", "e1");
        {
            let _guard = start(&tracker, key.clone()).unwrap();
        }
        assert_eq!(lock(&tracker).status(&key), RequestStatus::Failed);
    }

    #[test]
    fn test_unknown_key_is_idle() {
        let tracker = RequestTracker::default();
        let key = RequestKey::Export {
            resume_id: Id::generate(),
        };
        assert_eq!(tracker.status(&key), RequestStatus::Idle);
        assert!(tracker.snapshot().is_empty());
    }

    #[test]
    fn test_snapshot_serializes_with_tags() {
        let tracker = RequestTracker::shared();
        let resume_id = Id::generate();
        start(&tracker, RequestKey::Rewrite {
            resume_id: resume_id.clone(),
            target: RewriteTarget::Summary,
        })
        .unwrap()
        .succeed();

        let json = serde_json::to_value(lock(&tracker).snapshot()).unwrap();
        assert_eq!(json[0]["key"]["kind"], "rewrite");
        assert_eq!(json[0]["key"]["resumeId"], resume_id.to_string());
        assert_eq!(json[0]["key"]["target"]["field"], "summary");
        assert_eq!(json[0]["status"], "done");
    }
}
