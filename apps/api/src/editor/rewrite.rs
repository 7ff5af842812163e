//! AI rewrite of the summary or a single work-experience description.
//!
//! The refiner never decides what happens to the resume. [`rewrite_field`] reads the text
//! under the session lock, releases it while the model is working, and lands the result
//! as an ordinary edit on the resume it was requested for. A failed rewrite leaves the
//! text and its timestamp untouched.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::editor::edits::{EditError, ExperienceField, ResumeEdit};
use crate::editor::prompts::build_rewrite_prompt;
use crate::editor::requests::{self, AlreadyInFlight, RequestKey, SharedTracker};
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{LlmClient, LlmError};
use crate::models::resume::{Id, Resume};
use crate::session::{SessionController, SessionError};

// ────────────────────────────────────────────────────────────────────────────
// Targets
// ────────────────────────────────────────────────────────────────────────────

/// Which field a rewrite applies to. Body of `POST /api/v1/editor/rewrite`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "field", rename_all = "camelCase")]
pub enum RewriteTarget {
    Summary,
    WorkDescription {
        #[serde(rename = "entryId")]
        entry_id: Id,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteKind {
    Summary,
    WorkDescription,
}

impl RewriteTarget {
    pub fn kind(&self) -> RewriteKind {
        match self {
            RewriteTarget::Summary => RewriteKind::Summary,
            RewriteTarget::WorkDescription { .. } => RewriteKind::WorkDescription,
        }
    }

    fn current_text(&self, resume: &Resume) -> Result<String, EditError> {
        match self {
            RewriteTarget::Summary => Ok(resume.summary.clone()),
            RewriteTarget::WorkDescription { entry_id } => resume
                .experience(entry_id)
                .map(|e| e.description.clone())
                .ok_or_else(|| EditError::EntryNotFound {
                    kind: "experience",
                    id: entry_id.clone(),
                }),
        }
    }

    fn edit(&self, value: String) -> ResumeEdit {
        match self {
            RewriteTarget::Summary => ResumeEdit::SetSummary { value },
            RewriteTarget::WorkDescription { entry_id } => ResumeEdit::UpdateExperience {
                id: entry_id.clone(),
                field: ExperienceField::Description,
                value,
            },
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Refiner trait
// ────────────────────────────────────────────────────────────────────────────

/// Text-improvement backend. Carried in `AppState` as `Arc<dyn TextRefiner>`.
#[async_trait]
pub trait TextRefiner: Send + Sync {
    async fn refine(&self, kind: RewriteKind, text: &str) -> Result<String, LlmError>;
}

#[derive(Debug, Deserialize)]
struct RefinedText {
    refined_text: String,
}

/// Production refiner backed by the Anthropic Messages API.
pub struct LlmRefiner {
    llm: LlmClient,
}

impl LlmRefiner {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl TextRefiner for LlmRefiner {
    async fn refine(&self, kind: RewriteKind, text: &str) -> Result<String, LlmError> {
        let prompt = build_rewrite_prompt(kind, text);
        let refined: RefinedText = self.llm.complete_json(JSON_ONLY_SYSTEM, &prompt).await?;
        if refined.refined_text.trim().is_empty() {
            return Err(LlmError::EmptyContent);
        }
        Ok(refined.refined_text)
    }
}

/// Outcome of asking the refiner. `fell_back` means `text` is the unchanged input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub text: String,
    pub fell_back: bool,
}

/// Asks `refiner` for a better version of `text`; any failure returns `text` as-is.
pub async fn rewrite_or_original(refiner: &dyn TextRefiner, kind: RewriteKind, text: &str) -> Rewrite {
    match refiner.refine(kind, text).await {
        Ok(refined) => Rewrite {
            text: refined,
            fell_back: false,
        },
        Err(e) => {
            warn!("Rewrite of {kind:?} failed, keeping original text: {e}");
            Rewrite {
                text: text.to_string(),
                fell_back: true,
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Editor operation
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum RewriteError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    InFlight(#[from] AlreadyInFlight),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RewriteOutcome {
    pub target: RewriteTarget,
    pub applied: bool,
    pub text: String,
    /// The updated resume when the rewrite was applied.
    pub resume: Option<Resume>,
}

/// Rewrites one field of the open resume.
pub async fn rewrite_field(
    session: &Mutex<SessionController>,
    refiner: &dyn TextRefiner,
    tracker: &SharedTracker,
    target: RewriteTarget,
) -> Result<RewriteOutcome, RewriteError> {
    let (resume_id, original) = {
        let resume = session.lock().await.open_resume("rewrite")?;
        let text = target.current_text(&resume).map_err(SessionError::from)?;
        (resume.id.clone(), text)
    };

    let key = RequestKey::Rewrite {
        resume_id: resume_id.clone(),
        target: target.clone(),
    };
    let guard = requests::start(tracker, key)?;
    let rewrite = rewrite_or_original(refiner, target.kind(), &original).await;

    if rewrite.fell_back {
        guard.fail();
        return Ok(RewriteOutcome {
            target,
            applied: false,
            text: original,
            resume: None,
        });
    }

    let applied = session
        .lock()
        .await
        .apply_to(&resume_id, target.edit(rewrite.text.clone()))
        .await;
    match applied {
        Ok(resume) => {
            guard.succeed();
            info!("Applied rewrite of {target:?} to resume {resume_id}");
            Ok(RewriteOutcome {
                target,
                applied: true,
                text: rewrite.text,
                resume: Some(Resume::clone(&resume)),
            })
        }
        Err(e) => {
            guard.fail();
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::requests::{RequestStatus, RequestTracker};
    use crate::models::resume::TemplateId;
    use crate::storage::memory::MemoryStore;
    use crate::storage::ResumeVault;
    use std::sync::Arc;
    use tokio::sync::Semaphore;

    struct FailingRefiner;

    #[async_trait]
    impl TextRefiner for FailingRefiner {
        async fn refine(&self, _kind: RewriteKind, _text: &str) -> Result<String, LlmError> {
            Err(LlmError::Api {
                status: 503,
                message: "unavailable".into(),
            })
        }
    }

    struct ShoutingRefiner;

    #[async_trait]
    impl TextRefiner for ShoutingRefiner {
        async fn refine(&self, _kind: RewriteKind, text: &str) -> Result<String, LlmError> {
            Ok(text.to_uppercase())
        }
    }

    /// Holds each call until a permit is released.
    struct GatedRefiner {
        gate: Semaphore,
    }

    #[async_trait]
    impl TextRefiner for GatedRefiner {
        async fn refine(&self, _kind: RewriteKind, text: &str) -> Result<String, LlmError> {
            let _permit = self.gate.acquire().await.map_err(|_| LlmError::EmptyContent)?;
            Ok(format!("- {text}"))
        }
    }

    async fn editing_session() -> (Arc<Mutex<SessionController>>, Resume) {
        let store = Arc::new(MemoryStore::new());
        let mut controller = SessionController::new(ResumeVault::new(store));
        controller.sign_in("a@x.com").await.unwrap();
        controller.create_new().unwrap();
        let resume = controller.choose_template(TemplateId::Modern).await.unwrap();
        (Arc::new(Mutex::new(controller)), Resume::clone(&resume))
    }

    #[tokio::test]
    async fn test_failed_rewrites_leave_both_entries_unchanged() {
        let (session, before) = editing_session().await;
        let tracker = RequestTracker::shared();
        let e1 = before.work_experience[0].id.clone();
        let e2 = before.work_experience[1].id.clone();

        for entry_id in [e1.clone(), e2.clone()] {
            let outcome = rewrite_field(
                &session,
                &FailingRefiner,
                &tracker,
                RewriteTarget::WorkDescription { entry_id },
            )
            .await
            .unwrap();
            assert!(!outcome.applied);
        }

        let after = session.lock().await.active().unwrap();
        assert_eq!(after.work_experience, before.work_experience);
        assert_eq!(after.last_modified, before.last_modified);

        let tracker = tracker.lock().unwrap();
        assert_eq!(tracker.in_flight(), 0);
        for entry_id in [e1, e2] {
            let key = RequestKey::Rewrite {
                resume_id: before.id.clone(),
                target: RewriteTarget::WorkDescription { entry_id },
            };
            assert_eq!(tracker.status(&key), RequestStatus::Failed);
        }
    }

    #[tokio::test]
    async fn test_successful_rewrite_is_applied_as_an_edit() {
        let (session, before) = editing_session().await;
        let tracker = RequestTracker::shared();

        let outcome = rewrite_field(&session, &ShoutingRefiner, &tracker, RewriteTarget::Summary)
            .await
            .unwrap();

        assert!(outcome.applied);
        let after = session.lock().await.active().unwrap();
        assert_eq!(after.summary, before.summary.to_uppercase());
        assert!(after.last_modified >= before.last_modified);
        assert_eq!(after.work_experience, before.work_experience);
    }

    #[tokio::test]
    async fn test_unknown_entry_is_rejected_before_calling_refiner() {
        let (session, _) = editing_session().await;
        let tracker = RequestTracker::shared();
        let err = rewrite_field(
            &session,
            &ShoutingRefiner,
            &tracker,
            RewriteTarget::WorkDescription {
                entry_id: Id::generate(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RewriteError::Session(SessionError::Edit(_))));
        assert!(tracker.lock().unwrap().snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_in_flight_key_is_refused_and_result_lands_after_navigation() {
        let (session, before) = editing_session().await;
        let tracker = RequestTracker::shared();
        let refiner = Arc::new(GatedRefiner {
            gate: Semaphore::new(0),
        });
        let e1 = before.work_experience[0].id.clone();
        let target = RewriteTarget::WorkDescription { entry_id: e1.clone() };

        let task = {
            let (session, tracker, refiner) = (session.clone(), tracker.clone(), refiner.clone());
            let target = target.clone();
            tokio::spawn(async move { rewrite_field(&session, refiner.as_ref(), &tracker, target).await })
        };
        while tracker.lock().unwrap().in_flight() == 0 {
            tokio::task::yield_now().await;
        }

        let second = rewrite_field(&session, refiner.as_ref(), &tracker, target).await;
        assert!(matches!(second, Err(RewriteError::InFlight(_))));

        session.lock().await.back().unwrap();
        refiner.gate.add_permits(1);
        let outcome = task.await.unwrap().unwrap();
        assert!(outcome.applied);

        let controller = session.lock().await;
        let stored = controller.resumes().iter().find(|r| r.id == before.id).unwrap();
        assert_eq!(
            stored.experience(&e1).unwrap().description,
            format!("- {}", before.work_experience[0].description)
        );
        assert_eq!(stored.work_experience[1], before.work_experience[1]);
    }

    #[tokio::test]
    async fn test_rewrite_requires_an_open_resume() {
        let (session, _) = editing_session().await;
        session.lock().await.back().unwrap();
        let err = rewrite_field(
            &session,
            &ShoutingRefiner,
            &RequestTracker::shared(),
            RewriteTarget::Summary,
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            RewriteError::Session(SessionError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_target_wire_format() {
        let target: RewriteTarget =
            serde_json::from_value(serde_json::json!({"field": "workDescription", "entryId": "e1"}))
                .unwrap();
        assert_eq!(
            target,
            RewriteTarget::WorkDescription {
                entry_id: Id::from("e1")
            }
        );
        let summary: RewriteTarget =
            serde_json::from_value(serde_json::json!({"field": "summary"})).unwrap();
        assert_eq!(summary.kind(), RewriteKind::Summary);
    }
}
