//! Session/collection controller. Owns the signed-in identity, its resumes, the open
//! resume and the current screen.
//!
//! Steps: `no_session → dashboard ⇄ choosing_template → editing → dashboard`.
//! Every transition that changes the collection writes the whole collection through the
//! vault before returning. A failed write is logged and the in-memory state stays
//! authoritative for the rest of the session.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::editor::edits::{EditError, ResumeEdit};
use crate::editor::mutation::{mutate, newest_stamp, stamp, MutationError};
use crate::models::resume::{Id, Resume, ResumeSummary, TemplateId};
use crate::models::seed::new_resume;
use crate::session::SessionContext;
use crate::storage::ResumeVault;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    NoSession,
    Dashboard,
    ChoosingTemplate,
    Editing,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Email must not be empty")]
    EmptyIdentity,

    #[error("Cannot {action} from {step:?}")]
    InvalidTransition { step: Step, action: &'static str },

    #[error("Resume {0} not found")]
    ResumeNotFound(Id),

    #[error(transparent)]
    Edit(#[from] EditError),
}

impl From<MutationError> for SessionError {
    fn from(e: MutationError) -> Self {
        match e {
            MutationError::ResumeNotFound(id) => SessionError::ResumeNotFound(id),
            MutationError::Edit(e) => SessionError::Edit(e),
        }
    }
}

struct Session {
    ctx: SessionContext,
    resumes: Vec<Arc<Resume>>,
    active: Option<Id>,
    step: Step,
}

impl Session {
    fn active_resume(&self) -> Option<&Arc<Resume>> {
        let id = self.active.as_ref()?;
        self.resumes.iter().find(|r| &r.id == id)
    }

    /// An editing session whose resume has disappeared shows the dashboard.
    fn effective_step(&self) -> Step {
        if self.step == Step::Editing && self.active_resume().is_none() {
            Step::Dashboard
        } else {
            self.step
        }
    }
}

/// Serializable snapshot of the controller for the client.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub step: Step,
    pub email: Option<String>,
    pub resumes: Vec<ResumeSummary>,
    pub active: Option<Resume>,
}

pub struct SessionController {
    vault: ResumeVault,
    session: Option<Session>,
}

impl SessionController {
    pub fn new(vault: ResumeVault) -> Self {
        Self {
            vault,
            session: None,
        }
    }

    /// Signs the remembered user back in. Run once at startup.
    pub async fn restore(&mut self) -> Option<String> {
        if self.session.is_some() {
            return None;
        }
        let ctx = self.vault.last_user().await?;
        let email = ctx.email().to_string();
        self.begin(ctx).await;
        info!("Resumed session for {email}");
        Some(email)
    }

    pub async fn sign_in(&mut self, email: &str) -> Result<(), SessionError> {
        self.require(&[Step::NoSession], "sign in")?;
        let ctx = SessionContext::start(email).ok_or(SessionError::EmptyIdentity)?;
        info!("Signing in {}", ctx.email());
        self.begin(ctx).await;
        Ok(())
    }

    async fn begin(&mut self, ctx: SessionContext) {
        let resumes = self.vault.load(&ctx).await.into_iter().map(Arc::new).collect();
        if let Err(e) = self.vault.remember_last_user(&ctx).await {
            warn!("Could not remember last user {}: {e}", ctx.email());
        }
        self.session = Some(Session {
            ctx,
            resumes,
            active: None,
            step: Step::Dashboard,
        });
    }

    /// Drops the in-memory session. Stored resumes for the identity are left in place.
    pub async fn sign_out(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        if let Err(e) = self.vault.forget_last_user().await {
            warn!("Could not clear last user: {e}");
        }
        info!("Signed out {}", session.ctx.end());
    }

    pub fn create_new(&mut self) -> Result<(), SessionError> {
        self.require(&[Step::Dashboard], "create a resume")?;
        self.session_mut()?.step = Step::ChoosingTemplate;
        Ok(())
    }

    /// Creates a resume from the starter document and opens it.
    pub async fn choose_template(&mut self, template: TemplateId) -> Result<Arc<Resume>, SessionError> {
        self.require(&[Step::ChoosingTemplate], "choose a template")?;
        let session = self.session.as_mut().ok_or(no_session("choose a template"))?;

        let now = stamp(Utc::now());
        let created_at = newest_stamp(&session.resumes).map_or(now, |newest| newest.max(now));
        let resume = Arc::new(new_resume(template, created_at));

        session.resumes.push(Arc::clone(&resume));
        session.active = Some(resume.id.clone());
        session.step = Step::Editing;
        persist(&self.vault, session).await;

        info!("Created resume {} ({})", resume.id, template.as_str());
        Ok(resume)
    }

    pub fn open(&mut self, id: &Id) -> Result<(), SessionError> {
        self.require(&[Step::Dashboard], "open a resume")?;
        let session = self.session_mut()?;
        if !session.resumes.iter().any(|r| &r.id == id) {
            return Err(SessionError::ResumeNotFound(id.clone()));
        }
        session.active = Some(id.clone());
        session.step = Step::Editing;
        Ok(())
    }

    pub fn back(&mut self) -> Result<(), SessionError> {
        self.require(&[Step::ChoosingTemplate, Step::Editing], "go back")?;
        let session = self.session_mut()?;
        session.active = None;
        session.step = Step::Dashboard;
        Ok(())
    }

    pub async fn delete(&mut self, id: &Id) -> Result<(), SessionError> {
        self.require(&[Step::Dashboard, Step::Editing], "delete a resume")?;
        let session = self.session.as_mut().ok_or(no_session("delete a resume"))?;

        let index = session
            .resumes
            .iter()
            .position(|r| &r.id == id)
            .ok_or_else(|| SessionError::ResumeNotFound(id.clone()))?;
        session.resumes.remove(index);
        if session.active.as_ref() == Some(id) {
            session.active = None;
            session.step = Step::Dashboard;
        }
        persist(&self.vault, session).await;

        info!("Deleted resume {id}");
        Ok(())
    }

    /// Applies one edit to the open resume.
    pub async fn edit(&mut self, edit: ResumeEdit) -> Result<Arc<Resume>, SessionError> {
        self.require(&[Step::Editing], "edit")?;
        let id = self
            .session
            .as_ref()
            .and_then(|s| s.active.clone())
            .ok_or(no_session("edit"))?;
        self.apply_to(&id, edit).await
    }

    /// Applies one edit to a specific resume regardless of the current step. Used to land
    /// results of requests that finished after the user navigated away.
    pub async fn apply_to(&mut self, id: &Id, edit: ResumeEdit) -> Result<Arc<Resume>, SessionError> {
        let session = self.session.as_mut().ok_or(no_session("edit"))?;
        let mutated = mutate(&session.resumes, id, |r| edit.apply(r))?;
        session.resumes = mutated.collection;
        persist(&self.vault, session).await;
        Ok(mutated.resume)
    }

    pub fn step(&self) -> Step {
        self.session
            .as_ref()
            .map_or(Step::NoSession, Session::effective_step)
    }

    pub fn context(&self) -> Option<&SessionContext> {
        self.session.as_ref().map(|s| &s.ctx)
    }

    /// Resumes in storage order.
    pub fn resumes(&self) -> &[Arc<Resume>] {
        self.session.as_ref().map_or(&[], |s| s.resumes.as_slice())
    }

    pub fn active(&self) -> Option<Arc<Resume>> {
        self.session.as_ref()?.active_resume().cloned()
    }

    /// The open resume, or an `InvalidTransition` naming `action` if nothing is open.
    pub fn open_resume(&self, action: &'static str) -> Result<Arc<Resume>, SessionError> {
        let step = self.step();
        match (step, self.active()) {
            (Step::Editing, Some(resume)) => Ok(resume),
            _ => Err(SessionError::InvalidTransition { step, action }),
        }
    }

    /// Dashboard listing, most recently modified first.
    pub fn dashboard(&self) -> Vec<ResumeSummary> {
        let mut cards: Vec<ResumeSummary> = self
            .resumes()
            .iter()
            .map(|r| ResumeSummary::from(r.as_ref()))
            .collect();
        cards.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
        cards
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            step: self.step(),
            email: self.context().map(|c| c.email().to_string()),
            resumes: self.dashboard(),
            active: self.active().map(|r| Resume::clone(&r)),
        }
    }

    fn require(&self, allowed: &[Step], action: &'static str) -> Result<(), SessionError> {
        let step = self.step();
        if allowed.contains(&step) {
            Ok(())
        } else {
            Err(SessionError::InvalidTransition { step, action })
        }
    }

    fn session_mut(&mut self) -> Result<&mut Session, SessionError> {
        self.session.as_mut().ok_or(no_session("continue"))
    }
}

fn no_session(action: &'static str) -> SessionError {
    SessionError::InvalidTransition {
        step: Step::NoSession,
        action,
    }
}

async fn persist(vault: &ResumeVault, session: &Session) {
    if let Err(e) = vault.save(&session.ctx, &session.resumes).await {
        warn!(
            "Could not save {} resumes for {}: {e}; keeping in-memory state",
            session.resumes.len(),
            session.ctx.email()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStore;
    use crate::storage::{KvStore, StorageError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts writes to the resumes key.
    #[derive(Default)]
    struct CountingStore {
        inner: MemoryStore,
        collection_writes: AtomicUsize,
    }

    #[async_trait]
    impl KvStore for CountingStore {
        async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get(key).await
        }
        async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            if key.starts_with("resumes-") {
                self.collection_writes.fetch_add(1, Ordering::SeqCst);
            }
            self.inner.set(key, value).await
        }
        async fn remove(&self, key: &str) -> Result<(), StorageError> {
            self.inner.remove(key).await
        }
    }

    fn controller() -> (SessionController, Arc<CountingStore>) {
        let store = Arc::new(CountingStore::default());
        (SessionController::new(ResumeVault::new(store.clone())), store)
    }

    async fn signed_in_with_resume(template: TemplateId) -> (SessionController, Arc<CountingStore>, Id) {
        let (mut c, store) = controller();
        c.sign_in("a@x.com").await.unwrap();
        c.create_new().unwrap();
        let resume = c.choose_template(template).await.unwrap();
        (c, store, resume.id.clone())
    }

    #[tokio::test]
    async fn test_sign_in_edit_sign_out_sign_in_restores_data() {
        let (mut c, _, _) = signed_in_with_resume(TemplateId::Modern).await;
        c.edit(ResumeEdit::SetFullName {
            value: "Jane Doe".into(),
        })
        .await
        .unwrap();

        c.sign_out().await;
        assert_eq!(c.step(), Step::NoSession);
        assert!(c.resumes().is_empty());

        c.sign_in("a@x.com").await.unwrap();
        let resumes = c.resumes();
        assert_eq!(resumes.len(), 1);
        assert_eq!(resumes[0].personal_details.full_name, "Jane Doe");
        assert_eq!(resumes[0].template_id, TemplateId::Modern);
    }

    #[tokio::test]
    async fn test_sign_out_and_back_in_reproduces_resumes_exactly() {
        let (mut c, _, _) = signed_in_with_resume(TemplateId::Classic).await;
        c.edit(ResumeEdit::SetSummary { value: "s".into() })
            .await
            .unwrap();
        let before: Vec<Resume> = c.resumes().iter().map(|r| Resume::clone(r)).collect();

        c.sign_out().await;
        c.sign_in("a@x.com").await.unwrap();
        let after: Vec<Resume> = c.resumes().iter().map(|r| Resume::clone(r)).collect();
        assert_eq!(after, before);
    }

    #[tokio::test]
    async fn test_restore_uses_last_user_until_sign_out() {
        let store: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
        let mut first = SessionController::new(ResumeVault::new(store.clone()));
        first.sign_in("a@x.com").await.unwrap();

        let mut second = SessionController::new(ResumeVault::new(store.clone()));
        assert_eq!(second.restore().await.as_deref(), Some("a@x.com"));
        assert_eq!(second.step(), Step::Dashboard);

        second.sign_out().await;
        let mut third = SessionController::new(ResumeVault::new(store));
        assert_eq!(third.restore().await, None);
        assert_eq!(third.step(), Step::NoSession);
    }

    #[tokio::test]
    async fn test_blank_email_is_rejected() {
        let (mut c, _) = controller();
        assert!(matches!(c.sign_in("   ").await, Err(SessionError::EmptyIdentity)));
        assert_eq!(c.step(), Step::NoSession);
    }

    #[tokio::test]
    async fn test_create_requires_choosing_template_first() {
        let (mut c, _) = controller();
        c.sign_in("a@x.com").await.unwrap();
        let err = c.choose_template(TemplateId::Classic).await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::InvalidTransition {
                step: Step::Dashboard,
                ..
            }
        ));
        c.create_new().unwrap();
        assert_eq!(c.step(), Step::ChoosingTemplate);
        c.choose_template(TemplateId::Classic).await.unwrap();
        assert_eq!(c.step(), Step::Editing);
        assert_eq!(c.active().unwrap().template_id, TemplateId::Classic);
    }

    #[tokio::test]
    async fn test_new_resume_is_fresh_and_not_older_than_collection() {
        let (mut c, _, first) = signed_in_with_resume(TemplateId::Modern).await;
        let newest_before = newest_stamp(c.resumes()).unwrap();
        c.back().unwrap();
        c.create_new().unwrap();
        let second = c.choose_template(TemplateId::Classic).await.unwrap();

        assert_ne!(second.id, first);
        assert!(second.last_modified >= newest_before);
        assert_eq!(second.personal_details.full_name, "Your Name");
        assert_eq!(second.skills.len(), 8);
    }

    #[tokio::test]
    async fn test_each_collection_change_writes_once() {
        let (mut c, store, id) = signed_in_with_resume(TemplateId::Modern).await;
        assert_eq!(store.collection_writes.load(Ordering::SeqCst), 1);

        c.edit(ResumeEdit::SetSummary { value: "s".into() })
            .await
            .unwrap();
        assert_eq!(store.collection_writes.load(Ordering::SeqCst), 2);

        c.back().unwrap();
        c.open(&id).unwrap();
        assert_eq!(store.collection_writes.load(Ordering::SeqCst), 2);

        c.delete(&id).await.unwrap();
        assert_eq!(store.collection_writes.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_deleting_the_only_resume_clears_active() {
        let (mut c, _, id) = signed_in_with_resume(TemplateId::Modern).await;
        assert_eq!(c.step(), Step::Editing);

        c.delete(&id).await.unwrap();
        assert!(c.resumes().is_empty());
        assert!(c.active().is_none());
        assert_eq!(c.step(), Step::Dashboard);
        assert!(matches!(
            c.edit(ResumeEdit::AddContact).await,
            Err(SessionError::InvalidTransition { .. })
        ));
    }

    #[tokio::test]
    async fn test_navigation_does_not_touch_timestamps() {
        let (mut c, _, id) = signed_in_with_resume(TemplateId::Modern).await;
        let stamp = c.active().unwrap().last_modified;
        c.back().unwrap();
        c.open(&id).unwrap();
        let _ = c.view();
        assert_eq!(c.active().unwrap().last_modified, stamp);
    }

    #[tokio::test]
    async fn test_dashboard_sorts_without_reordering_storage() {
        let (mut c, _, first) = signed_in_with_resume(TemplateId::Modern).await;
        c.back().unwrap();
        c.create_new().unwrap();
        let second = c.choose_template(TemplateId::Classic).await.unwrap();
        c.back().unwrap();

        c.open(&first).unwrap();
        c.edit(ResumeEdit::SetJobTitle { value: "CTO".into() })
            .await
            .unwrap();

        let listing = c.dashboard();
        assert_eq!(listing[0].id, first);
        assert_eq!(listing[1].id, second.id);
        assert_eq!(c.resumes()[0].id, first);
        assert_eq!(c.resumes()[1].id, second.id);
    }

    #[tokio::test]
    async fn test_apply_to_missing_resume_reports_not_found() {
        let (mut c, _, _) = signed_in_with_resume(TemplateId::Modern).await;
        let err = c
            .apply_to(&Id::generate(), ResumeEdit::AddEducation)
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::ResumeNotFound(_)));
    }

    #[tokio::test]
    async fn test_failed_save_keeps_in_memory_state() {
        let store: Arc<dyn KvStore> = Arc::new(MemoryStore::with_quota(40));
        let mut c = SessionController::new(ResumeVault::new(store));
        c.sign_in("a@x.com").await.unwrap();
        c.create_new().unwrap();
        c.choose_template(TemplateId::Modern).await.unwrap();

        let updated = c
            .edit(ResumeEdit::SetFullName {
                value: "Jane Doe".into(),
            })
            .await
            .unwrap();
        assert_eq!(updated.personal_details.full_name, "Jane Doe");
        assert_eq!(c.active().unwrap().personal_details.full_name, "Jane Doe");
    }
}
