use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::extract::{AppJson, AppPath};
use crate::models::resume::{Id, Resume, ResumeSummary, TemplateId};
use crate::models::seed::{DEFAULT_THEME_COLOR, THEME_COLORS};
use crate::session::{SessionError, SessionView, Step};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SignInRequest {
    pub email: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateResumeRequest {
    pub template_id: TemplateId,
}

#[derive(Serialize)]
pub struct TemplateInfo {
    pub id: TemplateId,
    pub name: &'static str,
    pub description: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateCatalog {
    pub templates: Vec<TemplateInfo>,
    pub theme_colors: &'static [&'static str],
    pub default_theme_color: &'static str,
}

/// GET /api/v1/templates
pub async fn handle_templates() -> Json<TemplateCatalog> {
    Json(TemplateCatalog {
        templates: TemplateId::ALL
            .iter()
            .map(|t| TemplateInfo {
                id: *t,
                name: t.display_name(),
                description: t.description(),
            })
            .collect(),
        theme_colors: &THEME_COLORS,
        default_theme_color: DEFAULT_THEME_COLOR,
    })
}

/// GET /api/v1/session
pub async fn handle_get_session(State(state): State<AppState>) -> Json<SessionView> {
    Json(state.session.lock().await.view())
}

/// POST /api/v1/session
pub async fn handle_sign_in(
    State(state): State<AppState>,
    AppJson(req): AppJson<SignInRequest>,
) -> Result<Json<SessionView>, AppError> {
    let mut session = state.session.lock().await;
    session.sign_in(&req.email).await?;
    Ok(Json(session.view()))
}

/// DELETE /api/v1/session
pub async fn handle_sign_out(State(state): State<AppState>) -> Json<SessionView> {
    let mut session = state.session.lock().await;
    session.sign_out().await;
    Json(session.view())
}

/// GET /api/v1/resumes
pub async fn handle_list_resumes(
    State(state): State<AppState>,
) -> Result<Json<Vec<ResumeSummary>>, AppError> {
    let session = state.session.lock().await;
    if session.step() == Step::NoSession {
        return Err(SessionError::InvalidTransition {
            step: Step::NoSession,
            action: "list resumes",
        }
        .into());
    }
    Ok(Json(session.dashboard()))
}

/// POST /api/v1/resumes/new
pub async fn handle_start_new(State(state): State<AppState>) -> Result<Json<SessionView>, AppError> {
    let mut session = state.session.lock().await;
    session.create_new()?;
    Ok(Json(session.view()))
}

/// POST /api/v1/resumes
pub async fn handle_create_resume(
    State(state): State<AppState>,
    AppJson(req): AppJson<CreateResumeRequest>,
) -> Result<(StatusCode, Json<Resume>), AppError> {
    let resume = state
        .session
        .lock()
        .await
        .choose_template(req.template_id)
        .await?;
    Ok((StatusCode::CREATED, Json(Resume::clone(&resume))))
}

/// POST /api/v1/resumes/:id/open
pub async fn handle_open_resume(
    State(state): State<AppState>,
    AppPath(id): AppPath<Id>,
) -> Result<Json<Resume>, AppError> {
    let mut session = state.session.lock().await;
    session.open(&id)?;
    let resume = session.open_resume("open a resume")?;
    Ok(Json(Resume::clone(&resume)))
}

/// DELETE /api/v1/resumes/:id
pub async fn handle_delete_resume(
    State(state): State<AppState>,
    AppPath(id): AppPath<Id>,
) -> Result<StatusCode, AppError> {
    state.session.lock().await.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
