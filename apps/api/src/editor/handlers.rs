use anyhow::Context;
use axum::{
    extract::State,
    http::{header, HeaderValue},
    response::{Html, IntoResponse},
    Json,
};

use crate::editor::edits::ResumeEdit;
use crate::editor::requests::TrackedRequest;
use crate::editor::rewrite::{rewrite_field, RewriteOutcome, RewriteTarget};
use crate::errors::AppError;
use crate::export::{export_active, ExportFormat};
use crate::extract::{AppJson, AppPath};
use crate::models::resume::Resume;
use crate::render::render_resume;
use crate::session::SessionView;
use crate::state::AppState;

/// POST /api/v1/editor/back
pub async fn handle_back(State(state): State<AppState>) -> Result<Json<SessionView>, AppError> {
    let mut session = state.session.lock().await;
    session.back()?;
    Ok(Json(session.view()))
}

/// GET /api/v1/editor
pub async fn handle_get_active(State(state): State<AppState>) -> Result<Json<Resume>, AppError> {
    let resume = state.session.lock().await.open_resume("view the editor")?;
    Ok(Json(Resume::clone(&resume)))
}

/// PATCH /api/v1/editor
pub async fn handle_edit(
    State(state): State<AppState>,
    AppJson(edit): AppJson<ResumeEdit>,
) -> Result<Json<Resume>, AppError> {
    let resume = state.session.lock().await.edit(edit).await?;
    Ok(Json(Resume::clone(&resume)))
}

/// POST /api/v1/editor/rewrite
pub async fn handle_rewrite(
    State(state): State<AppState>,
    AppJson(target): AppJson<RewriteTarget>,
) -> Result<Json<RewriteOutcome>, AppError> {
    let outcome = rewrite_field(
        &state.session,
        state.refiner.as_ref(),
        &state.requests,
        target,
    )
    .await?;
    Ok(Json(outcome))
}

/// GET /api/v1/editor/requests
pub async fn handle_requests(State(state): State<AppState>) -> Json<Vec<TrackedRequest>> {
    let snapshot = state
        .requests
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .snapshot();
    Json(snapshot)
}

/// GET /api/v1/editor/preview
pub async fn handle_preview(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let resume = state.session.lock().await.open_resume("preview")?;
    Ok(Html(render_resume(&resume)))
}

/// GET /api/v1/editor/export/:format
pub async fn handle_export(
    State(state): State<AppState>,
    AppPath(format): AppPath<String>,
) -> Result<impl IntoResponse, AppError> {
    let format = ExportFormat::parse(&format)
        .ok_or_else(|| AppError::Validation(format!("Unsupported export format '{format}'")))?;

    let file = export_active(
        &state.session,
        state.rasterizer.as_ref(),
        &state.requests,
        format,
    )
    .await?;

    let disposition = HeaderValue::from_str(&content_disposition(&file.file_name))
        .context("Export file name produced an invalid header")?;
    let headers = [
        (header::CONTENT_TYPE, HeaderValue::from_static(file.content_type)),
        (header::CONTENT_DISPOSITION, disposition),
    ];
    Ok((headers, file.bytes))
}

/// `attachment` header with an ASCII fallback name plus the RFC 5987 UTF-8 form.
fn content_disposition(file_name: &str) -> String {
    let fallback: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii_graphic() && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let mut encoded = String::new();
    for byte in file_name.bytes() {
        if byte.is_ascii_alphanumeric() || b"-._~".contains(&byte) {
            encoded.push(char::from(byte));
        } else {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }

    format!("attachment; filename=\"{fallback}\"; filename*=UTF-8''{encoded}")
}
