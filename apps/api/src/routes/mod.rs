pub mod health;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::editor::handlers as editor;
use crate::session::handlers as session;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/templates", get(session::handle_templates))
        // Session & dashboard
        .route(
            "/api/v1/session",
            get(session::handle_get_session)
                .post(session::handle_sign_in)
                .delete(session::handle_sign_out),
        )
        .route(
            "/api/v1/resumes",
            get(session::handle_list_resumes).post(session::handle_create_resume),
        )
        .route("/api/v1/resumes/new", post(session::handle_start_new))
        .route("/api/v1/resumes/:id", delete(session::handle_delete_resume))
        .route("/api/v1/resumes/:id/open", post(session::handle_open_resume))
        // Editor
        .route(
            "/api/v1/editor",
            get(editor::handle_get_active).patch(editor::handle_edit),
        )
        .route("/api/v1/editor/back", post(editor::handle_back))
        .route("/api/v1/editor/rewrite", post(editor::handle_rewrite))
        .route("/api/v1/editor/requests", get(editor::handle_requests))
        .route("/api/v1/editor/preview", get(editor::handle_preview))
        .route("/api/v1/editor/export/:format", get(editor::handle_export))
        .with_state(state)
}
