use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::Config;
use crate::editor::requests::SharedTracker;
use crate::editor::rewrite::TextRefiner;
use crate::export::raster::Rasterizer;
use crate::session::SessionController;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Single owner of the signed-in identity, the collection and the current step.
    /// Never held across a rewrite or export await.
    pub session: Arc<Mutex<SessionController>>,
    pub requests: SharedTracker,
    /// Rewrite collaborator. Production: `LlmRefiner`.
    pub refiner: Arc<dyn TextRefiner>,
    /// Export collaborator. Production: `CommandRasterizer`.
    pub rasterizer: Arc<dyn Rasterizer>,
    pub config: Config,
}
