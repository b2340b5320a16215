pub mod render;
pub mod routes;

use crate::cache::CacheStore;
use crate::config::Config;
use crate::gemini::Classifier;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub cache: Arc<CacheStore>,
    pub classifier: Arc<dyn Classifier>,
    /// Held for the duration of a pipeline run; try_lock failure means a run
    /// is already in flight.
    pub run_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(config: Config, cache: CacheStore, classifier: Arc<dyn Classifier>) -> Self {
        Self {
            config: Arc::new(config),
            cache: Arc::new(cache),
            classifier,
            run_lock: Arc::new(Mutex::new(())),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/run", get(routes::run_pipeline))
        .route("/data", get(routes::data))
        .route("/view", get(routes::view_fragment))
        .nest_service("/static", ServeDir::new("static"))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
