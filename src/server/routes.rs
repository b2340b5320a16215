use super::render;
use super::AppState;
use crate::pipeline;
use crate::view::{self, GroupedView};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Json};
use axum::extract::State;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct RunResponse {
    pub status: &'static str,
    pub newly_analyzed: usize,
}

/// GET / — the dashboard shell. Assets under /static are served separately.
pub async fn index() -> Html<&'static str> {
    Html(include_str!("../../static/index.html"))
}

/// GET /run — analyze then reduce, at most one run in flight.
///
/// The try-lock is the single-flight guard: a second request while a run is
/// underway gets 409 without touching the caches. The guard lives on the
/// state rather than in the UI so the invariant holds for any client.
pub async fn run_pipeline(State(state): State<AppState>) -> Result<Json<RunResponse>, AppError> {
    let Ok(_guard) = state.run_lock.try_lock() else {
        return Err(AppError::Busy);
    };

    tracing::info!(target = %state.config.analysis.target_folder.display(), "pipeline run started");
    let newly_analyzed = pipeline::run_analysis(
        &state.config.analysis.target_folder,
        state.classifier.as_ref(),
        &state.config.analysis.allowed_keys,
        &state.cache,
    )
    .await
    .map_err(AppError::internal)?;
    pipeline::run_reduce(&state.cache).await.map_err(AppError::internal)?;

    tracing::info!("{}", render::status_line(newly_analyzed));
    Ok(Json(RunResponse { status: "complete", newly_analyzed }))
}

/// GET /data — the grouped view as JSON, rebuilt from the caches on every
/// request (no server-side view caching).
pub async fn data(State(state): State<AppState>) -> Json<GroupedView> {
    Json(load_view(&state))
}

/// GET /view — the same grouped view rendered as an HTML fragment.
pub async fn view_fragment(State(state): State<AppState>) -> Html<String> {
    Html(render::render_groups(&load_view(&state)))
}

fn load_view(state: &AppState) -> GroupedView {
    let key_index = state.cache.load_key_index();
    let file_map = state.cache.load_file_map();
    view::build_view(&key_index, &file_map)
}

#[derive(Debug)]
pub enum AppError {
    Busy,
    Internal(String),
}

impl AppError {
    fn internal(e: anyhow::Error) -> Self {
        Self::Internal(format!("{e:#}"))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        match self {
            AppError::Busy => (
                StatusCode::CONFLICT,
                Json(serde_json::json!({ "status": "busy" })),
            )
                .into_response(),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({ "error": msg })),
                )
                    .into_response()
            }
        }
    }
}
