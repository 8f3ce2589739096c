//! HTTP request handlers

use super::sse::sse_stream;
use super::types::{CommandRequest, ErrorResponse, SelectModeRequest, SubmitRequest};
use super::AppState;
use crate::catalog::{catalog, Catalog};
use crate::model::FeedbackDraft;
use crate::provider::ProviderError;
use crate::runtime::{SessionError, SessionEvent};
use crate::state_machine::{Event, StateView, TransitionError};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/catalog", get(get_catalog))
        // Session state and streaming
        .route("/api/sessions/:id", get(get_session))
        .route("/api/sessions/:id/stream", get(stream_session))
        // Picker and form
        .route("/api/sessions/:id/command", post(run_command))
        .route("/api/sessions/:id/picker", post(open_picker))
        .route("/api/sessions/:id/mode", post(select_mode))
        .route("/api/sessions/:id/back", post(back))
        .route("/api/sessions/:id/submit", post(submit_form))
        .route("/api/sessions/:id/cancel", post(cancel))
        // Result actions
        .route("/api/sessions/:id/copy", post(copy_result))
        .route("/api/sessions/:id/insert", post(insert_result))
        .route("/api/sessions/:id/regenerate", post(regenerate))
        // Feedback
        .route("/api/sessions/:id/feedback/open", post(open_feedback))
        .route("/api/sessions/:id/feedback", post(submit_feedback))
        .route("/api/sessions/:id/feedback/skip", post(skip_feedback))
        .route("/api/sessions/:id/feedback/dismiss", post(dismiss_feedback))
        .with_state(state)
}

type ViewResult = Result<Json<StateView>, AppError>;

async fn trigger(state: &AppState, id: &str, event: Event) -> ViewResult {
    Ok(Json(state.sessions.trigger(id, event).await?))
}

// ============================================================
// Catalog and session state
// ============================================================

async fn get_catalog() -> Json<Catalog> {
    Json(catalog())
}

async fn get_session(State(state): State<AppState>, Path(id): Path<String>) -> ViewResult {
    Ok(Json(state.sessions.snapshot(&id).await?))
}

async fn stream_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    // Subscribe before taking the snapshot so no change falls between them
    let broadcast_rx = state.sessions.subscribe(&id).await?;
    let init_event = SessionEvent::Init {
        state: state.sessions.snapshot(&id).await?,
    };

    Ok(sse_stream(init_event, broadcast_rx))
}

// ============================================================
// Picker and form
// ============================================================

async fn run_command(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<CommandRequest>,
) -> ViewResult {
    Ok(Json(state.sessions.command(&id, &req.text).await?))
}

async fn open_picker(State(state): State<AppState>, Path(id): Path<String>) -> ViewResult {
    trigger(&state, &id, Event::OpenPicker).await
}

async fn select_mode(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SelectModeRequest>,
) -> ViewResult {
    trigger(&state, &id, Event::SelectMode { mode: req.mode }).await
}

async fn back(State(state): State<AppState>, Path(id): Path<String>) -> ViewResult {
    trigger(&state, &id, Event::Back).await
}

async fn submit_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SubmitRequest>,
) -> ViewResult {
    let options = req.options_or_default();
    let event = Event::SubmitForm {
        mode: req.mode,
        source_text: req.source_text,
        options,
    };
    trigger(&state, &id, event).await
}

async fn cancel(State(state): State<AppState>, Path(id): Path<String>) -> ViewResult {
    trigger(&state, &id, Event::Cancel).await
}

// ============================================================
// Result actions
// ============================================================

async fn copy_result(State(state): State<AppState>, Path(id): Path<String>) -> ViewResult {
    trigger(&state, &id, Event::CopyResult).await
}

async fn insert_result(State(state): State<AppState>, Path(id): Path<String>) -> ViewResult {
    trigger(&state, &id, Event::InsertResult).await
}

async fn regenerate(State(state): State<AppState>, Path(id): Path<String>) -> ViewResult {
    trigger(&state, &id, Event::Regenerate).await
}

// ============================================================
// Feedback
// ============================================================

async fn open_feedback(State(state): State<AppState>, Path(id): Path<String>) -> ViewResult {
    trigger(&state, &id, Event::OpenFeedback).await
}

async fn submit_feedback(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(draft): Json<FeedbackDraft>,
) -> ViewResult {
    trigger(&state, &id, Event::SubmitFeedback { draft }).await
}

async fn skip_feedback(State(state): State<AppState>, Path(id): Path<String>) -> ViewResult {
    trigger(&state, &id, Event::SkipFeedback).await
}

async fn dismiss_feedback(State(state): State<AppState>, Path(id): Path<String>) -> ViewResult {
    trigger(&state, &id, Event::DismissFeedback).await
}

// ============================================================
// Error Handling
// ============================================================

pub(super) enum AppError {
    Unprocessable { kind: &'static str, message: String },
    Conflict { kind: &'static str, message: String },
    NotFound(String),
    Unavailable(String),
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        let kind = e.kind();
        let message = e.to_string();
        match e {
            SessionError::Transition(TransitionError::Dispatch(ProviderError::AlreadyInFlight)) => {
                AppError::Conflict { kind, message }
            }
            SessionError::Transition(_) | SessionError::Command(_) => {
                AppError::Unprocessable { kind, message }
            }
            SessionError::NotFound => AppError::NotFound(message),
            SessionError::Stopped => AppError::Unavailable(message),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match self {
            AppError::Unprocessable { kind, message } => {
                (StatusCode::UNPROCESSABLE_ENTITY, kind, message)
            }
            AppError::Conflict { kind, message } => (StatusCode::CONFLICT, kind, message),
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, "session_not_found", message),
            AppError::Unavailable(message) => (StatusCode::SERVICE_UNAVAILABLE, "stopped", message),
        };

        let body = Json(ErrorResponse::new(kind, message));
        (status, body).into_response()
    }
}
