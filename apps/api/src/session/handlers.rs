use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use super::{AnalysisSnapshot, EditorSession, OptimizationOutcome};
use crate::editor::{Edit, FieldUpdate, MutationError, SectionKind, ValidationReport};
use crate::errors::AppError;
use crate::export::{export_file_name, to_json_bytes};
use crate::models::{ResumeRecord, User};
use crate::remote::{LoginResponse, OptimizationOptions};
use crate::scoring::{KeywordCorpus, DEFAULT_CORPUS};
use crate::state::AppState;

/// Everything the editor needs to render after a load or an edit.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub user_id: String,
    pub record: Arc<ResumeRecord>,
    pub valid: bool,
    pub validation: ValidationReport,
    pub analysis: AnalysisSnapshot,
    pub job_description: String,
    pub selected_keywords: Vec<String>,
    pub dirty: bool,
}

impl SessionView {
    async fn of(session: &EditorSession) -> Self {
        let record = session.record().await;
        let validation = crate::editor::validate(&record);
        Self {
            user_id: session.user_id().to_string(),
            valid: validation.is_valid(),
            validation,
            record,
            analysis: session.latest(),
            job_description: session.job_description().await,
            selected_keywords: session.selected_keywords().await,
            dirty: session.is_dirty().await,
        }
    }
}

async fn apply_edit(
    state: &AppState,
    user_id: &str,
    edit: Edit,
) -> Result<Json<SessionView>, AppError> {
    let session = state.sessions.open(user_id).await?;
    session.apply(&edit).await?;
    Ok(Json(SessionView::of(&session).await))
}

/// Section names on the add/remove routes. Anything that is not a known
/// section is reported as `UnknownSection`, like a non-repeated one.
fn repeated_section(name: &str) -> Result<SectionKind, MutationError> {
    name.parse().map_err(|_| MutationError::UnknownSection(name.to_string()))
}

/// GET /api/v1/keywords
pub async fn handle_keywords() -> Json<KeywordCorpus> {
    Json(DEFAULT_CORPUS)
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /api/v1/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let remote = state
        .remote
        .as_ref()
        .ok_or_else(|| AppError::Unavailable("Remote backend is not configured".to_string()))?;
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(AppError::Validation(
            "Email and password are required".to_string(),
        ));
    }
    Ok(Json(remote.login(req.email.trim(), &req.password).await?))
}

/// GET /api/v1/auth/me
pub async fn handle_me(State(state): State<AppState>) -> Result<Json<User>, AppError> {
    let remote = state
        .remote
        .as_ref()
        .ok_or_else(|| AppError::Unavailable("Remote backend is not configured".to_string()))?;
    Ok(Json(remote.me().await?))
}

/// GET /api/v1/sessions/:user_id
pub async fn handle_open_session(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<SessionView>, AppError> {
    let session = state.sessions.open(&user_id).await?;
    Ok(Json(SessionView::of(&session).await))
}

/// PATCH /api/v1/sessions/:user_id/fields
pub async fn handle_update_field(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(update): Json<FieldUpdate>,
) -> Result<Json<SessionView>, AppError> {
    let edit = Edit::try_from(update)?;
    apply_edit(&state, &user_id, edit).await
}

/// POST /api/v1/sessions/:user_id/sections/:section
pub async fn handle_add_item(
    State(state): State<AppState>,
    Path((user_id, section)): Path<(String, String)>,
) -> Result<Json<SessionView>, AppError> {
    let section = repeated_section(&section)?;
    apply_edit(&state, &user_id, Edit::Add(section)).await
}

/// DELETE /api/v1/sessions/:user_id/sections/:section/:index
pub async fn handle_remove_item(
    State(state): State<AppState>,
    Path((user_id, section, index)): Path<(String, String, usize)>,
) -> Result<Json<SessionView>, AppError> {
    let section = repeated_section(&section)?;
    apply_edit(&state, &user_id, Edit::Remove { section, index }).await
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDescriptionRequest {
    pub job_description: String,
}

/// PUT /api/v1/sessions/:user_id/job-description
pub async fn handle_set_job_description(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(req): Json<JobDescriptionRequest>,
) -> Result<StatusCode, AppError> {
    let session = state.sessions.open(&user_id).await?;
    session.set_job_description(&req.job_description).await;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct ToggleKeywordRequest {
    pub keyword: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleKeywordResponse {
    pub selected: bool,
    pub selected_keywords: Vec<String>,
}

/// POST /api/v1/sessions/:user_id/keywords/toggle
pub async fn handle_toggle_keyword(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(req): Json<ToggleKeywordRequest>,
) -> Result<Json<ToggleKeywordResponse>, AppError> {
    let keyword = req.keyword.trim();
    if keyword.is_empty() {
        return Err(AppError::Validation("Keyword cannot be blank".to_string()));
    }
    let session = state.sessions.open(&user_id).await?;
    let selected = session.toggle_keyword(keyword).await;
    Ok(Json(ToggleKeywordResponse {
        selected,
        selected_keywords: session.selected_keywords().await,
    }))
}

/// POST /api/v1/sessions/:user_id/analyze
pub async fn handle_analyze(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<AnalysisSnapshot>, AppError> {
    let session = state.sessions.open(&user_id).await?;
    Ok(Json(session.analyze_now().await))
}

const MAX_ANALYSIS_WAIT_MS: u64 = 30_000;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisQuery {
    /// Long-poll: wait up to this long for the next published analysis.
    pub wait_ms: Option<u64>,
}

/// GET /api/v1/sessions/:user_id/analysis
pub async fn handle_latest_analysis(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<AnalysisQuery>,
) -> Result<Json<AnalysisSnapshot>, AppError> {
    let session = state.sessions.open(&user_id).await?;
    if let Some(wait_ms) = query.wait_ms {
        let mut updates = session.subscribe();
        updates.borrow_and_update();
        let wait = Duration::from_millis(wait_ms.min(MAX_ANALYSIS_WAIT_MS));
        // Timing out just returns the current snapshot.
        let _ = tokio::time::timeout(wait, updates.changed()).await;
    }
    Ok(Json(session.latest()))
}

/// GET /api/v1/sessions/:user_id/validation
pub async fn handle_validation(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ValidationReport>, AppError> {
    let session = state.sessions.open(&user_id).await?;
    Ok(Json(session.validation().await))
}

/// POST /api/v1/sessions/:user_id/save
pub async fn handle_save(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let session = state.sessions.open(&user_id).await?;
    session.save_now().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/sessions/:user_id/optimize
pub async fn handle_optimize(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(options): Json<OptimizationOptions>,
) -> Result<Json<OptimizationOutcome>, AppError> {
    let session = state.sessions.open(&user_id).await?;
    let outcome = session
        .optimize(state.optimizer.as_deref(), &options)
        .await;
    Ok(Json(outcome))
}

/// GET /api/v1/sessions/:user_id/export/json
pub async fn handle_export_json(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let session = state.sessions.open(&user_id).await?;
    let record = session.record().await;
    let body = to_json_bytes(&record).map_err(anyhow::Error::from)?;
    let disposition = format!("attachment; filename=\"{}\"", export_file_name(&record));
    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}
