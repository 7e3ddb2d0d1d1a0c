use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::domain::directory::{Booking, ContactMessage, DashboardSummary};
use crate::domain::moderation::{ActionOutcome, LoadReport, ModerationPage, RejectionDraft};
use crate::domain::user::User;
use crate::http::AppError;
use crate::AppState;

#[derive(Serialize)]
pub(crate) struct HealthResponse {
    status: &'static str,
}

pub(crate) async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let redis = match &state.redis {
        Some(redis) => redis.ping().await.is_ok(),
        None => true,
    };
    let status = if state.moderation.is_closed() {
        "closed"
    } else if redis {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthResponse { status })
}

pub async fn dashboard_summary(State(state): State<AppState>) -> Json<DashboardSummary> {
    Json(state.dashboard.summary().await)
}

#[derive(Deserialize)]
pub struct PageQuery {
    pub page: Option<usize>,
}

pub async fn list_listings(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Json<ModerationPage> {
    let page = query.page.unwrap_or(1);
    Json(state.moderation.page(page).await)
}

pub async fn refresh_listings(
    State(state): State<AppState>,
) -> Result<Json<LoadReport>, AppError> {
    let report = state.moderation.load().await?;
    Ok(Json(report))
}

#[derive(Serialize)]
pub struct ActionResponse {
    pub key: String,
    pub outcome: ActionOutcome,
}

pub async fn approve_listing(
    Path(key): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ActionResponse>, AppError> {
    let outcome = state.moderation.approve(&key).await?;
    Ok(Json(ActionResponse { key, outcome }))
}

pub async fn delete_listing(
    Path(key): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ActionResponse>, AppError> {
    let outcome = state.moderation.delete(&key).await?;
    Ok(Json(ActionResponse { key, outcome }))
}

#[derive(Deserialize)]
pub struct RejectionRequest {
    #[serde(default)]
    pub reason: String,
}

pub async fn reject_listing(
    Path(key): Path<String>,
    State(state): State<AppState>,
    Json(payload): Json<RejectionRequest>,
) -> Result<Json<ActionResponse>, AppError> {
    let outcome = state.moderation.reject(&key, &payload.reason).await?;
    Ok(Json(ActionResponse { key, outcome }))
}

#[derive(Serialize)]
pub struct DraftResponse {
    pub key: String,
    pub draft: RejectionDraft,
}

pub async fn start_rejection(
    Path(key): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<DraftResponse>, AppError> {
    let draft = state.moderation.start_rejection(&key).await?;
    Ok(Json(DraftResponse { key, draft }))
}

pub async fn edit_rejection(
    Path(key): Path<String>,
    State(state): State<AppState>,
    Json(payload): Json<RejectionRequest>,
) -> Result<Json<DraftResponse>, AppError> {
    let draft = state
        .moderation
        .edit_rejection(&key, &payload.reason)
        .await?;
    Ok(Json(DraftResponse { key, draft }))
}

pub async fn cancel_rejection(
    Path(key): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    state.moderation.cancel_rejection(&key).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn submit_rejection(
    Path(key): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ActionResponse>, AppError> {
    let outcome = state.moderation.submit_rejection(&key).await?;
    Ok(Json(ActionResponse { key, outcome }))
}

pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, AppError> {
    let users = state.users.list().await?;
    Ok(Json(users))
}

pub async fn block_user(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<User>, AppError> {
    let user = state.users.block(&id).await?;
    Ok(Json(user))
}

pub async fn unblock_user(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<User>, AppError> {
    let user = state.users.unblock(&id).await?;
    Ok(Json(user))
}

#[derive(Deserialize)]
pub struct RoleRequest {
    #[serde(default)]
    pub role: String,
}

pub async fn update_user_role(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Json(payload): Json<RoleRequest>,
) -> Result<Json<User>, AppError> {
    let user = state.users.set_role(&id, &payload.role).await?;
    Ok(Json(user))
}

pub async fn list_contacts(
    State(state): State<AppState>,
) -> Result<Json<Vec<ContactMessage>>, AppError> {
    let contacts = state.directory.contacts().await.map_err(|err| {
        tracing::error!(error = ?err, "failed to fetch contacts");
        AppError::bad_gateway("failed to fetch messages")
    })?;
    Ok(Json(contacts))
}

pub async fn list_bookings(
    State(state): State<AppState>,
) -> Result<Json<Vec<Booking>>, AppError> {
    let bookings = state.directory.bookings().await.map_err(|err| {
        tracing::error!(error = ?err, "failed to fetch bookings");
        AppError::bad_gateway("failed to fetch bookings")
    })?;
    Ok(Json(bookings))
}
