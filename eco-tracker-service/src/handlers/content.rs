use crate::dtos::{EventResponse, TipResponse};
use crate::startup::AppState;
use axum::{extract::State, Json};
use service_core::error::AppError;

pub const UPCOMING_EVENTS_LIMIT: i64 = 4;
pub const RECENT_TIPS_LIMIT: i64 = 5;

#[tracing::instrument(skip(state))]
pub async fn all_events(
    State(state): State<AppState>,
) -> Result<Json<Vec<EventResponse>>, AppError> {
    let events = state.store.list_events().await?;
    Ok(Json(events.into_iter().map(EventResponse::from).collect()))
}

#[tracing::instrument(skip(state))]
pub async fn upcoming_events(
    State(state): State<AppState>,
) -> Result<Json<Vec<EventResponse>>, AppError> {
    let today = chrono::Utc::now().format("%Y-%m-%d").to_string();
    let events = state
        .store
        .upcoming_events(&today, UPCOMING_EVENTS_LIMIT)
        .await?;
    Ok(Json(events.into_iter().map(EventResponse::from).collect()))
}

#[tracing::instrument(skip(state))]
pub async fn all_tips(State(state): State<AppState>) -> Result<Json<Vec<TipResponse>>, AppError> {
    let tips = state.store.list_tips().await?;
    Ok(Json(tips.into_iter().map(TipResponse::from).collect()))
}

#[tracing::instrument(skip(state))]
pub async fn recent_tips(
    State(state): State<AppState>,
) -> Result<Json<Vec<TipResponse>>, AppError> {
    let tips = state.store.recent_tips(RECENT_TIPS_LIMIT).await?;
    Ok(Json(tips.into_iter().map(TipResponse::from).collect()))
}
