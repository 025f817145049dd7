use crate::dtos::{
    ChallengeListQuery, ChallengeResponse, CreateChallengeRequest, DeleteResult, InsertResult,
    UpdateResult,
};
use crate::models::{Challenge, ChallengeFilter, ChallengeUpdate};
use crate::startup::AppState;
use crate::utils::{parse_object_id, JsonBody};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use service_core::error::AppError;

pub const RECENT_CHALLENGES_LIMIT: i64 = 6;

fn responses(challenges: Vec<Challenge>) -> Json<Vec<ChallengeResponse>> {
    Json(challenges.into_iter().map(ChallengeResponse::from).collect())
}

#[tracing::instrument(skip(state))]
pub async fn list_challenges(
    State(state): State<AppState>,
    Query(query): Query<ChallengeListQuery>,
) -> Result<Json<Vec<ChallengeResponse>>, AppError> {
    let filter = ChallengeFilter::from(query);
    let challenges = state.store.list_challenges(&filter).await?;
    Ok(responses(challenges))
}

#[tracing::instrument(skip(state))]
pub async fn recent_challenges(
    State(state): State<AppState>,
) -> Result<Json<Vec<ChallengeResponse>>, AppError> {
    let challenges = state
        .store
        .recent_challenges(RECENT_CHALLENGES_LIMIT)
        .await?;
    Ok(responses(challenges))
}

#[tracing::instrument(skip(state))]
pub async fn get_challenge(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ChallengeResponse>, AppError> {
    let id = parse_object_id(&id)?;

    match state.store.find_challenge(id).await? {
        Some(challenge) => Ok(Json(ChallengeResponse::from(challenge))),
        None => Err(AppError::not_found("Challenge not found")),
    }
}

#[tracing::instrument(skip(state, request))]
pub async fn create_challenge(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreateChallengeRequest>,
) -> Result<(StatusCode, Json<InsertResult>), AppError> {
    let extra = mongodb::bson::to_document(&request.extra)
        .map_err(|e| AppError::bad_request(format!("Invalid challenge: {}", e)))?;
    let challenge = Challenge::new(request.fields, request.created_by).with_extra(extra);
    let id = state.store.insert_challenge(&challenge).await?;

    tracing::info!(
        challenge_id = %id,
        created_by = ?challenge.created_by,
        "Challenge created"
    );

    Ok((StatusCode::CREATED, Json(InsertResult::from(id))))
}

#[tracing::instrument(skip(state, update))]
pub async fn update_challenge(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(update): JsonBody<ChallengeUpdate>,
) -> Result<Json<UpdateResult>, AppError> {
    let id = parse_object_id(&id)?;

    if update.is_empty() {
        return Err(AppError::bad_request("No updatable fields supplied"));
    }

    let outcome = state.store.update_challenge(id, &update).await?;
    if outcome.matched == 0 {
        return Err(AppError::not_found("Challenge not found"));
    }

    Ok(Json(UpdateResult::from(outcome)))
}

#[tracing::instrument(skip(state))]
pub async fn delete_challenge(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResult>, AppError> {
    let id = parse_object_id(&id)?;

    let deleted = state.store.delete_challenge(id).await?;
    if deleted == 0 {
        return Err(AppError::not_found("Challenge not found"));
    }

    tracing::info!(challenge_id = %id, "Challenge deleted");
    Ok(Json(DeleteResult::from(deleted)))
}

#[tracing::instrument(skip(state))]
pub async fn created_challenges(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<Vec<ChallengeResponse>>, AppError> {
    let challenges = state.store.challenges_created_by(&email).await?;
    Ok(responses(challenges))
}
