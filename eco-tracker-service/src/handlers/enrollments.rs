use crate::dtos::{DeleteResult, EnrollmentResponse, InsertResult, JoinChallengeRequest, UpdateResult};
use crate::models::EnrollmentUpdate;
use crate::services::enrollment;
use crate::startup::AppState;
use crate::utils::{parse_object_id, JsonBody};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use service_core::error::AppError;

#[tracing::instrument(skip(state, request))]
pub async fn join_challenge(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<JoinChallengeRequest>,
) -> Result<(StatusCode, Json<InsertResult>), AppError> {
    let challenge_id = parse_object_id(&id)?;

    let user_id = request.user_id.trim();
    if user_id.is_empty() {
        return Err(AppError::bad_request("userId is required"));
    }

    let enrollment_id =
        enrollment::join_challenge(state.store.as_ref(), challenge_id, user_id).await?;

    Ok((StatusCode::CREATED, Json(InsertResult::from(enrollment_id))))
}

#[tracing::instrument(skip(state))]
pub async fn list_user_challenges(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<EnrollmentResponse>>, AppError> {
    let enrollments = state.store.enrollments_for_user(&user_id).await?;
    Ok(Json(
        enrollments
            .into_iter()
            .map(EnrollmentResponse::from)
            .collect(),
    ))
}

#[tracing::instrument(skip(state, update))]
pub async fn update_user_challenge(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(update): JsonBody<EnrollmentUpdate>,
) -> Result<Json<UpdateResult>, AppError> {
    let id = parse_object_id(&id)?;

    if update.is_empty() {
        return Err(AppError::bad_request("Nothing to update: send status and/or progress"));
    }
    if update.progress.is_some_and(|p| p < 0) {
        return Err(AppError::bad_request("progress cannot be negative"));
    }

    let outcome = state.store.update_enrollment(id, &update).await?;
    if outcome.matched == 0 {
        return Err(AppError::not_found("Enrollment not found"));
    }

    Ok(Json(UpdateResult::from(outcome)))
}

/// Leaves the challenge's participant counter untouched.
#[tracing::instrument(skip(state))]
pub async fn delete_user_challenge(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResult>, AppError> {
    let id = parse_object_id(&id)?;

    let deleted = state.store.delete_enrollment(id).await?;
    if deleted == 0 {
        return Err(AppError::not_found("Enrollment not found"));
    }

    Ok(Json(DeleteResult::from(deleted)))
}
