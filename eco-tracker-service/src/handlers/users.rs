use crate::dtos::{CreateUserRequest, ExistingUserResponse, InsertResult};
use crate::models::User;
use crate::startup::AppState;
use crate::utils::JsonBody;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use service_core::error::AppError;

fn already_exists() -> Response {
    (
        StatusCode::OK,
        Json(ExistingUserResponse {
            message: "User already exists".to_string(),
            inserted_id: None,
        }),
    )
        .into_response()
}

/// Registers a user on first sign-in. Repeat calls for the same email are
/// answered with 200 and no insert.
#[tracing::instrument(skip(state, request))]
pub async fn create_user(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreateUserRequest>,
) -> Result<Response, AppError> {
    let email = request
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .ok_or_else(|| AppError::bad_request("email is required"))?
        .to_string();

    if state.store.find_user_by_email(&email).await?.is_some() {
        return Ok(already_exists());
    }

    let profile = mongodb::bson::to_document(&request.profile)
        .map_err(|e| AppError::bad_request(format!("Invalid profile: {}", e)))?;
    let user = User::new(email, profile);

    match state.store.insert_user(&user).await {
        Ok(id) => {
            tracing::info!(user_id = %id, "User registered");
            Ok((StatusCode::CREATED, Json(InsertResult::from(id))).into_response())
        }
        // Lost the race against a concurrent registration
        Err(AppError::Conflict(_)) => Ok(already_exists()),
        Err(e) => Err(e),
    }
}
