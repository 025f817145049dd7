use super::metrics::record_join;
use super::store::EcoStore;
use crate::models::Enrollment;
use mongodb::bson::oid::ObjectId;
use service_core::error::AppError;

const ALREADY_JOINED: &str = "You have already joined this challenge";

/// Enrolls `user_id` in a challenge and bumps its participant counter.
///
/// Steps run in order against the store without a transaction:
/// duplicate check, challenge lookup, enrollment insert, counter increment.
/// A duplicate that slips past the check is caught by the unique index on
/// insert. If the increment fails the enrollment is deleted again so the
/// counter never lags behind the enrollments it counts.
#[tracing::instrument(skip(store, challenge_id), fields(challenge_id = %challenge_id))]
pub async fn join_challenge(
    store: &dyn EcoStore,
    challenge_id: ObjectId,
    user_id: &str,
) -> Result<ObjectId, AppError> {
    let challenge_hex = challenge_id.to_hex();

    if store
        .find_enrollment(user_id, &challenge_hex)
        .await?
        .is_some()
    {
        record_join("already_joined");
        return Err(AppError::bad_request(ALREADY_JOINED));
    }

    let challenge = match store.find_challenge(challenge_id).await? {
        Some(challenge) => challenge,
        None => {
            record_join("not_found");
            return Err(AppError::not_found("Challenge not found"));
        }
    };

    let enrollment = Enrollment::new(user_id.to_string(), challenge_id, &challenge);
    let enrollment_id = match store.insert_enrollment(&enrollment).await {
        Ok(id) => id,
        Err(AppError::Conflict(_)) => {
            record_join("already_joined");
            return Err(AppError::bad_request(ALREADY_JOINED));
        }
        Err(e) => {
            record_join("failed");
            return Err(e);
        }
    };

    let incremented = match store.increment_participants(challenge_id).await {
        Ok(true) => Ok(()),
        // Deleted between lookup and increment
        Ok(false) => Err(AppError::not_found("Challenge not found")),
        Err(e) => Err(e),
    };

    if let Err(e) = incremented {
        tracing::error!(
            enrollment_id = %enrollment_id,
            error = %e,
            "Participant increment failed, removing enrollment"
        );
        if let Err(cleanup) = store.delete_enrollment(enrollment_id).await {
            tracing::error!(
                enrollment_id = %enrollment_id,
                error = %cleanup,
                "Failed to remove enrollment after increment failure"
            );
        }
        record_join("rolled_back");
        return Err(e);
    }

    record_join("joined");
    tracing::info!(
        enrollment_id = %enrollment_id,
        "User joined challenge"
    );

    Ok(enrollment_id)
}
