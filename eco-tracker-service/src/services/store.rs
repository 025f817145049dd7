use crate::models::{
    Challenge, ChallengeFilter, ChallengeUpdate, Enrollment, EnrollmentUpdate, Event, Tip,
    UpdateOutcome, User,
};
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use service_core::error::AppError;

/// Every database read and write the HTTP layer performs.
///
/// Inserts return `AppError::Conflict` when a unique key is violated
/// (duplicate user email, or a second enrollment for the same user and
/// challenge). List operations return documents in their display order.
#[async_trait]
pub trait EcoStore: Send + Sync {
    async fn health_check(&self) -> Result<(), AppError>;

    /// Newest first.
    async fn list_challenges(&self, filter: &ChallengeFilter) -> Result<Vec<Challenge>, AppError>;
    async fn recent_challenges(&self, limit: i64) -> Result<Vec<Challenge>, AppError>;
    async fn challenges_created_by(&self, email: &str) -> Result<Vec<Challenge>, AppError>;
    async fn find_challenge(&self, id: ObjectId) -> Result<Option<Challenge>, AppError>;
    async fn insert_challenge(&self, challenge: &Challenge) -> Result<ObjectId, AppError>;
    async fn update_challenge(
        &self,
        id: ObjectId,
        update: &ChallengeUpdate,
    ) -> Result<UpdateOutcome, AppError>;
    async fn delete_challenge(&self, id: ObjectId) -> Result<u64, AppError>;
    /// Returns false when no challenge has that id.
    async fn increment_participants(&self, id: ObjectId) -> Result<bool, AppError>;

    async fn find_enrollment(
        &self,
        user_id: &str,
        challenge_id: &str,
    ) -> Result<Option<Enrollment>, AppError>;
    async fn insert_enrollment(&self, enrollment: &Enrollment) -> Result<ObjectId, AppError>;
    /// Most recently joined first.
    async fn enrollments_for_user(&self, user_id: &str) -> Result<Vec<Enrollment>, AppError>;
    async fn update_enrollment(
        &self,
        id: ObjectId,
        update: &EnrollmentUpdate,
    ) -> Result<UpdateOutcome, AppError>;
    async fn delete_enrollment(&self, id: ObjectId) -> Result<u64, AppError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn insert_user(&self, user: &User) -> Result<ObjectId, AppError>;

    /// Soonest first.
    async fn list_events(&self) -> Result<Vec<Event>, AppError>;
    /// Events dated on or after `from` (`YYYY-MM-DD`), soonest first.
    async fn upcoming_events(&self, from: &str, limit: i64) -> Result<Vec<Event>, AppError>;

    /// Newest first.
    async fn list_tips(&self) -> Result<Vec<Tip>, AppError>;
    async fn recent_tips(&self, limit: i64) -> Result<Vec<Tip>, AppError>;
}

pub(crate) fn inserted_id(id: Option<ObjectId>) -> Result<ObjectId, AppError> {
    id.ok_or_else(|| AppError::InternalError(anyhow::anyhow!("Document has no id assigned")))
}
