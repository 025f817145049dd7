pub mod challenges;
pub mod content;
pub mod enrollments;
pub mod results;
pub mod users;

pub use challenges::{ChallengeListQuery, ChallengeResponse, CreateChallengeRequest};
pub use content::{EventResponse, TipResponse};
pub use enrollments::{EnrollmentResponse, JoinChallengeRequest};
pub use results::{DeleteResult, InsertResult, UpdateResult};
pub use users::{CreateUserRequest, ExistingUserResponse};

use mongodb::bson::{Bson, DateTime as BsonDateTime, Document};

pub(crate) fn rfc3339(value: Option<BsonDateTime>) -> Option<String> {
    value.map(|dt| dt.to_chrono().to_rfc3339())
}

/// Relaxed extended JSON rendering of pass-through fields.
pub(crate) fn extra_fields(extra: Document) -> serde_json::Map<String, serde_json::Value> {
    match Bson::Document(extra).into_relaxed_extjson() {
        serde_json::Value::Object(map) => map,
        _ => serde_json::Map::new(),
    }
}
