use crate::models::{Enrollment, EnrollmentStatus};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub challenge_id: String,
    pub status: EnrollmentStatus,
    pub progress: i32,
    pub join_date: String,
    pub challenge_title: Option<String>,
}

impl From<Enrollment> for EnrollmentResponse {
    fn from(enrollment: Enrollment) -> Self {
        Self {
            id: enrollment.id.map(|id| id.to_hex()).unwrap_or_default(),
            user_id: enrollment.user_id,
            challenge_id: enrollment.challenge_id,
            status: enrollment.status,
            progress: enrollment.progress,
            join_date: enrollment.join_date.to_chrono().to_rfc3339(),
            challenge_title: enrollment.challenge_title,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinChallengeRequest {
    pub user_id: String,
}
