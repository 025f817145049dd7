use super::Challenge;
use mongodb::bson::{doc, oid::ObjectId, DateTime as BsonDateTime, Document};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum EnrollmentStatus {
    #[serde(rename = "Not Started")]
    NotStarted,
    Ongoing,
    Finished,
}

impl std::fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnrollmentStatus::NotStarted => write!(f, "Not Started"),
            EnrollmentStatus::Ongoing => write!(f, "Ongoing"),
            EnrollmentStatus::Finished => write!(f, "Finished"),
        }
    }
}

/// A user's record of joining a challenge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: String,
    /// Hex id of the joined challenge. Not checked against `challenges`.
    pub challenge_id: String,
    pub status: EnrollmentStatus,
    #[serde(default)]
    pub progress: i32,
    pub join_date: BsonDateTime,
    pub challenge_title: Option<String>,
}

impl Enrollment {
    pub fn new(user_id: String, challenge_id: ObjectId, challenge: &Challenge) -> Self {
        Self {
            id: Some(ObjectId::new()),
            user_id,
            challenge_id: challenge_id.to_hex(),
            status: EnrollmentStatus::NotStarted,
            progress: 0,
            join_date: BsonDateTime::now(),
            challenge_title: challenge.title.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct EnrollmentUpdate {
    pub status: Option<EnrollmentStatus>,
    pub progress: Option<i32>,
}

impl EnrollmentUpdate {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.progress.is_none()
    }

    pub fn to_set_document(&self) -> Document {
        let mut set = doc! {};
        if let Some(status) = self.status {
            set.insert("status", status.to_string());
        }
        if let Some(progress) = self.progress {
            set.insert("progress", progress);
        }
        set
    }

    pub fn apply(&self, enrollment: &mut Enrollment) -> bool {
        let mut changed = false;
        if let Some(status) = self.status {
            changed |= enrollment.status != status;
            enrollment.status = status;
        }
        if let Some(progress) = self.progress {
            changed |= enrollment.progress != progress;
            enrollment.progress = progress;
        }
        changed
    }
}
