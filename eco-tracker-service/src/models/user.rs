use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime, Document};
use serde::{Deserialize, Serialize};

/// Registered user. Only `email` is interpreted; every other profile field is
/// stored and returned as sent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    pub created_at: Option<BsonDateTime>,
    #[serde(flatten)]
    pub profile: Document,
}

impl User {
    pub fn new(email: String, mut profile: Document) -> Self {
        // Server-owned keys never come from the profile
        for key in ["_id", "email", "createdAt"] {
            profile.remove(key);
        }
        Self {
            id: Some(ObjectId::new()),
            email,
            created_at: Some(BsonDateTime::now()),
            profile,
        }
    }
}
