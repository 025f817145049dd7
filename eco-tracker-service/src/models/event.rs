use super::lenient;
use mongodb::bson::{oid::ObjectId, Document};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Calendar date as `YYYY-MM-DD`; compared lexically.
    pub date: Option<String>,
    pub location: Option<String>,
    pub organizer: Option<String>,
    #[serde(default, deserialize_with = "lenient::int")]
    pub max_participants: Option<i64>,
    #[serde(default, deserialize_with = "lenient::int")]
    pub current_participants: Option<i64>,
    #[serde(flatten)]
    pub extra: Document,
}
