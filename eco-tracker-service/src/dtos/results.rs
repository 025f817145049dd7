//! Write acknowledgements shaped like the MongoDB driver results that
//! existing clients already parse.

use crate::models::UpdateOutcome;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InsertResult {
    pub acknowledged: bool,
    pub inserted_id: String,
}

impl From<ObjectId> for InsertResult {
    fn from(id: ObjectId) -> Self {
        Self {
            acknowledged: true,
            inserted_id: id.to_hex(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
}

impl From<UpdateOutcome> for UpdateResult {
    fn from(outcome: UpdateOutcome) -> Self {
        Self {
            acknowledged: true,
            matched_count: outcome.matched,
            modified_count: outcome.modified,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

impl From<u64> for DeleteResult {
    fn from(deleted_count: u64) -> Self {
        Self {
            acknowledged: true,
            deleted_count,
        }
    }
}
