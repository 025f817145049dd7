use super::lenient;
use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime, Document};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Tip {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub author: Option<String>,
    pub author_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::int")]
    pub upvotes: Option<i64>,
    pub created_at: Option<BsonDateTime>,
    #[serde(flatten)]
    pub extra: Document,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    #[test]
    fn upvotes_stored_as_double_decode() {
        let tip: Tip = mongodb::bson::from_document(doc! {
            "_id": ObjectId::new(),
            "title": "LED bulbs",
            "upvotes": 12.0,
        })
        .unwrap();
        assert_eq!(tip.upvotes, Some(12));
        assert!(tip.extra.is_empty());
    }
}
