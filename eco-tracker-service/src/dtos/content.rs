use super::{extra_fields, rfc3339};
use crate::models::{Event, Tip};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TipResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub author: Option<String>,
    pub author_name: Option<String>,
    pub upvotes: Option<i64>,
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl From<Tip> for TipResponse {
    fn from(tip: Tip) -> Self {
        Self {
            id: tip.id.map(|id| id.to_hex()).unwrap_or_default(),
            title: tip.title,
            content: tip.content,
            category: tip.category,
            author: tip.author,
            author_name: tip.author_name,
            upvotes: tip.upvotes,
            created_at: rfc3339(tip.created_at),
            extra: extra_fields(tip.extra),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub location: Option<String>,
    pub organizer: Option<String>,
    pub max_participants: Option<i64>,
    pub current_participants: Option<i64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl From<Event> for EventResponse {
    fn from(event: Event) -> Self {
        Self {
            id: event.id.map(|id| id.to_hex()).unwrap_or_default(),
            title: event.title,
            description: event.description,
            date: event.date,
            location: event.location,
            organizer: event.organizer,
            max_participants: event.max_participants,
            current_participants: event.current_participants,
            extra: extra_fields(event.extra),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    #[test]
    fn extra_fields_are_flattened_into_the_response() {
        let event = Event {
            title: Some("River clean-up".to_string()),
            date: Some("2026-11-02".to_string()),
            extra: doc! { "image": "https://img.example/river.jpg" },
            ..Default::default()
        };
        let json = serde_json::to_value(EventResponse::from(event)).unwrap();
        assert_eq!(json["title"], "River clean-up");
        assert_eq!(json["image"], "https://img.example/river.jpg");
    }
}
