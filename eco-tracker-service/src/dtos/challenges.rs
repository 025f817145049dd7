use super::{extra_fields, rfc3339};
use crate::models::{Challenge, ChallengeFilter, ChallengeUpdate};
use mongodb::bson::Bson;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub duration: Option<i32>,
    pub target: Option<serde_json::Value>,
    pub impact_metric: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub created_by: Option<String>,
    pub participants: i64,
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl From<Challenge> for ChallengeResponse {
    fn from(challenge: Challenge) -> Self {
        Self {
            id: challenge.id.map(|id| id.to_hex()).unwrap_or_default(),
            title: challenge.title,
            category: challenge.category,
            description: challenge.description,
            image_url: challenge.image_url,
            duration: challenge.duration,
            target: challenge.target.map(Bson::into_relaxed_extjson),
            impact_metric: challenge.impact_metric,
            start_date: challenge.start_date,
            end_date: challenge.end_date,
            created_by: challenge.created_by,
            participants: challenge.participants,
            created_at: rfc3339(challenge.created_at),
            extra: extra_fields(challenge.extra),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateChallengeRequest {
    #[serde(flatten)]
    pub fields: ChallengeUpdate,
    pub created_by: Option<String>,
    /// Everything else the client sent.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChallengeListQuery {
    /// Comma separated list of categories.
    pub category: Option<String>,
    pub search: Option<String>,
}

impl From<ChallengeListQuery> for ChallengeFilter {
    fn from(query: ChallengeListQuery) -> Self {
        let categories = query
            .category
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(|s| s.to_string())
                    .collect()
            })
            .unwrap_or_default();

        let search = query
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        ChallengeFilter { categories, search }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_query_splits_categories() {
        let filter = ChallengeFilter::from(ChallengeListQuery {
            category: Some("Energy, Water,,".to_string()),
            search: Some("   ".to_string()),
        });
        assert_eq!(filter.categories, vec!["Energy", "Water"]);
        assert!(filter.search.is_none());
    }

    #[test]
    fn create_request_reads_camel_case_fields() {
        let request: CreateChallengeRequest = serde_json::from_value(serde_json::json!({
            "title": "Plastic-free July",
            "imageUrl": "https://img.example/plastic.jpg",
            "impactMetric": "kg plastic saved",
            "duration": 31,
            "createdBy": "ana@example.com",
            "participants": 999
        }))
        .unwrap();

        assert_eq!(request.fields.title.as_deref(), Some("Plastic-free July"));
        assert_eq!(request.fields.impact_metric.as_deref(), Some("kg plastic saved"));
        assert_eq!(request.fields.duration, Some(31));
        assert_eq!(request.created_by.as_deref(), Some("ana@example.com"));
        assert_eq!(request.extra.len(), 1);
        assert_eq!(request.extra["participants"], 999);
    }

    #[test]
    fn create_request_accepts_numeric_target() {
        let request: CreateChallengeRequest = serde_json::from_value(serde_json::json!({
            "title": "Bike to work",
            "target": 10,
            "tags": ["commute"]
        }))
        .unwrap();

        assert!(matches!(
            request.fields.target,
            Some(Bson::Int32(10)) | Some(Bson::Int64(10))
        ));
        assert_eq!(request.extra["tags"][0], "commute");
    }

    #[test]
    fn response_renders_id_as_hex() {
        let challenge = Challenge::new(Default::default(), None);
        let hex = challenge.id.unwrap().to_hex();
        let json = serde_json::to_value(ChallengeResponse::from(challenge)).unwrap();
        assert_eq!(json["_id"], hex.as_str());
        assert_eq!(json["participants"], 0);
        assert!(json["createdAt"].is_string());
    }
}
