use super::lenient;
use mongodb::bson::{doc, oid::ObjectId, Bson, DateTime as BsonDateTime, Document};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    /// Length of the challenge in days.
    #[serde(default, deserialize_with = "lenient::int")]
    pub duration: Option<i32>,
    /// Free-form goal; clients send both numbers and text.
    pub target: Option<Bson>,
    pub impact_metric: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    /// Email of the user who created the challenge.
    pub created_by: Option<String>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub participants: i64,
    pub created_at: Option<BsonDateTime>,
    /// Client fields outside the ones above, stored as sent.
    #[serde(flatten)]
    pub extra: Document,
}

impl Challenge {
    /// Fresh challenge with a pre-assigned id, zero participants and a
    /// creation timestamp of now.
    pub fn new(fields: ChallengeUpdate, created_by: Option<String>) -> Self {
        Self {
            id: Some(ObjectId::new()),
            title: fields.title,
            category: fields.category,
            description: fields.description,
            image_url: fields.image_url,
            duration: fields.duration,
            target: fields.target,
            impact_metric: fields.impact_metric,
            start_date: fields.start_date,
            end_date: fields.end_date,
            created_by,
            participants: 0,
            created_at: Some(BsonDateTime::now()),
            extra: Document::new(),
        }
    }

    /// Attaches pass-through client fields. Keys the server owns or that
    /// have a typed field are dropped.
    pub fn with_extra(mut self, mut extra: Document) -> Self {
        for key in RESERVED_KEYS {
            extra.remove(key);
        }
        self.extra = extra;
        self
    }
}

const RESERVED_KEYS: [&str; 13] = [
    "_id",
    "title",
    "category",
    "description",
    "imageUrl",
    "duration",
    "target",
    "impactMetric",
    "startDate",
    "endDate",
    "createdBy",
    "participants",
    "createdAt",
];

/// Client-editable challenge fields. Every field is optional; only the ones
/// present are written. The creator, counter and timestamp are not editable.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeUpdate {
    pub title: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub duration: Option<i32>,
    pub target: Option<Bson>,
    pub impact_metric: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl ChallengeUpdate {
    pub fn is_empty(&self) -> bool {
        self.to_set_document().is_empty()
    }

    /// Body of the `$set` stage.
    pub fn to_set_document(&self) -> Document {
        let mut set = doc! {};
        let strings = [
            ("title", &self.title),
            ("category", &self.category),
            ("description", &self.description),
            ("imageUrl", &self.image_url),
            ("impactMetric", &self.impact_metric),
            ("startDate", &self.start_date),
            ("endDate", &self.end_date),
        ];
        for (key, value) in strings {
            if let Some(value) = value {
                set.insert(key, value.clone());
            }
        }
        if let Some(duration) = self.duration {
            set.insert("duration", duration);
        }
        if let Some(target) = &self.target {
            set.insert("target", target.clone());
        }
        set
    }

    /// Applies the present fields; returns whether anything changed.
    pub fn apply(&self, challenge: &mut Challenge) -> bool {
        let before = challenge.clone();

        let targets = [
            (&self.title, &mut challenge.title),
            (&self.category, &mut challenge.category),
            (&self.description, &mut challenge.description),
            (&self.image_url, &mut challenge.image_url),
            (&self.impact_metric, &mut challenge.impact_metric),
            (&self.start_date, &mut challenge.start_date),
            (&self.end_date, &mut challenge.end_date),
        ];
        for (source, target) in targets {
            if let Some(value) = source {
                *target = Some(value.clone());
            }
        }
        if let Some(duration) = self.duration {
            challenge.duration = Some(duration);
        }
        if let Some(target) = &self.target {
            challenge.target = Some(target.clone());
        }

        *challenge != before
    }
}

/// Query over the challenge list.
#[derive(Debug, Clone, Default)]
pub struct ChallengeFilter {
    /// Any-of match on `category`; empty means all categories.
    pub categories: Vec<String>,
    /// Case-insensitive substring match on `title`.
    pub search: Option<String>,
}

impl ChallengeFilter {
    pub fn to_document(&self) -> Document {
        let mut filter = doc! {};
        if !self.categories.is_empty() {
            filter.insert("category", doc! { "$in": self.categories.clone() });
        }
        if let Some(search) = &self.search {
            filter.insert(
                "title",
                doc! { "$regex": escape_regex(search), "$options": "i" },
            );
        }
        filter
    }

    pub fn matches(&self, challenge: &Challenge) -> bool {
        let category_ok = self.categories.is_empty()
            || challenge
                .category
                .as_ref()
                .is_some_and(|c| self.categories.contains(c));

        let search_ok = match &self.search {
            Some(search) => challenge
                .title
                .as_ref()
                .is_some_and(|t| t.to_lowercase().contains(&search.to_lowercase())),
            None => true,
        };

        category_ok && search_ok
    }
}

fn escape_regex(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if "\\.+*?()|[]{}^$#&-~".contains(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
