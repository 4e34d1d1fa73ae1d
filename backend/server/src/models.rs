use chrono::{DateTime, Utc};
use mongodb::bson::{self, oid::ObjectId};
use serde::{Deserialize, Serialize};

pub const THOUGHTS_COLLECTION: &str = "thoughts";
pub const THOUGHT_ID: &str = "_id";
pub const THOUGHT_LIKES: &str = "likes";
pub const THOUGHT_CREATED_AT: &str = "createdAt";

/// Number of thoughts returned by the listing.
pub const RECENT_LIMIT: usize = 20;

/// A thought as served over HTTP.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Thought {
    #[serde(rename = "_id")]
    pub id: String,
    pub message: String,
    pub name: String,
    pub likes: i64,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /thoughts`.
///
/// Fields are optional so that a missing field is reported as a validation
/// error rather than a body parse failure. `createdAt` is accepted and ignored.
#[derive(Debug, Default, Deserialize)]
pub struct NewThought {
    pub message: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: Option<serde_json::Value>,
}

/// A thought that passed validation, trimmed and ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidThought {
    pub message: String,
    pub name: String,
}

/// Stored shape in the `thoughts` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThoughtDocument {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub message: String,
    pub name: String,
    #[serde(default)]
    pub likes: i64,
    #[serde(rename = "createdAt")]
    pub created_at: bson::DateTime,
}

impl ThoughtDocument {
    pub fn new(thought: ValidThought, created_at: DateTime<Utc>) -> Self {
        Self {
            id: ObjectId::new(),
            message: thought.message,
            name: thought.name,
            likes: 0,
            created_at: bson::DateTime::from_millis(created_at.timestamp_millis()),
        }
    }
}

impl From<ThoughtDocument> for Thought {
    fn from(document: ThoughtDocument) -> Self {
        let created_at = DateTime::from_timestamp_millis(document.created_at.timestamp_millis())
            .unwrap_or(DateTime::UNIX_EPOCH);

        Self {
            id: document.id.to_hex(),
            message: document.message,
            name: document.name,
            likes: document.likes,
            created_at,
        }
    }
}

/// Current time at the millisecond precision the store keeps.
pub fn now() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_starts_with_zero_likes() {
        let created_at = now();
        let document = ThoughtDocument::new(
            ValidThought {
                message: "Hello world!".into(),
                name: "Ann".into(),
            },
            created_at,
        );

        let thought = Thought::from(document.clone());
        assert_eq!(thought.likes, 0);
        assert_eq!(thought.id, document.id.to_hex());
        assert_eq!(thought.created_at, created_at);
    }

    #[test]
    fn test_thought_serializes_mongo_field_names() {
        let thought = Thought {
            id: "65a1f0c2e4b0a1b2c3d4e5f6".into(),
            message: "Hello world!".into(),
            name: "Ann".into(),
            likes: 3,
            created_at: DateTime::from_timestamp_millis(0).unwrap(),
        };

        let json = serde_json::to_value(&thought).unwrap();
        assert_eq!(json["_id"], "65a1f0c2e4b0a1b2c3d4e5f6");
        assert_eq!(json["likes"], 3);
        assert_eq!(json["createdAt"], "1970-01-01T00:00:00Z");
    }

    #[test]
    fn test_new_thought_ignores_unknown_shapes_of_created_at() {
        let payload: NewThought = serde_json::from_str(
            r#"{"message":"Hello world!","name":"Ann","createdAt":"2001-01-01"}"#,
        )
        .unwrap();

        assert_eq!(payload.message.as_deref(), Some("Hello world!"));
        assert!(payload.created_at.is_some());
    }
}
