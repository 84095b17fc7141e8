//! Input records as they arrive from the member store.
//!
//! Ids may be numbers or strings; both are accepted and canonicalized to a
//! string by [`RecordId::canonical`]. For `parent-child` relationships
//! `member1Id` is always the parent and `member2Id` the child.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    #[serde(rename = "TB", alias = "TD")]
    TopBottom,
    #[serde(rename = "LR")]
    LeftRight,
}

impl Direction {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "TD" | "TB" => Some(Self::TopBottom),
            "LR" => Some(Self::LeftRight),
            _ => None,
        }
    }

    pub fn as_token(self) -> &'static str {
        match self {
            Self::TopBottom => "TB",
            Self::LeftRight => "LR",
        }
    }

    /// True when generations advance along the x axis.
    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::LeftRight)
    }
}

/// A member or relationship id exactly as the store sent it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Unsigned(u64),
    Float(f64),
    Text(String),
}

impl RecordId {
    pub fn canonical(&self) -> String {
        match self {
            Self::Int(value) => value.to_string(),
            Self::Unsigned(value) => value.to_string(),
            Self::Float(value) if value.fract() == 0.0 && value.is_finite() => {
                format!("{value:.0}")
            }
            Self::Float(value) => value.to_string(),
            Self::Text(value) => value.trim().to_string(),
        }
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for RecordId {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: RecordId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default, alias = "birth_date")]
    pub birth_date: Option<String>,
    #[serde(default, alias = "image_url")]
    pub image_url: Option<String>,
    /// Remaining display attributes, passed through to the renderer untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Member {
    pub fn new(id: impl Into<RecordId>, name: &str) -> Self {
        Self {
            id: id.into(),
            name: Some(name.to_string()),
            gender: None,
            birth_date: None,
            image_url: None,
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationshipKind {
    Partner,
    ParentChild,
}

impl RelationshipKind {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim() {
            "partner" => Some(Self::Partner),
            "parent-child" | "parent_child" => Some(Self::ParentChild),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    #[serde(rename = "member1Id", alias = "member1_id")]
    pub member1_id: RecordId,
    #[serde(rename = "member2Id", alias = "member2_id")]
    pub member2_id: RecordId,
    #[serde(
        rename = "relationshipType",
        alias = "relationship_type",
        alias = "type"
    )]
    pub relationship_type: String,
}

impl Relationship {
    pub fn partner(a: impl Into<RecordId>, b: impl Into<RecordId>) -> Self {
        Self {
            member1_id: a.into(),
            member2_id: b.into(),
            relationship_type: "partner".to_string(),
        }
    }

    pub fn parent_child(parent: impl Into<RecordId>, child: impl Into<RecordId>) -> Self {
        Self {
            member1_id: parent.into(),
            member2_id: child.into(),
            relationship_type: "parent-child".to_string(),
        }
    }

    pub fn kind(&self) -> Option<RelationshipKind> {
        RelationshipKind::from_token(&self.relationship_type)
    }
}

/// One snapshot of the member store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

impl Dataset {
    pub fn new(members: Vec<Member>, relationships: Vec<Relationship>) -> Self {
        Self {
            members,
            relationships,
        }
    }

    pub fn from_json(input: &str) -> serde_json::Result<Self> {
        serde_json::from_str(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_and_string_ids_canonicalize() {
        assert_eq!(RecordId::Int(42).canonical(), "42");
        assert_eq!(RecordId::Float(7.0).canonical(), "7");
        assert_eq!(RecordId::Text(" abc ".to_string()).canonical(), "abc");
    }

    #[test]
    fn large_ids_stay_distinct() {
        let ids: Vec<RecordId> =
            serde_json::from_str("[9223372036854775807, 9223372036854775808, 18446744073709551615]")
                .expect("ids");
        let canonical: Vec<String> = ids.iter().map(RecordId::canonical).collect();
        assert_eq!(
            canonical,
            vec!["9223372036854775807", "9223372036854775808", "18446744073709551615"]
        );
        assert_eq!(RecordId::Float(1e20).canonical(), "100000000000000000000");
        assert_eq!(RecordId::Float(-3.0).canonical(), "-3");
    }

    #[test]
    fn parses_snake_case_store_records() {
        let input = r#"{
            "members": [
                {"id": 1, "name": "Ada", "birth_date": "1901-02-03", "image_url": "a.png", "nickname": "A"},
                {"id": "2", "name": "Ben"}
            ],
            "relationships": [
                {"member1_id": 1, "member2_id": "2", "relationship_type": "partner"}
            ]
        }"#;
        let dataset = Dataset::from_json(input).expect("parse");
        assert_eq!(dataset.members.len(), 2);
        assert_eq!(dataset.members[0].birth_date.as_deref(), Some("1901-02-03"));
        assert_eq!(dataset.members[0].image_url.as_deref(), Some("a.png"));
        assert_eq!(
            dataset.members[0].extra.get("nickname"),
            Some(&Value::String("A".to_string()))
        );
        assert_eq!(
            dataset.relationships[0].kind(),
            Some(RelationshipKind::Partner)
        );
        assert_eq!(dataset.relationships[0].member2_id.canonical(), "2");
    }

    #[test]
    fn parses_camel_case_records() {
        let input = r#"{
            "members": [{"id": "p", "birthDate": "2000-01-01", "imageUrl": "p.png"}],
            "relationships": [{"member1Id": "p", "member2Id": "c", "type": "parent-child"}]
        }"#;
        let dataset = Dataset::from_json(input).expect("parse");
        assert_eq!(dataset.members[0].image_url.as_deref(), Some("p.png"));
        assert_eq!(
            dataset.relationships[0].kind(),
            Some(RelationshipKind::ParentChild)
        );
    }

    #[test]
    fn direction_tokens() {
        assert_eq!(Direction::from_token("TD"), Some(Direction::TopBottom));
        assert_eq!(Direction::from_token("LR"), Some(Direction::LeftRight));
        assert_eq!(Direction::from_token("RL"), None);
    }
}
