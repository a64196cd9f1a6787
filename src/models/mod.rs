use serde::{Deserialize, Deserializer, Serialize};

/// Backend account info object.
///
/// The backend returns this under the `account` field.
/// We keep it flexible to avoid breaking when backend fields evolve.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct AccountInfo {
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

/// A piece of ingested learning content (URL/file upload), as owned by an
/// account. `category_id = None` means "uncategorized".
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct Project {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category_id: Option<String>,

    /// ISO-8601 timestamps as returned by the backend; sorted lexicographically.
    pub created_at: String,
    pub updated_at: String,

    #[serde(default)]
    pub source_count: i64,
    #[serde(default)]
    pub first_source_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub created_at: String,
}

/// Reduced Project projection persisted in localStorage for guest mode.
///
/// `id` tolerates both JSON strings and numbers: older trial records were
/// written with numeric ids, and guest-vs-server comparisons must agree.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct GuestProjectRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub title: String,
    pub created_at: String,
    #[serde(default)]
    pub first_source_id: Option<String>,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub source_count: i64,
}

impl From<GuestProjectRecord> for Project {
    fn from(rec: GuestProjectRecord) -> Self {
        Project {
            id: rec.id,
            title: rec.title,
            description: None,
            category_id: rec.category_id,
            updated_at: rec.created_at.clone(),
            created_at: rec.created_at,
            source_count: rec.source_count,
            first_source_id: rec.first_source_id,
            status: None,
        }
    }
}

fn string_or_number<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    let v = serde_json::Value::deserialize(d)?;
    match v {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

/// One section of the grouped library view. Derived, never persisted.
///
/// `projects` holds the FULL partition sorted by `created_at` descending;
/// the UI shows at most [`GROUP_PREVIEW_LIMIT`](crate::library::GROUP_PREVIEW_LIMIT)
/// of them via [`visible`](Self::visible).
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ProjectGroup {
    /// `None` for the uncategorized bucket.
    pub category_id: Option<String>,
    pub name: String,
    pub total_count: usize,
    pub projects: Vec<Project>,
}

impl ProjectGroup {
    pub fn visible(&self) -> &[Project] {
        let n = self.projects.len().min(crate::library::GROUP_PREVIEW_LIMIT);
        &self.projects[..n]
    }

    /// How many projects are hidden behind the preview truncation.
    pub fn overflow(&self) -> usize {
        self.total_count.saturating_sub(self.visible().len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guest_record_id_accepts_number() {
        let json = r#"{"id": 5, "title": "t", "created_at": "2024-01-01T00:00:00Z"}"#;
        let rec: GuestProjectRecord = serde_json::from_str(json).expect("numeric id should parse");
        assert_eq!(rec.id, "5");
    }

    #[test]
    fn guest_record_id_accepts_string() {
        let json = r#"{"id": "abc", "title": "t", "created_at": "2024-01-01T00:00:00Z"}"#;
        let rec: GuestProjectRecord = serde_json::from_str(json).expect("string id should parse");
        assert_eq!(rec.id, "abc");
    }

    #[test]
    fn guest_record_id_rejects_other_shapes() {
        let json = r#"{"id": {"x": 1}, "title": "t", "created_at": ""}"#;
        assert!(serde_json::from_str::<GuestProjectRecord>(json).is_err());
    }

    #[test]
    fn project_optional_fields_default() {
        let json = r#"{
            "id": "p1",
            "title": "Intro to Rust",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-02T00:00:00Z"
        }"#;
        let p: Project = serde_json::from_str(json).expect("minimal project should parse");
        assert!(p.category_id.is_none());
        assert_eq!(p.source_count, 0);
        assert!(p.status.is_none());
    }
}
