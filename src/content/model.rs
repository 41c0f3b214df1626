use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Work metadata as served by `GET /get/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkMetadata {
    pub student_name: String,
    pub assignment_name: String,
    #[serde(default)]
    pub uploaded_at: Option<DateTime<Utc>>,
}

impl WorkMetadata {
    pub fn new(student_name: impl Into<String>, assignment_name: impl Into<String>) -> Self {
        Self {
            student_name: student_name.into(),
            assignment_name: assignment_name.into(),
            uploaded_at: None,
        }
    }
}
