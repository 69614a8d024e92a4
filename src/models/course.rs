use serde::{Deserialize, Serialize};

/// Course document, keyed by (period, code)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, utoipa::ToSchema)]
pub struct Course {
    /// Human-readable identifier, e.g. "COEN 12"
    pub code: String,
    /// Academic period, e.g. "Spring 2025 Quarter"
    pub period: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub instructor: String,
    #[serde(default)]
    pub section: String,
    #[serde(default)]
    pub schedule: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub units: i32,
    #[serde(default)]
    pub student_ids: Vec<String>,
    #[serde(default)]
    pub created_at: i64,
}

impl Course {
    /// Placeholder record created when a student enrolls in an unknown code.
    pub fn bare(period: &str, code: &str) -> Self {
        Course {
            code: code.to_string(),
            period: period.to_string(),
            name: String::new(),
            instructor: String::new(),
            section: String::new(),
            schedule: String::new(),
            location: String::new(),
            units: 0,
            student_ids: vec![],
            created_at: chrono::Utc::now().timestamp(),
        }
    }
}

/// Admin request to add a course to the catalog
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateCourseRequest {
    pub code: String,
    pub name: String,
    pub instructor: String,
    pub section: Option<String>,
    pub schedule: Option<String>,
    pub location: Option<String>,
    pub units: Option<i32>,
}
