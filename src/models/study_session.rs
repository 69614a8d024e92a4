use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Course, UserSummary};

/// Study session document (collection "study_sessions")
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StudySession {
    #[serde(rename = "_id")]
    pub id: String,
    pub period: String,
    pub course_code: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub location: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub creator_id: String,
    /// Treated as a set
    #[serde(default)]
    pub attendee_ids: Vec<String>,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

/// Request to create a study session
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateStudySessionRequest {
    pub course_code: String,
    pub title: String,
    pub description: Option<String>,
    pub location: String,
    #[schema(value_type = String, format = DateTime)]
    pub start_time: DateTime<Utc>,
    #[schema(value_type = String, format = DateTime)]
    pub end_time: DateTime<Utc>,
    pub attendee_ids: Option<Vec<String>>,
}

/// Session as returned by the API, with `id` instead of `_id`
#[derive(Debug, Serialize, Clone, PartialEq, utoipa::ToSchema)]
pub struct StudySessionResponse {
    pub id: String,
    pub period: String,
    pub course_code: String,
    pub title: String,
    pub description: Option<String>,
    pub location: String,
    #[schema(value_type = String, format = DateTime)]
    pub start_time: DateTime<Utc>,
    #[schema(value_type = String, format = DateTime)]
    pub end_time: DateTime<Utc>,
    pub creator_id: String,
    pub attendee_ids: Vec<String>,
    pub created_at: i64,
}

impl From<StudySession> for StudySessionResponse {
    fn from(session: StudySession) -> Self {
        StudySessionResponse {
            id: session.id,
            period: session.period,
            course_code: session.course_code,
            title: session.title,
            description: session.description,
            location: session.location,
            start_time: session.start_time,
            end_time: session.end_time,
            creator_id: session.creator_id,
            attendee_ids: session.attendee_ids,
            created_at: session.created_at,
        }
    }
}

/// Session with its course, attendee profiles and creator profile resolved.
#[derive(Debug, Serialize, Clone)]
pub struct SessionView {
    #[serde(flatten)]
    pub session: StudySessionResponse,
    pub course: Course,
    pub attendees: Vec<UserSummary>,
    pub creator: Option<UserSummary>,
}
