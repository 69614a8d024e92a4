use serde::Serialize;

use super::{Course, User};

/// Another student sharing at least one course with the requester.
/// Computed per request, never stored.
#[derive(Debug, Serialize, Clone, utoipa::ToSchema)]
pub struct Classmate {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub year: Option<String>,
    pub major: Option<String>,
    pub profile_image_url: Option<String>,
    /// Shared course codes
    pub shared_courses: Vec<String>,
    pub shared_course_details: Vec<Course>,
}

impl Classmate {
    pub fn from_user(user: User, shared_course_details: Vec<Course>) -> Self {
        Classmate {
            first_name: user.resolved_first_name(),
            last_name: user.resolved_last_name(),
            id: user.id,
            email: user.email,
            year: user.year,
            major: user.major,
            profile_image_url: user.photo_url,
            shared_courses: shared_course_details.iter().map(|c| c.code.clone()).collect(),
            shared_course_details,
        }
    }
}
