use serde::{Deserialize, Serialize};

use crate::utils::text::split_display_name;

pub const ACADEMIC_YEARS: [&str; 5] = ["freshman", "sophomore", "junior", "senior", "graduate"];

/// A course code a user enrolled in for one academic period.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, utoipa::ToSchema)]
pub struct Enrollment {
    pub period: String,
    pub code: String,
}

impl Enrollment {
    pub fn new(period: &str, code: &str) -> Self {
        Enrollment {
            period: period.to_string(),
            code: code.to_string(),
        }
    }
}

/// User document in the "users" collection. `_id` is the identity provider uid.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub major: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    /// Treated as a set of (period, code) pairs, in enrollment order
    #[serde(default)]
    pub enrollments: Vec<Enrollment>,
    #[serde(default)]
    pub profile_complete: bool,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

impl User {
    /// Fresh document written on first sign-in.
    pub fn new_from_identity(
        id: &str,
        email: &str,
        display_name: Option<String>,
        photo_url: Option<String>,
    ) -> Self {
        let now = chrono::Utc::now().timestamp();
        User {
            id: id.to_string(),
            email: email.to_string(),
            display_name,
            first_name: None,
            last_name: None,
            year: None,
            major: None,
            photo_url,
            enrollments: vec![],
            profile_complete: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Profile first name, else first word of the display name, else "Unknown".
    pub fn resolved_first_name(&self) -> String {
        if let Some(first) = self.first_name.as_deref().filter(|s| !s.is_empty()) {
            return first.to_string();
        }
        self.display_name
            .as_deref()
            .and_then(|name| split_display_name(name).0)
            .unwrap_or_else(|| "Unknown".to_string())
    }

    /// Profile last name, else the remaining words of the display name, else "".
    pub fn resolved_last_name(&self) -> String {
        if let Some(last) = self.last_name.as_deref().filter(|s| !s.is_empty()) {
            return last.to_string();
        }
        self.display_name
            .as_deref()
            .map(|name| split_display_name(name).1)
            .unwrap_or_default()
    }

    /// Course codes enrolled in `period`, in enrollment order.
    pub fn courses_in(&self, period: &str) -> Vec<String> {
        self.enrollments
            .iter()
            .filter(|e| e.period == period)
            .map(|e| e.code.clone())
            .collect()
    }

    pub fn is_enrolled(&self, period: &str, code: &str) -> bool {
        self.enrollments
            .iter()
            .any(|e| e.period == period && e.code == code)
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id.clone(),
            first_name: self.resolved_first_name(),
            last_name: self.resolved_last_name(),
            profile_image_url: self.photo_url.clone(),
        }
    }
}

/// Compact profile shown for session attendees and creators.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, utoipa::ToSchema)]
pub struct UserSummary {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub profile_image_url: Option<String>,
}

/// User as returned by the API
#[derive(Debug, Serialize, Clone, utoipa::ToSchema)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub year: Option<String>,
    pub major: Option<String>,
    pub profile_image_url: Option<String>,
    pub enrollments: Vec<Enrollment>,
    pub profile_complete: bool,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            first_name: user.resolved_first_name(),
            last_name: user.resolved_last_name(),
            id: user.id,
            email: user.email,
            display_name: user.display_name,
            year: user.year,
            major: user.major,
            profile_image_url: user.photo_url,
            enrollments: user.enrollments,
            profile_complete: user.profile_complete,
        }
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CompleteProfileRequest {
    pub first_name: String,
    pub last_name: String,
    /// One of freshman, sophomore, junior, senior, graduate
    pub year: String,
    pub major: String,
}

/// Validated field set written by profile completion.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileUpdate {
    pub first_name: String,
    pub last_name: String,
    pub display_name: String,
    pub year: String,
    pub major: String,
    pub updated_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(display_name: Option<&str>) -> User {
        User::new_from_identity("u1", "ada@scu.edu", display_name.map(String::from), None)
    }

    #[test]
    fn test_names_fall_back_to_display_name() {
        let u = user(Some("Ada King Lovelace"));
        assert_eq!(u.resolved_first_name(), "Ada");
        assert_eq!(u.resolved_last_name(), "King Lovelace");
    }

    #[test]
    fn test_names_without_any_source() {
        let u = user(None);
        assert_eq!(u.resolved_first_name(), "Unknown");
        assert_eq!(u.resolved_last_name(), "");
    }

    #[test]
    fn test_profile_names_win_over_display_name() {
        let mut u = user(Some("Ada Lovelace"));
        u.first_name = Some("Augusta".into());
        u.last_name = Some("Byron".into());
        let summary = u.summary();
        assert_eq!(summary.first_name, "Augusta");
        assert_eq!(summary.last_name, "Byron");
    }

    #[test]
    fn test_new_user_needs_profile_setup() {
        let u = user(Some("Ada Lovelace"));
        assert!(!u.profile_complete);
        assert!(u.enrollments.is_empty());
    }

    #[test]
    fn test_courses_are_scoped_to_period() {
        let mut u = user(None);
        u.enrollments = vec![
            Enrollment::new("Fall 2024 Quarter", "COEN 12"),
            Enrollment::new("Spring 2025 Quarter", "MATH 53"),
            Enrollment::new("Spring 2025 Quarter", "COEN 20"),
        ];
        assert_eq!(u.courses_in("Spring 2025 Quarter"), vec!["MATH 53", "COEN 20"]);
        assert!(u.is_enrolled("Fall 2024 Quarter", "COEN 12"));
        assert!(!u.is_enrolled("Spring 2025 Quarter", "COEN 12"));
    }
}
