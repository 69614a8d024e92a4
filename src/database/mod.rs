//! Document store seam.
//!
//! The logical layout is `users/{uid}`, `academicPeriods/{period}/courses/{code}`
//! and `academicPeriods/{period}/courses/{code}/studySessions/{id}`. Array
//! updates (`add_*`/`remove_*`) are set union and set difference on a single
//! document, so they are idempotent. Nothing here spans documents atomically.

#[cfg(test)]
pub mod failing;
pub mod memory;
pub mod mongo;

use async_trait::async_trait;

use crate::models::{Course, ProfileUpdate, StudySession, User};
use crate::utils::AppResult;

#[cfg(test)]
pub use failing::FailingStore;
pub use memory::MemoryStore;
pub use mongo::MongoDB;

#[async_trait]
pub trait Store: Send + Sync {
    /// Cheap round trip used by the health endpoint.
    async fn ping(&self) -> AppResult<()>;

    // ==================== USERS ====================

    async fn get_user(&self, user_id: &str) -> AppResult<Option<User>>;

    /// Fails with `Conflict` when the id is taken.
    async fn insert_user(&self, user: &User) -> AppResult<()>;

    /// Refreshes identity-provider fields on a later sign-in.
    async fn update_user_identity(
        &self,
        user_id: &str,
        email: &str,
        photo_url: Option<&str>,
    ) -> AppResult<bool>;

    async fn update_profile(&self, user_id: &str, profile: &ProfileUpdate) -> AppResult<bool>;

    /// Adds the (period, code) enrollment. Returns false when the user
    /// document does not exist.
    async fn add_user_course(&self, user_id: &str, period: &str, course_code: &str)
        -> AppResult<bool>;

    async fn remove_user_course(
        &self,
        user_id: &str,
        period: &str,
        course_code: &str,
    ) -> AppResult<bool>;

    async fn list_users(&self) -> AppResult<Vec<User>>;

    /// Users enrolled in `period` in at least one of `course_codes`.
    async fn find_users_with_any_course(
        &self,
        period: &str,
        course_codes: &[String],
    ) -> AppResult<Vec<User>>;

    async fn count_users(&self) -> AppResult<u64>;

    // ==================== COURSES ====================

    async fn get_course(&self, period: &str, code: &str) -> AppResult<Option<Course>>;

    /// Ordered by code.
    async fn list_courses(&self, period: &str) -> AppResult<Vec<Course>>;

    /// Fails with `Conflict` when the code already exists in the period.
    async fn insert_course(&self, course: &Course) -> AppResult<()>;

    /// Writes the catalog fields, keeping any existing student ids.
    async fn upsert_course(&self, course: &Course) -> AppResult<()>;

    /// Creates a bare course record when the code is unknown.
    async fn add_course_student(&self, period: &str, code: &str, user_id: &str) -> AppResult<()>;

    async fn remove_course_student(&self, period: &str, code: &str, user_id: &str)
        -> AppResult<()>;

    // ==================== STUDY SESSIONS ====================

    /// Ordered by start time.
    async fn list_sessions(&self, period: &str, course_code: &str) -> AppResult<Vec<StudySession>>;

    async fn get_session(
        &self,
        period: &str,
        course_code: &str,
        session_id: &str,
    ) -> AppResult<Option<StudySession>>;

    async fn insert_session(&self, session: &StudySession) -> AppResult<()>;

    async fn add_session_attendee(
        &self,
        period: &str,
        course_code: &str,
        session_id: &str,
        user_id: &str,
    ) -> AppResult<bool>;

    async fn remove_session_attendee(
        &self,
        period: &str,
        course_code: &str,
        session_id: &str,
        user_id: &str,
    ) -> AppResult<bool>;
}
