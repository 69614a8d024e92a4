//! Store double that delegates to [`MemoryStore`] and fails selected calls
//! with `DatabaseError`. It can also land an enrollment in the middle of a
//! user scan, as a concurrent request would.

use std::collections::HashSet;

use async_trait::async_trait;

use super::{MemoryStore, Store};
use crate::models::{Course, ProfileUpdate, StudySession, User};
use crate::utils::{AppError, AppResult};

#[derive(Default)]
pub struct FailingStore {
    pub inner: MemoryStore,
    /// `get_user` fails for these ids.
    pub failing_user_reads: HashSet<String>,
    pub fail_user_queries: bool,
    pub fail_course_student_writes: bool,
    /// (user id, period, code) enrolled on both sides right after
    /// `list_users` takes its snapshot.
    pub enroll_during_user_scan: Option<(String, String, String)>,
}

impl FailingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_reads_of(mut self, user_id: &str) -> Self {
        self.failing_user_reads.insert(user_id.to_string());
        self
    }

    fn unavailable(what: &str) -> AppError {
        AppError::DatabaseError(format!("{} unavailable", what))
    }
}

#[async_trait]
impl Store for FailingStore {
    async fn ping(&self) -> AppResult<()> {
        self.inner.ping().await
    }

    async fn get_user(&self, user_id: &str) -> AppResult<Option<User>> {
        if self.failing_user_reads.contains(user_id) {
            return Err(Self::unavailable("users"));
        }
        self.inner.get_user(user_id).await
    }

    async fn insert_user(&self, user: &User) -> AppResult<()> {
        self.inner.insert_user(user).await
    }

    async fn update_user_identity(
        &self,
        user_id: &str,
        email: &str,
        photo_url: Option<&str>,
    ) -> AppResult<bool> {
        self.inner.update_user_identity(user_id, email, photo_url).await
    }

    async fn update_profile(&self, user_id: &str, profile: &ProfileUpdate) -> AppResult<bool> {
        self.inner.update_profile(user_id, profile).await
    }

    async fn add_user_course(&self, user_id: &str, period: &str, course_code: &str)
        -> AppResult<bool> {
        self.inner.add_user_course(user_id, period, course_code).await
    }

    async fn remove_user_course(
        &self,
        user_id: &str,
        period: &str,
        course_code: &str,
    ) -> AppResult<bool> {
        self.inner.remove_user_course(user_id, period, course_code).await
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        if self.fail_user_queries {
            return Err(Self::unavailable("users"));
        }
        let users = self.inner.list_users().await?;
        if let Some((user_id, period, code)) = &self.enroll_during_user_scan {
            self.inner.add_user_course(user_id, period, code).await?;
            self.inner.add_course_student(period, code, user_id).await?;
        }
        Ok(users)
    }

    async fn find_users_with_any_course(
        &self,
        period: &str,
        course_codes: &[String],
    ) -> AppResult<Vec<User>> {
        if self.fail_user_queries {
            return Err(Self::unavailable("users"));
        }
        self.inner.find_users_with_any_course(period, course_codes).await
    }

    async fn count_users(&self) -> AppResult<u64> {
        self.inner.count_users().await
    }

    async fn get_course(&self, period: &str, code: &str) -> AppResult<Option<Course>> {
        self.inner.get_course(period, code).await
    }

    async fn list_courses(&self, period: &str) -> AppResult<Vec<Course>> {
        self.inner.list_courses(period).await
    }

    async fn insert_course(&self, course: &Course) -> AppResult<()> {
        self.inner.insert_course(course).await
    }

    async fn upsert_course(&self, course: &Course) -> AppResult<()> {
        self.inner.upsert_course(course).await
    }

    async fn add_course_student(&self, period: &str, code: &str, user_id: &str) -> AppResult<()> {
        if self.fail_course_student_writes {
            return Err(Self::unavailable("courses"));
        }
        self.inner.add_course_student(period, code, user_id).await
    }

    async fn remove_course_student(&self, period: &str, code: &str, user_id: &str)
        -> AppResult<()> {
        if self.fail_course_student_writes {
            return Err(Self::unavailable("courses"));
        }
        self.inner.remove_course_student(period, code, user_id).await
    }

    async fn list_sessions(&self, period: &str, course_code: &str) -> AppResult<Vec<StudySession>> {
        self.inner.list_sessions(period, course_code).await
    }

    async fn get_session(
        &self,
        period: &str,
        course_code: &str,
        session_id: &str,
    ) -> AppResult<Option<StudySession>> {
        self.inner.get_session(period, course_code, session_id).await
    }

    async fn insert_session(&self, session: &StudySession) -> AppResult<()> {
        self.inner.insert_session(session).await
    }

    async fn add_session_attendee(
        &self,
        period: &str,
        course_code: &str,
        session_id: &str,
        user_id: &str,
    ) -> AppResult<bool> {
        self.inner
            .add_session_attendee(period, course_code, session_id, user_id)
            .await
    }

    async fn remove_session_attendee(
        &self,
        period: &str,
        course_code: &str,
        session_id: &str,
        user_id: &str,
    ) -> AppResult<bool> {
        self.inner
            .remove_session_attendee(period, course_code, session_id, user_id)
            .await
    }
}
