use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::Store;
use crate::models::{Course, Enrollment, ProfileUpdate, StudySession, User};
use crate::utils::{AppError, AppResult};

#[derive(Default)]
struct MemoryState {
    users: BTreeMap<String, User>,
    /// Keyed by (period, code)
    courses: BTreeMap<(String, String), Course>,
    /// Insertion order
    sessions: Vec<StudySession>,
}

/// In-process store with the same set semantics as the MongoDB backend.
/// Used by the test suites and by `STORE_BACKEND=memory`.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

fn add_to_set(values: &mut Vec<String>, value: &str) {
    if !values.iter().any(|v| v == value) {
        values.push(value.to_string());
    }
}

fn remove_from_set(values: &mut Vec<String>, value: &str) {
    values.retain(|v| v != value);
}

fn course_key(period: &str, code: &str) -> (String, String) {
    (period.to_string(), code.to_string())
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> AppResult<RwLockReadGuard<'_, MemoryState>> {
        self.state
            .read()
            .map_err(|_| AppError::DatabaseError("memory store lock poisoned".into()))
    }

    fn write(&self) -> AppResult<RwLockWriteGuard<'_, MemoryState>> {
        self.state
            .write()
            .map_err(|_| AppError::DatabaseError("memory store lock poisoned".into()))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> AppResult<()> {
        self.read().map(|_| ())
    }

    async fn get_user(&self, user_id: &str) -> AppResult<Option<User>> {
        Ok(self.read()?.users.get(user_id).cloned())
    }

    async fn insert_user(&self, user: &User) -> AppResult<()> {
        let mut state = self.write()?;
        if state.users.contains_key(&user.id) {
            return Err(AppError::Conflict(format!("User {} already exists", user.id)));
        }
        state.users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn update_user_identity(
        &self,
        user_id: &str,
        email: &str,
        photo_url: Option<&str>,
    ) -> AppResult<bool> {
        let mut state = self.write()?;
        match state.users.get_mut(user_id) {
            Some(user) => {
                user.email = email.to_string();
                user.photo_url = photo_url.map(String::from);
                user.updated_at = chrono::Utc::now().timestamp();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_profile(&self, user_id: &str, profile: &ProfileUpdate) -> AppResult<bool> {
        let mut state = self.write()?;
        match state.users.get_mut(user_id) {
            Some(user) => {
                user.first_name = Some(profile.first_name.clone());
                user.last_name = Some(profile.last_name.clone());
                user.display_name = Some(profile.display_name.clone());
                user.year = Some(profile.year.clone());
                user.major = Some(profile.major.clone());
                user.profile_complete = true;
                user.updated_at = profile.updated_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn add_user_course(
        &self,
        user_id: &str,
        period: &str,
        course_code: &str,
    ) -> AppResult<bool> {
        let mut state = self.write()?;
        match state.users.get_mut(user_id) {
            Some(user) => {
                if !user.is_enrolled(period, course_code) {
                    user.enrollments.push(Enrollment::new(period, course_code));
                }
                user.updated_at = chrono::Utc::now().timestamp();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn remove_user_course(
        &self,
        user_id: &str,
        period: &str,
        course_code: &str,
    ) -> AppResult<bool> {
        let mut state = self.write()?;
        match state.users.get_mut(user_id) {
            Some(user) => {
                user.enrollments
                    .retain(|e| !(e.period == period && e.code == course_code));
                user.updated_at = chrono::Utc::now().timestamp();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        Ok(self.read()?.users.values().cloned().collect())
    }

    async fn find_users_with_any_course(
        &self,
        period: &str,
        course_codes: &[String],
    ) -> AppResult<Vec<User>> {
        Ok(self
            .read()?
            .users
            .values()
            .filter(|u| u.courses_in(period).iter().any(|c| course_codes.contains(c)))
            .cloned()
            .collect())
    }

    async fn count_users(&self) -> AppResult<u64> {
        Ok(self.read()?.users.len() as u64)
    }

    async fn get_course(&self, period: &str, code: &str) -> AppResult<Option<Course>> {
        Ok(self.read()?.courses.get(&course_key(period, code)).cloned())
    }

    async fn list_courses(&self, period: &str) -> AppResult<Vec<Course>> {
        Ok(self
            .read()?
            .courses
            .values()
            .filter(|c| c.period == period)
            .cloned()
            .collect())
    }

    async fn insert_course(&self, course: &Course) -> AppResult<()> {
        let mut state = self.write()?;
        let key = course_key(&course.period, &course.code);
        if state.courses.contains_key(&key) {
            return Err(AppError::Conflict(format!(
                "Course {} already exists in {}",
                course.code, course.period
            )));
        }
        state.courses.insert(key, course.clone());
        Ok(())
    }

    async fn upsert_course(&self, course: &Course) -> AppResult<()> {
        let mut state = self.write()?;
        let key = course_key(&course.period, &course.code);
        let student_ids = state
            .courses
            .get(&key)
            .map(|existing| existing.student_ids.clone())
            .unwrap_or_default();
        let mut course = course.clone();
        course.student_ids = student_ids;
        state.courses.insert(key, course);
        Ok(())
    }

    async fn add_course_student(&self, period: &str, code: &str, user_id: &str) -> AppResult<()> {
        let mut state = self.write()?;
        let course = state
            .courses
            .entry(course_key(period, code))
            .or_insert_with(|| Course::bare(period, code));
        add_to_set(&mut course.student_ids, user_id);
        Ok(())
    }

    async fn remove_course_student(
        &self,
        period: &str,
        code: &str,
        user_id: &str,
    ) -> AppResult<()> {
        let mut state = self.write()?;
        match state.courses.get_mut(&course_key(period, code)) {
            Some(course) => {
                remove_from_set(&mut course.student_ids, user_id);
                Ok(())
            }
            None => Err(AppError::NotFound(format!("Course {} not found", code))),
        }
    }

    async fn list_sessions(&self, period: &str, course_code: &str) -> AppResult<Vec<StudySession>> {
        let mut sessions: Vec<StudySession> = self
            .read()?
            .sessions
            .iter()
            .filter(|s| s.period == period && s.course_code == course_code)
            .cloned()
            .collect();
        sessions.sort_by(|a, b| a.start_time.cmp(&b.start_time));
        Ok(sessions)
    }

    async fn get_session(
        &self,
        period: &str,
        course_code: &str,
        session_id: &str,
    ) -> AppResult<Option<StudySession>> {
        Ok(self
            .read()?
            .sessions
            .iter()
            .find(|s| s.period == period && s.course_code == course_code && s.id == session_id)
            .cloned())
    }

    async fn insert_session(&self, session: &StudySession) -> AppResult<()> {
        let mut state = self.write()?;
        if state.sessions.iter().any(|s| s.id == session.id) {
            return Err(AppError::Conflict(format!("Session {} already exists", session.id)));
        }
        state.sessions.push(session.clone());
        Ok(())
    }

    async fn add_session_attendee(
        &self,
        period: &str,
        course_code: &str,
        session_id: &str,
        user_id: &str,
    ) -> AppResult<bool> {
        let mut state = self.write()?;
        match state
            .sessions
            .iter_mut()
            .find(|s| s.period == period && s.course_code == course_code && s.id == session_id)
        {
            Some(session) => {
                add_to_set(&mut session.attendee_ids, user_id);
                session.updated_at = chrono::Utc::now().timestamp();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn remove_session_attendee(
        &self,
        period: &str,
        course_code: &str,
        session_id: &str,
        user_id: &str,
    ) -> AppResult<bool> {
        let mut state = self.write()?;
        match state
            .sessions
            .iter_mut()
            .find(|s| s.period == period && s.course_code == course_code && s.id == session_id)
        {
            Some(session) => {
                remove_from_set(&mut session.attendee_ids, user_id);
                session.updated_at = chrono::Utc::now().timestamp();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
