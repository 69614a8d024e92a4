use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, Database, IndexModel};

use super::Store;
use crate::models::{Course, ProfileUpdate, StudySession, User};
use crate::utils::{AppError, AppResult};

const USERS: &str = "users";
const COURSES: &str = "courses";
const STUDY_SESSIONS: &str = "study_sessions";

#[derive(Clone)]
pub struct MongoDB {
    db: Database,
}

fn is_duplicate_key(e: &mongodb::error::Error) -> bool {
    matches!(
        e.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(we)) if we.code == 11000
    )
}

fn course_filter(period: &str, code: &str) -> Document {
    doc! { "period": period, "code": code }
}

fn session_filter(period: &str, course_code: &str, session_id: &str) -> Document {
    doc! { "_id": session_id, "period": period, "course_code": course_code }
}

impl MongoDB {
    pub async fn new(uri: &str) -> AppResult<Self> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri).await?;

        // Connection pool
        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(5);
        client_options.max_idle_time = Some(std::time::Duration::from_secs(300));

        client_options.connect_timeout = Some(std::time::Duration::from_secs(5));
        client_options.server_selection_timeout = Some(std::time::Duration::from_secs(5));

        let client = Client::with_options(client_options)?;

        // Database name from the URI path, else the default
        let db_name = uri
            .split('/')
            .last()
            .and_then(|s| s.split('?').next())
            .filter(|s| !s.is_empty() && !s.contains(':'))
            .unwrap_or("BroncoBuddies");

        let db = client.database(db_name);

        // Test connection
        db.list_collection_names().await?;

        let mongodb = Self { db };

        mongodb.ensure_indexes().await?;

        Ok(mongodb)
    }

    /// Creates the indexes backing classmate discovery, course lookup and session listing
    async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("🔧 Creating database indexes...");

        // users(enrollments.period, enrollments.code): multikey index for
        // "who shares any of these courses this period"
        let users = self.collection::<Document>(USERS);
        let users_courses_index = IndexModel::builder()
            .keys(doc! { "enrollments.period": 1, "enrollments.code": 1 })
            .build();

        match users.create_index(users_courses_index).await {
            Ok(_) => log::info!("   ✅ Index created: users(enrollments.period, enrollments.code)"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        // courses(period, code): one course per code per period
        let courses = self.collection::<Document>(COURSES);
        let courses_index = IndexModel::builder()
            .keys(doc! { "period": 1, "code": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        match courses.create_index(courses_index).await {
            Ok(_) => log::info!("   ✅ Index created: courses(period, code) unique"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        // study_sessions(period, course_code, start_time)
        let sessions = self.collection::<Document>(STUDY_SESSIONS);
        let sessions_index = IndexModel::builder()
            .keys(doc! { "period": 1, "course_code": 1, "start_time": 1 })
            .build();

        match sessions.create_index(sessions_index).await {
            Ok(_) => log::info!("   ✅ Index created: study_sessions(period, course_code, start_time)"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        log::info!("✅ Database indexes ready");

        Ok(())
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }

    fn users(&self) -> Collection<User> {
        self.collection(USERS)
    }

    fn courses(&self) -> Collection<Course> {
        self.collection(COURSES)
    }

    fn sessions(&self) -> Collection<StudySession> {
        self.collection(STUDY_SESSIONS)
    }
}

#[async_trait]
impl Store for MongoDB {
    async fn ping(&self) -> AppResult<()> {
        self.db.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    async fn get_user(&self, user_id: &str) -> AppResult<Option<User>> {
        Ok(self.users().find_one(doc! { "_id": user_id }).await?)
    }

    async fn insert_user(&self, user: &User) -> AppResult<()> {
        match self.users().insert_one(user).await {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate_key(&e) => {
                Err(AppError::Conflict(format!("User {} already exists", user.id)))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn update_user_identity(
        &self,
        user_id: &str,
        email: &str,
        photo_url: Option<&str>,
    ) -> AppResult<bool> {
        let update = doc! {
            "$set": {
                "email": email,
                "photo_url": photo_url,
                "updated_at": chrono::Utc::now().timestamp(),
            }
        };
        let result = self.users().update_one(doc! { "_id": user_id }, update).await?;
        Ok(result.matched_count > 0)
    }

    async fn update_profile(&self, user_id: &str, profile: &ProfileUpdate) -> AppResult<bool> {
        let update = doc! {
            "$set": {
                "first_name": profile.first_name.as_str(),
                "last_name": profile.last_name.as_str(),
                "display_name": profile.display_name.as_str(),
                "year": profile.year.as_str(),
                "major": profile.major.as_str(),
                "profile_complete": true,
                "updated_at": profile.updated_at,
            }
        };
        let result = self.users().update_one(doc! { "_id": user_id }, update).await?;
        Ok(result.matched_count > 0)
    }

    async fn add_user_course(
        &self,
        user_id: &str,
        period: &str,
        course_code: &str,
    ) -> AppResult<bool> {
        // $addToSet compares whole subdocuments, so field order must stay (period, code)
        let update = doc! {
            "$addToSet": { "enrollments": { "period": period, "code": course_code } },
            "$set": { "updated_at": chrono::Utc::now().timestamp() },
        };
        let result = self.users().update_one(doc! { "_id": user_id }, update).await?;
        Ok(result.matched_count > 0)
    }

    async fn remove_user_course(
        &self,
        user_id: &str,
        period: &str,
        course_code: &str,
    ) -> AppResult<bool> {
        let update = doc! {
            "$pull": { "enrollments": { "period": period, "code": course_code } },
            "$set": { "updated_at": chrono::Utc::now().timestamp() },
        };
        let result = self.users().update_one(doc! { "_id": user_id }, update).await?;
        Ok(result.matched_count > 0)
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        let cursor = self.users().find(doc! {}).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_users_with_any_course(
        &self,
        period: &str,
        course_codes: &[String],
    ) -> AppResult<Vec<User>> {
        let filter = doc! {
            "enrollments": {
                "$elemMatch": { "period": period, "code": { "$in": course_codes.to_vec() } }
            }
        };
        let cursor = self.users().find(filter).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn count_users(&self) -> AppResult<u64> {
        Ok(self.users().count_documents(doc! {}).await?)
    }

    async fn get_course(&self, period: &str, code: &str) -> AppResult<Option<Course>> {
        Ok(self.courses().find_one(course_filter(period, code)).await?)
    }

    async fn list_courses(&self, period: &str) -> AppResult<Vec<Course>> {
        let cursor = self
            .courses()
            .find(doc! { "period": period })
            .sort(doc! { "code": 1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn insert_course(&self, course: &Course) -> AppResult<()> {
        match self.courses().insert_one(course).await {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate_key(&e) => Err(AppError::Conflict(format!(
                "Course {} already exists in {}",
                course.code, course.period
            ))),
            Err(e) => Err(e.into()),
        }
    }

    async fn upsert_course(&self, course: &Course) -> AppResult<()> {
        let update = doc! {
            "$set": {
                "name": course.name.as_str(),
                "instructor": course.instructor.as_str(),
                "section": course.section.as_str(),
                "schedule": course.schedule.as_str(),
                "location": course.location.as_str(),
                "units": course.units,
            },
            "$setOnInsert": {
                "student_ids": [],
                "created_at": course.created_at,
            },
        };
        self.courses()
            .update_one(course_filter(&course.period, &course.code), update)
            .upsert(true)
            .await?;
        Ok(())
    }

    async fn add_course_student(&self, period: &str, code: &str, user_id: &str) -> AppResult<()> {
        let update = doc! {
            "$addToSet": { "student_ids": user_id },
            "$setOnInsert": { "created_at": chrono::Utc::now().timestamp() },
        };
        self.courses()
            .update_one(course_filter(period, code), update)
            .upsert(true)
            .await?;
        Ok(())
    }

    async fn remove_course_student(
        &self,
        period: &str,
        code: &str,
        user_id: &str,
    ) -> AppResult<()> {
        let update = doc! { "$pull": { "student_ids": user_id } };
        let result = self
            .courses()
            .update_one(course_filter(period, code), update)
            .await?;
        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!("Course {} not found", code)));
        }
        Ok(())
    }

    async fn list_sessions(&self, period: &str, course_code: &str) -> AppResult<Vec<StudySession>> {
        let cursor = self
            .sessions()
            .find(doc! { "period": period, "course_code": course_code })
            .sort(doc! { "start_time": 1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn get_session(
        &self,
        period: &str,
        course_code: &str,
        session_id: &str,
    ) -> AppResult<Option<StudySession>> {
        Ok(self
            .sessions()
            .find_one(session_filter(period, course_code, session_id))
            .await?)
    }

    async fn insert_session(&self, session: &StudySession) -> AppResult<()> {
        match self.sessions().insert_one(session).await {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate_key(&e) => {
                Err(AppError::Conflict(format!("Session {} already exists", session.id)))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn add_session_attendee(
        &self,
        period: &str,
        course_code: &str,
        session_id: &str,
        user_id: &str,
    ) -> AppResult<bool> {
        let update = doc! {
            "$addToSet": { "attendee_ids": user_id },
            "$set": { "updated_at": chrono::Utc::now().timestamp() },
        };
        let result = self
            .sessions()
            .update_one(session_filter(period, course_code, session_id), update)
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn remove_session_attendee(
        &self,
        period: &str,
        course_code: &str,
        session_id: &str,
        user_id: &str,
    ) -> AppResult<bool> {
        let update = doc! {
            "$pull": { "attendee_ids": user_id },
            "$set": { "updated_at": chrono::Utc::now().timestamp() },
        };
        let result = self
            .sessions()
            .update_one(session_filter(period, course_code, session_id), update)
            .await?;
        Ok(result.matched_count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_mongodb_connection() {
        dotenv::dotenv().ok();
        let uri = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "mongodb://localhost:27017/BroncoBuddiesTest".to_string());

        let db = MongoDB::new(&uri).await;
        assert!(db.is_ok());
        assert!(db.unwrap().ping().await.is_ok());
    }
}
