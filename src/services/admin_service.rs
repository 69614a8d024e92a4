use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::{
    config::AppConfig,
    database::Store,
    models::{Course, CreateCourseRequest},
    seeds::sample_data,
    services::auth_service::Claims,
    utils::text::is_blank,
    utils::{AppError, AppResult},
};

#[derive(Debug, Serialize, Clone, PartialEq, utoipa::ToSchema)]
pub struct PopulateSummary {
    pub success: bool,
    pub courses_added: usize,
    pub sessions_added: usize,
}

#[derive(Debug, Serialize, Clone, PartialEq, utoipa::ToSchema)]
pub struct DatabaseState {
    pub total_users: u64,
}

#[derive(Debug, Serialize, Clone, PartialEq, utoipa::ToSchema)]
pub struct ReconcileSummary {
    pub courses_checked: usize,
    pub courses_repaired: usize,
}

/// Admin membership comes from the configured allowlist, compared case-insensitively.
pub fn require_admin(config: &AppConfig, claims: &Claims) -> AppResult<()> {
    if config.is_admin(&claims.email) {
        Ok(())
    } else {
        log::warn!("🚫 Admin access denied for {}", claims.email);
        Err(AppError::Forbidden("Admin privileges required".into()))
    }
}

pub async fn create_course(
    db: &dyn Store,
    period: &str,
    request: &CreateCourseRequest,
) -> AppResult<Course> {
    if is_blank(&request.code) || is_blank(&request.name) || is_blank(&request.instructor) {
        return Err(AppError::InvalidRequest(
            "Course code, name and instructor are required".into(),
        ));
    }

    let course = Course {
        code: request.code.trim().to_string(),
        period: period.to_string(),
        name: request.name.trim().to_string(),
        instructor: request.instructor.trim().to_string(),
        section: request.section.clone().unwrap_or_else(|| "001".to_string()),
        schedule: request.schedule.clone().unwrap_or_else(|| "TBD".to_string()),
        location: request.location.clone().unwrap_or_else(|| "TBD".to_string()),
        units: request.units.unwrap_or(4),
        student_ids: vec![],
        created_at: chrono::Utc::now().timestamp(),
    };

    db.insert_course(&course).await?;
    log::info!("✅ Course {} created in {}", course.code, period);
    Ok(course)
}

/// Upserts the sample catalog and adds sample sessions created by `admin_id`.
/// Individual failures are logged and skipped.
pub async fn populate_sample_data(
    db: &dyn Store,
    period: &str,
    admin_id: &str,
) -> AppResult<PopulateSummary> {
    log::info!("🌱 Populating sample data for {}...", period);
    let now = chrono::Utc::now().timestamp();

    let mut courses_added = 0;
    for course in sample_data::sample_courses(period, now) {
        match db.upsert_course(&course).await {
            Ok(()) => courses_added += 1,
            Err(e) => log::warn!("   ⚠️  Failed to add course {}: {}", course.code, e),
        }
    }

    let mut sessions_added = 0;
    for session in sample_data::sample_sessions(period, admin_id, now) {
        match db.insert_session(&session).await {
            Ok(()) => {
                log::info!("   ✅ Added study session: {} for {}", session.title, session.course_code);
                sessions_added += 1;
            }
            Err(e) => log::warn!("   ⚠️  Failed to add session for {}: {}", session.course_code, e),
        }
    }

    log::info!(
        "✅ Sample data ready: {} courses, {} study sessions",
        courses_added,
        sessions_added
    );

    Ok(PopulateSummary {
        success: true,
        courses_added,
        sessions_added,
    })
}

pub async fn database_state(db: &dyn Store) -> AppResult<DatabaseState> {
    Ok(DatabaseState {
        total_users: db.count_users().await?,
    })
}

/// Brings each existing course's student set in `period` in line with the
/// users' enrollments for that period.
///
/// User enrollments are the source of truth. Repairs are per-student
/// `add`/`remove` set operations, never a wholesale overwrite, so students
/// the run does not touch keep whatever landed concurrently. Courses are read
/// before users: enroll writes the user first, so an enrollment landing
/// between the two reads shows up as missing and is re-added, not removed.
/// A student who unenrolls after the user scan but before their repair can
/// be re-added; the next run fixes it. Codes without a course record are
/// left alone.
pub async fn reconcile_enrollments(db: &dyn Store, period: &str) -> AppResult<ReconcileSummary> {
    let courses = db.list_courses(period).await?;
    let users = db.list_users().await?;

    let mut expected: BTreeMap<&str, BTreeSet<&str>> = courses
        .iter()
        .map(|c| (c.code.as_str(), BTreeSet::new()))
        .collect();

    for user in &users {
        for enrollment in user.enrollments.iter().filter(|e| e.period == period) {
            if let Some(students) = expected.get_mut(enrollment.code.as_str()) {
                students.insert(user.id.as_str());
            }
        }
    }

    let mut courses_repaired = 0;
    for course in &courses {
        let actual: BTreeSet<&str> = course.student_ids.iter().map(String::as_str).collect();
        let wanted = match expected.get(course.code.as_str()) {
            Some(wanted) => wanted,
            None => continue,
        };

        if actual != *wanted {
            let missing: Vec<&str> = wanted.difference(&actual).copied().collect();
            let stale: Vec<&str> = actual.difference(wanted).copied().collect();
            log::info!(
                "🔧 Repairing {} ({}): +{} -{} students",
                course.code,
                period,
                missing.len(),
                stale.len()
            );
            for user_id in missing {
                db.add_course_student(period, &course.code, user_id).await?;
            }
            for user_id in stale {
                db.remove_course_student(period, &course.code, user_id).await?;
            }
            courses_repaired += 1;
        }
    }

    Ok(ReconcileSummary {
        courses_checked: courses.len(),
        courses_repaired,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use crate::database::{FailingStore, MemoryStore};
    use crate::models::User;
    use crate::services::course_service::enroll;

    const P: &str = "Spring 2025 Quarter";

    fn claims(email: &str) -> Claims {
        Claims {
            sub: "u1".into(),
            email: email.into(),
            name: None,
            token_type: "access".into(),
            iat: 0,
            exp: 0,
            jti: "j".into(),
            aud: "a".into(),
            iss: "i".into(),
        }
    }

    fn course_request(code: &str) -> CreateCourseRequest {
        CreateCourseRequest {
            code: code.into(),
            name: "Data Structures".into(),
            instructor: "Dr. Smith".into(),
            section: None,
            schedule: None,
            location: None,
            units: None,
        }
    }

    #[test]
    fn test_require_admin() {
        let config = test_config();
        assert!(require_admin(&config, &claims("ADMIN@scu.edu")).is_ok());
        assert!(matches!(
            require_admin(&config, &claims("student@scu.edu")),
            Err(AppError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_create_course_defaults_and_duplicates() {
        let store = MemoryStore::new();
        let course = create_course(&store, P, &course_request("COEN 12")).await.unwrap();
        assert_eq!(course.section, "001");
        assert_eq!(course.schedule, "TBD");
        assert_eq!(course.units, 4);

        assert!(matches!(
            create_course(&store, P, &course_request("COEN 12")).await,
            Err(AppError::Conflict(_))
        ));
        assert!(matches!(
            create_course(&store, P, &course_request(" ")).await,
            Err(AppError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_populate_sample_data() {
        let store = MemoryStore::new();
        let summary = populate_sample_data(&store, P, "admin-1").await.unwrap();
        assert_eq!(summary.courses_added, 6);
        assert_eq!(summary.sessions_added, sample_data::MAX_SAMPLE_SESSIONS);

        let sessions = store.list_sessions(P, "COEN 12").await.unwrap();
        assert!(!sessions.is_empty());
        assert!(sessions.iter().all(|s| s.creator_id == "admin-1" && s.attendee_ids.is_empty()));
    }

    #[tokio::test]
    async fn test_populate_keeps_enrollments() {
        let store = MemoryStore::new();
        store.add_course_student(P, "COEN 12", "u1").await.unwrap();

        populate_sample_data(&store, P, "admin-1").await.unwrap();

        let course = store.get_course(P, "COEN 12").await.unwrap().unwrap();
        assert_eq!(course.name, "Abstract Data Types and Data Structures");
        assert_eq!(course.student_ids, vec!["u1".to_string()]);
    }

    #[tokio::test]
    async fn test_reconcile_repairs_drift() {
        let store = MemoryStore::new();
        for id in ["u1", "u2"] {
            store
                .insert_user(&User::new_from_identity(id, &format!("{}@scu.edu", id), None, None))
                .await
                .unwrap();
        }
        // u1 enrolled on the user side only; u3 is a stale course-side entry
        store.add_user_course("u1", P, "COEN 12").await.unwrap();
        store.add_user_course("u2", P, "COEN 12").await.unwrap();
        store.add_course_student(P, "COEN 12", "u2").await.unwrap();
        store.add_course_student(P, "COEN 12", "u3").await.unwrap();
        store.add_course_student(P, "MATH 53", "u2").await.unwrap();
        store.add_user_course("u2", P, "MATH 53").await.unwrap();

        let summary = reconcile_enrollments(&store, P).await.unwrap();
        assert_eq!(summary.courses_checked, 2);
        assert_eq!(summary.courses_repaired, 1);

        let mut students = store.get_course(P, "COEN 12").await.unwrap().unwrap().student_ids;
        students.sort();
        assert_eq!(students, vec!["u1".to_string(), "u2".to_string()]);

        let again = reconcile_enrollments(&store, P).await.unwrap();
        assert_eq!(again.courses_repaired, 0);
    }

    #[tokio::test]
    async fn test_reconcile_ignores_other_periods() {
        let store = MemoryStore::new();
        for id in ["u1", "u2"] {
            store
                .insert_user(&User::new_from_identity(id, &format!("{}@scu.edu", id), None, None))
                .await
                .unwrap();
        }
        enroll(&store, "Fall 2024 Quarter", "u1", "COEN 12").await.unwrap();
        enroll(&store, P, "u2", "COEN 12").await.unwrap();

        let summary = reconcile_enrollments(&store, P).await.unwrap();
        assert_eq!(summary.courses_repaired, 0);

        let spring = store.get_course(P, "COEN 12").await.unwrap().unwrap();
        assert_eq!(spring.student_ids, vec!["u2".to_string()]);
        let fall = store.get_course("Fall 2024 Quarter", "COEN 12").await.unwrap().unwrap();
        assert_eq!(fall.student_ids, vec!["u1".to_string()]);
    }

    #[tokio::test]
    async fn test_reconcile_keeps_enrollment_landing_mid_run() {
        let mut store = FailingStore::new();
        for id in ["u1", "u2"] {
            store
                .insert_user(&User::new_from_identity(id, &format!("{}@scu.edu", id), None, None))
                .await
                .unwrap();
        }
        enroll(&store, P, "u1", "COEN 12").await.unwrap();
        store.enroll_during_user_scan = Some(("u2".into(), P.into(), "COEN 12".into()));

        reconcile_enrollments(&store, P).await.unwrap();

        let mut students = store.get_course(P, "COEN 12").await.unwrap().unwrap().student_ids;
        students.sort();
        assert_eq!(students, vec!["u1".to_string(), "u2".to_string()]);
    }

    #[tokio::test]
    async fn test_reconcile_propagates_store_failure() {
        let mut store = FailingStore::new();
        store.fail_user_queries = true;
        assert!(matches!(
            reconcile_enrollments(&store, P).await,
            Err(AppError::DatabaseError(_))
        ));
    }

    #[tokio::test]
    async fn test_database_state() {
        let store = MemoryStore::new();
        store
            .insert_user(&User::new_from_identity("u1", "u1@scu.edu", None, None))
            .await
            .unwrap();
        assert_eq!(database_state(&store).await.unwrap().total_users, 1);
    }
}
