use futures::future::join_all;

use crate::{
    database::Store,
    models::Course,
    utils::text::{codes_match, contains_ignore_case, is_blank},
    utils::{AppError, AppResult},
};

/// Resolves a course code to its record.
///
/// Tries a point read first, then scans the period's catalog for an exact
/// code match and finally a whitespace-insensitive one ("COEN12" finds
/// "COEN 12"). Store failures are logged and reported as a miss.
pub async fn get_course_details(db: &dyn Store, period: &str, code: &str) -> Option<Course> {
    match db.get_course(period, code).await {
        Ok(Some(course)) => return Some(course),
        Ok(None) => {}
        Err(e) => {
            log::error!("❌ Error loading course {}: {}", code, e);
            return None;
        }
    }

    match db.list_courses(period).await {
        Ok(courses) => courses
            .iter()
            .find(|c| c.code == code)
            .or_else(|| courses.iter().find(|c| codes_match(&c.code, code)))
            .cloned(),
        Err(e) => {
            log::error!("❌ Error scanning courses for {}: {}", code, e);
            None
        }
    }
}

/// The user's enrolled courses in `period`, resolved, in enrollment order.
/// Codes that do not resolve are dropped; a missing user yields nothing.
pub async fn get_user_courses(db: &dyn Store, period: &str, user_id: &str) -> Vec<Course> {
    let user = match db.get_user(user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => return vec![],
        Err(e) => {
            log::error!("❌ Error loading user courses for {}: {}", user_id, e);
            return vec![];
        }
    };

    let codes = user.courses_in(period);
    let lookups = codes.iter().map(|code| get_course_details(db, period, code));

    let mut courses: Vec<Course> = Vec::new();
    for course in join_all(lookups).await.into_iter().flatten() {
        // "COEN12" and "COEN 12" can both resolve to the same record
        if !courses.iter().any(|c| c.code == course.code) {
            courses.push(course);
        }
    }
    courses
}

/// Catalog of a period ordered by code, optionally filtered by a
/// case-insensitive term over code, name and instructor.
pub async fn search_courses(
    db: &dyn Store,
    period: &str,
    term: Option<&str>,
) -> AppResult<Vec<Course>> {
    let courses = db.list_courses(period).await?;

    let term = match term.map(str::trim).filter(|t| !t.is_empty()) {
        Some(term) => term,
        None => return Ok(courses),
    };

    Ok(courses
        .into_iter()
        .filter(|c| {
            contains_ignore_case(&c.code, term)
                || contains_ignore_case(&c.name, term)
                || contains_ignore_case(&c.instructor, term)
        })
        .collect())
}

/// Adds the course to the user and the user to the course.
///
/// The two writes are independent. If the second one fails the first is
/// not rolled back; the reconciliation job repairs the course side later.
pub async fn enroll(db: &dyn Store, period: &str, user_id: &str, code: &str) -> AppResult<()> {
    let code = code.trim();
    if is_blank(code) {
        return Err(AppError::InvalidRequest("Course code is required".into()));
    }

    if !db.add_user_course(user_id, period, code).await? {
        return Err(AppError::NotFound(format!("User {} not found", user_id)));
    }

    if let Err(e) = db.add_course_student(period, code, user_id).await {
        log::warn!(
            "⚠️  Enrollment of {} in {} recorded on the user only: {}",
            user_id,
            code,
            e
        );
        return Err(e);
    }

    log::info!("✅ {} enrolled in {} ({})", user_id, code, period);
    Ok(())
}

/// Removes the user from the course and the course from the user.
/// A course record that does not exist is not an error.
pub async fn unenroll(db: &dyn Store, period: &str, user_id: &str, code: &str) -> AppResult<()> {
    let code = code.trim();
    if is_blank(code) {
        return Err(AppError::InvalidRequest("Course code is required".into()));
    }

    match db.remove_course_student(period, code, user_id).await {
        Ok(()) => {}
        Err(AppError::NotFound(_)) => {
            log::debug!("Course {} has no record in {}, updating user only", code, period);
        }
        Err(e) => return Err(e),
    }

    if !db.remove_user_course(user_id, period, code).await? {
        log::warn!("⚠️  Unenroll: user {} not found, course side already updated", user_id);
        return Err(AppError::NotFound(format!("User {} not found", user_id)));
    }

    log::info!("✅ {} unenrolled from {} ({})", user_id, code, period);
    Ok(())
}
