use futures::future::join_all;

use crate::{
    database::Store,
    models::{
        Course, CreateStudySessionRequest, SessionView, StudySession, StudySessionResponse,
        UserSummary,
    },
    services::course_service,
    utils::text::is_blank,
    utils::{AppError, AppResult},
};

/// Sessions of one course ordered by start time; failures yield an empty list.
pub async fn get_study_sessions_for_course(
    db: &dyn Store,
    period: &str,
    course_code: &str,
) -> Vec<StudySession> {
    match db.list_sessions(period, course_code).await {
        Ok(sessions) => sessions,
        Err(e) => {
            log::error!("❌ Error loading study sessions for {}: {}", course_code, e);
            vec![]
        }
    }
}

/// Point read of a profile. Missing users and failed reads are both `None`.
async fn resolve_user(db: &dyn Store, user_id: &str) -> Option<UserSummary> {
    match db.get_user(user_id).await {
        Ok(user) => user.map(|u| u.summary()),
        Err(e) => {
            log::error!("❌ Error loading user {}: {}", user_id, e);
            None
        }
    }
}

async fn resolve_session(db: &dyn Store, course: &Course, session: StudySession) -> SessionView {
    let attendee_lookups = session.attendee_ids.iter().map(|id| resolve_user(db, id));
    let (attendees, creator) = futures::join!(
        join_all(attendee_lookups),
        resolve_user(db, &session.creator_id)
    );

    SessionView {
        session: StudySessionResponse::from(session),
        course: course.clone(),
        attendees: attendees.into_iter().flatten().collect(),
        creator,
    }
}

/// Every session of every course the user is enrolled in, with attendee and
/// creator profiles resolved. Courses are visited in enrollment order.
pub async fn get_all_study_sessions_for_user(
    db: &dyn Store,
    period: &str,
    user_id: &str,
) -> Vec<SessionView> {
    let courses = course_service::get_user_courses(db, period, user_id).await;
    let mut all_sessions = Vec::new();

    for course in &courses {
        let sessions = get_study_sessions_for_course(db, period, &course.code).await;
        let views = join_all(
            sessions
                .into_iter()
                .map(|session| resolve_session(db, course, session)),
        )
        .await;
        all_sessions.extend(views);
    }

    all_sessions
}

fn dedup_ids(ids: Vec<String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(ids.len());
    for id in ids {
        if !unique.contains(&id) {
            unique.push(id);
        }
    }
    unique
}

pub async fn create_study_session(
    db: &dyn Store,
    period: &str,
    creator_id: &str,
    request: CreateStudySessionRequest,
) -> AppResult<StudySessionResponse> {
    if is_blank(&request.course_code) {
        return Err(AppError::InvalidRequest("Course code is required".into()));
    }
    if is_blank(&request.title) {
        return Err(AppError::InvalidRequest("Title is required".into()));
    }
    if is_blank(&request.location) {
        return Err(AppError::InvalidRequest("Location is required".into()));
    }
    if request.end_time <= request.start_time {
        return Err(AppError::InvalidRequest(
            "End time must be after start time".into(),
        ));
    }

    let now = chrono::Utc::now().timestamp();
    let session = StudySession {
        id: uuid::Uuid::new_v4().to_string(),
        period: period.to_string(),
        course_code: request.course_code.trim().to_string(),
        title: request.title.trim().to_string(),
        description: request
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty()),
        location: request.location.trim().to_string(),
        start_time: request.start_time,
        end_time: request.end_time,
        creator_id: creator_id.to_string(),
        attendee_ids: dedup_ids(request.attendee_ids.unwrap_or_default()),
        created_at: now,
        updated_at: now,
    };

    db.insert_session(&session).await?;

    log::info!(
        "✅ Study session {} created for {} by {}",
        session.id,
        session.course_code,
        creator_id
    );

    Ok(StudySessionResponse::from(session))
}

/// Set-union of `user_id` into the attendees; joining twice changes nothing.
pub async fn join_study_session(
    db: &dyn Store,
    period: &str,
    course_code: &str,
    session_id: &str,
    user_id: &str,
) -> AppResult<()> {
    log::info!(
        "📝 Joining session {} in course {} for user {}",
        session_id,
        course_code,
        user_id
    );

    if !db
        .add_session_attendee(period, course_code, session_id, user_id)
        .await?
    {
        return Err(AppError::NotFound("Session not found".into()));
    }
    Ok(())
}

/// Set-difference of `user_id` from the attendees; a non-member leaving is a no-op.
pub async fn leave_study_session(
    db: &dyn Store,
    period: &str,
    course_code: &str,
    session_id: &str,
    user_id: &str,
) -> AppResult<()> {
    if !db
        .remove_session_attendee(period, course_code, session_id, user_id)
        .await?
    {
        return Err(AppError::NotFound("Session not found".into()));
    }
    Ok(())
}
