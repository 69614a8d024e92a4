use actix_web::{web, HttpResponse};

use crate::config::AppConfig;
use crate::database::Store;
use crate::middleware::auth::Claims;
use crate::models::{CreateStudySessionRequest, StudySessionResponse};
use crate::services::study_session_service;

use super::{error_response, PeriodQuery};

/// GET /api/v1/sessions - Sessions across all of the caller's courses
#[utoipa::path(
    get,
    path = "/api/v1/sessions",
    tag = "Study Sessions",
    params(PeriodQuery),
    responses(
        (status = 200, description = "Sessions with course, attendee and creator profiles resolved")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn my_sessions(
    db: web::Data<dyn Store>,
    config: web::Data<AppConfig>,
    user: web::ReqData<Claims>,
    query: web::Query<PeriodQuery>,
) -> HttpResponse {
    let period = config.period_or_default(query.period.as_deref());
    log::info!("📅 GET /sessions - user: {}", user.sub);

    let sessions =
        study_session_service::get_all_study_sessions_for_user(db.get_ref(), period, &user.sub).await;

    HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "sessions": sessions,
        "total": sessions.len()
    }))
}

/// GET /api/v1/sessions/course/{code}
#[utoipa::path(
    get,
    path = "/api/v1/sessions/course/{code}",
    tag = "Study Sessions",
    params(("code" = String, Path, description = "Course code"), PeriodQuery),
    responses(
        (status = 200, description = "Sessions ordered by start time", body = [StudySessionResponse])
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn course_sessions(
    db: web::Data<dyn Store>,
    config: web::Data<AppConfig>,
    path: web::Path<String>,
    query: web::Query<PeriodQuery>,
) -> HttpResponse {
    let code = path.into_inner();
    let period = config.period_or_default(query.period.as_deref());

    let sessions: Vec<StudySessionResponse> =
        study_session_service::get_study_sessions_for_course(db.get_ref(), period, code.trim())
            .await
            .into_iter()
            .map(StudySessionResponse::from)
            .collect();

    HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "course_code": code,
        "sessions": sessions,
        "total": sessions.len()
    }))
}

/// POST /api/v1/sessions - Creates a session; the caller becomes its creator
#[utoipa::path(
    post,
    path = "/api/v1/sessions",
    tag = "Study Sessions",
    params(PeriodQuery),
    request_body = CreateStudySessionRequest,
    responses(
        (status = 201, description = "Session created", body = StudySessionResponse),
        (status = 400, description = "Missing field or end before start")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_session(
    db: web::Data<dyn Store>,
    config: web::Data<AppConfig>,
    user: web::ReqData<Claims>,
    query: web::Query<PeriodQuery>,
    request: web::Json<CreateStudySessionRequest>,
) -> HttpResponse {
    let period = config.period_or_default(query.period.as_deref());
    log::info!(
        "📝 POST /sessions - course: {}, user: {}",
        request.course_code,
        user.sub
    );

    match study_session_service::create_study_session(
        db.get_ref(),
        period,
        &user.sub,
        request.into_inner(),
    )
    .await
    {
        Ok(session) => {
            log::info!("✅ Study session {} created", session.id);
            HttpResponse::Created().json(serde_json::json!({
                "success": true,
                "session": session
            }))
        }
        Err(e) => {
            log::warn!("❌ Failed to create study session: {}", e);
            error_response(&e)
        }
    }
}

/// POST /api/v1/sessions/{code}/{id}/join
#[utoipa::path(
    post,
    path = "/api/v1/sessions/{code}/{id}/join",
    tag = "Study Sessions",
    params(
        ("code" = String, Path, description = "Course code"),
        ("id" = String, Path, description = "Session id"),
        PeriodQuery
    ),
    responses(
        (status = 200, description = "Joined; idempotent"),
        (status = 404, description = "Session not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn join_session(
    db: web::Data<dyn Store>,
    config: web::Data<AppConfig>,
    user: web::ReqData<Claims>,
    path: web::Path<(String, String)>,
    query: web::Query<PeriodQuery>,
) -> HttpResponse {
    let (code, session_id) = path.into_inner();
    let code = code.trim();
    let period = config.period_or_default(query.period.as_deref());

    match study_session_service::join_study_session(db.get_ref(), period, code, &session_id, &user.sub)
        .await
    {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "Joined study session"
        })),
        Err(e) => {
            log::warn!("❌ Join of session {} failed: {}", session_id, e);
            error_response(&e)
        }
    }
}

/// POST /api/v1/sessions/{code}/{id}/leave
#[utoipa::path(
    post,
    path = "/api/v1/sessions/{code}/{id}/leave",
    tag = "Study Sessions",
    params(
        ("code" = String, Path, description = "Course code"),
        ("id" = String, Path, description = "Session id"),
        PeriodQuery
    ),
    responses(
        (status = 200, description = "Left; idempotent"),
        (status = 404, description = "Session not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn leave_session(
    db: web::Data<dyn Store>,
    config: web::Data<AppConfig>,
    user: web::ReqData<Claims>,
    path: web::Path<(String, String)>,
    query: web::Query<PeriodQuery>,
) -> HttpResponse {
    let (code, session_id) = path.into_inner();
    let code = code.trim();
    let period = config.period_or_default(query.period.as_deref());
    log::info!("🚪 POST /sessions/{}/{}/leave - user: {}", code, session_id, user.sub);

    match study_session_service::leave_study_session(db.get_ref(), period, code, &session_id, &user.sub)
        .await
    {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "Left study session"
        })),
        Err(e) => {
            log::warn!("❌ Leave of session {} failed: {}", session_id, e);
            error_response(&e)
        }
    }
}
