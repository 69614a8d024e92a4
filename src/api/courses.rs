use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::config::AppConfig;
use crate::database::Store;
use crate::middleware::auth::Claims;
use crate::models::Course;
use crate::services::course_service;
use crate::utils::AppError;

use super::{error_response, PeriodQuery};

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CourseSearchQuery {
    /// Case-insensitive match over code, name and instructor
    pub q: Option<String>,
    pub period: Option<String>,
}

/// GET /api/v1/courses - Catalog of the period, optionally filtered
#[utoipa::path(
    get,
    path = "/api/v1/courses",
    tag = "Courses",
    params(CourseSearchQuery),
    responses(
        (status = 200, description = "Courses ordered by code", body = [Course])
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_courses(
    db: web::Data<dyn Store>,
    config: web::Data<AppConfig>,
    query: web::Query<CourseSearchQuery>,
) -> HttpResponse {
    let period = config.period_or_default(query.period.as_deref());
    log::info!("📚 GET /courses - period: {}, q: {:?}", period, query.q);

    match course_service::search_courses(db.get_ref(), period, query.q.as_deref()).await {
        Ok(courses) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "period": period,
            "courses": courses,
            "total": courses.len()
        })),
        Err(e) => {
            log::error!("❌ Failed to list courses: {}", e);
            error_response(&e)
        }
    }
}

/// GET /api/v1/courses/mine - Caller's enrolled courses, resolved
#[utoipa::path(
    get,
    path = "/api/v1/courses/mine",
    tag = "Courses",
    params(PeriodQuery),
    responses(
        (status = 200, description = "Courses in enrollment order", body = [Course])
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn my_courses(
    db: web::Data<dyn Store>,
    config: web::Data<AppConfig>,
    user: web::ReqData<Claims>,
    query: web::Query<PeriodQuery>,
) -> HttpResponse {
    let period = config.period_or_default(query.period.as_deref());
    let courses = course_service::get_user_courses(db.get_ref(), period, &user.sub).await;

    HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "courses": courses,
        "total": courses.len()
    }))
}

/// GET /api/v1/courses/{code}
#[utoipa::path(
    get,
    path = "/api/v1/courses/{code}",
    tag = "Courses",
    params(("code" = String, Path, description = "Course code, e.g. \"COEN 12\""), PeriodQuery),
    responses(
        (status = 200, description = "Course found", body = Course),
        (status = 404, description = "No course with that code")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_course(
    db: web::Data<dyn Store>,
    config: web::Data<AppConfig>,
    path: web::Path<String>,
    query: web::Query<PeriodQuery>,
) -> HttpResponse {
    let code = path.into_inner();
    let period = config.period_or_default(query.period.as_deref());

    match course_service::get_course_details(db.get_ref(), period, &code).await {
        Some(course) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "course": course
        })),
        None => error_response(&AppError::NotFound(format!("Course {} not found", code))),
    }
}

/// POST /api/v1/courses/{code}/enroll
#[utoipa::path(
    post,
    path = "/api/v1/courses/{code}/enroll",
    tag = "Courses",
    params(("code" = String, Path, description = "Course code"), PeriodQuery),
    responses(
        (status = 200, description = "Enrolled; idempotent"),
        (status = 404, description = "User not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn enroll(
    db: web::Data<dyn Store>,
    config: web::Data<AppConfig>,
    user: web::ReqData<Claims>,
    path: web::Path<String>,
    query: web::Query<PeriodQuery>,
) -> HttpResponse {
    let code = path.into_inner();
    let period = config.period_or_default(query.period.as_deref());
    log::info!("➕ POST /courses/{}/enroll - user: {}", code, user.sub);

    match course_service::enroll(db.get_ref(), period, &user.sub, &code).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": format!("Enrolled in {}", code.trim())
        })),
        Err(e) => {
            log::error!("❌ Enrollment in {} failed: {}", code, e);
            error_response(&e)
        }
    }
}

/// DELETE /api/v1/courses/{code}/enroll
#[utoipa::path(
    delete,
    path = "/api/v1/courses/{code}/enroll",
    tag = "Courses",
    params(("code" = String, Path, description = "Course code"), PeriodQuery),
    responses(
        (status = 200, description = "Unenrolled; idempotent"),
        (status = 404, description = "User not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn unenroll(
    db: web::Data<dyn Store>,
    config: web::Data<AppConfig>,
    user: web::ReqData<Claims>,
    path: web::Path<String>,
    query: web::Query<PeriodQuery>,
) -> HttpResponse {
    let code = path.into_inner();
    let period = config.period_or_default(query.period.as_deref());
    log::info!("➖ DELETE /courses/{}/enroll - user: {}", code, user.sub);

    match course_service::unenroll(db.get_ref(), period, &user.sub, &code).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": format!("Unenrolled from {}", code.trim())
        })),
        Err(e) => {
            log::error!("❌ Unenrollment from {} failed: {}", code, e);
            error_response(&e)
        }
    }
}
