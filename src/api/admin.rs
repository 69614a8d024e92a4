use actix_web::{web, HttpResponse};

use crate::config::AppConfig;
use crate::database::Store;
use crate::middleware::auth::Claims;
use crate::models::{Course, CreateCourseRequest};
use crate::services::admin_service::{self, DatabaseState, PopulateSummary, ReconcileSummary};

use super::{error_response, PeriodQuery};

/// POST /api/v1/admin/courses - Adds a course to the catalog
#[utoipa::path(
    post,
    path = "/api/v1/admin/courses",
    tag = "Admin",
    params(PeriodQuery),
    request_body = CreateCourseRequest,
    responses(
        (status = 201, description = "Course created", body = Course),
        (status = 403, description = "Caller is not an admin"),
        (status = 409, description = "Course already exists in this period")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_course(
    db: web::Data<dyn Store>,
    config: web::Data<AppConfig>,
    user: web::ReqData<Claims>,
    query: web::Query<PeriodQuery>,
    request: web::Json<CreateCourseRequest>,
) -> HttpResponse {
    if let Err(e) = admin_service::require_admin(&config, &user) {
        return error_response(&e);
    }

    let period = config.period_or_default(query.period.as_deref());
    log::info!("🏫 POST /admin/courses - {} in {}", request.code, period);

    match admin_service::create_course(db.get_ref(), period, &request).await {
        Ok(course) => HttpResponse::Created().json(serde_json::json!({
            "success": true,
            "course": course
        })),
        Err(e) => {
            log::warn!("❌ Failed to create course {}: {}", request.code, e);
            error_response(&e)
        }
    }
}

/// POST /api/v1/admin/populate - Loads the sample catalog and sessions
#[utoipa::path(
    post,
    path = "/api/v1/admin/populate",
    tag = "Admin",
    params(PeriodQuery),
    responses(
        (status = 200, description = "Sample data loaded", body = PopulateSummary),
        (status = 403, description = "Caller is not an admin")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn populate(
    db: web::Data<dyn Store>,
    config: web::Data<AppConfig>,
    user: web::ReqData<Claims>,
    query: web::Query<PeriodQuery>,
) -> HttpResponse {
    if let Err(e) = admin_service::require_admin(&config, &user) {
        return error_response(&e);
    }

    let period = config.period_or_default(query.period.as_deref());
    match admin_service::populate_sample_data(db.get_ref(), period, &user.sub).await {
        Ok(summary) => HttpResponse::Ok().json(summary),
        Err(e) => {
            log::error!("❌ Populate failed: {}", e);
            error_response(&e)
        }
    }
}

/// GET /api/v1/admin/state
#[utoipa::path(
    get,
    path = "/api/v1/admin/state",
    tag = "Admin",
    responses(
        (status = 200, description = "Store counters", body = DatabaseState),
        (status = 403, description = "Caller is not an admin")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn state(
    db: web::Data<dyn Store>,
    config: web::Data<AppConfig>,
    user: web::ReqData<Claims>,
) -> HttpResponse {
    if let Err(e) = admin_service::require_admin(&config, &user) {
        return error_response(&e);
    }

    match admin_service::database_state(db.get_ref()).await {
        Ok(state) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "state": state
        })),
        Err(e) => error_response(&e),
    }
}

/// POST /api/v1/admin/reconcile - Runs enrollment reconciliation now
#[utoipa::path(
    post,
    path = "/api/v1/admin/reconcile",
    tag = "Admin",
    params(PeriodQuery),
    responses(
        (status = 200, description = "Reconciliation finished", body = ReconcileSummary),
        (status = 403, description = "Caller is not an admin")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn reconcile(
    db: web::Data<dyn Store>,
    config: web::Data<AppConfig>,
    user: web::ReqData<Claims>,
    query: web::Query<PeriodQuery>,
) -> HttpResponse {
    if let Err(e) = admin_service::require_admin(&config, &user) {
        return error_response(&e);
    }

    let period = config.period_or_default(query.period.as_deref());
    match admin_service::reconcile_enrollments(db.get_ref(), period).await {
        Ok(summary) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "summary": summary
        })),
        Err(e) => {
            log::error!("❌ Reconciliation failed: {}", e);
            error_response(&e)
        }
    }
}
