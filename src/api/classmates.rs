use actix_web::{web, HttpResponse};

use crate::config::AppConfig;
use crate::database::Store;
use crate::middleware::auth::Claims;
use crate::models::Classmate;
use crate::services::classmate_service;

use super::PeriodQuery;

/// GET /api/v1/classmates - Students sharing any course with the caller
#[utoipa::path(
    get,
    path = "/api/v1/classmates",
    tag = "Classmates",
    params(PeriodQuery),
    responses(
        (status = 200, description = "Classmates with their shared courses", body = [Classmate])
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_classmates(
    db: web::Data<dyn Store>,
    config: web::Data<AppConfig>,
    user: web::ReqData<Claims>,
    query: web::Query<PeriodQuery>,
) -> HttpResponse {
    let period = config.period_or_default(query.period.as_deref());
    log::info!("👥 GET /classmates - user: {}", user.sub);

    let classmates = classmate_service::get_classmates_for_user(db.get_ref(), period, &user.sub).await;

    HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "classmates": classmates,
        "total": classmates.len()
    }))
}

/// GET /api/v1/classmates/{code} - Classmates in one course
#[utoipa::path(
    get,
    path = "/api/v1/classmates/{code}",
    tag = "Classmates",
    params(("code" = String, Path, description = "Course code"), PeriodQuery),
    responses(
        (status = 200, description = "Classmates sharing this course", body = [Classmate])
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_course_classmates(
    db: web::Data<dyn Store>,
    config: web::Data<AppConfig>,
    user: web::ReqData<Claims>,
    path: web::Path<String>,
    query: web::Query<PeriodQuery>,
) -> HttpResponse {
    let code = path.into_inner();
    let period = config.period_or_default(query.period.as_deref());

    let classmates =
        classmate_service::get_classmates_for_course(db.get_ref(), period, &user.sub, &code).await;

    HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "course_code": code,
        "classmates": classmates,
        "total": classmates.len()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support;
    use crate::config::DEFAULT_ACADEMIC_PERIOD;
    use crate::middleware::auth::AuthMiddleware;
    use crate::services::course_service;
    use actix_web::{test, App};

    #[actix_web::test]
    async fn test_classmates_exclude_caller() {
        let store = test_support::store();
        let ada = test_support::signed_in(&store, "ada", "ada@scu.edu").await;
        test_support::signed_in(&store, "bo", "bo@scu.edu").await;
        for user in ["ada", "bo"] {
            course_service::enroll(&*store, DEFAULT_ACADEMIC_PERIOD, user, "COEN 12")
                .await
                .unwrap();
        }

        let (db, config) = test_support::data(&store);
        let app = test::init_service(
            App::new().app_data(db).app_data(config).service(
                web::scope("/classmates")
                    .wrap(AuthMiddleware)
                    .route("", web::get().to(get_classmates))
                    .route("/{code}", web::get().to(get_course_classmates)),
            ),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/classmates")
            .insert_header(test_support::bearer(&ada))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["total"], 1);
        assert_eq!(body["classmates"][0]["id"], "bo");
        assert_eq!(body["classmates"][0]["shared_courses"][0], "COEN 12");

        let req = test::TestRequest::get()
            .uri("/classmates/MATH%2053")
            .insert_header(test_support::bearer(&ada))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["total"], 0);
    }
}
