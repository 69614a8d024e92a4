use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bronco Buddies API",
        version = "1.0.0",
        description = "Classmate discovery and study-session coordination for Santa Clara University students.\n\n**Authentication:** Sign in with a school Google account, then send the returned JWT as a Bearer token.\n\nEvery endpoint accepts an optional `period` query parameter; the configured academic period is used when it is absent.",
        contact(
            name = "Bronco Buddies Team"
        )
    ),
    paths(
        // Health & Metrics
        crate::api::health::health_check,
        crate::api::metrics::get_metrics,

        // Auth
        crate::api::auth::google_auth,
        crate::api::auth::google_callback,
        crate::api::auth::refresh_token,
        crate::api::auth::verify_token,
        crate::api::auth::get_me,

        // Users
        crate::api::users::complete_profile,

        // Courses
        crate::api::courses::list_courses,
        crate::api::courses::my_courses,
        crate::api::courses::get_course,
        crate::api::courses::enroll,
        crate::api::courses::unenroll,

        // Classmates
        crate::api::classmates::get_classmates,
        crate::api::classmates::get_course_classmates,

        // Study sessions
        crate::api::sessions::my_sessions,
        crate::api::sessions::course_sessions,
        crate::api::sessions::create_session,
        crate::api::sessions::join_session,
        crate::api::sessions::leave_session,

        // Admin
        crate::api::admin::create_course,
        crate::api::admin::populate,
        crate::api::admin::state,
        crate::api::admin::reconcile,
    ),
    components(
        schemas(
            crate::api::health::HealthResponse,
            crate::api::metrics::MetricsResponse,
            crate::services::auth_service::AuthResponse,
            crate::services::auth_service::GoogleAuthUrlResponse,
            crate::services::auth_service::RefreshTokenRequest,
            crate::services::admin_service::PopulateSummary,
            crate::services::admin_service::DatabaseState,
            crate::services::admin_service::ReconcileSummary,
            crate::models::UserResponse,
            crate::models::UserSummary,
            crate::models::CompleteProfileRequest,
            crate::models::Course,
            crate::models::CreateCourseRequest,
            crate::models::Classmate,
            crate::models::StudySessionResponse,
            crate::models::CreateStudySessionRequest,
        )
    ),
    tags(
        (name = "Health", description = "Liveness and Prometheus metrics."),
        (name = "Auth", description = "Google sign-in restricted to the school email domain, token refresh and verification."),
        (name = "Users", description = "Profile completion after first sign-in."),
        (name = "Courses", description = "Course catalog and enrollment."),
        (name = "Classmates", description = "Students sharing courses with the caller."),
        (name = "Study Sessions", description = "Create, browse, join and leave study sessions."),
        (name = "Admin", description = "Catalog management and maintenance. Requires an allowlisted admin email."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT access token from /api/v1/auth/callback"))
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_session_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/v1/sessions/{code}/{id}/join"));
        assert!(doc.paths.paths.contains_key("/api/v1/admin/reconcile"));
    }
}
