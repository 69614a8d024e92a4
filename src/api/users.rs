use actix_web::{web, HttpResponse};

use crate::database::Store;
use crate::middleware::auth::Claims;
use crate::models::{CompleteProfileRequest, UserResponse};
use crate::services::user_service;

use super::error_response;

/// PUT /api/v1/users/me/profile - Completes the caller's profile
#[utoipa::path(
    put,
    path = "/api/v1/users/me/profile",
    tag = "Users",
    request_body = CompleteProfileRequest,
    responses(
        (status = 200, description = "Profile saved", body = UserResponse),
        (status = 400, description = "Missing field or unknown academic year"),
        (status = 404, description = "User not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn complete_profile(
    db: web::Data<dyn Store>,
    user: web::ReqData<Claims>,
    request: web::Json<CompleteProfileRequest>,
) -> HttpResponse {
    log::info!("📝 PUT /users/me/profile - user: {}", user.sub);

    match user_service::complete_profile(db.get_ref(), &user.sub, &request).await {
        Ok(updated) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "user": UserResponse::from(updated)
        })),
        Err(e) => {
            log::warn!("❌ Profile update failed for {}: {}", user.sub, e);
            error_response(&e)
        }
    }
}
