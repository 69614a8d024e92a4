use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;

use crate::config::AppConfig;
use crate::database::Store;
use crate::middleware::auth::{bearer_token, Claims};
use crate::models::UserResponse;
use crate::services::auth_service::{self, AuthResponse, GoogleAuthUrlResponse, RefreshTokenRequest};
use crate::services::user_service;

use super::error_response;

#[utoipa::path(
    get,
    path = "/api/v1/auth/google",
    tag = "Auth",
    responses(
        (status = 200, description = "Google consent URL restricted to the school domain", body = GoogleAuthUrlResponse),
        (status = 502, description = "OAuth client not configured")
    )
)]
pub async fn google_auth(config: web::Data<AppConfig>) -> HttpResponse {
    log::info!("🔐 GET /auth/google - Generating OAuth URL");

    match auth_service::generate_google_oauth_url(&config) {
        Ok(response) => {
            log::info!("✅ Google OAuth URL generated");
            HttpResponse::Ok().json(response)
        }
        Err(e) => {
            log::error!("❌ Failed to generate Google OAuth URL: {}", e);
            error_response(&e)
        }
    }
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub error: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/callback",
    tag = "Auth",
    params(CallbackQuery),
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 401, description = "Sign-in cancelled or code rejected"),
        (status = 403, description = "Email outside the allowed domain")
    )
)]
pub async fn google_callback(
    db: web::Data<dyn Store>,
    config: web::Data<AppConfig>,
    query: web::Query<CallbackQuery>,
) -> HttpResponse {
    log::info!("🔐 GET /auth/callback - Processing Google OAuth");

    if let Some(error) = &query.error {
        log::warn!("❌ OAuth error: {}", error);
        return error_response(&crate::utils::AppError::Unauthorized(format!(
            "Sign-in cancelled: {}",
            error
        )));
    }

    let code = match &query.code {
        Some(code) if !code.trim().is_empty() => code,
        _ => {
            log::warn!("❌ No authorization code provided");
            return error_response(&crate::utils::AppError::InvalidRequest(
                "Missing authorization code".into(),
            ));
        }
    };

    match auth_service::handle_google_callback(db.get_ref(), &config, code).await {
        Ok(response) => {
            log::info!("✅ Google sign-in successful: {}", response.user.email);
            HttpResponse::Ok().json(response)
        }
        Err(e) => {
            log::warn!("❌ Google sign-in failed: {}", e);
            error_response(&e)
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/refresh",
    tag = "Auth",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "New token pair", body = AuthResponse),
        (status = 401, description = "Invalid refresh token")
    )
)]
pub async fn refresh_token(
    db: web::Data<dyn Store>,
    config: web::Data<AppConfig>,
    request: web::Json<RefreshTokenRequest>,
) -> HttpResponse {
    log::info!("🔄 POST /auth/refresh");

    match auth_service::refresh_token(db.get_ref(), &config, &request).await {
        Ok(response) => {
            log::info!("✅ Token refreshed");
            HttpResponse::Ok().json(response)
        }
        Err(e) => {
            log::warn!("❌ Token refresh failed: {}", e);
            error_response(&e)
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/verify",
    tag = "Auth",
    responses(
        (status = 200, description = "Token is valid"),
        (status = 401, description = "Invalid or expired token")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn verify_token(config: web::Data<AppConfig>, req: HttpRequest) -> HttpResponse {
    log::info!("✓ GET /auth/verify");

    let token = req
        .headers()
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_token);

    let token = match token {
        Some(token) => token,
        None => {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "success": false,
                "error": "No valid Authorization header"
            }))
        }
    };

    match auth_service::verify_token(&config, token) {
        Ok(claims) => {
            log::info!("✅ Token valid for user: {}", claims.sub);
            HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "valid": true,
                "user_id": claims.sub,
                "email": claims.email,
                "token_type": claims.token_type,
                "exp": claims.exp
            }))
        }
        Err(e) => {
            log::warn!("❌ Invalid token: {}", e);
            HttpResponse::Unauthorized().json(serde_json::json!({
                "success": false,
                "valid": false,
                "error": e.to_string()
            }))
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User document missing")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_me(db: web::Data<dyn Store>, user: web::ReqData<Claims>) -> HttpResponse {
    log::info!("👤 GET /auth/me - user: {}", user.sub);

    match user_service::get_user(db.get_ref(), &user.sub).await {
        Ok(found) => {
            let needs_profile_setup = !found.profile_complete;
            HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "user": UserResponse::from(found),
                "needs_profile_setup": needs_profile_setup
            }))
        }
        Err(e) => {
            log::error!("❌ Failed to get user {}: {}", user.sub, e);
            error_response(&e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support;
    use crate::config::test_config;
    use crate::middleware::auth::AuthMiddleware;
    use crate::models::User;
    use actix_web::{http::StatusCode, test, App};

    #[actix_web::test]
    async fn test_me_requires_token_and_reports_profile_setup() {
        let store = test_support::store();
        let token = test_support::signed_in(&store, "g-1", "ada@scu.edu").await;
        let (db, config) = test_support::data(&store);
        let app = test::init_service(
            App::new().app_data(db).app_data(config).service(
                web::resource("/me")
                    .wrap(AuthMiddleware)
                    .route(web::get().to(get_me)),
            ),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/me")
            .insert_header(test_support::bearer(&token))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["user"]["id"], "g-1");
        assert_eq!(body["needs_profile_setup"], true);

        let req = test::TestRequest::get().uri("/me").to_request();
        let err = test::try_call_service(&app, req).await.unwrap_err();
        assert_eq!(err.error_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_refresh_rejects_access_token() {
        let store = test_support::store();
        let config = test_config();
        let user = User::new_from_identity("g-2", "bo@scu.edu", None, None);
        let access = auth_service::generate_jwt(&config, &user).unwrap();
        let (db, config) = test_support::data(&store);
        let app = test::init_service(
            App::new()
                .app_data(db)
                .app_data(config)
                .route("/refresh", web::post().to(refresh_token)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/refresh")
            .set_json(serde_json::json!({ "refresh_token": access }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_callback_without_code_is_bad_request() {
        let store = test_support::store();
        let (db, config) = test_support::data(&store);
        let app = test::init_service(
            App::new()
                .app_data(db)
                .app_data(config)
                .route("/callback", web::get().to(google_callback)),
        )
        .await;

        let req = test::TestRequest::get().uri("/callback").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
