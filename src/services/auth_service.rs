use crate::{
    config::AppConfig,
    database::Store,
    models::{User, UserResponse},
    utils::{AppError, AppResult},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

pub const ACCESS_TOKEN: &str = "access";
pub const REFRESH_TOKEN: &str = "refresh";

// JWT Claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // user id
    pub email: String,
    pub name: Option<String>,
    pub token_type: String,
    pub iat: usize,
    pub exp: usize,
    pub jti: String,
    pub aud: String,
    pub iss: String,
}

/// Profile returned by the identity provider after a successful sign-in.
#[derive(Debug, Clone, Deserialize)]
pub struct Identity {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub picture: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AuthResponse {
    pub success: bool,
    pub token: String,
    pub refresh_token: String,
    pub user: UserResponse,
    pub needs_profile_setup: bool,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct GoogleAuthUrlResponse {
    pub success: bool,
    pub auth_url: String,
    pub state: String,
}

/// Case-insensitive `@domain` suffix check.
pub fn is_allowed_email(email: &str, domain: &str) -> bool {
    let suffix = format!("@{}", domain.trim_start_matches('@').to_lowercase());
    let email = email.trim().to_lowercase();
    email.len() > suffix.len() && email.ends_with(&suffix)
}

fn issue_token(
    config: &AppConfig,
    user_id: &str,
    email: &str,
    name: Option<String>,
    token_type: &str,
    ttl: Duration,
) -> AppResult<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        name,
        token_type: token_type.to_string(),
        iat: now.timestamp() as usize,
        exp: (now + ttl).timestamp() as usize,
        jti: Uuid::new_v4().to_string(),
        aud: config.jwt_audience.clone(),
        iss: config.jwt_issuer.clone(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_ref()),
    )
    .map_err(|e| AppError::Unauthorized(format!("Failed to generate token: {}", e)))
}

pub fn generate_jwt(config: &AppConfig, user: &User) -> AppResult<String> {
    issue_token(
        config,
        &user.id,
        &user.email,
        user.display_name.clone(),
        ACCESS_TOKEN,
        Duration::hours(24),
    )
}

pub fn generate_refresh_token(config: &AppConfig, user: &User) -> AppResult<String> {
    issue_token(
        config,
        &user.id,
        &user.email,
        None,
        REFRESH_TOKEN,
        Duration::days(30),
    )
}

// Verify JWT token
pub fn verify_token(config: &AppConfig, token: &str) -> AppResult<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[config.jwt_audience.as_str()]);

    let mut issuers = HashSet::new();
    issuers.insert(config.jwt_issuer.clone());
    validation.iss = Some(issuers);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_ref()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
}

fn auth_response(config: &AppConfig, user: User) -> AppResult<AuthResponse> {
    let token = generate_jwt(config, &user)?;
    let refresh_token = generate_refresh_token(config, &user)?;
    let needs_profile_setup = !user.profile_complete;

    Ok(AuthResponse {
        success: true,
        token,
        refresh_token,
        user: UserResponse::from(user),
        needs_profile_setup,
    })
}

/// Signs in an authenticated identity.
///
/// Addresses outside the allowed domain are rejected. The first sign-in
/// creates the user document with an empty course set and an incomplete
/// profile; later sign-ins refresh email and photo.
pub async fn sign_in(db: &dyn Store, config: &AppConfig, identity: &Identity) -> AppResult<AuthResponse> {
    if !is_allowed_email(&identity.email, &config.allowed_email_domain) {
        log::warn!("🚫 Sign-in rejected for {}", identity.email);
        return Err(AppError::Forbidden(format!(
            "Please use your @{} email address",
            config.allowed_email_domain
        )));
    }

    let user = match db.get_user(&identity.id).await? {
        Some(mut existing) => {
            db.update_user_identity(&identity.id, &identity.email, identity.picture.as_deref())
                .await?;
            existing.email = identity.email.clone();
            existing.photo_url = identity.picture.clone();
            log::info!("✅ Found existing user: {}", existing.id);
            existing
        }
        None => {
            let new_user = User::new_from_identity(
                &identity.id,
                &identity.email,
                identity.name.clone(),
                identity.picture.clone(),
            );
            match db.insert_user(&new_user).await {
                Ok(()) => {
                    log::info!("✅ Created user document for {}", new_user.id);
                    new_user
                }
                // Concurrent first sign-in already created it
                Err(AppError::Conflict(_)) => db
                    .get_user(&identity.id)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("User {} not found", identity.id)))?,
                Err(e) => return Err(e),
            }
        }
    };

    auth_response(config, user)
}

pub async fn refresh_token(
    db: &dyn Store,
    config: &AppConfig,
    request: &RefreshTokenRequest,
) -> AppResult<AuthResponse> {
    let claims = verify_token(config, &request.refresh_token)?;
    if claims.token_type != REFRESH_TOKEN {
        return Err(AppError::Unauthorized("Not a refresh token".into()));
    }

    let user = db
        .get_user(&claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".into()))?;

    auth_response(config, user)
}

// Generate Google OAuth URL
pub fn generate_google_oauth_url(config: &AppConfig) -> AppResult<GoogleAuthUrlResponse> {
    let client_id = config
        .google_client_id
        .as_deref()
        .ok_or_else(|| AppError::ExternalError("GOOGLE_CLIENT_ID not configured".into()))?;

    // CSRF state
    let state = Uuid::new_v4().to_string();

    let params = [
        ("client_id", client_id),
        ("redirect_uri", config.google_redirect_uri.as_str()),
        ("response_type", "code"),
        ("scope", "openid email profile"),
        ("state", state.as_str()),
        ("hd", config.allowed_email_domain.as_str()),
        ("prompt", "select_account"),
    ];

    let query_string = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    let auth_url = format!("https://accounts.google.com/o/oauth2/v2/auth?{}", query_string);

    Ok(GoogleAuthUrlResponse {
        success: true,
        auth_url,
        state,
    })
}

// Handle Google OAuth callback
pub async fn handle_google_callback(
    db: &dyn Store,
    config: &AppConfig,
    code: &str,
) -> AppResult<AuthResponse> {
    let client_id = config
        .google_client_id
        .as_deref()
        .ok_or_else(|| AppError::ExternalError("GOOGLE_CLIENT_ID not configured".into()))?;
    let client_secret = config
        .google_client_secret
        .as_deref()
        .ok_or_else(|| AppError::ExternalError("GOOGLE_CLIENT_SECRET not configured".into()))?;

    // Exchange code for tokens
    let client = reqwest::Client::new();
    let token_response = client
        .post("https://oauth2.googleapis.com/token")
        .form(&[
            ("code", code),
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("redirect_uri", config.google_redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ])
        .send()
        .await?;

    if !token_response.status().is_success() {
        return Err(AppError::Unauthorized(
            "Failed to exchange authorization code".into(),
        ));
    }

    let tokens: serde_json::Value = token_response.json().await?;

    let access_token = tokens["access_token"]
        .as_str()
        .ok_or_else(|| AppError::ExternalError("No access token in response".into()))?;

    // Get user info
    let identity: Identity = client
        .get("https://www.googleapis.com/oauth2/v2/userinfo")
        .header("Authorization", format!("Bearer {}", access_token))
        .send()
        .await?
        .json()
        .await?;

    sign_in(db, config, &identity).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use crate::database::MemoryStore;

    fn identity(id: &str, email: &str) -> Identity {
        Identity {
            id: id.into(),
            email: email.into(),
            name: Some("Ada Lovelace".into()),
            picture: Some("https://example.com/ada.png".into()),
        }
    }

    #[test]
    fn test_email_domain_check() {
        assert!(is_allowed_email("ada@scu.edu", "scu.edu"));
        assert!(is_allowed_email("Ada@SCU.EDU", "scu.edu"));
        assert!(!is_allowed_email("ada@gmail.com", "scu.edu"));
        assert!(!is_allowed_email("ada@notscu.edu", "scu.edu"));
        assert!(!is_allowed_email("@scu.edu", "scu.edu"));
    }

    #[test]
    fn test_token_round_trip_and_tamper() {
        let config = test_config();
        let user = User::new_from_identity("u1", "ada@scu.edu", None, None);

        let token = generate_jwt(&config, &user).unwrap();
        let claims = verify_token(&config, &token).unwrap();
        assert_eq!(claims.sub, "u1");
        assert_eq!(claims.token_type, ACCESS_TOKEN);

        let mut other = test_config();
        other.jwt_secret = "another-secret".into();
        assert!(verify_token(&other, &token).is_err());
    }

    #[tokio::test]
    async fn test_first_sign_in_creates_user() {
        let store = MemoryStore::new();
        let config = test_config();

        let response = sign_in(&store, &config, &identity("g-1", "ada@scu.edu")).await.unwrap();
        assert!(response.needs_profile_setup);
        assert_eq!(response.user.first_name, "Ada");

        let stored = store.get_user("g-1").await.unwrap().unwrap();
        assert!(stored.enrollments.is_empty());
        assert!(!stored.profile_complete);

        // Second sign-in reuses the document
        let again = sign_in(&store, &config, &identity("g-1", "ada@scu.edu")).await.unwrap();
        assert_eq!(again.user.id, "g-1");
        assert_eq!(store.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_sign_in_rejects_foreign_domain() {
        let store = MemoryStore::new();
        let result = sign_in(&store, &test_config(), &identity("g-2", "ada@gmail.com")).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
        assert_eq!(store.count_users().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_refresh_requires_refresh_token() {
        let store = MemoryStore::new();
        let config = test_config();
        let signed_in = sign_in(&store, &config, &identity("g-1", "ada@scu.edu")).await.unwrap();

        let refreshed = refresh_token(
            &store,
            &config,
            &RefreshTokenRequest { refresh_token: signed_in.refresh_token.clone() },
        )
        .await
        .unwrap();
        assert_eq!(refreshed.user.id, "g-1");

        let wrong_kind = refresh_token(
            &store,
            &config,
            &RefreshTokenRequest { refresh_token: signed_in.token },
        )
        .await;
        assert!(matches!(wrong_kind, Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_google_url_restricts_domain() {
        let mut config = test_config();
        assert!(generate_google_oauth_url(&config).is_err());

        config.google_client_id = Some("client-123".into());
        let url = generate_google_oauth_url(&config).unwrap().auth_url;
        assert!(url.contains("client_id=client-123"));
        assert!(url.contains("hd=scu.edu"));
    }
}
