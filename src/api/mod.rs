pub mod admin;
pub mod auth;
pub mod classmates;
pub mod courses;
pub mod health;
pub mod metrics;
pub mod sessions;
pub mod swagger;
pub mod users;

use actix_web::HttpResponse;
use serde::Deserialize;

use crate::utils::AppError;

/// `?period=` override accepted by every endpoint.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PeriodQuery {
    /// Academic period, e.g. "Spring 2025 Quarter"
    pub period: Option<String>,
}

pub fn error_response(error: &AppError) -> HttpResponse {
    metrics::increment_error_count();

    let mut builder = match error {
        AppError::NotFound(_) => HttpResponse::NotFound(),
        AppError::InvalidRequest(_) => HttpResponse::BadRequest(),
        AppError::Unauthorized(_) => HttpResponse::Unauthorized(),
        AppError::Forbidden(_) => HttpResponse::Forbidden(),
        AppError::Conflict(_) => HttpResponse::Conflict(),
        AppError::ExternalError(_) => HttpResponse::BadGateway(),
        AppError::DatabaseError(_) => HttpResponse::InternalServerError(),
    };

    builder.json(serde_json::json!({
        "success": false,
        "error": error.to_string()
    }))
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use actix_web::web;

    use crate::config::{test_config, AppConfig};
    use crate::database::{MemoryStore, Store};
    use crate::models::User;
    use crate::services::auth_service;

    pub fn store() -> Arc<MemoryStore> {
        Arc::new(MemoryStore::new())
    }

    pub fn data(store: &Arc<MemoryStore>) -> (web::Data<dyn Store>, web::Data<AppConfig>) {
        let store: Arc<dyn Store> = store.clone();
        (web::Data::from(store), web::Data::new(test_config()))
    }

    /// Inserts a user and returns an access token for it.
    pub async fn signed_in(store: &MemoryStore, id: &str, email: &str) -> String {
        let user = User::new_from_identity(id, email, Some("Ada Lovelace".into()), None);
        store.insert_user(&user).await.unwrap();
        auth_service::generate_jwt(&test_config(), &user).unwrap()
    }

    pub fn bearer(token: &str) -> (&'static str, String) {
        ("Authorization", format!("Bearer {}", token))
    }
}
