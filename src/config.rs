use std::env;
use std::fmt::Display;
use std::str::FromStr;

pub const DEFAULT_ACADEMIC_PERIOD: &str = "Spring 2025 Quarter";

#[derive(Debug, Clone, PartialEq)]
pub enum StoreBackend {
    Mongo,
    Memory,
}

/// Runtime settings, loaded from the environment (after `dotenv`).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    /// Period used when a request does not name one
    pub academic_period: String,
    /// Sign-in is limited to `@{allowed_email_domain}` addresses
    pub allowed_email_domain: String,
    /// Lowercased
    pub admin_emails: Vec<String>,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_audience: String,
    pub google_client_id: Option<String>,
    pub google_client_secret: Option<String>,
    pub google_redirect_uri: String,
    pub cors_origins: Vec<String>,
    pub reconcile_interval_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let store_backend = match var("STORE_BACKEND").as_deref() {
            Some("memory") => StoreBackend::Memory,
            _ => StoreBackend::Mongo,
        };

        AppConfig {
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or("PORT", 3002),
            store_backend,
            database_url: var("DATABASE_URL"),
            academic_period: var("ACADEMIC_PERIOD")
                .unwrap_or_else(|| DEFAULT_ACADEMIC_PERIOD.to_string()),
            allowed_email_domain: var("ALLOWED_EMAIL_DOMAIN")
                .unwrap_or_else(|| "scu.edu".to_string()),
            admin_emails: split_list(&var("ADMIN_EMAILS").unwrap_or_default())
                .into_iter()
                .map(|e| e.to_lowercase())
                .collect(),
            jwt_secret: var("JWT_SECRET").unwrap_or_else(|| {
                log::warn!("⚠️  JWT_SECRET not set, using an insecure default");
                "default-secret-change-me".to_string()
            }),
            jwt_issuer: var("JWT_ISSUER").unwrap_or_else(|| "bronco-buddies".to_string()),
            jwt_audience: var("JWT_AUDIENCE").unwrap_or_else(|| "bronco-buddies-api".to_string()),
            google_client_id: var("GOOGLE_CLIENT_ID"),
            google_client_secret: var("GOOGLE_CLIENT_SECRET"),
            google_redirect_uri: var("GOOGLE_REDIRECT_URI")
                .unwrap_or_else(|| "http://localhost:3000/auth/callback".to_string()),
            cors_origins: split_list(
                &var("CORS_ORIGINS")
                    .unwrap_or_else(|| "http://localhost:3000,http://127.0.0.1:3000".to_string()),
            ),
            reconcile_interval_secs: parse_or("RECONCILE_INTERVAL_SECS", 3600),
        }
    }

    pub fn is_admin(&self, email: &str) -> bool {
        let email = email.to_lowercase();
        self.admin_emails.iter().any(|admin| *admin == email)
    }

    /// Requested period, or the configured default when absent or blank.
    pub fn period_or_default<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        requested
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or(&self.academic_period)
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_or<T: FromStr + Display>(key: &str, default: T) -> T
where
    T::Err: Display,
{
    match var(key) {
        Some(raw) => raw.parse().unwrap_or_else(|e| {
            log::warn!("Invalid {} value '{}': {}, using default {}", key, raw, e, default);
            default
        }),
        None => default,
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
pub(crate) fn test_config() -> AppConfig {
    AppConfig {
        host: "127.0.0.1".into(),
        port: 0,
        store_backend: StoreBackend::Memory,
        database_url: None,
        academic_period: DEFAULT_ACADEMIC_PERIOD.into(),
        allowed_email_domain: "scu.edu".into(),
        admin_emails: vec!["admin@scu.edu".into()],
        jwt_secret: "test-secret".into(),
        jwt_issuer: "bronco-buddies".into(),
        jwt_audience: "bronco-buddies-api".into(),
        google_client_id: None,
        google_client_secret: None,
        google_redirect_uri: "http://localhost:3000/auth/callback".into(),
        cors_origins: vec![],
        reconcile_interval_secs: 3600,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_check_is_case_insensitive() {
        let config = test_config();
        assert!(config.is_admin("Admin@SCU.edu"));
        assert!(!config.is_admin("student@scu.edu"));
    }

    #[test]
    fn test_period_defaults() {
        let config = test_config();
        assert_eq!(config.period_or_default(None), DEFAULT_ACADEMIC_PERIOD);
        assert_eq!(config.period_or_default(Some("  ")), DEFAULT_ACADEMIC_PERIOD);
        assert_eq!(config.period_or_default(Some("Fall 2025 Quarter")), "Fall 2025 Quarter");
    }

    #[test]
    fn test_split_list() {
        assert_eq!(
            split_list(" a@scu.edu, ,b@scu.edu "),
            vec!["a@scu.edu".to_string(), "b@scu.edu".to_string()]
        );
    }
}
