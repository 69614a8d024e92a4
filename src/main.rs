mod api;
mod config;
mod database;
mod jobs;
mod middleware;
mod models;
mod seeds;
mod services;
mod utils;

use actix_cors::Cors;
use actix_web::{dev::Service as _, middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use config::{AppConfig, StoreBackend};
use database::Store;

async fn connect_store(config: &AppConfig) -> std::io::Result<Arc<dyn Store>> {
    match config.store_backend {
        StoreBackend::Memory => {
            log::warn!("⚠️  Using the in-memory store, data is lost on restart");
            Ok(Arc::new(database::MemoryStore::new()))
        }
        StoreBackend::Mongo => {
            let url = config.database_url.as_deref().ok_or_else(|| {
                log::error!("❌ DATABASE_URL must be set when STORE_BACKEND is mongo");
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "DATABASE_URL must be set")
            })?;

            let db = database::MongoDB::new(url).await.map_err(|e| {
                log::error!("❌ Failed to connect to MongoDB: {}", e);
                std::io::Error::new(std::io::ErrorKind::ConnectionRefused, e.to_string())
            })?;
            log::info!("✅ MongoDB connected successfully");
            Ok(Arc::new(db))
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = AppConfig::from_env();

    log::info!("🚀 Starting Bronco Buddies...");
    log::info!("🎓 Academic period: {}", config.academic_period);
    log::info!("📧 Sign-in restricted to @{}", config.allowed_email_domain);

    let store = connect_store(&config).await?;

    log::info!("📅 Starting background jobs...");
    jobs::reconcile_scheduler::start_enrollment_reconciler(
        store.clone(),
        config.academic_period.clone(),
        config.reconcile_interval_secs,
    )
    .await;
    log::info!("✅ Background jobs started");

    let host = config.host.clone();
    let port = config.port;

    log::info!("🌐 Server starting on {}:{}", host, port);
    log::info!("📚 Swagger UI available at: http://{}:{}/swagger-ui/", host, port);
    log::info!("📄 OpenAPI spec at: http://{}:{}/api-docs/openapi.json", host, port);

    let store_data: web::Data<dyn Store> = web::Data::from(store);
    let config_data = web::Data::new(config);

    HttpServer::new(move || {
        let cors = config_data
            .cors_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .expose_headers(vec![actix_web::http::header::CONTENT_TYPE])
            .supports_credentials()
            .max_age(3600);

        let openapi = api::swagger::ApiDoc::openapi();

        App::new()
            .app_data(store_data.clone())
            .app_data(config_data.clone())
            .wrap_fn(|req, srv| {
                api::metrics::increment_request_count();
                srv.call(req)
            })
            .wrap(cors)
            .wrap(middleware::SecurityHeaders)
            .wrap(Logger::default())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi.clone())
            )
            .route("/health", web::get().to(api::health::health_check))
            .route("/metrics", web::get().to(api::metrics::get_metrics))
            // Auth: sign-in is public, /me needs a token
            .service(
                web::scope("/api/v1/auth")
                    .route("/google", web::get().to(api::auth::google_auth))
                    .route("/callback", web::get().to(api::auth::google_callback))
                    .route("/refresh", web::post().to(api::auth::refresh_token))
                    .route("/verify", web::get().to(api::auth::verify_token))
                    .service(
                        web::resource("/me")
                            .wrap(middleware::auth::AuthMiddleware)
                            .route(web::get().to(api::auth::get_me))
                    )
            )
            .service(
                web::scope("/api/v1/users")
                    .wrap(middleware::auth::AuthMiddleware)
                    .route("/me/profile", web::put().to(api::users::complete_profile))
            )
            .service(
                web::scope("/api/v1/courses")
                    .wrap(middleware::auth::AuthMiddleware)
                    .route("", web::get().to(api::courses::list_courses))
                    .route("/mine", web::get().to(api::courses::my_courses))
                    .route("/{code}", web::get().to(api::courses::get_course))
                    .route("/{code}/enroll", web::post().to(api::courses::enroll))
                    .route("/{code}/enroll", web::delete().to(api::courses::unenroll))
            )
            .service(
                web::scope("/api/v1/classmates")
                    .wrap(middleware::auth::AuthMiddleware)
                    .route("", web::get().to(api::classmates::get_classmates))
                    .route("/{code}", web::get().to(api::classmates::get_course_classmates))
            )
            .service(
                web::scope("/api/v1/sessions")
                    .wrap(middleware::auth::AuthMiddleware)
                    .route("", web::get().to(api::sessions::my_sessions))
                    .route("", web::post().to(api::sessions::create_session))
                    .route("/course/{code}", web::get().to(api::sessions::course_sessions))
                    .route("/{code}/{id}/join", web::post().to(api::sessions::join_session))
                    .route("/{code}/{id}/leave", web::post().to(api::sessions::leave_session))
            )
            // Admin: allowlist checked per handler
            .service(
                web::scope("/api/v1/admin")
                    .wrap(middleware::auth::AuthMiddleware)
                    .route("/courses", web::post().to(api::admin::create_course))
                    .route("/populate", web::post().to(api::admin::populate))
                    .route("/state", web::get().to(api::admin::state))
                    .route("/reconcile", web::post().to(api::admin::reconcile))
            )
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
