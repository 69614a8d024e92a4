pub mod admin_service;
pub mod auth_service;
pub mod classmate_service;
pub mod course_service;
pub mod study_session_service;
pub mod user_service;
