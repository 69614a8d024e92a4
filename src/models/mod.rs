pub mod classmate;
pub mod course;
pub mod study_session;
pub mod user;

pub use classmate::*;
pub use course::*;
pub use study_session::*;
pub use user::*;
