use crate::{
    database::Store,
    models::{CompleteProfileRequest, ProfileUpdate, User, ACADEMIC_YEARS},
    utils::text::is_blank,
    utils::{AppError, AppResult},
};

pub async fn get_user(db: &dyn Store, user_id: &str) -> AppResult<User> {
    db.get_user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))
}

fn validate_profile(request: &CompleteProfileRequest) -> AppResult<ProfileUpdate> {
    if is_blank(&request.first_name)
        || is_blank(&request.last_name)
        || is_blank(&request.year)
        || is_blank(&request.major)
    {
        return Err(AppError::InvalidRequest("Please fill in all fields".into()));
    }

    let year = request.year.trim().to_lowercase();
    if !ACADEMIC_YEARS.contains(&year.as_str()) {
        return Err(AppError::InvalidRequest(format!(
            "Invalid academic year '{}'. Expected one of: {}",
            request.year,
            ACADEMIC_YEARS.join(", ")
        )));
    }

    let first_name = request.first_name.trim().to_string();
    let last_name = request.last_name.trim().to_string();

    Ok(ProfileUpdate {
        display_name: format!("{} {}", first_name, last_name),
        first_name,
        last_name,
        year,
        major: request.major.trim().to_string(),
        updated_at: chrono::Utc::now().timestamp(),
    })
}

/// Writes the profile fields and marks the profile complete.
pub async fn complete_profile(
    db: &dyn Store,
    user_id: &str,
    request: &CompleteProfileRequest,
) -> AppResult<User> {
    let update = validate_profile(request)?;

    if !db.update_profile(user_id, &update).await? {
        return Err(AppError::NotFound(format!("User {} not found", user_id)));
    }

    log::info!("✅ Profile completed for {}", user_id);
    get_user(db, user_id).await
}
