use axum::{extract::rejection::JsonRejection, Json};
use garde::Validate;

use crate::error::{AppError, Result};
use crate::models::{
    account::ProfileUpdate,
    auth::{ChangePasswordRequest, LoginRequest, RegisterRequest},
};

/// Longest accepted free-text profile field, in characters.
pub const MAX_PROFILE_TEXT: usize = 200;
/// Most entries accepted in one profile list.
pub const MAX_PROFILE_LIST: usize = 100;

/// Unwraps a JSON body, reporting malformed or incomplete bodies as
/// validation failures.
pub fn json_body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| {
            AppError::Validation(format!("Invalid request body: {}", rejection.body_text()))
        })
}

/// Trims and lowercases an email so lookups are case-insensitive.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn check<T>(payload: &T) -> Result<()>
where
    T: Validate,
    T::Context: Default,
{
    payload
        .validate()
        .map_err(|report| AppError::Validation(report.to_string().trim().to_string()))
}

/// Normalises and validates a registration request in place.
pub fn validate_registration(payload: &mut RegisterRequest) -> Result<()> {
    payload.name = payload.name.trim().to_string();
    payload.email = normalize_email(&payload.email);

    if payload.name.is_empty() {
        return Err(AppError::Validation("Name cannot be empty".to_string()));
    }

    check(payload)?;

    if let Some(confirm) = &payload.confirm_password {
        if confirm != &payload.password {
            return Err(AppError::Validation("Passwords do not match".to_string()));
        }
    }

    Ok(())
}

/// Normalises and validates a login request in place.
pub fn validate_login(payload: &mut LoginRequest) -> Result<()> {
    payload.email = normalize_email(&payload.email);
    check(payload).map_err(|_| {
        AppError::Validation("Email and password are required".to_string())
    })
}

/// Validates a password change request.
pub fn validate_password_change(payload: &ChangePasswordRequest) -> Result<()> {
    check(payload)
}

/// Validates the fields present in a profile update.
pub fn validate_profile_update(update: &ProfileUpdate) -> Result<()> {
    let texts = [
        ("gradeLevel", &update.grade_level),
        ("major", &update.major),
        ("degreeType", &update.degree_type),
    ];
    for (field, value) in texts {
        if let Some(value) = value {
            check_text(field, value)?;
        }
    }

    let lists = [
        ("completedCourses", &update.completed_courses),
        ("currentCourses", &update.current_courses),
        ("careerInterests", &update.career_interests),
        ("disabilities", &update.disabilities),
    ];
    for (field, values) in lists {
        if let Some(values) = values {
            check_list_len(field, values.len())?;
            for value in values {
                check_text(field, value)?;
            }
        }
    }

    if let Some(availability) = &update.availability {
        check_list_len("availability", availability.len())?;
        for entry in availability {
            if entry.day.trim().is_empty() || entry.slot.trim().is_empty() {
                return Err(AppError::Validation(
                    "availability entries need both a day and a slot".to_string(),
                ));
            }
            check_text("availability", &entry.day)?;
            check_text("availability", &entry.slot)?;
        }
    }

    Ok(())
}

fn check_text(field: &str, value: &str) -> Result<()> {
    if value.chars().count() > MAX_PROFILE_TEXT {
        return Err(AppError::Validation(format!(
            "{field} entries must be at most {MAX_PROFILE_TEXT} characters"
        )));
    }
    Ok(())
}

fn check_list_len(field: &str, len: usize) -> Result<()> {
    if len > MAX_PROFILE_LIST {
        return Err(AppError::Validation(format!(
            "{field} must have at most {MAX_PROFILE_LIST} entries"
        )));
    }
    Ok(())
}
