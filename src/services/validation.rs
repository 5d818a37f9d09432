// ABOUTME: Input validation helpers shared by the marketplace services
// ABOUTME: Required text fields, optional tags, and non-negative monetary amounts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::constants::limits::{MAX_CATEGORY_LENGTH, MAX_TITLE_LENGTH};
use crate::errors::{AppError, AppResult};

/// Trim a required text field, failing when nothing is left
///
/// # Errors
///
/// Returns `MissingRequiredField` naming `field`
pub fn require_text(field: &str, value: &str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::missing_field(field));
    }
    Ok(trimmed.to_owned())
}

/// Validate a request title
///
/// # Errors
///
/// Returns a validation error if the title is blank or too long
pub fn require_title(value: &str) -> AppResult<String> {
    let title = require_text("title", value)?;
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(AppError::out_of_range(
            "title",
            format!("title must be at most {MAX_TITLE_LENGTH} characters"),
        ));
    }
    Ok(title)
}

/// Normalize an optional free-text value; blank becomes `None`
#[must_use]
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Normalize an optional category tag
///
/// # Errors
///
/// Returns a validation error if the tag is too long
pub fn optional_category(value: Option<String>) -> AppResult<Option<String>> {
    let category = optional_text(value);
    if category
        .as_ref()
        .is_some_and(|c| c.chars().count() > MAX_CATEGORY_LENGTH)
    {
        return Err(AppError::out_of_range(
            "category",
            format!("category must be at most {MAX_CATEGORY_LENGTH} characters"),
        ));
    }
    Ok(category)
}

/// Validate an optional monetary amount
///
/// # Errors
///
/// Returns a validation error naming `field` for negative or non-finite values
pub fn validate_amount(field: &str, amount: Option<f64>) -> AppResult<Option<f64>> {
    match amount {
        Some(value) if !value.is_finite() || value < 0.0 => Err(AppError::out_of_range(
            field,
            format!("{field} must be a non-negative number"),
        )),
        other => Ok(other),
    }
}
