// ABOUTME: Conversion from sqlx errors into the unified AppError taxonomy
// ABOUTME: Maps missing rows and constraint violations to their domain error codes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use sqlx::error::ErrorKind;
use sqlx::Error as SqlxError;

use super::{AppError, ErrorCode};

impl From<SqlxError> for AppError {
    fn from(error: SqlxError) -> Self {
        let code = match &error {
            SqlxError::RowNotFound => ErrorCode::ResourceNotFound,
            SqlxError::Database(db_error) => match db_error.kind() {
                ErrorKind::UniqueViolation => ErrorCode::ResourceAlreadyExists,
                ErrorKind::CheckViolation => ErrorCode::InvalidState,
                ErrorKind::NotNullViolation => ErrorCode::MissingRequiredField,
                _ => ErrorCode::DatabaseError,
            },
            _ => ErrorCode::DatabaseError,
        };
        let message = match code {
            ErrorCode::ResourceNotFound => "Record not found".to_owned(),
            _ => format!("Database operation failed: {error}"),
        };
        Self::new(code, message).with_source(error)
    }
}
