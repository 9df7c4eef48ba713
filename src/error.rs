//! Defines the app level error type and conversions to rendered HTML pages and alerts.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{alert::Alert, internal_server_error::InternalServerError, not_found::NotFoundError};

/// The reasons user input for a new transaction can be rejected.
#[derive(Debug, Clone, Copy, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The transaction name was empty or only whitespace.
    #[error("Name cannot be empty.")]
    EmptyName,

    /// The transaction name has more characters than allowed.
    #[error("Name cannot be longer than {0} characters.")]
    NameTooLong(usize),

    /// Neither a received amount nor a paid amount was given.
    #[error("Please enter either received amount or paid amount.")]
    MissingAmount,

    /// An amount was not a plain decimal number.
    #[error("Amounts must be numbers, e.g. 12.50.")]
    InvalidAmount,

    /// An amount was below zero.
    #[error("Amounts cannot be negative.")]
    NegativeAmount,

    /// An amount had fractions of a cent.
    #[error("Amounts cannot have more than two decimal places.")]
    TooManyDecimalPlaces,

    /// An amount was larger than the largest amount accepted.
    #[error("Amounts cannot be larger than 99,999,999.99.")]
    AmountTooLarge,
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The user input for a new transaction was invalid.
    ///
    /// Nothing is written to the database when this error is returned.
    #[error("invalid transaction: {0}")]
    Validation(#[from] ValidationError),

    /// The username and password do not match the shared credential.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// The auth cookie is missing from the cookie jar in the request.
    #[error("no cookies in the cookie jar :(")]
    CookieMissing,

    /// The auth cookie could not be read, or it has expired.
    #[error("the auth cookie is invalid or has expired")]
    InvalidAuthCookie,

    /// The shared credential was configured with an empty value.
    #[error("the shared credential is missing a {0}")]
    MissingCredential(&'static str),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// An error occurred while writing transactions as CSV.
    #[error("could not write CSV: {0}")]
    CsvError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// Tried to delete a transaction that does not exist
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => NotFoundError.into_response(),
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                error.server_fault().into_response()
            }
        }
    }
}

impl Error {
    /// The server fault to report for errors that are not the client's doing.
    fn server_fault(self) -> InternalServerError {
        match self {
            Error::SqlError(_) => InternalServerError::Database,
            Error::DatabaseLockError => InternalServerError::DatabaseLock,
            Error::InvalidTimezoneError(timezone) => InternalServerError::Timezone(timezone),
            // Any errors that are not handled above are not intended to be shown to the client.
            _ => InternalServerError::Unexpected,
        }
    }

    /// Convert the error into an HTTP response with an HTML alert.
    pub fn into_alert_response(self) -> Response {
        let (status_code, alert) = match self {
            Error::Validation(error) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Could not save transaction".to_owned(),
                    details: error.to_string(),
                },
            ),
            Error::DeleteMissingTransaction => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not delete transaction".to_owned(),
                    details: "Transaction not found. \
                    Try refreshing the page to see if the transaction has already been deleted."
                        .to_owned(),
                },
            ),
            error => {
                let fault = error.server_fault();
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Alert::Error {
                        message: fault.description().to_owned(),
                        details: fault.fix(),
                    },
                )
            }
        };

        (status_code, alert.into_html()).into_response()
    }
}
