//! The page shown when the ledger cannot finish a request because of a server fault.
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::html::error_view;

/// What went wrong on the server, phrased for the person running it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InternalServerError {
    /// The ledger database returned an error.
    Database,
    /// Another request panicked while holding the database connection.
    DatabaseLock,
    /// The configured timezone is not a canonical timezone name.
    Timezone(String),
    /// Anything else.
    #[default]
    Unexpected,
}

impl InternalServerError {
    /// A one line summary of the fault.
    pub fn description(&self) -> &'static str {
        match self {
            InternalServerError::Database => "Could not read or update the ledger.",
            InternalServerError::DatabaseLock => "The ledger database is unavailable.",
            InternalServerError::Timezone(_) => "Invalid Timezone Settings",
            InternalServerError::Unexpected => "Sorry, something went wrong.",
        }
    }

    /// What the person running the server can do about it.
    pub fn fix(&self) -> String {
        match self {
            InternalServerError::Database => "Check that the database file exists and is writable. \
                Stored balances are checked and repaired when the server starts."
                .to_owned(),
            InternalServerError::DatabaseLock => {
                "Restart the server, then check the server logs for the request that failed."
                    .to_owned()
            }
            InternalServerError::Timezone(timezone) => format!(
                "Could not get local timezone \"{timezone}\". Set --timezone or LOCAL_TIMEZONE \
                to a canonical timezone name such as \"Asia/Karachi\"."
            ),
            InternalServerError::Unexpected => {
                "Try again later or check the server logs.".to_owned()
            }
        }
    }

    fn into_html(self) -> Html<String> {
        Html(
            error_view(
                "Internal Server Error",
                "500",
                self.description(),
                &self.fix(),
            )
            .into_string(),
        )
    }
}

impl IntoResponse for InternalServerError {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, self.into_html()).into_response()
    }
}

/// The route handler for the generic error page.
pub async fn get_internal_server_error_page() -> Response {
    InternalServerError::Unexpected.into_response()
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::test_utils::parse_html_document;

    use super::{InternalServerError, get_internal_server_error_page};

    #[tokio::test]
    async fn error_page_is_server_error() {
        let response = get_internal_server_error_page().await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let document = parse_html_document(response).await;
        let text = document.root_element().text().collect::<String>();
        assert!(text.contains("Sorry, something went wrong."));
    }

    #[tokio::test]
    async fn database_fault_points_at_database_file() {
        let response = InternalServerError::Database.into_response();

        let document = parse_html_document(response).await;
        let text = document.root_element().text().collect::<String>();
        assert!(
            text.contains("Check that the database file exists and is writable."),
            "got {text:?}"
        );
    }

    #[test]
    fn timezone_fix_names_the_timezone() {
        let fix = InternalServerError::Timezone("Mars/Olympus".to_owned()).fix();

        assert!(fix.contains("\"Mars/Olympus\""));
        assert!(fix.contains("LOCAL_TIMEZONE"));
    }
}
