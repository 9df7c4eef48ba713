//! Alert system for displaying success and error messages to users.
//!
//! Alerts are rendered into the page's alert container. HTMX requests place
//! error responses there via `hx-target-error`, and successful responses can
//! include an alert as an out-of-band swap with [Alert::into_oob_html].

use axum::response::{IntoResponse, Response};
use maud::{Markup, html};

/// A message to display to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// An operation succeeded and there is nothing more to say about it.
    SuccessSimple { message: String },
    /// An operation failed.
    Error { message: String, details: String },
}

impl Alert {
    fn parts(&self) -> (&str, &str, &'static str) {
        const SUCCESS_STYLE: &str = "text-green-800 bg-green-50 border-green-300 \
            dark:bg-gray-800 dark:text-green-400 dark:border-green-800";
        const ERROR_STYLE: &str = "text-red-800 bg-red-50 border-red-300 \
            dark:bg-gray-800 dark:text-red-400 dark:border-red-800";

        match self {
            Alert::SuccessSimple { message } => (message.as_str(), "", SUCCESS_STYLE),
            Alert::Error { message, details } => {
                (message.as_str(), details.as_str(), ERROR_STYLE)
            }
        }
    }

    /// Render the alert as an HTML fragment.
    pub fn into_html(self) -> Markup {
        let (message, details, style) = self.parts();

        html! {
            div
                role="alert"
                class={ "flex items-start justify-between p-4 mb-4 border rounded-lg " (style) }
            {
                div
                {
                    p class="font-medium" { (message) }

                    @if !details.is_empty() {
                        p class="text-sm" { (details) }
                    }
                }

                button
                    type="button"
                    aria-label="Dismiss"
                    class="ms-3 text-lg leading-none"
                    onclick="this.closest('[role=alert]').remove()"
                {
                    "×"
                }
            }
        }
    }

    /// Render the alert so that HTMX swaps it into the alert container
    /// alongside the main response content.
    pub fn into_oob_html(self) -> Markup {
        html! {
            div id="alert-container" hx-swap-oob="innerHTML"
            {
                (self.into_html())
            }
        }
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        self.into_html().into_response()
    }
}
