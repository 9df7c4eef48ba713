//! Defines the printable report of the (filtered) ledger.
use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::Query;
use maud::{Markup, PreEscaped, html};
use rusqlite::Connection;
use time::OffsetDateTime;

use crate::{
    AppState, Error, endpoints,
    html::{BUTTON_SECONDARY_STYLE, HeadElement, LINK_STYLE, base, format_count},
    timezone::local_now,
};

use super::{
    Transaction,
    core::{SortOrder, list_transactions},
    filter::LedgerFilter,
    summary::LedgerSummary,
    view::{format_time, ledger_table_view, summary_view},
};

/// The state needed for the report page.
#[derive(Debug, Clone)]
pub struct ReportPageState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Karachi".
    pub local_timezone: String,
}

impl FromRef<AppState> for ReportPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

const PRINT_STYLE: &str = r#"
@media print {
    body {
        background: white;
        color: black;
    }

    table {
        font-size: 10pt;
    }
}
"#;

/// Render a printable report of the transactions that pass `filter`.
pub async fn get_report_page(
    State(state): State<ReportPageState>,
    Query(filter): Query<LedgerFilter>,
) -> Result<Response, Error> {
    let local_now = local_now(&state.local_timezone)?;

    let transactions = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        list_transactions(SortOrder::Descending, &connection)
            .inspect_err(|error| tracing::error!("could not get transactions: {error}"))?
    };

    let transactions = filter.apply(transactions);

    Ok(report_view(&filter, &transactions, local_now).into_response())
}

fn report_view(filter: &LedgerFilter, transactions: &[Transaction], local_now: OffsetDateTime) -> Markup {
    let title = filter.report_title();
    let summary = LedgerSummary::from_transactions(transactions);
    let back_url = filter.to_url(endpoints::LEDGER_VIEW);

    let content = html! {
        main class="mx-auto max-w-screen-xl px-6 py-8 text-gray-900 dark:text-white"
        {
            div class="print-hidden mb-6 flex items-center justify-between"
            {
                a href=(back_url) class=(LINK_STYLE) { "Back to ledger" }

                button
                    type="button"
                    onclick="window.print()"
                    class={ (BUTTON_SECONDARY_STYLE) " max-w-40" }
                {
                    "Print"
                }
            }

            header class="mb-6 space-y-1"
            {
                h1 class="text-2xl font-bold" { (title) }

                p class="text-sm text-gray-600 dark:text-gray-400"
                {
                    "Generated on " (local_now.date()) " at " (format_time(local_now.time()))
                }

                p class="text-sm text-gray-600 dark:text-gray-400" data-record-count="true"
                {
                    "Total records: " (format_count(transactions.len()))
                }
            }

            (ledger_table_view(transactions, false))

            section class="mt-6"
            {
                h2 class="mb-4 text-xl font-semibold" { "Financial Summary" }
                (summary_view(summary, None))
            }
        }
    };

    base(
        &title,
        &[HeadElement::Style(PreEscaped(PRINT_STYLE.to_owned()))],
        &content,
    )
}
