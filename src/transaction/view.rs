//! HTML rendering for the ledger page and report.

use maud::{Markup, PreEscaped, html};
use time::{
    Date, Month, OffsetDateTime, Time, format_description::BorrowedFormatItem,
    macros::format_description,
};
use unicode_segmentation::UnicodeSegmentation;

use crate::{
    amount::Amount,
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        HeadElement, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE,
        TABLE_ROW_STYLE, balance_class, base,
    },
    navigation::NavBar,
};

use super::{
    Transaction,
    filter::{FilterOptions, LedgerFilter},
    form::transaction_form,
    summary::LedgerSummary,
};

/// The max number of graphemes to display in the comment column before
/// truncating and displaying ellipses.
const MAX_COMMENT_GRAPHEMES: usize = 32;

/// The ID of the element that is reloaded after the ledger changes.
pub(crate) const LEDGER_CONTENT_ID: &str = "ledger-content";

/// The HTMX event that tells the page to reload the ledger.
pub(crate) const LEDGER_CHANGED_EVENT: &str = "ledger-changed";

const TIME_FORMAT: &[BorrowedFormatItem] = format_description!("[hour]:[minute]:[second]");

/// Everything needed to render the ledger page.
pub(crate) struct LedgerView<'a> {
    /// The transactions that passed the filter, newest first.
    pub transactions: &'a [Transaction],
    pub filter: &'a LedgerFilter,
    pub filter_options: &'a FilterOptions,
    /// Totals over the filtered transactions.
    pub summary: LedgerSummary,
    /// The balance after the latest transaction in the whole ledger.
    pub current_balance: Amount,
    /// The current time in the configured timezone.
    pub local_now: OffsetDateTime,
    /// The canonical name of the configured timezone, e.g. "Asia/Karachi".
    pub timezone: &'a str,
}

pub(crate) fn ledger_view(view: LedgerView<'_>) -> Markup {
    let nav_bar = NavBar::new(endpoints::LEDGER_VIEW).into_html();
    let current_url = view.filter.to_url(endpoints::LEDGER_VIEW);
    let report_url = view.filter.to_url(endpoints::REPORT_VIEW);

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-screen-xl space-y-6"
            {
                (clock_view(view.local_now, view.timezone))

                section class="w-full rounded-lg bg-white p-6 shadow dark:bg-gray-800"
                {
                    h2 class="mb-4 text-xl font-semibold" { "New Transaction" }
                    (transaction_form())
                }

                (filter_form_view(view.filter, view.filter_options))

                section
                    id=(LEDGER_CONTENT_ID)
                    class="w-full space-y-4"
                    hx-get=(current_url)
                    hx-trigger={ (LEDGER_CHANGED_EVENT) " from:body" }
                    hx-select={ "#" (LEDGER_CONTENT_ID) }
                    hx-swap="outerHTML"
                {
                    (summary_view(view.summary, Some(view.current_balance)))

                    div class="flex justify-end"
                    {
                        a href=(report_url) class=(LINK_STYLE) target="_blank" { "Print report" }
                        span class="mx-2" { "|" }
                        a href=(endpoints::EXPORT_TRANSACTIONS) class=(LINK_STYLE) { "Export CSV" }
                    }

                    (ledger_table_view(view.transactions, true))
                }
            }
        }
    };

    base(
        "Ledger",
        &[HeadElement::ScriptSource(PreEscaped(CLOCK_SCRIPT.to_owned()))],
        &content,
    )
}

const CLOCK_SCRIPT: &str = r#"
document.addEventListener("DOMContentLoaded", () => {
    const clock = document.getElementById("clock");
    if (!clock) {
        return;
    }

    const formatter = new Intl.DateTimeFormat(undefined, {
        timeZone: clock.dataset.timezone,
        dateStyle: "full",
        timeStyle: "medium",
    });

    setInterval(() => {
        clock.textContent = formatter.format(new Date());
    }, 1000);
});
"#;

fn clock_view(local_now: OffsetDateTime, timezone: &str) -> Markup {
    html! {
        p class="text-sm text-gray-600 dark:text-gray-400"
        {
            "Current time (" (timezone) "): "
            time id="clock" data-timezone=(timezone) datetime=(local_now.date())
            {
                (local_now.date()) " " (format_time(local_now.time()))
            }
        }
    }
}

fn filter_form_view(filter: &LedgerFilter, options: &FilterOptions) -> Markup {
    html! {
        form
            method="get"
            action=(endpoints::LEDGER_VIEW)
            class="print-hidden grid w-full grid-cols-1 gap-4 md:grid-cols-4 md:items-end"
        {
            div
            {
                label for="month" class=(FORM_LABEL_STYLE) { "Month" }

                select name="month" id="month" class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" { "All months" }

                    @for month in &options.months {
                        @let value = u8::from(*month);
                        option value=(value) selected[filter.month == Some(value)] { (month) }
                    }
                }
            }

            div
            {
                label for="year" class=(FORM_LABEL_STYLE) { "Year" }

                select name="year" id="year" class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" { "All years" }

                    @for year in &options.years {
                        option value=(year) selected[filter.year == Some(*year)] { (year) }
                    }
                }
            }

            div
            {
                label for="name-filter" class=(FORM_LABEL_STYLE) { "Name" }

                input
                    type="search"
                    name="name"
                    id="name-filter"
                    placeholder="Search by name"
                    value=[filter.name.as_deref()]
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Filter" }
        }
    }
}

/// Totals for the displayed transactions, and the balance of the whole ledger
/// if `current_balance` is given.
pub(crate) fn summary_view(summary: LedgerSummary, current_balance: Option<Amount>) -> Markup {
    let card = |label: &str, amount: Amount, class: &str| {
        html! {
            div class="rounded-lg bg-white p-4 shadow dark:bg-gray-800"
            {
                dt class="text-sm text-gray-600 dark:text-gray-400" { (label) }
                dd class={ "text-2xl font-semibold " (class) } { (amount) }
            }
        }
    };

    html! {
        dl class="grid w-full grid-cols-2 gap-4 md:grid-cols-4" data-ledger-summary="true"
        {
            (card("Total received", summary.total_received, "text-green-700 dark:text-green-300"))
            (card("Total paid", summary.total_paid, "text-red-700 dark:text-red-300"))
            (card("Net", summary.net, balance_class(summary.net)))

            @if let Some(balance) = current_balance {
                (card("Current balance", balance, balance_class(balance)))
            }
        }
    }
}

/// The table of transactions in the order given.
///
/// The delete buttons are only rendered if `show_actions` is true.
pub(crate) fn ledger_table_view(transactions: &[Transaction], show_actions: bool) -> Markup {
    let column_count = if show_actions { 8 } else { 7 };

    html! {
        div class="relative w-full overflow-x-auto rounded-lg shadow"
        {
            table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Time" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Comment" }
                        th scope="col" class="px-6 py-4 text-right" { "Received" }
                        th scope="col" class="px-6 py-4 text-right" { "Paid" }
                        th scope="col" class="px-6 py-4 text-right" { "Balance" }

                        @if show_actions {
                            th scope="col" class="print-hidden px-6 py-4" { span class="sr-only" { "Actions" } }
                        }
                    }
                }

                tbody
                {
                    @for transaction in transactions {
                        (transaction_row_view(transaction, show_actions))
                    }

                    @if transactions.is_empty() {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td colspan=(column_count) class="px-6 py-4 text-center"
                            {
                                "No transactions found."
                            }
                        }
                    }
                }
            }
        }
    }
}

fn transaction_row_view(transaction: &Transaction, show_actions: bool) -> Markup {
    let comment = transaction.comment.as_deref().unwrap_or_default();
    let (comment, tooltip) = format_comment(comment);
    let delete_url = format_endpoint(endpoints::TRANSACTION, transaction.id);
    let confirm_message = format!(
        "Are you sure you want to delete the transaction '{}'? \
        Every later balance will be recalculated. This cannot be undone.",
        transaction.name
    );

    html! {
        tr class=(TABLE_ROW_STYLE) data-transaction-id=(transaction.id)
        {
            td class="px-6 py-4 whitespace-nowrap"
            {
                time datetime=(transaction.date) { (format_date(transaction.date)) }
            }
            td class="px-6 py-4 whitespace-nowrap" { (format_time(transaction.time)) }
            th
                scope="row"
                class="px-6 py-4 font-medium text-gray-900 dark:text-white"
            {
                (transaction.name)
            }
            td class=(TABLE_CELL_STYLE) title=[tooltip] { (comment) }
            td class="px-6 py-4 text-right" { (transaction.amount_received) }
            td class="px-6 py-4 text-right" { (transaction.amount_paid) }
            td class={ "px-6 py-4 text-right font-medium " (balance_class(transaction.remaining_balance)) }
            {
                (transaction.remaining_balance)
            }

            @if show_actions {
                td class="print-hidden px-6 py-4"
                {
                    button
                        type="button"
                        hx-delete=(delete_url)
                        hx-confirm=(confirm_message)
                        hx-swap="none"
                        hx-target-error="#alert-container"
                        class=(BUTTON_DELETE_STYLE)
                    {
                        "Delete"
                    }
                }
            }
        }
    }
}

fn format_comment(comment: &str) -> (String, Option<&str>) {
    let comment_length = comment.graphemes(true).count();

    if comment_length <= MAX_COMMENT_GRAPHEMES {
        (comment.to_owned(), None)
    } else {
        let truncated: String = comment
            .graphemes(true)
            .take(MAX_COMMENT_GRAPHEMES - 3)
            .collect();
        let truncated = truncated + "...";
        (truncated, Some(comment))
    }
}

fn format_date(date: Date) -> String {
    format!("{} {} {}", date.day(), month_abbrev(date.month()), date.year())
}

pub(crate) fn format_time(time: Time) -> String {
    time.format(TIME_FORMAT)
        .unwrap_or_else(|_| time.to_string())
}

fn month_abbrev(month: Month) -> &'static str {
    match month {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    }
}
