//! Filters for narrowing down the ledger by month, year and name.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use time::{Date, Month};

use super::Transaction;

/// The query parameters for filtering the ledger.
///
/// Every field is optional and missing fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerFilter {
    /// The month of the year, 1 to 12.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<u8>,
    /// The calendar year.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    /// Text that must appear in the transaction name, ignoring case.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl LedgerFilter {
    /// Whether the filter lets every transaction through.
    pub fn is_empty(&self) -> bool {
        self.month.is_none() && self.year.is_none() && self.name_query().is_none()
    }

    fn name_query(&self) -> Option<String> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_lowercase)
    }

    /// Whether `transaction` passes the filter.
    pub fn matches(&self, transaction: &Transaction) -> bool {
        self.matches_date(transaction.date)
            && self
                .name_query()
                .is_none_or(|query| transaction.name.to_lowercase().contains(&query))
    }

    fn matches_date(&self, date: Date) -> bool {
        self.month.is_none_or(|month| u8::from(date.month()) == month)
            && self.year.is_none_or(|year| date.year() == year)
    }

    /// Keep the transactions that pass the filter, preserving their order.
    pub fn apply(&self, transactions: Vec<Transaction>) -> Vec<Transaction> {
        if self.is_empty() {
            return transactions;
        }

        transactions
            .into_iter()
            .filter(|transaction| self.matches(transaction))
            .collect()
    }

    /// The selected month and year, if both are set to valid values.
    pub fn month_and_year(&self) -> Option<(Month, i32)> {
        let month = Month::try_from(self.month?).ok()?;
        let year = self.year?;

        Some((month, year))
    }

    /// The title of the printed report for the filtered ledger.
    pub fn report_title(&self) -> String {
        match self.month_and_year() {
            Some((month, year)) => format!("Ledger Report - {month} {year}"),
            None => "Complete Ledger Report".to_owned(),
        }
    }

    /// Encode the filter as a URL query string, without the leading '?'.
    ///
    /// Returns an empty string for an empty filter.
    pub fn to_query_string(&self) -> String {
        serde_urlencoded::to_string(self)
            .inspect_err(|error| tracing::error!("Could not encode ledger filter {self:?}: {error}"))
            .unwrap_or_default()
    }

    /// Append the filter to `route` as a query string.
    pub fn to_url(&self, route: &str) -> String {
        let query = self.to_query_string();

        if query.is_empty() {
            route.to_owned()
        } else {
            format!("{route}?{query}")
        }
    }
}

/// The months and years the ledger can be filtered by.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    /// The distinct months that have transactions, in ascending order.
    pub months: Vec<Month>,
    /// The distinct years that have transactions, newest first.
    pub years: Vec<i32>,
}

impl FilterOptions {
    /// Build the filter options from the dates that have transactions.
    pub fn from_dates(dates: &BTreeSet<Date>) -> Self {
        let months: BTreeSet<u8> = dates.iter().map(|date| u8::from(date.month())).collect();
        let years: BTreeSet<i32> = dates.iter().map(|date| date.year()).collect();

        Self {
            months: months
                .into_iter()
                .filter_map(|month| Month::try_from(month).ok())
                .collect(),
            years: years.into_iter().rev().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use time::{
        Month,
        macros::{date, datetime},
    };

    use crate::{amount::Amount, transaction::Transaction};

    use super::{FilterOptions, LedgerFilter};

    fn transaction(id: i64, name: &str, date: time::Date) -> Transaction {
        let created_at = datetime!(2025-01-01 00:00:00 UTC);

        Transaction {
            id,
            name: name.to_owned(),
            comment: None,
            amount_received: Amount::from_cents(100),
            amount_paid: Amount::ZERO,
            remaining_balance: Amount::from_cents(100 * id),
            date,
            time: created_at.time(),
            created_at,
        }
    }

    fn ids(transactions: &[Transaction]) -> Vec<i64> {
        transactions.iter().map(|transaction| transaction.id).collect()
    }

    fn sample() -> Vec<Transaction> {
        vec![
            transaction(4, "Bob", date!(2025 - 09 - 02)),
            transaction(3, "alice", date!(2025 - 08 - 30)),
            transaction(2, "Alice Smith", date!(2024 - 08 - 15)),
            transaction(1, "Carol", date!(2024 - 01 - 10)),
        ]
    }

    #[test]
    fn empty_filter_keeps_everything() {
        let filter = LedgerFilter::default();

        assert!(filter.is_empty());
        assert_eq!(ids(&filter.apply(sample())), vec![4, 3, 2, 1]);
    }

    #[test]
    fn filters_by_month_across_years() {
        let filter = LedgerFilter {
            month: Some(8),
            ..Default::default()
        };

        assert_eq!(ids(&filter.apply(sample())), vec![3, 2]);
    }

    #[test]
    fn filters_by_month_and_year() {
        let filter = LedgerFilter {
            month: Some(8),
            year: Some(2025),
            name: None,
        };

        assert_eq!(ids(&filter.apply(sample())), vec![3]);
    }

    #[test]
    fn filters_by_name_ignoring_case() {
        let filter = LedgerFilter {
            name: Some(" ALICE ".to_owned()),
            ..Default::default()
        };

        assert_eq!(ids(&filter.apply(sample())), vec![3, 2]);
    }

    #[test]
    fn blank_name_matches_everything() {
        let filter = LedgerFilter {
            name: Some("   ".to_owned()),
            ..Default::default()
        };

        assert!(filter.is_empty());
        assert_eq!(ids(&filter.apply(sample())), vec![4, 3, 2, 1]);
    }

    #[test]
    fn report_title_names_month_and_year() {
        let filter = LedgerFilter {
            month: Some(8),
            year: Some(2025),
            name: None,
        };

        assert_eq!(filter.report_title(), "Ledger Report - August 2025");
    }

    #[test]
    fn report_title_without_month_and_year() {
        let month_only = LedgerFilter {
            month: Some(8),
            ..Default::default()
        };

        assert_eq!(month_only.report_title(), "Complete Ledger Report");
        assert_eq!(
            LedgerFilter::default().report_title(),
            "Complete Ledger Report"
        );
    }

    #[test]
    fn url_skips_missing_fields() {
        let filter = LedgerFilter {
            month: Some(8),
            year: None,
            name: Some("Alice Smith".to_owned()),
        };

        assert_eq!(
            filter.to_url("/ledger/report"),
            "/ledger/report?month=8&name=Alice+Smith"
        );
        assert_eq!(LedgerFilter::default().to_url("/ledger"), "/ledger");
    }

    #[test]
    fn filter_options_sort_months_up_and_years_down() {
        let dates = BTreeSet::from([
            date!(2024 - 08 - 15),
            date!(2025 - 09 - 02),
            date!(2025 - 08 - 30),
            date!(2024 - 01 - 10),
        ]);

        let options = FilterOptions::from_dates(&dates);

        assert_eq!(
            options.months,
            vec![Month::January, Month::August, Month::September]
        );
        assert_eq!(options.years, vec![2025, 2024]);
    }
}
