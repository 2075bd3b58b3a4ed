//! Report filters and their validation.
//!
//! Validation is pure and runs before any fetch: a filter set either turns
//! into a query value the sources can execute, or fails with a
//! `ReportError` without touching the database.

use chrono::{Datelike, Days, NaiveDate};
use ledgerlens_shared::ReportSettings;
use serde::{Deserialize, Serialize};

use super::error::ReportError;

/// Restricts postings to the month or year of the start date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frequency {
    /// Same calendar month as `from_date`.
    Monthly,
    /// Same calendar year as `from_date`.
    Yearly,
}

impl Frequency {
    /// Parses `"Monthly"` / `"Yearly"`, ignoring case.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "monthly" => Some(Self::Monthly),
            "yearly" => Some(Self::Yearly),
            _ => None,
        }
    }
}

/// Raw filters of the income and expenses report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct IncomeExpenseFilters {
    /// Start of the posting period (inclusive).
    pub from_date: Option<NaiveDate>,
    /// End of the posting period (inclusive).
    pub to_date: Option<NaiveDate>,
    /// Replace `to_date` with a fixed window after `from_date`.
    pub monthwise: bool,
    /// Company whose books are reported.
    pub company: Option<String>,
    /// Optional month/year restriction.
    pub frequency: Option<Frequency>,
    /// Optional single branch to report on.
    pub branch: Option<String>,
}

impl IncomeExpenseFilters {
    /// Validates the filters into a ledger query.
    ///
    /// # Errors
    ///
    /// - `MissingFilter` for an absent `from_date`, `to_date` or `company`,
    ///   checked in that order
    /// - `InvalidDateRange` when the resolved end precedes the start
    pub fn validate(&self, settings: &ReportSettings) -> Result<LedgerQuery, ReportError> {
        let from_date = self.from_date.ok_or(ReportError::MissingFilter("from_date"))?;
        let supplied_to = self.to_date.ok_or(ReportError::MissingFilter("to_date"))?;
        let company = non_blank(self.company.as_deref()).ok_or(ReportError::MissingFilter("company"))?;

        let to_date = if self.monthwise {
            from_date
                .checked_add_days(Days::new(settings.monthwise_window_days))
                .ok_or(ReportError::InvalidDateRange {
                    start: from_date,
                    end: supplied_to,
                })?
        } else {
            supplied_to
        };

        check_range(from_date, to_date)?;

        Ok(LedgerQuery {
            company,
            from_date,
            to_date,
            frequency: self.frequency,
            branch: non_blank(self.branch.as_deref()),
        })
    }
}

/// Validated ledger selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerQuery {
    /// Company whose ledger is read.
    pub company: String,
    /// First posting date admitted.
    pub from_date: NaiveDate,
    /// Last posting date admitted.
    pub to_date: NaiveDate,
    /// Month/year restriction relative to `from_date`.
    pub frequency: Option<Frequency>,
    /// Single branch to keep, compared case-insensitively.
    pub branch: Option<String>,
}

impl LedgerQuery {
    /// Whether a posting on `posting_date` falls inside this query.
    #[must_use]
    pub fn admits(&self, posting_date: NaiveDate) -> bool {
        if posting_date < self.from_date || posting_date > self.to_date {
            return false;
        }

        match self.frequency {
            Some(Frequency::Monthly) => posting_date.month() == self.from_date.month(),
            Some(Frequency::Yearly) => posting_date.year() == self.from_date.year(),
            None => true,
        }
    }

    /// Whether a posting tagged with `branch` belongs to this query.
    #[must_use]
    pub fn admits_branch(&self, branch: Option<&str>) -> bool {
        match (&self.branch, branch) {
            (None, _) => true,
            (Some(wanted), Some(actual)) => wanted.trim().eq_ignore_ascii_case(actual.trim()),
            (Some(_), None) => false,
        }
    }
}

/// Raw filters of the item shortage report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ShortageFilters {
    /// Company owning the warehouses.
    pub company: Option<String>,
    /// Warehouses to include (all when empty).
    pub warehouse: Vec<String>,
    /// Item groups to include (all when empty).
    pub item_group: Vec<String>,
}

impl ShortageFilters {
    /// Validates the filters.
    ///
    /// # Errors
    ///
    /// `MissingFilter("company")` when no company is given.
    pub fn validate(&self) -> Result<ShortageQuery, ReportError> {
        let company = non_blank(self.company.as_deref()).ok_or(ReportError::MissingFilter("company"))?;

        Ok(ShortageQuery {
            company,
            warehouses: non_blank_list(&self.warehouse),
            item_groups: non_blank_list(&self.item_group),
        })
    }
}

/// Validated item shortage selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShortageQuery {
    /// Company owning the warehouses.
    pub company: String,
    /// Warehouse allow-list, empty for all.
    pub warehouses: Vec<String>,
    /// Item group allow-list, empty for all.
    pub item_groups: Vec<String>,
}

/// Raw filters of the purchase order analysis report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PurchaseOrderFilters {
    /// Company placing the orders.
    pub company: Option<String>,
    /// Single purchase order.
    pub name: Option<String>,
    /// Start of the transaction period.
    pub from_date: Option<NaiveDate>,
    /// End of the transaction period.
    pub to_date: Option<NaiveDate>,
    /// Order statuses to include.
    pub status: Vec<String>,
    /// Project on the order line.
    pub project: Option<String>,
    /// Accepted for filter compatibility; not applied.
    pub supplier: Option<String>,
    /// Group rows under supplier headers.
    pub group_by_supplier: bool,
    /// Group rows by item code.
    pub group_by_item_code: bool,
}

/// Row grouping of the purchase order analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PurchaseOrderGrouping {
    /// Detail rows as fetched.
    None,
    /// Supplier header, then per-item detail and total rows.
    Supplier,
    /// Per-item detail rows followed by an item total.
    ItemCode,
}

impl PurchaseOrderFilters {
    /// Whether no filter value was supplied at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        non_blank(self.company.as_deref()).is_none()
            && non_blank(self.name.as_deref()).is_none()
            && self.from_date.is_none()
            && self.to_date.is_none()
            && non_blank_list(&self.status).is_empty()
            && non_blank(self.project.as_deref()).is_none()
            && non_blank(self.supplier.as_deref()).is_none()
            && !self.group_by_supplier
            && !self.group_by_item_code
    }

    /// Validates the filters; `Ok(None)` means the filter set was empty.
    ///
    /// # Errors
    ///
    /// - `MissingFilter` naming the absent date when only one is given
    /// - `InvalidDateRange` when `to_date` precedes `from_date`
    pub fn validate(&self) -> Result<Option<PurchaseOrderQuery>, ReportError> {
        if self.is_empty() {
            return Ok(None);
        }

        let period = match (self.from_date, self.to_date) {
            (Some(from), Some(to)) => {
                check_range(from, to)?;
                Some((from, to))
            }
            (Some(_), None) => return Err(ReportError::MissingFilter("to_date")),
            (None, Some(_)) => return Err(ReportError::MissingFilter("from_date")),
            (None, None) => None,
        };

        let grouping = if self.group_by_supplier {
            PurchaseOrderGrouping::Supplier
        } else if self.group_by_item_code {
            PurchaseOrderGrouping::ItemCode
        } else {
            PurchaseOrderGrouping::None
        };

        Ok(Some(PurchaseOrderQuery {
            company: non_blank(self.company.as_deref()),
            name: non_blank(self.name.as_deref()),
            period,
            statuses: non_blank_list(&self.status),
            project: non_blank(self.project.as_deref()),
            grouping,
        }))
    }
}

/// Validated purchase order selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurchaseOrderQuery {
    /// Company placing the orders.
    pub company: Option<String>,
    /// Single purchase order.
    pub name: Option<String>,
    /// Inclusive transaction date range.
    pub period: Option<(NaiveDate, NaiveDate)>,
    /// Status allow-list, empty for all.
    pub statuses: Vec<String>,
    /// Project on the order line.
    pub project: Option<String>,
    /// Row grouping applied after the fetch.
    pub grouping: PurchaseOrderGrouping,
}

/// Raw filters of the outstanding sales invoice report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SalesInvoiceFilters {
    /// Earliest posting date.
    pub from_date: Option<NaiveDate>,
    /// Latest posting date.
    pub to_date: Option<NaiveDate>,
    /// Single customer.
    pub customer: Option<String>,
    /// Reference date for days-left computation, today when absent.
    pub as_of: Option<NaiveDate>,
}

impl SalesInvoiceFilters {
    /// Validates the filters, defaulting `as_of` to `today`.
    ///
    /// # Errors
    ///
    /// `InvalidDateRange` when both dates are given and `to_date` precedes
    /// `from_date`.
    pub fn validate(&self, today: NaiveDate) -> Result<SalesInvoiceQuery, ReportError> {
        if let (Some(from), Some(to)) = (self.from_date, self.to_date) {
            check_range(from, to)?;
        }

        Ok(SalesInvoiceQuery {
            from_date: self.from_date,
            to_date: self.to_date,
            customer: non_blank(self.customer.as_deref()),
            as_of: self.as_of.unwrap_or(today),
        })
    }
}

/// Validated sales invoice selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SalesInvoiceQuery {
    /// Earliest posting date.
    pub from_date: Option<NaiveDate>,
    /// Latest posting date.
    pub to_date: Option<NaiveDate>,
    /// Single customer.
    pub customer: Option<String>,
    /// Reference date for days-left computation.
    pub as_of: NaiveDate,
}

fn check_range(start: NaiveDate, end: NaiveDate) -> Result<(), ReportError> {
    if end < start {
        return Err(ReportError::InvalidDateRange { start, end });
    }
    Ok(())
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn non_blank_list(values: &[String]) -> Vec<String> {
    values
        .iter()
        .filter_map(|v| non_blank(Some(v)))
        .collect()
}
