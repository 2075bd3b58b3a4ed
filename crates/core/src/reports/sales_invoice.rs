//! Outstanding sales invoices with credit days left and customer credit
//! limits.

use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::error::ReportError;
use super::filters::SalesInvoiceFilters;
use super::sources::SalesInvoiceSource;
use super::types::{ColumnSpec, FieldType, ReportOutput, Row, RowBuilder};

/// Shown when a customer has no usable credit limit for the category.
pub const CREDIT_LIMIT_NOT_SET: &str = "Not Set";

/// A sales invoice joined with its customer's credit limit row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutstandingInvoice {
    /// Customer billed.
    pub customer: String,
    /// Invoice category.
    pub category: Option<String>,
    /// Invoice id.
    pub name: String,
    /// Payment due date.
    pub due_date: Option<NaiveDate>,
    /// Amount still unpaid.
    pub outstanding_amount: Decimal,
    /// Category of the matched credit limit row.
    pub credit_category: Option<String>,
    /// Credit limit amount of the matched row.
    pub credit_limit_amount: Option<Decimal>,
    /// Credit days of the matched row.
    pub credit_days: Option<i64>,
}

/// Days until (or past) the due date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreditDaysLeft {
    /// The invoice carries no due date.
    NoDueDate,
    /// Due in the given number of days (zero when due today).
    Remaining(i64),
    /// Past due by the given number of days.
    Overdue(i64),
}

impl CreditDaysLeft {
    /// Compares `due_date` with `as_of`.
    #[must_use]
    pub fn compute(due_date: Option<NaiveDate>, as_of: NaiveDate) -> Self {
        match due_date {
            None => Self::NoDueDate,
            Some(due) => {
                let days = (due - as_of).num_days();
                if days < 0 { Self::Overdue(-days) } else { Self::Remaining(days) }
            }
        }
    }

    /// Display label.
    #[must_use]
    pub fn label(self) -> String {
        match self {
            Self::NoDueDate => "No Due Date".to_string(),
            Self::Remaining(days) => format!("{days} days left"),
            Self::Overdue(days) => format!("Overdue +{days} days"),
        }
    }

    /// Whether the invoice is past due.
    #[must_use]
    pub const fn is_overdue(self) -> bool {
        matches!(self, Self::Overdue(_))
    }
}

impl OutstandingInvoice {
    /// `"<amount> / <days> days"` when the credit limit row matches the
    /// invoice category and both values are set and non-zero.
    #[must_use]
    pub fn credit_limit_label(&self) -> String {
        if self.credit_category != self.category {
            return CREDIT_LIMIT_NOT_SET.to_string();
        }

        match (self.credit_limit_amount, self.credit_days) {
            (Some(amount), Some(days)) if !amount.is_zero() && days != 0 => {
                format!("{} / {days} days", amount.normalize())
            }
            _ => CREDIT_LIMIT_NOT_SET.to_string(),
        }
    }
}

/// Outstanding sales invoice report.
pub struct SalesInvoiceReport;

impl SalesInvoiceReport {
    /// Runs the report with `as_of` defaulting to the local date.
    pub async fn run<S>(filters: &SalesInvoiceFilters, source: &S) -> Result<ReportOutput, ReportError>
    where
        S: SalesInvoiceSource + ?Sized,
    {
        Self::run_as_of(filters, source, Local::now().date_naive()).await
    }

    /// Runs the report with an explicit fallback reference date.
    pub async fn run_as_of<S>(
        filters: &SalesInvoiceFilters,
        source: &S,
        today: NaiveDate,
    ) -> Result<ReportOutput, ReportError>
    where
        S: SalesInvoiceSource + ?Sized,
    {
        let query = filters.validate(today)?;
        let invoices = source.fetch_outstanding(&query).await?;

        info!(
            customer = query.customer.as_deref().unwrap_or("*"),
            as_of = %query.as_of,
            invoices = invoices.len(),
            "Outstanding sales invoice report generated"
        );

        let rows = invoices.iter().map(|invoice| to_row(invoice, query.as_of)).collect();
        Ok(ReportOutput::new(Self::columns(), rows))
    }

    /// Column descriptors.
    #[must_use]
    pub fn columns() -> Vec<ColumnSpec> {
        vec![
            ColumnSpec::link("Customer", "customer", "Customer", 150),
            ColumnSpec::link("Category", "category", "Category", 150),
            ColumnSpec::new("Sales Invoice", "name", FieldType::Data, 150),
            ColumnSpec::new("Credit Days Left", "credit_days_left", FieldType::Data, 150),
            ColumnSpec::new("Pending Amount", "outstanding_amount", FieldType::Currency, 150),
            ColumnSpec::new(
                "Limit (Credit Limit / Credit Days)",
                "credit_limit",
                FieldType::Data,
                200,
            ),
        ]
    }
}

fn to_row(invoice: &OutstandingInvoice, as_of: NaiveDate) -> Row {
    let days_left = CreditDaysLeft::compute(invoice.due_date, as_of);
    RowBuilder::new()
        .text("customer", invoice.customer.as_str())
        .opt_text("category", invoice.category.as_deref())
        .text("name", invoice.name.as_str())
        .text("credit_days_left", days_left.label())
        .flag("is_overdue", days_left.is_overdue())
        .amount("outstanding_amount", invoice.outstanding_amount)
        .text("credit_limit", invoice.credit_limit_label())
        .build()
}
