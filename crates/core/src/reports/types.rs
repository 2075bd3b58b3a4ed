//! Report output types shared by every report.
//!
//! A report renders as a list of column descriptors plus rows keyed by the
//! columns' field ids, optionally accompanied by a chart and a summary strip.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One output row, keyed by column field id.
pub type Row = Map<String, Value>;

/// How the UI should render a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    /// Link to another ERP document.
    Link,
    /// Monetary amount.
    Currency,
    /// Quantity.
    Float,
    /// Free text.
    Data,
    /// Calendar date.
    Date,
}

/// Column descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Header label.
    pub label: String,
    /// Key of the column's values in each row.
    pub field_id: String,
    /// Render type.
    pub field_type: FieldType,
    /// Target document type of a `Link` column.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_target: Option<String>,
    /// Column width in pixels.
    pub width: u32,
}

impl ColumnSpec {
    /// Creates a plain column.
    #[must_use]
    pub fn new(label: impl Into<String>, field_id: impl Into<String>, field_type: FieldType, width: u32) -> Self {
        Self {
            label: label.into(),
            field_id: field_id.into(),
            field_type,
            link_target: None,
            width,
        }
    }

    /// Creates a `Link` column pointing at `target` documents.
    #[must_use]
    pub fn link(label: impl Into<String>, field_id: impl Into<String>, target: impl Into<String>, width: u32) -> Self {
        Self {
            link_target: Some(target.into()),
            ..Self::new(label, field_id, FieldType::Link, width)
        }
    }
}

/// Chart rendering style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    /// Vertical bars.
    Bar,
}

/// One named series of chart values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartDataset {
    /// Series name.
    pub name: String,
    /// One value per label.
    pub values: Vec<Decimal>,
}

/// Labels and series of a chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartData {
    /// X-axis labels.
    pub labels: Vec<String>,
    /// Series plotted against the labels.
    pub datasets: Vec<ChartDataset>,
}

/// Chart accompanying a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSpec {
    /// Chart data.
    pub data: ChartData,
    /// Chart type.
    #[serde(rename = "type")]
    pub chart_type: ChartType,
}

impl ChartSpec {
    /// Single-series bar chart keeping at most `limit` points.
    #[must_use]
    pub fn bar<I>(name: impl Into<String>, points: I, limit: usize) -> Self
    where
        I: IntoIterator<Item = (String, Decimal)>,
    {
        let (labels, values) = points.into_iter().take(limit).unzip();
        Self {
            data: ChartData {
                labels,
                datasets: vec![ChartDataset {
                    name: name.into(),
                    values,
                }],
            },
            chart_type: ChartType::Bar,
        }
    }
}

/// Headline figure shown above the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryItem {
    /// Caption.
    pub label: String,
    /// Value.
    pub value: Decimal,
    /// Render type of the value.
    pub field_type: FieldType,
}

impl SummaryItem {
    /// Creates a currency summary item.
    #[must_use]
    pub fn currency(label: impl Into<String>, value: Decimal) -> Self {
        Self {
            label: label.into(),
            value,
            field_type: FieldType::Currency,
        }
    }
}

/// Complete output of one report execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportOutput {
    /// Column descriptors in display order.
    pub columns: Vec<ColumnSpec>,
    /// Data rows.
    pub rows: Vec<Row>,
    /// Optional chart.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart: Option<ChartSpec>,
    /// Optional summary strip.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<Vec<SummaryItem>>,
}

impl ReportOutput {
    /// Output with no columns and no rows.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Output with columns and rows only.
    #[must_use]
    pub fn new(columns: Vec<ColumnSpec>, rows: Vec<Row>) -> Self {
        Self {
            columns,
            rows,
            chart: None,
            summary: None,
        }
    }
}

/// Builder for one output row.
///
/// Amounts are written as decimal strings so no precision is lost on the
/// way to the UI.
#[derive(Debug, Default)]
pub struct RowBuilder {
    row: Row,
}

impl RowBuilder {
    /// Starts an empty row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a text field.
    #[must_use]
    pub fn text(mut self, field: &str, value: impl Into<String>) -> Self {
        self.row.insert(field.to_string(), Value::String(value.into()));
        self
    }

    /// Sets a text field, writing `null` when absent.
    #[must_use]
    pub fn opt_text(mut self, field: &str, value: Option<&str>) -> Self {
        let value = value.map_or(Value::Null, |v| Value::String(v.to_string()));
        self.row.insert(field.to_string(), value);
        self
    }

    /// Sets a decimal field.
    #[must_use]
    pub fn amount(mut self, field: &str, value: Decimal) -> Self {
        self.row.insert(field.to_string(), Value::String(value.to_string()));
        self
    }

    /// Sets a decimal field, writing `null` when absent.
    #[must_use]
    pub fn opt_amount(mut self, field: &str, value: Option<Decimal>) -> Self {
        let value = value.map_or(Value::Null, |v| Value::String(v.to_string()));
        self.row.insert(field.to_string(), value);
        self
    }

    /// Sets a date field (ISO 8601), writing `null` when absent.
    #[must_use]
    pub fn date(mut self, field: &str, value: Option<NaiveDate>) -> Self {
        let value = value.map_or(Value::Null, |d| Value::String(d.to_string()));
        self.row.insert(field.to_string(), value);
        self
    }

    /// Sets a boolean field.
    #[must_use]
    pub fn flag(mut self, field: &str, value: bool) -> Self {
        self.row.insert(field.to_string(), Value::Bool(value));
        self
    }

    /// Sets an integer field.
    #[must_use]
    pub fn int(mut self, field: &str, value: usize) -> Self {
        self.row.insert(field.to_string(), Value::from(value));
        self
    }

    /// Finishes the row.
    #[must_use]
    pub fn build(self) -> Row {
        self.row
    }
}
