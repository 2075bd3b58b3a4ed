//! Parameterized SQL construction for the ERP's report queries.
//!
//! Filter values are always bound as `$n` parameters; only static SQL
//! fragments written in this crate ever reach the query text.
//!
//! # Usage
//!
//! ```ignore
//! let mut query = SqlQuery::new(r#"SELECT name FROM "tabAccount" WHERE 1 = 1"#);
//! query.and("company = {}", [company.into()]);
//! query.and_in("root_type", &["Income".to_string(), "Expense".to_string()]);
//! query.push(" ORDER BY name");
//!
//! let rows = AccountRow::find_by_statement(query.build()).all(&db).await?;
//! ```

use sea_orm::{DbBackend, Statement, Value};

/// A SQL statement under construction with its bound values.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlQuery {
    sql: String,
    values: Vec<Value>,
}

impl SqlQuery {
    /// Starts from a static base query that already ends in a `WHERE`
    /// clause, so every filter can be appended with `AND`.
    #[must_use]
    pub fn new(base: &str) -> Self {
        Self {
            sql: base.to_string(),
            values: Vec::new(),
        }
    }

    /// Appends a static SQL fragment.
    pub fn push(&mut self, fragment: &str) -> &mut Self {
        self.sql.push_str(fragment);
        self
    }

    /// Appends ` AND <condition>`, replacing each `{}` in `condition` with
    /// the placeholder of the next value.
    pub fn and<I>(&mut self, condition: &str, values: I) -> &mut Self
    where
        I: IntoIterator<Item = Value>,
    {
        let mut values = values.into_iter();
        let mut parts = condition.split("{}");

        self.sql.push_str(" AND ");
        if let Some(first) = parts.next() {
            self.sql.push_str(first);
        }
        for part in parts {
            let placeholder = values.next().map(|value| self.bind(value));
            if let Some(placeholder) = placeholder {
                self.sql.push_str(&placeholder);
            }
            self.sql.push_str(part);
        }
        self
    }

    /// Appends ` AND <column> IN ($a, $b, ...)`; does nothing for an empty
    /// list.
    pub fn and_in(&mut self, column: &str, values: &[String]) -> &mut Self {
        if values.is_empty() {
            return self;
        }

        let placeholders: Vec<String> = values
            .iter()
            .map(|value| self.bind(Value::from(value.clone())))
            .collect();
        self.sql.push_str(" AND ");
        self.sql.push_str(column);
        self.sql.push_str(" IN (");
        self.sql.push_str(&placeholders.join(", "));
        self.sql.push(')');
        self
    }

    /// Query text.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Bound values in placeholder order.
    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Finishes the statement for `PostgreSQL`.
    #[must_use]
    pub fn build(self) -> Statement {
        Statement::from_sql_and_values(DbBackend::Postgres, self.sql, self.values)
    }

    fn bind(&mut self, value: Value) -> String {
        self.values.push(value);
        format!("${}", self.values.len())
    }
}

/// Number of distinct `$n` placeholders in a query text.
#[cfg(test)]
pub(crate) fn placeholder_count(sql: &str) -> usize {
    let mut seen = std::collections::BTreeSet::new();
    let bytes = sql.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'$' {
            let start = i + 1;
            let mut end = start;
            while end < bytes.len() && bytes[end].is_ascii_digit() {
                end += 1;
            }
            if end > start {
                seen.insert(&sql[start..end]);
            }
            i = end.max(start);
        } else {
            i += 1;
        }
    }
    seen.len()
}
