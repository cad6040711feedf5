//! SQL execution port and the row types it hands back.

use async_trait::async_trait;

use super::error::QueryError;

// =============================================================================
// Statements
// =============================================================================

/// SQL text with `?` placeholders and the string values bound to them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    sql: String,
    params: Vec<String>,
}

impl Statement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Bind the next `?` placeholder.
    pub fn bind(mut self, value: impl Into<String>) -> Self {
        self.params.push(value.into());
        self
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }
}

/// Quote a configured table or column name for MySQL.
///
/// Names come from configuration rather than users, but an embedded
/// backtick still must not end the identifier early.
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

// =============================================================================
// Result rows
// =============================================================================

/// One result row with named-column text access.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    columns: Vec<(String, Option<String>)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, column: impl Into<String>, value: Option<String>) {
        self.columns.push((column.into(), value));
    }

    pub fn with_value(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(column, Some(value.into()));
        self
    }

    pub fn with_null(mut self, column: impl Into<String>) -> Self {
        self.push(column, None);
        self
    }

    /// Read a column by name. Matching ignores ASCII case, as MySQL does.
    ///
    /// Returns `Ok(None)` for SQL `NULL`.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::Execution` if the row has no such column.
    pub fn get(&self, column: &str) -> Result<Option<&str>, QueryError> {
        self.columns
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(column))
            .map(|(_, value)| value.as_deref())
            .ok_or_else(|| QueryError::execution(format!("Column '{}' not found", column)))
    }
}

/// Forward-only cursor over the rows of one statement.
///
/// Rows are yielded in the order the server returned them.
#[derive(Debug, Default)]
pub struct ResultSet {
    rows: std::vec::IntoIter<Row>,
}

impl ResultSet {
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            rows: rows.into_iter(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

impl Iterator for ResultSet {
    type Item = Row;

    fn next(&mut self) -> Option<Row> {
        self.rows.next()
    }
}

// =============================================================================
// Port
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SqlPort: Send + Sync {
    /// Run a read-only statement and return its rows.
    async fn query(&self, statement: &Statement) -> Result<ResultSet, QueryError>;
}
