//! SQL Server statement builders.
//!
//! Statements are templates: identifiers are bracket quoted and every value
//! is a positional `?` placeholder. Each statement records the column bound
//! to each placeholder, so the executor builds rows in exactly that order.

use std::fmt;

use itertools::Itertools;

use crate::config::DEFAULT_SCHEMA;
use crate::error::{Error, Result};
use crate::mssql::columns::ColumnData;

/// A `[schema].[table]` reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableName {
    schema: String,
    table: String,
}

impl TableName {
    /// A table in the default `dbo` schema
    pub fn new(table: impl Into<String>) -> Self {
        Self::with_schema(DEFAULT_SCHEMA, table)
    }

    /// A table in an explicit schema
    pub fn with_schema(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
        }
    }

    /// Schema name
    #[must_use]
    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Table name
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}].[{}]", self.schema, self.table)
    }
}

impl From<&str> for TableName {
    fn from(table: &str) -> Self {
        Self::new(table)
    }
}

/// A parameterized statement and the columns bound to its placeholders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlStatement {
    sql: String,
    parameters: Vec<String>,
}

impl SqlStatement {
    /// Wrap hand-written SQL; `parameters` names the column for each `?` in order
    pub fn new<S: Into<String>>(
        sql: impl Into<String>,
        parameters: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            sql: sql.into(),
            parameters: parameters.into_iter().map(Into::into).collect(),
        }
    }

    /// The SQL text
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Column names bound to the placeholders, in placeholder order
    #[must_use]
    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }
}

impl fmt::Display for SqlStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

fn quote(column: &str) -> String {
    format!("[{column}]")
}

/// Build an INSERT statement covering every column of `data`
///
/// # Example
/// ```
/// use dataeng_utils::mssql::{ColumnData, TableName, insert_statement};
///
/// let data = ColumnData::new().with_column("a", [1]).with_column("b", [2]);
/// let statement = insert_statement(&data, &TableName::new("t"));
/// assert_eq!(statement.sql(), "INSERT INTO [dbo].[t] \n([a], [b]) \nVALUES (?, ?)");
/// ```
#[must_use]
pub fn insert_statement(data: &ColumnData, table: &TableName) -> SqlStatement {
    let columns = data.column_names().map(str::to_string).collect_vec();
    let columns_str = columns.iter().map(|column| quote(column)).join(", ");
    let placeholders = columns.iter().map(|_| "?").join(", ");

    SqlStatement {
        sql: format!("INSERT INTO {table} \n({columns_str}) \nVALUES ({placeholders})"),
        parameters: columns,
    }
}

/// Build an UPDATE statement keyed on `id_columns`
///
/// The SET clause covers every other column in data order; the WHERE clause
/// matches the id columns in the order given. Placeholders are bound SET
/// columns first, then id columns.
///
/// # Errors
/// Returns `EmptyIdColumns` if `id_columns` is empty, or `UnknownColumn` if
/// an id column is not a column of `data`
pub fn update_statement<S: AsRef<str>>(
    data: &ColumnData,
    table: &TableName,
    id_columns: &[S],
) -> Result<SqlStatement> {
    if id_columns.is_empty() {
        return Err(Error::EmptyIdColumns);
    }
    if let Some(missing) = id_columns.iter().find(|id| !data.contains(id.as_ref())) {
        return Err(Error::UnknownColumn(missing.as_ref().to_string()));
    }

    let is_id = |column: &str| id_columns.iter().any(|id| id.as_ref() == column);
    let set_columns = data
        .column_names()
        .filter(|column| !is_id(column))
        .map(str::to_string)
        .collect_vec();

    let set_clause = set_columns
        .iter()
        .map(|column| format!("{} = ?", quote(column)))
        .join(", ");
    let where_clause = id_columns
        .iter()
        .map(|column| format!("{} = ?", quote(column.as_ref())))
        .join(" AND ");

    let parameters = set_columns
        .into_iter()
        .chain(id_columns.iter().map(|id| id.as_ref().to_string()))
        .collect();

    Ok(SqlStatement {
        sql: format!("UPDATE {table} \nSET {set_clause} \nWHERE {where_clause};"),
        parameters,
    })
}
