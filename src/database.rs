use sqlx::postgres::PgRow;
use sqlx::{Column, Connection, PgConnection, Row};

/// Outcome of one statement. Exactly one variant per execution; driver
/// failures are carried in `Error` instead of being propagated, so a bad
/// generated statement costs one turn, not the session.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionResult {
    Select { rows: Vec<Vec<(String, String)>> },
    Modify { rows_affected: u64 },
    Error { message: String },
}

pub struct Database {
    url: String,
}

impl Database {
    pub fn new(url: impl Into<String>) -> Self {
        Database { url: url.into() }
    }

    pub(crate) async fn connect(&self) -> Result<PgConnection, sqlx::Error> {
        PgConnection::connect(&self.url).await
    }

    /// Runs a single statement on a fresh connection. Statements starting
    /// with SELECT return rows; everything else is executed as a write and
    /// reports the affected row count. `params` bind as `$1..$n`.
    pub async fn execute(&self, sql: &str, params: &[String]) -> ExecutionResult {
        let statement = sql.trim().trim_end_matches(';').trim_end();

        if statement.is_empty() {
            return ExecutionResult::Error {
                message: "empty statement".to_string(),
            };
        }
        if contains_bare_semicolon(statement) {
            return ExecutionResult::Error {
                message: "multiple statements in one request are not allowed".to_string(),
            };
        }

        match self.run_statement(statement, params).await {
            Ok(result) => result,
            Err(e) => ExecutionResult::Error {
                message: e.to_string(),
            },
        }
    }

    async fn run_statement(
        &self,
        statement: &str,
        params: &[String],
    ) -> Result<ExecutionResult, sqlx::Error> {
        let mut conn = self.connect().await?;

        let result = if is_select(statement) {
            let rows = sqlx::raw_sql(statement).fetch_all(&mut conn).await?;
            ExecutionResult::Select {
                rows: rows.iter().map(render_row).collect(),
            }
        } else if params.is_empty() {
            let done = sqlx::raw_sql(statement).execute(&mut conn).await?;
            ExecutionResult::Modify {
                rows_affected: done.rows_affected(),
            }
        } else {
            let mut query = sqlx::query(statement);
            for value in params {
                query = query.bind(value);
            }
            let done = query.execute(&mut conn).await?;
            ExecutionResult::Modify {
                rows_affected: done.rows_affected(),
            }
        };

        let _ = conn.close().await;
        Ok(result)
    }
}

pub fn is_select(sql: &str) -> bool {
    sql.trim_start().to_uppercase().starts_with("SELECT")
}

fn contains_bare_semicolon(statement: &str) -> bool {
    let mut in_single = false;
    let mut in_double = false;
    for c in statement.chars() {
        match c {
            '\'' if !in_double => in_single = !in_single,
            '"' if !in_single => in_double = !in_double,
            ';' if !in_single && !in_double => return true,
            _ => {}
        }
    }
    false
}

/// Reads come back over the unprepared path, so every value is text-encoded
/// and decodes as a string no matter the declared column type.
fn render_row(row: &PgRow) -> Vec<(String, String)> {
    row.columns()
        .iter()
        .enumerate()
        .map(|(index, column)| {
            let value: Option<String> = row.try_get_unchecked(index).unwrap_or(None);
            (
                column.name().to_string(),
                value.unwrap_or_else(|| "NULL".to_string()),
            )
        })
        .collect()
}
