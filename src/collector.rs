use std::io::{BufRead, Write};

use crate::database::{Database, ExecutionResult};
use crate::error::AgentError;
use crate::schema::TableSchema;

const VALIDATION_MESSAGE: &str = "❌ All fields are required";
const CANCELLED_MESSAGE: &str = "❌ Insert cancelled";

/// Interactive insert flow for a decision that arrived with `needs_data`.
/// Gathers every insertable column in schema order, then runs one
/// parameterized INSERT. Any empty value rejects the whole form; nothing is
/// written unless every field was supplied.
pub async fn collect<R: BufRead, W: Write>(
    schema: &TableSchema,
    db: &Database,
    input: &mut R,
    output: &mut W,
) -> String {
    let form = match read_form(schema, input, output) {
        Ok(form) => form,
        Err(AgentError::Cancelled) => return CANCELLED_MESSAGE.to_string(),
        Err(_) => return VALIDATION_MESSAGE.to_string(),
    };

    let (sql, values) = build_insert(schema, &form);
    match db.execute(&sql, &values).await {
        ExecutionResult::Error { message } => format!("❌ Insert failed: {}", message),
        _ => success_message(&form),
    }
}

/// Prompts `Enter <field>: ` per insertable column. Empty value is a
/// validation failure for the whole form; end of input or a read failure is
/// cancellation.
pub fn read_form<R: BufRead, W: Write>(
    schema: &TableSchema,
    input: &mut R,
    output: &mut W,
) -> Result<Vec<(String, String)>, AgentError> {
    let _ = writeln!(output, "\n📝 Adding a new record:");

    let mut form = Vec::new();
    for column in schema.insertable_columns() {
        let _ = write!(output, "Enter {}: ", column.name);
        let _ = output.flush();

        let mut line = String::new();
        match input.read_line(&mut line) {
            Ok(0) | Err(_) => return Err(AgentError::Cancelled),
            Ok(_) => {}
        }

        let value = line.trim();
        if value.is_empty() {
            return Err(AgentError::Validation);
        }
        form.push((column.name.clone(), value.to_string()));
    }
    Ok(form)
}

/// Builds `INSERT INTO t (a, b) VALUES ($1::type, $2::type)` over exactly the
/// collected fields. Values bind as text, so each placeholder casts to the
/// column's udt type; PostgreSQL will not assignment-cast text parameters to
/// numeric or date columns on its own.
pub fn build_insert(schema: &TableSchema, form: &[(String, String)]) -> (String, Vec<String>) {
    let columns: Vec<&str> = form.iter().map(|(name, _)| name.as_str()).collect();
    let placeholders: Vec<String> = schema
        .insertable_columns()
        .iter()
        .enumerate()
        .map(|(i, column)| format!("${}::{}", i + 1, column.udt_name))
        .collect();

    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        schema.table(),
        columns.join(", "),
        placeholders.join(", ")
    );
    let values = form.iter().map(|(_, value)| value.clone()).collect();
    (sql, values)
}

fn success_message(form: &[(String, String)]) -> String {
    match form.iter().find(|(name, _)| name == "name") {
        Some((_, value)) => format!("✅ {} added!", value),
        None => "✅ Record added!".to_string(),
    }
}
