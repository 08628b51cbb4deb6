use sqlx::{Connection, Row};
use tracing::info;

use crate::database::Database;
use crate::error::AgentError;

/// Everything cast to text so the probe does not depend on how the driver
/// maps the information_schema domain types.
const COLUMN_QUERY: &str = "SELECT column_name::text AS column_name, \
     data_type::text AS data_type, \
     udt_name::text AS udt_name, \
     is_identity::text AS is_identity, \
     column_default::text AS column_default \
     FROM information_schema.columns \
     WHERE table_schema = 'public' AND table_name = $1 \
     ORDER BY ordinal_position";

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: String,
    /// Castable type name (`int4`, `varchar`, `numeric`, ...), used when
    /// binding text parameters into this column.
    pub udt_name: String,
    /// Identity column or one with a server-side default. The server fills
    /// these, so the insert form never asks for them.
    pub auto_generated: bool,
}

/// Live definition of the one table the agent works against. Built once at
/// startup and read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSchema {
    table: String,
    columns: Vec<ColumnDef>,
    structure: String,
}

impl TableSchema {
    pub fn from_columns(
        table: impl Into<String>,
        columns: Vec<ColumnDef>,
    ) -> Result<Self, AgentError> {
        let table = table.into();
        if columns.is_empty() {
            return Err(AgentError::Schema(format!(
                "table '{}' not found or has no columns",
                table
            )));
        }
        let structure = columns
            .iter()
            .map(|c| format!("{}({})", c.name, c.data_type))
            .collect::<Vec<_>>()
            .join(", ");
        Ok(TableSchema {
            table,
            columns,
            structure,
        })
    }

    pub async fn probe(db: &Database, table: &str) -> Result<Self, AgentError> {
        let schema_err = |e: sqlx::Error| AgentError::Schema(e.to_string());

        let mut conn = db.connect().await.map_err(schema_err)?;
        let rows = sqlx::query(COLUMN_QUERY)
            .bind(table)
            .fetch_all(&mut conn)
            .await
            .map_err(schema_err)?;
        let _ = conn.close().await;

        let mut columns = Vec::with_capacity(rows.len());
        for row in &rows {
            let name: String = row.try_get("column_name").map_err(schema_err)?;
            let data_type: String = row.try_get("data_type").map_err(schema_err)?;
            let udt_name: String = row.try_get("udt_name").map_err(schema_err)?;
            let is_identity: String = row.try_get("is_identity").map_err(schema_err)?;
            let column_default: Option<String> =
                row.try_get("column_default").map_err(schema_err)?;

            columns.push(ColumnDef {
                name,
                data_type,
                udt_name,
                auto_generated: is_identity.eq_ignore_ascii_case("yes")
                    || column_default.is_some(),
            });
        }

        let schema = Self::from_columns(table, columns)?;
        info!(
            "detected columns for '{}': {}",
            schema.table,
            schema.column_names().join(", ")
        );
        Ok(schema)
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn structure(&self) -> &str {
        &self.structure
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Columns the user must supply on insert, in schema order.
    pub fn insertable_columns(&self) -> Vec<&ColumnDef> {
        self.columns.iter().filter(|c| !c.auto_generated).collect()
    }

    /// Column used for the deterministic ORDER BY rule: the first
    /// auto-generated column (usually the serial primary key), else the
    /// first column.
    pub fn order_column(&self) -> &str {
        self.columns
            .iter()
            .find(|c| c.auto_generated)
            .unwrap_or(&self.columns[0])
            .name
            .as_str()
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{column, employees};
    use super::*;

    #[test]
    fn zero_columns_is_a_schema_error() {
        let err = TableSchema::from_columns("missing", Vec::new()).unwrap_err();
        assert!(matches!(err, AgentError::Schema(_)));
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn structure_lists_columns_with_types() {
        let schema = employees();
        assert_eq!(
            schema.structure(),
            "id(integer), name(character varying), department(character varying), salary(numeric)"
        );
    }

    #[test]
    fn insertable_columns_skip_auto_generated_ones() {
        let schema = TableSchema::from_columns(
            "employees",
            vec![
                column("id", "integer", "int4", true),
                column("name", "character varying", "varchar", false),
                column("hire_date", "timestamp without time zone", "timestamp", true),
                column("salary", "numeric", "numeric", false),
            ],
        )
        .unwrap();

        let fields: Vec<&str> = schema
            .insertable_columns()
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(fields, vec!["name", "salary"]);
    }

    #[test]
    fn order_column_prefers_the_generated_key() {
        assert_eq!(employees().order_column(), "id");

        let keyless = TableSchema::from_columns(
            "notes",
            vec![
                column("body", "text", "text", false),
                column("author", "text", "text", false),
            ],
        )
        .unwrap();
        assert_eq!(keyless.order_column(), "body");
    }
}
