use crate::schema::TableSchema;

/// Builds the one instruction template the agent sends per turn. The reply
/// shape spelled out here is the same contract `decision::parse_decision`
/// enforces; change them together.
pub fn build_decision_prompt(schema: &TableSchema, user_text: &str) -> String {
    format!(
        r#"You are a helpful SQL assistant.

Database Info:
- Table: {table}
- Columns: {columns}
- Structure: {structure}

User Request: "{request}"

Reply in EXACTLY this JSON format:
{{"action": "SELECT|INSERT|UPDATE|DELETE|HELP", "sql": "SQL statement or null", "explanation": "brief reasoning", "needs_data": false}}

Rules:
- Use ORDER BY {order_column} for every SELECT.
- Use LIKE '%term%' for partial text searches.
- For INSERT, set needs_data to true when the request does not include the values.
- Use HELP when the request is not about the data; put your answer in explanation.
- Reply with the JSON object only."#,
        table = schema.table(),
        columns = schema.column_names().join(", "),
        structure = schema.structure(),
        request = user_text,
        order_column = schema.order_column(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::test_support::employees;

    #[test]
    fn embeds_schema_and_request() {
        let prompt = build_decision_prompt(&employees(), "who works in sales?");

        assert!(prompt.contains("- Table: employees"));
        assert!(prompt.contains("- Columns: id, name, department, salary"));
        assert!(prompt.contains("- Structure: id(integer), name(character varying)"));
        assert!(prompt.contains("User Request: \"who works in sales?\""));
    }

    #[test]
    fn spells_out_the_reply_contract() {
        let prompt = build_decision_prompt(&employees(), "list everyone");

        assert!(prompt.contains(r#""action": "SELECT|INSERT|UPDATE|DELETE|HELP""#));
        assert!(prompt.contains(r#""sql""#));
        assert!(prompt.contains(r#""explanation""#));
        assert!(prompt.contains(r#""needs_data""#));
    }

    #[test]
    fn states_the_usage_rules() {
        let prompt = build_decision_prompt(&employees(), "find smiths");

        assert!(prompt.contains("ORDER BY id"));
        assert!(prompt.contains("LIKE '%term%'"));
        assert!(prompt.contains("set needs_data to true"));
    }

    #[test]
    fn is_deterministic() {
        let schema = employees();
        assert_eq!(
            build_decision_prompt(&schema, "list everyone"),
            build_decision_prompt(&schema, "list everyone")
        );
    }
}
