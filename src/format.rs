use crate::database::ExecutionResult;
use crate::decision::Action;

const NO_RECORDS: &str = "📋 No records found";
const NO_ROWS_AFFECTED: &str = "⚠️ No rows affected";

/// Renders one execution outcome for the conversation. Pure and
/// deterministic: the same result and action always produce the same string.
pub fn format_result(result: &ExecutionResult, action: Action) -> String {
    match result {
        ExecutionResult::Select { rows } if rows.is_empty() => NO_RECORDS.to_string(),
        ExecutionResult::Select { rows } => {
            let mut output = format!("📋 Found {} record(s):\n{}\n", rows.len(), "-".repeat(50));
            for (i, row) in rows.iter().enumerate() {
                let line = row
                    .iter()
                    .map(|(column, value)| format!("{}: {}", column, value))
                    .collect::<Vec<_>>()
                    .join(" | ");
                output.push_str(&format!("{}. {}\n", i + 1, line));
            }
            output
        }
        ExecutionResult::Modify { rows_affected: 0 } => NO_ROWS_AFFECTED.to_string(),
        ExecutionResult::Modify { rows_affected } => {
            format!("✅ {} record(s) {}.", rows_affected, action.past_tense())
        }
        ExecutionResult::Error { message } => format!("❌ Database error: {}", message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(c, v)| (c.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn empty_select_is_the_fixed_no_records_line() {
        let result = ExecutionResult::Select { rows: vec![] };
        assert_eq!(format_result(&result, Action::Select), NO_RECORDS);
    }

    #[test]
    fn rows_are_enumerated_and_pipe_delimited() {
        let result = ExecutionResult::Select {
            rows: vec![
                row(&[("id", "1"), ("name", "Ada"), ("salary", "90000")]),
                row(&[("id", "2"), ("name", "Linus"), ("salary", "NULL")]),
            ],
        };
        let text = format_result(&result, Action::Select);

        assert!(text.starts_with("📋 Found 2 record(s):\n"));
        assert!(text.contains(&"-".repeat(50)));
        assert!(text.contains("1. id: 1 | name: Ada | salary: 90000\n"));
        assert!(text.contains("2. id: 2 | name: Linus | salary: NULL\n"));
    }

    #[test]
    fn write_counts_use_the_action_verb() {
        let result = ExecutionResult::Modify { rows_affected: 3 };
        assert_eq!(
            format_result(&result, Action::Update),
            "✅ 3 record(s) updated."
        );
        assert_eq!(
            format_result(&result, Action::Delete),
            "✅ 3 record(s) deleted."
        );
    }

    #[test]
    fn zero_affected_rows_is_a_warning_not_an_error() {
        let result = ExecutionResult::Modify { rows_affected: 0 };
        let text = format_result(&result, Action::Update);
        assert_eq!(text, NO_ROWS_AFFECTED);
        assert!(!text.contains('❌'));
    }

    #[test]
    fn executor_errors_carry_the_database_prefix() {
        let result = ExecutionResult::Error {
            message: "relation \"employes\" does not exist".to_string(),
        };
        assert_eq!(
            format_result(&result, Action::Select),
            "❌ Database error: relation \"employes\" does not exist"
        );
    }

    #[test]
    fn is_deterministic() {
        let result = ExecutionResult::Select {
            rows: vec![row(&[("id", "1")])],
        };
        assert_eq!(
            format_result(&result, Action::Select),
            format_result(&result, Action::Select)
        );
    }
}
