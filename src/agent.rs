use std::io::{BufRead, Write};

use tracing::{info, warn};

use crate::collector;
use crate::config::Config;
use crate::database::{Database, ExecutionResult};
use crate::decision::{parse_decision, Action, ActionDecision};
use crate::error::AgentError;
use crate::format::format_result;
use crate::model::{ModelClient, OllamaClient};
use crate::prompt::build_decision_prompt;
use crate::schema::TableSchema;

const PARSE_FAILURE_MESSAGE: &str = "❌ Failed to parse model response";
const NO_SQL_MESSAGE: &str = "❌ No SQL generated";

/// Where a parsed decision goes. HELP answers directly, `needs_data` hands
/// off to the insert collector, SQL goes to the executor, and a decision with
/// none of those gets the fixed no-SQL answer.
#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    Answer(String),
    CollectInsert,
    Execute { sql: String, action: Action },
    NoSql,
}

pub fn route(decision: ActionDecision) -> Route {
    if decision.action == Action::Help {
        return Route::Answer(decision.explanation);
    }
    if decision.needs_data {
        return Route::CollectInsert;
    }
    match decision.sql {
        Some(sql) => Route::Execute {
            sql,
            action: decision.action,
        },
        None => Route::NoSql,
    }
}

/// One conversation agent: the immutable schema, the model seam, and the
/// database it executes against.
pub struct Agent {
    schema: TableSchema,
    db: Database,
    model: Box<dyn ModelClient>,
}

impl Agent {
    pub async fn initialize(config: &Config) -> Result<Self, AgentError> {
        let db = Database::new(config.database_url.clone());
        let schema = TableSchema::probe(&db, &config.table).await?;
        Ok(Agent {
            schema,
            db,
            model: Box::new(OllamaClient::new(config)),
        })
    }

    #[cfg(test)]
    pub fn with_parts(schema: TableSchema, db: Database, model: Box<dyn ModelClient>) -> Self {
        Agent { schema, db, model }
    }

    /// One full turn: prompt, model call, parse, dispatch, format. Every
    /// failure past startup comes back as the turn's answer; nothing here
    /// takes the loop down. `input`/`output` serve the insert collector's
    /// interactive prompts.
    pub async fn run_turn<R: BufRead, W: Write>(
        &self,
        user_text: &str,
        input: &mut R,
        output: &mut W,
    ) -> String {
        let prompt = build_decision_prompt(&self.schema, user_text);
        let raw = self.model.generate(&prompt).await;

        let decision = match parse_decision(&raw) {
            Ok(decision) => decision,
            Err(e) => {
                warn!("turn discarded: {}", e);
                return PARSE_FAILURE_MESSAGE.to_string();
            }
        };

        match route(decision) {
            Route::Answer(explanation) => format!("💡 {}", explanation),
            Route::CollectInsert => collector::collect(&self.schema, &self.db, input, output).await,
            Route::Execute { sql, action } => {
                info!("executing generated SQL: {}", sql);
                let result = self.db.execute(&sql, &[]).await;
                format_result(&result, action)
            }
            Route::NoSql => NO_SQL_MESSAGE.to_string(),
        }
    }

    /// Startup gate. The database check must pass for the loop to start; the
    /// model check only warns, since an unreachable model already degrades to
    /// empty replies turn by turn.
    pub async fn self_test<W: Write>(&self, output: &mut W) -> bool {
        let _ = writeln!(output, "🔍 Testing connections...");

        let count_sql = format!("SELECT COUNT(*) AS count FROM {}", self.schema.table());
        match self.db.execute(&count_sql, &[]).await {
            ExecutionResult::Select { rows } => {
                let count = rows
                    .first()
                    .and_then(|row| row.first())
                    .map(|(_, value)| value.as_str())
                    .unwrap_or("?");
                let _ = writeln!(output, "✅ Database OK: {} rows in {}", count, self.schema.table());
            }
            ExecutionResult::Error { message } => {
                let _ = writeln!(output, "❌ Database: {}", message);
                return false;
            }
            ExecutionResult::Modify { .. } => {
                let _ = writeln!(output, "❌ Database: count query misclassified");
                return false;
            }
        }

        let reply = self.model.generate("Reply with only OK").await;
        if reply.to_uppercase().contains("OK") {
            let _ = writeln!(output, "✅ Model OK: {}", self.model.name());
        } else {
            warn!("model self-test got an unexpected reply: '{}'", reply);
            let _ = writeln!(output, "⚠️ Model responded, but not as expected");
        }

        true
    }
}
