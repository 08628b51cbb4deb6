use thiserror::Error;

/// Failure kinds surfaced by the agent. `Config` and `Schema` abort startup;
/// the rest belong to a single turn and become user-facing messages.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("schema detection failed: {0}")]
    Schema(String),

    #[error("failed to parse model response: {0}")]
    Parse(String),

    #[error("all fields are required")]
    Validation,

    #[error("insert cancelled")]
    Cancelled,
}
