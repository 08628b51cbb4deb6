use std::env;

use dotenvy::dotenv;

use crate::error::AgentError;

const DEFAULT_TABLE: &str = "employees";
const DEFAULT_OLLAMA_HOST: &str = "http://localhost";
const DEFAULT_OLLAMA_PORT: u16 = 11434;
const DEFAULT_MODEL: &str = "llama3.2:latest";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub table: String,
    pub ollama_host: String,
    pub ollama_port: u16,
    pub model: String,
}

impl Config {
    pub fn from_env() -> Result<Self, AgentError> {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| AgentError::Config("DATABASE_URL must be set".to_string()))?;

        let table = env::var("AGENT_TABLE").unwrap_or_else(|_| DEFAULT_TABLE.to_string());
        if !is_bare_identifier(&table) {
            return Err(AgentError::Config(format!(
                "AGENT_TABLE must be a bare SQL identifier, got '{}'",
                table
            )));
        }

        let mut ollama_host =
            env::var("OLLAMA_HOST").unwrap_or_else(|_| DEFAULT_OLLAMA_HOST.to_string());
        if !ollama_host.starts_with("http://") && !ollama_host.starts_with("https://") {
            ollama_host = format!("http://{}", ollama_host);
        }

        let ollama_port = match env::var("OLLAMA_PORT") {
            Ok(value) => value.parse().map_err(|_| {
                AgentError::Config(format!("OLLAMA_PORT must be a port number, got '{}'", value))
            })?,
            Err(_) => DEFAULT_OLLAMA_PORT,
        };

        let model = env::var("OLLAMA_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        Ok(Config {
            database_url,
            table,
            ollama_host,
            ollama_port,
            model,
        })
    }
}

/// The table name is spliced into SQL text, so it must be a plain identifier
/// rather than something quoted or qualified.
fn is_bare_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_identifiers() {
        assert!(is_bare_identifier("employees"));
        assert!(is_bare_identifier("_staging"));
        assert!(is_bare_identifier("orders_2024"));
    }

    #[test]
    fn rejects_anything_that_needs_quoting() {
        assert!(!is_bare_identifier(""));
        assert!(!is_bare_identifier("2fast"));
        assert!(!is_bare_identifier("public.employees"));
        assert!(!is_bare_identifier("employees; DROP TABLE employees"));
        assert!(!is_bare_identifier("emp loyees"));
    }
}
