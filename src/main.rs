use std::io::{self, BufRead, Write};
use std::process;

use anyhow::Context;
use tracing::Level;

use crate::agent::Agent;
use crate::config::Config;

mod agent;
mod collector;
mod config;
mod database;
mod decision;
mod error;
mod format;
mod model;
mod prompt;
mod schema;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries the conversation.
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_writer(io::stderr)
        .init();

    println!("🤖 askdb — natural-language database agent");
    println!("{}", "=".repeat(40));

    let config = Config::from_env().context("loading configuration")?;
    let agent = Agent::initialize(&config)
        .await
        .context("initializing agent")?;

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();

    if !agent.self_test(&mut output).await {
        eprintln!("❌ Connection test failed. Check your .env and database.");
        process::exit(1);
    }

    println!("\n💬 Ask anything. Type 'quit' to exit.\n");

    loop {
        print!("🗣️ You: ");
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            println!("\n👋 Exiting.");
            break;
        }

        let user_text = line.trim();
        if user_text.is_empty() {
            continue;
        }
        if matches!(user_text.to_lowercase().as_str(), "exit" | "quit" | "q") {
            println!("👋 Goodbye!");
            break;
        }

        let answer = agent.run_turn(user_text, &mut input, &mut output).await;
        println!("\n🤖 {}\n", answer);
    }

    Ok(())
}
