//! Talk - Nextcloud Talk Message Sender
//!
//! A CLI that renders a message template and posts the result into a
//! Nextcloud Talk chat over the OCS API.
//!
//! # Usage
//!
//! ```bash
//! # Send a plain message
//! talk send --server-url https://cloud.example.com --chat-id abc123 \
//!     --username stefan --password app-password --message "deploy done"
//!
//! # Render a template against JSON data
//! talk send --message "Hello {{Name}}" --message-data '{"Name": "Stefan"}'
//!
//! # Every connection flag falls back to an environment variable:
//! # TALK_SERVER_URL, TALK_CHAT_ID, TALK_USERNAME, TALK_PASSWORD
//! ```

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use talk::cli::{self, Cli};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("talk: {err:#}");
            ExitCode::FAILURE
        }
    }
}
