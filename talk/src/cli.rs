//! Command-line interface for the `talk` binary.
//!
//! Resolves configuration from flags with environment-variable fallback,
//! renders the message, and hands it to the client. All printing and exit
//! handling lives here; the core modules stay silent.

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use serde_json::{Map, Value};

use crate::client::Client;
use crate::render;

/// Send messages to Nextcloud Talk chats.
#[derive(Parser, Debug)]
#[command(name = "talk", version)]
#[command(about = "Send messages to Nextcloud Talk chats")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send a message to a Nextcloud Talk chat.
    Send(SendArgs),
    /// Print the version number.
    Version,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Nextcloud server URL.
    #[arg(long, env = "TALK_SERVER_URL")]
    pub server_url: String,

    /// Nextcloud Talk chat ID.
    #[arg(long, env = "TALK_CHAT_ID")]
    pub chat_id: String,

    /// Nextcloud username.
    #[arg(long, env = "TALK_USERNAME")]
    pub username: String,

    /// Nextcloud app password.
    #[arg(long, env = "TALK_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Message text or minijinja template.
    #[arg(long)]
    pub message: String,

    /// JSON object used as message data.
    #[arg(long)]
    pub message_data: Option<String>,

    /// Request timeout in seconds.
    #[arg(long, env = "TALK_TIMEOUT", default_value = "30")]
    pub timeout: u64,

    /// Disable TLS certificate verification.
    #[arg(long)]
    pub insecure: bool,
}

/// Runs the parsed command to completion.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Send(args) => send(args).await,
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

async fn send(args: SendArgs) -> anyhow::Result<()> {
    let data: Map<String, Value> = match args.message_data.as_deref() {
        None | Some("") => Map::new(),
        Some(raw) => serde_json::from_str(raw).context("invalid message data")?,
    };

    let message = render::render(&args.message, &data)?;

    let client = Client::builder(&args.server_url, &args.username, &args.password)
        .timeout(std::time::Duration::from_secs(args.timeout))
        .insecure(args.insecure)
        .build()?;

    client.send_message(&args.chat_id, &message).await?;

    println!("message sent");
    Ok(())
}
