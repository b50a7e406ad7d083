use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::Parser;
use mcp::HostConfig;
use runtime::{AnthropicBackend, Backend, McpToolHost, Relay, ToolHost};
use tracing_subscriber::EnvFilter;

const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

#[derive(Parser)]
#[command(name = "clerk")]
#[command(about = "Chat with the merchant store tools", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the tool host executable to launch
    host: PathBuf,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    // Logs go to stderr; stdout belongs to the conversation.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let api_key = std::env::var("ANTHROPIC_API_KEY").map_err(|_| Error::MissingApiKey)?;
    let model = std::env::var("CLERK_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

    let backend = AnthropicBackend::builder(api_key, &model).build();
    let host = McpToolHost::connect(HostConfig::for_command(
        cli.host.to_string_lossy().into_owned(),
    ))
    .await?;
    let relay = Relay::new(backend, host);

    let tool_names = relay
        .tools()
        .iter()
        .map(|t| t.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    println!("clerk v{}", env!("CARGO_PKG_VERSION"));
    println!("Model: {model}");
    println!("Connected to tool host with tools: {tool_names}");
    println!("Type a query or 'quit':\n");

    // Run the loop to completion or first error, then release the
    // transport either way. kill_on_drop backstops panics.
    let outcome = chat_loop(&relay).await;
    relay.shutdown().await;
    outcome
}

async fn chat_loop<B: Backend, H: ToolHost>(relay: &Relay<B, H>) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("Query: ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            // EOF
            break;
        }

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("quit") {
            break;
        }

        // A failing query ends the session; there is no per-query recovery.
        let answer = relay.process_query(input).await?;
        println!("\nResponse:\n{answer}\n");
    }

    Ok(())
}

/// Relay binary errors.
#[derive(Debug, thiserror::Error)]
enum Error {
    /// Credentials are read from the environment (or a .env file).
    #[error("ANTHROPIC_API_KEY not set")]
    MissingApiKey,

    /// An error occurred in the runtime layer.
    #[error(transparent)]
    Runtime(#[from] runtime::Error),

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

type Result<T> = std::result::Result<T, Error>;
