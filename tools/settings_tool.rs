/// Settings Tool — inspect, edit and test the endpoint settings.
///
/// Usage: settings_tool [--file <settings.ron>] <show|set|check>

use clap::{Parser, Subcommand};
use script_engine::core::connectivity::check_connection;
use script_engine::core::settings_store::SettingsStore;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "settings_tool", about = "Manage chat-completion endpoint settings")]
struct Args {
    /// Settings file.
    #[arg(short, long, default_value = "settings.ron")]
    file: PathBuf,

    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the stored settings (token masked).
    Show,
    /// Update fields and save the whole record.
    Set {
        #[arg(long)]
        api_url: Option<String>,
        #[arg(long)]
        api_token: Option<String>,
        #[arg(long)]
        system_prompt: Option<String>,
    },
    /// Check that the configured endpoint is reachable.
    Check,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let default = if args.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let store = SettingsStore::new(&args.file);
    let mut settings = store.load().unwrap_or_else(|e| {
        eprintln!("Error reading settings '{}': {}", args.file.display(), e);
        process::exit(1);
    });

    match args.command {
        Command::Show => {
            println!("File:          {}", store.path().display());
            println!("API URL:       {}", settings.api_url);
            println!("API token:     {}", settings.masked_token());
            println!("System prompt: {}", settings.system_prompt);
        }
        Command::Set {
            api_url,
            api_token,
            system_prompt,
        } => {
            if let Some(url) = api_url {
                settings.api_url = url;
            }
            if let Some(token) = api_token {
                settings.api_token = token;
            }
            if let Some(prompt) = system_prompt {
                settings.system_prompt = prompt;
            }
            store.save(&settings).unwrap_or_else(|e| {
                eprintln!("Error saving settings: {}", e);
                process::exit(1);
            });
            println!("Settings saved to '{}'", store.path().display());
        }
        Command::Check => match check_connection(&settings).await {
            Ok(status) => {
                println!("Connection OK: endpoint reachable (HTTP {}).", status.status);
            }
            Err(e) => {
                eprintln!("Connection failed: {}", e);
                eprintln!("Check the URL, the token and the network connection.");
                process::exit(1);
            }
        },
    }
}
