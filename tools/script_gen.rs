/// Script Gen — rewrites a reference script and prints every combination.
///
/// Usage: script_gen --input <file|-> --instruction <text> [--count <n>]
///                   [--settings <file.ron>] [--simulate] [--export <file.csv>]

use clap::Parser;
use script_engine::core::chat::ChatCompletionProvider;
use script_engine::core::export::write_csv_file;
use script_engine::core::pipeline::{GenerationOutcome, ScriptEngine, DEFAULT_MAX_COMBINATIONS};
use script_engine::core::provider::SimulatedProvider;
use script_engine::core::settings_store::SettingsStore;
use script_engine::schema::request::{GenerationRequest, VariantCount};
use std::io::Read;
use std::path::PathBuf;
use std::process;
use std::time::Duration;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "script_gen", about = "Rewrite a script line by line and assemble every combination")]
struct Args {
    /// Reference script, one node per line. `-` reads stdin.
    #[arg(short, long)]
    input: String,

    /// Rewrite instruction passed to the provider.
    #[arg(long, default_value = "Rewrite in a warmer, more conversational tone")]
    instruction: String,

    /// Variants per line; values below 1 are raised to 1.
    #[arg(short, long, default_value = "3", allow_hyphen_values = true)]
    count: VariantCount,

    /// Settings file holding the endpoint configuration.
    #[arg(long, default_value = "settings.ron")]
    settings: PathBuf,

    /// Use the offline simulated provider instead of the configured endpoint.
    #[arg(long)]
    simulate: bool,

    /// Model name sent to the endpoint.
    #[arg(long)]
    model: Option<String>,

    /// Nodes rewritten concurrently.
    #[arg(long, default_value_t = 4)]
    concurrency: usize,

    /// Refuse requests that would assemble more scripts than this; 0 disables.
    #[arg(long, default_value_t = DEFAULT_MAX_COMBINATIONS)]
    max_combinations: usize,

    /// Write the scripts to a CSV file (`index,text`).
    #[arg(long)]
    export: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(args).await {
        error!("{}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let reference_text = read_input(&args.input)?;

    let builder = ScriptEngine::builder()
        .concurrency(args.concurrency)
        .max_combinations((args.max_combinations > 0).then_some(args.max_combinations));

    let builder = if args.simulate {
        builder.provider(
            SimulatedProvider::new()
                .with_latency(Duration::from_millis(200), Duration::from_millis(300)),
        )
    } else {
        let settings = SettingsStore::new(&args.settings).load()?;
        let mut provider = ChatCompletionProvider::from_settings(&settings);
        if let Some(model) = args.model {
            provider = provider.model(model);
        }
        builder.provider(provider.build()?)
    };
    let engine = builder.build()?;

    let request = GenerationRequest::new(reference_text, args.instruction, args.count);
    let generation = engine.generate(&request).await?;

    match &generation.outcome {
        GenerationOutcome::NothingToGenerate => {
            println!("Reference text has no lines to rewrite.");
        }
        GenerationOutcome::Degenerate { node_indices } => {
            let lines: Vec<String> = node_indices.iter().map(|i| (i + 1).to_string()).collect();
            println!(
                "The provider returned no rewrites for line(s) {}; nothing could be assembled.",
                lines.join(", ")
            );
        }
        GenerationOutcome::Complete => {
            for record in generation.records() {
                println!("--- #{} ---", record.index);
                println!("{}", record.text);
            }
            println!("\nGenerated {} scripts.", generation.len());
        }
    }

    // An empty generation still produces a header-only file.
    if let Some(path) = args.export {
        let records = generation.records();
        write_csv_file(&path, &records)?;
        println!("Exported {} scripts to '{}'", records.len(), path.display());
    }

    Ok(())
}

fn read_input(input: &str) -> std::io::Result<String> {
    if input == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        std::fs::read_to_string(input)
    }
}
