/// Offline walkthrough: rewrite a short script with the simulated provider
/// and print every assembled combination.
///
/// Usage: cargo run --example simulate

use script_engine::{GenerationRequest, ScriptEngine, SimulatedProvider, VariantCount};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let engine = ScriptEngine::builder()
        .provider(SimulatedProvider::new().seed(7))
        .build()?;
    let request = GenerationRequest::new(
        "Hi there.\nWe have an offer.",
        "warmer",
        VariantCount::new(2)?,
    );
    let generation = engine.generate(&request).await?;
    assert_eq!(generation.len(), 4);

    for record in generation.records() {
        println!("--- #{} ---", record.index);
        println!("{}", record.text);
    }
    println!("\n{} scripts from {} lines.", generation.len(), generation.nodes.len());
    Ok(())
}
