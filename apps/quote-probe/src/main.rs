mod main_lib;

use main_lib::{build_coordinator, init_tracing, probe, Args};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let args = Args::parse(std::env::args().skip(1))?;
    let coordinator = build_coordinator()?;

    let mut failures = 0usize;
    for symbol in &args.symbols {
        let output = probe(&coordinator, symbol, args.diagnostics).await;
        if output.get("error").is_some() {
            failures += 1;
        }
        println!("{}", serde_json::to_string_pretty(&output)?);
    }

    tracing::info!(
        "Probed {} symbol(s), {} failed",
        args.symbols.len(),
        failures
    );
    if failures > 0 {
        std::process::exit(1);
    }
    Ok(())
}
