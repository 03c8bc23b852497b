use std::sync::Arc;

use anyhow::{bail, Context};
use finledger_market_data::{FailoverConfig, FailoverCoordinator, LogAuditSink};
use serde_json::{json, Value};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Command line: `quote-probe [--diagnostics] SYMBOL...`
#[derive(Debug, PartialEq, Eq)]
pub struct Args {
    pub symbols: Vec<String>,
    pub diagnostics: bool,
}

impl Args {
    pub fn parse(args: impl IntoIterator<Item = String>) -> anyhow::Result<Self> {
        let mut symbols = Vec::new();
        let mut diagnostics = false;

        for arg in args {
            match arg.as_str() {
                "-d" | "--diagnostics" => diagnostics = true,
                flag if flag.starts_with('-') => bail!("unknown option '{}'", flag),
                symbol => symbols.push(symbol.to_string()),
            }
        }

        if symbols.is_empty() {
            bail!("usage: quote-probe [--diagnostics] SYMBOL...");
        }

        Ok(Self {
            symbols,
            diagnostics,
        })
    }
}

pub fn init_tracing() {
    let log_format = std::env::var("FINLEDGER_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false).with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

pub fn build_coordinator() -> anyhow::Result<FailoverCoordinator> {
    let config = FailoverConfig::from_env().with_context(|| {
        format!(
            "failed to load provider configuration (set {})",
            finledger_market_data::CONFIG_PATH_ENV
        )
    })?;
    tracing::info!(
        "Loaded {} provider(s), chain deadline {:?}",
        config.providers.len(),
        config.chain_deadline()
    );

    finledger_market_data::build_coordinator(&config, Arc::new(LogAuditSink))
        .context("failed to build provider registry")
}

/// Fetch one symbol and render the outcome as JSON.
pub async fn probe(coordinator: &FailoverCoordinator, symbol: &str, diagnostics: bool) -> Value {
    let (result, diag) = coordinator.fetch_with_diagnostics(symbol).await;

    let mut output = match result {
        Ok(snapshot) => json!({ "symbol": symbol, "snapshot": snapshot }),
        Err(error) => {
            tracing::warn!("{}: {}", symbol, error);
            json!({
                "symbol": symbol,
                "error": error.to_string(),
                "causes": error
                    .causes()
                    .iter()
                    .map(|c| json!({
                        "provider": c.provider,
                        "kind": c.error.kind().as_str(),
                        "message": c.error.to_string(),
                    }))
                    .collect::<Vec<_>>(),
            })
        }
    };

    if diagnostics {
        output["diagnostics"] = json!(diag.report());
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> anyhow::Result<Args> {
        Args::parse(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_parse_symbols_and_flag() {
        let parsed = args(&["TCS", "--diagnostics", "RELIANCE.BSE"]).unwrap();
        assert_eq!(
            parsed,
            Args {
                symbols: vec!["TCS".to_string(), "RELIANCE.BSE".to_string()],
                diagnostics: true,
            }
        );
    }

    #[test]
    fn test_parse_rejects_unknown_flag_and_empty() {
        assert!(args(&["--verbose", "TCS"]).is_err());
        assert!(args(&["-d"]).is_err());
    }
}
