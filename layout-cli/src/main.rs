//! # Saorsa Layout CLI
//!
//! `layout` binary entry point.

use clap::Parser;
use layout_cli::{run, CliArgs, CliConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    let config = CliConfig::from(args);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "layout_cli=info,layout_renderer=info,layout_core=warn".into());
    let registry = tracing_subscriber::registry().with(filter);
    if config.log_json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    tracing::debug!("Running {:?}", config.command);
    let stdout = std::io::stdout();
    run(&config, &mut stdout.lock())
}
