//! # Easel
//!
//! Headless renderer host.

use clap::Parser;
use easel_cli::CliArgs;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize structured tracing with optional JSON format.
///
/// Set `RUST_LOG` to control log levels (default: info,easel_renderer=debug).
/// Set `EASEL_LOG_FORMAT=json` for JSON output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,easel_renderer=debug"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    if std::env::var("EASEL_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = CliArgs::parse();
    tracing::info!(version = easel_core::VERSION, "starting easel");

    let summary = easel_cli::run(&args).await?;
    tracing::info!(
        frames = summary.frames,
        rendered = summary.rendered,
        elements = summary.elements,
        output_bytes = ?summary.output_bytes,
        "done"
    );
    Ok(())
}
