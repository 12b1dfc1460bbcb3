use clap::Parser;
use pricedash::cli::{run, Cli};
use tracing_subscriber::prelude::*;

fn main() -> std::process::ExitCode {
    // PRICEDASH_CONFIG and PRICEDASH_STORE_ROOT may come from a .env file.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(
            tracing_subscriber::filter::Targets::new()
                .with_target("parquet", tracing::Level::WARN)
                .with_default(level),
        );
    tracing_subscriber::registry().with(fmt_layer).init();

    run(cli)
}
