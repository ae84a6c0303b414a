mod app;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use price_estimator::{
    config::AppConfig,
    util::{persistence::load_settings, version::{version_label, APP_NAME}},
};

fn main() -> anyhow::Result<()> {
    let cli = app::Cli::parse();

    let config = AppConfig::from_env(load_settings()).with_overrides(
        cli.dataset.clone(),
        cli.catalog.clone(),
        cli.verbose,
    );

    // Logs go to stderr so reports and JSON on stdout stay clean.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| config.log_filter().into()),
        )
        .with_writer(std::io::stderr)
        .init();

    debug!(version = %version_label(), ?config, "{APP_NAME} starting");

    app::run(cli, config)
}
