use clap::Parser;
use tracing_subscriber::EnvFilter;

use vinlink::cli::Cli;
use vinlink::config::Config;
use vinlink::services::lookup::VinLookup;
use vinlink::services::output::print_result;

fn main() -> anyhow::Result<()> {
    // Diagnostics go to stderr so stdout stays a clean result channel.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    let lookup = VinLookup::from_config(&config)?;

    let result = lookup.get_vin_info(&cli.vin);
    print_result(cli.json, &result)
}
