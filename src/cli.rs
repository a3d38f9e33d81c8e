use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "vinlink",
    version,
    about = "VIN attribute lookup against the RepairLink catalog portal"
)]
pub struct Cli {
    #[arg(help = "Vehicle identification number, sent to the portal as-is")]
    pub vin: String,
    #[arg(long, help = "Output machine-readable JSON")]
    pub json: bool,
    #[arg(
        long,
        help = "Config file path (default: ~/.config/vinlink/config.toml)"
    )]
    pub config: Option<PathBuf>,
}
