use clap::Parser;
use tracing::info;

use release_radar::config::{Args, Config};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::from_args(args)?;
    let _log_guard = release_radar::logging::init(&config.logging)?;

    info!("Starting release-radar {}", env!("CARGO_PKG_VERSION"));

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(release_radar::server::run(config))
}
