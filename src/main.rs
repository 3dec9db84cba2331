use clap::Parser;

use dancehall::cli::Cli;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.resolve_config()?;
    log::info!("Assets directory: {}", config.assets.directory.display());
    log::info!("Press Space or M to toggle the music");

    dancehall::app::run(config)?;
    Ok(())
}
