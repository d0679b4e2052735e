use anyhow::Result;
use log::LevelFilter;
use mdunpack::{cli::parse_args, run_mdunpack};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let Some(config) = parse_args()? else {
        return Ok(());
    };

    let level = match config.verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    run_mdunpack(config).await
}
