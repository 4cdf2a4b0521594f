use clap::Parser;
use gmail_export::app;
use gmail_export::cli::{handle_token_clear, normalize_args, Cli};
use gmail_export::config::Config;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

// One thread is plenty: every request and write happens strictly in order
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse_from(normalize_args(std::env::args_os()));
    init_logging();

    if cli.clear_token {
        handle_token_clear(&cli.token_cache)?;
        return Ok(());
    }

    let config = Config::from(cli);
    let exported = app::run(&config).await?;
    info!(count = exported.len(), "export finished");
    Ok(())
}
