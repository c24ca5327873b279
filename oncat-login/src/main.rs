use anyhow::Result;
use clap::Parser;
use oncat_auth::Settings;

use oncat_login::cli::Cli;
use oncat_login::login::LoginOptions;
use oncat_login::terminal::TerminalPrompt;
use oncat_login::{logging, App};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    if cli.version {
        println!("{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let log_path = logging::init_logging()?;
    tracing::info!(log_path = %log_path.display(), key = %cli.key, "Starting oncat-login");

    let settings = match &cli.config {
        Some(path) => Settings::from_path(path)?,
        None => Settings::new()?,
    };
    settings.validate().map_err(anyhow::Error::msg)?;

    let mut app = App::new(&cli.key, &settings, LoginOptions::default()).await?;
    app.run(&mut TerminalPrompt::new()).await;

    Ok(())
}
