use std::env;
use std::io::{self, Write};
use std::process;
use std::sync::Arc;

use clap::Parser;
use colored::*;
use log::info;
use tokio::io::{AsyncBufRead, BufReader};

mod coach;
mod config;
mod controller;
mod error;
mod event_bus;
mod llm;
mod logger;
mod profile;
mod prompts;
mod providers;
mod session;
mod ui;

use coach::CoachClient;
use config::Config;
use controller::PageController;
use error::CoachError;
use event_bus::EventBus;
use providers::OpenAIProvider;
use session::Session;
use ui::TerminalUi;

#[derive(Parser)]
#[command(name = "cricket_coach", about = "Your personalized path to cricket excellence")]
struct Args {
    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<String>,
    /// Plain output without colors or spinner
    #[arg(long)]
    plain: bool,
    /// Override the model identifier
    #[arg(long)]
    model: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init(args.verbose);
    dotenv::dotenv().ok();

    let mut config = Config::load(args.config.as_deref())?;
    config.merge_with_args(args.plain, args.model.as_deref());
    if !config.ui.colorful {
        colored::control::set_override(false);
    }

    let api_key = env::var(&config.provider.api_key_env).ok();
    let mut stdout = io::stdout();
    if let Err(e) = start(&config, api_key, BufReader::new(tokio::io::stdin()), &mut stdout, true).await {
        if let Some(CoachError::Config(message)) = e.downcast_ref::<CoachError>() {
            eprintln!("{} {}", "✗".red().bold(), message.red());
            process::exit(1);
        }
        return Err(e);
    }
    Ok(())
}

/// Wire the coach and session. Fails when the API key is missing.
fn build_controller(config: &Config, api_key: Option<String>) -> Result<PageController, CoachError> {
    let api_key = config.api_key(api_key)?;

    let event_bus = Arc::new(EventBus::default());
    let provider = Arc::new(OpenAIProvider::new(api_key, &config.provider));
    let coach = CoachClient::new(provider).with_event_bus(event_bus.clone());
    let session = Session::new(event_bus);
    info!(
        "Session {} started with {} ({})",
        session.id,
        coach.provider_name(),
        config.provider.model
    );

    Ok(PageController::new(session, coach))
}

/// Build everything, then hand the terminal to the UI. Nothing is rendered
/// unless the controller could be built.
async fn start<R, W>(
    config: &Config,
    api_key: Option<String>,
    input: R,
    out: &mut W,
    clear_screen: bool,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut controller = build_controller(config, api_key)?;
    let mut ui = TerminalUi::new(input, out, &config.ui, clear_screen);
    ui.run(&mut controller).await
}
