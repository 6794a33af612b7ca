use std::sync::Arc;

use anyhow::Result;

mod app;
mod config;
mod error;
mod gemini;
mod handler;
mod logging;
mod session;
mod transcript;
mod tui;
mod ui;
mod worker;

use app::App;
use config::Config;
use error::StartupError;
use gemini::GeminiClient;
use session::SessionHolder;
use tui::EventHandler;

#[tokio::main]
async fn main() {
    let (config, client) = match startup() {
        Ok(ready) => ready,
        Err(e) => {
            eprintln!("{}: {}", e.title(), e);
            std::process::exit(e.exit_code());
        }
    };

    if let Err(e) = logging::init(config.log_file.as_deref()) {
        eprintln!("warning: {:#}", e);
    }
    tracing::info!(model = %config.model, endpoint = client.endpoint(), "starting chat client");

    if let Err(e) = run(config, client).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn startup() -> Result<(Config, GeminiClient), StartupError> {
    let config = Config::load()?;
    let client = GeminiClient::new(&config)?;
    Ok((config, client))
}

async fn run(config: Config, client: GeminiClient) -> Result<()> {
    let mut events = EventHandler::new();
    let sessions = SessionHolder::new(Arc::new(client));
    let mut app = App::new(sessions, events.sender(), config.model);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let result = event_loop(&mut app, &mut terminal, &mut events).await;

    tui::restore()?;
    tracing::info!("chat client exiting");
    result
}

async fn event_loop(app: &mut App, terminal: &mut tui::Tui, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event)?,
            None => break,
        }
    }
    Ok(())
}
