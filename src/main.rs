use std::io;
use std::time::Duration;

use crossterm::{
    event::{DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;

use chatbot_tui::config::{AppConfig, PAGE_URL_ENV};
use chatbot_tui::core::client::ChatClient;
use chatbot_tui::core::sizing::CellMetrics;
use chatbot_tui::tui::app::AppState;
use chatbot_tui::tui::services::Services;
use chatbot_tui::tui::views::chat::ChatState;
use chatbot_tui::tui::widgets::composer::Composer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    let _log_guard = chatbot_tui::core::logging::init_tui();
    log::info!("chatbot-tui v{} starting", chatbot_tui::VERSION);

    let config = AppConfig::load()
        .with_page_url_override(std::env::args().nth(1), std::env::var(PAGE_URL_ENV).ok());

    // Endpoint errors are reported before the terminal is taken over
    let client = match ChatClient::from_config(&config.server) {
        Ok(client) => client,
        Err(e) => {
            log::error!("Cannot start chat client: {e}");
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    if config.tui.mouse_enabled {
        execute!(stdout, EnableMouseCapture)?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let result = run_app(&mut terminal, &config, client).await;

    // Restore terminal
    disable_raw_mode()?;
    if config.tui.mouse_enabled {
        execute!(terminal.backend_mut(), DisableMouseCapture)?;
    }
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        log::error!("Application error: {e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    log::info!("chatbot-tui exiting");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: &AppConfig,
    client: ChatClient,
) -> io::Result<()> {
    let metrics = CellMetrics::detect(config.composer.fallback_cell());
    let composer = Composer::new(
        config.composer.placeholder.clone(),
        config.composer.bounds(),
        metrics,
    );

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let services = Services::new(client, event_tx);
    let chat = ChatState::new(composer, services.bot_name().to_string());

    let mut app = AppState::new(chat, event_rx, services);
    app.run(terminal, Duration::from_millis(config.tui.tick_rate_ms.max(1)))
        .await
}
