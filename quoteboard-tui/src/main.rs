//! Terminal dashboard for quoteboard that quotes shipments and reports carrier metrics.

mod app;
mod config;
mod input;
mod ui;

use std::{
    fs::OpenOptions,
    io,
    path::Path,
    sync::{Arc, Mutex},
    time::Duration as StdDuration,
};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event as CEvent},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use quoteboard_core::{service::QuoteService, store::InMemoryQuoteStore};
use quoteboard_provider_freterapido as freterapido;
use ratatui::{Terminal, backend::CrosstermBackend};
use reqwest::Client;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::app::{App, Screen};
use crate::config::AppConfig;
use crate::input::Action;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env().context("failed to load configuration")?;
    init_tracing(&config.log_file)?;

    // HTTP + service setup
    let client = Client::builder()
        .user_agent("quoteboard/0.1")
        .timeout(config.request_timeout)
        .build()?;

    let rates = freterapido::rate_port(client, config.provider.clone());
    let store = Arc::new(InMemoryQuoteStore::new());
    let service = Arc::new(QuoteService::new(rates, store).with_strategy(config.aggregation));

    info!(
        provider = %service.provider().id,
        metrics_last_quotes = config.metrics_last_quotes,
        "quoteboard started"
    );

    // App state
    let app = App::new(service, config.metrics_last_quotes);

    // Terminal init
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run event loop
    let res = run(&mut terminal, app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res
}

// stdout belongs to the terminal UI, so logs go to a file.
fn init_tracing(log_file: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("failed to open log file {}", log_file.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}

async fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, mut app: App) -> Result<()> {
    loop {
        // Draw current UI
        terminal.draw(|frame| ui::draw(frame, &app))?;

        // Poll for input (non-blocking, small timeout to keep CPU low)
        if event::poll(StdDuration::from_millis(100))?
            && let CEvent::Key(key) = event::read()?
        {
            let action = input::handle_key_event(key, &mut app);

            match action {
                Action::Quit => break,
                Action::None => {}
                Action::RequestQuote => {
                    let request = match app.form.to_request() {
                        Ok(request) => request,
                        Err(message) => {
                            app.error_message = Some(message);
                            continue;
                        }
                    };

                    app.is_loading = true;
                    app.error_message = None;
                    terminal.draw(|frame| ui::draw(frame, &app))?;

                    let res = app.service.quote(request).await;

                    app.is_loading = false;
                    match res {
                        Ok(record) => {
                            app.last_quote = Some(record);
                            app.form.volumes.clear();
                            app.screen = Screen::Offers;
                        }
                        Err(err) => {
                            error!(error = %err, "quote request failed");
                            app.error_message = Some(format!("Quote failed: {err}"));
                        }
                    }
                }
                Action::RefreshMetrics => {
                    app.is_loading = true;
                    app.error_message = None;
                    terminal.draw(|frame| ui::draw(frame, &app))?;

                    let window = app.metrics_window;
                    let res = match app.service.metrics(window).await {
                        Ok(report) => app
                            .service
                            .recent_quotes(window)
                            .await
                            .map(|recent| (report, recent)),
                        Err(err) => Err(err),
                    };

                    app.is_loading = false;
                    match res {
                        Ok((report, recent)) => {
                            app.report = Some(report);
                            app.recent_quotes = recent;
                        }
                        Err(err) => {
                            error!(error = %err, "metrics refresh failed");
                            app.report = None;
                            app.error_message = Some(format!("Failed to load metrics: {err}"));
                        }
                    }
                }
            }
        }
    }

    Ok(())
}
