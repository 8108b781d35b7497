use sioprobe::adapters::SocketIoTransport;
use sioprobe::app::App;
use sioprobe::cli::Args;
use sioprobe::logging::{default_log_path, init_file_subscriber};
use sioprobe::session::SessionEvent;
use sioprobe::terminal::{setup_panic_hook, TerminalManager};
use sioprobe::traits::Transport;
use sioprobe::ui;

use clap::Parser;
use color_eyre::Result;
use crossterm::event::{Event, EventStream};
use futures::StreamExt;
use ratatui::Terminal;
use tokio::sync::mpsc;

fn main() -> Result<()> {
    let args = Args::parse();

    color_eyre::install()?;

    let log_path = args.log_file.clone().unwrap_or_else(default_log_path);
    init_file_subscriber(&log_path, &args.log_level)?;
    tracing::info!("sioprobe {} starting", env!("CARGO_PKG_VERSION"));

    // Restore the terminal before the panic message is printed
    setup_panic_hook();

    let runtime = tokio::runtime::Runtime::new()?;
    let config = args.client_config();

    let result = runtime.block_on(async {
        let mut app = App::new(SocketIoTransport::new(), &config);
        if config.auto_connect {
            app.connect();
        }

        let mut manager = TerminalManager::new()?;
        let result = run_app(manager.terminal(), &mut app).await;
        manager.restore()?;

        // Close the live connection before the runtime goes away
        app.disconnect();
        result
    });

    tracing::info!("sioprobe exiting");
    result
}

async fn run_app<B, T>(terminal: &mut Terminal<B>, app: &mut App<T>) -> Result<()>
where
    B: ratatui::backend::Backend,
    B::Error: Send + Sync + 'static,
    T: Transport,
{
    let mut event_stream = EventStream::new();

    // Take the session receiver from the app (we need ownership for select!)
    let mut session_rx: Option<mpsc::UnboundedReceiver<SessionEvent>> = app.message_rx.take();

    loop {
        if app.needs_redraw {
            terminal.draw(|f| ui::render(f, &*app))?;
            app.needs_redraw = false;
        }

        tokio::select! {
            event_result = event_stream.next() => {
                match event_result {
                    Some(Ok(Event::Key(key))) => app.handle_key(key),
                    Some(Ok(Event::Paste(text))) => app.handle_paste(&text),
                    Some(Ok(Event::Resize(_, _))) => app.mark_dirty(),
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::warn!("Terminal event error: {}", e);
                    }
                    // Input closed
                    None => app.quit(),
                }
            }

            event = async {
                match &mut session_rx {
                    Some(rx) => rx.recv().await,
                    None => std::future::pending().await,
                }
            } => {
                if let Some(event) = event {
                    app.handle_session_event(event);
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
