mod config;
mod input;
mod render;
mod runtime;
mod ui;

#[cfg(test)]
mod test_support;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use zterm_core::client::{QueuePosition, ServerClient};
use zterm_core::config::CoreConfig;
use zterm_core::runtime::{CoreRuntime, HttpEventSource};
use zterm_core::tracing_setup::init_tracing;
use zterm_core::{CoreError, Session};

use crate::config::ClientConfig;
use crate::runtime::run_app;
use ui::App;

/// Terminal chat client
#[derive(Debug, Parser)]
#[command(name = "zterm", version)]
struct Args {
    /// Config file (defaults to <config dir>/zterm/config.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Show notifications for new messages in the status line
    #[arg(long)]
    notify: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = match args.config {
        Some(path) => path,
        None => ClientConfig::default_path()?,
    };
    let config = ClientConfig::load(&config_path)?.with_overrides(args.log_file, args.notify);

    let mut core_config = CoreConfig::default();
    core_config.hide_private_content = config.hide_private_content;
    if let Some(log_file) = &config.log_file {
        let log_path = core_config.resolve_path(log_file);
        init_tracing(Some(&log_path))
            .with_context(|| format!("Failed to open log file: {}", log_path.display()))?;
    }

    let client = Arc::new(ServerClient::new(config.credentials())?);

    // Nothing is usable without the snapshot; fail before touching the terminal
    let snapshot = match client.register().await {
        Ok(snapshot) => snapshot,
        Err(CoreError::ServerConnectionFailure(cause)) => connection_failure(&cause),
        Err(e) => connection_failure(&e.to_string()),
    };

    let session = Session::new(core_config);
    session.apply_snapshot(&snapshot);

    let position = QueuePosition {
        queue_id: snapshot.queue_id.clone(),
        last_event_id: snapshot.last_event_id,
    };
    // Pooled connections belong to the runtime that opened them, so the
    // listener thread gets its own client
    let listener_client = Arc::new(ServerClient::new(config.credentials())?);
    let source = HttpEventSource::new(listener_client, position)?;
    let mut core_runtime = CoreRuntime::start(session.clone(), Box::new(source));
    let data_rx = core_runtime
        .take_data_rx()
        .ok_or_else(|| anyhow::anyhow!("Core runtime already has active data receiver"))?;

    // Set up panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = crossterm::terminal::disable_raw_mode();
        let _ = crossterm::execute!(std::io::stdout(), crossterm::terminal::LeaveAlternateScreen);
        eprintln!("\n\n=== PANIC ===");
        eprintln!("{}", panic_info);
        eprintln!("=============\n");
        original_hook(panic_info);
    }));

    let mut app = App::new(session, config.notify);
    let mut terminal = ui::init_terminal()?;
    let result = run_app(&mut terminal, &mut app, client, data_rx).await;

    // The listener may be parked in a long poll; it is not joined on exit
    core_runtime.stop();
    ui::restore_terminal()?;

    if let Err(err) = result {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
    if let Some(reason) = app.fatal {
        eprintln!("Error: {reason}");
        std::process::exit(1);
    }
    Ok(())
}

fn connection_failure(cause: &str) -> ! {
    eprintln!("Error: server connection failure: {cause}");
    std::process::exit(1);
}
