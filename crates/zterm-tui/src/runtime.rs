use std::sync::mpsc::{Receiver, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{Event, EventStream, KeyCode, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use tracing::{debug, info, warn};
use zterm_core::client::ServerClient;
use zterm_core::constants::{ANCHOR_NEWEST, FETCH_NUM_AFTER, FETCH_NUM_BEFORE};
use zterm_core::models::{MessageFlag, MessageId, Narrow};
use zterm_core::store::NarrowView;
use zterm_core::DataChange;

use crate::input::{handle_key, Action};
use crate::render::render;
use crate::ui::{App, Tui};

pub(crate) async fn run_app(
    terminal: &mut Tui,
    app: &mut App,
    client: Arc<ServerClient>,
    data_rx: Receiver<DataChange>,
) -> Result<()> {
    // The listener has been buffering since the snapshot; the view exists now
    navigate(app, &client, Narrow::AllMessages, None).await;
    for outcome in app.session.view_ready()? {
        app.apply_outcome(outcome);
    }

    let mut event_stream = EventStream::new();
    let mut tick_interval = tokio::time::interval(Duration::from_millis(50));
    let mut listener_gone = false;

    while app.running {
        terminal.draw(|f| render(f, app))?;

        tokio::select! {
            event = event_stream.next() => {
                let Some(Ok(Event::Key(key))) = event else {
                    continue;
                };
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                // Ctrl+C quits from any input mode
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    app.running = false;
                    continue;
                }
                if let Some(action) = handle_key(app, key) {
                    perform(app, &client, action).await;
                }
            }

            _ = tick_interval.tick() => {
                if !listener_gone {
                    listener_gone = drain_data_changes(app, &data_rx);
                }
            }
        }
    }
    Ok(())
}

/// Apply everything the listener has sent since the last tick. Returns true
/// once the listener has hung up.
fn drain_data_changes(app: &mut App, data_rx: &Receiver<DataChange>) -> bool {
    loop {
        match data_rx.try_recv() {
            Ok(change) => {
                app.handle_data_change(change);
                if !app.running {
                    return false;
                }
            }
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => {
                debug!("Listener channel closed");
                return true;
            }
        }
    }
}

async fn perform(app: &mut App, client: &Arc<ServerClient>, action: Action) {
    match action {
        Action::Narrow { narrow, contextual } => navigate(app, client, narrow, contextual).await,
        Action::Focus(id) => on_focus(app, client, id),
    }
}

/// Switch narrows, fetching from the server when nothing suitable is indexed.
async fn navigate(
    app: &mut App,
    client: &Arc<ServerClient>,
    narrow: Narrow,
    contextual: Option<MessageId>,
) {
    let view = match app.session.narrow_to(&narrow, contextual) {
        Ok(view) => view,
        Err(e) => {
            warn!("Narrow to {} refused: {}", narrow, e);
            app.set_status(e.to_string());
            return;
        }
    };
    app.clear_status();

    let view = if view.needs_fetch {
        match fetch_into_view(app, client, &narrow, contextual).await {
            Ok(view) => view,
            Err(e) => {
                warn!("Fetch under {} failed: {}", narrow, e);
                app.set_status(format!("Fetch failed: {e}"));
                view
            }
        }
    } else {
        view
    };

    info!("Narrowed to {} ({} messages)", narrow, view.ids.len());
    app.set_view(view);
    if let Some(id) = app.focused_id() {
        on_focus(app, client, id);
    }
}

async fn fetch_into_view(
    app: &App,
    client: &ServerClient,
    narrow: &Narrow,
    contextual: Option<MessageId>,
) -> zterm_core::Result<NarrowView> {
    let anchor = contextual.unwrap_or(ANCHOR_NEWEST);
    let messages = client
        .get_messages(narrow, anchor, FETCH_NUM_BEFORE, FETCH_NUM_AFTER)
        .await?;
    debug!("Fetched {} messages under {}", messages.len(), narrow);
    app.session.index_fetched(messages, narrow)?;
    app.session.refresh_view(contextual)
}

/// Remember the focus for this narrow and mark the message read on the server.
/// Counts change when the server echoes the flag update back.
fn on_focus(app: &mut App, client: &Arc<ServerClient>, id: MessageId) {
    if let Err(e) = app.session.set_focus(id) {
        warn!("Could not store focus {}: {}", id, e);
        return;
    }
    let unread = app.session.get_message(id).is_some_and(|m| !m.is_read());
    if !unread || app.connection_lost {
        return;
    }
    let client = Arc::clone(client);
    tokio::spawn(async move {
        if let Err(e) = client.update_message_flags(&[id], MessageFlag::Read, true).await {
            warn!("Marking message {} read failed: {}", id, e);
        }
    });
}
