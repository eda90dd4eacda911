use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;

use tracing::{debug, error, info, warn};

use crate::client::{QueuePosition, ServerClient};
use crate::error::{CoreError, Result};
use crate::events::{DataChange, ServerEvent};
use crate::session::Session;

/// A blocking source of normalized events, in server delivery order.
pub trait EventSource {
    /// Wait for the next batch. An empty batch is a timeout with nothing new.
    fn next_batch(&mut self) -> Result<Vec<ServerEvent>>;
}

/// Drives the async HTTP client from the listener thread by owning its own
/// single-threaded tokio runtime.
pub struct HttpEventSource {
    client: Arc<ServerClient>,
    position: QueuePosition,
    rt: tokio::runtime::Runtime,
}

impl HttpEventSource {
    pub fn new(client: Arc<ServerClient>, position: QueuePosition) -> Result<Self> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| CoreError::ServerConnectionFailure(format!("event runtime: {e}")))?;
        Ok(Self {
            client,
            position,
            rt,
        })
    }
}

impl EventSource for HttpEventSource {
    fn next_batch(&mut self) -> Result<Vec<ServerEvent>> {
        let client = self.client.clone();
        let position = &mut self.position;
        self.rt.block_on(async move { client.get_events(position).await })
    }
}

/// Owns the background listener thread. Events are applied to the session in
/// delivery order and each result is reported to the UI over a channel.
pub struct CoreRuntime {
    data_rx: Option<Receiver<DataChange>>,
    stop: Arc<AtomicBool>,
    listener_handle: Option<JoinHandle<()>>,
}

impl CoreRuntime {
    pub fn start(session: Session, source: Box<dyn EventSource + Send>) -> Self {
        let (data_tx, data_rx) = mpsc::channel::<DataChange>();
        let stop = Arc::new(AtomicBool::new(false));
        let listener_stop = stop.clone();

        let listener_handle = std::thread::Builder::new()
            .name("zterm-listener".to_string())
            .spawn(move || listen(session, source, data_tx, listener_stop));

        let listener_handle = match listener_handle {
            Ok(handle) => Some(handle),
            Err(e) => {
                error!("Failed to spawn listener thread: {}", e);
                None
            }
        };

        Self {
            data_rx: Some(data_rx),
            stop,
            listener_handle,
        }
    }

    pub fn take_data_rx(&mut self) -> Option<Receiver<DataChange>> {
        self.data_rx.take()
    }

    pub fn is_running(&self) -> bool {
        self.listener_handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Ask the listener to stop without waiting. A listener blocked in a long
    /// poll exits once that poll returns.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    /// Stop the listener and wait for it to exit.
    pub fn shutdown(&mut self) {
        self.stop();
        if let Some(handle) = self.listener_handle.take() {
            let _ = handle.join();
        }
    }
}

fn listen(
    session: Session,
    mut source: Box<dyn EventSource + Send>,
    data_tx: Sender<DataChange>,
    stop: Arc<AtomicBool>,
) {
    info!("Listener thread started");
    while !stop.load(Ordering::SeqCst) {
        let batch = match source.next_batch() {
            Ok(batch) => batch,
            Err(e) => {
                error!("Event stream failed: {}", e);
                let _ = data_tx.send(DataChange::ConnectionLost(e.to_string()));
                return;
            }
        };

        for event in batch {
            if stop.load(Ordering::SeqCst) {
                break;
            }
            let kind = event.kind();
            let change = match session.dispatch(event) {
                Ok(Some(outcome)) => DataChange::Applied(outcome),
                Ok(None) => DataChange::Buffered,
                Err(e) if e.is_fatal() => {
                    error!("Fatal error applying {} event: {}", kind, e);
                    let _ = data_tx.send(DataChange::Fatal(e.to_string()));
                    return;
                }
                Err(e) => {
                    warn!("Rejected {} event: {}", kind, e);
                    continue;
                }
            };
            if data_tx.send(change).is_err() {
                debug!("UI receiver dropped, stopping listener");
                return;
            }
        }
    }
    info!("Listener thread stopped");
}
