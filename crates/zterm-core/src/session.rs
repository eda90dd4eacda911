use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::config::CoreConfig;
use crate::error::{CoreError, Result};
use crate::events::{ApplyOutcome, ServerEvent};
use crate::models::{InitialSnapshot, Message, MessageId, Narrow, StreamId, UnreadCounts, UserId};
use crate::store::{ChatStore, NarrowView, PendingEvents};

struct SessionInner {
    config: CoreConfig,
    store: Option<ChatStore>, // None until the snapshot is applied
    pending: PendingEvents,
}

impl SessionInner {
    fn store(&self) -> Result<&ChatStore> {
        self.store.as_ref().ok_or(CoreError::NotReady)
    }

    fn store_mut(&mut self) -> Result<&mut ChatStore> {
        self.store.as_mut().ok_or(CoreError::NotReady)
    }
}

/// Shared handle to the session state. The listener thread and the UI each
/// hold a clone; every method takes the lock once and returns owned data.
#[derive(Clone)]
pub struct Session {
    inner: Arc<Mutex<SessionInner>>,
}

impl Session {
    pub fn new(config: CoreConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SessionInner {
                config,
                store: None,
                pending: PendingEvents::default(),
            })),
        }
    }

    /// Build the index from the connect-time snapshot. Other callers never
    /// see a half-built store.
    pub fn apply_snapshot(&self, snapshot: &InitialSnapshot) {
        let mut inner = self.inner.lock();
        let store = ChatStore::from_snapshot(snapshot, &inner.config);
        inner.store = Some(store);
        info!("Session ready (queue {})", snapshot.queue_id);
    }

    pub fn is_ready(&self) -> bool {
        self.inner.lock().store.is_some()
    }

    /// Apply an event, or queue it if the view does not exist yet (`Ok(None)`).
    pub fn dispatch(&self, event: ServerEvent) -> Result<Option<ApplyOutcome>> {
        let mut inner = self.inner.lock();
        let Some(event) = inner.pending.push(event)? else {
            debug!("Buffered event ({} pending)", inner.pending.len());
            return Ok(None);
        };
        inner.store_mut()?.apply(event).map(Some)
    }

    /// Mark the view as constructed and replay everything buffered so far, in
    /// order. Only the first call replays anything. Events rejected as invalid
    /// are skipped; a fatal error stops the replay.
    pub fn view_ready(&self) -> Result<Vec<ApplyOutcome>> {
        let mut inner = self.inner.lock();
        let queued = inner.pending.go_live();
        if queued.is_empty() {
            return Ok(Vec::new());
        }
        debug!("Replaying {} buffered events", queued.len());

        let store = inner.store_mut()?;
        let mut outcomes = Vec::with_capacity(queued.len());
        for event in queued {
            let kind = event.kind();
            match store.apply(event) {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) if !e.is_fatal() => warn!("Skipping buffered {} event: {}", kind, e),
                Err(e) => return Err(e),
            }
        }
        Ok(outcomes)
    }

    pub fn narrow_to(&self, narrow: &Narrow, contextual: Option<MessageId>) -> Result<NarrowView> {
        self.inner.lock().store_mut()?.narrow_to(narrow, contextual)
    }

    pub fn refresh_view(&self, contextual: Option<MessageId>) -> Result<NarrowView> {
        Ok(self.inner.lock().store_mut()?.refresh_view(contextual))
    }

    pub fn index_fetched(&self, messages: Vec<Message>, narrow: &Narrow) -> Result<()> {
        self.inner.lock().store_mut()?.index_fetched(messages, narrow)
    }

    pub fn set_focus(&self, id: MessageId) -> Result<()> {
        self.inner.lock().store_mut()?.set_focus(id);
        Ok(())
    }

    pub fn render_ids(&self, ids: Vec<MessageId>) -> Result<()> {
        self.inner.lock().store_mut()?.render_ids(ids);
        Ok(())
    }

    pub fn get_message(&self, id: MessageId) -> Option<Message> {
        let inner = self.inner.lock();
        inner.store().ok()?.message(id).cloned()
    }

    pub fn unread_counts(&self) -> Result<UnreadCounts> {
        Ok(self.inner.lock().store()?.unread_counts().clone())
    }

    pub fn current_narrow(&self) -> Result<Narrow> {
        Ok(self.inner.lock().store()?.current_narrow().clone())
    }

    pub fn topics_in_stream(&self, stream_id: StreamId) -> Result<Vec<String>> {
        Ok(self.inner.lock().store()?.topics_in_stream(stream_id).to_vec())
    }

    pub fn next_unread_topic_from_message_id(&self, current: Option<MessageId>) -> Result<Option<(StreamId, String)>> {
        Ok(self.inner.lock().store()?.next_unread_topic_from_message_id(current))
    }

    pub fn next_unread_pm(&self) -> Result<Option<UserId>> {
        Ok(self.inner.lock().store_mut()?.next_unread_pm())
    }

    /// Run a read-only query against the store under the lock. The closure
    /// must return owned data.
    pub fn read<R>(&self, f: impl FnOnce(&ChatStore) -> R) -> Result<R> {
        let inner = self.inner.lock();
        Ok(f(inner.store()?))
    }
}
