use std::collections::VecDeque;

use crate::constants::EVENT_BUFFER_CAPACITY;
use crate::error::{CoreError, Result};
use crate::events::ServerEvent;

/// Events that arrive before the view exists are queued here and replayed,
/// in order, exactly once when the view is ready.
#[derive(Debug)]
pub enum PendingEvents {
    Buffering(VecDeque<ServerEvent>),
    Live,
}

impl Default for PendingEvents {
    fn default() -> Self {
        PendingEvents::Buffering(VecDeque::new())
    }
}

impl PendingEvents {
    pub fn is_live(&self) -> bool {
        matches!(self, PendingEvents::Live)
    }

    /// Queue an event while buffering. Hands it back when already live so the
    /// caller applies it directly.
    pub fn push(&mut self, event: ServerEvent) -> Result<Option<ServerEvent>> {
        match self {
            PendingEvents::Live => Ok(Some(event)),
            PendingEvents::Buffering(queue) => {
                if queue.len() >= EVENT_BUFFER_CAPACITY {
                    return Err(CoreError::EventBufferOverflow(EVENT_BUFFER_CAPACITY));
                }
                queue.push_back(event);
                Ok(None)
            }
        }
    }

    /// The single `Buffering -> Live` transition. Returns the queued events
    /// in arrival order; empty on every later call.
    pub fn go_live(&mut self) -> Vec<ServerEvent> {
        match std::mem::replace(self, PendingEvents::Live) {
            PendingEvents::Buffering(queue) => queue.into(),
            PendingEvents::Live => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            PendingEvents::Buffering(queue) => queue.len(),
            PendingEvents::Live => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
