use zterm_core::models::{MessageId, Narrow};
use zterm_core::store::NarrowView;
use zterm_core::{ApplyOutcome, DataChange, Redraw, Session};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// Typing a search term for the current narrow
    Search,
}

pub struct App {
    pub running: bool,
    pub session: Session,

    pub view: NarrowView,
    /// Position of the focused message in `view.ids`
    pub selected: usize,

    pub input_mode: InputMode,
    pub search_input: String,

    pub status: Option<String>,
    /// "<name> is typing..." while someone in the open conversation types
    pub typing: Option<String>,
    pub notify: bool,

    /// Set when the core reports a broken index; the loop exits and main reports it
    pub fatal: Option<String>,
    pub connection_lost: bool,
}

impl App {
    pub fn new(session: Session, notify: bool) -> Self {
        Self {
            running: true,
            session,
            view: NarrowView {
                narrow: Narrow::AllMessages,
                ids: Vec::new(),
                focus: None,
                needs_fetch: false,
            },
            selected: 0,
            input_mode: InputMode::Normal,
            search_input: String::new(),
            status: None,
            typing: None,
            notify,
            fatal: None,
            connection_lost: false,
        }
    }

    // ===== View =====

    pub fn set_view(&mut self, view: NarrowView) {
        self.selected = view
            .focus
            .and_then(|focus| view.ids.iter().position(|id| *id == focus))
            .unwrap_or_else(|| view.ids.len().saturating_sub(1));
        if view.narrow != self.view.narrow {
            self.typing = None;
        }
        self.view = view;
    }

    pub fn focused_id(&self) -> Option<MessageId> {
        self.view.ids.get(self.selected).copied()
    }

    /// Move focus by `delta` rows. Returns the newly focused id if it changed.
    pub fn move_focus(&mut self, delta: isize) -> Option<MessageId> {
        if self.view.ids.is_empty() {
            return None;
        }
        let last = self.view.ids.len() - 1;
        let next = self.selected.saturating_add_signed(delta).min(last);
        if next == self.selected {
            return None;
        }
        self.selected = next;
        self.focused_id()
    }

    /// Re-resolve the current narrow around the focused message.
    pub fn refresh_view(&mut self) {
        match self.session.refresh_view(self.focused_id()) {
            Ok(view) => self.set_view(view),
            Err(e) => self.set_status(format!("Refresh failed: {e}")),
        }
    }

    // ===== Status =====

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    // ===== Core updates =====

    pub fn handle_data_change(&mut self, change: DataChange) {
        match change {
            DataChange::Applied(outcome) => self.apply_outcome(outcome),
            DataChange::Buffered => {}
            DataChange::ConnectionLost(reason) => {
                self.connection_lost = true;
                self.set_status(format!("Connection lost: {reason}"));
            }
            DataChange::Fatal(reason) => {
                self.fatal = Some(reason);
                self.running = false;
            }
        }
    }

    pub fn apply_outcome(&mut self, outcome: ApplyOutcome) {
        let mut refresh = false;
        for redraw in outcome.redraws {
            match redraw {
                Redraw::Append(_) | Redraw::Replace(_) | Redraw::Remove(_) | Redraw::FullScreen => {
                    refresh = true;
                }
                Redraw::Typing { sender_name } => {
                    self.typing = Some(format!("{sender_name} is typing..."));
                }
                Redraw::TypingStopped => self.typing = None,
                // Badges are read fresh on every frame
                Redraw::StreamBadge(_) | Redraw::Counts => {}
            }
        }
        if refresh {
            self.refresh_view();
        }
        if let Some(notification) = outcome.notification {
            if self.notify {
                self.set_status(format!("{}: {}", notification.title, notification.body));
            }
        }
    }
}
