// Layout constants and helpers shared by the render functions

use ratatui::layout::{Constraint, Layout, Rect};

/// Stream and DM list on the left
pub const SIDEBAR_WIDTH: u16 = 28;

/// Narrow title above the message list
pub const HEADER_HEIGHT: u16 = 1;

/// Status / typing / search prompt
pub const FOOTER_HEIGHT: u16 = 1;

pub struct ChatAreas {
    pub sidebar: Rect,
    pub header: Rect,
    pub messages: Rect,
    pub footer: Rect,
}

pub fn chat_areas(area: Rect) -> ChatAreas {
    let [sidebar, main] =
        Layout::horizontal([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)]).areas(area);
    let [header, messages, footer] = Layout::vertical([
        Constraint::Length(HEADER_HEIGHT),
        Constraint::Min(0),
        Constraint::Length(FOOTER_HEIGHT),
    ])
    .areas(main);
    ChatAreas {
        sidebar,
        header,
        messages,
        footer,
    }
}

/// First row to draw so that `selected` stays visible in a list of
/// `len` rows shown `height` at a time.
pub fn scroll_offset(selected: usize, len: usize, height: usize) -> usize {
    if height == 0 || len <= height {
        return 0;
    }
    let max_offset = len - height;
    selected.saturating_sub(height / 2).min(max_offset)
}
