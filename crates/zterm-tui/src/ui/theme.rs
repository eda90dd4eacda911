// Colors and styles for the chat view. Everything visual is defined here.

use ratatui::style::{Color, Modifier, Style};

// =============================================================================
// COLOR PALETTE
// =============================================================================

/// Sidebar background
pub const BG_SIDEBAR: Color = Color::Rgb(12, 12, 12);

/// Focused message background
pub const BG_SELECTED: Color = Color::Rgb(32, 32, 32);

/// Footer / status line background
pub const BG_FOOTER: Color = Color::Rgb(23, 23, 23);

// -----------------------------------------------------------------------------
// Text Colors
// -----------------------------------------------------------------------------

pub const TEXT_PRIMARY: Color = Color::Rgb(220, 220, 220);

/// Muted streams and topics, timestamps
pub const TEXT_MUTED: Color = Color::Rgb(128, 128, 128);

pub const TEXT_DIM: Color = Color::Rgb(90, 90, 90);

// -----------------------------------------------------------------------------
// Accents
// -----------------------------------------------------------------------------

/// Stream and topic headers
pub const ACCENT_STREAM: Color = Color::Rgb(86, 156, 214);

/// Direct messages
pub const ACCENT_PRIVATE: Color = Color::Rgb(197, 134, 192);

/// Unread badges
pub const ACCENT_UNREAD: Color = Color::Rgb(220, 180, 90);

pub const ACCENT_ERROR: Color = Color::Rgb(215, 95, 95);

// =============================================================================
// STYLES
// =============================================================================

pub fn text_primary() -> Style {
    Style::default().fg(TEXT_PRIMARY)
}

pub fn text_muted() -> Style {
    Style::default().fg(TEXT_MUTED)
}

pub fn badge() -> Style {
    Style::default().fg(ACCENT_UNREAD).add_modifier(Modifier::BOLD)
}

pub fn header(private: bool) -> Style {
    let color = if private { ACCENT_PRIVATE } else { ACCENT_STREAM };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

pub fn selected() -> Style {
    Style::default().bg(BG_SELECTED)
}

pub fn error() -> Style {
    Style::default().fg(ACCENT_ERROR)
}
