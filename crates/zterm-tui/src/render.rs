use ratatui::{
    style::Style,
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;
use zterm_core::models::{Message, MessageKind, Narrow};
use zterm_core::store::{strip_html, ChatStore};

use crate::ui::{layout, theme, App, InputMode};

const FOOTER_HINT: &str = "j/k move  a all  P DMs  * starred  @ mentions  s/t stream/topic  n/p next unread  / search  q quit";

/// One row of the left panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SidebarEntry {
    pub label: String,
    pub unread: usize,
    pub muted: bool,
    pub private: bool,
}

/// Subscribed streams in sidebar order, then senders and groups with unread DMs.
pub(crate) fn sidebar_entries(store: &ChatStore) -> Vec<SidebarEntry> {
    let directory = store.directory();
    let counts = store.unread_counts();
    let mutes = store.mutes();

    let mut entries: Vec<SidebarEntry> = directory
        .stream_order()
        .into_iter()
        .map(|stream_id| SidebarEntry {
            label: format!("#{}", directory.stream_name(stream_id).unwrap_or("?")),
            unread: counts.visible_stream_count(stream_id, mutes),
            muted: mutes.is_muted_stream(stream_id),
            private: false,
        })
        .collect();

    for (sender_id, unread) in &counts.unread_pms {
        entries.push(SidebarEntry {
            label: directory.user_name(*sender_id).unwrap_or("Unknown").to_string(),
            unread: *unread,
            muted: false,
            private: true,
        });
    }
    for (participants, unread) in &counts.unread_huddles {
        let names: Vec<&str> = participants
            .iter()
            .filter(|id| **id != directory.my_id())
            .map(|id| directory.user_name(*id).unwrap_or("Unknown"))
            .collect();
        entries.push(SidebarEntry {
            label: names.join(", "),
            unread: *unread,
            muted: false,
            private: true,
        });
    }
    entries
}

/// Single-line summary of a message for the list.
pub(crate) fn message_row(message: &Message) -> String {
    let place = match &message.kind {
        MessageKind::Stream {
            stream_name, topic, ..
        } => format!("#{stream_name} > {topic}"),
        MessageKind::Private { .. } => "DM".to_string(),
    };
    let body = strip_html(&message.content).replace('\n', " ");
    let unread = if message.is_read() { " " } else { "*" };
    format!(
        "{unread} {} {place} | {}: {body}",
        format_time(message.timestamp),
        message.sender_full_name
    )
}

fn format_time(timestamp: i64) -> String {
    chrono::DateTime::from_timestamp(timestamp, 0)
        .map(|t| t.with_timezone(&chrono::Local).format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".to_string())
}

fn truncate(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push('…');
    out
}

pub(crate) fn render(f: &mut Frame, app: &App) {
    let areas = layout::chat_areas(f.area());

    render_sidebar(f, app, areas.sidebar);
    render_header(f, app, areas.header);
    render_messages(f, app, areas.messages);
    render_footer(f, app, areas.footer);
}

fn render_sidebar(f: &mut Frame, app: &App, area: ratatui::layout::Rect) {
    let entries = app.session.read(sidebar_entries).unwrap_or_default();
    let width = area.width.saturating_sub(1) as usize;

    let lines: Vec<Line> = entries
        .iter()
        .map(|entry| {
            let badge = if entry.unread > 0 {
                format!(" {}", entry.unread)
            } else {
                String::new()
            };
            let label_width = width.saturating_sub(badge.width());
            let label_style = if entry.muted {
                theme::text_muted()
            } else if entry.private {
                Style::default().fg(theme::ACCENT_PRIVATE)
            } else {
                theme::text_primary()
            };
            Line::from(vec![
                Span::styled(truncate(&entry.label, label_width), label_style),
                Span::styled(badge, theme::badge()),
            ])
        })
        .collect();

    let block = Block::default().style(Style::default().bg(theme::BG_SIDEBAR));
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_header(f: &mut Frame, app: &App, area: ratatui::layout::Rect) {
    let unread = app
        .session
        .read(|store| store.unread_counts().all_msg)
        .unwrap_or(0);
    let line = Line::from(vec![
        Span::styled(
            app.view.narrow.to_string(),
            theme::header(matches!(
                app.view.narrow.without_search(),
                Narrow::AllPrivate | Narrow::DirectWith { .. }
            )),
        ),
        Span::styled(format!("  ({unread} unread)"), theme::text_muted()),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn render_messages(f: &mut Frame, app: &App, area: ratatui::layout::Rect) {
    let height = area.height as usize;
    let width = area.width as usize;
    let offset = layout::scroll_offset(app.selected, app.view.ids.len(), height);
    let visible: Vec<_> = app.view.ids.iter().skip(offset).take(height).copied().collect();

    let rows: Vec<String> = app
        .session
        .read(|store| {
            visible
                .iter()
                .map(|id| store.message(*id).map(message_row).unwrap_or_default())
                .collect()
        })
        .unwrap_or_default();

    let lines: Vec<Line> = if rows.is_empty() {
        vec![Line::styled("No messages", theme::text_muted())]
    } else {
        rows.into_iter()
            .enumerate()
            .map(|(i, row)| {
                let style = if offset + i == app.selected {
                    theme::selected().fg(theme::TEXT_PRIMARY)
                } else {
                    theme::text_primary()
                };
                Line::styled(truncate(&row, width), style)
            })
            .collect()
    };
    f.render_widget(Paragraph::new(lines), area);
}

fn render_footer(f: &mut Frame, app: &App, area: ratatui::layout::Rect) {
    let line = if app.input_mode == InputMode::Search {
        Line::styled(format!("/{}", app.search_input), theme::text_primary())
    } else if let Some(typing) = &app.typing {
        Line::styled(typing.clone(), theme::text_muted())
    } else if let Some(status) = &app.status {
        let style = if app.connection_lost {
            theme::error()
        } else {
            theme::text_primary()
        };
        Line::styled(status.clone(), style)
    } else {
        Line::styled(FOOTER_HINT, Style::default().fg(theme::TEXT_DIM))
    };
    let block = Block::default().style(Style::default().bg(theme::BG_FOOTER));
    f.render_widget(Paragraph::new(line).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{session, stream_message};
    use zterm_core::ServerEvent;

    #[test]
    fn test_message_row() {
        let mut message = stream_message(10, 5, "intro");
        message.content = "<p>hello &amp; welcome</p>".to_string();
        let row = message_row(&message);
        assert!(row.starts_with("* "));
        assert!(row.ends_with(" #design > intro | User 2: hello & welcome"));
    }

    #[test]
    fn test_format_time_out_of_range() {
        assert_eq!(format_time(i64::MAX), "--:--");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a longer line", 6), "a lon…");
    }

    #[test]
    fn test_sidebar_shows_stream_badges() {
        let session = session();
        session.narrow_to(&Narrow::AllMessages, None).unwrap();
        session.view_ready().unwrap();
        session
            .dispatch(ServerEvent::Message(stream_message(10, 6, "lunch")))
            .unwrap();
        session
            .dispatch(ServerEvent::Message(stream_message(11, 6, "lunch")))
            .unwrap();

        let entries = session.read(sidebar_entries).unwrap();
        let general = entries.iter().find(|e| e.label == "#general").unwrap();
        assert_eq!(general.unread, 2);
        let design = entries.iter().find(|e| e.label == "#design").unwrap();
        assert_eq!(design.unread, 0);
        assert!(entries.iter().all(|e| !e.private));
    }
}
