use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use zterm_core::models::{MessageId, Narrow};

use crate::ui::{App, InputMode};

/// Work a key press asks of the event loop. Anything that needs the server
/// is returned here rather than done in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Action {
    Narrow {
        narrow: Narrow,
        contextual: Option<MessageId>,
    },
    /// Focus moved onto this message
    Focus(MessageId),
}

pub(crate) fn handle_key(app: &mut App, key: KeyEvent) -> Option<Action> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.running = false;
        return None;
    }
    match app.input_mode {
        InputMode::Normal => handle_normal_key(app, key),
        InputMode::Search => handle_search_key(app, key),
    }
}

fn handle_normal_key(app: &mut App, key: KeyEvent) -> Option<Action> {
    let focused = app.focused_id();
    let narrow_to = |narrow: Narrow| {
        Some(Action::Narrow {
            narrow,
            contextual: focused,
        })
    };

    match key.code {
        KeyCode::Char('q') => {
            app.running = false;
            None
        }
        KeyCode::Char('j') | KeyCode::Down => app.move_focus(1).map(Action::Focus),
        KeyCode::Char('k') | KeyCode::Up => app.move_focus(-1).map(Action::Focus),
        KeyCode::Char('a') => narrow_to(Narrow::AllMessages),
        KeyCode::Char('P') => narrow_to(Narrow::AllPrivate),
        KeyCode::Char('*') => narrow_to(Narrow::Starred),
        KeyCode::Char('@') => narrow_to(Narrow::Mentioned),
        KeyCode::Char('s') => match focused_stream_topic(app) {
            Some((stream, _)) => narrow_to(Narrow::stream(stream)),
            None => {
                app.set_status("Not a stream message");
                None
            }
        },
        KeyCode::Char('t') => match focused_stream_topic(app) {
            Some((stream, topic)) => narrow_to(Narrow::topic(stream, topic)),
            None => {
                app.set_status("Not a stream message");
                None
            }
        },
        KeyCode::Char('n') => match next_unread_topic(app, focused) {
            Some(narrow) => Some(Action::Narrow {
                narrow,
                contextual: None,
            }),
            None => {
                app.set_status("No unread topics");
                None
            }
        },
        KeyCode::Char('p') => match next_unread_pm(app) {
            Some(narrow) => Some(Action::Narrow {
                narrow,
                contextual: None,
            }),
            None => {
                app.set_status("No unread direct messages");
                None
            }
        },
        KeyCode::Char('/') => {
            app.input_mode = InputMode::Search;
            app.search_input.clear();
            None
        }
        KeyCode::Esc => {
            app.clear_status();
            None
        }
        _ => None,
    }
}

fn handle_search_key(app: &mut App, key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.search_input.clear();
            None
        }
        KeyCode::Enter => {
            app.input_mode = InputMode::Normal;
            let term = std::mem::take(&mut app.search_input);
            let term = term.trim();
            if term.is_empty() {
                return None;
            }
            Some(Action::Narrow {
                narrow: app.view.narrow.search(term),
                contextual: None,
            })
        }
        KeyCode::Backspace => {
            app.search_input.pop();
            None
        }
        KeyCode::Char(c) => {
            app.search_input.push(c);
            None
        }
        _ => None,
    }
}

fn focused_stream_topic(app: &App) -> Option<(String, String)> {
    let message = app.session.get_message(app.focused_id()?)?;
    Some((message.stream_name()?.to_string(), message.topic()?.to_string()))
}

fn next_unread_topic(app: &App, focused: Option<MessageId>) -> Option<Narrow> {
    let (stream_id, topic) = app.session.next_unread_topic_from_message_id(focused).ok()??;
    let stream = app
        .session
        .read(|store| store.directory().stream_name(stream_id).map(str::to_string))
        .ok()??;
    Some(Narrow::topic(stream, topic))
}

fn next_unread_pm(app: &App) -> Option<Narrow> {
    let sender_id = app.session.next_unread_pm().ok()??;
    let email = app
        .session
        .read(|store| store.directory().user_by_id(sender_id).map(|u| u.email.clone()))
        .ok()??;
    Some(Narrow::direct_with([email]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{session, stream_message};
    use zterm_core::ServerEvent;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn live_app() -> App {
        let mut app = App::new(session(), false);
        let view = app.session.narrow_to(&Narrow::AllMessages, None).unwrap();
        app.set_view(view);
        app.session.view_ready().unwrap();
        app
    }

    fn receive(app: &mut App, id: MessageId, stream_id: u64, topic: &str) {
        let outcome = app
            .session
            .dispatch(ServerEvent::Message(stream_message(id, stream_id, topic)))
            .unwrap()
            .unwrap();
        app.apply_outcome(outcome);
    }

    #[test]
    fn test_quit_keys() {
        let mut app = live_app();
        handle_key(&mut app, press(KeyCode::Char('q')));
        assert!(!app.running);

        let mut app = live_app();
        handle_key(&mut app, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(!app.running);
    }

    #[test]
    fn test_focus_movement_yields_focus_actions() {
        let mut app = live_app();
        receive(&mut app, 10, 5, "intro");
        receive(&mut app, 11, 5, "intro");
        assert_eq!(app.focused_id(), Some(10));

        assert_eq!(handle_key(&mut app, press(KeyCode::Char('j'))), Some(Action::Focus(11)));
        assert_eq!(handle_key(&mut app, press(KeyCode::Char('j'))), None);
        assert_eq!(handle_key(&mut app, press(KeyCode::Char('k'))), Some(Action::Focus(10)));
    }

    #[test]
    fn test_stream_and_topic_keys_use_focused_message() {
        let mut app = live_app();
        receive(&mut app, 10, 5, "intro");

        assert_eq!(
            handle_key(&mut app, press(KeyCode::Char('s'))),
            Some(Action::Narrow {
                narrow: Narrow::stream("design"),
                contextual: Some(10),
            })
        );
        assert_eq!(
            handle_key(&mut app, press(KeyCode::Char('t'))),
            Some(Action::Narrow {
                narrow: Narrow::topic("design", "intro"),
                contextual: Some(10),
            })
        );
    }

    #[test]
    fn test_stream_key_without_focus_sets_status() {
        let mut app = live_app();
        assert_eq!(handle_key(&mut app, press(KeyCode::Char('s'))), None);
        assert_eq!(app.status.as_deref(), Some("Not a stream message"));
    }

    #[test]
    fn test_next_unread_topic_key() {
        let mut app = live_app();
        receive(&mut app, 10, 5, "intro");
        receive(&mut app, 11, 6, "lunch");
        assert_eq!(app.focused_id(), Some(10));

        assert_eq!(
            handle_key(&mut app, press(KeyCode::Char('n'))),
            Some(Action::Narrow {
                narrow: Narrow::topic("general", "lunch"),
                contextual: None,
            })
        );
    }

    #[test]
    fn test_next_unread_pm_key_without_unread() {
        let mut app = live_app();
        assert_eq!(handle_key(&mut app, press(KeyCode::Char('p'))), None);
        assert_eq!(app.status.as_deref(), Some("No unread direct messages"));
    }

    #[test]
    fn test_search_input() {
        let mut app = live_app();
        handle_key(&mut app, press(KeyCode::Char('/')));
        assert_eq!(app.input_mode, InputMode::Search);
        for c in "logoo".chars() {
            handle_key(&mut app, press(KeyCode::Char(c)));
        }
        handle_key(&mut app, press(KeyCode::Backspace));
        assert_eq!(app.search_input, "logo");

        assert_eq!(
            handle_key(&mut app, press(KeyCode::Enter)),
            Some(Action::Narrow {
                narrow: Narrow::AllMessages.search("logo"),
                contextual: None,
            })
        );
        assert_eq!(app.input_mode, InputMode::Normal);
        assert!(app.search_input.is_empty());
    }

    #[test]
    fn test_empty_search_is_ignored() {
        let mut app = live_app();
        handle_key(&mut app, press(KeyCode::Char('/')));
        handle_key(&mut app, press(KeyCode::Char(' ')));
        assert_eq!(handle_key(&mut app, press(KeyCode::Enter)), None);
        assert_eq!(app.input_mode, InputMode::Normal);
    }
}
