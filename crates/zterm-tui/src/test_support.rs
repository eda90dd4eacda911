//! Session and message builders for the UI tests. User 1 is the current user.

use std::collections::HashSet;

use zterm_core::config::CoreConfig;
use zterm_core::models::{
    InitialSnapshot, Message, MessageId, MessageKind, StreamId, Subscription, UnreadSnapshot, User,
    UserId,
};
use zterm_core::Session;

pub fn user(id: UserId) -> User {
    User {
        id,
        email: format!("user{id}@example.com"),
        full_name: format!("User {id}"),
        is_bot: false,
    }
}

fn subscription(stream_id: StreamId, name: &str) -> Subscription {
    Subscription {
        stream_id,
        name: name.to_string(),
        description: String::new(),
        color: "#c2c2c2".to_string(),
        is_muted: false,
        pin_to_top: false,
        desktop_notifications: false,
    }
}

/// Streams 5 "design" and 6 "general"; users 1-3.
pub fn snapshot() -> InitialSnapshot {
    InitialSnapshot {
        queue_id: "q".to_string(),
        last_event_id: -1,
        max_message_id: 0,
        me: user(1),
        users: vec![user(2), user(3)],
        subscriptions: vec![subscription(5, "design"), subscription(6, "general")],
        muted_topics: Vec::new(),
        unread: UnreadSnapshot::default(),
    }
}

pub fn session() -> Session {
    let session = Session::new(CoreConfig::default());
    session.apply_snapshot(&snapshot());
    session
}

/// Unread stream message from user 2.
pub fn stream_message(id: MessageId, stream_id: StreamId, topic: &str) -> Message {
    let sender = user(2);
    Message {
        id,
        kind: MessageKind::Stream {
            stream_id,
            stream_name: if stream_id == 5 { "design" } else { "general" }.to_string(),
            topic: topic.to_string(),
        },
        sender_id: sender.id,
        sender_email: sender.email,
        sender_full_name: sender.full_name,
        timestamp: 1_700_000_000 + id as i64,
        content: format!("<p>message {id}</p>"),
        raw_content: None,
        is_me_message: false,
        flags: HashSet::new(),
        reactions: Vec::new(),
        topic_links: Vec::new(),
        has_edit_history: false,
    }
}
