//! Builders shared by the unit tests. User 1 is always the current user.

use std::collections::HashSet;

use crate::models::{
    Directory, InitialSnapshot, Message, MessageFlag, MessageId, MessageKind, Narrow, Recipient,
    ResolvedNarrow, StreamId, Subscription, UnreadSnapshot, User, UserId,
};

pub const ME: UserId = 1;

pub fn email(user_id: UserId) -> String {
    if user_id == ME {
        "me@example.com".to_string()
    } else {
        format!("user{user_id}@example.com")
    }
}

pub fn user(user_id: UserId) -> User {
    User {
        id: user_id,
        email: email(user_id),
        full_name: format!("User {user_id}"),
        is_bot: false,
    }
}

pub fn subscription(stream_id: StreamId, name: &str) -> Subscription {
    Subscription {
        stream_id,
        name: name.to_string(),
        description: String::new(),
        color: "#76ce90".to_string(),
        is_muted: false,
        pin_to_top: false,
        desktop_notifications: false,
    }
}

/// Streams 5 "design", 6 "general", 7 "random", 9 "S"; users 1-4.
pub fn directory() -> Directory {
    let mut dir = Directory::new(user(ME));
    for id in 2..=4 {
        dir.add_user(user(id));
    }
    for (id, name) in [(5, "design"), (6, "general"), (7, "random"), (9, "S")] {
        dir.add_subscription(subscription(id, name));
    }
    dir
}

pub fn snapshot(unread: UnreadSnapshot) -> InitialSnapshot {
    let dir = directory();
    InitialSnapshot {
        queue_id: "queue-1".to_string(),
        last_event_id: -1,
        max_message_id: 100,
        me: user(ME),
        users: (2..=4).map(user).collect(),
        subscriptions: dir
            .stream_order()
            .into_iter()
            .filter_map(|id| dir.subscription(id).cloned())
            .collect(),
        muted_topics: Vec::new(),
        unread,
    }
}

fn stream_name(stream_id: StreamId) -> String {
    match stream_id {
        5 => "design",
        6 => "general",
        7 => "random",
        9 => "S",
        _ => "other",
    }
    .to_string()
}

pub fn message(id: MessageId, sender_id: UserId, kind: MessageKind) -> Message {
    Message {
        id,
        kind,
        sender_id,
        sender_email: email(sender_id),
        sender_full_name: format!("User {sender_id}"),
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

/// Unread stream message from user 2.
pub fn stream_msg(id: MessageId, stream_id: StreamId, topic: &str) -> Message {
    message(
        id,
        2,
        MessageKind::Stream {
            stream_id,
            stream_name: stream_name(stream_id),
            topic: topic.to_string(),
        },
    )
}

pub fn read(mut message: Message) -> Message {
    message.add_flag(MessageFlag::Read);
    message
}

/// Direct message between `participants` (which should include `ME`).
pub fn dm(id: MessageId, sender_id: UserId, participants: &[UserId]) -> Message {
    let recipients = participants
        .iter()
        .map(|&uid| Recipient {
            id: uid,
            email: email(uid),
            full_name: format!("User {uid}"),
        })
        .collect();
    message(id, sender_id, MessageKind::Private { recipients })
}

pub fn narrow_all() -> ResolvedNarrow {
    ResolvedNarrow::all_messages()
}

pub fn narrow_stream(name: &str, stream_id: StreamId) -> ResolvedNarrow {
    ResolvedNarrow {
        narrow: Narrow::stream(name),
        stream_id: Some(stream_id),
        recipients: None,
    }
}

pub fn narrow_topic(name: &str, stream_id: StreamId, topic: &str) -> ResolvedNarrow {
    ResolvedNarrow {
        narrow: Narrow::topic(name, topic),
        stream_id: Some(stream_id),
        recipients: None,
    }
}

/// `participants` includes `ME`; the narrow's emails are everyone else.
pub fn narrow_direct(participants: &[UserId]) -> ResolvedNarrow {
    let emails: Vec<String> = participants
        .iter()
        .filter(|&&uid| uid != ME)
        .map(|&uid| email(uid))
        .collect();
    ResolvedNarrow {
        narrow: Narrow::direct_with(emails),
        stream_id: None,
        recipients: Some(participants.iter().copied().collect()),
    }
}
