//! Wire shapes of the server API and their conversion into the canonical
//! event, message and snapshot types.

use serde::Deserialize;
use serde_json::Value;
use tracing::{trace, warn};

use crate::error::{CoreError, Result};
use crate::events::{
    FlagChange, MessageEdit, Op, ReactionEvent, ServerEvent, SubscriptionChange,
    SubscriptionProperty, TypingEvent, TypingOp,
};
use crate::models::{
    InitialSnapshot, Message, MessageFlag, MessageKind, ParticipantSet, Reaction, Recipient,
    Subscription, TopicLink, UnreadHuddle, UnreadPm, UnreadSnapshot, UnreadStreamTopic, User,
};

#[derive(Debug, Deserialize)]
pub struct RawRecipient {
    #[serde(alias = "user_id")]
    pub id: u64,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub full_name: String,
}

impl From<RawRecipient> for Recipient {
    fn from(raw: RawRecipient) -> Self {
        Recipient {
            id: raw.id,
            email: raw.email,
            full_name: raw.full_name,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawDisplayRecipient {
    Stream(String),
    Private(Vec<RawRecipient>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawTopicLink {
    Link { url: String, text: String },
    Url(String),
}

#[derive(Debug, Deserialize)]
pub struct RawReactionUser {
    #[serde(alias = "user_id")]
    pub id: u64,
    pub full_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawReaction {
    pub emoji_name: String,
    pub emoji_code: String,
    #[serde(default = "default_reaction_type")]
    pub reaction_type: String,
    pub user_id: Option<u64>,
    pub user: Option<RawReactionUser>,
}

fn default_reaction_type() -> String {
    "unicode_emoji".to_string()
}

impl RawReaction {
    fn into_reaction(self) -> Result<Reaction> {
        let user_id = self
            .user_id
            .or_else(|| self.user.as_ref().map(|u| u.id))
            .ok_or_else(|| CoreError::Protocol("reaction without user".to_string()))?;
        Ok(Reaction {
            user_id,
            user_name: self.user.and_then(|u| u.full_name),
            emoji_name: self.emoji_name,
            emoji_code: self.emoji_code,
            reaction_type: self.reaction_type,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct RawMessage {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: String,
    pub sender_id: u64,
    pub sender_email: String,
    pub sender_full_name: String,
    pub timestamp: i64,
    #[serde(default)]
    pub content: String,
    pub display_recipient: RawDisplayRecipient,
    pub stream_id: Option<u64>,
    #[serde(alias = "topic")]
    pub subject: Option<String>,
    #[serde(default)]
    pub flags: Vec<String>,
    #[serde(default)]
    pub reactions: Vec<RawReaction>,
    #[serde(default, alias = "subject_links")]
    pub topic_links: Vec<RawTopicLink>,
    #[serde(default)]
    pub is_me_message: bool,
    pub edit_history: Option<Vec<Value>>,
    pub last_edit_timestamp: Option<i64>,
}

/// Convert a wire message. Event-level `flags`, when present, replace the
/// message's own. Any type other than stream or private is fatal.
pub fn normalize_message(raw: RawMessage, flags: Option<Vec<String>>) -> Result<Message> {
    let kind = match (raw.kind.as_str(), raw.display_recipient) {
        ("stream", RawDisplayRecipient::Stream(stream_name)) => MessageKind::Stream {
            stream_id: raw.stream_id.ok_or_else(|| {
                CoreError::Protocol(format!("stream message {} without stream_id", raw.id))
            })?,
            stream_name,
            topic: raw.subject.unwrap_or_default(),
        },
        ("private", RawDisplayRecipient::Private(recipients)) => MessageKind::Private {
            recipients: recipients.into_iter().map(Recipient::from).collect(),
        },
        ("stream", _) | ("private", _) => {
            return Err(CoreError::Protocol(format!(
                "message {} has display_recipient that does not match its type",
                raw.id
            )))
        }
        (other, _) => {
            return Err(CoreError::InvalidMessageType {
                message_id: raw.id,
                kind: other.to_string(),
            })
        }
    };

    let reactions = raw
        .reactions
        .into_iter()
        .map(RawReaction::into_reaction)
        .collect::<Result<Vec<_>>>()?;
    let topic_links = raw
        .topic_links
        .into_iter()
        .map(|link| match link {
            RawTopicLink::Link { url, text } => TopicLink { url, text },
            RawTopicLink::Url(url) => TopicLink {
                url,
                text: String::new(),
            },
        })
        .collect();

    Ok(Message {
        id: raw.id,
        kind,
        sender_id: raw.sender_id,
        sender_email: raw.sender_email,
        sender_full_name: raw.sender_full_name,
        timestamp: raw.timestamp,
        content: raw.content,
        raw_content: None,
        is_me_message: raw.is_me_message,
        flags: flags
            .unwrap_or(raw.flags)
            .iter()
            .map(|f| MessageFlag::from_wire(f))
            .collect(),
        reactions,
        topic_links,
        has_edit_history: raw.edit_history.is_some() || raw.last_edit_timestamp.is_some(),
    })
}

#[derive(Debug, Deserialize)]
pub struct RawUpdateMessage {
    pub message_id: u64,
    #[serde(default)]
    pub message_ids: Vec<u64>,
    pub rendered_content: Option<String>,
    #[serde(alias = "topic")]
    pub subject: Option<String>,
    #[serde(alias = "orig_topic")]
    pub orig_subject: Option<String>,
    pub stream_id: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct RawReactionEvent {
    pub op: String,
    pub message_id: u64,
    #[serde(flatten)]
    pub reaction: RawReaction,
}

#[derive(Debug, Deserialize)]
pub struct RawFlagChange {
    #[serde(alias = "operation")]
    pub op: String,
    pub flag: String,
    #[serde(default)]
    pub messages: Vec<u64>,
    #[serde(default)]
    pub all: bool,
}

#[derive(Debug, Deserialize)]
pub struct RawSubscription {
    pub stream_id: u64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub color: String,
    pub is_muted: Option<bool>,
    pub in_home_view: Option<bool>,
    #[serde(default)]
    pub pin_to_top: bool,
    pub desktop_notifications: Option<bool>,
}

impl From<RawSubscription> for Subscription {
    fn from(raw: RawSubscription) -> Self {
        let is_muted = raw
            .is_muted
            .or(raw.in_home_view.map(|home| !home))
            .unwrap_or(false);
        Subscription {
            stream_id: raw.stream_id,
            name: raw.name,
            description: raw.description,
            color: raw.color,
            is_muted,
            pin_to_top: raw.pin_to_top,
            desktop_notifications: raw.desktop_notifications.unwrap_or(false),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RawRemovedStream {
    pub stream_id: u64,
}

#[derive(Debug, Deserialize)]
pub struct RawSubscriptionEvent {
    pub op: String,
    pub stream_id: Option<u64>,
    pub property: Option<String>,
    pub value: Option<Value>,
    #[serde(default)]
    pub subscriptions: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub struct RawTyping {
    pub op: String,
    pub sender: RawRecipient,
    #[serde(default)]
    pub recipients: Vec<RawRecipient>,
}

/// `[stream, topic]` or `[stream, topic, date_muted]`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawMutedTopic {
    Pair(String, String),
    Dated(String, String, Value),
}

impl RawMutedTopic {
    fn into_pair(self) -> (String, String) {
        match self {
            RawMutedTopic::Pair(stream, topic) | RawMutedTopic::Dated(stream, topic, _) => {
                (stream, topic)
            }
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RawEvent {
    Message {
        message: RawMessage,
        flags: Option<Vec<String>>,
    },
    UpdateMessage(RawUpdateMessage),
    Reaction(RawReactionEvent),
    UpdateMessageFlags(RawFlagChange),
    Subscription(RawSubscriptionEvent),
    Typing(RawTyping),
    MutedTopics {
        muted_topics: Vec<RawMutedTopic>,
    },
    Heartbeat,
    #[serde(other)]
    Unknown,
}

fn parse_op(op: &str) -> Result<Op> {
    Op::from_wire(op).ok_or_else(|| CoreError::Protocol(format!("unknown op {op:?}")))
}

fn subscription_property(property: &str, value: Option<&Value>) -> SubscriptionProperty {
    let flag = value.and_then(Value::as_bool);
    match (property, flag) {
        ("in_home_view", Some(home)) => SubscriptionProperty::Muted(!home),
        ("is_muted", Some(muted)) => SubscriptionProperty::Muted(muted),
        ("pin_to_top", Some(pinned)) => SubscriptionProperty::PinToTop(pinned),
        ("desktop_notifications", Some(enabled)) => {
            SubscriptionProperty::DesktopNotifications(enabled)
        }
        (other, _) => SubscriptionProperty::Other(other.to_string()),
    }
}

/// Convert one decoded event. `Ok(None)` means the event carries nothing the
/// core tracks (heartbeats, unknown types, "mark all" flag events...).
pub fn normalize_event(raw: RawEvent) -> Result<Option<ServerEvent>> {
    let event = match raw {
        RawEvent::Message { message, flags } => {
            ServerEvent::Message(normalize_message(message, flags)?)
        }
        RawEvent::UpdateMessage(raw) => ServerEvent::UpdateMessage(MessageEdit {
            message_id: raw.message_id,
            rendered_content: raw.rendered_content,
            new_topic: raw.subject,
            orig_topic: raw.orig_subject,
            stream_id: raw.stream_id,
            message_ids: if raw.message_ids.is_empty() {
                vec![raw.message_id]
            } else {
                raw.message_ids
            },
        }),
        RawEvent::Reaction(raw) => ServerEvent::Reaction(ReactionEvent {
            op: parse_op(&raw.op)?,
            message_id: raw.message_id,
            reaction: raw.reaction.into_reaction()?,
        }),
        RawEvent::UpdateMessageFlags(raw) => {
            if raw.all {
                trace!("Ignoring flag event applied to all messages");
                return Ok(None);
            }
            ServerEvent::UpdateFlags(FlagChange {
                messages: raw.messages,
                flag: MessageFlag::from_wire(&raw.flag),
                op: parse_op(&raw.op)?,
            })
        }
        RawEvent::Subscription(raw) => match raw.op.as_str() {
            "update" => ServerEvent::Subscription(SubscriptionChange::Update {
                stream_id: raw.stream_id.ok_or_else(|| {
                    CoreError::Protocol("subscription update without stream_id".to_string())
                })?,
                property: subscription_property(
                    raw.property.as_deref().unwrap_or_default(),
                    raw.value.as_ref(),
                ),
            }),
            "add" => {
                let subs = raw
                    .subscriptions
                    .into_iter()
                    .map(|v| serde_json::from_value::<RawSubscription>(v).map(Subscription::from))
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                ServerEvent::Subscription(SubscriptionChange::Add(subs))
            }
            "remove" => {
                let ids = raw
                    .subscriptions
                    .into_iter()
                    .map(|v| serde_json::from_value::<RawRemovedStream>(v).map(|s| s.stream_id))
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                ServerEvent::Subscription(SubscriptionChange::Remove(ids))
            }
            other => {
                trace!("Ignoring subscription op {}", other);
                return Ok(None);
            }
        },
        RawEvent::Typing(raw) => {
            let op = match raw.op.as_str() {
                "start" => TypingOp::Start,
                "stop" => TypingOp::Stop,
                other => return Err(CoreError::Protocol(format!("unknown typing op {other:?}"))),
            };
            let mut sender = Recipient::from(raw.sender);
            if sender.full_name.is_empty() {
                sender.full_name = sender.email.clone();
            }
            ServerEvent::Typing(TypingEvent {
                op,
                sender,
                recipients: raw.recipients.into_iter().map(Recipient::from).collect(),
            })
        }
        RawEvent::MutedTopics { muted_topics } => ServerEvent::MutedTopics(
            muted_topics.into_iter().map(RawMutedTopic::into_pair).collect(),
        ),
        RawEvent::Heartbeat => return Ok(None),
        RawEvent::Unknown => {
            trace!("Skipping unknown event type");
            return Ok(None);
        }
    };
    Ok(Some(event))
}

/// Decode the `events` array of a poll response. Returns the highest event id
/// seen, so polling can resume after it, and the events the core tracks.
///
/// An event that fails to decode is reported and dropped; an invalid message
/// type is fatal and aborts the batch.
pub fn normalize_events(events: Vec<Value>) -> Result<(Option<i64>, Vec<ServerEvent>)> {
    let mut last_id = None;
    let mut normalized = Vec::with_capacity(events.len());

    for value in events {
        let id = value.get("id").and_then(Value::as_i64);
        if id.is_some() {
            last_id = last_id.max(id);
        }
        let raw = match serde_json::from_value::<RawEvent>(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Dropping undecodable event {:?}: {}", id, e);
                continue;
            }
        };
        match normalize_event(raw) {
            Ok(Some(event)) => normalized.push(event),
            Ok(None) => {}
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => warn!("Dropping event {:?}: {}", id, e),
        }
    }
    Ok((last_id, normalized))
}

#[derive(Debug, Deserialize)]
pub struct RawUser {
    pub user_id: u64,
    pub email: String,
    pub full_name: String,
    #[serde(default)]
    pub is_bot: bool,
}

impl From<RawUser> for User {
    fn from(raw: RawUser) -> Self {
        User {
            id: raw.user_id,
            email: raw.email,
            full_name: raw.full_name,
            is_bot: raw.is_bot,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RawUnreadPm {
    #[serde(alias = "other_user_id")]
    pub sender_id: u64,
    pub unread_message_ids: Vec<u64>,
}

#[derive(Debug, Deserialize)]
pub struct RawUnreadStream {
    pub stream_id: u64,
    pub topic: String,
    pub unread_message_ids: Vec<u64>,
}

#[derive(Debug, Deserialize)]
pub struct RawUnreadHuddle {
    pub user_ids_string: String,
    pub unread_message_ids: Vec<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawUnreadMsgs {
    #[serde(default)]
    pub pms: Vec<RawUnreadPm>,
    #[serde(default)]
    pub streams: Vec<RawUnreadStream>,
    #[serde(default)]
    pub huddles: Vec<RawUnreadHuddle>,
    #[serde(default)]
    pub mentions: Vec<u64>,
}

#[derive(Debug, Deserialize)]
pub struct RawRegisterResponse {
    pub queue_id: String,
    pub last_event_id: i64,
    #[serde(default)]
    pub max_message_id: u64,
    pub user_id: u64,
    pub email: String,
    pub full_name: String,
    #[serde(default)]
    pub realm_users: Vec<RawUser>,
    #[serde(default)]
    pub subscriptions: Vec<RawSubscription>,
    #[serde(default)]
    pub muted_topics: Vec<RawMutedTopic>,
    #[serde(default)]
    pub unread_msgs: RawUnreadMsgs,
}

pub fn normalize_snapshot(raw: RawRegisterResponse) -> Result<InitialSnapshot> {
    let huddles = raw
        .unread_msgs
        .huddles
        .into_iter()
        .map(|h| {
            let user_ids = ParticipantSet::parse_ids(&h.user_ids_string).ok_or_else(|| {
                CoreError::Protocol(format!("bad user_ids_string {:?}", h.user_ids_string))
            })?;
            Ok(UnreadHuddle {
                user_ids,
                unread_message_ids: h.unread_message_ids,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let me = User {
        id: raw.user_id,
        email: raw.email,
        full_name: raw.full_name,
        is_bot: false,
    };
    Ok(InitialSnapshot {
        queue_id: raw.queue_id,
        last_event_id: raw.last_event_id,
        max_message_id: raw.max_message_id,
        users: raw
            .realm_users
            .into_iter()
            .map(User::from)
            .filter(|u| u.id != me.id)
            .collect(),
        me,
        subscriptions: raw.subscriptions.into_iter().map(Subscription::from).collect(),
        muted_topics: raw
            .muted_topics
            .into_iter()
            .map(RawMutedTopic::into_pair)
            .collect(),
        unread: UnreadSnapshot {
            pms: raw
                .unread_msgs
                .pms
                .into_iter()
                .map(|pm| UnreadPm {
                    sender_id: pm.sender_id,
                    unread_message_ids: pm.unread_message_ids,
                })
                .collect(),
            streams: raw
                .unread_msgs
                .streams
                .into_iter()
                .map(|s| UnreadStreamTopic {
                    stream_id: s.stream_id,
                    topic: s.topic,
                    unread_message_ids: s.unread_message_ids,
                })
                .collect(),
            huddles,
            mentions: raw.unread_msgs.mentions,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stream_message_json() -> Value {
        json!({
            "id": 1,
            "type": "stream",
            "sender_id": 2,
            "sender_email": "iago@example.com",
            "sender_full_name": "Iago",
            "timestamp": 1700000000,
            "content": "<p>hi</p>",
            "display_recipient": "design",
            "stream_id": 5,
            "subject": "intro",
            "subject_links": ["https://example.com/1"],
            "reactions": [{
                "emoji_name": "thumbs_up",
                "emoji_code": "1f44d",
                "reaction_type": "unicode_emoji",
                "user": {"id": 3, "email": "zoe@example.com", "full_name": "Zoe"}
            }]
        })
    }

    fn decode(value: Value) -> Result<Option<ServerEvent>> {
        normalize_event(serde_json::from_value(value)?)
    }

    #[test]
    fn test_message_event_uses_event_flags() {
        let event = decode(json!({
            "id": 0,
            "type": "message",
            "message": stream_message_json(),
            "flags": ["read", "mentioned"]
        }))
        .unwrap()
        .unwrap();
        let ServerEvent::Message(message) = event else {
            panic!("expected message event");
        };
        assert_eq!(message.stream_topic(), Some((5, "intro")));
        assert!(message.is_read());
        assert!(message.is_mentioned());
        assert_eq!(message.reactions[0].user_id, 3);
        assert_eq!(message.topic_links[0].url, "https://example.com/1");
        assert!(!message.has_edit_history);
    }

    #[test]
    fn test_missing_flags_default_to_empty() {
        let raw: RawMessage = serde_json::from_value(stream_message_json()).unwrap();
        let message = normalize_message(raw, None).unwrap();
        assert!(message.flags.is_empty());
    }

    #[test]
    fn test_private_display_recipient() {
        let raw: RawMessage = serde_json::from_value(json!({
            "id": 7,
            "type": "private",
            "sender_id": 2,
            "sender_email": "iago@example.com",
            "sender_full_name": "Iago",
            "timestamp": 1700000000,
            "content": "<p>psst</p>",
            "display_recipient": [
                {"id": 1, "email": "me@example.com", "full_name": "Me"},
                {"id": 2, "email": "iago@example.com", "full_name": "Iago"}
            ],
            "flags": ["read"]
        }))
        .unwrap();
        let message = normalize_message(raw, None).unwrap();
        assert_eq!(message.participants(), Some([1, 2].into_iter().collect()));
        assert!(message.is_read());
    }

    #[test]
    fn test_unknown_message_type_is_fatal() {
        let mut value = stream_message_json();
        value["type"] = json!("huddle");
        let raw: RawMessage = serde_json::from_value(value).unwrap();
        let err = normalize_message(raw, None).unwrap_err();
        assert!(matches!(err, CoreError::InvalidMessageType { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_flag_event_accepts_legacy_operation() {
        let event = decode(json!({
            "type": "update_message_flags",
            "operation": "add",
            "flag": "starred",
            "messages": [1, 2],
            "all": false
        }))
        .unwrap();
        assert_eq!(
            event,
            Some(ServerEvent::UpdateFlags(FlagChange {
                messages: vec![1, 2],
                flag: MessageFlag::Starred,
                op: Op::Add,
            }))
        );

        let all = decode(json!({
            "type": "update_message_flags",
            "op": "add",
            "flag": "read",
            "messages": [],
            "all": true
        }))
        .unwrap();
        assert!(all.is_none());
    }

    #[test]
    fn test_in_home_view_inverts_into_muted() {
        let event = decode(json!({
            "type": "subscription",
            "op": "update",
            "stream_id": 5,
            "property": "in_home_view",
            "value": false
        }))
        .unwrap();
        assert_eq!(
            event,
            Some(ServerEvent::Subscription(SubscriptionChange::Update {
                stream_id: 5,
                property: SubscriptionProperty::Muted(true),
            }))
        );
    }

    #[test]
    fn test_topic_edit_event() {
        let event = decode(json!({
            "type": "update_message",
            "message_id": 1,
            "message_ids": [1, 2],
            "subject": "new",
            "orig_subject": "old",
            "stream_id": 9,
            "propagate_mode": "change_later"
        }))
        .unwrap()
        .unwrap();
        let ServerEvent::UpdateMessage(edit) = event else {
            panic!("expected update_message");
        };
        assert_eq!(edit.new_topic.as_deref(), Some("new"));
        assert_eq!(edit.message_ids, vec![1, 2]);
        assert!(edit.rendered_content.is_none());
    }

    #[test]
    fn test_muted_topics_with_and_without_dates() {
        let event = decode(json!({
            "type": "muted_topics",
            "muted_topics": [["design", "lunch"], ["general", "memes", 1700000000]]
        }))
        .unwrap();
        assert_eq!(
            event,
            Some(ServerEvent::MutedTopics(vec![
                ("design".to_string(), "lunch".to_string()),
                ("general".to_string(), "memes".to_string()),
            ]))
        );
    }

    #[test]
    fn test_batch_skips_unknown_and_tracks_last_id() {
        let (last_id, events) = normalize_events(vec![
            json!({"id": 4, "type": "heartbeat"}),
            json!({"id": 5, "type": "realm_emoji", "realm_emoji": {}}),
            json!({"id": 6, "type": "reaction", "op": "add", "message_id": 1,
                   "emoji_name": "tada", "emoji_code": "1f389", "user_id": 3}),
            json!({"id": 7, "type": "typing", "op": "sideways",
                   "sender": {"user_id": 3, "email": "zoe@example.com"}}),
        ])
        .unwrap();
        assert_eq!(last_id, Some(7));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind(), "reaction");
    }

    #[test]
    fn test_register_response() {
        let raw: RawRegisterResponse = serde_json::from_value(json!({
            "queue_id": "1517975029:0",
            "last_event_id": -1,
            "max_message_id": 42,
            "user_id": 1,
            "email": "me@example.com",
            "full_name": "Me",
            "realm_users": [
                {"user_id": 1, "email": "me@example.com", "full_name": "Me"},
                {"user_id": 2, "email": "iago@example.com", "full_name": "Iago", "is_bot": false}
            ],
            "subscriptions": [
                {"stream_id": 5, "name": "design", "color": "#76ce90", "in_home_view": false,
                 "pin_to_top": true, "desktop_notifications": null}
            ],
            "muted_topics": [["design", "lunch", 1700000000]],
            "unread_msgs": {
                "pms": [{"other_user_id": 2, "unread_message_ids": [10]}],
                "streams": [{"stream_id": 5, "topic": "intro", "unread_message_ids": [1, 2], "sender_ids": [2]}],
                "huddles": [{"user_ids_string": "1,2,3", "unread_message_ids": [11]}],
                "mentions": [2],
                "count": 4
            }
        }))
        .unwrap();
        let snapshot = normalize_snapshot(raw).unwrap();
        assert_eq!(snapshot.users.len(), 1);
        assert!(snapshot.subscriptions[0].is_muted);
        assert!(snapshot.subscriptions[0].pin_to_top);
        assert_eq!(snapshot.unread.pms[0].sender_id, 2);
        assert_eq!(snapshot.unread.huddles[0].user_ids, [1, 2, 3].into_iter().collect());
        assert_eq!(snapshot.muted_topics, vec![("design".to_string(), "lunch".to_string())]);
    }
}
