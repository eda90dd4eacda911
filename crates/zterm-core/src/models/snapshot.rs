use super::directory::{Subscription, User};
use super::message::{MessageId, ParticipantSet, StreamId, UserId};

/// Unread direct messages from one sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnreadPm {
    pub sender_id: UserId,
    pub unread_message_ids: Vec<MessageId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnreadStreamTopic {
    pub stream_id: StreamId,
    pub topic: String,
    pub unread_message_ids: Vec<MessageId>,
}

/// Unread group direct messages for one participant set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnreadHuddle {
    pub user_ids: ParticipantSet,
    pub unread_message_ids: Vec<MessageId>,
}

/// Unread ids grouped by conversation, as delivered at registration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnreadSnapshot {
    pub pms: Vec<UnreadPm>,
    pub streams: Vec<UnreadStreamTopic>,
    pub huddles: Vec<UnreadHuddle>,
    pub mentions: Vec<MessageId>,
}

/// Everything the server hands over at connect time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitialSnapshot {
    pub queue_id: String,
    pub last_event_id: i64,
    pub max_message_id: MessageId,
    pub me: User,
    pub users: Vec<User>,
    pub subscriptions: Vec<Subscription>,
    /// Muted topics by stream name, resolved against subscriptions when applied
    pub muted_topics: Vec<(String, String)>,
    pub unread: UnreadSnapshot,
}
