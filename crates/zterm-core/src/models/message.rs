use std::collections::{BTreeSet, HashSet};
use std::fmt;

pub type MessageId = u64;
pub type UserId = u64;
pub type StreamId = u64;

/// Per-message flags as reported by the server. Unknown flags are kept as `Other`
/// so a flag set survives round trips through edits without losing information
/// the index cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MessageFlag {
    Read,
    Starred,
    Mentioned,
    WildcardMentioned,
    Collapsed,
    HasAlertWord,
    Historical,
    Other,
}

impl MessageFlag {
    pub fn from_wire(flag: &str) -> Self {
        match flag {
            "read" => MessageFlag::Read,
            "starred" => MessageFlag::Starred,
            "mentioned" => MessageFlag::Mentioned,
            "wildcard_mentioned" => MessageFlag::WildcardMentioned,
            "collapsed" => MessageFlag::Collapsed,
            "has_alert_word" => MessageFlag::HasAlertWord,
            "historical" => MessageFlag::Historical,
            _ => MessageFlag::Other,
        }
    }

    pub fn as_wire(&self) -> &'static str {
        match self {
            MessageFlag::Read => "read",
            MessageFlag::Starred => "starred",
            MessageFlag::Mentioned => "mentioned",
            MessageFlag::WildcardMentioned => "wildcard_mentioned",
            MessageFlag::Collapsed => "collapsed",
            MessageFlag::HasAlertWord => "has_alert_word",
            MessageFlag::Historical => "historical",
            MessageFlag::Other => "other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    pub id: UserId,
    pub email: String,
    pub full_name: String,
}

/// The set of user ids taking part in a direct conversation, always including
/// the current user. Ordered so it can key maps and compare cheaply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticipantSet(BTreeSet<UserId>);

impl ParticipantSet {
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    pub fn contains(&self, user_id: UserId) -> bool {
        self.0.contains(&user_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &UserId> {
        self.0.iter()
    }

    pub fn insert(&mut self, user_id: UserId) {
        self.0.insert(user_id);
    }

    /// Parse the server's comma-separated `user_ids_string` ("3,7,12").
    pub fn parse_ids(ids: &str) -> Option<Self> {
        ids.split(',')
            .map(|id| id.trim().parse::<UserId>().ok())
            .collect::<Option<BTreeSet<_>>>()
            .map(Self)
    }
}

impl FromIterator<UserId> for ParticipantSet {
    fn from_iter<T: IntoIterator<Item = UserId>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for ParticipantSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: Vec<String> = self.0.iter().map(|id| id.to_string()).collect();
        write!(f, "{}", ids.join(","))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageKind {
    Stream {
        stream_id: StreamId,
        stream_name: String,
        topic: String,
    },
    Private {
        recipients: Vec<Recipient>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reaction {
    pub user_id: UserId,
    pub user_name: Option<String>,
    pub emoji_name: String,
    pub emoji_code: String,
    pub reaction_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicLink {
    pub url: String,
    pub text: String,
}

/// Canonical message record. The message index is the only owner; everything else
/// refers to messages by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub kind: MessageKind,
    pub sender_id: UserId,
    pub sender_email: String,
    pub sender_full_name: String,
    pub timestamp: i64,
    /// Rendered (HTML) content
    pub content: String,
    /// Raw markdown source, only present when fetched explicitly
    pub raw_content: Option<String>,
    pub is_me_message: bool,
    pub flags: HashSet<MessageFlag>,
    pub reactions: Vec<Reaction>,
    pub topic_links: Vec<TopicLink>,
    /// True when the server delivered an edit history for this message
    pub has_edit_history: bool,
}

impl Message {
    pub fn is_stream(&self) -> bool {
        matches!(self.kind, MessageKind::Stream { .. })
    }

    pub fn is_private(&self) -> bool {
        matches!(self.kind, MessageKind::Private { .. })
    }

    pub fn stream_id(&self) -> Option<StreamId> {
        match &self.kind {
            MessageKind::Stream { stream_id, .. } => Some(*stream_id),
            MessageKind::Private { .. } => None,
        }
    }

    pub fn stream_name(&self) -> Option<&str> {
        match &self.kind {
            MessageKind::Stream { stream_name, .. } => Some(stream_name),
            MessageKind::Private { .. } => None,
        }
    }

    pub fn topic(&self) -> Option<&str> {
        match &self.kind {
            MessageKind::Stream { topic, .. } => Some(topic),
            MessageKind::Private { .. } => None,
        }
    }

    pub fn stream_topic(&self) -> Option<(StreamId, &str)> {
        match &self.kind {
            MessageKind::Stream {
                stream_id, topic, ..
            } => Some((*stream_id, topic.as_str())),
            MessageKind::Private { .. } => None,
        }
    }

    pub fn recipients(&self) -> &[Recipient] {
        match &self.kind {
            MessageKind::Private { recipients } => recipients,
            MessageKind::Stream { .. } => &[],
        }
    }

    /// Participant ids of a direct message (`None` for stream messages).
    pub fn participants(&self) -> Option<ParticipantSet> {
        match &self.kind {
            MessageKind::Private { recipients } => {
                Some(recipients.iter().map(|r| r.id).collect())
            }
            MessageKind::Stream { .. } => None,
        }
    }

    pub fn has_flag(&self, flag: MessageFlag) -> bool {
        self.flags.contains(&flag)
    }

    pub fn is_read(&self) -> bool {
        self.has_flag(MessageFlag::Read)
    }

    pub fn is_starred(&self) -> bool {
        self.has_flag(MessageFlag::Starred)
    }

    /// Direct or wildcard mention of the current user.
    pub fn is_mentioned(&self) -> bool {
        self.has_flag(MessageFlag::Mentioned) || self.has_flag(MessageFlag::WildcardMentioned)
    }

    /// Returns true when the flag was not already present.
    pub fn add_flag(&mut self, flag: MessageFlag) -> bool {
        self.flags.insert(flag)
    }

    /// Returns true when the flag was present.
    pub fn remove_flag(&mut self, flag: MessageFlag) -> bool {
        self.flags.remove(&flag)
    }

    pub fn set_topic(&mut self, new_topic: &str) {
        if let MessageKind::Stream { topic, .. } = &mut self.kind {
            *topic = new_topic.to_string();
        }
    }

    pub fn has_reaction(&self, user_id: UserId, emoji_code: &str) -> bool {
        self.reactions
            .iter()
            .any(|r| r.user_id == user_id && r.emoji_code == emoji_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_participant_set_parse_ids() {
        let set = ParticipantSet::parse_ids("12, 3,7").unwrap();
        assert_eq!(set, [3, 7, 12].into_iter().collect());
        assert_eq!(set.to_string(), "3,7,12");
        assert!(ParticipantSet::parse_ids("3,x").is_none());
    }

    #[test]
    fn test_participant_set_ignores_order() {
        let a: ParticipantSet = [1, 2, 3].into_iter().collect();
        let b: ParticipantSet = [3, 1, 2, 2].into_iter().collect();
        assert_eq!(a, b);
        assert_eq!(b.len(), 3);
    }

    #[test]
    fn test_flag_wire_names() {
        assert_eq!(MessageFlag::from_wire("wildcard_mentioned"), MessageFlag::WildcardMentioned);
        assert_eq!(MessageFlag::from_wire("read").as_wire(), "read");
        assert_eq!(MessageFlag::from_wire("something_new"), MessageFlag::Other);
    }
}
