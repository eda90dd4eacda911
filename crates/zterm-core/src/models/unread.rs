use std::collections::BTreeMap;

use super::directory::MuteState;
use super::message::{Message, MessageKind, ParticipantSet, StreamId, UserId};

/// The bucket a message's unread state is counted in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UnreadKey {
    Topic(StreamId, String),
    /// One-to-one (or self) conversation, keyed by sender
    Pm(UserId),
    /// Group conversation, keyed by its participants
    Huddle(ParticipantSet),
}

impl UnreadKey {
    /// Self and one-to-one conversations have at most two recipients; anything
    /// larger is a group conversation.
    pub fn for_message(message: &Message) -> Self {
        match &message.kind {
            MessageKind::Stream {
                stream_id, topic, ..
            } => UnreadKey::Topic(*stream_id, topic.clone()),
            MessageKind::Private { recipients } if recipients.len() <= 2 => {
                UnreadKey::Pm(message.sender_id)
            }
            MessageKind::Private { recipients } => {
                UnreadKey::Huddle(recipients.iter().map(|r| r.id).collect())
            }
        }
    }
}

/// Unread counts by conversation plus the grand totals shown in the sidebar.
///
/// Buckets are kept for muted streams and topics too; mute state only decides
/// whether they contribute to `all_msg`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnreadCounts {
    pub all_msg: usize,
    pub all_pms: usize,
    pub all_mentions: usize,
    pub unread_topics: BTreeMap<(StreamId, String), usize>,
    pub unread_pms: BTreeMap<UserId, usize>,
    pub unread_huddles: BTreeMap<ParticipantSet, usize>,
    pub streams: BTreeMap<StreamId, usize>,
}

impl UnreadCounts {
    pub fn topic_count(&self, stream_id: StreamId, topic: &str) -> usize {
        self.unread_topics
            .get(&(stream_id, topic.to_string()))
            .copied()
            .unwrap_or(0)
    }

    pub fn stream_count(&self, stream_id: StreamId) -> usize {
        self.streams.get(&stream_id).copied().unwrap_or(0)
    }

    pub fn pm_count(&self, sender_id: UserId) -> usize {
        self.unread_pms.get(&sender_id).copied().unwrap_or(0)
    }

    pub fn huddle_count(&self, participants: &ParticipantSet) -> usize {
        self.unread_huddles.get(participants).copied().unwrap_or(0)
    }

    /// Stream badge value: unread messages in the stream's unmuted topics.
    pub fn visible_stream_count(&self, stream_id: StreamId, mutes: &MuteState) -> usize {
        self.unread_topics
            .iter()
            .filter(|((sid, topic), _)| *sid == stream_id && !mutes.is_muted_topic(*sid, topic))
            .map(|(_, count)| count)
            .sum()
    }

    /// Apply a ±1 change to the bucket for `key` (and the per-stream bucket for
    /// topics). A decrement never creates a bucket; a bucket reaching zero is
    /// removed so presence in the map means "has unread".
    pub fn bump(&mut self, key: &UnreadKey, delta: i8) {
        match key {
            UnreadKey::Topic(stream_id, topic) => {
                update_bucket(&mut self.unread_topics, (*stream_id, topic.clone()), delta);
                update_bucket(&mut self.streams, *stream_id, delta);
            }
            UnreadKey::Pm(sender_id) => update_bucket(&mut self.unread_pms, *sender_id, delta),
            UnreadKey::Huddle(participants) => {
                update_bucket(&mut self.unread_huddles, participants.clone(), delta)
            }
        }
    }

    /// Recompute `all_msg` and `all_pms` from the buckets under the given mute
    /// state. Used when something is unmuted.
    pub fn recompute_totals(&mut self, mutes: &MuteState) {
        let pms: usize = self.unread_pms.values().sum::<usize>()
            + self.unread_huddles.values().sum::<usize>();
        let streams: usize = self
            .unread_topics
            .iter()
            .filter(|((sid, topic), _)| !mutes.hides(*sid, topic))
            .map(|(_, count)| count)
            .sum();
        self.all_pms = pms;
        self.all_msg = pms + streams;
    }
}

pub(crate) fn apply_delta(total: &mut usize, delta: i8) {
    if delta > 0 {
        *total += 1;
    } else {
        *total = total.saturating_sub(1);
    }
}

fn update_bucket<K: Ord>(map: &mut BTreeMap<K, usize>, key: K, delta: i8) {
    match map.get_mut(&key) {
        Some(count) => {
            apply_delta(count, delta);
            if *count == 0 {
                map.remove(&key);
            }
        }
        None if delta > 0 => {
            map.insert(key, 1);
        }
        None => {}
    }
}
