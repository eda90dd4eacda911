use tracing::trace;

use crate::error::{CoreError, Result};
use crate::models::unread::apply_delta;
use crate::models::{
    Directory, MessageId, MuteState, StreamId, UnreadCounts, UnreadKey, UnreadSnapshot, UserId,
};

use super::message_index::MessageIndex;

/// Build counts from the connect-time snapshot. Streams the user is not
/// subscribed to are ignored. Muted streams and topics keep their buckets but
/// stay out of `all_msg`.
pub fn classify_unread_counts(
    snapshot: &UnreadSnapshot,
    directory: &Directory,
    mutes: &MuteState,
) -> UnreadCounts {
    let mut counts = UnreadCounts {
        all_mentions: snapshot.mentions.len(),
        ..UnreadCounts::default()
    };

    for pm in &snapshot.pms {
        let count = pm.unread_message_ids.len();
        if count == 0 {
            continue;
        }
        *counts.unread_pms.entry(pm.sender_id).or_default() += count;
        counts.all_msg += count;
        counts.all_pms += count;
    }

    for entry in &snapshot.streams {
        let count = entry.unread_message_ids.len();
        if count == 0 || !directory.is_subscribed(entry.stream_id) {
            continue;
        }
        *counts
            .unread_topics
            .entry((entry.stream_id, entry.topic.clone()))
            .or_default() += count;
        *counts.streams.entry(entry.stream_id).or_default() += count;
        if !mutes.hides(entry.stream_id, &entry.topic) {
            counts.all_msg += count;
        }
    }

    for huddle in &snapshot.huddles {
        let count = huddle.unread_message_ids.len();
        if count == 0 {
            continue;
        }
        *counts
            .unread_huddles
            .entry(huddle.user_ids.clone())
            .or_default() += count;
        counts.all_msg += count;
        counts.all_pms += count;
    }

    counts
}

/// Apply a ±1 unread change for each id. Self-sent messages never count.
/// Returns the stream ids whose badges changed.
///
/// An id that is not indexed means a mutation ran ahead of indexing; that is
/// an invariant violation, not something to skip.
pub fn apply_count_delta(
    counts: &mut UnreadCounts,
    index: &MessageIndex,
    ids: &[MessageId],
    delta: i8,
    my_id: UserId,
    mutes: &MuteState,
) -> Result<Vec<StreamId>> {
    debug_assert!(delta == 1 || delta == -1);
    let mut touched_streams = Vec::new();

    for &id in ids {
        let message = index.get(id).ok_or(CoreError::MissingMessage(id))?;
        if message.sender_id == my_id {
            trace!("skipping count delta for self-sent message {}", id);
            continue;
        }

        let key = UnreadKey::for_message(message);
        counts.bump(&key, delta);

        if message.is_mentioned() {
            apply_delta(&mut counts.all_mentions, delta);
        }

        match message.stream_topic() {
            Some((stream_id, topic)) => {
                if !touched_streams.contains(&stream_id) {
                    touched_streams.push(stream_id);
                }
                if !mutes.hides(stream_id, topic) {
                    apply_delta(&mut counts.all_msg, delta);
                }
            }
            None => {
                apply_delta(&mut counts.all_pms, delta);
                apply_delta(&mut counts.all_msg, delta);
            }
        }
    }

    Ok(touched_streams)
}

/// The unread topic after `current`, walking streams in sidebar order and
/// topics by name, skipping muted ones and wrapping around. `None` when there
/// is nothing else to go to.
pub fn next_unread_topic(
    counts: &UnreadCounts,
    directory: &Directory,
    mutes: &MuteState,
    current: Option<(StreamId, &str)>,
) -> Option<(StreamId, String)> {
    let order = directory.stream_order();
    let rank = |stream_id: StreamId| order.iter().position(|&s| s == stream_id).unwrap_or(order.len());

    let mut topics: Vec<(StreamId, String)> = counts
        .unread_topics
        .keys()
        .filter(|(sid, _)| directory.is_subscribed(*sid))
        .cloned()
        .collect();
    let current = current.map(|(sid, topic)| (sid, topic.to_string()));
    if let Some(current) = &current {
        if !topics.contains(current) {
            topics.push(current.clone());
        }
    }
    topics.sort_by(|a, b| rank(a.0).cmp(&rank(b.0)).then_with(|| a.1.cmp(&b.1)));

    let start = match &current {
        Some(current) => topics.iter().position(|t| t == current).map_or(0, |p| p + 1),
        None => 0,
    };
    let len = topics.len();
    (0..len)
        .map(|offset| &topics[(start + offset) % len])
        .filter(|candidate| Some(*candidate) != current.as_ref())
        .find(|(sid, topic)| !mutes.hides(*sid, topic))
        .cloned()
}

/// The sender with unread direct messages after `last`, cycling back to the
/// first one.
pub fn next_unread_pm(counts: &UnreadCounts, last: Option<UserId>) -> Option<UserId> {
    let senders: Vec<UserId> = counts.unread_pms.keys().copied().collect();
    if let Some(last) = last {
        if let Some(next) = senders.iter().find(|&&s| s > last) {
            return Some(*next);
        }
    }
    senders.first().copied()
}
