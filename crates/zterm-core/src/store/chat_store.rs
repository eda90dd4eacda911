use std::collections::BTreeSet;

use tracing::{debug, info, trace};

use crate::config::CoreConfig;
use crate::error::Result;
use crate::models::{
    Directory, InitialSnapshot, Message, MessageId, MuteState, Narrow, ResolvedNarrow, StreamId,
    UnreadCounts, UserId,
};

use super::message_index::MessageIndex;
use super::narrow_resolver::{self, NarrowView};
use super::unread;

/// Owns the index, unread counts, directory and mute state of one session.
/// Built atomically from the connect-time snapshot and mutated in place by
/// every event after that.
pub struct ChatStore {
    pub(crate) index: MessageIndex,
    pub(crate) unread: UnreadCounts,
    pub(crate) directory: Directory,
    pub(crate) mutes: MuteState,
    pub(crate) narrow: ResolvedNarrow,

    // Ids the view currently shows; "displayed" for redraw purposes
    pub(crate) displayed: BTreeSet<MessageId>,

    pub(crate) hide_private_content: bool,
    last_unread_pm: Option<UserId>,
}

impl ChatStore {
    pub fn from_snapshot(snapshot: &InitialSnapshot, config: &CoreConfig) -> Self {
        let mut directory = Directory::new(snapshot.me.clone());
        for user in &snapshot.users {
            directory.add_user(user.clone());
        }

        let mut mutes = MuteState::default();
        for sub in &snapshot.subscriptions {
            if sub.is_muted {
                mutes.set_stream_muted(sub.stream_id, true);
            }
            directory.add_subscription(sub.clone());
        }
        mutes.set_muted_topics(resolve_muted_topics(&snapshot.muted_topics, &directory));

        let unread = unread::classify_unread_counts(&snapshot.unread, &directory, &mutes);
        info!(
            "Built store: {} users, {} streams, {} unread",
            snapshot.users.len(),
            snapshot.subscriptions.len(),
            unread.all_msg
        );

        Self {
            index: MessageIndex::new(),
            unread,
            directory,
            mutes,
            narrow: ResolvedNarrow::all_messages(),
            displayed: BTreeSet::new(),
            hide_private_content: config.hide_private_content,
            last_unread_pm: None,
        }
    }

    // ===== Getters =====

    pub fn index(&self) -> &MessageIndex {
        &self.index
    }

    pub fn message(&self, id: MessageId) -> Option<&Message> {
        self.index.get(id)
    }

    pub fn unread_counts(&self) -> &UnreadCounts {
        &self.unread
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    pub fn mutes(&self) -> &MuteState {
        &self.mutes
    }

    pub fn current_narrow(&self) -> &Narrow {
        &self.narrow.narrow
    }

    pub fn my_id(&self) -> UserId {
        self.directory.my_id()
    }

    pub fn topics_in_stream(&self, stream_id: StreamId) -> &[String] {
        self.index.topics_in_stream(stream_id)
    }

    pub fn is_displayed(&self, id: MessageId) -> bool {
        self.displayed.contains(&id)
    }

    /// Whether a message (typically one that just arrived) belongs on screen
    /// in the current narrow.
    pub fn current_narrow_contains_message(&self, message: &Message) -> bool {
        match &self.narrow.narrow {
            Narrow::AllMessages => !message
                .stream_topic()
                .is_some_and(|(sid, topic)| self.mutes.hides(sid, topic)),
            Narrow::Stream { .. } => {
                message.stream_id().is_some() && message.stream_id() == self.narrow.stream_id
            }
            Narrow::Topic { topic, .. } => message
                .stream_topic()
                .is_some_and(|(sid, t)| Some(sid) == self.narrow.stream_id && t == topic),
            Narrow::AllPrivate => message.is_private(),
            Narrow::DirectWith { .. } => {
                message.participants().is_some() && message.participants() == self.narrow.recipients
            }
            Narrow::Starred => message.is_starred(),
            Narrow::Mentioned => message.is_mentioned(),
            Narrow::Search { .. } => false,
        }
    }

    // ===== Navigation =====

    /// Switch the current narrow and resolve what to show. Fails without
    /// touching anything if the narrow names an unknown stream or user.
    pub fn narrow_to(&mut self, narrow: &Narrow, contextual: Option<MessageId>) -> Result<NarrowView> {
        let resolved = narrow_resolver::resolve_directory(narrow, &self.directory)?;

        if resolved.narrow.is_search() && resolved.narrow != self.narrow.narrow {
            self.index.clear_search();
        }
        if let Some(participants) = &resolved.recipients {
            self.index.ensure_direct_bucket(participants.clone());
        }

        debug!("Narrowing to {}", resolved.narrow);
        self.narrow = resolved;
        Ok(self.refresh_view(contextual))
    }

    /// Re-resolve the current narrow, e.g. after fetched messages were indexed.
    pub fn refresh_view(&mut self, contextual: Option<MessageId>) -> NarrowView {
        let view = narrow_resolver::resolve_narrow(&self.narrow, &self.index, &self.mutes, contextual);
        let key = self.narrow.narrow.key();
        if self.index.pointer(&key).is_none() {
            self.index.set_pointer(key, view.focus);
        }
        self.displayed = view.ids.iter().copied().collect();
        view
    }

    /// Index a page of messages fetched from the server under `narrow`.
    pub fn index_fetched(&mut self, messages: Vec<Message>, narrow: &Narrow) -> Result<()> {
        let resolved = if *narrow == self.narrow.narrow {
            self.narrow.clone()
        } else {
            narrow_resolver::resolve_directory(narrow, &self.directory)?
        };
        trace!("Indexing {} fetched messages under {}", messages.len(), resolved.narrow);
        self.index.index_messages(messages, &resolved, &self.mutes);
        Ok(())
    }

    /// Remember the focused message for the current narrow.
    pub fn set_focus(&mut self, id: MessageId) {
        self.index.set_pointer(self.narrow.narrow.key(), Some(id));
    }

    /// Replace the set of ids the view shows.
    pub fn render_ids<I: IntoIterator<Item = MessageId>>(&mut self, ids: I) {
        self.displayed = ids.into_iter().collect();
    }

    // ===== Unread navigation =====

    /// Next unread topic after the topic of `current` (or from the top).
    pub fn next_unread_topic_from_message_id(&self, current: Option<MessageId>) -> Option<(StreamId, String)> {
        let current_topic = current
            .and_then(|id| self.index.get(id))
            .and_then(|m| m.stream_topic())
            .or_else(|| match &self.narrow.narrow {
                Narrow::Topic { topic, .. } => self.narrow.stream_id.map(|sid| (sid, topic.as_str())),
                _ => None,
            });
        unread::next_unread_topic(&self.unread, &self.directory, &self.mutes, current_topic)
    }

    /// Next sender with unread direct messages, cycling on repeated calls.
    pub fn next_unread_pm(&mut self) -> Option<UserId> {
        let next = unread::next_unread_pm(&self.unread, self.last_unread_pm)?;
        self.last_unread_pm = Some(next);
        Some(next)
    }

    /// Replace the muted-topic set. Returns true when a topic was unmuted, in
    /// which case totals are rebuilt so its unread messages count again.
    pub(crate) fn set_muted_topics_by_name(&mut self, topics: &[(String, String)]) -> bool {
        let resolved = resolve_muted_topics(topics, &self.directory);
        let unmuted = self
            .mutes
            .muted_topics()
            .any(|muted| !resolved.contains(muted));
        self.mutes.set_muted_topics(resolved);
        if unmuted {
            self.unread.recompute_totals(&self.mutes);
        }
        unmuted
    }
}

/// Muted topics arrive keyed by stream name; ones naming streams we are not
/// subscribed to cannot affect anything and are dropped.
fn resolve_muted_topics(
    topics: &[(String, String)],
    directory: &Directory,
) -> Vec<(StreamId, String)> {
    topics
        .iter()
        .filter_map(|(stream, topic)| {
            let stream_id = directory.stream_id_for_name(stream);
            if stream_id.is_none() {
                trace!("Ignoring muted topic in unknown stream {}", stream);
            }
            stream_id.map(|sid| (sid, topic.clone()))
        })
        .collect()
}
