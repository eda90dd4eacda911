use std::collections::{BTreeSet, HashMap, HashSet};

use tracing::trace;

use crate::models::{
    Message, MessageId, MuteState, Narrow, NarrowKey, ParticipantSet, ResolvedNarrow, StreamId,
};

/// Where a message lands in the index, as decided by [`classify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexTarget {
    AllMessages,
    Search,
    Starred,
    Mentioned,
    Private,
    DirectWith(ParticipantSet),
    Stream(StreamId),
    Topic(StreamId, String),
}

/// Decide which buckets a message belongs to given the narrow it was fetched
/// under.
///
/// Specialized buckets (stream, topic, participant set) are only populated when
/// the page was fetched under that exact narrow, so a bucket never claims to
/// hold a view it only saw a filtered slice of. Search results are a flat set
/// and short-circuit everything else.
pub fn classify(message: &Message, narrow: &ResolvedNarrow, mutes: &MuteState) -> Vec<IndexTarget> {
    let mut targets = Vec::new();

    if narrow.narrow.is_all_messages() {
        let hidden = message
            .stream_topic()
            .is_some_and(|(stream_id, topic)| mutes.hides(stream_id, topic));
        if !hidden {
            targets.push(IndexTarget::AllMessages);
        }
        return targets;
    }

    if narrow.narrow.is_search() {
        targets.push(IndexTarget::Search);
        return targets;
    }

    match &narrow.narrow {
        Narrow::Topic { topic, .. } => {
            if let Some((stream_id, msg_topic)) = message.stream_topic() {
                if msg_topic == topic && narrow.stream_id == Some(stream_id) {
                    targets.push(IndexTarget::Topic(stream_id, topic.clone()));
                }
            }
        }
        single_clause => {
            if *single_clause == Narrow::Starred && message.is_starred() {
                targets.push(IndexTarget::Starred);
            }
            if *single_clause == Narrow::Mentioned && message.is_mentioned() {
                targets.push(IndexTarget::Mentioned);
            }
            if let Some(participants) = message.participants() {
                targets.push(IndexTarget::Private);
                if matches!(single_clause, Narrow::DirectWith { .. })
                    && narrow.recipients.as_ref() == Some(&participants)
                {
                    targets.push(IndexTarget::DirectWith(participants));
                }
            }
            if let Some(stream_id) = message.stream_id() {
                if narrow.stream_id == Some(stream_id)
                    && matches!(single_clause, Narrow::Stream { .. })
                {
                    targets.push(IndexTarget::Stream(stream_id));
                }
            }
        }
    }

    targets
}

/// The central multi-index. Every id in any bucket is a key of `messages`.
#[derive(Debug, Default)]
pub struct MessageIndex {
    messages: HashMap<MessageId, Message>,
    all_msg_ids: BTreeSet<MessageId>,
    stream_msg_ids_by_stream_id: HashMap<StreamId, BTreeSet<MessageId>>,
    topic_msg_ids: HashMap<StreamId, HashMap<String, BTreeSet<MessageId>>>,
    private_msg_ids: BTreeSet<MessageId>,
    private_msg_ids_by_user_ids: HashMap<ParticipantSet, BTreeSet<MessageId>>,
    starred_msg_ids: BTreeSet<MessageId>,
    mentioned_msg_ids: BTreeSet<MessageId>,
    search: BTreeSet<MessageId>,
    edited_messages: HashSet<MessageId>,
    pointer: HashMap<NarrowKey, Option<MessageId>>, // None = visited, nothing focused yet
    topics: HashMap<StreamId, Vec<String>>,         // most recently active first
}

impl MessageIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index a page of messages fetched under `narrow`. Re-indexing the same
    /// message overwrites its record and leaves the buckets unchanged.
    pub fn index_messages<I>(&mut self, messages: I, narrow: &ResolvedNarrow, mutes: &MuteState)
    where
        I: IntoIterator<Item = Message>,
    {
        for message in messages {
            let targets = classify(&message, narrow, mutes);
            self.store(message, &targets);
        }
    }

    /// Index a message that just arrived live. Besides the current narrow's
    /// classification, a live message joins the flat sets and extends any
    /// stream, topic or participant-set bucket that already exists: it is newer
    /// than everything fetched for those views.
    pub fn index_live_message(&mut self, message: Message, narrow: &ResolvedNarrow, mutes: &MuteState) {
        let mut targets = classify(&message, narrow, mutes);
        let mut extend = |target: IndexTarget| {
            if !targets.contains(&target) {
                targets.push(target);
            }
        };

        match message.stream_topic() {
            Some((stream_id, topic)) => {
                if !mutes.hides(stream_id, topic) {
                    extend(IndexTarget::AllMessages);
                }
                if self.stream_msg_ids_by_stream_id.contains_key(&stream_id) {
                    extend(IndexTarget::Stream(stream_id));
                }
                if self
                    .topic_msg_ids
                    .get(&stream_id)
                    .is_some_and(|topics| topics.contains_key(topic))
                {
                    extend(IndexTarget::Topic(stream_id, topic.to_string()));
                }
            }
            None => {
                extend(IndexTarget::AllMessages);
                extend(IndexTarget::Private);
                if let Some(participants) = message.participants() {
                    if self.private_msg_ids_by_user_ids.contains_key(&participants) {
                        extend(IndexTarget::DirectWith(participants));
                    }
                }
            }
        }
        if message.is_starred() {
            extend(IndexTarget::Starred);
        }
        if message.is_mentioned() {
            extend(IndexTarget::Mentioned);
        }

        if let Some((stream_id, topic)) = message.stream_topic() {
            let topic = topic.to_string();
            self.touch_topic(stream_id, &topic);
        }
        self.store(message, &targets);
    }

    fn store(&mut self, message: Message, targets: &[IndexTarget]) {
        let id = message.id;
        if message.has_edit_history {
            self.edited_messages.insert(id);
        }
        for target in targets {
            self.insert(id, target);
        }
        trace!("indexed message {} into {} buckets", id, targets.len());
        self.messages.insert(id, message);
    }

    fn insert(&mut self, id: MessageId, target: &IndexTarget) {
        match target {
            IndexTarget::AllMessages => {
                self.all_msg_ids.insert(id);
            }
            IndexTarget::Search => {
                self.search.insert(id);
            }
            IndexTarget::Starred => {
                self.starred_msg_ids.insert(id);
            }
            IndexTarget::Mentioned => {
                self.mentioned_msg_ids.insert(id);
            }
            IndexTarget::Private => {
                self.private_msg_ids.insert(id);
            }
            IndexTarget::DirectWith(participants) => {
                self.private_msg_ids_by_user_ids
                    .entry(participants.clone())
                    .or_default()
                    .insert(id);
            }
            IndexTarget::Stream(stream_id) => {
                self.stream_msg_ids_by_stream_id
                    .entry(*stream_id)
                    .or_default()
                    .insert(id);
            }
            IndexTarget::Topic(stream_id, topic) => {
                self.topic_msg_ids
                    .entry(*stream_id)
                    .or_default()
                    .entry(topic.clone())
                    .or_default()
                    .insert(id);
            }
        }
    }

    // ===== Getters =====

    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.messages.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: MessageId) -> Option<&mut Message> {
        self.messages.get_mut(&id)
    }

    pub fn contains(&self, id: MessageId) -> bool {
        self.messages.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn all_msg_ids(&self) -> &BTreeSet<MessageId> {
        &self.all_msg_ids
    }

    pub fn stream_msg_ids(&self, stream_id: StreamId) -> Option<&BTreeSet<MessageId>> {
        self.stream_msg_ids_by_stream_id.get(&stream_id)
    }

    pub fn topic_msg_ids(&self, stream_id: StreamId, topic: &str) -> Option<&BTreeSet<MessageId>> {
        self.topic_msg_ids
            .get(&stream_id)
            .and_then(|topics| topics.get(topic))
    }

    pub fn private_msg_ids(&self) -> &BTreeSet<MessageId> {
        &self.private_msg_ids
    }

    pub fn private_msg_ids_by_user_ids(&self, participants: &ParticipantSet) -> Option<&BTreeSet<MessageId>> {
        self.private_msg_ids_by_user_ids.get(participants)
    }

    pub fn starred_msg_ids(&self) -> &BTreeSet<MessageId> {
        &self.starred_msg_ids
    }

    pub fn mentioned_msg_ids(&self) -> &BTreeSet<MessageId> {
        &self.mentioned_msg_ids
    }

    pub fn search_results(&self) -> &BTreeSet<MessageId> {
        &self.search
    }

    pub fn is_edited(&self, id: MessageId) -> bool {
        self.edited_messages.contains(&id)
    }

    pub fn pointer(&self, key: &NarrowKey) -> Option<MessageId> {
        self.pointer.get(key).copied().flatten()
    }

    pub fn topics_in_stream(&self, stream_id: StreamId) -> &[String] {
        self.topics.get(&stream_id).map(Vec::as_slice).unwrap_or(&[])
    }

    // ===== Mutations =====

    /// Remember where focus was in a narrow. `None` records a visit with no focus.
    pub fn set_pointer(&mut self, key: NarrowKey, id: Option<MessageId>) {
        self.pointer.insert(key, id);
    }

    /// Register an empty participant-set bucket so live messages for a
    /// conversation seen for the first time have somewhere to go.
    pub fn ensure_direct_bucket(&mut self, participants: ParticipantSet) {
        self.private_msg_ids_by_user_ids
            .entry(participants)
            .or_default();
    }

    /// Search results are replaced wholesale by each new search.
    pub fn clear_search(&mut self) {
        self.search.clear();
    }

    pub fn set_topics(&mut self, stream_id: StreamId, topics: Vec<String>) {
        self.topics.insert(stream_id, topics);
    }

    /// Move a topic to the front of its stream's recency list.
    pub fn touch_topic(&mut self, stream_id: StreamId, topic: &str) {
        let topics = self.topics.entry(stream_id).or_default();
        topics.retain(|t| t != topic);
        topics.insert(0, topic.to_string());
    }

    pub fn mark_edited(&mut self, id: MessageId) {
        if self.messages.contains_key(&id) {
            self.edited_messages.insert(id);
        }
    }

    /// Move ids from one topic bucket to another and retitle the messages.
    ///
    /// Ids taken out of the old bucket always land in the new one, creating it
    /// if needed. An already existing new bucket also picks up any other moved
    /// id that is indexed. An emptied old bucket is kept: the topic is still
    /// known to be fully indexed, just empty.
    pub fn move_topic(&mut self, ids: &[MessageId], stream_id: StreamId, old_topic: &str, new_topic: &str) {
        if let Some(topics) = self.topic_msg_ids.get_mut(&stream_id) {
            let moved: Vec<MessageId> = match topics.get_mut(old_topic) {
                Some(old) => ids.iter().copied().filter(|id| old.remove(id)).collect(),
                None => Vec::new(),
            };
            if let Some(target) = topics.get_mut(new_topic) {
                target.extend(ids.iter().copied().filter(|id| self.messages.contains_key(id)));
            } else if !moved.is_empty() {
                topics.insert(new_topic.to_string(), moved.into_iter().collect());
            }
        }
        for id in ids {
            if let Some(message) = self.messages.get_mut(id) {
                message.set_topic(new_topic);
            }
        }
    }

    pub fn set_starred(&mut self, id: MessageId, starred: bool) {
        if starred {
            self.starred_msg_ids.insert(id);
        } else {
            self.starred_msg_ids.remove(&id);
        }
    }

    pub fn set_mentioned(&mut self, id: MessageId, mentioned: bool) {
        if mentioned {
            self.mentioned_msg_ids.insert(id);
        } else {
            self.mentioned_msg_ids.remove(&id);
        }
    }

    /// Every id in every bucket must be a stored message, and no id may be in
    /// both a stream bucket and the private set.
    pub fn check_consistency(&self) -> Result<(), MessageId> {
        let stream_ids = self
            .stream_msg_ids_by_stream_id
            .values()
            .chain(self.topic_msg_ids.values().flat_map(|t| t.values()));
        let private_ids = std::iter::once(&self.private_msg_ids)
            .chain(self.private_msg_ids_by_user_ids.values());
        let flat = [
            &self.all_msg_ids,
            &self.starred_msg_ids,
            &self.mentioned_msg_ids,
            &self.search,
        ];

        for set in stream_ids.clone().chain(private_ids).chain(flat) {
            if let Some(missing) = set.iter().find(|id| !self.messages.contains_key(*id)) {
                return Err(*missing);
            }
        }
        for set in stream_ids {
            if let Some(both) = set.iter().find(|id| self.private_msg_ids.contains(*id)) {
                return Err(*both);
            }
        }
        Ok(())
    }
}
