//! Event appliers. Each one mutates the store as a unit and reports the
//! smallest redraw that reflects the change.

use tracing::{debug, trace, warn};

use crate::error::{CoreError, Result};
use crate::events::{
    ApplyOutcome, FlagChange, MessageEdit, Notification, Op, ReactionEvent, Redraw, ServerEvent,
    SubscriptionChange, SubscriptionProperty, TypingEvent, TypingOp,
};
use crate::models::{Message, MessageFlag, MessageId, MessageKind, Narrow};

use super::chat_store::ChatStore;
use super::unread::apply_count_delta;

impl ChatStore {
    /// Apply one normalized server event.
    pub fn apply(&mut self, event: ServerEvent) -> Result<ApplyOutcome> {
        trace!("Applying {} event", event.kind());
        match event {
            ServerEvent::Message(message) => self.append_message(message),
            ServerEvent::UpdateMessage(edit) => Ok(self.update_message(edit)),
            ServerEvent::Reaction(reaction) => self.apply_reaction(reaction),
            ServerEvent::UpdateFlags(change) => self.update_flags(change),
            ServerEvent::Subscription(change) => Ok(self.update_subscription(change)),
            ServerEvent::Typing(typing) => Ok(self.typing(typing)),
            ServerEvent::MutedTopics(topics) => {
                let mut outcome = ApplyOutcome::redraw(Redraw::FullScreen);
                if self.set_muted_topics_by_name(&topics) {
                    outcome.push(Redraw::Counts);
                }
                Ok(outcome)
            }
        }
    }

    pub fn append_message(&mut self, message: Message) -> Result<ApplyOutcome> {
        let id = message.id;
        let is_self = message.sender_id == self.my_id();
        let hidden = message
            .stream_topic()
            .is_some_and(|(sid, topic)| self.mutes.hides(sid, topic));
        let in_view = self.current_narrow_contains_message(&message);
        let notification = if is_self || hidden {
            None
        } else {
            self.notification_for(&message)
        };
        let unread = !is_self && !message.is_read();

        self.index
            .index_live_message(message, &self.narrow, &self.mutes);

        let mut outcome = ApplyOutcome {
            redraws: Vec::new(),
            notification,
        };
        if in_view {
            self.displayed.insert(id);
            outcome.push(Redraw::Append(id));
        }
        if unread {
            let my_id = self.my_id();
            let streams = apply_count_delta(&mut self.unread, &self.index, &[id], 1, my_id, &self.mutes)?;
            outcome.push(Redraw::Counts);
            for stream_id in streams {
                outcome.push(Redraw::StreamBadge(stream_id));
            }
        }
        debug!("Appended message {} (in view: {}, unread: {})", id, in_view, unread);
        Ok(outcome)
    }

    pub fn update_message(&mut self, edit: MessageEdit) -> ApplyOutcome {
        let mut outcome = ApplyOutcome::none();
        let mut changed: Vec<MessageId> = Vec::new();

        self.index.mark_edited(edit.message_id);

        if let Some(content) = edit.rendered_content {
            if let Some(message) = self.index.get_mut(edit.message_id) {
                message.content = content;
                changed.push(edit.message_id);
            }
        }

        // Edits may omit the stream and original topic; the stored message has both
        let stored = self
            .index
            .get(edit.message_id)
            .and_then(|m| m.stream_topic())
            .map(|(sid, topic)| (sid, topic.to_string()));
        let stream_id = edit.stream_id.or(stored.as_ref().map(|(sid, _)| *sid));
        let orig_topic = edit
            .orig_topic
            .clone()
            .or(stored.map(|(_, topic)| topic))
            .unwrap_or_default();

        if let (Some(new_topic), Some(stream_id)) = (&edit.new_topic, stream_id) {
            let old_topic = orig_topic.as_str();
            let mut ids = edit.message_ids.clone();
            if !ids.contains(&edit.message_id) {
                ids.push(edit.message_id);
            }
            if new_topic != old_topic {
                self.index.move_topic(&ids, stream_id, old_topic, new_topic);
                self.index.touch_topic(stream_id, new_topic);
                debug!(
                    "Moved {} messages in stream {} from {:?} to {:?}",
                    ids.len(),
                    stream_id,
                    old_topic,
                    new_topic
                );
            }
            changed.extend(ids.into_iter().filter(|id| self.index.contains(*id)));
        }

        for id in changed {
            if let Some(redraw) = self.rendered_view_update(id) {
                outcome.push(redraw);
            }
        }
        outcome
    }

    pub fn apply_reaction(&mut self, event: ReactionEvent) -> Result<ApplyOutcome> {
        let Some(message) = self.index.get_mut(event.message_id) else {
            trace!("Reaction for unindexed message {} skipped", event.message_id);
            return Ok(ApplyOutcome::none());
        };
        let reaction = event.reaction;

        match event.op {
            Op::Add => {
                if message.has_reaction(reaction.user_id, &reaction.emoji_code) {
                    return Err(CoreError::InvalidReaction {
                        message_id: event.message_id,
                        user_id: reaction.user_id,
                        emoji_code: reaction.emoji_code,
                    });
                }
                message.reactions.push(reaction);
            }
            Op::Remove => {
                let position = message.reactions.iter().position(|r| {
                    r.user_id == reaction.user_id && r.emoji_code == reaction.emoji_code
                });
                match position {
                    Some(position) => {
                        message.reactions.remove(position);
                    }
                    None => return Ok(ApplyOutcome::none()),
                }
            }
        }

        Ok(self
            .rendered_view_update(event.message_id)
            .map(ApplyOutcome::redraw)
            .unwrap_or_default())
    }

    /// Flags only change for indexed messages; the rest of the batch may be
    /// history we never fetched. Marking unread (`read` + remove) is ignored.
    pub fn update_flags(&mut self, change: FlagChange) -> Result<ApplyOutcome> {
        let mut outcome = ApplyOutcome::none();
        if change.flag == MessageFlag::Read && change.op == Op::Remove {
            trace!("Ignoring read flag removal for {} messages", change.messages.len());
            return Ok(outcome);
        }

        let mut newly_read = Vec::new();
        for &id in &change.messages {
            let Some(message) = self.index.get_mut(id) else {
                trace!("Flag change for unindexed message {} skipped", id);
                continue;
            };
            let changed = match change.op {
                Op::Add => message.add_flag(change.flag),
                Op::Remove => message.remove_flag(change.flag),
            };
            let mentioned = message.is_mentioned();

            match change.flag {
                MessageFlag::Read if changed => newly_read.push(id),
                MessageFlag::Starred => self.index.set_starred(id, change.op == Op::Add),
                MessageFlag::Mentioned | MessageFlag::WildcardMentioned => {
                    self.index.set_mentioned(id, mentioned)
                }
                _ => {}
            }
            if changed {
                if let Some(redraw) = self.rendered_view_update(id) {
                    outcome.push(redraw);
                }
            }
        }

        if !newly_read.is_empty() {
            let my_id = self.my_id();
            let streams = apply_count_delta(&mut self.unread, &self.index, &newly_read, -1, my_id, &self.mutes)?;
            outcome.push(Redraw::Counts);
            for stream_id in streams {
                outcome.push(Redraw::StreamBadge(stream_id));
            }
        }
        debug!(
            "Flag {} {:?} applied, {} newly read",
            change.flag.as_wire(),
            change.op,
            newly_read.len()
        );
        Ok(outcome)
    }

    pub fn update_subscription(&mut self, change: SubscriptionChange) -> ApplyOutcome {
        let mut outcome = ApplyOutcome::none();
        match change {
            SubscriptionChange::Update { stream_id, property } => match property {
                SubscriptionProperty::Muted(muted) => {
                    self.directory.set_stream_muted(stream_id, muted);
                    if self.mutes.set_stream_muted(stream_id, muted) {
                        // Muting leaves already-counted totals alone
                        if !muted {
                            self.unread.recompute_totals(&self.mutes);
                        }
                        outcome.push(Redraw::StreamBadge(stream_id));
                        outcome.push(Redraw::Counts);
                        outcome.push(Redraw::FullScreen);
                    }
                }
                SubscriptionProperty::PinToTop(pinned) => {
                    self.directory.set_pinned(stream_id, pinned);
                    outcome.push(Redraw::StreamBadge(stream_id));
                }
                SubscriptionProperty::DesktopNotifications(enabled) => {
                    self.directory.set_visual_notified(stream_id, enabled);
                    outcome.push(Redraw::StreamBadge(stream_id));
                }
                SubscriptionProperty::Other(name) => {
                    trace!("Ignoring subscription property {}", name);
                }
            },
            SubscriptionChange::Add(subscriptions) => {
                for sub in subscriptions {
                    if sub.is_muted {
                        self.mutes.set_stream_muted(sub.stream_id, true);
                    }
                    outcome.push(Redraw::StreamBadge(sub.stream_id));
                    self.directory.add_subscription(sub);
                }
                outcome.push(Redraw::FullScreen);
            }
            SubscriptionChange::Remove(stream_ids) => {
                for stream_id in stream_ids {
                    if self.directory.remove_subscription(stream_id).is_none() {
                        warn!("Unsubscribed from unknown stream {}", stream_id);
                    }
                }
                outcome.push(Redraw::FullScreen);
            }
        }
        outcome
    }

    pub fn typing(&mut self, event: TypingEvent) -> ApplyOutcome {
        let Narrow::DirectWith { emails } = &self.narrow.narrow else {
            return ApplyOutcome::none();
        };
        let sender_email = event.sender.email.to_lowercase();
        if event.sender.id == self.my_id() || !emails.contains(&sender_email) {
            return ApplyOutcome::none();
        }
        match event.op {
            TypingOp::Start => {
                let sender_name = self
                    .directory
                    .user_name(event.sender.id)
                    .map(str::to_string)
                    .unwrap_or(event.sender.full_name);
                ApplyOutcome::redraw(Redraw::Typing { sender_name })
            }
            TypingOp::Stop => ApplyOutcome::redraw(Redraw::TypingStopped),
        }
    }

    /// Redraw for a changed message: nothing when it is not on screen, a
    /// removal when it no longer matches the topic being viewed.
    fn rendered_view_update(&mut self, id: MessageId) -> Option<Redraw> {
        if !self.displayed.contains(&id) {
            return None;
        }
        let message = self.index.get(id)?;
        let left_topic = match &self.narrow.narrow {
            Narrow::Topic { topic, .. } => message.topic() != Some(topic.as_str()),
            _ => false,
        };
        if left_topic {
            self.displayed.remove(&id);
            Some(Redraw::Remove(id))
        } else {
            Some(Redraw::Replace(id))
        }
    }

    fn notification_for(&self, message: &Message) -> Option<Notification> {
        let recipient = match &message.kind {
            MessageKind::Private { recipients } => {
                let mut targets = vec!["you".to_string()];
                if recipients.len() > 2 {
                    targets.extend(
                        recipients
                            .iter()
                            .filter(|r| r.id != self.my_id() && r.id != message.sender_id)
                            .map(|r| r.full_name.clone()),
                    );
                }
                targets.join(", ")
            }
            MessageKind::Stream {
                stream_id,
                stream_name,
                topic,
            } => {
                if !message.is_mentioned() && !self.directory.is_visual_notified(*stream_id) {
                    return None;
                }
                format!("{stream_name} -> {topic}")
            }
        };

        let body = if message.is_private() && self.hide_private_content {
            format!("New direct message from {}", message.sender_full_name)
        } else {
            strip_html(&message.content)
        };
        Some(Notification {
            title: format!("{} (to {})", message.sender_full_name, recipient),
            body,
        })
    }
}

/// Plain-text approximation of rendered message HTML.
pub fn strip_html(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }
    text.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CoreConfig;
    use crate::models::{Reaction, Recipient, UnreadSnapshot, UnreadStreamTopic};
    use crate::test_fixtures::{dm, email, read, snapshot, stream_msg, user, ME};

    fn store_with(unread: UnreadSnapshot) -> ChatStore {
        ChatStore::from_snapshot(&snapshot(unread), &CoreConfig::default())
    }

    fn store() -> ChatStore {
        store_with(UnreadSnapshot::default())
    }

    fn thumbs_up(user_id: u64) -> Reaction {
        Reaction {
            user_id,
            user_name: None,
            emoji_name: "thumbs_up".to_string(),
            emoji_code: "1f44d".to_string(),
            reaction_type: "unicode_emoji".to_string(),
        }
    }

    fn topic_edit(ids: &[MessageId], stream_id: u64, old: &str, new: &str) -> MessageEdit {
        MessageEdit {
            message_id: ids[0],
            rendered_content: None,
            new_topic: Some(new.to_string()),
            orig_topic: Some(old.to_string()),
            stream_id: Some(stream_id),
            message_ids: ids.to_vec(),
        }
    }

    fn typing(op: TypingOp, sender: u64) -> TypingEvent {
        let u = user(sender);
        TypingEvent {
            op,
            sender: Recipient {
                id: u.id,
                email: u.email,
                full_name: u.full_name,
            },
            recipients: Vec::new(),
        }
    }

    #[test]
    fn test_append_in_view_counts_and_notifies() {
        let mut store = store();
        store.narrow_to(&Narrow::AllMessages, None).unwrap();
        let outcome = store.append_message(dm(10, 2, &[ME, 2])).unwrap();

        assert_eq!(outcome.redraws[0], Redraw::Append(10));
        assert!(outcome.redraws.contains(&Redraw::Counts));
        assert_eq!(store.unread_counts().all_pms, 1);
        assert_eq!(store.unread_counts().pm_count(2), 1);
        let notification = outcome.notification.unwrap();
        assert_eq!(notification.title, "User 2 (to you)");
        assert_eq!(notification.body, "message 10");
    }

    // A self-sent message is shown but never counted.
    #[test]
    fn test_scenario_b_self_sent_append() {
        let mut store = store();
        let before = store.unread_counts().clone();
        let outcome = store.append_message(dm(10, ME, &[ME, 2])).unwrap();

        assert_eq!(outcome.redraws, vec![Redraw::Append(10)]);
        assert!(outcome.notification.is_none());
        assert_eq!(store.unread_counts(), &before);
    }

    #[test]
    fn test_append_outside_view_is_invisible() {
        let mut store = store();
        store.narrow_to(&Narrow::stream("general"), None).unwrap();
        let outcome = store.append_message(read(stream_msg(10, 5, "intro"))).unwrap();
        assert!(!outcome.is_visible());
        assert!(store.index().all_msg_ids().contains(&10));
    }

    #[test]
    fn test_append_to_muted_stream_is_silent() {
        let mut store = store();
        store.update_subscription(SubscriptionChange::Update {
            stream_id: 7,
            property: SubscriptionProperty::Muted(true),
        });
        let before = store.unread_counts().all_msg;
        let outcome = store.append_message(stream_msg(10, 7, "intro")).unwrap();
        assert!(outcome.notification.is_none());
        assert!(!outcome.redraws.contains(&Redraw::Append(10)));
        assert_eq!(store.unread_counts().all_msg, before);
        assert_eq!(store.unread_counts().topic_count(7, "intro"), 1);
    }

    #[test]
    fn test_stream_notification_needs_mention_or_setting() {
        let mut store = store();
        let outcome = store.append_message(stream_msg(10, 5, "intro")).unwrap();
        assert!(outcome.notification.is_none());

        let mut mention = stream_msg(11, 5, "intro");
        mention.add_flag(MessageFlag::Mentioned);
        let outcome = store.append_message(mention).unwrap();
        assert_eq!(outcome.notification.unwrap().title, "User 2 (to design -> intro)");

        store.update_subscription(SubscriptionChange::Update {
            stream_id: 6,
            property: SubscriptionProperty::DesktopNotifications(true),
        });
        let outcome = store.append_message(stream_msg(12, 6, "lunch")).unwrap();
        assert!(outcome.notification.is_some());
    }

    #[test]
    fn test_hidden_private_content() {
        let snap = snapshot(UnreadSnapshot::default());
        let config = CoreConfig {
            hide_private_content: true,
            ..CoreConfig::default()
        };
        let mut store = ChatStore::from_snapshot(&snap, &config);
        let outcome = store.append_message(dm(10, 2, &[ME, 2, 3])).unwrap();
        let notification = outcome.notification.unwrap();
        assert_eq!(notification.title, "User 2 (to you, User 3)");
        assert_eq!(notification.body, "New direct message from User 2");
    }

    // A topic edit propagated to two messages moves both buckets entries.
    #[test]
    fn test_scenario_c_topic_edit_moves_ids() {
        let mut store = store();
        let narrow = Narrow::topic("S", "old");
        store.narrow_to(&narrow, None).unwrap();
        store
            .index_fetched(vec![stream_msg(1, 9, "old"), stream_msg(2, 9, "old")], &narrow)
            .unwrap();
        store.refresh_view(None);

        let outcome = store.update_message(topic_edit(&[1, 2], 9, "old", "new"));

        let index = store.index();
        assert!(!index.topic_msg_ids(9, "old").unwrap().contains(&1));
        assert!(!index.topic_msg_ids(9, "old").unwrap().contains(&2));
        assert_eq!(index.topic_msg_ids(9, "new").map(|s| s.len()), Some(2));
        assert!(index.is_edited(1));
        assert_eq!(store.topics_in_stream(9)[0], "new");
        assert_eq!(outcome.redraws, vec![Redraw::Remove(1), Redraw::Remove(2)]);
        assert!(index.check_consistency().is_ok());
    }

    #[test]
    fn test_topic_edit_without_stream_or_original_topic() {
        let mut store = store();
        let narrow = Narrow::topic("design", "old");
        store.narrow_to(&narrow, None).unwrap();
        store.index_fetched(vec![stream_msg(1, 5, "old")], &narrow).unwrap();

        store.update_message(MessageEdit {
            message_id: 1,
            new_topic: Some("new".to_string()),
            message_ids: vec![1],
            ..MessageEdit::default()
        });

        let index = store.index();
        assert!(index.topic_msg_ids(5, "old").unwrap().is_empty());
        assert!(index.topic_msg_ids(5, "new").unwrap().contains(&1));
        assert_eq!(store.message(1).unwrap().topic(), Some("new"));
        assert!(index.is_edited(1));
        assert!(index.check_consistency().is_ok());
    }

    #[test]
    fn test_topic_edit_round_trip_resolution() {
        let mut store = store();
        store.append_message(read(stream_msg(1, 9, "old"))).unwrap();
        store.narrow_to(&Narrow::topic("S", "old"), None).unwrap();
        store.index_fetched(vec![read(stream_msg(1, 9, "old"))], &Narrow::topic("S", "old")).unwrap();

        store.update_message(topic_edit(&[1], 9, "old", "new"));

        assert!(store.narrow_to(&Narrow::topic("S", "old"), None).unwrap().ids.is_empty());
        assert_eq!(store.narrow_to(&Narrow::topic("S", "new"), None).unwrap().ids, vec![1]);
    }

    #[test]
    fn test_content_edit_replaces_displayed() {
        let mut store = store();
        store.append_message(read(stream_msg(1, 5, "intro"))).unwrap();
        let outcome = store.update_message(MessageEdit {
            message_id: 1,
            rendered_content: Some("<p>fixed</p>".to_string()),
            message_ids: vec![1],
            ..MessageEdit::default()
        });
        assert_eq!(outcome.redraws, vec![Redraw::Replace(1)]);
        assert_eq!(store.message(1).unwrap().content, "<p>fixed</p>");
    }

    #[test]
    fn test_edit_of_unindexed_message_is_ignored() {
        let mut store = store();
        let outcome = store.update_message(topic_edit(&[50], 9, "old", "new"));
        assert!(!outcome.is_visible());
        assert!(!store.index().is_edited(50));
    }

    #[test]
    fn test_reactions_toggle() {
        let mut store = store();
        store.append_message(read(stream_msg(1, 5, "intro"))).unwrap();

        let add = ReactionEvent {
            op: Op::Add,
            message_id: 1,
            reaction: thumbs_up(3),
        };
        let outcome = store.apply_reaction(add.clone()).unwrap();
        assert_eq!(outcome.redraws, vec![Redraw::Replace(1)]);

        let err = store.apply_reaction(add).unwrap_err();
        assert!(matches!(err, CoreError::InvalidReaction { .. }));
        assert_eq!(store.message(1).unwrap().reactions.len(), 1);

        store
            .apply_reaction(ReactionEvent {
                op: Op::Remove,
                message_id: 1,
                reaction: thumbs_up(3),
            })
            .unwrap();
        assert!(store.message(1).unwrap().reactions.is_empty());

        let skipped = store
            .apply_reaction(ReactionEvent {
                op: Op::Add,
                message_id: 99,
                reaction: thumbs_up(3),
            })
            .unwrap();
        assert!(!skipped.is_visible());
    }

    #[test]
    fn test_read_flags_decrement_once() {
        let unread = UnreadSnapshot {
            streams: vec![UnreadStreamTopic {
                stream_id: 5,
                topic: "intro".to_string(),
                unread_message_ids: vec![1, 2],
            }],
            ..UnreadSnapshot::default()
        };
        let mut store = store_with(unread);
        let narrow = Narrow::topic("design", "intro");
        store
            .index_fetched(vec![stream_msg(1, 5, "intro"), stream_msg(2, 5, "intro")], &narrow)
            .unwrap();

        let change = FlagChange {
            messages: vec![1, 77],
            flag: MessageFlag::Read,
            op: Op::Add,
        };
        store.update_flags(change.clone()).unwrap();
        assert_eq!(store.unread_counts().topic_count(5, "intro"), 1);
        store.update_flags(change).unwrap();
        assert_eq!(store.unread_counts().topic_count(5, "intro"), 1);
        assert_eq!(store.unread_counts().all_msg, 1);

        let outcome = store
            .update_flags(FlagChange {
                messages: vec![1],
                flag: MessageFlag::Read,
                op: Op::Remove,
            })
            .unwrap();
        assert!(!outcome.is_visible());
        assert!(store.message(1).unwrap().is_read());
    }

    #[test]
    fn test_starred_flag_updates_set() {
        let mut store = store();
        store.append_message(read(stream_msg(1, 5, "intro"))).unwrap();
        store
            .update_flags(FlagChange {
                messages: vec![1],
                flag: MessageFlag::Starred,
                op: Op::Add,
            })
            .unwrap();
        assert!(store.index().starred_msg_ids().contains(&1));

        store
            .update_flags(FlagChange {
                messages: vec![1],
                flag: MessageFlag::Starred,
                op: Op::Remove,
            })
            .unwrap();
        assert!(store.index().starred_msg_ids().is_empty());
    }

    #[test]
    fn test_unmute_recomputes_totals() {
        let unread = UnreadSnapshot {
            streams: vec![UnreadStreamTopic {
                stream_id: 7,
                topic: "lunch".to_string(),
                unread_message_ids: vec![1, 2, 3],
            }],
            ..UnreadSnapshot::default()
        };
        let mut store = store_with(unread);
        let mute = |muted| SubscriptionChange::Update {
            stream_id: 7,
            property: SubscriptionProperty::Muted(muted),
        };

        let outcome = store.update_subscription(mute(true));
        assert!(outcome.redraws.contains(&Redraw::FullScreen));
        assert_eq!(store.unread_counts().all_msg, 3);

        store.update_subscription(mute(false));
        assert_eq!(store.unread_counts().all_msg, 3);
        assert!(!store.mutes().is_muted_stream(7));
    }

    #[test]
    fn test_unmuting_topic_restores_totals_before_reads() {
        let unread = UnreadSnapshot {
            streams: vec![
                UnreadStreamTopic {
                    stream_id: 5,
                    topic: "lunch".to_string(),
                    unread_message_ids: vec![1, 2],
                },
                UnreadStreamTopic {
                    stream_id: 5,
                    topic: "intro".to_string(),
                    unread_message_ids: vec![3],
                },
            ],
            ..UnreadSnapshot::default()
        };
        let mut snap = snapshot(unread);
        snap.muted_topics = vec![("design".to_string(), "lunch".to_string())];
        let mut store = ChatStore::from_snapshot(&snap, &CoreConfig::default());
        assert_eq!(store.unread_counts().all_msg, 1);

        let outcome = store.apply(ServerEvent::MutedTopics(Vec::new())).unwrap();
        assert!(outcome.redraws.contains(&Redraw::Counts));
        assert_eq!(store.unread_counts().all_msg, 3);

        let narrow = Narrow::topic("design", "lunch");
        store
            .index_fetched(vec![stream_msg(1, 5, "lunch"), stream_msg(2, 5, "lunch")], &narrow)
            .unwrap();
        store
            .update_flags(FlagChange {
                messages: vec![1, 2],
                flag: MessageFlag::Read,
                op: Op::Add,
            })
            .unwrap();
        assert_eq!(store.unread_counts().all_msg, 1);
        assert_eq!(store.unread_counts().topic_count(5, "intro"), 1);
    }

    #[test]
    fn test_subscription_add_remove() {
        let mut store = store();
        let mut sub = crate::test_fixtures::subscription(20, "new-stream");
        sub.pin_to_top = true;
        store.update_subscription(SubscriptionChange::Add(vec![sub]));
        assert_eq!(store.directory().stream_order()[0], 20);

        store.update_subscription(SubscriptionChange::Remove(vec![20]));
        assert!(!store.directory().is_subscribed(20));
    }

    #[test]
    fn test_typing_only_in_matching_dm() {
        let mut store = store();
        assert!(!store.typing(typing(TypingOp::Start, 2)).is_visible());

        store.narrow_to(&Narrow::direct_with([email(2)]), None).unwrap();
        assert_eq!(
            store.typing(typing(TypingOp::Start, 2)).redraws,
            vec![Redraw::Typing {
                sender_name: "User 2".to_string()
            }]
        );
        assert_eq!(store.typing(typing(TypingOp::Stop, 2)).redraws, vec![Redraw::TypingStopped]);
        assert!(!store.typing(typing(TypingOp::Start, 3)).is_visible());
        assert!(!store.typing(typing(TypingOp::Start, ME)).is_visible());
    }

    // A first visit to a new conversation leaves a bucket that live messages fill.
    #[test]
    fn test_scenario_e_new_direct_bucket() {
        let mut store = store();
        let view = store.narrow_to(&Narrow::direct_with([email(3)]), None).unwrap();
        assert!(view.ids.is_empty());
        let participants = [ME, 3].into_iter().collect();
        assert!(store.index().private_msg_ids_by_user_ids(&participants).is_some());

        store.narrow_to(&Narrow::AllMessages, None).unwrap();
        store.append_message(dm(10, 3, &[ME, 3])).unwrap();

        let view = store.narrow_to(&Narrow::direct_with([email(3)]), None).unwrap();
        assert_eq!(view.ids, vec![10]);
    }

    #[test]
    fn test_muted_topics_event_requests_full_redraw() {
        let mut store = store();
        let outcome = store
            .apply(ServerEvent::MutedTopics(vec![("design".to_string(), "lunch".to_string())]))
            .unwrap();
        assert_eq!(outcome.redraws, vec![Redraw::FullScreen]);
        assert!(store.mutes().is_muted_topic(5, "lunch"));
    }

    #[test]
    fn test_strip_html() {
        assert_eq!(strip_html("<p>a &amp; <b>b</b></p>"), "a & b");
    }
}
