use std::collections::{HashMap, HashSet};

use super::message::{ParticipantSet, StreamId, UserId};
use crate::error::{CoreError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub full_name: String,
    pub is_bot: bool,
}

/// A stream the current user is subscribed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub stream_id: StreamId,
    pub name: String,
    pub description: String,
    pub color: String,
    pub is_muted: bool,
    pub pin_to_top: bool,
    pub desktop_notifications: bool,
}

/// Users and subscribed streams, used to resolve narrows and label notifications.
#[derive(Debug, Clone)]
pub struct Directory {
    me: User,
    users_by_email: HashMap<String, User>,
    emails_by_id: HashMap<UserId, String>,
    streams: HashMap<StreamId, Subscription>,
    stream_ids_by_name: HashMap<String, StreamId>,
    pinned: HashSet<StreamId>,
    visual_notified: HashSet<StreamId>,
}

impl Directory {
    pub fn new(me: User) -> Self {
        let mut directory = Self {
            me: me.clone(),
            users_by_email: HashMap::new(),
            emails_by_id: HashMap::new(),
            streams: HashMap::new(),
            stream_ids_by_name: HashMap::new(),
            pinned: HashSet::new(),
            visual_notified: HashSet::new(),
        };
        directory.add_user(me);
        directory
    }

    pub fn add_user(&mut self, user: User) {
        let email = user.email.to_lowercase();
        self.emails_by_id.insert(user.id, email.clone());
        self.users_by_email.insert(email, user);
    }

    pub fn add_subscription(&mut self, subscription: Subscription) {
        let stream_id = subscription.stream_id;
        if subscription.pin_to_top {
            self.pinned.insert(stream_id);
        }
        if subscription.desktop_notifications {
            self.visual_notified.insert(stream_id);
        }
        self.stream_ids_by_name
            .insert(subscription.name.clone(), stream_id);
        self.streams.insert(stream_id, subscription);
    }

    pub fn remove_subscription(&mut self, stream_id: StreamId) -> Option<Subscription> {
        let removed = self.streams.remove(&stream_id)?;
        self.stream_ids_by_name.remove(&removed.name);
        self.pinned.remove(&stream_id);
        self.visual_notified.remove(&stream_id);
        Some(removed)
    }

    // ===== Getters =====

    pub fn me(&self) -> &User {
        &self.me
    }

    pub fn my_id(&self) -> UserId {
        self.me.id
    }

    pub fn user_by_email(&self, email: &str) -> Option<&User> {
        self.users_by_email.get(&email.to_lowercase())
    }

    pub fn user_by_id(&self, user_id: UserId) -> Option<&User> {
        self.emails_by_id
            .get(&user_id)
            .and_then(|email| self.users_by_email.get(email))
    }

    pub fn user_name(&self, user_id: UserId) -> Option<&str> {
        self.user_by_id(user_id).map(|u| u.full_name.as_str())
    }

    pub fn subscription(&self, stream_id: StreamId) -> Option<&Subscription> {
        self.streams.get(&stream_id)
    }

    pub fn stream_id_for_name(&self, name: &str) -> Option<StreamId> {
        self.stream_ids_by_name.get(name).copied()
    }

    pub fn stream_name(&self, stream_id: StreamId) -> Option<&str> {
        self.streams.get(&stream_id).map(|s| s.name.as_str())
    }

    pub fn is_subscribed(&self, stream_id: StreamId) -> bool {
        self.streams.contains_key(&stream_id)
    }

    pub fn is_pinned(&self, stream_id: StreamId) -> bool {
        self.pinned.contains(&stream_id)
    }

    pub fn is_visual_notified(&self, stream_id: StreamId) -> bool {
        self.visual_notified.contains(&stream_id)
    }

    /// Subscribed streams in sidebar order: pinned first, then the rest, each
    /// group sorted case-insensitively by name.
    pub fn stream_order(&self) -> Vec<StreamId> {
        let mut streams: Vec<&Subscription> = self.streams.values().collect();
        streams.sort_by(|a, b| {
            let a_pinned = self.pinned.contains(&a.stream_id);
            let b_pinned = self.pinned.contains(&b.stream_id);
            b_pinned
                .cmp(&a_pinned)
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        });
        streams.into_iter().map(|s| s.stream_id).collect()
    }

    /// Resolve the emails of a direct conversation into its participant set,
    /// which always includes the current user.
    pub fn participants_for_emails(&self, emails: &[String]) -> Result<ParticipantSet> {
        let mut participants = ParticipantSet::new();
        participants.insert(self.me.id);
        for email in emails {
            let user = self
                .user_by_email(email)
                .ok_or_else(|| CoreError::UnknownUser(email.clone()))?;
            participants.insert(user.id);
        }
        Ok(participants)
    }

    // ===== Setters =====

    pub fn set_stream_muted(&mut self, stream_id: StreamId, muted: bool) {
        if let Some(sub) = self.streams.get_mut(&stream_id) {
            sub.is_muted = muted;
        }
    }

    pub fn set_pinned(&mut self, stream_id: StreamId, pinned: bool) {
        if let Some(sub) = self.streams.get_mut(&stream_id) {
            sub.pin_to_top = pinned;
            if pinned {
                self.pinned.insert(stream_id);
            } else {
                self.pinned.remove(&stream_id);
            }
        }
    }

    pub fn set_visual_notified(&mut self, stream_id: StreamId, enabled: bool) {
        if let Some(sub) = self.streams.get_mut(&stream_id) {
            sub.desktop_notifications = enabled;
            if enabled {
                self.visual_notified.insert(stream_id);
            } else {
                self.visual_notified.remove(&stream_id);
            }
        }
    }
}

/// Muted streams and topics. Muting never moves ids between index buckets; it
/// only changes what the aggregate views and unread totals consider visible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MuteState {
    muted_streams: HashSet<StreamId>,
    muted_topics: HashSet<(StreamId, String)>,
}

impl MuteState {
    pub fn is_muted_stream(&self, stream_id: StreamId) -> bool {
        self.muted_streams.contains(&stream_id)
    }

    pub fn is_muted_topic(&self, stream_id: StreamId, topic: &str) -> bool {
        self.muted_topics
            .contains(&(stream_id, topic.to_string()))
    }

    /// True when either the stream or this topic within it is muted.
    pub fn hides(&self, stream_id: StreamId, topic: &str) -> bool {
        self.is_muted_stream(stream_id) || self.is_muted_topic(stream_id, topic)
    }

    /// Returns true if the state actually changed.
    pub fn set_stream_muted(&mut self, stream_id: StreamId, muted: bool) -> bool {
        if muted {
            self.muted_streams.insert(stream_id)
        } else {
            self.muted_streams.remove(&stream_id)
        }
    }

    pub fn set_muted_topics<I>(&mut self, topics: I)
    where
        I: IntoIterator<Item = (StreamId, String)>,
    {
        self.muted_topics = topics.into_iter().collect();
    }

    pub fn muted_topics(&self) -> impl Iterator<Item = &(StreamId, String)> {
        self.muted_topics.iter()
    }

    pub fn muted_streams(&self) -> impl Iterator<Item = &StreamId> {
        self.muted_streams.iter()
    }

    pub fn muted_topic_count(&self) -> usize {
        self.muted_topics.len()
    }
}
