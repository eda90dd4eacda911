use crate::models::{
    Message, MessageFlag, MessageId, Reaction, Recipient, StreamId, Subscription,
};

/// A server event after normalization, ready for the appliers.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    Message(Message),
    UpdateMessage(MessageEdit),
    Reaction(ReactionEvent),
    UpdateFlags(FlagChange),
    Subscription(SubscriptionChange),
    Typing(TypingEvent),
    /// Full replacement of the muted topic list, by stream name
    MutedTopics(Vec<(String, String)>),
}

impl ServerEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            ServerEvent::Message(_) => "message",
            ServerEvent::UpdateMessage(_) => "update_message",
            ServerEvent::Reaction(_) => "reaction",
            ServerEvent::UpdateFlags(_) => "update_message_flags",
            ServerEvent::Subscription(_) => "subscription",
            ServerEvent::Typing(_) => "typing",
            ServerEvent::MutedTopics(_) => "muted_topics",
        }
    }
}

/// Only the fields present in the edit are applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageEdit {
    pub message_id: MessageId,
    pub rendered_content: Option<String>,
    pub new_topic: Option<String>,
    pub orig_topic: Option<String>,
    pub stream_id: Option<StreamId>,
    /// Every message the edit applies to; for topic moves this can span
    /// "change later/all" propagation. Includes `message_id`.
    pub message_ids: Vec<MessageId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Add,
    Remove,
}

impl Op {
    pub fn from_wire(op: &str) -> Option<Self> {
        match op {
            "add" => Some(Op::Add),
            "remove" => Some(Op::Remove),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReactionEvent {
    pub op: Op,
    pub message_id: MessageId,
    pub reaction: Reaction,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlagChange {
    pub messages: Vec<MessageId>,
    pub flag: MessageFlag,
    pub op: Op,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubscriptionProperty {
    Muted(bool),
    PinToTop(bool),
    DesktopNotifications(bool),
    Other(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubscriptionChange {
    Update {
        stream_id: StreamId,
        property: SubscriptionProperty,
    },
    Add(Vec<Subscription>),
    Remove(Vec<StreamId>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypingOp {
    Start,
    Stop,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypingEvent {
    pub op: TypingOp,
    pub sender: Recipient,
    pub recipients: Vec<Recipient>,
}

/// Minimal instruction for the renderer after an event has been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Redraw {
    /// A new message joined the displayed narrow
    Append(MessageId),
    /// A displayed message changed in place
    Replace(MessageId),
    /// A displayed message no longer belongs to the narrow
    Remove(MessageId),
    StreamBadge(StreamId),
    /// Unread totals changed
    Counts,
    Typing { sender_name: String },
    TypingStopped,
    FullScreen,
}

/// Desktop notification request for the outer layer to deliver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

/// Result of applying one event. An empty `redraws` means no visible change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyOutcome {
    pub redraws: Vec<Redraw>,
    pub notification: Option<Notification>,
}

impl ApplyOutcome {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn redraw(redraw: Redraw) -> Self {
        Self {
            redraws: vec![redraw],
            notification: None,
        }
    }

    pub fn push(&mut self, redraw: Redraw) {
        if !self.redraws.contains(&redraw) {
            self.redraws.push(redraw);
        }
    }

    pub fn is_visible(&self) -> bool {
        !self.redraws.is_empty()
    }
}

/// Sent from the listener thread to the UI.
#[derive(Debug)]
pub enum DataChange {
    Applied(ApplyOutcome),
    /// Queued until the view is ready
    Buffered,
    /// The event stream ended; no further updates will arrive
    ConnectionLost(String),
    /// An index invariant broke; the index must not be trusted
    Fatal(String),
}
