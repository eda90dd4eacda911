pub mod directory;
pub mod message;
pub mod narrow;
pub mod snapshot;
pub mod unread;

pub use directory::{Directory, MuteState, Subscription, User};
pub use message::{
    Message, MessageFlag, MessageId, MessageKind, ParticipantSet, Reaction, Recipient, StreamId,
    TopicLink, UserId,
};
pub use narrow::{Narrow, NarrowKey, ResolvedNarrow};
pub use snapshot::{InitialSnapshot, UnreadHuddle, UnreadPm, UnreadSnapshot, UnreadStreamTopic};
pub use unread::{UnreadCounts, UnreadKey};
