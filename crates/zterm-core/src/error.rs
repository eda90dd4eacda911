use crate::models::MessageId;

pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Registration or event polling against the server failed.
    #[error("server connection failure: {0}")]
    ServerConnectionFailure(String),

    #[error("message {message_id} has unsupported type {kind:?}")]
    InvalidMessageType { message_id: MessageId, kind: String },

    /// A count delta referenced a message that was never indexed.
    #[error("message {0} is not indexed")]
    MissingMessage(MessageId),

    #[error("unknown stream: {0}")]
    UnknownStream(String),

    #[error("unknown user: {0}")]
    UnknownUser(String),

    #[error("user {user_id} already reacted with {emoji_code} on message {message_id}")]
    InvalidReaction {
        message_id: MessageId,
        user_id: u64,
        emoji_code: String,
    },

    #[error("index has not been built from a snapshot yet")]
    NotReady,

    #[error("pre-view event buffer exceeded {0} events")]
    EventBufferOverflow(usize),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    /// Fatal errors mean the index can no longer be trusted or fed.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CoreError::ServerConnectionFailure(_)
                | CoreError::InvalidMessageType { .. }
                | CoreError::MissingMessage(_)
                | CoreError::EventBufferOverflow(_)
                | CoreError::Http(_)
        )
    }
}
