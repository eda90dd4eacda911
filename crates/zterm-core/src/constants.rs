//! Application-wide constants
//!
//! Narrow operators and fetch windows shared by the core and the terminal UI.

/// Anchor meaning "newest message" for message fetches
pub const ANCHOR_NEWEST: u64 = 10_000_000_000_000_000;

/// Messages fetched before the anchor when a narrow needs data
pub const FETCH_NUM_BEFORE: u32 = 30;

/// Messages fetched after the anchor when a narrow needs data
pub const FETCH_NUM_AFTER: u32 = 10;

/// Upper bound on events queued before the view is constructed
pub const EVENT_BUFFER_CAPACITY: usize = 4096;

/// Event types the client registers for
pub const EVENT_TYPES: &[&str] = &[
    "message",
    "update_message",
    "reaction",
    "subscription",
    "typing",
    "update_message_flags",
    "muted_topics",
];

/// Initial data requested at registration
pub const FETCH_EVENT_TYPES: &[&str] = &[
    "realm",
    "subscription",
    "message",
    "update_message_flags",
    "muted_topics",
    "realm_user",
];

// Narrow operators as sent on the wire
pub mod operators {
    pub const STREAM: &str = "stream";
    pub const TOPIC: &str = "topic";
    pub const IS: &str = "is";
    pub const PM_WITH: &str = "pm-with";
    pub const SEARCH: &str = "search";

    pub const IS_PRIVATE: &str = "private";
    pub const IS_STARRED: &str = "starred";
    pub const IS_MENTIONED: &str = "mentioned";
}
