pub mod appliers;
pub mod chat_store;
pub mod message_index;
pub mod narrow_resolver;
pub mod pending;
pub mod unread;

pub use appliers::strip_html;
pub use chat_store::ChatStore;
pub use message_index::{classify, IndexTarget, MessageIndex};
pub use narrow_resolver::{resolve_ids_for_narrow, resolve_narrow, select_focus, NarrowView};
pub use pending::PendingEvents;
pub use unread::{apply_count_delta, classify_unread_counts};
