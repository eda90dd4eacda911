pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod models;
pub mod normalize;
pub mod runtime;
pub mod session;
pub mod store;
pub mod tracing_setup;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use error::{CoreError, Result};
pub use events::{ApplyOutcome, DataChange, Notification, Redraw, ServerEvent};
pub use session::Session;
