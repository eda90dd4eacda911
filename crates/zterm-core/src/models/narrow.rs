use std::fmt;

use super::message::{ParticipantSet, StreamId};
use crate::constants::operators;

/// A view the user can be looking at. Built fresh on every navigation and
/// discarded once resolved; `key()` gives the canonical form used to remember
/// focus per narrow.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Narrow {
    AllMessages,
    Stream { stream: String },
    Topic { stream: String, topic: String },
    AllPrivate,
    DirectWith { emails: Vec<String> },
    Starred,
    Mentioned,
    /// Server-side search scoped to another narrow
    Search { within: Box<Narrow>, term: String },
}

impl Narrow {
    pub fn stream(stream: impl Into<String>) -> Self {
        Narrow::Stream {
            stream: stream.into(),
        }
    }

    pub fn topic(stream: impl Into<String>, topic: impl Into<String>) -> Self {
        Narrow::Topic {
            stream: stream.into(),
            topic: topic.into(),
        }
    }

    /// Emails are lowercased, sorted and deduplicated so the same conversation
    /// always produces the same narrow.
    pub fn direct_with<I, S>(emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut emails: Vec<String> = emails
            .into_iter()
            .map(|e| e.as_ref().trim().to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        emails.sort();
        emails.dedup();
        Narrow::DirectWith { emails }
    }

    /// Scope a search to this narrow, replacing any search already applied.
    pub fn search(&self, term: impl Into<String>) -> Self {
        Narrow::Search {
            within: Box::new(self.without_search()),
            term: term.into(),
        }
    }

    pub fn without_search(&self) -> Self {
        match self {
            Narrow::Search { within, .. } => within.without_search(),
            other => other.clone(),
        }
    }

    pub fn is_search(&self) -> bool {
        matches!(self, Narrow::Search { .. })
    }

    pub fn is_all_messages(&self) -> bool {
        matches!(self, Narrow::AllMessages)
    }

    /// Number of filter clauses in the wire form, search clause included.
    pub fn clause_count(&self) -> usize {
        match self {
            Narrow::AllMessages => 0,
            Narrow::Topic { .. } => 2,
            Narrow::Search { within, .. } => within.clause_count() + 1,
            _ => 1,
        }
    }

    pub fn stream_name(&self) -> Option<&str> {
        match self {
            Narrow::Stream { stream } | Narrow::Topic { stream, .. } => Some(stream),
            Narrow::Search { within, .. } => within.stream_name(),
            _ => None,
        }
    }

    pub fn topic_name(&self) -> Option<&str> {
        match self {
            Narrow::Topic { topic, .. } => Some(topic),
            Narrow::Search { within, .. } => within.topic_name(),
            _ => None,
        }
    }

    /// `(operator, operand)` pairs as the server expects them.
    pub fn clauses(&self) -> Vec<(&'static str, String)> {
        match self {
            Narrow::AllMessages => Vec::new(),
            Narrow::Stream { stream } => vec![(operators::STREAM, stream.clone())],
            Narrow::Topic { stream, topic } => vec![
                (operators::STREAM, stream.clone()),
                (operators::TOPIC, topic.clone()),
            ],
            Narrow::AllPrivate => vec![(operators::IS, operators::IS_PRIVATE.to_string())],
            Narrow::DirectWith { emails } => vec![(operators::PM_WITH, emails.join(", "))],
            Narrow::Starred => vec![(operators::IS, operators::IS_STARRED.to_string())],
            Narrow::Mentioned => vec![(operators::IS, operators::IS_MENTIONED.to_string())],
            Narrow::Search { within, term } => {
                let mut clauses = within.clauses();
                clauses.push((operators::SEARCH, term.clone()));
                clauses
            }
        }
    }

    pub fn key(&self) -> NarrowKey {
        NarrowKey::from(self)
    }
}

impl fmt::Display for Narrow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Narrow::AllMessages => write!(f, "All messages"),
            Narrow::Stream { stream } => write!(f, "#{stream}"),
            Narrow::Topic { stream, topic } => write!(f, "#{stream} > {topic}"),
            Narrow::AllPrivate => write!(f, "Direct messages"),
            Narrow::DirectWith { emails } => write!(f, "DM with {}", emails.join(", ")),
            Narrow::Starred => write!(f, "Starred"),
            Narrow::Mentioned => write!(f, "Mentions"),
            Narrow::Search { within, term } => write!(f, "{within} / search \"{term}\""),
        }
    }
}

/// Canonical, order-independent identity of a narrow, used to key the focus
/// pointer map.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NarrowKey(Narrow);

impl From<&Narrow> for NarrowKey {
    fn from(narrow: &Narrow) -> Self {
        let canonical = match narrow {
            Narrow::DirectWith { emails } => Narrow::direct_with(emails),
            Narrow::Search { within, term } => Narrow::Search {
                within: Box::new(NarrowKey::from(within.as_ref()).0),
                term: term.trim().to_string(),
            },
            other => other.clone(),
        };
        NarrowKey(canonical)
    }
}

/// A narrow together with the ids it refers to, looked up once when the user
/// navigates so indexing and resolution never consult the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedNarrow {
    pub narrow: Narrow,
    pub stream_id: Option<StreamId>,
    /// Participant set (self included) for `DirectWith`
    pub recipients: Option<ParticipantSet>,
}

impl ResolvedNarrow {
    pub fn all_messages() -> Self {
        Self {
            narrow: Narrow::AllMessages,
            stream_id: None,
            recipients: None,
        }
    }

    /// For narrows that need no directory lookups (all, private, starred, mentioned).
    pub fn unscoped(narrow: Narrow) -> Self {
        Self {
            narrow,
            stream_id: None,
            recipients: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_with_is_canonical() {
        let a = Narrow::direct_with(["Zoe@example.com", "iago@example.com"]);
        let b = Narrow::direct_with(["iago@example.com", "zoe@example.com", "zoe@example.com"]);
        assert_eq!(a, b);
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn test_key_canonicalizes_hand_built_direct_narrow() {
        let hand_built = Narrow::DirectWith {
            emails: vec!["b@x.org".to_string(), "a@x.org".to_string()],
        };
        assert_eq!(hand_built.key(), Narrow::direct_with(["a@x.org", "b@x.org"]).key());
    }

    #[test]
    fn test_search_replaces_previous_search() {
        let narrow = Narrow::stream("design").search("logo").search("colors");
        assert_eq!(
            narrow,
            Narrow::Search {
                within: Box::new(Narrow::stream("design")),
                term: "colors".to_string(),
            }
        );
        assert_eq!(narrow.without_search(), Narrow::stream("design"));
        assert_eq!(narrow.clause_count(), 2);
    }

    #[test]
    fn test_clauses_wire_form() {
        assert!(Narrow::AllMessages.clauses().is_empty());
        assert_eq!(
            Narrow::topic("design", "logo").clauses(),
            vec![("stream", "design".to_string()), ("topic", "logo".to_string())]
        );
        assert_eq!(
            Narrow::direct_with(["b@x.org", "a@x.org"]).clauses(),
            vec![("pm-with", "a@x.org, b@x.org".to_string())]
        );
        assert_eq!(
            Narrow::Mentioned.search("lunch").clauses(),
            vec![("is", "mentioned".to_string()), ("search", "lunch".to_string())]
        );
    }

    #[test]
    fn test_stream_and_topic_names_see_through_search() {
        let narrow = Narrow::topic("design", "logo").search("svg");
        assert_eq!(narrow.stream_name(), Some("design"));
        assert_eq!(narrow.topic_name(), Some("logo"));
        assert_eq!(Narrow::Starred.stream_name(), None);
    }
}
