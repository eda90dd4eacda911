use std::collections::BTreeSet;

use crate::error::{CoreError, Result};
use crate::models::{Directory, MessageId, MuteState, Narrow, ResolvedNarrow};

use super::message_index::MessageIndex;

/// What the renderer needs after a navigation: ids in display order and where
/// focus lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NarrowView {
    pub narrow: Narrow,
    pub ids: Vec<MessageId>,
    pub focus: Option<MessageId>,
    /// Nothing (or not the requested message) is indexed yet for this narrow;
    /// the caller should fetch under it and resolve again.
    pub needs_fetch: bool,
}

/// Look up the stream id and participant set a narrow refers to.
pub fn resolve_directory(narrow: &Narrow, directory: &Directory) -> Result<ResolvedNarrow> {
    let stream_id = match narrow.stream_name() {
        Some(name) => Some(
            directory
                .stream_id_for_name(name)
                .ok_or_else(|| CoreError::UnknownStream(name.to_string()))?,
        ),
        None => None,
    };
    let recipients = match narrow.without_search() {
        Narrow::DirectWith { emails } => Some(directory.participants_for_emails(&emails)?),
        _ => None,
    };
    Ok(ResolvedNarrow {
        narrow: narrow.clone(),
        stream_id,
        recipients,
    })
}

/// Ids belonging to a narrow, ascending.
///
/// Aggregate views hide muted streams and topics. Narrowing explicitly into a
/// muted stream or topic shows it anyway; inside an unmuted stream its muted
/// topics stay hidden.
pub fn resolve_ids_for_narrow(
    resolved: &ResolvedNarrow,
    index: &MessageIndex,
    mutes: &MuteState,
) -> Vec<MessageId> {
    let empty = BTreeSet::new();
    let visible = |id: &MessageId, hide_muted_topics_only: bool| -> bool {
        let Some((stream_id, topic)) = index.get(*id).and_then(|m| m.stream_topic()) else {
            return true;
        };
        if hide_muted_topics_only {
            !mutes.is_muted_topic(stream_id, topic)
        } else {
            !mutes.hides(stream_id, topic)
        }
    };

    match &resolved.narrow {
        Narrow::Search { .. } => index.search_results().iter().copied().collect(),
        Narrow::AllMessages => index
            .all_msg_ids()
            .iter()
            .filter(|id| visible(*id, false))
            .copied()
            .collect(),
        Narrow::Stream { .. } => {
            let ids = resolved
                .stream_id
                .and_then(|sid| index.stream_msg_ids(sid))
                .unwrap_or(&empty);
            let stream_muted = resolved
                .stream_id
                .is_some_and(|sid| mutes.is_muted_stream(sid));
            if stream_muted {
                ids.iter().copied().collect()
            } else {
                ids.iter().filter(|id| visible(*id, true)).copied().collect()
            }
        }
        Narrow::Topic { topic, .. } => resolved
            .stream_id
            .and_then(|sid| index.topic_msg_ids(sid, topic))
            .unwrap_or(&empty)
            .iter()
            .copied()
            .collect(),
        Narrow::AllPrivate => index.private_msg_ids().iter().copied().collect(),
        Narrow::DirectWith { .. } => resolved
            .recipients
            .as_ref()
            .and_then(|r| index.private_msg_ids_by_user_ids(r))
            .unwrap_or(&empty)
            .iter()
            .copied()
            .collect(),
        Narrow::Starred => index.starred_msg_ids().iter().copied().collect(),
        Narrow::Mentioned => index.mentioned_msg_ids().iter().copied().collect(),
    }
}

/// Stored pointer if still present, then the contextual id if present, then
/// the newest id.
pub fn select_focus(
    ids: &[MessageId],
    pointer: Option<MessageId>,
    contextual: Option<MessageId>,
) -> Option<MessageId> {
    let present = |id: &MessageId| ids.binary_search(id).is_ok();
    pointer
        .filter(present)
        .or_else(|| contextual.filter(present))
        .or_else(|| ids.iter().max().copied())
}

pub fn resolve_narrow(
    resolved: &ResolvedNarrow,
    index: &MessageIndex,
    mutes: &MuteState,
    contextual: Option<MessageId>,
) -> NarrowView {
    let ids = resolve_ids_for_narrow(resolved, index, mutes);
    let focus = select_focus(&ids, index.pointer(&resolved.narrow.key()), contextual);
    let needs_fetch = ids.is_empty() || contextual.is_some_and(|c| ids.binary_search(&c).is_err());
    NarrowView {
        narrow: resolved.narrow.clone(),
        ids,
        focus,
        needs_fetch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{directory, dm, narrow_all, narrow_stream, narrow_topic, stream_msg};

    fn topic_index() -> MessageIndex {
        let mut index = MessageIndex::new();
        index.index_messages(
            vec![stream_msg(3, 5, "intro"), stream_msg(8, 5, "intro"), stream_msg(5, 5, "intro")],
            &narrow_topic("design", 5, "intro"),
            &MuteState::default(),
        );
        index
    }

    #[test]
    fn test_focus_defaults_to_max() {
        let index = topic_index();
        let view = resolve_narrow(&narrow_topic("design", 5, "intro"), &index, &MuteState::default(), None);
        assert_eq!(view.ids, vec![3, 5, 8]);
        assert_eq!(view.focus, Some(8));
        assert!(!view.needs_fetch);
    }

    #[test]
    fn test_focus_prefers_pointer_then_contextual() {
        assert_eq!(select_focus(&[3, 5, 8], Some(5), Some(3)), Some(5));
        assert_eq!(select_focus(&[3, 5, 8], Some(4), Some(3)), Some(3));
        assert_eq!(select_focus(&[3, 5, 8], Some(4), Some(6)), Some(8));
        assert_eq!(select_focus(&[], Some(4), Some(6)), None);
    }

    #[test]
    fn test_missing_contextual_needs_fetch() {
        let index = topic_index();
        let view = resolve_narrow(&narrow_topic("design", 5, "intro"), &index, &MuteState::default(), Some(42));
        assert!(view.needs_fetch);
        assert_eq!(view.focus, Some(8));

        let empty = resolve_narrow(&narrow_stream("general", 6), &index, &MuteState::default(), None);
        assert!(empty.ids.is_empty());
        assert_eq!(empty.focus, None);
        assert!(empty.needs_fetch);
    }

    // Indexing under the unfiltered view never fills topic buckets.
    #[test]
    fn test_scenario_a_narrow_conditioned_population() {
        let mut index = MessageIndex::new();
        index.index_messages(vec![stream_msg(1, 5, "intro")], &narrow_all(), &MuteState::default());

        let all = resolve_ids_for_narrow(&narrow_all(), &index, &MuteState::default());
        assert_eq!(all, vec![1]);
        let topic = resolve_ids_for_narrow(&narrow_topic("S", 5, "intro"), &index, &MuteState::default());
        assert!(topic.is_empty());
    }

    #[test]
    fn test_explicit_narrow_into_muted_stream_shows_messages() {
        let mut mutes = MuteState::default();
        let mut index = MessageIndex::new();
        index.index_messages(
            vec![stream_msg(1, 7, "intro"), stream_msg(2, 7, "lunch")],
            &narrow_stream("random", 7),
            &mutes,
        );
        index.index_messages(vec![stream_msg(2, 7, "lunch")], &narrow_topic("random", 7, "lunch"), &mutes);
        mutes.set_muted_topics([(7, "lunch".to_string())]);
        assert_eq!(resolve_ids_for_narrow(&narrow_stream("random", 7), &index, &mutes), vec![1]);

        mutes.set_stream_muted(7, true);
        assert_eq!(resolve_ids_for_narrow(&narrow_stream("random", 7), &index, &mutes), vec![1, 2]);
        assert_eq!(
            resolve_ids_for_narrow(&narrow_topic("random", 7, "lunch"), &index, &mutes),
            vec![2]
        );
    }

    #[test]
    fn test_all_messages_hides_later_muted_stream() {
        let mut mutes = MuteState::default();
        let mut index = MessageIndex::new();
        index.index_messages(vec![stream_msg(1, 7, "intro"), dm(2, 2, &[1, 2])], &narrow_all(), &mutes);
        mutes.set_stream_muted(7, true);
        assert_eq!(resolve_ids_for_narrow(&narrow_all(), &index, &mutes), vec![2]);
    }

    #[test]
    fn test_resolve_directory() {
        let dir = directory();
        let resolved = resolve_directory(&Narrow::topic("design", "intro"), &dir).unwrap();
        assert_eq!(resolved.stream_id, Some(5));

        let resolved = resolve_directory(&Narrow::direct_with(["user3@example.com"]), &dir).unwrap();
        assert_eq!(resolved.recipients, Some([1, 3].into_iter().collect()));

        let err = resolve_directory(&Narrow::stream("nope"), &dir).unwrap_err();
        assert!(matches!(err, CoreError::UnknownStream(_)));
    }
}
