//! Applies policy decisions to the host

use futures_util::future::join_all;

use groupfocus_tabs::{HostError, TabHost, WindowId};

use crate::policy::Decisions;

/// Issue one collapse mutation per non-skip decision, concurrently.
///
/// Waits for every mutation to settle. Returns the number applied, or an
/// error if any failed; an edit lock wins over other failures so the caller
/// can retry the window.
pub async fn apply(
    host: &dyn TabHost,
    window: WindowId,
    decisions: &Decisions,
) -> Result<usize, HostError> {
    let pending: Vec<_> = decisions
        .mutations()
        .map(|(group_id, collapsed)| async move {
            let result = host.set_group_collapsed(group_id, collapsed).await;
            (group_id, collapsed, result)
        })
        .collect();

    if pending.is_empty() {
        return Ok(0);
    }

    let mut applied = 0;
    let mut failure: Option<HostError> = None;

    for (group_id, collapsed, result) in join_all(pending).await {
        match result {
            Ok(()) => {
                applied += 1;
                tracing::debug!(
                    window_id = %window,
                    group_id = %group_id,
                    collapsed,
                    "Updated group"
                );
            }
            Err(e) => {
                tracing::debug!(
                    window_id = %window,
                    group_id = %group_id,
                    collapsed,
                    error = %e,
                    "Group update failed"
                );
                let replace = match &failure {
                    None => true,
                    Some(existing) => e.is_transient() && !existing.is_transient(),
                };
                if replace {
                    failure = Some(e);
                }
            }
        }
    }

    match failure {
        Some(e) => Err(e),
        None => Ok(applied),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use groupfocus_tabs::{Group, GroupId, MemoryHost, Tab, TabId};

    use crate::options::Options;
    use crate::policy::decide;

    const W: WindowId = WindowId(1);

    fn host() -> MemoryHost {
        let host = MemoryHost::new();
        host.add_group(Group::new(GroupId(1), W, true));
        host.add_group(Group::new(GroupId(2), W, false));
        host.add_group(Group::new(GroupId(3), W, false));
        for (id, group) in [(1, 1), (2, 1), (3, 2), (4, 2), (5, 3), (6, 3)] {
            host.add_tab(Tab::new(TabId(id), W).in_group(GroupId(group)));
        }
        host.activate_tab(TabId(1)).unwrap();
        host
    }

    async fn decisions_for(host: &MemoryHost) -> Decisions {
        let groups = host.groups(W).await.unwrap();
        let tabs = host.tabs(W).await.unwrap();
        let active = host.active_tab(W).await.unwrap();
        decide(&groups, &tabs, active.as_ref(), &Options::default())
    }

    #[tokio::test]
    async fn test_applies_only_changes() {
        let host = host();
        let decisions = decisions_for(&host).await;

        let applied = apply(&host, W, &decisions).await.unwrap();
        assert_eq!(applied, 3);

        let mut mutations = host.take_mutations();
        mutations.sort();
        assert_eq!(
            mutations,
            vec![(GroupId(1), false), (GroupId(2), true), (GroupId(3), true)]
        );

        let decisions = decisions_for(&host).await;
        assert_eq!(apply(&host, W, &decisions).await.unwrap(), 0);
        assert!(host.mutations().is_empty());
    }

    #[tokio::test]
    async fn test_edit_lock_is_reported_after_all_settle() {
        let host = host();
        let decisions = decisions_for(&host).await;
        host.lock_edits(1);

        let err = apply(&host, W, &decisions).await.unwrap_err();
        assert_eq!(err, HostError::EditLocked);
        // the other two mutations still went through
        assert_eq!(host.mutations().len(), 2);
    }

    #[tokio::test]
    async fn test_missing_group_is_terminal() {
        let host = host();
        let decisions = decisions_for(&host).await;
        host.close_window(W);

        let err = apply(&host, W, &decisions).await.unwrap_err();
        assert!(matches!(err, HostError::GroupNotFound(_)));
        assert!(!err.is_transient());
    }
}
