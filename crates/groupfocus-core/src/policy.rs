//! Collapse policy
//!
//! Pure function from a window snapshot and the current options to the
//! collapse flag each group should end up with:
//! ```text
//! active tab ungrouped + ignoreUngroupedTabs  -> skip the whole window
//! group with one tab                          -> preserveSingleTabGroups
//! any other group                             -> collapsed unless it holds the active tab
//! ```
//! Only differences from the observed flag are emitted, so a settled window
//! yields no writes.

use std::collections::BTreeMap;

use groupfocus_tabs::{Group, GroupId, Tab};

use crate::options::{Options, SingleTabGroupMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Skip,
    SetCollapsed(bool),
}

/// Per-group decisions for one window, ordered by group id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decisions(BTreeMap<GroupId, Decision>);

impl Decisions {
    pub fn get(&self, group: GroupId) -> Option<Decision> {
        self.0.get(&group).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Groups whose collapsed flag must change, with the target value
    pub fn mutations(&self) -> impl Iterator<Item = (GroupId, bool)> + '_ {
        self.0.iter().filter_map(|(id, decision)| match decision {
            Decision::SetCollapsed(collapsed) => Some((*id, *collapsed)),
            Decision::Skip => None,
        })
    }

    pub fn is_noop(&self) -> bool {
        self.mutations().next().is_none()
    }
}

pub fn decide(
    groups: &[Group],
    tabs: &[Tab],
    active_tab: Option<&Tab>,
    options: &Options,
) -> Decisions {
    let active_group = active_tab.and_then(|tab| tab.group_id);

    if options.ignore_ungrouped_tabs && active_group.is_none() {
        return Decisions(groups.iter().map(|g| (g.id, Decision::Skip)).collect());
    }

    let decisions = groups
        .iter()
        .map(|group| {
            let members = tabs.iter().filter(|tab| tab.belongs_to(group.id)).count();

            let target = if members == 1 {
                match options.preserve_single_tab_groups {
                    SingleTabGroupMode::KeepCurrent => None,
                    SingleTabGroupMode::AlwaysExpanded => Some(false),
                    SingleTabGroupMode::Off => Some(Some(group.id) != active_group),
                }
            } else {
                Some(Some(group.id) != active_group)
            };

            let decision = match target {
                Some(collapsed) if collapsed != group.collapsed => {
                    Decision::SetCollapsed(collapsed)
                }
                _ => Decision::Skip,
            };

            (group.id, decision)
        })
        .collect();

    Decisions(decisions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use groupfocus_tabs::{TabId, WindowId};

    const W: WindowId = WindowId(1);

    fn group(id: i32, collapsed: bool) -> Group {
        Group::new(GroupId(id), W, collapsed)
    }

    fn tab(id: i32, group: Option<i32>) -> Tab {
        Tab {
            id: TabId(id),
            window_id: W,
            group_id: group.map(GroupId),
            active: false,
        }
    }

    fn with_mode(mode: SingleTabGroupMode) -> Options {
        Options {
            ignore_ungrouped_tabs: true,
            preserve_single_tab_groups: mode,
        }
    }

    fn mutations(decisions: &Decisions) -> Vec<(GroupId, bool)> {
        decisions.mutations().collect()
    }

    #[test]
    fn test_reference_scenario() {
        // G1: expanded, 3 tabs, not active. G2: collapsed, 1 tab, holds the active tab.
        let groups = vec![group(1, false), group(2, true)];
        let active = tab(4, Some(2)).activated();
        let tabs = vec![tab(1, Some(1)), tab(2, Some(1)), tab(3, Some(1)), active.clone()];

        let decisions = decide(&groups, &tabs, Some(&active), &Options::permissive());
        assert_eq!(
            mutations(&decisions),
            vec![(GroupId(1), true), (GroupId(2), false)]
        );

        let options = with_mode(SingleTabGroupMode::AlwaysExpanded);
        let decisions = decide(&groups, &tabs, Some(&active), &options);
        assert_eq!(
            mutations(&decisions),
            vec![(GroupId(1), true), (GroupId(2), false)]
        );

        // keep-current leaves the single-tab G2 as it is
        let decisions = decide(&groups, &tabs, Some(&active), &Options::default());
        assert_eq!(mutations(&decisions), vec![(GroupId(1), true)]);
    }

    #[test]
    fn test_multi_tab_groups_follow_active_tab() {
        let groups = vec![group(1, true), group(2, false), group(3, false)];
        let active = tab(1, Some(1));
        let tabs = vec![
            active.clone(),
            tab(2, Some(1)),
            tab(3, Some(2)),
            tab(4, Some(2)),
            tab(5, Some(3)),
            tab(6, Some(3)),
        ];

        let decisions = decide(&groups, &tabs, Some(&active), &Options::default());
        assert_eq!(
            mutations(&decisions),
            vec![(GroupId(1), false), (GroupId(2), true), (GroupId(3), true)]
        );
    }

    #[test]
    fn test_settled_window_is_noop() {
        let groups = vec![group(1, false), group(2, true)];
        let active = tab(1, Some(1));
        let tabs = vec![active.clone(), tab(2, Some(1)), tab(3, Some(2)), tab(4, Some(2))];

        let decisions = decide(&groups, &tabs, Some(&active), &Options::default());
        assert!(decisions.is_noop());
        assert_eq!(decisions.len(), 2);
    }

    #[test]
    fn test_keep_current_never_touches_single_tab_groups() {
        let active = tab(1, Some(1));
        for collapsed in [true, false] {
            let groups = vec![group(1, true), group(2, collapsed)];
            let tabs = vec![active.clone(), tab(2, Some(1)), tab(3, Some(2))];
            let decisions = decide(
                &groups,
                &tabs,
                Some(&active),
                &with_mode(SingleTabGroupMode::KeepCurrent),
            );
            assert_eq!(decisions.get(GroupId(2)), Some(Decision::Skip));
        }
    }

    #[test]
    fn test_always_expanded_only_expands() {
        let active = tab(1, Some(1));
        let tabs = vec![active.clone(), tab(2, Some(1)), tab(3, Some(2))];
        let options = with_mode(SingleTabGroupMode::AlwaysExpanded);

        let decisions = decide(&[group(1, false), group(2, true)], &tabs, Some(&active), &options);
        assert_eq!(mutations(&decisions), vec![(GroupId(2), false)]);

        let decisions = decide(&[group(1, false), group(2, false)], &tabs, Some(&active), &options);
        assert!(decisions.is_noop());
    }

    #[test]
    fn test_off_treats_single_tab_groups_normally() {
        let active = tab(1, Some(1));
        let tabs = vec![active.clone(), tab(2, Some(1)), tab(3, Some(2))];
        let decisions = decide(
            &[group(1, false), group(2, false)],
            &tabs,
            Some(&active),
            &with_mode(SingleTabGroupMode::Off),
        );
        assert_eq!(mutations(&decisions), vec![(GroupId(2), true)]);
    }

    #[test]
    fn test_ungrouped_active_tab_skips_window() {
        let groups = vec![group(1, false), group(2, true)];
        let active = tab(1, None);
        let tabs = vec![active.clone(), tab(2, Some(1)), tab(3, Some(1)), tab(4, Some(2))];

        let decisions = decide(&groups, &tabs, Some(&active), &Options::default());
        assert!(decisions.is_noop());
        assert_eq!(decisions.get(GroupId(1)), Some(Decision::Skip));

        let decisions = decide(&groups, &tabs, None, &Options::default());
        assert!(decisions.is_noop());
    }

    #[test]
    fn test_ungrouped_active_tab_collapses_all_when_not_ignored() {
        let groups = vec![group(1, false), group(2, true)];
        let active = tab(1, None);
        let tabs = vec![active.clone(), tab(2, Some(1)), tab(3, Some(1)), tab(4, Some(2))];

        let decisions = decide(&groups, &tabs, Some(&active), &Options::permissive());
        assert_eq!(mutations(&decisions), vec![(GroupId(1), true)]);

        let decisions = decide(&groups, &tabs, None, &Options::permissive());
        assert_eq!(mutations(&decisions), vec![(GroupId(1), true)]);
    }

    #[test]
    fn test_empty_group_follows_active_rule() {
        let active = tab(1, Some(1));
        let tabs = vec![active.clone(), tab(2, Some(1))];
        let decisions = decide(
            &[group(1, false), group(3, false)],
            &tabs,
            Some(&active),
            &Options::default(),
        );
        assert_eq!(mutations(&decisions), vec![(GroupId(3), true)]);
    }
}
