//! Sibling-tab selection for split view.
//!
//! Picks the "other pane" for a source tab: the right neighbor, else the left
//! neighbor, else the nearest remaining tab of the window.

use crate::types::tab::HostTab;

/// Why a tab was chosen as sibling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiblingReason {
    RightNeighbor,
    LeftNeighbor,
    Nearest,
}

/// The chosen sibling tab.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sibling<'a> {
    pub tab: &'a HostTab,
    pub reason: SiblingReason,
}

/// Selects the sibling of `source` among `window_tabs`.
///
/// `window_tabs` may contain the source itself; it is excluded by id.
/// Returns `None` when no other tab exists. Ties in distance go to the tab
/// that sorts first by index.
pub fn select_sibling<'a>(source: &HostTab, window_tabs: &'a [HostTab]) -> Option<Sibling<'a>> {
    let mut candidates: Vec<&HostTab> = window_tabs
        .iter()
        .filter(|t| t.id != source.id)
        .collect();
    candidates.sort_by_key(|t| t.index);

    if candidates.is_empty() {
        return None;
    }

    let at = |index: i64| candidates.iter().copied().find(|t| t.index == index);

    if let Some(tab) = at(source.index + 1) {
        return Some(Sibling {
            tab,
            reason: SiblingReason::RightNeighbor,
        });
    }
    if let Some(tab) = at(source.index - 1) {
        return Some(Sibling {
            tab,
            reason: SiblingReason::LeftNeighbor,
        });
    }
    candidates
        .iter()
        .copied()
        .min_by_key(|t| (t.index - source.index).abs())
        .map(|tab| Sibling {
            tab,
            reason: SiblingReason::Nearest,
        })
}
