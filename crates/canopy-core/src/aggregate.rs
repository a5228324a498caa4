//! Building a two-level hierarchy from grouped signed values.
//!
//! This is display policy for callers (sector -> company performance), not
//! part of the layout engine: the engine lays out whatever magnitudes and
//! signs it is handed.

use crate::node::{HierarchyNode, NodeRef};
use tracing::warn;

/// Build top-level group nodes whose value is the mean of their items.
///
/// Items with zero magnitude are dropped, the rest become leaves sorted by
/// descending magnitude. Each group's signed value is the mean of its kept
/// items' signed values. Groups with no kept items, or whose mean is zero,
/// are dropped because they have no area to occupy. Groups are returned in
/// descending magnitude order. Both sorts are stable.
pub fn group_by_mean<G, I, L>(groups: impl IntoIterator<Item = (G, I)>) -> Vec<NodeRef>
where
    G: Into<String>,
    I: IntoIterator<Item = (L, f64)>,
    L: Into<String>,
{
    let mut out: Vec<NodeRef> = Vec::new();

    for (group_label, items) in groups {
        let group_label = group_label.into();

        let mut children: Vec<NodeRef> = items
            .into_iter()
            .map(|(label, value)| HierarchyNode::from_signed(label, value))
            .filter(|node| node.magnitude > 0.0)
            .map(HierarchyNode::into_ref)
            .collect();

        if children.is_empty() {
            warn!(group = %group_label, "dropping group with no non-zero items");
            continue;
        }

        sort_descending(&mut children);

        let mean = children.iter().map(|c| c.signed_value()).sum::<f64>() / children.len() as f64;
        if mean == 0.0 || mean.is_nan() {
            warn!(group = %group_label, "dropping group whose items cancel out");
            continue;
        }

        out.push(HierarchyNode::group(group_label, mean.abs(), mean > 0.0, children).into_ref());
    }

    sort_descending(&mut out);
    out
}

fn sort_descending(nodes: &mut [NodeRef]) {
    nodes.sort_by(|a, b| b.magnitude.total_cmp(&a.magnitude));
}
