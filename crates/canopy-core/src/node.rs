//! Hierarchy nodes consumed by the layout engine.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shared handle to a [`HierarchyNode`].
///
/// Placed rectangles point back at the node they were laid out for, so nodes
/// are reference counted rather than owned by any one layout.
pub type NodeRef = Arc<HierarchyNode>;

/// One item or group in a weighted hierarchy of signed values.
///
/// `magnitude` is the absolute size of the underlying quantity and
/// `positive` its sign. A group's own magnitude and sign are supplied by the
/// caller; the engine treats them exactly like a leaf's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchyNode {
    /// Display identifier (ticker, sector code, ...).
    pub label: String,
    /// Non-negative weight.
    pub magnitude: f64,
    /// Sign of the underlying quantity.
    pub positive: bool,
    /// Sub-hierarchy in display order; empty for leaves.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeRef>,
}

impl HierarchyNode {
    /// Create a leaf node.
    #[must_use]
    pub fn leaf(label: impl Into<String>, magnitude: f64, positive: bool) -> Self {
        Self {
            label: label.into(),
            magnitude,
            positive,
            children: Vec::new(),
        }
    }

    /// Create a leaf from a signed quantity such as a percentage change.
    ///
    /// Zero counts as non-positive.
    #[must_use]
    pub fn from_signed(label: impl Into<String>, value: f64) -> Self {
        Self::leaf(label, value.abs(), value > 0.0)
    }

    /// Create a group node with pre-aggregated magnitude and sign.
    #[must_use]
    pub fn group(
        label: impl Into<String>,
        magnitude: f64,
        positive: bool,
        children: Vec<NodeRef>,
    ) -> Self {
        Self {
            label: label.into(),
            magnitude,
            positive,
            children,
        }
    }

    /// Wrap in a shared handle.
    #[must_use]
    pub fn into_ref(self) -> NodeRef {
        Arc::new(self)
    }

    /// Check if this is a leaf node.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Check if this node has children to drill into.
    #[must_use]
    pub fn is_group(&self) -> bool {
        !self.children.is_empty()
    }

    /// Magnitude with the sign re-applied.
    #[must_use]
    pub fn signed_value(&self) -> f64 {
        if self.positive {
            self.magnitude
        } else {
            -self.magnitude
        }
    }

    /// Number of levels below this node (0 for a leaf).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.children
            .iter()
            .map(|child| child.depth() + 1)
            .max()
            .unwrap_or(0)
    }
}
