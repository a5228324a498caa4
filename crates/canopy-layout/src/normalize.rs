//! Rescaling sibling weights to a target area.

use canopy_core::{LayoutError, NodeRef, Result};

/// A node paired with its share of the canvas area.
///
/// Lives only for the duration of one layout pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedNode<'a> {
    /// The node being laid out.
    pub node: &'a NodeRef,
    /// `magnitude / Σ magnitude * target_area`.
    pub area: f64,
}

/// Rescale `nodes` so their areas sum to `target_area`, preserving order.
///
/// Zero-weight nodes are not filtered out here; they surface as an
/// invariant violation in [`squarify`](crate::squarify).
pub fn normalize(nodes: &[NodeRef], target_area: f64) -> Result<Vec<NormalizedNode<'_>>> {
    if !(target_area.is_finite() && target_area > 0.0) {
        return Err(LayoutError::invariant(format!(
            "target area must be positive and finite, got {target_area}"
        )));
    }
    if nodes.is_empty() {
        return Err(LayoutError::EmptyLevel);
    }

    let total: f64 = nodes.iter().map(|n| n.magnitude).sum();
    // Written so that NaN also fails.
    if !(total > 0.0) {
        return Err(LayoutError::NonPositiveTotal { total });
    }

    Ok(nodes
        .iter()
        .map(|node| NormalizedNode {
            node,
            area: node.magnitude / total * target_area,
        })
        .collect())
}
