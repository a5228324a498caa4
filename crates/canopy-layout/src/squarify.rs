//! Squarified treemap layout.
//!
//! Nodes are consumed in order. The current group (a row or column of
//! consecutive nodes) keeps growing while adding the next node does not make
//! its worst aspect ratio any worse; otherwise the group is finalized against
//! the remaining space and a new group starts. The remaining space is always
//! the bottom-right part of the canvas.

use canopy_core::{LayoutError, Rect, Result};
use tracing::trace;

use crate::normalize::NormalizedNode;

/// How a finalized group is packed into the available space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Used when the available space is at least as wide as it is tall. The
    /// group becomes a column of width `Σarea / h`, its members stacked down
    /// the height; the column is then removed from the width.
    Column,
    /// Used when the available space is taller than it is wide. The group
    /// becomes a row of height `Σarea / w`, its members side by side across
    /// the width; the row is then removed from the height.
    Row,
}

impl Orientation {
    /// Orientation for an available space of `w x h`.
    #[must_use]
    pub fn for_space(w: f64, h: f64) -> Self {
        if w >= h {
            Self::Column
        } else {
            Self::Row
        }
    }

    /// The side the group is laid against.
    fn side(self, w: f64, h: f64) -> f64 {
        match self {
            Self::Column => h,
            Self::Row => w,
        }
    }
}

/// A node with its final position, in fractions of the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement<'a> {
    /// The normalized node that was placed.
    pub normalized: NormalizedNode<'a>,
    /// Position and size within the unit square.
    pub bounds: Rect,
}

/// Running statistics of the group under construction: the nodes
/// `start..end` with their total and smallest area.
#[derive(Debug, Clone, Copy)]
struct Group {
    start: usize,
    end: usize,
    total: f64,
    smallest: f64,
}

impl Group {
    const fn empty_at(start: usize) -> Self {
        Self {
            start,
            end: start,
            total: 0.0,
            smallest: f64::INFINITY,
        }
    }

    const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    fn with(self, area: f64) -> Self {
        Self {
            end: self.end + 1,
            total: self.total + area,
            smallest: self.smallest.min(area),
            ..self
        }
    }

    /// Aspect quality of the group's smallest member laid against `side`,
    /// in `(0, 1]`; `1` is a perfect square. An empty group scores `0`.
    fn worst(&self, side: f64) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        let long = self.total / side;
        let short = (self.smallest / self.total) * side;
        (long / short).min(short / long)
    }

    /// Thickness of the finalized row or column.
    fn thickness(&self, side: f64) -> f64 {
        self.total / side
    }
}

/// Lay out `nodes` on a `width x height` canvas.
///
/// The nodes' areas are expected to sum to `width * height`. Output order
/// matches input order and every rectangle is expressed as a fraction of the
/// full canvas.
pub fn squarify<'a>(
    nodes: &[NormalizedNode<'a>],
    width: f64,
    height: f64,
) -> Result<Vec<Placement<'a>>> {
    if !(width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite()) {
        return Err(LayoutError::invariant(format!(
            "canvas must have positive finite size, got {width} x {height}"
        )));
    }
    if let Some(bad) = nodes.iter().find(|n| !(n.area > 0.0 && n.area.is_finite())) {
        return Err(LayoutError::invariant(format!(
            "node '{}' reached squarify with area {}",
            bad.node.label, bad.area
        )));
    }

    let mut packer = Packer {
        nodes,
        canvas_width: width,
        canvas_height: height,
        out: Vec::with_capacity(nodes.len()),
    };

    // unplaced[i] is the area of nodes[i..], summed smallest-first.
    let mut unplaced = vec![0.0; nodes.len() + 1];
    for (i, n) in nodes.iter().enumerate().rev() {
        unplaced[i] = unplaced[i + 1] + n.area;
    }

    let (mut w, mut h) = (width, height);
    let mut group = Group::empty_at(0);
    let mut next = 0;

    while next < nodes.len() {
        let orientation = Orientation::for_space(w, h);
        let side = orientation.side(w, h);
        let grown = group.with(nodes[next].area);

        // Ties grow the group.
        if group.worst(side) <= grown.worst(side) {
            group = grown;
            next += 1;
        } else {
            packer.store(&group, w, h, orientation);
            // The remaining space keeps w * h equal to the unplaced area, so
            // tiny remainders never cancel against the canvas size.
            match orientation {
                Orientation::Column => w = unplaced[next] / h,
                Orientation::Row => h = unplaced[next] / w,
            }
            if !(w > 0.0 && h > 0.0 && w.is_finite() && h.is_finite()) {
                return Err(LayoutError::invariant(format!(
                    "remaining space collapsed to {w} x {h} before node '{}'",
                    nodes[next].node.label
                )));
            }
            group = Group::empty_at(next);
        }
    }

    packer.store(&group, w, h, Orientation::for_space(w, h));

    if let Some(bad) = packer.out.iter().find(|p| !p.bounds.is_finite()) {
        return Err(LayoutError::invariant(format!(
            "node '{}' was placed at non-finite bounds {:?}",
            bad.normalized.node.label, bad.bounds
        )));
    }
    Ok(packer.out)
}

struct Packer<'n, 'a> {
    nodes: &'n [NormalizedNode<'a>],
    canvas_width: f64,
    canvas_height: f64,
    out: Vec<Placement<'a>>,
}

impl Packer<'_, '_> {
    /// Emit the group's rectangles into the `w x h` space anchored at the
    /// canvas's bottom-right corner.
    fn store(&mut self, group: &Group, w: f64, h: f64, orientation: Orientation) {
        if group.is_empty() {
            return;
        }
        trace!(
            start = group.start,
            len = group.end - group.start,
            ?orientation,
            w,
            h,
            "finalizing group"
        );

        let mut x = (self.canvas_width - w) / self.canvas_width;
        let mut y = (self.canvas_height - h) / self.canvas_height;

        for normalized in &self.nodes[group.start..group.end] {
            let bounds = match orientation {
                Orientation::Row => {
                    let rect_width = (normalized.area / group.total) * w;
                    let bounds = Rect::new(
                        x,
                        y,
                        rect_width / self.canvas_width,
                        group.thickness(w) / self.canvas_height,
                    );
                    x += rect_width / self.canvas_width;
                    bounds
                }
                Orientation::Column => {
                    let rect_height = (normalized.area / group.total) * h;
                    let bounds = Rect::new(
                        x,
                        y,
                        group.thickness(h) / self.canvas_width,
                        rect_height / self.canvas_height,
                    );
                    y += rect_height / self.canvas_height;
                    bounds
                }
            };
            self.out.push(Placement {
                normalized: *normalized,
                bounds,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use canopy_core::{HierarchyNode, NodeRef};
    use proptest::prelude::*;

    const EPS: f64 = 1e-9;

    fn leaves(values: &[f64]) -> Vec<NodeRef> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| HierarchyNode::leaf(format!("n{i}"), v, true).into_ref())
            .collect()
    }

    fn layout(values: &[f64], w: f64, h: f64) -> Vec<Rect> {
        let nodes = leaves(values);
        let normalized = normalize(&nodes, w * h).unwrap();
        squarify(&normalized, w, h)
            .unwrap()
            .into_iter()
            .map(|p| p.bounds)
            .collect()
    }

    fn assert_rect_eq(actual: Rect, expected: Rect) {
        assert!(
            (actual.x - expected.x).abs() < EPS
                && (actual.y - expected.y).abs() < EPS
                && (actual.width - expected.width).abs() < EPS
                && (actual.height - expected.height).abs() < EPS,
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn test_orientation_for_space() {
        assert_eq!(Orientation::for_space(2.0, 1.0), Orientation::Column);
        assert_eq!(Orientation::for_space(1.0, 1.0), Orientation::Column);
        assert_eq!(Orientation::for_space(1.0, 2.0), Orientation::Row);
    }

    #[test]
    fn test_worst_of_empty_group_is_zero() {
        assert_eq!(Group::empty_at(3).worst(10.0), 0.0);
    }

    #[test]
    fn test_worst_is_one_for_square() {
        let group = Group::empty_at(0).with(4.0);
        assert_eq!(group.worst(2.0), 1.0);
    }

    #[test]
    fn test_worst_is_symmetric_in_elongation() {
        // 1x4 and 4x1 strips score the same.
        let group = Group::empty_at(0).with(4.0);
        assert_eq!(group.worst(1.0), 0.25);
        assert_eq!(group.worst(4.0), 0.25);
    }

    #[test]
    fn test_single_node_fills_canvas() {
        let rects = layout(&[42.0], 300.0, 120.0);
        assert_eq!(rects, [Rect::UNIT]);
    }

    #[test]
    fn test_three_node_layout() {
        let rects = layout(&[50.0, 30.0, 20.0], 100.0, 100.0);
        assert_eq!(rects.len(), 3);
        assert_rect_eq(rects[0], Rect::new(0.0, 0.0, 0.5, 1.0));
        assert_rect_eq(rects[1], Rect::new(0.5, 0.0, 0.5, 0.6));
        assert_rect_eq(rects[2], Rect::new(0.5, 0.6, 0.5, 0.4));
    }

    #[test]
    fn test_two_node_column_then_row() {
        let rects = layout(&[70.0, 30.0], 100.0, 100.0);
        assert_rect_eq(rects[0], Rect::new(0.0, 0.0, 0.7, 1.0));
        assert_rect_eq(rects[1], Rect::new(0.7, 0.0, 0.3, 1.0));
    }

    #[test]
    fn test_tall_canvas_starts_with_row() {
        let rects = layout(&[50.0, 50.0], 1.0, 4.0);
        // Row against w=1: the first node alone is a 1x2 strip (0.5), adding
        // the second gives two 0.5x4 strips (0.125), so the first row closes.
        assert_rect_eq(rects[0], Rect::new(0.0, 0.0, 1.0, 0.5));
        assert_rect_eq(rects[1], Rect::new(0.0, 0.5, 1.0, 0.5));
    }

    #[test]
    fn test_equal_worst_grows_group() {
        // Areas 0.25 and 0.75 against side 1: alone, the first is a 0.25x1
        // strip; together they form a full column whose smallest member is a
        // 1x0.25 strip. Both score exactly 0.25, and the tie keeps growing.
        let rects = layout(&[1.0, 3.0], 1.0, 1.0);
        assert_eq!(rects[0], Rect::new(0.0, 0.0, 1.0, 0.25));
        assert_eq!(rects[1], Rect::new(0.0, 0.25, 1.0, 0.75));
    }

    #[test]
    fn test_four_equal_nodes_make_quadrants() {
        let rects = layout(&[1.0, 1.0, 1.0, 1.0], 2.0, 2.0);
        assert_rect_eq(rects[0], Rect::new(0.0, 0.0, 0.5, 0.5));
        assert_rect_eq(rects[1], Rect::new(0.0, 0.5, 0.5, 0.5));
        assert_rect_eq(rects[2], Rect::new(0.5, 0.0, 0.5, 0.5));
        assert_rect_eq(rects[3], Rect::new(0.5, 0.5, 0.5, 0.5));
    }

    #[test]
    fn test_empty_input_is_noop() {
        let out = squarify(&[], 10.0, 10.0).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_zero_area_is_invariant_violation() {
        let nodes = leaves(&[0.0, 1.0]);
        let normalized = normalize(&nodes, 1.0).unwrap();
        let err = squarify(&normalized, 1.0, 1.0).unwrap_err();
        assert!(matches!(err, LayoutError::InvariantViolation(_)));
    }

    #[test]
    fn test_non_positive_canvas_is_invariant_violation() {
        let nodes = leaves(&[1.0]);
        let normalized = normalize(&nodes, 1.0).unwrap();
        assert!(squarify(&normalized, 0.0, 1.0).is_err());
        assert!(squarify(&normalized, 1.0, -1.0).is_err());
    }

    #[test]
    fn test_output_order_matches_input() {
        let nodes = leaves(&[5.0, 4.0, 3.0, 2.0, 1.0]);
        let normalized = normalize(&nodes, 60.0).unwrap();
        let placed = squarify(&normalized, 10.0, 6.0).unwrap();
        for (p, n) in placed.iter().zip(&nodes) {
            assert!(std::sync::Arc::ptr_eq(p.normalized.node, n));
        }
    }

    fn assert_on_canvas(rects: &[Rect]) {
        for r in rects {
            assert!(r.x >= -EPS && r.y >= -EPS, "{r:?} starts off canvas");
            assert!(r.right() <= 1.0 + EPS && r.bottom() <= 1.0 + EPS, "{r:?} ends off canvas");
            assert!(r.width > 0.0 && r.height > 0.0, "{r:?} is empty");
        }
    }

    #[test]
    fn test_tiny_sibling_stays_on_canvas() {
        let rects = layout(&[1.0, 1e-17], 100.0, 100.0);
        assert!(rects.iter().all(Rect::is_finite), "{rects:?}");
        assert_on_canvas(&rects);
        assert_rect_eq(rects[0], Rect::new(0.0, 0.0, 1.0, 1.0));
        let total: f64 = rects.iter().map(Rect::area).sum();
        assert!((total - 1.0).abs() < EPS);
        assert!((rects[1].area() - 1e-17).abs() < 1e-25);
    }

    #[test]
    fn test_small_tail_after_large_nodes() {
        let rects = layout(&[1e6, 3e5, 2e-9, 1e-12, 5e-12], 160.0, 90.0);
        assert_on_canvas(&rects);
        let total: f64 = rects.iter().map(Rect::area).sum();
        assert!((total - 1.0).abs() < EPS);
    }

    /// Magnitudes spread log-uniformly over eighteen orders of magnitude.
    fn wide_values(max_len: usize) -> impl Strategy<Value = Vec<f64>> {
        prop::collection::vec((-12.0f64..6.0).prop_map(|e| 10f64.powf(e)), 1..max_len)
    }

    proptest! {
        #[test]
        fn prop_wide_range_stays_on_canvas(
            mut values in wide_values(40),
            w in 1.0f64..500.0,
            h in 1.0f64..500.0,
        ) {
            values.sort_by(|a, b| b.total_cmp(a));
            let rects = layout(&values, w, h);
            let total: f64 = rects.iter().map(Rect::area).sum();
            prop_assert!((total - 1.0).abs() < 1e-9, "total area {}", total);
            for r in &rects {
                prop_assert!(r.x >= -EPS && r.y >= -EPS, "{:?}", r);
                prop_assert!(r.right() <= 1.0 + EPS && r.bottom() <= 1.0 + EPS, "{:?}", r);
                prop_assert!(r.width > 0.0 && r.height > 0.0, "{:?}", r);
            }
        }

        #[test]
        fn prop_wide_range_does_not_overlap(
            values in wide_values(25),
            w in 1.0f64..500.0,
            h in 1.0f64..500.0,
        ) {
            let rects = layout(&values, w, h);
            for (i, a) in rects.iter().enumerate() {
                for b in &rects[i + 1..] {
                    prop_assert!(a.intersection_area(b) < 1e-9, "{:?} overlaps {:?}", a, b);
                }
            }
        }

        #[test]
        fn prop_area_is_conserved(
            values in prop::collection::vec(0.01f64..100.0, 1..40),
            w in 1.0f64..500.0,
            h in 1.0f64..500.0,
        ) {
            let rects = layout(&values, w, h);
            let total: f64 = rects.iter().map(Rect::area).sum();
            prop_assert!((total - 1.0).abs() < 1e-9, "total area {}", total);
        }

        #[test]
        fn prop_rects_stay_inside_unit_square(
            values in prop::collection::vec(0.01f64..100.0, 1..40),
            w in 1.0f64..500.0,
            h in 1.0f64..500.0,
        ) {
            for r in layout(&values, w, h) {
                prop_assert!(r.x >= -EPS && r.y >= -EPS);
                prop_assert!(r.right() <= 1.0 + EPS && r.bottom() <= 1.0 + EPS);
                prop_assert!(r.width > 0.0 && r.height > 0.0);
            }
        }

        #[test]
        fn prop_rects_do_not_overlap(
            values in prop::collection::vec(0.01f64..100.0, 1..25),
            w in 1.0f64..500.0,
            h in 1.0f64..500.0,
        ) {
            let rects = layout(&values, w, h);
            for (i, a) in rects.iter().enumerate() {
                for b in &rects[i + 1..] {
                    prop_assert!(a.intersection_area(b) < 1e-9, "{:?} overlaps {:?}", a, b);
                }
            }
        }

        #[test]
        fn prop_area_is_proportional(
            values in prop::collection::vec(0.01f64..100.0, 1..40),
            w in 1.0f64..500.0,
            h in 1.0f64..500.0,
        ) {
            let total: f64 = values.iter().sum();
            for (r, v) in layout(&values, w, h).iter().zip(&values) {
                prop_assert!((r.area() - v / total).abs() < 1e-9);
            }
        }
    }
}
