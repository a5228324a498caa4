//! Magnitude- and sign-driven cell coloring.

use canopy_core::{Color, HierarchyNode};
use serde::{Deserialize, Serialize};

use crate::normalize::NormalizedNode;

/// Base hues and brightness floor for the treemap gradient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorScheme {
    /// Base color for positive values.
    pub positive: Color,
    /// Base color for non-positive values.
    pub negative: Color,
    /// Intensity of the smallest cell, as a fraction of the base color.
    pub floor: f64,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            positive: Color::GREEN,
            negative: Color::RED,
            floor: 0.5,
        }
    }
}

/// Smallest and largest normalized area on one hierarchy level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AreaRange {
    /// Smallest area.
    pub min: f64,
    /// Largest area.
    pub max: f64,
}

impl AreaRange {
    /// Range over a set of normalized siblings. `None` when `nodes` is empty.
    #[must_use]
    pub fn of(nodes: &[NormalizedNode<'_>]) -> Option<Self> {
        Self::from_areas(nodes.iter().map(|n| n.area))
    }

    /// Range over arbitrary areas. `None` when `areas` is empty.
    pub fn from_areas(areas: impl IntoIterator<Item = f64>) -> Option<Self> {
        let mut areas = areas.into_iter();
        let first = areas.next()?;
        Some(areas.fold(
            Self {
                min: first,
                max: first,
            },
            |range, area| Self {
                min: range.min.min(area),
                max: range.max.max(area),
            },
        ))
    }

    /// Position of `area` within the range, clamped to `[0, 1]`.
    ///
    /// A zero-width range maps everything to `0`.
    #[must_use]
    pub fn position(&self, area: f64) -> f64 {
        if self.max == self.min {
            return 0.0;
        }
        ((area - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
    }
}

/// Maps a placed node to its cell color.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ColorMapper {
    scheme: ColorScheme,
}

impl ColorMapper {
    /// Create a mapper with the given scheme.
    #[must_use]
    pub const fn new(scheme: ColorScheme) -> Self {
        Self { scheme }
    }

    /// The scheme in use.
    #[must_use]
    pub const fn scheme(&self) -> &ColorScheme {
        &self.scheme
    }

    /// Color for `node` given its normalized area and the level's range.
    ///
    /// The base hue is picked by sign; every channel is scaled by
    /// `floor + (1 - floor) * t` where `t` is the area's position in the range,
    /// so bigger cells are brighter and no cell is fully dark.
    #[must_use]
    pub fn color(&self, node: &HierarchyNode, range: AreaRange, area: f64) -> Color {
        let t = range.position(area);
        let base = if node.positive {
            self.scheme.positive
        } else {
            self.scheme.negative
        };
        base.scale_rgb(self.scheme.floor + (1.0 - self.scheme.floor) * t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn range(min: f64, max: f64) -> AreaRange {
        AreaRange { min, max }
    }

    #[test]
    fn test_default_scheme() {
        let scheme = ColorScheme::default();
        assert_eq!(scheme.positive, Color::GREEN);
        assert_eq!(scheme.negative, Color::RED);
        assert_eq!(scheme.floor, 0.5);
    }

    #[test]
    fn test_position_clamps() {
        let r = range(10.0, 20.0);
        assert_eq!(r.position(15.0), 0.5);
        assert_eq!(r.position(5.0), 0.0);
        assert_eq!(r.position(25.0), 1.0);
    }

    #[test]
    fn test_flat_range_maps_to_zero() {
        assert_eq!(range(3.0, 3.0).position(3.0), 0.0);
    }

    #[test]
    fn test_sign_selects_hue() {
        let mapper = ColorMapper::default();
        let up = HierarchyNode::leaf("up", 1.0, true);
        let down = HierarchyNode::leaf("down", 1.0, false);
        let r = range(0.0, 1.0);

        let green = mapper.color(&up, r, 1.0);
        assert_eq!((green.r, green.g, green.b), (0.0, 1.0, 0.0));

        let red = mapper.color(&down, r, 1.0);
        assert_eq!((red.r, red.g, red.b), (1.0, 0.0, 0.0));
    }

    #[test]
    fn test_smallest_cell_is_half_bright() {
        let mapper = ColorMapper::default();
        let node = HierarchyNode::leaf("n", 1.0, true);
        assert_eq!(mapper.color(&node, range(2.0, 8.0), 2.0).g, 0.5);
        assert_eq!(mapper.color(&node, range(2.0, 8.0), 5.0).g, 0.75);
    }

    #[test]
    fn test_custom_floor() {
        let mapper = ColorMapper::new(ColorScheme {
            floor: 0.2,
            ..ColorScheme::default()
        });
        let node = HierarchyNode::leaf("n", 1.0, false);
        let dim = mapper.color(&node, range(0.0, 1.0), 0.0);
        assert!((dim.r - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_area_range_of_empty() {
        assert_eq!(AreaRange::of(&[]), None);
    }

    proptest! {
        #[test]
        fn prop_green_is_monotonic_in_area(
            min in 0.0f64..100.0,
            span in 0.001f64..100.0,
            a in 0.0f64..1.0,
            b in 0.0f64..1.0,
        ) {
            let r = range(min, min + span);
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let mapper = ColorMapper::default();
            let node = HierarchyNode::leaf("n", 1.0, true);
            let dim = mapper.color(&node, r, min + lo * span);
            let bright = mapper.color(&node, r, min + hi * span);
            prop_assert!(bright.g >= dim.g);
            prop_assert!(dim.g >= 0.5);
        }
    }
}
