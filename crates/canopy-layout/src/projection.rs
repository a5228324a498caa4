//! Mapping laid-out cells to extruded blocks on a centered canvas.
//!
//! Cells are expressed in canvas fractions with the origin at the top-left
//! corner. Block scenes usually want the origin at the canvas center, a small
//! gap between neighbours, and a height that grows with the cell's area.

use canopy_core::{HierarchyNode, Point};
use serde::{Deserialize, Serialize};

use crate::color_map::AreaRange;
use crate::engine::{Canvas, PlacedRectangle};

/// Ranges narrower than this extrude every block to the minimum height.
const FLAT_RANGE: f64 = 1e-4;

/// Extrusion and spacing settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Height of the smallest block.
    pub min_height: f64,
    /// Height of the largest block.
    pub max_height: f64,
    /// Space left between neighbouring blocks, in canvas units.
    pub gap: f64,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            min_height: 1.0,
            max_height: 50.0,
            gap: 1.0,
        }
    }
}

/// A cell positioned on the centered canvas.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    /// Overlay text, see [`label_text`].
    pub label: String,
    /// Footprint center, relative to the canvas center.
    pub center: Point,
    /// Footprint width after the gap is removed.
    pub width: f64,
    /// Footprint depth after the gap is removed.
    pub depth: f64,
    /// Extrusion height.
    pub height: f64,
    /// Fill color as `#rrggbb`.
    pub color: String,
}

/// Projects cells of one layout onto a canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    canvas: Canvas,
    config: ProjectionConfig,
}

impl Projection {
    /// Create a projection for `canvas`.
    #[must_use]
    pub const fn new(canvas: Canvas, config: ProjectionConfig) -> Self {
        Self { canvas, config }
    }

    /// Project every cell of a layout.
    #[must_use]
    pub fn blocks(&self, cells: &[PlacedRectangle]) -> Vec<Block> {
        let Some(range) = AreaRange::from_areas(cells.iter().map(|c| c.area)) else {
            return Vec::new();
        };
        cells.iter().map(|cell| self.block(cell, range)).collect()
    }

    /// Project one cell, scaling its height within `range`.
    #[must_use]
    pub fn block(&self, cell: &PlacedRectangle, range: AreaRange) -> Block {
        let (w, h) = (self.canvas.width, self.canvas.height);
        let b = cell.bounds;
        let center = Point::new(
            b.x * w - w / 2.0 + b.width * w / 2.0,
            b.y * h - h / 2.0 + b.height * h / 2.0,
        );

        Block {
            label: label_text(&cell.node),
            center,
            width: (b.width * w - self.config.gap).max(0.0),
            depth: (b.height * h - self.config.gap).max(0.0),
            height: self.height(cell.area, range),
            color: cell.color.to_hex(),
        }
    }

    fn height(&self, area: f64, range: AreaRange) -> f64 {
        let ProjectionConfig {
            min_height,
            max_height,
            ..
        } = self.config;
        if range.max - range.min < FLAT_RANGE {
            return min_height;
        }
        (area - range.min) / (range.max - range.min) * (max_height - min_height) + min_height
    }
}

/// Two-line overlay text: the label, then the signed magnitude as a
/// percentage rounded to three decimals.
#[must_use]
pub fn label_text(node: &HierarchyNode) -> String {
    let sign = if node.positive { '+' } else { '-' };
    let rounded = (node.magnitude * 1000.0).round() / 1000.0;
    format!("{}\n{sign}{rounded}%", node.label)
}
