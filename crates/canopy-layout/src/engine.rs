//! Layout engine: normalize, squarify and color one hierarchy level, and
//! navigate between levels.

use canopy_core::{Color, LayoutError, NodeRef, Point, Rect, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, debug_span};

use crate::color_map::{AreaRange, ColorMapper, ColorScheme};
use crate::normalize::normalize;
use crate::squarify::squarify;

/// Canvas dimensions in caller units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Canvas {
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
}

impl Canvas {
    /// Create a canvas.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Total area.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Check the dimensions are usable.
    pub fn validate(&self) -> Result<()> {
        let ok = |v: f64| v.is_finite() && v > 0.0;
        if ok(self.width) && ok(self.height) {
            Ok(())
        } else {
            Err(LayoutError::invariant(format!(
                "canvas must have positive finite size, got {} x {}",
                self.width, self.height
            )))
        }
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new(100.0, 100.0)
    }
}

/// A laid-out cell.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedRectangle {
    /// The node this cell represents.
    pub node: NodeRef,
    /// Position and size as fractions of the canvas.
    pub bounds: Rect,
    /// The node's normalized area, in canvas units.
    pub area: f64,
    /// Fill color.
    pub color: Color,
}

impl PlacedRectangle {
    /// Whether selecting this cell drills down.
    #[must_use]
    pub fn is_navigable(&self) -> bool {
        self.node.is_group()
    }

    fn same_cell(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.node, &other.node) && self.bounds == other.bounds
    }
}

/// Which level the engine is showing.
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    /// The top-level nodes given at construction.
    Root,
    /// The children of a group node.
    Drilled(NodeRef),
}

/// Treemap layout engine with drill-down navigation.
///
/// Holds the root level for roll-up and the most recent layout for
/// interrogation. Not synchronized: use one engine per thread.
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    canvas: Canvas,
    colors: ColorMapper,
    root_nodes: Vec<NodeRef>,
    current: Vec<PlacedRectangle>,
    trail: Vec<NodeRef>,
}

impl LayoutEngine {
    /// Create an engine and lay out the root level.
    ///
    /// Fails if the canvas is unusable or the root level is degenerate.
    pub fn new(root_nodes: Vec<NodeRef>, canvas: Canvas) -> Result<Self> {
        Self::with_color_scheme(root_nodes, canvas, ColorScheme::default())
    }

    /// Like [`LayoutEngine::new`] with a custom color scheme.
    pub fn with_color_scheme(
        root_nodes: Vec<NodeRef>,
        canvas: Canvas,
        scheme: ColorScheme,
    ) -> Result<Self> {
        canvas.validate()?;
        let mut engine = Self {
            canvas,
            colors: ColorMapper::new(scheme),
            root_nodes,
            current: Vec::new(),
            trail: Vec::new(),
        };
        let roots = engine.root_nodes.clone();
        engine.compute(&roots)?;
        Ok(engine)
    }

    /// Lay out one sibling list and make it the current layout.
    ///
    /// Does not change the view. On error the current layout is kept.
    pub fn compute(&mut self, nodes: &[NodeRef]) -> Result<&[PlacedRectangle]> {
        let _span = debug_span!("compute", nodes = nodes.len()).entered();

        let normalized = normalize(nodes, self.canvas.area())?;
        let range = AreaRange::of(&normalized).ok_or(LayoutError::EmptyLevel)?;
        let placed = squarify(&normalized, self.canvas.width, self.canvas.height)?;

        self.current = placed
            .into_iter()
            .map(|p| PlacedRectangle {
                node: Arc::clone(p.normalized.node),
                bounds: p.bounds,
                area: p.normalized.area,
                color: self.colors.color(p.normalized.node, range, p.normalized.area),
            })
            .collect();

        debug!(cells = self.current.len(), "layout computed");
        Ok(&self.current)
    }

    /// Drill into a cell of the current layout.
    ///
    /// Returns `Ok(false)` for leaf cells, which are not navigable.
    pub fn select_cell(&mut self, rect: &PlacedRectangle) -> Result<bool> {
        if !self.current.iter().any(|r| r.same_cell(rect)) {
            return Err(LayoutError::StaleCell {
                label: rect.node.label.clone(),
            });
        }
        self.drill(Arc::clone(&rect.node))
    }

    /// Drill into the cell at `index` in [`current`](Self::current).
    pub fn select_index(&mut self, index: usize) -> Result<bool> {
        let node = self
            .current
            .get(index)
            .map(|r| Arc::clone(&r.node))
            .ok_or(LayoutError::NoSuchCell {
                index,
                len: self.current.len(),
            })?;
        self.drill(node)
    }

    /// The current cell containing `point` (canvas fractions), if any.
    #[must_use]
    pub fn hit_test(&self, point: Point) -> Option<&PlacedRectangle> {
        self.current.iter().find(|r| r.bounds.contains_point(&point))
    }

    /// Go back to the root level.
    pub fn return_to_root(&mut self) -> Result<&[PlacedRectangle]> {
        debug!(from_depth = self.trail.len(), "returning to root");
        let roots = self.root_nodes.clone();
        self.compute(&roots)?;
        self.trail.clear();
        Ok(&self.current)
    }

    /// Go up one level. At the root this is a no-op.
    pub fn back(&mut self) -> Result<&[PlacedRectangle]> {
        let Some((_, parents)) = self.trail.split_last() else {
            return Ok(&self.current);
        };
        let level = match parents.last() {
            Some(parent) => parent.children.clone(),
            None => self.root_nodes.clone(),
        };
        self.compute(&level)?;
        self.trail.pop();
        Ok(&self.current)
    }

    fn drill(&mut self, node: NodeRef) -> Result<bool> {
        if node.is_leaf() {
            debug!(label = %node.label, "leaf cell selected, nothing to drill into");
            return Ok(false);
        }
        debug!(label = %node.label, children = node.children.len(), "drilling down");
        self.compute(&node.children)?;
        self.trail.push(node);
        Ok(true)
    }

    /// The level being shown.
    #[must_use]
    pub fn view(&self) -> View {
        self.trail
            .last()
            .map_or(View::Root, |node| View::Drilled(Arc::clone(node)))
    }

    /// Group nodes drilled through to reach the current level, outermost first.
    #[must_use]
    pub fn trail(&self) -> &[NodeRef] {
        &self.trail
    }

    /// The most recent layout.
    #[must_use]
    pub fn current(&self) -> &[PlacedRectangle] {
        &self.current
    }

    /// The top-level nodes.
    #[must_use]
    pub fn root_nodes(&self) -> &[NodeRef] {
        &self.root_nodes
    }

    /// Canvas dimensions.
    #[must_use]
    pub const fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Color mapper in use.
    #[must_use]
    pub const fn colors(&self) -> &ColorMapper {
        &self.colors
    }
}
