#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::doc_markdown)]
//! Squarified treemap layout engine.
//!
//! Lays out one level of a weighted hierarchy of signed values as
//! non-overlapping, area-proportional, near-square cells on a fixed canvas,
//! colors each cell by sign and relative size, and navigates between levels.
//!
//! # Pipeline
//!
//! - [`normalize`]: rescales sibling magnitudes so they sum to the canvas area
//! - [`squarify`]: partitions the canvas into rows and columns of cells
//! - [`ColorMapper`]: picks a hue by sign and a brightness by area
//! - [`LayoutEngine`]: runs the three in order and tracks drill-down state
//!
//! Output geometry is in canvas fractions; [`Projection`] maps it back onto a
//! centered canvas for block scenes.

mod color_map;
mod config;
mod engine;
mod normalize;
mod projection;
mod squarify;

pub use color_map::{AreaRange, ColorMapper, ColorScheme};
pub use config::{ConfigError, LayoutConfig};
pub use engine::{Canvas, LayoutEngine, PlacedRectangle, View};
pub use normalize::{normalize, NormalizedNode};
pub use projection::{label_text, Block, Projection, ProjectionConfig};
pub use squarify::{squarify, Orientation, Placement};
