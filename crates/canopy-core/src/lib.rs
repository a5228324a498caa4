#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::unwrap_used)]
//! Core types for the Canopy treemap engine.
//!
//! This crate provides the data shared by the layout engine and its callers:
//! - Hierarchy data: [`HierarchyNode`], [`NodeRef`]
//! - Geometric primitives: [`Point`], [`Rect`]
//! - Color representation: [`Color`]
//! - Errors: [`LayoutError`], [`ErrorKind`]
//! - Caller-side aggregation: [`group_by_mean`]

mod aggregate;
mod color;
mod error;
mod geometry;
mod node;

pub use aggregate::group_by_mean;
pub use color::{Color, ColorParseError};
pub use error::{ErrorKind, LayoutError, Result};
pub use geometry::{Point, Rect};
pub use node::{HierarchyNode, NodeRef};
