#![forbid(unsafe_code)]

//! Geometry kernel for flattening SVG content.
//!
//! - [`AffineTransform`]: 2D affine matrix with cached structural state and geometric kind
//! - [`transform_path`]: applies a transform to parsed path commands, re-solving arcs
//! - [`EllipseSolver`]: radii and rotation of an elliptical arc after an affine map
//! - [`Bounds`] / [`SegmentPath`]: tight curve bounds via derivative roots
//! - [`arc_to_cubics`]: elliptical arc to cubic Bezier approximation
//!
//! Everything here is pure and allocation-light. Transforms are `Send` but not `Sync`, because
//! the geometric kind is cached lazily behind a `Cell`.

pub mod affine;
pub mod arc;
pub mod bounds;
pub mod ellipse;
pub mod error;
pub mod geom;
pub mod path;
pub mod transform_list;

pub use affine::{AffineTransform, TransformKind, TransformState};
pub use arc::{CubicSegment, CubicSink, arc_to_cubics, arcs_to_cubics};
pub use bounds::{
    Bounds, Roots, Segment, SegmentPath, accumulate_cubic_extrema, accumulate_quad_extrema,
    path_bounds, solve_quadratic,
};
pub use ellipse::{ArcParams, EllipseSolver, SolvedArc};
pub use error::{Error, Result};
pub use path::{
    PathCommand, PathFormatter, PathKind, has_rel_move_after_close, parse_path, transform_path,
    transform_path_data,
};
pub use transform_list::parse_transform_list;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests;
