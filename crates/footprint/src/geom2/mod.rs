//! 2D footprint geometry (vertex representation).
//!
//! Purpose
//! - Hull, oriented bounding box, and polygon overlap for pixel point sets.
//! - Keep the API minimal and numerically explicit (eps-aware via `GeomCfg`).
//!
//! Conventions
//! - Points are `nalgebra::Vector2<f64>` (`Point2`).
//! - Polygons are implicitly closed vertex rings; hulls are counter-clockwise
//!   starting at the lowest-x (then lowest-y) vertex.
//!
//! Code cross-refs: `Polygon`, `Quad`, `Rect`, `convex_hull`, `min_area_rect`,
//! `Clipper`, `overlap_cost`

pub mod clip;
mod hull;
pub mod rand;
mod rect;
mod types;
pub(crate) mod util;

pub use clip::{overlap_cost, Clipper, SutherlandHodgman};
pub use hull::convex_hull;
pub use rect::min_area_rect;
pub use types::{GeomCfg, Point2, Polygon, Quad, Rect};
