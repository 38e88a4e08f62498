//! Curated API surface for the workspace CLI and experiments (UNSTABLE).
//!
//! Breaking changes are allowed; prefer these re-exports over deep paths so
//! call sites survive module moves.

// 2D geometry
pub use crate::geom2::{
    convex_hull, min_area_rect, overlap_cost, Clipper, GeomCfg, Point2, Polygon, Quad, Rect,
    SutherlandHodgman,
};
// Synthetic footprints
pub use crate::geom2::rand::{
    draw_footprint_grid, draw_footprint_quad, FootprintSampleCfg, ReplayToken as FootprintReplay,
};
// Refinement
pub use crate::refine::{
    Convergence, FdScheme, Lbfgs, LbfgsCfg, Minimizer, Minimum, QuadRefiner, RefineCfg,
    Refinement, StopReason,
};
// Pipeline
pub use crate::footprint::{
    valid_pixels, Footprint, FootprintCfg, FootprintExtractor, Identity, PixelFootprint,
    PixelOrigin, PixelToWorld,
};
pub use crate::error::{FootprintError, MappingError};
