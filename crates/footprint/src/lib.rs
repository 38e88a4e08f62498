//! Image footprint geometry.
//!
//! Given the finite pixels of an image, compute a compact quadrilateral that
//! tightly bounds them:
//!
//! 1. convex hull of the valid pixel coordinates (`geom2::convex_hull`),
//! 2. minimum-area enclosing rectangle by rotating calipers (`geom2::min_area_rect`),
//! 3. quadrilateral refinement that minimizes the symmetric-difference area
//!    against the hull (`refine::QuadRefiner`),
//! 4. corner mapping through an injected pixel-to-world collaborator
//!    (`footprint::FootprintExtractor`).
//!
//! API Policy
//! - The crate is consumed by the workspace CLI. There is no stable public API;
//!   prefer the `api` surface or the `prelude` for imports.
//! - Everything is synchronous and allocation-local: independent calls can run
//!   on separate threads without coordination.

pub mod api;
pub mod error;
pub mod footprint;
pub mod geom2;
pub mod refine;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use error::{FootprintError, MappingError, Result};
pub use geom2::{GeomCfg, Point2, Polygon, Quad, Rect};
pub use nalgebra::{DMatrix, Vector2 as Vec2};

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::footprint::{
        valid_pixels, Footprint, FootprintCfg, FootprintExtractor, Identity, PixelFootprint,
        PixelOrigin, PixelToWorld,
    };
    pub use crate::geom2::{
        convex_hull, min_area_rect, overlap_cost, Clipper, GeomCfg, Point2, Polygon, Quad, Rect,
        SutherlandHodgman,
    };
    pub use crate::refine::{
        Convergence, FdScheme, Lbfgs, LbfgsCfg, Minimizer, QuadRefiner, RefineCfg, Refinement,
        StopReason,
    };
    pub use crate::{FootprintError, MappingError};
    pub use nalgebra::{DMatrix, Vector2 as Vec2};
}
