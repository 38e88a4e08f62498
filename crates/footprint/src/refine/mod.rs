//! Quadrilateral refinement.
//!
//! Purpose
//! - Start from the minimum-area rectangle and move its four corners (8 free
//!   coordinates) to minimize the symmetric-difference area against the hull.
//!   Rotated mosaics are better approximated by a general quadrilateral than
//!   by their bounding rectangle.
//!
//! Policy
//! - Local search only; the rectangle seed is close to the optimum.
//! - Non-convergence is reported, never fatal: the best iterate is returned
//!   and is never worse than the seed.
//!
//! Code cross-refs: `geom2::overlap_cost`, `Minimizer`, `Lbfgs`

mod lbfgs;

pub use lbfgs::{FdScheme, Lbfgs, LbfgsCfg, Minimizer, Minimum, StopReason};

use crate::geom2::{overlap_cost, Clipper, Point2, Polygon, Quad, SutherlandHodgman};

/// Refinement configuration.
#[derive(Clone, Copy, Debug, Default)]
pub struct RefineCfg {
    pub lbfgs: LbfgsCfg,
    /// If set, every corner coordinate is boxed to the bounding box of the
    /// reference and the seed, grown by this margin.
    pub bbox_margin: Option<f64>,
}

/// Convergence flag of a refinement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Convergence {
    Converged,
    /// Iteration or evaluation budget exhausted; the quad is still usable.
    NotConverged,
}

/// Refinement result.
#[derive(Clone, Debug)]
pub struct Refinement {
    pub quad: Quad,
    /// Symmetric-difference area of `quad` against the reference.
    pub cost: f64,
    /// Same measure for the seed.
    pub seed_cost: f64,
    pub iterations: usize,
    pub evaluations: usize,
    pub stop: StopReason,
}

impl Refinement {
    #[inline]
    pub fn convergence(&self) -> Convergence {
        if self.stop.is_converged() {
            Convergence::Converged
        } else {
            Convergence::NotConverged
        }
    }
    #[inline]
    pub fn converged(&self) -> bool {
        self.convergence() == Convergence::Converged
    }
    /// Cost reduction relative to the seed (non-negative).
    #[inline]
    pub fn improvement(&self) -> f64 {
        self.seed_cost - self.cost
    }
}

/// Drives a `Minimizer` over the 8 corner coordinates of a quad.
#[derive(Clone, Debug)]
pub struct QuadRefiner<M: Minimizer = Lbfgs, C: Clipper = SutherlandHodgman> {
    minimizer: M,
    clipper: C,
    bbox_margin: Option<f64>,
}

impl QuadRefiner {
    pub fn new(cfg: RefineCfg) -> Self {
        Self {
            minimizer: Lbfgs::new(cfg.lbfgs),
            clipper: SutherlandHodgman,
            bbox_margin: cfg.bbox_margin,
        }
    }
}

impl Default for QuadRefiner {
    fn default() -> Self {
        Self::new(RefineCfg::default())
    }
}

impl<M: Minimizer, C: Clipper> QuadRefiner<M, C> {
    /// Assemble from a custom minimizer and clipper.
    pub fn with_parts(minimizer: M, clipper: C, bbox_margin: Option<f64>) -> Self {
        Self {
            minimizer,
            clipper,
            bbox_margin,
        }
    }

    /// Refine `seed` towards the convex `reference`.
    pub fn refine(&self, seed: &Quad, reference: &Polygon) -> Refinement {
        let x0 = seed.to_params();
        let seed_cost = overlap_cost(&x0, reference, &self.clipper);
        let bounds = self
            .bbox_margin
            .and_then(|margin| corner_bounds(seed, reference, margin));

        let clipper = &self.clipper;
        let mut objective = |x: &[f64]| overlap_cost(x, reference, clipper);
        let min = self
            .minimizer
            .minimize(&mut objective, &x0, bounds.as_deref());

        let (quad, cost) = match Quad::from_params(&min.x) {
            Some(q) if min.f <= seed_cost => (q, min.f),
            _ => (*seed, seed_cost),
        };
        let out = Refinement {
            quad,
            cost,
            seed_cost,
            iterations: min.iterations,
            evaluations: min.evaluations,
            stop: min.stop,
        };
        if out.converged() {
            tracing::debug!(
                seed_cost,
                cost,
                iterations = out.iterations,
                evaluations = out.evaluations,
                stop = %out.stop,
                "quad refined"
            );
        } else {
            tracing::warn!(
                seed_cost,
                cost,
                evaluations = out.evaluations,
                stop = %out.stop,
                "quad refinement did not fully converge; returning best iterate"
            );
        }
        out
    }
}

/// Per-coordinate box from the joint bounding box of `reference` and `seed`.
fn corner_bounds(seed: &Quad, reference: &Polygon, margin: f64) -> Option<Vec<(f64, f64)>> {
    let (mut lo, mut hi) = reference.bbox()?;
    for c in &seed.corners {
        lo = lo.inf(c);
        hi = hi.sup(c);
    }
    let m = Point2::repeat(margin.max(0.0));
    lo -= m;
    hi += m;
    Some((0..4).flat_map(|_| [(lo.x, hi.x), (lo.y, hi.y)]).collect())
}

#[cfg(test)]
mod tests;
