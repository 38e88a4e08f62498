use std::cmp::Ordering;

use super::types::{GeomCfg, Point2, Polygon};
use super::util::cross;
use crate::error::{FootprintError, Result};

/// Andrew's monotone chain convex hull.
///
/// Returns the hull CCW, starting at the lowest-x (then lowest-y) point.
/// Near-duplicates are merged; interior and collinear boundary points are
/// dropped. Tolerances in `cfg` scale with the bounding-box diagonal of
/// `points`, so the result is the same wherever the set is placed.
///
/// Errors with `DegenerateInput` for non-finite points, fewer than 3 distinct
/// points, or an all-collinear set.
pub fn convex_hull(points: &[Point2], cfg: GeomCfg) -> Result<Polygon> {
    if let Some(p) = points.iter().find(|p| !(p.x.is_finite() && p.y.is_finite())) {
        return Err(FootprintError::degenerate(format!(
            "non-finite point ({}, {})",
            p.x, p.y
        )));
    }
    let extent = extent(points);
    let mut pts: Vec<Point2> = points.to_vec();
    pts.sort_by(|a, b| match a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal) {
        Ordering::Equal => a.y.partial_cmp(&b.y).unwrap_or(Ordering::Equal),
        o => o,
    });
    pts.dedup_by(|a, b| (*a - *b).norm() <= cfg.eps_dedup * extent);
    if pts.len() < 3 {
        return Err(FootprintError::degenerate(format!(
            "{} distinct points, need at least 3",
            pts.len()
        )));
    }

    // Strict left turn: sin(angle at a between a→b and a→p) above eps_turn.
    let left = |a: Point2, b: Point2, p: Point2| {
        cross(a, b, p) > cfg.eps_turn * (b - a).norm() * (p - a).norm()
    };
    let mut lower: Vec<Point2> = Vec::with_capacity(pts.len());
    for p in &pts {
        while lower.len() >= 2 && !left(lower[lower.len() - 2], lower[lower.len() - 1], *p) {
            lower.pop();
        }
        lower.push(*p);
    }
    let mut upper: Vec<Point2> = Vec::with_capacity(pts.len());
    for p in pts.iter().rev() {
        while upper.len() >= 2 && !left(upper[upper.len() - 2], upper[upper.len() - 1], *p) {
            upper.pop();
        }
        upper.push(*p);
    }
    lower.pop();
    upper.pop();
    let mut verts = lower;
    verts.extend(upper);

    let hull = Polygon::new(verts);
    if hull.len() < 3 || hull.area() <= cfg.eps_area * extent * extent {
        return Err(FootprintError::degenerate(format!(
            "collinear point set ({} distinct points)",
            pts.len()
        )));
    }
    Ok(hull)
}

/// Diagonal length of the axis-aligned bounding box of `points`.
fn extent(points: &[Point2]) -> f64 {
    let Some(&first) = points.first() else {
        return 0.0;
    };
    let (mut lo, mut hi) = (first, first);
    for p in &points[1..] {
        lo = lo.inf(p);
        hi = hi.sup(p);
    }
    (hi - lo).norm()
}
