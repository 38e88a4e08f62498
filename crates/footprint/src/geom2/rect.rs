//! Minimum-area enclosing rectangle by edge-aligned rotating calipers.
//!
//! The optimal rectangle of a convex polygon has one side flush with a hull
//! edge, so only the edge directions (mod π/2) need testing.

use std::f64::consts::FRAC_PI_2;

use nalgebra::Rotation2;

use super::types::{Point2, Polygon, Rect};
use crate::error::{FootprintError, Result};

/// Edge angles this close to π/2 are the same frame as angle 0.
const ANGLE_WRAP_EPS: f64 = 1e-12;

/// Edge direction folded into `[0, π/2)`.
#[inline]
fn frame_angle(edge: Point2) -> f64 {
    let a = edge.y.atan2(edge.x).rem_euclid(FRAC_PI_2);
    if a >= FRAC_PI_2 - ANGLE_WRAP_EPS {
        0.0
    } else {
        a
    }
}

/// Minimum-area rectangle containing every vertex of the convex `hull`.
///
/// Ties resolve to the first minimal edge in hull order. Corners are CCW:
/// (min x, min y), (max x, min y), (max x, max y), (min x, max y) in the
/// rotated frame, mapped back to the input frame.
pub fn min_area_rect(hull: &Polygon) -> Result<Rect> {
    let n = hull.len();
    if n < 3 {
        return Err(FootprintError::degenerate(format!(
            "hull has {n} vertices, need at least 3"
        )));
    }
    let mut best: Option<(f64, f64, Point2, Point2)> = None;
    for k in 0..n {
        let edge = hull.verts[(k + 1) % n] - hull.verts[k];
        if edge.norm_squared() == 0.0 {
            continue;
        }
        let theta = frame_angle(edge);
        // Coordinates in the frame rotated by theta.
        let to_frame = Rotation2::new(-theta);
        let mut lo = Point2::repeat(f64::INFINITY);
        let mut hi = Point2::repeat(f64::NEG_INFINITY);
        for p in &hull.verts {
            let q = to_frame * *p;
            lo = lo.inf(&q);
            hi = hi.sup(&q);
        }
        let area = (hi.x - lo.x) * (hi.y - lo.y);
        if best.map_or(true, |(a, ..)| area < a) {
            best = Some((area, theta, lo, hi));
        }
    }
    let (area, angle, lo, hi) =
        best.ok_or_else(|| FootprintError::degenerate("hull has no non-zero edge"))?;
    if !area.is_finite() {
        return Err(FootprintError::degenerate("non-finite rectangle area"));
    }
    let from_frame = Rotation2::new(angle);
    let corners = [
        from_frame * Point2::new(lo.x, lo.y),
        from_frame * Point2::new(hi.x, lo.y),
        from_frame * Point2::new(hi.x, hi.y),
        from_frame * Point2::new(lo.x, hi.y),
    ];
    tracing::trace!(area, angle, "min_area_rect");
    Ok(Rect {
        corners,
        area,
        angle,
    })
}
