//! Polygon clipping capability and the overlap objective.
//!
//! `Clipper` is the seam for area-based boolean operations: the refinement
//! objective only needs areas of intersections, differences and unions, so
//! any planar clipping algorithm can stand behind it.
//!
//! `SutherlandHodgman` clips a simple subject against a convex clip ring. The
//! reference polygon in this crate is always a convex hull, which is exactly
//! the case the algorithm handles; the subject may be concave.

use super::types::{Point2, Polygon, Quad};
use super::util::{cross, line_cut, signed_area};

/// Area-valued boolean operations between a subject ring and a convex clip polygon.
pub trait Clipper {
    /// Enclosed area of a simple ring (orientation-agnostic).
    fn area(&self, ring: &[Point2]) -> f64 {
        signed_area(ring).abs()
    }

    /// Area of `subject ∩ clip`; `clip` must be convex.
    fn intersection_area(&self, subject: &[Point2], clip: &Polygon) -> f64;

    /// Area of `subject \ clip`.
    fn difference_area(&self, subject: &[Point2], clip: &Polygon) -> f64 {
        (self.area(subject) - self.intersection_area(subject, clip)).max(0.0)
    }

    /// Area of `clip \ subject`.
    fn reverse_difference_area(&self, subject: &[Point2], clip: &Polygon) -> f64 {
        (self.area(&clip.verts) - self.intersection_area(subject, clip)).max(0.0)
    }

    /// Area of `subject ∪ clip`.
    fn union_area(&self, subject: &[Point2], clip: &Polygon) -> f64 {
        self.area(subject) + self.area(&clip.verts) - self.intersection_area(subject, clip)
    }

    /// Area present in exactly one of the two polygons.
    fn symmetric_difference_area(&self, subject: &[Point2], clip: &Polygon) -> f64 {
        let inter = self.intersection_area(subject, clip);
        (self.area(subject) + self.area(&clip.verts) - 2.0 * inter).max(0.0)
    }
}

/// Sutherland–Hodgman clipping against a convex ring of either orientation.
#[derive(Clone, Copy, Debug, Default)]
pub struct SutherlandHodgman;

impl SutherlandHodgman {
    /// Vertices of `subject ∩ clip` (may contain zero-area bridges for concave subjects).
    pub fn clip(&self, subject: &[Point2], clip: &Polygon) -> Vec<Point2> {
        let n = clip.len();
        if n < 3 || subject.len() < 3 {
            return Vec::new();
        }
        // Inside = left of each edge for CCW clips; flip for CW.
        let sign = if clip.signed_area() >= 0.0 { 1.0 } else { -1.0 };
        let mut output: Vec<Point2> = subject.to_vec();
        for k in 0..n {
            if output.is_empty() {
                break;
            }
            let p = clip.verts[k];
            let q = clip.verts[(k + 1) % n];
            let input = std::mem::take(&mut output);
            let m = input.len();
            for i in 0..m {
                let cur = input[i];
                let prev = input[(i + m - 1) % m];
                let cur_in = sign * cross(p, q, cur) >= 0.0;
                let prev_in = sign * cross(p, q, prev) >= 0.0;
                if cur_in {
                    if !prev_in {
                        output.push(line_cut(prev, cur, p, q));
                    }
                    output.push(cur);
                } else if prev_in {
                    output.push(line_cut(prev, cur, p, q));
                }
            }
        }
        output
    }
}

impl Clipper for SutherlandHodgman {
    fn intersection_area(&self, subject: &[Point2], clip: &Polygon) -> f64 {
        signed_area(&self.clip(subject, clip)).abs()
    }
}

/// Symmetric-difference area between the quad encoded by `params`
/// (`[x0, y0, .., x3, y3]`) and the convex `reference` polygon.
///
/// Bow-tie quads are scored lobe by lobe so the area stays exact. Malformed
/// or non-finite parameters score `f64::INFINITY`; the result is never negative.
pub fn overlap_cost<C: Clipper + ?Sized>(params: &[f64], reference: &Polygon, clipper: &C) -> f64 {
    let quad = match Quad::from_params(params) {
        Some(q) if q.is_finite() => q,
        _ => return f64::INFINITY,
    };
    let mut quad_area = 0.0;
    let mut inter = 0.0;
    for ring in quad.simple_parts() {
        quad_area += clipper.area(&ring);
        inter += clipper.intersection_area(&ring, reference);
    }
    (quad_area + clipper.area(&reference.verts) - 2.0 * inter).max(0.0)
}
