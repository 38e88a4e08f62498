//! Basic 2D value types and tolerances.
//!
//! - `GeomCfg`: centralizes epsilons for duplicate removal and degenerate-area checks.
//! - `Polygon`: implicitly closed vertex ring (hulls are CCW).
//! - `Quad`: four ordered corners, no right-angle requirement; the refinement result.
//! - `Rect`: oriented bounding box (a `Quad` with right angles) plus its area and frame angle.

use nalgebra::Vector2;

use super::util::{cross, segment_crossing, signed_area};

/// A 2D point `(x, y)`.
pub type Point2 = Vector2<f64>;

/// Geometry configuration (tolerances).
///
/// All tolerances are relative to the extent of the input, the diagonal of
/// its bounding box, so results do not depend on where the points sit.
#[derive(Clone, Copy, Debug)]
pub struct GeomCfg {
    /// Points closer than `eps_dedup * extent` are merged before hull construction.
    pub eps_dedup: f64,
    /// Boundary points whose turn has a sine at or below this are collinear.
    pub eps_turn: f64,
    /// Hulls with area at or below `eps_area * extent²` are rejected as degenerate.
    pub eps_area: f64,
}

impl Default for GeomCfg {
    fn default() -> Self {
        Self {
            eps_dedup: 1e-12,
            eps_turn: 1e-10,
            eps_area: 1e-10,
        }
    }
}

/// Ordered vertex ring, last vertex connects back to the first.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Polygon {
    pub verts: Vec<Point2>,
}

impl Polygon {
    #[inline]
    pub fn new(verts: Vec<Point2>) -> Self {
        Self { verts }
    }
    #[inline]
    pub fn len(&self) -> usize {
        self.verts.len()
    }
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.verts.is_empty()
    }
    /// Shoelace area; positive for CCW rings.
    #[inline]
    pub fn signed_area(&self) -> f64 {
        signed_area(&self.verts)
    }
    #[inline]
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }
    #[inline]
    pub fn is_ccw(&self) -> bool {
        self.signed_area() > 0.0
    }

    /// Membership for a convex CCW polygon with slack `eps` (in units of
    /// edge-length × distance, i.e. a cross-product bound).
    pub fn contains_eps(&self, p: Point2, eps: f64) -> bool {
        let n = self.verts.len();
        (0..n).all(|k| cross(self.verts[k], self.verts[(k + 1) % n], p) >= -eps)
    }

    /// Axis-aligned bounds `(min, max)`; `None` for an empty polygon.
    pub fn bbox(&self) -> Option<(Point2, Point2)> {
        let first = *self.verts.first()?;
        let mut lo = first;
        let mut hi = first;
        for p in &self.verts[1..] {
            lo = lo.inf(p);
            hi = hi.sup(p);
        }
        Some((lo, hi))
    }

    /// Area of the axis-aligned bounding box (0 for an empty polygon).
    pub fn bbox_area(&self) -> f64 {
        self.bbox()
            .map(|(lo, hi)| (hi.x - lo.x) * (hi.y - lo.y))
            .unwrap_or(0.0)
    }
}

/// Four ordered corners; not required to be convex or even simple.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quad {
    pub corners: [Point2; 4],
}

impl Quad {
    #[inline]
    pub fn new(corners: [Point2; 4]) -> Self {
        Self { corners }
    }

    /// Build from the flattened corner vector `[x0, y0, x1, y1, x2, y2, x3, y3]`.
    ///
    /// Returns `None` unless `params` has exactly 8 entries.
    pub fn from_params(params: &[f64]) -> Option<Self> {
        if params.len() != 8 {
            return None;
        }
        let mut corners = [Point2::zeros(); 4];
        for (k, c) in corners.iter_mut().enumerate() {
            *c = Point2::new(params[2 * k], params[2 * k + 1]);
        }
        Some(Self { corners })
    }

    /// Flattened corner vector, inverse of `from_params`.
    pub fn to_params(&self) -> [f64; 8] {
        let mut out = [0.0; 8];
        for (k, c) in self.corners.iter().enumerate() {
            out[2 * k] = c.x;
            out[2 * k + 1] = c.y;
        }
        out
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.corners.iter().all(|c| c.x.is_finite() && c.y.is_finite())
    }

    /// Crossing point of opposite edges, together with the index `k` of the
    /// first crossing edge (`k → k+1` crosses `k+2 → k+3`).
    fn crossing(&self) -> Option<(usize, Point2)> {
        let c = &self.corners;
        for k in 0..2 {
            if let Some(x) = segment_crossing(c[k], c[k + 1], c[k + 2], c[(k + 3) % 4]) {
                return Some((k, x));
            }
        }
        None
    }

    /// True for bow-tie quads whose opposite edges cross.
    #[inline]
    pub fn is_self_intersecting(&self) -> bool {
        self.crossing().is_some()
    }

    /// Decompose into simple rings: the quad itself, or the two triangular
    /// lobes of a bow-tie split at the crossing point.
    pub fn simple_parts(&self) -> Vec<Vec<Point2>> {
        let c = &self.corners;
        match self.crossing() {
            None => vec![c.to_vec()],
            Some((k, x)) => {
                // Edge k→k+1 crosses edge k+2→k+3 at x.
                let a = c[k];
                let b = c[k + 1];
                let d = c[k + 2];
                let e = c[(k + 3) % 4];
                vec![vec![x, b, d], vec![x, e, a]]
            }
        }
    }

    /// Enclosed area; bow-ties count both lobes.
    pub fn area(&self) -> f64 {
        self.simple_parts()
            .iter()
            .map(|ring| signed_area(ring).abs())
            .sum()
    }

    #[inline]
    pub fn to_polygon(&self) -> Polygon {
        Polygon::new(self.corners.to_vec())
    }
}

/// Oriented rectangle: corners CCW, `area` = width × height, `angle` is the
/// frame rotation in radians, normalized to `[0, π/2)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub corners: [Point2; 4],
    pub area: f64,
    pub angle: f64,
}

impl Rect {
    #[inline]
    pub fn to_quad(&self) -> Quad {
        Quad::new(self.corners)
    }
}
