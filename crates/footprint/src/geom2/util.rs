use nalgebra::Vector2;

/// Orientation of `c` relative to the directed line `a → b` (twice the signed
/// triangle area). Positive for a left turn.
#[inline]
pub(crate) fn cross(a: Vector2<f64>, b: Vector2<f64>, c: Vector2<f64>) -> f64 {
    let ab = b - a;
    let ac = c - a;
    ab.x * ac.y - ab.y * ac.x
}

/// Shoelace signed area of a closed ring; positive for CCW.
///
/// Summed about the first vertex, so rings far from the origin keep full precision.
pub(crate) fn signed_area(verts: &[Vector2<f64>]) -> f64 {
    if verts.len() < 3 {
        return 0.0;
    }
    let o = verts[0];
    let mut a = 0.0;
    for i in 1..verts.len() - 1 {
        let p = verts[i] - o;
        let q = verts[i + 1] - o;
        a += p.x * q.y - q.x * p.y;
    }
    0.5 * a
}

/// Proper crossing point of segments `p0p1` and `q0q1` (interiors only).
///
/// Touching at endpoints and collinear overlaps are not crossings.
pub(crate) fn segment_crossing(
    p0: Vector2<f64>,
    p1: Vector2<f64>,
    q0: Vector2<f64>,
    q1: Vector2<f64>,
) -> Option<Vector2<f64>> {
    let r = p1 - p0;
    let s = q1 - q0;
    let denom = r.x * s.y - r.y * s.x;
    if denom.abs() < 1e-15 {
        return None;
    }
    let qp = q0 - p0;
    let t = (qp.x * s.y - qp.y * s.x) / denom;
    let u = (qp.x * r.y - qp.y * r.x) / denom;
    if t > 0.0 && t < 1.0 && u > 0.0 && u < 1.0 {
        Some(p0 + r * t)
    } else {
        None
    }
}

/// Intersection of the segment `a → b` with the infinite line through `p → q`.
/// Caller guarantees `a` and `b` lie on opposite sides of the line.
#[inline]
pub(crate) fn line_cut(
    a: Vector2<f64>,
    b: Vector2<f64>,
    p: Vector2<f64>,
    q: Vector2<f64>,
) -> Vector2<f64> {
    let da = cross(p, q, a);
    let db = cross(p, q, b);
    let t = da / (da - db);
    a + (b - a) * t
}
