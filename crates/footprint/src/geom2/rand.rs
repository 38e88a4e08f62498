//! Synthetic image footprints (rotated, jittered quads rasterized onto a grid).
//!
//! Purpose
//! - Deterministic test and benchmark inputs that look like real mosaics: a
//!   grid of samples that are finite inside a rotated quadrilateral and NaN
//!   outside.
//!
//! Model
//! - Start from a rectangle centered in the grid, rotate it by a random angle,
//!   jitter each corner by a bounded fraction of the shorter side.
//! - Determinism uses a replay token `(seed, index)` mixed into a single RNG.

use nalgebra::DMatrix;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::types::{Point2, Quad};

/// Sampler configuration.
#[derive(Clone, Copy, Debug)]
pub struct FootprintSampleCfg {
    /// Grid columns (x extent).
    pub width: usize,
    /// Grid rows (y extent).
    pub height: usize,
    /// Rectangle side lengths as a fraction of the rotated-fit size. Clamped to [0.05, 1].
    pub fill_frac: f64,
    /// Aspect ratio (long side / short side) before rotation; values below 1 are treated as 1.
    pub aspect: f64,
    /// Corner jitter as a fraction of the short side. Clamped to [0, 0.2].
    pub corner_jitter: f64,
    /// Random rotation in [0, π)? Otherwise axis-aligned.
    pub random_rotation: bool,
}

impl Default for FootprintSampleCfg {
    fn default() -> Self {
        Self {
            width: 96,
            height: 80,
            fill_frac: 0.8,
            aspect: 1.6,
            corner_jitter: 0.08,
            random_rotation: true,
        }
    }
}

/// Replay token to make draws reproducible and indexable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplayToken {
    pub seed: u64,
    pub index: u64,
}

impl ReplayToken {
    #[inline]
    fn to_std_rng(self) -> StdRng {
        // SplitMix64-style finalizer.
        fn mix(mut x: u64) -> u64 {
            x ^= x >> 30;
            x = x.wrapping_mul(0xbf58476d1ce4e5b9);
            x ^= x >> 27;
            x = x.wrapping_mul(0x94d049bb133111eb);
            x ^ (x >> 31)
        }
        let k = mix(self.seed ^ mix(self.index.wrapping_add(0x9e3779b97f4a7c15)));
        StdRng::seed_from_u64(k)
    }
}

/// Draw a footprint quad (CCW corners) that fits inside the configured grid.
pub fn draw_footprint_quad(cfg: FootprintSampleCfg, tok: ReplayToken) -> Quad {
    let mut rng = tok.to_std_rng();
    draw_quad_with(&cfg, &mut rng)
}

fn draw_quad_with(cfg: &FootprintSampleCfg, rng: &mut StdRng) -> Quad {
    let w = cfg.width.max(4) as f64;
    let h = cfg.height.max(4) as f64;
    let center = Point2::new(0.5 * (w - 1.0), 0.5 * (h - 1.0));
    let theta = if cfg.random_rotation {
        rng.gen::<f64>() * std::f64::consts::PI
    } else {
        0.0
    };
    let (s, c) = theta.sin_cos();
    let aspect = cfg.aspect.max(1.0);
    let fill = cfg.fill_frac.clamp(0.05, 1.0);
    let jitter = cfg.corner_jitter.clamp(0.0, 0.2);

    // Largest short side `b` such that the rotated (aspect·b) × b box fits.
    let span_x = aspect * c.abs() + s.abs();
    let span_y = aspect * s.abs() + c.abs();
    let b = fill * ((w - 1.0) / span_x).min((h - 1.0) / span_y)
        / (1.0 + 2.0 * std::f64::consts::SQRT_2 * jitter);
    let a = aspect * b;

    let local = [
        Point2::new(-0.5 * a, -0.5 * b),
        Point2::new(0.5 * a, -0.5 * b),
        Point2::new(0.5 * a, 0.5 * b),
        Point2::new(-0.5 * a, 0.5 * b),
    ];
    let mut corners = [Point2::zeros(); 4];
    for (out, p) in corners.iter_mut().zip(local) {
        let dj = Point2::new(
            (rng.gen::<f64>() * 2.0 - 1.0) * jitter * b,
            (rng.gen::<f64>() * 2.0 - 1.0) * jitter * b,
        );
        let q = p + dj;
        *out = center + Point2::new(c * q.x - s * q.y, s * q.x + c * q.y);
    }
    Quad::new(corners)
}

/// Rasterize a drawn footprint: samples are finite (random positive values)
/// where the pixel center lies inside the quad and NaN elsewhere.
///
/// Grid layout matches image convention: row index = y, column index = x.
pub fn draw_footprint_grid(cfg: FootprintSampleCfg, tok: ReplayToken) -> (DMatrix<f64>, Quad) {
    let mut rng = tok.to_std_rng();
    let quad = draw_quad_with(&cfg, &mut rng);
    let rows = cfg.height.max(4);
    let cols = cfg.width.max(4);
    let mut grid = DMatrix::from_element(rows, cols, f64::NAN);
    for r in 0..rows {
        for col in 0..cols {
            let p = Point2::new(col as f64, r as f64);
            if inside_even_odd(&quad.corners, p) {
                grid[(r, col)] = 1.0 + rng.gen::<f64>();
            }
        }
    }
    (grid, quad)
}

/// Even-odd point-in-ring test.
fn inside_even_odd(ring: &[Point2], p: Point2) -> bool {
    let n = ring.len();
    let mut inside = false;
    for i in 0..n {
        let a = ring[i];
        let b = ring[(i + 1) % n];
        if (a.y > p.y) != (b.y > p.y) {
            let x_at = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if p.x < x_at {
                inside = !inside;
            }
        }
    }
    inside
}
