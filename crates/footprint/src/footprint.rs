//! Footprint extraction: valid pixels → hull → rectangle → refined quad → world corners.
//!
//! Purpose
//! - Drive the geometry pipeline for one image and hand the four refined
//!   corners to an injected pixel-to-world collaborator.
//!
//! Conventions
//! - Grids follow image layout: row index = y, column index = x. A valid pixel
//!   at `grid[(row, col)]` becomes the point `(col, row)`.
//! - Pixel coordinates are shifted by `PixelOrigin` only at the mapping step;
//!   every intermediate (`PixelFootprint`) stays 0-indexed.
//!
//! Code cross-refs: `geom2::convex_hull`, `geom2::min_area_rect`, `refine::QuadRefiner`

use nalgebra::DMatrix;

use crate::error::{FootprintError, MappingError, Result};
use crate::geom2::{convex_hull, min_area_rect, GeomCfg, Point2, Polygon, Quad, Rect};
use crate::refine::{Convergence, QuadRefiner, RefineCfg, Refinement};

/// Maps pixel coordinates to world coordinates (typically a celestial WCS).
///
/// Implementations must return exactly one output point per input point, in order.
pub trait PixelToWorld {
    fn pix_to_world(&self, pixels: &[Point2]) -> std::result::Result<Vec<Point2>, MappingError>;
}

/// Returns pixel coordinates unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct Identity;

impl PixelToWorld for Identity {
    fn pix_to_world(&self, pixels: &[Point2]) -> std::result::Result<Vec<Point2>, MappingError> {
        Ok(pixels.to_vec())
    }
}

impl<F> PixelToWorld for F
where
    F: Fn(&[Point2]) -> Vec<Point2>,
{
    fn pix_to_world(&self, pixels: &[Point2]) -> std::result::Result<Vec<Point2>, MappingError> {
        Ok(self(pixels))
    }
}

/// Index base the mapping collaborator expects.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PixelOrigin {
    /// First pixel center at (0, 0).
    #[default]
    Zero,
    /// First pixel center at (1, 1) (FITS convention).
    One,
}

impl PixelOrigin {
    #[inline]
    pub fn offset(self) -> f64 {
        match self {
            PixelOrigin::Zero => 0.0,
            PixelOrigin::One => 1.0,
        }
    }
}

/// Extraction configuration.
#[derive(Clone, Copy, Debug, Default)]
pub struct FootprintCfg {
    pub geom: GeomCfg,
    pub origin: PixelOrigin,
    pub refine: RefineCfg,
}

/// Pixel-space diagnostics of one extraction (0-indexed).
#[derive(Clone, Debug)]
pub struct PixelFootprint {
    /// Number of finite samples used.
    pub n_valid: usize,
    pub hull: Polygon,
    /// Minimum-area rectangle (refinement seed).
    pub rect: Rect,
    pub refinement: Refinement,
}

impl PixelFootprint {
    #[inline]
    pub fn quad(&self) -> &Quad {
        &self.refinement.quad
    }
}

/// Final footprint: the refined corners in the collaborator's space.
#[derive(Clone, Debug)]
pub struct Footprint {
    pub corners: [Point2; 4],
    pub pixel: PixelFootprint,
}

impl Footprint {
    #[inline]
    pub fn convergence(&self) -> Convergence {
        self.pixel.refinement.convergence()
    }
}

/// Coordinates `(col, row)` of every finite sample, in row-major scan order.
pub fn valid_pixels(grid: &DMatrix<f64>) -> Vec<Point2> {
    let (rows, cols) = grid.shape();
    let mut out = Vec::new();
    for r in 0..rows {
        for c in 0..cols {
            if grid[(r, c)].is_finite() {
                out.push(Point2::new(c as f64, r as f64));
            }
        }
    }
    out
}

/// Orchestrates the footprint pipeline for single images.
#[derive(Clone, Debug, Default)]
pub struct FootprintExtractor {
    cfg: FootprintCfg,
    refiner: QuadRefiner,
}

impl FootprintExtractor {
    pub fn new(cfg: FootprintCfg) -> Self {
        Self {
            cfg,
            refiner: QuadRefiner::new(cfg.refine),
        }
    }

    /// Hull, rectangle and refined quad of a point set (pixel space).
    pub fn corners_from_points(&self, points: &[Point2]) -> Result<PixelFootprint> {
        if points.len() < 3 {
            return Err(FootprintError::InsufficientData {
                found: points.len(),
            });
        }
        let hull = convex_hull(points, self.cfg.geom)?;
        let rect = min_area_rect(&hull)?;
        tracing::debug!(
            n = points.len(),
            hull = hull.len(),
            hull_area = hull.area(),
            rect_area = rect.area,
            angle = rect.angle,
            "footprint seed"
        );
        let refinement = self.refiner.refine(&rect.to_quad(), &hull);
        Ok(PixelFootprint {
            n_valid: points.len(),
            hull,
            rect,
            refinement,
        })
    }

    /// Pixel-space footprint of the finite samples in `grid`.
    pub fn extract_pixels(&self, grid: &DMatrix<f64>) -> Result<PixelFootprint> {
        let points = valid_pixels(grid);
        tracing::debug!(
            rows = grid.nrows(),
            cols = grid.ncols(),
            valid = points.len(),
            "collected valid pixels"
        );
        self.corners_from_points(&points)
    }

    /// Full extraction: refined corners mapped through `wcs`.
    pub fn extract<W: PixelToWorld + ?Sized>(
        &self,
        grid: &DMatrix<f64>,
        wcs: &W,
    ) -> Result<Footprint> {
        let pixel = self.extract_pixels(grid)?;
        let corners = self.map_corners(pixel.quad(), wcs)?;
        Ok(Footprint { corners, pixel })
    }

    fn map_corners<W: PixelToWorld + ?Sized>(&self, quad: &Quad, wcs: &W) -> Result<[Point2; 4]> {
        let shift = Point2::repeat(self.cfg.origin.offset());
        let pixels: Vec<Point2> = quad.corners.iter().map(|c| c + shift).collect();
        let world = wcs.pix_to_world(&pixels).map_err(FootprintError::Mapping)?;
        <[Point2; 4]>::try_from(world.as_slice()).map_err(|_| FootprintError::MappingLength {
            expected: 4,
            got: world.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom2::rand::{draw_footprint_grid, FootprintSampleCfg, ReplayToken};
    use crate::geom2::{overlap_cost, SutherlandHodgman};

    /// `rows × cols` grid, finite on the inclusive block `rs × cs`.
    fn block_grid(
        rows: usize,
        cols: usize,
        rs: (usize, usize),
        cs: (usize, usize),
    ) -> DMatrix<f64> {
        DMatrix::from_fn(rows, cols, |r, c| {
            if (rs.0..=rs.1).contains(&r) && (cs.0..=cs.1).contains(&c) {
                1.0
            } else {
                f64::NAN
            }
        })
    }

    #[test]
    fn valid_pixels_use_col_row_order() {
        let mut g = DMatrix::from_element(3, 4, f64::NAN);
        g[(1, 3)] = 2.0;
        g[(2, 0)] = f64::INFINITY;
        g[(0, 2)] = -1.0;
        let pts = valid_pixels(&g);
        assert_eq!(pts, vec![Point2::new(2.0, 0.0), Point2::new(3.0, 1.0)]);
    }

    #[test]
    fn block_of_pixels_yields_its_corners() {
        let grid = block_grid(12, 20, (2, 7), (3, 13));
        let fp = FootprintExtractor::default().extract(&grid, &Identity).unwrap();
        assert_eq!(fp.pixel.n_valid, 6 * 11);
        assert!((fp.pixel.rect.area - 50.0).abs() < 1e-9);
        assert!(fp.pixel.refinement.cost < 1e-6);
        assert_eq!(fp.convergence(), Convergence::Converged);
        let expected = [
            Point2::new(3.0, 2.0),
            Point2::new(13.0, 2.0),
            Point2::new(13.0, 7.0),
            Point2::new(3.0, 7.0),
        ];
        for (c, e) in fp.corners.iter().zip(expected.iter()) {
            assert!((c - e).norm() < 1e-6, "{c:?} vs {e:?}");
        }
    }

    #[test]
    fn fewer_than_three_samples_is_insufficient() {
        let mut grid = DMatrix::from_element(5, 5, f64::NAN);
        grid[(1, 1)] = 1.0;
        grid[(3, 2)] = 1.0;
        let err = FootprintExtractor::default()
            .extract(&grid, &Identity)
            .unwrap_err();
        assert!(matches!(err, FootprintError::InsufficientData { found: 2 }));

        let empty = DMatrix::from_element(0, 0, 0.0);
        assert!(matches!(
            FootprintExtractor::default().extract_pixels(&empty),
            Err(FootprintError::InsufficientData { found: 0 })
        ));
    }

    #[test]
    fn single_row_is_degenerate() {
        let grid = block_grid(4, 10, (2, 2), (0, 9));
        assert!(matches!(
            FootprintExtractor::default().extract(&grid, &Identity),
            Err(FootprintError::DegenerateInput { .. })
        ));
    }

    #[test]
    fn closure_mapping_sees_one_based_pixels() {
        let cfg = FootprintCfg {
            origin: PixelOrigin::One,
            ..FootprintCfg::default()
        };
        let grid = block_grid(8, 8, (1, 4), (2, 6));
        let scale = |px: &[Point2]| -> Vec<Point2> { px.iter().map(|p| *p * 2.0).collect() };
        let fp = FootprintExtractor::new(cfg).extract(&grid, &scale).unwrap();
        for (w, p) in fp.corners.iter().zip(fp.pixel.quad().corners.iter()) {
            let expected = (p + Point2::new(1.0, 1.0)) * 2.0;
            assert!((w - expected).norm() < 1e-12);
        }
        // Pixel diagnostics stay 0-indexed.
        assert!((fp.pixel.quad().corners[0] - Point2::new(2.0, 1.0)).norm() < 1e-6);
    }

    struct Broken;

    impl PixelToWorld for Broken {
        fn pix_to_world(&self, _: &[Point2]) -> std::result::Result<Vec<Point2>, MappingError> {
            Err("projection undefined".into())
        }
    }

    #[test]
    fn mapping_failures_are_reported() {
        let grid = block_grid(6, 6, (0, 3), (0, 4));
        let ex = FootprintExtractor::default();
        let err = ex.extract(&grid, &Broken).unwrap_err();
        assert!(matches!(err, FootprintError::Mapping(_)));
        assert!(err.to_string().contains("projection undefined"));

        let short = |px: &[Point2]| -> Vec<Point2> { px[..3].to_vec() };
        assert!(matches!(
            ex.extract(&grid, &short),
            Err(FootprintError::MappingLength {
                expected: 4,
                got: 3
            })
        ));
    }

    #[test]
    fn sampled_footprint_improves_on_rectangle() {
        let cfg = FootprintSampleCfg {
            width: 64,
            height: 48,
            corner_jitter: 0.15,
            ..FootprintSampleCfg::default()
        };
        let (grid, _) = draw_footprint_grid(cfg, ReplayToken { seed: 11, index: 2 });
        let fp = FootprintExtractor::default().extract_pixels(&grid).unwrap();
        let r = &fp.refinement;
        assert!(r.cost <= r.seed_cost);
        assert!((r.seed_cost - (fp.rect.area - fp.hull.area())).abs() < 1e-6 * fp.rect.area);
        let recomputed = overlap_cost(&r.quad.to_params(), &fp.hull, &SutherlandHodgman);
        assert!((recomputed - r.cost).abs() < 1e-9 * r.seed_cost.max(1.0));
        // Every valid pixel lies inside the hull.
        for p in valid_pixels(&grid) {
            assert!(fp.hull.contains_eps(p, 1e-7));
        }
    }
}
