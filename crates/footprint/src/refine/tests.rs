use super::*;
use crate::geom2::rand::{draw_footprint_quad, FootprintSampleCfg, ReplayToken};
use crate::geom2::{convex_hull, min_area_rect, GeomCfg};
use approx::assert_abs_diff_eq;
use nalgebra::vector;
use proptest::prelude::*;

fn rect_10x5_hull() -> Polygon {
    Polygon::new(vec![
        vector![0.0, 0.0],
        vector![10.0, 0.0],
        vector![10.0, 5.0],
        vector![0.0, 5.0],
    ])
}

fn trapezoid_hull() -> Polygon {
    Polygon::new(vec![
        vector![0.0, 0.0],
        vector![10.0, 0.0],
        vector![8.0, 5.0],
        vector![2.0, 5.0],
    ])
}

#[test]
fn lbfgs_solves_smooth_quadratic() {
    let cfg = LbfgsCfg {
        ftol: 1e-14,
        gtol: 1e-8,
        fd_step: 1e-7,
        ..LbfgsCfg::default()
    };
    let mut f = |x: &[f64]| (x[0] - 3.0).powi(2) + 10.0 * (x[1] + 1.0).powi(2);
    let min = Lbfgs::new(cfg).minimize(&mut f, &[0.0, 0.0], None);
    assert!(min.stop.is_converged(), "stop {}", min.stop);
    assert_abs_diff_eq!(min.x[0], 3.0, epsilon = 1e-3);
    assert_abs_diff_eq!(min.x[1], -1.0, epsilon = 1e-3);
    assert!(min.f < 1e-5);
}

#[test]
fn lbfgs_respects_bounds() {
    let mut f = |x: &[f64]| (x[0] - 5.0).powi(2);
    let min = Lbfgs::default().minimize(&mut f, &[0.0], Some(&[(0.0, 2.0)]));
    assert!(min.stop.is_converged());
    assert_abs_diff_eq!(min.x[0], 2.0, epsilon = 1e-12);
    assert_abs_diff_eq!(min.f, 9.0, epsilon = 1e-12);
}

#[test]
fn lbfgs_reports_budget_exhaustion() {
    let cfg = LbfgsCfg {
        max_evals: 5,
        ..LbfgsCfg::default()
    };
    let mut f = |x: &[f64]| x.iter().map(|v| (v - 1.0).powi(2)).sum::<f64>();
    let x0 = [0.0; 8];
    let min = Lbfgs::new(cfg).minimize(&mut f, &x0, None);
    assert_eq!(min.stop, StopReason::EvaluationLimit);
    assert!(!min.stop.is_converged());
    assert_eq!(min.evaluations, 5);
    assert!(min.f <= 8.0);

    let cfg = LbfgsCfg {
        max_iter: 1,
        ftol: 0.0,
        ..LbfgsCfg::default()
    };
    let min = Lbfgs::new(cfg).minimize(&mut f, &x0, None);
    assert_eq!(min.stop, StopReason::IterationLimit);
    assert_eq!(min.iterations, 1);
    assert!(min.f < 8.0);
}

#[test]
fn refine_exact_rectangle_is_a_converged_no_op() {
    let hull = rect_10x5_hull();
    let rect = min_area_rect(&hull).unwrap();
    let out = QuadRefiner::default().refine(&rect.to_quad(), &hull);
    assert!(out.converged());
    assert_eq!(out.convergence(), Convergence::Converged);
    assert!(out.cost.abs() < 1e-9);
    for (c, v) in out.quad.corners.iter().zip(hull.verts.iter()) {
        assert!((c - v).norm() < 1e-6, "{c:?} vs {v:?}");
    }
}

#[test]
fn refine_shrinks_rectangle_towards_trapezoid() {
    let hull = trapezoid_hull();
    let rect = min_area_rect(&hull).unwrap();
    assert_abs_diff_eq!(rect.area, 50.0, epsilon = 1e-9);
    let out = QuadRefiner::default().refine(&rect.to_quad(), &hull);
    assert_abs_diff_eq!(out.seed_cost, 10.0, epsilon = 1e-9);
    assert!(out.converged(), "stop {}", out.stop);
    assert!(out.cost < 0.5 * out.seed_cost, "cost {}", out.cost);
    assert!(out.improvement() > 0.0);
}

#[test]
fn refine_budget_exhaustion_still_returns_usable_quad() {
    let hull = trapezoid_hull();
    let rect = min_area_rect(&hull).unwrap();
    let cfg = RefineCfg {
        lbfgs: LbfgsCfg {
            max_evals: 12,
            ..LbfgsCfg::default()
        },
        bbox_margin: None,
    };
    let out = QuadRefiner::new(cfg).refine(&rect.to_quad(), &hull);
    assert_eq!(out.convergence(), Convergence::NotConverged);
    assert_eq!(out.stop, StopReason::EvaluationLimit);
    assert!(out.cost <= out.seed_cost);
    assert!(out.quad.is_finite());
}

#[test]
fn refine_with_bbox_margin_stays_in_box() {
    let hull = trapezoid_hull();
    let rect = min_area_rect(&hull).unwrap();
    let cfg = RefineCfg {
        bbox_margin: Some(0.5),
        ..RefineCfg::default()
    };
    let out = QuadRefiner::new(cfg).refine(&rect.to_quad(), &hull);
    for c in out.quad.corners {
        assert!(c.x >= -0.5 - 1e-12 && c.x <= 10.5 + 1e-12);
        assert!(c.y >= -0.5 - 1e-12 && c.y <= 5.5 + 1e-12);
    }
    assert!(out.cost <= out.seed_cost);
}

/// Minimizer that never moves; exercises the pluggable seam.
struct Stay;

impl Minimizer for Stay {
    fn minimize(
        &self,
        objective: &mut dyn FnMut(&[f64]) -> f64,
        x0: &[f64],
        _bounds: Option<&[(f64, f64)]>,
    ) -> Minimum {
        Minimum {
            x: x0.to_vec(),
            f: objective(x0),
            iterations: 0,
            evaluations: 1,
            stop: StopReason::NoDescent,
        }
    }
}

#[test]
fn custom_minimizer_plugs_in() {
    let hull = trapezoid_hull();
    let rect = min_area_rect(&hull).unwrap();
    let refiner = QuadRefiner::with_parts(Stay, SutherlandHodgman, None);
    let out = refiner.refine(&rect.to_quad(), &hull);
    assert_eq!(out.quad, rect.to_quad());
    assert_abs_diff_eq!(out.cost, out.seed_cost, epsilon = 0.0);
    assert!(out.converged());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn refinement_never_worse_than_seed(seed in 0u64..1_000, index in 0u64..1_000) {
        let cfg = FootprintSampleCfg { width: 60, height: 40, ..FootprintSampleCfg::default() };
        let quad = draw_footprint_quad(cfg, ReplayToken { seed, index });
        // Hull of the quad corners plus a few edge midpoints pushed outward.
        let mut pts: Vec<Point2> = quad.corners.to_vec();
        let center = quad.corners.iter().sum::<Point2>() / 4.0;
        for k in 0..4 {
            let mid = 0.5 * (quad.corners[k] + quad.corners[(k + 1) % 4]);
            pts.push(mid + 0.15 * (mid - center));
        }
        let hull = convex_hull(&pts, GeomCfg::default()).unwrap();
        let rect = min_area_rect(&hull).unwrap();
        let refine_cfg = RefineCfg {
            lbfgs: LbfgsCfg { max_iter: 40, ..LbfgsCfg::default() },
            bbox_margin: None,
        };
        let out = QuadRefiner::new(refine_cfg).refine(&rect.to_quad(), &hull);
        prop_assert!(out.cost <= out.seed_cost);
        prop_assert!(out.cost >= 0.0);
        let recomputed = overlap_cost(&out.quad.to_params(), &hull, &SutherlandHodgman);
        prop_assert!((recomputed - out.cost).abs() <= 1e-9 * out.seed_cost.max(1.0));
    }
}
