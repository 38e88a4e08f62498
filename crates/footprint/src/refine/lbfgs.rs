//! Bounded limited-memory quasi-Newton minimization with finite-difference gradients.
//!
//! - Gradients: central (default) or forward differences with a fixed step,
//!   falling back to a one-sided probe when the other side would leave the box.
//!   Central differences average the one-sided slopes at kinks of the
//!   objective; forward differences halve the cost per gradient.
//! - Direction: L-BFGS two-loop recursion over the last `history` curvature pairs.
//! - Step: projected backtracking line search with an Armijo condition.
//!
//! The minimizer owns all of its state for the duration of one call and
//! always returns the best point it evaluated.

use std::collections::VecDeque;
use std::fmt;

/// Armijo sufficient-decrease constant.
const ARMIJO_C1: f64 = 1e-4;
/// Backtracking halvings per line search.
const MAX_BACKTRACKS: usize = 40;

/// Why a minimization stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StopReason {
    /// Relative decrease of the objective fell below `ftol`.
    FunctionTolerance,
    /// Projected gradient ∞-norm fell below `gtol`.
    GradientTolerance,
    /// No decrease along steepest descent at the finite-difference resolution.
    NoDescent,
    /// `max_iter` iterations used.
    IterationLimit,
    /// `max_evals` objective evaluations used.
    EvaluationLimit,
}

impl StopReason {
    /// Budget exhaustion is the only non-converged outcome.
    #[inline]
    pub fn is_converged(self) -> bool {
        !matches!(self, StopReason::IterationLimit | StopReason::EvaluationLimit)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StopReason::FunctionTolerance => "function_tolerance",
            StopReason::GradientTolerance => "gradient_tolerance",
            StopReason::NoDescent => "no_descent",
            StopReason::IterationLimit => "iteration_limit",
            StopReason::EvaluationLimit => "evaluation_limit",
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one minimization call.
#[derive(Clone, Debug)]
pub struct Minimum {
    /// Best evaluated point.
    pub x: Vec<f64>,
    /// Objective at `x`.
    pub f: f64,
    pub iterations: usize,
    pub evaluations: usize,
    pub stop: StopReason,
}

/// Pluggable numerical minimization over real parameter vectors.
pub trait Minimizer {
    /// Minimize `objective` from `x0`, optionally inside the box `bounds`
    /// (one `(lo, hi)` pair per coordinate).
    fn minimize(
        &self,
        objective: &mut dyn FnMut(&[f64]) -> f64,
        x0: &[f64],
        bounds: Option<&[(f64, f64)]>,
    ) -> Minimum;
}

/// Finite-difference scheme for gradient estimates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FdScheme {
    /// `(f(x + h e_i) - f(x)) / h`: one extra evaluation per coordinate.
    Forward,
    /// `(f(x + h e_i) - f(x - h e_i)) / 2h`: two extra evaluations per coordinate.
    #[default]
    Central,
}

/// Tolerances and budgets for `Lbfgs`.
#[derive(Clone, Copy, Debug)]
pub struct LbfgsCfg {
    /// Relative function-decrease tolerance: stop when
    /// `(f_k - f_{k+1}) / max(|f_k|, |f_{k+1}|, 1) <= ftol`.
    pub ftol: f64,
    /// Projected-gradient ∞-norm tolerance.
    pub gtol: f64,
    /// Finite-difference step for gradient estimates.
    pub fd_step: f64,
    pub fd_scheme: FdScheme,
    /// Number of curvature pairs kept.
    pub history: usize,
    pub max_iter: usize,
    pub max_evals: usize,
}

impl Default for LbfgsCfg {
    fn default() -> Self {
        Self {
            ftol: 1e-4,
            gtol: 1e-5,
            // Coarse on purpose: overlap areas are flat below pixel scale.
            fd_step: 0.1,
            fd_scheme: FdScheme::Central,
            history: 10,
            max_iter: 15_000,
            max_evals: 15_000,
        }
    }
}

/// Bounded L-BFGS with finite-difference gradients.
#[derive(Clone, Copy, Debug, Default)]
pub struct Lbfgs {
    pub cfg: LbfgsCfg,
}

impl Lbfgs {
    #[inline]
    pub fn new(cfg: LbfgsCfg) -> Self {
        Self { cfg }
    }
}

impl Minimizer for Lbfgs {
    fn minimize(
        &self,
        objective: &mut dyn FnMut(&[f64]) -> f64,
        x0: &[f64],
        bounds: Option<&[(f64, f64)]>,
    ) -> Minimum {
        Run {
            cfg: self.cfg,
            bounds,
            eval: Budgeted::new(objective, self.cfg.max_evals, x0),
        }
        .solve(x0)
    }
}

/// Objective wrapper counting evaluations and tracking the best point.
struct Budgeted<'a> {
    f: &'a mut dyn FnMut(&[f64]) -> f64,
    evals: usize,
    max_evals: usize,
    best_x: Vec<f64>,
    best_f: f64,
}

impl<'a> Budgeted<'a> {
    fn new(f: &'a mut dyn FnMut(&[f64]) -> f64, max_evals: usize, x0: &[f64]) -> Self {
        Self {
            f,
            evals: 0,
            max_evals,
            best_x: x0.to_vec(),
            best_f: f64::INFINITY,
        }
    }

    /// `None` once the evaluation budget is spent. NaN is scored as +∞.
    fn eval(&mut self, x: &[f64]) -> Option<f64> {
        if self.evals >= self.max_evals {
            return None;
        }
        self.evals += 1;
        let v = (self.f)(x);
        let v = if v.is_nan() { f64::INFINITY } else { v };
        if v < self.best_f {
            self.best_f = v;
            self.best_x.clear();
            self.best_x.extend_from_slice(x);
        }
        Some(v)
    }
}

enum LineSearch {
    Accepted(Vec<f64>, f64),
    Failed,
    OutOfBudget,
}

/// Per-call optimization state.
struct Run<'a, 'b> {
    cfg: LbfgsCfg,
    bounds: Option<&'b [(f64, f64)]>,
    eval: Budgeted<'a>,
}

impl Run<'_, '_> {
    #[inline]
    fn bound(&self, i: usize) -> (f64, f64) {
        self.bounds
            .and_then(|b| b.get(i).copied())
            .unwrap_or((f64::NEG_INFINITY, f64::INFINITY))
    }

    fn project(&self, x: &mut [f64]) {
        if self.bounds.is_none() {
            return;
        }
        for (i, xi) in x.iter_mut().enumerate() {
            let (lo, hi) = self.bound(i);
            *xi = xi.max(lo).min(hi);
        }
    }

    fn finish(self, iterations: usize, stop: StopReason) -> Minimum {
        tracing::debug!(
            f = self.eval.best_f,
            iterations,
            evaluations = self.eval.evals,
            %stop,
            "lbfgs finished"
        );
        Minimum {
            x: self.eval.best_x,
            f: self.eval.best_f,
            iterations,
            evaluations: self.eval.evals,
            stop,
        }
    }

    fn solve(mut self, x0: &[f64]) -> Minimum {
        let mut x = x0.to_vec();
        self.project(&mut x);
        let Some(mut fx) = self.eval.eval(&x) else {
            return self.finish(0, StopReason::EvaluationLimit);
        };
        let Some(mut g) = self.gradient(&x, fx) else {
            return self.finish(0, StopReason::EvaluationLimit);
        };
        let mut mem: VecDeque<(Vec<f64>, Vec<f64>, f64)> =
            VecDeque::with_capacity(self.cfg.history);
        let mut iterations = 0usize;

        let stop = loop {
            if iterations >= self.cfg.max_iter {
                break StopReason::IterationLimit;
            }
            if self.projected_grad_norm(&x, &g) <= self.cfg.gtol {
                break StopReason::GradientTolerance;
            }
            let mut d = two_loop(&g, &mem);
            self.mask_direction(&x, &mut d);
            if dot(&d, &g) >= 0.0 {
                mem.clear();
                d = g.iter().map(|v| -v).collect();
                self.mask_direction(&x, &mut d);
            }
            let step0 = if mem.is_empty() {
                (1.0 / norm(&d)).min(1.0)
            } else {
                1.0
            };
            let (x_new, f_new) = match self.line_search(&x, fx, &g, &d, step0) {
                LineSearch::Accepted(xn, fnew) => (xn, fnew),
                LineSearch::OutOfBudget => break StopReason::EvaluationLimit,
                LineSearch::Failed if mem.is_empty() => break StopReason::NoDescent,
                LineSearch::Failed => {
                    // Stale curvature; retry along steepest descent.
                    mem.clear();
                    continue;
                }
            };
            iterations += 1;
            let Some(g_new) = self.gradient(&x_new, f_new) else {
                break StopReason::EvaluationLimit;
            };

            let s: Vec<f64> = x_new.iter().zip(&x).map(|(a, b)| a - b).collect();
            let y: Vec<f64> = g_new.iter().zip(&g).map(|(a, b)| a - b).collect();
            let sy = dot(&s, &y);
            if sy > 1e-10 * dot(&y, &y) && sy > 0.0 {
                if mem.len() >= self.cfg.history.max(1) {
                    mem.pop_front();
                }
                mem.push_back((s, y, 1.0 / sy));
            }

            let rel = (fx - f_new) / fx.abs().max(f_new.abs()).max(1.0);
            x = x_new;
            fx = f_new;
            g = g_new;
            if rel <= self.cfg.ftol {
                break StopReason::FunctionTolerance;
            }
        };
        self.finish(iterations, stop)
    }

    /// Finite-difference gradient. Coordinates whose box is narrower than the
    /// step get a zero component.
    fn gradient(&mut self, x: &[f64], fx: f64) -> Option<Vec<f64>> {
        let h = self.cfg.fd_step;
        let mut g = vec![0.0; x.len()];
        let mut probe = x.to_vec();
        for i in 0..x.len() {
            let (lo, hi) = self.bound(i);
            let up = x[i] + h <= hi;
            let down = x[i] - h >= lo;
            let gi = match (self.cfg.fd_scheme, up, down) {
                (FdScheme::Central, true, true) => {
                    probe[i] = x[i] + h;
                    let f_up = self.eval.eval(&probe)?;
                    probe[i] = x[i] - h;
                    let f_down = self.eval.eval(&probe)?;
                    (f_up - f_down) / (2.0 * h)
                }
                (_, true, _) => {
                    probe[i] = x[i] + h;
                    (self.eval.eval(&probe)? - fx) / h
                }
                (_, false, true) => {
                    probe[i] = x[i] - h;
                    (fx - self.eval.eval(&probe)?) / h
                }
                (_, false, false) => 0.0,
            };
            probe[i] = x[i];
            g[i] = if gi.is_finite() { gi } else { 0.0 };
        }
        Some(g)
    }

    /// ∞-norm of `P(x - g) - x`.
    fn projected_grad_norm(&self, x: &[f64], g: &[f64]) -> f64 {
        let mut m: f64 = 0.0;
        for i in 0..x.len() {
            let (lo, hi) = self.bound(i);
            let pg = (x[i] - g[i]).max(lo).min(hi) - x[i];
            m = m.max(pg.abs());
        }
        m
    }

    /// Zero components that would push an active bound outward.
    fn mask_direction(&self, x: &[f64], d: &mut [f64]) {
        if self.bounds.is_none() {
            return;
        }
        for i in 0..x.len() {
            let (lo, hi) = self.bound(i);
            if (x[i] <= lo && d[i] < 0.0) || (x[i] >= hi && d[i] > 0.0) {
                d[i] = 0.0;
            }
        }
    }

    fn line_search(
        &mut self,
        x: &[f64],
        fx: f64,
        g: &[f64],
        d: &[f64],
        step0: f64,
    ) -> LineSearch {
        let dnorm = norm(d);
        if !(dnorm > 0.0) || !step0.is_finite() {
            return LineSearch::Failed;
        }
        let floor = 1e-12 * (1.0 + norm(x));
        let mut alpha = step0;
        let mut trial = vec![0.0; x.len()];
        for _ in 0..MAX_BACKTRACKS {
            for i in 0..x.len() {
                trial[i] = x[i] + alpha * d[i];
            }
            self.project(&mut trial);
            let slope: f64 = (0..x.len()).map(|i| g[i] * (trial[i] - x[i])).sum();
            if slope < 0.0 {
                let Some(ft) = self.eval.eval(&trial) else {
                    return LineSearch::OutOfBudget;
                };
                if ft < fx && ft <= fx + ARMIJO_C1 * slope {
                    return LineSearch::Accepted(trial, ft);
                }
            }
            alpha *= 0.5;
            if alpha * dnorm < floor {
                break;
            }
        }
        LineSearch::Failed
    }
}

/// L-BFGS two-loop recursion: returns `-H g`.
fn two_loop(g: &[f64], mem: &VecDeque<(Vec<f64>, Vec<f64>, f64)>) -> Vec<f64> {
    let mut q = g.to_vec();
    let mut alphas = Vec::with_capacity(mem.len());
    for (s, y, rho) in mem.iter().rev() {
        let a = rho * dot(s, &q);
        for (qi, yi) in q.iter_mut().zip(y) {
            *qi -= a * yi;
        }
        alphas.push(a);
    }
    let gamma = match mem.back() {
        Some((s, y, _)) => dot(s, y) / dot(y, y),
        None => 1.0,
    };
    let mut r: Vec<f64> = q.iter().map(|v| gamma * v).collect();
    for ((s, y, rho), a) in mem.iter().zip(alphas.iter().rev()) {
        let b = rho * dot(y, &r);
        for (ri, si) in r.iter_mut().zip(s) {
            *ri += si * (a - b);
        }
    }
    r.iter().map(|v| -v).collect()
}

#[inline]
fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[inline]
fn norm(a: &[f64]) -> f64 {
    dot(a, a).sqrt()
}
