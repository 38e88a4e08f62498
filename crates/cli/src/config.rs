use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use footprint::api::{FdScheme, FootprintCfg, LbfgsCfg, PixelOrigin, RefineCfg};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Finite-difference scheme as spelled on the command line and in config files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FdSchemeArg {
    Forward,
    Central,
}

impl From<FdSchemeArg> for FdScheme {
    fn from(s: FdSchemeArg) -> Self {
        match s {
            FdSchemeArg::Forward => FdScheme::Forward,
            FdSchemeArg::Central => FdScheme::Central,
        }
    }
}

/// Run parameters. Every field is optional so a file and the command line can
/// be layered; unset fields fall back to library defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Pixel index base handed to the WCS (0 or 1).
    pub origin: Option<u8>,
    pub max_iter: Option<usize>,
    pub max_evals: Option<usize>,
    pub ftol: Option<f64>,
    pub fd_step: Option<f64>,
    pub fd_scheme: Option<FdSchemeArg>,
    /// Box every corner to the hull bounding box grown by this many pixels.
    pub bbox_margin: Option<f64>,
}

impl RunConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_slice(&bytes).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Fields set in `over` win.
    pub fn layered(self, over: RunConfig) -> Self {
        Self {
            origin: over.origin.or(self.origin),
            max_iter: over.max_iter.or(self.max_iter),
            max_evals: over.max_evals.or(self.max_evals),
            ftol: over.ftol.or(self.ftol),
            fd_step: over.fd_step.or(self.fd_step),
            fd_scheme: over.fd_scheme.or(self.fd_scheme),
            bbox_margin: over.bbox_margin.or(self.bbox_margin),
        }
    }

    /// Library configuration; `default_origin` applies when `origin` is unset.
    pub fn footprint_cfg(&self, default_origin: PixelOrigin) -> Result<FootprintCfg> {
        let origin = match self.origin {
            None => default_origin,
            Some(0) => PixelOrigin::Zero,
            Some(1) => PixelOrigin::One,
            Some(other) => bail!("origin must be 0 or 1, got {other}"),
        };
        let base = LbfgsCfg::default();
        let lbfgs = LbfgsCfg {
            max_iter: self.max_iter.unwrap_or(base.max_iter),
            max_evals: self.max_evals.unwrap_or(base.max_evals),
            ftol: self.ftol.unwrap_or(base.ftol),
            fd_step: self.fd_step.unwrap_or(base.fd_step),
            fd_scheme: self.fd_scheme.map_or(base.fd_scheme, FdScheme::from),
            ..base
        };
        if !lbfgs.fd_step.is_finite() || lbfgs.fd_step <= 0.0 {
            bail!("fd_step must be positive, got {}", lbfgs.fd_step);
        }
        if lbfgs.ftol.is_nan() || lbfgs.ftol < 0.0 {
            bail!("ftol must be non-negative, got {}", lbfgs.ftol);
        }
        if lbfgs.max_evals == 0 {
            bail!("max_evals must be at least 1");
        }
        Ok(FootprintCfg {
            origin,
            refine: RefineCfg {
                lbfgs,
                bbox_margin: self.bbox_margin,
            },
            ..FootprintCfg::default()
        })
    }
}
