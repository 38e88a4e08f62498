use anyhow::{Context, Result};
use clap::Args;
use footprint::api::{Footprint, FootprintExtractor, Identity, PixelOrigin};
use footprint::Point2;
use serde::Serialize;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{FdSchemeArg, RunConfig};
use crate::grid::read_grid_csv;
use crate::provenance::{self, Payload};
use crate::wcs::Wcs;

#[derive(Args, Debug, Clone)]
pub struct CornersArgs {
    /// Headerless CSV of samples, one image row per line
    #[arg(long)]
    pub input: PathBuf,
    /// WCS description (JSON); without it corners stay in pixel space
    #[arg(long)]
    pub wcs: Option<PathBuf>,
    /// Result JSON; a provenance sidecar is written next to it
    #[arg(long)]
    pub out: PathBuf,
    /// JSON run config; flags given here take precedence
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Pixel index base handed to the WCS [default: 1 with --wcs, else 0]
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=1))]
    pub origin: Option<u8>,
    #[arg(long)]
    pub max_iter: Option<usize>,
    #[arg(long)]
    pub max_evals: Option<usize>,
    #[arg(long)]
    pub ftol: Option<f64>,
    #[arg(long)]
    pub fd_step: Option<f64>,
    #[arg(long, value_enum)]
    pub fd_scheme: Option<FdSchemeArg>,
    #[arg(long)]
    pub bbox_margin: Option<f64>,
}

impl CornersArgs {
    fn overrides(&self) -> RunConfig {
        RunConfig {
            origin: self.origin,
            max_iter: self.max_iter,
            max_evals: self.max_evals,
            ftol: self.ftol,
            fd_step: self.fd_step,
            fd_scheme: self.fd_scheme,
            bbox_margin: self.bbox_margin,
        }
    }
}

/// Result file contents.
#[derive(Debug, Serialize)]
pub struct CornersReport {
    /// "pixel", "tan" or "linear".
    pub frame: &'static str,
    /// Refined corners in `frame` coordinates.
    pub corners: Vec<[f64; 2]>,
    /// Refined corners, 0-indexed pixels.
    pub pixel_quad: Vec<[f64; 2]>,
    /// Minimum-area rectangle, 0-indexed pixels.
    pub pixel_rect: Vec<[f64; 2]>,
    pub rect_area: f64,
    pub rect_angle: f64,
    pub hull_area: f64,
    pub hull_vertices: usize,
    pub n_valid: usize,
    pub cost: f64,
    pub seed_cost: f64,
    pub converged: bool,
    pub stop: String,
    pub iterations: usize,
    pub evaluations: usize,
}

fn pairs(points: &[Point2]) -> Vec<[f64; 2]> {
    points.iter().map(|p| [p.x, p.y]).collect()
}

impl CornersReport {
    fn new(fp: &Footprint, frame: &'static str) -> Self {
        let px = &fp.pixel;
        let r = &px.refinement;
        Self {
            frame,
            corners: pairs(&fp.corners),
            pixel_quad: pairs(&r.quad.corners),
            pixel_rect: pairs(&px.rect.corners),
            rect_area: px.rect.area,
            rect_angle: px.rect.angle,
            hull_area: px.hull.area(),
            hull_vertices: px.hull.len(),
            n_valid: px.n_valid,
            cost: r.cost,
            seed_cost: r.seed_cost,
            converged: r.converged(),
            stop: r.stop.to_string(),
            iterations: r.iterations,
            evaluations: r.evaluations,
        }
    }
}

/// `cli corners`: grid → footprint → result JSON + provenance sidecar.
pub fn run(args: &CornersArgs, tag: Option<&str>) -> Result<CornersReport> {
    let file_cfg = match &args.config {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };
    let run_cfg = file_cfg.layered(args.overrides());
    let wcs = args.wcs.as_deref().map(Wcs::load).transpose()?;
    let default_origin = if wcs.is_some() {
        PixelOrigin::One
    } else {
        PixelOrigin::Zero
    };
    let cfg = run_cfg.footprint_cfg(default_origin)?;
    tracing::info!(
        input = %args.input.display(),
        out = %args.out.display(),
        wcs = ?args.wcs,
        tag = ?tag,
        origin = ?cfg.origin,
        "corners"
    );

    let grid = read_grid_csv(&args.input)?;
    let extractor = FootprintExtractor::new(cfg);
    let (fp, frame) = match &wcs {
        Some(w @ Wcs::Tan(_)) => (extractor.extract(&grid, w), "tan"),
        Some(w @ Wcs::Linear(_)) => (extractor.extract(&grid, w), "linear"),
        None => (extractor.extract(&grid, &Identity), "pixel"),
    };
    let fp = fp.with_context(|| format!("extracting footprint of {}", args.input.display()))?;
    let report = CornersReport::new(&fp, frame);
    tracing::info!(
        n_valid = report.n_valid,
        cost = report.cost,
        seed_cost = report.seed_cost,
        converged = report.converged,
        "footprint"
    );

    write_json(&args.out, &report)?;
    let params = json!({
        "input": args.input.to_string_lossy(),
        "wcs": args.wcs.as_ref().map(|p| p.to_string_lossy()),
        "config": run_cfg,
    });
    provenance::write_sidecar(&args.out, Payload::new(params).with_tag(tag))?;
    Ok(report)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, serde_json::to_vec_pretty(value)?)
        .with_context(|| format!("writing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use tempfile::{tempdir, TempDir};

    /// 12×20 grid, finite on rows 2..=7 and columns 3..=13.
    fn write_block_csv(dir: &TempDir) -> PathBuf {
        let mut text = String::new();
        for r in 0..12 {
            let row: Vec<&str> = (0..20)
                .map(|c| {
                    if (2..=7).contains(&r) && (3..=13).contains(&c) {
                        "1.0"
                    } else {
                        ""
                    }
                })
                .collect();
            text.push_str(&row.join(","));
            text.push('\n');
        }
        let path = dir.path().join("grid.csv");
        fs::write(&path, text).unwrap();
        path
    }

    fn args(input: PathBuf, out: PathBuf) -> CornersArgs {
        CornersArgs {
            input,
            wcs: None,
            out,
            config: None,
            origin: None,
            max_iter: None,
            max_evals: None,
            ftol: None,
            fd_step: None,
            fd_scheme: None,
            bbox_margin: None,
        }
    }

    fn close(a: [f64; 2], b: [f64; 2]) -> bool {
        (a[0] - b[0]).abs() < 1e-6 && (a[1] - b[1]).abs() < 1e-6
    }

    #[test]
    fn pixel_corners_and_sidecar() {
        let dir = tempdir().unwrap();
        let input = write_block_csv(&dir);
        let out = dir.path().join("res").join("corners.json");
        let report = run(&args(input, out.clone()), Some("block")).unwrap();
        assert_eq!(report.frame, "pixel");
        assert_eq!(report.n_valid, 66);
        assert!(report.converged);
        let expected = [[3.0, 2.0], [13.0, 2.0], [13.0, 7.0], [3.0, 7.0]];
        for (c, e) in report.corners.iter().zip(expected) {
            assert!(close(*c, e), "{c:?} vs {e:?}");
        }

        let written: Value = serde_json::from_slice(&fs::read(&out).unwrap()).unwrap();
        assert_eq!(written["hull_vertices"], 4);
        assert_eq!(written["rect_area"].as_f64().unwrap().round(), 50.0);
        let sidecar = out.with_file_name("corners.provenance.json");
        let prov: Value = serde_json::from_slice(&fs::read(sidecar).unwrap()).unwrap();
        assert_eq!(prov["tags"][0], "block");
        assert!(prov["params"]["wcs"].is_null());
    }

    #[test]
    fn linear_wcs_defaults_to_one_based_pixels() {
        let dir = tempdir().unwrap();
        let input = write_block_csv(&dir);
        let wcs = dir.path().join("wcs.json");
        fs::write(
            &wcs,
            r#"{"kind": "linear", "crpix": [1, 1], "crval": [100, 200], "cd": [[2, 0], [0, 2]]}"#,
        )
        .unwrap();
        let cfg = dir.path().join("run.json");
        fs::write(&cfg, r#"{"max_evals": 5000}"#).unwrap();
        let mut a = args(input, dir.path().join("corners.json"));
        a.wcs = Some(wcs);
        a.config = Some(cfg);
        let report = run(&a, None).unwrap();
        assert_eq!(report.frame, "linear");
        for (w, p) in report.corners.iter().zip(&report.pixel_quad) {
            // 1-based pixel p + 1, then world = crval + 2 * (p + 1 - crpix).
            assert!(close(*w, [100.0 + 2.0 * p[0], 200.0 + 2.0 * p[1]]));
        }
    }

    #[test]
    fn too_few_pixels_fails() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("sparse.csv");
        fs::write(&input, ",1,\n,,\n2,,\n").unwrap();
        let err = run(&args(input, dir.path().join("c.json")), None).unwrap_err();
        let root = err.root_cause().to_string();
        assert!(root.contains("insufficient data"), "{root}");
        assert!(!dir.path().join("c.json").exists());
    }
}
