//! World coordinate descriptions loaded from JSON.
//!
//! Pixel coordinates follow the FITS convention: CRPIX is 1-based, so callers
//! pass 1-based pixels (`PixelOrigin::One`) to match a FITS header.

use anyhow::{Context, Result};
use footprint::api::PixelToWorld;
use footprint::{MappingError, Point2};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Linear pixel-to-world transform parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Linear {
    /// Reference pixel (CRPIX1, CRPIX2).
    pub crpix: [f64; 2],
    /// World coordinates of the reference pixel (CRVAL1, CRVAL2).
    pub crval: [f64; 2],
    /// [[CD1_1, CD1_2], [CD2_1, CD2_2]]
    pub cd: [[f64; 2]; 2],
}

impl Linear {
    /// `CD × (p - CRPIX)`.
    #[inline]
    fn intermediate(&self, p: Point2) -> (f64, f64) {
        let dx = p.x - self.crpix[0];
        let dy = p.y - self.crpix[1];
        (
            self.cd[0][0] * dx + self.cd[0][1] * dy,
            self.cd[1][0] * dx + self.cd[1][1] * dy,
        )
    }
}

/// Supported projections.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Wcs {
    /// Gnomonic (tangent plane) projection; world = (RA, Dec) in degrees.
    Tan(Linear),
    /// Plain affine map; world = `CRVAL + CD × (p - CRPIX)`.
    Linear(Linear),
}

impl Wcs {
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_slice(&bytes).with_context(|| format!("parsing WCS {}", path.display()))
    }

    pub fn pixel_to_world(&self, p: Point2) -> Point2 {
        match self {
            Wcs::Linear(l) => {
                let (u, v) = l.intermediate(p);
                Point2::new(l.crval[0] + u, l.crval[1] + v)
            }
            Wcs::Tan(l) => {
                let (xi, eta) = l.intermediate(p);
                let (xi, eta) = (xi.to_radians(), eta.to_radians());
                let ra0 = l.crval[0].to_radians();
                let (sin_dec0, cos_dec0) = l.crval[1].to_radians().sin_cos();
                let denom = cos_dec0 - eta * sin_dec0;
                let ra = ra0 + xi.atan2(denom);
                let dec = (sin_dec0 + eta * cos_dec0).atan2(xi.hypot(denom));
                Point2::new(ra.to_degrees().rem_euclid(360.0), dec.to_degrees())
            }
        }
    }
}

impl PixelToWorld for Wcs {
    fn pix_to_world(&self, pixels: &[Point2]) -> std::result::Result<Vec<Point2>, MappingError> {
        pixels
            .iter()
            .map(|&p| {
                let w = self.pixel_to_world(p);
                if w.x.is_finite() && w.y.is_finite() {
                    Ok(w)
                } else {
                    Err(format!("pixel ({}, {}) has no finite world position", p.x, p.y).into())
                }
            })
            .collect()
    }
}
