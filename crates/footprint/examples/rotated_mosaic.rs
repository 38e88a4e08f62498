//! Compare rectangle and refined-quad footprints on synthetic rotated mosaics.
//!
//! Usage:
//!   cargo run -p footprint --example rotated_mosaic -- [count] [seed]
//!
//! Prints, per sample, the hull area, the rectangle gap (rect − hull) and the
//! symmetric-difference cost left after refinement.

use footprint::api::{
    draw_footprint_grid, FootprintExtractor, FootprintReplay, FootprintSampleCfg,
};

fn main() {
    let mut args = std::env::args().skip(1);
    let count: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(5);
    let seed: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(2025);
    let cfg = FootprintSampleCfg {
        corner_jitter: 0.15,
        ..FootprintSampleCfg::default()
    };
    let ex = FootprintExtractor::default();
    for index in 0..count {
        let (grid, _) = draw_footprint_grid(cfg, FootprintReplay { seed, index });
        match ex.extract_pixels(&grid) {
            Ok(fp) => {
                let r = &fp.refinement;
                println!(
                    "sample {index}: valid={} hull={:.1} rect_gap={:.2} refined={:.2} evals={} stop={}",
                    fp.n_valid,
                    fp.hull.area(),
                    r.seed_cost,
                    r.cost,
                    r.evaluations,
                    r.stop
                );
            }
            Err(e) => eprintln!("sample {index}: {e}"),
        }
    }
}
