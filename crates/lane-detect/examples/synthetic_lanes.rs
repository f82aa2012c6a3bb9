//! Example: detect both lane lines on a synthetic road frame.
//!
//! Paints two stripes (one per side) onto a black frame, runs the default
//! pipeline, and prints the selected lines, their full-frame endpoints, and
//! per-stage timing.
//!
//! Run from the workspace root:
//!   cargo run -p lane-detect --example synthetic_lanes -- --help
//!   RUST_LOG=debug cargo run -p lane-detect --example synthetic_lanes

use anyhow::{Context, Result};
use clap::Parser;
use lane_detect::synthetic::{Stripe, mirrored_rho};
use lane_detect::{Image, LaneConfig, LaneDetector, roi_row_offset};

#[derive(Parser, Debug)]
#[command(about = "Run lane detection on a synthetic two-lane frame")]
struct Args {
    #[arg(long, default_value_t = 520)]
    width: usize,

    #[arg(long, default_value_t = 400)]
    height: usize,

    /// Normal angle of the left stripe in degrees; the right one is mirrored.
    #[arg(long, default_value_t = 35.0)]
    theta: f64,

    /// Distance of the left stripe from the ROI origin, in pixels.
    #[arg(long, default_value_t = 150.0)]
    rho: f64,

    /// Half-width of each painted stripe.
    #[arg(long, default_value_t = 3.0)]
    half_width: f64,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let cfg = LaneConfig::default();
    let row_offset = roi_row_offset(args.height, cfg.hough.roi_offset_fraction);

    let mut img = Image::new_fill(args.width, args.height, 0u8);
    let left = Stripe {
        theta_deg: args.theta,
        rho: args.rho,
        row_offset,
        half_width: args.half_width,
        value: 220,
    };
    let right = Stripe {
        theta_deg: 180.0 - args.theta,
        rho: mirrored_rho(args.rho, args.theta, args.width),
        ..left
    };
    left.paint(&mut img);
    right.paint(&mut img);

    let mut detector = LaneDetector::new(&cfg).context("invalid lane config")?;
    let result = detector
        .detect(&img.as_view())
        .context("lane detection failed")?;

    println!(
        "frame {}x{}, roi from row {}, {} candidates (max {} votes)",
        args.width, args.height, result.roi_row_offset, result.candidate_count, result.max_votes
    );
    for lane in result.left.iter().chain(result.right.iter()) {
        let l = &lane.line;
        let s = &lane.segment;
        println!(
            "  {:<5} rho={:8.1} theta={:5.1}deg votes={:4}  ({:.1},{:.1}) -> ({:.1},{:.1})",
            l.side.as_str(),
            l.rho,
            l.theta_deg,
            l.votes,
            s.p0.x,
            s.p0.y,
            s.p1.x,
            s.p1.y
        );
    }
    println!(
        "expected: left ({:.1}, {:.1}deg), right ({:.1}, {:.1}deg)",
        left.rho, left.theta_deg, right.rho, right.theta_deg
    );

    for st in &result.timing.stages {
        println!("  {:<9} {:7.3} ms", st.label, st.elapsed_ms);
    }
    println!("  {:<9} {:7.3} ms", "total", result.timing.total_ms);

    Ok(())
}
