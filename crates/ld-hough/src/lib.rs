//! Polar Hough transform for straight-line voting.
//!
//! Each foreground pixel `(x, y)` of the region of interest casts one vote per
//! discretized `theta` in `[0°, 180°)` at
//! `rho = x·cos(theta) + y·sin(theta)`, rounded half-to-even to the nearest
//! rho bin. Coordinates are relative to the ROI's top-left pixel.
//!
//! Candidates above the vote threshold are reported in one canonical order:
//! descending votes, then ascending rho, then ascending theta. Downstream
//! first-match selection depends on this order, so it never varies with
//! platform or iteration details.

mod accumulator;
mod config;
mod voter;

pub use accumulator::{HoughAccumulator, HoughPeak};
pub use config::{HoughConfig, PeakFilter, roi_row_offset};
pub use voter::{HoughOutcome, HoughVoter};
