//! Lane selection and the complete detection pipeline.
//!
//! ## Selection
//! Hough candidates arrive in canonical order. For each [`Side`] the first
//! candidate whose normal angle lies strictly inside that side's
//! [`AngleBand`] is accepted and scanning stops. Angles between the bands
//! (and outside `(1°, 179°)` by default) are never eligible. A side without
//! a match is simply absent.
//!
//! ## Coordinates
//! A [`Line`] keeps `rho` relative to the Hough ROI origin.
//! [`LineSegment`] endpoints are in full-frame pixels: the preprocess crop
//! and the ROI offset are both added back to the row coordinate.

mod config;
mod detector;
mod segment;
mod selector;
mod timing;

pub use config::{LaneConfig, PreprocessConfig};
pub use detector::{Lane, LaneDetection, LaneDetector, PipelineStages};
pub use segment::LineSegment;
pub use selector::{AngleBand, Line, SelectorConfig, Side, select_lanes, select_side};
pub use timing::{StageTiming, TimingBreakdown};
