//! Umbrella crate for the lane-detection workspace.
//!
//! Re-exports every stage crate so callers need a single dependency, plus
//! [`synthetic`] fixtures with analytically known line parameters.
//!
//! ```no_run
//! use lane_detect::{Image, LaneConfig, LaneDetector};
//!
//! # fn example(gray: Image<u8>) -> Result<(), lane_detect::Error> {
//! let mut detector = LaneDetector::new(&LaneConfig::default())?;
//! let result = detector.detect(&gray.as_view())?;
//! for line in result.lines() {
//!     println!("{:?}: rho={} theta={}deg", line.side, line.rho, line.theta_deg);
//! }
//! # Ok(())
//! # }
//! ```

pub mod synthetic;

pub use ld_core::*;
pub use ld_edge::*;
pub use ld_hough::*;
pub use ld_lane::*;
pub use ld_morph::*;
