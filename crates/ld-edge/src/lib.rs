//! Edge extraction stages: directional Sobel derivatives, the L1 magnitude
//! approximation, and global fixed-threshold binarization.
//!
//! Arithmetic is integer-only. Pixels outside the image read as `0`
//! (zero padding), never clamped or reflected.
//!
//! The magnitude is `(|gx| + |gy|) / 4` with floor division, narrowed to
//! `u8` according to [`MagnitudeOverflow`]. It is deliberately not the
//! Euclidean norm: a fixed-point hardware block reproduces it bit for bit.

pub mod binarize;
pub mod kernels;
pub mod sobel;

pub use binarize::{BinarizeConfig, binarize_u8, count_foreground};
pub use kernels::SobelKernel1D;
pub use sobel::{EdgeConfig, EdgeDetector, MAGNITUDE_DIVISOR, MagnitudeOverflow, l1_magnitude};
