//! Foundational primitives for the lane-detection golden model.
//!
//! ## Images and Views
//! [`Image`] owns a contiguous row-major buffer. [`ImageView`] borrows one
//! with an element stride (not byte stride), so crops and regions of interest
//! are zero-copy subviews of their parent.
//!
//! ## Coordinates
//! `x` grows to the right along a row, `y` grows downwards. Cropped views
//! start their own coordinate system at their top-left pixel; callers that
//! need full-frame coordinates carry the row offset explicitly.
//!
//! ## Shapes
//! Every stage of the pipeline keeps the width and height of its input.
//! [`ensure_same_shape`] is the fail-fast check used wherever two buffers of
//! the same stage meet.

mod crop;
mod error;
mod geom;
mod image;

pub use crop::{crop_bottom, crop_rows_from, retained_row_offset};
pub use error::Error;
pub use geom::{Point2f, Vec2f};
pub use image::{Image, ImageView, ensure_same_shape};
