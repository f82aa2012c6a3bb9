//! Synthetic frames whose edges have analytically known `(rho, theta)`.
//!
//! Line parameters are expressed relative to a reference row `row_offset`:
//! a pixel `(x, y)` of the full frame sits at signed distance
//! `x·cos(theta) + (y - row_offset)·sin(theta) - rho` from the line. With
//! `row_offset` set to the Hough ROI's first row, `rho` is exactly what the
//! voter reports.

use ld_core::Image;

/// Half-plane step edge: `bright` where the signed distance is positive,
/// `dark` elsewhere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepEdge {
    pub theta_deg: f64,
    pub rho: f64,
    pub row_offset: usize,
    pub dark: u8,
    pub bright: u8,
}

impl StepEdge {
    pub fn render(&self, width: usize, height: usize) -> Image<u8> {
        let (s, c) = self.theta_deg.to_radians().sin_cos();
        let y0 = self.row_offset as f64;
        Image::from_fn(width, height, |x, y| {
            let d = x as f64 * c + (y as f64 - y0) * s - self.rho;
            if d > 0.0 { self.bright } else { self.dark }
        })
    }

    /// The same edge after [`mirror_horizontal`] on a `width`-column frame.
    pub fn mirrored(&self, width: usize) -> Self {
        Self {
            theta_deg: 180.0 - self.theta_deg,
            rho: mirrored_rho(self.rho, self.theta_deg, width),
            ..*self
        }
    }
}

/// Painted stripe of half-width `half_width` around the line, on black.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stripe {
    pub theta_deg: f64,
    pub rho: f64,
    pub row_offset: usize,
    pub half_width: f64,
    pub value: u8,
}

impl Stripe {
    /// Paints the stripe into `img`, leaving other pixels untouched.
    pub fn paint(&self, img: &mut Image<u8>) {
        let (s, c) = self.theta_deg.to_radians().sin_cos();
        let y0 = self.row_offset as f64;
        for y in 0..img.height() {
            let yr = y as f64 - y0;
            for (x, px) in img.row_mut(y).iter_mut().enumerate() {
                if (x as f64 * c + yr * s - self.rho).abs() <= self.half_width {
                    *px = self.value;
                }
            }
        }
    }
}

/// `rho` of a line with normal angle `theta_deg` after the frame is mirrored
/// left-right. The mirrored normal angle is `180 - theta_deg`.
pub fn mirrored_rho(rho: f64, theta_deg: f64, width: usize) -> f64 {
    rho - width.saturating_sub(1) as f64 * theta_deg.to_radians().cos()
}

/// Reverses every row: column `x` moves to `width - 1 - x`.
pub fn mirror_horizontal(img: &Image<u8>) -> Image<u8> {
    let w = img.width();
    let view = img.as_view();
    Image::from_fn(w, img.height(), |x, y| view.row(y)[w - 1 - x])
}
