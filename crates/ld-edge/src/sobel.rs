//! Directional Sobel derivatives with zero padding and the L1/4 magnitude.
//!
//! `gx` responds to intensity changes along a row (positive for dark-to-bright
//! towards increasing `x`), `gy` to changes down a column. Both grids share
//! the input's shape.

use ld_core::{Error, Image, ImageView, ensure_same_shape};
use serde::{Deserialize, Serialize};

use crate::kernels::SobelKernel1D;

/// Fixed divisor of the `(|gx| + |gy|) / 4` magnitude approximation.
pub const MAGNITUDE_DIVISOR: i32 = 4;

/// How a magnitude above `255` is narrowed to `u8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MagnitudeOverflow {
    /// Clamp to `255`.
    #[default]
    Saturate,
    /// Keep the low 8 bits, as a plain narrowing cast does.
    Wrap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeConfig {
    pub kernel_size: usize,
    pub overflow: MagnitudeOverflow,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            kernel_size: 3,
            overflow: MagnitudeOverflow::Saturate,
        }
    }
}

impl EdgeConfig {
    pub fn validate(&self) -> Result<(), Error> {
        SobelKernel1D::new(self.kernel_size).map(|_| ())
    }
}

/// Reusable Sobel stage. Scratch buffers are resized on demand, so one
/// detector can process images of varying size.
#[derive(Debug, Clone)]
pub struct EdgeDetector {
    kernel: SobelKernel1D,
    overflow: MagnitudeOverflow,
    tmp_diff: Image<i32>,
    tmp_smooth: Image<i32>,
    gx: Image<i32>,
    gy: Image<i32>,
}

impl EdgeDetector {
    pub fn new(cfg: &EdgeConfig) -> Result<Self, Error> {
        Ok(Self {
            kernel: SobelKernel1D::new(cfg.kernel_size)?,
            overflow: cfg.overflow,
            tmp_diff: Image::new_fill(0, 0, 0),
            tmp_smooth: Image::new_fill(0, 0, 0),
            gx: Image::new_fill(0, 0, 0),
            gy: Image::new_fill(0, 0, 0),
        })
    }

    pub fn kernel(&self) -> &SobelKernel1D {
        &self.kernel
    }

    /// Horizontal derivative grid of the last processed image.
    pub fn gx(&self) -> &Image<i32> {
        &self.gx
    }

    /// Vertical derivative grid of the last processed image.
    pub fn gy(&self) -> &Image<i32> {
        &self.gy
    }

    /// Computes `gx`/`gy` for `img` and returns the 8-bit gradient map.
    pub fn detect_u8(&mut self, img: &ImageView<'_, u8>) -> Result<Image<u8>, Error> {
        self.compute_gradients(img);
        l1_magnitude(&self.gx.as_view(), &self.gy.as_view(), self.overflow)
    }

    /// Fills the derivative grids without building the magnitude.
    pub fn compute_gradients(&mut self, img: &ImageView<'_, u8>) {
        self.ensure_dims(img.width(), img.height());
        if img.width() == 0 || img.height() == 0 {
            return;
        }
        self.horizontal_pass(img);
        self.vertical_pass();
    }

    fn ensure_dims(&mut self, w: usize, h: usize) {
        if self.gx.shape() != (w, h) {
            self.tmp_diff = Image::new_fill(w, h, 0);
            self.tmp_smooth = Image::new_fill(w, h, 0);
            self.gx = Image::new_fill(w, h, 0);
            self.gy = Image::new_fill(w, h, 0);
        }
    }

    fn horizontal_pass(&mut self, img: &ImageView<'_, u8>) {
        let w = img.width();
        let r = self.kernel.radius as isize;
        let smooth = &self.kernel.smooth;
        let diff = &self.kernel.diff;

        for y in 0..img.height() {
            let src = img.row(y);
            let out_d = &mut self.tmp_diff.data_mut()[y * w..(y + 1) * w];
            for (x, out) in out_d.iter_mut().enumerate() {
                let mut acc = 0i32;
                for (k, &kv) in diff.iter().enumerate() {
                    if let Some(v) = padded(src, x as isize + k as isize - r) {
                        acc += kv * v;
                    }
                }
                *out = acc;
            }

            let out_s = &mut self.tmp_smooth.data_mut()[y * w..(y + 1) * w];
            for (x, out) in out_s.iter_mut().enumerate() {
                let mut acc = 0i32;
                for (k, &kv) in smooth.iter().enumerate() {
                    if let Some(v) = padded(src, x as isize + k as isize - r) {
                        acc += kv * v;
                    }
                }
                *out = acc;
            }
        }
    }

    fn vertical_pass(&mut self) {
        let (w, h) = self.gx.shape();
        let r = self.kernel.radius as isize;
        let smooth = &self.kernel.smooth;
        let diff = &self.kernel.diff;
        let tmp_d = self.tmp_diff.data();
        let tmp_s = self.tmp_smooth.data();
        let gx = self.gx.data_mut();
        let gy = self.gy.data_mut();

        for y in 0..h {
            for x in 0..w {
                let mut acc_x = 0i32;
                let mut acc_y = 0i32;
                for k in 0..smooth.len() {
                    let yy = y as isize + k as isize - r;
                    if yy < 0 || yy >= h as isize {
                        continue;
                    }
                    let idx = yy as usize * w + x;
                    acc_x += smooth[k] * tmp_d[idx];
                    acc_y += diff[k] * tmp_s[idx];
                }
                gx[y * w + x] = acc_x;
                gy[y * w + x] = acc_y;
            }
        }
    }
}

#[inline]
fn padded(row: &[u8], i: isize) -> Option<i32> {
    if i < 0 {
        return None;
    }
    row.get(i as usize).map(|&v| i32::from(v))
}

/// `(|gx| + |gy|) / 4` per pixel with floor division, narrowed to `u8`.
///
/// Fails with [`Error::ShapeMismatch`] if the two grids disagree.
pub fn l1_magnitude(
    gx: &ImageView<'_, i32>,
    gy: &ImageView<'_, i32>,
    overflow: MagnitudeOverflow,
) -> Result<Image<u8>, Error> {
    ensure_same_shape(gx.shape(), gy.shape())?;

    let (w, h) = gx.shape();
    let mut out = Vec::with_capacity(w * h);
    for y in 0..h {
        for (&dx, &dy) in gx.row(y).iter().zip(gy.row(y)) {
            let m = (dx.unsigned_abs() + dy.unsigned_abs()) / MAGNITUDE_DIVISOR as u32;
            out.push(match overflow {
                MagnitudeOverflow::Saturate => m.min(255) as u8,
                MagnitudeOverflow::Wrap => (m & 0xFF) as u8,
            });
        }
    }

    Image::from_vec(w, h, out)
}

#[cfg(test)]
mod tests {
    use ld_core::{Error, Image};

    use super::{EdgeConfig, EdgeDetector, MagnitudeOverflow, l1_magnitude};

    fn detector(kernel_size: usize, overflow: MagnitudeOverflow) -> EdgeDetector {
        EdgeDetector::new(&EdgeConfig {
            kernel_size,
            overflow,
        })
        .expect("valid config")
    }

    #[test]
    fn constant_image_interior_has_zero_gradient() {
        for size in [3, 5, 7] {
            let img = Image::new_fill(16, 12, 77u8);
            let mut det = detector(size, MagnitudeOverflow::Saturate);
            let mag = det.detect_u8(&img.as_view()).expect("matching shapes");

            let r = size / 2;
            for y in r..12 - r {
                for x in r..16 - r {
                    assert_eq!(mag.get(x, y), Some(&0), "size {size} at ({x}, {y})");
                }
            }
        }
    }

    #[test]
    fn zero_image_has_zero_gradient_everywhere() {
        let img = Image::new_fill(9, 7, 0u8);
        let mut det = detector(3, MagnitudeOverflow::Saturate);
        let mag = det.detect_u8(&img.as_view()).expect("matching shapes");
        assert!(mag.data().iter().all(|&v| v == 0));
    }

    #[test]
    fn border_reads_zero_padding() {
        // A constant image still produces a response on its outermost ring
        // because out-of-bounds neighbours read as 0.
        let img = Image::new_fill(5, 5, 8u8);
        let mut det = detector(3, MagnitudeOverflow::Saturate);
        let mag = det.detect_u8(&img.as_view()).expect("matching shapes");

        // Corner (0, 0): only the right column and the lower row contribute,
        // so gx = gy = (2 + 1) * 8 = 24 and the magnitude is 48 / 4.
        assert_eq!(det.gx().get(0, 0), Some(&24));
        assert_eq!(det.gy().get(0, 0), Some(&24));
        assert_eq!(mag.get(0, 0), Some(&12));
        // Left edge midpoint: gx = (1+2+1)*8 = 32, gy = 0.
        assert_eq!(mag.get(0, 2), Some(&8));
        assert_eq!(mag.get(2, 2), Some(&0));
    }

    #[test]
    fn vertical_step_matches_hand_computation() {
        let img = Image::from_fn(6, 5, |x, _| if x >= 3 { 100u8 } else { 0 });
        let mut det = detector(3, MagnitudeOverflow::Saturate);
        let mag = det.detect_u8(&img.as_view()).expect("matching shapes");

        // Interior rows: gx = 4 * 100 at the two columns straddling the step.
        assert_eq!(det.gx().get(2, 2), Some(&400));
        assert_eq!(det.gx().get(3, 2), Some(&400));
        assert_eq!(det.gy().get(2, 2), Some(&0));
        assert_eq!(mag.get(2, 2), Some(&100));
        assert_eq!(mag.get(1, 2), Some(&0));
    }

    #[test]
    fn floor_division_truncates() {
        let gx = Image::from_vec(3, 1, vec![7i32, -9, 1]).expect("valid image");
        let gy = Image::from_vec(3, 1, vec![0i32, 2, -2]).expect("valid image");
        let mag = l1_magnitude(&gx.as_view(), &gy.as_view(), MagnitudeOverflow::Saturate)
            .expect("matching shapes");
        assert_eq!(mag.data(), &[1, 2, 0]);
    }

    #[test]
    fn overflow_policy_controls_narrowing() {
        let gx = Image::from_vec(2, 1, vec![1020i32, 2040]).expect("valid image");
        let gy = Image::from_vec(2, 1, vec![0i32, 0]).expect("valid image");

        let sat = l1_magnitude(&gx.as_view(), &gy.as_view(), MagnitudeOverflow::Saturate)
            .expect("matching shapes");
        let wrap = l1_magnitude(&gx.as_view(), &gy.as_view(), MagnitudeOverflow::Wrap)
            .expect("matching shapes");

        assert_eq!(sat.data(), &[255, 255]);
        assert_eq!(wrap.data(), &[255, (510 & 0xFF) as u8]);
    }

    #[test]
    fn mismatched_grids_fail_fast() {
        let gx = Image::new_fill(4, 3, 0i32);
        let gy = Image::new_fill(4, 2, 0i32);
        let err = l1_magnitude(&gx.as_view(), &gy.as_view(), MagnitudeOverflow::Saturate)
            .expect_err("shapes differ");
        assert_eq!(
            err,
            Error::ShapeMismatch {
                expected: (4, 3),
                actual: (4, 2)
            }
        );
    }

    #[test]
    fn output_keeps_input_shape_and_reuses_scratch() {
        let mut det = detector(5, MagnitudeOverflow::Saturate);
        let a = Image::new_fill(10, 4, 3u8);
        let b = Image::new_fill(3, 8, 3u8);

        assert_eq!(det.detect_u8(&a.as_view()).expect("ok").shape(), (10, 4));
        assert_eq!(det.detect_u8(&b.as_view()).expect("ok").shape(), (3, 8));
        assert_eq!(det.gx().shape(), (3, 8));
    }
}
