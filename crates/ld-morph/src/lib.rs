//! Binary dilation with a `k x k` all-ones structuring element.
//!
//! Pixels are treated as binary with threshold `> 0`.
//! Outputs are `0` or `255` in `u8`.
//!
//! The anchor sits at `k / 2`, so the neighbourhood spans offsets
//! `-(k / 2) ..= k - 1 - k / 2` on each axis. Neighbours outside the image
//! contribute `0`. One iteration is applied.

use ld_core::{Error, Image, ImageView};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DilateConfig {
    pub kernel_size: usize,
}

impl Default for DilateConfig {
    fn default() -> Self {
        Self { kernel_size: 3 }
    }
}

impl DilateConfig {
    pub fn validate(&self) -> Result<(), Error> {
        if self.kernel_size == 0 {
            return Err(Error::InvalidConfig("dilation kernel size must be >= 1"));
        }
        Ok(())
    }
}

/// Dilates `src` by a `kernel_size x kernel_size` square.
///
/// The square is separable, so this runs a horizontal OR followed by a
/// vertical OR over the intermediate rows.
pub fn dilate_binary_u8(src: &ImageView<'_, u8>, kernel_size: usize) -> Result<Image<u8>, Error> {
    DilateConfig { kernel_size }.validate()?;

    let (w, h) = src.shape();
    let mut out = Image::new_fill(w, h, 0u8);
    if w == 0 || h == 0 {
        return Ok(out);
    }

    let before = kernel_size / 2;
    let after = kernel_size - 1 - before;

    let mut horiz = vec![false; w * h];
    for y in 0..h {
        let row = src.row(y);
        let dst = &mut horiz[y * w..(y + 1) * w];
        for (x, d) in dst.iter_mut().enumerate() {
            let x0 = x.saturating_sub(before);
            let x1 = (x + after).min(w - 1);
            *d = row[x0..=x1].iter().any(|&v| v != 0);
        }
    }

    for y in 0..h {
        let y0 = y.saturating_sub(before);
        let y1 = (y + after).min(h - 1);
        let dst = out.row_mut(y);
        for (x, d) in dst.iter_mut().enumerate() {
            if (y0..=y1).any(|yy| horiz[yy * w + x]) {
                *d = 255;
            }
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use ld_core::{Error, Image};

    use crate::dilate_binary_u8;

    fn speckle(w: usize, h: usize) -> Image<u8> {
        Image::from_fn(w, h, |x, y| {
            if (x * 31 + y * 17) % 23 == 0 { 255 } else { 0 }
        })
    }

    #[test]
    fn all_zero_stays_all_zero() {
        let img = Image::new_fill(9, 6, 0u8);
        for k in 1..=5 {
            let out = dilate_binary_u8(&img.as_view(), k).expect("valid kernel");
            assert!(out.data().iter().all(|&v| v == 0));
        }
    }

    #[test]
    fn single_pixel_grows_to_square() {
        let mut data = vec![0u8; 49];
        data[3 * 7 + 3] = 1;
        let img = Image::from_vec(7, 7, data).expect("valid image");

        let out = dilate_binary_u8(&img.as_view(), 3).expect("valid kernel");
        for y in 0..7 {
            for x in 0..7 {
                let inside = (2..=4).contains(&x) && (2..=4).contains(&y);
                assert_eq!(out.get(x, y), Some(&if inside { 255 } else { 0 }));
            }
        }
    }

    #[test]
    fn kernel_one_binarizes_without_growing() {
        let img = Image::from_vec(3, 1, vec![0u8, 7, 0]).expect("valid image");
        let out = dilate_binary_u8(&img.as_view(), 1).expect("valid kernel");
        assert_eq!(out.data(), &[0, 255, 0]);
    }

    #[test]
    fn corner_pixel_clips_at_border() {
        let mut data = vec![0u8; 16];
        data[0] = 255;
        let img = Image::from_vec(4, 4, data).expect("valid image");

        let out = dilate_binary_u8(&img.as_view(), 3).expect("valid kernel");
        let set: usize = out.data().iter().filter(|&&v| v == 255).count();
        assert_eq!(set, 4);
        assert_eq!(out.shape(), (4, 4));
    }

    #[test]
    fn foreground_is_monotone_in_kernel_size() {
        let img = speckle(40, 30);
        let mut prev = dilate_binary_u8(&img.as_view(), 1).expect("valid kernel");
        for k in 2..=7 {
            let next = dilate_binary_u8(&img.as_view(), k).expect("valid kernel");
            for (a, b) in prev.data().iter().zip(next.data()) {
                assert!(*a == 0 || *b == 255, "k={k} lost a foreground pixel");
            }
            prev = next;
        }
    }

    #[test]
    fn repeated_application_only_grows() {
        let img = speckle(20, 20);
        let once = dilate_binary_u8(&img.as_view(), 3).expect("valid kernel");
        let twice = dilate_binary_u8(&once.as_view(), 3).expect("valid kernel");

        for (a, b) in once.data().iter().zip(twice.data()) {
            assert!(*a == 0 || *b == 255);
        }
    }

    #[test]
    fn zero_kernel_is_rejected() {
        let img = Image::new_fill(2, 2, 0u8);
        assert!(matches!(
            dilate_binary_u8(&img.as_view(), 0),
            Err(Error::InvalidConfig(_))
        ));
    }
}
