//! Vertical cropping used by the preprocessor and the Hough region of
//! interest. Crops are zero-copy views that always keep the full width.

use crate::{Error, ImageView};

/// Number of leading rows dropped when only the bottom `retain_fraction` of a
/// `height`-row image is kept: `floor((1 - retain_fraction) * height)`.
pub fn retained_row_offset(height: usize, retain_fraction: f64) -> Result<usize, Error> {
    if !retain_fraction.is_finite() || retain_fraction <= 0.0 || retain_fraction > 1.0 {
        return Err(Error::InvalidConfig("retain fraction must lie in (0, 1]"));
    }

    let offset = ((1.0 - retain_fraction) * height as f64).floor() as usize;
    Ok(offset.min(height))
}

/// Keeps the bottom `retain_fraction` of the rows, full width.
///
/// `retain_fraction == 1.0` returns a view of the whole image.
pub fn crop_bottom<'a, T>(
    img: &ImageView<'a, T>,
    retain_fraction: f64,
) -> Result<ImageView<'a, T>, Error> {
    let offset = retained_row_offset(img.height(), retain_fraction)?;
    crop_rows_from(img, offset)
}

/// Returns rows `first_row..height` of `img`, full width.
pub fn crop_rows_from<'a, T>(
    img: &ImageView<'a, T>,
    first_row: usize,
) -> Result<ImageView<'a, T>, Error> {
    if first_row > img.height() {
        return Err(Error::OutOfBounds);
    }
    img.subview(0, first_row, img.width(), img.height() - first_row)
}

#[cfg(test)]
mod tests {
    use super::{crop_bottom, crop_rows_from, retained_row_offset};
    use crate::{Error, Image};

    #[test]
    fn full_window_is_a_no_op() {
        let img = Image::from_fn(4, 5, |x, y| (x + 4 * y) as u8);
        let view = img.as_view();
        let cropped = crop_bottom(&view, 1.0).expect("valid fraction");

        assert_eq!(cropped.shape(), (4, 5));
        assert_eq!(cropped.to_image(), img);
    }

    #[test]
    fn keeps_bottom_rows_only() {
        let img = Image::from_fn(3, 10, |_, y| y as u8);
        let view = img.as_view();
        let cropped = crop_bottom(&view, 0.5).expect("valid fraction");

        assert_eq!(cropped.shape(), (3, 5));
        assert_eq!(cropped.row(0), &[5, 5, 5]);
        assert_eq!(cropped.row(4), &[9, 9, 9]);
    }

    #[test]
    fn rejects_fraction_outside_unit_interval() {
        for bad in [0.0, -0.5, 1.01, f64::NAN] {
            assert!(matches!(
                retained_row_offset(100, bad),
                Err(Error::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn crop_rows_from_checks_bounds() {
        let img = Image::new_fill(2, 3, 0u8);
        let view = img.as_view();

        assert_eq!(crop_rows_from(&view, 3).expect("empty crop").height(), 0);
        assert_eq!(crop_rows_from(&view, 4).unwrap_err(), Error::OutOfBounds);
    }
}
