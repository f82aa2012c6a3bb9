use ld_core::{Image, ImageView};
use serde::{Deserialize, Serialize};

/// Global fixed threshold. No adaptive or histogram-based selection is
/// performed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinarizeConfig {
    pub threshold: u8,
}

impl Default for BinarizeConfig {
    fn default() -> Self {
        Self { threshold: 20 }
    }
}

/// `255` where `src > threshold`, `0` elsewhere.
pub fn binarize_u8(src: &ImageView<'_, u8>, threshold: u8) -> Image<u8> {
    Image::from_fn(src.width(), src.height(), |x, y| {
        if src.row(y)[x] > threshold { 255 } else { 0 }
    })
}

/// Number of non-zero pixels.
pub fn count_foreground(src: &ImageView<'_, u8>) -> usize {
    (0..src.height())
        .map(|y| src.row(y).iter().filter(|&&v| v != 0).count())
        .sum()
}
