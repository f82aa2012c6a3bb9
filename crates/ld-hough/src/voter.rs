use ld_core::{Error, ImageView, crop_rows_from};
use log::debug;

use crate::accumulator::{HoughAccumulator, HoughPeak};
use crate::config::{HoughConfig, roi_row_offset};

/// Summary of one voting pass. The accumulator itself is not retained.
#[derive(Debug, Clone, PartialEq)]
pub struct HoughOutcome {
    /// First ROI row in the coordinates of the map that was voted on.
    pub roi_row_offset: usize,
    pub roi_shape: (usize, usize),
    pub foreground: usize,
    pub max_votes: u32,
    /// Canonically ordered candidates at or above the vote threshold.
    pub candidates: Vec<HoughPeak>,
}

#[derive(Debug, Clone)]
pub struct HoughVoter {
    cfg: HoughConfig,
}

impl HoughVoter {
    pub fn new(cfg: HoughConfig) -> Result<Self, Error> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    pub fn config(&self) -> &HoughConfig {
        &self.cfg
    }

    /// Bottom region of `map` starting at `round(roi_offset_fraction * height)`.
    pub fn roi<'a>(&self, map: &ImageView<'a, u8>) -> Result<(usize, ImageView<'a, u8>), Error> {
        let offset = roi_row_offset(map.height(), self.cfg.roi_offset_fraction);
        Ok((offset, crop_rows_from(map, offset)?))
    }

    /// Votes every non-zero pixel of `roi` into a fresh accumulator.
    pub fn accumulate(&self, roi: &ImageView<'_, u8>) -> Result<HoughAccumulator, Error> {
        let mut acc = HoughAccumulator::new(roi.width(), roi.height(), &self.cfg)?;
        for y in 0..roi.height() {
            for (x, &v) in roi.row(y).iter().enumerate() {
                if v != 0 {
                    acc.vote(x, y);
                }
            }
        }
        Ok(acc)
    }

    pub fn candidates(&self, acc: &HoughAccumulator) -> Vec<HoughPeak> {
        acc.peaks(self.cfg.min_votes, self.cfg.peaks)
    }

    /// Crops the ROI out of `map`, votes, and extracts candidates.
    pub fn run(&self, map: &ImageView<'_, u8>) -> Result<HoughOutcome, Error> {
        self.run_with_accumulator(map).map(|(outcome, _)| outcome)
    }

    /// Same as [`HoughVoter::run`] but also hands back the filled accumulator.
    pub fn run_with_accumulator(
        &self,
        map: &ImageView<'_, u8>,
    ) -> Result<(HoughOutcome, HoughAccumulator), Error> {
        let (offset, roi) = self.roi(map)?;
        let acc = self.accumulate(&roi)?;
        let foreground = (acc.total_votes() / acc.num_theta() as u64) as usize;
        let max_votes = acc.max_votes();
        let candidates = self.candidates(&acc);

        debug!(
            "hough: roi {}x{} at row {offset}, {} rho x {} theta bins, {foreground} foreground px, max votes {max_votes}, {} candidates",
            roi.width(),
            roi.height(),
            acc.num_rho(),
            acc.num_theta(),
            candidates.len()
        );

        let outcome = HoughOutcome {
            roi_row_offset: offset,
            roi_shape: roi.shape(),
            foreground,
            max_votes,
            candidates,
        };
        Ok((outcome, acc))
    }
}

#[cfg(test)]
mod tests {
    use ld_core::Image;

    use super::HoughVoter;
    use crate::config::{HoughConfig, PeakFilter};

    /// One-pixel digital line `x cos(theta) + y sin(theta) = rho` drawn row by
    /// row, valid for thetas away from 90 degrees.
    fn draw_line(width: usize, height: usize, rho: f64, theta_deg: f64) -> Image<u8> {
        let (s, c) = theta_deg.to_radians().sin_cos();
        let mut img = Image::new_fill(width, height, 0u8);
        for y in 0..height {
            let x = ((rho - y as f64 * s) / c).round();
            if x >= 0.0 && (x as usize) < width {
                img.row_mut(y)[x as usize] = 255;
            }
        }
        img
    }

    fn voter(min_votes: u32) -> HoughVoter {
        HoughVoter::new(HoughConfig {
            min_votes,
            roi_offset_fraction: 0.0,
            ..HoughConfig::default()
        })
        .expect("valid config")
    }

    #[test]
    fn single_line_peaks_at_its_parameters() {
        for (rho, theta) in [(100.0, 30.0), (50.0, 120.0), (40.0, 10.0)] {
            let img = draw_line(200, 120, rho, theta);
            let v = voter(1);
            let acc = v.accumulate(&img.as_view()).expect("valid roi");
            let top = acc.argmax().expect("line pixels voted");

            assert!(
                (top.theta_deg - theta).abs() <= 1.0,
                "theta {} vs {theta}",
                top.theta_deg
            );
            assert!((top.rho - rho).abs() <= 1.0, "rho {} vs {rho}", top.rho);
        }
    }

    #[test]
    fn all_background_yields_nothing() {
        let img = Image::new_fill(64, 48, 0u8);
        let v = voter(1);

        let acc = v.accumulate(&img.as_view()).expect("valid roi");
        assert_eq!(acc.max_votes(), 0);

        let out = v.run(&img.as_view()).expect("valid map");
        assert_eq!(out.foreground, 0);
        assert_eq!(out.max_votes, 0);
        assert!(out.candidates.is_empty());
    }

    #[test]
    fn votes_are_counted_per_foreground_pixel() {
        let img = draw_line(80, 50, 30.0, 20.0);
        let fg = img.data().iter().filter(|&&v| v != 0).count();
        let acc = voter(1).accumulate(&img.as_view()).expect("valid roi");
        assert_eq!(acc.total_votes(), (fg * acc.num_theta()) as u64);
    }

    #[test]
    fn roi_excludes_rows_above_offset() {
        let mut img = Image::new_fill(32, 10, 0u8);
        img.row_mut(2)[5] = 255;
        img.row_mut(8)[5] = 255;

        let v = HoughVoter::new(HoughConfig {
            min_votes: 1,
            ..HoughConfig::default()
        })
        .expect("valid config");
        let out = v.run(&img.as_view()).expect("valid map");

        assert_eq!(out.roi_row_offset, 6);
        assert_eq!(out.roi_shape, (32, 4));
        assert_eq!(out.foreground, 1);
        assert_eq!(out.max_votes, 1);
    }

    #[test]
    fn threshold_filters_candidates() {
        let img = draw_line(200, 120, 100.0, 30.0);
        let strict = voter(1000).run(&img.as_view()).expect("valid map");
        assert!(strict.candidates.is_empty());
        assert!(strict.max_votes > 0);

        let loose = voter(100).run(&img.as_view()).expect("valid map");
        assert!(!loose.candidates.is_empty());
        assert!(loose.candidates.iter().all(|p| p.votes >= 100));
        assert_eq!(loose.candidates[0].votes, loose.max_votes);
    }

    #[test]
    fn local_maxima_never_adds_candidates() {
        let img = draw_line(200, 120, 100.0, 30.0);
        let all = voter(20).run(&img.as_view()).expect("valid map");
        let peaks = HoughVoter::new(HoughConfig {
            min_votes: 20,
            roi_offset_fraction: 0.0,
            peaks: PeakFilter::LocalMaxima,
            ..HoughConfig::default()
        })
        .expect("valid config")
        .run(&img.as_view())
        .expect("valid map");

        assert!(peaks.candidates.len() <= all.candidates.len());
        assert_eq!(peaks.candidates.first(), all.candidates.first());
    }
}
