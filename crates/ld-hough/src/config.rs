use ld_core::Error;
use serde::{Deserialize, Serialize};

/// Which accumulator cells at or above the vote threshold become candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeakFilter {
    /// Every cell with `votes >= min_votes`.
    #[default]
    All,
    /// Only 4-neighbour peaks: strictly above the lower rho and lower theta
    /// neighbours, at least equal to the upper ones.
    LocalMaxima,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoughConfig {
    /// Rho bin width in pixels.
    pub rho_step: f64,
    /// Theta bin width in degrees.
    pub theta_step_deg: f64,
    /// Minimum votes for a cell to become a candidate.
    pub min_votes: u32,
    /// The ROI starts at row `round(roi_offset_fraction * height)`.
    pub roi_offset_fraction: f64,
    pub peaks: PeakFilter,
}

impl Default for HoughConfig {
    fn default() -> Self {
        Self {
            rho_step: 1.0,
            theta_step_deg: 1.0,
            min_votes: 110,
            roi_offset_fraction: 0.6,
            peaks: PeakFilter::All,
        }
    }
}

impl HoughConfig {
    pub fn validate(&self) -> Result<(), Error> {
        if !self.rho_step.is_finite() || self.rho_step <= 0.0 {
            return Err(Error::InvalidConfig("hough rho step must be > 0"));
        }
        if !self.theta_step_deg.is_finite()
            || self.theta_step_deg <= 0.0
            || self.theta_step_deg > 180.0
        {
            return Err(Error::InvalidConfig("hough theta step must lie in (0, 180] degrees"));
        }
        if self.min_votes == 0 {
            return Err(Error::InvalidConfig("hough minimum votes must be >= 1"));
        }
        if !self.roi_offset_fraction.is_finite()
            || self.roi_offset_fraction < 0.0
            || self.roi_offset_fraction >= 1.0
        {
            return Err(Error::InvalidConfig("roi offset fraction must lie in [0, 1)"));
        }
        Ok(())
    }

    /// Number of theta bins covering `[0°, 180°)`.
    pub fn num_theta(&self) -> usize {
        ((180.0 / self.theta_step_deg).round() as usize).max(1)
    }
}

/// First ROI row: `round(fraction * height)` with ties to even, clamped to
/// `height`.
pub fn roi_row_offset(height: usize, fraction: f64) -> usize {
    let row = (fraction * height as f64).round_ties_even();
    if row <= 0.0 {
        0
    } else {
        (row as usize).min(height)
    }
}

#[cfg(test)]
mod tests {
    use super::{HoughConfig, roi_row_offset};

    #[test]
    fn default_roi_starts_three_fifths_down() {
        let cfg = HoughConfig::default();
        assert_eq!(roi_row_offset(400, cfg.roi_offset_fraction), 240);
        assert_eq!(roi_row_offset(480, cfg.roi_offset_fraction), 288);
        assert_eq!(roi_row_offset(5, cfg.roi_offset_fraction), 3);
    }

    #[test]
    fn roi_rounding_ties_to_even() {
        assert_eq!(roi_row_offset(5, 0.5), 2);
        assert_eq!(roi_row_offset(7, 0.5), 4);
        assert_eq!(roi_row_offset(10, 0.0), 0);
    }

    #[test]
    fn theta_bins_cover_half_turn() {
        let mut cfg = HoughConfig::default();
        assert_eq!(cfg.num_theta(), 180);
        cfg.theta_step_deg = 0.5;
        assert_eq!(cfg.num_theta(), 360);
        cfg.theta_step_deg = 180.0;
        assert_eq!(cfg.num_theta(), 1);
    }

    #[test]
    fn validation_rejects_degenerate_values() {
        let base = HoughConfig::default();
        assert!(base.validate().is_ok());

        let bad = [
            HoughConfig { rho_step: 0.0, ..base.clone() },
            HoughConfig { theta_step_deg: -1.0, ..base.clone() },
            HoughConfig { theta_step_deg: 200.0, ..base.clone() },
            HoughConfig { min_votes: 0, ..base.clone() },
            HoughConfig { roi_offset_fraction: 1.0, ..base.clone() },
            HoughConfig { rho_step: f64::NAN, ..base.clone() },
        ];
        for cfg in bad {
            assert!(cfg.validate().is_err(), "{cfg:?} should be rejected");
        }
    }
}
