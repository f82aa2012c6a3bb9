use ld_core::{Error, retained_row_offset};
use ld_edge::{BinarizeConfig, EdgeConfig};
use ld_hough::HoughConfig;
use ld_morph::DilateConfig;
use serde::{Deserialize, Serialize};

use crate::selector::SelectorConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Fraction of rows kept from the bottom of the frame, in `(0, 1]`.
    pub retain_fraction: f64,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            retain_fraction: 1.0,
        }
    }
}

impl PreprocessConfig {
    pub fn validate(&self) -> Result<(), Error> {
        retained_row_offset(0, self.retain_fraction).map(|_| ())
    }
}

/// Every tunable of the pipeline, passed once into [`crate::LaneDetector::new`].
///
/// Omitted keys fall back to their defaults when deserialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaneConfig {
    pub preprocess: PreprocessConfig,
    pub edge: EdgeConfig,
    pub binarize: BinarizeConfig,
    pub dilate: DilateConfig,
    pub hough: HoughConfig,
    pub selector: SelectorConfig,
}

impl LaneConfig {
    pub fn validate(&self) -> Result<(), Error> {
        self.preprocess.validate()?;
        self.edge.validate()?;
        self.dilate.validate()?;
        self.hough.validate()?;
        self.selector.validate()
    }
}
