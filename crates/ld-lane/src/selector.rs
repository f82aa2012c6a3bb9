use ld_core::Error;
use ld_hough::HoughPeak;
use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// Open interval of normal angles, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngleBand {
    pub min_deg: f64,
    pub max_deg: f64,
}

impl AngleBand {
    pub const fn new(min_deg: f64, max_deg: f64) -> Self {
        Self { min_deg, max_deg }
    }

    /// Strict containment: both bounds are excluded.
    pub fn contains(&self, theta_deg: f64) -> bool {
        theta_deg > self.min_deg && theta_deg < self.max_deg
    }

    fn validate(&self, what: &'static str) -> Result<(), Error> {
        if !self.min_deg.is_finite()
            || !self.max_deg.is_finite()
            || self.min_deg < 0.0
            || self.max_deg > 180.0
            || self.min_deg >= self.max_deg
        {
            return Err(Error::InvalidConfig(what));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub left: AngleBand,
    pub right: AngleBand,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            left: AngleBand::new(1.0, 65.0),
            right: AngleBand::new(115.0, 179.0),
        }
    }
}

impl SelectorConfig {
    pub fn validate(&self) -> Result<(), Error> {
        self.left
            .validate("left band must satisfy 0 <= min < max <= 180 degrees")?;
        self.right
            .validate("right band must satisfy 0 <= min < max <= 180 degrees")
    }

    pub fn band(&self, side: Side) -> &AngleBand {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }
}

/// A selected lane line in polar form, relative to the Hough ROI origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub rho: f64,
    /// Normal angle in radians.
    pub theta: f64,
    pub theta_deg: f64,
    pub votes: u32,
    pub side: Side,
}

impl Line {
    fn from_peak(peak: &HoughPeak, side: Side) -> Self {
        Self {
            rho: peak.rho,
            theta: peak.theta,
            theta_deg: peak.theta_deg,
            votes: peak.votes,
            side,
        }
    }
}

/// First candidate, in the given order, whose theta lies strictly inside the
/// band of `side`.
pub fn select_side(candidates: &[HoughPeak], cfg: &SelectorConfig, side: Side) -> Option<Line> {
    let band = cfg.band(side);
    let hit = candidates
        .iter()
        .position(|p| band.contains(p.theta_deg))
        .map(|i| (i, Line::from_peak(&candidates[i], side)));

    match &hit {
        Some((i, line)) => debug!(
            "select {}: candidate #{i} rho={:.1} theta={:.1}deg votes={}",
            side.as_str(),
            line.rho,
            line.theta_deg,
            line.votes
        ),
        None => debug!(
            "select {}: no candidate in ({}, {}) deg",
            side.as_str(),
            band.min_deg,
            band.max_deg
        ),
    }

    hit.map(|(_, line)| line)
}

/// Independent first-match selection for both sides.
pub fn select_lanes(candidates: &[HoughPeak], cfg: &SelectorConfig) -> (Option<Line>, Option<Line>) {
    (
        select_side(candidates, cfg, Side::Left),
        select_side(candidates, cfg, Side::Right),
    )
}
