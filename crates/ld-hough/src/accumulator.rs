use ld_core::Error;
use serde::Serialize;

use crate::config::{HoughConfig, PeakFilter};

/// One accumulator cell reported as a line candidate.
///
/// `rho` is in pixels relative to the ROI origin, `theta` in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HoughPeak {
    pub rho: f64,
    pub theta: f64,
    pub theta_deg: f64,
    pub votes: u32,
    pub rho_bin: usize,
    pub theta_bin: usize,
}

/// Vote counts indexed by `(rho_bin, theta_bin)`.
///
/// The rho axis is symmetric around zero and spans the ROI diagonal, so
/// every pixel of a `width x height` ROI lands inside it for every theta.
/// Storage is theta-major: one contiguous run of rho bins per theta.
#[derive(Debug, Clone)]
pub struct HoughAccumulator {
    width: usize,
    height: usize,
    rho_step: f64,
    theta_step_deg: f64,
    num_rho: usize,
    num_theta: usize,
    rho_zero_bin: usize,
    cos: Vec<f64>,
    sin: Vec<f64>,
    votes: Vec<u32>,
}

impl HoughAccumulator {
    /// Allocates an empty accumulator sized for a `width x height` ROI.
    pub fn new(width: usize, height: usize, cfg: &HoughConfig) -> Result<Self, Error> {
        cfg.validate()?;

        let max_x = width.saturating_sub(1) as f64;
        let max_y = height.saturating_sub(1) as f64;
        let diagonal = (max_x * max_x + max_y * max_y).sqrt();
        // One spare bin per side absorbs rounding at the extremes.
        let half = (diagonal / cfg.rho_step).ceil() as usize + 1;
        let num_rho = 2 * half + 1;

        let num_theta = cfg.num_theta();
        let (sin, cos): (Vec<f64>, Vec<f64>) = (0..num_theta)
            .map(|t| (t as f64 * cfg.theta_step_deg).to_radians().sin_cos())
            .unzip();

        Ok(Self {
            width,
            height,
            rho_step: cfg.rho_step,
            theta_step_deg: cfg.theta_step_deg,
            num_rho,
            num_theta,
            rho_zero_bin: half,
            cos,
            sin,
            votes: vec![0; num_rho * num_theta],
        })
    }

    pub fn num_rho(&self) -> usize {
        self.num_rho
    }

    pub fn num_theta(&self) -> usize {
        self.num_theta
    }

    /// `(width, height)` of the ROI this accumulator was sized for.
    pub fn roi_shape(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn votes(&self, rho_bin: usize, theta_bin: usize) -> u32 {
        if rho_bin >= self.num_rho || theta_bin >= self.num_theta {
            return 0;
        }
        self.votes[theta_bin * self.num_rho + rho_bin]
    }

    /// Rho value at the centre of `rho_bin`.
    pub fn rho_of(&self, rho_bin: usize) -> f64 {
        (rho_bin as f64 - self.rho_zero_bin as f64) * self.rho_step
    }

    /// Theta of `theta_bin` in degrees.
    pub fn theta_deg_of(&self, theta_bin: usize) -> f64 {
        theta_bin as f64 * self.theta_step_deg
    }

    /// Theta of `theta_bin` in radians.
    pub fn theta_of(&self, theta_bin: usize) -> f64 {
        self.theta_deg_of(theta_bin).to_radians()
    }

    /// Rho bin for `rho`, or `None` outside the accumulator range.
    pub fn rho_bin(&self, rho: f64) -> Option<usize> {
        let bin = (rho / self.rho_step).round_ties_even() + self.rho_zero_bin as f64;
        if bin < 0.0 || bin >= self.num_rho as f64 {
            return None;
        }
        Some(bin as usize)
    }

    /// Casts one vote per theta bin for the pixel at `(x, y)`.
    pub fn vote(&mut self, x: usize, y: usize) {
        let (xf, yf) = (x as f64, y as f64);
        for t in 0..self.num_theta {
            let rho = xf * self.cos[t] + yf * self.sin[t];
            if let Some(r) = self.rho_bin(rho) {
                self.votes[t * self.num_rho + r] += 1;
            }
        }
    }

    pub fn total_votes(&self) -> u64 {
        self.votes.iter().map(|&v| u64::from(v)).sum()
    }

    pub fn max_votes(&self) -> u32 {
        self.votes.iter().copied().max().unwrap_or(0)
    }

    /// Highest cell in canonical order, or `None` if nothing was voted.
    pub fn argmax(&self) -> Option<HoughPeak> {
        if self.max_votes() == 0 {
            return None;
        }
        self.peaks(1, PeakFilter::All).into_iter().next()
    }

    /// Cells with at least `min_votes`, sorted by descending votes, then
    /// ascending rho, then ascending theta.
    pub fn peaks(&self, min_votes: u32, filter: PeakFilter) -> Vec<HoughPeak> {
        let mut out = Vec::new();
        for t in 0..self.num_theta {
            for r in 0..self.num_rho {
                let v = self.votes[t * self.num_rho + r];
                if v < min_votes || v == 0 {
                    continue;
                }
                if filter == PeakFilter::LocalMaxima && !self.is_local_max(r, t, v) {
                    continue;
                }
                out.push(self.peak_at(r, t, v));
            }
        }

        out.sort_by(|a, b| {
            b.votes
                .cmp(&a.votes)
                .then(a.rho_bin.cmp(&b.rho_bin))
                .then(a.theta_bin.cmp(&b.theta_bin))
        });
        out
    }

    fn is_local_max(&self, r: usize, t: usize, v: u32) -> bool {
        let lower_rho = r.checked_sub(1).map_or(0, |rr| self.votes(rr, t));
        let lower_theta = t.checked_sub(1).map_or(0, |tt| self.votes(r, tt));
        v > lower_rho
            && v >= self.votes(r + 1, t)
            && v > lower_theta
            && v >= self.votes(r, t + 1)
    }

    fn peak_at(&self, rho_bin: usize, theta_bin: usize, votes: u32) -> HoughPeak {
        HoughPeak {
            rho: self.rho_of(rho_bin),
            theta: self.theta_of(theta_bin),
            theta_deg: self.theta_deg_of(theta_bin),
            votes,
            rho_bin,
            theta_bin,
        }
    }
}
