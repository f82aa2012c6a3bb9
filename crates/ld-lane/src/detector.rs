//! End-to-end pipeline: crop, Sobel, threshold, dilate, Hough, select.
//!
//! Each stage consumes the complete output of its predecessor. [`LaneDetector::detect`]
//! drops every intermediate buffer as soon as the next stage has consumed it;
//! [`LaneDetector::detect_with_stages`] keeps them for inspection.

use std::time::Instant;

use ld_core::{
    Error, Image, ImageView, crop_bottom, crop_rows_from, ensure_same_shape,
    retained_row_offset,
};
use ld_edge::{EdgeDetector, binarize_u8, count_foreground};
use ld_hough::{HoughAccumulator, HoughOutcome, HoughVoter};
use ld_morph::dilate_binary_u8;
use log::debug;

use crate::config::LaneConfig;
use crate::segment::LineSegment;
use crate::selector::{Line, Side, select_lanes};
use crate::timing::{TimingBreakdown, elapsed_ms};

/// A selected line together with its full-frame endpoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lane {
    pub line: Line,
    pub segment: LineSegment,
}

/// Result of one detection run.
#[derive(Debug, Clone, PartialEq)]
pub struct LaneDetection {
    pub left: Option<Lane>,
    pub right: Option<Lane>,
    /// Candidates at or above the vote threshold, before band selection.
    pub candidate_count: usize,
    pub max_votes: u32,
    /// First Hough ROI row in full-frame coordinates. Line `rho` values are
    /// relative to this row.
    pub roi_row_offset: usize,
    /// `(width, height)` of the input frame.
    pub frame_shape: (usize, usize),
    pub timing: TimingBreakdown,
}

impl LaneDetection {
    pub fn lane(&self, side: Side) -> Option<&Lane> {
        match side {
            Side::Left => self.left.as_ref(),
            Side::Right => self.right.as_ref(),
        }
    }

    /// Selected lines, left first.
    pub fn lines(&self) -> impl Iterator<Item = &Line> {
        self.left.iter().chain(self.right.iter()).map(|l| &l.line)
    }
}

/// Intermediate maps of one run, in pipeline order.
#[derive(Debug, Clone)]
pub struct PipelineStages {
    /// Input after the vertical crop.
    pub gray: Image<u8>,
    pub gradient: Image<u8>,
    pub binary: Image<u8>,
    pub dilated: Image<u8>,
    /// First ROI row within `dilated`.
    pub roi_row_offset: usize,
    /// Filled accumulator of the ROI.
    pub accumulator: HoughAccumulator,
}

impl PipelineStages {
    /// The region of `dilated` that was voted on.
    pub fn roi(&self) -> Result<ImageView<'_, u8>, Error> {
        crop_rows_from(&self.dilated.as_view(), self.roi_row_offset)
    }
}

pub struct LaneDetector {
    cfg: LaneConfig,
    edges: EdgeDetector,
    voter: HoughVoter,
}

impl LaneDetector {
    /// Validates `cfg` and prepares the stage objects.
    pub fn new(cfg: &LaneConfig) -> Result<Self, Error> {
        cfg.validate()?;
        Ok(Self {
            cfg: cfg.clone(),
            edges: EdgeDetector::new(&cfg.edge)?,
            voter: HoughVoter::new(cfg.hough.clone())?,
        })
    }

    pub fn config(&self) -> &LaneConfig {
        &self.cfg
    }

    /// Runs the full pipeline on one grayscale frame.
    pub fn detect(&mut self, img: &ImageView<'_, u8>) -> Result<LaneDetection, Error> {
        let start = Instant::now();
        let mut timing = TimingBreakdown::default();

        let crop_offset = retained_row_offset(img.height(), self.cfg.preprocess.retain_fraction)?;
        let gray = crop_bottom(img, self.cfg.preprocess.retain_fraction)?;

        let dilated = {
            let gradient = self.gradient(&gray, &mut timing)?;
            let binary = self.binarize(&gradient, &mut timing);
            self.dilate(&binary, &mut timing)?
        };
        ensure_same_shape(gray.shape(), dilated.shape())?;

        let t = Instant::now();
        let outcome = self.voter.run(&dilated.as_view())?;
        timing.record("hough", t);
        drop(dilated);

        Ok(self.finish(img.shape(), crop_offset, outcome, timing, start))
    }

    /// Same as [`LaneDetector::detect`] but returns every intermediate map.
    pub fn detect_with_stages(
        &mut self,
        img: &ImageView<'_, u8>,
    ) -> Result<(LaneDetection, PipelineStages), Error> {
        let start = Instant::now();
        let mut timing = TimingBreakdown::default();

        let crop_offset = retained_row_offset(img.height(), self.cfg.preprocess.retain_fraction)?;
        let gray = crop_bottom(img, self.cfg.preprocess.retain_fraction)?;
        let gradient = self.gradient(&gray, &mut timing)?;
        let binary = self.binarize(&gradient, &mut timing);
        let dilated = self.dilate(&binary, &mut timing)?;
        ensure_same_shape(gray.shape(), dilated.shape())?;

        let t = Instant::now();
        let (outcome, accumulator) = self.voter.run_with_accumulator(&dilated.as_view())?;
        timing.record("hough", t);

        let roi_row_offset = outcome.roi_row_offset;
        let detection = self.finish(img.shape(), crop_offset, outcome, timing, start);
        let stages = PipelineStages {
            gray: gray.to_image(),
            gradient,
            binary,
            dilated,
            roi_row_offset,
            accumulator,
        };
        Ok((detection, stages))
    }

    fn gradient(
        &mut self,
        gray: &ImageView<'_, u8>,
        timing: &mut TimingBreakdown,
    ) -> Result<Image<u8>, Error> {
        let t = Instant::now();
        let gradient = self.edges.detect_u8(gray)?;
        timing.record("edges", t);
        debug!(
            "edges: {}x{} sobel{}",
            gradient.width(),
            gradient.height(),
            self.edges.kernel().size
        );
        Ok(gradient)
    }

    fn binarize(&self, gradient: &Image<u8>, timing: &mut TimingBreakdown) -> Image<u8> {
        let t = Instant::now();
        let binary = binarize_u8(&gradient.as_view(), self.cfg.binarize.threshold);
        timing.record("binarize", t);
        debug!(
            "binarize: threshold {}, {} foreground px",
            self.cfg.binarize.threshold,
            count_foreground(&binary.as_view())
        );
        binary
    }

    fn dilate(&self, binary: &Image<u8>, timing: &mut TimingBreakdown) -> Result<Image<u8>, Error> {
        let t = Instant::now();
        let dilated = dilate_binary_u8(&binary.as_view(), self.cfg.dilate.kernel_size)?;
        timing.record("dilate", t);
        debug!(
            "dilate: {}x{} kernel, {} foreground px",
            self.cfg.dilate.kernel_size,
            self.cfg.dilate.kernel_size,
            count_foreground(&dilated.as_view())
        );
        Ok(dilated)
    }

    fn finish(
        &self,
        frame_shape: (usize, usize),
        crop_offset: usize,
        outcome: HoughOutcome,
        mut timing: TimingBreakdown,
        start: Instant,
    ) -> LaneDetection {
        let t = Instant::now();
        let (width, height) = frame_shape;
        let roi_row_offset = crop_offset + outcome.roi_row_offset;

        let (left, right) = select_lanes(&outcome.candidates, &self.cfg.selector);
        let to_lane = |line: Line| Lane {
            line,
            segment: LineSegment::from_line(&line, width, roi_row_offset, height),
        };
        let left = left.map(to_lane);
        let right = right.map(to_lane);
        timing.record("select", t);
        timing.total_ms = elapsed_ms(start);

        debug!(
            "detect: {} candidates, left={} right={}, {:.2} ms",
            outcome.candidates.len(),
            left.is_some(),
            right.is_some(),
            timing.total_ms
        );

        LaneDetection {
            left,
            right,
            candidate_count: outcome.candidates.len(),
            max_votes: outcome.max_votes,
            roi_row_offset,
            frame_shape,
            timing,
        }
    }
}
