use ld_core::Point2f;

use crate::selector::Line;

/// Below this `|sin(theta)|` a line is treated as vertical.
const VERTICAL_EPS: f64 = 1e-9;

/// Two endpoints of a lane line in full-frame pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    pub p0: Point2f,
    pub p1: Point2f,
}

impl LineSegment {
    /// Converts `line` into a segment spanning columns `0..=width - 1`.
    ///
    /// `line` is expressed relative to a region whose first row sits at
    /// `row_offset` in the full frame. Near-vertical lines span rows
    /// `row_offset..=frame_height - 1` instead.
    pub fn from_line(line: &Line, width: usize, row_offset: usize, frame_height: usize) -> Self {
        let (s, c) = line.theta.sin_cos();
        let dy = row_offset as f64;

        if s.abs() < VERTICAL_EPS {
            let x = (line.rho / c) as f32;
            let y1 = frame_height.saturating_sub(1).max(row_offset) as f32;
            return Self {
                p0: Point2f::new(x, dy as f32),
                p1: Point2f::new(x, y1),
            };
        }

        let x0 = 0.0;
        let x1 = width.saturating_sub(1) as f64;
        let y_at = |x: f64| (line.rho - x * c) / s + dy;

        Self {
            p0: Point2f::new(x0 as f32, y_at(x0) as f32),
            p1: Point2f::new(x1 as f32, y_at(x1) as f32),
        }
    }

    pub fn length(&self) -> f32 {
        (self.p1 - self.p0).norm()
    }

    /// Point at parameter `t` (`0` at `p0`, `1` at `p1`).
    pub fn point_at(&self, t: f32) -> Point2f {
        self.p0 + (self.p1 - self.p0) * t
    }

    /// The part of the segment inside pixel-centre box
    /// `[0, width - 1] x [0, height - 1]`, or `None` when it misses the frame.
    ///
    /// Liang-Barsky clipping in `f64`; endpoints are clamped to the box so
    /// rounding on far-away endpoints cannot push them outside.
    pub fn clipped_to(&self, width: usize, height: usize) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        let coords = [self.p0.x, self.p0.y, self.p1.x, self.p1.y];
        if coords.iter().any(|v| !v.is_finite()) {
            return None;
        }

        let (x0, y0) = (f64::from(self.p0.x), f64::from(self.p0.y));
        let (dx, dy) = (f64::from(self.p1.x) - x0, f64::from(self.p1.y) - y0);
        let (xmax, ymax) = ((width - 1) as f64, (height - 1) as f64);

        let mut t0 = 0.0f64;
        let mut t1 = 1.0f64;
        for (p, q) in [(-dx, x0), (dx, xmax - x0), (-dy, y0), (dy, ymax - y0)] {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
                continue;
            }
            let r = q / p;
            if p < 0.0 {
                if r > t1 {
                    return None;
                }
                t0 = t0.max(r);
            } else {
                if r < t0 {
                    return None;
                }
                t1 = t1.min(r);
            }
        }

        let at = |t: f64| {
            Point2f::new(
                (x0 + dx * t).clamp(0.0, xmax) as f32,
                (y0 + dy * t).clamp(0.0, ymax) as f32,
            )
        };
        Some(Self {
            p0: at(t0),
            p1: at(t1),
        })
    }
}
