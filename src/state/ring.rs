//! Progress ring around the main timer

use serde::{Deserialize, Serialize};

/// One hash mark on the ring, as a line segment in SVG user units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HashMark {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

/// Ring geometry; marks are consumed clockwise from 12 o'clock as time runs out
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressRing {
    pub center_x: f64,
    pub center_y: f64,
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub total_marks: usize,
}

impl ProgressRing {
    pub fn new() -> Self {
        Self {
            center_x: 200.0,
            center_y: 200.0,
            inner_radius: 175.0,
            outer_radius: 195.0,
            total_marks: 60,
        }
    }

    /// Line segments for every mark, starting at the top
    pub fn hash_marks(&self) -> Vec<HashMark> {
        (0..self.total_marks)
            .map(|i| {
                let degrees = (i as f64 / self.total_marks as f64) * 360.0 - 90.0;
                let (sin, cos) = degrees.to_radians().sin_cos();
                HashMark {
                    x1: self.center_x + self.inner_radius * cos,
                    y1: self.center_y + self.inner_radius * sin,
                    x2: self.center_x + self.outer_radius * cos,
                    y2: self.center_y + self.outer_radius * sin,
                }
            })
            .collect()
    }

    /// Number of marks covering the elapsed share of the countdown.
    /// A zero-length countdown consumes nothing.
    pub fn consumed_marks(&self, remaining: u64, initial: u64) -> usize {
        if initial == 0 {
            return 0;
        }
        let elapsed = initial.saturating_sub(remaining) as u128;
        let consumed = elapsed * self.total_marks as u128 / initial as u128;
        (consumed as usize).min(self.total_marks)
    }
}

impl Default for ProgressRing {
    fn default() -> Self {
        Self::new()
    }
}

/// Ring geometry together with the current fill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RingStatus {
    #[serde(flatten)]
    pub ring: ProgressRing,
    pub consumed_marks: usize,
    pub marks: Vec<HashMark>,
}

#[cfg(test)]
mod test {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn first_mark_points_up() {
        let marks = ProgressRing::new().hash_marks();
        assert_eq!(marks.len(), 60);
        assert!(close(marks[0].x1, 200.0));
        assert!(close(marks[0].y1, 25.0));
        assert!(close(marks[0].y2, 5.0));
    }

    #[test]
    fn quarter_mark_points_right() {
        let marks = ProgressRing::new().hash_marks();
        assert!(close(marks[15].x1, 375.0));
        assert!(close(marks[15].y1, 200.0));
    }

    #[test]
    fn consumed_follows_elapsed_share() {
        let ring = ProgressRing::new();
        assert_eq!(ring.consumed_marks(240, 240), 0);
        assert_eq!(ring.consumed_marks(120, 240), 30);
        assert_eq!(ring.consumed_marks(237, 240), 0);
        assert_eq!(ring.consumed_marks(236, 240), 1);
        assert_eq!(ring.consumed_marks(0, 240), 60);
    }

    #[test]
    fn zero_length_consumes_nothing() {
        assert_eq!(ProgressRing::new().consumed_marks(0, 0), 0);
    }
}
