use serde::{Deserialize, Serialize};

/// Quadratic map from detector column to physical time:
/// `p0 + p1*x + p2*x^2`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    pub p0: f64,
    pub p1: f64,
    pub p2: f64,
}

impl Default for Calibration {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Calibration {
    pub const IDENTITY: Self = Self {
        p0: 0.0,
        p1: 1.0,
        p2: 0.0,
    };

    pub fn new(p0: f64, p1: f64, p2: f64) -> Self {
        Self { p0, p1, p2 }
    }

    pub fn to_time(&self, pixel: f64) -> f64 {
        self.p0 + self.p1 * pixel + self.p2 * pixel * pixel
    }

    pub fn is_finite(&self) -> bool {
        self.p0.is_finite() && self.p1.is_finite() && self.p2.is_finite()
    }
}
