use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tt_core::DetectorRoi;
use tt_signal::{ConvergenceRate, DEFAULT_MATCHED_FILTER};

use crate::calib::Calibration;
use crate::error::{PipelineError, PipelineResult};
use crate::trigger::{BYKICK_EVENT_CODE, TriggerDecoder};

/// Camera frame dimensions, used to reject regions at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorShape {
    pub width: usize,
    pub height: usize,
}

/// Construction-time settings for [`crate::TimeToolPipeline`].
///
/// Optional features are switched on by their settings: `sideband_width`
/// enables sideband correction, `reference_table` replaces reference
/// accumulation with table lookup, `trace_samples > 0` enables the diagnostic
/// trace and a non-zero `laser_event_code` enables laser gating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeToolConfig {
    pub roi: DetectorRoi,
    pub ref_convergence: f64,
    pub dark_convergence: f64,
    pub sideband_width: Option<usize>,
    pub calibration: Calibration,
    pub laser_event_code: i32,
    pub bykick_event_code: i32,
    pub reference_table: Option<PathBuf>,
    pub filter_weights: Option<Vec<f64>>,
    pub trace_samples: usize,
    pub sensor: Option<SensorShape>,
}

impl Default for TimeToolConfig {
    fn default() -> Self {
        Self {
            roi: DetectorRoi::default(),
            ref_convergence: 1.0,
            dark_convergence: 0.05,
            sideband_width: None,
            calibration: Calibration::IDENTITY,
            laser_event_code: 0,
            bykick_event_code: BYKICK_EVENT_CODE,
            reference_table: None,
            filter_weights: None,
            trace_samples: 0,
            sensor: None,
        }
    }
}

impl TimeToolConfig {
    pub fn from_json_str(text: &str) -> PipelineResult<Self> {
        let cfg: Self = serde_json::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_file(path: &Path) -> PipelineResult<Self> {
        let text = fs::read_to_string(path).map_err(|source| PipelineError::FileIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn kernel(&self) -> &[f64] {
        self.filter_weights
            .as_deref()
            .unwrap_or(&DEFAULT_MATCHED_FILTER[..])
    }

    pub fn ref_rate(&self) -> PipelineResult<ConvergenceRate> {
        rate("ref_convergence", self.ref_convergence)
    }

    pub fn dark_rate(&self) -> PipelineResult<ConvergenceRate> {
        rate("dark_convergence", self.dark_convergence)
    }

    pub fn trigger_decoder(&self) -> TriggerDecoder {
        TriggerDecoder::new(self.bykick_event_code, self.laser_event_code)
    }

    pub fn validate(&self) -> PipelineResult<()> {
        self.roi.validate()?;
        self.ref_rate()?;
        self.dark_rate()?;

        if self.sideband_width == Some(0) {
            return Err(PipelineError::Config(
                "sideband_width must be positive".into(),
            ));
        }

        let kernel = self.kernel();
        if kernel.is_empty() || kernel.iter().any(|w| !w.is_finite()) {
            return Err(PipelineError::Config(
                "filter_weights must be non-empty and finite".into(),
            ));
        }
        if kernel.len() > self.roi.width() {
            return Err(PipelineError::Config(format!(
                "matched filter has {} taps but the column range is only {} wide",
                kernel.len(),
                self.roi.width()
            )));
        }

        if !self.calibration.is_finite() {
            return Err(PipelineError::Config(
                "calibration coefficients must be finite".into(),
            ));
        }

        if let Some(sensor) = self.sensor {
            self.roi
                .check_within(sensor.width, sensor.height, self.sideband_width.is_some())?;
        }

        Ok(())
    }
}

fn rate(name: &str, alpha: f64) -> PipelineResult<ConvergenceRate> {
    ConvergenceRate::new(alpha)
        .ok_or_else(|| PipelineError::Config(format!("{name} must be in (0, 1], got {alpha}")))
}

#[cfg(test)]
mod tests {
    use tt_core::Span;

    use super::{SensorShape, TimeToolConfig};
    use crate::error::PipelineError;

    #[test]
    fn defaults_are_valid() {
        let cfg = TimeToolConfig::default();
        cfg.validate().expect("default config is valid");
        assert_eq!(cfg.roi.width(), 700);
        assert_eq!(cfg.kernel().len(), 110);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = TimeToolConfig::from_json_str(
            r#"{
                "roi": { "columns": { "lo": 0, "hi": 400 } },
                "sideband_width": 9,
                "calibration": { "p0": 1.5, "p1": -0.2, "p2": 0.0 },
                "trace_samples": 100
            }"#,
        )
        .expect("valid config");

        assert_eq!(cfg.roi.columns, Span::new(0, 400));
        assert_eq!(cfg.roi.signal, Span::new(640, 680));
        assert_eq!(cfg.sideband_width, Some(9));
        assert_eq!(cfg.dark_convergence, 0.05);
        assert_eq!(cfg.trace_samples, 100);
    }

    #[test]
    fn rejects_bad_rates_and_regions() {
        let cfg = TimeToolConfig {
            dark_convergence: 0.0,
            ..TimeToolConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(PipelineError::Config(_))));

        let mut cfg = TimeToolConfig::default();
        cfg.roi.signal = Span::new(680, 640);
        assert!(matches!(cfg.validate(), Err(PipelineError::Region(_))));

        let cfg = TimeToolConfig {
            sensor: Some(SensorShape {
                width: 1024,
                height: 600,
            }),
            ..TimeToolConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(PipelineError::Region(_))));
    }

    #[test]
    fn rejects_kernel_wider_than_roi() {
        let mut cfg = TimeToolConfig::default();
        cfg.roi.columns = Span::new(100, 150);
        assert!(matches!(cfg.validate(), Err(PipelineError::Config(_))));

        cfg.filter_weights = Some(vec![0.5, -0.5]);
        cfg.validate().expect("short kernel fits");
    }
}
