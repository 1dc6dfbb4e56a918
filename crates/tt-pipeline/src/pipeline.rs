use std::sync::Arc;

use log::{debug, warn};
use serde::Serialize;
use tt_core::{ClockTime, DetectorRoi, ImageView, project_columns};
use tt_signal::{MatchedFilter, RunningEstimator, TraceWindower, refine_peak};

use crate::calib::Calibration;
use crate::config::TimeToolConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::reference::ReferenceTable;
use crate::sideband::SidebandCorrector;
use crate::trigger::{EventFlags, TriggerDecoder};

/// Where the reference spectrum for an event comes from.
#[derive(Debug, Clone)]
pub enum ReferenceSource {
    /// Looked up by event timestamp; never updated.
    Table(Arc<ReferenceTable>),
    /// Accumulated from background-only events.
    Accumulated(RunningEstimator),
}

/// Inputs for one trigger. Missing pieces skip the event.
#[derive(Debug, Clone, Copy)]
pub struct DetectorEvent<'a, T> {
    pub frame: Option<ImageView<'a, T>>,
    pub flags: Option<EventFlags>,
    pub timestamp: Option<ClockTime>,
}

impl<'a, T> DetectorEvent<'a, T> {
    pub fn new(frame: ImageView<'a, T>, flags: EventFlags) -> Self {
        Self {
            frame: Some(frame),
            flags: Some(flags),
            timestamp: None,
        }
    }

    pub fn with_timestamp(mut self, timestamp: ClockTime) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    LaserAbsent,
    MissingFrame,
    MissingTrigger,
    MissingTimestamp,
    NoReference,
}

/// Edge position and amplitude for one measured event.
///
/// `position` and `position_unfit` are calibrated; the `pixel_*` fields hold
/// the same positions in filter-response columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measurement {
    pub position: f64,
    pub amplitude: f64,
    pub position_unfit: f64,
    pub amplitude_unfit: f64,
    pub pixel_position: f64,
    pub pixel_position_unfit: usize,
    pub refined: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "value", rename_all = "snake_case")]
pub enum EventOutcome {
    Skipped(SkipReason),
    /// Background-only event folded into the accumulated reference.
    ReferenceUpdated { reference: Vec<f64> },
    Measured(Measurement),
}

fn skipped(reason: SkipReason) -> PipelineResult<EventOutcome> {
    Ok(EventOutcome::Skipped(reason))
}

/// Per-event edge finder.
///
/// Each event runs: dark subtraction, reference resolution, normalization,
/// optional sideband correction, matched filtering, quadratic refinement,
/// calibration and optional trace windowing. Running baselines only change
/// when an event ends in [`EventOutcome::ReferenceUpdated`] or in an
/// [`EventOutcome::Measured`] whose peak fit did not degenerate.
#[derive(Debug, Clone)]
pub struct TimeToolPipeline {
    roi: DetectorRoi,
    dark: RunningEstimator,
    reference: ReferenceSource,
    sideband: Option<SidebandCorrector>,
    filter: MatchedFilter,
    calibration: Calibration,
    windower: Option<TraceWindower>,
    trigger: TriggerDecoder,
}

impl TimeToolPipeline {
    /// Builds a pipeline, loading `config.reference_table` when set.
    pub fn new(config: &TimeToolConfig) -> PipelineResult<Self> {
        let table = config
            .reference_table
            .as_deref()
            .map(ReferenceTable::load)
            .transpose()?
            .map(Arc::new);
        Self::with_reference_table(config, table)
    }

    /// Builds a pipeline around an already loaded table, ignoring
    /// `config.reference_table`. `None` selects reference accumulation.
    pub fn with_reference_table(
        config: &TimeToolConfig,
        table: Option<Arc<ReferenceTable>>,
    ) -> PipelineResult<Self> {
        config.validate()?;
        let ref_rate = config.ref_rate()?;

        let reference = match table {
            Some(table) => {
                let needed = config.roi.columns.hi;
                if table.min_spectrum_len() < needed {
                    return Err(PipelineError::Config(format!(
                        "reference table spectra have {} values, column range needs {needed}",
                        table.min_spectrum_len()
                    )));
                }
                ReferenceSource::Table(table)
            }
            None => ReferenceSource::Accumulated(RunningEstimator::new(ref_rate)),
        };

        let filter = MatchedFilter::new(config.kernel().to_vec());
        let windower = TraceWindower::new(config.trace_samples, filter.len());

        Ok(Self {
            roi: config.roi,
            dark: RunningEstimator::new(config.dark_rate()?),
            reference,
            sideband: config
                .sideband_width
                .map(|width| SidebandCorrector::new(width, ref_rate)),
            filter,
            calibration: config.calibration,
            windower,
            trigger: config.trigger_decoder(),
        })
    }

    pub fn roi(&self) -> &DetectorRoi {
        &self.roi
    }

    pub fn reference_source(&self) -> &ReferenceSource {
        &self.reference
    }

    /// Accumulated reference, if any. Always `None` in table mode.
    pub fn accumulated_reference(&self) -> Option<&[f64]> {
        match &self.reference {
            ReferenceSource::Accumulated(acc) => acc.current(),
            ReferenceSource::Table(_) => None,
        }
    }

    pub fn dark_baseline(&self) -> Option<&[f64]> {
        self.dark.current()
    }

    pub fn sideband(&self) -> Option<&SidebandCorrector> {
        self.sideband.as_ref()
    }

    pub fn filter(&self) -> &MatchedFilter {
        &self.filter
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    pub fn windower(&self) -> Option<&TraceWindower> {
        self.windower.as_ref()
    }

    pub fn laser_gated(&self) -> bool {
        self.trigger.laser_gated()
    }

    /// Decodes raw event codes with the configured trigger codes.
    pub fn decode_trigger(&self, codes: &[i32]) -> EventFlags {
        self.trigger.decode(codes)
    }

    /// Runs one event through the pipeline.
    ///
    /// Returns `Err` only when the frame does not contain the configured
    /// regions; every other condition that prevents a measurement is an
    /// [`EventOutcome::Skipped`].
    pub fn process_event<T>(&mut self, event: &DetectorEvent<'_, T>) -> PipelineResult<EventOutcome>
    where
        T: Copy + Into<f64>,
    {
        let Some(flags) = event.flags else {
            warn!("event has no trigger data, skipping");
            return skipped(SkipReason::MissingTrigger);
        };
        if self.laser_gated() && !flags.laser {
            debug!("laser absent, skipping");
            return skipped(SkipReason::LaserAbsent);
        }
        let Some(frame) = event.frame.as_ref() else {
            warn!("event has no frame, skipping");
            return skipped(SkipReason::MissingFrame);
        };

        let roi = self.roi;
        roi.check_within(frame.width(), frame.height(), self.sideband.is_some())?;

        let dark_next = self
            .dark
            .updated(&project_columns(frame, roi.dark, roi.columns)?);
        let signal = subtract(
            &project_columns(frame, roi.signal, roi.columns)?,
            &dark_next,
        );
        let sideband = match self.sideband {
            Some(_) => Some(subtract(
                &project_columns(frame, roi.sideband, roi.columns)?,
                &dark_next,
            )),
            None => None,
        };
        let sideband_next = match (&self.sideband, &sideband) {
            (Some(sb), Some(projection)) if flags.bykick => Some(sb.updated_baseline(projection)),
            _ => None,
        };

        let normalized = {
            let reference: &[f64] = match &mut self.reference {
                ReferenceSource::Accumulated(acc) if flags.bykick => {
                    let reference = acc.updated(&signal);
                    acc.commit(reference.clone());
                    self.dark.commit(dark_next);
                    if let (Some(sb), Some(next)) = (self.sideband.as_mut(), sideband_next) {
                        sb.commit(next);
                    }
                    debug!("reference updated");
                    return Ok(EventOutcome::ReferenceUpdated { reference });
                }
                ReferenceSource::Accumulated(acc) => match acc.current() {
                    Some(reference) => reference,
                    None => return skipped(SkipReason::NoReference),
                },
                ReferenceSource::Table(table) => {
                    let Some(ts) = event.timestamp else {
                        warn!("event has no timestamp for reference lookup, skipping");
                        return skipped(SkipReason::MissingTimestamp);
                    };
                    match table.lookup(ts).get(roi.columns.lo..roi.columns.hi) {
                        Some(reference) => reference,
                        None => return skipped(SkipReason::NoReference),
                    }
                }
            };
            normalize(&signal, reference)
        };

        let corrected = match (&self.sideband, &sideband) {
            (Some(sb), Some(projection)) => {
                let baseline = match (&sideband_next, sb.baseline()) {
                    (Some(next), _) => next.as_slice(),
                    (None, Some(current)) => current,
                    (None, None) => return skipped(SkipReason::NoReference),
                };
                let correction = sb.correction_against(baseline, projection);
                subtract(&normalized, &correction)
            }
            _ => normalized,
        };

        let response = self.filter.detect(&corrected).ok_or_else(|| {
            PipelineError::Config("column range is narrower than the matched filter".into())
        })?;
        let peak = response.peak;
        let refined = refine_peak(&response.trace, peak);
        let trace = self.windower.map(|w| w.window(&corrected, peak.index));

        // A degenerate fit is reported but leaves the baselines as they were.
        if refined.is_degenerate() {
            debug!(
                "ampl {:.4} pos {}: degenerate fit, baselines kept",
                peak.amplitude, peak.index
            );
        } else {
            self.dark.commit(dark_next);
            if let (Some(sb), Some(next)) = (self.sideband.as_mut(), sideband_next) {
                sb.commit(next);
            }
            debug!(
                "ampl {:.4} pos {} -> ampl {:.4} pos {:.3}",
                peak.amplitude, peak.index, refined.amplitude, refined.position
            );
        }

        Ok(EventOutcome::Measured(Measurement {
            position: self.calibration.to_time(refined.position),
            amplitude: refined.amplitude,
            position_unfit: self.calibration.to_time(peak.index as f64),
            amplitude_unfit: peak.amplitude,
            pixel_position: refined.position,
            pixel_position_unfit: peak.index,
            refined: refined.is_refined(),
            trace,
        }))
    }
}

fn subtract(a: &[f64], b: &[f64]) -> Vec<f64> {
    a.iter().zip(b).map(|(&x, &y)| x - y).collect()
}

/// `signal / reference - 1`, elementwise.
fn normalize(signal: &[f64], reference: &[f64]) -> Vec<f64> {
    signal
        .iter()
        .zip(reference)
        .map(|(&s, &r)| s / r - 1.0)
        .collect()
}
