//! Per-event timetool processing.
//!
//! [`TimeToolPipeline`] turns one camera frame into an edge position and
//! amplitude. It keeps three running baselines (dark, reference, sideband)
//! that only change on events which complete, so a skipped or failed event
//! leaves the pipeline exactly as it was.
//!
//! ## Reference modes
//! - **Accumulated**: background-only events fold their signal projection
//!   into the reference and end as [`EventOutcome::ReferenceUpdated`].
//!   Measuring events are skipped until the first reference exists.
//! - **Table**: a [`ReferenceTable`] loaded at construction supplies the
//!   reference for each event timestamp. Every event is measured.
//!
//! ## Optional stages
//! Sideband correction, trace windowing and laser gating are switched on by
//! [`TimeToolConfig`] and fixed for the pipeline's lifetime.

mod calib;
mod config;
mod error;
mod pipeline;
mod reference;
mod sideband;
mod trigger;

pub use calib::Calibration;
pub use config::{SensorShape, TimeToolConfig};
pub use error::{PipelineError, PipelineResult};
pub use pipeline::{
    DetectorEvent, EventOutcome, Measurement, ReferenceSource, SkipReason, TimeToolPipeline,
};
pub use reference::{ReferenceEntry, ReferenceRecorder, ReferenceTable};
pub use sideband::SidebandCorrector;
pub use trigger::{BYKICK_EVENT_CODE, EventFlags, TriggerDecoder};
