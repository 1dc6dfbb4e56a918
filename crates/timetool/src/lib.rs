//! Umbrella crate for the `timetool` workspace.
//!
//! Re-exports the frame and region types, the 1-D signal primitives and the
//! per-event pipeline.

pub use tt_core::*;
pub use tt_pipeline::*;
pub use tt_signal::*;
