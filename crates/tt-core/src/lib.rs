//! Foundational primitives for the timetool pipeline.
//!
//! ## Image Views and Stride
//! Frames use element stride (not byte stride). `stride` is the distance, in
//! elements, between adjacent row starts and may be greater than `width`.
//! This allows borrowed views over padded camera buffers.
//!
//! ## Regions
//! A [`DetectorRoi`] holds half-open row spans for the signal, dark and
//! sideband regions plus one column span shared by all of them, so every
//! projection taken for an event has the same length.
//!
//! ## Projections
//! [`project_columns`] sums a row span down each column of the column span.
//! Any pixel type convertible to `f64` may be projected.

mod error;
mod image;
mod projection;
mod roi;
mod time;

pub use error::Error;
pub use image::{Image, ImageView};
pub use projection::{project_columns, project_columns_into};
pub use roi::{DetectorRoi, Span};
pub use time::ClockTime;
