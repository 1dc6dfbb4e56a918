//! Time-indexed reference spectra.
//!
//! File format: entries of two lines each, repeated until end of input or
//! the first blank line.
//!
//! ```text
//! <seconds hex> <sub-second ticks hex>
//! <f64> <f64> <f64> ...
//! ```
//!
//! Spectra are column-aligned with the camera: the pipeline takes columns
//! `lo..hi` of whichever spectrum a lookup selects.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use log::info;
use tt_core::ClockTime;

use crate::error::{PipelineError, PipelineResult};

#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceEntry {
    pub timestamp: ClockTime,
    pub spectrum: Vec<f64>,
}

/// Immutable, timestamp-ordered table of reference spectra.
///
/// Entry 0 acts as a left sentinel: a lookup returns the first entry from
/// index 1 on whose timestamp is strictly after the query, or the last entry
/// when there is none. Entry 0 is only returned by a one-entry table.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceTable {
    entries: Vec<ReferenceEntry>,
}

impl ReferenceTable {
    pub fn new(entries: Vec<ReferenceEntry>) -> PipelineResult<Self> {
        if entries.is_empty() {
            return Err(PipelineError::MalformedReferenceTable {
                line: 0,
                reason: "table has no entries".into(),
            });
        }
        if let Some(i) = entries
            .windows(2)
            .position(|w| w[1].timestamp < w[0].timestamp)
        {
            return Err(PipelineError::MalformedReferenceTable {
                line: 2 * (i + 1) + 1,
                reason: format!(
                    "timestamp {} precedes {}",
                    entries[i + 1].timestamp,
                    entries[i].timestamp
                ),
            });
        }
        Ok(Self { entries })
    }

    pub fn load(path: &Path) -> PipelineResult<Self> {
        let file = File::open(path).map_err(|source| PipelineError::FileIo {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_reader(BufReader::new(file))?;
        info!(
            "loaded {} reference spectra from {}",
            table.len(),
            path.display()
        );
        Ok(table)
    }

    pub fn from_reader<R: BufRead>(reader: R) -> PipelineResult<Self> {
        let mut entries = Vec::new();
        let mut lines = reader.lines().enumerate();

        while let Some((idx, line)) = lines.next() {
            let line = line?;
            let mut tokens = line.split_whitespace();
            let Some(sec) = tokens.next() else {
                break;
            };
            let ticks = tokens.next().ok_or_else(|| malformed(idx, "timestamp needs two fields"))?;
            let timestamp = ClockTime::new(parse_hex(sec, idx)?, parse_hex(ticks, idx)?);

            let (idx, line) = lines
                .next()
                .ok_or_else(|| malformed(idx + 1, "missing spectrum line"))?;
            let spectrum = line?
                .split_whitespace()
                .map(|tok| {
                    tok.parse::<f64>()
                        .map_err(|e| malformed(idx, &format!("bad value {tok:?}: {e}")))
                })
                .collect::<PipelineResult<Vec<f64>>>()?;

            entries.push(ReferenceEntry {
                timestamp,
                spectrum,
            });
        }

        Self::new(entries)
    }

    pub fn entries(&self) -> &[ReferenceEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Length of the shortest stored spectrum.
    pub fn min_spectrum_len(&self) -> usize {
        self.entries
            .iter()
            .map(|e| e.spectrum.len())
            .min()
            .unwrap_or(0)
    }

    /// Index of the entry selected for `ts`.
    pub fn lookup_index(&self, ts: ClockTime) -> usize {
        let after = self.entries[1..].partition_point(|e| e.timestamp <= ts);
        (1 + after).min(self.entries.len() - 1)
    }

    pub fn lookup(&self, ts: ClockTime) -> &[f64] {
        &self.entries[self.lookup_index(ts)].spectrum
    }

    pub fn write_to<W: Write>(&self, mut out: W) -> std::io::Result<()> {
        for entry in &self.entries {
            writeln!(
                out,
                "{:x} {:x}",
                entry.timestamp.seconds, entry.timestamp.nanoseconds
            )?;
            let mut first = true;
            for v in &entry.spectrum {
                if !first {
                    out.write_all(b" ")?;
                }
                write!(out, "{v}")?;
                first = false;
            }
            writeln!(out)?;
        }
        out.flush()
    }

    pub fn save(&self, path: &Path) -> PipelineResult<()> {
        let to_err = |source| PipelineError::FileIo {
            path: path.to_path_buf(),
            source,
        };
        let file = File::create(path).map_err(to_err)?;
        self.write_to(BufWriter::new(file)).map_err(to_err)?;
        info!(
            "wrote {} reference spectra to {}",
            self.len(),
            path.display()
        );
        Ok(())
    }
}

/// Collects accumulated references so they can be replayed as a table.
///
/// References cover the pipeline's column range only; they are stored with
/// `lo_column` leading zeros so the written table is camera-aligned.
#[derive(Debug, Clone, Default)]
pub struct ReferenceRecorder {
    lo_column: usize,
    entries: Vec<ReferenceEntry>,
}

impl ReferenceRecorder {
    pub fn new(lo_column: usize) -> Self {
        Self {
            lo_column,
            entries: Vec::new(),
        }
    }

    pub fn record(&mut self, timestamp: ClockTime, reference: &[f64]) {
        let mut spectrum = vec![0.0; self.lo_column];
        spectrum.extend_from_slice(reference);
        self.entries.push(ReferenceEntry {
            timestamp,
            spectrum,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_table(mut self) -> PipelineResult<ReferenceTable> {
        self.entries.sort_by_key(|e| e.timestamp);
        ReferenceTable::new(self.entries)
    }
}

fn parse_hex(tok: &str, idx: usize) -> PipelineResult<u32> {
    let digits = tok
        .strip_prefix("0x")
        .or_else(|| tok.strip_prefix("0X"))
        .unwrap_or(tok);
    u32::from_str_radix(digits, 16)
        .map_err(|e| malformed(idx, &format!("bad hex field {tok:?}: {e}")))
}

fn malformed(idx: usize, reason: &str) -> PipelineError {
    PipelineError::MalformedReferenceTable {
        line: idx + 1,
        reason: reason.to_string(),
    }
}
