use serde::{Deserialize, Serialize};

use crate::Error;

/// Half-open index range `[lo, hi)` over rows or columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub lo: usize,
    pub hi: usize,
}

impl Span {
    pub const fn new(lo: usize, hi: usize) -> Self {
        Self { lo, hi }
    }

    pub fn len(&self) -> usize {
        self.hi.saturating_sub(self.lo)
    }

    pub fn is_empty(&self) -> bool {
        self.hi <= self.lo
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.is_empty() {
            return Err(Error::InvalidRange {
                lo: self.lo,
                hi: self.hi,
            });
        }
        Ok(())
    }
}

/// Row spans for each camera region plus the column span they share.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorRoi {
    pub columns: Span,
    pub signal: Span,
    pub dark: Span,
    pub sideband: Span,
}

impl DetectorRoi {
    /// Length of every projection taken over this region.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn validate(&self) -> Result<(), Error> {
        self.columns.validate()?;
        self.signal.validate()?;
        self.dark.validate()?;
        self.sideband.validate()
    }

    /// Checks that the signal, dark and (when `with_sideband`) sideband
    /// regions lie inside a `width x height` frame.
    pub fn check_within(&self, width: usize, height: usize, with_sideband: bool) -> Result<(), Error> {
        let mut rows = vec![self.signal, self.dark];
        if with_sideband {
            rows.push(self.sideband);
        }

        for span in rows {
            if span.hi > height || self.columns.hi > width {
                return Err(Error::OutOfBounds {
                    rows: (span.lo, span.hi),
                    cols: (self.columns.lo, self.columns.hi),
                    width,
                    height,
                });
            }
        }
        Ok(())
    }
}

impl Default for DetectorRoi {
    fn default() -> Self {
        Self {
            columns: Span::new(100, 800),
            signal: Span::new(640, 680),
            dark: Span::new(540, 580),
            sideband: Span::new(500, 540),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DetectorRoi, Span};
    use crate::Error;

    #[test]
    fn span_rejects_inverted_bounds() {
        assert!(Span::new(3, 4).validate().is_ok());
        assert_eq!(
            Span::new(4, 4).validate(),
            Err(Error::InvalidRange { lo: 4, hi: 4 })
        );
        assert_eq!(Span::new(5, 2).len(), 0);
    }

    #[test]
    fn sideband_rows_only_checked_when_enabled() {
        let roi = DetectorRoi {
            columns: Span::new(0, 8),
            signal: Span::new(4, 6),
            dark: Span::new(0, 2),
            sideband: Span::new(8, 12),
        };

        assert!(roi.check_within(8, 8, false).is_ok());
        assert!(matches!(
            roi.check_within(8, 8, true),
            Err(Error::OutOfBounds { rows: (8, 12), .. })
        ));
        assert!(roi.check_within(7, 8, false).is_err());
    }
}
