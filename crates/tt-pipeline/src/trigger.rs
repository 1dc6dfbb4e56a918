/// Event code broadcast on background-only ("bykick") shots.
pub const BYKICK_EVENT_CODE: i32 = 162;

/// Per-event trigger decisions consumed by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventFlags {
    pub bykick: bool,
    pub laser: bool,
}

impl EventFlags {
    pub const MEASURE: Self = Self {
        bykick: false,
        laser: true,
    };

    pub const BACKGROUND: Self = Self {
        bykick: true,
        laser: true,
    };
}

/// Turns the event codes seen on a shot into [`EventFlags`].
///
/// A positive laser code marks shots with the laser present; the laser is
/// then assumed absent unless that code is seen. A negative laser code marks
/// shots without the laser; the laser is assumed present unless its negation
/// is seen. A laser code of zero disables gating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerDecoder {
    bykick_code: i32,
    laser_code: i32,
}

impl TriggerDecoder {
    pub fn new(bykick_code: i32, laser_code: i32) -> Self {
        Self {
            bykick_code,
            laser_code,
        }
    }

    pub fn laser_gated(&self) -> bool {
        self.laser_code != 0
    }

    pub fn decode(&self, codes: &[i32]) -> EventFlags {
        let mut flags = EventFlags {
            bykick: false,
            laser: self.laser_code <= 0,
        };

        for &code in codes {
            if code == self.bykick_code {
                flags.bykick = true;
            }
            if !self.laser_gated() {
                continue;
            }
            if code == self.laser_code {
                flags.laser = true;
            }
            if code == -self.laser_code {
                flags.laser = false;
            }
        }
        flags
    }
}

impl Default for TriggerDecoder {
    fn default() -> Self {
        Self::new(BYKICK_EVENT_CODE, 0)
    }
}
