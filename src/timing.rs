//! Mechanical timing of an Atari 810 style drive
//!
//! A request costs a controller turnaround, an optional seek plus head settle,
//! the rotational wait until the chosen sector passes under the head, and the
//! time to read the sector and check its CRC. Time spent fetching bytes from
//! the backing image is measured on the head sensor and subtracted, so the
//! total matches the real drive however fast the host storage is.

use log::trace;
use std::time::{Duration, Instant};

/// Timing constants of the emulated drive
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveTiming {
    /// Angular units in one full disk rotation
    pub full_rotation: u16,
    /// Milliseconds per angular unit
    pub ms_per_angular_unit: f64,
    /// Controller turnaround for every request
    pub request_delay_ms: f64,
    /// Time to step the head one track
    pub track_step_ms: f64,
    /// Time for the head to settle after stepping
    pub head_settle_ms: f64,
    /// Time to read a sector and check its CRC
    pub sector_read_ms: f64,
}

impl DriveTiming {
    /// Timing of a stock drive at 288 RPM
    pub fn atari_810() -> Self {
        Self {
            full_rotation: 26042,
            ms_per_angular_unit: 0.007999897601,
            request_delay_ms: 2.4,
            track_step_ms: 5.3,
            head_settle_ms: 10.0,
            sector_read_ms: 11.0,
        }
    }

    /// Same rotation as a stock drive but no deliberate delays
    pub fn instant() -> Self {
        Self {
            request_delay_ms: 0.0,
            track_step_ms: 0.0,
            head_settle_ms: 0.0,
            sector_read_ms: 0.0,
            ms_per_angular_unit: 0.0,
            ..Self::atari_810()
        }
    }

    /// Duration of one full rotation in milliseconds
    pub fn rotation_ms(&self) -> f64 {
        self.full_rotation as f64 * self.ms_per_angular_unit
    }

    /// Convert a count of angular units to milliseconds
    pub fn angle_ms(&self, units: i64) -> f64 {
        units as f64 * self.ms_per_angular_unit
    }

    /// Seek cost for moving the head from `from` to `to`, or zero if already there
    pub fn seek_ms(&self, from: u16, to: u16) -> f64 {
        if from == to {
            return 0.0;
        }
        let steps = (to as i32 - from as i32).unsigned_abs() as f64;
        steps * self.track_step_ms + self.head_settle_ms
    }

    /// Wait until `target` passes under the head sampled at `head`
    ///
    /// A target at or behind the head costs the rest of the rotation.
    pub fn rotational_delay_ms(&self, head: u16, target: u16) -> f64 {
        let units = if target > head {
            target as i64 - head as i64
        } else {
            self.full_rotation as i64 - head as i64 + target as i64
        };
        self.angle_ms(units)
    }

    /// Angular units the head moved forward between two samples
    pub fn elapsed_units(&self, before: u16, after: u16) -> i64 {
        let full = self.full_rotation as i64;
        (after as i64 - before as i64).rem_euclid(full)
    }

    /// Remaining whole milliseconds to wait once the image read finished
    ///
    /// Never negative; any fraction rounds up to a full millisecond.
    pub fn remaining_ms(&self, head: u16, target: u16, after: u16) -> u64 {
        let elapsed = self.angle_ms(self.elapsed_units(head, after));
        let remaining = self.rotational_delay_ms(head, target) + self.sector_read_ms - elapsed;
        if remaining > 0.0 {
            remaining.ceil() as u64
        } else {
            0
        }
    }
}

impl Default for DriveTiming {
    fn default() -> Self {
        Self::atari_810()
    }
}

/// Source of the head's current angular position
pub trait HeadSensor {
    /// Current angle in `[0, full_rotation)`, sampled fresh on every call
    fn sample(&mut self) -> u16;
}

/// Free-running rotation counter derived from a monotonic clock
#[derive(Debug, Clone)]
pub struct RotationClock {
    start: Instant,
    full_rotation: u16,
    ms_per_angular_unit: f64,
}

impl RotationClock {
    /// Start a clock spinning at the rate given by `timing`
    pub fn new(timing: &DriveTiming) -> Self {
        Self {
            start: Instant::now(),
            full_rotation: timing.full_rotation,
            ms_per_angular_unit: timing.ms_per_angular_unit,
        }
    }
}

impl Default for RotationClock {
    fn default() -> Self {
        Self::new(&DriveTiming::default())
    }
}

impl HeadSensor for RotationClock {
    fn sample(&mut self) -> u16 {
        if self.ms_per_angular_unit <= 0.0 || self.full_rotation == 0 {
            return 0;
        }
        let elapsed_ms = self.start.elapsed().as_secs_f64() * 1000.0;
        let units = (elapsed_ms / self.ms_per_angular_unit) as u64;
        (units % self.full_rotation as u64) as u16
    }
}

/// Blocking wall-clock delay
pub trait Delay {
    /// Block for `duration`
    fn delay(&mut self, duration: Duration);
}

/// Delay by sleeping the current thread
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadDelay;

impl Delay for ThreadDelay {
    fn delay(&mut self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

/// Apply a delay given in fractional milliseconds
pub(crate) fn delay_ms(delay: &mut dyn Delay, ms: f64, what: &str) {
    if ms <= 0.0 {
        return;
    }
    trace!("{} delay {:.3} ms", what, ms);
    delay.delay(Duration::from_secs_f64(ms / 1000.0));
}
