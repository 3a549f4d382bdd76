//! Builder for configuring a drive controller

use crate::drive::AtxDrive;
use crate::timing::{Delay, DriveTiming, HeadSensor, RotationClock, ThreadDelay};

/// Builder for constructing an [`AtxDrive`]
pub struct DriveBuilder {
    timing: DriveTiming,
    head: Option<Box<dyn HeadSensor + Send>>,
    delay: Box<dyn Delay + Send>,
}

impl DriveBuilder {
    /// Create a new builder with stock drive timing
    pub fn new() -> Self {
        Self {
            timing: DriveTiming::default(),
            head: None,
            delay: Box::new(ThreadDelay),
        }
    }

    /// Set the timing constants
    pub fn timing(mut self, timing: DriveTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Set the head position sensor
    ///
    /// Defaults to a [`RotationClock`] spinning at the configured rate.
    pub fn head_sensor<H: HeadSensor + Send + 'static>(mut self, head: H) -> Self {
        self.head = Some(Box::new(head));
        self
    }

    /// Set the wall-clock delay primitive
    pub fn delay<D: Delay + Send + 'static>(mut self, delay: D) -> Self {
        self.delay = Box::new(delay);
        self
    }

    /// Build the drive controller with both slots empty
    pub fn build(self) -> AtxDrive {
        let head = self
            .head
            .unwrap_or_else(|| Box::new(RotationClock::new(&self.timing)));
        AtxDrive::with_parts(self.timing, head, self.delay)
    }
}

impl Default for DriveBuilder {
    fn default() -> Self {
        Self::new()
    }
}
