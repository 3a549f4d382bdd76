//! Two-slot drive controller
//!
//! Each request runs strictly in sequence: controller turnaround, seek and
//! settle, sector lookup and read, then whatever rotational and read time is
//! still owed after the backing store answered.

/// Drive controller builder
pub mod builder;

pub use builder::DriveBuilder;

use crate::error::{AtxError, Result};
use crate::fdc::{FdcStatus, NOT_FOUND_STATUS};
use crate::format::{MAX_DRIVES, MAX_TRACKS};
use crate::image::{AtxImage, Fetch};
use crate::io::ByteSource;
use crate::timing::{delay_ms, Delay, DriveTiming, HeadSensor};
use log::{debug, trace};
use std::path::Path;
use std::time::Duration;

/// How a sector request ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// Sector found and read without error
    Ok,
    /// Sector found but its status carries an error; no data returned
    DriveError,
    /// No occurrence of the sector on the track
    SectorNotFound,
    /// The indexed track record is missing, empty or for another track
    GeometryMismatch,
    /// The request lies beyond the last supported track
    TrackOutOfRange,
}

/// Result of one sector request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectorRead {
    /// Bytes of usable payload, 0 for any failure
    pub bytes_read: usize,
    /// Sector size of the image, 0 if the request never reached the image
    pub sector_size: u16,
    /// Status as the drive reports it (inverted, 0xFF is no error)
    pub status: u8,
    /// Which outcome the status encodes
    pub outcome: ReadOutcome,
}

impl SectorRead {
    fn not_found(sector_size: u16, outcome: ReadOutcome) -> Self {
        Self {
            bytes_read: 0,
            sector_size,
            status: NOT_FOUND_STATUS,
            outcome,
        }
    }

    /// On-disk status bits behind the reported status
    pub fn fdc_status(&self) -> FdcStatus {
        FdcStatus::from_reported(self.status)
    }

    /// Check if usable data was returned
    pub fn is_ok(&self) -> bool {
        self.outcome == ReadOutcome::Ok
    }
}

/// Mechanical state of one drive, kept across requests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriveState {
    /// Track the head is over (1-based request numbering)
    pub head_track: u16,
    /// Angle of the last chosen sector occurrence
    pub last_angle: u16,
}

#[derive(Debug, Default)]
struct DriveSlot {
    image: Option<AtxImage>,
    state: DriveState,
}

/// Emulated drive controller with two drive slots sharing one spindle clock
pub struct AtxDrive {
    slots: [DriveSlot; MAX_DRIVES],
    timing: DriveTiming,
    head: Box<dyn HeadSensor + Send>,
    delay: Box<dyn Delay + Send>,
}

impl AtxDrive {
    /// Create a controller with stock timing, a real rotation clock and
    /// thread sleeps
    pub fn new() -> Self {
        DriveBuilder::new().build()
    }

    /// Create a new builder for configuring a controller
    pub fn builder() -> DriveBuilder {
        DriveBuilder::new()
    }

    pub(crate) fn with_parts(
        timing: DriveTiming,
        head: Box<dyn HeadSensor + Send>,
        delay: Box<dyn Delay + Send>,
    ) -> Self {
        Self {
            slots: Default::default(),
            timing,
            head,
            delay,
        }
    }

    /// Timing constants in use
    pub fn timing(&self) -> &DriveTiming {
        &self.timing
    }

    fn slot(&self, drive: usize) -> Result<&DriveSlot> {
        self.slots.get(drive).ok_or(AtxError::InvalidDrive {
            drive,
            max: MAX_DRIVES - 1,
        })
    }

    /// Load an image into a drive, returning its bytes per sector
    ///
    /// On failure the drive keeps whatever image it held before.
    pub fn load_image<S: ByteSource + Send + 'static>(&mut self, drive: usize, source: S) -> Result<u16> {
        self.slot(drive)?;
        let image = AtxImage::load(source)?;
        let bytes_per_sector = image.bytes_per_sector();
        debug!("drive {}: image loaded, {} bytes per sector", drive, bytes_per_sector);
        self.slots[drive].image = Some(image);
        Ok(bytes_per_sector)
    }

    /// Open an ATX file into a drive, returning its bytes per sector
    pub fn open_image<P: AsRef<Path>>(&mut self, drive: usize, path: P) -> Result<u16> {
        self.slot(drive)?;
        let image = AtxImage::open(path)?;
        let bytes_per_sector = image.bytes_per_sector();
        self.slots[drive].image = Some(image);
        Ok(bytes_per_sector)
    }

    /// Remove the image from a drive, returning it
    pub fn eject(&mut self, drive: usize) -> Result<Option<AtxImage>> {
        self.slot(drive)?;
        Ok(self.slots[drive].image.take())
    }

    /// Image loaded in a drive
    pub fn image(&self, drive: usize) -> Option<&AtxImage> {
        self.slots.get(drive).and_then(|s| s.image.as_ref())
    }

    /// Mutable access to the image loaded in a drive
    pub fn image_mut(&mut self, drive: usize) -> Option<&mut AtxImage> {
        self.slots.get_mut(drive).and_then(|s| s.image.as_mut())
    }

    /// Mechanical state of a drive
    pub fn state(&self, drive: usize) -> Result<DriveState> {
        Ok(self.slot(drive)?.state)
    }

    /// Angle of the last sector occurrence a drive resolved
    pub fn last_angle(&self, drive: usize) -> Result<u16> {
        Ok(self.slot(drive)?.state.last_angle)
    }

    /// Track the drive head is over
    pub fn head_track(&self, drive: usize) -> Result<u16> {
        Ok(self.slot(drive)?.state.head_track)
    }

    /// Read 1-based logical sector `sector` into `buf`, taking as long as the
    /// real drive would
    ///
    /// At most one sector's worth of `buf` is written. Lookup failures are
    /// reported in the returned [`SectorRead`]; only a bad drive number or an
    /// empty drive is an error.
    pub fn read_sector(&mut self, drive: usize, sector: u16, buf: &mut [u8]) -> Result<SectorRead> {
        self.slot(drive)?;
        let Self {
            slots,
            timing,
            head,
            delay,
        } = self;
        let slot = &mut slots[drive];
        let image = slot.image.as_mut().ok_or(AtxError::NoImage { drive })?;
        let state = &mut slot.state;

        let geometry = image.geometry();
        let (track, in_track) = geometry.locate(sector);
        if sector == 0 || track as usize > MAX_TRACKS {
            debug!("drive {}: sector {} is beyond track {}", drive, sector, MAX_TRACKS);
            return Ok(SectorRead::not_found(0, ReadOutcome::TrackOutOfRange));
        }

        delay_ms(delay.as_mut(), timing.request_delay_ms, "request");
        if state.head_track != track {
            delay_ms(delay.as_mut(), timing.seek_ms(state.head_track, track), "seek");
        }
        state.head_track = track;

        let before = head.sample();
        let fetch = image.fetch(track, in_track, before, buf);

        let sector_size = geometry.bytes_per_sector;
        let result = match fetch {
            Fetch::Mismatch => SectorRead::not_found(sector_size, ReadOutcome::GeometryMismatch),
            Fetch::NotFound => SectorRead::not_found(sector_size, ReadOutcome::SectorNotFound),
            Fetch::Found {
                sector: chosen,
                bytes_read,
                has_error,
                ..
            } => {
                state.last_angle = chosen.angle;
                SectorRead {
                    bytes_read,
                    sector_size,
                    status: chosen.status.reported(),
                    outcome: if has_error {
                        ReadOutcome::DriveError
                    } else {
                        ReadOutcome::Ok
                    },
                }
            }
        };

        let after = head.sample();
        let remaining = timing.remaining_ms(before, state.last_angle, after);
        trace!(
            "drive {}: head {} -> {}, target {}, waiting {} ms",
            drive,
            before,
            after,
            state.last_angle,
            remaining
        );
        if remaining > 0 {
            delay.delay(Duration::from_millis(remaining));
        }

        debug!(
            "drive {}: sector {} (track {} sector {}) {:?} status {:#04X}",
            drive, sector, track, in_track, result.outcome, result.status
        );
        Ok(result)
    }
}

impl Default for AtxDrive {
    fn default() -> Self {
        Self::new()
    }
}
