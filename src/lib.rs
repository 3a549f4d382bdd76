/*!
# atxdrive

A Rust library that reads ATX disk images the way an Atari 810 floppy drive
would, including the time the mechanism takes.

## Features

- Load ATX images and index their track records
- Resolve duplicated sectors to the occurrence nearest the spinning head
- Randomize weak sector data on every read
- Emulate seek, settle, rotational and read delays, compensated for the time
  the backing store took
- Two independent drive slots

## Quick Start

```rust,no_run
use atxdrive::{AtxDrive, ReadOutcome};

let mut drive = AtxDrive::new();
let bytes_per_sector = drive.open_image(0, "game.atx")?;

let mut buf = [0u8; 256];
let read = drive.read_sector(0, 1, &mut buf)?;
if read.outcome == ReadOutcome::Ok {
    println!("{:?}", &buf[..read.bytes_read]);
}
println!("status {:#04X}, sector size {}", read.status, bytes_per_sector);
# Ok::<(), atxdrive::AtxError>(())
```

## Modules

- `format`: ATX records, constants and geometry
- `image`: Image loading, track index, sector locator and weak data
- `timing`: Drive timing model, head sensor and delay primitive
- `drive`: Two-slot drive controller
- `fdc`: FDC status bits
- `io`: Random-access byte source
- `error`: Error types and Result alias
*/

#![warn(missing_docs)]

/// Two-slot drive controller
pub mod drive;
/// Error types and Result alias
pub mod error;
/// FDC status bits
pub mod fdc;
/// ATX records, constants and geometry
pub mod format;
/// Image loading and sector lookup
pub mod image;
/// Random-access byte source
pub mod io;
/// Drive timing model
pub mod timing;

#[cfg(test)]
mod test_support;

// Re-export common types
pub use drive::{AtxDrive, DriveBuilder, DriveState, ReadOutcome, SectorRead};
pub use error::{AtxError, Result};
pub use fdc::{FdcStatus, NOT_FOUND_STATUS};
pub use format::{Density, Geometry};
pub use image::{AtxImage, ImageInfo, TrackIndex};
pub use io::ByteSource;
pub use timing::{Delay, DriveTiming, HeadSensor, RotationClock, ThreadDelay};
