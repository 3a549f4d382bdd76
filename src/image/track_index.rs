//! Track offset table built once per loaded image

use crate::format::{TrackHeader, MAX_TRACKS};
use crate::io::{read_record, ByteSource};
use log::{trace, warn};

/// Absolute file offset of each physical track header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackIndex {
    offsets: [Option<u64>; MAX_TRACKS],
}

impl TrackIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self {
            offsets: [None; MAX_TRACKS],
        }
    }

    /// Walk the track records from `start` until a header can no longer be read
    ///
    /// Each record is stored under the track number it declares. Track numbers
    /// beyond the table are skipped, and a record claiming zero size ends the
    /// walk since it cannot be stepped over.
    pub fn build(source: &mut dyn ByteSource, start: u64) -> Self {
        let mut index = Self::new();
        let mut offset = start;

        while let Some(header) = read_record::<TrackHeader>(source, offset) {
            let track = header.track_number as usize;
            if index.insert(track, offset) {
                trace!("track {} at {:#x} ({} bytes)", track, offset, header.size);
            } else {
                warn!("ignoring track {} at {:#x}: beyond {} tracks", track, offset, MAX_TRACKS);
            }

            if header.size == 0 {
                warn!("track record at {:#x} has zero size, stopping", offset);
                break;
            }
            offset += header.size as u64;
        }

        index
    }

    /// Record the offset of a track, returning false if it is out of range
    pub fn insert(&mut self, track: usize, offset: u64) -> bool {
        match self.offsets.get_mut(track) {
            Some(slot) => {
                *slot = Some(offset);
                true
            }
            None => false,
        }
    }

    /// Offset of a 0-based physical track
    pub fn get(&self, track: usize) -> Option<u64> {
        self.offsets.get(track).copied().flatten()
    }

    /// Number of tracks present in the image
    pub fn track_count(&self) -> usize {
        self.offsets.iter().filter(|o| o.is_some()).count()
    }

    /// Iterate over (track, offset) for every indexed track
    pub fn iter(&self) -> impl Iterator<Item = (usize, u64)> + '_ {
        self.offsets
            .iter()
            .enumerate()
            .filter_map(|(track, offset)| offset.map(|o| (track, o)))
    }
}

impl Default for TrackIndex {
    fn default() -> Self {
        Self::new()
    }
}
