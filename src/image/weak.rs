//! Weak sector data
//!
//! Some protected sectors contain flux transitions a drive cannot read
//! consistently. ATX records the first unstable byte in an extended data
//! record; everything from there to the end of the sector reads differently
//! each time.

use crate::format::{ExtendedSectorData, EXTENDED_DATA_SIZE};
use crate::io::{read_record, ByteSource};
use log::trace;

/// Scan `records` extended data records starting at `start` for a weak data
/// record belonging to the sector at list position `sector_index`
///
/// If several match, the last one wins.
pub fn find_weak_offset(
    source: &mut dyn ByteSource,
    start: u64,
    records: u16,
    sector_index: u16,
) -> Option<u16> {
    let mut weak_offset = None;
    let mut offset = start;

    for _ in 0..records {
        if let Some(record) = read_record::<ExtendedSectorData>(source, offset) {
            if record.sector_index as u16 == sector_index {
                if let Some(weak) = record.weak_offset() {
                    trace!("sector #{} weak from byte {}", sector_index, weak);
                    weak_offset = Some(weak);
                }
            }
        }
        offset += EXTENDED_DATA_SIZE as u64;
    }

    weak_offset
}

/// Overwrite every byte from `from` onward with a random value
pub fn randomize_from(data: &mut [u8], from: usize) {
    if let Some(weak) = data.get_mut(from..) {
        for byte in weak {
            *byte = rand::random::<u8>();
        }
    }
}
