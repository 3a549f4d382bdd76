//! Sector occurrence selection within a track
//!
//! Copy protected disks may list the same sector number several times on one
//! track at different angular positions. A real drive returns whichever
//! occurrence passes under the head first, so the locator picks the one
//! nearest ahead of the sampled head angle.

use crate::fdc::FdcStatus;
use crate::format::{SectorHeader, SectorListHeader, TrackHeader, SECTOR_HEADER_SIZE};
use crate::io::{read_record, ByteSource};
use log::{trace, warn};

/// The occurrence chosen for a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChosenSector {
    /// Position of the sector header within the track's list
    pub index: u16,
    /// Angular position of the occurrence
    pub angle: u16,
    /// On-disk status of the occurrence
    pub status: FdcStatus,
    /// Payload offset relative to the track record
    pub data_offset: u32,
}

/// Result of scanning one track's sector list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SectorScan {
    /// Winning occurrence, if any header carried the requested number
    pub chosen: Option<ChosenSector>,
    /// The winning occurrence carries a nonzero status
    pub has_error: bool,
    /// Occurrences taken as best that were flagged with extended data
    pub extended_records: u16,
    /// Largest payload offset among the occurrences taken as best
    pub max_data_offset: u32,
}

/// Decide whether an occurrence `tt` units from the head beats the current best
///
/// `tt` is `timev - head`, negative when the mark is behind the head. A mark
/// ahead beats one behind; among marks ahead the nearer wins; among marks
/// behind the smaller (most negative) wins, being the first reached after
/// the index wraps.
pub fn is_nearer(best: Option<i32>, tt: i32) -> bool {
    match best {
        None => true,
        Some(p) => {
            (tt > 0 && p < 0) || (tt > 0 && p > 0 && tt < p) || (tt < 0 && p < 0 && tt < p)
        }
    }
}

/// Locate the sector header array of the track record at `track_offset`
///
/// `track` is the 0-based physical track the record must declare. Returns the
/// offset of the first sector header and the number of headers, or `None` if
/// the record is empty, unreadable or describes a different track.
fn sector_array(source: &mut dyn ByteSource, track_offset: u64, track: u16) -> Option<(u64, u16)> {
    let header: TrackHeader = read_record(source, track_offset)?;
    let sector_count = header.sector_count;
    if sector_count == 0 || header.track_number as u16 != track {
        warn!(
            "track record at {:#x} declares track {} with {} sectors, wanted track {}",
            track_offset, header.track_number, sector_count, track
        );
        return None;
    }

    let list_offset = track_offset + header.header_size as u64;
    let list: SectorListHeader = read_record(source, list_offset)?;
    match u64::try_from(list_offset as i64 + list.sector_array_offset(sector_count)) {
        Ok(offset) => Some((offset, sector_count)),
        Err(_) => {
            warn!("sector list at {:#x} points before the file start", list_offset);
            None
        }
    }
}

/// Read every sector header of a track in list order
pub fn read_sector_list(
    source: &mut dyn ByteSource,
    track_offset: u64,
    track: u16,
) -> Option<Vec<SectorHeader>> {
    let (mut offset, sector_count) = sector_array(source, track_offset, track)?;
    let mut headers = Vec::with_capacity(sector_count as usize);
    for _ in 0..sector_count {
        let Some(sh) = read_record::<SectorHeader>(source, offset) else {
            break;
        };
        headers.push(sh);
        offset += SECTOR_HEADER_SIZE as u64;
    }
    Some(headers)
}

/// Scan the track record at `track_offset` for sector `sector`, choosing the
/// occurrence nearest ahead of `head`
///
/// Returns `None` under the same conditions as a track/index mismatch.
pub fn scan_track(
    source: &mut dyn ByteSource,
    track_offset: u64,
    track: u16,
    sector: u8,
    head: u16,
) -> Option<SectorScan> {
    let (mut offset, sector_count) = sector_array(source, track_offset, track)?;

    let mut scan = SectorScan::default();
    let mut best_tt = None;

    for i in 0..sector_count {
        let Some(sh) = read_record::<SectorHeader>(source, offset) else {
            break;
        };
        offset += SECTOR_HEADER_SIZE as u64;

        if sh.number != sector {
            continue;
        }

        let status = FdcStatus::new(sh.status);
        let tt = sh.timev as i32 - head as i32;
        trace!("sector {} #{} at angle {} (tt {}) status {}", sector, i, sh.timev, tt, status);
        if is_nearer(best_tt, tt) {
            best_tt = Some(tt);
            scan.has_error = status.has_error();
            // Extended records sit after the furthest payload of the
            // occurrences taken so far
            scan.max_data_offset = scan.max_data_offset.max(sh.data);
            if status.has_extended_data() {
                scan.extended_records += 1;
            }
            scan.chosen = Some(ChosenSector {
                index: i,
                angle: sh.timev,
                status,
                data_offset: sh.data,
            });
        }
    }

    Some(scan)
}
