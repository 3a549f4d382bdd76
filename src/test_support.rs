//! In-memory ATX images and drive doubles for unit tests

use crate::fdc::FdcStatus;
use crate::format::*;
use crate::timing::{Delay, HeadSensor};
use binrw::BinWrite;
use std::collections::VecDeque;
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One sector occurrence in a test track
#[derive(Debug, Clone)]
pub struct TestSector {
    pub number: u8,
    pub status: u8,
    pub timev: u16,
    /// Empty means the header carries no payload offset
    pub data: Vec<u8>,
    pub weak: Option<u16>,
}

impl TestSector {
    pub fn new(number: u8, timev: u16, fill: u8, size: usize) -> Self {
        Self {
            number,
            status: 0,
            timev,
            data: vec![fill; size],
            weak: None,
        }
    }

    pub fn status(mut self, status: u8) -> Self {
        self.status = status;
        self
    }

    pub fn weak(mut self, offset: u16) -> Self {
        self.status |= FdcStatus::EXTENDED;
        self.weak = Some(offset);
        self
    }
}

/// A track record; `number` is the 0-based track it declares
#[derive(Debug, Clone)]
pub struct TestTrack {
    pub number: u8,
    pub sectors: Vec<TestSector>,
}

fn write<T: for<'a> BinWrite<Args<'a> = ()> + binrw::meta::WriteEndian>(out: &mut Vec<u8>, record: &T) {
    let mut cursor = Cursor::new(Vec::new());
    record.write(&mut cursor).unwrap();
    out.extend(cursor.into_inner());
}

pub fn file_header(density: u8) -> FileHeader {
    FileHeader {
        signature: *ATX_SIGNATURE,
        version: ATX_VERSION,
        min_version: ATX_VERSION,
        density,
        start_data: FILE_HEADER_SIZE as u32,
        ..Default::default()
    }
}

pub fn track_record(track: &TestTrack, bytes_per_sector: usize) -> Vec<u8> {
    let count = track.sectors.len();
    let payload_start = TRACK_HEADER_SIZE + SECTOR_LIST_HEADER_SIZE + count * SECTOR_HEADER_SIZE;

    let mut headers = Vec::new();
    let mut payloads = Vec::new();
    let mut extended = Vec::new();
    let mut next_data = payload_start;

    for (i, sector) in track.sectors.iter().enumerate() {
        let record = sector.weak.map(|weak| ExtendedSectorData {
            size: EXTENDED_DATA_SIZE as u32,
            record_type: EXTENDED_TYPE_WEAK,
            sector_index: i as u8,
            data: weak,
        });
        let data = if sector.data.is_empty() {
            if let Some(record) = &record {
                write(&mut extended, record);
            }
            0
        } else {
            let offset = next_data;
            let mut bytes = sector.data.clone();
            bytes.resize(bytes_per_sector, 0);
            payloads.extend(bytes);
            next_data += bytes_per_sector;
            // A weak sector's extended record directly follows its payload
            if let Some(record) = &record {
                write(&mut payloads, record);
                next_data += EXTENDED_DATA_SIZE;
            }
            offset as u32
        };
        write(
            &mut headers,
            &SectorHeader {
                number: sector.number,
                status: sector.status,
                timev: sector.timev,
                data,
            },
        );
    }

    let size = payload_start + payloads.len() + extended.len();
    let mut out = Vec::with_capacity(size);
    write(
        &mut out,
        &TrackHeader {
            size: size as u32,
            track_number: track.number,
            sector_count: count as u16,
            header_size: TRACK_HEADER_SIZE as u32,
            ..Default::default()
        },
    );
    write(
        &mut out,
        &SectorListHeader {
            next: (SECTOR_LIST_HEADER_SIZE + count * SECTOR_HEADER_SIZE) as u32,
            record_type: 1,
            reserved: 0,
        },
    );
    out.extend(headers);
    out.extend(payloads);
    out.extend(extended);
    out
}

/// Build a complete image with the given density code
pub fn build_image(density: u8, tracks: &[TestTrack]) -> Vec<u8> {
    let bytes_per_sector = Geometry::from_density_code(density).bytes_per_sector as usize;
    let mut out = Vec::new();
    write(&mut out, &file_header(density));
    for track in tracks {
        out.extend(track_record(track, bytes_per_sector));
    }
    out
}

/// Head sensor returning a scripted sequence, then repeating the last value
#[derive(Debug, Clone)]
pub struct ScriptedHead {
    samples: VecDeque<u16>,
    last: u16,
}

impl ScriptedHead {
    pub fn new(samples: &[u16]) -> Self {
        Self {
            samples: samples.iter().copied().collect(),
            last: samples.first().copied().unwrap_or(0),
        }
    }
}

impl HeadSensor for ScriptedHead {
    fn sample(&mut self) -> u16 {
        if let Some(next) = self.samples.pop_front() {
            self.last = next;
        }
        self.last
    }
}

/// Delay that records what it was asked to wait instead of sleeping
#[derive(Debug, Clone, Default)]
pub struct RecordingDelay {
    pub calls: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingDelay {
    pub fn total(&self) -> Duration {
        self.calls.lock().unwrap().iter().sum()
    }

    pub fn count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Delay for RecordingDelay {
    fn delay(&mut self, duration: Duration) {
        self.calls.lock().unwrap().push(duration);
    }
}
