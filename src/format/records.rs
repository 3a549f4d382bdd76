//! On-disk ATX records
//!
//! All records are little-endian and fixed size. They are decoded straight
//! out of a short read and never kept as views into a shared buffer.

use crate::format::constants::*;
use crate::format::{detect_format, Density};
use binrw::{binrw, meta::ReadEndian, BinRead};
use std::io::Cursor;

/// A fixed-size ATX record that can be decoded from a byte slice
pub trait Record: for<'a> BinRead<Args<'a> = ()> + ReadEndian {
    /// Encoded size in bytes
    const SIZE: usize;

    /// Decode the record from the start of `bytes`
    fn decode(bytes: &[u8]) -> binrw::BinResult<Self> {
        Self::read(&mut Cursor::new(bytes))
    }
}

/// File header at offset 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[binrw]
#[brw(little)]
pub struct FileHeader {
    pub signature: [u8; 4],
    pub version: u16,
    pub min_version: u16,
    pub creator: u16,
    pub creator_version: u16,
    pub flags: u32,
    pub image_type: u16,
    pub density: u8,
    pub reserved0: u8,
    pub image_id: u32,
    pub image_version: u16,
    pub reserved1: u16,
    pub start_data: u32,
    pub end_data: u32,
    pub reserved2: [u8; 12],
}

impl FileHeader {
    /// True if the signature is `AT8X`
    pub fn has_valid_signature(&self) -> bool {
        detect_format(&self.signature)
    }

    /// True if both version fields equal the supported version
    pub fn is_supported_version(&self) -> bool {
        self.version == ATX_VERSION && self.min_version == ATX_VERSION
    }

    /// Density declared by the image
    pub fn density(&self) -> Density {
        Density::from(self.density)
    }
}

impl Record for FileHeader {
    const SIZE: usize = FILE_HEADER_SIZE;
}

/// Header of one track record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[binrw]
#[brw(little)]
pub struct TrackHeader {
    /// Total bytes of this track record, header included
    pub size: u32,
    pub record_type: u16,
    pub reserved0: u16,
    /// Physical track number, 0-based
    pub track_number: u8,
    pub reserved1: u8,
    pub sector_count: u16,
    pub rate: u16,
    pub reserved2: u16,
    pub flags: u32,
    /// Offset of the sector list header from the start of this record
    pub header_size: u32,
    pub reserved3: [u8; 8],
}

impl Record for TrackHeader {
    const SIZE: usize = TRACK_HEADER_SIZE;
}

/// Sector list header
///
/// Its length is not fixed; `next` is measured so that the sector header
/// array starts at `next - sector_count * SECTOR_HEADER_SIZE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[binrw]
#[brw(little)]
pub struct SectorListHeader {
    pub next: u32,
    pub record_type: u16,
    pub reserved: u16,
}

impl SectorListHeader {
    /// Offset from this header to the first sector header
    pub fn sector_array_offset(&self, sector_count: u16) -> i64 {
        self.next as i64 - sector_count as i64 * SECTOR_HEADER_SIZE as i64
    }
}

impl Record for SectorListHeader {
    const SIZE: usize = SECTOR_LIST_HEADER_SIZE;
}

/// One occurrence of a sector in a track's sector list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[binrw]
#[brw(little)]
pub struct SectorHeader {
    /// Sector number, 1-based
    pub number: u8,
    /// FDC status bits
    pub status: u8,
    /// Angular position at which this occurrence becomes readable
    pub timev: u16,
    /// Offset of the payload from the start of the track record
    pub data: u32,
}

impl Record for SectorHeader {
    const SIZE: usize = SECTOR_HEADER_SIZE;
}

/// Extended sector data record following the sector payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[binrw]
#[brw(little)]
pub struct ExtendedSectorData {
    pub size: u32,
    pub record_type: u8,
    /// Position of the owning sector header in the sector list
    pub sector_index: u8,
    /// For weak data: first byte within the sector that is undefined
    pub data: u16,
}

impl ExtendedSectorData {
    /// Weak data start offset, if this is a weak data record
    pub fn weak_offset(&self) -> Option<u16> {
        (self.record_type == EXTENDED_TYPE_WEAK).then_some(self.data)
    }
}

impl Record for ExtendedSectorData {
    const SIZE: usize = EXTENDED_DATA_SIZE;
}
