//! ATX format magic bytes and constants

/// ATX file signature
pub const ATX_SIGNATURE: &[u8; 4] = b"AT8X";

/// The only ATX version this library reads
pub const ATX_VERSION: u16 = 1;

/// Maximum number of tracks per drive
pub const MAX_TRACKS: usize = 40;

/// Number of drive slots
pub const MAX_DRIVES: usize = 2;

/// Size of the file header
pub const FILE_HEADER_SIZE: usize = 48;

/// Size of a track header
pub const TRACK_HEADER_SIZE: usize = 32;

/// Size of the fixed part of a sector list header
pub const SECTOR_LIST_HEADER_SIZE: usize = 8;

/// Size of one sector header
pub const SECTOR_HEADER_SIZE: usize = 8;

/// Size of one extended sector data record
pub const EXTENDED_DATA_SIZE: usize = 8;

/// Extended sector data record type for weak data
pub const EXTENDED_TYPE_WEAK: u8 = 0x10;

/// Largest sector size any density produces
pub const MAX_SECTOR_SIZE: usize = 256;

/// Sectors per track for density code 1
pub const MEDIUM_SECTORS_PER_TRACK: u8 = 26;

/// Sectors per track for every other density code
pub const STANDARD_SECTORS_PER_TRACK: u8 = 18;

/// Bytes per sector for density code 1
pub const MEDIUM_BYTES_PER_SECTOR: u16 = 256;

/// Bytes per sector for every other density code
pub const STANDARD_BYTES_PER_SECTOR: u16 = 128;
