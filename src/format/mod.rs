//! ATX format records, constants and derived geometry

/// Format constants
pub mod constants;
/// On-disk record layouts
pub mod records;

pub use constants::*;
pub use records::{
    ExtendedSectorData, FileHeader, Record, SectorHeader, SectorListHeader, TrackHeader,
};

/// Density code from the file header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Density {
    /// Single density (code 0)
    Single,
    /// Medium (enhanced) density (code 1)
    Medium,
    /// Double density (code 2)
    Double,
    /// Any other code
    Unknown(u8),
}

impl From<u8> for Density {
    fn from(value: u8) -> Self {
        match value {
            0 => Density::Single,
            1 => Density::Medium,
            2 => Density::Double,
            other => Density::Unknown(other),
        }
    }
}

impl From<Density> for u8 {
    fn from(density: Density) -> Self {
        match density {
            Density::Single => 0,
            Density::Medium => 1,
            Density::Double => 2,
            Density::Unknown(code) => code,
        }
    }
}

/// Sector layout shared by every track of one image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    /// Sectors in each track
    pub sectors_per_track: u8,
    /// Bytes in each sector
    pub bytes_per_sector: u16,
}

impl Geometry {
    /// Geometry for a raw density code: 1 is (26, 256), anything else (18, 128)
    pub fn from_density_code(code: u8) -> Self {
        if code == 1 {
            Self {
                sectors_per_track: MEDIUM_SECTORS_PER_TRACK,
                bytes_per_sector: MEDIUM_BYTES_PER_SECTOR,
            }
        } else {
            Self {
                sectors_per_track: STANDARD_SECTORS_PER_TRACK,
                bytes_per_sector: STANDARD_BYTES_PER_SECTOR,
            }
        }
    }

    /// Split a 1-based logical sector number into a 1-based track and a
    /// 1-based sector within that track
    pub fn locate(&self, sector: u16) -> (u16, u8) {
        let spt = self.sectors_per_track as u16;
        let index = sector.saturating_sub(1);
        (index / spt + 1, (index % spt + 1) as u8)
    }
}

/// Check the first bytes of a file for the ATX signature
pub fn detect_format(magic: &[u8]) -> bool {
    magic.starts_with(ATX_SIGNATURE)
}
