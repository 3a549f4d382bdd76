//! Floppy Disk Controller (FDC) status bits as recorded in ATX sector headers
//!
//! Based on the WD1771 FDC used in the Atari 810. The drive reports these bits
//! inverted, so a reported status of 0xFF means no error.

use std::fmt;

/// Reported status when no sector occurrence was found
pub const NOT_FOUND_STATUS: u8 = 0xF7;

/// On-disk FDC status of one sector occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FdcStatus(pub u8);

impl FdcStatus {
    /// Not Ready - Bit 7
    pub const NOT_READY: u8 = 0x80;

    /// Extended sector data present - Bit 6 (ATX specific)
    /// Set when an extended data record (e.g. weak data) follows the track data
    pub const EXTENDED: u8 = 0x40;

    /// Record Type - Bit 5
    /// Set if a sector with deleted data address mark was read
    pub const DELETED: u8 = 0x20;

    /// Record Not Found - Bit 4
    pub const RECORD_NOT_FOUND: u8 = 0x10;

    /// CRC Error - Bit 3
    pub const CRC_ERROR: u8 = 0x08;

    /// Lost Data - Bit 2
    pub const LOST_DATA: u8 = 0x04;

    /// Create a new FdcStatus from a raw byte
    #[inline]
    pub fn new(value: u8) -> Self {
        FdcStatus(value)
    }

    /// Decode the status from the inverted byte a drive reports
    #[inline]
    pub fn from_reported(reported: u8) -> Self {
        FdcStatus(!reported)
    }

    /// The inverted byte a drive reports for this status
    #[inline]
    pub fn reported(&self) -> u8 {
        !self.0
    }

    /// Check if not ready bit is set
    #[inline]
    pub fn not_ready(&self) -> bool {
        (self.0 & Self::NOT_READY) != 0
    }

    /// Check if the extended data bit is set
    #[inline]
    pub fn has_extended_data(&self) -> bool {
        (self.0 & Self::EXTENDED) != 0
    }

    /// Check if deleted data bit is set
    #[inline]
    pub fn is_deleted(&self) -> bool {
        (self.0 & Self::DELETED) != 0
    }

    /// Check if record not found bit is set
    #[inline]
    pub fn record_not_found(&self) -> bool {
        (self.0 & Self::RECORD_NOT_FOUND) != 0
    }

    /// Check if CRC error bit is set
    #[inline]
    pub fn crc_error(&self) -> bool {
        (self.0 & Self::CRC_ERROR) != 0
    }

    /// Check if lost data bit is set
    #[inline]
    pub fn lost_data(&self) -> bool {
        (self.0 & Self::LOST_DATA) != 0
    }

    /// Any nonzero bit is a drive error for this occurrence, including the
    /// extended data bit
    #[inline]
    pub fn has_error(&self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for FdcStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            return write!(f, "OK");
        }

        let mut flags = Vec::new();
        if self.not_ready() {
            flags.push("NR");
        }
        if self.has_extended_data() {
            flags.push("EXT");
        }
        if self.is_deleted() {
            flags.push("DEL");
        }
        if self.record_not_found() {
            flags.push("RNF");
        }
        if self.crc_error() {
            flags.push("CRC");
        }
        if self.lost_data() {
            flags.push("LD");
        }
        if flags.is_empty() {
            write!(f, "{:#04X}", self.0)
        } else {
            write!(f, "{}", flags.join("|"))
        }
    }
}
