//! ATX image loading and sector lookup

/// Sector occurrence selection
pub mod locator;
/// Track offset table
pub mod track_index;
/// Weak sector data
pub mod weak;

pub use locator::{is_nearer, ChosenSector, SectorScan};
pub use track_index::TrackIndex;

use crate::error::{AtxError, Result};
use crate::format::{Density, FileHeader, Geometry, Record, SectorHeader, FILE_HEADER_SIZE};
use crate::io::source::read_bytes;
use crate::io::ByteSource;
use log::{debug, trace};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Descriptive fields of the ATX file header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    /// Format version
    pub version: u16,
    /// Minimum version needed to read the image
    pub min_version: u16,
    /// Creator program id
    pub creator: u16,
    /// Creator program version
    pub creator_version: u16,
    /// Image flags
    pub flags: u32,
    /// Image type
    pub image_type: u16,
    /// Recorded density
    pub density: Density,
    /// Image id
    pub image_id: u32,
    /// Image revision
    pub image_version: u16,
    /// Offset of the first track record
    pub start_data: u32,
    /// Offset past the last track record
    pub end_data: u32,
}

impl From<&FileHeader> for ImageInfo {
    fn from(header: &FileHeader) -> Self {
        Self {
            version: header.version,
            min_version: header.min_version,
            creator: header.creator,
            creator_version: header.creator_version,
            flags: header.flags,
            image_type: header.image_type,
            density: header.density(),
            image_id: header.image_id,
            image_version: header.image_version,
            start_data: header.start_data,
            end_data: header.end_data,
        }
    }
}

/// What one lookup against the image produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Fetch {
    /// The indexed record is missing, empty or declares another track
    Mismatch,
    /// No occurrence carries the requested number
    NotFound,
    /// An occurrence was chosen
    Found {
        sector: ChosenSector,
        bytes_read: usize,
        has_error: bool,
        weak_offset: Option<u16>,
    },
}

/// A loaded ATX image: its backing bytes, geometry and track index
pub struct AtxImage {
    source: Box<dyn ByteSource + Send>,
    info: ImageInfo,
    geometry: Geometry,
    tracks: TrackIndex,
}

impl std::fmt::Debug for AtxImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AtxImage")
            .field("info", &self.info)
            .field("geometry", &self.geometry)
            .field("tracks", &self.tracks)
            .finish_non_exhaustive()
    }
}

impl AtxImage {
    /// Open an ATX file from disk
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::load(BufReader::new(file))
    }

    /// Validate the file header and index every track record
    ///
    /// Fails if the signature or either version field is wrong; nothing is
    /// derived from a rejected header.
    pub fn load<S: ByteSource + Send + 'static>(source: S) -> Result<Self> {
        let mut source: Box<dyn ByteSource + Send> = Box::new(source);

        let mut raw = [0u8; FILE_HEADER_SIZE];
        let read = read_bytes(source.as_mut(), 0, &mut raw);
        if read < FILE_HEADER_SIZE {
            return Err(AtxError::TruncatedHeader {
                expected: FILE_HEADER_SIZE,
                read,
            });
        }
        let header = FileHeader::decode(&raw).map_err(|e| AtxError::parse(0, e.to_string()))?;

        if !header.has_valid_signature() {
            return Err(AtxError::InvalidSignature {
                found: header.signature,
            });
        }
        if !header.is_supported_version() {
            return Err(AtxError::UnsupportedVersion {
                version: header.version,
                min_version: header.min_version,
            });
        }

        let geometry = Geometry::from_density_code(header.density);
        let tracks = TrackIndex::build(source.as_mut(), header.start_data as u64);
        debug!(
            "loaded ATX image: density {:?}, {} sectors of {} bytes per track, {} tracks",
            header.density(),
            geometry.sectors_per_track,
            geometry.bytes_per_sector,
            tracks.track_count()
        );

        Ok(Self {
            source,
            info: ImageInfo::from(&header),
            geometry,
            tracks,
        })
    }

    /// File header fields
    pub fn info(&self) -> &ImageInfo {
        &self.info
    }

    /// Sector geometry derived from the density code
    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// Bytes in each sector
    pub fn bytes_per_sector(&self) -> u16 {
        self.geometry.bytes_per_sector
    }

    /// Sectors in each track
    pub fn sectors_per_track(&self) -> u8 {
        self.geometry.sectors_per_track
    }

    /// Offsets of every indexed track record
    pub fn tracks(&self) -> &TrackIndex {
        &self.tracks
    }

    /// Every sector header of a 0-based physical track, in list order
    pub fn sector_list(&mut self, track: u16) -> Option<Vec<SectorHeader>> {
        let offset = self.tracks.get(track as usize)?;
        locator::read_sector_list(self.source.as_mut(), offset, track)
    }

    /// Resolve sector `sector` of 1-based `track` and read its payload into `buf`
    ///
    /// The payload is read only if the chosen occurrence has a data offset and
    /// no error; otherwise `bytes_read` is 0. A weak region is randomized in
    /// `buf` whenever one applies to the chosen occurrence, even when nothing
    /// was read.
    pub(crate) fn fetch(&mut self, track: u16, sector: u8, head: u16, buf: &mut [u8]) -> Fetch {
        let physical = track - 1;
        let Some(track_offset) = self.tracks.get(physical as usize) else {
            return Fetch::Mismatch;
        };
        let source = self.source.as_mut();

        let Some(scan) = locator::scan_track(source, track_offset, physical, sector, head) else {
            return Fetch::Mismatch;
        };
        let Some(chosen) = scan.chosen else {
            return Fetch::NotFound;
        };

        let bytes_per_sector = self.geometry.bytes_per_sector;
        let weak_offset = if scan.extended_records > 0 {
            let start = track_offset + scan.max_data_offset as u64 + bytes_per_sector as u64;
            weak::find_weak_offset(source, start, scan.extended_records, chosen.index)
        } else {
            None
        };

        let len = buf.len().min(bytes_per_sector as usize);
        let data = &mut buf[..len];
        let mut bytes_read = if chosen.data_offset != 0 {
            read_bytes(source, track_offset + chosen.data_offset as u64, data)
        } else {
            0
        };
        if scan.has_error {
            bytes_read = 0;
        }

        if let Some(weak) = weak_offset {
            weak::randomize_from(data, weak as usize);
        }

        trace!(
            "track {} sector {}: occurrence #{} at angle {}, {} bytes",
            track,
            sector,
            chosen.index,
            chosen.angle,
            bytes_read
        );

        Fetch::Found {
            sector: chosen,
            bytes_read,
            has_error: scan.has_error,
            weak_offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use std::io::Cursor;

    fn one_track(sectors: Vec<TestSector>) -> AtxImage {
        let image = build_image(0, &[TestTrack { number: 0, sectors }]);
        AtxImage::load(Cursor::new(image)).unwrap()
    }

    #[test]
    fn test_load_geometry() {
        let image = AtxImage::load(Cursor::new(build_image(1, &[]))).unwrap();
        assert_eq!(image.bytes_per_sector(), 256);
        assert_eq!(image.sectors_per_track(), 26);
        assert_eq!(image.info().density, Density::Medium);
        assert_eq!(image.tracks().track_count(), 0);
    }

    #[test]
    fn test_load_rejects_bad_signature() {
        let mut bytes = build_image(0, &[]);
        bytes[0..4].copy_from_slice(b"ATR\0");
        let err = AtxImage::load(Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, AtxError::InvalidSignature { .. }));
    }

    #[test]
    fn test_load_rejects_version() {
        let mut bytes = build_image(0, &[]);
        bytes[6] = 2;
        let err = AtxImage::load(Cursor::new(bytes)).unwrap_err();
        assert!(matches!(
            err,
            AtxError::UnsupportedVersion {
                version: 1,
                min_version: 2
            }
        ));
    }

    #[test]
    fn test_load_rejects_truncated() {
        let err = AtxImage::load(Cursor::new(b"AT8X".to_vec())).unwrap_err();
        assert!(matches!(err, AtxError::TruncatedHeader { read: 4, .. }));
    }

    #[test]
    fn test_index_points_at_matching_tracks() {
        let tracks: Vec<TestTrack> = [2u8, 0, 1]
            .iter()
            .map(|&number| TestTrack {
                number,
                sectors: vec![TestSector::new(1, 100, number, 128)],
            })
            .collect();
        let mut image = AtxImage::load(Cursor::new(build_image(0, &tracks))).unwrap();

        assert_eq!(image.tracks().track_count(), 3);
        for (track, offset) in image.tracks().iter().collect::<Vec<_>>() {
            let header: crate::format::TrackHeader =
                crate::io::read_record(image.source.as_mut(), offset).unwrap();
            assert_eq!(header.track_number as usize, track);
        }
    }

    #[test]
    fn test_fetch_reads_payload() {
        let mut image = one_track(vec![
            TestSector::new(1, 100, 0x11, 128),
            TestSector::new(2, 900, 0x22, 128),
        ]);
        let mut buf = [0u8; 256];

        let fetch = image.fetch(1, 2, 0, &mut buf);
        match fetch {
            Fetch::Found {
                sector, bytes_read, ..
            } => {
                assert_eq!(sector.index, 1);
                assert_eq!(sector.angle, 900);
                assert_eq!(bytes_read, 128);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(buf[..128].iter().all(|&b| b == 0x22));
        assert!(buf[128..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_fetch_not_found_and_mismatch() {
        let mut image = one_track(vec![TestSector::new(1, 100, 0x11, 128)]);
        let mut buf = [0u8; 128];
        assert_eq!(image.fetch(1, 5, 0, &mut buf), Fetch::NotFound);
        assert_eq!(image.fetch(2, 1, 0, &mut buf), Fetch::Mismatch);
    }

    #[test]
    fn test_fetch_error_sector_reads_nothing() {
        let mut image = one_track(vec![TestSector::new(1, 100, 0x11, 128).status(0x08)]);
        let mut buf = [0u8; 128];
        match image.fetch(1, 1, 0, &mut buf) {
            Fetch::Found {
                bytes_read,
                has_error,
                ..
            } => {
                assert_eq!(bytes_read, 0);
                assert!(has_error);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_fetch_missing_payload() {
        let mut image = one_track(vec![TestSector::new(1, 100, 0, 0)]);
        let mut buf = [0xEEu8; 128];
        match image.fetch(1, 1, 0, &mut buf) {
            Fetch::Found { bytes_read, .. } => assert_eq!(bytes_read, 0),
            other => panic!("unexpected {:?}", other),
        }
        assert!(buf.iter().all(|&b| b == 0xEE));
    }

    #[test]
    fn test_fetch_finds_weak_record_for_early_sector() {
        let mut image = one_track(vec![
            TestSector::new(1, 100, 0x11, 128).weak(64),
            TestSector::new(2, 900, 0x22, 128),
            TestSector::new(3, 1800, 0x33, 128),
        ]);
        let mut buf = [0u8; 128];
        match image.fetch(1, 1, 0, &mut buf) {
            Fetch::Found {
                weak_offset,
                has_error,
                ..
            } => {
                assert_eq!(weak_offset, Some(64));
                // The extended data bit alone marks the occurrence as an error
                assert!(has_error);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_fetch_randomizes_weak_sector_before_later_payloads() {
        let mut image = one_track(vec![
            TestSector::new(1, 100, 0x11, 128).weak(16),
            TestSector::new(2, 900, 0x22, 128),
        ]);
        let mut changed = false;
        for _ in 0..5 {
            let mut buf = [0u8; 128];
            assert!(matches!(
                image.fetch(1, 1, 0, &mut buf),
                Fetch::Found { weak_offset: Some(16), .. }
            ));
            assert!(buf[..16].iter().all(|&b| b == 0x11));
            changed |= buf[16..].iter().any(|&b| b != 0x11);
        }
        assert!(changed);
    }

    #[test]
    fn test_fetch_ignores_weak_flag_on_other_sectors() {
        let mut image = one_track(vec![
            TestSector::new(1, 100, 0x11, 128).weak(16),
            TestSector::new(2, 900, 0x22, 128),
        ]);
        let mut buf = [0u8; 128];
        match image.fetch(1, 2, 0, &mut buf) {
            Fetch::Found {
                weak_offset,
                has_error,
                bytes_read,
                ..
            } => {
                assert_eq!(weak_offset, None);
                assert!(!has_error);
                assert_eq!(bytes_read, 128);
                assert!(buf.iter().all(|&b| b == 0x22));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_sector_list() {
        let mut image = one_track(vec![
            TestSector::new(1, 100, 0x11, 128),
            TestSector::new(1, 20000, 0x12, 128),
        ]);
        let list = image.sector_list(0).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[1].timev, 20000);
        assert!(image.sector_list(1).is_none());
    }
}
