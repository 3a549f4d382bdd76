//! Random-access byte source for ATX images

use crate::format::Record;
use log::warn;
use std::io::{ErrorKind, Read, Seek, SeekFrom};

/// A backing store that can load any byte range on demand
///
/// A short read is the normal signal for an offset past the end of the image.
pub trait ByteSource {
    /// Fill `buf` from `offset`, returning how many bytes were read
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> std::io::Result<usize>;
}

impl<T: Read + Seek> ByteSource for T {
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> std::io::Result<usize> {
        self.seek(SeekFrom::Start(offset))?;

        let mut filled = 0;
        while filled < buf.len() {
            match self.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(filled)
    }
}

/// Read up to `buf.len()` bytes, treating any I/O error as a failed read
pub(crate) fn read_bytes(source: &mut dyn ByteSource, offset: u64, buf: &mut [u8]) -> usize {
    match source.read_at(offset, buf) {
        Ok(n) => n,
        Err(e) => {
            warn!("read of {} bytes at {:#x} failed: {}", buf.len(), offset, e);
            0
        }
    }
}

/// Read and decode one fixed-size record at `offset`
///
/// Returns `None` if fewer than `T::SIZE` bytes are available.
pub fn read_record<T: Record>(source: &mut dyn ByteSource, offset: u64) -> Option<T> {
    // Per-call scratch: fields are copied out before the next read is issued
    let mut scratch = [0u8; 64];
    let buf = &mut scratch[..T::SIZE];
    if read_bytes(source, offset, buf) < T::SIZE {
        return None;
    }
    T::decode(buf).ok()
}
