//! Byte-range access to the backing image

/// Random-access byte source
pub mod source;

pub use source::{read_record, ByteSource};
