//! Image loading. An LC-3 image is a stream of big-endian 16-bit words: the
//! first word is the origin address, the rest are placed contiguously from
//! there.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::memory::Memory;
use crate::{CoreError, Result, MEMORY_SIZE};

/// Load an image from a byte stream into memory and return its origin.
///
/// Words past the top of the address space are silently ignored, as is a
/// truncated trailing byte.
pub fn load_image<R: Read>(mut reader: R, memory: &mut Memory) -> Result<u16> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    if bytes.len() < 2 {
        return Err(CoreError::BadImage("missing origin word".into()));
    }
    let origin = u16::from_be_bytes([bytes[0], bytes[1]]);
    let capacity = MEMORY_SIZE - origin as usize;
    for (index, pair) in bytes[2..].chunks_exact(2).take(capacity).enumerate() {
        let word = u16::from_be_bytes([pair[0], pair[1]]);
        memory.write(origin + index as u16, word);
    }
    Ok(origin)
}

pub fn load_image_file(path: impl AsRef<Path>, memory: &mut Memory) -> Result<u16> {
    let file = File::open(path)?;
    load_image(BufReader::new(file), memory)
}
