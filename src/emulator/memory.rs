use super::basics::{Address, Value, ENTRY_POINT, FONT_OFFSET, FONT_SPRITES, MAX_IMAGE_SIZE, MEMORY_SIZE};
use std::{fs, io, path::Path, path::PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("program image is too large ({size} bytes), at most {max} bytes fit in memory")]
    ImageTooLarge { size: usize, max: usize },

    #[error("could not read program image {path:?}")]
    ImageUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Reads a program image from disk. Capacity is checked when the image is
/// placed into memory, not here.
pub fn read_image(path: impl AsRef<Path>) -> Result<Vec<u8>, LoadError> {
    let path = path.as_ref();
    fs::read(path).map_err(|source| LoadError::ImageUnreadable {
        path: path.to_path_buf(),
        source,
    })
}

/// Flat guest memory. Every access is masked to 12 bits, so reads and writes
/// past the top of memory wrap around to the bottom instead of panicking.
#[derive(Clone)]
pub struct Memory {
    bytes: [Value; MEMORY_SIZE],
}

impl Memory {
    pub fn new() -> Memory {
        Memory {
            bytes: [Value(0); MEMORY_SIZE],
        }
    }

    /// Builds a fresh memory with the glyph table in low memory and `image`
    /// at the entry point.
    pub fn with_image(image: &[u8]) -> Result<Memory, LoadError> {
        if image.len() > MAX_IMAGE_SIZE {
            return Err(LoadError::ImageTooLarge {
                size: image.len(),
                max: MAX_IMAGE_SIZE,
            });
        }
        let mut memory = Memory::new();
        memory.write_slice(Address(FONT_OFFSET), &FONT_SPRITES);
        memory.write_slice(Address(ENTRY_POINT), image);
        Ok(memory)
    }

    pub fn read(&self, addr: Address) -> Value {
        self.bytes[addr.index()]
    }

    pub fn write(&mut self, addr: Address, value: Value) {
        self.bytes[addr.index()] = value;
    }

    /// Reads a big-endian opcode.
    pub fn read_word(&self, addr: Address) -> u16 {
        let high = self.read(addr).0 as u16;
        let low = self.read(addr.offset(1)).0 as u16;
        high << 8 | low
    }

    pub fn write_slice(&mut self, start: Address, data: &[u8]) {
        for (i, byte) in data.iter().enumerate() {
            self.write(start.offset(i as u16), Value(*byte));
        }
    }

    /// Copies `len` bytes starting at `start`, wrapping at the top of memory.
    pub fn read_slice(&self, start: Address, len: usize) -> Vec<u8> {
        (0..len)
            .map(|i| self.read(start.offset(i as u16)).0)
            .collect()
    }
}

impl Default for Memory {
    fn default() -> Self {
        Memory::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_font_and_image_placement() {
        let memory = Memory::with_image(&[0x00, 0xE0]).unwrap();
        assert_eq!(memory.read_slice(Address(FONT_OFFSET), FONT_SPRITES.len()), FONT_SPRITES.to_vec());
        assert_eq!(memory.read_word(Address(ENTRY_POINT)), 0x00E0);
        for addr in ENTRY_POINT + 2..MEMORY_SIZE as u16 {
            assert_eq!(memory.read(Address(addr)), Value(0));
        }
    }

    #[test]
    fn test_image_at_capacity() {
        let image = vec![0xAB; MAX_IMAGE_SIZE];
        let memory = Memory::with_image(&image).unwrap();
        assert_eq!(memory.read(Address(0xFFF)), Value(0xAB));
    }

    #[test]
    fn test_image_too_large() {
        let image = vec![0; MAX_IMAGE_SIZE + 1];
        match Memory::with_image(&image) {
            Err(LoadError::ImageTooLarge { size, max }) => {
                assert_eq!(size, MAX_IMAGE_SIZE + 1);
                assert_eq!(max, MAX_IMAGE_SIZE);
            }
            other => panic!("unexpected result: {:?}", other.err()),
        }
    }

    #[test]
    fn test_access_wraps() {
        let mut memory = Memory::new();
        memory.write_slice(Address(0xFFF), &[0x12, 0x34]);
        assert_eq!(memory.read(Address(0xFFF)), Value(0x12));
        assert_eq!(memory.read(Address(0)), Value(0x34));
        assert_eq!(memory.read_word(Address(0xFFF)), 0x1234);
    }

    #[test]
    fn test_unreadable_image() {
        let err = read_image("does/not/exist.ch8").unwrap_err();
        assert!(matches!(err, LoadError::ImageUnreadable { .. }));
    }
}
