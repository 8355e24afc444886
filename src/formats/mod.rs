//! Cartridge image field readers and header parsing.
//!
//! Header fields are read leniently: a byte past the end of the image
//! reads as zero, so a truncated or homebrew image still yields a
//! best-guess record instead of an error.

pub mod snes;

use byteorder::{ByteOrder, LittleEndian};

/// Read a byte, or zero when `offset` is past the end of `data`.
pub fn read_u8(data: &[u8], offset: usize) -> u8 {
    data.get(offset).copied().unwrap_or(0)
}

/// Read a little-endian u16; missing bytes read as zero.
pub fn read_u16_le(data: &[u8], offset: usize) -> u16 {
    let bytes = [read_u8(data, offset), read_u8(data, offset + 1)];
    LittleEndian::read_u16(&bytes)
}

/// Read a little-endian 24-bit value; missing bytes read as zero.
pub fn read_u24_le(data: &[u8], offset: usize) -> u32 {
    let bytes = [
        read_u8(data, offset),
        read_u8(data, offset + 1),
        read_u8(data, offset + 2),
    ];
    LittleEndian::read_u24(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_u16_le() {
        let data = [0x34, 0x12, 0xFF];
        assert_eq!(read_u16_le(&data, 0), 0x1234);
        assert_eq!(read_u16_le(&data, 2), 0x00FF);
        assert_eq!(read_u16_le(&data, 10), 0);
    }

    #[test]
    fn test_read_u24_le() {
        let data = [0x5B, 0x84, 0x00, 0x01];
        assert_eq!(read_u24_le(&data, 0), 0x00845B);
        assert_eq!(read_u24_le(&data, 1), 0x010084);
    }
}
