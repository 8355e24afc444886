//! Cartridge header parser.
//!
//! The header is a 64-byte block at a mapping-specific offset. All
//! multi-byte fields are little-endian.

use memchr::memchr;

use crate::formats::{read_u16_le, read_u8};
use crate::types::{HeaderRecord, MemoryMapping, VectorTable};

/// Size of the header block, including both vector tables.
pub const HEADER_SIZE: usize = 0x40;

/// Length of the title field.
pub const TITLE_LEN: usize = 21;

/// Field offsets relative to the header base.
#[allow(missing_docs)]
pub mod layout {
    pub const TITLE: usize = 0x00;
    pub const MAP_MODE: usize = 0x15;
    pub const ROM_TYPE: usize = 0x16;
    pub const ROM_SIZE: usize = 0x17;
    pub const SRAM_SIZE: usize = 0x18;
    pub const REGION: usize = 0x19;
    pub const DEVELOPER_ID: usize = 0x1A;
    pub const VERSION: usize = 0x1B;
    pub const CHECKSUM_COMPLEMENT: usize = 0x1C;
    pub const CHECKSUM: usize = 0x1E;
    pub const NATIVE_VECTORS: usize = 0x24;
    pub const EMULATION_VECTORS: usize = 0x34;
    pub const EMULATION_RESET: usize = 0x3C;
}

/// Parse the header at `offset` for the given mapping.
///
/// The caller normally guarantees the block fits in `data`; bytes past the
/// end read as zero rather than failing.
pub fn parse_header(data: &[u8], mapping: MemoryMapping, offset: usize) -> HeaderRecord {
    let field = |rel: usize| read_u8(data, offset + rel);
    let word = |rel: usize| read_u16_le(data, offset + rel);

    HeaderRecord {
        mapping,
        header_offset: offset,
        title: decode_title(data, offset),
        map_mode: field(layout::MAP_MODE),
        rom_type: field(layout::ROM_TYPE),
        rom_size_byte: field(layout::ROM_SIZE),
        sram_size_byte: field(layout::SRAM_SIZE),
        region: field(layout::REGION),
        developer_id: field(layout::DEVELOPER_ID),
        version: field(layout::VERSION),
        checksum_complement: word(layout::CHECKSUM_COMPLEMENT),
        checksum: word(layout::CHECKSUM),
        native_vectors: read_vectors(data, offset + layout::NATIVE_VECTORS),
        emulation_vectors: read_vectors(data, offset + layout::EMULATION_VECTORS),
    }
}

/// Raw title bytes present in the image (may be fewer than [`TITLE_LEN`]).
pub fn title_bytes(data: &[u8], offset: usize) -> &[u8] {
    let start = (offset + layout::TITLE).min(data.len());
    let end = (start + TITLE_LEN).min(data.len());
    &data[start..end]
}

fn decode_title(data: &[u8], offset: usize) -> String {
    let raw = title_bytes(data, offset);
    let raw = match memchr(0, raw) {
        Some(nul) => &raw[..nul],
        None => raw,
    };
    raw.iter()
        .map(|&b| {
            if b.is_ascii() {
                char::from(b)
            } else {
                char::REPLACEMENT_CHARACTER
            }
        })
        .collect::<String>()
        .trim_matches(|c: char| c.is_whitespace() || ('\x1c'..='\x1f').contains(&c))
        .to_string()
}

fn read_vectors(data: &[u8], base: usize) -> VectorTable {
    let mut values = [0u16; 6];
    for (i, value) in values.iter_mut().enumerate() {
        *value = read_u16_le(data, base + i * 2);
    }
    VectorTable::from_values(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn make_lorom_image() -> Vec<u8> {
        let mut data = vec![0u8; 0x8000];
        let base = 0x7FC0;
        data[base..base + 10].copy_from_slice(b"DUEL TEST ");
        data[base + layout::MAP_MODE] = 0x20;
        data[base + layout::ROM_TYPE] = 0x02;
        data[base + layout::ROM_SIZE] = 0x09;
        data[base + layout::SRAM_SIZE] = 0x01;
        data[base + layout::REGION] = 0x01;
        data[base + layout::DEVELOPER_ID] = 0x33;
        data[base + layout::VERSION] = 0x01;
        data[base + 0x1C..base + 0x1E].copy_from_slice(&0x1234u16.to_le_bytes());
        data[base + 0x1E..base + 0x20].copy_from_slice(&0xEDCBu16.to_le_bytes());
        for i in 0..6u16 {
            let native = base + layout::NATIVE_VECTORS + usize::from(i) * 2;
            let emu = base + layout::EMULATION_VECTORS + usize::from(i) * 2;
            data[native..native + 2].copy_from_slice(&(0x8100 + i).to_le_bytes());
            data[emu..emu + 2].copy_from_slice(&(0x8200 + i).to_le_bytes());
        }
        data
    }

    #[test]
    fn test_parse_all_fields() {
        let data = make_lorom_image();
        let header = parse_header(&data, MemoryMapping::LoRom, 0x7FC0);

        assert_eq!(header.mapping, MemoryMapping::LoRom);
        assert_eq!(header.header_offset, 0x7FC0);
        assert_eq!(header.title, "DUEL TEST");
        assert_eq!(header.map_mode, 0x20);
        assert_eq!(header.rom_type, 0x02);
        assert_eq!(header.rom_size_byte, 0x09);
        assert_eq!(header.sram_size_byte, 0x01);
        assert_eq!(header.region, 0x01);
        assert_eq!(header.developer_id, 0x33);
        assert_eq!(header.version, 0x01);
        assert_eq!(header.checksum_complement, 0x1234);
        assert_eq!(header.checksum, 0xEDCB);
        assert!(header.checksum_pair_valid());
        assert_eq!(
            header.native_vectors,
            VectorTable::from_values([0x8100, 0x8101, 0x8102, 0x8103, 0x8104, 0x8105])
        );
        assert_eq!(header.emulation_vectors.reset, 0x8204);
        assert_eq!(header.reset_entry(), 0x8204);
    }

    #[test]
    fn test_title_stops_at_nul() {
        let mut data = make_lorom_image();
        data[0x7FC0..0x7FC0 + TITLE_LEN].copy_from_slice(b"  ABC\0GARBAGE AFTER  ");
        let header = parse_header(&data, MemoryMapping::LoRom, 0x7FC0);
        assert_eq!(header.title, "ABC");
    }

    #[test]
    fn test_title_replaces_non_ascii() {
        let mut data = make_lorom_image();
        data[0x7FC0..0x7FC0 + 4].copy_from_slice(&[b'A', 0xC3, 0xA9, b'B']);
        data[0x7FC4..0x7FC0 + TITLE_LEN].fill(b' ');
        let header = parse_header(&data, MemoryMapping::LoRom, 0x7FC0);
        assert_eq!(header.title, "A\u{FFFD}\u{FFFD}B");
    }

    #[test]
    fn test_title_trims_separator_controls() {
        let mut data = make_lorom_image();
        data[0x7FC0..0x7FC0 + TITLE_LEN].fill(b' ');
        data[0x7FC0..0x7FC5].copy_from_slice(b"\x1cABC\x1f");
        let header = parse_header(&data, MemoryMapping::LoRom, 0x7FC0);
        assert_eq!(header.title, "ABC");
    }

    #[test]
    fn test_truncated_image_reads_zero() {
        let data = vec![b'X'; 0x7FC8];
        let header = parse_header(&data, MemoryMapping::LoRom, 0x7FC0);
        assert_eq!(header.title, "XXXXXXXX");
        assert_eq!(header.checksum, 0);
        assert_eq!(header.emulation_vectors, VectorTable::default());
    }

    #[test]
    fn test_empty_image() {
        let header = parse_header(&[], MemoryMapping::LoRom, 0x7FC0);
        assert_eq!(header.title, "");
        assert_eq!(header.reset_entry(), 0);
    }
}
