//! Core types for cartridge image analysis.
//!
//! This module defines the data model shared by the header locator, the
//! header parser, the disassembler and the output layers: the memory
//! mapping, the parsed header record, analysis options and the final
//! report.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::disasm::Disassembly;
use crate::error::{ReconError, Result};
use crate::heuristics::HeaderLocation;
use crate::strings::AsciiString;

/// Cartridge memory-mapping scheme.
///
/// Exactly one mapping is selected per image. Each variant fixes the file
/// offset of its header candidate and the size of one ROM bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MemoryMapping {
    /// Low mapping: 32 KiB banks visible at `$8000-$FFFF`.
    #[serde(rename = "LoROM")]
    LoRom,
    /// High mapping: 64 KiB banks visible at `$0000-$FFFF`.
    #[serde(rename = "HiROM")]
    HiRom,
}

impl MemoryMapping {
    /// File offset of this mapping's header candidate.
    pub const fn header_offset(self) -> usize {
        match self {
            MemoryMapping::LoRom => 0x7FC0,
            MemoryMapping::HiRom => 0xFFC0,
        }
    }

    /// Size of one ROM bank in the file.
    pub const fn bank_size(self) -> usize {
        match self {
            MemoryMapping::LoRom => 0x8000,
            MemoryMapping::HiRom => 0x10000,
        }
    }

    /// Low nibble the header's map-mode byte is expected to carry.
    pub const fn expected_mode_nibble(self) -> u8 {
        match self {
            MemoryMapping::LoRom => 0,
            MemoryMapping::HiRom => 1,
        }
    }

    /// CPU address a bank is assembled at.
    pub const fn bank_origin(self) -> u16 {
        match self {
            MemoryMapping::LoRom => 0x8000,
            MemoryMapping::HiRom => 0x0000,
        }
    }

    /// Conventional name of the mapping.
    pub const fn name(self) -> &'static str {
        match self {
            MemoryMapping::LoRom => "LoROM",
            MemoryMapping::HiRom => "HiROM",
        }
    }
}

impl fmt::Display for MemoryMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Names of the six interrupt vectors, in header order.
pub const VECTOR_NAMES: [&str; 6] = ["cop", "brk", "abort", "nmi", "reset", "irq"];

/// One set of interrupt vectors (native or emulation mode).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorTable {
    /// COP instruction vector
    pub cop: u16,
    /// BRK instruction vector
    pub brk: u16,
    /// ABORT vector
    pub abort: u16,
    /// Non-maskable interrupt vector
    pub nmi: u16,
    /// Reset vector
    pub reset: u16,
    /// Interrupt request vector
    pub irq: u16,
}

impl VectorTable {
    /// Build a table from values in [`VECTOR_NAMES`] order.
    pub fn from_values(values: [u16; 6]) -> Self {
        let [cop, brk, abort, nmi, reset, irq] = values;
        Self {
            cop,
            brk,
            abort,
            nmi,
            reset,
            irq,
        }
    }

    /// Values in [`VECTOR_NAMES`] order.
    pub fn values(&self) -> [u16; 6] {
        [self.cop, self.brk, self.abort, self.nmi, self.reset, self.irq]
    }

    /// Iterate `(name, address)` pairs in header order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, u16)> {
        VECTOR_NAMES.into_iter().zip(self.values())
    }

    /// Look up a vector by name.
    pub fn get(&self, name: &str) -> Option<u16> {
        self.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }
}

/// Parsed cartridge header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderRecord {
    /// Selected memory mapping
    pub mapping: MemoryMapping,
    /// File offset of the header block
    pub header_offset: usize,
    /// Game title (NUL-truncated, trimmed)
    pub title: String,
    /// Map-mode byte
    pub map_mode: u8,
    /// Cartridge type byte
    pub rom_type: u8,
    /// ROM size byte
    pub rom_size_byte: u8,
    /// SRAM size byte
    pub sram_size_byte: u8,
    /// Region byte
    pub region: u8,
    /// Developer id
    pub developer_id: u8,
    /// Version number
    pub version: u8,
    /// Bit complement of the checksum
    pub checksum_complement: u16,
    /// 16-bit checksum
    pub checksum: u16,
    /// Native-mode interrupt vectors
    pub native_vectors: VectorTable,
    /// Emulation-mode interrupt vectors
    pub emulation_vectors: VectorTable,
}

impl HeaderRecord {
    /// Whether checksum and complement are bitwise inverses.
    pub fn checksum_pair_valid(&self) -> bool {
        (self.checksum ^ self.checksum_complement) == 0xFFFF
    }

    /// Address the CPU starts at after power-on.
    pub fn reset_entry(&self) -> u16 {
        self.emulation_vectors.reset
    }
}

/// Options for analysis behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisOptions {
    /// Byte budget for the linear sweep
    pub max_disasm_bytes: usize,
    /// Sweep entry point replacing the emulation reset vector
    pub entry_override: Option<u16>,
    /// Run the printable-ASCII scan
    pub scan_strings: bool,
    /// Minimum length of a reported ASCII run
    pub min_string_len: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisOptions {
    /// Create options with default settings.
    pub fn new() -> Self {
        Self {
            max_disasm_bytes: 0x180,
            entry_override: None,
            scan_strings: true,
            min_string_len: 4,
        }
    }

    /// Create options for thorough analysis.
    pub fn thorough() -> Self {
        Self {
            max_disasm_bytes: 0x8000,
            ..Self::new()
        }
    }

    /// Create options for fast analysis.
    pub fn fast() -> Self {
        Self {
            max_disasm_bytes: 0x40,
            entry_override: None,
            scan_strings: false,
            min_string_len: 4,
        }
    }

    /// Reject option combinations the analysis cannot honor.
    pub fn validate(&self) -> Result<()> {
        if self.min_string_len == 0 {
            return Err(ReconError::ConfigError {
                message: "min_string_len must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Placement of one bank split within the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankInfo {
    /// Bank number
    pub index: usize,
    /// Offset of the first byte in the image
    pub file_offset: usize,
    /// Length in bytes (the final bank may be short)
    pub len: usize,
    /// CPU address the bank is assembled at
    pub org: u16,
}

/// Complete analysis output for one image.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    /// Parsed header for the chosen mapping
    pub header: HeaderRecord,
    /// Scores of both header candidates
    pub location: HeaderLocation,
    /// Bank split layout
    pub banks: Vec<BankInfo>,
    /// Linear sweep from the entry point
    pub disassembly: Disassembly,
    /// Printable-ASCII runs
    pub strings: Vec<AsciiString>,
    /// Analysis notes and warnings
    pub notes: Vec<Note>,
}

/// Analysis note or warning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Severity level
    pub level: NoteLevel,
    /// Note message
    pub message: String,
}

impl Note {
    /// Create an info note.
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoteLevel::Info,
            message: message.into(),
        }
    }

    /// Create a warning note.
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoteLevel::Warning,
            message: message.into(),
        }
    }
}

/// Note severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteLevel {
    /// Informational
    Info,
    /// Warning
    Warning,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_constants() {
        assert_eq!(MemoryMapping::LoRom.header_offset(), 0x7FC0);
        assert_eq!(MemoryMapping::HiRom.header_offset(), 0xFFC0);
        assert_eq!(MemoryMapping::LoRom.bank_size(), 0x8000);
        assert_eq!(MemoryMapping::HiRom.bank_size(), 0x10000);
        assert_eq!(MemoryMapping::HiRom.to_string(), "HiROM");
    }

    #[test]
    fn test_mapping_serializes_conventional_name() {
        let json = serde_json::to_string(&MemoryMapping::LoRom).unwrap();
        assert_eq!(json, "\"LoROM\"");
    }

    #[test]
    fn test_vector_table_order() {
        let table = VectorTable::from_values([1, 2, 3, 4, 5, 6]);
        let names: Vec<_> = table.iter().map(|(n, _)| n).collect();
        assert_eq!(names, VECTOR_NAMES);
        assert_eq!(table.get("reset"), Some(5));
        assert_eq!(table.get("irq"), Some(6));
        assert_eq!(table.get("bogus"), None);
    }

    #[test]
    fn test_options() {
        let default = AnalysisOptions::new();
        let thorough = AnalysisOptions::thorough();
        let fast = AnalysisOptions::fast();

        assert_eq!(default.max_disasm_bytes, 0x180);
        assert!(thorough.max_disasm_bytes > default.max_disasm_bytes);
        assert!(fast.max_disasm_bytes < default.max_disasm_bytes);
        assert!(!fast.scan_strings);
    }

    #[test]
    fn test_options_validate() {
        assert!(AnalysisOptions::new().validate().is_ok());
        let bad = AnalysisOptions {
            min_string_len: 0,
            ..AnalysisOptions::new()
        };
        assert!(matches!(
            bad.validate(),
            Err(ReconError::ConfigError { .. })
        ));
    }
}
