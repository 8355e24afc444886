//! SNES Recon - Cartridge Image Analysis for Reverse Engineering
//!
//! This library inspects a Super Nintendo cartridge image and recovers the
//! structure needed to start reverse engineering it: which memory map the
//! image uses, the internal header, the bank layout, and a first linear
//! disassembly of the 65C816 code at the reset vector.
//!
//! # Features
//!
//! - **Mapping Detection**: Scores both header locations to tell LoROM from HiROM
//! - **Header Parsing**: Title, mode, sizes, checksum pair, and both vector tables
//! - **Linear Disassembly**: Width-tracking 65C816 sweep with call and branch references
//! - **String Scanning**: Printable ASCII runs with their file offsets
//! - **Project Output**: Bank splits, an assembler layout, and vector listings on disk
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use snes_recon::{analyze_bytes, analyze_file};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Analyze a file
//!     let report = analyze_file("path/to/game.sfc")?;
//!     println!("Mapping: {}", report.header.mapping);
//!     println!("Title: {}", report.header.title);
//!     for line in report.disassembly.listing() {
//!         println!("{line}");
//!     }
//!
//!     // Analyze raw bytes
//!     let bytes = std::fs::read("path/to/game.sfc")?;
//!     let report = analyze_bytes(&bytes);
//!     println!("Calls: {:?}", report.disassembly.calls);
//!     Ok(())
//! }
//! ```
//!
//! # Failure model
//!
//! Analysis of an in-memory image never fails. A header that does not fit
//! is scored out, unknown opcodes become opaque bytes, and a cut-off
//! instruction stops the sweep with a truncated record. Only reading and
//! writing files returns errors.

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::similar_names)]
#![allow(clippy::too_many_lines)]

pub mod architectures;
pub mod disasm;
pub mod error;
pub mod formats;
pub mod formatter;
pub mod heuristics;
pub mod mapping;
pub mod project;
pub mod strings;
pub mod types;

pub use disasm::{
    disassemble, ControlFlowTarget, DecodedInstruction, DisasmLine, Disassembly, HaltReason,
    LinearDisassembler, TargetKind,
};
pub use error::{ReconError, Result};
pub use heuristics::{locate_header, HeaderCandidate, HeaderLocation};
pub use strings::{extract_ascii, AsciiString};
pub use types::{
    AnalysisOptions, AnalysisReport, BankInfo, HeaderRecord, MemoryMapping, Note, NoteLevel,
    VectorTable,
};

use std::path::Path;
use tracing::debug;

/// Analyze a cartridge image file by path.
///
/// # Errors
///
/// Returns [`ReconError::Io`] if the file cannot be read.
///
/// # Example
///
/// ```rust,no_run
/// use snes_recon::analyze_file;
///
/// let report = analyze_file("game.sfc")?;
/// println!("{} at 0x{:06X}", report.header.mapping, report.header.header_offset);
/// # Ok::<(), snes_recon::ReconError>(())
/// ```
pub fn analyze_file<P: AsRef<Path>>(path: P) -> Result<AnalysisReport> {
    let data = std::fs::read(path)?;
    Ok(analyze_bytes(&data))
}

/// Analyze a cartridge image held in memory, with default options.
///
/// # Example
///
/// ```rust
/// use snes_recon::{analyze_bytes, MemoryMapping};
///
/// // Too short for either header: the low mapping is the default.
/// let report = analyze_bytes(&[]);
/// assert_eq!(report.header.mapping, MemoryMapping::LoRom);
/// assert!(report.disassembly.lines.is_empty());
/// ```
pub fn analyze_bytes(data: &[u8]) -> AnalysisReport {
    analyze_bytes_with_options(data, &AnalysisOptions::new())
}

/// Analyze a cartridge image with custom options.
///
/// Runs header location, header parsing, bank layout, one linear sweep
/// from the reset vector (or `options.entry_override`) and, when enabled,
/// the ASCII scan. Observations worth a reader's attention are collected
/// as [`Note`]s.
///
/// # Example
///
/// ```rust
/// use snes_recon::{analyze_bytes_with_options, AnalysisOptions};
///
/// let options = AnalysisOptions {
///     entry_override: Some(0x8000),
///     ..AnalysisOptions::fast()
/// };
/// let report = analyze_bytes_with_options(&[0x78, 0x60], &options);
/// assert_eq!(report.disassembly.listing(), vec!["8000: sei", "8001: rts"]);
/// ```
pub fn analyze_bytes_with_options(data: &[u8], options: &AnalysisOptions) -> AnalysisReport {
    let location = heuristics::locate_header(data);
    let header = formats::snes::parse_header(data, location.mapping, location.offset);
    let banks = mapping::bank_layout(data.len(), location.mapping);

    let entry = options
        .entry_override
        .unwrap_or_else(|| header.reset_entry());
    let disassembly = disasm::disassemble(data, entry, options.max_disasm_bytes);

    let strings = if options.scan_strings {
        strings::extract_ascii(data, options.min_string_len)
    } else {
        Vec::new()
    };

    let notes = collect_notes(&location, &header, &disassembly, options);

    debug!(
        mapping = %header.mapping,
        banks = banks.len(),
        records = disassembly.lines.len(),
        strings = strings.len(),
        "analysis complete"
    );

    AnalysisReport {
        header,
        location,
        banks,
        disassembly,
        strings,
        notes,
    }
}

fn collect_notes(
    location: &HeaderLocation,
    header: &HeaderRecord,
    disassembly: &Disassembly,
    options: &AnalysisOptions,
) -> Vec<Note> {
    let mut notes = Vec::new();

    if location.both_disqualified() {
        notes.push(Note::warning(
            "image too short for either header; assuming LoROM",
        ));
    }

    if !header.checksum_pair_valid() {
        notes.push(Note::warning(format!(
            "checksum ${:04X} and complement ${:04X} are not inverses",
            header.checksum, header.checksum_complement
        )));
    }

    let source = if options.entry_override.is_some() {
        "override"
    } else {
        "emulation reset vector"
    };
    notes.push(Note::info(format!(
        "sweep entry ${:04X} from {} (file offset 0x{:06X})",
        disassembly.entry, source, disassembly.start_offset
    )));

    if disassembly.halt == HaltReason::Truncated {
        notes.push(Note::warning(format!(
            "sweep stopped on a truncated instruction after {} bytes",
            disassembly.bytes_consumed
        )));
    } else {
        notes.push(Note::info(format!(
            "sweep stopped at {} after {} bytes",
            disassembly.halt, disassembly.bytes_consumed
        )));
    }

    let opaque = disassembly.opaque_count();
    if opaque > 0 {
        notes.push(Note::info(format!("{opaque} opaque bytes left for manual review")));
    }

    notes
}

/// Get version information for this library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::snes::{layout, TITLE_LEN};
    use pretty_assertions::assert_eq;

    fn put_u16(data: &mut [u8], at: usize, value: u16) {
        data[at..at + 2].copy_from_slice(&value.to_le_bytes());
    }

    /// 64 KiB image with a consistent LoROM header and a short reset routine.
    fn lorom_image() -> Vec<u8> {
        let mut data = vec![0u8; 0x10000];
        let base = 0x7FC0;
        data[base..base + TITLE_LEN].fill(b' ');
        data[base..base + 10].copy_from_slice(b"LOROM TEST");
        data[base + layout::MAP_MODE] = 0x20;
        put_u16(&mut data, base + layout::CHECKSUM_COMPLEMENT, 0x0F0F);
        put_u16(&mut data, base + layout::CHECKSUM, 0xF0F0);
        put_u16(&mut data, base + layout::EMULATION_RESET, 0x8000);

        #[rustfmt::skip]
        let code = [
            0x78,                   // sei
            0x18,                   // clc
            0xFB,                   // xce
            0xC2, 0x30,             // rep #$30
            0xA9, 0x00, 0x00,       // lda #$0000
            0xA2, 0xFF, 0x1F,       // ldx #$1FFF
            0x9A,                   // txs
            0xE2, 0x20,             // sep #$20
            0xA9, 0x80,             // lda #$80
            0x8D, 0x00, 0x21,       // sta $2100
            0x22, 0x5B, 0x84, 0x00, // jsl $00845B
            0x20, 0x00, 0x90,       // jsr $9000
            0x80, 0xFE,             // bra $801A
        ];
        data[..code.len()].copy_from_slice(&code);
        data
    }

    #[test]
    fn test_version() {
        let v = version();
        assert!(!v.is_empty());
    }

    #[test]
    fn test_analyze_lorom_image() {
        let data = lorom_image();
        let report = analyze_bytes(&data);

        assert_eq!(report.header.mapping, MemoryMapping::LoRom);
        assert_eq!(report.header.header_offset, 0x7FC0);
        assert_eq!(report.header.title, "LOROM TEST");
        assert_eq!(report.location.lorom.score, 22);
        assert_eq!(report.banks.len(), 2);
        assert_eq!(report.banks[0].org, 0x8000);

        let listing = report.disassembly.listing();
        assert_eq!(listing[0], "8000: sei");
        assert_eq!(listing[4], "8005: lda #$0000");
        assert_eq!(listing[5], "8008: ldx #$1FFF");
        assert_eq!(listing[8], "800E: lda #$80");

        let calls: Vec<_> = report.disassembly.calls.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(calls, vec!["JSL $00845B", "JSR $9000"]);
        let branches: Vec<_> = report
            .disassembly
            .branches
            .iter()
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(branches, vec!["BRA $801A"]);
    }

    #[test]
    fn test_analyze_hirom_image() {
        let mut data = vec![0u8; 0x20000];
        let base = 0xFFC0;
        data[base..base + TITLE_LEN].fill(b' ');
        data[base..base + 5].copy_from_slice(b"HIGH!");
        data[base + layout::MAP_MODE] = 0x21;
        put_u16(&mut data, base + layout::CHECKSUM_COMPLEMENT, 0x0000);
        put_u16(&mut data, base + layout::CHECKSUM, 0xFFFF);
        put_u16(&mut data, base + layout::EMULATION_RESET, 0x8000);
        // The LoROM block has a non-printable title and no plausible reset.
        data[0x7FC0..0x8000].fill(0x01);

        let report = analyze_bytes(&data);
        assert_eq!(report.header.mapping, MemoryMapping::HiRom);
        assert_eq!(report.header.title, "HIGH!");
        assert_eq!(report.banks.len(), 2);
        assert_eq!(report.banks[1].org, 0x0000);
        assert!(report.notes.iter().all(|n| n.level == NoteLevel::Info));
    }

    #[test]
    fn test_analyze_empty_image() {
        let report = analyze_bytes(&[]);
        assert_eq!(report.header.mapping, MemoryMapping::LoRom);
        assert_eq!(report.header.title, "");
        assert!(report.banks.is_empty());
        assert!(report.disassembly.lines.is_empty());
        assert!(report.strings.is_empty());
        assert!(report
            .notes
            .iter()
            .any(|n| n.level == NoteLevel::Warning && n.message.contains("too short")));
    }

    #[test]
    fn test_checksum_warning() {
        let mut data = lorom_image();
        put_u16(&mut data, 0x7FC0 + layout::CHECKSUM, 0x1234);
        let report = analyze_bytes(&data);
        assert!(report
            .notes
            .iter()
            .any(|n| n.level == NoteLevel::Warning && n.message.contains("checksum")));
    }

    #[test]
    fn test_entry_override_and_budget() {
        let data = lorom_image();
        let options = AnalysisOptions {
            entry_override: Some(0x8003),
            max_disasm_bytes: 4,
            scan_strings: false,
            ..AnalysisOptions::new()
        };
        let report = analyze_bytes_with_options(&data, &options);
        assert_eq!(report.disassembly.entry, 0x8003);
        assert_eq!(report.disassembly.listing()[0], "8003: rep #$30");
        // rep (2 bytes) then lda #$0000 needs 3 but only 2 remain.
        assert_eq!(report.disassembly.halt, HaltReason::Truncated);
        assert!(report.strings.is_empty());
        assert!(report
            .notes
            .iter()
            .any(|n| n.level == NoteLevel::Warning && n.message.contains("truncated")));
    }

    #[test]
    fn test_strings_scanned_by_default() {
        let report = analyze_bytes(&lorom_image());
        assert!(report
            .strings
            .iter()
            .any(|s| s.offset == 0x7FC0 && s.text.starts_with("LOROM TEST")));
    }

    #[test]
    fn test_analysis_is_repeatable() {
        let data = lorom_image();
        let first = analyze_bytes(&data);
        let second = analyze_bytes(&data);
        assert_eq!(first.disassembly, second.disassembly);
        assert_eq!(first.header, second.header);
    }

    #[test]
    fn test_analyze_file() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), lorom_image()).unwrap();
        let report = analyze_file(tmp.path()).unwrap();
        assert_eq!(report.header.title, "LOROM TEST");

        let missing = analyze_file(tmp.path().with_extension("missing"));
        assert!(matches!(missing, Err(ReconError::Io(_))));
    }
}
