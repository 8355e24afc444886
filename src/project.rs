//! Reverse-engineering project generation.
//!
//! Lays an analyzed image out on disk as a starting point for manual work:
//!
//! ```text
//! <out>/
//!   README.md
//!   code/
//!     banks/bank_XX.bin
//!     rom_layout.asm
//!     vectors.txt
//!     reset_disasm.asm
//!   assets/
//!     header.json
//!     strings_ascii.txt
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Result, ResultExt};
use crate::mapping::split_banks;
use crate::types::{AnalysisReport, HeaderRecord, VectorTable};

/// File name of one bank split, e.g. `bank_0A.bin`.
pub fn bank_file_name(index: usize) -> String {
    format!("bank_{index:02X}.bin")
}

/// Write the project tree for `data` into `out_dir`.
///
/// Directories are created as needed and existing files are overwritten.
/// Returns every file written, in creation order.
pub fn write_project(
    data: &[u8],
    report: &AnalysisReport,
    out_dir: &Path,
    rom_name: &str,
) -> Result<Vec<PathBuf>> {
    let code_dir = out_dir.join("code");
    let banks_dir = code_dir.join("banks");
    let assets_dir = out_dir.join("assets");

    fs::create_dir_all(&banks_dir).with_path(&banks_dir)?;
    fs::create_dir_all(&assets_dir).with_path(&assets_dir)?;

    let mut written = Vec::new();
    let header = &report.header;

    let header_json = serde_json::to_string_pretty(header)?;
    written.push(write_file(&assets_dir.join("header.json"), header_json)?);

    let mut strings = String::new();
    for s in &report.strings {
        strings.push_str(&format!("{s}\n"));
    }
    written.push(write_file(&assets_dir.join("strings_ascii.txt"), strings)?);

    let banks = split_banks(data, header.mapping);
    for (index, bank) in banks.iter().enumerate() {
        written.push(write_file(&banks_dir.join(bank_file_name(index)), *bank)?);
    }
    debug!(count = banks.len(), dir = %banks_dir.display(), "wrote bank splits");

    written.push(write_file(
        &code_dir.join("rom_layout.asm"),
        render_layout(report),
    )?);
    written.push(write_file(
        &code_dir.join("vectors.txt"),
        render_vectors(header),
    )?);
    written.push(write_file(
        &code_dir.join("reset_disasm.asm"),
        render_disassembly(report),
    )?);
    written.push(write_file(
        &out_dir.join("README.md"),
        render_readme(report, rom_name),
    )?);

    info!(files = written.len(), out = %out_dir.display(), "project written");
    Ok(written)
}

fn write_file(path: &Path, contents: impl AsRef<[u8]>) -> Result<PathBuf> {
    fs::write(path, contents).with_path(path)?;
    Ok(path.to_path_buf())
}

/// Assembler layout that includes every bank split at its origin.
pub fn render_layout(report: &AnalysisReport) -> String {
    let header = &report.header;
    let mut out = String::new();
    out.push_str("; Generated bank layout for reverse engineering.\n");
    out.push_str("; Each bank is split out for loading into a 65816 debugger or disassembler.\n");
    out.push_str(".cpu \"65816\"\n\n");
    out.push_str(&format!("; Detected mapping: {}\n", header.mapping));
    out.push_str(&format!("; Title: {}\n", header.title));
    out.push('\n');

    for bank in &report.banks {
        out.push_str(&format!(".segment \"BANK{:02X}\"\n", bank.index));
        out.push_str(&format!(".org ${:04X}\n", bank.org));
        out.push_str(&format!(".incbin \"banks/{}\"\n", bank_file_name(bank.index)));
        out.push('\n');
    }
    out
}

fn push_vectors(out: &mut String, section: &str, table: &VectorTable) {
    out.push_str(&format!("[{section}]\n"));
    for (name, value) in table.iter() {
        out.push_str(&format!("{name} = ${value:04X}\n"));
    }
    out.push('\n');
}

/// Native and emulation vector tables as an INI-style listing.
pub fn render_vectors(header: &HeaderRecord) -> String {
    let mut out = String::new();
    out.push_str("; Interrupt vectors from the cartridge header\n");
    out.push_str(&format!("; Header @ 0x{:06X}\n", header.header_offset));
    out.push('\n');
    push_vectors(&mut out, "native", &header.native_vectors);
    push_vectors(&mut out, "emulation", &header.emulation_vectors);
    out
}

/// The reset sweep listing followed by its reference lists.
pub fn render_disassembly(report: &AnalysisReport) -> String {
    let disasm = &report.disassembly;
    let mut out = String::new();
    out.push_str(&format!(
        "; Linear sweep from ${:04X} (file offset 0x{:06X})\n",
        disasm.entry, disasm.start_offset
    ));
    out.push_str(&format!(
        "; {} bytes, stopped at {}\n",
        disasm.bytes_consumed, disasm.halt
    ));
    out.push('\n');

    for line in &disasm.lines {
        out.push_str(&format!("{:<32}; {}\n", line.to_string(), line.hex_bytes()));
    }

    out.push_str("\n; Calls and jumps\n");
    for target in &disasm.calls {
        out.push_str(&format!(";   {target}\n"));
    }
    out.push_str("\n; Branches\n");
    for target in &disasm.branches {
        out.push_str(&format!(";   {target}\n"));
    }
    out
}

fn render_readme(report: &AnalysisReport, rom_name: &str) -> String {
    let header = &report.header;
    format!(
        "# Reverse-engineering workspace\n\
         \n\
         Generated from `{rom_name}` ({title}, {mapping}, {banks} banks).\n\
         \n\
         ## Contents\n\
         - `code/banks/*.bin`: the image split into {mapping} banks.\n\
         - `code/rom_layout.asm`: assembler layout that includes each bank.\n\
         - `code/vectors.txt`: native and emulation interrupt vectors.\n\
         - `code/reset_disasm.asm`: linear disassembly from the reset vector.\n\
         - `assets/header.json`: cartridge header fields.\n\
         - `assets/strings_ascii.txt`: printable ASCII runs with file offsets.\n\
         \n\
         ## Suggested workflow\n\
         1. Load the banks into a 65816 disassembler or debugger.\n\
         2. Start from the `reset` entry in `vectors.txt`.\n\
         3. Name routines and replace `.incbin` lines with commented assembly as you go.\n\
         \n\
         The bank files are derived data; regenerate them rather than committing them.\n",
        title = if header.title.is_empty() {
            "untitled"
        } else {
            header.title.as_str()
        },
        mapping = header.mapping,
        banks = report.banks.len(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze_bytes;
    use crate::formats::snes::layout;
    use tempfile::TempDir;

    fn sample_image() -> Vec<u8> {
        let mut data = vec![0u8; 0x10000];
        let base = 0x7FC0;
        data[base..base + 21].fill(b' ');
        data[base..base + 9].copy_from_slice(b"TEST CART");
        data[base + layout::MAP_MODE] = 0x20;
        data[base + layout::CHECKSUM_COMPLEMENT..base + layout::CHECKSUM_COMPLEMENT + 2]
            .copy_from_slice(&0x1234u16.to_le_bytes());
        data[base + layout::CHECKSUM..base + layout::CHECKSUM + 2]
            .copy_from_slice(&0xEDCBu16.to_le_bytes());
        data[base + layout::NATIVE_VECTORS + 6..base + layout::NATIVE_VECTORS + 8]
            .copy_from_slice(&0x8123u16.to_le_bytes());
        data[base + layout::EMULATION_RESET..base + layout::EMULATION_RESET + 2]
            .copy_from_slice(&0x8000u16.to_le_bytes());
        // sei; clc; xce; jsl $008100; rts
        data[..8].copy_from_slice(&[0x78, 0x18, 0xFB, 0x22, 0x00, 0x81, 0x00, 0x60]);
        data[0x200..0x20A].copy_from_slice(b"HELLO SNES");
        data
    }

    #[test]
    fn test_write_project_tree() {
        let tmp = TempDir::new().unwrap();
        let data = sample_image();
        let report = analyze_bytes(&data);
        let written = write_project(&data, &report, tmp.path(), "test.sfc").unwrap();

        // Two 32 KiB banks plus six generated files.
        assert_eq!(written.len(), 8);
        for path in &written {
            assert!(path.exists(), "{} missing", path.display());
        }

        let bank1 = fs::read(tmp.path().join("code/banks/bank_01.bin")).unwrap();
        assert_eq!(bank1.len(), 0x8000);
        assert_eq!(bank1, &data[0x8000..]);
    }

    #[test]
    fn test_layout_contents() {
        let data = sample_image();
        let report = analyze_bytes(&data);
        let layout = render_layout(&report);
        assert!(layout.contains(".cpu \"65816\""));
        assert!(layout.contains("; Detected mapping: LoROM"));
        assert!(layout.contains("; Title: TEST CART"));
        assert!(layout.contains(".segment \"BANK01\"\n.org $8000\n.incbin \"banks/bank_01.bin\""));
    }

    #[test]
    fn test_vectors_contents() {
        let data = sample_image();
        let report = analyze_bytes(&data);
        let vectors = render_vectors(&report.header);
        assert!(vectors.contains("; Header @ 0x007FC0"));
        assert!(vectors.contains("[native]\ncop = $0000\nbrk = $0000\nabort = $0000\nnmi = $8123\n"));
        assert!(vectors.contains("[emulation]\n"));
        assert!(vectors.contains("reset = $8000"));
    }

    #[test]
    fn test_disassembly_and_strings_files() {
        let tmp = TempDir::new().unwrap();
        let data = sample_image();
        let report = analyze_bytes(&data);
        write_project(&data, &report, tmp.path(), "test.sfc").unwrap();

        let asm = fs::read_to_string(tmp.path().join("code/reset_disasm.asm")).unwrap();
        assert!(asm.contains("8000: sei"));
        assert!(asm.contains("8003: jsl $008100"));
        assert!(asm.contains(";   JSL $008100"));

        let strings = fs::read_to_string(tmp.path().join("assets/strings_ascii.txt")).unwrap();
        assert!(strings.contains("0x000200: HELLO SNES"));
        assert!(strings.contains("0x007FC0: TEST CART"));

        let header: serde_json::Value = serde_json::from_str(
            &fs::read_to_string(tmp.path().join("assets/header.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(header["mapping"], "LoROM");
        assert_eq!(header["emulation_vectors"]["reset"], 0x8000);

        let readme = fs::read_to_string(tmp.path().join("README.md")).unwrap();
        assert!(readme.contains("`test.sfc`"));
    }

    #[test]
    fn test_unwritable_destination_reports_path() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("blocked");
        fs::write(&blocker, b"not a directory").unwrap();

        let data = sample_image();
        let report = analyze_bytes(&data);
        let err = write_project(&data, &report, &blocker, "test.sfc").unwrap_err();
        assert!(matches!(err, crate::ReconError::OutputPath { .. }));
    }
}
