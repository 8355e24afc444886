//! Output formatters for analysis reports.
//!
//! This module provides trait-based formatters for rendering analysis
//! results in various output formats (human-readable, JSON, compact).

use crate::disasm::Disassembly;
use crate::heuristics::{HeaderCandidate, HeaderLocation};
use crate::strings::AsciiString;
use crate::types::{AnalysisReport, BankInfo, HeaderRecord, Note, NoteLevel};
use std::path::Path;

/// Trait for formatting analysis reports.
///
/// Implementors provide methods for rendering each component of a report,
/// plus a method to render the complete report.
pub trait ReportFormatter {
    /// Format the file path header.
    fn format_file(&self, path: &Path) -> String;

    /// Format the mapping decision and both candidate scores.
    fn format_mapping(&self, location: &HeaderLocation) -> Option<String>;

    /// Format the parsed header fields.
    fn format_header(&self, header: &HeaderRecord) -> Option<String>;

    /// Format the bank split layout.
    fn format_banks(&self, banks: &[BankInfo]) -> Option<String>;

    /// Format the sweep listing.
    fn format_disassembly(&self, disasm: &Disassembly) -> Option<String>;

    /// Format the call and branch reference lists.
    fn format_references(&self, disasm: &Disassembly) -> Option<String>;

    /// Format the ASCII scan results.
    fn format_strings(&self, strings: &[AsciiString]) -> Option<String>;

    /// Format analysis notes.
    fn format_notes(&self, notes: &[Note]) -> Option<String>;

    /// Format the complete report.
    ///
    /// Default implementation concatenates all component outputs.
    fn format_report(&self, report: &AnalysisReport, path: &Path) -> String {
        let mut parts = vec![self.format_file(path)];

        parts.extend(self.format_mapping(&report.location));
        parts.extend(self.format_header(&report.header));
        parts.extend(self.format_banks(&report.banks));
        parts.extend(self.format_disassembly(&report.disassembly));
        parts.extend(self.format_references(&report.disassembly));
        parts.extend(self.format_strings(&report.strings));
        parts.extend(self.format_notes(&report.notes));

        parts.join("")
    }
}

/// Human-readable output formatter.
#[derive(Debug, Clone)]
pub struct HumanFormatter {
    /// Show verbose output (candidate signals, every string, info notes)
    pub verbose: bool,
    /// Quiet mode (minimal output)
    pub quiet: bool,
    /// Maximum listing lines to print
    pub lines: usize,
}

impl Default for HumanFormatter {
    fn default() -> Self {
        Self {
            verbose: false,
            quiet: false,
            lines: 20,
        }
    }
}

impl HumanFormatter {
    /// Create a new human formatter with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a verbose formatter.
    pub fn verbose() -> Self {
        Self {
            verbose: true,
            ..Self::default()
        }
    }

    /// Create a quiet formatter.
    pub fn quiet() -> Self {
        Self {
            quiet: true,
            ..Self::default()
        }
    }

    /// Limit the listing to `lines` records.
    #[must_use]
    pub fn with_lines(mut self, lines: usize) -> Self {
        self.lines = lines;
        self
    }
}

fn candidate_line(c: &HeaderCandidate, verbose: bool) -> String {
    let mut s = if c.is_disqualified() {
        format!("    {:<6} @ 0x{:06X}: does not fit", c.mapping, c.offset)
    } else {
        format!("    {:<6} @ 0x{:06X}: score {}", c.mapping, c.offset, c.score)
    };
    if verbose && !c.signals.is_empty() {
        s.push_str(&format!(" [{}]", c.signals.names().join(", ")));
    }
    s.push('\n');
    s
}

impl ReportFormatter for HumanFormatter {
    fn format_file(&self, path: &Path) -> String {
        if self.quiet {
            String::new()
        } else {
            format!("File: {}\n", path.display())
        }
    }

    fn format_mapping(&self, location: &HeaderLocation) -> Option<String> {
        if self.quiet {
            return Some(format!("{}\n", location.mapping));
        }
        let mut s = format!("  Mapping:    {}\n", location.mapping);
        s.push_str(&candidate_line(&location.lorom, self.verbose));
        s.push_str(&candidate_line(&location.hirom, self.verbose));
        Some(s)
    }

    fn format_header(&self, header: &HeaderRecord) -> Option<String> {
        if self.quiet {
            return None;
        }
        let mut s = String::new();
        s.push_str(&format!("  Header:     0x{:06X}\n", header.header_offset));
        s.push_str(&format!("  Title:      {}\n", header.title));
        s.push_str(&format!("  Map mode:   ${:02X}\n", header.map_mode));
        s.push_str(&format!(
            "  Checksum:   ${:04X} / ${:04X}{}\n",
            header.checksum,
            header.checksum_complement,
            if header.checksum_pair_valid() {
                ""
            } else {
                " (inconsistent)"
            }
        ));
        s.push_str(&format!("  Reset:      ${:04X}\n", header.reset_entry()));
        if self.verbose {
            s.push_str(&format!(
                "  Type:       ${:02X}  ROM ${:02X}  SRAM ${:02X}  Region ${:02X}  Dev ${:02X}  Ver {}\n",
                header.rom_type,
                header.rom_size_byte,
                header.sram_size_byte,
                header.region,
                header.developer_id,
                header.version
            ));
            for (label, table) in [
                ("Native", &header.native_vectors),
                ("Emulation", &header.emulation_vectors),
            ] {
                let vectors: Vec<String> = table
                    .iter()
                    .map(|(name, value)| format!("{name}=${value:04X}"))
                    .collect();
                s.push_str(&format!("  {:<11} {}\n", format!("{label}:"), vectors.join(" ")));
            }
        }
        Some(s)
    }

    fn format_banks(&self, banks: &[BankInfo]) -> Option<String> {
        if self.quiet {
            return None;
        }
        let mut s = format!("  Banks:      {}\n", banks.len());
        if self.verbose {
            for bank in banks {
                s.push_str(&format!(
                    "    BANK{:02X} 0x{:06X}+0x{:X} org ${:04X}\n",
                    bank.index, bank.file_offset, bank.len, bank.org
                ));
            }
        }
        Some(s)
    }

    fn format_disassembly(&self, disasm: &Disassembly) -> Option<String> {
        if self.quiet || self.lines == 0 {
            return None;
        }
        let mut s = format!(
            "  Listing from ${:04X} ({} records, {}):\n",
            disasm.entry,
            disasm.lines.len(),
            disasm.halt
        );
        for line in disasm.lines.iter().take(self.lines) {
            s.push_str(&format!("    {line}\n"));
        }
        if disasm.lines.len() > self.lines {
            s.push_str(&format!("    ... {} more\n", disasm.lines.len() - self.lines));
        }
        Some(s)
    }

    fn format_references(&self, disasm: &Disassembly) -> Option<String> {
        if self.quiet {
            return None;
        }
        let join = |targets: &[crate::disasm::ControlFlowTarget]| {
            if targets.is_empty() {
                "-".to_string()
            } else {
                targets
                    .iter()
                    .map(|t| t.text.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            }
        };
        Some(format!(
            "  Calls:      {}\n  Branches:   {}\n",
            join(&disasm.calls),
            join(&disasm.branches)
        ))
    }

    fn format_strings(&self, strings: &[AsciiString]) -> Option<String> {
        if strings.is_empty() || self.quiet {
            return None;
        }
        let mut s = format!("  Strings:    {}\n", strings.len());
        let shown = if self.verbose { strings.len() } else { 5 };
        for string in strings.iter().take(shown) {
            s.push_str(&format!("    {string}\n"));
        }
        Some(s)
    }

    fn format_notes(&self, notes: &[Note]) -> Option<String> {
        // Only show warnings unless verbose
        let to_show: Vec<_> = notes
            .iter()
            .filter(|n| self.verbose || n.level != NoteLevel::Info)
            .collect();

        if to_show.is_empty() {
            return None;
        }

        let mut s = String::new();
        for note in to_show {
            let prefix = match note.level {
                NoteLevel::Info => "  [info]",
                NoteLevel::Warning => "  [warn]",
            };
            s.push_str(&format!("{} {}\n", prefix, note.message));
        }
        Some(s)
    }

    fn format_report(&self, report: &AnalysisReport, path: &Path) -> String {
        if self.quiet {
            // Quiet mode: just "path: mapping"
            return format!("{}: {}\n", path.display(), report.location.mapping);
        }

        let mut parts = vec![self.format_file(path)];
        parts.extend(self.format_mapping(&report.location));
        parts.extend(self.format_header(&report.header));
        parts.extend(self.format_banks(&report.banks));
        parts.extend(self.format_disassembly(&report.disassembly));
        parts.extend(self.format_references(&report.disassembly));
        parts.extend(self.format_strings(&report.strings));
        parts.extend(self.format_notes(&report.notes));

        parts.push(String::from("\n")); // Trailing newline
        parts.join("")
    }
}

/// JSON output formatter.
#[derive(Debug, Clone)]
pub struct JsonFormatter {
    /// Pretty-print JSON
    pub pretty: bool,
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl JsonFormatter {
    /// Create a new JSON formatter with pretty printing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a compact JSON formatter.
    pub fn compact() -> Self {
        Self { pretty: false }
    }
}

impl ReportFormatter for JsonFormatter {
    fn format_file(&self, _path: &Path) -> String {
        String::new() // Handled in format_report
    }

    fn format_mapping(&self, _location: &HeaderLocation) -> Option<String> {
        None
    }

    fn format_header(&self, _header: &HeaderRecord) -> Option<String> {
        None
    }

    fn format_banks(&self, _banks: &[BankInfo]) -> Option<String> {
        None
    }

    fn format_disassembly(&self, _disasm: &Disassembly) -> Option<String> {
        None
    }

    fn format_references(&self, _disasm: &Disassembly) -> Option<String> {
        None
    }

    fn format_strings(&self, _strings: &[AsciiString]) -> Option<String> {
        None
    }

    fn format_notes(&self, _notes: &[Note]) -> Option<String> {
        None
    }

    fn format_report(&self, report: &AnalysisReport, path: &Path) -> String {
        #[derive(serde::Serialize)]
        struct JsonOutput<'a> {
            file: String,
            #[serde(flatten)]
            report: &'a AnalysisReport,
            listing: Vec<String>,
        }

        let output = JsonOutput {
            file: path.display().to_string(),
            report,
            listing: report.disassembly.listing(),
        };

        if self.pretty {
            serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
        } else {
            serde_json::to_string(&output).unwrap_or_else(|_| "{}".to_string())
        }
    }
}

/// Compact single-line output formatter.
#[derive(Debug, Clone, Default)]
pub struct ShortFormatter;

impl ShortFormatter {
    /// Create a new short formatter.
    pub fn new() -> Self {
        Self
    }
}

impl ReportFormatter for ShortFormatter {
    fn format_file(&self, _path: &Path) -> String {
        String::new() // Handled in format_report
    }

    fn format_mapping(&self, _location: &HeaderLocation) -> Option<String> {
        None
    }

    fn format_header(&self, _header: &HeaderRecord) -> Option<String> {
        None
    }

    fn format_banks(&self, _banks: &[BankInfo]) -> Option<String> {
        None
    }

    fn format_disassembly(&self, _disasm: &Disassembly) -> Option<String> {
        None
    }

    fn format_references(&self, _disasm: &Disassembly) -> Option<String> {
        None
    }

    fn format_strings(&self, _strings: &[AsciiString]) -> Option<String> {
        None
    }

    fn format_notes(&self, _notes: &[Note]) -> Option<String> {
        None
    }

    fn format_report(&self, report: &AnalysisReport, path: &Path) -> String {
        let disasm = &report.disassembly;
        format!(
            "{}\t{}\t{}\t${:04X}\t{}\t{}/{}\n",
            path.display(),
            report.location.mapping,
            report.header.title,
            disasm.entry,
            disasm.lines.len(),
            disasm.calls.len(),
            disasm.branches.len()
        )
    }
}
