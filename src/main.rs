//! SNES Recon CLI
//!
//! Command-line tool for inspecting SNES cartridge images and laying them
//! out as a reverse-engineering workspace.

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use snes_recon::formatter::{HumanFormatter, JsonFormatter, ReportFormatter, ShortFormatter};
use snes_recon::project::write_project;
use snes_recon::{analyze_bytes_with_options, AnalysisOptions};
use std::path::PathBuf;
use std::process::ExitCode;

/// SNES cartridge image analyzer.
///
/// Detects LoROM/HiROM mapping, parses the internal header, and
/// disassembles the reset routine. With `--out`, writes bank splits, an
/// assembler layout, and vector listings for further work.
#[derive(Parser, Debug)]
#[command(name = "snes-recon")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Cartridge image to analyze
    rom: PathBuf,

    /// Write a reverse-engineering project into this directory
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "human")]
    format: OutputFormat,

    /// Analysis mode
    #[arg(short, long, default_value = "normal")]
    mode: AnalysisMode,

    /// Disassembly byte budget (decimal, or hex with 0x or $)
    #[arg(long, value_parser = parse_number)]
    max_bytes: Option<usize>,

    /// Disassembly entry point instead of the reset vector (hex)
    #[arg(short, long, value_parser = parse_address)]
    entry: Option<u16>,

    /// Listing lines to show in human output
    #[arg(short, long, default_value_t = 20)]
    lines: usize,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode (only output essential info)
    #[arg(short, long)]
    quiet: bool,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
    /// Compact single-line output
    Short,
}

/// Analysis mode options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum AnalysisMode {
    /// Normal analysis (default)
    Normal,
    /// Fast analysis (short sweep, no string scan)
    Fast,
    /// Thorough analysis (sweep up to a full bank)
    Thorough,
}

fn parse_number(s: &str) -> Result<usize, String> {
    let s = s.trim();
    let parsed = if let Some(hex) = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .or_else(|| s.strip_prefix('$'))
    {
        usize::from_str_radix(hex, 16)
    } else {
        s.parse()
    };
    parsed.map_err(|e| format!("invalid number '{s}': {e}"))
}

fn parse_address(s: &str) -> Result<u16, String> {
    let s = s.trim();
    let hex = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .or_else(|| s.strip_prefix('$'))
        .unwrap_or(s);
    u16::from_str_radix(hex, 16).map_err(|e| format!("invalid address '{s}': {e}"))
}

impl Args {
    fn options(&self) -> AnalysisOptions {
        let mut opts = match self.mode {
            AnalysisMode::Normal => AnalysisOptions::new(),
            AnalysisMode::Fast => AnalysisOptions::fast(),
            AnalysisMode::Thorough => AnalysisOptions::thorough(),
        };
        if let Some(max) = self.max_bytes {
            opts.max_disasm_bytes = max;
        }
        opts.entry_override = self.entry;
        // The project always carries a strings listing.
        if self.out.is_some() {
            opts.scan_strings = true;
        }
        opts
    }

    fn formatter(&self) -> Box<dyn ReportFormatter> {
        match self.format {
            OutputFormat::Human => {
                let base = if self.quiet {
                    HumanFormatter::quiet()
                } else if self.verbose {
                    HumanFormatter::verbose()
                } else {
                    HumanFormatter::new()
                };
                Box::new(base.with_lines(self.lines))
            }
            OutputFormat::Json => Box::new(JsonFormatter::new()),
            OutputFormat::Short => Box::new(ShortFormatter::new()),
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging if verbose
    if args.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("snes_recon=debug")
            .with_writer(std::io::stderr)
            .init();
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if !args.quiet {
                eprintln!("Error: {e:#}");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    let options = args.options();
    options.validate()?;

    let data = std::fs::read(&args.rom)
        .with_context(|| format!("failed to read {}", args.rom.display()))?;
    if data.is_empty() && !args.quiet {
        eprintln!("warning: {} is empty", args.rom.display());
    }

    let report = analyze_bytes_with_options(&data, &options);
    let rendered = args.formatter().format_report(&report, &args.rom);
    if rendered.ends_with('\n') {
        print!("{rendered}");
    } else {
        println!("{rendered}");
    }

    if let Some(out) = &args.out {
        let rom_name = args
            .rom
            .file_name()
            .map_or_else(|| args.rom.display().to_string(), |n| n.to_string_lossy().into_owned());
        if out.is_file() {
            bail!("{} exists and is not a directory", out.display());
        }
        let written = write_project(&data, &report, out, &rom_name)
            .with_context(|| format!("failed to write project to {}", out.display()))?;
        if !args.quiet && args.format == OutputFormat::Human {
            println!("Wrote {} files to {}", written.len(), out.display());
        }
    }

    Ok(())
}
