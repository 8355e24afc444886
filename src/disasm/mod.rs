//! Linear 65C816 disassembly from a single entry point.
//!
//! The sweep walks bank 0 of a low-mapped image byte by byte:
//! - catalogued opcodes decode using the current register widths
//! - unmapped bytes are emitted as one-byte opaque records
//! - an instruction that would run past the byte budget or the image is
//!   emitted as a truncated record and ends the sweep
//! - a return instruction ends the sweep after being emitted
//!
//! Discovered jump targets are collected, never followed.

pub mod operand;
pub mod refs;

use serde::Serialize;
use std::fmt;
use tracing::{debug, trace};

use crate::architectures::w65c816::{lookup, AddressingMode, OpKind, WidthState};
use crate::mapping::to_file_offset;
use crate::types::MemoryMapping;

pub use operand::{branch_target, format_operand, target_address};
pub use refs::{ControlFlowTarget, ReferenceCollector, TargetKind};

/// Why a sweep stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HaltReason {
    /// Hit `rts`, `rtl` or `rti`
    Returned,
    /// An instruction's operand bytes ran past the budget or the image
    Truncated,
    /// Consumed the whole byte budget
    EndOfBudget,
}

impl fmt::Display for HaltReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HaltReason::Returned => "return instruction",
            HaltReason::Truncated => "truncated instruction",
            HaltReason::EndOfBudget => "end of byte budget",
        };
        f.write_str(s)
    }
}

/// One decoded instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedInstruction {
    /// Program counter of the opcode
    pub address: u16,
    /// Opcode and operand bytes
    pub bytes: Vec<u8>,
    /// Lower-case mnemonic
    pub mnemonic: &'static str,
    /// Addressing mode
    pub mode: AddressingMode,
    /// Formatted operand (empty for implied instructions)
    pub operand: String,
}

impl DecodedInstruction {
    /// Total length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false: an instruction has at least its opcode byte.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// One record of the sweep output, in program order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DisasmLine {
    /// A catalogued instruction
    Instruction(DecodedInstruction),
    /// An unmapped opcode byte
    Opaque {
        /// Program counter of the byte
        address: u16,
        /// The byte itself
        byte: u8,
    },
    /// The bytes of an instruction cut short by the budget or the image
    Truncated {
        /// Program counter of the opcode
        address: u16,
        /// Bytes actually present
        bytes: Vec<u8>,
    },
}

impl DisasmLine {
    /// Program counter of the record.
    pub fn address(&self) -> u16 {
        match self {
            DisasmLine::Instruction(insn) => insn.address,
            DisasmLine::Opaque { address, .. } | DisasmLine::Truncated { address, .. } => *address,
        }
    }

    /// Number of image bytes the record covers.
    pub fn byte_len(&self) -> usize {
        match self {
            DisasmLine::Instruction(insn) => insn.len(),
            DisasmLine::Opaque { .. } => 1,
            DisasmLine::Truncated { bytes, .. } => bytes.len(),
        }
    }

    /// Raw bytes as upper-case hex, e.g. `A912`.
    pub fn hex_bytes(&self) -> String {
        match self {
            DisasmLine::Instruction(insn) => hex::encode_upper(&insn.bytes),
            DisasmLine::Opaque { byte, .. } => hex::encode_upper([*byte]),
            DisasmLine::Truncated { bytes, .. } => hex::encode_upper(bytes),
        }
    }
}

impl fmt::Display for DisasmLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisasmLine::Instruction(insn) if insn.operand.is_empty() => {
                write!(f, "{:04X}: {}", insn.address, insn.mnemonic)
            }
            DisasmLine::Instruction(insn) => {
                write!(f, "{:04X}: {} {}", insn.address, insn.mnemonic, insn.operand)
            }
            DisasmLine::Opaque { address, byte } => write!(f, "{address:04X}: .byte ${byte:02X}"),
            DisasmLine::Truncated { address, bytes } => {
                write!(f, "{address:04X}: .byte")?;
                for (i, b) in bytes.iter().enumerate() {
                    let sep = if i == 0 { " " } else { ", " };
                    write!(f, "{sep}${b:02X}")?;
                }
                f.write_str(" ; truncated")
            }
        }
    }
}

/// Output of one linear sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Disassembly {
    /// Entry program counter
    pub entry: u16,
    /// File offset of the entry point
    pub start_offset: usize,
    /// Records in program order
    pub lines: Vec<DisasmLine>,
    /// Call and jump targets, deduplicated and sorted by text
    pub calls: Vec<ControlFlowTarget>,
    /// Branch targets, deduplicated and sorted by text
    pub branches: Vec<ControlFlowTarget>,
    /// Why the sweep stopped
    pub halt: HaltReason,
    /// Image bytes covered by `lines`
    pub bytes_consumed: usize,
    /// Register widths when the sweep stopped
    pub final_width: WidthState,
}

impl Disassembly {
    /// Listing text, one line per record.
    pub fn listing(&self) -> Vec<String> {
        self.lines.iter().map(ToString::to_string).collect()
    }

    /// Decoded instructions only.
    pub fn instructions(&self) -> impl Iterator<Item = &DecodedInstruction> {
        self.lines.iter().filter_map(|line| match line {
            DisasmLine::Instruction(insn) => Some(insn),
            _ => None,
        })
    }

    /// Number of opaque byte records.
    pub fn opaque_count(&self) -> usize {
        self.lines
            .iter()
            .filter(|line| matches!(line, DisasmLine::Opaque { .. }))
            .count()
    }
}

/// Single-pass linear disassembler over a borrowed image.
///
/// Holds no mutable state of its own; every [`run`](Self::run) starts a
/// fresh sweep with its own width state, so independent sweeps may run
/// concurrently over the same image.
#[derive(Debug, Clone, Copy)]
pub struct LinearDisassembler<'a> {
    data: &'a [u8],
    entry: u16,
    max_bytes: usize,
}

impl<'a> LinearDisassembler<'a> {
    /// Prepare a sweep from `entry` (bank 0) covering at most `max_bytes`.
    pub fn new(data: &'a [u8], entry: u16, max_bytes: usize) -> Self {
        Self {
            data,
            entry,
            max_bytes,
        }
    }

    /// Run the sweep to a halt.
    #[allow(clippy::cast_possible_truncation)]
    pub fn run(&self) -> Disassembly {
        let start = to_file_offset(MemoryMapping::LoRom, 0, self.entry);
        let end = self.data.len().min(start.saturating_add(self.max_bytes));

        debug!(
            entry = format_args!("${:04X}", self.entry),
            start_offset = start,
            budget = self.max_bytes,
            "starting linear sweep"
        );

        let mut width = WidthState::EMULATION;
        let mut refs = ReferenceCollector::new();
        let mut lines = Vec::new();
        let mut offset = start;

        let halt = loop {
            if offset >= end {
                break HaltReason::EndOfBudget;
            }

            let pc = self.entry.wrapping_add((offset - start) as u16);
            let opcode = self.data[offset];

            let Some(desc) = lookup(opcode) else {
                trace!(pc = format_args!("${pc:04X}"), opcode, "unmapped opcode");
                lines.push(DisasmLine::Opaque {
                    address: pc,
                    byte: opcode,
                });
                offset += 1;
                continue;
            };

            let len = desc.mode.instruction_len(width);
            if offset + len > end {
                lines.push(DisasmLine::Truncated {
                    address: pc,
                    bytes: self.data[offset..end].to_vec(),
                });
                offset = end;
                break HaltReason::Truncated;
            }

            let bytes = &self.data[offset..offset + len];
            let operand = &bytes[1..];
            let text = format_operand(desc.mode, operand, pc);

            let target_kind = match desc.kind {
                OpKind::Call => Some(TargetKind::SubroutineCall),
                OpKind::LongCall => Some(TargetKind::LongCall),
                OpKind::Jump => Some(TargetKind::Jump),
                OpKind::Branch => Some(TargetKind::Branch),
                _ => None,
            };
            if let Some(kind) = target_kind {
                if let Some(address) = target_address(desc.mode, operand, pc) {
                    refs.record(ControlFlowTarget::new(kind, address, desc.mnemonic, &text));
                }
            }

            match desc.kind {
                OpKind::ResetStatus => width.reset_bits(operand[0]),
                OpKind::SetStatus => width.set_bits(operand[0]),
                _ => {}
            }

            lines.push(DisasmLine::Instruction(DecodedInstruction {
                address: pc,
                bytes: bytes.to_vec(),
                mnemonic: desc.mnemonic,
                mode: desc.mode,
                operand: text,
            }));
            offset += len;

            if desc.kind == OpKind::Return {
                break HaltReason::Returned;
            }
        };

        debug!(
            %halt,
            records = lines.len(),
            bytes = offset.saturating_sub(start),
            "linear sweep halted"
        );

        let (calls, branches) = refs.finish();
        Disassembly {
            entry: self.entry,
            start_offset: start,
            lines,
            calls,
            branches,
            halt,
            bytes_consumed: offset.saturating_sub(start),
            final_width: width,
        }
    }
}

/// Run one linear sweep from `entry` over at most `max_bytes` bytes.
pub fn disassemble(data: &[u8], entry: u16, max_bytes: usize) -> Disassembly {
    LinearDisassembler::new(data, entry, max_bytes).run()
}
