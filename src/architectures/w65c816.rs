//! WDC 65C816 opcode catalogue and register-width tracking.
//!
//! The 65C816 is a 16-bit extension of the 6502 with:
//! - **Variable-length instructions**: 1 to 4 bytes, byte-aligned
//! - **Switchable register widths**: the accumulator (M flag) and the index
//!   registers (X flag) are each 8 or 16 bits wide, so an immediate operand's
//!   length depends on processor state rather than on the opcode alone
//! - **24-bit addressing**: bank byte + 16-bit address for long modes
//!
//! Only a subset of the instruction set is catalogued: the opcodes that
//! dominate typical reset/initialization code. Anything else is reported as
//! an opaque byte instead of being decoded with a guessed operand length.
//!
//! References:
//! - WDC W65C816S datasheet
//! - Eyes & Lichty, "Programming the 65816"

use bitflags::bitflags;
use serde::Serialize;

/// Operand addressing modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressingMode {
    /// No operand
    Implied,
    /// Always one immediate byte (`rep`/`sep`)
    Immediate8,
    /// Immediate sized by the accumulator width
    ImmediateM,
    /// Immediate sized by the index width
    ImmediateX,
    /// `$XX`
    Direct,
    /// `$XX,X`
    DirectX,
    /// `$XX,Y`
    DirectY,
    /// `($XX,X)`
    DirectXIndirect,
    /// `($XX),Y`
    DirectIndirectY,
    /// `$XXXX`
    Absolute,
    /// `$XXXX,X`
    AbsoluteX,
    /// `$XXXX,Y`
    AbsoluteY,
    /// `($XXXX)`
    AbsoluteIndirect,
    /// `$XXXXXX`
    Long,
    /// `$XXXXXX,X`
    LongX,
    /// Signed 8-bit displacement
    Relative8,
    /// Signed 16-bit displacement
    Relative16,
}

impl AddressingMode {
    /// Full instruction length (opcode included) under the given widths.
    pub fn instruction_len(self, width: WidthState) -> usize {
        use AddressingMode::*;

        match self {
            Implied => 1,
            Immediate8 => 2,
            ImmediateM => {
                if width.accumulator_8bit {
                    2
                } else {
                    3
                }
            }
            ImmediateX => {
                if width.index_8bit {
                    2
                } else {
                    3
                }
            }
            Direct | DirectX | DirectY | DirectXIndirect | DirectIndirectY | Relative8 => 2,
            Absolute | AbsoluteX | AbsoluteY | AbsoluteIndirect | Relative16 => 3,
            Long | LongX => 4,
        }
    }

    /// Whether the operand is a PC-relative displacement.
    pub fn is_relative(self) -> bool {
        matches!(self, AddressingMode::Relative8 | AddressingMode::Relative16)
    }
}

/// Control-flow role of an opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OpKind {
    /// Falls through to the next instruction
    Plain,
    /// `jsr`
    Call,
    /// `jsl`
    LongCall,
    /// `jmp` / `jml`
    Jump,
    /// Conditional or unconditional relative branch
    Branch,
    /// `rts` / `rtl` / `rti`
    Return,
    /// `rep`: clears status bits
    ResetStatus,
    /// `sep`: sets status bits
    SetStatus,
}

/// Catalogue entry for one opcode byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeDescriptor {
    /// Opcode byte
    pub opcode: u8,
    /// Lower-case mnemonic
    pub mnemonic: &'static str,
    /// Addressing mode
    pub mode: AddressingMode,
    /// Control-flow role
    pub kind: OpKind,
}

/// Catalogued opcodes.
pub mod opcodes {
    pub const SEI: u8 = 0x78;
    pub const CLC: u8 = 0x18;
    pub const XCE: u8 = 0xFB;
    pub const REP: u8 = 0xC2;
    pub const SEP: u8 = 0xE2;
    pub const LDA_IMM: u8 = 0xA9;
    pub const LDX_IMM: u8 = 0xA2;
    pub const BRA: u8 = 0x80;
    pub const BRL: u8 = 0x82;
    pub const BNE: u8 = 0xD0;
    pub const JSR: u8 = 0x20;
    pub const JSL: u8 = 0x22;
    pub const JMP: u8 = 0x4C;
    pub const JML: u8 = 0x5C;
    pub const JMP_IND: u8 = 0x6C;
    pub const RTS: u8 = 0x60;
    pub const RTL: u8 = 0x6B;
    pub const RTI: u8 = 0x40;
    pub const NOP: u8 = 0xEA;
}

use self::AddressingMode as M;
use self::OpKind as K;

const ENTRIES: &[(u8, &str, AddressingMode, OpKind)] = &[
    // Status and mode control
    (opcodes::CLC, "clc", M::Implied, K::Plain),
    (0x38, "sec", M::Implied, K::Plain),
    (0x58, "cli", M::Implied, K::Plain),
    (opcodes::SEI, "sei", M::Implied, K::Plain),
    (0xD8, "cld", M::Implied, K::Plain),
    (opcodes::XCE, "xce", M::Implied, K::Plain),
    (opcodes::REP, "rep", M::Immediate8, K::ResetStatus),
    (opcodes::SEP, "sep", M::Immediate8, K::SetStatus),
    (opcodes::NOP, "nop", M::Implied, K::Plain),
    // Loads
    (opcodes::LDA_IMM, "lda", M::ImmediateM, K::Plain),
    (0xA5, "lda", M::Direct, K::Plain),
    (0xB5, "lda", M::DirectX, K::Plain),
    (0xA1, "lda", M::DirectXIndirect, K::Plain),
    (0xB1, "lda", M::DirectIndirectY, K::Plain),
    (0xAD, "lda", M::Absolute, K::Plain),
    (0xBD, "lda", M::AbsoluteX, K::Plain),
    (0xB9, "lda", M::AbsoluteY, K::Plain),
    (0xAF, "lda", M::Long, K::Plain),
    (0xBF, "lda", M::LongX, K::Plain),
    (opcodes::LDX_IMM, "ldx", M::ImmediateX, K::Plain),
    (0xA6, "ldx", M::Direct, K::Plain),
    (0xB6, "ldx", M::DirectY, K::Plain),
    (0xAE, "ldx", M::Absolute, K::Plain),
    (0xA0, "ldy", M::ImmediateX, K::Plain),
    (0xA4, "ldy", M::Direct, K::Plain),
    (0xAC, "ldy", M::Absolute, K::Plain),
    // Stores
    (0x85, "sta", M::Direct, K::Plain),
    (0x95, "sta", M::DirectX, K::Plain),
    (0x81, "sta", M::DirectXIndirect, K::Plain),
    (0x91, "sta", M::DirectIndirectY, K::Plain),
    (0x8D, "sta", M::Absolute, K::Plain),
    (0x9D, "sta", M::AbsoluteX, K::Plain),
    (0x99, "sta", M::AbsoluteY, K::Plain),
    (0x8F, "sta", M::Long, K::Plain),
    (0x9F, "sta", M::LongX, K::Plain),
    (0x86, "stx", M::Direct, K::Plain),
    (0x96, "stx", M::DirectY, K::Plain),
    (0x8E, "stx", M::Absolute, K::Plain),
    (0x84, "sty", M::Direct, K::Plain),
    (0x8C, "sty", M::Absolute, K::Plain),
    (0x64, "stz", M::Direct, K::Plain),
    (0x74, "stz", M::DirectX, K::Plain),
    (0x9C, "stz", M::Absolute, K::Plain),
    (0x9E, "stz", M::AbsoluteX, K::Plain),
    // Compare and arithmetic immediates
    (0xC9, "cmp", M::ImmediateM, K::Plain),
    (0xE0, "cpx", M::ImmediateX, K::Plain),
    (0xC0, "cpy", M::ImmediateX, K::Plain),
    (0x29, "and", M::ImmediateM, K::Plain),
    (0x09, "ora", M::ImmediateM, K::Plain),
    (0x69, "adc", M::ImmediateM, K::Plain),
    (0xE9, "sbc", M::ImmediateM, K::Plain),
    // Register transfers and counters
    (0xAA, "tax", M::Implied, K::Plain),
    (0xA8, "tay", M::Implied, K::Plain),
    (0x9A, "txs", M::Implied, K::Plain),
    (0x1B, "tcs", M::Implied, K::Plain),
    (0x5B, "tcd", M::Implied, K::Plain),
    (0xE8, "inx", M::Implied, K::Plain),
    (0xC8, "iny", M::Implied, K::Plain),
    (0xCA, "dex", M::Implied, K::Plain),
    (0x88, "dey", M::Implied, K::Plain),
    // Stack
    (0x48, "pha", M::Implied, K::Plain),
    (0x68, "pla", M::Implied, K::Plain),
    (0x08, "php", M::Implied, K::Plain),
    (0x28, "plp", M::Implied, K::Plain),
    (0x4B, "phk", M::Implied, K::Plain),
    (0x8B, "phb", M::Implied, K::Plain),
    (0xAB, "plb", M::Implied, K::Plain),
    (0x0B, "phd", M::Implied, K::Plain),
    (0x2B, "pld", M::Implied, K::Plain),
    (0xDA, "phx", M::Implied, K::Plain),
    (0xFA, "plx", M::Implied, K::Plain),
    (0x5A, "phy", M::Implied, K::Plain),
    (0x7A, "ply", M::Implied, K::Plain),
    // Branches
    (0x10, "bpl", M::Relative8, K::Branch),
    (0x30, "bmi", M::Relative8, K::Branch),
    (0x50, "bvc", M::Relative8, K::Branch),
    (0x70, "bvs", M::Relative8, K::Branch),
    (0x90, "bcc", M::Relative8, K::Branch),
    (0xB0, "bcs", M::Relative8, K::Branch),
    (opcodes::BNE, "bne", M::Relative8, K::Branch),
    (0xF0, "beq", M::Relative8, K::Branch),
    (opcodes::BRA, "bra", M::Relative8, K::Branch),
    (opcodes::BRL, "brl", M::Relative16, K::Branch),
    // Jumps and calls
    (opcodes::JMP, "jmp", M::Absolute, K::Jump),
    (opcodes::JMP_IND, "jmp", M::AbsoluteIndirect, K::Jump),
    (opcodes::JML, "jml", M::Long, K::Jump),
    (opcodes::JSR, "jsr", M::Absolute, K::Call),
    (opcodes::JSL, "jsl", M::Long, K::LongCall),
    // Returns
    (opcodes::RTS, "rts", M::Implied, K::Return),
    (opcodes::RTL, "rtl", M::Implied, K::Return),
    (opcodes::RTI, "rti", M::Implied, K::Return),
];

const fn build_table() -> [Option<OpcodeDescriptor>; 256] {
    let mut table: [Option<OpcodeDescriptor>; 256] = [None; 256];
    let mut i = 0;
    while i < ENTRIES.len() {
        let (opcode, mnemonic, mode, kind) = ENTRIES[i];
        table[opcode as usize] = Some(OpcodeDescriptor {
            opcode,
            mnemonic,
            mode,
            kind,
        });
        i += 1;
    }
    table
}

/// Opcode catalogue indexed by opcode byte. `None` marks an unmapped byte.
pub static OPCODE_TABLE: [Option<OpcodeDescriptor>; 256] = build_table();

/// Look up an opcode byte. `None` means "treat as an opaque byte".
pub fn lookup(opcode: u8) -> Option<&'static OpcodeDescriptor> {
    OPCODE_TABLE[usize::from(opcode)].as_ref()
}

/// Number of catalogued opcodes.
pub fn catalogued_count() -> usize {
    OPCODE_TABLE.iter().flatten().count()
}

bitflags! {
    /// Processor status bits that `rep`/`sep` act on for width control.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct WidthBits: u8 {
        /// X flag: index registers are 8-bit
        const INDEX_8 = 0x10;
        /// M flag: accumulator is 8-bit
        const ACCUMULATOR_8 = 0x20;
    }
}

/// Current accumulator and index register widths.
///
/// Owned by a single sweep; updated only by `rep` and `sep`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct WidthState {
    /// Accumulator is 8-bit (M set)
    pub accumulator_8bit: bool,
    /// Index registers are 8-bit (X set)
    pub index_8bit: bool,
}

impl Default for WidthState {
    fn default() -> Self {
        Self::EMULATION
    }
}

impl WidthState {
    /// State at the emulation-mode reset entry: both registers 8-bit.
    pub const EMULATION: Self = Self {
        accumulator_8bit: true,
        index_8bit: true,
    };

    /// Apply `rep #operand`: widen every register whose bit is set.
    pub fn reset_bits(&mut self, operand: u8) {
        let bits = WidthBits::from_bits_truncate(operand);
        if bits.contains(WidthBits::ACCUMULATOR_8) {
            self.accumulator_8bit = false;
        }
        if bits.contains(WidthBits::INDEX_8) {
            self.index_8bit = false;
        }
    }

    /// Apply `sep #operand`: narrow every register whose bit is set.
    pub fn set_bits(&mut self, operand: u8) {
        let bits = WidthBits::from_bits_truncate(operand);
        if bits.contains(WidthBits::ACCUMULATOR_8) {
            self.accumulator_8bit = true;
        }
        if bits.contains(WidthBits::INDEX_8) {
            self.index_8bit = true;
        }
    }
}
