//! Operand text formatting and target resolution.

use crate::architectures::w65c816::AddressingMode;
use crate::formats::{read_u16_le, read_u24_le};

/// Resolve a PC-relative branch.
///
/// The displacement is relative to the address after the whole
/// instruction; the result wraps within the 16-bit bank.
pub fn branch_target(pc: u16, instruction_len: u16, displacement: i16) -> u16 {
    pc.wrapping_add(instruction_len)
        .wrapping_add_signed(displacement)
}

/// Format an operand for display.
///
/// `operand` holds the bytes after the opcode. When they do not match the
/// shape the mode expects, the raw bytes are listed instead, so every mode
/// produces some text.
pub fn format_operand(mode: AddressingMode, operand: &[u8], pc: u16) -> String {
    use AddressingMode::*;

    match (mode, operand) {
        (Implied, []) => String::new(),
        (Immediate8 | ImmediateM | ImmediateX, [value]) => format!("#${value:02X}"),
        (ImmediateM | ImmediateX, [_, _]) => format!("#${:04X}", read_u16_le(operand, 0)),
        (Direct, [dp]) => format!("${dp:02X}"),
        (DirectX, [dp]) => format!("${dp:02X},X"),
        (DirectY, [dp]) => format!("${dp:02X},Y"),
        (DirectXIndirect, [dp]) => format!("(${dp:02X},X)"),
        (DirectIndirectY, [dp]) => format!("(${dp:02X}),Y"),
        (Absolute, [_, _]) => format!("${:04X}", read_u16_le(operand, 0)),
        (AbsoluteX, [_, _]) => format!("${:04X},X", read_u16_le(operand, 0)),
        (AbsoluteY, [_, _]) => format!("${:04X},Y", read_u16_le(operand, 0)),
        (AbsoluteIndirect, [_, _]) => format!("(${:04X})", read_u16_le(operand, 0)),
        (Long, [_, _, _]) => format!("${:06X}", read_u24_le(operand, 0)),
        (LongX, [_, _, _]) => format!("${:06X},X", read_u24_le(operand, 0)),
        (Relative8 | Relative16, _) => match target_address(mode, operand, pc) {
            Some(target) => format!("${target:04X}"),
            None => raw_listing(operand),
        },
        _ => raw_listing(operand),
    }
}

/// Statically known target of an operand, if the mode yields one.
///
/// Absolute operands resolve to their 16-bit value, long operands to their
/// 24-bit value and relative operands to the branch destination. Indexed
/// and indirect modes have no static target.
pub fn target_address(mode: AddressingMode, operand: &[u8], pc: u16) -> Option<u32> {
    match (mode, operand) {
        (AddressingMode::Absolute, [_, _]) => Some(u32::from(read_u16_le(operand, 0))),
        (AddressingMode::Long, [_, _, _]) => Some(read_u24_le(operand, 0)),
        (AddressingMode::Relative8, [disp]) => {
            Some(u32::from(branch_target(pc, 2, i16::from(*disp as i8))))
        }
        (AddressingMode::Relative16, [lo, hi]) => {
            let disp = i16::from_le_bytes([*lo, *hi]);
            Some(u32::from(branch_target(pc, 3, disp)))
        }
        _ => None,
    }
}

fn raw_listing(operand: &[u8]) -> String {
    format!("[{}]", hex::encode_upper(operand))
}

#[cfg(test)]
mod tests {
    use super::*;
    use AddressingMode::*;

    #[test]
    fn test_branch_target_arithmetic() {
        assert_eq!(branch_target(0x8010, 2, -2), 0x8010);
        assert_eq!(branch_target(0x8000, 2, 0x10), 0x8012);
        assert_eq!(branch_target(0x8000, 3, -3), 0x8000);
        // Wraps inside the bank.
        assert_eq!(branch_target(0xFFFE, 2, 0x05), 0x0005);
        assert_eq!(branch_target(0x0000, 2, -4), 0xFFFE);
    }

    #[test]
    fn test_immediate_formats() {
        assert_eq!(format_operand(Immediate8, &[0x30], 0), "#$30");
        assert_eq!(format_operand(ImmediateM, &[0x8F], 0), "#$8F");
        assert_eq!(format_operand(ImmediateM, &[0x34, 0x12], 0), "#$1234");
        assert_eq!(format_operand(ImmediateX, &[0xFF, 0x01], 0), "#$01FF");
    }

    #[test]
    fn test_direct_formats() {
        assert_eq!(format_operand(Direct, &[0x10], 0), "$10");
        assert_eq!(format_operand(DirectX, &[0x10], 0), "$10,X");
        assert_eq!(format_operand(DirectY, &[0x10], 0), "$10,Y");
        assert_eq!(format_operand(DirectXIndirect, &[0x10], 0), "($10,X)");
        assert_eq!(format_operand(DirectIndirectY, &[0x10], 0), "($10),Y");
    }

    #[test]
    fn test_absolute_and_long_formats() {
        assert_eq!(format_operand(Absolute, &[0x00, 0x21], 0), "$2100");
        assert_eq!(format_operand(AbsoluteX, &[0x00, 0x21], 0), "$2100,X");
        assert_eq!(format_operand(AbsoluteY, &[0x00, 0x21], 0), "$2100,Y");
        assert_eq!(format_operand(AbsoluteIndirect, &[0xFC, 0xFF], 0), "($FFFC)");
        assert_eq!(format_operand(Long, &[0x5B, 0x84, 0x00], 0), "$00845B");
        assert_eq!(format_operand(LongX, &[0x00, 0x00, 0x7E], 0), "$7E0000,X");
    }

    #[test]
    fn test_relative_formats() {
        assert_eq!(format_operand(Relative8, &[0xFE], 0x8010), "$8010");
        assert_eq!(format_operand(Relative16, &[0x00, 0x10], 0x8000), "$9003");
    }

    #[test]
    fn test_mismatched_shape_falls_back_to_raw() {
        assert_eq!(format_operand(Absolute, &[0x12], 0), "[12]");
        assert_eq!(format_operand(Implied, &[0xAB, 0xCD], 0), "[ABCD]");
        assert_eq!(format_operand(Relative8, &[], 0), "[]");
        assert!(!format_operand(Long, &[], 0).is_empty());
    }

    #[test]
    fn test_target_address() {
        assert_eq!(target_address(Absolute, &[0x23, 0x81], 0), Some(0x8123));
        assert_eq!(target_address(Long, &[0xF8, 0x8A, 0x01], 0), Some(0x018AF8));
        assert_eq!(target_address(Relative8, &[0xFE], 0x8010), Some(0x8010));
        assert_eq!(target_address(AbsoluteIndirect, &[0x00, 0x80], 0), None);
        assert_eq!(target_address(DirectX, &[0x00], 0), None);
    }
}
