//! Logical-address to file-offset translation and bank splitting.
//!
//! Translation performs no bounds checking: callers compare the returned
//! offset against the image length themselves.

use crate::types::{BankInfo, MemoryMapping};

/// Translate a `(bank, address)` pair into a file offset.
///
/// Low mapping folds each bank's `$8000-$FFFF` window onto a 32 KiB stride;
/// high mapping uses a flat 64 KiB stride.
pub fn to_file_offset(mapping: MemoryMapping, bank: u8, address: u16) -> usize {
    match mapping {
        MemoryMapping::LoRom => usize::from(bank) * 0x8000 + usize::from(address & 0x7FFF),
        MemoryMapping::HiRom => usize::from(bank) * 0x10000 + usize::from(address),
    }
}

/// Split an image into bank-sized slices.
///
/// The final slice is shorter than the bank size when the image length is
/// not an exact multiple of it.
pub fn split_banks(data: &[u8], mapping: MemoryMapping) -> Vec<&[u8]> {
    data.chunks(mapping.bank_size()).collect()
}

/// Describe where each bank split sits in an image of `len` bytes.
pub fn bank_layout(len: usize, mapping: MemoryMapping) -> Vec<BankInfo> {
    let size = mapping.bank_size();
    (0..len)
        .step_by(size)
        .enumerate()
        .map(|(index, file_offset)| BankInfo {
            index,
            file_offset,
            len: size.min(len - file_offset),
            org: mapping.bank_origin(),
        })
        .collect()
}
