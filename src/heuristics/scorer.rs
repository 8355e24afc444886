//! Header candidate scoring.
//!
//! Each candidate header block is checked against four independent
//! signals. No single signal decides the outcome; the weighted sum does.

use bitflags::bitflags;

use crate::formats::snes::{layout, title_bytes, HEADER_SIZE, TITLE_LEN};
use crate::formats::{read_u16_le, read_u8};

/// Score of a candidate whose header block does not fit in the image.
pub const DISQUALIFIED: i64 = -999;

/// Signal weights.
pub mod weights {
    /// Emulation reset vector points into ROM space.
    pub const RESET_PLAUSIBLE: i64 = 8;
    /// Checksum and complement are bitwise inverses.
    pub const CHECKSUM_PAIR: i64 = 6;
    /// Map-mode low nibble matches the candidate mapping.
    pub const MODE_MATCH: i64 = 5;
    /// Title holds only printable ASCII or NUL.
    pub const TITLE_PRINTABLE: i64 = 3;
}

bitflags! {
    /// Signals that fired for a header candidate.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct HeaderSignals: u8 {
        /// Emulation reset vector in `$8000..=$FFFF`
        const RESET_PLAUSIBLE = 1 << 0;
        /// `(checksum ^ complement) == 0xFFFF`
        const CHECKSUM_PAIR = 1 << 1;
        /// Map-mode nibble matches the mapping
        const MODE_MATCH = 1 << 2;
        /// Title is printable ASCII or NUL
        const TITLE_PRINTABLE = 1 << 3;
    }
}

impl HeaderSignals {
    /// Weighted sum of the signals present.
    pub fn weight(self) -> i64 {
        let mut total = 0;
        if self.contains(Self::RESET_PLAUSIBLE) {
            total += weights::RESET_PLAUSIBLE;
        }
        if self.contains(Self::CHECKSUM_PAIR) {
            total += weights::CHECKSUM_PAIR;
        }
        if self.contains(Self::MODE_MATCH) {
            total += weights::MODE_MATCH;
        }
        if self.contains(Self::TITLE_PRINTABLE) {
            total += weights::TITLE_PRINTABLE;
        }
        total
    }

    /// Names of the signals present, in declaration order.
    pub fn names(self) -> Vec<&'static str> {
        self.iter_names().map(|(name, _)| name).collect()
    }
}

/// Evaluate the signals for the header block at `base`.
///
/// Returns `None` when the block would run past the end of `data`.
pub fn header_signals(data: &[u8], base: usize, expected_mode: u8) -> Option<HeaderSignals> {
    if base + HEADER_SIZE > data.len() {
        return None;
    }

    let mut signals = HeaderSignals::empty();

    let reset = read_u16_le(data, base + layout::EMULATION_RESET);
    if reset >= 0x8000 {
        signals |= HeaderSignals::RESET_PLAUSIBLE;
    }

    let complement = read_u16_le(data, base + layout::CHECKSUM_COMPLEMENT);
    let checksum = read_u16_le(data, base + layout::CHECKSUM);
    if checksum ^ complement == 0xFFFF {
        signals |= HeaderSignals::CHECKSUM_PAIR;
    }

    if read_u8(data, base + layout::MAP_MODE) & 0x0F == expected_mode {
        signals |= HeaderSignals::MODE_MATCH;
    }

    let title = title_bytes(data, base);
    if title.len() == TITLE_LEN && title.iter().all(|&c| c == 0 || (0x20..=0x7E).contains(&c)) {
        signals |= HeaderSignals::TITLE_PRINTABLE;
    }

    Some(signals)
}

/// Score the header block at `base`, or [`DISQUALIFIED`] if it does not fit.
pub fn score_header(data: &[u8], base: usize, expected_mode: u8) -> i64 {
    header_signals(data, base, expected_mode).map_or(DISQUALIFIED, HeaderSignals::weight)
}
