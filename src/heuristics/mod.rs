//! Heuristic header location.
//!
//! A cartridge image carries no magic bytes identifying its memory map.
//! Both candidate header blocks are scored and the better one wins; a tie
//! goes to the low mapping, which is checked first.

pub mod scorer;

use serde::{Serialize, Serializer};
use tracing::{debug, warn};

use crate::types::MemoryMapping;

pub use scorer::{header_signals, score_header, HeaderSignals, DISQUALIFIED};

/// Result of scoring a single header candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HeaderCandidate {
    /// Mapping this candidate stands for
    pub mapping: MemoryMapping,
    /// File offset of the candidate block
    pub offset: usize,
    /// Weighted score, or [`DISQUALIFIED`]
    pub score: i64,
    /// Signals that fired (empty when disqualified)
    #[serde(serialize_with = "serialize_signals")]
    pub signals: HeaderSignals,
}

impl HeaderCandidate {
    /// Score the candidate block for `mapping`.
    pub fn evaluate(data: &[u8], mapping: MemoryMapping) -> Self {
        let offset = mapping.header_offset();
        let signals = header_signals(data, offset, mapping.expected_mode_nibble());
        Self {
            mapping,
            offset,
            score: signals.map_or(DISQUALIFIED, HeaderSignals::weight),
            signals: signals.unwrap_or_default(),
        }
    }

    /// Whether the block did not fit in the image.
    pub fn is_disqualified(&self) -> bool {
        self.score == DISQUALIFIED
    }
}

fn serialize_signals<S: Serializer>(signals: &HeaderSignals, s: S) -> Result<S::Ok, S::Error> {
    s.collect_seq(signals.names())
}

/// Outcome of header location: the chosen mapping plus both scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HeaderLocation {
    /// Selected mapping
    pub mapping: MemoryMapping,
    /// File offset of the selected header
    pub offset: usize,
    /// Low-mapping candidate
    pub lorom: HeaderCandidate,
    /// High-mapping candidate
    pub hirom: HeaderCandidate,
}

impl HeaderLocation {
    /// The candidate that was selected.
    pub fn chosen(&self) -> &HeaderCandidate {
        match self.mapping {
            MemoryMapping::LoRom => &self.lorom,
            MemoryMapping::HiRom => &self.hirom,
        }
    }

    /// Whether neither candidate fit in the image.
    pub fn both_disqualified(&self) -> bool {
        self.lorom.is_disqualified() && self.hirom.is_disqualified()
    }
}

/// Score both header candidates and select a mapping.
///
/// High mapping is chosen only on a strictly greater score; everything
/// else, including an image too short for either block, selects low
/// mapping.
pub fn locate_header(data: &[u8]) -> HeaderLocation {
    let lorom = HeaderCandidate::evaluate(data, MemoryMapping::LoRom);
    let hirom = HeaderCandidate::evaluate(data, MemoryMapping::HiRom);

    debug!(
        score = lorom.score,
        signals = ?lorom.signals,
        "LoROM header candidate at 0x{:06X}",
        lorom.offset
    );
    debug!(
        score = hirom.score,
        signals = ?hirom.signals,
        "HiROM header candidate at 0x{:06X}",
        hirom.offset
    );

    let chosen = if hirom.score > lorom.score { hirom } else { lorom };

    let location = HeaderLocation {
        mapping: chosen.mapping,
        offset: chosen.offset,
        lorom,
        hirom,
    };

    if location.both_disqualified() {
        warn!(len = data.len(), "image too short for either header; defaulting to LoROM");
    } else {
        debug!(mapping = %location.mapping, "selected memory mapping");
    }

    location
}
