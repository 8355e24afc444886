//! Printable-ASCII run scanning.

use serde::Serialize;
use std::fmt;

/// A run of printable ASCII bytes found in the image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AsciiString {
    /// File offset of the first byte
    pub offset: usize,
    /// The run itself
    pub text: String,
}

impl fmt::Display for AsciiString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:06X}: {}", self.offset, self.text)
    }
}

fn is_printable(b: u8) -> bool {
    (0x20..=0x7E).contains(&b)
}

/// Find every maximal run of bytes in `0x20..=0x7E` at least `min_len` long.
///
/// A `min_len` of zero is treated as one.
pub fn extract_ascii(data: &[u8], min_len: usize) -> Vec<AsciiString> {
    let min_len = min_len.max(1);
    let mut found = Vec::new();
    let mut run_start = None;

    for (i, &b) in data.iter().enumerate() {
        match (is_printable(b), run_start) {
            (true, None) => run_start = Some(i),
            (false, Some(start)) => {
                push_run(&mut found, data, start, i, min_len);
                run_start = None;
            }
            _ => {}
        }
    }
    if let Some(start) = run_start {
        push_run(&mut found, data, start, data.len(), min_len);
    }

    found
}

fn push_run(found: &mut Vec<AsciiString>, data: &[u8], start: usize, end: usize, min_len: usize) {
    if end - start >= min_len {
        // Every byte in the run is printable ASCII, so this never replaces.
        let text = String::from_utf8_lossy(&data[start..end]).into_owned();
        found.push(AsciiString {
            offset: start,
            text,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_finds_runs_at_or_above_minimum() {
        let data = b"\x00\x01ABC\xFFHELLO\x00WORLD!\x7F~~~~";
        let found = extract_ascii(data, 4);
        assert_eq!(
            found,
            vec![
                AsciiString {
                    offset: 6,
                    text: "HELLO".to_string()
                },
                AsciiString {
                    offset: 12,
                    text: "WORLD!".to_string()
                },
                AsciiString {
                    offset: 19,
                    text: "~~~~".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_spaces_count_as_printable() {
        let found = extract_ascii(b"\x00SUPER MARIO   \x00", 4);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text, "SUPER MARIO   ");
    }

    #[test]
    fn test_display() {
        let s = AsciiString {
            offset: 0x7FC0,
            text: "STAR FOX".to_string(),
        };
        assert_eq!(s.to_string(), "0x007FC0: STAR FOX");
    }

    #[test]
    fn test_empty_and_zero_minimum() {
        assert!(extract_ascii(&[], 4).is_empty());
        assert_eq!(extract_ascii(b"A\x00B", 0).len(), 2);
    }
}
