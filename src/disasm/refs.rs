//! Cross-reference collection for the linear sweep.
//!
//! Targets are keyed by their text form, so exact-text duplicates collapse
//! and both lists come out sorted lexicographically.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// How control reaches a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    /// `jsr`
    SubroutineCall,
    /// `jsl`
    LongCall,
    /// `jmp` / `jml`
    Jump,
    /// Relative branch
    Branch,
}

impl TargetKind {
    /// Whether the target belongs in the call list rather than the branch list.
    pub fn is_call_like(self) -> bool {
        !matches!(self, TargetKind::Branch)
    }
}

/// A control-flow target found during the sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlFlowTarget {
    /// Kind of transfer
    pub kind: TargetKind,
    /// Destination (16-bit, or 24-bit for long forms)
    pub address: u32,
    /// Text form, e.g. `JSL $00845B`
    pub text: String,
}

impl ControlFlowTarget {
    /// Build a target whose text is the upper-cased mnemonic and operand.
    pub fn new(kind: TargetKind, address: u32, mnemonic: &str, operand: &str) -> Self {
        Self {
            kind,
            address,
            text: format!("{} {}", mnemonic.to_uppercase(), operand),
        }
    }
}

impl fmt::Display for ControlFlowTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Deduplicating accumulator for call and branch targets.
#[derive(Debug, Clone, Default)]
pub struct ReferenceCollector {
    calls: BTreeMap<String, ControlFlowTarget>,
    branches: BTreeMap<String, ControlFlowTarget>,
}

impl ReferenceCollector {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a target. The first occurrence of a given text is kept.
    pub fn record(&mut self, target: ControlFlowTarget) {
        let set = if target.kind.is_call_like() {
            &mut self.calls
        } else {
            &mut self.branches
        };
        set.entry(target.text.clone()).or_insert(target);
    }

    /// Number of distinct targets recorded.
    pub fn len(&self) -> usize {
        self.calls.len() + self.branches.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Finish collection: `(calls, branches)`, each sorted by text.
    pub fn finish(self) -> (Vec<ControlFlowTarget>, Vec<ControlFlowTarget>) {
        (
            self.calls.into_values().collect(),
            self.branches.into_values().collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_dedup_and_sort() {
        let mut refs = ReferenceCollector::new();
        refs.record(ControlFlowTarget::new(TargetKind::LongCall, 0x018AF8, "jsl", "$018AF8"));
        refs.record(ControlFlowTarget::new(TargetKind::SubroutineCall, 0x9283, "jsr", "$9283"));
        refs.record(ControlFlowTarget::new(TargetKind::LongCall, 0x00845B, "jsl", "$00845B"));
        refs.record(ControlFlowTarget::new(TargetKind::LongCall, 0x018AF8, "jsl", "$018AF8"));
        refs.record(ControlFlowTarget::new(TargetKind::Branch, 0x8010, "bne", "$8010"));
        refs.record(ControlFlowTarget::new(TargetKind::Branch, 0x8004, "bra", "$8004"));
        refs.record(ControlFlowTarget::new(TargetKind::Branch, 0x8010, "bne", "$8010"));
        assert_eq!(refs.len(), 5);

        let (calls, branches) = refs.finish();
        let call_texts: Vec<_> = calls.iter().map(|t| t.text.as_str()).collect();
        let branch_texts: Vec<_> = branches.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(call_texts, vec!["JSL $00845B", "JSL $018AF8", "JSR $9283"]);
        assert_eq!(branch_texts, vec!["BNE $8010", "BRA $8004"]);
    }

    #[test]
    fn test_jumps_land_in_calls() {
        let mut refs = ReferenceCollector::new();
        refs.record(ControlFlowTarget::new(TargetKind::Jump, 0x8100, "jmp", "$8100"));
        let (calls, branches) = refs.finish();
        assert_eq!(calls.len(), 1);
        assert!(branches.is_empty());
    }

    #[test]
    fn test_empty() {
        let refs = ReferenceCollector::new();
        assert!(refs.is_empty());
        let (calls, branches) = refs.finish();
        assert!(calls.is_empty() && branches.is_empty());
    }
}
