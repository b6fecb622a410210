//! Period sequence model.
//!
//! Periods are opaque identifiers whose only structure is their position in
//! the configured ordering. Position drives two things: tie-breaking (first
//! period in order wins) and adjacency (neighbours by position, no
//! wraparound from the last period back to the first).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::PeriodId;

/// Identifiers used when no Periods table is supplied.
pub const DEFAULT_PERIODS: [&str; 8] = ["R1", "R2", "R3", "R4", "G1", "G2", "G3", "G4"];

/// An ordered sequence of periods.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "Vec<PeriodId>", into = "Vec<PeriodId>")]
pub struct PeriodSequence {
    periods: Vec<PeriodId>,
    positions: HashMap<PeriodId, usize>,
}

impl PeriodSequence {
    /// Creates a sequence from periods in order.
    ///
    /// Later duplicates are ignored; the first occurrence keeps its position.
    pub fn new(periods: impl IntoIterator<Item = PeriodId>) -> Self {
        let mut ordered = Vec::new();
        let mut positions = HashMap::new();
        for period in periods {
            if !positions.contains_key(&period) {
                positions.insert(period.clone(), ordered.len());
                ordered.push(period);
            }
        }
        Self {
            periods: ordered,
            positions,
        }
    }

    /// The eight default periods `R1..R4, G1..G4`.
    pub fn default_school_day() -> Self {
        Self::new(DEFAULT_PERIODS.iter().map(|&p| PeriodId::from(p)))
    }

    /// Periods in configured order.
    #[inline]
    pub fn as_slice(&self) -> &[PeriodId] {
        &self.periods
    }

    /// Iterates periods in configured order.
    pub fn iter(&self) -> std::slice::Iter<'_, PeriodId> {
        self.periods.iter()
    }

    /// Number of periods.
    pub fn len(&self) -> usize {
        self.periods.len()
    }

    /// Whether the sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// Position of a period, if it belongs to the sequence.
    pub fn position(&self, period: &PeriodId) -> Option<usize> {
        self.positions.get(period).copied()
    }

    /// Whether the period belongs to the sequence.
    pub fn contains(&self, period: &PeriodId) -> bool {
        self.positions.contains_key(period)
    }

    /// Periods immediately before and after `period` (no wraparound).
    pub fn adjacent(&self, period: &PeriodId) -> Vec<&PeriodId> {
        let Some(idx) = self.position(period) else {
            return Vec::new();
        };
        let mut adjacent = Vec::with_capacity(2);
        if idx > 0 {
            adjacent.push(&self.periods[idx - 1]);
        }
        if idx + 1 < self.periods.len() {
            adjacent.push(&self.periods[idx + 1]);
        }
        adjacent
    }

    /// Whether two periods are neighbours by position.
    pub fn are_adjacent(&self, a: &PeriodId, b: &PeriodId) -> bool {
        match (self.position(a), self.position(b)) {
            (Some(x), Some(y)) => x.abs_diff(y) == 1,
            _ => false,
        }
    }
}

impl Default for PeriodSequence {
    fn default() -> Self {
        Self::default_school_day()
    }
}

impl PartialEq for PeriodSequence {
    fn eq(&self, other: &Self) -> bool {
        self.periods == other.periods
    }
}

impl From<Vec<PeriodId>> for PeriodSequence {
    fn from(periods: Vec<PeriodId>) -> Self {
        Self::new(periods)
    }
}

impl From<PeriodSequence> for Vec<PeriodId> {
    fn from(seq: PeriodSequence) -> Self {
        seq.periods
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(ids: &[&str]) -> PeriodSequence {
        PeriodSequence::new(ids.iter().map(|&p| PeriodId::from(p)))
    }

    #[test]
    fn test_default_periods() {
        let s = PeriodSequence::default_school_day();
        assert_eq!(s.len(), 8);
        assert_eq!(s.as_slice()[0].as_str(), "R1");
        assert_eq!(s.as_slice()[7].as_str(), "G4");
    }

    #[test]
    fn test_adjacent_no_wraparound() {
        let s = seq(&["P1", "P2", "P3"]);
        let first: Vec<&str> = s.adjacent(&"P1".into()).iter().map(|p| p.as_str()).collect();
        assert_eq!(first, vec!["P2"]);
        let mid: Vec<&str> = s.adjacent(&"P2".into()).iter().map(|p| p.as_str()).collect();
        assert_eq!(mid, vec!["P1", "P3"]);
        let last: Vec<&str> = s.adjacent(&"P3".into()).iter().map(|p| p.as_str()).collect();
        assert_eq!(last, vec!["P2"]);
        assert!(!s.are_adjacent(&"P1".into(), &"P3".into()));
    }

    #[test]
    fn test_unknown_period() {
        let s = seq(&["P1"]);
        assert!(s.position(&"X".into()).is_none());
        assert!(s.adjacent(&"X".into()).is_empty());
    }

    #[test]
    fn test_duplicates_keep_first_position() {
        let s = seq(&["A", "B", "A"]);
        assert_eq!(s.len(), 2);
        assert_eq!(s.position(&"A".into()), Some(0));
    }
}
