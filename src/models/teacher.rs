//! Teacher model.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{PeriodId, TeacherId};

/// A teacher and the periods in which they cannot teach.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Teacher {
    /// Unique teacher identifier.
    pub id: TeacherId,
    /// Periods in which the teacher is unavailable.
    pub unavailable: BTreeSet<PeriodId>,
}

impl Teacher {
    /// Creates a teacher available in every period.
    pub fn new(id: impl Into<TeacherId>) -> Self {
        Self {
            id: id.into(),
            unavailable: BTreeSet::new(),
        }
    }

    /// Marks a period as unavailable.
    pub fn with_unavailable(mut self, period: impl Into<PeriodId>) -> Self {
        self.unavailable.insert(period.into());
        self
    }

    /// Whether the teacher can teach in `period`.
    #[inline]
    pub fn is_available(&self, period: &PeriodId) -> bool {
        !self.unavailable.contains(period)
    }
}
