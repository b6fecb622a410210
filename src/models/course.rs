//! Course model.
//!
//! A course is the unit students request. It owns one or more sections and
//! may restrict which periods its sections can occupy.

use serde::{Deserialize, Serialize};

use super::{CourseId, PeriodId};

/// A course offered by the school.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    /// Unique course identifier.
    pub id: CourseId,
    /// Department tag (taken from the course's first section).
    pub department: Option<String>,
    /// Allowed periods. `None` = every period is allowed.
    pub allowed_periods: Option<Vec<PeriodId>>,
}

impl Course {
    /// Creates an unrestricted course with no department.
    pub fn new(id: impl Into<CourseId>) -> Self {
        Self {
            id: id.into(),
            department: None,
            allowed_periods: None,
        }
    }

    /// Sets the department tag.
    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    /// Restricts the course to the given periods.
    pub fn with_allowed_periods(mut self, periods: Vec<PeriodId>) -> Self {
        self.allowed_periods = Some(periods);
        self
    }

    /// Whether the course carries a period restriction.
    #[inline]
    pub fn is_restricted(&self) -> bool {
        self.allowed_periods.is_some()
    }

    /// Whether `period` is allowed for this course.
    pub fn allows(&self, period: &PeriodId) -> bool {
        match &self.allowed_periods {
            Some(allowed) => allowed.contains(period),
            None => true,
        }
    }
}
