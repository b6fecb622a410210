//! Assignment (solution) model.
//!
//! Two incrementally built maps make up a solution:
//! - [`ScheduleAssignment`]: section → period (partial; a section is
//!   "scheduled" once present).
//! - [`EnrollmentAssignment`]: student → sections, with the reverse
//!   section → roster view kept in sync.
//!
//! Both are exclusively owned by whichever phase is building them and are
//! handed off, never shared, once construction ends.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use super::{PeriodId, SectionId, StudentId};

/// Section → period mapping.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScheduleAssignment {
    periods: BTreeMap<SectionId, PeriodId>,
    #[serde(skip)]
    period_load: HashMap<PeriodId, usize>,
}

impl ScheduleAssignment {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Places `section` in `period`, replacing any earlier placement.
    pub fn assign(&mut self, section: SectionId, period: PeriodId) {
        if let Some(previous) = self.periods.insert(section, period.clone()) {
            self.decrement(&previous);
        }
        *self.period_load.entry(period).or_insert(0) += 1;
    }

    /// Removes a section's placement.
    pub fn unassign(&mut self, section: &SectionId) -> Option<PeriodId> {
        let previous = self.periods.remove(section)?;
        self.decrement(&previous);
        Some(previous)
    }

    fn decrement(&mut self, period: &PeriodId) {
        if let Some(count) = self.period_load.get_mut(period) {
            *count = count.saturating_sub(1);
        }
    }

    /// Period of a section, if scheduled.
    #[inline]
    pub fn period_of(&self, section: &SectionId) -> Option<&PeriodId> {
        self.periods.get(section)
    }

    /// Whether the section has been placed.
    #[inline]
    pub fn is_scheduled(&self, section: &SectionId) -> bool {
        self.periods.contains_key(section)
    }

    /// Whether `section` sits in `period`.
    #[inline]
    pub fn is_in(&self, section: &SectionId, period: &PeriodId) -> bool {
        self.periods.get(section) == Some(period)
    }

    /// Number of sections placed in `period`.
    pub fn load(&self, period: &PeriodId) -> usize {
        self.period_load.get(period).copied().unwrap_or(0)
    }

    /// Number of scheduled sections.
    pub fn len(&self) -> usize {
        self.periods.len()
    }

    /// Whether nothing has been scheduled.
    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// Iterates `(section, period)` pairs ordered by section ID.
    pub fn iter(&self) -> impl Iterator<Item = (&SectionId, &PeriodId)> {
        self.periods.iter()
    }
}

// Load counters are derived state; equality is defined by the placements alone.
impl PartialEq for ScheduleAssignment {
    fn eq(&self, other: &Self) -> bool {
        self.periods == other.periods
    }
}

impl Eq for ScheduleAssignment {}

impl FromIterator<(SectionId, PeriodId)> for ScheduleAssignment {
    fn from_iter<I: IntoIterator<Item = (SectionId, PeriodId)>>(iter: I) -> Self {
        let mut schedule = Self::new();
        for (section, period) in iter {
            schedule.assign(section, period);
        }
        schedule
    }
}

/// Student → sections mapping with a section → roster reverse index.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EnrollmentAssignment {
    by_student: BTreeMap<StudentId, Vec<SectionId>>,
    #[serde(skip)]
    rosters: HashMap<SectionId, Vec<StudentId>>,
}

impl EnrollmentAssignment {
    /// Creates an empty enrollment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enrolls `student` in `section`. Enrolling twice is a no-op.
    ///
    /// Returns `true` if the enrollment was added.
    pub fn enroll(&mut self, student: StudentId, section: SectionId) -> bool {
        let sections = self.by_student.entry(student.clone()).or_default();
        if sections.contains(&section) {
            return false;
        }
        sections.push(section.clone());
        self.rosters.entry(section).or_default().push(student);
        true
    }

    /// Sections held by a student, in enrollment order.
    pub fn sections_of(&self, student: &StudentId) -> &[SectionId] {
        self.by_student.get(student).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Students enrolled in a section, in enrollment order.
    pub fn roster(&self, section: &SectionId) -> &[StudentId] {
        self.rosters.get(section).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of students enrolled in a section.
    #[inline]
    pub fn count(&self, section: &SectionId) -> usize {
        self.rosters.get(section).map_or(0, Vec::len)
    }

    /// Whether the student holds the section.
    pub fn is_enrolled(&self, student: &StudentId, section: &SectionId) -> bool {
        self.sections_of(student).contains(section)
    }

    /// Total number of student-section pairs.
    pub fn total(&self) -> usize {
        self.by_student.values().map(Vec::len).sum()
    }

    /// Iterates `(student, sections)` ordered by student ID.
    pub fn iter(&self) -> impl Iterator<Item = (&StudentId, &[SectionId])> {
        self.by_student.iter().map(|(s, secs)| (s, secs.as_slice()))
    }
}

impl PartialEq for EnrollmentAssignment {
    fn eq(&self, other: &Self) -> bool {
        self.by_student == other.by_student
    }
}

impl Eq for EnrollmentAssignment {}

impl FromIterator<(StudentId, SectionId)> for EnrollmentAssignment {
    fn from_iter<I: IntoIterator<Item = (StudentId, SectionId)>>(iter: I) -> Self {
        let mut enrollment = Self::new();
        for (student, section) in iter {
            enrollment.enroll(student, section);
        }
        enrollment
    }
}
