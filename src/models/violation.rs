//! Constraint violations.
//!
//! Hard violations make a solution unacceptable; soft violations are
//! expected and tracked (missed requests, seat overflow, SPED crowding).

use serde::{Deserialize, Serialize};

/// A constraint violation found in a solution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// Type of violation.
    pub violation_type: ViolationType,
    /// Related entity ID (section, teacher, or student).
    pub entity_id: String,
    /// Human-readable description.
    pub message: String,
    /// Severity (0-100, higher = worse).
    pub severity: i32,
}

/// Classification of constraint violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViolationType {
    /// Section placed in a period its course does not allow (hard).
    PeriodNotAllowed,
    /// Section placed in a period its teacher is unavailable (hard).
    TeacherUnavailable,
    /// Teacher holds two sections in one period (hard).
    TeacherConflict,
    /// Student holds two sections in one period (hard).
    StudentConflict,
    /// Student holds two sections of one course (hard).
    DuplicateCourse,
    /// Student enrolled in a section with no period (hard).
    UnscheduledEnrollment,
    /// Enrollment beyond seat capacity (soft).
    CapacityExceeded,
    /// Requested course without an enrolled section (soft).
    MissedRequest,
    /// More SPED students in a section than the policy threshold (soft).
    SpedThreshold,
}

impl ViolationType {
    /// Whether violations of this type make a solution unacceptable.
    pub fn is_hard(self) -> bool {
        !matches!(
            self,
            Self::CapacityExceeded | Self::MissedRequest | Self::SpedThreshold
        )
    }
}

impl Violation {
    /// Creates a violation with the default severity for its type.
    pub fn new(
        violation_type: ViolationType,
        entity_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let severity = match violation_type {
            ViolationType::TeacherConflict | ViolationType::StudentConflict => 95,
            ViolationType::PeriodNotAllowed | ViolationType::TeacherUnavailable => 90,
            ViolationType::DuplicateCourse | ViolationType::UnscheduledEnrollment => 85,
            ViolationType::CapacityExceeded => 40,
            ViolationType::MissedRequest => 60,
            ViolationType::SpedThreshold => 30,
        };
        Self {
            violation_type,
            entity_id: entity_id.into(),
            message: message.into(),
            severity,
        }
    }

    /// Creates a teacher conflict violation.
    pub fn teacher_conflict(teacher_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ViolationType::TeacherConflict, teacher_id, message)
    }

    /// Creates a student conflict violation.
    pub fn student_conflict(student_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ViolationType::StudentConflict, student_id, message)
    }

    /// Creates a capacity exceeded violation.
    pub fn capacity_exceeded(section_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ViolationType::CapacityExceeded, section_id, message)
    }

    /// Whether this violation is hard.
    #[inline]
    pub fn is_hard(&self) -> bool {
        self.violation_type.is_hard()
    }
}
