//! Section model.

use serde::{Deserialize, Serialize};

use super::{CourseId, SectionId, TeacherId};

/// One scheduled offering of a course, taught by one teacher.
///
/// A section's allowed periods are those of its course; they are resolved
/// through the school index rather than duplicated here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Unique section identifier.
    pub id: SectionId,
    /// Owning course.
    pub course_id: CourseId,
    /// Assigned teacher.
    pub teacher_id: TeacherId,
    /// Seat capacity.
    pub capacity: u32,
    /// Department tag, if any.
    pub department: Option<String>,
}

impl Section {
    /// Creates a section with zero capacity and no department.
    pub fn new(
        id: impl Into<SectionId>,
        course_id: impl Into<CourseId>,
        teacher_id: impl Into<TeacherId>,
    ) -> Self {
        Self {
            id: id.into(),
            course_id: course_id.into(),
            teacher_id: teacher_id.into(),
            capacity: 0,
            department: None,
        }
    }

    /// Sets the seat capacity.
    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the department tag.
    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    /// Whether the department tag contains `marker` (e.g. `"Science"`).
    pub fn department_contains(&self, marker: &str) -> bool {
        self.department
            .as_deref()
            .is_some_and(|d| !marker.is_empty() && d.contains(marker))
    }
}
