//! Student model.
//!
//! A request names a course, never a specific section: any section of the
//! course satisfies it.

use serde::{Deserialize, Serialize};

use super::{CourseId, StudentId};

/// A student and their course requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    /// Unique student identifier.
    pub id: StudentId,
    /// Grade level, when provided.
    pub grade_level: Option<u32>,
    /// Whether the student belongs to the SPED category.
    pub sped: bool,
    /// Requested courses, de-duplicated, in input order.
    pub requests: Vec<CourseId>,
}

impl Student {
    /// Creates a non-SPED student with no requests.
    pub fn new(id: impl Into<StudentId>) -> Self {
        Self {
            id: id.into(),
            grade_level: None,
            sped: false,
            requests: Vec::new(),
        }
    }

    /// Sets the SPED flag.
    pub fn with_sped(mut self, sped: bool) -> Self {
        self.sped = sped;
        self
    }

    /// Sets the grade level.
    pub fn with_grade_level(mut self, grade: u32) -> Self {
        self.grade_level = Some(grade);
        self
    }

    /// Adds a course request. Repeated requests for one course are ignored.
    pub fn with_request(mut self, course: impl Into<CourseId>) -> Self {
        let course = course.into();
        if !self.requests.contains(&course) {
            self.requests.push(course);
        }
        self
    }

    /// Whether the student requested `course`.
    #[inline]
    pub fn requests(&self, course: &CourseId) -> bool {
        self.requests.contains(course)
    }
}
