//! Built-in priority factors.
//!
//! # Categories
//!
//! - **Course kind**: restricted course, spread course, science
//! - **Load**: teacher section count
//! - **Scarcity/demand**: sections per course, requesting students

use super::{Multiplier, PriorityFactor};
use crate::models::{School, Section};

// ======================== Course kind ========================

/// Boosts sections of period-restricted courses.
#[derive(Debug, Clone, Copy)]
pub struct RestrictedCourse {
    boost: f64,
}

impl RestrictedCourse {
    pub fn new(boost: f64) -> Self {
        Self { boost }
    }
}

impl PriorityFactor for RestrictedCourse {
    fn name(&self) -> &'static str {
        "RESTRICTED"
    }

    fn evaluate(&self, section: &Section, school: &School) -> Multiplier {
        if school.is_restricted(&section.course_id) {
            self.boost
        } else {
            1.0
        }
    }

    fn description(&self) -> &'static str {
        "Period-restricted course"
    }
}

/// Boosts sections of the flagged spread course.
#[derive(Debug, Clone, Copy)]
pub struct SpreadCourse {
    boost: f64,
}

impl SpreadCourse {
    pub fn new(boost: f64) -> Self {
        Self { boost }
    }
}

impl PriorityFactor for SpreadCourse {
    fn name(&self) -> &'static str {
        "SPREAD"
    }

    fn evaluate(&self, section: &Section, school: &School) -> Multiplier {
        if school.is_spread_course(&section.course_id) {
            self.boost
        } else {
            1.0
        }
    }

    fn description(&self) -> &'static str {
        "High-demand course spread across periods"
    }
}

/// Boosts science sections (department marker or listed course).
#[derive(Debug, Clone, Copy)]
pub struct Science {
    boost: f64,
}

impl Science {
    pub fn new(boost: f64) -> Self {
        Self { boost }
    }
}

impl PriorityFactor for Science {
    fn name(&self) -> &'static str {
        "SCIENCE"
    }

    fn evaluate(&self, section: &Section, school: &School) -> Multiplier {
        if school.is_science(&section.id) {
            self.boost
        } else {
            1.0
        }
    }
}

// ======================== Load ========================

/// Teachers with many sections are harder to place: `1 + step·count`.
#[derive(Debug, Clone, Copy)]
pub struct TeacherLoad {
    step: f64,
}

impl TeacherLoad {
    pub fn new(step: f64) -> Self {
        Self { step }
    }
}

impl PriorityFactor for TeacherLoad {
    fn name(&self) -> &'static str {
        "TEACHER_LOAD"
    }

    fn evaluate(&self, section: &Section, school: &School) -> Multiplier {
        1.0 + self.step * school.sections_of_teacher(&section.teacher_id).len() as f64
    }
}

// ======================== Scarcity / demand ========================

/// Courses with fewer sections are harder to place: `1 + weight/sections`.
#[derive(Debug, Clone, Copy)]
pub struct CourseScarcity {
    weight: f64,
}

impl CourseScarcity {
    pub fn new(weight: f64) -> Self {
        Self { weight }
    }
}

impl PriorityFactor for CourseScarcity {
    fn name(&self) -> &'static str {
        "SCARCITY"
    }

    fn evaluate(&self, section: &Section, school: &School) -> Multiplier {
        let count = school.sections_of_course(&section.course_id).len().max(1);
        1.0 + self.weight / count as f64
    }
}

/// Raw student demand for the course: `1 + step·requests`.
#[derive(Debug, Clone, Copy)]
pub struct Demand {
    step: f64,
}

impl Demand {
    pub fn new(step: f64) -> Self {
        Self { step }
    }
}

impl PriorityFactor for Demand {
    fn name(&self) -> &'static str {
        "DEMAND"
    }

    fn evaluate(&self, section: &Section, school: &School) -> Multiplier {
        1.0 + self.step * school.demand(&section.course_id) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SchedulerConfig;
    use crate::tables::InputTables;

    fn school() -> School {
        let t = InputTables::new()
            .with_student("A", false)
            .with_student("B", false)
            .with_section("S1", "Medical Career", "T1", 10)
            .with_section("S2", "Sports Med", "T1", 10)
            .with_section("S3", "Sports Med", "T2", 10)
            .with_department_section("S4", "Geology", "T1", 10, "Earth Science")
            .with_preference("A", &["Sports Med", "Geology"])
            .with_preference("B", &["Sports Med"]);
        School::from_tables(&t, &SchedulerConfig::default()).unwrap()
    }

    fn section<'a>(school: &'a School, id: &str) -> &'a Section {
        school.section(&id.into()).unwrap()
    }

    #[test]
    fn test_course_kind_factors() {
        let s = school();
        assert_eq!(RestrictedCourse::new(5.0).evaluate(section(&s, "S1"), &s), 5.0);
        assert_eq!(RestrictedCourse::new(5.0).evaluate(section(&s, "S2"), &s), 1.0);
        assert_eq!(SpreadCourse::new(3.0).evaluate(section(&s, "S2"), &s), 3.0);
        assert_eq!(Science::new(2.5).evaluate(section(&s, "S4"), &s), 2.5);
        assert_eq!(Science::new(2.5).evaluate(section(&s, "S1"), &s), 1.0);
    }

    #[test]
    fn test_load_and_scarcity() {
        let s = school();
        // T1 teaches three sections
        assert!((TeacherLoad::new(0.2).evaluate(section(&s, "S1"), &s) - 1.6).abs() < 1e-12);
        // Sports Med has two sections
        assert!((CourseScarcity::new(1.0).evaluate(section(&s, "S2"), &s) - 1.5).abs() < 1e-12);
        // Two students request Sports Med
        assert!((Demand::new(0.001).evaluate(section(&s, "S3"), &s) - 1.002).abs() < 1e-12);
    }
}
