//! Simple first-fit greedy.
//!
//! # Algorithm
//!
//! 1. Sections in input order, each to the first allowed period (configured
//!    order) where its teacher is available and not already teaching.
//! 2. Students in input order, each request in request order, to the first
//!    section of the course (input order) that is scheduled, has a free
//!    seat and does not clash with the student's other sections.
//!
//! No scoring, no phases. Used as the fallback warm start; deterministic
//! and never exceeds capacity.
//!
//! # Complexity
//! O(s · p · t + r · c) where t = sections per teacher, r = requests,
//! c = sections per course.

use crate::models::{EnrollmentAssignment, ScheduleAssignment, School, SectionId};

/// First-fit section placement and student enrollment.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleGreedy;

impl SimpleGreedy {
    pub fn new() -> Self {
        Self
    }

    /// Places sections first-fit. Returns the schedule and the sections
    /// that found no period, in input order.
    pub fn schedule_sections(&self, school: &School) -> (ScheduleAssignment, Vec<SectionId>) {
        let mut schedule = ScheduleAssignment::new();
        let mut unscheduled = Vec::new();

        for section in school.sections() {
            let available = school.teacher(&section.teacher_id);
            let teacher_sections = school.sections_of_teacher(&section.teacher_id);
            let slot = school.allowed_periods(&section.id).iter().find(|period| {
                available.map_or(true, |t| t.is_available(period))
                    && !teacher_sections
                        .iter()
                        .any(|other| schedule.is_in(other, period))
            });
            match slot {
                Some(period) => schedule.assign(section.id.clone(), period.clone()),
                None => unscheduled.push(section.id.clone()),
            }
        }

        (schedule, unscheduled)
    }

    /// Enrolls students first-fit into scheduled sections.
    pub fn enroll_students(&self, school: &School, schedule: &ScheduleAssignment) -> EnrollmentAssignment {
        let mut enrollment = EnrollmentAssignment::new();

        for student in school.students() {
            for course in &student.requests {
                let slot = school.sections_of_course(course).iter().find(|id| {
                    let Some(section) = school.section(id) else {
                        return false;
                    };
                    let Some(period) = schedule.period_of(id) else {
                        return false;
                    };
                    enrollment.count(id) < section.capacity as usize
                        && !enrollment
                            .sections_of(&student.id)
                            .iter()
                            .any(|held| schedule.is_in(held, period))
                });
                if let Some(id) = slot {
                    enrollment.enroll(student.id.clone(), id.clone());
                }
            }
        }

        enrollment
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
            .with_teacher("T1", &["P1"])
            .with_section("S1", "Math", "T1", 1)
            .with_section("S2", "Math", "T2", 1)
            .with_section("S3", "Art", "T2", 5)
            .with_section("S4", "Lab", "T1", 5)
            .with_preference("A", &["Math", "Art"])
            .with_preference("B", &["Math", "Lab"]);
        let config = SchedulerConfig::plain(&["P1", "P2"]).with_restriction("Lab", &["P2"]);
        School::from_tables(&t, &config).unwrap()
    }

    #[test]
    fn test_first_fit_sections() {
        let s = school();
        let (schedule, unscheduled) = SimpleGreedy::new().schedule_sections(&s);
        assert_eq!(schedule.period_of(&"S1".into()), Some(&"P2".into()));
        assert_eq!(schedule.period_of(&"S2".into()), Some(&"P1".into()));
        assert_eq!(schedule.period_of(&"S3".into()), Some(&"P2".into()));
        // T1 is busy in P2 and unavailable in P1
        assert_eq!(unscheduled, vec![SectionId::from("S4")]);
    }

    #[test]
    fn test_first_fit_students_respect_capacity_and_clashes() {
        let s = school();
        let greedy = SimpleGreedy::new();
        let (schedule, _) = greedy.schedule_sections(&s);
        let e = greedy.enroll_students(&s, &schedule);

        // A: Math → S1 (P2), Art → S3 clashes in P2
        assert_eq!(e.sections_of(&"A".into()), &[SectionId::from("S1")]);
        // B: S1 is full, so S2 (P1); Lab is unscheduled
        assert_eq!(e.sections_of(&"B".into()), &[SectionId::from("S2")]);
        assert!(e.count(&"S1".into()) <= 1);
    }
}
