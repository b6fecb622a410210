//! Greedy student assigner.
//!
//! # Algorithm
//!
//! Students are ranked hardest-first (stable). Then:
//!
//! 1. **Special courses**: for each special course in declared order that
//!    the student requested, enroll in the best-scoring section.
//! 2. **Other courses**: find the best section for every unmet,
//!    non-special request, rank those candidates by score (descending,
//!    stable), and commit each after re-scoring it against the enrollment
//!    as it stands, since an earlier commit may have taken the period.
//!
//! Requests left without a section are returned as [`MissedRequest`]s.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{EnrollmentScoreWeights, HardnessWeights, SchedulerConfig};
use crate::models::{
    CourseId, EnrollmentAssignment, ScheduleAssignment, School, SectionId, StudentId,
};
use crate::priority::rank_students;
use crate::scoring::EnrollmentScorer;

/// A requested course the student was not enrolled in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MissedRequest {
    pub student_id: StudentId,
    pub course_id: CourseId,
}

/// Result of the student assigner.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentAssignment {
    /// Student → sections.
    pub enrollment: EnrollmentAssignment,
    /// Unsatisfied requests, students in input order, courses in request order.
    pub missed: Vec<MissedRequest>,
}

/// Lists the requests `enrollment` leaves unsatisfied.
pub fn missed_requests(school: &School, enrollment: &EnrollmentAssignment) -> Vec<MissedRequest> {
    let mut missed = Vec::new();
    for student in school.students() {
        let held: Vec<&CourseId> = enrollment
            .sections_of(&student.id)
            .iter()
            .filter_map(|id| school.section(id))
            .map(|s| &s.course_id)
            .collect();
        for course in &student.requests {
            if !held.contains(&course) {
                missed.push(MissedRequest {
                    student_id: student.id.clone(),
                    course_id: course.clone(),
                });
            }
        }
    }
    missed
}

/// Greedy, phased student assigner.
#[derive(Debug, Clone)]
pub struct StudentAssigner {
    hardness: HardnessWeights,
    weights: EnrollmentScoreWeights,
    sped_threshold: Option<u32>,
}

impl StudentAssigner {
    /// Creates an assigner from configuration.
    pub fn new(config: &SchedulerConfig) -> Self {
        Self {
            hardness: config.weights.hardness.clone(),
            weights: config.weights.enrollment.clone(),
            sped_threshold: config.sped.decay_threshold,
        }
    }

    /// Assigns students to scheduled sections.
    pub fn assign(&self, school: &School, schedule: &ScheduleAssignment) -> StudentAssignment {
        let order = rank_students(school, &self.hardness);
        let scorer = EnrollmentScorer::new(school, &self.weights, self.sped_threshold);
        let special = school.special_courses();
        let mut enrollment = EnrollmentAssignment::new();

        let started = Instant::now();
        info!(event = "phase_start", phase = "Special Courses", phase_index = 0);
        let mut enrolled = 0u64;
        for &idx in &order {
            let student = &school.students()[idx];
            for course in special {
                if !student.requests(course) {
                    continue;
                }
                if let Some((section, score)) =
                    scorer.best_section(student, course, &enrollment, schedule)
                {
                    debug!(event = "student_enrolled", student = %student.id, section = %section, score);
                    enrollment.enroll(student.id.clone(), section);
                    enrolled += 1;
                }
            }
        }
        info!(
            event = "phase_end",
            phase = "Special Courses",
            phase_index = 0,
            duration_ms = started.elapsed().as_millis() as u64,
            enrolled,
        );

        let started = Instant::now();
        info!(event = "phase_start", phase = "Other Courses", phase_index = 1);
        let mut enrolled = 0u64;
        for &idx in &order {
            let student = &school.students()[idx];
            let held: Vec<CourseId> = enrollment
                .sections_of(&student.id)
                .iter()
                .filter_map(|id| school.section(id))
                .map(|s| s.course_id.clone())
                .collect();

            let mut candidates: Vec<(SectionId, f64)> = student
                .requests
                .iter()
                .filter(|c| !held.contains(c) && !special.contains(c))
                .filter_map(|c| scorer.best_section(student, c, &enrollment, schedule))
                .collect();
            candidates.sort_by(|a, b| b.1.total_cmp(&a.1));

            for (section_id, _) in candidates {
                let Some(section) = school.section(&section_id) else {
                    continue;
                };
                let score = scorer.score(student, section, &enrollment, schedule);
                if score > 0.0 {
                    debug!(event = "student_enrolled", student = %student.id, section = %section_id, score);
                    enrollment.enroll(student.id.clone(), section_id);
                    enrolled += 1;
                }
            }
        }
        info!(
            event = "phase_end",
            phase = "Other Courses",
            phase_index = 1,
            duration_ms = started.elapsed().as_millis() as u64,
            enrolled,
        );

        let missed = missed_requests(school, &enrollment);
        StudentAssignment { enrollment, missed }
    }
}
