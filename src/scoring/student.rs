//! Student-section scorer.
//!
//! Scores how good a candidate section is for a student given the partial
//! enrollment. Returns 0 when the student already holds the course, did not
//! request it, the section has no period, the student is busy in that
//! period, or the section is full (capacity 0 counts as full).
//!
//! Otherwise: `(fill_headroom − fill_ratio)`, times a SPED crowding decay
//! `sped_decay_base^(k − threshold + 1)` once `k ≥ threshold` SPED students
//! already sit in the section, times `scarcity_boost` when the course has
//! at most `scarcity_threshold` scheduled sections.
//!
//! The SPED decay is the greedy path's soft policy; the exact formulation
//! uses a hard cap instead (see [`SpedPolicy`](crate::config::SpedPolicy)).

use crate::config::EnrollmentScoreWeights;
use crate::models::{
    CourseId, EnrollmentAssignment, ScheduleAssignment, School, Section, SectionId, Student,
};

/// Scores candidate sections for students.
#[derive(Debug, Clone, Copy)]
pub struct EnrollmentScorer<'a> {
    school: &'a School,
    weights: &'a EnrollmentScoreWeights,
    sped_threshold: Option<u32>,
}

impl<'a> EnrollmentScorer<'a> {
    pub fn new(
        school: &'a School,
        weights: &'a EnrollmentScoreWeights,
        sped_threshold: Option<u32>,
    ) -> Self {
        Self {
            school,
            weights,
            sped_threshold,
        }
    }

    /// Score of enrolling `student` in `section`. Always ≥ 0.
    pub fn score(
        &self,
        student: &Student,
        section: &Section,
        enrollment: &EnrollmentAssignment,
        schedule: &ScheduleAssignment,
    ) -> f64 {
        let school = self.school;
        let held = enrollment.sections_of(&student.id);

        let holds_course = held.iter().any(|id| {
            school
                .section(id)
                .is_some_and(|s| s.course_id == section.course_id)
        });
        if holds_course || !student.requests(&section.course_id) {
            return 0.0;
        }
        let Some(period) = schedule.period_of(&section.id) else {
            return 0.0;
        };
        if held.iter().any(|id| schedule.is_in(id, period)) {
            return 0.0;
        }
        let roster = enrollment.roster(&section.id);
        if roster.len() >= section.capacity as usize {
            return 0.0;
        }

        let fill_ratio = roster.len() as f64 / section.capacity as f64;
        let mut score = self.weights.fill_headroom - fill_ratio;

        if let (true, Some(threshold)) = (student.sped, self.sped_threshold) {
            let k = roster.iter().filter(|s| school.is_sped(s)).count() as i32;
            let threshold = threshold as i32;
            if k >= threshold {
                score *= self.weights.sped_decay_base.powi(k - threshold + 1);
            }
        }

        if self.scheduled_sections(&section.course_id, schedule) <= self.weights.scarcity_threshold
        {
            score *= self.weights.scarcity_boost;
        }

        score
    }

    /// Best section of `course` for `student`: highest score over the
    /// course's scheduled sections in input order, first maximum wins.
    /// `None` if no section scores above zero.
    pub fn best_section(
        &self,
        student: &Student,
        course: &CourseId,
        enrollment: &EnrollmentAssignment,
        schedule: &ScheduleAssignment,
    ) -> Option<(SectionId, f64)> {
        let mut best: Option<(&Section, f64)> = None;
        for id in self.school.sections_of_course(course) {
            let Some(section) = self.school.section(id) else {
                continue;
            };
            let score = self.score(student, section, enrollment, schedule);
            if score > best.map_or(0.0, |(_, b)| b) {
                best = Some((section, score));
            }
        }
        best.map(|(s, score)| (s.id.clone(), score))
    }

    fn scheduled_sections(&self, course: &CourseId, schedule: &ScheduleAssignment) -> usize {
        self.school
            .sections_of_course(course)
            .iter()
            .filter(|id| schedule.is_scheduled(id))
            .count()
    }
}
