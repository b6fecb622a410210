//! Period scorer.
//!
//! Scores how good a candidate period is for a section given the partial
//! schedule. A score of 0 means forbidden:
//! - period outside the section's allowed set
//! - teacher unavailable in the period
//! - teacher already teaching another section in the period
//!
//! Otherwise the score starts at 1.0 and is adjusted, in order, by:
//!
//! | Term | Effect |
//! |------|--------|
//! | restricted course, no sibling in period | × `required_period_boost` |
//! | `n` siblings of the same course in period | ÷ (1 + `course_crowding`·n) |
//! | `n` same-department sections in period | ÷ (1 + `department_crowding`·n) |
//! | spread course already in period | × `spread_course_penalty` |
//! | `k` science sections in adjacent periods | × `science_adjacency_decay`^k |
//! | `n` sections of any kind in period | ÷ (1 + `period_load`·n) |

use crate::config::PeriodScoreWeights;
use crate::models::{PeriodId, ScheduleAssignment, School, Section, SectionId};

/// Scores candidate periods for sections.
#[derive(Debug, Clone, Copy)]
pub struct PeriodScorer<'a> {
    school: &'a School,
    weights: &'a PeriodScoreWeights,
}

impl<'a> PeriodScorer<'a> {
    pub fn new(school: &'a School, weights: &'a PeriodScoreWeights) -> Self {
        Self { school, weights }
    }

    /// Score of placing `section` in `period`. Always ≥ 0.
    pub fn score(&self, section: &Section, period: &PeriodId, schedule: &ScheduleAssignment) -> f64 {
        let school = self.school;
        let w = self.weights;

        if !school.allows(&section.id, period) {
            return 0.0;
        }
        if school
            .teacher(&section.teacher_id)
            .is_some_and(|t| !t.is_available(period))
        {
            return 0.0;
        }
        let others_in = |ids: &[SectionId]| {
            ids.iter()
                .filter(|id| **id != section.id && schedule.is_in(id, period))
                .count()
        };
        if others_in(school.sections_of_teacher(&section.teacher_id)) > 0 {
            return 0.0;
        }

        let mut score = 1.0;

        let siblings = others_in(school.sections_of_course(&section.course_id));
        if school.is_restricted(&section.course_id) && siblings == 0 {
            score *= w.required_period_boost;
        }
        if siblings > 0 {
            score /= 1.0 + w.course_crowding * siblings as f64;
        }

        if let Some(dept) = &section.department {
            let same_dept = others_in(school.sections_in_department(dept));
            if same_dept > 0 {
                score /= 1.0 + w.department_crowding * same_dept as f64;
            }
        }

        if school.is_spread_course(&section.course_id) && siblings > 0 {
            score *= w.spread_course_penalty;
        }

        if school.is_science_department(&section.id) {
            let adjacent = school.periods().adjacent(period);
            let k = school
                .science_department_sections()
                .filter(|s| s.id != section.id)
                .filter_map(|s| schedule.period_of(&s.id))
                .filter(|p| adjacent.contains(p))
                .count();
            if k > 0 {
                score *= w.science_adjacency_decay.powi(k as i32);
            }
        }

        let mut load = schedule.load(period);
        if schedule.is_in(&section.id, period) {
            load -= 1;
        }
        score / (1.0 + w.period_load * load as f64)
    }

    /// Best period for `section`: highest score over its allowed periods in
    /// configured order, first maximum wins. `None` if no period scores
    /// above zero.
    pub fn best_period(
        &self,
        section: &Section,
        schedule: &ScheduleAssignment,
    ) -> Option<(PeriodId, f64)> {
        let mut best: Option<(&PeriodId, f64)> = None;
        for period in self.school.allowed_periods(&section.id) {
            let score = self.score(section, period, schedule);
            if best.map_or(true, |(_, b)| score > b) {
                best = Some((period, score));
            }
        }
        best.filter(|&(_, s)| s > 0.0)
            .map(|(p, s)| (p.clone(), s))
    }
}
