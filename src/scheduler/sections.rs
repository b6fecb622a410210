//! Greedy section scheduler.
//!
//! # Algorithm
//!
//! 1. Order sections by priority (descending, stable).
//! 2. Run four phases over that order, skipping already scheduled sections:
//!    restricted courses, the spread course, science-department sections,
//!    then everything still unscheduled.
//! 3. For each section, score every allowed period in configured order and
//!    commit the first maximum if it is strictly positive.
//!
//! Sections that never find a positive period stay unscheduled and are
//! returned in [`SectionSchedule::unscheduled`].
//!
//! # Complexity
//! O(s · p · s) where s = sections, p = periods (each score scans the
//! section's teacher, course, department and science lists).

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::config::{PeriodScoreWeights, SchedulerConfig};
use crate::models::{ScheduleAssignment, School, Section, SectionId};
use crate::priority::PriorityEngine;
use crate::scoring::PeriodScorer;

/// Section scheduling phases, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionPhase {
    /// Sections of period-restricted courses.
    Restricted,
    /// Sections of the flagged spread course.
    SpreadCourse,
    /// Science-department sections.
    Science,
    /// Everything not yet scheduled.
    Remaining,
}

impl SectionPhase {
    /// All phases in execution order.
    pub const ALL: [SectionPhase; 4] = [
        Self::Restricted,
        Self::SpreadCourse,
        Self::Science,
        Self::Remaining,
    ];

    /// Phase name used in log events.
    pub fn name(self) -> &'static str {
        match self {
            Self::Restricted => "Restricted Courses",
            Self::SpreadCourse => "Spread Course",
            Self::Science => "Science",
            Self::Remaining => "Remaining Sections",
        }
    }

    /// Whether `section` belongs to this phase.
    pub fn includes(self, section: &Section, school: &School) -> bool {
        match self {
            Self::Restricted => school.is_restricted(&section.course_id),
            Self::SpreadCourse => school.is_spread_course(&section.course_id),
            Self::Science => school.is_science_department(&section.id),
            Self::Remaining => true,
        }
    }
}

/// Result of the section scheduler.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionSchedule {
    /// Section → period placements.
    pub schedule: ScheduleAssignment,
    /// Sections no period could take, in input order.
    pub unscheduled: Vec<SectionId>,
}

/// Greedy, phased section scheduler.
///
/// # Example
///
/// ```
/// use u_timetable::config::SchedulerConfig;
/// use u_timetable::models::School;
/// use u_timetable::scheduler::SectionScheduler;
/// use u_timetable::tables::InputTables;
///
/// let config = SchedulerConfig::plain(&["P1", "P2"]);
/// let tables = InputTables::new()
///     .with_section("S1", "Math", "T1", 30)
///     .with_section("S2", "Art", "T1", 30)
///     .with_preference("A", &[]);
/// let school = School::from_tables(&tables, &config).unwrap();
///
/// let result = SectionScheduler::new(&config).schedule(&school);
/// assert_eq!(result.schedule.len(), 2);
/// assert!(result.unscheduled.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct SectionScheduler {
    priority: PriorityEngine,
    weights: PeriodScoreWeights,
}

impl SectionScheduler {
    /// Creates a scheduler from configuration.
    pub fn new(config: &SchedulerConfig) -> Self {
        Self {
            priority: PriorityEngine::from_weights(&config.weights.section_priority),
            weights: config.weights.period_score.clone(),
        }
    }

    /// Replaces the priority engine.
    pub fn with_priority_engine(mut self, engine: PriorityEngine) -> Self {
        self.priority = engine;
        self
    }

    /// Schedules the school's sections.
    pub fn schedule(&self, school: &School) -> SectionSchedule {
        let order = self.priority.sort_indices(school);
        let scorer = PeriodScorer::new(school, &self.weights);
        let mut schedule = ScheduleAssignment::new();

        for (phase_index, phase) in SectionPhase::ALL.into_iter().enumerate() {
            let started = Instant::now();
            info!(event = "phase_start", phase = phase.name(), phase_index);

            let mut placed = 0u64;
            for &idx in &order {
                let section = &school.sections()[idx];
                if schedule.is_scheduled(&section.id) || !phase.includes(section, school) {
                    continue;
                }
                if let Some((period, score)) = scorer.best_period(section, &schedule) {
                    debug!(
                        event = "section_placed",
                        section = %section.id,
                        period = %period,
                        score,
                    );
                    schedule.assign(section.id.clone(), period);
                    placed += 1;
                }
            }

            info!(
                event = "phase_end",
                phase = phase.name(),
                phase_index,
                duration_ms = started.elapsed().as_millis() as u64,
                scheduled = placed,
            );
        }

        let unscheduled: Vec<SectionId> = school
            .sections()
            .iter()
            .filter(|s| !schedule.is_scheduled(&s.id))
            .map(|s| s.id.clone())
            .collect();
        for id in &unscheduled {
            warn!(event = "section_unscheduled", section = %id, "no period scores above zero");
        }

        SectionSchedule {
            schedule,
            unscheduled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::InputTables;

    fn build(tables: InputTables, config: &SchedulerConfig) -> School {
        School::from_tables(&tables.with_preference("X", &[]), config).unwrap()
    }

    #[test]
    fn test_restricted_single_section_takes_first_allowed() {
        let config = SchedulerConfig::plain(&["P1", "P2", "P3"]).with_restriction("Lab", &["P1", "P2"]);
        let school = build(InputTables::new().with_section("S1", "Lab", "T1", 10), &config);
        let result = SectionScheduler::new(&config).schedule(&school);
        assert_eq!(result.schedule.period_of(&"S1".into()), Some(&"P1".into()));
    }

    #[test]
    fn test_restricted_siblings_spread_over_required_periods() {
        let config = SchedulerConfig::plain(&["P1", "P2", "P3"]).with_restriction("Lab", &["P1", "P3"]);
        let school = build(
            InputTables::new()
                .with_section("S1", "Lab", "T1", 10)
                .with_section("S2", "Lab", "T2", 10),
            &config,
        );
        let result = SectionScheduler::new(&config).schedule(&school);
        assert_eq!(result.schedule.period_of(&"S1".into()), Some(&"P1".into()));
        assert_eq!(result.schedule.period_of(&"S2".into()), Some(&"P3".into()));
    }

    #[test]
    fn test_teacher_sections_never_share_period() {
        let config = SchedulerConfig::plain(&["P1", "P2"]);
        let school = build(
            InputTables::new()
                .with_section("S1", "Math", "T1", 10)
                .with_section("S2", "Art", "T1", 10)
                .with_section("S3", "Music", "T1", 10),
            &config,
        );
        let result = SectionScheduler::new(&config).schedule(&school);
        assert_eq!(result.schedule.len(), 2);
        assert_eq!(result.unscheduled, vec![SectionId::from("S3")]);
        assert_ne!(
            result.schedule.period_of(&"S1".into()),
            result.schedule.period_of(&"S2".into())
        );
    }

    #[test]
    fn test_unavailable_teacher_leaves_section_unscheduled() {
        let config = SchedulerConfig::plain(&["P1", "P2"]).with_restriction("Lab", &["P1"]);
        let school = build(
            InputTables::new()
                .with_teacher("T1", &["P1"])
                .with_section("S1", "Lab", "T1", 10),
            &config,
        );
        let result = SectionScheduler::new(&config).schedule(&school);
        assert!(result.schedule.is_empty());
        assert_eq!(result.unscheduled, vec![SectionId::from("S1")]);
    }

    #[test]
    fn test_restricted_phase_runs_first() {
        // Plain section appears first in input but the restricted one must
        // get its only period.
        let config = SchedulerConfig::plain(&["P1", "P2"]).with_restriction("Lab", &["P1"]);
        let school = build(
            InputTables::new()
                .with_section("S1", "Math", "T1", 10)
                .with_section("S2", "Lab", "T1", 10),
            &config,
        );
        let result = SectionScheduler::new(&config)
            .with_priority_engine(PriorityEngine::new())
            .schedule(&school);
        assert_eq!(result.schedule.period_of(&"S2".into()), Some(&"P1".into()));
        assert_eq!(result.schedule.period_of(&"S1".into()), Some(&"P2".into()));
    }

    #[test]
    fn test_deterministic() {
        let config = SchedulerConfig::plain(&["P1", "P2", "P3"]);
        let school = build(
            InputTables::new()
                .with_section("S1", "Math", "T1", 10)
                .with_section("S2", "Math", "T2", 10)
                .with_section("S3", "Art", "T1", 10),
            &config,
        );
        let scheduler = SectionScheduler::new(&config);
        assert_eq!(scheduler.schedule(&school), scheduler.schedule(&school));
    }
}
