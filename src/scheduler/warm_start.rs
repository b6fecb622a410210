//! Warm-start strategies.
//!
//! A warm start is a complete greedy solution: a section schedule plus an
//! enrollment. Two strategies exist:
//!
//! | Strategy | Sections | Students |
//! |----------|----------|----------|
//! | `AdvancedGreedy` | phased, priority-ordered, scored | hardest-first, scored |
//! | `SimpleGreedy` | first fit | first fit |
//!
//! Each strategy verifies its own output against the hard invariants and
//! reports a typed [`WarmStartError`] instead of handing back a broken
//! solution. [`WarmStartPolicy`] tries the configured strategy and falls
//! back from `AdvancedGreedy` to `SimpleGreedy` on failure.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use super::sections::SectionScheduler;
use super::simple::SimpleGreedy;
use super::students::{missed_requests, MissedRequest, StudentAssigner};
use crate::config::SchedulerConfig;
use crate::models::{EnrollmentAssignment, ScheduleAssignment, School, SectionId, Violation};
use crate::validation::verify_solution;

/// Typed failure of a warm-start strategy.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WarmStartError {
    /// No periods to schedule into.
    #[error("period sequence is empty")]
    EmptyPeriodSequence,

    /// The constructed solution breaks hard constraints.
    #[error("construction violates {} hard constraint(s)", violations.len())]
    InfeasibleConstruction { violations: Vec<Violation> },
}

/// How the warm start is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarmStartStrategy {
    /// Phased, scored greedy.
    #[default]
    AdvancedGreedy,
    /// First-fit greedy.
    SimpleGreedy,
}

/// A complete greedy solution.
#[derive(Debug, Clone, PartialEq)]
pub struct GreedySolution {
    pub schedule: ScheduleAssignment,
    pub enrollment: EnrollmentAssignment,
    /// Sections left without a period, in input order.
    pub unscheduled: Vec<SectionId>,
    /// Requests left without a section.
    pub missed: Vec<MissedRequest>,
    /// Strategy that produced this solution.
    pub strategy: WarmStartStrategy,
}

impl WarmStartStrategy {
    /// Strategy name used in log events.
    pub fn name(self) -> &'static str {
        match self {
            Self::AdvancedGreedy => "Advanced Greedy",
            Self::SimpleGreedy => "Simple Greedy",
        }
    }

    /// Builds a warm start with this strategy.
    pub fn build(
        self,
        school: &School,
        config: &SchedulerConfig,
    ) -> Result<GreedySolution, WarmStartError> {
        if school.periods().is_empty() {
            return Err(WarmStartError::EmptyPeriodSequence);
        }

        let (schedule, unscheduled, enrollment, missed) = match self {
            Self::AdvancedGreedy => {
                let sections = SectionScheduler::new(config).schedule(school);
                let students = StudentAssigner::new(config).assign(school, &sections.schedule);
                (
                    sections.schedule,
                    sections.unscheduled,
                    students.enrollment,
                    students.missed,
                )
            }
            Self::SimpleGreedy => {
                let greedy = SimpleGreedy::new();
                let (schedule, unscheduled) = greedy.schedule_sections(school);
                let enrollment = greedy.enroll_students(school, &schedule);
                let missed = missed_requests(school, &enrollment);
                (schedule, unscheduled, enrollment, missed)
            }
        };

        let violations = verify_solution(school, &schedule, &enrollment);
        if !violations.is_empty() {
            return Err(WarmStartError::InfeasibleConstruction { violations });
        }

        Ok(GreedySolution {
            schedule,
            enrollment,
            unscheduled,
            missed,
            strategy: self,
        })
    }
}

/// A warm start and whether it came from the fallback strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct WarmStartOutcome {
    pub solution: GreedySolution,
    /// Why the preferred strategy was abandoned, if it was.
    pub fallback: Option<String>,
}

/// Tries the preferred strategy, then falls back to `SimpleGreedy`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WarmStartPolicy {
    preferred: WarmStartStrategy,
}

impl WarmStartPolicy {
    pub fn new(preferred: WarmStartStrategy) -> Self {
        Self { preferred }
    }

    /// Generates a warm start.
    ///
    /// Fails only if the fallback strategy (or a preferred `SimpleGreedy`)
    /// fails too.
    pub fn generate(
        &self,
        school: &School,
        config: &SchedulerConfig,
    ) -> Result<WarmStartOutcome, WarmStartError> {
        let started = Instant::now();
        info!(event = "warm_start", strategy = self.preferred.name());

        let outcome = match self.preferred.build(school, config) {
            Ok(solution) => WarmStartOutcome {
                solution,
                fallback: None,
            },
            Err(err) if self.preferred == WarmStartStrategy::AdvancedGreedy => {
                warn!(
                    event = "warm_start_fallback",
                    from = self.preferred.name(),
                    to = WarmStartStrategy::SimpleGreedy.name(),
                    error = %err,
                );
                let solution = WarmStartStrategy::SimpleGreedy.build(school, config)?;
                WarmStartOutcome {
                    solution,
                    fallback: Some(err.to_string()),
                }
            }
            Err(err) => return Err(err),
        };

        info!(
            event = "warm_start_end",
            strategy = outcome.solution.strategy.name(),
            duration_ms = started.elapsed().as_millis() as u64,
            scheduled = outcome.solution.schedule.len() as u64,
            enrolled = outcome.solution.enrollment.total() as u64,
            missed = outcome.solution.missed.len() as u64,
        );
        Ok(outcome)
    }
}
