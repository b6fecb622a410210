//! Solution quality report.
//!
//! Computes the soft-constraint picture of a finished timetable.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Missed requests | Requests with no enrolled section of the course |
//! | Sections over capacity | Sections with enrollment > capacity |
//! | Total overages | Σ max(0, enrollment − capacity) |
//! | SPED-crowded sections | Sections with more SPED students than the decay threshold |
//! | Satisfied rate | Fraction of requests met |
//! | Scheduled rate | Fraction of sections with a period |

use serde::Serialize;

use crate::config::SpedPolicy;
use crate::models::{EnrollmentAssignment, ScheduleAssignment, School};
use crate::scheduler::missed_requests;
use crate::tables::ViolationRow;

/// Metric name of the missed-request row.
pub const MISSED_REQUESTS: &str = "Missed Requests";
/// Metric name of the capacity row.
pub const SECTIONS_OVER_CAPACITY: &str = "Sections Over Capacity";

/// Soft-constraint metrics of a solution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViolationReport {
    /// Requests left without a section.
    pub missed_requests: usize,
    /// All requests.
    pub total_requests: usize,
    /// `missed / total · 100` (0 when there are no requests).
    pub missed_percentage: f64,
    /// Sections enrolled beyond capacity.
    pub sections_over_capacity: usize,
    /// All sections.
    pub total_sections: usize,
    /// Σ seats beyond capacity.
    pub total_overages: usize,
    /// Sections without a period.
    pub unscheduled_sections: usize,
    /// Sections holding more SPED students than the decay threshold.
    pub sped_crowded_sections: usize,
    /// Fraction of requests met (0.0..1.0).
    pub satisfied_rate: f64,
    /// Fraction of sections placed (0.0..1.0).
    pub scheduled_rate: f64,
}

impl ViolationReport {
    /// Computes the report, counting SPED crowding against `sped`'s decay
    /// threshold.
    pub fn calculate(
        school: &School,
        schedule: &ScheduleAssignment,
        enrollment: &EnrollmentAssignment,
        sped: &SpedPolicy,
    ) -> Self {
        let total_requests = school.total_requests();
        let missed = missed_requests(school, enrollment).len();

        let mut over = 0;
        let mut overages = 0;
        let mut unscheduled = 0;
        let mut crowded = 0;
        for section in school.sections() {
            let count = enrollment.count(&section.id);
            let excess = count.saturating_sub(section.capacity as usize);
            if excess > 0 {
                over += 1;
                overages += excess;
            }
            if !schedule.is_scheduled(&section.id) {
                unscheduled += 1;
            }
            if let Some(threshold) = sped.decay_threshold {
                let sped_count = enrollment
                    .roster(&section.id)
                    .iter()
                    .filter(|s| school.is_sped(s))
                    .count();
                if sped_count > threshold as usize {
                    crowded += 1;
                }
            }
        }

        let total_sections = school.sections().len();
        let (missed_percentage, satisfied_rate) = if total_requests == 0 {
            (0.0, 1.0)
        } else {
            let rate = missed as f64 / total_requests as f64;
            (rate * 100.0, 1.0 - rate)
        };
        let scheduled_rate = if total_sections == 0 {
            1.0
        } else {
            (total_sections - unscheduled) as f64 / total_sections as f64
        };

        Self {
            missed_requests: missed,
            total_requests,
            missed_percentage,
            sections_over_capacity: over,
            total_sections,
            total_overages: overages,
            unscheduled_sections: unscheduled,
            sped_crowded_sections: crowded,
            satisfied_rate,
            scheduled_rate,
        }
    }

    /// The two rows of the violations output table.
    pub fn to_rows(&self) -> Vec<ViolationRow> {
        vec![
            ViolationRow {
                metric: MISSED_REQUESTS.to_string(),
                count: saturate(self.missed_requests),
                total: saturate(self.total_requests),
                percentage: Some(self.missed_percentage),
                total_overages: None,
            },
            ViolationRow {
                metric: SECTIONS_OVER_CAPACITY.to_string(),
                count: saturate(self.sections_over_capacity),
                total: saturate(self.total_sections),
                percentage: None,
                total_overages: Some(saturate(self.total_overages)),
            },
        ]
    }

    /// Whether the solution meets the given quality thresholds.
    pub fn meets_thresholds(&self, min_satisfied_rate: f64, max_overages: usize) -> bool {
        self.satisfied_rate >= min_satisfied_rate && self.total_overages <= max_overages
    }
}

fn saturate(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
