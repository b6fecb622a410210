//! Solution extraction.
//!
//! Turns a final schedule and enrollment into the output tables. Rows come
//! out in input order (sections, then students) so repeated runs produce
//! identical tables.

use serde::Serialize;

use crate::config::SpedPolicy;
use crate::milp::SolverStatus;
use crate::models::{EnrollmentAssignment, ScheduleAssignment, School};
use crate::report::ViolationReport;
use crate::scheduler::WarmStartStrategy;
use crate::tables::{OutputTables, SectionPeriodRow, StudentSectionRow, TeacherScheduleRow};

/// Where a solution came from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum SolutionSource {
    /// A greedy construction, used as-is.
    Greedy { strategy: WarmStartStrategy },
    /// The MILP backend's incumbent.
    Solver { status: SolverStatus, gap: f64 },
}

/// A final timetable.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub schedule: ScheduleAssignment,
    pub enrollment: EnrollmentAssignment,
    pub source: SolutionSource,
}

impl Solution {
    /// Soft-constraint metrics of this solution under `sped`.
    pub fn report(&self, school: &School, sped: &SpedPolicy) -> ViolationReport {
        ViolationReport::calculate(school, &self.schedule, &self.enrollment, sped)
    }
}

/// Produces the four output tables.
pub fn extract_tables(school: &School, solution: &Solution, sped: &SpedPolicy) -> OutputTables {
    extract_with_report(school, solution, &solution.report(school, sped))
}

/// Produces the output tables using an already computed report.
pub fn extract_with_report(
    school: &School,
    solution: &Solution,
    report: &ViolationReport,
) -> OutputTables {
    let mut section_schedule = Vec::new();
    let mut teacher_schedule = Vec::new();
    for section in school.sections() {
        if let Some(period) = solution.schedule.period_of(&section.id) {
            section_schedule.push(SectionPeriodRow {
                section_id: section.id.clone(),
                period: period.clone(),
            });
            teacher_schedule.push(TeacherScheduleRow {
                teacher_id: section.teacher_id.clone(),
                section_id: section.id.clone(),
                period: period.clone(),
            });
        }
    }

    let student_assignments = school
        .students()
        .iter()
        .flat_map(|student| {
            solution
                .enrollment
                .sections_of(&student.id)
                .iter()
                .map(|section| StudentSectionRow {
                    student_id: student.id.clone(),
                    section_id: section.clone(),
                })
        })
        .collect();

    OutputTables {
        section_schedule,
        student_assignments,
        teacher_schedule,
        violations: report.to_rows(),
    }
}
