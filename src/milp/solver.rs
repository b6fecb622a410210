//! Solver adapter contract.
//!
//! The crate ships no MILP backend. A backend implements [`MilpSolver`],
//! receives the model, a warm start and a budget, and reports how it
//! terminated. Everything on this side of the boundary is plain data.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::model::{MilpModel, VarKey, VariableAssignment};
use crate::models::{EnrollmentAssignment, ScheduleAssignment, School, SectionId};

/// Values above this count as 1 for binary variables.
pub const BINARY_THRESHOLD: f64 = 0.5;

/// Cooperative cancellation flag shared between caller and solver.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. The solver should return its incumbent.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Initial variable values derived from a greedy solution.
///
/// Not necessarily feasible: a greedy solution may leave placeable
/// sections without a period and may seat more SPED students than the
/// hard cap.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WarmStart {
    values: VariableAssignment,
}

impl WarmStart {
    /// Sets `x`, `z`, `y`, `missed` and `overflow` to match the given
    /// schedule and enrollment.
    pub fn from_solution(
        model: &MilpModel,
        school: &School,
        schedule: &ScheduleAssignment,
        enrollment: &EnrollmentAssignment,
    ) -> Self {
        let mut values = VariableAssignment::zeros(model.variable_count());
        for (id, var) in model.iter_variables() {
            let value = match &var.key {
                VarKey::Schedule { section, period } => indicator(schedule.is_in(section, period)),
                VarKey::Enroll { student, section } => {
                    indicator(enrollment.is_enrolled(student, section))
                }
                VarKey::CoOccur {
                    student,
                    section,
                    period,
                } => indicator(
                    enrollment.is_enrolled(student, section) && schedule.is_in(section, period),
                ),
                VarKey::Missed { student, course } => {
                    let held = enrollment
                        .sections_of(student)
                        .iter()
                        .filter_map(|s| school.section(s))
                        .any(|s| &s.course_id == course);
                    indicator(!held)
                }
                VarKey::Overflow { section } => school.section(section).map_or(0.0, |s| {
                    enrollment.count(section).saturating_sub(s.capacity as usize) as f64
                }),
            };
            values.set(id, value);
        }
        Self { values }
    }

    pub fn values(&self) -> &VariableAssignment {
        &self.values
    }
}

fn indicator(flag: bool) -> f64 {
    if flag {
        1.0
    } else {
        0.0
    }
}

/// Everything a backend needs for one solve.
#[derive(Debug, Clone)]
pub struct SolveRequest<'a> {
    pub model: &'a MilpModel,
    pub warm_start: &'a WarmStart,
    /// Wall-clock budget.
    pub time_limit: Duration,
    /// Relative optimality gap at which the solver may stop.
    pub mip_gap: f64,
    pub cancel: CancelToken,
}

/// How a solve ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SolverOutcome {
    /// Proven optimal.
    Optimal(VariableAssignment),
    /// Stopped with an incumbent (gap reached, time limit or cancel).
    Feasible {
        assignment: VariableAssignment,
        gap: f64,
    },
    /// The model has no feasible solution.
    Infeasible,
    /// The backend failed.
    Error(String),
}

/// Termination status without the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverStatus {
    Optimal,
    Feasible,
    Infeasible,
    Error,
}

impl fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Optimal => "OPTIMAL",
            Self::Feasible => "FEASIBLE",
            Self::Infeasible => "INFEASIBLE",
            Self::Error => "ERROR",
        };
        f.write_str(name)
    }
}

impl SolverOutcome {
    pub fn status(&self) -> SolverStatus {
        match self {
            Self::Optimal(_) => SolverStatus::Optimal,
            Self::Feasible { .. } => SolverStatus::Feasible,
            Self::Infeasible => SolverStatus::Infeasible,
            Self::Error(_) => SolverStatus::Error,
        }
    }

    /// The incumbent, if any.
    pub fn assignment(&self) -> Option<&VariableAssignment> {
        match self {
            Self::Optimal(a) | Self::Feasible { assignment: a, .. } => Some(a),
            Self::Infeasible | Self::Error(_) => None,
        }
    }

    /// Remaining optimality gap (0 when optimal).
    pub fn gap(&self) -> Option<f64> {
        match self {
            Self::Optimal(_) => Some(0.0),
            Self::Feasible { gap, .. } => Some(*gap),
            Self::Infeasible | Self::Error(_) => None,
        }
    }
}

/// A MILP backend.
pub trait MilpSolver: Send + Sync {
    /// Backend name used in log events.
    fn name(&self) -> &str {
        "milp"
    }

    /// Solves the model. Must honor `request.time_limit` and
    /// `request.cancel` by returning its incumbent as
    /// [`SolverOutcome::Feasible`].
    fn solve(&self, request: SolveRequest<'_>) -> SolverOutcome;
}

/// Why solver values could not be turned into a schedule.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("assignment has {actual} values, model has {expected} variables")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("variable {key} has non-finite value")]
    NonFinite { key: String },

    #[error("section {section} placed in more than one period")]
    MultiplePeriods { section: SectionId },
}

/// Reads the schedule and enrollment out of solver values.
///
/// Binary variables are rounded at [`BINARY_THRESHOLD`]. `y`, `missed` and
/// `overflow` are implied by `x` and `z` and are not read back.
pub fn decode(
    model: &MilpModel,
    values: &VariableAssignment,
) -> Result<(ScheduleAssignment, EnrollmentAssignment), DecodeError> {
    if values.len() != model.variable_count() {
        return Err(DecodeError::LengthMismatch {
            expected: model.variable_count(),
            actual: values.len(),
        });
    }

    let mut schedule = ScheduleAssignment::new();
    let mut enrollment = EnrollmentAssignment::new();
    for (id, var) in model.iter_variables() {
        let value = values.value(id);
        if !value.is_finite() {
            return Err(DecodeError::NonFinite {
                key: var.key.to_string(),
            });
        }
        if value <= BINARY_THRESHOLD {
            continue;
        }
        match &var.key {
            VarKey::Schedule { section, period } => {
                if schedule.is_scheduled(section) {
                    return Err(DecodeError::MultiplePeriods {
                        section: section.clone(),
                    });
                }
                schedule.assign(section.clone(), period.clone());
            }
            VarKey::Enroll { student, section } => {
                enrollment.enroll(student.clone(), section.clone());
            }
            _ => {}
        }
    }
    Ok((schedule, enrollment))
}
