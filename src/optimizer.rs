//! End-to-end orchestration.
//!
//! # Pipeline
//!
//! 1. Build a warm start with the configured [`WarmStartStrategy`]
//!    (falling back to `SimpleGreedy`).
//! 2. Without a solver, the warm start is the answer.
//! 3. With a solver: formulate the MILP, solve from the warm start, decode
//!    and verify the incumbent against the model rows and the hard
//!    invariants. Infeasible and error outcomes fall back to the warm
//!    start, as does any incumbent that fails to decode or breaks a hard
//!    row.
//! 4. Extract output tables and the violation report.
//!
//! Every non-fatal condition ends up in [`RunDiagnostics`].
//!
//! [`WarmStartStrategy`]: crate::scheduler::WarmStartStrategy

use std::fmt;
use std::time::Instant;

use tracing::{info, warn};

use crate::config::SchedulerConfig;
use crate::error::{Result, SchedulingError};
use crate::extract::{extract_with_report, Solution, SolutionSource};
use crate::milp::{
    decode, CancelToken, ConstraintKind, MilpSolver, SolveRequest, SolverOutcome, SolverStatus,
    TimetableMilpBuilder, WarmStart,
};
use crate::models::{School, SectionId};
use crate::report::ViolationReport;
use crate::scheduler::{missed_requests, GreedySolution, MissedRequest, WarmStartPolicy};
use crate::tables::{InputTables, OutputTables};
use crate::validation::{verify_solution, ValidationIssue};

/// Slack allowed on a model row before an incumbent is rejected.
const ROW_TOLERANCE: f64 = 1e-6;

/// Non-fatal conditions of a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunDiagnostics {
    /// Sections without a period in the final solution, input order.
    pub unscheduled_sections: Vec<SectionId>,
    /// Requests without a section in the final solution.
    pub missed_requests: Vec<MissedRequest>,
    /// Why the preferred warm-start strategy was abandoned.
    pub warm_start_fallback: Option<String>,
    /// How the solver terminated, if one ran.
    pub solver_status: Option<SolverStatus>,
    /// Why the solver's result was not used.
    pub solver_fallback: Option<String>,
    /// Warnings raised while loading the school.
    pub validation_warnings: Vec<ValidationIssue>,
}

/// Result of a run.
#[derive(Debug, Clone)]
pub struct OptimizationRun {
    pub solution: Solution,
    pub tables: OutputTables,
    pub report: ViolationReport,
    pub diagnostics: RunDiagnostics,
}

/// Runs greedy construction and, optionally, an exact solver.
///
/// # Example
/// ```
/// use u_timetable::config::SchedulerConfig;
/// use u_timetable::optimizer::ScheduleOptimizer;
/// use u_timetable::tables::InputTables;
///
/// let tables = InputTables::new()
///     .with_student("A", false)
///     .with_section("S1", "Math", "T1", 30)
///     .with_preference("A", &["Math"]);
///
/// let run = ScheduleOptimizer::new(SchedulerConfig::plain(&["P1", "P2"]))
///     .run_tables(&tables)
///     .unwrap();
/// assert_eq!(run.report.missed_requests, 0);
/// assert_eq!(run.tables.student_assignments.len(), 1);
/// ```
pub struct ScheduleOptimizer {
    config: SchedulerConfig,
    solver: Option<Box<dyn MilpSolver>>,
    cancel: CancelToken,
}

impl ScheduleOptimizer {
    /// Creates a greedy-only optimizer.
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            solver: None,
            cancel: CancelToken::new(),
        }
    }

    /// Adds an exact solver.
    pub fn with_solver(mut self, solver: Box<dyn MilpSolver>) -> Self {
        self.solver = Some(solver);
        self
    }

    /// Shares a cancellation token with the solver.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Loads the school from tables, then runs.
    pub fn run_tables(&self, tables: &InputTables) -> Result<OptimizationRun> {
        let school = School::from_tables(tables, &self.config)?;
        self.run(&school)
    }

    /// Runs the pipeline on a loaded school.
    pub fn run(&self, school: &School) -> Result<OptimizationRun> {
        let started = Instant::now();
        let mut diagnostics = RunDiagnostics {
            validation_warnings: school.warnings().to_vec(),
            ..RunDiagnostics::default()
        };

        let greedy = match WarmStartPolicy::new(self.config.warm_start).generate(school, &self.config) {
            Ok(outcome) => {
                diagnostics.warm_start_fallback = outcome.fallback;
                Some(outcome.solution)
            }
            Err(err) => {
                warn!(event = "warm_start_failed", error = %err);
                diagnostics.warm_start_fallback = Some(err.to_string());
                None
            }
        };

        let solution = match &self.solver {
            Some(solver) => self.solve(school, solver.as_ref(), greedy, &mut diagnostics)?,
            None => match greedy {
                Some(g) => greedy_solution(g),
                None => {
                    return Err(SchedulingError::NoFeasibleAssignment(
                        diagnostics
                            .warm_start_fallback
                            .clone()
                            .unwrap_or_else(|| "warm start failed".to_string()),
                    ))
                }
            },
        };

        diagnostics.unscheduled_sections = school
            .sections()
            .iter()
            .filter(|s| !solution.schedule.is_scheduled(&s.id))
            .map(|s| s.id.clone())
            .collect();
        diagnostics.missed_requests = missed_requests(school, &solution.enrollment);

        let report =
            ViolationReport::calculate(school, &solution.schedule, &solution.enrollment, &self.config.sped);
        let tables = extract_with_report(school, &solution, &report);

        info!(
            event = "run_end",
            duration_ms = started.elapsed().as_millis() as u64,
            missed = report.missed_requests as u64,
            overages = report.total_overages as u64,
            unscheduled = report.unscheduled_sections as u64,
        );

        Ok(OptimizationRun {
            solution,
            tables,
            report,
            diagnostics,
        })
    }

    fn solve(
        &self,
        school: &School,
        solver: &dyn MilpSolver,
        greedy: Option<GreedySolution>,
        diagnostics: &mut RunDiagnostics,
    ) -> Result<Solution> {
        let model = TimetableMilpBuilder::from_config(school, &self.config).build();
        let warm_start = match &greedy {
            Some(g) => WarmStart::from_solution(&model, school, &g.schedule, &g.enrollment),
            None => WarmStart::default(),
        };

        let started = Instant::now();
        info!(
            event = "solve_start",
            solver = solver.name(),
            variables = model.variable_count() as u64,
            constraints = model.constraint_count() as u64,
            time_limit_secs = self.config.solver.time_limit_secs,
        );
        let outcome = solver.solve(SolveRequest {
            model: &model,
            warm_start: &warm_start,
            time_limit: self.config.solver.time_limit(),
            mip_gap: self.config.solver.mip_gap,
            cancel: self.cancel.clone(),
        });
        let status = outcome.status();
        diagnostics.solver_status = Some(status);
        info!(
            event = "solve_end",
            solver = solver.name(),
            status = %status,
            duration_ms = started.elapsed().as_millis() as u64,
        );

        let rejected = match &outcome {
            SolverOutcome::Infeasible => "solver reported the model infeasible".to_string(),
            SolverOutcome::Error(reason) => format!("solver error: {reason}"),
            SolverOutcome::Optimal(values) | SolverOutcome::Feasible { assignment: values, .. } => {
                match decode(&model, values) {
                    Err(err) => format!("malformed solver assignment: {err}"),
                    Ok((schedule, enrollment)) => {
                        let broken_rows: Vec<ConstraintKind> = model
                            .violated_constraints(values, ROW_TOLERANCE)
                            .map(|c| c.kind)
                            .filter(|kind| kind.disqualifies())
                            .collect();
                        let hard: Vec<_> = verify_solution(school, &schedule, &enrollment)
                            .into_iter()
                            .filter(|v| v.is_hard())
                            .collect();
                        if broken_rows.is_empty() && hard.is_empty() {
                            return Ok(Solution {
                                schedule,
                                enrollment,
                                source: SolutionSource::Solver {
                                    status,
                                    gap: outcome.gap().unwrap_or(0.0),
                                },
                            });
                        }
                        match hard.first() {
                            Some(first) => format!(
                                "solver assignment breaks {} hard constraint(s): {}",
                                hard.len(),
                                first.message
                            ),
                            None => format!(
                                "solver assignment breaks {} hard constraint(s) of the model, first {:?}",
                                broken_rows.len(),
                                broken_rows[0]
                            ),
                        }
                    }
                }
            }
        };

        warn!(event = "solver_fallback", reason = %rejected);
        diagnostics.solver_fallback = Some(rejected.clone());
        greedy
            .map(greedy_solution)
            .ok_or(SchedulingError::NoFeasibleAssignment(rejected))
    }
}

fn greedy_solution(greedy: GreedySolution) -> Solution {
    Solution {
        schedule: greedy.schedule,
        enrollment: greedy.enrollment,
        source: SolutionSource::Greedy {
            strategy: greedy.strategy,
        },
    }
}

impl fmt::Debug for ScheduleOptimizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduleOptimizer")
            .field("config", &self.config)
            .field("solver", &self.solver.as_ref().map(|s| s.name().to_string()))
            .finish()
    }
}
