//! End-to-end runs from JSON tables through mock solver backends.

use std::time::Duration;

use u_timetable::config::SchedulerConfig;
use u_timetable::extract::SolutionSource;
use u_timetable::milp::{
    CancelToken, MilpModel, MilpSolver, SolveRequest, SolverOutcome, SolverStatus, VarKey,
    VariableAssignment,
};
use u_timetable::optimizer::ScheduleOptimizer;
use u_timetable::tables::{InputTables, OutputTables};
use u_timetable::SchedulingError;

const TABLES: &str = r#"{
    "students": [
        {"id": "A", "grade_level": 9, "sped": "No"},
        {"id": "B", "grade_level": 10, "sped": "Yes"}
    ],
    "teachers": [
        {"id": "T1", "unavailable_periods": []},
        {"id": "T2", "unavailable_periods": ["P2"]}
    ],
    "sections": [
        {"id": "S1", "course_id": "Math", "teacher_id": "T1", "capacity": 1},
        {"id": "S2", "course_id": "Art", "teacher_id": "T2", "capacity": 10, "department": "Arts"}
    ],
    "preferences": [
        {"student_id": "A", "requested_course_ids": ["Math", "Art"]},
        {"student_id": "B", "requested_course_ids": ["Math"]}
    ],
    "periods": [{"id": "P1"}, {"id": "P2"}]
}"#;

fn tables() -> InputTables {
    InputTables::from_json_str(TABLES).unwrap()
}

fn config() -> SchedulerConfig {
    SchedulerConfig::plain(&["P1", "P2"]).with_time_limit_secs(60)
}

fn key_value(model: &MilpModel, values: &mut VariableAssignment, key: VarKey, value: f64) {
    let id = model.var(&key).unwrap();
    values.set(id, value);
}

/// Moves Math to P2 so A can take it next to Art, paying one overflow seat
/// instead of a missed request.
struct Overfill;

impl MilpSolver for Overfill {
    fn name(&self) -> &str {
        "overfill"
    }

    fn solve(&self, request: SolveRequest<'_>) -> SolverOutcome {
        let model = request.model;
        let mut values = request.warm_start.values().clone();
        let y = |student: &str, period: &str| VarKey::CoOccur {
            student: student.into(),
            section: "S1".into(),
            period: period.into(),
        };
        let z = |period: &str| VarKey::Schedule {
            section: "S1".into(),
            period: period.into(),
        };

        key_value(model, &mut values, z("P1"), 0.0);
        key_value(model, &mut values, z("P2"), 1.0);
        key_value(model, &mut values, y("B", "P1"), 0.0);
        key_value(model, &mut values, y("B", "P2"), 1.0);
        key_value(model, &mut values, VarKey::Enroll { student: "A".into(), section: "S1".into() }, 1.0);
        key_value(model, &mut values, y("A", "P2"), 1.0);
        key_value(model, &mut values, VarKey::Missed { student: "A".into(), course: "Math".into() }, 0.0);
        key_value(model, &mut values, VarKey::Overflow { section: "S1".into() }, 1.0);

        if model.violated_constraints(&values, 1e-6).count() > 0 {
            return SolverOutcome::Error("overfill broke the model".into());
        }
        SolverOutcome::Optimal(values)
    }
}

/// Checks the budget it was given and returns the warm start.
struct BudgetCheck;

impl MilpSolver for BudgetCheck {
    fn solve(&self, request: SolveRequest<'_>) -> SolverOutcome {
        if request.time_limit != Duration::from_secs(60) || (request.mip_gap - 0.10).abs() > 1e-12 {
            return SolverOutcome::Error("unexpected budget".into());
        }
        SolverOutcome::Feasible {
            assignment: request.warm_start.values().clone(),
            gap: 0.08,
        }
    }
}

/// Returns its incumbent only once cancelled.
struct WaitForCancel;

impl MilpSolver for WaitForCancel {
    fn solve(&self, request: SolveRequest<'_>) -> SolverOutcome {
        if !request.cancel.is_cancelled() {
            return SolverOutcome::Error("not cancelled".into());
        }
        SolverOutcome::Feasible {
            assignment: request.warm_start.values().clone(),
            gap: 0.5,
        }
    }
}

/// Puts both of A's sections in P1 and enrolls A in both.
struct Clashing;

impl MilpSolver for Clashing {
    fn solve(&self, request: SolveRequest<'_>) -> SolverOutcome {
        let model = request.model;
        let mut values = VariableAssignment::zeros(model.variable_count());
        for section in ["S1", "S2"] {
            key_value(model, &mut values, VarKey::Schedule { section: section.into(), period: "P1".into() }, 1.0);
            key_value(model, &mut values, VarKey::Enroll { student: "A".into(), section: section.into() }, 1.0);
        }
        SolverOutcome::Optimal(values)
    }
}

/// Returns the warm start as a timed-out incumbent.
struct Echo;

impl MilpSolver for Echo {
    fn solve(&self, request: SolveRequest<'_>) -> SolverOutcome {
        SolverOutcome::Feasible {
            assignment: request.warm_start.values().clone(),
            gap: 0.1,
        }
    }
}

struct Fixed(SolverOutcome);

impl MilpSolver for Fixed {
    fn solve(&self, _request: SolveRequest<'_>) -> SolverOutcome {
        self.0.clone()
    }
}

fn greedy_tables() -> OutputTables {
    ScheduleOptimizer::new(config()).run_tables(&tables()).unwrap().tables
}

#[test]
fn test_greedy_pipeline_from_json() {
    let run = ScheduleOptimizer::new(config()).run_tables(&tables()).unwrap();

    // Math goes first and takes P1; T2 is unavailable in P2, so Art joins it
    let schedule: Vec<(&str, &str)> = run
        .tables
        .section_schedule
        .iter()
        .map(|r| (r.section_id.as_str(), r.period.as_str()))
        .collect();
    assert_eq!(schedule, [("S1", "P1"), ("S2", "P1")]);
    assert_eq!(run.tables.teacher_schedule.len(), 2);

    // The SPED student is harder and takes the only Math seat; A could not
    // have sat both P1 sections anyway
    assert_eq!(run.diagnostics.missed_requests.len(), 1);
    assert_eq!(run.diagnostics.missed_requests[0].student_id.as_str(), "A");
    assert_eq!(run.report.total_overages, 0);

    let json = run.tables.to_json_string().unwrap();
    let back: OutputTables = serde_json::from_str(&json).unwrap();
    assert_eq!(back, run.tables);
}

#[test]
fn test_optimal_solver_result_is_used() {
    let run = ScheduleOptimizer::new(config())
        .with_solver(Box::new(Overfill))
        .run_tables(&tables())
        .unwrap();

    assert_eq!(
        run.solution.source,
        SolutionSource::Solver {
            status: SolverStatus::Optimal,
            gap: 0.0
        }
    );
    assert!(run.diagnostics.missed_requests.is_empty());
    assert_eq!(run.solution.schedule.period_of(&"S1".into()), Some(&"P2".into()));
    assert_eq!(run.report.sections_over_capacity, 1);
    assert_eq!(run.report.total_overages, 1);
    let over = run.tables.violation("Sections Over Capacity").unwrap();
    assert_eq!(over.total_overages, Some(1));
}

#[test]
fn test_feasible_with_gap_uses_configured_budget() {
    let run = ScheduleOptimizer::new(config())
        .with_solver(Box::new(BudgetCheck))
        .run_tables(&tables())
        .unwrap();
    assert_eq!(run.diagnostics.solver_status, Some(SolverStatus::Feasible));
    assert!(run.diagnostics.solver_fallback.is_none());
    assert_eq!(run.tables, greedy_tables());
}

#[test]
fn test_cancelled_solver_incumbent_is_accepted() {
    let token = CancelToken::new();
    token.cancel();
    let run = ScheduleOptimizer::new(config())
        .with_solver(Box::new(WaitForCancel))
        .with_cancel_token(token)
        .run_tables(&tables())
        .unwrap();
    assert_eq!(
        run.solution.source,
        SolutionSource::Solver {
            status: SolverStatus::Feasible,
            gap: 0.5
        }
    );
}

#[test]
fn test_infeasible_and_error_fall_back_to_greedy() {
    for (outcome, status) in [
        (SolverOutcome::Infeasible, SolverStatus::Infeasible),
        (SolverOutcome::Error("out of memory".into()), SolverStatus::Error),
    ] {
        let run = ScheduleOptimizer::new(config())
            .with_solver(Box::new(Fixed(outcome)))
            .run_tables(&tables())
            .unwrap();
        assert_eq!(run.diagnostics.solver_status, Some(status));
        assert!(run.diagnostics.solver_fallback.is_some());
        assert!(matches!(run.solution.source, SolutionSource::Greedy { .. }));
        assert_eq!(run.tables, greedy_tables());
    }
}

#[test]
fn test_clashing_solver_assignment_is_rejected() {
    let run = ScheduleOptimizer::new(config())
        .with_solver(Box::new(Clashing))
        .run_tables(&tables())
        .unwrap();
    let reason = run.diagnostics.solver_fallback.unwrap();
    assert!(reason.contains("hard constraint"), "{reason}");
    assert_eq!(run.tables, greedy_tables());
}

#[test]
fn test_missing_required_table_is_input_error() {
    let err = InputTables::from_json_str(r#"{"students": [], "sections": []}"#).unwrap_err();
    match err {
        SchedulingError::Input { table, .. } => assert_eq!(table, "Preferences"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_negative_capacity_is_input_error() {
    let tables = InputTables::new()
        .with_student("A", false)
        .with_section("S1", "Math", "T1", -2)
        .with_preference("A", &["Math"]);
    let err = ScheduleOptimizer::new(config()).run_tables(&tables).unwrap_err();
    match err {
        SchedulingError::Input { table, column, .. } => {
            assert_eq!((table, column), ("Sections", "capacity"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_incumbent_over_sped_cap_is_rejected() {
    let mut tables = InputTables::new().with_section("S1", "C", "T1", 20);
    for i in 0..13 {
        let id = format!("SP{i:02}");
        tables = tables.with_student(&id, true).with_preference(&id, &["C"]);
    }
    let config = SchedulerConfig::plain(&["P1"]);

    // The greedy decay never refuses a seat, so the echoed warm start seats
    // all thirteen and breaks the cap of twelve
    let run = ScheduleOptimizer::new(config)
        .with_solver(Box::new(Echo))
        .run_tables(&tables)
        .unwrap();
    assert_eq!(run.diagnostics.solver_status, Some(SolverStatus::Feasible));
    let reason = run.diagnostics.solver_fallback.unwrap();
    assert!(reason.contains("SpedCap"), "{reason}");
    assert!(matches!(run.solution.source, SolutionSource::Greedy { .. }));
    assert_eq!(run.solution.enrollment.count(&"S1".into()), 13);
}
