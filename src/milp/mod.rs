//! Exact formulation and solver boundary.
//!
//! [`TimetableMilpBuilder`] turns a [`School`](crate::models::School) into a
//! solver-independent [`MilpModel`]. A backend implementing [`MilpSolver`]
//! solves it from a greedy [`WarmStart`] within a time budget, and
//! [`decode`] reads the schedule and enrollment back out.
//!
//! # Reference
//! - Wolsey (1998), "Integer Programming", ch. 1 (linking constraints for
//!   products of binaries)
//! - Schaerf (1999), "A Survey of Automated Timetabling"

mod formulation;
mod model;
mod solver;

pub use formulation::TimetableMilpBuilder;
pub use model::{
    ConstraintKind, LinearConstraint, MilpModel, ObjectiveBreakdown, Sense, VarDomain, VarId,
    VarKey, Variable, VariableAssignment,
};
pub use solver::{
    decode, CancelToken, DecodeError, MilpSolver, SolveRequest, SolverOutcome, SolverStatus,
    WarmStart, BINARY_THRESHOLD,
};
