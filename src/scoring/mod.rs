//! Heuristic scorers for the greedy phases.
//!
//! Both scorers are pure functions of the read-only [`School`](crate::models::School)
//! and the partial assignment; every score is ≥ 0 and 0 means infeasible.

mod period;
mod student;

pub use period::PeriodScorer;
pub use student::EnrollmentScorer;
