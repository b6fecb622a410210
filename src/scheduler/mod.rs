//! Greedy construction.
//!
//! Builds the section schedule and the enrollment that either stand as the
//! final answer or seed the exact solver as a warm start.
//!
//! # Algorithm
//!
//! `SectionScheduler` places sections in four priority-ordered phases using
//! the period scorer; `StudentAssigner` then enrolls students hardest-first
//! in two phases using the student-section scorer. `SimpleGreedy` is the
//! first-fit fallback. All of it is single-threaded: every commit feeds the
//! scores of the next decision.
//!
//! # Strategies
//!
//! `WarmStartStrategy` selects between the two constructions;
//! `WarmStartPolicy` applies the advanced-then-simple fallback.

mod sections;
mod simple;
mod students;
mod warm_start;

pub use sections::{SectionPhase, SectionSchedule, SectionScheduler};
pub use simple::SimpleGreedy;
pub use students::{missed_requests, MissedRequest, StudentAssigner, StudentAssignment};
pub use warm_start::{
    GreedySolution, WarmStartError, WarmStartOutcome, WarmStartPolicy, WarmStartStrategy,
};
