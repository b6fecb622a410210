//! Section priority and student hardness.
//!
//! Section priority is a product of [`PriorityFactor`] multipliers, each
//! starting from a neutral 1.0. The [`PriorityEngine`] composes factors and
//! produces a stable descending order: equal priorities keep input order,
//! which is what makes repeated runs bit-identical.
//!
//! Student hardness ranks students hardest-first for enrollment.
//!
//! # Usage
//!
//! ```
//! use u_timetable::priority::{factors, PriorityEngine};
//!
//! let engine = PriorityEngine::new()
//!     .with_factor(factors::RestrictedCourse::new(5.0))
//!     .with_factor(factors::TeacherLoad::new(0.2));
//! assert_eq!(engine.len(), 2);
//! ```

mod engine;
pub mod factors;
mod hardness;

pub use engine::PriorityEngine;
pub use hardness::{rank_students, student_hardness};

use crate::models::{School, Section};
use std::fmt::Debug;

/// Priority multiplier returned by a factor.
///
/// Higher = scheduled earlier; 1.0 leaves the priority unchanged.
pub type Multiplier = f64;

/// One multiplicative component of a section's scheduling priority.
pub trait PriorityFactor: Send + Sync + Debug {
    /// Factor name (e.g., "RESTRICTED", "SCIENCE").
    fn name(&self) -> &'static str;

    /// Multiplier for `section`.
    fn evaluate(&self, section: &Section, school: &School) -> Multiplier;

    /// Factor description.
    fn description(&self) -> &'static str {
        self.name()
    }
}
