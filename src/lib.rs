//! School timetabling engine.
//!
//! Places course sections into periods and enrolls students into sections,
//! first with a phased greedy construction and then, optionally, through a
//! MILP formulation solved by a pluggable backend that starts from the
//! greedy result.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Section`, `Course`, `Teacher`, `Student`,
//!   `PeriodSequence`, the preprocessed `School`, and the two assignment maps
//! - **`tables`**: Input and output table rows
//! - **`validation`**: Input integrity checks and hard-invariant verification
//! - **`priority`**: Section priority factors and student hardness
//! - **`scoring`**: Period and student-section scorers
//! - **`scheduler`**: Greedy section scheduler, student assigner, simple
//!   fallback and warm-start strategies
//! - **`milp`**: Exact formulation and the solver adapter contract
//! - **`extract`**, **`report`**: Output tables and violation metrics
//! - **`optimizer`**: End-to-end pipeline
//!
//! # Quick start
//!
//! ```
//! use u_timetable::config::SchedulerConfig;
//! use u_timetable::optimizer::ScheduleOptimizer;
//! use u_timetable::tables::InputTables;
//!
//! let tables = InputTables::new()
//!     .with_student("ST1", false)
//!     .with_student("ST2", true)
//!     .with_section("MATH-1", "Math", "T1", 25)
//!     .with_section("ART-1", "Art", "T2", 20)
//!     .with_preference("ST1", &["Math", "Art"])
//!     .with_preference("ST2", &["Math"]);
//!
//! let run = ScheduleOptimizer::new(SchedulerConfig::plain(&["P1", "P2", "P3"]))
//!     .run_tables(&tables)
//!     .unwrap();
//! assert!(run.diagnostics.missed_requests.is_empty());
//! ```
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Burke & Petrovic (2002), "Recent research directions in automated
//!   timetabling"

pub mod config;
pub mod error;
pub mod extract;
pub mod milp;
pub mod models;
pub mod optimizer;
pub mod priority;
pub mod report;
pub mod scheduler;
pub mod scoring;
pub mod tables;
pub mod validation;

pub use error::{Result, SchedulingError};
