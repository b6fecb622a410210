//! Timetabling domain models.
//!
//! Provides the core data types for representing a school timetabling
//! problem and its solutions.
//!
//! # Entities
//!
//! | Type | Meaning |
//! |------|---------|
//! | `PeriodSequence` | Ordered time slots of the school day |
//! | `Course` | Unit of student demand, optionally period-restricted |
//! | `Section` | One offering of a course, one teacher, fixed seats |
//! | `Teacher` | Owner of sections, with unavailable periods |
//! | `Student` | Requests courses, optionally SPED |
//! | `School` | All of the above plus lookup indices |
//! | `ScheduleAssignment` | Section → Period |
//! | `EnrollmentAssignment` | Student → Sections |

mod assignment;
mod course;
mod ids;
mod period;
mod school;
mod section;
mod student;
mod teacher;
mod violation;

pub use assignment::{EnrollmentAssignment, ScheduleAssignment};
pub use course::Course;
pub use ids::{CourseId, PeriodId, SectionId, StudentId, TeacherId};
pub use period::{PeriodSequence, DEFAULT_PERIODS};
pub use school::{School, SchoolIndex};
pub use section::Section;
pub use student::Student;
pub use teacher::Teacher;
pub use violation::{Violation, ViolationType};
