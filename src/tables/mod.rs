//! Tabular input and output contracts.
//!
//! The engine never touches storage directly: input arrives as
//! [`InputTables`] and results leave as [`OutputTables`], both plain serde
//! rows.

mod input;
mod output;

pub use input::{InputTables, PeriodRow, PreferenceRow, SectionRow, StudentRow, TeacherRow};
pub use output::{
    OutputTables, SectionPeriodRow, StudentSectionRow, TeacherScheduleRow, ViolationRow,
};
