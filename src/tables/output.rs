//! Output tables.
//!
//! Produced by [`extract_tables`](crate::extract::extract_tables) and handed to
//! the persistence/reporting collaborator.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{PeriodId, SectionId, StudentId, TeacherId};

/// Section → Period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionPeriodRow {
    pub section_id: SectionId,
    pub period: PeriodId,
}

/// Student → Section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentSectionRow {
    pub student_id: StudentId,
    pub section_id: SectionId,
}

/// Teacher → Section → Period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherScheduleRow {
    pub teacher_id: TeacherId,
    pub section_id: SectionId,
    pub period: PeriodId,
}

/// One line of the violations report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViolationRow {
    /// Metric name, e.g. `"Missed Requests"`.
    pub metric: String,
    /// Number of violating items.
    pub count: u32,
    /// Population the count is drawn from.
    pub total: u32,
    /// `count / total * 100`, where meaningful.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub percentage: Option<f64>,
    /// Total overflow units, for capacity metrics.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub total_overages: Option<u32>,
}

/// The four output tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputTables {
    pub section_schedule: Vec<SectionPeriodRow>,
    pub student_assignments: Vec<StudentSectionRow>,
    pub teacher_schedule: Vec<TeacherScheduleRow>,
    pub violations: Vec<ViolationRow>,
}

impl OutputTables {
    /// Serializes the tables as pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Looks up a violation row by metric name.
    pub fn violation(&self, metric: &str) -> Option<&ViolationRow> {
        self.violations.iter().find(|v| v.metric == metric)
    }
}
