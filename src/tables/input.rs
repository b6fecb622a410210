//! Input tables.
//!
//! Five row-oriented tables as delivered by the data-loading collaborator.
//! Students, Sections and Preferences are required; Teachers and Periods
//! may be absent or empty.
//!
//! # JSON layout
//!
//! ```json
//! {
//!   "students":    [{"id": "ST1", "grade_level": 10, "sped": "Yes"}],
//!   "teachers":    [{"id": "T1", "unavailable_periods": ["R1"]}],
//!   "sections":    [{"id": "S1", "course_id": "Math", "teacher_id": "T1", "capacity": 30}],
//!   "preferences": [{"student_id": "ST1", "requested_course_ids": ["Math"]}],
//!   "periods":     [{"id": "R1"}, {"id": "R2"}]
//! }
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::path::Path;

use crate::error::{Result, SchedulingError};
use crate::models::{CourseId, PeriodId, SectionId, StudentId, TeacherId};

/// A row of the Students table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRow {
    pub id: StudentId,
    #[serde(default)]
    pub grade_level: Option<u32>,
    /// Accepts `true`/`false`, `1`/`0` or `"Yes"`/`"No"`.
    #[serde(default, deserialize_with = "flag")]
    pub sped: bool,
}

/// A row of the Teachers table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeacherRow {
    pub id: TeacherId,
    #[serde(default)]
    pub unavailable_periods: Vec<PeriodId>,
}

/// A row of the Sections table.
///
/// Capacity is signed here so that a negative value can be reported as an
/// input error instead of a parse failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionRow {
    pub id: SectionId,
    pub course_id: CourseId,
    pub teacher_id: TeacherId,
    pub capacity: i64,
    #[serde(default)]
    pub department: Option<String>,
}

/// A row of the Preferences table: one student's course requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceRow {
    pub student_id: StudentId,
    #[serde(default)]
    pub requested_course_ids: Vec<CourseId>,
}

/// A row of the Periods table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodRow {
    pub id: PeriodId,
}

/// The five input tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputTables {
    pub students: Vec<StudentRow>,
    #[serde(default)]
    pub teachers: Vec<TeacherRow>,
    pub sections: Vec<SectionRow>,
    pub preferences: Vec<PreferenceRow>,
    #[serde(default)]
    pub periods: Vec<PeriodRow>,
}

#[derive(Deserialize)]
struct RawTables {
    students: Option<Value>,
    teachers: Option<Value>,
    sections: Option<Value>,
    preferences: Option<Value>,
    periods: Option<Value>,
}

const STUDENT_COLUMNS: &[&str] = &["id", "grade_level", "sped"];
const TEACHER_COLUMNS: &[&str] = &["id", "unavailable_periods"];
const SECTION_COLUMNS: &[&str] = &["id", "course_id", "teacher_id", "capacity", "department"];
const PREFERENCE_COLUMNS: &[&str] = &["student_id", "requested_course_ids"];
const PERIOD_COLUMNS: &[&str] = &["id"];

impl InputTables {
    /// Creates empty tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses tables from a JSON document.
    ///
    /// A missing required table or a malformed row is an
    /// [`SchedulingError::Input`] naming the table and, where it can be
    /// located, the column. A document that is not JSON surfaces as
    /// [`SchedulingError::Json`].
    pub fn from_json_str(s: &str) -> Result<Self> {
        let raw: RawTables = serde_json::from_str(s)?;
        Ok(Self {
            students: rows("Students", STUDENT_COLUMNS, raw.students)?
                .ok_or_else(|| missing("Students"))?,
            teachers: rows("Teachers", TEACHER_COLUMNS, raw.teachers)?.unwrap_or_default(),
            sections: rows("Sections", SECTION_COLUMNS, raw.sections)?
                .ok_or_else(|| missing("Sections"))?,
            preferences: rows("Preferences", PREFERENCE_COLUMNS, raw.preferences)?
                .ok_or_else(|| missing("Preferences"))?,
            periods: rows("Periods", PERIOD_COLUMNS, raw.periods)?.unwrap_or_default(),
        })
    }

    /// Reads tables from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Adds a student row.
    pub fn with_student(mut self, id: &str, sped: bool) -> Self {
        self.students.push(StudentRow {
            id: id.into(),
            grade_level: None,
            sped,
        });
        self
    }

    /// Adds a teacher row.
    pub fn with_teacher(mut self, id: &str, unavailable: &[&str]) -> Self {
        self.teachers.push(TeacherRow {
            id: id.into(),
            unavailable_periods: unavailable.iter().map(|&p| PeriodId::from(p)).collect(),
        });
        self
    }

    /// Adds a section row with no department.
    pub fn with_section(mut self, id: &str, course: &str, teacher: &str, capacity: i64) -> Self {
        self.sections.push(SectionRow {
            id: id.into(),
            course_id: course.into(),
            teacher_id: teacher.into(),
            capacity,
            department: None,
        });
        self
    }

    /// Adds a section row in a department.
    pub fn with_department_section(
        mut self,
        id: &str,
        course: &str,
        teacher: &str,
        capacity: i64,
        department: &str,
    ) -> Self {
        self.sections.push(SectionRow {
            id: id.into(),
            course_id: course.into(),
            teacher_id: teacher.into(),
            capacity,
            department: Some(department.to_string()),
        });
        self
    }

    /// Adds a preference row.
    pub fn with_preference(mut self, student: &str, courses: &[&str]) -> Self {
        self.preferences.push(PreferenceRow {
            student_id: student.into(),
            requested_course_ids: courses.iter().map(|&c| CourseId::from(c)).collect(),
        });
        self
    }

    /// Replaces the Periods table.
    pub fn with_periods(mut self, periods: &[&str]) -> Self {
        self.periods = periods
            .iter()
            .map(|&p| PeriodRow { id: p.into() })
            .collect();
        self
    }
}

fn missing(table: &'static str) -> SchedulingError {
    SchedulingError::input(table, "*", "required table is missing")
}

/// Deserializes one table row by row. `None` when the table is absent.
fn rows<T: DeserializeOwned>(
    table: &'static str,
    columns: &'static [&'static str],
    raw: Option<Value>,
) -> Result<Option<Vec<T>>> {
    let Some(value) = raw else {
        return Ok(None);
    };
    let Value::Array(items) = value else {
        return Err(SchedulingError::input(table, "*", "expected an array of rows"));
    };
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            T::deserialize(item).map_err(|err| {
                let column = failing_column::<T>(columns, item, &err.to_string());
                SchedulingError::input(table, column, format!("row {i}: {err}"))
            })
        })
        .collect::<Result<Vec<T>>>()
        .map(Some)
}

/// The column a row failed on: named in the message, or else the one whose
/// removal lets the rest of the row parse.
fn failing_column<T: DeserializeOwned>(
    columns: &'static [&'static str],
    item: &Value,
    message: &str,
) -> &'static str {
    if let Some(column) = columns.iter().copied().find(|c| message.contains(&format!("`{c}`"))) {
        return column;
    }
    let Value::Object(fields) = item else {
        return "*";
    };
    columns
        .iter()
        .copied()
        .filter(|c| fields.contains_key(*c))
        .find(|c| {
            let mut rest = fields.clone();
            rest.remove(*c);
            match T::deserialize(&Value::Object(rest)) {
                Ok(_) => true,
                Err(err) => err.to_string().contains(&format!("missing field `{c}`")),
            }
        })
        .unwrap_or("*")
}

fn flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
        Text(String),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Int(i) => i != 0,
        Flag::Text(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "yes" | "y" | "true" | "1"
        ),
    })
}
