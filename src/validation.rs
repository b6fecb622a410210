//! Input validation and solution verification.
//!
//! [`validate_input`] checks the structural integrity of raw input tables
//! before a [`School`] is built. Detects:
//! - Duplicate or empty IDs
//! - Duplicate preference rows for one student
//! - Dangling references (warnings only: teachers, students, periods)
//!
//! [`verify_solution`] checks a finished assignment against the hard
//! invariants: allowed periods, teacher availability, teacher clashes,
//! student clashes, one section per course and no enrollment in an
//! unscheduled section.

use std::collections::{HashMap, HashSet};

use crate::models::{
    EnrollmentAssignment, PeriodId, ScheduleAssignment, School, Violation, ViolationType,
};
use crate::tables::InputTables;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationIssue>>;

/// A validation finding.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationIssue {
    /// Issue category.
    pub kind: ValidationIssueKind,
    /// Table the issue was found in.
    pub table: &'static str,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationIssueKind {
    /// Two rows share the same ID.
    DuplicateId,
    /// A row has a blank identifier.
    EmptyId,
    /// A student has more than one preference row.
    DuplicatePreference,
    /// A section references a teacher absent from the Teachers table.
    UnknownTeacher,
    /// A preference row references an unknown student.
    UnknownStudent,
    /// A requested course has no sections.
    UnservedCourse,
    /// A period reference is not in the period list.
    UnknownPeriod,
}

impl ValidationIssue {
    pub fn new(kind: ValidationIssueKind, table: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind,
            table,
            message: message.into(),
        }
    }
}

/// Errors and warnings found in input tables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    /// Fatal issues.
    pub errors: Vec<ValidationIssue>,
    /// Non-fatal issues.
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// Whether no errors were found.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// `Ok(())` if there are no errors, `Err(errors)` otherwise.
    pub fn into_result(self) -> ValidationResult {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

/// Validates the input tables.
///
/// Checks:
/// 1. No duplicate or empty student, teacher, section or period IDs
/// 2. Sections name a course and a teacher
/// 3. At most one preference row per student
/// 4. Section teachers appear in the Teachers table (warning, only when
///    the table is present)
/// 5. Preference rows reference known students (warning)
/// 6. Unavailable periods appear in the Periods table (warning, only when
///    the table is present)
pub fn validate_input(tables: &InputTables) -> ValidationReport {
    let mut report = ValidationReport::default();

    let student_ids = unique_ids(
        tables.students.iter().map(|s| s.id.as_str()),
        "Students",
        "student",
        &mut report.errors,
    );
    let teacher_ids = unique_ids(
        tables.teachers.iter().map(|t| t.id.as_str()),
        "Teachers",
        "teacher",
        &mut report.errors,
    );
    unique_ids(
        tables.sections.iter().map(|s| s.id.as_str()),
        "Sections",
        "section",
        &mut report.errors,
    );
    let period_ids = unique_ids(
        tables.periods.iter().map(|p| p.id.as_str()),
        "Periods",
        "period",
        &mut report.errors,
    );

    for section in &tables.sections {
        if section.course_id.is_blank() || section.teacher_id.is_blank() {
            report.errors.push(ValidationIssue::new(
                ValidationIssueKind::EmptyId,
                "Sections",
                format!("Section '{}' has an empty course or teacher ID", section.id),
            ));
        }
        if !tables.teachers.is_empty()
            && !section.teacher_id.is_blank()
            && !teacher_ids.contains(section.teacher_id.as_str())
        {
            report.warnings.push(ValidationIssue::new(
                ValidationIssueKind::UnknownTeacher,
                "Sections",
                format!(
                    "Section '{}' references teacher '{}' not in the Teachers table",
                    section.id, section.teacher_id
                ),
            ));
        }
    }

    let mut seen_prefs = HashSet::new();
    for pref in &tables.preferences {
        if pref.student_id.is_blank() {
            report.errors.push(ValidationIssue::new(
                ValidationIssueKind::EmptyId,
                "Preferences",
                "Preference row with an empty student ID",
            ));
            continue;
        }
        if !seen_prefs.insert(pref.student_id.as_str()) {
            report.errors.push(ValidationIssue::new(
                ValidationIssueKind::DuplicatePreference,
                "Preferences",
                format!("Duplicate preference row for student: {}", pref.student_id),
            ));
        }
        if !student_ids.contains(pref.student_id.as_str()) {
            report.warnings.push(ValidationIssue::new(
                ValidationIssueKind::UnknownStudent,
                "Preferences",
                format!("Preferences reference unknown student '{}'", pref.student_id),
            ));
        }
    }

    if !tables.periods.is_empty() {
        for teacher in &tables.teachers {
            for period in &teacher.unavailable_periods {
                if !period_ids.contains(period.as_str()) {
                    report.warnings.push(ValidationIssue::new(
                        ValidationIssueKind::UnknownPeriod,
                        "Teachers",
                        format!(
                            "Teacher '{}' is unavailable in unknown period '{period}'",
                            teacher.id
                        ),
                    ));
                }
            }
        }
    }

    report
}

fn unique_ids<'a>(
    ids: impl Iterator<Item = &'a str>,
    table: &'static str,
    label: &str,
    errors: &mut Vec<ValidationIssue>,
) -> HashSet<&'a str> {
    let mut seen = HashSet::new();
    for id in ids {
        if id.trim().is_empty() {
            errors.push(ValidationIssue::new(
                ValidationIssueKind::EmptyId,
                table,
                format!("Empty {label} ID"),
            ));
        } else if !seen.insert(id) {
            errors.push(ValidationIssue::new(
                ValidationIssueKind::DuplicateId,
                table,
                format!("Duplicate {label} ID: {id}"),
            ));
        }
    }
    seen
}

/// Checks an assignment against the hard invariants.
///
/// Unscheduled sections are not violations here; they are reported as
/// diagnostics by the schedulers. Returns every violation found, hard ones
/// only.
pub fn verify_solution(
    school: &School,
    schedule: &ScheduleAssignment,
    enrollment: &EnrollmentAssignment,
) -> Vec<Violation> {
    let mut violations = Vec::new();

    let mut teacher_slots: HashMap<(&str, &PeriodId), &str> = HashMap::new();
    for (section_id, period) in schedule.iter() {
        let Some(section) = school.section(section_id) else {
            violations.push(Violation::new(
                ViolationType::PeriodNotAllowed,
                section_id.as_str(),
                format!("Unknown section '{section_id}' is scheduled"),
            ));
            continue;
        };
        if !school.allows(section_id, period) {
            violations.push(Violation::new(
                ViolationType::PeriodNotAllowed,
                section_id.as_str(),
                format!("Section '{section_id}' placed in disallowed period '{period}'"),
            ));
        }
        if school
            .teacher(&section.teacher_id)
            .is_some_and(|t| !t.is_available(period))
        {
            violations.push(Violation::new(
                ViolationType::TeacherUnavailable,
                section.teacher_id.as_str(),
                format!(
                    "Teacher '{}' is unavailable in '{period}' but teaches '{section_id}'",
                    section.teacher_id
                ),
            ));
        }
        if let Some(other) = teacher_slots.insert((section.teacher_id.as_str(), period), section_id.as_str()) {
            violations.push(Violation::teacher_conflict(
                section.teacher_id.as_str(),
                format!("Sections '{other}' and '{section_id}' share period '{period}'"),
            ));
        }
    }

    for (student_id, sections) in enrollment.iter() {
        let mut periods: HashMap<&PeriodId, &str> = HashMap::new();
        let mut courses = HashSet::new();
        for section_id in sections {
            let Some(section) = school.section(section_id) else {
                violations.push(Violation::new(
                    ViolationType::UnscheduledEnrollment,
                    student_id.as_str(),
                    format!("Student '{student_id}' enrolled in unknown section '{section_id}'"),
                ));
                continue;
            };
            if !courses.insert(&section.course_id) {
                violations.push(Violation::new(
                    ViolationType::DuplicateCourse,
                    student_id.as_str(),
                    format!(
                        "Student '{student_id}' holds two sections of '{}'",
                        section.course_id
                    ),
                ));
            }
            match schedule.period_of(section_id) {
                None => violations.push(Violation::new(
                    ViolationType::UnscheduledEnrollment,
                    student_id.as_str(),
                    format!("Student '{student_id}' enrolled in unscheduled section '{section_id}'"),
                )),
                Some(period) => {
                    if let Some(other) = periods.insert(period, section_id.as_str()) {
                        violations.push(Violation::student_conflict(
                            student_id.as_str(),
                            format!(
                                "Sections '{other}' and '{section_id}' share period '{period}'"
                            ),
                        ));
                    }
                }
            }
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SchedulerConfig;

    fn sample_tables() -> InputTables {
        InputTables::new()
            .with_student("A", false)
            .with_student("B", true)
            .with_teacher("T1", &[])
            .with_teacher("T2", &["P2"])
            .with_section("S1", "Math", "T1", 10)
            .with_section("S2", "Math", "T2", 10)
            .with_section("S3", "Art", "T1", 10)
            .with_preference("A", &["Math", "Art"])
            .with_preference("B", &["Math"])
            .with_periods(&["P1", "P2", "P3"])
    }

    fn school() -> School {
        School::from_tables(&sample_tables(), &SchedulerConfig::plain(&["P1", "P2", "P3"])).unwrap()
    }

    #[test]
    fn test_valid_input() {
        let report = validate_input(&sample_tables());
        assert!(report.is_ok());
        assert!(report.warnings.is_empty());
        assert!(report.into_result().is_ok());
    }

    #[test]
    fn test_duplicate_student_id() {
        let t = sample_tables().with_student("A", true);
        let errors = validate_input(&t).into_result().unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationIssueKind::DuplicateId && e.message.contains("student")));
    }

    #[test]
    fn test_duplicate_preference_row() {
        let t = sample_tables().with_preference("A", &["Art"]);
        let errors = validate_input(&t).into_result().unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationIssueKind::DuplicatePreference));
    }

    #[test]
    fn test_empty_ids() {
        let t = sample_tables().with_section("", "Math", "T1", 5).with_section("S9", "", "T1", 5);
        let errors = validate_input(&t).into_result().unwrap_err();
        assert_eq!(
            errors
                .iter()
                .filter(|e| e.kind == ValidationIssueKind::EmptyId)
                .count(),
            2
        );
    }

    #[test]
    fn test_dangling_references_are_warnings() {
        let t = sample_tables()
            .with_section("S4", "Music", "T9", 5)
            .with_preference("Z", &["Math"])
            .with_teacher("T3", &["P9"]);
        let report = validate_input(&t);
        assert!(report.is_ok());
        let kinds: HashSet<ValidationIssueKind> = report.warnings.iter().map(|w| w.kind).collect();
        assert!(kinds.contains(&ValidationIssueKind::UnknownTeacher));
        assert!(kinds.contains(&ValidationIssueKind::UnknownStudent));
        assert!(kinds.contains(&ValidationIssueKind::UnknownPeriod));
    }

    #[test]
    fn test_verify_clean_solution() {
        let school = school();
        let schedule: ScheduleAssignment = vec![
            ("S1".into(), "P1".into()),
            ("S2".into(), "P1".into()),
            ("S3".into(), "P2".into()),
        ]
        .into_iter()
        .collect();
        let enrollment: EnrollmentAssignment = vec![
            ("A".into(), "S1".into()),
            ("A".into(), "S3".into()),
            ("B".into(), "S2".into()),
        ]
        .into_iter()
        .collect();
        assert!(verify_solution(&school, &schedule, &enrollment).is_empty());
    }

    #[test]
    fn test_verify_detects_teacher_issues() {
        let school = school();
        let schedule: ScheduleAssignment = vec![
            ("S1".into(), "P1".into()),
            ("S3".into(), "P1".into()),
            ("S2".into(), "P2".into()),
        ]
        .into_iter()
        .collect();
        let violations = verify_solution(&school, &schedule, &EnrollmentAssignment::new());
        assert!(violations
            .iter()
            .any(|v| v.violation_type == ViolationType::TeacherConflict && v.entity_id == "T1"));
        assert!(violations
            .iter()
            .any(|v| v.violation_type == ViolationType::TeacherUnavailable && v.entity_id == "T2"));
    }

    #[test]
    fn test_verify_detects_student_issues() {
        let school = school();
        let schedule: ScheduleAssignment = vec![("S1".into(), "P1".into()), ("S3".into(), "P1".into())]
            .into_iter()
            .collect();
        let enrollment: EnrollmentAssignment = vec![
            ("A".into(), "S1".into()),
            ("A".into(), "S3".into()),
            ("B".into(), "S1".into()),
            ("B".into(), "S2".into()),
        ]
        .into_iter()
        .collect();
        let types: Vec<ViolationType> = verify_solution(&school, &schedule, &enrollment)
            .into_iter()
            .map(|v| v.violation_type)
            .collect();
        assert!(types.contains(&ViolationType::StudentConflict));
        assert!(types.contains(&ViolationType::DuplicateCourse));
        assert!(types.contains(&ViolationType::UnscheduledEnrollment));
    }
}
