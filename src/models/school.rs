//! School model and lookup indices.
//!
//! [`School`] is the read-only domain model every phase works from. It is
//! built once, either from raw [`InputTables`] or from domain values, and
//! carries a [`SchoolIndex`] with the lookups the scorers need:
//! course → sections, teacher → sections, department → sections, allowed
//! periods per section, course demand and the SPED set.
//!
//! All per-key section lists preserve input order; stable iteration order
//! is what keeps the greedy phases deterministic.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use super::{
    Course, CourseId, PeriodId, PeriodSequence, Section, SectionId, Student, StudentId, Teacher,
    TeacherId,
};
use crate::config::SchedulerConfig;
use crate::error::{Result, SchedulingError};
use crate::tables::InputTables;
use crate::validation::{validate_input, ValidationIssue, ValidationIssueKind};

/// Read-only lookups derived from the school's entities.
#[derive(Debug, Clone, Default)]
pub struct SchoolIndex {
    section_pos: HashMap<SectionId, usize>,
    course_pos: HashMap<CourseId, usize>,
    teacher_pos: HashMap<TeacherId, usize>,
    student_pos: HashMap<StudentId, usize>,
    course_sections: HashMap<CourseId, Vec<SectionId>>,
    teacher_sections: HashMap<TeacherId, Vec<SectionId>>,
    department_sections: HashMap<String, Vec<SectionId>>,
    allowed: HashMap<SectionId, Vec<PeriodId>>,
    science: HashSet<SectionId>,
    science_department: HashSet<SectionId>,
    demand: HashMap<CourseId, usize>,
    sped: HashSet<StudentId>,
}

/// The loaded school: periods, courses, sections, teachers and students.
#[derive(Debug, Clone)]
pub struct School {
    periods: PeriodSequence,
    courses: Vec<Course>,
    sections: Vec<Section>,
    teachers: Vec<Teacher>,
    students: Vec<Student>,
    spread_course: Option<CourseId>,
    special_courses: Vec<CourseId>,
    index: SchoolIndex,
    warnings: Vec<ValidationIssue>,
}

impl School {
    /// Builds a school from input tables.
    ///
    /// Runs [`validate_input`] first; structural errors are fatal. Sections
    /// with a negative or oversized capacity fail with an input error naming
    /// `Sections.capacity`. An absent or empty Periods table falls back to
    /// `config.periods`.
    pub fn from_tables(tables: &InputTables, config: &SchedulerConfig) -> Result<Self> {
        config.validate()?;
        let report = validate_input(tables);
        let mut warnings = report.warnings;
        if !report.errors.is_empty() {
            return Err(SchedulingError::Validation(report.errors));
        }

        let periods = if tables.periods.is_empty() {
            PeriodSequence::new(config.periods.iter().cloned())
        } else {
            PeriodSequence::new(tables.periods.iter().map(|p| p.id.clone()))
        };

        let mut sections = Vec::with_capacity(tables.sections.len());
        for row in &tables.sections {
            let capacity = u32::try_from(row.capacity).map_err(|_| {
                SchedulingError::input(
                    "Sections",
                    "capacity",
                    format!(
                        "section '{}' has capacity {}, expected 0..={}",
                        row.id,
                        row.capacity,
                        u32::MAX
                    ),
                )
            })?;
            let mut section = Section::new(row.id.clone(), row.course_id.clone(), row.teacher_id.clone())
                .with_capacity(capacity);
            if let Some(dept) = row.department.as_deref().filter(|d| !d.trim().is_empty()) {
                section = section.with_department(dept);
            }
            sections.push(section);
        }

        let mut teachers: Vec<Teacher> = Vec::with_capacity(tables.teachers.len());
        for row in &tables.teachers {
            let mut teacher = Teacher::new(row.id.clone());
            for period in &row.unavailable_periods {
                if tables.periods.is_empty() && !periods.contains(period) {
                    warnings.push(ValidationIssue::new(
                        ValidationIssueKind::UnknownPeriod,
                        "Teachers",
                        format!("Teacher '{}' is unavailable in unknown period '{period}'", row.id),
                    ));
                }
                teacher = teacher.with_unavailable(period.clone());
            }
            teachers.push(teacher);
        }

        let requests: HashMap<&StudentId, &[CourseId]> = tables
            .preferences
            .iter()
            .map(|p| (&p.student_id, p.requested_course_ids.as_slice()))
            .collect();
        let students = tables
            .students
            .iter()
            .map(|row| {
                let mut student = Student::new(row.id.clone()).with_sped(row.sped);
                if let Some(grade) = row.grade_level {
                    student = student.with_grade_level(grade);
                }
                for course in requests.get(&row.id).copied().unwrap_or(&[]) {
                    student = student.with_request(course.clone());
                }
                student
            })
            .collect();

        let mut school = Self::new(config, periods, sections, teachers, students);
        warnings.append(&mut school.warnings);
        school.warnings = warnings;
        Ok(school)
    }

    /// Builds a school from domain values.
    ///
    /// Teachers referenced by a section but not listed are added with full
    /// availability. Requests for courses that have no sections are dropped
    /// and reported through [`warnings`](Self::warnings), as are restriction
    /// periods absent from `periods`.
    pub fn new(
        config: &SchedulerConfig,
        periods: PeriodSequence,
        sections: Vec<Section>,
        mut teachers: Vec<Teacher>,
        mut students: Vec<Student>,
    ) -> Self {
        let mut warnings = Vec::new();
        let mut index = SchoolIndex::default();

        // Courses in first-seen order
        let mut courses: Vec<Course> = Vec::new();
        for (pos, section) in sections.iter().enumerate() {
            index.section_pos.entry(section.id.clone()).or_insert(pos);
            index
                .course_sections
                .entry(section.course_id.clone())
                .or_default()
                .push(section.id.clone());
            index
                .teacher_sections
                .entry(section.teacher_id.clone())
                .or_default()
                .push(section.id.clone());
            if let Some(dept) = &section.department {
                index
                    .department_sections
                    .entry(dept.clone())
                    .or_default()
                    .push(section.id.clone());
            }

            match index.course_pos.get(&section.course_id) {
                Some(&cpos) => {
                    let course = &mut courses[cpos];
                    if course.department.is_none() {
                        course.department = section.department.clone();
                    }
                }
                None => {
                    index.course_pos.insert(section.course_id.clone(), courses.len());
                    let mut course = Course::new(section.course_id.clone());
                    course.department = section.department.clone();
                    if let Some(restricted) = config.restriction_for(&section.course_id) {
                        let allowed: Vec<PeriodId> = periods
                            .iter()
                            .filter(|p| restricted.contains(p))
                            .cloned()
                            .collect();
                        for missing in restricted.iter().filter(|p| !periods.contains(p)) {
                            warnings.push(ValidationIssue::new(
                                ValidationIssueKind::UnknownPeriod,
                                "Periods",
                                format!(
                                    "Restriction for course '{}' names period '{missing}' which is not scheduled",
                                    section.course_id
                                ),
                            ));
                        }
                        course = course.with_allowed_periods(allowed);
                    }
                    courses.push(course);
                }
            }

            let science = section.department_contains(&config.science.department_marker);
            if science {
                index.science_department.insert(section.id.clone());
            }
            if science || config.science.courses.contains(&section.course_id) {
                index.science.insert(section.id.clone());
            }
        }

        for section in &sections {
            let allowed = match index
                .course_pos
                .get(&section.course_id)
                .and_then(|&c| courses[c].allowed_periods.as_ref())
            {
                Some(restricted) => restricted.clone(),
                None => periods.as_slice().to_vec(),
            };
            index.allowed.entry(section.id.clone()).or_insert(allowed);
        }

        for (pos, teacher) in teachers.iter().enumerate() {
            index.teacher_pos.entry(teacher.id.clone()).or_insert(pos);
        }
        for section in &sections {
            if !index.teacher_pos.contains_key(&section.teacher_id) {
                debug!(teacher = %section.teacher_id, "implicit teacher with full availability");
                index
                    .teacher_pos
                    .insert(section.teacher_id.clone(), teachers.len());
                teachers.push(Teacher::new(section.teacher_id.clone()));
            }
        }

        for (pos, student) in students.iter_mut().enumerate() {
            index.student_pos.entry(student.id.clone()).or_insert(pos);
            if student.sped {
                index.sped.insert(student.id.clone());
            }
            student.requests.retain(|course| {
                let served = index.course_sections.contains_key(course);
                if !served {
                    warnings.push(ValidationIssue::new(
                        ValidationIssueKind::UnservedCourse,
                        "Preferences",
                        format!(
                            "Student '{}' requests course '{course}' which has no sections",
                            student.id
                        ),
                    ));
                }
                served
            });
            for course in &student.requests {
                *index.demand.entry(course.clone()).or_insert(0) += 1;
            }
        }

        Self {
            periods,
            courses,
            sections,
            teachers,
            students,
            spread_course: config.spread_course().cloned(),
            special_courses: config.special_courses(),
            index,
            warnings,
        }
    }

    /// Period sequence in configured order.
    #[inline]
    pub fn periods(&self) -> &PeriodSequence {
        &self.periods
    }

    /// Courses in first-seen order.
    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    /// Sections in input order.
    #[inline]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Teachers, listed ones first, then implicit ones.
    pub fn teachers(&self) -> &[Teacher] {
        &self.teachers
    }

    /// Students in input order.
    #[inline]
    pub fn students(&self) -> &[Student] {
        &self.students
    }

    /// Looks up a section.
    pub fn section(&self, id: &SectionId) -> Option<&Section> {
        self.index.section_pos.get(id).map(|&i| &self.sections[i])
    }

    /// Input position of a section.
    pub fn section_position(&self, id: &SectionId) -> Option<usize> {
        self.index.section_pos.get(id).copied()
    }

    /// Looks up a course.
    pub fn course(&self, id: &CourseId) -> Option<&Course> {
        self.index.course_pos.get(id).map(|&i| &self.courses[i])
    }

    /// Looks up a teacher.
    pub fn teacher(&self, id: &TeacherId) -> Option<&Teacher> {
        self.index.teacher_pos.get(id).map(|&i| &self.teachers[i])
    }

    /// Looks up a student.
    pub fn student(&self, id: &StudentId) -> Option<&Student> {
        self.index.student_pos.get(id).map(|&i| &self.students[i])
    }

    /// Sections of a course, in input order.
    pub fn sections_of_course(&self, course: &CourseId) -> &[SectionId] {
        slice_of(&self.index.course_sections, course)
    }

    /// Sections taught by a teacher, in input order.
    pub fn sections_of_teacher(&self, teacher: &TeacherId) -> &[SectionId] {
        slice_of(&self.index.teacher_sections, teacher)
    }

    /// Sections sharing a department tag, in input order.
    pub fn sections_in_department(&self, department: &str) -> &[SectionId] {
        self.index
            .department_sections
            .get(department)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Allowed periods of a section, in configured order.
    pub fn allowed_periods(&self, section: &SectionId) -> &[PeriodId] {
        slice_of(&self.index.allowed, section)
    }

    /// Whether the section may occupy `period` (course restriction only).
    pub fn allows(&self, section: &SectionId, period: &PeriodId) -> bool {
        self.allowed_periods(section).contains(period)
    }

    /// Whether the course carries a period restriction.
    pub fn is_restricted(&self, course: &CourseId) -> bool {
        self.course(course).is_some_and(Course::is_restricted)
    }

    /// Whether the section counts as science (department marker or listed
    /// science course).
    pub fn is_science(&self, section: &SectionId) -> bool {
        self.index.science.contains(section)
    }

    /// Whether the section's department carries the science marker.
    pub fn is_science_department(&self, section: &SectionId) -> bool {
        self.index.science_department.contains(section)
    }

    /// Science-department sections, in input order.
    pub fn science_department_sections(&self) -> impl Iterator<Item = &Section> {
        self.sections
            .iter()
            .filter(|s| self.index.science_department.contains(&s.id))
    }

    /// The flagged spread course, if configured.
    pub fn spread_course(&self) -> Option<&CourseId> {
        self.spread_course.as_ref()
    }

    /// Whether `course` is the flagged spread course.
    pub fn is_spread_course(&self, course: &CourseId) -> bool {
        self.spread_course.as_ref() == Some(course)
    }

    /// Student-assigner phase 1 courses, in processing order.
    pub fn special_courses(&self) -> &[CourseId] {
        &self.special_courses
    }

    /// Number of students requesting `course`.
    pub fn demand(&self, course: &CourseId) -> usize {
        self.index.demand.get(course).copied().unwrap_or(0)
    }

    /// Whether the student is SPED.
    pub fn is_sped(&self, student: &StudentId) -> bool {
        self.index.sped.contains(student)
    }

    /// Total number of (student, course) requests.
    pub fn total_requests(&self) -> usize {
        self.students.iter().map(|s| s.requests.len()).sum()
    }

    /// Non-fatal issues found while loading.
    pub fn warnings(&self) -> &[ValidationIssue] {
        &self.warnings
    }

    /// The lookup index.
    pub fn index(&self) -> &SchoolIndex {
        &self.index
    }
}

fn slice_of<'a, K, V>(map: &'a HashMap<K, Vec<V>>, key: &K) -> &'a [V]
where
    K: std::hash::Hash + Eq,
{
    map.get(key).map(Vec::as_slice).unwrap_or(&[])
}
