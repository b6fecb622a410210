//! Timetabling MILP formulation.
//!
//! Translates a [`School`] into a [`MilpModel`] that any [`MilpSolver`]
//! can solve.
//!
//! # Variables
//!
//! | Name | Domain | Exists for |
//! |------|--------|------------|
//! | `z[s,p]` | binary | allowed period `p` of section `s` with its teacher available |
//! | `x[st,s]` | binary | section `s` of a course `st` requests, if `s` has any `z` |
//! | `y[st,s,p]` | binary | every `x[st,s]` × `z[s,p]` |
//! | `missed[st,c]` | binary | every request |
//! | `overflow[s]` | integer ≥ 0 | every section |
//!
//! # Constraints
//!
//! - one period per section: `Σ_p z[s,p] = 1` (sections with any `z`)
//! - soft capacity: `Σ x[·,s] − overflow[s] ≤ capacity`
//! - request: `Σ_{s∈c} x[st,s] + missed[st,c] = 1`
//! - teacher per period: `Σ_{s∈t} z[s,p] ≤ 1`
//! - student per period: `Σ_s y[st,s,p] ≤ 1`
//! - linking: `y ≤ x`, `y ≤ z`, `y ≥ x + z − 1`
//! - SPED cap (optional): `Σ_{st∈SPED} x[st,s] ≤ cap`
//!
//! # Objective
//! minimize `w_missed · Σ missed + w_overflow · Σ overflow`
//!
//! [`MilpSolver`]: super::MilpSolver

use std::collections::BTreeMap;

use tracing::info;

use super::model::{ConstraintKind, MilpModel, Sense, VarDomain, VarId, VarKey};
use crate::config::{ObjectiveWeights, SchedulerConfig};
use crate::models::{PeriodId, School, SectionId};

/// Builds the timetabling MILP from a school.
///
/// # Example
/// ```
/// use u_timetable::config::SchedulerConfig;
/// use u_timetable::milp::{ConstraintKind, TimetableMilpBuilder};
/// use u_timetable::models::School;
/// use u_timetable::tables::InputTables;
///
/// let config = SchedulerConfig::plain(&["P1", "P2"]);
/// let tables = InputTables::new()
///     .with_section("S1", "Math", "T1", 30)
///     .with_preference("A", &["Math"]);
/// let school = School::from_tables(&tables, &config).unwrap();
///
/// let model = TimetableMilpBuilder::from_config(&school, &config).build();
/// assert_eq!(model.count_constraints(ConstraintKind::OnePeriod), 1);
/// ```
pub struct TimetableMilpBuilder<'a> {
    school: &'a School,
    objective: ObjectiveWeights,
    sped_cap: Option<u32>,
}

impl<'a> TimetableMilpBuilder<'a> {
    /// Creates a builder with default objective weights and SPED cap.
    pub fn new(school: &'a School) -> Self {
        Self::from_config(school, &SchedulerConfig::default())
    }

    /// Creates a builder using the configured weights and SPED cap.
    pub fn from_config(school: &'a School, config: &SchedulerConfig) -> Self {
        Self {
            school,
            objective: config.objective.clone(),
            sped_cap: config.sped.hard_cap,
        }
    }

    /// Sets the objective weights.
    pub fn with_objective(mut self, objective: ObjectiveWeights) -> Self {
        self.objective = objective;
        self
    }

    /// Sets (or disables) the SPED hard cap.
    pub fn with_sped_cap(mut self, cap: Option<u32>) -> Self {
        self.sped_cap = cap;
        self
    }

    /// Builds the model.
    pub fn build(&self) -> MilpModel {
        let school = self.school;
        let mut model = MilpModel::new("timetable");

        // z: section × feasible period
        let mut periods_of: BTreeMap<&SectionId, Vec<(&PeriodId, VarId)>> = BTreeMap::new();
        for section in school.sections() {
            let teacher = school.teacher(&section.teacher_id);
            let slots: Vec<(&PeriodId, VarId)> = school
                .allowed_periods(&section.id)
                .iter()
                .filter(|p| teacher.map_or(true, |t| t.is_available(p)))
                .map(|p| {
                    let key = VarKey::Schedule {
                        section: section.id.clone(),
                        period: p.clone(),
                    };
                    (p, model.add_variable(key, VarDomain::Binary, 0.0))
                })
                .collect();
            periods_of.insert(&section.id, slots);
        }

        // overflow: every section
        for section in school.sections() {
            model.add_variable(
                VarKey::Overflow {
                    section: section.id.clone(),
                },
                VarDomain::NonNegativeInteger,
                self.objective.overflow,
            );
        }

        // x, missed, y per request
        for student in school.students() {
            for course in &student.requests {
                let missed = model.add_variable(
                    VarKey::Missed {
                        student: student.id.clone(),
                        course: course.clone(),
                    },
                    VarDomain::Binary,
                    self.objective.missed_request,
                );
                let mut request = vec![(missed, 1.0)];

                for section_id in school.sections_of_course(course) {
                    let Some(slots) = periods_of.get(section_id).filter(|s| !s.is_empty()) else {
                        continue;
                    };
                    let x = model.add_variable(
                        VarKey::Enroll {
                            student: student.id.clone(),
                            section: section_id.clone(),
                        },
                        VarDomain::Binary,
                        0.0,
                    );
                    request.push((x, 1.0));

                    for &(period, z) in slots {
                        let y = model.add_variable(
                            VarKey::CoOccur {
                                student: student.id.clone(),
                                section: section_id.clone(),
                                period: period.clone(),
                            },
                            VarDomain::Binary,
                            0.0,
                        );
                        model.add_constraint(
                            ConstraintKind::LinkEnroll,
                            vec![(y, 1.0), (x, -1.0)],
                            Sense::LessEqual,
                            0.0,
                        );
                        model.add_constraint(
                            ConstraintKind::LinkSchedule,
                            vec![(y, 1.0), (z, -1.0)],
                            Sense::LessEqual,
                            0.0,
                        );
                        model.add_constraint(
                            ConstraintKind::LinkBoth,
                            vec![(y, 1.0), (x, -1.0), (z, -1.0)],
                            Sense::GreaterEqual,
                            -1.0,
                        );
                    }
                }

                model.add_constraint(ConstraintKind::Request, request, Sense::Equal, 1.0);
            }
        }

        // One period per placeable section
        for section in school.sections() {
            let terms: Vec<(VarId, f64)> = periods_of
                .get(&section.id)
                .into_iter()
                .flatten()
                .map(|&(_, z)| (z, 1.0))
                .collect();
            model.add_constraint(ConstraintKind::OnePeriod, terms, Sense::Equal, 1.0);
        }

        // Soft capacity and SPED cap
        for section in school.sections() {
            let mut enrolled = Vec::new();
            let mut sped = Vec::new();
            for student in school.students() {
                let key = VarKey::Enroll {
                    student: student.id.clone(),
                    section: section.id.clone(),
                };
                if let Some(x) = model.var(&key) {
                    enrolled.push((x, 1.0));
                    if student.sped {
                        sped.push((x, 1.0));
                    }
                }
            }
            if enrolled.is_empty() {
                continue;
            }
            if let Some(overflow) = model.var(&VarKey::Overflow {
                section: section.id.clone(),
            }) {
                enrolled.push((overflow, -1.0));
            }
            model.add_constraint(
                ConstraintKind::Capacity,
                enrolled,
                Sense::LessEqual,
                f64::from(section.capacity),
            );
            if let Some(cap) = self.sped_cap {
                model.add_constraint(ConstraintKind::SpedCap, sped, Sense::LessEqual, f64::from(cap));
            }
        }

        // Teacher per period
        for teacher in school.teachers() {
            for period in school.periods().iter() {
                let terms: Vec<(VarId, f64)> = school
                    .sections_of_teacher(&teacher.id)
                    .iter()
                    .filter_map(|s| {
                        model.var(&VarKey::Schedule {
                            section: s.clone(),
                            period: period.clone(),
                        })
                    })
                    .map(|z| (z, 1.0))
                    .collect();
                if terms.len() > 1 {
                    model.add_constraint(ConstraintKind::TeacherPeriod, terms, Sense::LessEqual, 1.0);
                }
            }
        }

        // Student per period
        for student in school.students() {
            let mut by_period: BTreeMap<&PeriodId, Vec<(VarId, f64)>> = BTreeMap::new();
            for course in &student.requests {
                for section_id in school.sections_of_course(course) {
                    for &(period, _) in periods_of.get(section_id).into_iter().flatten() {
                        let key = VarKey::CoOccur {
                            student: student.id.clone(),
                            section: section_id.clone(),
                            period: period.clone(),
                        };
                        if let Some(y) = model.var(&key) {
                            by_period.entry(period).or_default().push((y, 1.0));
                        }
                    }
                }
            }
            for terms in by_period.into_values() {
                if terms.len() > 1 {
                    model.add_constraint(ConstraintKind::StudentPeriod, terms, Sense::LessEqual, 1.0);
                }
            }
        }

        info!(
            event = "milp_built",
            variables = model.variable_count() as u64,
            constraints = model.constraint_count() as u64,
        );
        model
    }
}
