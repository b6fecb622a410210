//! Solver-independent MILP model.
//!
//! A [`MilpModel`] is a flat list of typed variables, linear constraints
//! over them, and a linear minimization objective. Variables are addressed
//! by [`VarId`] (dense, creation order) and looked up by their domain
//! [`VarKey`].

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::models::{CourseId, PeriodId, SectionId, StudentId};

/// Dense variable handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct VarId(usize);

impl VarId {
    /// Position in the model's variable list.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Domain meaning of a variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum VarKey {
    /// `x`: student enrolled in section.
    Enroll {
        student: StudentId,
        section: SectionId,
    },
    /// `z`: section scheduled in period.
    Schedule {
        section: SectionId,
        period: PeriodId,
    },
    /// `y`: student sits in section during period.
    CoOccur {
        student: StudentId,
        section: SectionId,
        period: PeriodId,
    },
    /// Request left unsatisfied.
    Missed {
        student: StudentId,
        course: CourseId,
    },
    /// Seats used beyond capacity.
    Overflow { section: SectionId },
}

impl fmt::Display for VarKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enroll { student, section } => write!(f, "x[{student},{section}]"),
            Self::Schedule { section, period } => write!(f, "z[{section},{period}]"),
            Self::CoOccur {
                student,
                section,
                period,
            } => write!(f, "y[{student},{section},{period}]"),
            Self::Missed { student, course } => write!(f, "missed[{student},{course}]"),
            Self::Overflow { section } => write!(f, "overflow[{section}]"),
        }
    }
}

/// Variable domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VarDomain {
    /// {0, 1}
    Binary,
    /// {0, 1, 2, ...}
    NonNegativeInteger,
}

/// A decision variable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Variable {
    pub key: VarKey,
    pub domain: VarDomain,
    /// Objective coefficient.
    pub cost: f64,
}

/// Constraint family, for inspection and counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ConstraintKind {
    /// Σ_p z[s,p] = 1
    OnePeriod,
    /// Σ_st x[st,s] − overflow[s] ≤ capacity
    Capacity,
    /// Σ_s∈course x[st,s] + missed[st,course] = 1
    Request,
    /// Σ_s∈teacher z[s,p] ≤ 1
    TeacherPeriod,
    /// Σ_s y[st,s,p] ≤ 1
    StudentPeriod,
    /// y ≤ x
    LinkEnroll,
    /// y ≤ z
    LinkSchedule,
    /// y ≥ x + z − 1
    LinkBoth,
    /// Σ_sped x[st,s] ≤ cap
    SpedCap,
}

impl ConstraintKind {
    /// Whether a broken row of this kind rules out a solver incumbent.
    ///
    /// A section without a period decodes as unscheduled and is reported
    /// through the run diagnostics, so `OnePeriod` does not.
    pub fn disqualifies(self) -> bool {
        !matches!(self, ConstraintKind::OnePeriod)
    }
}

/// Constraint sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Sense {
    LessEqual,
    Equal,
    GreaterEqual,
}

/// A linear constraint `Σ coef·var (sense) rhs`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinearConstraint {
    pub kind: ConstraintKind,
    pub terms: Vec<(VarId, f64)>,
    pub sense: Sense,
    pub rhs: f64,
}

impl LinearConstraint {
    /// Whether `values` satisfy the constraint within `tolerance`.
    pub fn is_satisfied(&self, values: &VariableAssignment, tolerance: f64) -> bool {
        let lhs: f64 = self
            .terms
            .iter()
            .map(|&(var, coef)| coef * values.value(var))
            .sum();
        match self.sense {
            Sense::LessEqual => lhs <= self.rhs + tolerance,
            Sense::Equal => (lhs - self.rhs).abs() <= tolerance,
            Sense::GreaterEqual => lhs >= self.rhs - tolerance,
        }
    }
}

/// Values for every variable of a model, indexed by [`VarId`].
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct VariableAssignment {
    values: Vec<f64>,
}

impl VariableAssignment {
    /// All-zero assignment for `len` variables.
    pub fn zeros(len: usize) -> Self {
        Self {
            values: vec![0.0; len],
        }
    }

    /// Wraps raw solver values.
    pub fn from_values(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// Sets one value. Out-of-range handles are ignored.
    pub fn set(&mut self, var: VarId, value: f64) {
        if let Some(slot) = self.values.get_mut(var.0) {
            *slot = value;
        }
    }

    /// Value of `var` (0 when out of range).
    #[inline]
    pub fn value(&self, var: VarId) -> f64 {
        self.values.get(var.0).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

/// Objective value split by penalty term.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ObjectiveBreakdown {
    /// Weighted missed requests.
    pub missed_penalty: f64,
    /// Weighted overflow seats.
    pub overflow_penalty: f64,
}

impl ObjectiveBreakdown {
    pub fn total(&self) -> f64 {
        self.missed_penalty + self.overflow_penalty
    }
}

/// A mixed-integer linear program.
#[derive(Debug, Clone, Default)]
pub struct MilpModel {
    name: String,
    variables: Vec<Variable>,
    lookup: HashMap<VarKey, VarId>,
    constraints: Vec<LinearConstraint>,
}

impl MilpModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds a variable, or returns the existing handle for `key`.
    pub fn add_variable(&mut self, key: VarKey, domain: VarDomain, cost: f64) -> VarId {
        if let Some(&id) = self.lookup.get(&key) {
            return id;
        }
        let id = VarId(self.variables.len());
        self.lookup.insert(key.clone(), id);
        self.variables.push(Variable { key, domain, cost });
        id
    }

    /// Adds a constraint. Empty constraints are dropped.
    pub fn add_constraint(
        &mut self,
        kind: ConstraintKind,
        terms: Vec<(VarId, f64)>,
        sense: Sense,
        rhs: f64,
    ) {
        if terms.is_empty() {
            return;
        }
        self.constraints.push(LinearConstraint {
            kind,
            terms,
            sense,
            rhs,
        });
    }

    /// Handle of the variable for `key`, if the model has one.
    #[inline]
    pub fn var(&self, key: &VarKey) -> Option<VarId> {
        self.lookup.get(key).copied()
    }

    pub fn variable(&self, id: VarId) -> Option<&Variable> {
        self.variables.get(id.0)
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// Variables with their handles, in creation order.
    pub fn iter_variables(&self) -> impl Iterator<Item = (VarId, &Variable)> {
        self.variables.iter().enumerate().map(|(i, v)| (VarId(i), v))
    }

    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Number of constraints of one family.
    pub fn count_constraints(&self, kind: ConstraintKind) -> usize {
        self.constraints.iter().filter(|c| c.kind == kind).count()
    }

    /// Objective value of an assignment.
    pub fn objective_value(&self, values: &VariableAssignment) -> f64 {
        self.objective_breakdown(values).total()
    }

    /// Objective value split into its missed-request and overflow terms.
    pub fn objective_breakdown(&self, values: &VariableAssignment) -> ObjectiveBreakdown {
        let mut breakdown = ObjectiveBreakdown::default();
        for (id, var) in self.iter_variables() {
            let term = var.cost * values.value(id);
            match var.key {
                VarKey::Missed { .. } => breakdown.missed_penalty += term,
                VarKey::Overflow { .. } => breakdown.overflow_penalty += term,
                _ => {}
            }
        }
        breakdown
    }

    /// Constraints `values` break, within `tolerance`.
    pub fn violated_constraints<'a>(
        &'a self,
        values: &'a VariableAssignment,
        tolerance: f64,
    ) -> impl Iterator<Item = &'a LinearConstraint> + 'a {
        self.constraints
            .iter()
            .filter(move |c| !c.is_satisfied(values, tolerance))
    }
}
