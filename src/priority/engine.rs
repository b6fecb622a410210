//! Priority engine for section ordering.
//!
//! Composes multiplicative priority factors and sorts sections
//! highest-priority first with a stable sort.

use std::sync::Arc;

use super::factors::{CourseScarcity, Demand, RestrictedCourse, Science, SpreadCourse, TeacherLoad};
use super::{Multiplier, PriorityFactor};
use crate::config::SectionPriorityWeights;
use crate::models::{School, Section};

/// A composable engine computing section scheduling priority.
///
/// Priority = 1.0 × every factor's multiplier.
///
/// # Example
/// ```
/// use u_timetable::config::SectionPriorityWeights;
/// use u_timetable::priority::PriorityEngine;
///
/// let engine = PriorityEngine::from_weights(&SectionPriorityWeights::default());
/// assert_eq!(engine.len(), 6);
/// ```
#[derive(Clone)]
pub struct PriorityEngine {
    factors: Vec<Arc<dyn PriorityFactor>>,
}

impl PriorityEngine {
    /// Creates an engine with no factors (every section has priority 1.0).
    pub fn new() -> Self {
        Self {
            factors: Vec::new(),
        }
    }

    /// The standard factor set with the given multipliers.
    pub fn from_weights(weights: &SectionPriorityWeights) -> Self {
        Self::new()
            .with_factor(RestrictedCourse::new(weights.restricted_course))
            .with_factor(SpreadCourse::new(weights.spread_course))
            .with_factor(Science::new(weights.science))
            .with_factor(TeacherLoad::new(weights.teacher_load_step))
            .with_factor(CourseScarcity::new(weights.course_scarcity))
            .with_factor(Demand::new(weights.demand_step))
    }

    /// Adds a factor.
    pub fn with_factor<F: PriorityFactor + 'static>(mut self, factor: F) -> Self {
        self.factors.push(Arc::new(factor));
        self
    }

    /// Number of factors.
    pub fn len(&self) -> usize {
        self.factors.len()
    }

    /// Whether the engine has no factors.
    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }

    /// Priority of one section.
    pub fn priority(&self, section: &Section, school: &School) -> f64 {
        self.factors
            .iter()
            .map(|f| f.evaluate(section, school))
            .product()
    }

    /// Each factor's multiplier for one section.
    pub fn evaluate(&self, section: &Section, school: &School) -> Vec<Multiplier> {
        self.factors
            .iter()
            .map(|f| f.evaluate(section, school))
            .collect()
    }

    /// Sorts the school's sections by priority (highest first).
    ///
    /// Returns indices into [`School::sections`]. Ties keep input order.
    pub fn sort_indices(&self, school: &School) -> Vec<usize> {
        let sections = school.sections();
        let scores: Vec<f64> = sections
            .iter()
            .map(|s| self.priority(s, school))
            .collect();
        let mut indices: Vec<usize> = (0..sections.len()).collect();
        indices.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
        indices
    }
}

impl Default for PriorityEngine {
    fn default() -> Self {
        Self::from_weights(&SectionPriorityWeights::default())
    }
}

impl std::fmt::Debug for PriorityEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PriorityEngine")
            .field(
                "factors",
                &self.factors.iter().map(|x| x.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SchedulerConfig;
    use crate::tables::InputTables;

    fn school(tables: InputTables) -> School {
        School::from_tables(&tables.with_preference("X", &[]), &SchedulerConfig::default()).unwrap()
    }

    #[test]
    fn test_restricted_before_plain() {
        let s = school(
            InputTables::new()
                .with_section("S1", "Math", "T1", 10)
                .with_section("S2", "Heroes Teach", "T2", 10),
        );
        let order = PriorityEngine::default().sort_indices(&s);
        assert_eq!(s.sections()[order[0]].id.as_str(), "S2");
    }

    #[test]
    fn test_ties_keep_input_order() {
        let s = school(
            InputTables::new()
                .with_section("S3", "Art", "T3", 10)
                .with_section("S1", "Music", "T1", 10)
                .with_section("S2", "Drama", "T2", 10),
        );
        let order = PriorityEngine::default().sort_indices(&s);
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn test_priority_is_product() {
        let s = school(
            InputTables::new()
                .with_section("S1", "Medical Career", "T1", 10)
                .with_section("S2", "Art", "T1", 10),
        );
        let engine = PriorityEngine::default();
        let sec = s.section(&"S1".into()).unwrap();
        // 5 (restricted) * 1.4 (teacher: 2 sections) * 2 (single section)
        assert!((engine.priority(sec, &s) - 14.0).abs() < 1e-9);
        let parts = engine.evaluate(sec, &s);
        assert_eq!(parts.len(), 6);
        assert!((parts.iter().product::<f64>() - 14.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_engine_is_neutral() {
        let s = school(InputTables::new().with_section("S1", "Biology", "T1", 10));
        let engine = PriorityEngine::new();
        assert!(engine.is_empty());
        assert_eq!(engine.priority(&s.sections()[0], &s), 1.0);
    }
}
