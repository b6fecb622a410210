//! Student hardness.
//!
//! `hardness = 1.0 × sped × special_request × (1 + step·requests)`, where
//! `special_request` applies when the student requests any period-restricted
//! course.

use crate::config::HardnessWeights;
use crate::models::{School, Student};

/// Hardness of placing a student. Higher = assigned earlier.
pub fn student_hardness(student: &Student, school: &School, weights: &HardnessWeights) -> f64 {
    let mut hardness = 1.0;
    if student.sped {
        hardness *= weights.sped;
    }
    if student.requests.iter().any(|c| school.is_restricted(c)) {
        hardness *= weights.special_request;
    }
    hardness * (1.0 + weights.request_step * student.requests.len() as f64)
}

/// Student indices ordered hardest first. Ties keep input order.
pub fn rank_students(school: &School, weights: &HardnessWeights) -> Vec<usize> {
    let scores: Vec<f64> = school
        .students()
        .iter()
        .map(|s| student_hardness(s, school, weights))
        .collect();
    let mut indices: Vec<usize> = (0..scores.len()).collect();
    indices.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
    indices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SchedulerConfig;
    use crate::tables::InputTables;

    fn school() -> School {
        let t = InputTables::new()
            .with_student("plain", false)
            .with_student("sped", true)
            .with_student("career", false)
            .with_student("busy", false)
            .with_section("S1", "Medical Career", "T1", 10)
            .with_section("S2", "Math", "T2", 10)
            .with_section("S3", "Art", "T3", 10)
            .with_preference("plain", &["Math"])
            .with_preference("sped", &["Math"])
            .with_preference("career", &["Medical Career"])
            .with_preference("busy", &["Math", "Art"]);
        School::from_tables(&t, &SchedulerConfig::default()).unwrap()
    }

    #[test]
    fn test_hardness_values() {
        let s = school();
        let w = HardnessWeights::default();
        let h = |id: &str| student_hardness(s.student(&id.into()).unwrap(), &s, &w);
        assert!((h("plain") - 1.1).abs() < 1e-12);
        assert!((h("sped") - 2.2).abs() < 1e-12);
        assert!((h("career") - 1.65).abs() < 1e-12);
        assert!((h("busy") - 1.2).abs() < 1e-12);
    }

    #[test]
    fn test_rank_hardest_first() {
        let s = school();
        let order = rank_students(&s, &HardnessWeights::default());
        let ids: Vec<&str> = order.iter().map(|&i| s.students()[i].id.as_str()).collect();
        assert_eq!(ids, vec!["sped", "career", "busy", "plain"]);
    }
}
