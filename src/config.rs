//! Scheduler configuration.
//!
//! Everything that tunes a run is passed explicitly through
//! [`SchedulerConfig`]; nothing is read from the process environment.
//! Defaults reproduce the production school setup (eight periods, two
//! period-restricted career courses, one spread-out high-demand course).
//!
//! # Examples
//!
//! ```
//! use u_timetable::config::SchedulerConfig;
//! use std::time::Duration;
//!
//! let config = SchedulerConfig::from_toml_str(r#"
//!     periods = ["P1", "P2", "P3"]
//!     spread_course = ""
//!
//!     [[course_restrictions]]
//!     course = "Lab"
//!     periods = ["P2"]
//!
//!     [sped]
//!     decay_threshold = 3
//!
//!     [solver]
//!     time_limit_secs = 60
//! "#).unwrap();
//!
//! assert_eq!(config.periods.len(), 3);
//! assert!(config.spread_course().is_none());
//! assert_eq!(config.sped.decay_threshold, Some(3));
//! assert_eq!(config.sped.hard_cap, Some(12));
//! assert_eq!(config.solver.time_limit(), Duration::from_secs(60));
//! ```

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{CourseId, PeriodId, DEFAULT_PERIODS};
use crate::scheduler::WarmStartStrategy;

/// Configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main scheduler configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct SchedulerConfig {
    /// Ordered period identifiers used when no Periods table is supplied.
    pub periods: Vec<PeriodId>,

    /// Period-restricted courses, in declared order.
    pub course_restrictions: Vec<CourseRestriction>,

    /// High-demand course whose sections are spread across periods.
    /// An empty string disables it.
    pub spread_course: Option<CourseId>,

    /// How science sections are recognised.
    pub science: ScienceConfig,

    /// Courses assigned first to each student, in this order.
    /// `None` = restricted courses in declared order, then the spread course.
    pub special_courses: Option<Vec<CourseId>>,

    /// SPED distribution policy.
    pub sped: SpedPolicy,

    /// Heuristic multipliers.
    pub weights: HeuristicWeights,

    /// Objective weights for the exact formulation.
    pub objective: ObjectiveWeights,

    /// Solver budget.
    pub solver: SolverSettings,

    /// Strategy used to build the warm start.
    pub warm_start: WarmStartStrategy,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            periods: DEFAULT_PERIODS.iter().map(|&p| PeriodId::from(p)).collect(),
            course_restrictions: vec![
                CourseRestriction::new("Medical Career", &["R1", "G1"]),
                CourseRestriction::new("Heroes Teach", &["R2", "G2"]),
            ],
            spread_course: Some(CourseId::from("Sports Med")),
            science: ScienceConfig::default(),
            special_courses: None,
            sped: SpedPolicy::default(),
            weights: HeuristicWeights::default(),
            objective: ObjectiveWeights::default(),
            solver: SolverSettings::default(),
            warm_start: WarmStartStrategy::default(),
        }
    }
}

impl SchedulerConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration with no restrictions, no spread course and no
    /// science courses over the given periods.
    pub fn plain(periods: &[&str]) -> Self {
        Self {
            periods: periods.iter().map(|&p| PeriodId::from(p)).collect(),
            course_restrictions: Vec::new(),
            spread_course: None,
            science: ScienceConfig {
                department_marker: String::new(),
                courses: Vec::new(),
            },
            ..Self::default()
        }
    }

    /// Loads configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string and validates it.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the period list.
    pub fn with_periods(mut self, periods: &[&str]) -> Self {
        self.periods = periods.iter().map(|&p| PeriodId::from(p)).collect();
        self
    }

    /// Adds a period restriction for a course.
    pub fn with_restriction(mut self, course: &str, periods: &[&str]) -> Self {
        self.course_restrictions
            .push(CourseRestriction::new(course, periods));
        self
    }

    /// Sets the spread course.
    pub fn with_spread_course(mut self, course: Option<&str>) -> Self {
        self.spread_course = course.map(CourseId::from);
        self
    }

    /// Sets the SPED policy.
    pub fn with_sped_policy(mut self, sped: SpedPolicy) -> Self {
        self.sped = sped;
        self
    }

    /// Sets the warm-start strategy.
    pub fn with_warm_start(mut self, strategy: WarmStartStrategy) -> Self {
        self.warm_start = strategy;
        self
    }

    /// Sets the solver time limit.
    pub fn with_time_limit_secs(mut self, secs: u64) -> Self {
        self.solver.time_limit_secs = secs;
        self
    }

    /// The spread course, ignoring a blank value.
    pub fn spread_course(&self) -> Option<&CourseId> {
        self.spread_course.as_ref().filter(|c| !c.is_blank())
    }

    /// Allowed periods for a course, if it is restricted.
    pub fn restriction_for(&self, course: &CourseId) -> Option<&[PeriodId]> {
        self.course_restrictions
            .iter()
            .find(|r| &r.course == course)
            .map(|r| r.periods.as_slice())
    }

    /// Student-assigner phase 1 course order.
    pub fn special_courses(&self) -> Vec<CourseId> {
        if let Some(explicit) = &self.special_courses {
            return explicit.clone();
        }
        let mut courses: Vec<CourseId> = self
            .course_restrictions
            .iter()
            .map(|r| r.course.clone())
            .collect();
        if let Some(spread) = self.spread_course() {
            if !courses.contains(spread) {
                courses.push(spread.clone());
            }
        }
        courses
    }

    /// Checks internal consistency.
    ///
    /// A Periods table may later replace `periods`; restriction periods
    /// missing from that table are dropped with a warning when the school
    /// is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.periods.is_empty() {
            return Err(ConfigError::Invalid("period list is empty".into()));
        }
        let mut seen = HashSet::new();
        for period in &self.periods {
            if period.is_blank() {
                return Err(ConfigError::Invalid("blank period identifier".into()));
            }
            if !seen.insert(period) {
                return Err(ConfigError::Invalid(format!("duplicate period '{period}'")));
            }
        }
        let mut restricted = HashSet::new();
        for r in &self.course_restrictions {
            if !restricted.insert(&r.course) {
                return Err(ConfigError::Invalid(format!(
                    "course '{}' is restricted twice",
                    r.course
                )));
            }
            if r.periods.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "restriction for '{}' lists no periods",
                    r.course
                )));
            }
            if let Some(unknown) = r.periods.iter().find(|p| !seen.contains(p)) {
                return Err(ConfigError::Invalid(format!(
                    "restriction for '{}' names unknown period '{unknown}'",
                    r.course
                )));
            }
        }
        if self.objective.missed_request <= 0.0 || self.objective.overflow <= 0.0 {
            return Err(ConfigError::Invalid(
                "objective weights must be positive".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.solver.mip_gap) {
            return Err(ConfigError::Invalid(format!(
                "mip_gap must lie in [0, 1], got {}",
                self.solver.mip_gap
            )));
        }
        Ok(())
    }
}

/// Period restriction for one course.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CourseRestriction {
    /// Restricted course.
    pub course: CourseId,
    /// Periods the course's sections may occupy.
    pub periods: Vec<PeriodId>,
}

impl CourseRestriction {
    /// Creates a restriction.
    pub fn new(course: &str, periods: &[&str]) -> Self {
        Self {
            course: CourseId::from(course),
            periods: periods.iter().map(|&p| PeriodId::from(p)).collect(),
        }
    }
}

/// How science sections are recognised.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScienceConfig {
    /// Substring marking a science department. Empty disables the check.
    pub department_marker: String,
    /// Courses treated as science regardless of department.
    pub courses: Vec<CourseId>,
}

impl Default for ScienceConfig {
    fn default() -> Self {
        Self {
            department_marker: "Science".to_string(),
            courses: ["Biology", "Chemistry", "Physics", "AP Biology"]
                .iter()
                .map(|&c| CourseId::from(c))
                .collect(),
        }
    }
}

/// SPED distribution policy.
///
/// The two code paths use different policies:
/// - the greedy heuristic applies a soft exponential decay once
///   `decay_threshold` SPED students already sit in a section;
/// - the exact formulation enforces `hard_cap` as a hard constraint.
///
/// `None` disables the corresponding policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SpedPolicy {
    /// Greedy path: SPED count at which the decay starts.
    pub decay_threshold: Option<u32>,
    /// Exact formulation: maximum SPED students per section.
    pub hard_cap: Option<u32>,
}

impl Default for SpedPolicy {
    fn default() -> Self {
        Self {
            decay_threshold: Some(2),
            hard_cap: Some(12),
        }
    }
}

/// Multipliers used by the priority engine and the scorers.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HeuristicWeights {
    pub section_priority: SectionPriorityWeights,
    pub period_score: PeriodScoreWeights,
    pub hardness: HardnessWeights,
    pub enrollment: EnrollmentScoreWeights,
}

/// Section priority multipliers.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SectionPriorityWeights {
    pub restricted_course: f64,
    pub spread_course: f64,
    pub science: f64,
    pub teacher_load_step: f64,
    pub course_scarcity: f64,
    pub demand_step: f64,
}

impl Default for SectionPriorityWeights {
    fn default() -> Self {
        Self {
            restricted_course: 5.0,
            spread_course: 3.0,
            science: 2.5,
            teacher_load_step: 0.2,
            course_scarcity: 1.0,
            demand_step: 0.001,
        }
    }
}

/// Period score multipliers.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PeriodScoreWeights {
    pub required_period_boost: f64,
    pub course_crowding: f64,
    pub department_crowding: f64,
    pub spread_course_penalty: f64,
    pub science_adjacency_decay: f64,
    pub period_load: f64,
}

impl Default for PeriodScoreWeights {
    fn default() -> Self {
        Self {
            required_period_boost: 2.0,
            course_crowding: 0.5,
            department_crowding: 0.3,
            spread_course_penalty: 0.5,
            science_adjacency_decay: 0.7,
            period_load: 0.1,
        }
    }
}

/// Student hardness multipliers.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HardnessWeights {
    pub sped: f64,
    pub special_request: f64,
    pub request_step: f64,
}

impl Default for HardnessWeights {
    fn default() -> Self {
        Self {
            sped: 2.0,
            special_request: 1.5,
            request_step: 0.1,
        }
    }
}

/// Student-section score multipliers.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EnrollmentScoreWeights {
    /// Score factor is `fill_headroom - fill_ratio`.
    pub fill_headroom: f64,
    pub sped_decay_base: f64,
    pub scarcity_boost: f64,
    /// Boost applies when at most this many scheduled sections remain.
    pub scarcity_threshold: usize,
}

impl Default for EnrollmentScoreWeights {
    fn default() -> Self {
        Self {
            fill_headroom: 1.1,
            sped_decay_base: 0.5,
            scarcity_boost: 2.0,
            scarcity_threshold: 2,
        }
    }
}

/// Objective weights for the exact formulation.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ObjectiveWeights {
    pub missed_request: f64,
    pub overflow: f64,
}

impl Default for ObjectiveWeights {
    fn default() -> Self {
        Self {
            missed_request: 1000.0,
            overflow: 1.0,
        }
    }
}

/// Solver budget.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SolverSettings {
    /// Wall-clock budget in seconds.
    pub time_limit_secs: u64,
    /// Relative MIP gap at which the solver may stop.
    pub mip_gap: f64,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            time_limit_secs: 25_200,
            mip_gap: 0.10,
        }
    }
}

impl SolverSettings {
    /// Time budget as a `Duration`.
    pub fn time_limit(&self) -> Duration {
        Duration::from_secs(self.time_limit_secs)
    }
}
