//! Teacher availability, workload caps and counters.
//!
//! Teachers are referenced by id. Their scheduling-relevant properties are
//! an availability rule over days and a daily period cap; the per-run
//! counters live in [`TeacherLoad`].

use serde::{Deserialize, Serialize};

/// Which days a teacher can be scheduled on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    /// Allow-list: only these days.
    Only(Vec<String>),
    /// Deny-list: every day except these.
    Except(Vec<String>),
}

impl Availability {
    /// Allow-list rule.
    pub fn only<I, S>(days: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Availability::Only(days.into_iter().map(Into::into).collect())
    }

    /// Deny-list rule.
    pub fn except<I, S>(days: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Availability::Except(days.into_iter().map(Into::into).collect())
    }

    /// Whether the rule permits `day`.
    pub fn permits(&self, day: &str) -> bool {
        match self {
            Availability::Only(days) => days.iter().any(|d| d == day),
            Availability::Except(days) => !days.iter().any(|d| d == day),
        }
    }
}

/// Daily period caps.
///
/// Teachers listed in `exceptions` use the `exception` cap, everyone
/// else uses `standard`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeacherCaps {
    /// Default periods per day.
    pub standard: u32,
    /// Cap for listed exception teachers.
    pub exception: u32,
    /// Teacher ids using the exception cap.
    pub exceptions: Vec<String>,
}

impl Default for TeacherCaps {
    fn default() -> Self {
        Self {
            standard: 6,
            exception: 8,
            exceptions: Vec::new(),
        }
    }
}

impl TeacherCaps {
    /// Creates caps with no exceptions.
    pub fn new(standard: u32, exception: u32) -> Self {
        Self {
            standard,
            exception,
            exceptions: Vec::new(),
        }
    }

    /// Lists a teacher as a workload exception.
    pub fn with_exception(mut self, teacher: impl Into<String>) -> Self {
        self.exceptions.push(teacher.into());
        self
    }

    /// Daily cap applicable to `teacher`.
    pub fn daily_cap(&self, teacher: &str) -> u32 {
        if self.exceptions.iter().any(|t| t == teacher) {
            self.exception
        } else {
            self.standard
        }
    }
}

/// Per-run workload counters of one teacher.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherLoad {
    /// Total periods assigned this week.
    pub total: u32,
    /// Periods assigned per day index.
    pub per_day: Vec<u32>,
}

impl TeacherLoad {
    /// Creates zeroed counters for `days` days.
    pub fn new(days: usize) -> Self {
        Self {
            total: 0,
            per_day: vec![0; days],
        }
    }

    /// Periods on day `day`.
    pub fn on_day(&self, day: usize) -> u32 {
        self.per_day.get(day).copied().unwrap_or(0)
    }

    /// Records one taught period on `day`.
    pub fn record(&mut self, day: usize) {
        if day >= self.per_day.len() {
            self.per_day.resize(day + 1, 0);
        }
        self.per_day[day] += 1;
        self.total += 1;
    }

    /// Busiest day count.
    pub fn peak(&self) -> u32 {
        self.per_day.iter().copied().max().unwrap_or(0)
    }
}
