//! Solver configuration.
//!
//! Policy differences between schools are named toggles here rather than
//! separate code paths.
//!
//! # Examples
//!
//! ```
//! use u_timetable::config::{SlotOrder, SolverConfig};
//!
//! let config = SolverConfig::default()
//!     .with_seed(7)
//!     .with_max_subject_periods_per_day(2)
//!     .with_single_slot_order(SlotOrder::Ascending);
//! assert!(config.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Result, TimetableError};

/// Order in which candidate slots are tried for a single period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotOrder {
    /// Shuffled with the run's RNG.
    #[default]
    Random,
    /// Earliest period first.
    Ascending,
}

/// Configuration for a generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Random seed for reproducibility. `None` draws a fresh seed.
    pub seed: Option<u64>,

    /// Maximum periods of one subject per class per day.
    pub max_subject_periods_per_day: u32,

    /// Whether a strict double may fall back to two singles on one day.
    ///
    /// Mixed-structure doubles always may.
    pub strict_double_singles_fallback: bool,

    /// Whether slots separated only by break/lunch count as consecutive.
    pub allow_doubles_across_breaks: bool,

    /// Candidate order for single periods.
    pub single_slot_order: SlotOrder,

    /// Block search calls allowed per (class, subject) requirement.
    ///
    /// Successful searches count too, so a requirement needing more blocks
    /// than this is always reported short.
    pub max_attempts_per_requirement: u32,

    /// Abort with an error instead of continuing on invalid input.
    pub strict_input: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            seed: None,
            max_subject_periods_per_day: 2,
            strict_double_singles_fallback: false,
            allow_doubles_across_breaks: true,
            single_slot_order: SlotOrder::Random,
            max_attempts_per_requirement: 32,
            strict_input: false,
        }
    }
}

impl SolverConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_max_subject_periods_per_day(mut self, n: u32) -> Self {
        self.max_subject_periods_per_day = n;
        self
    }

    pub fn with_strict_double_singles_fallback(mut self, enabled: bool) -> Self {
        self.strict_double_singles_fallback = enabled;
        self
    }

    pub fn with_doubles_across_breaks(mut self, enabled: bool) -> Self {
        self.allow_doubles_across_breaks = enabled;
        self
    }

    pub fn with_single_slot_order(mut self, order: SlotOrder) -> Self {
        self.single_slot_order = order;
        self
    }

    pub fn with_max_attempts_per_requirement(mut self, n: u32) -> Self {
        self.max_attempts_per_requirement = n;
        self
    }

    pub fn with_strict_input(mut self, strict: bool) -> Self {
        self.strict_input = strict;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.max_subject_periods_per_day == 0 {
            return Err(TimetableError::InvalidConfig(
                "max_subject_periods_per_day must be at least 1".into(),
            ));
        }
        if self.max_attempts_per_requirement == 0 {
            return Err(TimetableError::InvalidConfig(
                "max_attempts_per_requirement must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
