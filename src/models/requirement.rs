//! Lesson requirement model.
//!
//! A requirement is one (class, subject) demand with everything the
//! scheduler needs resolved: teacher, weekly count, block structure,
//! allowed days and exclusive resource.

use serde::{Deserialize, Serialize};

use super::{Division, DoubleStructure};

/// Block structure of a requirement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockStructure {
    /// Single periods only.
    #[default]
    Singles,
    /// Double periods only. An odd remainder is placed as one single.
    StrictDoubles,
    /// Explicit doubles/singles targets.
    Mixed { doubles: u32, singles: u32 },
}

impl From<DoubleStructure> for BlockStructure {
    fn from(s: DoubleStructure) -> Self {
        match s {
            DoubleStructure::Strict => BlockStructure::StrictDoubles,
            DoubleStructure::Mixed { doubles, singles } => BlockStructure::Mixed { doubles, singles },
        }
    }
}

/// One (class, subject) weekly demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonRequirement {
    /// Class id.
    pub class_id: String,
    /// Division of the class.
    pub division: Division,
    /// Subject name.
    pub subject: String,
    /// Teacher id.
    pub teacher: String,
    /// Required weekly periods.
    pub periods: u32,
    /// Grouping into blocks.
    pub structure: BlockStructure,
    /// Allowed day indices. `None` = every day.
    pub allowed_days: Option<Vec<usize>>,
    /// Exclusive resource the subject needs.
    pub resource: Option<String>,
}

impl LessonRequirement {
    /// Creates a singles requirement on every day.
    pub fn new(
        class_id: impl Into<String>,
        division: Division,
        subject: impl Into<String>,
        teacher: impl Into<String>,
        periods: u32,
    ) -> Self {
        Self {
            class_id: class_id.into(),
            division,
            subject: subject.into(),
            teacher: teacher.into(),
            periods,
            structure: BlockStructure::Singles,
            allowed_days: None,
            resource: None,
        }
    }

    /// Sets the block structure.
    pub fn with_structure(mut self, structure: BlockStructure) -> Self {
        self.structure = structure;
        self
    }

    /// Restricts to the given day indices.
    pub fn with_allowed_days(mut self, days: Vec<usize>) -> Self {
        self.allowed_days = Some(days);
        self
    }

    /// Sets the exclusive resource.
    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    /// Whether the requirement is restricted to certain days.
    pub fn is_day_restricted(&self) -> bool {
        self.allowed_days.is_some()
    }

    /// Number of allowed days out of `day_count`.
    pub fn allowed_day_count(&self, day_count: usize) -> usize {
        self.allowed_days
            .as_ref()
            .map_or(day_count, |d| d.len())
    }

    /// Allowed day indices out of `day_count`.
    pub fn days(&self, day_count: usize) -> Vec<usize> {
        match &self.allowed_days {
            Some(days) => days.iter().copied().filter(|&d| d < day_count).collect(),
            None => (0..day_count).collect(),
        }
    }

    /// Number of (doubles, singles) to place so that they sum to `periods`.
    ///
    /// Mixed structures keep their double target where possible and fill
    /// the rest with singles; the rule's own singles count is not used.
    /// Input validation flags rules whose counts disagree.
    pub fn block_plan(&self) -> (u32, u32) {
        let p = self.periods;
        match self.structure {
            BlockStructure::Singles => (0, p),
            BlockStructure::StrictDoubles => (p / 2, p % 2),
            BlockStructure::Mixed { doubles, .. } => {
                let d = doubles.min(p / 2);
                (d, p - 2 * d)
            }
        }
    }
}
