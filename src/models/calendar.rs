//! Week calendar and time slot models.
//!
//! Defines the structure every class grid shares: the ordered school days
//! and the ordered period table for a day.
//!
//! # Time Model
//! Days are addressed by their position in [`WeekCalendar::days`].
//! Periods are addressed by their numeric id. Ids are totally ordered
//! within a day; two periods are consecutive when their ids differ by 1.

use serde::{Deserialize, Serialize};

/// Numeric period identifier (e.g. 1 = first lesson of the day).
pub type PeriodId = u32;

/// Period type tag from the global period table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodKind {
    /// Ordinary period (lesson, break or lunch depending on the layout).
    #[default]
    Normal,
    /// Arrival/registration period before lessons start.
    Arrival,
}

/// One row of the global period table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    /// Period id.
    pub id: PeriodId,
    /// Display time (e.g. "08:00-08:45"). Not interpreted by the engine.
    #[serde(default)]
    pub time: String,
    /// Period type.
    #[serde(default)]
    pub kind: PeriodKind,
}

/// A (day, period) address in a class grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeSlot {
    /// Day index into [`WeekCalendar::days`].
    pub day: usize,
    /// Period id.
    pub period: PeriodId,
}

impl Period {
    /// Creates a normal period.
    pub fn new(id: PeriodId, time: impl Into<String>) -> Self {
        Self {
            id,
            time: time.into(),
            kind: PeriodKind::Normal,
        }
    }

    /// Creates an arrival period.
    pub fn arrival(id: PeriodId, time: impl Into<String>) -> Self {
        Self {
            id,
            time: time.into(),
            kind: PeriodKind::Arrival,
        }
    }
}

impl TimeSlot {
    /// Creates a new slot.
    pub fn new(day: usize, period: PeriodId) -> Self {
        Self { day, period }
    }
}

/// The week structure shared by all class grids.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeekCalendar {
    /// Ordered day names.
    pub days: Vec<String>,
    /// Period table, sorted by id.
    pub periods: Vec<Period>,
}

impl WeekCalendar {
    /// Creates a calendar. Periods are sorted by id and deduplicated.
    pub fn new(days: Vec<String>, mut periods: Vec<Period>) -> Self {
        periods.sort_by_key(|p| p.id);
        periods.dedup_by_key(|p| p.id);
        Self { days, periods }
    }

    /// Number of days.
    pub fn day_count(&self) -> usize {
        self.days.len()
    }

    /// Period ids in ascending order.
    pub fn period_ids(&self) -> Vec<PeriodId> {
        self.periods.iter().map(|p| p.id).collect()
    }

    /// Position of a day name.
    pub fn day_index(&self, name: &str) -> Option<usize> {
        self.days.iter().position(|d| d == name)
    }

    /// Name of the day at `index`.
    pub fn day_name(&self, index: usize) -> Option<&str> {
        self.days.get(index).map(String::as_str)
    }

    /// Looks up a period by id.
    pub fn period(&self, id: PeriodId) -> Option<&Period> {
        self.periods.iter().find(|p| p.id == id)
    }

    /// Whether the period table tags `id` as an arrival period.
    pub fn is_arrival(&self, id: PeriodId) -> bool {
        self.period(id)
            .is_some_and(|p| p.kind == PeriodKind::Arrival)
    }

    /// All (day, period) slots, day-major.
    pub fn slots(&self) -> impl Iterator<Item = TimeSlot> + '_ {
        (0..self.days.len())
            .flat_map(move |d| self.periods.iter().map(move |p| TimeSlot::new(d, p.id)))
    }
}

/// Whether `second` directly follows `first`.
///
/// Ids differing by 1 are consecutive. When `bridges` is non-empty, a gap
/// made up only of bridge periods (break, lunch) also counts.
pub fn is_consecutive(first: PeriodId, second: PeriodId, bridges: &[PeriodId]) -> bool {
    if second <= first {
        return false;
    }
    if second - first == 1 {
        return true;
    }
    !bridges.is_empty() && (first + 1..second).all(|id| bridges.contains(&id))
}
