//! Divisions and their structural layouts.
//!
//! A division groups class years that share a slot layout and a set of
//! subject requirements. The division of a class is derived from its id
//! (the first number in the id is the year) unless the input overrides it.
//!
//! | Years | Division |
//! |-------|----------|
//! | 1-2 | `lowerPrimary` |
//! | 3-5 | `upperPrimary` |
//! | 6-8 | `lowerSecondary` |
//! | 9+ | `upperSecondary` |

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::PeriodId;

/// Curriculum and structural bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Division {
    LowerPrimary,
    UpperPrimary,
    LowerSecondary,
    UpperSecondary,
}

impl Division {
    /// All divisions, youngest first.
    pub const ALL: [Division; 4] = [
        Division::LowerPrimary,
        Division::UpperPrimary,
        Division::LowerSecondary,
        Division::UpperSecondary,
    ];

    /// Division for a school year. Year 0 has none.
    pub fn from_year(year: u32) -> Option<Self> {
        match year {
            0 => None,
            1..=2 => Some(Division::LowerPrimary),
            3..=5 => Some(Division::UpperPrimary),
            6..=8 => Some(Division::LowerSecondary),
            _ => Some(Division::UpperSecondary),
        }
    }

    /// Derives the division from a class id such as `"4B"` or `"Year 10"`.
    ///
    /// Uses the first run of digits in the id as the year.
    pub fn from_class_id(class_id: &str) -> Option<Self> {
        let digits: String = class_id
            .chars()
            .skip_while(|c| !c.is_ascii_digit())
            .take_while(|c| c.is_ascii_digit())
            .collect();
        digits.parse().ok().and_then(Self::from_year)
    }

    /// Name as used in input files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Division::LowerPrimary => "lowerPrimary",
            Division::UpperPrimary => "upperPrimary",
            Division::LowerSecondary => "lowerSecondary",
            Division::UpperSecondary => "upperSecondary",
        }
    }
}

impl fmt::Display for Division {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Slot layout of a division (or of a single class, as an override).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DivisionLayout {
    /// Valid lesson-slot ids, ascending.
    #[serde(deserialize_with = "ascending_slots")]
    pub lesson_slots: Vec<PeriodId>,
    /// Break period id.
    #[serde(default)]
    pub break_period: Option<PeriodId>,
    /// Lunch period id.
    #[serde(default)]
    pub lunch_period: Option<PeriodId>,
    /// Per-day replacement of `lesson_slots` (day name → slots).
    #[serde(default, deserialize_with = "ascending_day_slots")]
    pub day_slots: BTreeMap<String, Vec<PeriodId>>,
}

fn normalize(slots: &mut Vec<PeriodId>) {
    slots.sort_unstable();
    slots.dedup();
}

fn ascending_slots<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<PeriodId>, D::Error> {
    let mut slots = Vec::<PeriodId>::deserialize(deserializer)?;
    normalize(&mut slots);
    Ok(slots)
}

fn ascending_day_slots<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeMap<String, Vec<PeriodId>>, D::Error> {
    let mut day_slots = BTreeMap::<String, Vec<PeriodId>>::deserialize(deserializer)?;
    day_slots.values_mut().for_each(normalize);
    Ok(day_slots)
}

impl DivisionLayout {
    /// Creates a layout with the given lesson slots.
    pub fn new(mut lesson_slots: Vec<PeriodId>) -> Self {
        normalize(&mut lesson_slots);
        Self {
            lesson_slots,
            ..Self::default()
        }
    }

    /// Sets the break period.
    pub fn with_break(mut self, period: PeriodId) -> Self {
        self.break_period = Some(period);
        self
    }

    /// Sets the lunch period.
    pub fn with_lunch(mut self, period: PeriodId) -> Self {
        self.lunch_period = Some(period);
        self
    }

    /// Replaces the lesson slots for one day.
    pub fn with_day_slots(mut self, day: impl Into<String>, mut slots: Vec<PeriodId>) -> Self {
        normalize(&mut slots);
        self.day_slots.insert(day.into(), slots);
        self
    }

    /// Lesson slots for a day, ascending.
    pub fn slots_for(&self, day: &str) -> &[PeriodId] {
        self.day_slots
            .get(day)
            .map(Vec::as_slice)
            .unwrap_or(&self.lesson_slots)
    }

    /// Whether `period` is a lesson slot on `day`.
    pub fn is_lesson_slot(&self, day: &str, period: PeriodId) -> bool {
        self.slots_for(day).contains(&period)
    }

    /// Break and lunch period ids.
    pub fn pause_periods(&self) -> Vec<PeriodId> {
        self.break_period.into_iter().chain(self.lunch_period).collect()
    }

    /// Whether `period` is this layout's break or lunch.
    pub fn is_pause(&self, period: PeriodId) -> bool {
        self.break_period == Some(period) || self.lunch_period == Some(period)
    }
}
