//! Generation input.
//!
//! The declarative description of a school handed in by the data-loading
//! collaborator: calendar structure, classes, division layouts, curriculum,
//! teacher assignments and constraints.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{ConstraintConfig, Division, DivisionLayout, Period, PeriodId, WeekCalendar};

/// Teacher reference in the assignment table: one id or a list (first used).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TeacherRef {
    One(String),
    Many(Vec<String>),
}

impl TeacherRef {
    /// The teacher actually scheduled.
    pub fn primary(&self) -> Option<&str> {
        match self {
            TeacherRef::One(id) => Some(id.as_str()).filter(|s| !s.is_empty()),
            TeacherRef::Many(ids) => ids.first().map(String::as_str),
        }
    }
}

impl From<&str> for TeacherRef {
    fn from(id: &str) -> Self {
        TeacherRef::One(id.to_string())
    }
}

impl From<String> for TeacherRef {
    fn from(id: String) -> Self {
        TeacherRef::One(id)
    }
}

/// Input for one generation run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimetableInput {
    /// Ordered day names.
    pub days: Vec<String>,
    /// Period table.
    pub periods: Vec<Period>,
    /// Class ids, in scheduling order.
    pub classes: Vec<String>,
    /// Explicit class → division overrides of the naming convention.
    #[serde(default)]
    pub class_divisions: BTreeMap<String, Division>,
    /// Default layout per division.
    pub divisions: BTreeMap<Division, DivisionLayout>,
    /// Per-class layout overrides.
    #[serde(default)]
    pub class_layouts: BTreeMap<String, DivisionLayout>,
    /// Division → subject → required weekly periods.
    pub subjects: BTreeMap<Division, BTreeMap<String, u32>>,
    /// Class → subject → teacher.
    pub teacher_assignments: BTreeMap<String, BTreeMap<String, TeacherRef>>,
    /// Additional constraints.
    #[serde(default)]
    pub constraints: ConstraintConfig,
}

impl TimetableInput {
    /// Creates an input with the given calendar structure.
    pub fn new<S: Into<String>>(days: impl IntoIterator<Item = S>, periods: Vec<Period>) -> Self {
        Self {
            days: days.into_iter().map(Into::into).collect(),
            periods,
            ..Self::default()
        }
    }

    /// Adds a class.
    pub fn with_class(mut self, class_id: impl Into<String>) -> Self {
        self.classes.push(class_id.into());
        self
    }

    /// Overrides the derived division of a class.
    pub fn with_class_division(mut self, class_id: impl Into<String>, division: Division) -> Self {
        self.class_divisions.insert(class_id.into(), division);
        self
    }

    /// Sets a division's layout.
    pub fn with_division_layout(mut self, division: Division, layout: DivisionLayout) -> Self {
        self.divisions.insert(division, layout);
        self
    }

    /// Overrides the layout of one class.
    pub fn with_class_layout(mut self, class_id: impl Into<String>, layout: DivisionLayout) -> Self {
        self.class_layouts.insert(class_id.into(), layout);
        self
    }

    /// Requires `periods` weekly periods of `subject` in `division`.
    pub fn with_subject(mut self, division: Division, subject: impl Into<String>, periods: u32) -> Self {
        self.subjects
            .entry(division)
            .or_default()
            .insert(subject.into(), periods);
        self
    }

    /// Assigns a teacher to (class, subject).
    pub fn with_teacher(
        mut self,
        class_id: impl Into<String>,
        subject: impl Into<String>,
        teacher: impl Into<TeacherRef>,
    ) -> Self {
        self.teacher_assignments
            .entry(class_id.into())
            .or_default()
            .insert(subject.into(), teacher.into());
        self
    }

    /// Sets the constraint configuration.
    pub fn with_constraints(mut self, constraints: ConstraintConfig) -> Self {
        self.constraints = constraints;
        self
    }

    /// Week structure of this input.
    pub fn calendar(&self) -> WeekCalendar {
        WeekCalendar::new(self.days.clone(), self.periods.clone())
    }

    /// Division of a class: explicit override, else naming convention.
    pub fn division_of(&self, class_id: &str) -> Option<Division> {
        self.class_divisions
            .get(class_id)
            .copied()
            .or_else(|| Division::from_class_id(class_id))
    }

    /// Effective layout of a class.
    pub fn layout_for(&self, class_id: &str) -> Option<&DivisionLayout> {
        self.class_layouts
            .get(class_id)
            .or_else(|| self.divisions.get(&self.division_of(class_id)?))
    }

    /// Weekly requirements of a class (subject → periods).
    pub fn requirements_for(&self, class_id: &str) -> Option<&BTreeMap<String, u32>> {
        self.subjects.get(&self.division_of(class_id)?)
    }

    /// Teacher assigned to (class, subject).
    pub fn teacher_for(&self, class_id: &str, subject: &str) -> Option<&str> {
        self.teacher_assignments
            .get(class_id)?
            .get(subject)?
            .primary()
    }

    /// Whether `period` appears in the period table.
    pub fn has_period(&self, period: PeriodId) -> bool {
        self.periods.iter().any(|p| p.id == period)
    }
}
