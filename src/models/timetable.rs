//! Timetable (solution) model.
//!
//! A timetable is one weekly grid per class. Every cell holds exactly one
//! [`Assignment`] once generation has finished. Shortfalls and input
//! problems are reported as [`Diagnostic`]s; post-hoc checks as
//! [`Violation`]s in a [`ValidationReport`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{PeriodId, WeekCalendar};
use crate::scheduler::WorkloadSummary;

/// Occupant of one (class, day, period) cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Assignment {
    /// A taught lesson.
    Lesson { subject: String, teacher: String },
    /// A fixed event (assembly, sports day, ...).
    SpecialEvent { name: String, color: String },
    Break,
    Lunch,
    /// Lesson slot or ordinary period with nothing scheduled.
    Free,
    /// Arrival/registration period.
    Arrival,
}

impl Assignment {
    /// Creates a lesson.
    pub fn lesson(subject: impl Into<String>, teacher: impl Into<String>) -> Self {
        Assignment::Lesson {
            subject: subject.into(),
            teacher: teacher.into(),
        }
    }

    /// Creates a special event.
    pub fn event(name: impl Into<String>, color: impl Into<String>) -> Self {
        Assignment::SpecialEvent {
            name: name.into(),
            color: color.into(),
        }
    }

    /// Whether this is a lesson.
    pub fn is_lesson(&self) -> bool {
        matches!(self, Assignment::Lesson { .. })
    }

    /// Lesson subject.
    pub fn subject(&self) -> Option<&str> {
        match self {
            Assignment::Lesson { subject, .. } => Some(subject),
            _ => None,
        }
    }

    /// Lesson teacher.
    pub fn teacher(&self) -> Option<&str> {
        match self {
            Assignment::Lesson { teacher, .. } => Some(teacher),
            _ => None,
        }
    }

    /// Short display label.
    pub fn label(&self) -> &str {
        match self {
            Assignment::Lesson { subject, .. } => subject,
            Assignment::SpecialEvent { name, .. } => name,
            Assignment::Break => "Break",
            Assignment::Lunch => "Lunch",
            Assignment::Free => "Free",
            Assignment::Arrival => "Arrival",
        }
    }
}

/// Weekly grid of one class.
///
/// `cells[day][i]` holds the occupant of period `period_ids[i]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassGrid {
    /// Class id.
    pub class_id: String,
    /// Period ids, ascending.
    pub period_ids: Vec<PeriodId>,
    /// Cells by day, then period position.
    pub cells: Vec<Vec<Option<Assignment>>>,
}

impl ClassGrid {
    /// Creates an empty grid.
    pub fn new(class_id: impl Into<String>, days: usize, period_ids: Vec<PeriodId>) -> Self {
        let width = period_ids.len();
        Self {
            class_id: class_id.into(),
            period_ids,
            cells: vec![vec![None; width]; days],
        }
    }

    fn position(&self, period: PeriodId) -> Option<usize> {
        self.period_ids.iter().position(|&p| p == period)
    }

    /// Occupant of a cell. `None` if empty or out of range.
    pub fn get(&self, day: usize, period: PeriodId) -> Option<&Assignment> {
        let idx = self.position(period)?;
        self.cells.get(day)?.get(idx)?.as_ref()
    }

    /// Whether the cell exists and is still empty.
    pub fn is_empty_at(&self, day: usize, period: PeriodId) -> bool {
        match (self.position(period), self.cells.get(day)) {
            (Some(idx), Some(row)) => row[idx].is_none(),
            _ => false,
        }
    }

    /// Writes into an empty cell. Returns `false` if the cell is occupied
    /// or does not exist.
    pub fn set(&mut self, day: usize, period: PeriodId, assignment: Assignment) -> bool {
        let Some(idx) = self.position(period) else {
            return false;
        };
        match self.cells.get_mut(day) {
            Some(row) if row[idx].is_none() => {
                row[idx] = Some(assignment);
                true
            }
            _ => false,
        }
    }

    /// All filled cells as (day, period, assignment).
    pub fn iter(&self) -> impl Iterator<Item = (usize, PeriodId, &Assignment)> + '_ {
        self.cells.iter().enumerate().flat_map(move |(day, row)| {
            row.iter()
                .zip(&self.period_ids)
                .filter_map(move |(cell, &period)| cell.as_ref().map(|a| (day, period, a)))
        })
    }

    /// Number of lessons of `subject` this week.
    pub fn lesson_count(&self, subject: &str) -> u32 {
        self.iter().filter(|(_, _, a)| a.subject() == Some(subject)).count() as u32
    }

    /// Number of lessons of `subject` on `day`.
    pub fn lesson_count_on(&self, day: usize, subject: &str) -> u32 {
        self.iter()
            .filter(|(d, _, a)| *d == day && a.subject() == Some(subject))
            .count() as u32
    }

    /// Number of lessons of any subject on `day`.
    pub fn lessons_on(&self, day: usize) -> u32 {
        self.iter().filter(|(d, _, a)| *d == day && a.is_lesson()).count() as u32
    }

    /// Number of empty cells.
    pub fn empty_cells(&self) -> usize {
        self.cells.iter().flatten().filter(|c| c.is_none()).count()
    }

    /// Whether every cell holds an assignment.
    pub fn is_complete(&self) -> bool {
        self.empty_cells() == 0
    }
}

/// Classification of diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Required periods could not all be placed.
    UnresolvedLesson,
    /// A special event hit an occupied cell.
    EventCollision,
    /// Malformed or missing input.
    DataIntegrity,
}

/// A non-fatal problem found during generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Diagnostic category.
    pub kind: DiagnosticKind,
    /// Class concerned, if any.
    pub class_id: Option<String>,
    /// Subject concerned, if any.
    pub subject: Option<String>,
    /// Periods left unplaced (unresolved lessons only).
    pub remaining: u32,
    /// Human-readable reason.
    pub message: String,
}

impl Diagnostic {
    /// Creates an unresolved-lesson diagnostic.
    pub fn unresolved(
        class_id: impl Into<String>,
        subject: impl Into<String>,
        remaining: u32,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            kind: DiagnosticKind::UnresolvedLesson,
            class_id: Some(class_id.into()),
            subject: Some(subject.into()),
            remaining,
            message: reason.into(),
        }
    }

    /// Creates an event-collision diagnostic.
    pub fn event_collision(class_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: DiagnosticKind::EventCollision,
            class_id: Some(class_id.into()),
            subject: None,
            remaining: 0,
            message: message.into(),
        }
    }

    /// Creates a data-integrity diagnostic.
    pub fn data_integrity(class_id: Option<String>, message: impl Into<String>) -> Self {
        Self {
            kind: DiagnosticKind::DataIntegrity,
            class_id,
            subject: None,
            remaining: 0,
            message: message.into(),
        }
    }
}

/// Classification of post-hoc violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationType {
    /// Lesson count differs from the requirement.
    CountMismatch,
    /// A teacher is in two classes at once outside a synchronized group.
    TeacherConflict,
    /// An exclusive resource has more than one claimant.
    ResourceConflict,
    /// A teacher exceeds the daily cap.
    TeacherOverCap,
    /// A cell has no assignment.
    EmptyCell,
}

/// A violation found by the validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Type of violation.
    pub violation_type: ViolationType,
    /// Related entity (class, teacher or resource).
    pub entity_id: String,
    /// Human-readable description.
    pub message: String,
    /// Severity (0-100, higher = worse).
    pub severity: i32,
}

impl Violation {
    /// Creates a count mismatch.
    pub fn count_mismatch(class_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ViolationType::CountMismatch, class_id, message, 60)
    }

    /// Creates a teacher double-booking.
    pub fn teacher_conflict(teacher: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ViolationType::TeacherConflict, teacher, message, 95)
    }

    /// Creates a resource double-booking.
    pub fn resource_conflict(resource: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ViolationType::ResourceConflict, resource, message, 95)
    }

    /// Creates a daily cap excess.
    pub fn teacher_over_cap(teacher: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ViolationType::TeacherOverCap, teacher, message, 80)
    }

    /// Creates an empty cell.
    pub fn empty_cell(class_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ViolationType::EmptyCell, class_id, message, 90)
    }

    fn new(
        violation_type: ViolationType,
        entity_id: impl Into<String>,
        message: impl Into<String>,
        severity: i32,
    ) -> Self {
        Self {
            violation_type,
            entity_id: entity_id.into(),
            message: message.into(),
            severity,
        }
    }
}

/// Pass/fail report of the post-hoc validator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Whether no violations were found.
    pub passed: bool,
    /// Violations found.
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    /// Builds a report from violations.
    pub fn from_violations(violations: Vec<Violation>) -> Self {
        Self {
            passed: violations.is_empty(),
            violations,
        }
    }

    /// Violations of one type.
    pub fn of_type(&self, violation_type: ViolationType) -> impl Iterator<Item = &Violation> {
        self.violations
            .iter()
            .filter(move |v| v.violation_type == violation_type)
    }
}

/// Counters describing one generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    /// Seed the run's RNG was created from.
    pub seed: u64,
    /// Block placement attempts made.
    pub placement_attempts: u64,
    /// Doubles placed as consecutive pairs.
    pub doubles_placed: u32,
    /// Doubles realised as two singles on one day.
    pub doubles_split: u32,
    /// Single periods placed.
    pub singles_placed: u32,
}

/// Complete output of a generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timetable {
    /// Week structure the grids follow.
    pub calendar: WeekCalendar,
    /// Class id → grid.
    pub grids: BTreeMap<String, ClassGrid>,
    /// Unresolved lessons, collisions and input problems.
    pub diagnostics: Vec<Diagnostic>,
    /// Teacher workload tallies.
    pub workload: WorkloadSummary,
    /// Post-hoc validation result.
    pub report: ValidationReport,
    /// Run counters.
    pub stats: RunStats,
}

impl Timetable {
    /// Grid of one class.
    pub fn grid(&self, class_id: &str) -> Option<&ClassGrid> {
        self.grids.get(class_id)
    }

    /// Occupant of a cell, addressed by day name.
    pub fn assignment_at(&self, class_id: &str, day: &str, period: PeriodId) -> Option<&Assignment> {
        let day = self.calendar.day_index(day)?;
        self.grid(class_id)?.get(day, period)
    }

    /// Lessons of `subject` scheduled for `class_id`.
    pub fn lesson_count(&self, class_id: &str, subject: &str) -> u32 {
        self.grid(class_id)
            .map(|g| g.lesson_count(subject))
            .unwrap_or(0)
    }

    /// Unresolved-lesson diagnostics.
    pub fn unresolved(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.kind == DiagnosticKind::UnresolvedLesson)
    }

    /// Shortfall recorded for (class, subject), summed over diagnostics.
    pub fn shortfall(&self, class_id: &str, subject: &str) -> u32 {
        self.unresolved()
            .filter(|d| {
                d.class_id.as_deref() == Some(class_id) && d.subject.as_deref() == Some(subject)
            })
            .map(|d| d.remaining)
            .sum()
    }

    /// Whether every requirement was met and validation passed.
    pub fn is_fully_resolved(&self) -> bool {
        self.unresolved().next().is_none() && self.report.passed
    }
}
