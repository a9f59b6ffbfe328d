//! Input validation for timetabling problems.
//!
//! Checks structural integrity of the input before generation. Detects:
//! - Duplicate class, day and period ids
//! - Classes with no derivable division or no layout
//! - Layouts, events and restrictions referencing unknown periods or days
//! - Required subjects with no assigned teacher
//! - Inconsistent synchronized groups
//! - Mixed double rules whose counts disagree with the weekly periods
//!
//! The generator reports these as data-integrity diagnostics and carries
//! on, unless strict input is configured.

use std::collections::HashSet;
use thiserror::Error;

use crate::models::{DivisionLayout, DoubleStructure, TimetableInput};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Class concerned, if any.
    pub class_id: Option<String>,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same id.
    DuplicateId,
    /// A class's division can be neither derived nor looked up.
    UnknownDivision,
    /// A class has no layout (division default or override).
    MissingLayout,
    /// A period id is not in the period table.
    InvalidPeriodReference,
    /// A day name is not in the day list.
    InvalidDayReference,
    /// A required subject has no teacher for a class.
    MissingTeacher,
    /// A synchronized group references an unknown class or disagrees on counts.
    InvalidSyncGroup,
    /// A mixed double rule does not add up to the weekly period count.
    InconsistentBlockStructure,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            class_id: None,
            message: message.into(),
        }
    }

    fn for_class(kind: ValidationErrorKind, class_id: &str, message: impl Into<String>) -> Self {
        Self {
            kind,
            class_id: Some(class_id.to_string()),
            message: message.into(),
        }
    }
}

/// Validates the input of a generation run.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(input: &TimetableInput) -> ValidationResult {
    let mut errors = Vec::new();

    check_duplicates(input, &mut errors);

    for class_id in &input.classes {
        let Some(division) = input.division_of(class_id) else {
            errors.push(ValidationError::for_class(
                ValidationErrorKind::UnknownDivision,
                class_id,
                format!("Class '{class_id}' has no derivable division"),
            ));
            continue;
        };

        match input.layout_for(class_id) {
            Some(layout) => check_layout(input, class_id, layout, &mut errors),
            None => errors.push(ValidationError::for_class(
                ValidationErrorKind::MissingLayout,
                class_id,
                format!("Class '{class_id}' has no layout for division {division}"),
            )),
        }

        if let Some(subjects) = input.subjects.get(&division) {
            for (subject, &periods) in subjects {
                let group_teacher = input
                    .constraints
                    .sync_group_for(class_id, subject)
                    .and_then(|g| g.teacher.as_deref());
                if periods > 0
                    && input.teacher_for(class_id, subject).is_none()
                    && group_teacher.is_none()
                {
                    errors.push(ValidationError::for_class(
                        ValidationErrorKind::MissingTeacher,
                        class_id,
                        format!("Class '{class_id}' has no teacher for required subject '{subject}'"),
                    ));
                }

                let structure = input.constraints.double_structure(subject, division);
                if let Some(DoubleStructure::Mixed { doubles, singles }) = structure {
                    if doubles * 2 + singles != periods {
                        errors.push(ValidationError::for_class(
                            ValidationErrorKind::InconsistentBlockStructure,
                            class_id,
                            format!(
                                "Class '{class_id}' needs {periods} '{subject}' periods but its rule \
                                 asks for {doubles} doubles and {singles} singles; singles fill the rest"
                            ),
                        ));
                    }
                }
            }
        }
    }

    check_day_references(input, &mut errors);
    check_sync_groups(input, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_duplicates(input: &TimetableInput, errors: &mut Vec<ValidationError>) {
    let mut classes = HashSet::new();
    for c in &input.classes {
        if !classes.insert(c.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate class ID: {c}"),
            ));
        }
    }

    let mut days = HashSet::new();
    for d in &input.days {
        if !days.insert(d.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate day: {d}"),
            ));
        }
    }

    let mut periods = HashSet::new();
    for p in &input.periods {
        if !periods.insert(p.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate period ID: {}", p.id),
            ));
        }
    }
}

fn check_layout(
    input: &TimetableInput,
    class_id: &str,
    layout: &DivisionLayout,
    errors: &mut Vec<ValidationError>,
) {
    let referenced = layout
        .lesson_slots
        .iter()
        .chain(layout.day_slots.values().flatten())
        .chain(layout.break_period.iter())
        .chain(layout.lunch_period.iter());

    let mut reported = HashSet::new();
    for &period in referenced {
        if !input.has_period(period) && reported.insert(period) {
            errors.push(ValidationError::for_class(
                ValidationErrorKind::InvalidPeriodReference,
                class_id,
                format!("Layout of class '{class_id}' references unknown period {period}"),
            ));
        }
    }

    for day in layout.day_slots.keys() {
        if !input.days.contains(day) {
            errors.push(ValidationError::for_class(
                ValidationErrorKind::InvalidDayReference,
                class_id,
                format!("Layout of class '{class_id}' overrides unknown day '{day}'"),
            ));
        }
    }
}

fn check_day_references(input: &TimetableInput, errors: &mut Vec<ValidationError>) {
    let known = |day: &String| input.days.contains(day);
    let constraints = &input.constraints;

    for (subject, days) in &constraints.day_restrictions {
        for day in days.iter().filter(|d| !known(d)) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidDayReference,
                format!("Day restriction of '{subject}' references unknown day '{day}'"),
            ));
        }
    }

    for event in &constraints.special_events {
        if !known(&event.day) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidDayReference,
                format!("Event '{}' references unknown day '{}'", event.name, event.day),
            ));
        }
        for &period in event.periods.iter().filter(|&&p| !input.has_period(p)) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidPeriodReference,
                format!("Event '{}' references unknown period {period}", event.name),
            ));
        }
    }
}

fn check_sync_groups(input: &TimetableInput, errors: &mut Vec<ValidationError>) {
    for group in &input.constraints.sync_groups {
        let mut counts = Vec::new();
        for class_id in &group.classes {
            if !input.classes.contains(class_id) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidSyncGroup,
                    format!(
                        "Synchronized group for '{}' references unknown class '{class_id}'",
                        group.subject
                    ),
                ));
                continue;
            }
            let required = input
                .requirements_for(class_id)
                .and_then(|s| s.get(&group.subject))
                .copied()
                .unwrap_or(0);
            counts.push(required);
        }
        counts.dedup();
        if counts.len() > 1 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidSyncGroup,
                format!(
                    "Synchronized group for '{}' has members with different weekly counts",
                    group.subject
                ),
            ));
        }
    }
}
