//! Post-hoc timetable validation.
//!
//! Recomputes every hard invariant from the finished grids alone, without
//! trusting the run's counters:
//!
//! - Lesson count per (class, subject) equals the requirement
//! - No teacher in two classes at one slot outside a synchronized group
//! - No exclusive resource used by two classes at one slot
//! - No teacher over the daily cap
//! - No empty cell
//!
//! Never repairs and never fails.

use std::collections::{BTreeMap, BTreeSet};

use super::workload::WorkloadSummary;
use crate::models::{ClassGrid, TimeSlot, TimetableInput, ValidationReport, Violation};

/// (class, subject) entries sharing a slot.
type SlotEntries<'g> = BTreeMap<(TimeSlot, &'g str), Vec<(&'g str, &'g str)>>;

/// Validates finished grids against the input.
pub fn validate_timetable(
    input: &TimetableInput,
    grids: &BTreeMap<String, ClassGrid>,
) -> ValidationReport {
    let mut violations = Vec::new();

    check_counts(input, grids, &mut violations);

    let mut by_teacher: SlotEntries<'_> = BTreeMap::new();
    let mut by_resource: SlotEntries<'_> = BTreeMap::new();
    for (class_id, grid) in grids {
        for (day, period, assignment) in grid.iter() {
            let (Some(subject), Some(teacher)) = (assignment.subject(), assignment.teacher()) else {
                continue;
            };
            let slot = TimeSlot::new(day, period);
            by_teacher
                .entry((slot, teacher))
                .or_default()
                .push((class_id.as_str(), subject));
            if let Some(resource) = input.constraints.resource_for(subject) {
                by_resource
                    .entry((slot, resource))
                    .or_default()
                    .push((class_id.as_str(), subject));
            }
        }
    }

    for ((slot, teacher), entries) in &by_teacher {
        if !is_joint(input, entries) {
            violations.push(Violation::teacher_conflict(
                *teacher,
                format!(
                    "Teacher '{teacher}' teaches {} classes at day {} period {}",
                    entries.len(),
                    slot.day,
                    slot.period
                ),
            ));
        }
    }

    for ((slot, resource), entries) in &by_resource {
        if !is_joint(input, entries) {
            violations.push(Violation::resource_conflict(
                *resource,
                format!(
                    "Resource '{resource}' claimed by {} classes at day {} period {}",
                    entries.len(),
                    slot.day,
                    slot.period
                ),
            ));
        }
    }

    let days = grids.values().map(|g| g.cells.len()).max().unwrap_or(0);
    let workload = WorkloadSummary::calculate(grids, days, &input.constraints.teacher_caps);
    for w in workload.over_cap() {
        violations.push(Violation::teacher_over_cap(
            &w.teacher,
            format!(
                "Teacher '{}' teaches {} periods on one day (cap {})",
                w.teacher,
                w.peak(),
                w.daily_cap
            ),
        ));
    }

    for (class_id, grid) in grids {
        for (day, row) in grid.cells.iter().enumerate() {
            for (cell, period) in row.iter().zip(&grid.period_ids) {
                if cell.is_none() {
                    violations.push(Violation::empty_cell(
                        class_id,
                        format!("Class '{class_id}' has an empty cell at day {day} period {period}"),
                    ));
                }
            }
        }
    }

    ValidationReport::from_violations(violations)
}

fn check_counts(
    input: &TimetableInput,
    grids: &BTreeMap<String, ClassGrid>,
    violations: &mut Vec<Violation>,
) {
    for (class_id, grid) in grids {
        let required = input.requirements_for(class_id);
        let scheduled: BTreeSet<&str> = grid.iter().filter_map(|(_, _, a)| a.subject()).collect();
        let subjects: BTreeSet<&str> = required
            .into_iter()
            .flat_map(|r| r.keys().map(String::as_str))
            .chain(scheduled)
            .collect();

        for subject in subjects {
            let expected = required.and_then(|r| r.get(subject)).copied().unwrap_or(0);
            let actual = grid.lesson_count(subject);
            if actual != expected {
                violations.push(Violation::count_mismatch(
                    class_id,
                    format!("Class '{class_id}' has {actual} '{subject}' lessons, requires {expected}"),
                ));
            }
        }
    }
}

/// Whether all entries are one lesson taught jointly to a synchronized group.
fn is_joint(input: &TimetableInput, entries: &[(&str, &str)]) -> bool {
    let Some(&(first_class, subject)) = entries.first() else {
        return true;
    };
    entries.iter().skip(1).all(|&(class_id, s)| {
        s == subject && input.constraints.are_synchronized(subject, first_class, class_id)
    })
}
