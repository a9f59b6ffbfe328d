//! Shared fixtures and invariant checks for integration tests.
#![allow(dead_code)]

use std::collections::BTreeMap;

use tracing_subscriber::EnvFilter;
use u_timetable::models::{
    Applicability, Availability, ConstraintConfig, Division, DivisionLayout, DoubleStructure,
    Period, SpecialEvent, SyncGroup, TeacherCaps, Timetable, TimetableInput, ViolationType,
};

pub const WEEK: [&str; 5] = ["Mon", "Tue", "Wed", "Thu", "Fri"];

/// Routes engine logs to the test writer. `RUST_LOG` overrides the level.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

/// Five-day week with periods `1..=n`, all normal.
pub fn plain_week(n: u32) -> TimetableInput {
    TimetableInput::new(WEEK, (1..=n).map(|i| Period::new(i, "")).collect())
}

/// Period table of the sample school: arrival at 0, break at 3, lunch at 6.
pub fn school_periods() -> Vec<Period> {
    vec![
        Period::arrival(0, "07:45-08:00"),
        Period::new(1, "08:00-08:45"),
        Period::new(2, "08:45-09:30"),
        Period::new(3, "09:30-09:50"),
        Period::new(4, "09:50-10:35"),
        Period::new(5, "10:35-11:20"),
        Period::new(6, "11:20-12:00"),
        Period::new(7, "12:00-12:45"),
        Period::new(8, "12:45-13:30"),
    ]
}

/// A small three-division school exercising every constraint category.
pub fn sample_school() -> TimetableInput {
    let primary = DivisionLayout::new(vec![1, 2, 4, 5, 7])
        .with_break(3)
        .with_lunch(6);
    let upper = DivisionLayout::new(vec![1, 2, 4, 5, 7, 8])
        .with_break(3)
        .with_lunch(6)
        .with_day_slots("Fri", vec![1, 2, 4, 5]);
    let secondary = DivisionLayout::new(vec![1, 2, 4, 5, 7, 8])
        .with_break(3)
        .with_lunch(6);

    let constraints = ConstraintConfig::new()
        .with_day_restriction("Music", ["Wed", "Thu"])
        .with_exclusive_resource("Computer Lab", ["ICT"])
        .with_double_rule(
            "Art",
            Applicability::Divisions(vec![Division::UpperPrimary]),
            DoubleStructure::Strict,
        )
        .with_double_rule(
            "Science",
            Applicability::Divisions(vec![Division::LowerSecondary]),
            DoubleStructure::Mixed {
                doubles: 1,
                singles: 2,
            },
        )
        .with_teacher_caps(
            TeacherCaps::new(5, 7)
                .with_exception("Ms Lee")
                .with_exception("Ms Kim"),
        )
        .with_availability("Mr Song", Availability::only(["Wed", "Thu", "Fri"]))
        .with_sync_group(SyncGroup {
            subject: "PE".into(),
            classes: vec!["7A".into(), "7B".into()],
            teacher: Some("Coach Ryu".into()),
        })
        .with_special_event(SpecialEvent::new("Assembly", "Mon", vec![1]).with_color("#4a90d9"))
        .with_class_daily_limit("1B", 4);

    let mut input = TimetableInput::new(WEEK, school_periods())
        .with_division_layout(Division::LowerPrimary, primary)
        .with_division_layout(Division::UpperPrimary, upper)
        .with_division_layout(Division::LowerSecondary, secondary)
        .with_constraints(constraints);

    for (subject, n) in [("Math", 5), ("English", 5), ("Art", 2), ("PE", 2)] {
        input = input.with_subject(Division::LowerPrimary, subject, n);
    }
    for (subject, n) in [("Math", 5), ("English", 5), ("Science", 3), ("Art", 4), ("ICT", 2), ("PE", 2)] {
        input = input.with_subject(Division::UpperPrimary, subject, n);
    }
    for (subject, n) in [("Math", 5), ("English", 4), ("Science", 4), ("ICT", 2), ("PE", 2), ("Music", 1)] {
        input = input.with_subject(Division::LowerSecondary, subject, n);
    }

    let assignments: [(&str, &[(&str, &str)]); 6] = [
        ("1A", &[("Math", "Ms Lee"), ("English", "Ms Lee"), ("Art", "Mr Cho"), ("PE", "Mr Park")]),
        ("1B", &[("Math", "Ms Kim"), ("English", "Ms Kim"), ("Art", "Mr Cho"), ("PE", "Mr Park")]),
        (
            "4A",
            &[
                ("Math", "Mr Han"),
                ("English", "Ms Yoon"),
                ("Science", "Dr Seo"),
                ("Art", "Mr Cho"),
                ("ICT", "Ms Jung"),
                ("PE", "Mr Park"),
            ],
        ),
        (
            "4B",
            &[
                ("Math", "Mr Han"),
                ("English", "Ms Yoon"),
                ("Science", "Dr Seo"),
                ("Art", "Ms Moon"),
                ("ICT", "Ms Jung"),
                ("PE", "Mr Park"),
            ],
        ),
        (
            "7A",
            &[
                ("Math", "Mr Oh"),
                ("English", "Ms Baek"),
                ("Science", "Dr Seo"),
                ("ICT", "Mr Lim"),
                ("Music", "Mr Song"),
            ],
        ),
        (
            "7B",
            &[
                ("Math", "Mr Oh"),
                ("English", "Ms Baek"),
                ("Science", "Dr Ahn"),
                ("ICT", "Mr Lim"),
                ("Music", "Mr Song"),
            ],
        ),
    ];
    for (class_id, subjects) in assignments {
        input = input.with_class(class_id);
        for (subject, teacher) in subjects {
            input = input.with_teacher(class_id, *subject, *teacher);
        }
    }
    input
}

/// Checks every invariant that must hold for any seed, feasible or not.
pub fn assert_invariants(input: &TimetableInput, tt: &Timetable) {
    // Exactly one assignment per cell.
    for grid in tt.grids.values() {
        assert!(grid.is_complete(), "class {} has empty cells", grid.class_id);
        assert_eq!(grid.cells.len(), input.days.len());
    }

    // Counts match requirements, or the difference is reported.
    for (class_id, grid) in &tt.grids {
        let Some(required) = input.requirements_for(class_id) else {
            continue;
        };
        for (subject, &periods) in required {
            let scheduled = grid.lesson_count(subject);
            let shortfall = tt.shortfall(class_id, subject);
            assert_eq!(
                scheduled + shortfall,
                periods,
                "{class_id}/{subject}: {scheduled} scheduled, {shortfall} reported short"
            );
        }
    }

    // One teacher per slot outside synchronized groups; one claimant per resource.
    let mut teachers: BTreeMap<(usize, u32, &str), Vec<(&str, &str)>> = BTreeMap::new();
    let mut resources: BTreeMap<(usize, u32, &str), Vec<&str>> = BTreeMap::new();
    for (class_id, grid) in &tt.grids {
        for (day, period, a) in grid.iter() {
            if let (Some(subject), Some(teacher)) = (a.subject(), a.teacher()) {
                teachers
                    .entry((day, period, teacher))
                    .or_default()
                    .push((class_id.as_str(), subject));
                if let Some(resource) = input.constraints.resource_for(subject) {
                    resources
                        .entry((day, period, resource))
                        .or_default()
                        .push(class_id.as_str());
                }
            }
        }
    }
    for ((day, period, teacher), entries) in &teachers {
        let (first, subject) = entries[0];
        for &(other, other_subject) in &entries[1..] {
            assert!(
                other_subject == subject
                    && input.constraints.are_synchronized(subject, first, other),
                "teacher {teacher} double-booked at day {day} period {period}: {entries:?}"
            );
        }
    }
    for ((day, period, resource), claimants) in &resources {
        let joint = claimants.windows(2).all(|w| {
            input
                .constraints
                .exclusive_resources
                .iter()
                .filter(|r| r.name.as_str() == *resource)
                .flat_map(|r| &r.subjects)
                .any(|s| input.constraints.are_synchronized(s, w[0], w[1]))
        });
        assert!(
            claimants.len() <= 1 || joint,
            "resource {resource} shared at day {day} period {period}: {claimants:?}"
        );
    }

    // Daily caps.
    for w in tt.workload.teachers.values() {
        assert!(w.peak() <= w.daily_cap, "{} over cap: {:?}", w.teacher, w.per_day);
    }

    // The validator agrees: only count mismatches may remain.
    for v in &tt.report.violations {
        assert_eq!(v.violation_type, ViolationType::CountMismatch, "{v:?}");
    }
}
