//! End-to-end generation scenarios.

mod common;

use common::{assert_invariants, init_tracing, plain_week, sample_school};
use u_timetable::models::{
    Applicability, Assignment, ConstraintConfig, DiagnosticKind, Division, DivisionLayout,
    DoubleStructure, SyncGroup, Timetable, TimetableInput,
};
use u_timetable::{SolverConfig, TimetableGenerator};

fn run(input: &TimetableInput, config: SolverConfig) -> Timetable {
    init_tracing();
    TimetableGenerator::new(config).generate(input).unwrap()
}

fn seeded(seed: u64) -> SolverConfig {
    SolverConfig::default().with_seed(seed)
}

/// Periods holding `subject` for the class, grouped by day index.
fn periods_by_day(tt: &Timetable, class_id: &str, subject: &str) -> Vec<Vec<u32>> {
    let grid = tt.grid(class_id).unwrap();
    (0..grid.cells.len())
        .map(|day| {
            grid.iter()
                .filter(|(d, _, a)| *d == day && a.subject() == Some(subject))
                .map(|(_, p, _)| p)
                .collect()
        })
        .collect()
}

fn strict_art(periods: u32, layout: DivisionLayout) -> TimetableInput {
    plain_week(6)
        .with_class("4A")
        .with_division_layout(Division::UpperPrimary, layout)
        .with_subject(Division::UpperPrimary, "Art", periods)
        .with_teacher("4A", "Art", "Mr Cho")
        .with_constraints(ConstraintConfig::new().with_double_rule(
            "Art",
            Applicability::Divisions(vec![Division::UpperPrimary]),
            DoubleStructure::Strict,
        ))
}

#[test]
fn scenario_a_plain_weekly_count() {
    let input = plain_week(6)
        .with_class("1A")
        .with_division_layout(Division::LowerPrimary, DivisionLayout::new(vec![1, 2, 3, 4, 5, 6]))
        .with_subject(Division::LowerPrimary, "Math", 5)
        .with_teacher("1A", "Math", "Ms Lee");

    for seed in 0..10 {
        let tt = run(&input, seeded(seed));
        assert_eq!(tt.lesson_count("1A", "Math"), 5);
        for day in periods_by_day(&tt, "1A", "Math") {
            assert!(day.len() <= 2, "seed {seed}: {day:?}");
        }
        assert!(tt.is_fully_resolved());
        assert_invariants(&input, &tt);
    }
}

#[test]
fn scenario_b_strict_doubles_are_consecutive_pairs() {
    let input = strict_art(4, DivisionLayout::new(vec![1, 2, 3, 4, 5, 6]));
    for seed in 0..10 {
        let tt = run(&input, seeded(seed));
        let days: Vec<_> = periods_by_day(&tt, "4A", "Art")
            .into_iter()
            .filter(|d| !d.is_empty())
            .collect();
        assert_eq!(days.len(), 2, "seed {seed}: {days:?}");
        for pair in &days {
            assert_eq!(pair.len(), 2);
            assert_eq!(pair[1], pair[0] + 1);
        }
        assert_eq!(tt.stats.doubles_placed, 2);
        assert_eq!(tt.stats.doubles_split, 0);
    }
}

#[test]
fn scenario_b_strict_doubles_without_adjacent_slots_are_reported() {
    let input = strict_art(4, DivisionLayout::new(vec![1, 3, 5]));
    let tt = run(&input, seeded(5));
    assert_eq!(tt.lesson_count("4A", "Art"), 0);
    assert_eq!(tt.shortfall("4A", "Art"), 4);
    let diag = tt.unresolved().next().unwrap();
    assert_eq!(diag.class_id.as_deref(), Some("4A"));
    assert!(!diag.message.is_empty());
    assert_invariants(&input, &tt);
}

#[test]
fn strict_double_fallback_splits_into_same_day_singles() {
    let input = strict_art(4, DivisionLayout::new(vec![1, 3, 5]));
    let tt = run(&input, seeded(5).with_strict_double_singles_fallback(true));
    assert_eq!(tt.lesson_count("4A", "Art"), 4);
    assert_eq!(tt.stats.doubles_split, 2);
    for day in periods_by_day(&tt, "4A", "Art") {
        assert!(day.is_empty() || day.len() == 2);
    }
    assert_invariants(&input, &tt);
}

#[test]
fn odd_strict_double_count_places_one_single() {
    let input = strict_art(5, DivisionLayout::new(vec![1, 2, 3, 4, 5, 6]));
    for seed in 0..5 {
        let tt = run(&input, seeded(seed));
        assert_eq!(tt.lesson_count("4A", "Art"), 5);
        assert_eq!(tt.stats.doubles_placed, 2);
        assert_eq!(tt.stats.singles_placed, 1);
        assert!(tt.is_fully_resolved());
    }
}

#[test]
fn doubles_may_span_break_unless_disabled() {
    let layout = DivisionLayout::new(vec![2, 4]).with_break(3);
    let input = strict_art(2, layout);

    let tt = run(&input, seeded(1));
    assert_eq!(tt.lesson_count("4A", "Art"), 2);

    let tt = run(&input, seeded(1).with_doubles_across_breaks(false));
    assert_eq!(tt.lesson_count("4A", "Art"), 0);
    assert_eq!(tt.shortfall("4A", "Art"), 2);
}

#[test]
fn scenario_c_synchronized_classes_share_slots() {
    let input = plain_week(6)
        .with_class("7A")
        .with_class("7B")
        .with_division_layout(Division::LowerSecondary, DivisionLayout::new(vec![1, 2, 3, 4, 5, 6]))
        .with_subject(Division::LowerSecondary, "PE", 3)
        .with_subject(Division::LowerSecondary, "Math", 4)
        .with_teacher("7A", "Math", "Mr Oh")
        .with_teacher("7B", "Math", "Mr Han")
        .with_constraints(ConstraintConfig::new().with_sync_group(SyncGroup {
            subject: "PE".into(),
            classes: vec!["7A".into(), "7B".into()],
            teacher: Some("Coach Ryu".into()),
        }));

    for seed in 0..10 {
        let tt = run(&input, seeded(seed));
        let a = periods_by_day(&tt, "7A", "PE");
        let b = periods_by_day(&tt, "7B", "PE");
        assert_eq!(a, b, "seed {seed}");
        assert_eq!(tt.lesson_count("7A", "PE"), 3);

        let coach = tt.workload.get("Coach Ryu").unwrap();
        assert_eq!(coach.total, 3);
        assert!(tt.report.passed, "{:?}", tt.report.violations);
        assert_invariants(&input, &tt);
    }
}

#[test]
fn scenario_d_exclusive_resource_never_shared() {
    let input = plain_week(4)
        .with_class("4A")
        .with_class("4B")
        .with_division_layout(Division::UpperPrimary, DivisionLayout::new(vec![1, 2, 3, 4]))
        .with_subject(Division::UpperPrimary, "ICT", 4)
        .with_teacher("4A", "ICT", "Ms Jung")
        .with_teacher("4B", "ICT", "Mr Lim")
        .with_constraints(ConstraintConfig::new().with_exclusive_resource("Lab", ["ICT"]));

    for seed in 0..20 {
        let tt = run(&input, seeded(seed));
        let a = tt.grid("4A").unwrap();
        let b = tt.grid("4B").unwrap();
        for (day, period, assignment) in a.iter() {
            if assignment.subject() == Some("ICT") {
                assert_ne!(b.get(day, period).and_then(Assignment::subject), Some("ICT"));
            }
        }
        assert_invariants(&input, &tt);
    }
}

#[test]
fn exclusive_resource_shortage_is_reported() {
    // One day, two lesson slots, three ICT periods wanted in total.
    let input = TimetableInput::new(["Mon"], common::school_periods())
        .with_class("4A")
        .with_class("4B")
        .with_division_layout(Division::UpperPrimary, DivisionLayout::new(vec![1, 2]))
        .with_subject(Division::UpperPrimary, "ICT", 2)
        .with_teacher("4A", "ICT", "Ms Jung")
        .with_teacher("4B", "ICT", "Mr Lim")
        .with_constraints(ConstraintConfig::new().with_exclusive_resource("Lab", ["ICT"]));

    let tt = run(&input, seeded(8));
    let placed = tt.lesson_count("4A", "ICT") + tt.lesson_count("4B", "ICT");
    assert_eq!(placed, 2);
    assert_eq!(tt.shortfall("4A", "ICT") + tt.shortfall("4B", "ICT"), 2);
    assert_invariants(&input, &tt);
}

#[test]
fn day_restricted_subject_only_on_allowed_days() {
    let input = plain_week(6)
        .with_class("7A")
        .with_division_layout(Division::LowerSecondary, DivisionLayout::new(vec![1, 2, 3, 4, 5, 6]))
        .with_subject(Division::LowerSecondary, "Music", 2)
        .with_teacher("7A", "Music", "Mr Song")
        .with_constraints(ConstraintConfig::new().with_day_restriction("Music", ["Thu"]));

    let tt = run(&input, seeded(3));
    let by_day = periods_by_day(&tt, "7A", "Music");
    assert_eq!(by_day[3].len(), 2);
    assert_eq!(tt.lesson_count("7A", "Music"), 2);
}

#[test]
fn teacher_availability_is_respected() {
    use u_timetable::models::Availability;

    let input = plain_week(6)
        .with_class("7A")
        .with_division_layout(Division::LowerSecondary, DivisionLayout::new(vec![1, 2, 3, 4, 5, 6]))
        .with_subject(Division::LowerSecondary, "Music", 4)
        .with_teacher("7A", "Music", "Mr Song")
        .with_constraints(
            ConstraintConfig::new().with_availability("Mr Song", Availability::only(["Mon", "Fri"])),
        );

    for seed in 0..5 {
        let tt = run(&input, seeded(seed));
        let by_day = periods_by_day(&tt, "7A", "Music");
        assert!(by_day[1].is_empty() && by_day[2].is_empty() && by_day[3].is_empty());
        assert_eq!(tt.lesson_count("7A", "Music"), 4);
    }
}

#[test]
fn unplaceable_requirement_does_not_block_later_phases() {
    let input = plain_week(6)
        .with_class("7A")
        .with_division_layout(Division::LowerSecondary, DivisionLayout::new(vec![1, 2, 3, 4, 5, 6]))
        .with_subject(Division::LowerSecondary, "Music", 3)
        .with_subject(Division::LowerSecondary, "Math", 5)
        .with_teacher("7A", "Music", "Mr Song")
        .with_teacher("7A", "Math", "Mr Oh")
        .with_constraints(ConstraintConfig::new().with_day_restriction("Music", ["Wed"]));

    let tt = run(&input, seeded(0));
    assert_eq!(tt.lesson_count("7A", "Music"), 2);
    assert_eq!(tt.shortfall("7A", "Music"), 1);
    assert_eq!(tt.lesson_count("7A", "Math"), 5);
    assert_invariants(&input, &tt);
}

#[test]
fn same_seed_same_timetable() {
    let input = sample_school();
    let a = run(&input, seeded(1234));
    let b = run(&input, seeded(1234));
    assert_eq!(a.grids, b.grids);
    assert_eq!(a.diagnostics, b.diagnostics);
    assert_eq!(a.stats, b.stats);
    assert_eq!(a.workload, b.workload);
}

#[test]
fn unseeded_run_records_its_seed() {
    let input = sample_school();
    let first = run(&input, SolverConfig::default());
    let replay = run(&input, seeded(first.stats.seed));
    assert_eq!(first.grids, replay.grids);
}

#[test]
fn sample_school_holds_invariants() {
    let input = sample_school();
    let tt = run(&input, seeded(42));
    assert_invariants(&input, &tt);

    // Assembly pinned for every class.
    for class_id in ["1A", "1B", "4A", "4B", "7A", "7B"] {
        assert_eq!(
            tt.assignment_at(class_id, "Mon", 1).map(Assignment::label),
            Some("Assembly")
        );
        assert_eq!(tt.assignment_at(class_id, "Tue", 0), Some(&Assignment::Arrival));
        assert_eq!(tt.assignment_at(class_id, "Tue", 3), Some(&Assignment::Break));
        assert_eq!(tt.assignment_at(class_id, "Tue", 6), Some(&Assignment::Lunch));
    }
    // Short Friday for the upper primary layout.
    assert_eq!(tt.assignment_at("4A", "Fri", 8), Some(&Assignment::Free));
    assert!(tt
        .diagnostics
        .iter()
        .all(|d| d.kind != DiagnosticKind::DataIntegrity));
}

fn sync_pe(demand_7a: u32, demand_7b: u32) -> TimetableInput {
    let slots = DivisionLayout::new(vec![1, 2, 3, 4, 5, 6]);
    let mut input = plain_week(6)
        .with_class("7A")
        .with_class("7B")
        .with_class_division("7B", Division::UpperSecondary)
        .with_division_layout(Division::LowerSecondary, slots.clone())
        .with_division_layout(Division::UpperSecondary, slots)
        .with_constraints(ConstraintConfig::new().with_sync_group(SyncGroup {
            subject: "PE".into(),
            classes: vec!["7A".into(), "7B".into()],
            teacher: Some("Coach Ryu".into()),
        }));
    if demand_7a > 0 {
        input = input.with_subject(Division::LowerSecondary, "PE", demand_7a);
    }
    input.with_subject(Division::UpperSecondary, "PE", demand_7b)
}

#[test]
fn synchronized_member_with_larger_demand_gets_its_own_periods() {
    let input = sync_pe(2, 4);
    for seed in 0..5 {
        let tt = run(&input, seeded(seed));
        assert_eq!(tt.lesson_count("7A", "PE"), 2);
        assert_eq!(tt.lesson_count("7B", "PE"), 4);

        // Every 7A PE lesson is shared with 7B.
        let a = periods_by_day(&tt, "7A", "PE");
        let b = periods_by_day(&tt, "7B", "PE");
        for (day, periods) in a.iter().enumerate() {
            assert!(periods.iter().all(|p| b[day].contains(p)), "seed {seed}");
        }
        assert_eq!(tt.workload.get("Coach Ryu").unwrap().total, 4);
        assert!(tt.unresolved().next().is_none(), "{:?}", tt.diagnostics);
        assert_invariants(&input, &tt);
    }
}

#[test]
fn synchronized_member_is_scheduled_when_first_member_needs_none() {
    let input = sync_pe(0, 3);
    let tt = run(&input, seeded(3));
    assert_eq!(tt.lesson_count("7A", "PE"), 0);
    assert_eq!(tt.lesson_count("7B", "PE"), 3);
    assert_invariants(&input, &tt);
}

#[test]
fn synchronized_member_shortfall_is_reported_per_class() {
    // Five days at two PE periods per day: 7B can get at most ten.
    let input = sync_pe(2, 12);
    let tt = run(&input, seeded(9));
    assert_eq!(tt.lesson_count("7A", "PE"), 2);
    assert_eq!(tt.shortfall("7A", "PE"), 0);
    assert_eq!(tt.lesson_count("7B", "PE") + tt.shortfall("7B", "PE"), 12);
    assert!(tt.shortfall("7B", "PE") >= 2);
    assert_invariants(&input, &tt);
}

#[test]
fn class_daily_limit_blocks_placement_and_is_reported() {
    let input = plain_week(6)
        .with_class("1A")
        .with_division_layout(Division::LowerPrimary, DivisionLayout::new(vec![1, 2, 3, 4, 5, 6]))
        .with_subject(Division::LowerPrimary, "Math", 5)
        .with_subject(Division::LowerPrimary, "English", 5)
        .with_teacher("1A", "Math", "Ms Lee")
        .with_teacher("1A", "English", "Mr Cho")
        .with_constraints(ConstraintConfig::new().with_class_daily_limit("1A", 1));

    let tt = run(&input, seeded(12));
    let grid = tt.grid("1A").unwrap();
    for day in 0..5 {
        let lessons = grid
            .iter()
            .filter(|(d, _, a)| *d == day && a.subject().is_some())
            .count();
        assert_eq!(lessons, 1, "day {day}");
    }
    assert_eq!(tt.shortfall("1A", "Math") + tt.shortfall("1A", "English"), 5);
    assert!(tt
        .unresolved()
        .any(|d| d.message == "class daily limit of 1 lessons reached"));
    assert_invariants(&input, &tt);
}

#[test]
fn class_layout_override_confines_lessons() {
    let input = plain_week(6)
        .with_class("4A")
        .with_class("4B")
        .with_division_layout(Division::UpperPrimary, DivisionLayout::new(vec![1, 2, 3, 4, 5, 6]))
        .with_class_layout("4B", DivisionLayout::new(vec![2, 1]))
        .with_subject(Division::UpperPrimary, "Math", 5)
        .with_teacher("4A", "Math", "Mr Han")
        .with_teacher("4B", "Math", "Mr Oh");

    for seed in 0..5 {
        let tt = run(&input, seeded(seed));
        assert_eq!(tt.lesson_count("4B", "Math"), 5);
        for (_, period, assignment) in tt.grid("4B").unwrap().iter() {
            if assignment.subject().is_some() {
                assert!(period <= 2, "seed {seed}: period {period}");
            } else if period > 2 {
                assert_eq!(assignment, &Assignment::Free);
            }
        }
        assert_invariants(&input, &tt);
    }
}
