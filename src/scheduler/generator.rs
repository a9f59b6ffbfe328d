//! Multi-phase timetable generator.
//!
//! # Algorithm
//!
//! Greedy, randomized and phase-ordered. Each (class, subject)
//! requirement belongs to the earliest phase it matches:
//!
//! 1. Pin special events into applicable cells.
//! 2. Day-restricted subjects, fewest allowed days first.
//! 3. Subjects using an exclusive resource.
//! 4. Synchronized groups, then strict-double subjects.
//! 5. Mixed-structure subjects, then plain singles.
//!
//! Unplaced periods become unresolved-lesson diagnostics and never stop
//! later phases. Gap filling, post-hoc validation and workload tallies run
//! last.
//!
//! # Complexity
//! O(r * a * d * p * c) where r=requirements, a=attempts per requirement,
//! d=days, p=periods per day, c=classes per synchronized group.

use std::collections::BTreeSet;
use tracing::{debug, info};

use super::context::RunContext;
use super::evaluator::Rejection;
use super::gap_fill::fill_gaps;
use super::placement::{place_block, BlockLength, BlockOutcome, BlockRequest};
use super::validator::validate_timetable;
use super::workload::WorkloadSummary;
use crate::config::SolverConfig;
use crate::error::{Result, TimetableError};
use crate::models::{
    Assignment, BlockStructure, Diagnostic, Division, LessonRequirement, SyncGroup, Timetable,
    TimetableInput,
};
use crate::validation::validate_input;

/// Scheduling phase of a requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Phase {
    DayRestricted,
    ExclusiveResource,
    StrictDouble,
    General,
}

impl Phase {
    fn of(req: &LessonRequirement) -> Self {
        if req.is_day_restricted() {
            Phase::DayRestricted
        } else if req.resource.is_some() {
            Phase::ExclusiveResource
        } else if req.structure == BlockStructure::StrictDoubles {
            Phase::StrictDouble
        } else {
            Phase::General
        }
    }
}

/// Outcome of placing all blocks of one requirement.
struct PlanResult {
    placed: u32,
    reason: Option<String>,
}

/// Generates weekly timetables.
///
/// # Example
///
/// ```
/// use u_timetable::config::SolverConfig;
/// use u_timetable::models::{Division, DivisionLayout, Period, TimetableInput};
/// use u_timetable::scheduler::TimetableGenerator;
///
/// let input = TimetableInput::new(
///     ["Mon", "Tue", "Wed"],
///     (1..=4).map(|i| Period::new(i, "")).collect(),
/// )
/// .with_class("1A")
/// .with_division_layout(Division::LowerPrimary, DivisionLayout::new(vec![1, 2, 3, 4]))
/// .with_subject(Division::LowerPrimary, "Math", 4)
/// .with_teacher("1A", "Math", "T1");
///
/// let generator = TimetableGenerator::new(SolverConfig::default().with_seed(42));
/// let timetable = generator.generate(&input).unwrap();
/// assert_eq!(timetable.lesson_count("1A", "Math"), 4);
/// assert!(timetable.is_fully_resolved());
/// ```
#[derive(Debug, Clone, Default)]
pub struct TimetableGenerator {
    config: SolverConfig,
}

impl TimetableGenerator {
    /// Creates a generator with the given configuration.
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// Active configuration.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Runs one generation.
    ///
    /// Fails only on invalid configuration, or on invalid input when
    /// strict input is configured. Everything else is reported through
    /// the timetable's diagnostics.
    pub fn generate(&self, input: &TimetableInput) -> Result<Timetable> {
        self.config.validate()?;

        let integrity = validate_input(input).err().unwrap_or_default();
        if self.config.strict_input && !integrity.is_empty() {
            return Err(TimetableError::InvalidInput(integrity));
        }

        let seed = self.config.seed.unwrap_or_else(rand::random);
        info!(seed, classes = input.classes.len(), "generating timetable");

        let mut ctx = RunContext::new(input, &self.config, seed);
        for error in integrity {
            ctx.report(Diagnostic::data_integrity(error.class_id, error.message));
        }

        pin_events(&mut ctx);

        let requirements = collect_requirements(&mut ctx);
        let mut phases: [Vec<LessonRequirement>; 4] = Default::default();
        for req in requirements {
            phases[Phase::of(&req) as usize].push(req);
        }
        let [mut restricted, resource, mut strict, mut general] = phases;

        restricted.sort_by_key(|r| r.allowed_day_count(ctx.calendar.day_count()));
        info!(count = restricted.len(), "phase: day-restricted subjects");
        run_phase(&mut ctx, &restricted);

        info!(count = resource.len(), "phase: exclusive-resource subjects");
        run_phase(&mut ctx, &resource);

        let groups = &input.constraints.sync_groups;
        info!(groups = groups.len(), count = strict.len(), "phase: synchronized and strict-double subjects");
        for group in groups {
            schedule_sync_group(&mut ctx, group);
        }
        strict.sort_by_key(|r| std::cmp::Reverse(r.periods));
        run_phase(&mut ctx, &strict);

        general.sort_by_key(|r| !matches!(r.structure, BlockStructure::Mixed { .. }));
        info!(count = general.len(), "phase: remaining subjects");
        run_phase(&mut ctx, &general);

        fill_gaps(&mut ctx);

        let report = validate_timetable(input, &ctx.grids);
        let workload =
            WorkloadSummary::from_loads(&ctx.teacher_loads, &input.constraints.teacher_caps);

        let RunContext {
            calendar,
            grids,
            diagnostics,
            stats,
            ..
        } = ctx;

        info!(
            seed,
            attempts = stats.placement_attempts,
            diagnostics = diagnostics.len(),
            passed = report.passed,
            "generation finished"
        );

        Ok(Timetable {
            calendar,
            grids,
            diagnostics,
            workload,
            report,
            stats,
        })
    }
}

/// Writes special events into applicable cells.
fn pin_events(ctx: &mut RunContext<'_>) {
    let input = ctx.input;
    for event in &input.constraints.special_events {
        let Some(day) = ctx.calendar.day_index(&event.day) else {
            continue;
        };
        let classes: Vec<String> = ctx
            .grids
            .keys()
            .filter(|c| {
                input
                    .division_of(c)
                    .is_some_and(|d| event.applies_to.applies_to(d))
            })
            .cloned()
            .collect();
        let pinned = Assignment::event(&event.name, &event.color);

        for class_id in &classes {
            for &period in &event.periods {
                let existing = ctx
                    .grids
                    .get(class_id)
                    .and_then(|g| g.get(day, period))
                    .cloned();
                match existing {
                    None => {
                        ctx.fill(class_id, day, period, pinned.clone());
                    }
                    Some(current) if current == pinned => {}
                    Some(current) => ctx.report(Diagnostic::event_collision(
                        class_id.as_str(),
                        format!(
                            "Event '{}' collides with '{}' on {} period {period}",
                            event.name,
                            current.label(),
                            event.day
                        ),
                    )),
                }
            }
        }
    }
}

/// Builds requirements for every class outside synchronized groups.
///
/// Requirements that cannot be scheduled at all (no layout, no teacher)
/// are reported as unresolved here.
fn collect_requirements(ctx: &mut RunContext<'_>) -> Vec<LessonRequirement> {
    let input = ctx.input;
    let constraints = &input.constraints;
    let classes: BTreeSet<&str> = input.classes.iter().map(String::as_str).collect();
    let mut requirements = Vec::new();

    for class_id in classes {
        let Some(division) = input.division_of(class_id) else {
            continue;
        };
        let Some(subjects) = input.subjects.get(&division) else {
            continue;
        };
        let has_grid = ctx.grids.contains_key(class_id);

        for (subject, &periods) in subjects {
            if periods == 0 {
                continue;
            }
            if !has_grid {
                ctx.report(Diagnostic::unresolved(
                    class_id,
                    subject.as_str(),
                    periods,
                    "class has no layout",
                ));
                continue;
            }
            if constraints.sync_group_for(class_id, subject).is_some() {
                continue;
            }
            let Some(teacher) = input.teacher_for(class_id, subject) else {
                ctx.report(Diagnostic::unresolved(
                    class_id,
                    subject.as_str(),
                    periods,
                    "no teacher assigned",
                ));
                continue;
            };

            requirements.push(requirement(ctx, class_id, division, subject, teacher, periods));
        }
    }
    requirements
}

fn requirement(
    ctx: &RunContext<'_>,
    class_id: &str,
    division: Division,
    subject: &str,
    teacher: &str,
    periods: u32,
) -> LessonRequirement {
    let constraints = &ctx.input.constraints;
    let mut req = LessonRequirement::new(class_id, division, subject, teacher, periods);
    if let Some(structure) = constraints.double_structure(subject, division) {
        req = req.with_structure(structure.into());
    }
    if let Some(days) = constraints.allowed_days(subject) {
        req = req.with_allowed_days(
            days.iter()
                .filter_map(|d| ctx.calendar.day_index(d))
                .collect(),
        );
    }
    if let Some(resource) = constraints.resource_for(subject) {
        req = req.with_resource(resource);
    }
    req
}

fn run_phase(ctx: &mut RunContext<'_>, requirements: &[LessonRequirement]) {
    for req in requirements {
        let result = place_plan(ctx, std::slice::from_ref(&req.class_id), req);
        report_shortfall(ctx, &req.class_id, &req.subject, req.periods, result);
    }
}

/// Schedules one synchronized group as joint lessons.
///
/// Members share as many lessons as the smallest member requirement; a
/// member requiring more gets its extra periods placed on its own. Each
/// member's shortfall is reported against its own requirement.
fn schedule_sync_group(ctx: &mut RunContext<'_>, group: &SyncGroup) {
    let input = ctx.input;
    let constraints = &input.constraints;
    let subject = group.subject.as_str();

    // Members whose first matching group is this one, with their demand.
    let mut demands: Vec<(String, Division, u32)> = Vec::new();
    for class_id in &group.classes {
        let owned = constraints
            .sync_group_for(class_id, subject)
            .is_some_and(|g| std::ptr::eq(g, group));
        if !owned || !ctx.grids.contains_key(class_id) || demands.iter().any(|(c, ..)| c == class_id) {
            continue;
        }
        let Some(division) = input.division_of(class_id) else {
            continue;
        };
        let periods = input
            .requirements_for(class_id)
            .and_then(|s| s.get(subject))
            .copied()
            .unwrap_or(0);
        if periods > 0 {
            demands.push((class_id.clone(), division, periods));
        }
    }
    let Some((lead, lead_division, _)) = demands.first().cloned() else {
        return;
    };

    let teacher = group
        .teacher
        .as_deref()
        .or_else(|| input.teacher_for(&lead, subject));
    let Some(teacher) = teacher else {
        for (class_id, _, periods) in &demands {
            ctx.report(Diagnostic::unresolved(
                class_id.as_str(),
                subject,
                *periods,
                "no teacher assigned",
            ));
        }
        return;
    };

    let shared = demands.iter().map(|(.., p)| *p).min().unwrap_or(0);
    let members: Vec<String> = demands.iter().map(|(c, ..)| c.clone()).collect();
    let req = requirement(ctx, &lead, lead_division, subject, teacher, shared);
    debug!(subject, members = ?members, shared, "scheduling synchronized group");
    let joint = place_plan(ctx, &members, &req);

    for (class_id, division, periods) in demands {
        let mut placed = joint.placed;
        let mut reason = joint.reason.clone();
        if periods > shared {
            let own = requirement(ctx, &class_id, division, subject, teacher, periods - shared);
            let extra = place_plan(ctx, std::slice::from_ref(&class_id), &own);
            placed += extra.placed;
            reason = extra.reason.or(reason);
        }
        report_shortfall(ctx, &class_id, subject, periods, PlanResult { placed, reason });
    }
}

/// Places the doubles then the singles of a requirement for `classes`.
fn place_plan(ctx: &mut RunContext<'_>, classes: &[String], req: &LessonRequirement) -> PlanResult {
    let days = req.days(ctx.calendar.day_count());
    let fallback = match req.structure {
        BlockStructure::Mixed { .. } => true,
        BlockStructure::StrictDoubles => ctx.config.strict_double_singles_fallback,
        BlockStructure::Singles => false,
    };
    let (mut doubles, mut singles) = req.block_plan();
    let mut budget = ctx.config.max_attempts_per_requirement;
    let mut placed = 0;
    let mut last: Option<Rejection> = None;

    let request = |length, allow_singles_fallback| BlockRequest {
        classes,
        subject: &req.subject,
        teacher: &req.teacher,
        allowed_days: &days,
        length,
        allow_singles_fallback,
    };

    let mut doubles_stuck = false;
    while doubles > 0 && budget > 0 && !doubles_stuck {
        budget -= 1;
        match place_block(ctx, &request(BlockLength::Double, fallback)) {
            BlockOutcome::Double | BlockOutcome::SplitDouble => {
                doubles -= 1;
                placed += 2;
            }
            BlockOutcome::Partial | BlockOutcome::Single => {
                doubles -= 1;
                placed += 1;
                singles += 1;
            }
            BlockOutcome::Failed(rejection) => {
                last = rejection.or(last);
                doubles_stuck = true;
            }
        }
    }

    let mut singles_stuck = false;
    while singles > 0 && budget > 0 && !singles_stuck {
        budget -= 1;
        match place_block(ctx, &request(BlockLength::Single, false)) {
            BlockOutcome::Failed(rejection) => {
                last = rejection.or(last);
                singles_stuck = true;
            }
            outcome => {
                singles -= 1;
                placed += outcome.placed_periods();
            }
        }
    }

    let limited = budget == 0
        && ((doubles > 0 && !doubles_stuck) || (singles > 0 && !singles_stuck));
    let reason = if placed >= req.periods {
        None
    } else if limited {
        Some("attempt limit reached".to_string())
    } else if let Some(rejection) = last {
        Some(rejection.to_string())
    } else {
        Some("no valid slot on any allowed day".to_string())
    };
    PlanResult { placed, reason }
}

fn report_shortfall(
    ctx: &mut RunContext<'_>,
    class_id: &str,
    subject: &str,
    periods: u32,
    result: PlanResult,
) {
    let remaining = periods.saturating_sub(result.placed);
    if remaining == 0 {
        return;
    }
    let reason = result.reason.unwrap_or_default();
    ctx.report(Diagnostic::unresolved(class_id, subject, remaining, reason));
}
