//! Run-scoped scheduling state.
//!
//! Everything a generation run mutates lives in one [`RunContext`]:
//! class grids, global slot occupancy, teacher counters, diagnostics,
//! statistics and the seeded RNG. A context is built fresh per run and
//! passed explicitly to every operation, so independent runs never share
//! state.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::BTreeMap;
use tracing::warn;

use crate::config::SolverConfig;
use crate::models::{
    Assignment, ClassGrid, Diagnostic, DivisionLayout, PeriodId, RunStats, TeacherLoad, TimeSlot,
    TimetableInput, WeekCalendar,
};

/// Commitments at one (day, period).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotOccupancy {
    /// Teacher → classes taught at this slot.
    pub teachers: BTreeMap<String, Vec<String>>,
    /// Exclusive resource → claiming class.
    pub resources: BTreeMap<String, String>,
}

/// Per-slot teacher and resource commitments across all classes.
#[derive(Debug, Clone, Default)]
pub struct GlobalOccupancy {
    slots: BTreeMap<TimeSlot, SlotOccupancy>,
}

impl GlobalOccupancy {
    /// Commitments at a slot.
    pub fn slot(&self, slot: TimeSlot) -> Option<&SlotOccupancy> {
        self.slots.get(&slot)
    }

    /// Whether `teacher` is committed at `slot`.
    pub fn teacher_busy(&self, teacher: &str, slot: TimeSlot) -> bool {
        self.slots
            .get(&slot)
            .is_some_and(|s| s.teachers.contains_key(teacher))
    }

    /// Class holding `resource` at `slot`.
    pub fn resource_holder(&self, resource: &str, slot: TimeSlot) -> Option<&str> {
        self.slots
            .get(&slot)?
            .resources
            .get(resource)
            .map(String::as_str)
    }

    fn commit_teacher(&mut self, teacher: &str, slot: TimeSlot, classes: &[String]) {
        self.slots
            .entry(slot)
            .or_default()
            .teachers
            .entry(teacher.to_string())
            .or_default()
            .extend(classes.iter().cloned());
    }

    fn claim_resource(&mut self, resource: &str, slot: TimeSlot, class_id: &str) {
        self.slots
            .entry(slot)
            .or_default()
            .resources
            .entry(resource.to_string())
            .or_insert_with(|| class_id.to_string());
    }

    /// All occupied slots.
    pub fn iter(&self) -> impl Iterator<Item = (&TimeSlot, &SlotOccupancy)> {
        self.slots.iter()
    }
}

/// Mutable state of one generation run.
pub struct RunContext<'a> {
    /// Input being scheduled.
    pub input: &'a TimetableInput,
    /// Active configuration.
    pub config: &'a SolverConfig,
    /// Week structure.
    pub calendar: WeekCalendar,
    /// Class id → grid. Only classes with a resolvable layout get a grid.
    pub grids: BTreeMap<String, ClassGrid>,
    /// Teacher and resource commitments.
    pub occupancy: GlobalOccupancy,
    /// Teacher id → counters.
    pub teacher_loads: BTreeMap<String, TeacherLoad>,
    /// Diagnostics collected so far.
    pub diagnostics: Vec<Diagnostic>,
    /// Run counters.
    pub stats: RunStats,
    /// Seeded randomness source.
    pub rng: StdRng,
}

impl<'a> RunContext<'a> {
    /// Creates the state for one run.
    pub fn new(input: &'a TimetableInput, config: &'a SolverConfig, seed: u64) -> Self {
        let calendar = input.calendar();
        let period_ids = calendar.period_ids();
        let grids = input
            .classes
            .iter()
            .filter(|c| input.layout_for(c).is_some())
            .map(|c| {
                (
                    c.clone(),
                    ClassGrid::new(c.as_str(), calendar.day_count(), period_ids.clone()),
                )
            })
            .collect();

        Self {
            input,
            config,
            calendar,
            grids,
            occupancy: GlobalOccupancy::default(),
            teacher_loads: BTreeMap::new(),
            diagnostics: Vec::new(),
            stats: RunStats {
                seed,
                ..RunStats::default()
            },
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Day name of a day index.
    pub fn day_name(&self, day: usize) -> &str {
        self.calendar.day_name(day).unwrap_or_default()
    }

    /// Effective layout of a class.
    pub fn layout(&self, class_id: &str) -> Option<&'a DivisionLayout> {
        self.input.layout_for(class_id)
    }

    /// Whether `period` is a lesson slot for the class on `day`.
    pub fn is_lesson_slot(&self, class_id: &str, day: usize, period: PeriodId) -> bool {
        self.layout(class_id)
            .is_some_and(|l| l.is_lesson_slot(self.day_name(day), period))
    }

    /// Whether the class's cell is still empty.
    pub fn is_empty(&self, class_id: &str, day: usize, period: PeriodId) -> bool {
        self.grids
            .get(class_id)
            .is_some_and(|g| g.is_empty_at(day, period))
    }

    /// Empty lesson slots of a class on a day, excluding break and lunch,
    /// ascending.
    pub fn candidate_slots(&self, class_id: &str, day: usize) -> Vec<PeriodId> {
        let Some(layout) = self.layout(class_id) else {
            return Vec::new();
        };
        let mut slots = layout
            .slots_for(self.day_name(day))
            .iter()
            .copied()
            .filter(|&p| !layout.is_pause(p) && self.is_empty(class_id, day, p))
            .collect::<Vec<_>>();
        slots.sort_unstable();
        slots.dedup();
        slots
    }

    /// Periods a double may span without breaking adjacency.
    pub fn bridges(&self, class_id: &str) -> Vec<PeriodId> {
        match self.layout(class_id) {
            Some(layout) if self.config.allow_doubles_across_breaks => layout.pause_periods(),
            _ => Vec::new(),
        }
    }

    /// Lessons of `subject` for the class on `day`.
    pub fn subject_count_on(&self, class_id: &str, subject: &str, day: usize) -> u32 {
        self.grids
            .get(class_id)
            .map_or(0, |g| g.lesson_count_on(day, subject))
    }

    /// Lessons of any subject for the class on `day`.
    pub fn class_lessons_on(&self, class_id: &str, day: usize) -> u32 {
        self.grids.get(class_id).map_or(0, |g| g.lessons_on(day))
    }

    /// Periods `teacher` teaches on `day`.
    pub fn teacher_day_count(&self, teacher: &str, day: usize) -> u32 {
        self.teacher_loads
            .get(teacher)
            .map_or(0, |l| l.on_day(day))
    }

    /// Writes a lesson for one class and records teacher and resource
    /// commitments. Returns `false` if the cell was not empty.
    pub fn commit_lesson(
        &mut self,
        class_id: &str,
        subject: &str,
        teacher: &str,
        day: usize,
        period: PeriodId,
    ) -> bool {
        self.commit_joint_lesson(&[class_id.to_string()], subject, teacher, day, period)
    }

    /// Writes one lesson taught jointly to several classes.
    ///
    /// The teacher is counted once for the slot and an exclusive resource
    /// is claimed once, by the first class.
    pub fn commit_joint_lesson(
        &mut self,
        classes: &[String],
        subject: &str,
        teacher: &str,
        day: usize,
        period: PeriodId,
    ) -> bool {
        if classes.is_empty() || !classes.iter().all(|c| self.is_empty(c, day, period)) {
            return false;
        }
        for class_id in classes {
            if let Some(grid) = self.grids.get_mut(class_id) {
                grid.set(day, period, Assignment::lesson(subject, teacher));
            }
        }

        let slot = TimeSlot::new(day, period);
        self.occupancy.commit_teacher(teacher, slot, classes);
        if let Some(resource) = self.input.constraints.resource_for(subject) {
            self.occupancy.claim_resource(resource, slot, &classes[0]);
        }

        let days = self.calendar.day_count();
        self.teacher_loads
            .entry(teacher.to_string())
            .or_insert_with(|| TeacherLoad::new(days))
            .record(day);
        true
    }

    /// Writes a non-lesson assignment into an empty cell.
    pub fn fill(&mut self, class_id: &str, day: usize, period: PeriodId, assignment: Assignment) -> bool {
        self.grids
            .get_mut(class_id)
            .is_some_and(|g| g.set(day, period, assignment))
    }

    /// Records a diagnostic.
    pub fn report(&mut self, diagnostic: Diagnostic) {
        warn!(
            kind = ?diagnostic.kind,
            class = diagnostic.class_id.as_deref().unwrap_or("-"),
            subject = diagnostic.subject.as_deref().unwrap_or("-"),
            remaining = diagnostic.remaining,
            "{}",
            diagnostic.message
        );
        self.diagnostics.push(diagnostic);
    }

    /// Day indices in random order.
    pub fn shuffled(&mut self, days: &[usize]) -> Vec<usize> {
        let mut days = days.to_vec();
        days.shuffle(&mut self.rng);
        days
    }
}
