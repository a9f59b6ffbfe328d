//! Block placement search.
//!
//! Places one block (a single period or a double) of a subject for one
//! class, or for every member of a synchronized group at once.
//!
//! # Algorithm
//!
//! 1. Shuffle the allowed days with the run's RNG.
//! 2. Per day, skip if any class already hit the subject's daily cap.
//! 3. Collect the empty lesson slots shared by all classes, ascending.
//! 4. Double: accept the first consecutive pair that passes the evaluator
//!    for every class. Otherwise, if allowed, place two independent
//!    singles on the same day, committing each as found.
//! 5. Single: accept the first slot (shuffled or ascending) that passes.
//!
//! Each call counts as one placement attempt.

use rand::seq::SliceRandom;
use tracing::debug;

use super::context::RunContext;
use super::evaluator::{can_assign, Probe, Rejection};
use crate::config::SlotOrder;
use crate::models::{is_consecutive, PeriodId};

/// Requested block length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockLength {
    Single,
    Double,
}

impl BlockLength {
    /// Periods in the block.
    pub fn periods(self) -> u32 {
        match self {
            BlockLength::Single => 1,
            BlockLength::Double => 2,
        }
    }
}

/// One block to place.
#[derive(Debug, Clone, Copy)]
pub struct BlockRequest<'r> {
    /// Classes taught together; one entry unless synchronized.
    pub classes: &'r [String],
    pub subject: &'r str,
    pub teacher: &'r str,
    /// Candidate day indices.
    pub allowed_days: &'r [usize],
    pub length: BlockLength,
    /// Whether a double may fall back to two singles on one day.
    pub allow_singles_fallback: bool,
}

/// Result of a block search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockOutcome {
    /// Consecutive pair placed.
    Double,
    /// Double realised as two singles on one day.
    SplitDouble,
    /// Single placed.
    Single,
    /// Only one of the two fallback singles placed.
    Partial,
    /// Nothing placed. Carries the last rejection seen, if any.
    Failed(Option<Rejection>),
}

impl BlockOutcome {
    /// Periods placed per class.
    pub fn placed_periods(&self) -> u32 {
        match self {
            BlockOutcome::Double | BlockOutcome::SplitDouble => 2,
            BlockOutcome::Single | BlockOutcome::Partial => 1,
            BlockOutcome::Failed(_) => 0,
        }
    }

    /// Whether the full requested length was placed.
    pub fn is_complete(&self, length: BlockLength) -> bool {
        self.placed_periods() == length.periods()
    }
}

/// Searches for and commits one block.
pub fn place_block(ctx: &mut RunContext<'_>, request: &BlockRequest<'_>) -> BlockOutcome {
    ctx.stats.placement_attempts += 1;
    let cap = ctx.config.max_subject_periods_per_day;
    let mut last = None;

    for day in ctx.shuffled(request.allowed_days) {
        let capped = request
            .classes
            .iter()
            .any(|c| ctx.subject_count_on(c, request.subject, day) >= cap);
        if capped {
            last = Some(Rejection::SubjectDailyCap { cap });
            continue;
        }

        match request.length {
            BlockLength::Double => {
                if let Some((first, second)) = find_pair(ctx, request, day, &mut last) {
                    commit(ctx, request, day, first);
                    commit(ctx, request, day, second);
                    ctx.stats.doubles_placed += 1;
                    return BlockOutcome::Double;
                }
                if request.allow_singles_fallback {
                    match place_singles(ctx, request, day, 2, &mut last) {
                        2 => {
                            ctx.stats.doubles_split += 1;
                            return BlockOutcome::SplitDouble;
                        }
                        1 => {
                            ctx.stats.singles_placed += 1;
                            return BlockOutcome::Partial;
                        }
                        _ => {}
                    }
                }
            }
            BlockLength::Single => {
                if place_singles(ctx, request, day, 1, &mut last) == 1 {
                    ctx.stats.singles_placed += 1;
                    return BlockOutcome::Single;
                }
            }
        }
    }

    debug!(
        classes = ?request.classes,
        subject = request.subject,
        length = request.length.periods(),
        reason = ?last,
        "block placement failed"
    );
    BlockOutcome::Failed(last)
}

/// Empty lesson slots shared by all classes on `day`.
fn shared_candidates(ctx: &RunContext<'_>, classes: &[String], day: usize) -> Vec<PeriodId> {
    let Some((head, rest)) = classes.split_first() else {
        return Vec::new();
    };
    let others: Vec<Vec<PeriodId>> = rest.iter().map(|c| ctx.candidate_slots(c, day)).collect();
    ctx.candidate_slots(head, day)
        .into_iter()
        .filter(|p| others.iter().all(|slots| slots.contains(p)))
        .collect()
}

fn passes(
    ctx: &RunContext<'_>,
    request: &BlockRequest<'_>,
    day: usize,
    period: PeriodId,
    pending: u32,
    last: &mut Option<Rejection>,
) -> bool {
    for class_id in request.classes {
        let probe = Probe::new(class_id, request.subject, request.teacher, day, period);
        if let Err(rejection) = can_assign(ctx, &probe.at(period, pending)) {
            *last = Some(rejection);
            return false;
        }
    }
    true
}

fn find_pair(
    ctx: &RunContext<'_>,
    request: &BlockRequest<'_>,
    day: usize,
    last: &mut Option<Rejection>,
) -> Option<(PeriodId, PeriodId)> {
    let slots = shared_candidates(ctx, request.classes, day);
    let bridges: Vec<Vec<PeriodId>> = request.classes.iter().map(|c| ctx.bridges(c)).collect();

    slots.windows(2).map(|w| (w[0], w[1])).find(|&(a, b)| {
        bridges.iter().all(|br| is_consecutive(a, b, br))
            && passes(ctx, request, day, a, 0, last)
            && passes(ctx, request, day, b, 1, last)
    })
}

/// Places up to `count` singles on `day`, committing each as found.
/// Returns how many were placed.
fn place_singles(
    ctx: &mut RunContext<'_>,
    request: &BlockRequest<'_>,
    day: usize,
    count: u32,
    last: &mut Option<Rejection>,
) -> u32 {
    let mut placed = 0;
    while placed < count {
        let mut slots = shared_candidates(ctx, request.classes, day);
        if ctx.config.single_slot_order == SlotOrder::Random {
            slots.shuffle(&mut ctx.rng);
        }
        let found = slots
            .into_iter()
            .find(|&p| passes(ctx, request, day, p, 0, last));
        match found {
            Some(period) => {
                commit(ctx, request, day, period);
                placed += 1;
            }
            None => break,
        }
    }
    placed
}

fn commit(ctx: &mut RunContext<'_>, request: &BlockRequest<'_>, day: usize, period: PeriodId) {
    ctx.commit_joint_lesson(request.classes, request.subject, request.teacher, day, period);
}
