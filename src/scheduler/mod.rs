//! Timetable generation engine.
//!
//! Run-scoped state, constraint evaluation, block placement, the phase
//! scheduler, gap filling, post-hoc validation and workload tallies.
//!
//! # Algorithm
//!
//! `TimetableGenerator` is a greedy, randomized, multi-phase heuristic.
//! Most-constrained requirements go first; every placement is checked by
//! `evaluator::can_assign` against the current [`context::RunContext`].
//! It is best-effort: shortfalls are reported, never fatal.
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Burke & Petrovic (2002), "Recent research directions in automated timetabling"

pub mod context;
pub mod evaluator;
pub mod placement;

mod gap_fill;
mod generator;
mod validator;
mod workload;

pub use context::{GlobalOccupancy, RunContext, SlotOccupancy};
pub use evaluator::{can_assign, Probe, Rejection};
pub use gap_fill::fill_gaps;
pub use generator::TimetableGenerator;
pub use placement::{place_block, BlockLength, BlockOutcome, BlockRequest};
pub use validator::validate_timetable;
pub use workload::{TeacherWorkload, WorkloadSummary};
