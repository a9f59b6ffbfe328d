//! Constraint evaluation for candidate placements.
//!
//! [`can_assign`] is a read-only predicate over the run state. Checks
//! short-circuit in a fixed order, cheapest and most structural first:
//!
//! 1. Lesson slot for the class on that day
//! 2. Cell empty
//! 3. Subject daily cap for the class
//! 4. Teacher daily cap
//! 5. Teacher free at the slot
//! 6. Teacher available on the day
//! 7. Subject day restriction
//! 8. Exclusive resource free (or held by the same class)
//! 9. Class lessons-per-day limit

use thiserror::Error;

use super::context::RunContext;
use crate::models::{PeriodId, TimeSlot};

/// A candidate (class, subject, teacher, day, period) placement.
///
/// `pending` counts periods of the same block already accepted on this
/// day but not yet committed; they count toward the daily caps.
#[derive(Debug, Clone, Copy)]
pub struct Probe<'p> {
    pub class_id: &'p str,
    pub subject: &'p str,
    pub teacher: &'p str,
    pub day: usize,
    pub period: PeriodId,
    pub pending: u32,
}

impl<'p> Probe<'p> {
    /// Creates a probe with no pending periods.
    pub fn new(class_id: &'p str, subject: &'p str, teacher: &'p str, day: usize, period: PeriodId) -> Self {
        Self {
            class_id,
            subject,
            teacher,
            day,
            period,
            pending: 0,
        }
    }

    /// Same probe at another period with `pending` block periods.
    pub fn at(self, period: PeriodId, pending: u32) -> Self {
        Self {
            period,
            pending,
            ..self
        }
    }
}

/// Why a placement was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("period {period} is not a lesson slot")]
    NotLessonSlot { period: PeriodId },
    #[error("cell at period {period} is already occupied")]
    CellOccupied { period: PeriodId },
    #[error("subject daily cap of {cap} reached")]
    SubjectDailyCap { cap: u32 },
    #[error("teacher '{teacher}' reached daily cap of {cap}")]
    TeacherDailyCap { teacher: String, cap: u32 },
    #[error("teacher '{teacher}' is already teaching at period {period}")]
    TeacherBusy { teacher: String, period: PeriodId },
    #[error("teacher '{teacher}' is unavailable on {day}")]
    TeacherUnavailable { teacher: String, day: String },
    #[error("subject is not allowed on {day}")]
    DayRestricted { day: String },
    #[error("resource '{resource}' is held by class '{holder}'")]
    ResourceClaimed { resource: String, holder: String },
    #[error("class daily limit of {limit} lessons reached")]
    ClassDailyLimit { limit: u32 },
}

/// Checks whether a placement is legal.
pub fn can_assign(ctx: &RunContext<'_>, probe: &Probe<'_>) -> Result<(), Rejection> {
    let constraints = &ctx.input.constraints;
    let day_name = ctx.day_name(probe.day);
    let slot = TimeSlot::new(probe.day, probe.period);

    if !ctx.is_lesson_slot(probe.class_id, probe.day, probe.period) {
        return Err(Rejection::NotLessonSlot {
            period: probe.period,
        });
    }

    if !ctx.is_empty(probe.class_id, probe.day, probe.period) {
        return Err(Rejection::CellOccupied {
            period: probe.period,
        });
    }

    let cap = ctx.config.max_subject_periods_per_day;
    if ctx.subject_count_on(probe.class_id, probe.subject, probe.day) + probe.pending >= cap {
        return Err(Rejection::SubjectDailyCap { cap });
    }

    let teacher_cap = constraints.teacher_caps.daily_cap(probe.teacher);
    if ctx.teacher_day_count(probe.teacher, probe.day) + probe.pending >= teacher_cap {
        return Err(Rejection::TeacherDailyCap {
            teacher: probe.teacher.to_string(),
            cap: teacher_cap,
        });
    }

    if ctx.occupancy.teacher_busy(probe.teacher, slot) {
        return Err(Rejection::TeacherBusy {
            teacher: probe.teacher.to_string(),
            period: probe.period,
        });
    }

    if !constraints.teacher_available(probe.teacher, day_name) {
        return Err(Rejection::TeacherUnavailable {
            teacher: probe.teacher.to_string(),
            day: day_name.to_string(),
        });
    }

    if let Some(days) = constraints.allowed_days(probe.subject) {
        if !days.iter().any(|d| d == day_name) {
            return Err(Rejection::DayRestricted {
                day: day_name.to_string(),
            });
        }
    }

    if let Some(resource) = constraints.resource_for(probe.subject) {
        if let Some(holder) = ctx.occupancy.resource_holder(resource, slot) {
            if holder != probe.class_id {
                return Err(Rejection::ResourceClaimed {
                    resource: resource.to_string(),
                    holder: holder.to_string(),
                });
            }
        }
    }

    if let Some(&limit) = constraints.class_daily_limits.get(probe.class_id) {
        if ctx.class_lessons_on(probe.class_id, probe.day) + probe.pending >= limit {
            return Err(Rejection::ClassDailyLimit { limit });
        }
    }

    Ok(())
}
