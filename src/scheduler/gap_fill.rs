//! Gap filling.
//!
//! Runs after all lesson phases. Writes Break and Lunch at the layout's
//! pause periods, then types every cell still empty: Free for lesson
//! slots, Arrival for periods tagged as arrival, Free otherwise. Only
//! empty cells are written.

use super::context::RunContext;
use crate::models::Assignment;

/// Fills every empty cell of every class grid.
pub fn fill_gaps(ctx: &mut RunContext<'_>) {
    let classes: Vec<String> = ctx.grids.keys().cloned().collect();
    let period_ids = ctx.calendar.period_ids();
    let days = ctx.calendar.day_count();

    for class_id in &classes {
        let Some(layout) = ctx.layout(class_id) else {
            continue;
        };
        for day in 0..days {
            if let Some(period) = layout.break_period {
                ctx.fill(class_id, day, period, Assignment::Break);
            }
            if let Some(period) = layout.lunch_period {
                ctx.fill(class_id, day, period, Assignment::Lunch);
            }
            for &period in &period_ids {
                if !ctx.is_empty(class_id, day, period) {
                    continue;
                }
                let filler = if ctx.is_lesson_slot(class_id, day, period) {
                    Assignment::Free
                } else if ctx.calendar.is_arrival(period) {
                    Assignment::Arrival
                } else {
                    Assignment::Free
                };
                ctx.fill(class_id, day, period, filler);
            }
        }
    }
}
