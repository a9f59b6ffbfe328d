//! Timetabling domain models.
//!
//! Provides the data types describing a school week (input) and the
//! generated per-class grids (output).
//!
//! # Domain Mappings
//!
//! | u-timetable | School |
//! |-------------|--------|
//! | ClassGrid | A class's weekly timetable |
//! | Division | Year band sharing layout and curriculum |
//! | LessonRequirement | Weekly periods of one subject for one class |
//! | Assignment | Contents of one timetable cell |

mod calendar;
mod constraint;
mod division;
mod input;
mod requirement;
mod teacher;
mod timetable;

pub use calendar::{is_consecutive, Period, PeriodId, PeriodKind, TimeSlot, WeekCalendar};
pub use constraint::{
    Applicability, ConstraintConfig, DoubleRule, DoubleStructure, ExclusiveResource,
    SpecialEvent, SyncGroup,
};
pub use division::{Division, DivisionLayout};
pub use input::{TeacherRef, TimetableInput};
pub use requirement::{BlockStructure, LessonRequirement};
pub use teacher::{Availability, TeacherCaps, TeacherLoad};
pub use timetable::{
    Assignment, ClassGrid, Diagnostic, DiagnosticKind, RunStats, Timetable, ValidationReport,
    Violation, ViolationType,
};
