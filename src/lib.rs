//! School timetabling engine.
//!
//! Turns a declarative description of a school (classes, curriculum,
//! teacher assignments, shared resources, weekly calendar) into one
//! conflict-free weekly lesson grid per class. Teacher workload caps,
//! availability, exclusive resources, double periods, day restrictions,
//! synchronized classes and fixed events are honoured on a best-effort
//! basis; anything that cannot be placed is reported, never fatal.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `TimetableInput`, `DivisionLayout`,
//!   `ConstraintConfig`, `ClassGrid`, `Assignment`, `Timetable`
//! - **`validation`**: Input integrity checks (duplicate IDs, layouts,
//!   day and period references, teachers, synchronized groups)
//! - **`scheduler`**: The generator, constraint evaluator, block placement,
//!   gap filler, post-hoc validator and workload summary
//! - **`config`**: `SolverConfig` policy toggles
//! - **`worker`**: Background generation with a single in-flight run
//!
//! # Example
//!
//! ```
//! use u_timetable::config::SolverConfig;
//! use u_timetable::models::{Division, DivisionLayout, Period, TimetableInput};
//! use u_timetable::scheduler::TimetableGenerator;
//!
//! let input = TimetableInput::new(
//!     ["Mon", "Tue", "Wed", "Thu", "Fri"],
//!     (1..=6).map(|i| Period::new(i, "")).collect(),
//! )
//! .with_class("1A")
//! .with_division_layout(
//!     Division::LowerPrimary,
//!     DivisionLayout::new(vec![1, 2, 4, 5]).with_break(3).with_lunch(6),
//! )
//! .with_subject(Division::LowerPrimary, "Math", 5)
//! .with_teacher("1A", "Math", "T1");
//!
//! let timetable = TimetableGenerator::new(SolverConfig::default().with_seed(7))
//!     .generate(&input)
//!     .unwrap();
//! assert_eq!(timetable.lesson_count("1A", "Math"), 5);
//! assert!(timetable.report.passed);
//! ```
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"

pub mod config;
pub mod error;
pub mod models;
pub mod scheduler;
pub mod validation;
pub mod worker;

pub use config::SolverConfig;
pub use error::{Result, TimetableError};
pub use scheduler::TimetableGenerator;
