//! Teacher workload tallies.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Total | Periods taught this week |
//! | Peak | Periods on the busiest day |
//! | Utilization | total / (daily cap * days) |
//! | Average load | Mean total across teachers |
//!
//! A lesson taught jointly to a synchronized group counts once.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::models::{ClassGrid, PeriodId, TeacherCaps, TeacherLoad};

/// Workload of one teacher.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherWorkload {
    /// Teacher id.
    pub teacher: String,
    /// Periods taught this week.
    pub total: u32,
    /// Periods taught per day index.
    pub per_day: Vec<u32>,
    /// Applicable daily cap.
    pub daily_cap: u32,
}

impl TeacherWorkload {
    /// Busiest day count.
    pub fn peak(&self) -> u32 {
        self.per_day.iter().copied().max().unwrap_or(0)
    }

    /// Whether any day exceeds the cap.
    pub fn is_over_cap(&self) -> bool {
        self.peak() > self.daily_cap
    }

    /// Fraction of the weekly capacity in use (0.0 if no capacity).
    pub fn utilization(&self) -> f64 {
        let capacity = self.daily_cap as usize * self.per_day.len();
        if capacity == 0 {
            0.0
        } else {
            self.total as f64 / capacity as f64
        }
    }
}

/// Workload of every teacher who taught at least one period.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadSummary {
    /// Teacher id → workload.
    pub teachers: BTreeMap<String, TeacherWorkload>,
}

impl WorkloadSummary {
    /// Builds the summary from run counters.
    pub fn from_loads(loads: &BTreeMap<String, TeacherLoad>, caps: &TeacherCaps) -> Self {
        let teachers = loads
            .iter()
            .map(|(teacher, load)| {
                let workload = TeacherWorkload {
                    teacher: teacher.clone(),
                    total: load.total,
                    per_day: load.per_day.clone(),
                    daily_cap: caps.daily_cap(teacher),
                };
                (teacher.clone(), workload)
            })
            .collect();
        Self { teachers }
    }

    /// Recounts workloads from finished grids.
    ///
    /// Identical (teacher, day, period) cells across classes are one
    /// joint lesson.
    pub fn calculate(grids: &BTreeMap<String, ClassGrid>, days: usize, caps: &TeacherCaps) -> Self {
        let mut taught: BTreeSet<(&str, usize, PeriodId)> = BTreeSet::new();
        for grid in grids.values() {
            for (day, period, assignment) in grid.iter() {
                if let Some(teacher) = assignment.teacher() {
                    taught.insert((teacher, day, period));
                }
            }
        }

        let mut loads: BTreeMap<String, TeacherLoad> = BTreeMap::new();
        for (teacher, day, _) in taught {
            loads
                .entry(teacher.to_string())
                .or_insert_with(|| TeacherLoad::new(days))
                .record(day);
        }
        Self::from_loads(&loads, caps)
    }

    /// Workload of one teacher.
    pub fn get(&self, teacher: &str) -> Option<&TeacherWorkload> {
        self.teachers.get(teacher)
    }

    /// Periods taught across all teachers.
    pub fn total_periods(&self) -> u32 {
        self.teachers.values().map(|w| w.total).sum()
    }

    /// Teacher with the highest weekly total. Ties go to the smaller id.
    pub fn busiest(&self) -> Option<&TeacherWorkload> {
        self.teachers
            .values()
            .fold(None, |best: Option<&TeacherWorkload>, w| match best {
                Some(b) if b.total >= w.total => Some(b),
                _ => Some(w),
            })
    }

    /// Mean weekly total per teacher.
    pub fn average_load(&self) -> f64 {
        if self.teachers.is_empty() {
            0.0
        } else {
            self.total_periods() as f64 / self.teachers.len() as f64
        }
    }

    /// Teachers exceeding their daily cap on some day.
    pub fn over_cap(&self) -> Vec<&TeacherWorkload> {
        self.teachers.values().filter(|w| w.is_over_cap()).collect()
    }
}
