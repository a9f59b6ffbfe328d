//! Timetabling constraint configuration.
//!
//! Everything beyond plain weekly period counts: day restrictions,
//! exclusive resources, double-period rules, teacher caps and availability,
//! synchronized groups, fixed special events and per-class daily limits.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Availability, Division, PeriodId, TeacherCaps};

/// Which divisions a rule or event applies to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Applicability {
    /// Every division.
    #[default]
    All,
    /// Only the listed divisions.
    Divisions(Vec<Division>),
}

impl Applicability {
    /// Whether `division` is covered.
    pub fn applies_to(&self, division: Division) -> bool {
        match self {
            Applicability::All => true,
            Applicability::Divisions(list) => list.contains(&division),
        }
    }
}

/// How a subject's weekly periods are grouped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoubleStructure {
    /// Only double periods.
    Strict,
    /// A fixed number of doubles and singles.
    Mixed { doubles: u32, singles: u32 },
}

/// Double-period rule for a subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoubleRule {
    /// Subject name.
    pub subject: String,
    /// Divisions the rule applies to.
    #[serde(default)]
    pub applies_to: Applicability,
    /// Grouping structure.
    pub structure: DoubleStructure,
}

/// A facility usable by one class at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusiveResource {
    /// Resource name (e.g. "ICT Lab").
    pub name: String,
    /// Subjects taught in this resource.
    pub subjects: Vec<String>,
}

/// Classes taught one subject jointly, in identical slots, by one teacher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncGroup {
    /// Jointly taught subject.
    pub subject: String,
    /// Member class ids.
    pub classes: Vec<String>,
    /// Teacher; defaults to the first member's assigned teacher.
    #[serde(default)]
    pub teacher: Option<String>,
}

/// A fixed event pinned before lesson scheduling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialEvent {
    /// Display name (e.g. "Assembly").
    pub name: String,
    /// Display color.
    #[serde(default)]
    pub color: String,
    /// Day name.
    pub day: String,
    /// Period ids covered.
    pub periods: Vec<PeriodId>,
    /// Divisions the event applies to.
    #[serde(default)]
    pub applies_to: Applicability,
}

/// All scheduling constraints beyond weekly period counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstraintConfig {
    /// Subject → days it may be taught on.
    pub day_restrictions: BTreeMap<String, Vec<String>>,
    /// Exclusive resources.
    pub exclusive_resources: Vec<ExclusiveResource>,
    /// Double-period rules.
    pub double_rules: Vec<DoubleRule>,
    /// Teacher daily caps.
    pub teacher_caps: TeacherCaps,
    /// Teacher → availability rule. Missing = always available.
    pub availability: BTreeMap<String, Availability>,
    /// Synchronized groups.
    pub sync_groups: Vec<SyncGroup>,
    /// Fixed special events.
    pub special_events: Vec<SpecialEvent>,
    /// Class → maximum lessons per day.
    pub class_daily_limits: BTreeMap<String, u32>,
}

impl SpecialEvent {
    /// Creates an event for all divisions.
    pub fn new(name: impl Into<String>, day: impl Into<String>, periods: Vec<PeriodId>) -> Self {
        Self {
            name: name.into(),
            color: String::new(),
            day: day.into(),
            periods,
            applies_to: Applicability::All,
        }
    }

    /// Sets the display color.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Restricts the event to some divisions.
    pub fn for_divisions(mut self, divisions: Vec<Division>) -> Self {
        self.applies_to = Applicability::Divisions(divisions);
        self
    }
}

impl ConstraintConfig {
    /// Creates an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts a subject to the given days.
    pub fn with_day_restriction<I, S>(mut self, subject: impl Into<String>, days: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.day_restrictions
            .insert(subject.into(), days.into_iter().map(Into::into).collect());
        self
    }

    /// Adds an exclusive resource.
    pub fn with_exclusive_resource<I, S>(mut self, name: impl Into<String>, subjects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclusive_resources.push(ExclusiveResource {
            name: name.into(),
            subjects: subjects.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Adds a double-period rule.
    pub fn with_double_rule(
        mut self,
        subject: impl Into<String>,
        applies_to: Applicability,
        structure: DoubleStructure,
    ) -> Self {
        self.double_rules.push(DoubleRule {
            subject: subject.into(),
            applies_to,
            structure,
        });
        self
    }

    /// Sets teacher caps.
    pub fn with_teacher_caps(mut self, caps: TeacherCaps) -> Self {
        self.teacher_caps = caps;
        self
    }

    /// Sets a teacher's availability.
    pub fn with_availability(mut self, teacher: impl Into<String>, rule: Availability) -> Self {
        self.availability.insert(teacher.into(), rule);
        self
    }

    /// Adds a synchronized group.
    pub fn with_sync_group(mut self, group: SyncGroup) -> Self {
        self.sync_groups.push(group);
        self
    }

    /// Adds a special event.
    pub fn with_special_event(mut self, event: SpecialEvent) -> Self {
        self.special_events.push(event);
        self
    }

    /// Caps the lessons per day of one class.
    pub fn with_class_daily_limit(mut self, class_id: impl Into<String>, limit: u32) -> Self {
        self.class_daily_limits.insert(class_id.into(), limit);
        self
    }

    /// Exclusive resource used by `subject`.
    pub fn resource_for(&self, subject: &str) -> Option<&str> {
        self.exclusive_resources
            .iter()
            .find(|r| r.subjects.iter().any(|s| s == subject))
            .map(|r| r.name.as_str())
    }

    /// Double structure of `subject` in `division`. First matching rule wins.
    pub fn double_structure(&self, subject: &str, division: Division) -> Option<DoubleStructure> {
        self.double_rules
            .iter()
            .find(|r| r.subject == subject && r.applies_to.applies_to(division))
            .map(|r| r.structure)
    }

    /// Day names `subject` is restricted to, if any.
    pub fn allowed_days(&self, subject: &str) -> Option<&[String]> {
        self.day_restrictions.get(subject).map(Vec::as_slice)
    }

    /// Whether `teacher` may teach on `day`.
    pub fn teacher_available(&self, teacher: &str, day: &str) -> bool {
        self.availability
            .get(teacher)
            .map_or(true, |rule| rule.permits(day))
    }

    /// Synchronized group containing `class_id` for `subject`.
    pub fn sync_group_for(&self, class_id: &str, subject: &str) -> Option<&SyncGroup> {
        self.sync_groups
            .iter()
            .find(|g| g.subject == subject && g.classes.iter().any(|c| c == class_id))
    }

    /// Whether two classes are taught `subject` jointly.
    pub fn are_synchronized(&self, subject: &str, a: &str, b: &str) -> bool {
        self.sync_group_for(a, subject)
            .is_some_and(|g| g.classes.iter().any(|c| c == b))
    }
}
