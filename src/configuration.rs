use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::{json, Value};
use std::fmt;
use time::Time;

pub(crate) const DEFAULT_OBJECTIVE: &str = "noobjective";

/// Objectives understood by the optimizer, in the order the configuration
/// panel offers them
pub(crate) const OBJECTIVES: [&str; 4] = [
    DEFAULT_OBJECTIVE,
    "minimize_gaps",
    "minimize_num_courses",
    "maximize_num_ects",
];

/// The scheduling preferences sent to the optimizer.
///
/// One instance lives for the whole session.  Every mutation is applied
/// immediately and unconditionally; input validation is the caller's job.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Configuration {
    semester: String,
    curriculum: String,
    selected_prefixes: Vec<String>,
    excluded_courses: Vec<String>,
    additional_constraints: IndexMap<String, i64>,
    objective: String,
    blockers: IndexMap<BlockerId, Blocker>,
    num_of_blockers: u64,
}

impl Configuration {
    pub(crate) fn new() -> Configuration {
        Configuration {
            semester: String::new(),
            curriculum: String::new(),
            selected_prefixes: Vec::new(),
            excluded_courses: Vec::new(),
            additional_constraints: IndexMap::new(),
            objective: String::from(DEFAULT_OBJECTIVE),
            blockers: IndexMap::new(),
            num_of_blockers: 0,
        }
    }

    pub(crate) fn set_semester<S: Into<String>>(&mut self, semester: S) {
        self.semester = semester.into();
    }

    pub(crate) fn set_curriculum<S: Into<String>>(&mut self, curriculum: S) {
        self.curriculum = curriculum.into();
    }

    pub(crate) fn set_objective<S: Into<String>>(&mut self, objective: S) {
        self.objective = objective.into();
    }

    pub(crate) fn add_prefix<S: Into<String>>(&mut self, prefix: S) {
        self.selected_prefixes.push(prefix.into());
    }

    pub(crate) fn exclude_course<S: Into<String>>(&mut self, course: S) {
        self.excluded_courses.push(course.into());
    }

    pub(crate) fn add_additional_constraint<S: Into<String>>(&mut self, name: S, amount: i64) {
        self.additional_constraints.insert(name.into(), amount);
    }

    /// Drop the constraint on `name`, if any
    pub(crate) fn remove_additional_constraint(&mut self, name: &str) {
        self.additional_constraints.shift_remove(name);
    }

    /// Store a recurring blocker and return the ID under which it can later
    /// be removed.
    ///
    /// `weekday_index` counts from Monday (0) to Friday (4).  Any other
    /// index yields a blocker without a weekday.
    pub(crate) fn add_blocker(
        &mut self,
        weekday_index: usize,
        from: Time,
        until: Time,
    ) -> BlockerId {
        let id = BlockerId(format!("blocker{}", self.num_of_blockers));
        self.num_of_blockers += 1;
        let blocker = Blocker {
            weekday: Workday::from_index(weekday_index),
            from,
            until,
        };
        self.blockers.insert(id.clone(), blocker);
        id
    }

    pub(crate) fn remove_blocker(&mut self, id: &BlockerId) {
        // shift_remove keeps the remaining blockers in issue order
        self.blockers.shift_remove(id);
    }

    pub(crate) fn semester(&self) -> &str {
        &self.semester
    }

    pub(crate) fn curriculum(&self) -> &str {
        &self.curriculum
    }

    pub(crate) fn objective(&self) -> &str {
        &self.objective
    }

    pub(crate) fn selected_prefixes(&self) -> &[String] {
        &self.selected_prefixes
    }

    pub(crate) fn excluded_courses(&self) -> &[String] {
        &self.excluded_courses
    }

    pub(crate) fn additional_constraints(&self) -> &IndexMap<String, i64> {
        &self.additional_constraints
    }

    pub(crate) fn blockers(&self) -> &IndexMap<BlockerId, Blocker> {
        &self.blockers
    }

    /// Project the configuration onto the optimizer's request body
    pub(crate) fn to_json(&self) -> Value {
        json!({
            "semester": self.semester,
            "curriculum": self.curriculum,
            "selectedPrefixes": self.selected_prefixes,
            "excludedCourses": self.excluded_courses,
            "additionalConstraints": self.additional_constraints,
            "objective": self.objective,
            "blockers": self.blockers,
            "num_of_blockers": self.num_of_blockers,
        })
    }
}

impl Default for Configuration {
    fn default() -> Configuration {
        Configuration::new()
    }
}

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub(crate) struct BlockerId(String);

impl BlockerId {
    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A weekly interval during which no course may be scheduled
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub(crate) struct Blocker {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) weekday: Option<Workday>,
    #[serde(serialize_with = "serialize_hour_minute")]
    pub(crate) from: Time,
    #[serde(serialize_with = "serialize_hour_minute")]
    pub(crate) until: Time,
}

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub(crate) enum Workday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl Workday {
    pub(crate) const ALL: [Workday; 5] = [
        Workday::Monday,
        Workday::Tuesday,
        Workday::Wednesday,
        Workday::Thursday,
        Workday::Friday,
    ];

    pub(crate) fn from_index(index: usize) -> Option<Workday> {
        Workday::ALL.get(index).copied()
    }

    pub(crate) fn name(self) -> &'static str {
        match self {
            Workday::Monday => "Monday",
            Workday::Tuesday => "Tuesday",
            Workday::Wednesday => "Wednesday",
            Workday::Thursday => "Thursday",
            Workday::Friday => "Friday",
        }
    }

    pub(crate) fn weekday(self) -> time::Weekday {
        match self {
            Workday::Monday => time::Weekday::Monday,
            Workday::Tuesday => time::Weekday::Tuesday,
            Workday::Wednesday => time::Weekday::Wednesday,
            Workday::Thursday => time::Weekday::Thursday,
            Workday::Friday => time::Weekday::Friday,
        }
    }
}

impl fmt::Display for Workday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub(crate) fn hour_minute(t: Time) -> String {
    format!("{:02}:{:02}", t.hour(), t.minute())
}

fn serialize_hour_minute<S: Serializer>(t: &Time, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&hour_minute(*t))
}
