mod builder;
mod grammar;

use crate::shared::entity::ID;
use chrono::{NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use thiserror::Error;

pub use builder::{normalize_descriptor, EventKind};
pub use grammar::{match_end_condition, match_pattern};

/// Typed recurrence rule of an `Appointment`.
///
/// Exactly one of these holds for a calendar item: it is either a plain
/// appointment, a series master carrying a pattern, or an exception row
/// pointing back to its series.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Recurrence {
    NoRecurrence,
    /// Descriptor present but not recognized. Expands to a single instance.
    UnknownRecurrence,
    /// The occurrence of `series_id` originally at `occurrence` was deleted
    #[serde(rename_all = "camelCase")]
    DeletedInstance {
        series_id: ID,
        occurrence: NaiveDateTime,
    },
    /// The occurrence of `series_id` originally at `occurrence` was edited and
    /// is replaced by the exception row's own start and end
    #[serde(rename_all = "camelCase")]
    ModifiedInstance {
        series_id: ID,
        occurrence: NaiveDateTime,
    },
    Daily(DailyPattern, EndCondition),
    Weekly(WeeklyPattern, EndCondition),
    Monthly(MonthlyPattern, EndCondition),
    Yearly(YearlyPattern, EndCondition),
}

impl Recurrence {
    pub fn from_pattern(pattern: Pattern, end: EndCondition) -> Self {
        match pattern {
            Pattern::Daily(p) => Self::Daily(p, end),
            Pattern::Weekly(p) => Self::Weekly(p, end),
            Pattern::Monthly(p) => Self::Monthly(p, end),
            Pattern::Yearly(p) => Self::Yearly(p, end),
        }
    }

    /// Series this exception row belongs to, `None` for anything that is not
    /// a deleted or modified occurrence.
    pub fn series_id(&self) -> Option<ID> {
        match self {
            Self::DeletedInstance { series_id, .. } | Self::ModifiedInstance { series_id, .. } => {
                Some(*series_id)
            }
            _ => None,
        }
    }

    pub fn is_exception(&self) -> bool {
        self.series_id().is_some()
    }
}

/// Shape recognized by one of the grammar matchers, before it is combined
/// with an end condition.
#[derive(Clone, Debug, PartialEq)]
pub enum Pattern {
    Daily(DailyPattern),
    Weekly(WeeklyPattern),
    Monthly(MonthlyPattern),
    Yearly(YearlyPattern),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DailyPattern {
    EveryNDays(u32),
    /// Monday through Friday
    EveryWeekday,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyPattern {
    pub week_frequency: u32,
    pub days: WeekDays,
    /// First day of the week, which decides where a block of weeks begins
    pub week_start: Weekday,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MonthlyPattern {
    #[serde(rename_all = "camelCase")]
    DayOfMonth { day: u32, month_frequency: u32 },
    #[serde(rename_all = "camelCase")]
    Qualified {
        qualifier: Qualifier,
        day_kind: DayKind,
        month_frequency: u32,
    },
}

/// Yearly patterns always repeat every year.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum YearlyPattern {
    #[serde(rename_all = "camelCase")]
    DayOfMonth { month: u32, day: u32 },
    #[serde(rename_all = "camelCase")]
    Qualified {
        qualifier: Qualifier,
        day_kind: DayKind,
        month: u32,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EndCondition {
    /// No terminator in the descriptor; the implicit instance cap applies
    ImplicitEnd,
    InstanceCount(u32),
    /// Inclusive upper bound for occurrence starts
    ExplicitEndDate(NaiveDateTime),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Qualifier {
    First,
    Second,
    Third,
    Fourth,
    Last,
}

impl Qualifier {
    /// Position within the month's matching days, negative counts from the end
    pub fn set_position(&self) -> i32 {
        match self {
            Self::First => 1,
            Self::Second => 2,
            Self::Third => 3,
            Self::Fourth => 4,
            Self::Last => -1,
        }
    }
}

impl FromStr for Qualifier {
    type Err = InvalidTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "first" => Ok(Self::First),
            "second" => Ok(Self::Second),
            "third" => Ok(Self::Third),
            "fourth" => Ok(Self::Fourth),
            "last" => Ok(Self::Last),
            other => Err(InvalidTokenError::InvalidQualifier(other.to_string())),
        }
    }
}

/// Which days of a month a qualifier counts over
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DayKind {
    Day,
    Weekday,
    WeekendDay,
    Specific(Weekday),
}

impl DayKind {
    pub fn days(&self) -> WeekDays {
        match self {
            Self::Day => WeekDays::new(&ALL_WEEKDAYS),
            Self::Weekday => WeekDays::new(&[
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
            ]),
            Self::WeekendDay => WeekDays::new(&[Weekday::Sat, Weekday::Sun]),
            Self::Specific(day) => WeekDays::new(&[*day]),
        }
    }
}

impl FromStr for DayKind {
    type Err = InvalidTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "day" => Ok(Self::Day),
            "weekday" => Ok(Self::Weekday),
            "weekend_day" => Ok(Self::WeekendDay),
            other => str_to_weekday(other)
                .map(Self::Specific)
                .map_err(|_| InvalidTokenError::InvalidDayKind(other.to_string())),
        }
    }
}

pub(crate) const ALL_WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Set of weekdays, iterated Monday first
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekDays(u8);

impl WeekDays {
    pub fn new(days: &[Weekday]) -> Self {
        let mut set = Self::default();
        for day in days {
            set.insert(*day);
        }
        set
    }

    pub fn insert(&mut self, day: Weekday) {
        self.0 |= 1 << day.num_days_from_monday();
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & (1 << day.num_days_from_monday()) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(&self) -> impl Iterator<Item = Weekday> + '_ {
        ALL_WEEKDAYS.iter().copied().filter(move |day| self.contains(*day))
    }
}

impl Display for WeekDays {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let days = self.iter().map(weekday_to_str).collect::<Vec<_>>();
        write!(f, "{}", days.join(","))
    }
}

pub(crate) fn str_to_weekday(d: &str) -> Result<Weekday, InvalidTokenError> {
    match d.to_lowercase().as_str() {
        "mo" => Ok(Weekday::Mon),
        "tu" => Ok(Weekday::Tue),
        "we" => Ok(Weekday::Wed),
        "th" => Ok(Weekday::Thu),
        "fr" => Ok(Weekday::Fri),
        "sa" => Ok(Weekday::Sat),
        "su" => Ok(Weekday::Sun),
        _ => Err(InvalidTokenError::InvalidWeekdayIdentifier(d.to_string())),
    }
}

/// Two letter code used both by the descriptor attributes and by BYDAY
pub(crate) fn weekday_to_str(wday: Weekday) -> &'static str {
    match wday {
        Weekday::Mon => "mo",
        Weekday::Tue => "tu",
        Weekday::Wed => "we",
        Weekday::Thu => "th",
        Weekday::Fri => "fr",
        Weekday::Sat => "sa",
        Weekday::Sun => "su",
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum InvalidTokenError {
    #[error("Invalid weekday specified: {0}")]
    InvalidWeekdayIdentifier(String),
    #[error("Invalid day kind specified: {0}")]
    InvalidDayKind(String),
    #[error("Invalid week qualifier specified: {0}")]
    InvalidQualifier(String),
}

/// A token inside an already recognized descriptor tag could not be read.
/// This means the producer emitted corrupt data, never an unknown shape.
#[derive(Error, Debug, PartialEq)]
pub enum RecurrenceParseError {
    #[error("Attribute `{attribute}` of <{tag}> is not a valid integer: `{value}`")]
    MalformedInteger {
        tag: &'static str,
        attribute: &'static str,
        value: String,
    },
    #[error("Attribute `{attribute}` of <{tag}> is out of range: {value}")]
    OutOfRange {
        tag: &'static str,
        attribute: &'static str,
        value: u32,
    },
    #[error("<{tag}> does not contain a valid timestamp: `{value}`")]
    MalformedDate { tag: &'static str, value: String },
    #[error("<{tag}> contains an invalid token: {source}")]
    InvalidToken {
        tag: &'static str,
        source: InvalidTokenError,
    },
    #[error("<{tag}> does not select a day kind")]
    MissingDayKind { tag: &'static str },
    #[error("Field `{0}` is required for recurrence exceptions")]
    MissingField(&'static str),
}
