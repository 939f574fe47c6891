//! Matchers for the SharePoint `RecurrenceData` descriptor.
//!
//! Every matcher is an independent function over the normalized descriptor
//! text (double quoted attributes). A matcher returns `Ok(None)` when its outer
//! shape is absent and an error only when a token inside a recognized tag is
//! corrupt.

use super::{
    str_to_weekday, weekday_to_str, DailyPattern, DayKind, EndCondition, MonthlyPattern, Pattern,
    Qualifier, RecurrenceParseError, WeekDays, WeeklyPattern, YearlyPattern, ALL_WEEKDAYS,
};
use chrono::{NaiveDateTime, Weekday};
use regex_lite::Regex;
use std::ops::RangeInclusive;

lazy_static::lazy_static! {
    static ref DAILY: Regex = Regex::new(r"<daily\b([^>]*?)/?>").unwrap();
    static ref WEEKLY: Regex = Regex::new(r"<weekly\b([^>]*?)/?>").unwrap();
    static ref MONTHLY: Regex = Regex::new(r"<monthly\b([^>]*?)/?>").unwrap();
    static ref MONTHLY_BY_DAY: Regex = Regex::new(r"<monthlyByDay\b([^>]*?)/?>").unwrap();
    static ref YEARLY: Regex = Regex::new(r"<yearly\b([^>]*?)/?>").unwrap();
    static ref YEARLY_BY_DAY: Regex = Regex::new(r"<yearlyByDay\b([^>]*?)/?>").unwrap();
    static ref ATTRIBUTE: Regex = Regex::new(r#"([A-Za-z_]+)\s*=\s*"([^"]*)""#).unwrap();
    static ref FIRST_DAY_OF_WEEK: Regex =
        Regex::new(r"<firstDayOfWeek>\s*([^<]*?)\s*</firstDayOfWeek>").unwrap();
    static ref REPEAT_FOREVER_FALSE: Regex =
        Regex::new(r"(?i)<repeatForever>\s*false\s*</repeatForever>").unwrap();
    static ref REPEAT_INSTANCES: Regex =
        Regex::new(r"<repeatInstances>\s*([^<]*?)\s*</repeatInstances>").unwrap();
    static ref WINDOW_END: Regex = Regex::new(r"<windowEnd>\s*([^<]*?)\s*</windowEnd>").unwrap();
}

type PatternMatcher = fn(&str) -> Result<Option<Pattern>, RecurrenceParseError>;
type EndConditionMatcher = fn(&str) -> Result<Option<EndCondition>, RecurrenceParseError>;

/// Tried in order, first match wins
const PATTERN_MATCHERS: [PatternMatcher; 7] = [
    daily_by_frequency,
    daily_every_weekday,
    weekly_by_days,
    monthly_by_day_of_month,
    monthly_by_qualifier,
    yearly_by_day_of_month,
    yearly_by_qualifier,
];

const END_CONDITION_MATCHERS: [EndConditionMatcher; 3] =
    [implicit_end, instance_count, explicit_end_date];

/// Weeks start on sunday unless the descriptor says otherwise
const DEFAULT_WEEK_START: Weekday = Weekday::Sun;

pub fn match_pattern(descriptor: &str) -> Result<Option<Pattern>, RecurrenceParseError> {
    for matcher in PATTERN_MATCHERS.iter() {
        if let Some(pattern) = matcher(descriptor)? {
            return Ok(Some(pattern));
        }
    }
    Ok(None)
}

pub fn match_end_condition(descriptor: &str) -> Result<Option<EndCondition>, RecurrenceParseError> {
    for matcher in END_CONDITION_MATCHERS.iter() {
        if let Some(end) = matcher(descriptor)? {
            return Ok(Some(end));
        }
    }
    Ok(None)
}

/// A repeat tag and its attributes in document order
struct Tag<'a> {
    name: &'static str,
    attributes: Vec<(&'a str, &'a str)>,
}

impl<'a> Tag<'a> {
    fn find(re: &Regex, name: &'static str, descriptor: &'a str) -> Option<Self> {
        let body = re.captures(descriptor)?.get(1)?.as_str();
        let attributes = ATTRIBUTE
            .captures_iter(body)
            .filter_map(|c| Some((c.get(1)?.as_str(), c.get(2)?.as_str())))
            .collect();
        Some(Self { name, attributes })
    }

    fn attribute(&self, name: &str) -> Option<&'a str> {
        self.attributes
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.trim())
    }

    fn flag(&self, name: &str) -> bool {
        self.attribute(name).map_or(false, is_true)
    }

    fn integer(
        &self,
        attribute: &'static str,
        range: RangeInclusive<u32>,
    ) -> Result<Option<u32>, RecurrenceParseError> {
        self.attribute(attribute)
            .map(|value| parse_integer(self.name, attribute, value, range))
            .transpose()
    }

    /// Repeat intervals are bounded by what an RRULE interval can hold
    fn frequency(&self, attribute: &'static str) -> Result<Option<u32>, RecurrenceParseError> {
        self.integer(attribute, 1..=u32::from(u16::MAX))
    }

    fn qualifier(&self) -> Result<Option<Qualifier>, RecurrenceParseError> {
        self.attribute("weekdayOfMonth")
            .map(|value| {
                value
                    .parse::<Qualifier>()
                    .map_err(|source| RecurrenceParseError::InvalidToken {
                        tag: self.name,
                        source,
                    })
            })
            .transpose()
    }

    /// The first attribute set to TRUE that is not one of `structural` names
    /// the day kind. Anything outside the vocabulary is corrupt.
    fn day_kind(&self, structural: &[&str]) -> Result<DayKind, RecurrenceParseError> {
        let (name, _) = self
            .attributes
            .iter()
            .find(|(name, value)| !structural.contains(name) && is_true(value))
            .ok_or(RecurrenceParseError::MissingDayKind { tag: self.name })?;

        name.parse::<DayKind>()
            .map_err(|source| RecurrenceParseError::InvalidToken {
                tag: self.name,
                source,
            })
    }

    /// Yearly tags only exist with a frequency of exactly one year
    fn is_every_year(&self) -> bool {
        self.attribute("yearFrequency") == Some("1")
    }
}

fn is_true(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

fn parse_integer(
    tag: &'static str,
    attribute: &'static str,
    value: &str,
    range: RangeInclusive<u32>,
) -> Result<u32, RecurrenceParseError> {
    let n = value
        .trim()
        .parse::<u32>()
        .map_err(|_| RecurrenceParseError::MalformedInteger {
            tag,
            attribute,
            value: value.to_string(),
        })?;
    if !range.contains(&n) {
        return Err(RecurrenceParseError::OutOfRange {
            tag,
            attribute,
            value: n,
        });
    }
    Ok(n)
}

/// Reads `2024-03-01T10:00:00Z` style values. The zone designator is dropped,
/// all timestamps live in one reference zone.
pub(crate) fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    value
        .trim()
        .trim_end_matches(|c: char| c == 'Z' || c == 'z')
        .parse::<NaiveDateTime>()
        .ok()
}

fn week_start(descriptor: &str) -> Result<Weekday, RecurrenceParseError> {
    let code = match FIRST_DAY_OF_WEEK
        .captures(descriptor)
        .and_then(|c| c.get(1))
    {
        Some(code) => code.as_str(),
        None => return Ok(DEFAULT_WEEK_START),
    };
    str_to_weekday(code).map_err(|source| RecurrenceParseError::InvalidToken {
        tag: "firstDayOfWeek",
        source,
    })
}

fn daily_by_frequency(descriptor: &str) -> Result<Option<Pattern>, RecurrenceParseError> {
    let tag = match Tag::find(&DAILY, "daily", descriptor) {
        Some(tag) => tag,
        None => return Ok(None),
    };
    Ok(tag
        .frequency("dayFrequency")?
        .map(|n| Pattern::Daily(DailyPattern::EveryNDays(n))))
}

fn daily_every_weekday(descriptor: &str) -> Result<Option<Pattern>, RecurrenceParseError> {
    Ok(Tag::find(&DAILY, "daily", descriptor)
        .filter(|tag| tag.flag("weekday"))
        .map(|_| Pattern::Daily(DailyPattern::EveryWeekday)))
}

fn weekly_by_days(descriptor: &str) -> Result<Option<Pattern>, RecurrenceParseError> {
    let tag = match Tag::find(&WEEKLY, "weekly", descriptor) {
        Some(tag) => tag,
        None => return Ok(None),
    };
    let week_frequency = match tag.frequency("weekFrequency")? {
        Some(n) => n,
        None => return Ok(None),
    };

    let mut days = WeekDays::default();
    for day in ALL_WEEKDAYS.iter() {
        if tag.flag(weekday_to_str(*day)) {
            days.insert(*day);
        }
    }
    if days.is_empty() {
        return Ok(None);
    }

    Ok(Some(Pattern::Weekly(WeeklyPattern {
        week_frequency,
        days,
        week_start: week_start(descriptor)?,
    })))
}

fn monthly_by_day_of_month(descriptor: &str) -> Result<Option<Pattern>, RecurrenceParseError> {
    let tag = match Tag::find(&MONTHLY, "monthly", descriptor) {
        Some(tag) => tag,
        None => return Ok(None),
    };
    match (tag.integer("day", 1..=31)?, tag.frequency("monthFrequency")?) {
        (Some(day), Some(month_frequency)) => Ok(Some(Pattern::Monthly(
            MonthlyPattern::DayOfMonth {
                day,
                month_frequency,
            },
        ))),
        _ => Ok(None),
    }
}

fn monthly_by_qualifier(descriptor: &str) -> Result<Option<Pattern>, RecurrenceParseError> {
    let tag = match Tag::find(&MONTHLY_BY_DAY, "monthlyByDay", descriptor) {
        Some(tag) => tag,
        None => return Ok(None),
    };
    let (qualifier, month_frequency) = match (tag.qualifier()?, tag.frequency("monthFrequency")?) {
        (Some(qualifier), Some(month_frequency)) => (qualifier, month_frequency),
        _ => return Ok(None),
    };
    let day_kind = tag.day_kind(&["weekdayOfMonth", "monthFrequency"])?;

    Ok(Some(Pattern::Monthly(MonthlyPattern::Qualified {
        qualifier,
        day_kind,
        month_frequency,
    })))
}

fn yearly_by_day_of_month(descriptor: &str) -> Result<Option<Pattern>, RecurrenceParseError> {
    let tag = match Tag::find(&YEARLY, "yearly", descriptor) {
        Some(tag) if tag.is_every_year() => tag,
        _ => return Ok(None),
    };
    match (tag.integer("month", 1..=12)?, tag.integer("day", 1..=31)?) {
        (Some(month), Some(day)) => Ok(Some(Pattern::Yearly(YearlyPattern::DayOfMonth {
            month,
            day,
        }))),
        _ => Ok(None),
    }
}

fn yearly_by_qualifier(descriptor: &str) -> Result<Option<Pattern>, RecurrenceParseError> {
    let tag = match Tag::find(&YEARLY_BY_DAY, "yearlyByDay", descriptor) {
        Some(tag) if tag.is_every_year() => tag,
        _ => return Ok(None),
    };
    let (qualifier, month) = match (tag.qualifier()?, tag.integer("month", 1..=12)?) {
        (Some(qualifier), Some(month)) => (qualifier, month),
        _ => return Ok(None),
    };
    let day_kind = tag.day_kind(&["yearFrequency", "weekdayOfMonth", "month"])?;

    Ok(Some(Pattern::Yearly(YearlyPattern::Qualified {
        qualifier,
        day_kind,
        month,
    })))
}

fn implicit_end(descriptor: &str) -> Result<Option<EndCondition>, RecurrenceParseError> {
    Ok(REPEAT_FOREVER_FALSE
        .is_match(descriptor)
        .then(|| EndCondition::ImplicitEnd))
}

fn instance_count(descriptor: &str) -> Result<Option<EndCondition>, RecurrenceParseError> {
    REPEAT_INSTANCES
        .captures(descriptor)
        .and_then(|c| c.get(1))
        .map(|value| {
            parse_integer("repeatInstances", "value", value.as_str(), 1..=u32::MAX)
                .map(EndCondition::InstanceCount)
        })
        .transpose()
}

fn explicit_end_date(descriptor: &str) -> Result<Option<EndCondition>, RecurrenceParseError> {
    WINDOW_END
        .captures(descriptor)
        .and_then(|c| c.get(1))
        .map(|value| {
            parse_timestamp(value.as_str())
                .map(EndCondition::ExplicitEndDate)
                .ok_or_else(|| RecurrenceParseError::MalformedDate {
                    tag: "windowEnd",
                    value: value.as_str().to_string(),
                })
        })
        .transpose()
}
