use crate::{
    appointment::Appointment,
    event_instance::RecurrenceInstance,
    recurrence::{
        DailyPattern, EndCondition, MonthlyPattern, Recurrence, WeekDays, WeeklyPattern,
        YearlyPattern,
    },
    shared::entity::ID,
    timespan::TimeSpan,
};
use chrono::{Duration, NaiveDateTime, TimeZone, Timelike};
use itertools::Itertools;
use rrule::{RRule, RRuleSet, Tz, Unvalidated};
use thiserror::Error;
use tracing::{debug, warn};

/// Bounds applied while generating occurrences
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpansionSettings {
    /// Number of occurrences generated for a series without an end marker
    pub implicit_instance_cap: u32,
    /// Hard ceiling on generated occurrences for any single series
    pub max_instances: u16,
}

impl Default for ExpansionSettings {
    fn default() -> Self {
        Self {
            implicit_instance_cap: 999,
            max_instances: u16::MAX,
        }
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum ExpansionError {
    #[error("Recurrence rule `{rule}` was rejected: {message}")]
    InvalidRule { rule: String, message: String },
    #[error("Instance of appointment {id} starting at {start} ends beyond the calendar")]
    InstanceOutOfRange { id: ID, start: NaiveDateTime },
}

impl Appointment {
    /// Expands the appointment into its ordered instances. `exceptions` may
    /// contain rows of other series, only those pointing at this appointment
    /// are applied.
    pub fn expand(
        &self,
        exceptions: &[Appointment],
        settings: &ExpansionSettings,
    ) -> Result<Vec<RecurrenceInstance>, ExpansionError> {
        let occurrences = match &self.recurrence {
            Recurrence::NoRecurrence | Recurrence::UnknownRecurrence => {
                return Ok(vec![self.single_instance()])
            }
            Recurrence::DeletedInstance { .. } => return Ok(vec![]),
            Recurrence::ModifiedInstance { .. } => return Ok(vec![self.single_instance()]),
            Recurrence::Daily(_, end)
            | Recurrence::Weekly(_, end)
            | Recurrence::Monthly(_, end)
            | Recurrence::Yearly(_, end) => self.occurrences(end, settings)?,
        };

        let mut instances = occurrences
            .into_iter()
            .map(|start| {
                let end = self
                    .duration()
                    .and_then(|duration| start.checked_add_signed(duration))
                    .ok_or(ExpansionError::InstanceOutOfRange { id: self.id, start })?;
                Ok(RecurrenceInstance {
                    id: self.id,
                    start,
                    end,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        for exception in exceptions {
            if exception.recurrence.series_id() != Some(self.id) {
                continue;
            }
            self.apply_exception(&mut instances, exception);
        }

        instances.sort_by_key(|instance| instance.start);
        Ok(instances)
    }

    /// Instances overlapping the given timespan
    pub fn expand_in(
        &self,
        timespan: &TimeSpan,
        exceptions: &[Appointment],
        settings: &ExpansionSettings,
    ) -> Result<Vec<RecurrenceInstance>, ExpansionError> {
        let mut instances = self.expand(exceptions, settings)?;
        instances.retain(|instance| timespan.overlaps(instance.start, instance.end));
        Ok(instances)
    }

    fn single_instance(&self) -> RecurrenceInstance {
        RecurrenceInstance {
            id: self.id,
            start: self.start,
            end: self.end,
        }
    }

    fn apply_exception(&self, instances: &mut Vec<RecurrenceInstance>, exception: &Appointment) {
        let (occurrence, replacement) = match &exception.recurrence {
            Recurrence::DeletedInstance { occurrence, .. } => (occurrence, None),
            Recurrence::ModifiedInstance { occurrence, .. } => (
                occurrence,
                Some(RecurrenceInstance {
                    id: self.id,
                    start: exception.start,
                    end: exception.end,
                }),
            ),
            _ => return,
        };

        match instances.iter().position(|i| i.start == *occurrence) {
            Some(pos) => {
                instances.remove(pos);
                if let Some(replacement) = replacement {
                    instances.push(replacement);
                }
            }
            None => debug!(
                "Exception {} of series {} does not match any occurrence at {}",
                exception.id, self.id, occurrence
            ),
        }
    }

    /// Ascending occurrence starts of a recurring appointment, bounded by `end`
    fn occurrences(
        &self,
        end: &EndCondition,
        settings: &ExpansionSettings,
    ) -> Result<Vec<NaiveDateTime>, ExpansionError> {
        let limit = settings.max_instances;
        let bound = match end {
            EndCondition::ImplicitEnd => {
                Bound::Count(settings.implicit_instance_cap.min(u32::from(limit)))
            }
            EndCondition::InstanceCount(n) => {
                if *n > u32::from(limit) {
                    warn!(
                        "Appointment {} asks for {} instances, only {} will be generated",
                        self.id, n, limit
                    );
                }
                Bound::Count((*n).min(u32::from(limit)))
            }
            EndCondition::ExplicitEndDate(until) => {
                if *until < self.start {
                    return Ok(vec![]);
                }
                Bound::Until(*until)
            }
        };
        if let Bound::Count(0) = bound {
            return Ok(vec![]);
        }

        let rule = match rule_body(&self.recurrence) {
            Some(body) => format!("{};{}", body, bound.to_rule_part()),
            None => return Ok(vec![]),
        };

        // Occurrences are generated at whole seconds and shifted back afterwards
        let fraction = Duration::nanoseconds(i64::from(self.start.nanosecond()));
        let rrule_set = build_rrule_set(&rule, self.start - fraction)?;

        let result = rrule_set.all(limit);
        if let (Bound::Until(until), true) = (bound, result.limited) {
            warn!(
                "Appointment {} has more than {} instances before {}, the rest are dropped",
                self.id, limit, until
            );
        }

        let occurrences = result
            .dates
            .iter()
            .map(|date| date.naive_utc() + fraction)
            .filter(|start| match bound {
                Bound::Until(until) => *start <= until,
                Bound::Count(_) => true,
            })
            .collect();
        Ok(occurrences)
    }
}

/// Expands every appointment of a calendar, applying exception rows to the
/// series they point at. Exception rows of unknown series are dropped.
pub fn expand_series(
    appointments: &[Appointment],
    settings: &ExpansionSettings,
) -> Result<Vec<RecurrenceInstance>, ExpansionError> {
    let (exceptions, bases): (Vec<&Appointment>, Vec<&Appointment>) = appointments
        .iter()
        .partition(|appointment| appointment.recurrence.is_exception());

    let mut exceptions_by_series = exceptions
        .into_iter()
        .filter_map(|e| e.recurrence.series_id().map(|series_id| (series_id, e.clone())))
        .into_group_map();

    let mut instances = Vec::new();
    for base in bases {
        let exceptions = exceptions_by_series.remove(&base.id).unwrap_or_default();
        instances.extend(base.expand(&exceptions, settings)?);
    }

    for (series_id, stale) in exceptions_by_series {
        debug!(
            "Dropping {} exceptions of unknown series {}",
            stale.len(),
            series_id
        );
    }

    instances.sort_by_key(|instance| (instance.start, instance.id));
    Ok(instances)
}

#[derive(Debug, Clone, Copy)]
enum Bound {
    Count(u32),
    Until(NaiveDateTime),
}

impl Bound {
    fn to_rule_part(self) -> String {
        match self {
            Self::Count(n) => format!("COUNT={}", n),
            Self::Until(until) => format!("UNTIL={}", until.format("%Y%m%dT%H%M%SZ")),
        }
    }
}

fn build_rrule_set(rule: &str, start: NaiveDateTime) -> Result<RRuleSet, ExpansionError> {
    let invalid = |message: String| ExpansionError::InvalidRule {
        rule: rule.to_string(),
        message,
    };
    let rrule = rule
        .parse::<RRule<Unvalidated>>()
        .map_err(|e| invalid(e.to_string()))?;
    rrule
        .build(Tz::UTC.from_utc_datetime(&start))
        .map_err(|e| invalid(e.to_string()))
}

/// RRULE parts describing the pattern, without the end condition
fn rule_body(recurrence: &Recurrence) -> Option<String> {
    let body = match recurrence {
        Recurrence::Daily(DailyPattern::EveryNDays(n), _) => format!("FREQ=DAILY;INTERVAL={}", n),
        Recurrence::Daily(DailyPattern::EveryWeekday, _) => {
            "FREQ=DAILY;BYDAY=MO,TU,WE,TH,FR".to_string()
        }
        Recurrence::Weekly(
            WeeklyPattern {
                week_frequency,
                days,
                week_start,
            },
            _,
        ) => format!(
            "FREQ=WEEKLY;INTERVAL={};BYDAY={};WKST={}",
            week_frequency,
            by_day(days),
            by_day(&WeekDays::new(&[*week_start]))
        ),
        Recurrence::Monthly(
            MonthlyPattern::DayOfMonth {
                day,
                month_frequency,
            },
            _,
        ) => format!("FREQ=MONTHLY;INTERVAL={};BYMONTHDAY={}", month_frequency, day),
        Recurrence::Monthly(
            MonthlyPattern::Qualified {
                qualifier,
                day_kind,
                month_frequency,
            },
            _,
        ) => format!(
            "FREQ=MONTHLY;INTERVAL={};BYDAY={};BYSETPOS={}",
            month_frequency,
            by_day(&day_kind.days()),
            qualifier.set_position()
        ),
        Recurrence::Yearly(YearlyPattern::DayOfMonth { month, day }, _) => {
            format!("FREQ=YEARLY;BYMONTH={};BYMONTHDAY={}", month, day)
        }
        Recurrence::Yearly(
            YearlyPattern::Qualified {
                qualifier,
                day_kind,
                month,
            },
            _,
        ) => format!(
            "FREQ=YEARLY;BYMONTH={};BYDAY={};BYSETPOS={}",
            month,
            by_day(&day_kind.days()),
            qualifier.set_position()
        ),
        _ => return None,
    };
    Some(body)
}

fn by_day(days: &WeekDays) -> String {
    days.to_string().to_uppercase()
}
