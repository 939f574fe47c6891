use chrono::{NaiveDate, NaiveDateTime};
use spcal_domain::RecurrenceInstance;

pub fn dt(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

pub fn format_instances(instances: &[RecurrenceInstance]) -> Vec<String> {
    instances
        .iter()
        .map(|i| {
            format!(
                "{} {} {}",
                i.id,
                i.start.format("%F %R"),
                i.end.format("%R")
            )
        })
        .collect()
}
