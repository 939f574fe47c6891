mod helpers;

use helpers::setup::{create_appointment, spawn_context};
use helpers::utils::{dt, format_instances};
use serde_json::json;
use spcal::{
    execute, get_appointment_instances::GetAppointmentInstancesUseCase,
    get_calendar_instances::GetCalendarInstancesUseCase,
};
use spcal_domain::{Recurrence, TimeSpan, ID};

fn series_fields(id: i64, start: &str, end: &str, duration: i64, descriptor: &str) -> serde_json::Value {
    json!({
        "ID": id,
        "EventDate": start,
        "EndDate": end,
        "Duration": duration.to_string(),
        "fAllDayEvent": "0",
        "fRecurrence": true,
        "EventType": 1,
        "RecurrenceData": descriptor,
    })
}

fn exception_fields(
    id: i64,
    event_type: i32,
    series_id: i64,
    occurrence: &str,
    start: &str,
    end: &str,
) -> serde_json::Value {
    json!({
        "ID": id,
        "EventDate": start,
        "EndDate": end,
        "Duration": "3600",
        "fRecurrence": true,
        "EventType": event_type,
        "MasterSeriesItemID": series_id,
        "RecurrenceID": occurrence,
    })
}

#[test_log::test]
fn expands_daily_series_from_fields() {
    let ctx = spawn_context();
    create_appointment(
        &ctx,
        series_fields(
            1,
            "2024-01-01T09:00:00",
            "2026-09-25T10:00:00",
            3600,
            r#"<recurrence><rule><firstDayOfWeek>su</firstDayOfWeek><repeat><daily dayFrequency="3" /></repeat><repeatForever>FALSE</repeatForever></rule></recurrence>"#,
        ),
    );

    let res = execute(
        GetAppointmentInstancesUseCase {
            appointment_id: ID::new(1),
            timespan: None,
        },
        &ctx,
    )
    .unwrap();
    assert_eq!(res.instances.len(), 999);
    assert_eq!(
        format_instances(&res.instances[..3]),
        vec![
            "1 2024-01-01 09:00 10:00",
            "1 2024-01-04 09:00 10:00",
            "1 2024-01-07 09:00 10:00",
        ]
    );
}

#[test_log::test]
fn applies_deleted_and_modified_occurrences() {
    let ctx = spawn_context();
    create_appointment(
        &ctx,
        series_fields(
            42,
            "2024-02-08T09:00:00",
            "2024-02-12T10:00:00",
            3600,
            "<recurrence><rule><firstDayOfWeek>su</firstDayOfWeek><repeat><daily dayFrequency='1' /></repeat><windowEnd>2024-02-12T10:00:00Z</windowEnd></rule></recurrence>",
        ),
    );
    let deleted = create_appointment(
        &ctx,
        exception_fields(
            99,
            3,
            42,
            "2024-02-10T09:00:00",
            "2024-02-10T09:00:00",
            "2024-02-10T10:00:00",
        ),
    );
    assert_eq!(
        deleted.recurrence,
        Recurrence::DeletedInstance {
            series_id: ID::new(42),
            occurrence: dt(2024, 2, 10, 9, 0)
        }
    );
    create_appointment(
        &ctx,
        exception_fields(
            100,
            4,
            42,
            "2024-02-09T09:00:00",
            "2024-02-11T14:00:00",
            "2024-02-11T16:30:00",
        ),
    );

    let res = execute(
        GetAppointmentInstancesUseCase {
            appointment_id: ID::new(42),
            timespan: None,
        },
        &ctx,
    )
    .unwrap();
    assert_eq!(
        format_instances(&res.instances),
        vec![
            "42 2024-02-08 09:00 10:00",
            "42 2024-02-11 09:00 10:00",
            "42 2024-02-11 14:00 16:30",
            "42 2024-02-12 09:00 10:00",
        ]
    );
}

#[test_log::test]
fn weekly_series_repeats_in_two_week_blocks() {
    let ctx = spawn_context();
    // 2024-01-01 is a monday
    create_appointment(
        &ctx,
        series_fields(
            5,
            "2024-01-01T09:00:00",
            "2024-12-31T10:00:00",
            3600,
            r#"<recurrence><rule><firstDayOfWeek>su</firstDayOfWeek><repeat><weekly mo="TRUE" we="TRUE" weekFrequency="2" /></repeat><repeatInstances>4</repeatInstances></rule></recurrence>"#,
        ),
    );

    let res = execute(
        GetAppointmentInstancesUseCase {
            appointment_id: ID::new(5),
            timespan: None,
        },
        &ctx,
    )
    .unwrap();
    let starts = res.instances.iter().map(|i| i.start).collect::<Vec<_>>();
    assert_eq!(
        starts,
        vec![
            dt(2024, 1, 1, 9, 0),
            dt(2024, 1, 3, 9, 0),
            dt(2024, 1, 15, 9, 0),
            dt(2024, 1, 17, 9, 0),
        ]
    );
}

#[test_log::test]
fn all_day_series_ending_at_midnight_keeps_last_day() {
    let ctx = spawn_context();
    let appointment = create_appointment(
        &ctx,
        json!({
            "ID": 8,
            "EventDate": "2024-03-04T00:00:00",
            "EndDate": "2024-03-08T23:59:00",
            "Duration": "86340",
            "fAllDayEvent": "1",
            "fRecurrence": true,
            "EventType": 1,
            "RecurrenceData": "<recurrence><rule><firstDayOfWeek>su</firstDayOfWeek><repeat><daily weekday='TRUE' /></repeat><windowEnd>2024-03-09T00:00:00Z</windowEnd></rule></recurrence>",
        }),
    );
    assert!(appointment.all_day);

    let res = execute(
        GetAppointmentInstancesUseCase {
            appointment_id: ID::new(8),
            timespan: None,
        },
        &ctx,
    )
    .unwrap();
    assert_eq!(
        format_instances(&res.instances),
        vec![
            "8 2024-03-04 00:00 23:59",
            "8 2024-03-05 00:00 23:59",
            "8 2024-03-06 00:00 23:59",
            "8 2024-03-07 00:00 23:59",
            "8 2024-03-08 00:00 23:59",
        ]
    );
}

#[test_log::test]
fn unknown_descriptor_expands_to_single_instance() {
    let ctx = spawn_context();
    create_appointment(
        &ctx,
        series_fields(
            9,
            "2024-05-01T12:00:00",
            "2025-05-01T12:30:00",
            1800,
            r#"<recurrence><rule><repeat><yearly yearFrequency="2" month="5" day="1" /></repeat><repeatForever>FALSE</repeatForever></rule></recurrence>"#,
        ),
    );

    let res = execute(
        GetAppointmentInstancesUseCase {
            appointment_id: ID::new(9),
            timespan: None,
        },
        &ctx,
    )
    .unwrap();
    assert_eq!(res.appointment.recurrence, Recurrence::UnknownRecurrence);
    assert_eq!(format_instances(&res.instances), vec!["9 2024-05-01 12:00 12:30"]);
}

#[test_log::test]
fn restricts_instances_to_timespan() {
    let ctx = spawn_context();
    create_appointment(
        &ctx,
        series_fields(
            3,
            "2024-01-16T09:00:00",
            "2024-12-17T10:00:00",
            3600,
            r#"<recurrence><rule><firstDayOfWeek>su</firstDayOfWeek><repeat><monthlyByDay tu="TRUE" weekdayOfMonth="third" monthFrequency="1" /></repeat><repeatInstances>12</repeatInstances></rule></recurrence>"#,
        ),
    );

    let res = execute(
        GetAppointmentInstancesUseCase {
            appointment_id: ID::new(3),
            timespan: Some(TimeSpan::create(dt(2024, 3, 1, 0, 0), dt(2024, 5, 31, 0, 0)).unwrap()),
        },
        &ctx,
    )
    .unwrap();
    assert_eq!(
        format_instances(&res.instances),
        vec![
            "3 2024-03-19 09:00 10:00",
            "3 2024-04-16 09:00 10:00",
            "3 2024-05-21 09:00 10:00",
        ]
    );
}

#[test_log::test]
fn expands_whole_calendar() {
    let ctx = spawn_context();
    create_appointment(
        &ctx,
        series_fields(
            1,
            "2024-01-01T09:00:00",
            "2024-01-03T10:00:00",
            3600,
            r#"<recurrence><rule><repeat><daily dayFrequency="1" /></repeat><repeatInstances>3</repeatInstances></rule></recurrence>"#,
        ),
    );
    create_appointment(
        &ctx,
        json!({
            "ID": 2,
            "EventDate": "2024-01-02T08:00:00",
            "EndDate": "2024-01-02T08:15:00",
            "Duration": "900",
        }),
    );
    create_appointment(
        &ctx,
        exception_fields(
            3,
            3,
            1,
            "2024-01-03T09:00:00",
            "2024-01-03T09:00:00",
            "2024-01-03T10:00:00",
        ),
    );
    // Points at a series that does not exist
    create_appointment(
        &ctx,
        exception_fields(
            4,
            4,
            77,
            "2024-01-02T09:00:00",
            "2024-01-02T11:00:00",
            "2024-01-02T12:00:00",
        ),
    );

    let res = execute(GetCalendarInstancesUseCase { timespan: None }, &ctx).unwrap();
    assert_eq!(
        format_instances(&res.instances),
        vec![
            "1 2024-01-01 09:00 10:00",
            "2 2024-01-02 08:00 08:15",
            "1 2024-01-02 09:00 10:00",
        ]
    );

    let res = execute(
        GetCalendarInstancesUseCase {
            timespan: Some(TimeSpan::create(dt(2024, 1, 2, 8, 30), dt(2024, 1, 2, 23, 0)).unwrap()),
        },
        &ctx,
    )
    .unwrap();
    assert_eq!(format_instances(&res.instances), vec!["1 2024-01-02 09:00 10:00"]);
}
