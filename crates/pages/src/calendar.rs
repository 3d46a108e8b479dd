use chrono::{DateTime, NaiveDate, Utc};

use crate::EventSummary;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// One calendar day on the events page.
#[derive(Debug, Clone)]
pub struct EventDay {
    pub date: NaiveDate,
    pub events: Vec<EventSummary>,
}

impl EventDay {
    pub fn date_display(&self) -> String {
        self.date.format("%A, %B %-d, %Y").to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthOption {
    pub name: &'static str,
    pub index: u32,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearOption {
    pub year: i32,
    pub selected: bool,
}

pub fn month_name(index: u32) -> Option<&'static str> {
    MONTH_NAMES.get(index.checked_sub(1)? as usize).copied()
}

/// Groups an already start-time-sorted event list by calendar day,
/// preserving the incoming order of days and of events within a day.
pub fn group_by_day(events: Vec<EventSummary>) -> Vec<EventDay> {
    let mut days: Vec<EventDay> = Vec::new();
    for event in events {
        let date = event.start_time.date_naive();
        match days.last_mut() {
            Some(day) if day.date == date => day.events.push(event),
            _ => days.push(EventDay {
                date,
                events: vec![event],
            }),
        }
    }
    days
}

/// Newest-first picker covering every year with a scheduled meeting.
pub fn year_options(min_year: i32, max_year: i32, selected: i32) -> Vec<YearOption> {
    (min_year..=max_year)
        .rev()
        .map(|year| YearOption {
            year,
            selected: year == selected,
        })
        .collect()
}

pub fn month_options(selected: u32) -> Vec<MonthOption> {
    MONTH_NAMES
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let index = i as u32 + 1;
            MonthOption {
                name,
                index,
                selected: index == selected,
            }
        })
        .collect()
}

/// Half-open UTC window covering one calendar month. `None` when the
/// year/month pair is not a real calendar month.
pub fn month_bounds(year: i32, month: u32) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let end = NaiveDate::from_ymd_opt(next_year, next_month, 1)?;
    Some((
        start.and_time(chrono::NaiveTime::MIN).and_utc(),
        end.and_time(chrono::NaiveTime::MIN).and_utc(),
    ))
}
