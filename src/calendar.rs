//! Holiday-aware month view.
//!
//! Pure date arithmetic: a Monday-first grid for one month with today and
//! the holidays of a [`HolidayLookup`] marked. The holiday data itself is
//! supplied by the host.

use std::collections::HashMap;

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

pub const MONTH_NAMES: [&str; 12] = [
    "Enero",
    "Febrero",
    "Marzo",
    "Abril",
    "Mayo",
    "Junio",
    "Julio",
    "Agosto",
    "Septiembre",
    "Octubre",
    "Noviembre",
    "Diciembre",
];

pub const WEEKDAY_HEADER: [&str; 7] = ["L", "M", "X", "J", "V", "S", "D"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    pub date: NaiveDate,
    pub name: String,
}

pub trait HolidayLookup {
    fn holiday_name(&self, date: NaiveDate) -> Option<&str>;
}

#[derive(Debug, Clone, Default)]
pub struct HolidayTable {
    by_date: HashMap<NaiveDate, String>,
}

impl HolidayTable {
    pub fn new(holidays: impl IntoIterator<Item = Holiday>) -> Self {
        Self {
            by_date: holidays.into_iter().map(|h| (h.date, h.name)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.by_date.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_date.is_empty()
    }
}

impl HolidayLookup for HolidayTable {
    fn holiday_name(&self, date: NaiveDate) -> Option<&str> {
        self.by_date.get(&date).map(String::as_str)
    }
}

/// How a day is highlighted. Today wins over a holiday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DayKind {
    Today,
    Holiday,
    Regular,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCell {
    pub date: NaiveDate,
    pub day: u32,
    pub kind: DayKind,
    pub holiday: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthGrid {
    pub title: String,
    /// Empty cells before day 1 in a Monday-first week.
    pub leading_blanks: u32,
    pub days: Vec<DayCell>,
}

/// The month currently on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthCursor {
    first: NaiveDate,
}

impl MonthCursor {
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            first: first_of_month(date),
        }
    }

    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|first| Self { first })
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month(&self) -> u32 {
        self.first.month()
    }

    /// Moves by `offset` months, rolling over year boundaries. Out-of-range
    /// moves leave the cursor where it is.
    pub fn change_month(&mut self, offset: i32) {
        let delta = Months::new(offset.unsigned_abs());
        let moved = if offset >= 0 {
            self.first.checked_add_months(delta)
        } else {
            self.first.checked_sub_months(delta)
        };
        if let Some(first) = moved {
            self.first = first;
        }
    }

    pub fn title(&self) -> String {
        format!("{} {}", MONTH_NAMES[self.first.month0() as usize], self.year())
    }

    pub fn grid(&self, today: NaiveDate, holidays: &impl HolidayLookup) -> MonthGrid {
        let leading_blanks = self.first.weekday().num_days_from_monday();
        let days = self
            .first
            .iter_days()
            .take_while(|date| date.month() == self.first.month())
            .map(|date| {
                let holiday = holidays.holiday_name(date).map(str::to_string);
                let kind = if date == today {
                    DayKind::Today
                } else if holiday.is_some() {
                    DayKind::Holiday
                } else {
                    DayKind::Regular
                };
                DayCell {
                    date,
                    day: date.day(),
                    kind,
                    holiday,
                }
            })
            .collect();

        MonthGrid {
            title: self.title(),
            leading_blanks,
            days,
        }
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    MonthCursor::new(year, month).map(|cursor| {
        cursor
            .first
            .iter_days()
            .take_while(|d| d.month() == month)
            .count() as u32
    })
}
