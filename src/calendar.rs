// File: ./src/calendar.rs
// Calendar system selection, displayed month and the month grid
use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarSystem {
    /// Old calendar.
    #[default]
    Julian,
    Gregorian,
}

impl CalendarSystem {
    /// Path segment used by the calendar provider.
    pub fn as_path(&self) -> &'static str {
        match self {
            CalendarSystem::Julian => "julian",
            CalendarSystem::Gregorian => "gregorian",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CalendarSystem::Julian => "Julian calendar date:",
            CalendarSystem::Gregorian => "Gregorian calendar date:",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            CalendarSystem::Julian => CalendarSystem::Gregorian,
            CalendarSystem::Gregorian => CalendarSystem::Julian,
        }
    }
}

impl fmt::Display for CalendarSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_path())
    }
}

impl std::str::FromStr for CalendarSystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "julian" | "old" => Ok(CalendarSystem::Julian),
            "gregorian" | "new" | "revised" => Ok(CalendarSystem::Gregorian),
            other => Err(format!("unknown calendar system '{}'", other)),
        }
    }
}

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

/// English month name for 1..=12, empty otherwise.
pub fn month_name(month: u32) -> &'static str {
    match month {
        1..=12 => MONTH_NAMES[(month - 1) as usize],
        _ => "",
    }
}

/// "Tuesday, January 7, 2025"
pub fn civil_label(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn days_in_month(first: NaiveDate) -> u32 {
    first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .map(|last| last.day())
        .unwrap_or(28)
}

/// Sunday-first weeks of a month. Empty cells are `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub weeks: Vec<[Option<u32>; 7]>,
    selected: Option<u32>,
}

impl MonthGrid {
    pub const MAX_WEEKS: usize = 6;

    pub fn new(month_start: NaiveDate, selected: NaiveDate) -> Self {
        let first = first_of_month(month_start);
        let total = days_in_month(first);
        let lead = first.weekday().num_days_from_sunday() as usize;

        let mut weeks = Vec::new();
        let mut day = 1;
        for week in 0..Self::MAX_WEEKS {
            let mut row = [None; 7];
            for (dow, cell) in row.iter_mut().enumerate() {
                if (week == 0 && dow < lead) || day > total {
                    continue;
                }
                *cell = Some(day);
                day += 1;
            }
            weeks.push(row);
            if day > total {
                break;
            }
        }

        let selected = (selected.year() == first.year() && selected.month() == first.month())
            .then(|| selected.day());

        Self {
            year: first.year(),
            month: first.month(),
            weeks,
            selected,
        }
    }

    pub fn is_selected(&self, day: u32) -> bool {
        self.selected == Some(day)
    }

    pub fn days(&self) -> u32 {
        self.weeks.iter().flatten().flatten().count() as u32
    }
}

/// Everything the day view depends on besides provider data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewState {
    pub calendar: CalendarSystem,
    displayed_month: NaiveDate,
    selected: NaiveDate,
}

impl ViewState {
    pub fn new(calendar: CalendarSystem, today: NaiveDate) -> Self {
        Self {
            calendar,
            displayed_month: first_of_month(today),
            selected: today,
        }
    }

    pub fn selected(&self) -> NaiveDate {
        self.selected
    }

    pub fn displayed_month(&self) -> NaiveDate {
        self.displayed_month
    }

    /// Changes the month shown in the picker, not the selected day.
    pub fn previous_month(&mut self) {
        if let Some(m) = self.displayed_month.checked_sub_months(Months::new(1)) {
            self.displayed_month = m;
        }
    }

    pub fn next_month(&mut self) {
        if let Some(m) = self.displayed_month.checked_add_months(Months::new(1)) {
            self.displayed_month = m;
        }
    }

    pub fn select(&mut self, date: NaiveDate) {
        self.selected = date;
        self.displayed_month = first_of_month(date);
    }

    /// Shows the month containing `date` without selecting it.
    pub fn show_month_of(&mut self, date: NaiveDate) {
        self.displayed_month = first_of_month(date);
    }

    /// Selects a day of the displayed month. Out-of-range days are ignored.
    pub fn select_day(&mut self, day: u32) -> bool {
        match self.displayed_month.with_day(day) {
            Some(date) => {
                self.selected = date;
                true
            }
            None => false,
        }
    }

    /// Returns whether the system actually changed.
    pub fn set_calendar(&mut self, calendar: CalendarSystem) -> bool {
        if self.calendar == calendar {
            return false;
        }
        self.calendar = calendar;
        true
    }

    pub fn month_label(&self) -> String {
        format!(
            "{} {}",
            month_name(self.displayed_month.month()),
            self.displayed_month.year()
        )
    }

    pub fn month_grid(&self) -> MonthGrid {
        MonthGrid::new(self.displayed_month, self.selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn grid_starts_on_sunday() {
        // 1 January 2025 is a Wednesday.
        let grid = MonthGrid::new(date(2025, 1, 1), date(2025, 1, 7));
        assert_eq!(grid.weeks[0], [None, None, None, Some(1), Some(2), Some(3), Some(4)]);
        assert_eq!(grid.weeks.len(), 5);
        assert_eq!(grid.weeks[4], [Some(26), Some(27), Some(28), Some(29), Some(30), Some(31), None]);
        assert_eq!(grid.days(), 31);
        assert!(grid.is_selected(7));
        assert!(!grid.is_selected(8));
    }

    #[test]
    fn grid_stops_after_last_row() {
        // February 2015 fills exactly four rows.
        let grid = MonthGrid::new(date(2015, 2, 1), date(2020, 1, 1));
        assert_eq!(grid.weeks.len(), 4);
        assert!(!grid.is_selected(1));
    }

    #[test]
    fn grid_uses_six_rows_when_needed() {
        // August 2025 starts on Friday with 31 days.
        let grid = MonthGrid::new(date(2025, 8, 1), date(2025, 8, 1));
        assert_eq!(grid.weeks.len(), 6);
        assert_eq!(grid.weeks[5][0], Some(31));
    }

    #[test]
    fn month_navigation_leaves_selection() {
        let mut state = ViewState::new(CalendarSystem::Julian, date(2025, 1, 31));
        state.next_month();
        assert_eq!(state.month_label(), "February 2025");
        assert_eq!(state.selected(), date(2025, 1, 31));
        state.previous_month();
        state.previous_month();
        assert_eq!(state.month_label(), "December 2024");
        assert!(state.select_day(25));
        assert_eq!(state.selected(), date(2024, 12, 25));
        assert!(!state.select_day(32));
    }

    #[test]
    fn calendar_change_is_reported() {
        let mut state = ViewState::new(CalendarSystem::Julian, date(2025, 1, 1));
        assert!(!state.set_calendar(CalendarSystem::Julian));
        assert!(state.set_calendar(CalendarSystem::Gregorian));
        assert_eq!(state.calendar.as_path(), "gregorian");
    }

    #[test]
    fn labels() {
        assert_eq!(civil_label(date(2025, 1, 7)), "Tuesday, January 7, 2025");
        assert_eq!(month_name(0), "");
        assert_eq!(month_name(13), "");
        assert_eq!("Gregorian".parse::<CalendarSystem>(), Ok(CalendarSystem::Gregorian));
    }
}
