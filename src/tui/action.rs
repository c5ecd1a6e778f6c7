use crate::calendar::CalendarSystem;
use crate::client::LoadedDay;
use chrono::NaiveDate;

#[derive(Debug)]
pub enum Action {
    LoadDay {
        calendar: CalendarSystem,
        date: NaiveDate,
    },
    Quit,
}

#[derive(Debug)]
pub enum AppEvent {
    DayLoaded {
        calendar: CalendarSystem,
        date: NaiveDate,
        result: Result<Box<LoadedDay>, String>,
    },
    Status(String),
}
