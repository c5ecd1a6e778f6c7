use crate::calendar::{CalendarSystem, ViewState};
use crate::hymns::HymnPlayer;
use crate::model::{FoodCategory, PrayerBook};
use crate::presenter::{DayView, NO_READINGS};
use chrono::{Datelike, Duration, NaiveDate};
use ratatui::widgets::ListState;

pub const LOAD_ERROR: &str = "Could not load the Orthodox calendar information at this time.";

#[derive(PartialEq, Clone, Copy, Debug)]
pub enum Focus {
    Calendar,
    Day,
}

#[derive(PartialEq, Clone, Copy, Debug)]
pub enum Page {
    Day,
    Prayers,
}

#[derive(PartialEq, Clone, Copy, Debug)]
pub enum EntryKind {
    Heading,
    Card,
}

/// One row of the scrollable right-hand pane.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub kind: EntryKind,
    pub title: String,
    pub subtitle: Option<String>,
    pub detail: Option<String>,
    pub expanded: bool,
}

impl Entry {
    fn heading(title: &str) -> Self {
        Self {
            kind: EntryKind::Heading,
            title: title.to_string(),
            subtitle: None,
            detail: None,
            expanded: false,
        }
    }

    fn card(title: &str, subtitle: Option<String>, detail: Option<String>) -> Self {
        Self {
            kind: EntryKind::Card,
            title: title.to_string(),
            subtitle,
            detail,
            expanded: false,
        }
    }

    pub fn toggle_label(&self) -> &'static str {
        match (self.detail.is_some(), self.expanded) {
            (false, _) => "",
            (true, true) => "Hide",
            (true, false) => "Learn More",
        }
    }
}

pub struct AppState {
    pub view: ViewState,
    pub cursor: NaiveDate,
    pub today: NaiveDate,
    pub day: Option<DayView>,
    pub entries: Vec<Entry>,
    pub list_state: ListState,
    pub focus: Focus,
    pub page: Page,
    pub message: String,
    pub loading: bool,
    pub prayers: PrayerBook,
    pub hymns: HymnPlayer,
}

impl AppState {
    pub fn new(calendar: CalendarSystem, today: NaiveDate, hymns: HymnPlayer) -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));
        Self {
            view: ViewState::new(calendar, today),
            cursor: today,
            today,
            day: None,
            entries: vec![],
            list_state,
            focus: Focus::Calendar,
            page: Page::Day,
            message: "Loading...".to_string(),
            loading: true,
            prayers: PrayerBook::bundled(),
            hymns,
        }
    }

    // --- Calendar navigation ---

    /// Moves the grid cursor; the displayed month follows it.
    pub fn move_cursor(&mut self, days: i64) {
        if let Some(next) = self.cursor.checked_add_signed(Duration::days(days)) {
            self.cursor = next;
            self.view.show_month_of(next);
        }
    }

    pub fn previous_month(&mut self) {
        self.view.previous_month();
        self.clamp_cursor_to_month();
    }

    pub fn next_month(&mut self) {
        self.view.next_month();
        self.clamp_cursor_to_month();
    }

    fn clamp_cursor_to_month(&mut self) {
        let month = self.view.displayed_month();
        let grid = self.view.month_grid();
        let day = self.cursor.day().min(grid.days());
        self.cursor = month.with_day(day).unwrap_or(month);
    }

    /// Selects the day under the cursor. Returns whether anything changed.
    pub fn select_cursor(&mut self) -> bool {
        if self.view.selected() == self.cursor {
            return false;
        }
        self.view.select(self.cursor);
        true
    }

    pub fn go_today(&mut self) -> bool {
        self.cursor = self.today;
        self.select_cursor()
    }

    pub fn toggle_calendar(&mut self) -> CalendarSystem {
        let next = self.view.calendar.toggled();
        self.view.set_calendar(next);
        next
    }

    /// Whether a loaded reply still matches what the user is looking at.
    pub fn is_current(&self, calendar: CalendarSystem, date: NaiveDate) -> bool {
        self.view.calendar == calendar && self.view.selected() == date
    }

    // --- Day data ---

    pub fn begin_loading(&mut self) {
        self.loading = true;
        self.message = format!(
            "Loading {} ({} calendar)...",
            self.view.selected().format("%Y-%m-%d"),
            self.view.calendar
        );
    }

    pub fn set_day(&mut self, view: DayView, warning: Option<String>) {
        self.day = Some(view);
        self.loading = false;
        self.message = warning.unwrap_or_else(|| "Ready.".to_string());
        if self.page == Page::Day {
            self.rebuild_entries();
        }
    }

    pub fn set_error(&mut self, error: &str) {
        self.day = None;
        self.loading = false;
        self.message = format!("Error: {}", error);
        if self.page == Page::Day {
            self.rebuild_entries();
        }
    }

    pub fn toggle_page(&mut self) {
        self.page = match self.page {
            Page::Day => Page::Prayers,
            Page::Prayers => Page::Day,
        };
        self.rebuild_entries();
    }

    pub fn rebuild_entries(&mut self) {
        self.entries = match self.page {
            Page::Day => match &self.day {
                Some(day) => day_entries(day),
                None if self.loading => vec![],
                None => vec![Entry::card(LOAD_ERROR, None, None)],
            },
            Page::Prayers => prayer_entries(&self.prayers),
        };
        self.list_state.select(Some(0));
    }

    // --- Entry list ---

    pub fn next(&mut self) {
        let len = self.entries.len();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.entries.len();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.list_state.select(Some(i));
    }

    pub fn jump_forward(&mut self, step: usize) {
        if self.entries.is_empty() {
            return;
        }
        let current = self.list_state.selected().unwrap_or(0);
        self.list_state
            .select(Some((current + step).min(self.entries.len() - 1)));
    }

    pub fn jump_backward(&mut self, step: usize) {
        let current = self.list_state.selected().unwrap_or(0);
        self.list_state.select(Some(current.saturating_sub(step)));
    }

    pub fn toggle_selected(&mut self) {
        if let Some(i) = self.list_state.selected()
            && let Some(entry) = self.entries.get_mut(i)
            && entry.detail.is_some()
        {
            entry.expanded = !entry.expanded;
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Calendar => Focus::Day,
            Focus::Day => Focus::Calendar,
        }
    }
}

fn day_entries(day: &DayView) -> Vec<Entry> {
    let mut entries = vec![Entry::heading("Feasts")];
    entries.extend(
        day.feasts
            .iter()
            .map(|c| Entry::card(&c.title, None, c.detail.clone())),
    );

    entries.push(Entry::heading("Commemorations"));
    entries.extend(
        day.saints
            .iter()
            .map(|c| Entry::card(&c.title, None, c.detail.clone())),
    );

    entries.push(Entry::heading("Fasting"));
    let rule = &day.fast.rule;
    let mut fast_detail = day.fast.detail.clone();
    if !rule.is_no_fast {
        fast_detail.push_str(&format!(
            "\n\nAllowed: {}\nForbidden: {}",
            names(&rule.allowed),
            names(&rule.forbidden)
        ));
    }
    entries.push(Entry::card(&day.fast.title, None, Some(fast_detail)));

    if !day.service_notes.is_empty() {
        entries.push(Entry::heading("Service Notes"));
        entries.extend(day.service_notes.iter().map(|c| {
            Entry::card(&c.title, c.detail.clone(), None)
        }));
    }

    entries.push(Entry::heading("Scripture"));
    if day.readings.is_empty() {
        entries.push(Entry::card(NO_READINGS, None, None));
    }
    entries.extend(day.readings.iter().map(|r| {
        Entry::card(&r.reference, Some(r.source.clone()), Some(r.text.clone()))
    }));
    entries
}

fn names(cats: &[FoodCategory]) -> String {
    cats.iter().map(|c| c.name()).collect::<Vec<_>>().join(", ")
}

fn prayer_entries(book: &PrayerBook) -> Vec<Entry> {
    let mut entries = Vec::new();
    for category in &book.categories {
        entries.push(Entry::heading(&category.name));
        if category.prayers.is_empty() {
            entries.push(Entry::card(
                "No prayers have been added to this section yet.",
                None,
                None,
            ));
        }
        entries.extend(
            category
                .prayers
                .iter()
                .map(|p| Entry::card(&p.title, None, Some(p.text.clone()))),
        );
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hymns::{AudioBackend, HymnTrack};
    use crate::model::LiturgicalDay;

    struct Silent;
    impl AudioBackend for Silent {
        fn start(&mut self, _: &HymnTrack, _: f32) -> anyhow::Result<()> {
            Ok(())
        }
        fn pause(&mut self) -> anyhow::Result<()> {
            Ok(())
        }
        fn resume(&mut self, _: &HymnTrack, _: f32) -> anyhow::Result<()> {
            Ok(())
        }
        fn stop(&mut self) {}
        fn finished(&mut self) -> bool {
            false
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn state() -> AppState {
        AppState::new(
            CalendarSystem::Julian,
            date(2025, 1, 31),
            HymnPlayer::new(vec![], 0.2, Box::new(Silent)),
        )
    }

    #[test]
    fn cursor_drags_displayed_month() {
        let mut s = state();
        s.move_cursor(1);
        assert_eq!(s.cursor, date(2025, 2, 1));
        assert_eq!(s.view.month_label(), "February 2025");
        assert_eq!(s.view.selected(), date(2025, 1, 31));
        assert!(s.select_cursor());
        assert!(!s.select_cursor());
    }

    #[test]
    fn month_change_clamps_cursor() {
        let mut s = state();
        s.next_month();
        assert_eq!(s.cursor, date(2025, 2, 28));
        s.previous_month();
        assert_eq!(s.cursor, date(2025, 1, 28));
    }

    #[test]
    fn loading_message_names_the_calendar() {
        let mut s = state();
        s.toggle_calendar();
        s.begin_loading();
        assert!(s.loading);
        assert_eq!(s.message, "Loading 2025-01-31 (gregorian calendar)...");
    }

    #[test]
    fn stale_replies_are_detected() {
        let mut s = state();
        assert!(s.is_current(CalendarSystem::Julian, date(2025, 1, 31)));
        s.toggle_calendar();
        assert!(!s.is_current(CalendarSystem::Julian, date(2025, 1, 31)));
    }

    #[test]
    fn day_entries_expand_only_with_detail() {
        let mut s = state();
        let day = LiturgicalDay::from_json(
            r#"{"year": 2025, "month": 1, "day": 18, "fast_level_desc": "Fast Day",
                "fast_exception_desc": "Wine and oil allowed", "saints": ["St Athanasius"]}"#,
        )
        .unwrap();
        let view = DayView::build(CalendarSystem::Julian, date(2025, 1, 31), &day, &[]);
        s.set_day(view, None);

        let titles: Vec<&str> = s.entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Feasts",
                "This is not a major feast day.",
                "Commemorations",
                "St Athanasius",
                "Fasting",
                "Fast Day",
                "Scripture",
                NO_READINGS,
            ]
        );
        let fast = &s.entries[5];
        assert!(
            fast.detail
                .as_deref()
                .unwrap()
                .ends_with("Allowed: Wine, Oil\nForbidden: Meat, Dairy, Eggs, Fish")
        );

        s.list_state.select(Some(1));
        s.toggle_selected();
        assert!(!s.entries[1].expanded);
        s.list_state.select(Some(5));
        s.toggle_selected();
        assert!(s.entries[5].expanded);
        assert_eq!(s.entries[5].toggle_label(), "Hide");
    }

    #[test]
    fn prayers_page_lists_categories() {
        let mut s = state();
        s.toggle_page();
        assert_eq!(s.entries[0].kind, EntryKind::Heading);
        assert_eq!(s.entries[0].title, "Morning Prayers");
        s.previous();
        assert_eq!(s.list_state.selected(), Some(s.entries.len() - 1));
        s.next();
        assert_eq!(s.list_state.selected(), Some(0));
    }
}
