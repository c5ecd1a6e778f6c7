// File: ./src/presenter.rs
// Turns a loaded day into the sections the front-ends display
use crate::calendar::{CalendarSystem, civil_label, month_name};
use crate::model::detail::{
    commemoration_detail, feast_description, feast_detail, service_note_description, strip_markup,
};
use crate::model::scripture::normalize_reading_text;
use crate::model::{FastRule, LiturgicalDay, classify};
use chrono::NaiveDate;
use serde::Serialize;

pub const NO_FEAST: &str = "This is not a major feast day.";
pub const NO_SAINTS: &str = "No specific commemorations listed for this day.";
pub const NO_SAINT_DETAIL: &str = "No further details are available.";
pub const NO_FAST_DETAIL: &str = "There is no fasting prescribed for this day.";
pub const NO_EXCEPTIONS: &str = "There are no exceptions for today's fast.";
pub const NO_READINGS: &str = "No scripture readings are appointed for this day.";

/// A titled entry with optional expandable text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Card {
    pub title: String,
    pub detail: Option<String>,
}

impl Card {
    fn new(title: impl Into<String>, detail: Option<String>) -> Self {
        Self {
            title: title.into(),
            detail,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FastCard {
    pub title: String,
    pub detail: String,
    pub rule: FastRule,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadingCard {
    pub reference: String,
    pub source: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayView {
    pub calendar: CalendarSystem,
    pub calendar_label: String,
    pub civil_date: String,
    pub liturgical_date: Option<String>,
    pub feasts: Vec<Card>,
    pub saints: Vec<Card>,
    pub fast: FastCard,
    pub service_notes: Vec<Card>,
    pub readings: Vec<ReadingCard>,
}

impl DayView {
    /// `passages` lines up with the day's readings; missing entries fall back to the reference.
    pub fn build(
        calendar: CalendarSystem,
        civil_date: NaiveDate,
        day: &LiturgicalDay,
        passages: &[String],
    ) -> Self {
        let rec = &day.record;
        let liturgical_date = (rec.year != 0 && rec.month != 0 && rec.day != 0)
            .then(|| format!("{} {} {}", rec.day, month_name(rec.month), rec.year));

        Self {
            calendar,
            calendar_label: calendar.label().to_string(),
            civil_date: civil_label(civil_date),
            liturgical_date,
            feasts: feast_cards(day),
            saints: saint_cards(day),
            fast: fast_card(day),
            service_notes: rec
                .service_notes
                .iter()
                .map(|note| {
                    Card::new(note.as_str(), Some(service_note_description(note).to_string()))
                })
                .collect(),
            readings: rec
                .readings
                .iter()
                .enumerate()
                .map(|(i, reading)| {
                    let reference = reading.reference().to_string();
                    let raw = passages
                        .get(i)
                        .filter(|p| !p.is_empty())
                        .map(String::as_str)
                        .unwrap_or(&reference);
                    ReadingCard {
                        text: normalize_reading_text(raw),
                        source: if reading.source.is_empty() {
                            "Reading".to_string()
                        } else {
                            reading.source.clone()
                        },
                        reference,
                    }
                })
                .collect(),
        }
    }
}

fn feast_cards(day: &LiturgicalDay) -> Vec<Card> {
    let cards: Vec<Card> = day
        .record
        .feasts
        .iter()
        .filter(|f| !f.is_empty() && !f.to_lowercase().starts_with("liturgy"))
        .map(|f| {
            let detail = feast_detail(&day.document, f)
                .map(strip_markup)
                .unwrap_or_else(|| feast_description(f).to_string());
            Card::new(f.as_str(), (!detail.is_empty()).then_some(detail))
        })
        .collect();
    if cards.is_empty() {
        vec![Card::new(NO_FEAST, None)]
    } else {
        cards
    }
}

fn saint_cards(day: &LiturgicalDay) -> Vec<Card> {
    if day.record.saints.is_empty() {
        return vec![Card::new(NO_SAINTS, None)];
    }
    day.record
        .saints
        .iter()
        .map(|s| {
            let detail = commemoration_detail(&day.document, s)
                .map(strip_markup)
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| NO_SAINT_DETAIL.to_string());
            Card::new(s.as_str(), Some(detail))
        })
        .collect()
}

fn fast_card(day: &LiturgicalDay) -> FastCard {
    let rec = &day.record;
    let rule = classify(&rec.fast_level_desc, &rec.fast_exception_desc);

    if rule.is_no_fast {
        return FastCard {
            title: "No fast".to_string(),
            detail: NO_FAST_DETAIL.to_string(),
            rule,
        };
    }

    let title = [
        &rec.fast_name,
        &rec.fast_period,
        &rec.fast_level_desc,
        &rec.fast_exception_desc,
    ]
    .into_iter()
    .find(|s| !s.is_empty())
    .cloned()
    .unwrap_or_else(|| "Fast day".to_string());

    let exception = &rec.fast_exception_desc;
    let detail = if !exception.is_empty() && !exception.eq_ignore_ascii_case("no overrides") {
        exception.clone()
    } else {
        NO_EXCEPTIONS.to_string()
    };

    FastCard {
        title,
        detail,
        rule,
    }
}

impl DayView {
    /// Plain-text rendition, used by print mode.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.civil_date);
        out.push('\n');
        if let Some(lit) = &self.liturgical_date {
            out.push_str(&format!("{} {}\n", self.calendar_label, lit));
        }

        section(&mut out, "Feasts", &self.feasts);
        section(&mut out, "Commemorations", &self.saints);

        out.push_str("\n== Fasting ==\n");
        out.push_str(&format!("* {}\n  {}\n", self.fast.title, self.fast.detail));
        if !self.fast.rule.is_no_fast {
            out.push_str(&format!("  Allowed: {}\n", join(&self.fast.rule.allowed)));
            out.push_str(&format!("  Forbidden: {}\n", join(&self.fast.rule.forbidden)));
        }

        if !self.service_notes.is_empty() {
            section(&mut out, "Service notes", &self.service_notes);
        }

        out.push_str("\n== Scripture ==\n");
        if self.readings.is_empty() {
            out.push_str(NO_READINGS);
            out.push('\n');
        }
        for r in &self.readings {
            out.push_str(&format!("* {} ({})\n\n{}\n\n", r.reference, r.source, r.text));
        }
        out
    }
}

fn section(out: &mut String, heading: &str, cards: &[Card]) {
    out.push_str(&format!("\n== {} ==\n", heading));
    for card in cards {
        out.push_str(&format!("* {}\n", card.title));
        if let Some(detail) = &card.detail {
            out.push_str(&format!("  {}\n", detail.replace('\n', "\n  ")));
        }
    }
}

fn join<T: std::fmt::Display>(items: &[T]) -> String {
    if items.is_empty() {
        return "none".to_string();
    }
    items
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
