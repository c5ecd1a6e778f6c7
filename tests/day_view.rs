use chrono::NaiveDate;
use serde_json::json;
use typikon::calendar::CalendarSystem;
use typikon::model::LiturgicalDay;
use typikon::model::FoodCategory::*;
use typikon::presenter::{
    DayView, NO_EXCEPTIONS, NO_FAST_DETAIL, NO_FEAST, NO_READINGS, NO_SAINT_DETAIL, NO_SAINTS,
};

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 4, 9).unwrap()
}

fn build(value: serde_json::Value, passages: &[String]) -> DayView {
    let day = LiturgicalDay::from_json(&value.to_string()).unwrap();
    DayView::build(CalendarSystem::Gregorian, date(), &day, passages)
}

fn long(body: &str) -> String {
    format!("{} {}", body, "And the people glorified God for him. ".repeat(8))
}

#[test]
fn empty_day_uses_every_fallback() {
    let view = build(json!({}), &[]);

    assert_eq!(view.civil_date, "Wednesday, April 9, 2025");
    assert_eq!(view.calendar_label, "Gregorian calendar date:");
    assert_eq!(view.liturgical_date, None);
    assert_eq!(view.feasts.len(), 1);
    assert_eq!(view.feasts[0].title, NO_FEAST);
    assert_eq!(view.saints[0].title, NO_SAINTS);
    assert_eq!(view.fast.title, "No fast");
    assert_eq!(view.fast.detail, NO_FAST_DETAIL);
    assert!(view.readings.is_empty());
    assert!(view.to_text().contains(NO_READINGS));
}

#[test]
fn liturgy_entries_are_not_feasts() {
    let view = build(
        json!({"feasts": ["Liturgy of St Basil", "", "Annunciation of the Theotokos"]}),
        &[],
    );
    let titles: Vec<&str> = view.feasts.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, vec!["Annunciation of the Theotokos"]);
    assert!(
        view.feasts[0]
            .detail
            .as_deref()
            .unwrap()
            .starts_with("Feast of the Theotokos")
    );

    let only_liturgy = build(json!({"feasts": ["Liturgy of the Presanctified Gifts"]}), &[]);
    assert_eq!(only_liturgy.feasts[0].title, NO_FEAST);
}

#[test]
fn saint_details_come_from_the_payload() {
    let life = long("Mary of Egypt fled into the desert beyond the Jordan, where Mary lived alone.");
    let view = build(
        json!({
            "saints": ["Venerable Mary of Egypt", "Martyr Eupsychius"],
            "stories": [{"title": "Life", "story": format!("<p>{}</p>", life)}]
        }),
        &[],
    );
    // One keyword hit is not enough, so Eupsychius gets the notice.
    assert_eq!(view.saints[0].detail.as_deref(), Some(life.trim()));
    assert_eq!(view.saints[1].detail.as_deref(), Some(NO_SAINT_DETAIL));
}

#[test]
fn fast_title_follows_the_fallback_chain() {
    let view = build(
        json!({
            "fast_level_desc": "Fast",
            "fast_exception_desc": "Wine and oil allowed",
            "fast_period": "Great Lent"
        }),
        &[],
    );
    assert_eq!(view.fast.title, "Great Lent");
    assert_eq!(view.fast.detail, "Wine and oil allowed");
    assert_eq!(view.fast.rule.allowed, vec![Wine, Oil]);

    let named = build(
        json!({"fast_level_desc": "Fast", "fast_name": "Apostles Fast", "fast_period": "x"}),
        &[],
    );
    assert_eq!(named.fast.title, "Apostles Fast");

    let plain = build(json!({"fast_level_desc": "Strict Fast"}), &[]);
    assert_eq!(plain.fast.title, "Strict Fast");
    assert_eq!(plain.fast.detail, NO_EXCEPTIONS);
}

#[test]
fn no_overrides_is_not_shown_as_an_exception() {
    let view = build(
        json!({"fast_level_desc": "Fast Day", "fast_exception_desc": "NO OVERRIDES"}),
        &[],
    );
    assert!(!view.fast.rule.is_no_fast);
    assert_eq!(view.fast.detail, NO_EXCEPTIONS);
}

#[test]
fn readings_pair_with_passages_in_order() {
    let view = build(
        json!({
            "year": 2025, "month": 3, "day": 27,
            "readings": [
                {"source": "Vespers", "display": "Genesis 10.32-11.9"},
                {"source": null, "short_display": "Prov 10.31-11.12"}
            ]
        }),
        &["Genesis 10.32-11.9 (KJV)\n\nThese are   the families\r\n\r\n\r\nof the sons of Noah.".to_string()],
    );

    assert_eq!(view.liturgical_date.as_deref(), Some("27 March 2025"));
    assert_eq!(view.readings[0].source, "Vespers");
    assert_eq!(
        view.readings[0].text,
        "Genesis 10.32-11.9 (KJV)\n\nThese are the families\n\nof the sons of Noah."
    );
    // No passage for the second reading: the reference stands in.
    assert_eq!(view.readings[1].source, "Reading");
    assert_eq!(view.readings[1].reference, "Prov 10.31-11.12");
    assert_eq!(view.readings[1].text, "Prov 10.31-11.12");
}

#[test]
fn service_notes_carry_descriptions() {
    let view = build(json!({"service_notes": ["Akathist to the Theotokos"]}), &[]);
    assert_eq!(view.service_notes.len(), 1);
    assert!(
        view.service_notes[0]
            .detail
            .as_deref()
            .unwrap()
            .contains("hymn of praise")
    );
    assert!(view.to_text().contains("== Service notes =="));
}

#[test]
fn json_output_is_stable() {
    let view = build(json!({"fast_level_desc": "Cheesefare"}), &[]);
    let value = serde_json::to_value(&view).unwrap();
    assert_eq!(value["calendar"], "gregorian");
    assert_eq!(value["fast"]["rule"]["forbidden"], json!(["Meat"]));
    assert_eq!(value["fast"]["rule"]["is_no_fast"], false);
}
