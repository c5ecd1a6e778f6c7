use typikon::model::FoodCategory::{self, *};
use typikon::model::classify;

const SAMPLES: &[(&str, &str)] = &[
    ("", ""),
    ("   ", "\t"),
    ("Fast-Free", ""),
    ("FAST FREE PERIOD", "anything"),
    ("Cheese-fare week", ""),
    ("Strict Fast", ""),
    ("Lenten fast", "Fish, wine and oil allowed"),
    ("Lenten fast", "Wine and oil allowed, but no wine"),
    ("Ordinary weekday", ""),
    ("Fast Day", "No overrides"),
    ("Apostles Fast", "Fish allowed"),
    ("Nativity Fast", "no meat, no dairy"),
    ("Breakfast", ""),
];

#[test]
fn empty_input_is_no_fast() {
    let rule = classify("", "");
    assert!(rule.is_no_fast);
    assert_eq!(rule.label, "No fast");
    assert_eq!(rule.allowed, FoodCategory::ALL.to_vec());
    assert!(rule.forbidden.is_empty());
}

#[test]
fn fast_free_ignores_case() {
    assert!(classify("Fast-Free", "").is_no_fast);
    assert!(classify("fAsT-fReE", "").is_no_fast);
    assert!(classify("Weekday", "No Fasting").is_no_fast);
}

#[test]
fn cheesefare_forbids_only_meat() {
    let rule = classify("Cheese-fare week", "");
    assert!(!rule.is_no_fast);
    assert_eq!(rule.allowed, vec![Dairy, Eggs, Fish, Wine, Oil]);
    assert_eq!(rule.forbidden, vec![Meat]);
    assert_eq!(rule.label, "Cheese-fare week");
}

#[test]
fn lone_no_meat_is_meat_only() {
    let rule = classify("Day of abstinence", "no meat");
    assert_eq!(rule.forbidden, vec![Meat]);

    let rule = classify("Nativity Fast", "no meat, no dairy");
    assert_eq!(rule.forbidden, vec![Meat, Dairy, Eggs, Fish, Wine, Oil]);
    assert!(rule.allowed.is_empty());
}

#[test]
fn strict_fast_forbids_everything() {
    let rule = classify("Strict fast", "");
    assert!(!rule.is_no_fast);
    assert!(rule.allowed.is_empty());
    assert_eq!(rule.forbidden, FoodCategory::ALL.to_vec());
}

#[test]
fn fish_wine_and_oil() {
    let rule = classify("Lenten fast", "Fish, wine and oil allowed");
    assert_eq!(rule.allowed, vec![Fish, Wine, Oil]);
    assert_eq!(rule.forbidden, vec![Meat, Dairy, Eggs]);
    assert_eq!(rule.label, "Lenten fast Fish, wine and oil allowed");
}

#[test]
fn explicit_prohibition_wins() {
    let rule = classify("Lenten fast", "Wine and oil allowed, but no wine");
    assert_eq!(rule.allowed, vec![Oil]);
    assert!(rule.forbidden.contains(&Wine));
    assert!(!rule.allowed.contains(&Wine));
}

#[test]
fn prohibition_lands_after_baseline_order() {
    // Wine is re-forbidden after the baseline, so it moves to the end.
    let rule = classify("Lenten fast", "Wine and oil allowed, no alcohol");
    assert_eq!(rule.forbidden, vec![Meat, Dairy, Eggs, Fish, Wine]);
}

#[test]
fn single_allowances() {
    let rule = classify("Apostles Fast", "Fish allowed");
    assert_eq!(rule.allowed, vec![Fish]);
    assert_eq!(rule.forbidden, vec![Meat, Dairy, Eggs, Wine, Oil]);

    let rule = classify("Fast", "Olive oil allowed");
    assert_eq!(rule.allowed, vec![Oil]);
}

#[test]
fn no_mention_of_fast_or_lent_is_no_fast() {
    let rule = classify("Ordinary weekday", "");
    assert!(rule.is_no_fast);
    assert_eq!(rule.label, "Ordinary weekday");
}

#[test]
fn substring_matching_is_kept() {
    // "breakfast" contains "fast"; the heuristic accepts this.
    let rule = classify("Breakfast", "");
    assert!(!rule.is_no_fast);
    assert_eq!(rule.forbidden.len(), 6);
}

#[test]
fn classification_is_repeatable() {
    for (level, exception) in SAMPLES {
        assert_eq!(classify(level, exception), classify(level, exception));
    }
}

#[test]
fn no_fast_always_allows_everything() {
    for (level, exception) in SAMPLES {
        let rule = classify(level, exception);
        if rule.is_no_fast {
            assert!(rule.forbidden.is_empty(), "{:?}", (level, exception));
            assert_eq!(rule.allowed, FoodCategory::ALL.to_vec());
        }
    }
}

#[test]
fn allowed_and_forbidden_never_overlap() {
    for (level, exception) in SAMPLES {
        let rule = classify(level, exception);
        for cat in &rule.allowed {
            assert!(!rule.forbidden.contains(cat), "{:?} in both for {:?}", cat, level);
        }
    }
}
