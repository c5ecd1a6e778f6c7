// File: ./src/model/fast.rs
// Derives allowed/forbidden food categories from the provider's fast descriptions
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FoodCategory {
    Meat,
    Dairy,
    Eggs,
    Fish,
    Wine,
    Oil,
}

impl FoodCategory {
    /// Canonical order. Anything enumerating the full set uses this.
    pub const ALL: [FoodCategory; 6] = [
        FoodCategory::Meat,
        FoodCategory::Dairy,
        FoodCategory::Eggs,
        FoodCategory::Fish,
        FoodCategory::Wine,
        FoodCategory::Oil,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FoodCategory::Meat => "Meat",
            FoodCategory::Dairy => "Dairy",
            FoodCategory::Eggs => "Eggs",
            FoodCategory::Fish => "Fish",
            FoodCategory::Wine => "Wine",
            FoodCategory::Oil => "Oil",
        }
    }
}

impl fmt::Display for FoodCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FastRule {
    pub label: String,
    pub is_no_fast: bool,
    pub allowed: Vec<FoodCategory>,
    pub forbidden: Vec<FoodCategory>,
}

impl FastRule {
    fn no_fast(combined: &str) -> Self {
        let label = if combined.is_empty() {
            "No fast".to_string()
        } else {
            combined.to_string()
        };
        Self {
            label,
            is_no_fast: true,
            allowed: FoodCategory::ALL.to_vec(),
            forbidden: vec![],
        }
    }

    fn meat_only(combined: &str) -> Self {
        Self {
            label: combined.to_string(),
            is_no_fast: false,
            allowed: MEAT_ONLY_ALLOWED.to_vec(),
            forbidden: vec![FoodCategory::Meat],
        }
    }
}

use FoodCategory::*;

const NO_FAST_PHRASES: &[&str] = &[
    "fast-free",
    "fast free",
    "fast free period",
    "no fast",
    "no fasting",
];

const CHEESEFARE_PHRASES: &[&str] = &["cheese-fare", "cheese fare", "cheesefare"];

/// "no meat" alone means a meat-only restriction, unless any of these also appear.
const OTHER_PROHIBITIONS: &[&str] = &["no dairy", "no eggs", "no fish", "no wine", "no oil"];

const MEAT_ONLY_ALLOWED: [FoodCategory; 5] = [Dairy, Eggs, Fish, Wine, Oil];

const FAST_MENTIONS: &[&str] = &["fast", "lent"];

const FISH_WINE_OIL: &[&str] = &["fish, wine and oil", "fish, wine & oil", "fish wine and oil"];

/// A row of the allowance table: fires when any phrase matches and no `unless` phrase does.
struct Allowance {
    phrases: &'static [&'static str],
    unless: &'static [&'static str],
    allows: &'static [FoodCategory],
}

/// Evaluated top to bottom, after the strict baseline.
const ALLOWANCES: &[Allowance] = &[
    Allowance {
        phrases: FISH_WINE_OIL,
        unless: &[],
        allows: &[Fish, Wine, Oil],
    },
    Allowance {
        phrases: &["wine and oil", "wine & oil"],
        unless: FISH_WINE_OIL,
        allows: &[Wine, Oil],
    },
    Allowance {
        phrases: &["fish allowed", "fish is allowed"],
        unless: &[],
        allows: &[Fish],
    },
    Allowance {
        phrases: &["wine allowed", "wine is allowed"],
        unless: &[],
        allows: &[Wine],
    },
    Allowance {
        phrases: &["oil allowed", "oil is allowed", "olive oil allowed"],
        unless: &[],
        allows: &[Oil],
    },
];

/// Explicit prohibitions run last and override every allowance.
const PROHIBITIONS: &[(&[&str], FoodCategory)] = &[
    (&["no meat"], Meat),
    (&["no dairy"], Dairy),
    (&["no eggs"], Eggs),
    (&["no fish"], Fish),
    (&["no wine", "no alcohol"], Wine),
    (&["no oil", "no olive oil"], Oil),
];

fn contains_any(text: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|p| text.contains(p))
}

/// Insertion-ordered set operations over the two output lists.
fn insert(list: &mut Vec<FoodCategory>, cat: FoodCategory) {
    if !list.contains(&cat) {
        list.push(cat);
    }
}

fn remove(list: &mut Vec<FoodCategory>, cat: FoodCategory) {
    list.retain(|c| *c != cat);
}

/// Classifies a day's fast from the level and exception descriptions.
///
/// Matching is substring-based on the lower-cased text, so "breakfast"
/// counts as a mention of "fast". Total over all inputs.
pub fn classify(level_text: &str, exception_text: &str) -> FastRule {
    let joined = format!("{} {}", level_text, exception_text);
    let combined = joined.trim();
    let t = combined.to_lowercase();

    if combined.is_empty() || contains_any(&t, NO_FAST_PHRASES) {
        return FastRule::no_fast(combined);
    }

    if contains_any(&t, CHEESEFARE_PHRASES)
        || (t.contains("no meat") && !contains_any(&t, OTHER_PROHIBITIONS))
    {
        return FastRule::meat_only(combined);
    }

    if !contains_any(&t, FAST_MENTIONS) {
        return FastRule::no_fast(combined);
    }

    // Strict fast unless the text says otherwise.
    let mut allowed = Vec::new();
    let mut forbidden = FoodCategory::ALL.to_vec();

    for rule in ALLOWANCES {
        if contains_any(&t, rule.phrases) && !contains_any(&t, rule.unless) {
            for &cat in rule.allows {
                remove(&mut forbidden, cat);
                insert(&mut allowed, cat);
            }
        }
    }

    for (phrases, cat) in PROHIBITIONS {
        if contains_any(&t, phrases) {
            insert(&mut forbidden, *cat);
            remove(&mut allowed, *cat);
        }
    }

    FastRule {
        label: combined.to_string(),
        is_no_fast: false,
        allowed,
        forbidden,
    }
}
