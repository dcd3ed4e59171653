//! Parcel weight estimation from listing titles.
//!
//! An ordered pattern table maps garment categories to typical packed
//! weights; the first matching pattern wins, so more specific categories
//! must sit above the generic ones they overlap with (e.g. suitcases before
//! suits).

use regex::{Regex, RegexBuilder};
use rust_decimal::Decimal;
use std::sync::LazyLock;

/// Weight table rows: (title pattern, weight in hundredths of a kilogram).
const STANDARD_TABLE: &[(&str, i64)] = &[
    // Tops
    (r"long sleeve t-?shirt|longsleeve", 30),
    (r"short sleeve t-?shirt|t-?shirt|tee", 20),
    (r"polo", 25),
    (r"shirt|button.?up|button.?down|oxford", 35),
    (r"sweater|knit|cardigan", 60),
    (r"sweatshirt|hoodie", 70),
    (r"tank top|sleeveless|singlet", 18),
    (r"jersey", 30),
    // Bottoms
    (r"casual pants|pants|trousers", 60),
    (r"cropped pants|cropped trousers", 55),
    (r"denim|jeans", 70),
    (r"leggings", 25),
    (r"overalls|jumpsuit|romper", 60),
    (r"shorts", 30),
    (r"sweatpants|joggers", 65),
    (r"swimwear|swim trunk", 15),
    // Outerwear
    (r"bomber( jacket)?", 90),
    (r"cloak|cape", 100),
    (r"denim jacket", 100),
    (r"heavy coat|overcoat|wool coat", 130),
    (r"leather jacket", 150),
    (r"light jacket|windbreaker", 80),
    (r"parka", 140),
    (r"raincoat|trench coat", 110),
    (r"vest", 40),
    // Footwear
    (r"boots", 180),
    (r"casual leather shoe|loafers", 110),
    (r"formal shoe|dress shoes|oxford", 120),
    (r"hi[- ]?top sneaker|high[- ]?top", 160),
    (r"low[- ]?top sneaker", 130),
    (r"sneakers|running shoes", 140),
    (r"sandals", 50),
    (r"slip.?on|slides", 90),
    // Accessories
    (
        r"bag|backpack|tote|duffle|weekender|messenger bag|briefcase|crossbody|shoulder bag|belt bag|fanny pack|camera bag|laptop bag",
        70,
    ),
    (r"luggage|suitcase", 300),
    (r"belt", 25),
    (r"glasses|eyeglasses|sunglass", 10),
    (r"gloves|mittens", 12),
    (r"scarf|scarves", 20),
    (r"hat|cap|beanie", 15),
    (r"jewelry|ring|bracelet|necklace|watch", 15),
    (r"wallet", 15),
    (r"socks", 5),
    (r"underwear|boxers|briefs", 10),
    (r"tie|necktie|bow tie|pocket square", 8),
    // Tailoring. Suitcases are caught by the luggage row above, so a bare
    // word boundary is enough here.
    (r"blazer|sport coat", 80),
    (r"formal shirt|formal shirting", 35),
    (r"formal trousers", 65),
    (r"\bsuit\b|suit jacket", 120),
    (r"tuxedo", 250),
    (r"waistcoat|formal vest", 40),
];

static STANDARD: LazyLock<Vec<(Regex, Decimal)>> = LazyLock::new(|| {
    STANDARD_TABLE
        .iter()
        .map(|(pattern, centikg)| {
            let regex = RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .unwrap();
            (regex, Decimal::new(*centikg, 2))
        })
        .collect()
});

/// Result of a weight lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeightEstimate {
    pub weight_kg: Decimal,
    /// Whether a category pattern matched, as opposed to the default.
    pub matched: bool,
}

/// Ordered title-pattern weight table.
pub struct WeightTable {
    entries: Vec<(Regex, Decimal)>,
}

impl WeightTable {
    pub fn standard() -> Self {
        Self {
            entries: STANDARD.clone(),
        }
    }

    /// Build a table from caller-supplied rows. Order matters: the first
    /// matching pattern wins, exactly as in the standard table.
    pub fn from_entries(entries: Vec<(Regex, Decimal)>) -> Self {
        Self { entries }
    }

    /// Estimate packed weight from a listing title; first pattern wins.
    pub fn estimate(&self, title: &str, default_weight: Decimal) -> WeightEstimate {
        for (regex, weight) in &self.entries {
            if regex.is_match(title) {
                return WeightEstimate {
                    weight_kg: *weight,
                    matched: true,
                };
            }
        }
        WeightEstimate {
            weight_kg: default_weight,
            matched: false,
        }
    }
}

impl Default for WeightTable {
    fn default() -> Self {
        Self::standard()
    }
}
