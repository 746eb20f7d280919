use crate::records::{CleanRecord, RawRecord, TARGET_COLUMN};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Conversion rate applied to prices quoted in USD.
pub const USD_RATE: f64 = 1.35;

/// Fallback value for missing or unparseable categorical fields.
pub const UNKNOWN: &str = "Unknown";

/// Spelled-out guest counts accepted in the raw data.
const WORD_NUMERALS: &[(&str, f64)] = &[
    ("one", 1.0),
    ("two", 2.0),
    ("three", 3.0),
    ("four", 4.0),
    ("five", 5.0),
    ("six", 6.0),
    ("seven", 7.0),
    ("eight", 8.0),
    ("nine", 9.0),
    ("ten", 10.0),
    ("zero", 0.0),
    ("none", 0.0),
];

/// Cleans raw booking records into the fixed [`CleanRecord`] schema.
///
/// Price imputation statistics (per-room and global medians) are computed
/// once by [`Normalizer::fit`] and frozen into the struct, so a serving
/// instance deserialized from an artifact imputes with the training-time
/// medians rather than recomputing them over whatever batch it sees.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Normalizer {
    room_price_medians: BTreeMap<String, f64>,
    global_price_median: f64,
    fitted: bool,
}

impl Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute price-imputation medians from a training batch.
    pub fn fit(batch: &[RawRecord]) -> Self {
        let mut by_room: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        let mut all_prices = Vec::new();

        for raw in batch {
            let room = raw
                .get_str("room")
                .unwrap_or_else(|| UNKNOWN.to_string());
            if let Some(price) = raw.get_str("price").as_deref().and_then(parse_price) {
                by_room.entry(room).or_default().push(price);
                all_prices.push(price);
            }
        }

        let room_price_medians = by_room
            .into_iter()
            .map(|(room, mut prices)| (room, median(&mut prices)))
            .collect();

        Self {
            room_price_medians,
            global_price_median: median(&mut all_prices),
            fitted: true,
        }
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted
    }

    /// Clean a single raw record into the fixed schema.
    pub fn clean(&self, raw: &RawRecord) -> CleanRecord {
        let room = raw
            .get_str("room")
            .unwrap_or_else(|| UNKNOWN.to_string());

        let price = match raw.get_str("price").as_deref().and_then(parse_price) {
            Some(p) => p,
            None => self.impute_price(&room),
        };

        let label = raw
            .get_f64(TARGET_COLUMN)
            .filter(|v| v.is_finite())
            .map(|v| u8::from(v >= 0.5));

        CleanRecord {
            branch: category(raw, "branch"),
            booking_month: month(raw, "booking_month"),
            arrival_month: month(raw, "arrival_month"),
            arrival_day: raw.get_f64("arrival_day").unwrap_or(0.0),
            checkout_month: category(raw, "checkout_month"),
            checkout_day: raw.get_f64("checkout_day").unwrap_or(0.0),
            country: category(raw, "country"),
            first_time: category(raw, "first_time"),
            room,
            price,
            platform: category(raw, "platform"),
            num_adults: guest_count(raw, "num_adults"),
            num_children: guest_count(raw, "num_children"),
            label,
        }
    }

    pub fn clean_batch(&self, batch: &[RawRecord]) -> Vec<CleanRecord> {
        batch.iter().map(|raw| self.clean(raw)).collect()
    }

    /// Fit the medians on a batch and clean it in one pass.
    pub fn fit_clean(batch: &[RawRecord]) -> (Self, Vec<CleanRecord>) {
        let normalizer = Self::fit(batch);
        let cleaned = normalizer.clean_batch(batch);
        (normalizer, cleaned)
    }

    fn impute_price(&self, room: &str) -> f64 {
        self.room_price_medians
            .get(room)
            .copied()
            .unwrap_or(self.global_price_median)
    }
}

fn category(raw: &RawRecord, field: &str) -> String {
    raw.get_str(field).unwrap_or_else(|| UNKNOWN.to_string())
}

fn month(raw: &RawRecord, field: &str) -> String {
    raw.get_str(field)
        .map(|s| title_case(s.trim()))
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// Parse a guest count: spelled-out numerals, then numeric strings,
/// anything else collapses to zero. Counts are never negative.
fn guest_count(raw: &RawRecord, field: &str) -> f64 {
    let Some(value) = raw.get_str(field) else {
        return 0.0;
    };
    let token = value.trim().to_lowercase();
    if let Some((_, n)) = WORD_NUMERALS.iter().find(|(word, _)| *word == token) {
        return *n;
    }
    token.parse::<f64>().map(|v| v.max(0.0)).unwrap_or(0.0)
}

/// Parse a price string. The magnitude keeps only digits and dots; a
/// case-insensitive `usd` marker anywhere in the string triggers the
/// conversion rate. Unparseable magnitudes yield `None`.
fn parse_price(raw: &str) -> Option<f64> {
    let is_usd = raw.to_ascii_lowercase().contains("usd");
    let magnitude: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let value = magnitude.parse::<f64>().ok()?;
    Some(if is_usd { value * USD_RATE } else { value })
}

/// Title-case a string the way the raw month fields are normalized:
/// first letter of each alphabetic run upper-cased, the rest lowered.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

fn median(values: &mut [f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = values.len();
    if n % 2 == 1 {
        values[n / 2]
    } else {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    }
}
