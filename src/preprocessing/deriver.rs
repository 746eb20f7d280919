use crate::records::{BookingWindow, CleanRecord, FeatureRecord};

/// Calendar months, in order, as they appear after cleaning.
pub const MONTH_NAMES: &[&str] = &[
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

/// Arrival months that count as peak season.
pub const PEAK_MONTHS: &[&str] = &["December", "June", "July"];

/// 1-based index of a month name, 0 for anything unrecognized.
pub fn month_index(name: &str) -> i64 {
    MONTH_NAMES
        .iter()
        .position(|m| *m == name)
        .map(|i| i as i64 + 1)
        .unwrap_or(0)
}

/// Derive the engineered features from a cleaned record.
pub fn derive(record: CleanRecord) -> FeatureRecord {
    let total_guests = record.num_adults + record.num_children;

    // A party of zero divides by one so the ratio stays finite.
    let denominator = if total_guests == 0.0 { 1.0 } else { total_guests };
    let price_per_guest = record.price / denominator;

    let arrival = month_index(&record.arrival_month);
    let booking = month_index(&record.booking_month);
    let lead_time_month = (arrival - booking).rem_euclid(12) as f64;

    let is_peak_season = if PEAK_MONTHS.contains(&record.arrival_month.as_str()) {
        1.0
    } else {
        0.0
    };

    let country_branch = format!("{}_{}", record.country, record.branch);
    let booking_type = booking_window(lead_time_month);

    FeatureRecord {
        record,
        total_guests,
        price_per_guest,
        lead_time_month,
        is_peak_season,
        country_branch,
        booking_type,
    }
}

pub fn derive_batch(records: Vec<CleanRecord>) -> Vec<FeatureRecord> {
    records.into_iter().map(derive).collect()
}

/// Lead-time bins: (-1, 2] last-minute, (2, 6] standard, beyond early-bird.
fn booking_window(lead_time_month: f64) -> BookingWindow {
    if lead_time_month <= 2.0 {
        BookingWindow::LastMinute
    } else if lead_time_month <= 6.0 {
        BookingWindow::Standard
    } else {
        BookingWindow::EarlyBird
    }
}
