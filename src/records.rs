use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Column name of the training target.
pub const TARGET_COLUMN: &str = "no_show";

/// Categorical columns of the feature schema, in transform order.
pub const CATEGORICAL_COLUMNS: &[&str] = &[
    "branch",
    "booking_month",
    "arrival_month",
    "checkout_month",
    "country",
    "first_time",
    "room",
    "platform",
    "country_branch",
    "booking_type",
];

/// Numeric columns of the feature schema, in transform order.
pub const NUMERIC_COLUMNS: &[&str] = &[
    "arrival_day",
    "checkout_day",
    "num_adults",
    "num_children",
    "price",
    "total_guests",
    "price_per_guest",
    "lead_time_month",
    "is_peak_season",
];

/// A raw booking record as it arrives from storage or the API: a loose
/// field map whose values may be missing, mistyped, or garbled.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord(pub BTreeMap<String, Value>);

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: &str, value: Value) {
        self.0.insert(field.to_string(), value);
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// String form of a field. Numbers and booleans are rendered;
    /// nulls and absent fields yield `None`, as do blank strings.
    pub fn get_str(&self, field: &str) -> Option<String> {
        match self.0.get(field)? {
            Value::String(s) if s.trim().is_empty() => None,
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Numeric form of a field, accepting numbers and numeric strings.
    pub fn get_f64(&self, field: &str) -> Option<f64> {
        match self.0.get(field)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }
}

/// A booking record after cleaning: every field present and typed,
/// missing categoricals replaced by `"Unknown"`, numerals parsed,
/// prices in the canonical currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanRecord {
    pub branch: String,
    pub booking_month: String,
    pub arrival_month: String,
    pub arrival_day: f64,
    pub checkout_month: String,
    pub checkout_day: f64,
    pub country: String,
    pub first_time: String,
    pub room: String,
    pub price: f64,
    pub platform: String,
    pub num_adults: f64,
    pub num_children: f64,
    /// Training target: 1 = no-show, 0 = check-in. `None` when the raw
    /// record carried no usable label.
    pub label: Option<u8>,
}

/// Booking-window category derived from the lead time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingWindow {
    LastMinute,
    Standard,
    EarlyBird,
}

impl BookingWindow {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingWindow::LastMinute => "LastMinute",
            BookingWindow::Standard => "Standard",
            BookingWindow::EarlyBird => "EarlyBird",
        }
    }
}

/// A cleaned record plus its derived features. This is the fixed schema
/// the column transform operates over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub record: CleanRecord,
    pub total_guests: f64,
    pub price_per_guest: f64,
    pub lead_time_month: f64,
    pub is_peak_season: f64,
    pub country_branch: String,
    pub booking_type: BookingWindow,
}

impl FeatureRecord {
    /// Value of a numeric schema column, `None` for names outside the schema.
    pub fn numeric(&self, column: &str) -> Option<f64> {
        match column {
            "arrival_day" => Some(self.record.arrival_day),
            "checkout_day" => Some(self.record.checkout_day),
            "num_adults" => Some(self.record.num_adults),
            "num_children" => Some(self.record.num_children),
            "price" => Some(self.record.price),
            "total_guests" => Some(self.total_guests),
            "price_per_guest" => Some(self.price_per_guest),
            "lead_time_month" => Some(self.lead_time_month),
            "is_peak_season" => Some(self.is_peak_season),
            _ => None,
        }
    }

    /// Value of a categorical schema column, `None` for names outside the schema.
    pub fn categorical(&self, column: &str) -> Option<&str> {
        match column {
            "branch" => Some(&self.record.branch),
            "booking_month" => Some(&self.record.booking_month),
            "arrival_month" => Some(&self.record.arrival_month),
            "checkout_month" => Some(&self.record.checkout_month),
            "country" => Some(&self.record.country),
            "first_time" => Some(&self.record.first_time),
            "room" => Some(&self.record.room),
            "platform" => Some(&self.record.platform),
            "country_branch" => Some(&self.country_branch),
            "booking_type" => Some(self.booking_type.as_str()),
            _ => None,
        }
    }
}
