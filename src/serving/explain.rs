use crate::error::Result;

/// Fallback feature names reported when the fitted transform exposes none.
pub const DEFAULT_FEATURE_NAMES: &[&str] = &[
    "arrival_month",
    "price",
    "country",
    "branch",
    "platform",
    "room",
];

/// Capability seam for turning the model's feature set into a prose
/// report. The production generator may call an external text service;
/// the serving layer only depends on this trait.
pub trait InsightGenerator: Send + Sync {
    fn interpret(&self, feature_names: &[String]) -> Result<String>;
}

/// Deterministic generator with no external dependencies. Summarizes
/// the feature space by column family.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineInsightGenerator;

impl InsightGenerator for OfflineInsightGenerator {
    fn interpret(&self, feature_names: &[String]) -> Result<String> {
        let numeric = feature_names
            .iter()
            .filter(|name| name.starts_with("num__"))
            .count();
        let categorical = feature_names.len() - numeric;

        let mut columns: Vec<&str> = feature_names
            .iter()
            .map(|name| source_column(name))
            .collect();
        columns.dedup();

        Ok(format!(
            "The model scores bookings over {} encoded features ({} numeric, {} categorical) \
             drawn from these inputs: {}.",
            feature_names.len(),
            numeric,
            categorical,
            columns.join(", ")
        ))
    }
}

/// Strip the `num__`/`cat__` prefix and any one-hot category suffix.
fn source_column(feature_name: &str) -> &str {
    let stripped = feature_name
        .strip_prefix("num__")
        .or_else(|| feature_name.strip_prefix("cat__"))
        .unwrap_or(feature_name);
    stripped.split("__").next().unwrap_or(stripped)
}
