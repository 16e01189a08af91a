//! Data types used by the aggregation pipeline.

use serde::Serialize;
use std::collections::BTreeMap;

pub const ELM_AVENUE: &str = "Elm Avenue/Rabbit Road";
pub const HANLEY_HIGHWAY: &str = "Hanley Highway/Westway";

/// Junctions drawn by the histogram, in legend order.
pub const JUNCTIONS: [&str; 2] = [ELM_AVENUE, HANLEY_HIGHWAY];

/// Extracts the two-character hour key from a `timeOfDay` value.
///
/// Takes everything before the first `:` and left-pads it with `0`, so
/// `"8:15"` and `"08:15"` both land in `"08"`.
pub fn hour_key(time_of_day: &str) -> String {
    let hour = time_of_day
        .trim()
        .split(':')
        .next()
        .unwrap_or_default()
        .trim();
    format!("{hour:0>2}")
}

/// Case-insensitive comparison of a raw CSV value against a fixed label.
pub fn label_eq(value: &str, label: &str) -> bool {
    value.trim().eq_ignore_ascii_case(label)
}

/// Observation counts keyed by hour ("00".."23"). Absent hours read as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct HourlyCounts(BTreeMap<String, usize>);

impl HourlyCounts {
    pub fn increment(&mut self, hour: String) {
        *self.0.entry(hour).or_default() += 1;
    }

    pub fn get(&self, hour: &str) -> usize {
        self.0.get(hour).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Highest count across all hours, 0 when nothing was recorded.
    pub fn peak(&self) -> usize {
        self.0.values().copied().max().unwrap_or(0)
    }

    /// Every hour whose count equals the peak, in ascending hour order.
    pub fn peak_hours(&self) -> Vec<&str> {
        let peak = self.peak();
        if peak == 0 {
            return Vec::new();
        }
        self.0
            .iter()
            .filter(|(_, count)| **count == peak)
            .map(|(hour, _)| hour.as_str())
            .collect()
    }
}

/// Formats an hour key as the one-hour window it covers.
///
/// Hours outside `00..=23`, numeric or not, are shown verbatim.
pub fn hour_range_label(hour: &str) -> String {
    match hour.parse::<u32>() {
        Ok(h) if h < 24 => format!("Between {:02}:00 and {:02}:00", h, h + 1),
        _ => format!("Between {hour}:00 and the following hour"),
    }
}
