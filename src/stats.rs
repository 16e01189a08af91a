use serde::Serialize;

use crate::analyzers::types::HourlyCounts;

/// Aggregate statistics for a single survey file.
///
/// Built by [`crate::analyzers::aggregate::process_csv_data`] and read-only
/// afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SurveyStats {
    pub file_name: String,

    // counters
    pub total_vehicles: usize,
    pub total_trucks: usize,
    pub total_electric: usize,
    pub two_wheeled: usize,
    pub buses_north: usize,
    pub no_turns: usize,
    pub over_speed_limit: usize,
    pub elm_avenue_vehicles: usize,
    pub hanley_highway_vehicles: usize,
    pub scooters_elm_avenue: usize,

    // derived
    pub trucks_percentage: usize,
    pub scooters_percentage_elm: usize,
    pub average_bicycles_per_hour: usize,
    pub hanley_traffic_by_hour: HourlyCounts,
    pub peak_traffic_count: usize,
    pub peak_traffic_hours: Vec<String>,
    pub rain_hours: usize,

    // row diagnostics
    pub skipped_rows: usize,
    pub invalid_speed_rows: usize,
}

impl SurveyStats {
    /// Peak hour labels joined the way the report prints them.
    pub fn peak_hours_display(&self) -> String {
        self.peak_traffic_hours.join(", ")
    }
}
