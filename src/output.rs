//! Output formatting and persistence for survey statistics.
//!
//! The text report is shared by the console and the results log, so both
//! stay word-for-word identical. JSON and CSV summaries are also supported.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

use crate::stats::SurveyStats;

const RULE: &str = "***************************";

/// Default results log, appended to after every run.
pub const DEFAULT_RESULTS_FILE: &str = "results.txt";

/// Writes the human-readable report for `stats`.
pub fn write_report<W: Write>(out: &mut W, stats: &SurveyStats) -> std::io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{RULE}")?;
    writeln!(out, "Data file selected is {}", stats.file_name)?;
    writeln!(out, "{RULE}")?;
    writeln!(
        out,
        "The total number of vehicles recorded for this date is {}",
        stats.total_vehicles
    )?;
    writeln!(out, "The total number of trucks recorded for this date is {}", stats.total_trucks)?;
    writeln!(
        out,
        "The total number of electric vehicles for this date is {}",
        stats.total_electric
    )?;
    writeln!(
        out,
        "The total number of two-wheeled vehicles for this date is {}",
        stats.two_wheeled
    )?;
    writeln!(
        out,
        "The total number of Buses leaving Elm Avenue/Rabbit Road heading North is {}",
        stats.buses_north
    )?;
    writeln!(
        out,
        "The total number of Vehicles through both junctions not turning left or right is {}",
        stats.no_turns
    )?;
    writeln!(
        out,
        "The percentage of total vehicles recorded that are trucks for this date is {}%",
        stats.trucks_percentage
    )?;
    writeln!(
        out,
        "The average number of Bikes per hour for this date is {}",
        stats.average_bicycles_per_hour
    )?;
    writeln!(out)?;
    writeln!(
        out,
        "The total number of Vehicles recorded as over the speed limit for this date is {}",
        stats.over_speed_limit
    )?;
    writeln!(
        out,
        "The total number of vehicles recorded through Elm Avenue/Rabbit Road junction is {}",
        stats.elm_avenue_vehicles
    )?;
    writeln!(
        out,
        "The total number of vehicles recorded through Hanley Highway/Westway junction is {}",
        stats.hanley_highway_vehicles
    )?;
    writeln!(
        out,
        "{}% of vehicles recorded through Elm Avenue/Rabbit Road are scooters.",
        stats.scooters_percentage_elm
    )?;
    writeln!(out)?;
    writeln!(
        out,
        "The highest number of vehicles in an hour on Hanley Highway/Westway is {}",
        stats.peak_traffic_count
    )?;
    writeln!(
        out,
        "The most vehicles through Hanley Highway/Westway were recorded {}",
        stats.peak_hours_display()
    )?;
    writeln!(out, "The number of hours of rain for this date is {}", stats.rain_hours)?;
    Ok(())
}

/// Writes the report to `out`, or a notice when there is nothing to show.
pub fn display_outcomes<W: Write>(out: &mut W, stats: Option<&SurveyStats>) -> std::io::Result<()> {
    match stats {
        Some(stats) => write_report(out, stats),
        None => writeln!(out, "No valid data to display."),
    }
}

/// Appends the report, followed by a blank line, to the results log at
/// `path`. The file is created if missing.
pub fn save_results_to_file(path: &Path, stats: &SurveyStats) -> Result<()> {
    let mut file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .with_context(|| format!("Error saving results to file '{}'", path.display()))?;

    write_report(&mut file, stats)?;
    writeln!(file)?;

    info!(path = %path.display(), "Results appended");
    Ok(())
}

/// Logs survey statistics using Rust's debug pretty-print format.
pub fn print_pretty(stats: &SurveyStats) {
    debug!("{:#?}", stats);
}

/// Writes survey statistics as pretty-printed JSON.
pub fn print_json<W: Write>(out: &mut W, stats: &SurveyStats) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, stats)?;
    writeln!(out)?;
    Ok(())
}

/// One flat row of the CSV summary log.
#[derive(Debug, Serialize)]
pub struct SummaryRecord<'a> {
    pub timestamp: DateTime<Utc>,
    pub file_name: &'a str,
    pub total_vehicles: usize,
    pub total_trucks: usize,
    pub total_electric: usize,
    pub two_wheeled: usize,
    pub buses_north: usize,
    pub no_turns: usize,
    pub trucks_percentage: usize,
    pub average_bicycles_per_hour: usize,
    pub over_speed_limit: usize,
    pub elm_avenue_vehicles: usize,
    pub hanley_highway_vehicles: usize,
    pub scooters_percentage_elm: usize,
    pub peak_traffic_count: usize,
    pub peak_traffic_hours: String,
    pub rain_hours: usize,
    pub skipped_rows: usize,
}

impl<'a> SummaryRecord<'a> {
    pub fn new(stats: &'a SurveyStats) -> Self {
        Self {
            timestamp: Utc::now(),
            file_name: &stats.file_name,
            total_vehicles: stats.total_vehicles,
            total_trucks: stats.total_trucks,
            total_electric: stats.total_electric,
            two_wheeled: stats.two_wheeled,
            buses_north: stats.buses_north,
            no_turns: stats.no_turns,
            trucks_percentage: stats.trucks_percentage,
            average_bicycles_per_hour: stats.average_bicycles_per_hour,
            over_speed_limit: stats.over_speed_limit,
            elm_avenue_vehicles: stats.elm_avenue_vehicles,
            hanley_highway_vehicles: stats.hanley_highway_vehicles,
            scooters_percentage_elm: stats.scooters_percentage_elm,
            peak_traffic_count: stats.peak_traffic_count,
            peak_traffic_hours: stats.peak_traffic_hours.join("; "),
            rain_hours: stats.rain_hours,
            skipped_rows: stats.skipped_rows,
        }
    }
}

/// Appends a [`SummaryRecord`] for `stats` as a row to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_record(path: &Path, stats: &SurveyStats) -> Result<()> {
    let file_exists = path.exists();
    debug!(path = %path.display(), file_exists, "Appending CSV record");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    writer.serialize(SummaryRecord::new(stats))?;
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    fn sample_stats() -> SurveyStats {
        SurveyStats {
            file_name: "traffic_data15062024.csv".into(),
            total_vehicles: 1038,
            total_trucks: 109,
            total_electric: 361,
            two_wheeled: 376,
            buses_north: 13,
            no_turns: 337,
            trucks_percentage: 11,
            average_bicycles_per_hour: 8,
            over_speed_limit: 203,
            elm_avenue_vehicles: 501,
            hanley_highway_vehicles: 537,
            scooters_percentage_elm: 5,
            peak_traffic_count: 37,
            peak_traffic_hours: vec!["Between 18:00 and 19:00".into()],
            rain_hours: 8,
            ..Default::default()
        }
    }

    const EXPECTED: &str = "
***************************
Data file selected is traffic_data15062024.csv
***************************
The total number of vehicles recorded for this date is 1038
The total number of trucks recorded for this date is 109
The total number of electric vehicles for this date is 361
The total number of two-wheeled vehicles for this date is 376
The total number of Buses leaving Elm Avenue/Rabbit Road heading North is 13
The total number of Vehicles through both junctions not turning left or right is 337
The percentage of total vehicles recorded that are trucks for this date is 11%
The average number of Bikes per hour for this date is 8

The total number of Vehicles recorded as over the speed limit for this date is 203
The total number of vehicles recorded through Elm Avenue/Rabbit Road junction is 501
The total number of vehicles recorded through Hanley Highway/Westway junction is 537
5% of vehicles recorded through Elm Avenue/Rabbit Road are scooters.

The highest number of vehicles in an hour on Hanley Highway/Westway is 37
The most vehicles through Hanley Highway/Westway were recorded Between 18:00 and 19:00
The number of hours of rain for this date is 8
";

    #[test]
    fn test_report_template() {
        let mut buf = Vec::new();
        write_report(&mut buf, &sample_stats()).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), EXPECTED);
    }

    #[test]
    fn test_display_outcomes_without_data() {
        let mut buf = Vec::new();
        display_outcomes(&mut buf, None).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "No valid data to display.\n");
    }

    #[test]
    fn test_display_matches_saved_entry() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("results.txt");
        let stats = sample_stats();

        let mut buf = Vec::new();
        display_outcomes(&mut buf, Some(&stats)).unwrap();
        save_results_to_file(&path, &stats).unwrap();

        let saved = fs::read_to_string(&path).unwrap();
        assert_eq!(saved, format!("{}\n", String::from_utf8(buf).unwrap()));
    }

    #[test]
    fn test_save_results_appends() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("results.txt");
        let stats = sample_stats();

        save_results_to_file(&path, &stats).unwrap();
        save_results_to_file(&path, &stats).unwrap();

        let saved = fs::read_to_string(&path).unwrap();
        assert_eq!(saved.matches("Data file selected is").count(), 2);
    }

    #[test]
    fn test_print_pretty_does_not_panic() {
        print_pretty(&sample_stats());
    }

    #[test]
    fn test_print_json_is_valid_json() {
        let mut buf = Vec::new();
        print_json(&mut buf, &sample_stats()).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["total_vehicles"], 1038);
        assert_eq!(value["peak_traffic_hours"][0], "Between 18:00 and 19:00");
    }

    #[test]
    fn test_append_record_writes_header_once() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("summary.csv");
        let stats = sample_stats();

        append_record(&path, &stats).unwrap();
        append_record(&path, &stats).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        // 1 header + 2 data rows
        assert_eq!(lines.len(), 3);
        assert_eq!(lines.iter().filter(|l| l.starts_with("timestamp")).count(), 1);
        assert!(lines[1].contains("traffic_data15062024.csv"));
    }
}
