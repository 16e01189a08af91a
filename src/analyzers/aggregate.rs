use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

use crate::analyzers::types::{
    ELM_AVENUE, HANLEY_HIGHWAY, HourlyCounts, hour_key, hour_range_label, label_eq,
};
use crate::analyzers::utility::{pct, round_ratio};
use crate::error::SurveyError;
use crate::parser::{REQUIRED_COLUMNS, SurveyReader, SurveyRow, open_survey};
use crate::stats::SurveyStats;

static TWO_WHEELED: &[&str] = &["bicycle", "motorbike", "scooter", "motorcycle"];

/// Streams a survey file once and returns its [`SurveyStats`].
///
/// Only a missing file or missing required columns abort the run. Rows with
/// blank required values or that fail to decode are skipped and logged.
#[tracing::instrument(skip(path), fields(path = %path.display()))]
pub fn process_csv_data(path: &Path) -> Result<SurveyStats, SurveyError> {
    let mut reader = open_survey(path, &REQUIRED_COLUMNS)?;
    let stats = aggregate_reader(&path.display().to_string(), &mut reader);
    info!(
        total_vehicles = stats.total_vehicles,
        skipped_rows = stats.skipped_rows,
        invalid_speed_rows = stats.invalid_speed_rows,
        "Survey file aggregated"
    );

    Ok(stats)
}

/// Aggregates every remaining row of an already validated reader.
///
/// The reader's header was checked when it was built, so this cannot fail.
/// Records that do not decode are logged and counted in `skipped_rows`.
pub fn aggregate_reader<R: Read>(file_name: &str, reader: &mut SurveyReader<R>) -> SurveyStats {
    let mut tally = SurveyTally::default();

    for (index, result) in reader.rows::<SurveyRow>().enumerate() {
        match result {
            Ok(row) => tally.observe(&row),
            Err(e) => {
                // header is line 1
                warn!(line = index + 2, error = %e, "Skipping undecodable row");
                tally.skipped_rows += 1;
            }
        }
    }

    tally.finish(file_name)
}

/// Aggregates rows that have already been decoded.
pub fn aggregate_rows<'a>(
    file_name: &str,
    rows: impl IntoIterator<Item = &'a SurveyRow>,
) -> SurveyStats {
    let mut tally = SurveyTally::default();
    for row in rows {
        tally.observe(row);
    }
    tally.finish(file_name)
}

/// Running counters for one pass over a survey file.
#[derive(Debug, Default)]
pub struct SurveyTally {
    total_vehicles: usize,
    total_trucks: usize,
    total_electric: usize,
    two_wheeled: usize,
    buses_north: usize,
    no_turns: usize,
    over_speed_limit: usize,
    elm_avenue_vehicles: usize,
    hanley_highway_vehicles: usize,
    scooters_elm_avenue: usize,
    hanley_traffic_by_hour: HourlyCounts,
    bicycles_per_hour: HourlyCounts,
    rain_hours: BTreeSet<String>,
    skipped_rows: usize,
    invalid_speed_rows: usize,
}

impl SurveyTally {
    pub fn observe(&mut self, row: &SurveyRow) {
        if !row.is_complete() {
            warn!(?row, "Skipping row with missing values");
            self.skipped_rows += 1;
            return;
        }

        self.total_vehicles += 1;

        let vehicle_type = row.vehicle_type.trim().to_lowercase();

        if vehicle_type == "truck" {
            self.total_trucks += 1;
        }

        if label_eq(&row.electric_hybrid, "true") {
            self.total_electric += 1;
        }

        if TWO_WHEELED.contains(&vehicle_type.as_str()) {
            self.two_wheeled += 1;
        }

        let at_elm = label_eq(&row.junction_name, ELM_AVENUE);

        // "buss" is the label used by the survey data, not a typo here
        if at_elm && label_eq(&row.direction_out, "N") && vehicle_type == "buss" {
            self.buses_north += 1;
        }

        if row.direction_in.trim() == row.direction_out.trim() {
            self.no_turns += 1;
        }

        match (
            row.vehicle_speed.trim().parse::<i64>(),
            row.junction_speed_limit.trim().parse::<i64>(),
        ) {
            (Ok(speed), Ok(limit)) => {
                if speed > limit {
                    self.over_speed_limit += 1;
                }
            }
            _ => {
                warn!(
                    speed = %row.vehicle_speed,
                    limit = %row.junction_speed_limit,
                    "Invalid speed data in row"
                );
                self.invalid_speed_rows += 1;
            }
        }

        if at_elm {
            self.elm_avenue_vehicles += 1;
            if vehicle_type == "scooter" {
                self.scooters_elm_avenue += 1;
            }
        } else if label_eq(&row.junction_name, HANLEY_HIGHWAY) {
            self.hanley_highway_vehicles += 1;
            self.hanley_traffic_by_hour
                .increment(hour_key(&row.time_of_day));
        }

        if vehicle_type == "bicycle" {
            self.bicycles_per_hour.increment(hour_key(&row.time_of_day));
        }

        if label_eq(&row.weather_conditions, "rain") {
            self.rain_hours.insert(hour_key(&row.time_of_day));
        }
    }

    pub fn finish(self, file_name: &str) -> SurveyStats {
        let peak_traffic_count = self.hanley_traffic_by_hour.peak();
        let peak_traffic_hours = self
            .hanley_traffic_by_hour
            .peak_hours()
            .into_iter()
            .map(hour_range_label)
            .collect();

        SurveyStats {
            file_name: file_name.to_string(),
            total_vehicles: self.total_vehicles,
            total_trucks: self.total_trucks,
            total_electric: self.total_electric,
            two_wheeled: self.two_wheeled,
            buses_north: self.buses_north,
            no_turns: self.no_turns,
            over_speed_limit: self.over_speed_limit,
            elm_avenue_vehicles: self.elm_avenue_vehicles,
            hanley_highway_vehicles: self.hanley_highway_vehicles,
            scooters_elm_avenue: self.scooters_elm_avenue,
            trucks_percentage: pct(self.total_trucks, self.total_vehicles),
            scooters_percentage_elm: pct(self.scooters_elm_avenue, self.elm_avenue_vehicles),
            average_bicycles_per_hour: round_ratio(self.bicycles_per_hour.total(), 24),
            hanley_traffic_by_hour: self.hanley_traffic_by_hour,
            peak_traffic_count,
            peak_traffic_hours,
            rain_hours: self.rain_hours.len(),
            skipped_rows: self.skipped_rows,
            invalid_speed_rows: self.invalid_speed_rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(vehicle_type: &str, junction: &str, time: &str) -> SurveyRow {
        SurveyRow {
            vehicle_type: vehicle_type.into(),
            electric_hybrid: "False".into(),
            junction_name: junction.into(),
            vehicle_speed: "20".into(),
            junction_speed_limit: "30".into(),
            time_of_day: time.into(),
            weather_conditions: "Fine".into(),
            direction_in: "N".into(),
            direction_out: "E".into(),
        }
    }

    #[test]
    fn test_empty_input_yields_zeroes() {
        let stats = aggregate_rows("empty.csv", std::iter::empty());

        assert_eq!(stats.file_name, "empty.csv");
        assert_eq!(stats.total_vehicles, 0);
        assert_eq!(stats.trucks_percentage, 0);
        assert_eq!(stats.scooters_percentage_elm, 0);
        assert_eq!(stats.average_bicycles_per_hour, 0);
        assert_eq!(stats.peak_traffic_count, 0);
        assert!(stats.peak_traffic_hours.is_empty());
        assert_eq!(stats.rain_hours, 0);
    }

    const HEADER: &str = "JunctionName,timeOfDay,travel_Direction_in,travel_Direction_out,\
                          Weather_Conditions,JunctionSpeedLimit,VehicleSpeed,VehicleType,\
                          elctricHybrid";

    #[test]
    fn test_reader_counts_undecodable_rows() {
        let data = format!(
            "{HEADER}\n\
             Hanley Highway/Westway,08:15,N,S,Rain,30,41,Car,True\n\
             Elm Avenue/Rabbit Road,09:00\n\
             Elm Avenue/Rabbit Road,09:30,E,E,Fine,20,18,Scooter,False\n"
        );
        let mut reader = SurveyReader::from_reader(data.as_bytes(), &REQUIRED_COLUMNS).unwrap();

        let stats = aggregate_reader("memory.csv", &mut reader);

        assert_eq!(stats.file_name, "memory.csv");
        assert_eq!(stats.total_vehicles, 2);
        assert_eq!(stats.skipped_rows, 1);
        assert_eq!(stats.over_speed_limit, 1);
        assert_eq!(stats.scooters_elm_avenue, 1);
        assert_eq!(stats.rain_hours, 1);
    }

    #[test]
    fn test_reader_input_gets_schema_check() {
        let data = "JunctionName,timeOfDay,VehicleType\nElm Avenue/Rabbit Road,09:00,Car\n";
        let err = SurveyReader::from_reader(data.as_bytes(), &REQUIRED_COLUMNS)
            .err()
            .unwrap();

        assert!(matches!(err, SurveyError::MissingColumns { columns } if columns.len() == 6));
    }

    #[test]
    fn test_out_of_range_hour_does_not_abort() {
        let data = format!(
            "{HEADER}\nHanley Highway/Westway,4294967295:00,N,S,Fine,30,41,Car,False\n"
        );
        let mut reader = SurveyReader::from_reader(data.as_bytes(), &REQUIRED_COLUMNS).unwrap();

        let stats = aggregate_reader("memory.csv", &mut reader);

        assert_eq!(stats.peak_traffic_count, 1);
        assert_eq!(
            stats.peak_traffic_hours,
            vec!["Between 4294967295:00 and the following hour"]
        );
    }

    #[test]
    fn test_vehicle_type_counters() {
        let rows = vec![
            row("Truck", ELM_AVENUE, "08:00"),
            row("truck", HANLEY_HIGHWAY, "08:10"),
            row("Car", HANLEY_HIGHWAY, "08:20"),
            row("Motorcycle", HANLEY_HIGHWAY, "09:00"),
            row("Scooter", ELM_AVENUE, "09:10"),
            row("Bicycle", ELM_AVENUE, "09:20"),
        ];
        let stats = aggregate_rows("t.csv", &rows);

        assert_eq!(stats.total_vehicles, 6);
        assert_eq!(stats.total_trucks, 2);
        assert_eq!(stats.two_wheeled, 3);
        assert_eq!(stats.trucks_percentage, 33);
        assert_eq!(stats.elm_avenue_vehicles, 3);
        assert_eq!(stats.hanley_highway_vehicles, 3);
        assert_eq!(stats.scooters_elm_avenue, 1);
        assert_eq!(stats.scooters_percentage_elm, 33);
    }

    #[test]
    fn test_electric_flag_is_case_insensitive() {
        let mut a = row("Car", ELM_AVENUE, "10:00");
        a.electric_hybrid = "TRUE".into();
        let mut b = row("Car", ELM_AVENUE, "10:00");
        b.electric_hybrid = "true".into();
        let c = row("Car", ELM_AVENUE, "10:00");

        let stats = aggregate_rows("t.csv", &[a, b, c]);
        assert_eq!(stats.total_electric, 2);
    }

    #[test]
    fn test_buses_north_matches_buss_label_only() {
        let mut buss = row("Buss", ELM_AVENUE, "07:00");
        buss.direction_out = "N".into();
        let mut bus = row("Bus", ELM_AVENUE, "07:00");
        bus.direction_out = "N".into();
        let mut south = row("Buss", ELM_AVENUE, "07:00");
        south.direction_out = "S".into();
        let mut hanley = row("Buss", HANLEY_HIGHWAY, "07:00");
        hanley.direction_out = "N".into();

        let stats = aggregate_rows("t.csv", &[buss, bus, south, hanley]);
        assert_eq!(stats.buses_north, 1);
    }

    #[test]
    fn test_no_turns_compares_directions() {
        let mut straight = row("Car", ELM_AVENUE, "07:00");
        straight.direction_out = "N".into();
        let turning = row("Car", ELM_AVENUE, "07:00");

        let stats = aggregate_rows("t.csv", &[straight, turning]);
        assert_eq!(stats.no_turns, 1);
    }

    #[test]
    fn test_over_speed_limit_is_strict() {
        let mut over = row("Car", ELM_AVENUE, "07:00");
        over.vehicle_speed = "31".into();
        let mut at_limit = row("Car", ELM_AVENUE, "07:00");
        at_limit.vehicle_speed = "30".into();

        let stats = aggregate_rows("t.csv", &[over, at_limit]);
        assert_eq!(stats.over_speed_limit, 1);
    }

    #[test]
    fn test_non_numeric_speed_only_skips_over_speed_metric() {
        let mut bad = row("Bicycle", HANLEY_HIGHWAY, "11:30");
        bad.vehicle_speed = "fast".into();
        bad.weather_conditions = "Rain".into();

        let stats = aggregate_rows("t.csv", &[bad]);

        assert_eq!(stats.total_vehicles, 1);
        assert_eq!(stats.two_wheeled, 1);
        assert_eq!(stats.over_speed_limit, 0);
        assert_eq!(stats.invalid_speed_rows, 1);
        assert_eq!(stats.hanley_highway_vehicles, 1);
        assert_eq!(stats.hanley_traffic_by_hour.get("11"), 1);
        assert_eq!(stats.rain_hours, 1);
    }

    #[test]
    fn test_blank_speed_skips_whole_row() {
        let mut blank = row("Truck", HANLEY_HIGHWAY, "11:30");
        blank.vehicle_speed = " ".into();

        let stats = aggregate_rows("t.csv", &[blank]);

        assert_eq!(stats.total_vehicles, 0);
        assert_eq!(stats.total_trucks, 0);
        assert_eq!(stats.skipped_rows, 1);
        assert!(stats.hanley_traffic_by_hour.is_empty());
    }

    #[test]
    fn test_average_bicycles_per_hour() {
        let rows: Vec<SurveyRow> = (0..48)
            .map(|i| row("Bicycle", ELM_AVENUE, &format!("{:02}:05", i % 24)))
            .collect();

        let stats = aggregate_rows("t.csv", &rows);
        assert_eq!(stats.average_bicycles_per_hour, 2);
    }

    #[test]
    fn test_peak_hours_list_every_tied_hour() {
        let mut rows = Vec::new();
        for _ in 0..12 {
            rows.push(row("Car", HANLEY_HIGHWAY, "08:30"));
            rows.push(row("Car", HANLEY_HIGHWAY, "17:45"));
        }
        rows.push(row("Car", HANLEY_HIGHWAY, "12:00"));
        rows.push(row("Car", ELM_AVENUE, "12:00"));

        let stats = aggregate_rows("t.csv", &rows);

        assert_eq!(stats.peak_traffic_count, 12);
        assert_eq!(
            stats.peak_traffic_hours,
            vec!["Between 08:00 and 09:00", "Between 17:00 and 18:00"]
        );
    }

    #[test]
    fn test_rain_hours_are_distinct() {
        let mut a = row("Car", ELM_AVENUE, "09:05");
        a.weather_conditions = "Rain".into();
        let mut b = row("Car", HANLEY_HIGHWAY, "09:55");
        b.weather_conditions = "rain".into();
        let mut c = row("Car", HANLEY_HIGHWAY, "14:00");
        c.weather_conditions = "RAIN".into();
        let mut d = row("Car", HANLEY_HIGHWAY, "15:00");
        d.weather_conditions = "Heavy Rain".into();

        let stats = aggregate_rows("t.csv", &[a, b, c, d]);
        assert_eq!(stats.rain_hours, 2);
    }

    #[test]
    fn test_subset_counts_never_exceed_total() {
        let mut rows = vec![
            row("Truck", ELM_AVENUE, "01:00"),
            row("Bicycle", HANLEY_HIGHWAY, "02:00"),
            row("Car", HANLEY_HIGHWAY, "03:00"),
        ];
        rows[2].electric_hybrid = "True".into();

        let stats = aggregate_rows("t.csv", &rows);
        assert!(stats.total_vehicles >= stats.total_trucks);
        assert!(stats.total_vehicles >= stats.total_electric);
        assert!(stats.total_vehicles >= stats.two_wheeled);
        assert!(stats.trucks_percentage <= 100);
    }
}
