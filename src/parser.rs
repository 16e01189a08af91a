//! CSV row source for daily survey files.
//!
//! Both the aggregation pipeline and the histogram renderer read survey
//! files through [`open_survey`]; each picks the row shape it needs.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use tracing::debug;

use crate::error::SurveyError;

/// Columns every survey file must carry for the aggregation pipeline.
pub const REQUIRED_COLUMNS: [&str; 9] = [
    "VehicleType",
    "elctricHybrid",
    "JunctionName",
    "VehicleSpeed",
    "JunctionSpeedLimit",
    "timeOfDay",
    "Weather_Conditions",
    "travel_Direction_in",
    "travel_Direction_out",
];

/// Columns the histogram needs.
pub const HISTOGRAM_COLUMNS: [&str; 2] = ["JunctionName", "timeOfDay"];

/// A single vehicle observation. Values are kept as raw strings; numeric
/// fields are parsed where they are used.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SurveyRow {
    #[serde(rename = "VehicleType")]
    pub vehicle_type: String,
    #[serde(rename = "elctricHybrid")]
    pub electric_hybrid: String,
    #[serde(rename = "JunctionName")]
    pub junction_name: String,
    #[serde(rename = "VehicleSpeed")]
    pub vehicle_speed: String,
    #[serde(rename = "JunctionSpeedLimit")]
    pub junction_speed_limit: String,
    #[serde(rename = "timeOfDay")]
    pub time_of_day: String,
    #[serde(rename = "Weather_Conditions")]
    pub weather_conditions: String,
    #[serde(rename = "travel_Direction_in")]
    pub direction_in: String,
    #[serde(rename = "travel_Direction_out")]
    pub direction_out: String,
}

impl SurveyRow {
    fn required_values(&self) -> [&str; 9] {
        [
            &self.vehicle_type,
            &self.electric_hybrid,
            &self.junction_name,
            &self.vehicle_speed,
            &self.junction_speed_limit,
            &self.time_of_day,
            &self.weather_conditions,
            &self.direction_in,
            &self.direction_out,
        ]
    }

    /// Returns `true` when every required value is non-blank after trimming.
    pub fn is_complete(&self) -> bool {
        self.required_values()
            .iter()
            .all(|value| !value.trim().is_empty())
    }
}

/// The subset of a row used by the hourly histogram.
#[derive(Debug, Clone, Deserialize)]
pub struct JunctionHourRow {
    #[serde(rename = "JunctionName")]
    pub junction_name: String,
    #[serde(rename = "timeOfDay")]
    pub time_of_day: String,
}

/// A CSV reader whose header has already been checked against a set of
/// required columns.
pub struct SurveyReader<R> {
    inner: csv::Reader<R>,
}

/// Opens a survey file and validates its header.
///
/// # Errors
///
/// [`SurveyError::FileNotFound`] if the path does not exist and
/// [`SurveyError::MissingColumns`] if the header lacks any of `required`.
pub fn open_survey(path: &Path, required: &[&str]) -> Result<SurveyReader<File>, SurveyError> {
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => SurveyError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => SurveyError::Io(e),
    })?;
    debug!(path = %path.display(), "Opened survey file");

    SurveyReader::from_reader(file, required)
}

impl<R: Read> SurveyReader<R> {
    pub fn from_reader(rdr: R, required: &[&str]) -> Result<Self, SurveyError> {
        let mut inner = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(rdr);

        check_columns(inner.headers()?, required)?;

        Ok(Self { inner })
    }

    /// Streams the remaining records decoded as `T`.
    ///
    /// Each item is decoded independently, so a malformed record yields an
    /// `Err` without ending the iteration.
    pub fn rows<'a, T: DeserializeOwned + 'a>(
        &'a mut self,
    ) -> impl Iterator<Item = csv::Result<T>> + 'a {
        self.inner.deserialize()
    }
}

fn check_columns(headers: &csv::StringRecord, required: &[&str]) -> Result<(), SurveyError> {
    let present: BTreeSet<&str> = headers.iter().collect();

    let mut missing: Vec<String> = required
        .iter()
        .filter(|col| !present.contains(*col))
        .map(|col| col.to_string())
        .collect();

    if missing.is_empty() {
        return Ok(());
    }

    missing.sort();
    Err(SurveyError::MissingColumns { columns: missing })
}
