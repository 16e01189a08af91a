use anyhow::{Context, Result, anyhow};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::dates::SurveyDate;

/// Maps survey dates to the CSV file recorded on that day.
///
/// Stored as a plain JSON object on disk, keyed by `dd/MM/yyyy`:
/// ```json
/// {
///   "15/06/2024": "traffic_data15062024.csv",
///   "16/06/2024": "traffic_data16062024.csv"
/// }
/// ```
#[derive(Debug, Clone)]
pub struct SurveyCatalog {
    entries: BTreeMap<SurveyDate, String>,
    data_dir: Option<PathBuf>,
}

impl Default for SurveyCatalog {
    /// The three survey days shipped with the data set.
    fn default() -> Self {
        let entries = [
            (15, "traffic_data15062024.csv"),
            (16, "traffic_data16062024.csv"),
            (21, "traffic_data21062024.csv"),
        ]
        .into_iter()
        .filter_map(|(day, file)| {
            SurveyDate::new(day, 6, 2024)
                .ok()
                .map(|date| (date, file.to_string()))
        })
        .collect();

        Self {
            entries,
            data_dir: None,
        }
    }
}

impl SurveyCatalog {
    /// Loads the catalog from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog '{}'", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("Invalid catalog '{}'", path.display()))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let raw: BTreeMap<String, String> = serde_json::from_str(content)?;

        let entries: BTreeMap<SurveyDate, String> = raw
            .into_iter()
            .map(|(key, file)| {
                SurveyDate::parse(&key)
                    .map(|date| (date, file))
                    .ok_or_else(|| anyhow!("'{key}' is not a dd/MM/yyyy date"))
            })
            .collect::<Result<_>>()?;

        Ok(Self {
            entries,
            data_dir: None,
        })
    }

    /// Resolves file names relative to `dir`.
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    /// Returns the file name configured for `date`, if any.
    pub fn file_name(&self, date: &SurveyDate) -> Option<&str> {
        self.entries.get(date).map(String::as_str)
    }

    /// Returns the path of the file for `date`, joined onto the data
    /// directory when one is set.
    pub fn path_for(&self, date: &SurveyDate) -> Option<PathBuf> {
        let file = self.file_name(date)?;
        Some(match &self.data_dir {
            Some(dir) => dir.join(file),
            None => PathBuf::from(file),
        })
    }

    /// Iterates over all `(date, file_name)` pairs in date order.
    pub fn iter(&self) -> impl Iterator<Item = (&SurveyDate, &str)> {
        self.entries.iter().map(|(k, v)| (k, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
