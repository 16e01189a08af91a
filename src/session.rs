//! Interactive survey session: ask for a date, analyze the matching file,
//! report, draw the histogram, repeat.

use anyhow::Result;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::analyzers::aggregate::process_csv_data;
use crate::analyzers::histogram::JunctionHistogram;
use crate::dates::SurveyDate;
use crate::error::SurveyError;
use crate::infra::SurveyCatalog;
use crate::output::{display_outcomes, save_results_to_file};
use crate::prompt::Prompter;
use crate::stats::SurveyStats;

const AGAIN_PROMPT: &str = "Do you want to select another data file for a different date? Y/N > ";

pub struct Session<'a> {
    catalog: &'a SurveyCatalog,
    results_file: PathBuf,
    color: bool,
}

impl<'a> Session<'a> {
    pub fn new(catalog: &'a SurveyCatalog, results_file: impl Into<PathBuf>) -> Self {
        Self {
            catalog,
            results_file: results_file.into(),
            color: false,
        }
    }

    /// Enables coloured histogram bars.
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Runs until the user declines another date or input ends.
    pub fn run<R: BufRead, W: Write>(&self, prompter: &mut Prompter<R, W>) -> Result<()> {
        match self.run_until_done(prompter) {
            Err(e) if matches!(e.downcast_ref::<SurveyError>(), Some(SurveyError::InputClosed)) => {
                info!("Input closed, ending session");
                Ok(())
            }
            other => other,
        }
    }

    fn run_until_done<R: BufRead, W: Write>(&self, prompter: &mut Prompter<R, W>) -> Result<()> {
        loop {
            let date = prompter.read_date()?;

            let Some((path, stats)) = self.load_csv_file(&date, prompter.output())? else {
                writeln!(prompter.output(), "No data available for the entered date.")?;
                continue;
            };

            let out = prompter.output();
            display_outcomes(out, Some(&stats))?;
            match save_results_to_file(&self.results_file, &stats) {
                Ok(()) => writeln!(
                    out,
                    "Results saved to {} successfully.",
                    self.results_file.display()
                )?,
                Err(e) => {
                    error!(error = %e, "Failed to save results");
                    writeln!(out, "{e:#}")?;
                }
            }

            self.draw_histogram(&path, &date, out)?;

            if !prompter.confirm(AGAIN_PROMPT)? {
                writeln!(prompter.output(), "End of run")?;
                return Ok(());
            }
        }
    }

    /// Looks `date` up in the catalog and aggregates its file. Returns `None`
    /// when the date is unknown or the file could not be processed.
    fn load_csv_file<W: Write>(
        &self,
        date: &SurveyDate,
        out: &mut W,
    ) -> Result<Option<(PathBuf, SurveyStats)>> {
        let (Some(file_name), Some(path)) =
            (self.catalog.file_name(date), self.catalog.path_for(date))
        else {
            info!(date = %date, "No survey file configured for date");
            return Ok(None);
        };

        writeln!(out, "Processing dataset for {date}...")?;

        match process_csv_data(&path) {
            Ok(stats) => {
                let stats = SurveyStats {
                    file_name: file_name.to_string(),
                    ..stats
                };
                Ok(Some((path, stats)))
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "Survey aggregation failed");
                writeln!(out, "Error: {e}")?;
                Ok(None)
            }
        }
    }

    fn draw_histogram<W: Write>(&self, path: &Path, date: &SurveyDate, out: &mut W) -> Result<()> {
        match JunctionHistogram::from_path(path) {
            Ok(histogram) => {
                writeln!(out)?;
                histogram.render(out, &date.to_string(), self.color)?;
            }
            Err(e) => {
                warn!(error = %e, "Histogram unavailable");
                writeln!(out, "Error loading or displaying histogram: {e}")?;
            }
        }
        Ok(())
    }
}
