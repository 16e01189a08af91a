//! Hour-by-junction vehicle histogram.
//!
//! Re-reads the survey file on its own; it shares the row source with the
//! aggregation pipeline but none of its state.

use colored::Colorize;
use std::io::Write;
use std::path::Path;
use tracing::{debug, warn};

use crate::analyzers::types::{JUNCTIONS, hour_key, label_eq};
use crate::analyzers::utility::round_ratio;
use crate::error::SurveyError;
use crate::parser::{HISTOGRAM_COLUMNS, JunctionHourRow, open_survey};

/// Width in characters of the longest bar.
pub const BAR_WIDTH: usize = 40;

const HOURS: usize = 24;

/// Vehicle counts per hour for each junction in [`JUNCTIONS`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JunctionHistogram {
    counts: [[usize; HOURS]; JUNCTIONS.len()],
}

impl JunctionHistogram {
    /// Scans the survey file at `path` and counts vehicles per hour at each
    /// known junction. Other junctions are ignored.
    pub fn from_path(path: &Path) -> Result<Self, SurveyError> {
        let mut reader = open_survey(path, &HISTOGRAM_COLUMNS)?;
        let mut histogram = Self::default();

        for result in reader.rows::<JunctionHourRow>() {
            match result {
                Ok(row) => histogram.record(&row),
                Err(e) => warn!(error = %e, "Skipping undecodable row in histogram"),
            }
        }

        debug!(max = histogram.max_count(), "Histogram table built");
        Ok(histogram)
    }

    pub fn record(&mut self, row: &JunctionHourRow) {
        let Some(junction) = JUNCTIONS
            .iter()
            .position(|name| label_eq(&row.junction_name, name))
        else {
            return;
        };

        match hour_key(&row.time_of_day).parse::<usize>() {
            Ok(hour) if hour < HOURS => self.counts[junction][hour] += 1,
            _ => warn!(time = %row.time_of_day, "Ignoring row with unusable time of day"),
        }
    }

    pub fn count(&self, junction: usize, hour: usize) -> usize {
        self.counts[junction][hour]
    }

    pub fn max_count(&self) -> usize {
        self.counts
            .iter()
            .flat_map(|hours| hours.iter().copied())
            .max()
            .unwrap_or(0)
    }

    /// Writes the histogram as text bars scaled to [`BAR_WIDTH`].
    ///
    /// `date` is only used in the title.
    pub fn render<W: Write>(&self, out: &mut W, date: &str, color: bool) -> std::io::Result<()> {
        writeln!(out, "Histogram of Vehicle Frequency per Hour ({date})")?;
        writeln!(out)?;

        let max = self.max_count();
        if max == 0 {
            writeln!(out, "No traffic data available to display.")?;
            return Ok(());
        }

        for (j, junction) in JUNCTIONS.iter().enumerate() {
            writeln!(out, "  {} {junction}", paint("██", j, color))?;
        }
        writeln!(out)?;

        for hour in 0..HOURS {
            for j in 0..JUNCTIONS.len() {
                let count = self.counts[j][hour];
                let label = if j == 0 {
                    format!("{hour:02}")
                } else {
                    "  ".to_string()
                };
                let bar = "█".repeat(round_ratio(count * BAR_WIDTH, max));

                if count > 0 {
                    writeln!(out, "{label} │{} {count}", paint(&bar, j, color))?;
                } else {
                    writeln!(out, "{label} │")?;
                }
            }
        }

        writeln!(out)?;
        writeln!(out, "Hours 00:00 to 24:00")?;
        Ok(())
    }
}

fn paint(text: &str, junction: usize, color: bool) -> String {
    if !color {
        return text.to_string();
    }
    match junction {
        0 => text.truecolor(0x90, 0xEE, 0x90).to_string(),
        _ => text.truecolor(0xFF, 0xA0, 0x7A).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::types::{ELM_AVENUE, HANLEY_HIGHWAY};

    fn jh(junction: &str, time: &str) -> JunctionHourRow {
        JunctionHourRow {
            junction_name: junction.into(),
            time_of_day: time.into(),
        }
    }

    fn render_plain(histogram: &JunctionHistogram) -> String {
        let mut buf = Vec::new();
        histogram.render(&mut buf, "15/06/2024", false).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_record_counts_known_junctions_only() {
        let mut histogram = JunctionHistogram::default();
        histogram.record(&jh(ELM_AVENUE, "08:15"));
        histogram.record(&jh(ELM_AVENUE, "8:45"));
        histogram.record(&jh(HANLEY_HIGHWAY, "17:00"));
        histogram.record(&jh("Somewhere Else", "17:00"));
        histogram.record(&jh(HANLEY_HIGHWAY, "25:00"));

        assert_eq!(histogram.count(0, 8), 2);
        assert_eq!(histogram.count(1, 17), 1);
        assert_eq!(histogram.max_count(), 2);
    }

    #[test]
    fn test_render_empty_histogram() {
        let output = render_plain(&JunctionHistogram::default());

        assert!(output.starts_with("Histogram of Vehicle Frequency per Hour (15/06/2024)"));
        assert!(output.contains("No traffic data available to display."));
        assert!(!output.contains("Hours 00:00 to 24:00"));
    }

    #[test]
    fn test_render_scales_longest_bar_to_full_width() {
        let mut histogram = JunctionHistogram::default();
        for _ in 0..4 {
            histogram.record(&jh(HANLEY_HIGHWAY, "09:00"));
        }
        histogram.record(&jh(ELM_AVENUE, "09:30"));

        let output = render_plain(&histogram);
        let full = format!("   │{} 4", "█".repeat(BAR_WIDTH));
        let quarter = format!("09 │{} 1", "█".repeat(BAR_WIDTH / 4));

        assert!(output.lines().any(|l| l == full));
        assert!(output.lines().any(|l| l == quarter));
        assert!(output.contains(ELM_AVENUE));
        assert!(output.contains(HANLEY_HIGHWAY));
        assert!(output.trim_end().ends_with("Hours 00:00 to 24:00"));
    }

    #[test]
    fn test_render_lists_every_hour() {
        let mut histogram = JunctionHistogram::default();
        histogram.record(&jh(ELM_AVENUE, "00:01"));

        let output = render_plain(&histogram);
        for hour in 0..24 {
            let prefix = format!("{hour:02} │");
            assert!(output.lines().any(|l| l.starts_with(&prefix)), "hour {hour}");
        }
    }
}
