//! Line-based prompts for the interactive session.

use std::fmt::Display;
use std::io::{BufRead, Write};
use std::str::FromStr;

use crate::dates::{DAY_RANGE, MONTH_RANGE, SurveyDate, YEAR_RANGE};
use crate::error::SurveyError;

/// Asks questions on `output` and reads answers from `input`, re-asking
/// until the answer is valid.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// The writer prompts go to, for callers that print between questions.
    pub fn output(&mut self) -> &mut W {
        &mut self.output
    }

    fn ask(&mut self, prompt: &str) -> Result<String, SurveyError> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(SurveyError::InputClosed);
        }
        Ok(line.trim().to_string())
    }

    /// Reads an integer in `min..=max`.
    pub fn read_int<T>(&mut self, prompt: &str, min: T, max: T) -> Result<T, SurveyError>
    where
        T: FromStr + PartialOrd + Display + Copy,
    {
        loop {
            let answer = self.ask(prompt)?;
            match answer.parse::<T>() {
                Ok(value) if value < min || value > max => writeln!(
                    self.output,
                    "Out of range - value must be in the range {min} to {max}."
                )?,
                Ok(value) => return Ok(value),
                Err(_) => writeln!(self.output, "Integer required.")?,
            }
        }
    }

    /// Reads day, month and year, starting over whenever the day does not
    /// exist in that month.
    pub fn read_date(&mut self) -> Result<SurveyDate, SurveyError> {
        loop {
            let day = self.read_int(
                "Please enter the day of the survey in the format dd: ",
                DAY_RANGE.0,
                DAY_RANGE.1,
            )?;
            let month = self.read_int(
                "Please enter the month of the survey in the format MM: ",
                MONTH_RANGE.0,
                MONTH_RANGE.1,
            )?;
            let year = self.read_int(
                "Please enter the year of the survey in the format YYYY: ",
                YEAR_RANGE.0,
                YEAR_RANGE.1,
            )?;

            match SurveyDate::new(day, month, year) {
                Ok(date) => return Ok(date),
                Err(e) => writeln!(self.output, "{e}")?,
            }
        }
    }

    /// Asks a Y/N question until one of the two is given (case-insensitive).
    pub fn confirm(&mut self, prompt: &str) -> Result<bool, SurveyError> {
        loop {
            match self.ask(prompt)?.to_uppercase().as_str() {
                "Y" => return Ok(true),
                "N" => return Ok(false),
                _ => writeln!(self.output, "Please enter 'Y' or 'N'.")?,
            }
        }
    }
}
