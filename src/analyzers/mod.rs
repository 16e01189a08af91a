//! Survey aggregation and hourly histograms.
//!
//! This module streams survey rows once, counts vehicles by type, junction
//! and hour, and derives the percentages and peaks shown in the report.

pub mod aggregate;
pub mod histogram;
pub mod types;
pub mod utility;
