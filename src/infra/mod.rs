//! Run configuration.
//!
//! [`SurveyCatalog`] maps survey dates to the CSV file recorded that day.

mod catalog;

pub use catalog::SurveyCatalog;
