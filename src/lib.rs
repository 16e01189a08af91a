pub mod analyzers;
pub mod dates;
pub mod error;
pub mod infra;
pub mod output;
pub mod parser;
pub mod prompt;
pub mod session;
pub mod stats;

pub use analyzers::aggregate::process_csv_data;
pub use error::SurveyError;
pub use stats::SurveyStats;
