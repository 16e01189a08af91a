//! CLI entry point for the traffic survey analyzer.
//!
//! Provides subcommands for analyzing a single survey file, drawing its
//! hourly histogram, and the interactive date-driven session that the tool
//! runs when no subcommand is given.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};
use traffic_survey::{
    analyzers::histogram::JunctionHistogram,
    infra::SurveyCatalog,
    output::{
        DEFAULT_RESULTS_FILE, append_record, display_outcomes, print_json, print_pretty,
        save_results_to_file,
    },
    process_csv_data,
    prompt::Prompter,
    session::Session,
};

#[derive(Parser)]
#[command(name = "traffic_survey")]
#[command(about = "Analyze daily junction traffic survey files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a single survey CSV file
    Analyze {
        /// Survey CSV file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Text file the report is appended to
        #[arg(short, long, env = "SURVEY_RESULTS", default_value = DEFAULT_RESULTS_FILE)]
        results: PathBuf,

        /// Optional: CSV file to append a summary row to
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Print the statistics as JSON instead of the text report
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Also draw the hourly histogram
        #[arg(long, default_value_t = false)]
        histogram: bool,
    },
    /// Draw the hourly vehicle histogram for a survey file
    Histogram {
        /// Survey CSV file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Label shown in the title (defaults to the file name)
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Ask for survey dates and analyze the matching files
    Interactive {
        /// JSON file mapping dd/MM/yyyy dates to survey file names
        #[arg(short, long, env = "SURVEY_CATALOG")]
        catalog: Option<PathBuf>,

        /// Directory the survey files live in
        #[arg(short = 'd', long, env = "SURVEY_DATA_DIR")]
        data_dir: Option<PathBuf>,

        /// Text file reports are appended to
        #[arg(short, long, env = "SURVEY_RESULTS", default_value = DEFAULT_RESULTS_FILE)]
        results: PathBuf,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/traffic_survey.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("traffic_survey.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let color = io::stdout().is_terminal();

    match cli.command {
        Some(Commands::Analyze {
            file,
            results,
            csv,
            json,
            histogram,
        }) => {
            analyze(&file, &results, csv.as_deref(), json, histogram, color)?;
        }
        Some(Commands::Histogram { file, date }) => {
            let label = date.unwrap_or_else(|| file.display().to_string());
            let histogram = JunctionHistogram::from_path(&file)?;
            histogram.render(&mut io::stdout().lock(), &label, color)?;
        }
        Some(Commands::Interactive {
            catalog,
            data_dir,
            results,
        }) => {
            interactive(catalog.as_deref(), data_dir, results, color)?;
        }
        None => {
            interactive(None, None, PathBuf::from(DEFAULT_RESULTS_FILE), color)?;
        }
    }

    Ok(())
}

/// Aggregates one file, prints the report (or JSON) and appends it to the
/// results log.
#[tracing::instrument(skip(file, results, csv, color), fields(file = %file.display()))]
fn analyze(
    file: &Path,
    results: &Path,
    csv: Option<&Path>,
    json: bool,
    histogram: bool,
    color: bool,
) -> Result<()> {
    let mut stdout = io::stdout().lock();

    let stats = match process_csv_data(file) {
        Ok(stats) => stats,
        Err(e) => {
            error!(error = %e, "Survey aggregation failed");
            display_outcomes(&mut stdout, None)?;
            return Err(e.into());
        }
    };
    print_pretty(&stats);

    if json {
        print_json(&mut stdout, &stats)?;
    } else {
        display_outcomes(&mut stdout, Some(&stats))?;
    }

    save_results_to_file(results, &stats)?;
    if let Some(csv) = csv {
        append_record(csv, &stats)?;
        info!(path = %csv.display(), "Summary row appended");
    }

    if histogram {
        writeln!(stdout)?;
        JunctionHistogram::from_path(file)?.render(
            &mut stdout,
            &file.display().to_string(),
            color,
        )?;
    }

    Ok(())
}

/// Runs the prompt loop on stdin/stdout with the configured catalog.
fn interactive(
    catalog: Option<&Path>,
    data_dir: Option<PathBuf>,
    results: PathBuf,
    color: bool,
) -> Result<()> {
    let mut catalog = match catalog {
        Some(path) => SurveyCatalog::load(path)?,
        None => SurveyCatalog::default(),
    };
    if let Some(dir) = data_dir {
        catalog = catalog.with_data_dir(dir);
    }
    for (date, file) in catalog.iter() {
        debug!(date = %date, file, "Catalog entry");
    }
    info!(dates = catalog.len(), "Survey catalog ready");

    let stdin = io::stdin().lock();
    let stdout = io::stdout().lock();
    let mut prompter = Prompter::new(stdin, stdout);

    Session::new(&catalog, results)
        .with_color(color)
        .run(&mut prompter)
}
