use std::error::Error;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use log::info;
use survey_report::{
    JsonSurveyStore, RenderedReport, ReportBuilder, ReportOptions, Survey, SurveyProvider,
};

/// Renders property condition surveys to PDF.
///
/// Defaults come from the `SURVEY_REPORT_*` environment variables; the flags
/// below override them.  Set `RUST_LOG=debug` for progress output.
#[derive(Parser)]
#[command(author, version, about = "Render property condition survey reports")]
struct Cli {
    /// Fetch photos one at a time instead of in parallel.
    #[arg(long, global = true)]
    no_parallel: bool,

    /// Timeout for each photo request, in seconds.
    #[arg(long, global = true, value_name = "SECS")]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a survey from a store directory.
    Render {
        /// Directory holding `<id>.json` survey documents.
        #[arg(long, value_name = "DIR")]
        store: PathBuf,

        /// Id of the survey to render.
        #[arg(long)]
        id: String,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Render a survey from a single JSON file.
    #[command(name = "render-file", aliases = ["render_file"])]
    RenderFile {
        /// Survey JSON document.
        #[arg(long, value_name = "FILE")]
        input: PathBuf,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// List the surveys in a store directory.
    List {
        /// Directory holding `<id>.json` survey documents.
        #[arg(long, value_name = "DIR")]
        store: PathBuf,
    },
}

#[derive(Args)]
struct OutputArgs {
    /// Where to write the PDF; defaults to the suggested report file name.
    #[arg(long, short, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Add a PDF outline entry for every section.
    #[cfg(feature = "bookmarks")]
    #[arg(long)]
    bookmarks: bool,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let mut options = ReportOptions::from_env();
    if cli.no_parallel {
        options = options.with_parallel_fetch(false);
    }
    if let Some(secs) = cli.timeout_secs {
        options = options.with_fetch_timeout(Duration::from_secs(secs));
    }
    let builder = ReportBuilder::new().with_options(options);

    let result = match cli.command {
        Commands::Render { store, id, output } => {
            let store = JsonSurveyStore::new(store);
            store
                .get_survey(&id)
                .map_err(Into::into)
                .and_then(|survey| render(&builder, &survey, &output))
        }
        Commands::RenderFile { input, output } => {
            read_survey(&input).and_then(|survey| render(&builder, &survey, &output))
        }
        Commands::List { store } => list(&JsonSurveyStore::new(store)),
    };

    if let Err(err) = result {
        eprintln!("Error: {}", err);
        print_error_sources(err.as_ref());
        std::process::exit(1);
    }
}

fn read_survey(path: &Path) -> Result<Survey, Box<dyn Error>> {
    let raw = fs::read_to_string(path)?;
    Ok(Survey::from_json(&raw)?)
}

fn render(
    builder: &ReportBuilder,
    survey: &Survey,
    output: &OutputArgs,
) -> Result<(), Box<dyn Error>> {
    let report = build_report(builder, survey, output)?;
    let path = output
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&report.filename));

    report.write_to(File::create(&path)?)?;
    info!(
        "wrote {} ({} page(s), {} bytes)",
        path.display(),
        report.page_count,
        report.bytes.len()
    );
    println!("{}", path.display());
    Ok(())
}

#[cfg(feature = "bookmarks")]
fn build_report(
    builder: &ReportBuilder,
    survey: &Survey,
    output: &OutputArgs,
) -> Result<RenderedReport, Box<dyn Error>> {
    if output.bookmarks {
        Ok(builder.render_with_bookmarks(survey)?)
    } else {
        Ok(builder.render(survey)?)
    }
}

#[cfg(not(feature = "bookmarks"))]
fn build_report(
    builder: &ReportBuilder,
    survey: &Survey,
    _output: &OutputArgs,
) -> Result<RenderedReport, Box<dyn Error>> {
    Ok(builder.render(survey)?)
}

fn list(store: &JsonSurveyStore) -> Result<(), Box<dyn Error>> {
    for (id, survey) in store.list()? {
        let details = &survey.property_details;
        println!(
            "{id}\t{}\t{}\t{}",
            or_dash(&details.unit_number),
            or_dash(&details.building_name),
            survey.status.label()
        );
    }
    Ok(())
}

fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() {
        "-"
    } else {
        value
    }
}

fn print_error_sources(mut error: &(dyn Error + 'static)) {
    while let Some(source) = error.source() {
        eprintln!("  caused by: {}", source);
        error = source;
    }
}
