use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod chart;
mod config;
mod error;
mod glyphs;
mod import;
mod models;
mod pdf;
mod pipeline;
mod report;
mod stats;

use chart::ChartBackend;
use config::{Config, Overrides};
use models::{StudyRecord, Statistics, Submission};
use pipeline::{Outcome, Pipeline, ReportArtifact, ValidationWarning};
use report::TextEncoding;

#[derive(Parser)]
#[command(name = "study-report")]
#[command(about = "Weekly study hours analyzer with PDF reports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one week and write the PDF report
    Analyze {
        #[command(flatten)]
        week: WeekArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Print statistics and evaluation without writing any files
    Summary {
        #[command(flatten)]
        week: WeekArgs,
        /// Print JSON instead of markdown
        #[arg(long)]
        json: bool,
    },
    /// Write one report per row of a CSV file
    Batch {
        /// Columns: name,segunda,terca,quarta,quinta,sexta,sabado,domingo
        #[arg(long)]
        csv: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Args)]
struct WeekArgs {
    /// Student name
    #[arg(long, default_value = "")]
    name: String,
    /// Hours studied Monday to Sunday, 0 to 12 in steps of 0.5
    #[arg(long, value_delimiter = ',', value_parser = parse_hours, required = true)]
    hours: Vec<f64>,
}

#[derive(Args)]
struct OutputArgs {
    /// TOML config file (defaults to $STUDY_REPORT_CONFIG)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory for the PDF reports
    #[arg(long)]
    out_dir: Option<PathBuf>,
    /// Where the intermediate chart image is written
    #[arg(long)]
    chart_path: Option<PathBuf>,
    #[arg(long, value_enum)]
    chart_backend: Option<ChartBackend>,
    #[arg(long, value_enum)]
    encoding: Option<TextEncoding>,
    /// TrueType font used with --encoding unicode
    #[arg(long)]
    font: Option<PathBuf>,
}

impl OutputArgs {
    fn into_config(self) -> anyhow::Result<Config> {
        let config =
            Config::resolve(self.config.as_deref()).context("failed to load configuration")?;
        Ok(config.with_overrides(Overrides {
            output_dir: self.out_dir,
            chart_path: self.chart_path,
            chart_backend: self.chart_backend,
            encoding: self.encoding,
            font_path: self.font,
        }))
    }
}

fn parse_hours(value: &str) -> Result<f64, String> {
    let hours: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("`{value}` is not a number"))?;
    models::validate_hours("value", hours).map_err(|err| err.to_string())?;
    Ok(hours)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze { week, output } => {
            let mut pipeline = Pipeline::new(output.into_config()?)?;
            let submission = Submission::new(week.name, week.hours);

            match pipeline.submit(&submission)? {
                Outcome::Rejected(warning) => print_warning(warning),
                Outcome::Ready(artifact) => print_artifact(&artifact),
            }
        }
        Commands::Summary { week, json } => {
            let submission = Submission::new(week.name, week.hours);
            let Some(student) = submission.student_name() else {
                print_warning(ValidationWarning);
                return Ok(());
            };

            let record = StudyRecord::new(&submission.hours)?;
            let statistics = Statistics::from_hours(record.hours())?;
            let band = stats::evaluate(statistics.mean);
            let summary = report::summarize(student, &record, statistics, band);

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print!("{}", report::build_markdown(&summary));
            }
        }
        Commands::Batch { csv, output } => {
            let submissions = import::read_submissions(&csv)?;
            let mut pipeline = Pipeline::new(output.into_config()?)?;
            let mut written = 0usize;
            let mut failed = 0usize;

            for (index, submission) in submissions.iter().enumerate() {
                match pipeline.submit(submission) {
                    Ok(Outcome::Ready(artifact)) => {
                        written += 1;
                        println!("- {}", artifact.path.display());
                    }
                    Ok(Outcome::Rejected(warning)) => {
                        failed += 1;
                        warn!(row = index + 1, "{warning}");
                    }
                    Err(err) => {
                        failed += 1;
                        error!(row = index + 1, "{err}");
                    }
                }
            }

            info!(
                written,
                failed,
                charts_rendered = pipeline.cached_charts(),
                "batch finished"
            );
            println!("Wrote {written} reports from {}.", csv.display());
            if failed > 0 {
                anyhow::bail!("{failed} of {} rows could not be reported", submissions.len());
            }
        }
    }

    Ok(())
}

fn print_warning(warning: ValidationWarning) {
    eprintln!("{warning}");
}

fn print_artifact(artifact: &ReportArtifact) {
    let summary = &artifact.summary;
    println!("Avaliação da Semana");
    println!("Média de estudo por dia: {:.2} horas", summary.statistics.mean);
    println!("Resumo: {}", summary.evaluation);
    println!();
    println!("Relatório gerado com sucesso!");
    println!("{} ({})", artifact.path.display(), artifact.mime_type());
    for chart in &artifact.chart_files {
        println!("Gráfico: {}", chart.display());
    }
}
