use std::fmt;
use std::path::PathBuf;

use chrono::{Local, NaiveDateTime};
use tracing::{debug, info, warn};

use crate::chart::{ChartCache, ChartRenderer};
use crate::config::Config;
use crate::error::{ConfigError, PipelineError, ReportError};
use crate::models::{Statistics, StudyRecord, Submission, WeeklySummary, DAY_LABELS};
use crate::pdf::{self, FontSource};
use crate::report::{self, ReportContent, PDF_MIME_TYPE};
use crate::stats;

#[derive(Debug, Clone, PartialEq)]
pub enum PipelineState {
    Idle,
    Computing,
    Rendering,
    Composing,
    Ready(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationWarning;

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Por favor, digite seu nome para gerar o relatório.")
    }
}

#[derive(Debug, Clone)]
pub struct ReportArtifact {
    pub path: PathBuf,
    pub file_name: String,
    pub chart_files: Vec<PathBuf>,
    pub summary: WeeklySummary,
}

impl ReportArtifact {
    pub fn mime_type(&self) -> &'static str {
        PDF_MIME_TYPE
    }
}

#[derive(Debug, Clone)]
pub enum Outcome {
    Rejected(ValidationWarning),
    Ready(ReportArtifact),
}

pub struct Pipeline {
    config: Config,
    renderer: ChartRenderer,
    charts: ChartCache,
    font: FontSource,
    state: PipelineState,
}

impl Pipeline {
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        let font = config.font_source()?;
        Ok(Self {
            renderer: ChartRenderer::new(config.chart_backend),
            charts: ChartCache::default(),
            font,
            config,
            state: PipelineState::Idle,
        })
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    pub fn submit(&mut self, submission: &Submission) -> Result<Outcome, PipelineError> {
        self.submit_at(submission, Local::now().naive_local())
    }

    pub fn submit_at(
        &mut self,
        submission: &Submission,
        generated_at: NaiveDateTime,
    ) -> Result<Outcome, PipelineError> {
        self.state = PipelineState::Idle;

        let Some(student) = submission.student_name() else {
            warn!("submission rejected: student name is empty");
            return Ok(Outcome::Rejected(ValidationWarning));
        };

        match self.run(student, &submission.hours, generated_at) {
            Ok(artifact) => {
                self.state = PipelineState::Ready(artifact.path.clone());
                Ok(Outcome::Ready(artifact))
            }
            Err(err) => {
                self.state = PipelineState::Idle;
                Err(err)
            }
        }
    }

    fn run(
        &mut self,
        student: &str,
        hours: &[f64],
        generated_at: NaiveDateTime,
    ) -> Result<ReportArtifact, PipelineError> {
        self.state = PipelineState::Computing;
        let record = StudyRecord::new(hours)?;
        let statistics = Statistics::from_hours(record.hours())?;
        let band = stats::evaluate(statistics.mean);
        info!(
            student,
            mean = statistics.mean,
            max = statistics.max,
            min = statistics.min,
            ?band,
            "computed weekly statistics"
        );

        self.state = PipelineState::Rendering;
        let chart = self
            .charts
            .get_or_render(&self.renderer, &DAY_LABELS, record.hours())?;
        let chart_files = chart.write_to(&self.config.chart_path)?;
        debug!(
            backend = ?self.renderer.backend(),
            cached = self.charts.cached_charts(),
            path = %self.config.chart_path.display(),
            "chart written"
        );

        self.state = PipelineState::Composing;
        let content = ReportContent::assemble(student, &record, &statistics, band)
            .encoded(self.config.encoding);
        let bytes = pdf::compose(&content, &chart.png, &self.font)?;

        let file_name = report::report_file_name(student, generated_at);
        let path = self.config.output_dir.join(&file_name);
        std::fs::create_dir_all(&self.config.output_dir)
            .and_then(|_| std::fs::write(&path, &bytes))
            .map_err(|source| ReportError::Write {
                path: path.clone(),
                source,
            })?;
        info!(path = %path.display(), bytes = bytes.len(), "report written");

        Ok(ReportArtifact {
            path,
            file_name,
            chart_files,
            summary: report::summarize(student, &record, statistics, band),
        })
    }

    pub fn cached_charts(&self) -> usize {
        self.charts.cached_charts()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::ChartBackend;
    use crate::error::StudyError;
    use crate::models::Band;
    use crate::report::TextEncoding;
    use chrono::NaiveDate;
    use std::path::Path;
    use tempfile::TempDir;

    fn pipeline_in(dir: &Path) -> Pipeline {
        Pipeline::new(Config {
            output_dir: dir.join("relatorios"),
            chart_path: dir.join("grafico_estudos.png"),
            ..Default::default()
        })
        .unwrap()
    }

    fn at(minute: u32, second: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 5, 4)
            .unwrap()
            .and_hms_opt(19, minute, second)
            .unwrap()
    }

    fn week() -> Vec<f64> {
        vec![2.0, 4.0, 6.0, 8.0, 10.0, 0.0, 1.0]
    }

    fn files_in(dir: &Path) -> usize {
        std::fs::read_dir(dir)
            .map(|entries| {
                entries
                    .filter_map(Result::ok)
                    .map(|entry| {
                        let path = entry.path();
                        if path.is_dir() {
                            files_in(&path)
                        } else {
                            1
                        }
                    })
                    .sum()
            })
            .unwrap_or(0)
    }

    #[test]
    fn blank_name_halts_before_any_file_is_written() {
        let dir = TempDir::new().unwrap();
        let mut pipeline = pipeline_in(dir.path());

        for name in ["", "   ", "\t\n"] {
            let outcome = pipeline
                .submit_at(&Submission::new(name, week()), at(0, 0))
                .unwrap();
            assert!(matches!(outcome, Outcome::Rejected(ValidationWarning)));
            assert_eq!(*pipeline.state(), PipelineState::Idle);
        }
        assert_eq!(files_in(dir.path()), 0);
        assert_eq!(pipeline.cached_charts(), 0);
    }

    #[test]
    fn blank_name_wins_over_bad_hours() {
        let dir = TempDir::new().unwrap();
        let mut pipeline = pipeline_in(dir.path());
        let outcome = pipeline
            .submit_at(&Submission::new(" ", vec![1.0]), at(0, 0))
            .unwrap();
        assert!(matches!(outcome, Outcome::Rejected(_)));
    }

    #[test]
    fn sample_week_produces_report() {
        let dir = TempDir::new().unwrap();
        let mut pipeline = pipeline_in(dir.path());

        let outcome = pipeline
            .submit_at(&Submission::new(" Ana ", week()), at(7, 12))
            .unwrap();
        let Outcome::Ready(artifact) = outcome else {
            panic!("expected a report");
        };

        assert_eq!(
            artifact.file_name,
            "Relatorio_Estudos_Ana_2026-05-04_19-07.pdf"
        );
        assert_eq!(artifact.path, dir.path().join("relatorios").join(&artifact.file_name));
        assert_eq!(artifact.mime_type(), "application/pdf");
        assert!(std::fs::read(&artifact.path).unwrap().starts_with(b"%PDF-"));
        assert_eq!(artifact.chart_files, vec![dir.path().join("grafico_estudos.png")]);

        let summary = &artifact.summary;
        assert_eq!(summary.student, "Ana");
        assert!((summary.statistics.mean - 31.0 / 7.0).abs() < 1e-12);
        assert_eq!(summary.statistics.max, 10.0);
        assert_eq!(summary.statistics.min, 0.0);
        assert_eq!(summary.band, Band::Mid);

        assert_eq!(*pipeline.state(), PipelineState::Ready(artifact.path.clone()));
    }

    #[test]
    fn wrong_length_fails_fast_and_returns_to_idle() {
        let dir = TempDir::new().unwrap();
        let mut pipeline = pipeline_in(dir.path());

        let err = pipeline
            .submit_at(&Submission::new("Ana", vec![1.0; 6]), at(0, 0))
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Study(StudyError::WrongLength {
                expected: 7,
                actual: 6
            })
        ));
        assert_eq!(*pipeline.state(), PipelineState::Idle);
        assert_eq!(files_in(dir.path()), 0);
    }

    #[test]
    fn unwritable_output_is_terminal() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("relatorios");
        std::fs::write(&blocker, b"not a directory").unwrap();
        let mut pipeline = pipeline_in(dir.path());

        let err = pipeline
            .submit_at(&Submission::new("Ana", week()), at(0, 0))
            .unwrap_err();
        assert!(matches!(err, PipelineError::Report(ReportError::Write { .. })));
        assert_eq!(*pipeline.state(), PipelineState::Idle);
    }

    #[test]
    fn unreadable_unicode_font_fails_without_writing_a_report() {
        let dir = TempDir::new().unwrap();
        let font_path = dir.path().join("quebrada.ttf");
        std::fs::write(&font_path, b"not a font").unwrap();
        let mut pipeline = Pipeline::new(Config {
            output_dir: dir.path().join("relatorios"),
            chart_path: dir.path().join("grafico_estudos.png"),
            encoding: TextEncoding::Unicode,
            font_path: Some(font_path),
            ..Default::default()
        })
        .unwrap();

        let err = pipeline
            .submit_at(&Submission::new("José", week()), at(0, 0))
            .unwrap_err();
        assert!(matches!(err, PipelineError::Report(ReportError::Pdf(_))));
        assert_eq!(*pipeline.state(), PipelineState::Idle);
        assert_eq!(files_in(&dir.path().join("relatorios")), 0);
    }

    #[test]
    fn same_student_same_minute_overwrites() {
        let dir = TempDir::new().unwrap();
        let mut pipeline = pipeline_in(dir.path());

        let first = pipeline
            .submit_at(&Submission::new("Ana Souza", week()), at(30, 1))
            .unwrap();
        let second = pipeline
            .submit_at(&Submission::new("Ana Souza", vec![12.0; 7]), at(30, 59))
            .unwrap();

        let (Outcome::Ready(first), Outcome::Ready(second)) = (first, second) else {
            panic!("expected two reports");
        };
        assert_eq!(first.path, second.path);
        assert_eq!(second.summary.band, Band::High);
        assert_eq!(files_in(&dir.path().join("relatorios")), 1);
    }

    #[test]
    fn identical_weeks_reuse_the_rendered_chart() {
        let dir = TempDir::new().unwrap();
        let mut pipeline = pipeline_in(dir.path());

        for (name, minute) in [("Ana", 1), ("Bia", 2)] {
            pipeline
                .submit_at(&Submission::new(name, week()), at(minute, 0))
                .unwrap();
        }
        assert_eq!(pipeline.cached_charts(), 1);
    }

    #[test]
    fn interactive_backend_writes_html_chart() {
        let dir = TempDir::new().unwrap();
        let mut pipeline = Pipeline::new(Config {
            output_dir: dir.path().to_path_buf(),
            chart_path: dir.path().join("grafico_estudos.png"),
            chart_backend: ChartBackend::Interactive,
            ..Default::default()
        })
        .unwrap();

        let Outcome::Ready(artifact) = pipeline
            .submit_at(&Submission::new("Ana", week()), at(0, 0))
            .unwrap()
        else {
            panic!("expected a report");
        };
        assert_eq!(artifact.chart_files.len(), 2);
        assert!(dir.path().join("grafico_estudos.html").exists());
    }
}
