use std::fmt::Write;

use chrono::NaiveDateTime;
use serde::Deserialize;

use crate::models::{Band, DaySummary, Statistics, StudyRecord, WeeklySummary};

pub const REPORT_TITLE: &str = "Relatório de Estudos Semanais";
pub const FILE_PREFIX: &str = "Relatorio_Estudos";
pub const FILE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M";
pub const PDF_MIME_TYPE: &str = "application/pdf";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TextEncoding {
    /// Built-in PDF fonts; text is transliterated to plain ASCII first.
    #[default]
    Ascii,
    /// An embedded TrueType font; text is written as entered.
    Unicode,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportContent {
    pub title: String,
    /// Empty strings are blank separator lines.
    pub lines: Vec<String>,
}

impl ReportContent {
    pub fn assemble(student: &str, record: &StudyRecord, stats: &Statistics, band: Band) -> Self {
        let mut lines = vec![String::new(), format!("Aluno: {student}")];

        for (day, hours) in record.days() {
            lines.push(day_line(day, hours));
        }

        lines.push(String::new());
        lines.push(format!("Média diária: {:.2} horas", stats.mean));
        lines.push(format!("Máximo: {:.2} horas", stats.max));
        lines.push(format!("Mínimo: {:.2} horas", stats.min));
        lines.push(format!("Avaliação: {}", band.message()));

        Self {
            title: REPORT_TITLE.to_string(),
            lines,
        }
    }

    pub fn encoded(self, encoding: TextEncoding) -> Self {
        match encoding {
            TextEncoding::Unicode => self,
            TextEncoding::Ascii => Self {
                title: transliterate(&self.title),
                lines: self.lines.iter().map(|line| transliterate(line)).collect(),
            },
        }
    }
}

pub fn day_line(day: &str, hours: f64) -> String {
    format!("{day}: {hours:.1} horas")
}

/// Strips diacritics; any whitespace becomes a plain space.
pub fn transliterate(text: &str) -> String {
    deunicode::deunicode(text)
        .chars()
        .map(|ch| if ch.is_whitespace() { ' ' } else { ch })
        .filter(|ch| ch.is_ascii() && !ch.is_ascii_control())
        .collect()
}

/// `Relatorio_Estudos_<name>_<YYYY-MM-DD_HH-MM>.pdf`. Two reports for the same
/// student within the same minute share a name and the later one overwrites.
pub fn report_file_name(student: &str, generated_at: NaiveDateTime) -> String {
    let name: String = student
        .trim()
        .chars()
        .map(|ch| {
            if ch.is_whitespace() || ch == '/' || ch == '\\' {
                '_'
            } else {
                ch
            }
        })
        .collect();

    format!(
        "{FILE_PREFIX}_{name}_{}.pdf",
        generated_at.format(FILE_TIMESTAMP_FORMAT)
    )
}

pub fn summarize(
    student: &str,
    record: &StudyRecord,
    stats: Statistics,
    band: Band,
) -> WeeklySummary {
    WeeklySummary {
        student: student.to_string(),
        days: record
            .days()
            .map(|(day, hours)| DaySummary {
                day: day.to_string(),
                hours,
            })
            .collect(),
        statistics: stats,
        band,
        evaluation: band.message().to_string(),
    }
}

pub fn build_markdown(summary: &WeeklySummary) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# {REPORT_TITLE}");
    let _ = writeln!(output, "Aluno: {}", summary.student);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Horas por dia");

    for day in summary.days.iter() {
        let _ = writeln!(output, "- {}", day_line(&day.day, day.hours));
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Avaliação da Semana");
    let _ = writeln!(
        output,
        "- Média de estudo por dia: {:.2} horas",
        summary.statistics.mean
    );
    let _ = writeln!(output, "- Máximo: {:.2} horas", summary.statistics.max);
    let _ = writeln!(output, "- Mínimo: {:.2} horas", summary.statistics.min);
    let _ = writeln!(output, "- Resumo: {}", summary.evaluation);

    output
}
