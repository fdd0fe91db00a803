use std::io::Read;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use crate::models::Submission;

#[derive(Debug, Deserialize)]
struct CsvRow {
    name: String,
    segunda: Option<f64>,
    terca: Option<f64>,
    quarta: Option<f64>,
    quinta: Option<f64>,
    sexta: Option<f64>,
    sabado: Option<f64>,
    domingo: Option<f64>,
}

impl CsvRow {
    /// Empty cells count as zero hours, like an untouched slider.
    fn into_submission(self) -> Submission {
        let hours = [
            self.segunda,
            self.terca,
            self.quarta,
            self.quinta,
            self.sexta,
            self.sabado,
            self.domingo,
        ]
        .into_iter()
        .map(|value| value.unwrap_or(0.0))
        .collect();

        Submission::new(self.name, hours)
    }
}

pub fn read_submissions(csv_path: &Path) -> anyhow::Result<Vec<Submission>> {
    let file = std::fs::File::open(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    parse_submissions(file)
}

pub fn parse_submissions<R: Read>(source: R) -> anyhow::Result<Vec<Submission>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(source);
    let mut submissions = Vec::new();

    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result.with_context(|| format!("invalid CSV row {}", index + 1))?;
        submissions.push(row.into_submission());
    }

    Ok(submissions)
}
