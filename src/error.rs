use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StudyError {
    #[error("expected {expected} daily hour values (one per weekday), got {actual}")]
    WrongLength { expected: usize, actual: usize },

    #[error("{day}: {value} hours is outside the allowed range 0 to 12")]
    OutOfRange { day: String, value: f64 },

    #[error("{day}: {value} hours is not a multiple of 0.5")]
    NotOnStep { day: String, value: f64 },

    #[error("{day}: hours must be a finite number")]
    NotFinite { day: String },
}

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("chart needs one label per value ({labels} labels, {values} values)")]
    Mismatched { labels: usize, values: usize },

    #[error("failed to encode chart image: {0}")]
    Encode(#[from] png::EncodingError),

    #[error("failed to write chart to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("chart image could not be embedded: {0}")]
    Image(String),

    #[error("PDF composition failed: {0}")]
    Pdf(String),

    #[error("failed to write report to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("unicode encoding requires font_path to point at a TrueType font")]
    MissingFont,
}

/// Anything that ends a submission after the name has been accepted.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Study(#[from] StudyError),

    #[error(transparent)]
    Chart(#[from] ChartError),

    #[error(transparent)]
    Report(#[from] ReportError),
}
