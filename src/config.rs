use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::chart::ChartBackend;
use crate::error::ConfigError;
use crate::pdf::FontSource;
use crate::report::TextEncoding;

pub const CONFIG_ENV: &str = "STUDY_REPORT_CONFIG";
pub const DEFAULT_CHART_PATH: &str = "grafico_estudos.png";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub output_dir: PathBuf,
    /// Fixed location of the intermediate chart image, overwritten per submission.
    pub chart_path: PathBuf,
    pub chart_backend: ChartBackend,
    pub encoding: TextEncoding,
    pub font_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            chart_path: PathBuf::from(DEFAULT_CHART_PATH),
            chart_backend: ChartBackend::default(),
            encoding: TextEncoding::default(),
            font_path: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub output_dir: Option<PathBuf>,
    pub chart_path: Option<PathBuf>,
    pub chart_backend: Option<ChartBackend>,
    pub encoding: Option<TextEncoding>,
    pub font_path: Option<PathBuf>,
}

impl Config {
    pub fn from_toml(path: &Path, text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(path, &text)
    }

    /// Explicit path first, then the environment variable, then defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load(path),
            None => match std::env::var_os(CONFIG_ENV) {
                Some(path) => Self::load(Path::new(&path)),
                None => Ok(Self::default()),
            },
        }
    }

    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(dir) = overrides.output_dir {
            self.output_dir = dir;
        }
        if let Some(path) = overrides.chart_path {
            self.chart_path = path;
        }
        if let Some(backend) = overrides.chart_backend {
            self.chart_backend = backend;
        }
        if let Some(encoding) = overrides.encoding {
            self.encoding = encoding;
        }
        if overrides.font_path.is_some() {
            self.font_path = overrides.font_path;
        }
        self
    }

    pub fn font_source(&self) -> Result<FontSource, ConfigError> {
        match self.encoding {
            TextEncoding::Ascii => Ok(FontSource::Builtin),
            TextEncoding::Unicode => {
                let path = self.font_path.as_ref().ok_or(ConfigError::MissingFont)?;
                let bytes = std::fs::read(path).map_err(|source| ConfigError::Read {
                    path: path.clone(),
                    source,
                })?;
                Ok(FontSource::TrueType(bytes))
            }
        }
    }
}
