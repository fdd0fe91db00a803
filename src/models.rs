use serde::Serialize;

use crate::error::StudyError;

pub const DAYS_PER_WEEK: usize = 7;
pub const MAX_HOURS: f64 = 12.0;
pub const HOURS_STEP: f64 = 0.5;

/// Weekday labels in calendar order, Monday first.
pub const DAY_LABELS: [&str; DAYS_PER_WEEK] = [
    "Segunda", "Terça", "Quarta", "Quinta", "Sexta", "Sábado", "Domingo",
];

#[derive(Debug, Clone, PartialEq)]
pub struct StudyRecord {
    hours: [f64; DAYS_PER_WEEK],
}

impl StudyRecord {
    pub fn new(hours: &[f64]) -> Result<Self, StudyError> {
        let hours: [f64; DAYS_PER_WEEK] =
            hours.try_into().map_err(|_| StudyError::WrongLength {
                expected: DAYS_PER_WEEK,
                actual: hours.len(),
            })?;

        for (day, value) in DAY_LABELS.iter().zip(hours.iter()) {
            validate_hours(day, *value)?;
        }

        Ok(Self { hours })
    }

    pub fn hours(&self) -> &[f64] {
        &self.hours
    }

    pub fn days(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        DAY_LABELS.iter().copied().zip(self.hours.iter().copied())
    }
}

pub fn validate_hours(day: &str, value: f64) -> Result<(), StudyError> {
    if !value.is_finite() {
        return Err(StudyError::NotFinite {
            day: day.to_string(),
        });
    }
    if !(0.0..=MAX_HOURS).contains(&value) {
        return Err(StudyError::OutOfRange {
            day: day.to_string(),
            value,
        });
    }
    if (value / HOURS_STEP).fract() != 0.0 {
        return Err(StudyError::NotOnStep {
            day: day.to_string(),
            value,
        });
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Statistics {
    pub mean: f64,
    pub max: f64,
    pub min: f64,
}

/// Feedback band derived from the daily mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    High,
    Mid,
    Low,
}

impl Band {
    pub fn message(self) -> &'static str {
        match self {
            Band::High => {
                "Excelente ritmo de estudos! Continue assim e você estará cada vez mais perto dos seus objetivos."
            }
            Band::Mid => {
                "Bom trabalho, mas você pode melhorar! Tente organizar melhor sua rotina para ganhar mais consistência."
            }
            Band::Low => {
                "Você estudou pouco essa semana. Procure estabelecer metas diárias e focar no seu objetivo. Você consegue!"
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Submission {
    pub name: String,
    pub hours: Vec<f64>,
}

impl Submission {
    pub fn new(name: impl Into<String>, hours: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            hours,
        }
    }

    /// The trimmed name, or `None` when nothing but whitespace was entered.
    pub fn student_name(&self) -> Option<&str> {
        let trimmed = self.name.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WeeklySummary {
    pub student: String,
    pub days: Vec<DaySummary>,
    pub statistics: Statistics,
    pub band: Band,
    pub evaluation: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DaySummary {
    pub day: String,
    pub hours: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_accepts_seven_stepped_values() {
        let record = StudyRecord::new(&[0.0, 0.5, 1.0, 6.5, 12.0, 3.0, 0.0]).unwrap();
        let days: Vec<_> = record.days().map(|(day, _)| day).collect();
        assert_eq!(days, DAY_LABELS.to_vec());
        assert_eq!(record.hours()[4], 12.0);
    }

    #[test]
    fn record_rejects_wrong_length() {
        let err = StudyRecord::new(&[1.0, 2.0, 3.0]).unwrap_err();
        assert_eq!(
            err,
            StudyError::WrongLength {
                expected: 7,
                actual: 3
            }
        );
        assert!(err.to_string().contains("expected 7"));
    }

    #[test]
    fn record_rejects_out_of_range_and_off_step() {
        let err = StudyRecord::new(&[0.0, 0.0, 12.5, 0.0, 0.0, 0.0, 0.0]).unwrap_err();
        assert!(matches!(err, StudyError::OutOfRange { ref day, .. } if day == "Quarta"));

        let err = StudyRecord::new(&[0.0, 1.25, 0.0, 0.0, 0.0, 0.0, 0.0]).unwrap_err();
        assert!(matches!(err, StudyError::NotOnStep { ref day, .. } if day == "Terça"));

        let err = StudyRecord::new(&[f64::NAN, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]).unwrap_err();
        assert!(matches!(err, StudyError::NotFinite { .. }));
    }

    #[test]
    fn blank_names_have_no_student() {
        assert_eq!(Submission::new("   ", vec![]).student_name(), None);
        assert_eq!(Submission::new("", vec![]).student_name(), None);
        assert_eq!(
            Submission::new("  Ana Souza \t", vec![]).student_name(),
            Some("Ana Souza")
        );
    }
}
