//! Blood pressure readings entered by hand.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

const SYSTOLIC_RANGE: (i64, i64) = (60, 260);
const DIASTOLIC_RANGE: (i64, i64) = (30, 160);
const PULSE_RANGE: (i64, i64) = (30, 220);

/// A validated blood pressure reading in mmHg, with optional pulse in bpm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BpReading {
    pub systolic: u16,
    pub diastolic: u16,
    pub pulse: Option<u16>,
}

/// ACC/AHA blood pressure categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BpCategory {
    Normal,
    Elevated,
    Stage1,
    Stage2,
    /// Above 180 and/or above 120
    Crisis,
}

impl BpCategory {
    pub fn label(self) -> &'static str {
        match self {
            BpCategory::Normal => "Normal",
            BpCategory::Elevated => "Elevated",
            BpCategory::Stage1 => "High (stage 1)",
            BpCategory::Stage2 => "High (stage 2)",
            BpCategory::Crisis => "Hypertensive crisis",
        }
    }
}

impl BpReading {
    /// # Errors
    /// Returns an error if a value is outside its plausible range or the
    /// systolic value does not exceed the diastolic one.
    pub fn new(systolic: i64, diastolic: i64, pulse: Option<i64>) -> Result<Self, ValidationError> {
        ValidationError::check_range("systolic", systolic, SYSTOLIC_RANGE.0, SYSTOLIC_RANGE.1)?;
        ValidationError::check_range("diastolic", diastolic, DIASTOLIC_RANGE.0, DIASTOLIC_RANGE.1)?;
        if let Some(p) = pulse {
            ValidationError::check_range("pulse", p, PULSE_RANGE.0, PULSE_RANGE.1)?;
        }
        if systolic <= diastolic {
            return Err(ValidationError::invalid(
                "systolic",
                format!("must be greater than diastolic ({systolic}/{diastolic})"),
            ));
        }
        Ok(Self {
            systolic: systolic as u16,
            diastolic: diastolic as u16,
            pulse: pulse.map(|p| p as u16),
        })
    }

    pub fn category(&self) -> BpCategory {
        let (s, d) = (self.systolic, self.diastolic);
        if s > 180 || d > 120 {
            BpCategory::Crisis
        } else if s >= 140 || d >= 90 {
            BpCategory::Stage2
        } else if s >= 130 || d >= 80 {
            BpCategory::Stage1
        } else if s >= 120 {
            BpCategory::Elevated
        } else {
            BpCategory::Normal
        }
    }
}

impl FromStr for BpReading {
    type Err = ValidationError;

    /// Parses `"120/80"` or `"120/80/72"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split('/').map(str::trim).collect();
        if !(2..=3).contains(&parts.len()) {
            return Err(ValidationError::invalid(
                "reading",
                format!("'{s}' is not SYS/DIA or SYS/DIA/PULSE"),
            ));
        }
        let number = |field: &str, raw: &str| {
            raw.parse::<i64>()
                .map_err(|_| ValidationError::invalid(field, format!("'{raw}' is not a whole number")))
        };
        let systolic = number("systolic", parts[0])?;
        let diastolic = number("diastolic", parts[1])?;
        let pulse = parts.get(2).map(|p| number("pulse", *p)).transpose()?;
        Self::new(systolic, diastolic, pulse)
    }
}

impl fmt::Display for BpReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.systolic, self.diastolic)?;
        if let Some(p) = self.pulse {
            write!(f, " (pulse {p})")?;
        }
        Ok(())
    }
}
