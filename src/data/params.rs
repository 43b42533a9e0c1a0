use std::ops::RangeInclusive;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::{CcsError, Result};

// ---------------------------------------------------------------------------
// Instrument constants
// ---------------------------------------------------------------------------

/// Fixed values of the instrument model. Only n·H+ ions are considered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstrumentConstants {
    /// Mass of the charge carrier (proton), Da.
    pub ion_mass: f64,
    /// Rows at or below this intensity are noise.
    pub intensity_floor: f64,
}

impl Default for InstrumentConstants {
    fn default() -> Self {
        Self {
            ion_mass: 1.007_276_45,
            intensity_floor: 2000.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Calibration parameters
// ---------------------------------------------------------------------------

/// Processing parameters, one field per UI input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationParams {
    /// Neutral mass, Da.
    #[serde(rename = "M")]
    pub neutral_mass: f64,
    /// Mass accuracy, ppm.
    pub ppm: f64,
    #[serde(rename = "MinCS")]
    pub min_charge: u32,
    #[serde(rename = "MaxCS")]
    pub max_charge: u32,
    pub a: f64,
    pub b: f64,
    #[serde(rename = "X")]
    pub x: f64,
    /// Transfer-region parameter.
    #[serde(rename = "C")]
    pub c: f64,
    /// Pusher delay, µs.
    pub push: f64,
    /// Drift gas mass, Da.
    pub gas: f64,
}

impl Default for CalibrationParams {
    fn default() -> Self {
        Self {
            neutral_mass: 22870.0,
            ppm: 200.0,
            min_charge: 1,
            max_charge: 50,
            a: 231.7,
            b: 118.7,
            x: 0.6262,
            c: 1.41,
            push: 110.0,
            gas: 28.0,
        }
    }
}

impl CalibrationParams {
    /// Inclusive charge range with the bounds swapped if given reversed.
    pub fn charge_range(&self) -> RangeInclusive<u32> {
        if self.min_charge <= self.max_charge {
            self.min_charge..=self.max_charge
        } else {
            self.max_charge..=self.min_charge
        }
    }

    /// Check every field against its domain.
    pub fn validate(&self) -> Result<()> {
        fn check(ok: bool, what: &str) -> Result<()> {
            if ok {
                Ok(())
            } else {
                Err(CcsError::ParameterValidation(what.to_string()))
            }
        }
        check(
            self.neutral_mass.is_finite() && self.neutral_mass > 0.0,
            "neutral mass must be > 0",
        )?;
        check(self.ppm.is_finite() && self.ppm > 0.0, "ppm must be > 0")?;
        check(
            self.min_charge >= 1 && self.max_charge >= 1,
            "charge states must be >= 1",
        )?;
        check(
            self.a.is_finite() && self.b.is_finite() && self.x.is_finite(),
            "calibration coefficients must be finite",
        )?;
        check(self.c.is_finite() && self.c >= 0.0, "C must be >= 0")?;
        check(self.push.is_finite() && self.push >= 0.0, "pusher delay must be >= 0")?;
        check(self.gas.is_finite() && self.gas > 0.0, "gas mass must be > 0")?;
        Ok(())
    }

    /// Reduced mass of analyte and drift gas.
    pub fn reduced_mass(&self) -> f64 {
        self.neutral_mass * self.gas / (self.neutral_mass + self.gas)
    }

    /// Read parameters from a JSON file. Missing fields take defaults.
    pub fn load_json(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading parameter file {}", path.display()))?;
        let params: Self = serde_json::from_str(&text)
            .with_context(|| format!("parsing parameter file {}", path.display()))?;
        params.validate()?;
        Ok(params)
    }

    /// Write parameters to a JSON file.
    pub fn save_json(&self, path: &Path) -> anyhow::Result<()> {
        let text = serde_json::to_string_pretty(self).context("serializing parameters")?;
        std::fs::write(path, text)
            .with_context(|| format!("writing parameter file {}", path.display()))
    }
}

// ---------------------------------------------------------------------------
// Localized text inputs
// ---------------------------------------------------------------------------

/// Parse a float typed in either `12.5` or `12,5` notation.
pub fn parse_localized_f64(text: &str, field: &str) -> Result<f64> {
    let cleaned: String = text
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{a0}')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    if cleaned.is_empty() {
        return Err(CcsError::ParameterValidation(format!("{field} is empty")));
    }
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| CcsError::ParameterValidation(format!("{field}: '{text}' is not a number")))
}

/// Parse a non-negative integer field.
pub fn parse_localized_int(text: &str, field: &str) -> Result<u32> {
    text.trim()
        .parse::<u32>()
        .map_err(|_| CcsError::ParameterValidation(format!("{field}: '{text}' is not an integer")))
}

/// Raw text of every parameter input, as typed.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamInputs {
    pub neutral_mass: String,
    pub ppm: String,
    pub min_charge: String,
    pub max_charge: String,
    pub a: String,
    pub b: String,
    pub x: String,
    pub c: String,
    pub push: String,
    pub gas: String,
}

impl Default for ParamInputs {
    fn default() -> Self {
        Self::from_params(&CalibrationParams::default())
    }
}

impl ParamInputs {
    pub fn from_params(p: &CalibrationParams) -> Self {
        Self {
            neutral_mass: p.neutral_mass.to_string(),
            ppm: p.ppm.to_string(),
            min_charge: p.min_charge.to_string(),
            max_charge: p.max_charge.to_string(),
            a: p.a.to_string(),
            b: p.b.to_string(),
            x: p.x.to_string(),
            c: p.c.to_string(),
            push: p.push.to_string(),
            gas: p.gas.to_string(),
        }
    }

    /// Parse all fields. An empty MinCS means 1, an empty MaxCS means MinCS.
    pub fn parse(&self) -> Result<CalibrationParams> {
        let min_charge = if self.min_charge.trim().is_empty() {
            1
        } else {
            parse_localized_int(&self.min_charge, "MinCS")?
        };
        let max_charge = if self.max_charge.trim().is_empty() {
            min_charge
        } else {
            parse_localized_int(&self.max_charge, "MaxCS")?
        };
        let params = CalibrationParams {
            neutral_mass: parse_localized_f64(&self.neutral_mass, "M")?,
            ppm: parse_localized_f64(&self.ppm, "ppm")?,
            min_charge,
            max_charge,
            a: parse_localized_f64(&self.a, "a")?,
            b: parse_localized_f64(&self.b, "b")?,
            x: parse_localized_f64(&self.x, "X")?,
            c: parse_localized_f64(&self.c, "C")?,
            push: parse_localized_f64(&self.push, "push")?,
            gas: parse_localized_f64(&self.gas, "gas")?,
        };
        params.validate()?;
        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_charge_range_swaps_reversed_bounds() {
        let params = CalibrationParams {
            min_charge: 50,
            max_charge: 1,
            ..Default::default()
        };
        assert_eq!(params.charge_range(), 1..=50);
    }

    #[test]
    fn test_parse_localized_accepts_comma() {
        assert_eq!(parse_localized_f64("0,6262", "X").unwrap(), 0.6262);
        assert_eq!(parse_localized_f64(" 231.7 ", "a").unwrap(), 231.7);
    }

    #[test]
    fn test_parse_localized_rejects_text() {
        assert!(matches!(
            parse_localized_f64("abc", "a"),
            Err(CcsError::ParameterValidation(_))
        ));
        assert!(matches!(
            parse_localized_f64("", "a"),
            Err(CcsError::ParameterValidation(_))
        ));
    }

    #[test]
    fn test_inputs_empty_charges_default() {
        let inputs = ParamInputs {
            min_charge: String::new(),
            max_charge: String::new(),
            ..Default::default()
        };
        let params = inputs.parse().unwrap();
        assert_eq!(params.min_charge, 1);
        assert_eq!(params.max_charge, 1);
    }

    #[test]
    fn test_inputs_roundtrip_defaults() {
        let params = ParamInputs::default().parse().unwrap();
        assert_eq!(params, CalibrationParams::default());
    }

    #[test]
    fn test_validate_rejects_zero_gas() {
        let params = CalibrationParams {
            gas: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(CcsError::ParameterValidation(_))
        ));
    }

    #[test]
    fn test_json_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.json");
        let params = CalibrationParams {
            neutral_mass: 15000.0,
            min_charge: 3,
            max_charge: 20,
            ..Default::default()
        };
        params.save_json(&path).unwrap();
        assert_eq!(CalibrationParams::load_json(&path).unwrap(), params);
    }

    #[test]
    fn test_json_partial_uses_defaults() {
        let params: CalibrationParams = serde_json::from_str(r#"{"M": 1000.0}"#).unwrap();
        assert_eq!(params.neutral_mass, 1000.0);
        assert_eq!(params.ppm, 200.0);
    }
}
