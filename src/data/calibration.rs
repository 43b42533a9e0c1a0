use super::filter::{charge_windows, matching_rows};
use super::model::{FeaturePoint, FeatureTable, RawTable};
use super::params::{CalibrationParams, InstrumentConstants};
use crate::error::{CcsError, Result};

// ---------------------------------------------------------------------------
// CCS calibration
// ---------------------------------------------------------------------------

/// Build the feature table with the default instrument constants.
pub fn process(raw: &RawTable, params: &CalibrationParams) -> Result<FeatureTable> {
    process_with(raw, params, &InstrumentConstants::default())
}

/// Filter `raw` by charge-state windows and calibrate every matching row.
///
/// Rows are ordered by charge state, then by raw row. The returned table is
/// freshly built; nothing from a previous call is reused.
pub fn process_with(
    raw: &RawTable,
    params: &CalibrationParams,
    constants: &InstrumentConstants,
) -> Result<FeatureTable> {
    params.validate()?;

    let windows = charge_windows(params, constants);
    let rows = matching_rows(raw, &windows, constants.intensity_floor);
    if rows.is_empty() {
        return Err(CcsError::EmptyResult);
    }

    let mu = params.reduced_mass();
    let points = rows
        .into_iter()
        .map(|(row, z)| -> Result<FeaturePoint> {
            let rec = &raw.records[row];
            Ok(FeaturePoint {
                source_row: row,
                mz: rec.mz,
                rt: rec.rt,
                inten: rec.inten,
                z,
                ccs: ccs(rec.mz, rec.rt, z, mu, params)?,
                log_intensity: log_intensity(rec.inten)?,
                selected: false,
                series: 0,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    log::info!(
        "Calibrated {} points from {} raw rows (z {:?})",
        points.len(),
        raw.len(),
        params.charge_range()
    );
    Ok(FeatureTable::new(points))
}

/// `a · (rt·push/1000 − C·√(mz/1000))^X · z / √mu`
pub fn ccs(mz: f64, rt: f64, z: u32, mu: f64, params: &CalibrationParams) -> Result<f64> {
    let base = rt * params.push / 1000.0 - params.c * (mz / 1000.0).sqrt();
    if base < 0.0 && params.x.fract() != 0.0 {
        return Err(CcsError::NumericDomain(format!(
            "corrected drift time {base:.6} is negative for m/z {mz} (rt {rt}, z {z}) \
             and exponent {} is fractional",
            params.x
        )));
    }
    let value = params.a * base.powf(params.x) * f64::from(z) / mu.sqrt();
    if !value.is_finite() {
        return Err(CcsError::NumericDomain(format!(
            "CCS is not finite for m/z {mz} (rt {rt}, z {z})"
        )));
    }
    Ok(value)
}

pub fn log_intensity(inten: f64) -> Result<f64> {
    if !inten.is_finite() {
        return Err(CcsError::NumericDomain(format!(
            "intensity {inten} is not finite"
        )));
    }
    if inten <= 0.0 {
        return Err(CcsError::NumericDomain(format!(
            "log10 of non-positive intensity {inten}"
        )));
    }
    Ok(inten.log10())
}

#[cfg(test)]
mod tests;
