use super::model::{RawRecord, RawTable};
use super::params::{CalibrationParams, InstrumentConstants};

// ---------------------------------------------------------------------------
// Charge-state windows
// ---------------------------------------------------------------------------

/// The m/z tolerance window of one charge hypothesis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChargeWindow {
    pub z: u32,
    /// Expected m/z of the n·H+ ion.
    pub center: f64,
    pub min: f64,
    pub max: f64,
}

impl ChargeWindow {
    pub fn new(neutral_mass: f64, z: u32, ppm: f64, ion_mass: f64) -> Self {
        let zf = f64::from(z);
        let center = (neutral_mass + zf * ion_mass) / zf;
        let tol = ppm / 1_000_000.0;
        Self {
            z,
            center,
            min: center * (1.0 - tol),
            max: center * (1.0 + tol),
        }
    }

    /// Strict on both bounds.
    pub fn contains(&self, mz: f64) -> bool {
        self.min < mz && mz < self.max
    }
}

/// One window per charge state in the (normalized) parameter range.
pub fn charge_windows(params: &CalibrationParams, constants: &InstrumentConstants) -> Vec<ChargeWindow> {
    params
        .charge_range()
        .map(|z| ChargeWindow::new(params.neutral_mass, z, params.ppm, constants.ion_mass))
        .collect()
}

/// Whether a raw row passes a window and the noise floor.
pub fn matches(record: &RawRecord, window: &ChargeWindow, intensity_floor: f64) -> bool {
    window.contains(record.mz) && record.inten > intensity_floor
}

/// Return `(row, z)` for every raw row passing a window, grouped by charge
/// state in ascending order. A row matching several windows appears once
/// per window.
pub fn matching_rows(
    table: &RawTable,
    windows: &[ChargeWindow],
    intensity_floor: f64,
) -> Vec<(usize, u32)> {
    let mut out = Vec::new();
    for window in windows {
        let before = out.len();
        out.extend(
            table
                .records
                .iter()
                .enumerate()
                .filter(|(_, rec)| matches(rec, window, intensity_floor))
                .map(|(i, _)| (i, window.z)),
        );
        if out.len() > before {
            log::debug!(
                "z={}: {} rows in ]{:.4}, {:.4}[",
                window.z,
                out.len() - before,
                window.min,
                window.max
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(mz: f64, inten: f64) -> RawRecord {
        RawRecord { mz, rt: 10.0, inten }
    }

    #[test]
    fn test_window_center() {
        let w = ChargeWindow::new(22870.0, 50, 200.0, 1.007_276_45);
        assert!((w.center - (22870.0 + 50.0 * 1.007_276_45) / 50.0).abs() < 1e-12);
        assert!((w.center - 458.4272).abs() < 1e-3);
    }

    #[test]
    fn test_window_excludes_outside_tolerance() {
        let w = ChargeWindow::new(22870.0, 50, 200.0, 1.007_276_45);
        assert!(!w.contains(457.41));
        assert!(w.contains(w.center));
        assert!(!w.contains(w.min));
        assert!(!w.contains(w.max));
    }

    #[test]
    fn test_intensity_floor_is_strict() {
        let w = ChargeWindow::new(22870.0, 25, 200.0, 1.007_276_45);
        assert!(!matches(&record(w.center, 2000.0), &w, 2000.0));
        assert!(matches(&record(w.center, 2000.0001), &w, 2000.0));
    }

    #[test]
    fn test_overlapping_windows_keep_duplicates() {
        // Wide tolerance so z=1 and z=2 windows of a tiny mass overlap.
        let params = CalibrationParams {
            neutral_mass: 1.0,
            ppm: 900_000.0,
            min_charge: 1,
            max_charge: 2,
            ..Default::default()
        };
        let windows = charge_windows(&params, &InstrumentConstants::default());
        let table = RawTable::new(vec![record(1.6, 5000.0)]);
        let rows = matching_rows(&table, &windows, 2000.0);
        assert_eq!(rows, vec![(0, 1), (0, 2)]);
    }
}
