use super::*;
use crate::data::model::RawRecord;
use crate::data::filter::ChargeWindow;
use proptest::prelude::*;

const ION_MASS: f64 = 1.007_276_45;

fn center(z: u32) -> f64 {
    ChargeWindow::new(22870.0, z, 200.0, ION_MASS).center
}

fn table(rows: &[(f64, f64, f64)]) -> RawTable {
    RawTable::new(
        rows.iter()
            .map(|&(mz, rt, inten)| RawRecord { mz, rt, inten })
            .collect(),
    )
}

#[test]
fn test_process_excludes_row_outside_tolerance() {
    // z=50 expects 458.427…, 457.41 lies outside 200 ppm and no other
    // charge state lands on it either.
    let raw = table(&[(457.41, 5.2, 50000.0)]);
    let result = process(&raw, &CalibrationParams::default());
    assert!(matches!(result, Err(CcsError::EmptyResult)));
}

#[test]
fn test_process_computes_ccs_and_log_intensity() {
    let params = CalibrationParams::default();
    let mz = center(25);
    let raw = table(&[(mz, 20.0, 50000.0)]);

    let result = process(&raw, &params).unwrap();
    assert_eq!(result.len(), 1);
    let p = &result.points[0];
    assert_eq!(p.z, 25);
    assert_eq!(p.source_row, 0);
    assert!(!p.selected);
    assert_eq!(p.series, 0);

    let mu = 22870.0 * 28.0 / (22870.0 + 28.0);
    let base: f64 = 20.0 * 110.0 / 1000.0 - 1.41 * (mz / 1000.0).sqrt();
    let expected = 231.7 * base.powf(0.6262) * 25.0 / f64::sqrt(mu);
    assert!((p.ccs - expected).abs() < 1e-9);
    assert!((p.log_intensity - 50000f64.log10()).abs() < 1e-12);
}

#[test]
fn test_process_intensity_floor_boundary() {
    let mz = center(25);
    let raw = table(&[(mz, 20.0, 2000.0), (mz, 20.0, 2000.0001)]);
    let result = process(&raw, &CalibrationParams::default()).unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result.points[0].source_row, 1);
}

#[test]
fn test_process_negative_base_fractional_exponent_fails() {
    // rt=5.2 gives 0.572 − 1.41·√0.9158 < 0
    let raw = table(&[(center(25), 5.2, 50000.0)]);
    let result = process(&raw, &CalibrationParams::default());
    assert!(matches!(result, Err(CcsError::NumericDomain(_))));
}

#[test]
fn test_process_negative_base_integer_exponent_ok() {
    let params = CalibrationParams {
        x: 2.0,
        ..Default::default()
    };
    let raw = table(&[(center(25), 5.2, 50000.0)]);
    let result = process(&raw, &params).unwrap();
    assert!(result.points[0].ccs > 0.0);
}

#[test]
fn test_process_custom_floor_feeds_log_domain_error() {
    let constants = InstrumentConstants {
        intensity_floor: -1.0,
        ..Default::default()
    };
    let raw = table(&[(center(25), 20.0, 0.0)]);
    let result = process_with(&raw, &CalibrationParams::default(), &constants);
    assert!(matches!(result, Err(CcsError::NumericDomain(_))));
}

#[test]
fn test_process_rejects_non_finite_drift_time() {
    let raw = table(&[(center(25), 20.0, 50000.0), (center(25), f64::NAN, 50000.0)]);
    let result = process(&raw, &CalibrationParams::default());
    assert!(matches!(result, Err(CcsError::NumericDomain(_))));

    let raw = table(&[(center(25), f64::INFINITY, 50000.0)]);
    let result = process(&raw, &CalibrationParams::default());
    assert!(matches!(result, Err(CcsError::NumericDomain(_))));
}

#[test]
fn test_process_rejects_infinite_intensity() {
    let raw = table(&[(center(25), 20.0, f64::INFINITY)]);
    let result = process(&raw, &CalibrationParams::default());
    assert!(matches!(result, Err(CcsError::NumericDomain(_))));
}

#[test]
fn test_process_orders_by_charge_then_row() {
    let raw = table(&[
        (center(30), 20.0, 5000.0),
        (center(20), 20.0, 6000.0),
        (center(30), 21.0, 7000.0),
    ]);
    let result = process(&raw, &CalibrationParams::default()).unwrap();
    let order: Vec<(u32, usize)> = result.points.iter().map(|p| (p.z, p.source_row)).collect();
    assert_eq!(order, vec![(20, 1), (30, 0), (30, 2)]);
}

#[test]
fn test_process_is_idempotent() {
    let raw = table(&[
        (center(30), 20.0, 5000.0),
        (center(20), 20.0, 6000.0),
        (center(12), 25.0, 9000.0),
    ]);
    let params = CalibrationParams::default();
    let first = process(&raw, &params).unwrap();
    let second = process(&raw, &params).unwrap();
    assert_eq!(first, second);
}

proptest! {
    #[test]
    fn test_reversed_charge_bounds_give_same_table(lo in 1u32..40, span in 0u32..20) {
        let hi = lo + span;
        let raw = table(&[
            (center(lo), 100.0, 5000.0),
            (center(hi), 100.0, 6000.0),
            (center(45), 100.0, 7000.0),
        ]);
        let forward = CalibrationParams { min_charge: lo, max_charge: hi, ..Default::default() };
        let reversed = CalibrationParams { min_charge: hi, max_charge: lo, ..Default::default() };
        let a = process(&raw, &forward).unwrap();
        let b = process(&raw, &reversed).unwrap();
        prop_assert_eq!(&a, &b);
        prop_assert!(a.points.iter().all(|p| p.z >= lo && p.z <= hi));
    }
}
