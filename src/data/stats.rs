use std::fmt;

use super::model::{FeaturePoint, FeatureTable};

// ---------------------------------------------------------------------------
// StatValue – a summary cell
// ---------------------------------------------------------------------------

/// A summary value: a count, a number, or placeholder text.
#[derive(Debug, Clone, PartialEq)]
pub enum StatValue {
    Count(usize),
    Number(f64),
    Text(String),
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatValue::Count(n) => write!(f, "{n}"),
            StatValue::Number(v) => write!(f, "{v:.4}"),
            StatValue::Text(s) => write!(f, "{s}"),
        }
    }
}

/// Values returned for each statistic when nothing is selected.
#[derive(Debug, Clone, PartialEq)]
pub struct StatDefaults {
    pub count: StatValue,
    pub total_intensity: StatValue,
    pub intensity_ratio: StatValue,
    pub mean_z: StatValue,
    pub mean_ccs: StatValue,
    pub weighted_z: StatValue,
    pub weighted_ccs: StatValue,
}

impl Default for StatDefaults {
    fn default() -> Self {
        let na = || StatValue::Text("N/A".to_string());
        Self {
            count: StatValue::Count(0),
            total_intensity: StatValue::Number(0.0),
            intensity_ratio: StatValue::Number(0.0),
            mean_z: na(),
            mean_ccs: na(),
            weighted_z: na(),
            weighted_ccs: na(),
        }
    }
}

pub const LABEL_COUNT: &str = "Number of points";
pub const LABEL_TOTAL_INTENSITY: &str = "Total intensity";
pub const LABEL_INTENSITY_RATIO: &str = "Ratio of intensity (%)";
pub const LABEL_MEAN_Z: &str = "Average z";
pub const LABEL_MEAN_CCS: &str = "Average CCS";
pub const LABEL_WEIGHTED_Z: &str = "Weighted average z";
pub const LABEL_WEIGHTED_CCS: &str = "Weighted average CCS";

// ---------------------------------------------------------------------------
// Selection statistics
// ---------------------------------------------------------------------------

/// Summary rows over the selected points, in display order.
pub fn selection_stats(table: &FeatureTable, defaults: &StatDefaults) -> Vec<(&'static str, StatValue)> {
    let selected: Vec<&FeaturePoint> = table.points.iter().filter(|p| p.selected).collect();

    if selected.is_empty() {
        return vec![
            (LABEL_COUNT, defaults.count.clone()),
            (LABEL_TOTAL_INTENSITY, defaults.total_intensity.clone()),
            (LABEL_INTENSITY_RATIO, defaults.intensity_ratio.clone()),
            (LABEL_MEAN_Z, defaults.mean_z.clone()),
            (LABEL_MEAN_CCS, defaults.mean_ccs.clone()),
            (LABEL_WEIGHTED_Z, defaults.weighted_z.clone()),
            (LABEL_WEIGHTED_CCS, defaults.weighted_ccs.clone()),
        ];
    }

    let n = selected.len() as f64;
    let sel_int: f64 = selected.iter().map(|p| p.inten).sum();
    let all_int = table.total_intensity();

    let ratio = if all_int == 0.0 { 0.0 } else { sel_int / all_int * 100.0 };
    let mean_z = selected.iter().map(|p| f64::from(p.z)).sum::<f64>() / n;
    let mean_ccs = selected.iter().map(|p| p.ccs).sum::<f64>() / n;

    let weighted = |value: fn(&FeaturePoint) -> f64, default: &StatValue| {
        if sel_int == 0.0 {
            default.clone()
        } else {
            StatValue::Number(selected.iter().map(|p| value(p) * p.inten).sum::<f64>() / sel_int)
        }
    };

    vec![
        (LABEL_COUNT, StatValue::Count(selected.len())),
        (LABEL_TOTAL_INTENSITY, StatValue::Number(sel_int)),
        (LABEL_INTENSITY_RATIO, StatValue::Number(ratio)),
        (LABEL_MEAN_Z, StatValue::Number(mean_z)),
        (LABEL_MEAN_CCS, StatValue::Number(mean_ccs)),
        (LABEL_WEIGHTED_Z, weighted(|p| f64::from(p.z), &defaults.weighted_z)),
        (LABEL_WEIGHTED_CCS, weighted(|p| p.ccs, &defaults.weighted_ccs)),
    ]
}
