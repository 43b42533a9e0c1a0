// ---------------------------------------------------------------------------
// RawRecord – one row of the instrument export
// ---------------------------------------------------------------------------

/// A single instrument observation as read from the export.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawRecord {
    /// Measured mass-to-charge.
    pub mz: f64,
    /// Drift time (the export calls it `rt`).
    pub rt: f64,
    /// Signal intensity.
    pub inten: f64,
}

/// The loaded raw table. Replaced wholesale on every load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub records: Vec<RawRecord>,
}

impl RawTable {
    pub fn new(records: Vec<RawRecord>) -> Self {
        Self { records }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }
}

// ---------------------------------------------------------------------------
// FeaturePoint – one raw row under one matching charge hypothesis
// ---------------------------------------------------------------------------

/// A calibrated point. Only `selected` and `series` change after
/// construction.
#[derive(Debug, Clone, PartialEq)]
pub struct FeaturePoint {
    /// Row of the raw table this point was derived from.
    pub source_row: usize,
    pub mz: f64,
    pub rt: f64,
    pub inten: f64,
    /// Charge state of the matching hypothesis.
    pub z: u32,
    /// Calibrated collision cross-section.
    pub ccs: f64,
    pub log_intensity: f64,
    pub selected: bool,
    /// Series label, 0 = unassigned.
    pub series: u32,
}

// ---------------------------------------------------------------------------
// FeatureTable – the processed dataset
// ---------------------------------------------------------------------------

/// The processed table. Row positions are stable for its whole lifetime,
/// so a row index is a valid point identity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureTable {
    pub points: Vec<FeaturePoint>,
}

impl FeatureTable {
    pub fn new(points: Vec<FeaturePoint>) -> Self {
        Self { points }
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Row indices of all selected points, in table order.
    pub fn selected_indices(&self) -> Vec<usize> {
        self.points
            .iter()
            .enumerate()
            .filter(|(_, p)| p.selected)
            .map(|(i, _)| i)
            .collect()
    }

    /// Highest series number present in the table (0 if none assigned).
    pub fn max_series(&self) -> u32 {
        self.points.iter().map(|p| p.series).max().unwrap_or(0)
    }

    /// Sum of `inten` over every point.
    pub fn total_intensity(&self) -> f64 {
        self.points.iter().map(|p| p.inten).sum()
    }
}
