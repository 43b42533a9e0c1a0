use eframe::egui::Color32;
use palette::{LinSrgb, Mix, Srgb};

use crate::data::model::FeatureTable;

// ---------------------------------------------------------------------------
// Series marker colours
// ---------------------------------------------------------------------------

/// Black, red, green, blue, cyan, magenta, yellow.
const SERIES_COLORS: [Color32; 7] = [
    Color32::from_rgb(0, 0, 0),
    Color32::from_rgb(255, 0, 0),
    Color32::from_rgb(0, 128, 0),
    Color32::from_rgb(0, 0, 255),
    Color32::from_rgb(0, 191, 191),
    Color32::from_rgb(191, 0, 191),
    Color32::from_rgb(191, 191, 0),
];

/// Marker colour of a series; cycles every 7 series.
pub fn series_color(series: u32) -> Color32 {
    SERIES_COLORS[(series % 7) as usize]
}

/// Legend entries (label → colour), one per series number.
pub fn series_legend(series: impl IntoIterator<Item = u32>) -> Vec<(String, Color32)> {
    series
        .into_iter()
        .map(|s| (format!("Series {s}"), series_color(s)))
        .collect()
}

// ---------------------------------------------------------------------------
// Intensity colour map for the base layer
// ---------------------------------------------------------------------------

/// Reversed "hot" gradient: white for weak points, through yellow and red,
/// to black for the most intense.
const HOT_R_STOPS: [(f32, f32, f32); 4] = [
    (1.0, 1.0, 1.0),
    (1.0, 1.0, 0.0),
    (0.9, 0.0, 0.0),
    (0.04, 0.0, 0.0),
];

/// Maps `log_intensity` onto [`HOT_R_STOPS`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntensityColorMap {
    min: f64,
    max: f64,
}

impl IntensityColorMap {
    /// Span the log-intensity range of the table.
    pub fn for_table(table: &FeatureTable) -> Self {
        let (min, max) = table
            .points
            .iter()
            .map(|p| p.log_intensity)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        if min.is_finite() && max.is_finite() {
            Self { min, max }
        } else {
            Self { min: 0.0, max: 1.0 }
        }
    }

    /// Position of `value` in the range, clamped to `[0, 1]`.
    pub fn normalize(&self, value: f64) -> f32 {
        let range = self.max - self.min;
        if range.abs() < f64::EPSILON {
            return 0.5;
        }
        ((value - self.min) / range).clamp(0.0, 1.0) as f32
    }

    /// Quantize `value` into one of `bins` buckets.
    pub fn bin(&self, value: f64, bins: usize) -> usize {
        let t = self.normalize(value);
        ((t * bins as f32) as usize).min(bins.saturating_sub(1))
    }

    /// Colour at the centre of bucket `bin`.
    pub fn bin_color(&self, bin: usize, bins: usize) -> Color32 {
        gradient((bin as f32 + 0.5) / bins.max(1) as f32)
    }
}

fn gradient(t: f32) -> Color32 {
    let segments = (HOT_R_STOPS.len() - 1) as f32;
    let pos = t.clamp(0.0, 1.0) * segments;
    let i = (pos.floor() as usize).min(HOT_R_STOPS.len() - 2);
    let (r0, g0, b0) = HOT_R_STOPS[i];
    let (r1, g1, b1) = HOT_R_STOPS[i + 1];

    let lin: LinSrgb = LinSrgb::new(r0, g0, b0).mix(LinSrgb::new(r1, g1, b1), pos - i as f32);
    let rgb: Srgb<u8> = Srgb::from_linear(lin);
    Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_colors_cycle_every_seven() {
        assert_eq!(series_color(1), series_color(8));
        assert_eq!(series_color(0), series_color(7));
        assert_ne!(series_color(1), series_color(2));
    }

    #[test]
    fn test_gradient_endpoints() {
        assert_eq!(gradient(0.0), Color32::from_rgb(255, 255, 255));
        let dark = gradient(1.0);
        assert!(dark.r() < 80 && dark.g() == 0 && dark.b() == 0);
    }

    #[test]
    fn test_empty_table_map_is_usable() {
        let map = IntensityColorMap::for_table(&FeatureTable::default());
        assert_eq!(map.bin(0.5, 10), 5);
    }

    #[test]
    fn test_bin_clamps_to_last() {
        let map = IntensityColorMap { min: 3.0, max: 5.0 };
        assert_eq!(map.bin(5.0, 8), 7);
        assert_eq!(map.bin(3.0, 8), 0);
        assert_eq!(map.bin(9.0, 8), 7);
    }

    #[test]
    fn test_legend_entries() {
        let legend = series_legend([1, 2, 9]);
        assert_eq!(legend.len(), 3);
        assert_eq!(legend[2], ("Series 9".to_string(), series_color(9)));
    }
}
