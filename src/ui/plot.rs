use eframe::egui::{Pos2, Ui};
use egui_plot::{Legend, Plot, PlotPoint, PlotPoints, Points};

use crate::color::{IntensityColorMap, series_color};
use crate::series::layers::LayerFill;
use crate::state::AppState;

/// Number of colour buckets used for the base layer.
const INTENSITY_BINS: usize = 32;
const BASE_RADIUS: f32 = 3.5;
const SERIES_RADIUS: f32 = 4.5;
/// Screen-space pick tolerance, in points.
const PICK_RADIUS: f32 = 8.0;

// ---------------------------------------------------------------------------
// CCS scatter plot (central panel)
// ---------------------------------------------------------------------------

/// Render the charge-state vs CCS scatter and handle point picking.
pub fn ccs_plot(ui: &mut Ui, state: &mut AppState) {
    let picked = {
        let ctl = match &state.controller {
            Some(ctl) => ctl,
            None => {
                ui.centered_and_justified(|ui: &mut Ui| {
                    ui.heading("Open an export to start  (File → Open export…)");
                });
                return;
            }
        };
        let table = ctl.table();
        let color_map = state
            .color_map
            .unwrap_or_else(|| IntensityColorMap::for_table(table));

        let response = Plot::new("ccs_plot")
            .legend(Legend::default())
            .x_axis_label("z")
            .y_axis_label("CCS (Å²)")
            .allow_boxed_zoom(true)
            .allow_drag(true)
            .allow_scroll(true)
            .allow_zoom(true)
            .show(ui, |plot_ui| {
                // Layers are pushed bottom to top; egui_plot paints in order.
                for (_, layer) in ctl.plan().draw_order() {
                    match layer.fill {
                        LayerFill::Intensity => {
                            let mut bins: Vec<Vec<[f64; 2]>> = vec![Vec::new(); INTENSITY_BINS];
                            for &i in &layer.indices {
                                let p = &table.points[i];
                                bins[color_map.bin(p.log_intensity, INTENSITY_BINS)]
                                    .push([f64::from(p.z), p.ccs]);
                            }
                            for (bin, pts) in bins.into_iter().enumerate() {
                                if pts.is_empty() {
                                    continue;
                                }
                                plot_ui.points(
                                    Points::new(PlotPoints::from(pts))
                                        .color(color_map.bin_color(bin, INTENSITY_BINS))
                                        .radius(BASE_RADIUS),
                                );
                            }
                        }
                        LayerFill::Series(series) => {
                            let pts: PlotPoints = layer
                                .indices
                                .iter()
                                .map(|&i| [f64::from(table.points[i].z), table.points[i].ccs])
                                .collect();
                            plot_ui.points(
                                Points::new(pts)
                                    .color(series_color(series))
                                    .radius(SERIES_RADIUS)
                                    .name(format!("Series {series}")),
                            );
                        }
                    }
                }
            });

        let transform = &response.transform;
        let hit = if response.response.clicked() {
            response.response.interact_pointer_pos().and_then(|screen_pos| {
                let screen_points = table.points.iter().enumerate().map(|(i, p)| {
                    (i, transform.position_from_point(&PlotPoint::new(f64::from(p.z), p.ccs)))
                });
                nearest_within(screen_points, screen_pos, PICK_RADIUS)
            })
        } else {
            None
        };
        hit
    };

    if let Some(index) = picked {
        state.toggle_point(index);
    }
}

/// Index of the point closest to `target`, if it lies within `radius`.
pub fn nearest_within(
    points: impl Iterator<Item = (usize, Pos2)>,
    target: Pos2,
    radius: f32,
) -> Option<usize> {
    points
        .map(|(i, pos)| (i, pos.distance_sq(target)))
        .filter(|(_, d2)| *d2 <= radius * radius)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::pos2;

    #[test]
    fn test_nearest_within_picks_closest() {
        let points = vec![(0, pos2(0.0, 0.0)), (1, pos2(5.0, 0.0)), (2, pos2(3.0, 3.0))];
        assert_eq!(nearest_within(points.into_iter(), pos2(4.0, 0.0), 8.0), Some(1));
    }

    #[test]
    fn test_nearest_within_respects_radius() {
        let points = vec![(0, pos2(0.0, 0.0)), (1, pos2(20.0, 0.0))];
        assert_eq!(nearest_within(points.clone().into_iter(), pos2(12.0, 0.0), 8.0), Some(1));
        assert_eq!(nearest_within(points.into_iter(), pos2(10.0, 9.0), 8.0), None);
    }
}
