//! Series selection: the analyst's point-and-click classification.
//!
//! The controller owns the feature table once it is built. Every event
//! (toggle a point, switch series) mutates `selected`/`series` in place and
//! returns the render commands that bring the plot in line with the
//! rebuilt [`LayerPlan`], plus fresh summary statistics.

pub mod layers;

use crate::data::model::FeatureTable;
use crate::data::stats::{StatDefaults, StatValue, selection_stats};
use crate::error::{CcsError, Result};

use layers::{LayerKey, LayerPlan, RenderCommand};

/// What the front end must apply after an event.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesUpdate {
    pub commands: Vec<RenderCommand>,
    pub stats: Vec<(&'static str, StatValue)>,
}

// ---------------------------------------------------------------------------
// SeriesController
// ---------------------------------------------------------------------------

pub struct SeriesController {
    table: FeatureTable,
    current: u32,
    /// Highest series reachable by navigation.
    known_max: u32,
    plan: LayerPlan,
    defaults: StatDefaults,
}

impl SeriesController {
    pub fn new(table: FeatureTable) -> Self {
        Self::with_defaults(table, StatDefaults::default())
    }

    /// Start on series 1. A table with existing assignments (a reloaded
    /// session) gets series 1's points re-selected.
    pub fn with_defaults(mut table: FeatureTable, defaults: StatDefaults) -> Self {
        for p in &mut table.points {
            p.selected = p.series == 1;
        }
        let known_max = table.max_series().max(1);
        let plan = LayerPlan::build(&table, 1, known_max);
        Self {
            table,
            current: 1,
            known_max,
            plan,
            defaults,
        }
    }

    pub fn table(&self) -> &FeatureTable {
        &self.table
    }

    pub fn current_series(&self) -> u32 {
        self.current
    }

    pub fn known_max_series(&self) -> u32 {
        self.known_max
    }

    pub fn plan(&self) -> &LayerPlan {
        &self.plan
    }

    pub fn stats(&self) -> Vec<(&'static str, StatValue)> {
        selection_stats(&self.table, &self.defaults)
    }

    /// Flip `selected` of the point at table row `index` and redraw the
    /// active series on top.
    pub fn toggle_point(&mut self, index: usize) -> Result<SeriesUpdate> {
        let len = self.table.len();
        let point = self
            .table
            .points
            .get_mut(index)
            .ok_or(CcsError::IndexOutOfRange { index, len })?;
        point.selected = !point.selected;
        log::debug!(
            "Point {index} {} in series {}",
            if point.selected { "selected" } else { "deselected" },
            self.current
        );
        Ok(self.rebuild(LayerKey::Series(self.current)))
    }

    /// Commit the selection to the current series, then activate `series`.
    ///
    /// Only selected points are written; a committed point that was
    /// toggled off keeps its series.
    pub fn switch_series(&mut self, series: u32) -> Result<SeriesUpdate> {
        if series == 0 {
            return Err(CcsError::ParameterValidation(
                "series numbers start at 1".to_string(),
            ));
        }

        let outgoing = self.current;
        for p in &mut self.table.points {
            if p.selected {
                p.series = outgoing;
            }
            p.selected = p.series == series;
        }
        self.current = series;
        self.known_max = self.known_max.max(series);

        log::debug!(
            "Series {outgoing} -> {series} ({} points active, max {})",
            self.table.points.iter().filter(|p| p.selected).count(),
            self.known_max
        );
        Ok(self.rebuild(LayerKey::Series(series)))
    }

    /// Move to the next series, extending the navigable range if needed.
    pub fn next_series(&mut self) -> Result<SeriesUpdate> {
        let next = self
            .current
            .checked_add(1)
            .ok_or_else(|| CcsError::ParameterValidation("series number overflow".to_string()))?;
        self.switch_series(next)
    }

    /// Move to the previous series; `None` when already on series 1.
    pub fn prev_series(&mut self) -> Result<Option<SeriesUpdate>> {
        if self.current <= 1 {
            return Ok(None);
        }
        self.switch_series(self.current - 1).map(Some)
    }

    /// Commit the in-progress selection without leaving the current series.
    pub fn commit(&mut self) -> Result<SeriesUpdate> {
        self.switch_series(self.current)
    }

    fn rebuild(&mut self, force: LayerKey) -> SeriesUpdate {
        let plan = LayerPlan::build(&self.table, self.current, self.known_max);
        let commands = self.plan.diff(&plan, Some(force));
        self.plan = plan;
        SeriesUpdate {
            commands,
            stats: self.stats(),
        }
    }
}
