use std::collections::BTreeMap;

use crate::data::model::FeatureTable;

// ---------------------------------------------------------------------------
// Layer keys and contents
// ---------------------------------------------------------------------------

/// Stable identity of a drawable layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LayerKey {
    /// Every point, coloured by log intensity.
    Base,
    /// Points of one series.
    Series(u32),
}

/// Base layer sits below every series layer.
pub const BASE_Z_ORDER: u64 = 0;

/// How a layer is coloured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerFill {
    /// Per point, from `log_intensity`.
    Intensity,
    /// Fixed marker colour of the given series.
    Series(u32),
}

/// A drawable subset of the feature table.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    /// Row indices into the feature table.
    pub indices: Vec<usize>,
    pub z_order: u64,
    pub fill: LayerFill,
}

/// Instruction for the rendering surface.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    Remove(LayerKey),
    Draw {
        key: LayerKey,
        indices: Vec<usize>,
        z_order: u64,
        fill: LayerFill,
    },
    SetZOrder { key: LayerKey, z_order: u64 },
}

// ---------------------------------------------------------------------------
// LayerPlan
// ---------------------------------------------------------------------------

/// Layers derived from the table. Never a source of truth: it can be
/// rebuilt from the table at any time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerPlan {
    layers: BTreeMap<LayerKey, Layer>,
}

impl LayerPlan {
    /// Derive the layers for `current` being the active series.
    ///
    /// Committed series sit at z-order = series number, the active series'
    /// selection at `known_max + 1` (the number of layer slots, base
    /// included), so it is drawn above all of them. Empty layers are left
    /// out. One pass over the table.
    pub fn build(table: &FeatureTable, current: u32, known_max: u32) -> Self {
        let mut committed: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
        let mut active = Vec::new();
        for (i, p) in table.points.iter().enumerate() {
            if p.selected {
                active.push(i);
            }
            if p.series != 0 && p.series != current {
                committed.entry(p.series).or_default().push(i);
            }
        }

        let mut layers = BTreeMap::new();
        layers.insert(
            LayerKey::Base,
            Layer {
                indices: (0..table.len()).collect(),
                z_order: BASE_Z_ORDER,
                fill: LayerFill::Intensity,
            },
        );
        for (series, indices) in committed {
            layers.insert(
                LayerKey::Series(series),
                Layer {
                    indices,
                    z_order: u64::from(series),
                    fill: LayerFill::Series(series),
                },
            );
        }
        if !active.is_empty() {
            layers.insert(
                LayerKey::Series(current),
                Layer {
                    indices: active,
                    z_order: u64::from(known_max.max(current)) + 1,
                    fill: LayerFill::Series(current),
                },
            );
        }
        Self { layers }
    }

    pub fn get(&self, key: LayerKey) -> Option<&Layer> {
        self.layers.get(&key)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Series numbers that have a layer, ascending.
    pub fn series(&self) -> Vec<u32> {
        self.layers
            .keys()
            .filter_map(|k| match k {
                LayerKey::Series(n) => Some(*n),
                LayerKey::Base => None,
            })
            .collect()
    }

    /// Layers from bottom to top.
    pub fn draw_order(&self) -> Vec<(LayerKey, &Layer)> {
        let mut ordered: Vec<(LayerKey, &Layer)> =
            self.layers.iter().map(|(k, l)| (*k, l)).collect();
        ordered.sort_by_key(|(k, l)| (l.z_order, *k));
        ordered
    }

    /// The layer drawn last.
    pub fn top(&self) -> Option<LayerKey> {
        self.draw_order().last().map(|(k, _)| *k)
    }

    /// Commands turning `self` into `next`. `force` is removed and redrawn
    /// even when its contents are unchanged.
    pub fn diff(&self, next: &LayerPlan, force: Option<LayerKey>) -> Vec<RenderCommand> {
        let mut commands: Vec<RenderCommand> = self
            .layers
            .keys()
            .filter(|k| !next.layers.contains_key(k))
            .map(|k| RenderCommand::Remove(*k))
            .collect();

        for (key, layer) in next.draw_order() {
            match self.layers.get(&key) {
                Some(old)
                    if Some(key) != force
                        && old.indices == layer.indices
                        && old.fill == layer.fill =>
                {
                    if old.z_order != layer.z_order {
                        commands.push(RenderCommand::SetZOrder {
                            key,
                            z_order: layer.z_order,
                        });
                    }
                }
                old => {
                    if old.is_some() {
                        commands.push(RenderCommand::Remove(key));
                    }
                    commands.push(RenderCommand::Draw {
                        key,
                        indices: layer.indices.clone(),
                        z_order: layer.z_order,
                        fill: layer.fill,
                    });
                }
            }
        }
        commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::FeaturePoint;

    fn table(assign: &[(bool, u32)]) -> FeatureTable {
        FeatureTable::new(
            assign
                .iter()
                .enumerate()
                .map(|(i, &(selected, series))| FeaturePoint {
                    source_row: i,
                    mz: 500.0,
                    rt: 10.0,
                    inten: 5000.0,
                    z: 10,
                    ccs: 1000.0,
                    log_intensity: 5000f64.log10(),
                    selected,
                    series,
                })
                .collect(),
        )
    }

    #[test]
    fn test_fresh_table_has_only_base() {
        let plan = LayerPlan::build(&table(&[(false, 0), (false, 0)]), 1, 1);
        assert_eq!(plan.len(), 1);
        let base = plan.get(LayerKey::Base).unwrap();
        assert_eq!(base.indices, vec![0, 1]);
        assert_eq!(base.z_order, BASE_Z_ORDER);
    }

    #[test]
    fn test_current_layer_on_top_regardless_of_number() {
        // series 1 active while 2 and 3 are committed
        let t = table(&[(true, 1), (false, 2), (false, 3)]);
        let plan = LayerPlan::build(&t, 1, 3);
        assert_eq!(plan.top(), Some(LayerKey::Series(1)));
        assert_eq!(plan.get(LayerKey::Series(1)).unwrap().z_order, 4);
        assert_eq!(plan.get(LayerKey::Series(3)).unwrap().z_order, 3);
        assert_eq!(plan.series(), vec![1, 2, 3]);
        let order: Vec<LayerKey> = plan.draw_order().into_iter().map(|(k, _)| k).collect();
        assert_eq!(
            order,
            vec![
                LayerKey::Base,
                LayerKey::Series(2),
                LayerKey::Series(3),
                LayerKey::Series(1)
            ]
        );
    }

    #[test]
    fn test_highest_series_number_stays_below_active() {
        let t = table(&[(true, 0), (false, u32::MAX - 1)]);
        let plan = LayerPlan::build(&t, u32::MAX, u32::MAX);
        assert_eq!(plan.get(LayerKey::Series(u32::MAX)).unwrap().z_order, 1 << 32);
        assert_eq!(plan.top(), Some(LayerKey::Series(u32::MAX)));
    }

    #[test]
    fn test_diff_forced_key_is_redrawn() {
        let t = table(&[(true, 0)]);
        let plan = LayerPlan::build(&t, 1, 1);
        let commands = plan.diff(&plan, Some(LayerKey::Series(1)));
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0], RenderCommand::Remove(LayerKey::Series(1)));
        assert!(matches!(
            commands[1],
            RenderCommand::Draw { key: LayerKey::Series(1), z_order: 2, .. }
        ));
    }

    #[test]
    fn test_diff_unchanged_is_empty() {
        let t = table(&[(true, 0), (false, 2)]);
        let plan = LayerPlan::build(&t, 1, 2);
        assert!(plan.diff(&plan, None).is_empty());
    }

    #[test]
    fn test_diff_removes_vanished_layer() {
        let before = LayerPlan::build(&table(&[(true, 0)]), 1, 1);
        let after = LayerPlan::build(&table(&[(false, 0)]), 1, 1);
        assert_eq!(
            before.diff(&after, None),
            vec![RenderCommand::Remove(LayerKey::Series(1))]
        );
    }
}
