use std::sync::Arc;

use anyhow::{Result, bail};
use log::warn;

use super::{SAVE_VERSION, SaveComponent, SaveData, SaveStore};
use crate::core::{PlacementError, PrestigePhase, ResourceStore, Simulation};
use crate::model::{ComponentKind, ComponentType, GridCoord, ReactorComponent};

/// What a restore had to leave out. Entries are skipped, never fatal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreReport {
    pub restored_components: usize,
    pub unknown_components: Vec<String>,
    pub out_of_bounds: Vec<(i32, i32, i32)>,
    /// Entries that landed on a cell an earlier entry already filled.
    pub collisions: Vec<(i32, i32, i32)>,
    pub unknown_upgrades: Vec<usize>,
    /// One-time upgrades saved above level 1, restored at level 1.
    pub clamped_upgrades: Vec<usize>,
}

impl RestoreReport {
    pub fn is_clean(&self) -> bool {
        self.unknown_components.is_empty()
            && self.out_of_bounds.is_empty()
            && self.collisions.is_empty()
            && self.unknown_upgrades.is_empty()
            && self.clamped_upgrades.is_empty()
    }
}

pub fn save_data_from_simulation(sim: &Simulation) -> SaveData {
    // Grid order keeps snapshots of equal states byte-identical.
    let components = sim
        .grid()
        .occupied()
        .filter_map(|(coord, _)| sim.component_at(coord))
        .map(|component| SaveComponent {
            name: component.name().to_string(),
            heat: component.heat,
            durability: component.durability,
            depleted: component.depleted,
            x: component.coord.x as i32,
            y: component.coord.y as i32,
            z: component.coord.z as i32,
        })
        .collect();

    let mut upgrade_levels = Vec::new();
    for (index, level) in sim.upgrades.levels() {
        if index >= upgrade_levels.len() {
            upgrade_levels.resize(index + 1, 0);
        }
        upgrade_levels[index] = level;
    }

    SaveData {
        version: SAVE_VERSION,
        store: store_snapshot(&sim.resources),
        upgrade_levels,
        reactor_heat: sim.reactor_heat,
        stored_power: sim.stored_power,
        depleted_protium_count: sim.depleted_protium_count,
        paused: sim.paused,
        replace_mode: sim.replace_mode,
        total_ticks: sim.tick_index,
        prestige_level: sim.prestige_level,
        shop_page: sim.shop_page,
        selected_component_index: sim
            .selected_component_index
            .and_then(|index| i32::try_from(index).ok())
            .unwrap_or(-1),
        components,
    }
}

/// Replaces the simulation state with `save`. Unknown component names,
/// positions outside the grid and unknown upgrade indexes are skipped and
/// listed in the returned report.
pub fn apply_save_data(sim: &mut Simulation, save: &SaveData) -> Result<RestoreReport> {
    if save.version > SAVE_VERSION {
        bail!(
            "save version {} is newer than the supported version {SAVE_VERSION}",
            save.version
        );
    }

    let mut report = RestoreReport::default();

    sim.upgrades.reset_all();
    for (index, &saved_level) in save.upgrade_levels.iter().enumerate() {
        let mut level = saved_level;
        if level > 1 && sim.upgrades.get(index).is_some_and(|upgrade| upgrade.is_one_time()) {
            warn!("one-time upgrade {index} saved at level {level}, restoring level 1");
            report.clamped_upgrades.push(index);
            level = 1;
        }
        if !sim.upgrades.set_level(index, level) && level > 0 {
            warn!("save references unknown upgrade {index}, skipping");
            report.unknown_upgrades.push(index);
        }
    }

    sim.resources = restore_store(&save.store);
    sim.reactor_heat = save.reactor_heat.max(0.0);
    sim.stored_power = save.stored_power.max(0.0);
    sim.depleted_protium_count = save.depleted_protium_count;
    sim.paused = save.paused;
    sim.replace_mode = save.replace_mode;
    sim.tick_index = save.total_ticks;
    sim.prestige_level = save.prestige_level;
    sim.shop_page = save.shop_page;
    sim.selected_component_index = usize::try_from(save.selected_component_index).ok();
    sim.prestige_phase = PrestigePhase::Normal;
    sim.tick_accumulator = 0.0;
    sim.destroyed_last_tick.clear();

    sim.clear_components();
    sim.resize_grid_for_subspace();

    for entry in &save.components {
        let Some(component_type) = lookup_component_type(sim, &entry.name) else {
            warn!("save references unknown component '{}', skipping", entry.name);
            report.unknown_components.push(entry.name.clone());
            continue;
        };
        let Some(coord) = saved_coord(sim, entry) else {
            warn!(
                "saved {} at ({},{},{}) is outside the reactor grid, skipping",
                entry.name, entry.x, entry.y, entry.z
            );
            report.out_of_bounds.push((entry.x, entry.y, entry.z));
            continue;
        };

        let has_durability = component_type.stats.max_durability > 0.0;
        let mut component =
            ReactorComponent::new_with_metadata(component_type, coord, 0, sim.tick_index);
        component.heat = entry.heat.max(0.0);
        component.durability = entry.durability.max(0.0);
        component.depleted = entry.depleted || (has_durability && component.durability <= 0.0);

        match sim.insert_component(component) {
            Ok(()) => report.restored_components += 1,
            Err(err @ PlacementError::Occupied(..)) => {
                warn!("could not restore {}: {err}", entry.name);
                report.collisions.push((entry.x, entry.y, entry.z));
            }
            Err(err) => {
                warn!("could not restore {}: {err}", entry.name);
                report.out_of_bounds.push((entry.x, entry.y, entry.z));
            }
        }
    }

    sim.refresh_derived();
    Ok(report)
}

fn lookup_component_type(sim: &Simulation, name: &str) -> Option<Arc<ComponentType>> {
    let trimmed = name.trim().trim_end_matches(".png");
    if let Some(found) = sim.catalog.get(trimmed) {
        return Some(Arc::clone(found));
    }
    // Accepts alternate spellings such as `Plating2`. Fuel names carry a core
    // count that the kind alone cannot recover.
    match ComponentKind::from_name(trimmed)? {
        ComponentKind::Fuel(_) => None,
        kind => sim.catalog.get(&kind.canonical_name()).cloned(),
    }
}

fn saved_coord(sim: &Simulation, entry: &SaveComponent) -> Option<GridCoord> {
    let coord = GridCoord::new(
        usize::try_from(entry.x).ok()?,
        usize::try_from(entry.y).ok()?,
        usize::try_from(entry.z).ok()?,
    );
    sim.grid().in_bounds(coord).then_some(coord)
}

fn store_snapshot(store: &ResourceStore) -> SaveStore {
    SaveStore {
        money: store.money,
        total_money: store.total_money,
        money_earned_this_game: store.money_earned_this_game,
        power: store.power,
        total_power_produced: store.total_power_produced,
        power_produced_this_game: store.power_produced_this_game,
        heat: store.heat,
        total_heat_dissipated: store.total_heat_dissipated,
        heat_dissipated_this_game: store.heat_dissipated_this_game,
        exotic_particles: store.exotic_particles,
        total_exotic_particles: store.total_exotic_particles,
    }
}

fn restore_store(saved: &SaveStore) -> ResourceStore {
    ResourceStore {
        money: saved.money,
        total_money: saved.total_money,
        money_earned_this_game: saved.money_earned_this_game,
        power: saved.power,
        total_power_produced: saved.total_power_produced,
        power_produced_this_game: saved.power_produced_this_game,
        heat: saved.heat,
        total_heat_dissipated: saved.total_heat_dissipated,
        heat_dissipated_this_game: saved.heat_dissipated_this_game,
        exotic_particles: saved.exotic_particles,
        total_exotic_particles: saved.total_exotic_particles,
        ..ResourceStore::default()
    }
}
