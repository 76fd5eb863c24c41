use std::sync::Arc;

use log::{debug, warn};
use thiserror::Error;

use super::prestige::PrestigePhase;
use super::resource_store::ResourceStore;
use super::tick::BASE_AUTO_VENT;
use super::upgrades::{RESEARCH_GRANT_UPGRADE, SUBSPACE_EXPANSION_UPGRADE, StatCategory, UpgradeManager};
use crate::config::SimulationConfig;
use crate::data::{ComponentCatalog, SHOP_PAGE_COUNT, SHOP_PAGE_EXPERIMENTAL};
use crate::model::{
    ComponentCategory, ComponentType, GridCell, GridCoord, REACTOR_TYPE_ID, ReactorComponent,
    ReactorGrid,
};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlacementError {
    #[error("cell {0} is outside the reactor grid")]
    OutOfBounds(GridCoord),
    #[error("cell {0} already holds an active {1}")]
    Occupied(GridCoord, String),
    #[error("cell {coord} holds {existing}, which {replacement} cannot replace")]
    Incompatible {
        coord: GridCoord,
        existing: String,
        replacement: String,
    },
    #[error("{name} costs {cost} but only {available} is available")]
    Unaffordable {
        name: String,
        cost: f64,
        available: f64,
    },
}

/// Reactor-wide scaling derived from upgrades at the start of every tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobalMultipliers {
    pub self_vent: f64,
    pub heat_exchange: f64,
    pub power_capacity: f64,
    pub heat_capacity: f64,
    pub ticks_per_second: f64,
    pub manual_vent_amount: f64,
    pub manual_sell: f64,
}

impl Default for GlobalMultipliers {
    fn default() -> Self {
        Self {
            self_vent: 1.0,
            heat_exchange: 1.0,
            power_capacity: 1.0,
            heat_capacity: 1.0,
            ticks_per_second: 1.0,
            manual_vent_amount: 1.0,
            manual_sell: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Simulation {
    pub config: SimulationConfig,
    pub catalog: ComponentCatalog,
    pub upgrades: UpgradeManager,
    pub resources: ResourceStore,
    pub paused: bool,
    pub replace_mode: bool,
    pub tick_index: u64,
    /// Hull heat. Not clamped to capacity; overflow drives explosions.
    pub reactor_heat: f64,
    pub stored_power: f64,
    pub depleted_protium_count: u32,
    pub prestige_level: u32,
    pub shop_page: u32,
    pub selected_component_index: Option<usize>,
    pub(crate) grid: ReactorGrid,
    pub(crate) components: Vec<ReactorComponent>,
    pub(crate) multipliers: GlobalMultipliers,
    pub(crate) max_reactor_heat: f64,
    pub(crate) max_reactor_power: f64,
    pub(crate) pulses_dirty: bool,
    pub(crate) tick_accumulator: f64,
    pub(crate) prestige_phase: PrestigePhase,
    pub(crate) destroyed_last_tick: Vec<GridCoord>,
    next_component_id: u64,
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(
            SimulationConfig::default(),
            ComponentCatalog::builtin(),
            UpgradeManager::default(),
        )
    }
}

impl Simulation {
    pub fn new(config: SimulationConfig, catalog: ComponentCatalog, upgrades: UpgradeManager) -> Self {
        let mut simulation = Self {
            grid: ReactorGrid::new(config.base_width, config.base_height, config.layers),
            replace_mode: config.replace_mode,
            config,
            catalog,
            upgrades,
            resources: ResourceStore::default(),
            paused: false,
            tick_index: 0,
            reactor_heat: 0.0,
            stored_power: 0.0,
            depleted_protium_count: 0,
            prestige_level: 0,
            shop_page: 0,
            selected_component_index: None,
            components: Vec::new(),
            multipliers: GlobalMultipliers::default(),
            max_reactor_heat: 1000.0,
            max_reactor_power: 100.0,
            pulses_dirty: true,
            tick_accumulator: 0.0,
            prestige_phase: PrestigePhase::Normal,
            destroyed_last_tick: Vec::new(),
            next_component_id: 1,
        };
        simulation.resources.money = simulation.config.starting_money;
        simulation.resize_grid_for_subspace();
        simulation.refresh_derived();
        simulation
    }

    pub fn grid(&self) -> &ReactorGrid {
        &self.grid
    }

    /// Placed components in insertion order; use [`ReactorGrid::occupied`]
    /// for grid order.
    pub fn components(&self) -> &[ReactorComponent] {
        &self.components
    }

    pub fn component_at(&self, coord: GridCoord) -> Option<&ReactorComponent> {
        self.slot_at(coord).map(|slot| &self.components[slot])
    }

    /// Mutable access to a placed component. Pulses are redistributed on the
    /// next tick since the caller may change `depleted`.
    pub fn component_at_mut(&mut self, coord: GridCoord) -> Option<&mut ReactorComponent> {
        let slot = self.slot_at(coord)?;
        self.pulses_dirty = true;
        Some(&mut self.components[slot])
    }

    pub fn multipliers(&self) -> GlobalMultipliers {
        self.multipliers
    }

    pub fn max_reactor_heat(&self) -> f64 {
        self.max_reactor_heat
    }

    pub fn max_reactor_power(&self) -> f64 {
        self.max_reactor_power
    }

    pub fn ticks_per_second(&self) -> f64 {
        self.multipliers.ticks_per_second
    }

    /// Coordinates destroyed by the most recent tick, for explosion effects.
    pub fn destroyed_last_tick(&self) -> &[GridCoord] {
        &self.destroyed_last_tick
    }

    pub fn stat_bonus(&self, component_type_id: u32, stat: StatCategory) -> f64 {
        self.upgrades.bonus(component_type_id, stat)
    }

    pub fn effective_heat_capacity(&self, component: &ReactorComponent) -> f64 {
        component.stats().heat_capacity
            * self.stat_bonus(component.component_type.component_type_id, StatCategory::HeatCapacity)
    }

    pub fn effective_max_durability(&self, component: &ReactorComponent) -> f64 {
        self.effective_max_durability_of(&component.component_type)
    }

    pub fn component_cost(&self, component_type: &ComponentType) -> f64 {
        component_type.cost * self.upgrades.component_discount()
    }

    pub fn can_afford_component(&self, component_type: &ComponentType) -> bool {
        self.resources.money >= self.component_cost(component_type)
    }

    /// Places a component without charging for it. A compatible occupant is
    /// replaced; the returned error leaves the reactor untouched.
    pub fn place_component(
        &mut self,
        coord: GridCoord,
        component_type: &Arc<ComponentType>,
    ) -> Result<(), PlacementError> {
        self.check_placement(coord, component_type)?;
        if self.grid.is_occupied(coord) {
            self.remove_component(coord);
        }
        let mut component = ReactorComponent::new_with_metadata(
            Arc::clone(component_type),
            coord,
            self.next_component_id,
            self.tick_index,
        );
        component.durability = self.effective_max_durability_of(component_type);
        self.insert_component(component)
    }

    /// Buys and places a component. Replacing an occupant refunds its sell
    /// value first.
    pub fn buy_component(
        &mut self,
        coord: GridCoord,
        component_type: &Arc<ComponentType>,
    ) -> Result<(), PlacementError> {
        self.check_placement(coord, component_type)?;
        let cost = self.component_cost(component_type);
        let refund = self.component_at(coord).map_or(0.0, ReactorComponent::sell_value);
        let available = self.resources.money + refund;
        if available < cost {
            return Err(PlacementError::Unaffordable {
                name: component_type.name.clone(),
                cost,
                available,
            });
        }

        if let Some(sold) = self.remove_component(coord) {
            self.resources.refund_money(sold.sell_value());
        }
        if !self.resources.spend_money(cost) {
            return Err(PlacementError::Unaffordable {
                name: component_type.name.clone(),
                cost,
                available: self.resources.money,
            });
        }
        if let Err(err) = self.place_component(coord, component_type) {
            self.resources.refund_money(cost);
            return Err(err);
        }
        Ok(())
    }

    /// Removes the component at `coord` and credits its sell value.
    pub fn sell_component(&mut self, coord: GridCoord) -> Option<f64> {
        let removed = self.remove_component(coord)?;
        let refund = removed.sell_value();
        self.resources.refund_money(refund);
        Some(refund)
    }

    pub fn remove_component(&mut self, coord: GridCoord) -> Option<ReactorComponent> {
        let slot = self.slot_at(coord)?;
        let removed = self.detach(slot);
        self.pulses_dirty = true;
        self.refresh_derived();
        Some(removed)
    }

    /// Manual hull vent. Not counted as dissipated heat.
    pub fn vent_heat(&mut self) -> f64 {
        let vented = self.reactor_heat.min(self.multipliers.manual_vent_amount).max(0.0);
        self.reactor_heat -= vented;
        self.resources.sync(self.stored_power, self.reactor_heat);
        vented
    }

    pub fn can_scrounge(&self) -> bool {
        self.components.is_empty() && self.resources.money + self.stored_power < 10.0
    }

    /// Scrounges one unit of money when broke, otherwise sells all stored
    /// power. Returns the money gained.
    pub fn sell_or_scrounge(&mut self) -> f64 {
        if self.can_scrounge() {
            self.resources.add_money(1.0);
            return 1.0;
        }
        let gained = self.stored_power * self.multipliers.manual_sell;
        self.stored_power = 0.0;
        self.resources.sync(self.stored_power, self.reactor_heat);
        self.resources.add_money(gained);
        gained
    }

    pub fn auto_vent_rate_per_tick(&self) -> f64 {
        let bonus = self.stat_bonus(REACTOR_TYPE_ID, StatCategory::AutoVentRate);
        self.max_reactor_heat * (bonus - 1.0) * 0.01 + self.max_reactor_heat * BASE_AUTO_VENT
    }

    pub fn auto_sell_rate_per_tick(&self) -> f64 {
        let bonus = self.stat_bonus(REACTOR_TYPE_ID, StatCategory::AutoSellRate);
        (bonus - 1.0) * self.max_reactor_power * 0.01
    }

    /// Buys one level of an upgrade with the current balances.
    pub fn purchase_upgrade(&mut self, index: usize) -> bool {
        let level_before = self.upgrades.level(index);
        let (money, exotic_particles) = self.upgrades.purchase(
            index,
            self.resources.money,
            self.resources.exotic_particles,
        );
        if self.upgrades.level(index) == level_before {
            return false;
        }
        self.resources.money = money;
        self.resources.exotic_particles = exotic_particles;
        if index == SUBSPACE_EXPANSION_UPGRADE {
            self.resize_grid_for_subspace();
        }
        self.refresh_derived();
        true
    }

    /// Grows or shrinks the grid to the base size plus one row and column per
    /// Subspace Expansion level.
    pub fn resize_grid_for_subspace(&mut self) {
        let level = self.upgrades.level(SUBSPACE_EXPANSION_UPGRADE) as usize;
        let width = self.config.base_width + level;
        let height = self.config.base_height + level;
        if width == self.grid.width && height == self.grid.height {
            return;
        }

        debug!("resizing reactor grid to {width}x{height}");
        let evicted = self.grid.resize(width, height);
        if !evicted.is_empty() {
            let mut slots: Vec<usize> = evicted.iter().map(|(_, cell)| cell.slot).collect();
            for (coord, _) in &evicted {
                warn!("component at {coord} no longer fits the reactor grid, removing it");
            }
            slots.sort_unstable_by(|a, b| b.cmp(a));
            for slot in slots {
                self.components.swap_remove(slot);
                self.reindex_slot(slot);
            }
        }
        self.pulses_dirty = true;
        self.refresh_derived();
    }

    /// Visible shop entries for `page`, in display order.
    pub fn shop_components_for_page(&self, page: u32) -> Vec<Arc<ComponentType>> {
        let page = page % SHOP_PAGE_COUNT;
        let mut visible: Vec<Arc<ComponentType>> = self
            .catalog
            .iter()
            .filter(|component_type| component_type.shop.page == page)
            .filter(|component_type| {
                component_type
                    .required_upgrade
                    .is_none_or(|index| self.upgrades.level(index) > 0)
            })
            .cloned()
            .collect();
        visible.sort_by(|a, b| {
            (a.shop.row, a.shop.col, a.shop.order, &a.name)
                .cmp(&(b.shop.row, b.shop.col, b.shop.order, &b.name))
        });
        visible
    }

    pub fn shop_page_locked(&self, page: u32) -> bool {
        match page {
            0 | 1 => false,
            SHOP_PAGE_EXPERIMENTAL => self.upgrades.level(RESEARCH_GRANT_UPGRADE) == 0,
            _ => self.prestige_level < 2,
        }
    }

    /// The shop entry under the current selection, clamped to the page.
    pub fn selected_component(&self) -> Option<Arc<ComponentType>> {
        let index = self.selected_component_index?;
        let shop = self.shop_components_for_page(self.shop_page);
        let last = shop.len().checked_sub(1)?;
        shop.get(index.min(last)).cloned()
    }

    /// Brings multipliers, pulse counts and capacities up to date.
    pub(crate) fn refresh_derived(&mut self) {
        self.prepare_multipliers();
        if self.pulses_dirty {
            self.distribute_pulses();
            self.pulses_dirty = false;
        }
        self.recompute_max_capacities();
        self.resources.sync(self.stored_power, self.reactor_heat);
    }

    /// Adds an already-built component to an empty cell.
    pub(crate) fn insert_component(
        &mut self,
        mut component: ReactorComponent,
    ) -> Result<(), PlacementError> {
        let coord = component.coord;
        if !self.grid.in_bounds(coord) {
            return Err(PlacementError::OutOfBounds(coord));
        }
        if let Some(existing) = self.component_at(coord) {
            return Err(PlacementError::Occupied(coord, existing.name().to_string()));
        }

        component.id = self.next_component_id;
        self.next_component_id += 1;
        let cell = GridCell {
            slot: self.components.len(),
            component_id: component.id,
        };
        self.grid
            .place(coord, cell)
            .map_err(|_| PlacementError::OutOfBounds(coord))?;
        self.components.push(component);
        self.pulses_dirty = true;
        self.refresh_derived();
        Ok(())
    }

    pub(crate) fn slot_at(&self, coord: GridCoord) -> Option<usize> {
        self.grid.get(coord).map(|cell| cell.slot)
    }

    /// Removes the component in `slot` from both the grid and the list.
    pub(crate) fn detach(&mut self, slot: usize) -> ReactorComponent {
        let removed = self.components.swap_remove(slot);
        if let Err(err) = self.grid.clear(removed.coord) {
            warn!("detached component had no grid cell: {err}");
        }
        self.reindex_slot(slot);
        removed
    }

    pub(crate) fn clear_components(&mut self) {
        self.grid.clear_all();
        self.components.clear();
        self.pulses_dirty = true;
    }

    pub(crate) fn effective_max_durability_of(&self, component_type: &ComponentType) -> f64 {
        component_type.stats.max_durability
            * self.stat_bonus(component_type.component_type_id, StatCategory::MaxDurability)
    }

    /// Sum of tiers of placed components of `category`.
    pub(crate) fn sum_component_tiers(&self, category: ComponentCategory) -> f64 {
        self.components
            .iter()
            .filter(|component| component.component_type.category() == category)
            .map(|component| f64::from(component.component_type.tier))
            .sum()
    }

    fn check_placement(
        &self,
        coord: GridCoord,
        component_type: &ComponentType,
    ) -> Result<(), PlacementError> {
        if !self.grid.in_bounds(coord) {
            return Err(PlacementError::OutOfBounds(coord));
        }
        let Some(existing) = self.component_at(coord) else {
            return Ok(());
        };
        if existing.can_be_replaced_by(component_type) {
            return Ok(());
        }
        if existing.name() == component_type.name {
            return Err(PlacementError::Occupied(coord, existing.name().to_string()));
        }
        Err(PlacementError::Incompatible {
            coord,
            existing: existing.name().to_string(),
            replacement: component_type.name.clone(),
        })
    }

    /// Points the grid cell of the component now living in `slot` back at it.
    fn reindex_slot(&mut self, slot: usize) {
        let Some(moved) = self.components.get(slot) else {
            return;
        };
        let cell = GridCell {
            slot,
            component_id: moved.id,
        };
        if self.grid.get(moved.coord).is_some() {
            let _ = self.grid.place(moved.coord, cell);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{PlacementError, Simulation};
    use crate::model::GridCoord;

    #[test]
    fn placement_fills_the_cell_and_refreshes_capacity() {
        let mut sim = Simulation::default();
        let plating = sim.catalog.get("Plate1").expect("plating").clone();
        sim.place_component(GridCoord::new(0, 0, 0), &plating)
            .expect("empty cell accepts placement");

        assert_eq!(sim.components().len(), 1);
        assert_eq!(sim.max_reactor_heat(), 1250.0);

        let removed = sim.remove_component(GridCoord::new(0, 0, 0)).expect("removed");
        assert_eq!(removed.name(), "Plate1");
        assert_eq!(sim.max_reactor_heat(), 1000.0);
        assert!(sim.remove_component(GridCoord::new(0, 0, 0)).is_none());
    }

    #[test]
    fn removing_from_the_middle_keeps_grid_handles_valid() {
        let mut sim = Simulation::default();
        let vent = sim.catalog.get("Vent1").expect("vent").clone();
        for x in 0..4 {
            sim.place_component(GridCoord::new(x, 0, 0), &vent).expect("placed");
        }
        sim.remove_component(GridCoord::new(1, 0, 0));

        for x in [0, 2, 3] {
            let component = sim.component_at(GridCoord::new(x, 0, 0)).expect("still placed");
            assert_eq!(component.coord, GridCoord::new(x, 0, 0));
        }
        assert!(sim.component_at(GridCoord::new(1, 0, 0)).is_none());
    }

    #[test]
    fn placement_errors_are_typed() {
        let mut sim = Simulation::default();
        let vent = sim.catalog.get("Vent1").expect("vent").clone();
        let uranium = sim.catalog.get("Fuel1-1").expect("uranium").clone();
        let outside = GridCoord::new(sim.grid().width, 0, 0);

        assert_eq!(
            sim.place_component(outside, &vent),
            Err(PlacementError::OutOfBounds(outside))
        );

        let origin = GridCoord::new(0, 0, 0);
        sim.place_component(origin, &vent).expect("placed");
        assert!(matches!(
            sim.place_component(origin, &vent),
            Err(PlacementError::Occupied(..))
        ));
        assert!(matches!(
            sim.place_component(origin, &uranium),
            Err(PlacementError::Incompatible { .. })
        ));
        assert_eq!(sim.component_at(origin).expect("kept").name(), "Vent1");
    }

    #[test]
    fn buying_charges_and_replacement_refunds() {
        let mut sim = Simulation::default();
        let vent1 = sim.catalog.get("Vent1").expect("vent").clone();
        let vent2 = sim.catalog.get("Vent2").expect("vent").clone();
        let origin = GridCoord::new(0, 0, 0);

        assert!(matches!(
            sim.buy_component(origin, &vent1),
            Err(PlacementError::Unaffordable { .. })
        ));

        sim.resources.money = 700.0;
        sim.buy_component(origin, &vent1).expect("affordable");
        assert_eq!(sim.resources.money, 650.0);

        sim.buy_component(origin, &vent2).expect("refund covers the difference");
        assert_eq!(sim.resources.money, 650.0 + 50.0 - 600.0);
        assert_eq!(sim.component_at(origin).expect("placed").name(), "Vent2");

        assert_eq!(sim.sell_component(origin), Some(600.0));
        assert_eq!(sim.resources.money, 700.0);
        assert_eq!(sim.resources.total_money, 0.0);
    }

    #[test]
    fn scrounge_then_sell_power() {
        let mut sim = Simulation::default();
        assert!(sim.can_scrounge());
        assert_eq!(sim.sell_or_scrounge(), 1.0);
        assert_eq!(sim.resources.money, 1.0);

        sim.resources.money = 20.0;
        sim.stored_power = 42.0;
        assert!(!sim.can_scrounge());
        assert_eq!(sim.sell_or_scrounge(), 42.0);
        assert_eq!(sim.stored_power, 0.0);
        assert_eq!(sim.resources.money, 62.0);
    }

    #[test]
    fn manual_vent_is_bounded_by_hull_heat() {
        let mut sim = Simulation::default();
        sim.reactor_heat = 0.5;
        assert_eq!(sim.vent_heat(), 0.5);
        assert_eq!(sim.reactor_heat, 0.0);
        assert_eq!(sim.vent_heat(), 0.0);
        assert_eq!(sim.resources.total_heat_dissipated, 0.0);
    }

    #[test]
    fn shop_pages_hide_locked_parts() {
        let mut sim = Simulation::default();
        let power = sim.shop_components_for_page(0);
        assert_eq!(power[0].name, "Fuel1-1");
        assert!(power.iter().all(|entry| entry.shop.page == 0));

        assert!(sim.shop_components_for_page(2).is_empty());
        assert!(!sim.shop_page_locked(1));
        assert!(sim.shop_page_locked(2));
        assert!(sim.shop_page_locked(3));
        sim.prestige_level = 2;
        assert!(!sim.shop_page_locked(3));
        assert_eq!(sim.shop_components_for_page(5).len(), sim.shop_components_for_page(1).len());

        sim.selected_component_index = Some(1_000);
        let selected = sim.selected_component().expect("clamped to the last entry");
        assert_eq!(selected.name, power[power.len() - 1].name);
        sim.selected_component_index = None;
        assert!(sim.selected_component().is_none());
    }
}
