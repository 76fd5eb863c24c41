use log::info;

use super::simulation::Simulation;
use super::resource_store::ResourceStore;

/// Lifetime power and heat both need to reach this before prestige pays out.
pub const PRESTIGE_THRESHOLD: f64 = 1e12;

/// Prestige button state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PrestigePhase {
    #[default]
    Normal,
    /// First press seen, waiting for confirmation.
    Confirming,
    /// Prestige done; prestige upgrades can still be refunded.
    RefundWindow,
}

/// Exotic particles earned on top of `banked`:
/// `floor(4^(log10(min(power, heat)) − 12)) − banked`, zero under the threshold.
pub fn prestige_exotic_particles(
    total_power_produced: f64,
    total_heat_dissipated: f64,
    banked: f64,
) -> u64 {
    let value = total_power_produced.min(total_heat_dissipated);
    if value.is_nan() || value < PRESTIGE_THRESHOLD {
        return 0;
    }
    let total = 4f64.powf(value.log10() - 12.0).floor();
    let banked = banked.max(0.0).floor();
    if total > banked {
        (total - banked) as u64
    } else {
        0
    }
}

impl Simulation {
    pub fn prestige_phase(&self) -> PrestigePhase {
        self.prestige_phase
    }

    pub fn calculate_prestige_ep(&self) -> u64 {
        prestige_exotic_particles(
            self.resources.total_power_produced,
            self.resources.total_heat_dissipated,
            self.resources.total_exotic_particles,
        )
    }

    /// Awards pending exotic particles and starts a new run. Lifetime totals
    /// and prestige upgrades survive.
    pub fn do_prestige(&mut self) -> u64 {
        let gained = self.calculate_prestige_ep();
        self.resources.add_exotic_particles(gained as f64);

        self.clear_components();
        self.resources.reset_run();
        self.reactor_heat = 0.0;
        self.stored_power = 0.0;
        self.depleted_protium_count = 0;
        self.upgrades.reset_non_prestige();
        self.selected_component_index = None;
        self.replace_mode = true;
        self.prestige_level += 1;
        self.prestige_phase = PrestigePhase::RefundWindow;

        info!(
            "prestige {} complete, gained {gained} exotic particles ({} total)",
            self.prestige_level, self.resources.total_exotic_particles
        );
        self.resize_grid_for_subspace();
        self.refresh_derived();
        gained
    }

    /// Zeroes prestige upgrades and hands back every exotic particle spent.
    pub fn refund_prestige_upgrades(&mut self) {
        self.upgrades.reset_prestige();
        self.resources.refund_exotic_particles();
        self.prestige_phase = PrestigePhase::Normal;
        info!(
            "refunded prestige upgrades, {} exotic particles available",
            self.resources.exotic_particles
        );
        self.resize_grid_for_subspace();
        self.refresh_derived();
    }

    /// Drives the prestige button and returns the phase it leaves behind.
    pub fn press_prestige(&mut self) -> PrestigePhase {
        match self.prestige_phase {
            PrestigePhase::Normal => self.prestige_phase = PrestigePhase::Confirming,
            PrestigePhase::Confirming => {
                self.do_prestige();
            }
            PrestigePhase::RefundWindow => self.refund_prestige_upgrades(),
        }
        self.prestige_phase
    }

    /// Leaving the prestige screen drops any pending confirmation and closes
    /// the refund window.
    pub fn cancel_prestige(&mut self) {
        self.prestige_phase = PrestigePhase::Normal;
    }

    /// Hard reset: clears the reactor, every counter and every upgrade.
    pub fn reset_game(&mut self) {
        self.clear_components();
        self.resources = ResourceStore::default();
        self.resources.money = self.config.starting_money;
        self.reactor_heat = 0.0;
        self.stored_power = 0.0;
        self.depleted_protium_count = 0;
        self.tick_index = 0;
        self.tick_accumulator = 0.0;
        self.prestige_level = 0;
        self.selected_component_index = None;
        self.upgrades.reset_all();
        self.prestige_phase = PrestigePhase::Normal;
        self.destroyed_last_tick.clear();

        info!("game reset");
        self.resize_grid_for_subspace();
        self.refresh_derived();
    }
}

#[cfg(test)]
mod tests {
    use super::{PrestigePhase, prestige_exotic_particles};
    use crate::core::{Simulation, UpgradeManager};
    use crate::data::parse_upgrade_data;
    use crate::model::GridCoord;

    fn simulation_with_upgrades() -> Simulation {
        let file = parse_upgrade_data(
            r#"{"upgrades": [
                {"index": 0, "name": "Chronometer", "base_cost": 10, "cost_multiplier": 10,
                 "bonuses": [{"component_type": 1, "stat_category": 19, "additive": 1}]},
                {"index": 1, "name": "Infused Cells", "base_cost": 2, "cost_multiplier": 2,
                 "is_prestige": true,
                 "bonuses": [{"component_type": 2, "stat_category": 3, "additive": 1}]}
            ]}"#,
        )
        .expect("upgrade data should parse");
        let mut sim = Simulation::default();
        sim.upgrades = UpgradeManager::from_data(&file);
        sim
    }

    #[test]
    fn exotic_particles_start_at_the_threshold() {
        assert_eq!(prestige_exotic_particles(1e12, 1e12, 0.0), 1);
        assert_eq!(prestige_exotic_particles(9.99e11, 5e12, 0.0), 0);
        assert_eq!(prestige_exotic_particles(1e13, 1e14, 0.0), 4);
        assert_eq!(prestige_exotic_particles(1e14, 1e14, 4.0), 12);
        assert_eq!(prestige_exotic_particles(1e13, 1e13, 10.0), 0);
        assert_eq!(prestige_exotic_particles(f64::NAN, 1e13, 0.0), 0);
    }

    #[test]
    fn prestige_awards_particles_and_starts_a_new_run() {
        let mut sim = simulation_with_upgrades();
        let vent = sim.catalog.get("Vent1").expect("vent").clone();
        sim.place_component(GridCoord::new(0, 0, 0), &vent).expect("placed");
        sim.resources.money = 500.0;
        sim.resources.add_money(10.0);
        sim.resources.record_power_produced(1e13);
        sim.resources.record_heat_dissipated(1e13);
        sim.reactor_heat = 40.0;
        sim.stored_power = 30.0;
        sim.selected_component_index = Some(2);
        sim.replace_mode = false;
        sim.upgrades.set_level(0, 3);

        assert_eq!(sim.do_prestige(), 4);

        assert!(sim.components().is_empty());
        assert_eq!(sim.grid().occupied_count(), 0);
        assert_eq!(sim.resources.money, 0.0);
        assert_eq!(sim.resources.exotic_particles, 4.0);
        assert_eq!(sim.resources.total_exotic_particles, 4.0);
        assert_eq!(sim.resources.total_power_produced, 1e13);
        assert_eq!(sim.resources.power_produced_this_game, 0.0);
        assert_eq!(sim.reactor_heat, 0.0);
        assert_eq!(sim.stored_power, 0.0);
        assert_eq!(sim.upgrades.level(0), 0);
        assert_eq!(sim.selected_component_index, None);
        assert!(sim.replace_mode);
        assert_eq!(sim.prestige_level, 1);
        assert_eq!(sim.prestige_phase(), PrestigePhase::RefundWindow);

        // Nothing new to earn until lifetime totals grow.
        assert_eq!(sim.calculate_prestige_ep(), 0);
    }

    #[test]
    fn refund_restores_spent_particles() {
        let mut sim = simulation_with_upgrades();
        sim.resources.add_exotic_particles(10.0);
        assert!(sim.purchase_upgrade(1));
        assert!(sim.purchase_upgrade(1));
        assert_eq!(sim.resources.exotic_particles, 4.0);

        sim.refund_prestige_upgrades();
        assert_eq!(sim.upgrades.level(1), 0);
        assert_eq!(sim.resources.exotic_particles, 10.0);
        assert_eq!(sim.prestige_phase(), PrestigePhase::Normal);
    }

    #[test]
    fn prestige_button_walks_the_phases() {
        let mut sim = simulation_with_upgrades();
        assert_eq!(sim.press_prestige(), PrestigePhase::Confirming);
        sim.cancel_prestige();
        assert_eq!(sim.prestige_phase(), PrestigePhase::Normal);
        assert_eq!(sim.prestige_level, 0);

        assert_eq!(sim.press_prestige(), PrestigePhase::Confirming);
        assert_eq!(sim.press_prestige(), PrestigePhase::RefundWindow);
        assert_eq!(sim.prestige_level, 1);
        assert_eq!(sim.press_prestige(), PrestigePhase::Normal);
    }

    #[test]
    fn reset_game_clears_prestige_progress_too() {
        let mut sim = simulation_with_upgrades();
        sim.resources.add_exotic_particles(10.0);
        sim.purchase_upgrade(1);
        sim.prestige_level = 3;
        sim.tick();

        sim.reset_game();
        assert_eq!(sim.upgrades.level(1), 0);
        assert_eq!(sim.resources.total_exotic_particles, 0.0);
        assert_eq!(sim.prestige_level, 0);
        assert_eq!(sim.tick_index, 0);
        assert_eq!(sim.prestige_phase(), PrestigePhase::Normal);
    }
}
