use std::f64::consts::PI;
use std::sync::Arc;

use log::{info, warn};

use super::simulation::{GlobalMultipliers, Simulation};
use super::upgrades::StatCategory;
use crate::model::{ComponentCategory, GridCoord, Mechanic, REACTOR_TYPE_ID, ReactorComponent};

const PLATING_TYPE_ID: u32 = 12;
const CAPACITOR_TYPE_ID: u32 = 13;

const BASE_HEAT_CAPACITY: f64 = 1000.0;
const BASE_POWER_CAPACITY: f64 = 100.0;
const OVERHEAT_THRESHOLD: f64 = 1000.0;
const MELTDOWN_FACTOR: f64 = 2.0;
const HULL_OVERFLOW_SHARE: f64 = 0.05;
pub(crate) const BASE_AUTO_VENT: f64 = 0.0001;
const REFLECTOR_BONUS: f64 = 0.1;
const MONASTIUM_RADIUS: usize = 3;
const MONASTIUM_PENALTY: f64 = 0.02;
const EXTREME_COOLANT_RADIUS: usize = 2;
const EXTREME_COOLANT_DRAW: f64 = 0.1;
const EXTREME_CAPACITOR_HEAT: f64 = 0.005;
const MIN_EXCHANGE: f64 = 0.001;
const HEAT_RESIDUAL: f64 = 0.01;

/// Heat a fuel cell produces in one tick: quadratic in its pulse count and
/// spread over its footprint.
pub fn fuel_heat(pulse_count: u32, heat_per_pulse: f64, cell_area: u32) -> f64 {
    let pulses = f64::from(pulse_count);
    pulses * pulses * heat_per_pulse / f64::from(cell_area.max(1))
}

fn tier_scaled(bonus: f64, tier_sum: f64) -> f64 {
    (bonus - 1.0) * tier_sum * 0.01 + 1.0
}

impl Simulation {
    /// Advances wall-clock time, running as many fixed ticks as fit.
    pub fn step(&mut self, dt: f64) {
        if self.paused {
            self.tick_accumulator = 0.0;
            return;
        }

        if !dt.is_finite() {
            warn!("ignoring non-finite time step {dt}");
            return;
        }
        self.tick_accumulator += dt.max(0.0);
        let ticks_per_second = self.multipliers.ticks_per_second;
        let interval = if ticks_per_second > 0.0 {
            1.0 / ticks_per_second
        } else {
            1.0
        };
        while self.tick_accumulator >= interval {
            self.tick_accumulator -= interval;
            self.tick();
        }
    }

    /// Runs one tick. Stage order matters: each stage reads what the
    /// previous one wrote.
    pub fn tick(&mut self) {
        self.resources.begin_tick();
        if self.paused {
            return;
        }

        self.tick_index += 1;
        self.destroyed_last_tick.clear();

        self.prepare_multipliers();
        if self.pulses_dirty {
            self.distribute_pulses();
            self.pulses_dirty = false;
        }
        self.drain_durability();
        let heat_to_hull = self.generate_power_and_heat();
        self.resources.tick_deltas.heat = heat_to_hull;

        self.exchange_heat_between_neighbors();
        self.absorb_into_extreme_coolant();

        let hull_before = self.reactor_heat;
        self.exchange_with_hull();
        let hull_exchange = self.reactor_heat - hull_before;

        let vented = self.vent_heat_to_air();
        let net_heat = heat_to_hull + vented - hull_exchange;

        self.check_explosions();
        self.auto_vent(net_heat);
        self.auto_sell();

        self.stored_power = self.stored_power.min(self.max_reactor_power);
        self.resources.sync(self.stored_power, self.reactor_heat);
    }

    pub(crate) fn prepare_multipliers(&mut self) {
        let capacitor_tiers = self.sum_component_tiers(ComponentCategory::Capacitor);
        let plating_tiers = self.sum_component_tiers(ComponentCategory::Plating);
        let upgrades = &self.upgrades;

        self.multipliers = GlobalMultipliers {
            self_vent: tier_scaled(
                upgrades.bonus(CAPACITOR_TYPE_ID, StatCategory::VentEffectiveness),
                capacitor_tiers,
            ),
            heat_exchange: tier_scaled(
                upgrades.bonus(CAPACITOR_TYPE_ID, StatCategory::ExchangerEffectiveness),
                capacitor_tiers,
            ),
            power_capacity: tier_scaled(
                upgrades.bonus(PLATING_TYPE_ID, StatCategory::VentCapacity),
                plating_tiers,
            ),
            heat_capacity: tier_scaled(
                upgrades.bonus(PLATING_TYPE_ID, StatCategory::ExchangerCapacity),
                plating_tiers,
            ),
            ticks_per_second: upgrades.bonus(REACTOR_TYPE_ID, StatCategory::TicksPerSecond),
            manual_vent_amount: upgrades.bonus(REACTOR_TYPE_ID, StatCategory::ManualVent),
            manual_sell: upgrades.bonus(REACTOR_TYPE_ID, StatCategory::ManualSell),
        };
    }

    pub(crate) fn distribute_pulses(&mut self) {
        for component in &mut self.components {
            component.pulse_count = 0;
        }

        for (coord, slot) in self.occupied_slots() {
            let component = &self.components[slot];
            if component.depleted || !component.is_fuel() {
                continue;
            }
            let pulses = component.component_type.pulses_produced();
            let scale = component.component_type.self_pulse_scale();
            let targets: Vec<usize> = if component.mechanic() == Mechanic::Stavrium {
                self.grid
                    .row_and_column(coord)
                    .filter_map(|target| self.slot_at(target))
                    .collect()
            } else {
                self.neighbor_slots(coord)
            };

            self.components[slot].pulse_count += scale * pulses;
            for target in targets {
                self.components[target].pulse_count += pulses;
            }
        }
    }

    pub(crate) fn recompute_max_capacities(&mut self) {
        let mut max_heat = self.stat_bonus(REACTOR_TYPE_ID, StatCategory::ReactorHeatCapIncrease)
            * BASE_HEAT_CAPACITY;
        let mut max_power = self.stat_bonus(REACTOR_TYPE_ID, StatCategory::ReactorPowerCapIncrease)
            * BASE_POWER_CAPACITY;
        for component in &self.components {
            let type_id = component.component_type.component_type_id;
            let stats = component.stats();
            max_heat += stats.reactor_heat_capacity_increase
                * self.stat_bonus(type_id, StatCategory::ReactorHeatCapIncrease);
            max_power += stats.reactor_power_capacity_increase
                * self.stat_bonus(type_id, StatCategory::ReactorPowerCapIncrease);
        }
        self.max_reactor_heat = max_heat * self.multipliers.heat_capacity;
        self.max_reactor_power = max_power * self.multipliers.power_capacity;
    }

    fn drain_durability(&mut self) {
        for (coord, slot) in self.occupied_slots() {
            if self.components[slot].depleted {
                continue;
            }
            let component_type = Arc::clone(&self.components[slot].component_type);

            if component_type.is_fuel() && component_type.stats.max_durability > 0.0 {
                self.components[slot].durability -= 1.0;
                if self.components[slot].durability <= 0.0 {
                    if component_type.mechanic() == Mechanic::Protium {
                        self.depleted_protium_count += 1;
                    }
                    let type_id = component_type.component_type_id;
                    if self.replace_mode && self.upgrades.has_replaces_self(type_id) {
                        let durability = self.effective_max_durability_of(&component_type);
                        let component = &mut self.components[slot];
                        component.durability = durability;
                        component.heat = 0.0;
                    } else {
                        self.components[slot].depleted = true;
                    }
                    self.pulses_dirty = true;
                }
            }

            if component_type.reflects() && component_type.stats.max_durability > 0.0 {
                let drain: u32 = self
                    .neighbor_slots(coord)
                    .into_iter()
                    .map(|neighbor| &self.components[neighbor])
                    .filter(|neighbor| !neighbor.depleted)
                    .map(|neighbor| neighbor.component_type.pulses_produced())
                    .sum();
                let reflector = &mut self.components[slot];
                reflector.durability -= f64::from(drain);
                if reflector.durability <= 0.0 {
                    reflector.depleted = true;
                }
            }
        }
    }

    /// Returns the heat that went straight into the hull.
    fn generate_power_and_heat(&mut self) -> f64 {
        let overheat = if self.reactor_heat > OVERHEAT_THRESHOLD {
            let cell_effectiveness = self.stat_bonus(REACTOR_TYPE_ID, StatCategory::CellEffectiveness);
            self.reactor_heat.ln() / OVERHEAT_THRESHOLD.ln() * (cell_effectiveness - 1.0) * 0.01 + 1.0
        } else {
            1.0
        };

        let mut total_power = 0.0;
        let mut heat_to_hull = 0.0;
        for (coord, slot) in self.occupied_slots() {
            let component = &self.components[slot];
            if component.depleted || component.stats().energy_per_pulse <= 0.0 {
                continue;
            }
            let component_type = Arc::clone(&component.component_type);
            let type_id = component_type.component_type_id;
            let pulse_count = component.pulse_count;
            let durability = component.durability;

            let energy_per_pulse = component_type.stats.energy_per_pulse
                * self.stat_bonus(type_id, StatCategory::EnergyPerPulse);
            let heat_per_pulse = component_type.stats.heat_per_pulse
                * self.stat_bonus(type_id, StatCategory::HeatPerPulse);
            let mut power = f64::from(pulse_count) * energy_per_pulse;
            let mut heat = fuel_heat(pulse_count, heat_per_pulse, component_type.cell_area());

            match component_type.mechanic() {
                Mechanic::Protium => {
                    power *= f64::from(self.depleted_protium_count) / 100.0 + 1.0;
                }
                Mechanic::Kymium => {
                    let max_durability = self.effective_max_durability_of(&component_type);
                    if max_durability > 0.0 {
                        let phase = (durability / max_durability * 8.0 * PI).cos();
                        power *= (1.0 - phase) / 2.0;
                        heat *= (1.0 + phase) / 2.0;
                    }
                }
                Mechanic::Monastium => {
                    let occupied = self.grid.occupied_within_square(coord, MONASTIUM_RADIUS);
                    power *= 1.0 - occupied as f64 * MONASTIUM_PENALTY;
                }
                _ => {}
            }

            let neighbors = self.neighbor_slots(coord);
            let reflector_mult = 1.0
                + neighbors
                    .iter()
                    .map(|&neighbor| &self.components[neighbor])
                    .filter(|neighbor| neighbor.component_type.reflects() && !neighbor.depleted)
                    .map(|neighbor| {
                        REFLECTOR_BONUS
                            * self.stat_bonus(
                                neighbor.component_type.component_type_id,
                                StatCategory::ReflectorEffectiveness,
                            )
                    })
                    .sum::<f64>();
            let absorbers: Vec<usize> = neighbors
                .into_iter()
                .filter(|&neighbor| self.components[neighbor].component_type.absorbs_heat())
                .collect();

            power *= reflector_mult * overheat;
            let component = &mut self.components[slot];
            component.last_power = power;
            component.last_heat = heat;
            total_power += power;

            if absorbers.is_empty() {
                heat_to_hull += heat;
            } else {
                let share = heat / absorbers.len() as f64;
                for absorber in absorbers {
                    self.components[absorber].heat += share;
                }
            }
        }

        self.stored_power += total_power;
        self.reactor_heat += heat_to_hull;
        self.resources.record_power_produced(total_power);
        heat_to_hull
    }

    /// Exchangers pull each neighbor toward the pooled fill ratio of the pair.
    fn exchange_heat_between_neighbors(&mut self) {
        for (coord, slot) in self.occupied_slots() {
            let exchanger = &self.components[slot];
            if exchanger.depleted || exchanger.mechanic() != Mechanic::Exchanger {
                continue;
            }
            let base_rate = exchanger.stats().self_vent_rate;
            if base_rate <= 0.0 {
                continue;
            }
            let rate = base_rate
                * self.stat_bonus(
                    exchanger.component_type.component_type_id,
                    StatCategory::AdjacentTransferRate,
                )
                * self.multipliers.heat_exchange;
            let capacity = self.effective_heat_capacity(exchanger);
            if capacity <= 0.0 {
                continue;
            }

            for neighbor_slot in self.neighbor_slots(coord) {
                let neighbor = &self.components[neighbor_slot];
                if neighbor.depleted || neighbor.component_type.cant_lose_heat {
                    continue;
                }
                let neighbor_capacity = self.effective_heat_capacity(neighbor);
                if neighbor_capacity <= 0.0 {
                    continue;
                }
                let pooled = self.components[slot].heat + neighbor.heat;
                let ratio = (pooled / (capacity + neighbor_capacity)).clamp(0.0, 1.0);
                let transfer = (ratio * neighbor_capacity - neighbor.heat).clamp(-rate, rate);
                if transfer.abs() > MIN_EXCHANGE {
                    self.components[neighbor_slot].heat += transfer;
                    self.components[slot].heat -= transfer;
                }
            }
        }
    }

    fn absorb_into_extreme_coolant(&mut self) {
        for (coord, slot) in self.occupied_slots() {
            let coolant = &self.components[slot];
            if coolant.depleted || coolant.mechanic() != Mechanic::ExtremeCoolant {
                continue;
            }
            let sources: Vec<usize> = self
                .grid
                .manhattan_neighbors(coord, EXTREME_COOLANT_RADIUS)
                .filter_map(|source| self.slot_at(source))
                .collect();
            for source in sources {
                let source_type = &self.components[source].component_type;
                if !source_type.absorbs_heat() || source_type.cant_lose_heat {
                    continue;
                }
                let absorbed = self.components[source].heat * EXTREME_COOLANT_DRAW;
                self.components[source].heat -= absorbed;
                self.components[slot].heat += absorbed;
            }
        }
    }

    /// Inlets pull neighbor heat into the hull; outlets push hull heat out,
    /// rationed by how much hull heat there is against total outlet capacity.
    fn exchange_with_hull(&mut self) {
        let order = self.occupied_slots();

        let mut outlet_capacity = 0.0;
        for &(coord, slot) in &order {
            let outlet = &self.components[slot];
            if !self.moves_hull_heat(outlet) || outlet.mechanic() != Mechanic::Outlet {
                continue;
            }
            let absorbers = self.absorbing_neighbors(coord).len();
            outlet_capacity += absorbers as f64 * self.hull_transfer_rate(outlet);
        }
        let distribution = if outlet_capacity > 0.0 {
            (self.reactor_heat / outlet_capacity).clamp(0.0, 1.0)
        } else {
            0.0
        };

        for (coord, slot) in order {
            let component = &self.components[slot];
            if !self.moves_hull_heat(component) {
                continue;
            }
            let rate = self.hull_transfer_rate(component);
            match component.mechanic() {
                Mechanic::Inlet => {
                    for neighbor in self.neighbor_slots(coord) {
                        let source = &mut self.components[neighbor];
                        if source.component_type.cant_lose_heat {
                            continue;
                        }
                        let transfer = rate.min(source.heat);
                        if transfer > 0.0 {
                            source.heat -= transfer;
                            self.reactor_heat += transfer;
                        }
                    }
                }
                Mechanic::Outlet if outlet_capacity > 0.0 => {
                    let absorbers = self.absorbing_neighbors(coord);
                    if absorbers.is_empty() {
                        continue;
                    }
                    let count = absorbers.len() as f64;
                    let share = (distribution * rate * count).min(self.reactor_heat) / count;
                    for absorber in absorbers {
                        self.reactor_heat -= share;
                        self.components[absorber].heat += share;
                    }
                }
                _ => {}
            }
        }
    }

    /// Returns the heat vented by components this tick.
    fn vent_heat_to_air(&mut self) -> f64 {
        let mut total_vented = 0.0;
        for (_, slot) in self.occupied_slots() {
            let vent = &self.components[slot];
            if vent.stats().self_vent_rate <= 0.0
                || matches!(
                    vent.mechanic(),
                    Mechanic::Exchanger | Mechanic::Inlet | Mechanic::Outlet
                )
            {
                continue;
            }
            let rate = vent.stats().self_vent_rate
                * self.stat_bonus(vent.component_type.component_type_id, StatCategory::SelfVentRate)
                * self.multipliers.self_vent;

            let vent = &mut self.components[slot];
            let vented = vent.heat.min(rate).max(0.0);
            vent.heat -= vented;
            if vent.heat < HEAT_RESIDUAL {
                vent.heat = 0.0;
            }
            total_vented += vented;
        }
        self.resources.record_heat_dissipated(total_vented);
        total_vented
    }

    /// Spills hull overflow into components, then destroys every component
    /// at or over its heat capacity, or everything on meltdown.
    fn check_explosions(&mut self) {
        let max_heat = self.max_reactor_heat;
        let meltdown = max_heat > 0.0 && self.reactor_heat >= MELTDOWN_FACTOR * max_heat;

        if max_heat > 0.0 && self.reactor_heat > max_heat {
            let overflow = (self.reactor_heat - max_heat) * HULL_OVERFLOW_SHARE;
            for component in &mut self.components {
                if component.component_type.absorbs_heat() && !component.depleted {
                    component.heat += overflow;
                }
            }
        }

        let doomed: Vec<(GridCoord, usize)> = self
            .occupied_slots()
            .into_iter()
            .filter(|&(_, slot)| {
                let component = &self.components[slot];
                meltdown || self.is_over_capacity(component)
            })
            .collect();

        if meltdown {
            info!(
                "reactor meltdown at hull heat {:.1} (capacity {max_heat:.1}), destroying {} components",
                self.reactor_heat,
                doomed.len()
            );
        }

        if !doomed.is_empty() {
            let mut slots = Vec::with_capacity(doomed.len());
            for (coord, slot) in doomed {
                if !meltdown {
                    warn!(
                        "{} at {coord} exceeded its heat capacity and exploded",
                        self.components[slot].name()
                    );
                }
                self.destroyed_last_tick.push(coord);
                slots.push(slot);
            }
            slots.sort_unstable_by(|a, b| b.cmp(a));
            for slot in slots {
                self.detach(slot);
            }
            self.pulses_dirty = true;
            self.recompute_max_capacities();
        }

        for component in &mut self.components {
            if component.heat < HEAT_RESIDUAL {
                component.heat = 0.0;
            }
        }
    }

    fn auto_vent(&mut self, net_heat: f64) {
        let mut rate = self.auto_vent_rate_per_tick();
        if self.reactor_heat > self.max_reactor_heat && net_heat <= 0.0 {
            rate = rate.max((self.reactor_heat - self.max_reactor_heat) * HULL_OVERFLOW_SHARE);
        }
        if rate <= 0.0 || self.reactor_heat <= 0.0 {
            return;
        }
        let vented = self.reactor_heat.min(rate);
        self.reactor_heat -= vented;
        self.resources.tick_deltas.heat -= vented;
        self.resources.record_heat_dissipated(vented);
    }

    fn auto_sell(&mut self) {
        let rate = self.auto_sell_rate_per_tick();
        if rate <= 0.0 || self.stored_power <= 0.0 {
            return;
        }
        let sold = self.stored_power.min(rate);
        self.stored_power -= sold;
        self.resources.add_money(sold);

        let sell_bonus = self.stat_bonus(REACTOR_TYPE_ID, StatCategory::AutoSellRate) - 1.0;
        if sell_bonus <= 0.0 {
            return;
        }
        let sell_ratio = sold / rate;
        for slot in 0..self.components.len() {
            let capacitor = &self.components[slot];
            if capacitor.depleted || capacitor.mechanic() != Mechanic::ExtremeCapacitor {
                continue;
            }
            let power_increase = capacitor.stats().reactor_power_capacity_increase
                * self.stat_bonus(
                    capacitor.component_type.component_type_id,
                    StatCategory::ReactorPowerCapIncrease,
                );
            let capacity = self.effective_heat_capacity(capacitor);

            let capacitor = &mut self.components[slot];
            capacitor.heat += sell_bonus * power_increase * EXTREME_CAPACITOR_HEAT * sell_ratio;
            if capacity > 0.0 && capacitor.heat > capacity {
                capacitor.heat = capacity;
            }
        }
    }

    /// Occupied cells in grid order with their component slots.
    fn occupied_slots(&self) -> Vec<(GridCoord, usize)> {
        self.grid
            .occupied()
            .map(|(coord, cell)| (coord, cell.slot))
            .collect()
    }

    fn neighbor_slots(&self, coord: GridCoord) -> Vec<usize> {
        self.grid
            .cardinal_neighbors(coord)
            .filter_map(|neighbor| self.slot_at(neighbor))
            .collect()
    }

    fn absorbing_neighbors(&self, coord: GridCoord) -> Vec<usize> {
        self.neighbor_slots(coord)
            .into_iter()
            .filter(|&slot| self.components[slot].component_type.absorbs_heat())
            .collect()
    }

    fn moves_hull_heat(&self, component: &ReactorComponent) -> bool {
        !component.depleted && component.stats().reactor_vent_rate > 0.0
    }

    fn hull_transfer_rate(&self, component: &ReactorComponent) -> f64 {
        component.stats().reactor_vent_rate
            * self.stat_bonus(
                component.component_type.component_type_id,
                StatCategory::ReactorTransferRate,
            )
            * self.multipliers.heat_exchange
    }

    fn is_over_capacity(&self, component: &ReactorComponent) -> bool {
        !component.depleted
            && component.component_type.absorbs_heat()
            && component.heat >= self.effective_heat_capacity(component)
    }
}
