/// Per-tick changes shown next to the resource counters.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickDeltas {
    pub money: f64,
    pub power: f64,
    pub heat: f64,
    pub exotic_particles: f64,
}

impl TickDeltas {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Scalar economy counters. Lifetime totals only grow; the `_this_game`
/// counters restart at every prestige.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceStore {
    pub money: f64,
    pub total_money: f64,
    pub money_earned_this_game: f64,
    pub power: f64,
    pub total_power_produced: f64,
    pub power_produced_this_game: f64,
    pub heat: f64,
    pub total_heat_dissipated: f64,
    pub heat_dissipated_this_game: f64,
    pub exotic_particles: f64,
    pub total_exotic_particles: f64,
    pub tick_deltas: TickDeltas,
}

impl ResourceStore {
    pub fn begin_tick(&mut self) {
        self.tick_deltas.reset();
    }

    pub fn add_money(&mut self, amount: f64) {
        if amount <= 0.0 {
            return;
        }
        self.money += amount;
        self.total_money += amount;
        self.money_earned_this_game += amount;
        self.tick_deltas.money += amount;
    }

    /// Credits a sale refund. Refunds are not earnings.
    pub fn refund_money(&mut self, amount: f64) {
        if amount > 0.0 {
            self.money += amount;
        }
    }

    /// Deducts `amount` if the balance covers it.
    pub fn spend_money(&mut self, amount: f64) -> bool {
        if amount < 0.0 || self.money < amount {
            return false;
        }
        self.money -= amount;
        true
    }

    pub fn record_power_produced(&mut self, amount: f64) {
        if amount <= 0.0 {
            return;
        }
        self.total_power_produced += amount;
        self.power_produced_this_game += amount;
        self.tick_deltas.power += amount;
    }

    pub fn record_heat_dissipated(&mut self, amount: f64) {
        if amount <= 0.0 {
            return;
        }
        self.total_heat_dissipated += amount;
        self.heat_dissipated_this_game += amount;
    }

    /// Awards newly earned particles, raising the lifetime high-water mark.
    pub fn add_exotic_particles(&mut self, amount: f64) {
        if amount <= 0.0 {
            return;
        }
        self.exotic_particles += amount;
        self.total_exotic_particles += amount;
        self.tick_deltas.exotic_particles += amount;
    }

    /// Restores spendable particles to the lifetime total.
    pub fn refund_exotic_particles(&mut self) {
        self.exotic_particles = self.total_exotic_particles;
    }

    /// Mirrors the reactor's hull heat and stored power for display.
    pub fn sync(&mut self, stored_power: f64, reactor_heat: f64) {
        self.power = stored_power;
        self.heat = reactor_heat;
    }

    /// Clears the current run; lifetime totals and particles survive.
    pub fn reset_run(&mut self) {
        self.money = 0.0;
        self.money_earned_this_game = 0.0;
        self.power = 0.0;
        self.power_produced_this_game = 0.0;
        self.heat = 0.0;
        self.heat_dissipated_this_game = 0.0;
        self.tick_deltas.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::ResourceStore;

    #[test]
    fn money_counters_track_earnings_not_spending() {
        let mut store = ResourceStore::default();
        store.add_money(25.0);
        store.add_money(-5.0);
        assert!(store.spend_money(10.0));
        assert!(!store.spend_money(100.0));

        assert_eq!(store.money, 15.0);
        assert_eq!(store.total_money, 25.0);
        assert_eq!(store.money_earned_this_game, 25.0);
        assert_eq!(store.tick_deltas.money, 25.0);
    }

    #[test]
    fn reset_run_keeps_lifetime_totals() {
        let mut store = ResourceStore::default();
        store.add_money(10.0);
        store.record_power_produced(40.0);
        store.record_heat_dissipated(30.0);
        store.add_exotic_particles(3.0);
        store.exotic_particles = 1.0;

        store.reset_run();
        assert_eq!(store.money, 0.0);
        assert_eq!(store.power_produced_this_game, 0.0);
        assert_eq!(store.heat_dissipated_this_game, 0.0);
        assert_eq!(store.total_power_produced, 40.0);
        assert_eq!(store.total_heat_dissipated, 30.0);

        store.refund_exotic_particles();
        assert_eq!(store.exotic_particles, 3.0);
    }
}
