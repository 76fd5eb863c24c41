use log::{debug, warn};

use crate::data::{UpgradeDataFile, UpgradeRecord};
use crate::model::REACTOR_TYPE_ID;

/// Unlocks the experimental shop page.
pub const RESEARCH_GRANT_UPGRADE: usize = 32;
/// Each level grows the reactor grid by one column and one row.
pub const SUBSPACE_EXPANSION_UPGRADE: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatCategory {
    MaxDurability,
    HeatCapacity,
    EnergyPerPulse,
    HeatPerPulse,
    PulsesProduced,
    SelfVentRate,
    AdjacentVentRate,
    ReactorVentRate,
    AdjacentTransferRate,
    ReactorTransferRate,
    ReactorHeatCapIncrease,
    ReactorPowerCapIncrease,
    ManualSell,
    ManualVent,
    AutoSellRate,
    AutoVentRate,
    VentEffectiveness,
    ReplacesSelf,
    TicksPerSecond,
    CellEffectiveness,
    VentCapacity,
    ExchangerEffectiveness,
    ExchangerCapacity,
    ReflectorEffectiveness,
    ComponentDiscount,
    UpgradeDiscount,
}

impl StatCategory {
    pub const ALL: [StatCategory; 26] = [
        Self::MaxDurability,
        Self::HeatCapacity,
        Self::EnergyPerPulse,
        Self::HeatPerPulse,
        Self::PulsesProduced,
        Self::SelfVentRate,
        Self::AdjacentVentRate,
        Self::ReactorVentRate,
        Self::AdjacentTransferRate,
        Self::ReactorTransferRate,
        Self::ReactorHeatCapIncrease,
        Self::ReactorPowerCapIncrease,
        Self::ManualSell,
        Self::ManualVent,
        Self::AutoSellRate,
        Self::AutoVentRate,
        Self::VentEffectiveness,
        Self::ReplacesSelf,
        Self::TicksPerSecond,
        Self::CellEffectiveness,
        Self::VentCapacity,
        Self::ExchangerEffectiveness,
        Self::ExchangerCapacity,
        Self::ReflectorEffectiveness,
        Self::ComponentDiscount,
        Self::UpgradeDiscount,
    ];

    /// Numeric id used by upgrade data, starting at 1.
    pub fn id(self) -> i32 {
        Self::ALL
            .iter()
            .position(|&stat| stat == self)
            .map_or(0, |position| position as i32 + 1)
    }

    pub fn from_id(id: i32) -> Option<Self> {
        let position = usize::try_from(id).ok()?.checked_sub(1)?;
        Self::ALL.get(position).copied()
    }
}

/// One stat modifier carried by an upgrade.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bonus {
    pub component_type_id: u32,
    pub stat: StatCategory,
    pub additive: f64,
    pub multiplicative: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpgradeDefinition {
    pub index: usize,
    pub name: String,
    pub level_names: Vec<String>,
    pub description: String,
    pub base_cost: f64,
    /// Zero marks a one-time purchase.
    pub cost_multiplier: f64,
    pub purchasable: bool,
    pub is_prestige: bool,
    pub prerequisite: Option<usize>,
    pub bonuses: Vec<Bonus>,
    pub category: String,
    pub level: u32,
}

impl UpgradeDefinition {
    pub fn from_record(record: &UpgradeRecord) -> Self {
        let bonuses = record
            .bonuses
            .iter()
            .filter_map(|bonus| {
                let Some(stat) = StatCategory::from_id(bonus.stat_category) else {
                    warn!(
                        "upgrade '{}' has unknown stat category {}, skipping bonus",
                        record.name, bonus.stat_category
                    );
                    return None;
                };
                let Ok(component_type_id) = u32::try_from(bonus.component_type) else {
                    warn!(
                        "upgrade '{}' has invalid component type {}, skipping bonus",
                        record.name, bonus.component_type
                    );
                    return None;
                };
                Some(Bonus {
                    component_type_id,
                    stat,
                    additive: bonus.additive,
                    multiplicative: bonus.multiplicative,
                })
            })
            .collect();

        Self {
            index: record.index as usize,
            name: record.name.clone(),
            level_names: record.level_names.clone(),
            description: record.description.clone(),
            base_cost: record.base_cost,
            cost_multiplier: record.cost_multiplier,
            purchasable: record.purchasable,
            is_prestige: record.is_prestige,
            prerequisite: usize::try_from(record.prerequisite).ok(),
            bonuses,
            category: record.category.clone(),
            level: 0,
        }
    }

    pub fn is_one_time(&self) -> bool {
        self.cost_multiplier == 0.0
    }
}

/// Upgrade catalog with purchased levels. Upgrades are addressed by their
/// `index` from the upgrade data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpgradeManager {
    upgrades: Vec<UpgradeDefinition>,
}

impl UpgradeManager {
    pub fn new(mut upgrades: Vec<UpgradeDefinition>) -> Self {
        upgrades.sort_by_key(|upgrade| upgrade.index);
        upgrades.dedup_by(|next, kept| {
            let duplicate = next.index == kept.index;
            if duplicate {
                warn!("duplicate upgrade index {}, keeping the first", next.index);
            }
            duplicate
        });
        Self { upgrades }
    }

    pub fn from_data(file: &UpgradeDataFile) -> Self {
        Self::new(file.upgrades.iter().map(UpgradeDefinition::from_record).collect())
    }

    pub fn get(&self, index: usize) -> Option<&UpgradeDefinition> {
        self.position(index).map(|position| &self.upgrades[position])
    }

    pub fn iter(&self) -> impl Iterator<Item = &UpgradeDefinition> {
        self.upgrades.iter()
    }

    pub fn len(&self) -> usize {
        self.upgrades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.upgrades.is_empty()
    }

    /// Purchased level, zero for unknown indexes.
    pub fn level(&self, index: usize) -> u32 {
        self.get(index).map_or(0, |upgrade| upgrade.level)
    }

    pub fn set_level(&mut self, index: usize, level: u32) -> bool {
        match self.position(index) {
            Some(position) => {
                self.upgrades[position].level = level;
                true
            }
            None => false,
        }
    }

    /// `(index, level)` for every upgrade, in index order.
    pub fn levels(&self) -> Vec<(usize, u32)> {
        self.upgrades
            .iter()
            .map(|upgrade| (upgrade.index, upgrade.level))
            .collect()
    }

    /// `Π multiplicative^level × (Σ additive × level + 1)` over purchased
    /// bonuses matching the pair. Exactly 1.0 when nothing matches.
    pub fn bonus(&self, component_type_id: u32, stat: StatCategory) -> f64 {
        let mut additive = 0.0;
        let mut multiplicative = 1.0;
        for upgrade in self.upgrades.iter().filter(|upgrade| upgrade.level > 0) {
            let level = upgrade.level;
            for bonus in upgrade
                .bonuses
                .iter()
                .filter(|bonus| bonus.component_type_id == component_type_id && bonus.stat == stat)
            {
                additive += bonus.additive * f64::from(level);
                multiplicative *= bonus.multiplicative.powi(level as i32);
            }
        }
        multiplicative * (additive + 1.0)
    }

    pub fn upgrade_discount(&self) -> f64 {
        discount_from(self.bonus(REACTOR_TYPE_ID, StatCategory::UpgradeDiscount))
    }

    pub fn component_discount(&self) -> f64 {
        discount_from(self.bonus(REACTOR_TYPE_ID, StatCategory::ComponentDiscount))
    }

    pub fn has_replaces_self(&self, component_type_id: u32) -> bool {
        self.bonus(component_type_id, StatCategory::ReplacesSelf) > 1.0
    }

    /// Price of the next level; zero for unknown indexes.
    pub fn cost(&self, index: usize) -> f64 {
        let Some(upgrade) = self.get(index) else {
            return 0.0;
        };
        if upgrade.is_one_time() {
            return upgrade.base_cost;
        }
        upgrade.base_cost * upgrade.cost_multiplier.powi(upgrade.level as i32) * self.upgrade_discount()
    }

    pub fn can_purchase(&self, index: usize, money: f64, exotic_particles: f64) -> bool {
        let Some(upgrade) = self.get(index) else {
            return false;
        };
        if !upgrade.purchasable {
            return false;
        }
        if upgrade.is_one_time() && upgrade.level > 0 {
            return false;
        }
        if let Some(prerequisite) = upgrade.prerequisite
            && self.level(prerequisite) == 0
        {
            return false;
        }
        let cost = self.cost(index);
        if upgrade.is_prestige {
            exotic_particles >= cost
        } else {
            money >= cost
        }
    }

    /// Buys one level and returns the remaining `(money, exotic_particles)`.
    /// The inputs come back unchanged when the purchase is not allowed.
    pub fn purchase(&mut self, index: usize, money: f64, exotic_particles: f64) -> (f64, f64) {
        if !self.can_purchase(index, money, exotic_particles) {
            return (money, exotic_particles);
        }
        let cost = self.cost(index);
        let Some(position) = self.position(index) else {
            return (money, exotic_particles);
        };
        let upgrade = &mut self.upgrades[position];
        upgrade.level += 1;
        debug!(
            "purchased upgrade {} '{}' level {} for {cost}",
            upgrade.index, upgrade.name, upgrade.level
        );
        if upgrade.is_prestige {
            (money, exotic_particles - cost)
        } else {
            (money - cost, exotic_particles)
        }
    }

    /// Level-dependent name, falling back to the base name.
    pub fn display_name(&self, index: usize) -> &str {
        let Some(upgrade) = self.get(index) else {
            return "";
        };
        if upgrade.level_names.is_empty() {
            return &upgrade.name;
        }
        let name_index = (upgrade.level as usize).min(upgrade.level_names.len() - 1);
        &upgrade.level_names[name_index]
    }

    pub fn reset_non_prestige(&mut self) {
        for upgrade in self.upgrades.iter_mut().filter(|upgrade| !upgrade.is_prestige) {
            upgrade.level = 0;
        }
    }

    pub fn reset_prestige(&mut self) {
        for upgrade in self.upgrades.iter_mut().filter(|upgrade| upgrade.is_prestige) {
            upgrade.level = 0;
        }
    }

    pub fn reset_all(&mut self) {
        for upgrade in &mut self.upgrades {
            upgrade.level = 0;
        }
    }

    fn position(&self, index: usize) -> Option<usize> {
        self.upgrades
            .binary_search_by_key(&index, |upgrade| upgrade.index)
            .ok()
    }
}

/// `0.99^(bonus − 1)` once the bonus exceeds 1.
fn discount_from(bonus: f64) -> f64 {
    if bonus <= 1.0 {
        1.0
    } else {
        0.99f64.powf(bonus - 1.0)
    }
}
