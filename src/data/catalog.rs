use std::collections::HashMap;
use std::sync::Arc;

use log::warn;

use super::{ComponentTypeDefinition, ComponentTypesFile};
use crate::model::{ComponentKind, ComponentStats, ComponentType, FuelKind, MAX_TIER, ShopSlot};

pub const SHOP_PAGE_POWER: u32 = 0;
pub const SHOP_PAGE_HEAT: u32 = 1;
pub const SHOP_PAGE_EXPERIMENTAL: u32 = 2;
pub const SHOP_PAGE_ARCANE: u32 = 3;
pub const SHOP_PAGE_COUNT: u32 = 4;

/// Ordered, name-indexed set of component types shared by every simulation
/// built from it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentCatalog {
    types: Vec<Arc<ComponentType>>,
    by_name: HashMap<String, usize>,
}

impl ComponentCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a type, keeping the first entry when a name repeats.
    pub fn insert(&mut self, component_type: ComponentType) -> Arc<ComponentType> {
        if let Some(&index) = self.by_name.get(&component_type.name) {
            warn!(
                "duplicate component type '{}' in catalog, keeping the first",
                component_type.name
            );
            return Arc::clone(&self.types[index]);
        }
        let handle = Arc::new(component_type);
        self.by_name.insert(handle.name.clone(), self.types.len());
        self.types.push(Arc::clone(&handle));
        handle
    }

    /// Builds a catalog from loader records, skipping records whose name does
    /// not identify a known component kind.
    pub fn from_definitions(file: &ComponentTypesFile) -> Self {
        let mut catalog = Self::new();
        for definition in &file.components {
            match component_type_from_definition(definition) {
                Some(component_type) => {
                    catalog.insert(component_type);
                }
                None => warn!(
                    "skipping unknown component type '{}'",
                    definition.canonical_name()
                ),
            }
        }
        catalog
    }

    /// Starter catalog covering every fuel in 1, 2 and 4 core variants and
    /// tiers 1-5 of each heat/power component, plus the two extreme parts.
    pub fn builtin() -> Self {
        let mut catalog = Self::new();

        for (position, fuel) in FuelKind::ALL.into_iter().enumerate() {
            let (energy_per_pulse, heat_per_pulse, max_durability) = fuel_profile(fuel);
            let base_cost = 10.0 * 50f64.powi(position as i32);
            for (cores, cost_factor) in [(1, 1.0), (2, 2.5), (4, 6.0)] {
                let stats = ComponentStats {
                    energy_per_pulse,
                    heat_per_pulse,
                    pulses_per_core: 1.0,
                    number_of_cores: cores,
                    max_durability,
                    ..ComponentStats::zero()
                };
                catalog.insert(builtin_type(
                    fuel.canonical_name(cores),
                    ComponentKind::Fuel(fuel),
                    stats,
                    base_cost * cost_factor,
                ));
            }
        }

        for tier in 1..MAX_TIER {
            for kind in [
                ComponentKind::Vent { tier },
                ComponentKind::Exchanger { tier },
                ComponentKind::Inlet { tier },
                ComponentKind::Outlet { tier },
                ComponentKind::Coolant { tier },
                ComponentKind::Plating { tier },
                ComponentKind::Reflector { tier },
                ComponentKind::Capacitor { tier },
            ] {
                catalog.insert(builtin_tiered(kind));
            }
        }
        catalog.insert(builtin_tiered(ComponentKind::Coolant { tier: MAX_TIER }));
        catalog.insert(builtin_tiered(ComponentKind::Capacitor { tier: MAX_TIER }));

        catalog
    }

    pub fn get(&self, name: &str) -> Option<&Arc<ComponentType>> {
        self.by_name.get(name).map(|&index| &self.types[index])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<ComponentType>> {
        self.types.iter()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

pub fn component_type_from_definition(
    definition: &ComponentTypeDefinition,
) -> Option<ComponentType> {
    let name = definition.canonical_name();
    let kind = ComponentKind::from_name(name)?;

    let (energy_per_pulse, heat_per_pulse, pulses_per_core, number_of_cores) = definition
        .cell_data
        .as_ref()
        .map(|cell| {
            (
                cell.energy_per_pulse,
                cell.heat_per_pulse,
                cell.pulses_per_core,
                cell.number_of_cores.max(1),
            )
        })
        .unwrap_or((0.0, 0.0, 0.0, 1));
    let (self_vent_rate, reactor_vent_rate) = definition
        .heat_data
        .as_ref()
        .map(|heat| (heat.self_vent_rate, heat.reactor_vent_rate))
        .unwrap_or((0.0, 0.0));
    let (reactor_heat_capacity_increase, reactor_power_capacity_increase) =
        definition.capacity_increases();

    let stats = ComponentStats {
        energy_per_pulse,
        heat_per_pulse,
        pulses_per_core,
        number_of_cores,
        max_durability: definition.max_durability.unwrap_or(0.0),
        heat_capacity: definition.heat_capacity.unwrap_or(0.0),
        self_vent_rate,
        reactor_vent_rate,
        reactor_heat_capacity_increase,
        reactor_power_capacity_increase,
        reflects_pulses: definition.reflects_pulses.unwrap_or(0.0),
    };

    let meta = &definition.meta;
    let required_upgrade = match meta.required_upgrade {
        Some(index) => usize::try_from(index).ok(),
        None => default_required_upgrade(kind),
    };

    Some(ComponentType {
        name: name.to_string(),
        display_name: definition.display_name().to_string(),
        description: definition.description.trim().to_string(),
        cost: definition.cost.max(0.0),
        kind,
        stats,
        component_type_id: kind.type_id(),
        tier: meta.tier.unwrap_or_else(|| kind.tier()),
        cant_lose_heat: meta
            .cant_lose_heat
            .unwrap_or_else(|| kind.default_cant_lose_heat()),
        required_upgrade,
        shop: shop_slot(kind, number_of_cores),
    })
}

/// Research upgrades that unlock the experimental parts in the shop.
fn default_required_upgrade(kind: ComponentKind) -> Option<usize> {
    match kind {
        ComponentKind::Fuel(FuelKind::Protium) => Some(33),
        ComponentKind::Fuel(FuelKind::Monastium) => Some(46),
        ComponentKind::Fuel(FuelKind::Kymium) => Some(47),
        ComponentKind::Fuel(FuelKind::Discurrium) => Some(48),
        ComponentKind::Fuel(FuelKind::Stavrium) => Some(49),
        ComponentKind::Capacitor { tier } if tier >= MAX_TIER => Some(41),
        ComponentKind::Coolant { tier } if tier >= MAX_TIER => Some(42),
        _ => None,
    }
}

fn shop_slot(kind: ComponentKind, cores: u32) -> ShopSlot {
    let tier_col = |tier: u8| u32::from(tier.clamp(1, 5) - 1);
    let (page, row, col) = match kind {
        ComponentKind::Fuel(fuel) => {
            let col = match cores {
                2 => 2,
                4 => 4,
                _ => 0,
            };
            if fuel.is_experimental() {
                (SHOP_PAGE_EXPERIMENTAL, fuel.element() - 7, col)
            } else {
                (SHOP_PAGE_POWER, fuel.element() - 1, col)
            }
        }
        ComponentKind::Capacitor { tier } if tier >= MAX_TIER => (SHOP_PAGE_EXPERIMENTAL, 7, 4),
        ComponentKind::Coolant { tier } if tier >= MAX_TIER => (SHOP_PAGE_EXPERIMENTAL, 7, 2),
        ComponentKind::Capacitor { tier } => (SHOP_PAGE_POWER, 7, tier_col(tier)),
        ComponentKind::Reflector { tier } => (SHOP_PAGE_POWER, 6, tier_col(tier)),
        ComponentKind::Vent { tier } => (SHOP_PAGE_HEAT, 0, tier_col(tier)),
        ComponentKind::Exchanger { tier } => (SHOP_PAGE_HEAT, 1, tier_col(tier)),
        ComponentKind::Inlet { tier } => (SHOP_PAGE_HEAT, 2, tier_col(tier)),
        ComponentKind::Outlet { tier } => (SHOP_PAGE_HEAT, 3, tier_col(tier)),
        ComponentKind::Coolant { tier } => (SHOP_PAGE_HEAT, 4, tier_col(tier)),
        ComponentKind::Plating { tier } => (SHOP_PAGE_HEAT, 5, tier_col(tier)),
        ComponentKind::Clock => (SHOP_PAGE_ARCANE, 6, 0),
    };
    ShopSlot {
        page,
        row,
        col,
        order: row * 10 + col,
    }
}

/// Energy per pulse, heat per pulse and lifetime of each fuel element.
fn fuel_profile(fuel: FuelKind) -> (f64, f64, f64) {
    match fuel {
        FuelKind::Uranium => (1.0, 1.0, 15.0),
        FuelKind::Plutonium => (1.5, 1.6, 60.0),
        FuelKind::Thorium => (2.2, 2.4, 120.0),
        FuelKind::Seaborgium => (3.5, 3.8, 300.0),
        FuelKind::Dolorium => (5.0, 5.5, 360.0),
        FuelKind::Nefastium => (8.0, 8.8, 420.0),
        FuelKind::Protium => (9.0, 9.0, 500.0),
        FuelKind::Monastium => (12.0, 10.0, 600.0),
        FuelKind::Kymium => (16.0, 16.0, 700.0),
        FuelKind::Discurrium => (24.0, 26.0, 800.0),
        FuelKind::Stavrium => (32.0, 34.0, 900.0),
    }
}

fn builtin_tiered(kind: ComponentKind) -> ComponentType {
    let tier = f64::from(kind.tier());
    let growth = 12f64.powi(i32::from(kind.tier()) - 1);
    let (stats, base_cost) = match kind {
        ComponentKind::Vent { .. } => (
            ComponentStats {
                heat_capacity: 80.0 * tier,
                self_vent_rate: 8.0 * tier,
                ..ComponentStats::zero()
            },
            50.0,
        ),
        ComponentKind::Exchanger { .. } => (
            ComponentStats {
                heat_capacity: 160.0 * tier,
                self_vent_rate: 16.0 * tier,
                ..ComponentStats::zero()
            },
            150.0,
        ),
        ComponentKind::Inlet { .. } | ComponentKind::Outlet { .. } => (
            ComponentStats {
                heat_capacity: 160.0 * tier,
                reactor_vent_rate: 16.0 * tier,
                ..ComponentStats::zero()
            },
            300.0,
        ),
        ComponentKind::Coolant { .. } => (
            ComponentStats {
                heat_capacity: 500.0 * tier,
                reactor_heat_capacity_increase: 120.0 * tier,
                ..ComponentStats::zero()
            },
            500.0,
        ),
        ComponentKind::Plating { .. } => (
            ComponentStats {
                reactor_heat_capacity_increase: 250.0 * tier,
                ..ComponentStats::zero()
            },
            200.0,
        ),
        ComponentKind::Reflector { .. } => (
            ComponentStats {
                max_durability: 100.0 * tier,
                reflects_pulses: 1.0,
                ..ComponentStats::zero()
            },
            200.0,
        ),
        ComponentKind::Capacitor { .. } => (
            ComponentStats {
                heat_capacity: 30.0 * tier,
                reactor_power_capacity_increase: 60.0 * tier,
                ..ComponentStats::zero()
            },
            100.0,
        ),
        ComponentKind::Fuel(_) | ComponentKind::Clock => (ComponentStats::zero(), 0.0),
    };
    builtin_type(kind.canonical_name(), kind, stats, base_cost * growth)
}

fn builtin_type(
    name: String,
    kind: ComponentKind,
    stats: ComponentStats,
    cost: f64,
) -> ComponentType {
    ComponentType {
        name,
        display_name: String::new(),
        description: String::new(),
        cost,
        kind,
        stats,
        component_type_id: kind.type_id(),
        tier: kind.tier(),
        cant_lose_heat: kind.default_cant_lose_heat(),
        required_upgrade: default_required_upgrade(kind),
        shop: shop_slot(kind, stats.number_of_cores),
    }
}

#[cfg(test)]
mod tests {
    use super::{ComponentCatalog, SHOP_PAGE_EXPERIMENTAL, SHOP_PAGE_HEAT, SHOP_PAGE_POWER};
    use crate::data::parse_component_types;
    use crate::model::{ComponentKind, FuelKind, Mechanic};

    #[test]
    fn builtin_catalog_indexes_by_name() {
        let catalog = ComponentCatalog::builtin();
        assert_eq!(catalog.len(), 11 * 3 + 5 * 8 + 2);

        let uranium = catalog.get("Fuel1-1").expect("uranium");
        assert_eq!(uranium.kind, ComponentKind::Fuel(FuelKind::Uranium));
        assert_eq!(uranium.pulses_produced(), 1);
        assert_eq!(uranium.shop.page, SHOP_PAGE_POWER);

        let quad = catalog.get("Fuel2-4").expect("quad plutonium");
        assert_eq!(quad.pulses_produced(), 4);
        assert_eq!(quad.cell_area(), 4);

        let extreme = catalog.get("Coolant6").expect("extreme coolant");
        assert_eq!(extreme.mechanic(), Mechanic::ExtremeCoolant);
        assert!(extreme.cant_lose_heat);
        assert_eq!(extreme.required_upgrade, Some(42));
        assert_eq!(extreme.shop.page, SHOP_PAGE_EXPERIMENTAL);

        assert_eq!(catalog.get("Vent3").expect("vent").shop.page, SHOP_PAGE_HEAT);
        assert_eq!(catalog.get("Fuel7-1").expect("protium").required_upgrade, Some(33));
        assert!(catalog.get("Vent6").is_none());
    }

    #[test]
    fn definitions_skip_unknown_names_and_keep_first_duplicate() {
        let file = parse_component_types(
            r#"{"components": [
                {"Name": "Uranium Cell", "Sprite": "Fuel1-2", "Cost": 25,
                 "CellData": {"EnergyPerPulse": 1, "HeatPerPulse": 1,
                              "PulsesPerCore": 1, "NumberOfCores": 2},
                 "MaxDurability": 15},
                {"Name": "GenericHeat", "Cost": 1},
                {"Name": "Reflector1", "Cost": 500, "MaxDurability": 100,
                 "ReflectsPulses": 1, "_meta": {"tier": 1}},
                {"Name": "Reflector1", "Cost": 9999}
            ]}"#,
        )
        .expect("catalog JSON should parse");

        let catalog = ComponentCatalog::from_definitions(&file);
        assert_eq!(catalog.len(), 2);

        let fuel = catalog.get("Fuel1-2").expect("fuel");
        assert_eq!(fuel.display_name, "Uranium Cell");
        assert_eq!(fuel.pulses_produced(), 2);
        assert_eq!(fuel.self_pulse_scale(), 2);
        assert_eq!(fuel.shop.col, 2);

        let reflector = catalog.get("Reflector1").expect("reflector");
        assert_eq!(reflector.cost, 500.0);
        assert!(reflector.reflects());
        assert!(reflector.cant_lose_heat);
    }
}
