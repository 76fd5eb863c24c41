use std::sync::Arc;

use super::grid::GridCoord;

/// Component type id used by upgrade bonuses that target the reactor itself.
pub const REACTOR_TYPE_ID: u32 = 1;

/// Highest tier a tiered component can have.
pub const MAX_TIER: u8 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FuelKind {
    Uranium,
    Plutonium,
    Thorium,
    Seaborgium,
    Dolorium,
    Nefastium,
    Protium,
    Monastium,
    Kymium,
    Discurrium,
    Stavrium,
}

impl FuelKind {
    pub const ALL: [FuelKind; 11] = [
        Self::Uranium,
        Self::Plutonium,
        Self::Thorium,
        Self::Seaborgium,
        Self::Dolorium,
        Self::Nefastium,
        Self::Protium,
        Self::Monastium,
        Self::Kymium,
        Self::Discurrium,
        Self::Stavrium,
    ];

    /// 1-based element number as it appears in names (`Fuel7-1` is Protium).
    pub fn element(self) -> u32 {
        match self {
            Self::Uranium => 1,
            Self::Plutonium => 2,
            Self::Thorium => 3,
            Self::Seaborgium => 4,
            Self::Dolorium => 5,
            Self::Nefastium => 6,
            Self::Protium => 7,
            Self::Monastium => 8,
            Self::Kymium => 9,
            Self::Discurrium => 10,
            Self::Stavrium => 11,
        }
    }

    pub fn from_element(element: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|fuel| fuel.element() == element)
    }

    /// Elements 1-6 map to ids 2-7, the experimental elements 7-11 to 16-20.
    pub fn type_id(self) -> u32 {
        match self.element() {
            element @ 1..=6 => element + 1,
            element => element + 9,
        }
    }

    pub fn is_experimental(self) -> bool {
        self.element() > 6
    }

    pub fn canonical_name(self, cores: u32) -> String {
        format!("Fuel{}-{}", self.element(), cores)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let rest = name.strip_prefix("Fuel")?;
        let element = rest.split('-').next()?.parse::<u32>().ok()?;
        Self::from_element(element)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentCategory {
    Fuel,
    Vent,
    Coolant,
    Capacitor,
    Reflector,
    Plating,
    Inlet,
    Outlet,
    Exchanger,
    Clock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Fuel(FuelKind),
    Vent { tier: u8 },
    Coolant { tier: u8 },
    Capacitor { tier: u8 },
    Reflector { tier: u8 },
    Plating { tier: u8 },
    Inlet { tier: u8 },
    Outlet { tier: u8 },
    Exchanger { tier: u8 },
    Clock,
}

/// Per-tick special behaviour attached to a component kind. The tick stages
/// match on this instead of comparing numeric type ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mechanic {
    Standard,
    /// Each depleted Protium cell permanently adds 1% power to the others.
    Protium,
    /// Power drops 2% per occupied cell in the surrounding 7x7 square.
    Monastium,
    /// Power and heat pulse with the cosine of remaining durability.
    Kymium,
    /// Pulses reach the whole row and column instead of the four neighbors.
    Stavrium,
    Exchanger,
    Inlet,
    Outlet,
    /// Thermally isolated coolant that draws heat from radius two.
    ExtremeCoolant,
    /// Capacitor that heats up in proportion to auto-sold power.
    ExtremeCapacitor,
}

impl ComponentKind {
    pub fn category(self) -> ComponentCategory {
        match self {
            Self::Fuel(_) => ComponentCategory::Fuel,
            Self::Vent { .. } => ComponentCategory::Vent,
            Self::Coolant { .. } => ComponentCategory::Coolant,
            Self::Capacitor { .. } => ComponentCategory::Capacitor,
            Self::Reflector { .. } => ComponentCategory::Reflector,
            Self::Plating { .. } => ComponentCategory::Plating,
            Self::Inlet { .. } => ComponentCategory::Inlet,
            Self::Outlet { .. } => ComponentCategory::Outlet,
            Self::Exchanger { .. } => ComponentCategory::Exchanger,
            Self::Clock => ComponentCategory::Clock,
        }
    }

    /// Tier of a tiered component; fuels and the clock carry none.
    pub fn tier(self) -> u8 {
        match self {
            Self::Vent { tier }
            | Self::Coolant { tier }
            | Self::Capacitor { tier }
            | Self::Reflector { tier }
            | Self::Plating { tier }
            | Self::Inlet { tier }
            | Self::Outlet { tier }
            | Self::Exchanger { tier } => tier,
            Self::Fuel(_) | Self::Clock => 0,
        }
    }

    pub fn type_id(self) -> u32 {
        match self {
            Self::Fuel(fuel) => fuel.type_id(),
            Self::Vent { .. } => 8,
            Self::Exchanger { .. } => 9,
            Self::Coolant { .. } => 10,
            Self::Reflector { .. } => 11,
            Self::Plating { .. } => 12,
            Self::Capacitor { .. } => 13,
            Self::Inlet { .. } => 14,
            Self::Outlet { .. } => 15,
            Self::Clock => 0,
        }
    }

    pub fn mechanic(self) -> Mechanic {
        match self {
            Self::Fuel(FuelKind::Protium) => Mechanic::Protium,
            Self::Fuel(FuelKind::Monastium) => Mechanic::Monastium,
            Self::Fuel(FuelKind::Kymium) => Mechanic::Kymium,
            Self::Fuel(FuelKind::Stavrium) => Mechanic::Stavrium,
            Self::Exchanger { .. } => Mechanic::Exchanger,
            Self::Inlet { .. } => Mechanic::Inlet,
            Self::Outlet { .. } => Mechanic::Outlet,
            Self::Coolant { tier } if tier >= MAX_TIER => Mechanic::ExtremeCoolant,
            Self::Capacitor { tier } if tier >= MAX_TIER => Mechanic::ExtremeCapacitor,
            _ => Mechanic::Standard,
        }
    }

    /// Reflectors and the extreme coolant never give up their heat.
    pub fn default_cant_lose_heat(self) -> bool {
        matches!(self, Self::Reflector { .. }) || self.mechanic() == Mechanic::ExtremeCoolant
    }

    pub fn canonical_name(self) -> String {
        match self {
            Self::Fuel(fuel) => fuel.canonical_name(1),
            Self::Vent { tier } => format!("Vent{tier}"),
            Self::Coolant { tier } => format!("Coolant{tier}"),
            Self::Capacitor { tier } => format!("Capacitor{tier}"),
            Self::Reflector { tier } => format!("Reflector{tier}"),
            Self::Plating { tier } => format!("Plate{tier}"),
            Self::Inlet { tier } => format!("Inlet{tier}"),
            Self::Outlet { tier } => format!("Outlet{tier}"),
            Self::Exchanger { tier } => format!("Exchanger{tier}"),
            Self::Clock => "Clock".to_string(),
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let trimmed = name.trim().trim_end_matches(".png");
        if trimmed.is_empty() {
            return None;
        }

        if let Some(fuel_kind) = FuelKind::from_name(trimmed) {
            return Some(Self::Fuel(fuel_kind));
        }

        parse_tier_component(trimmed, "Vent", |tier| Self::Vent { tier })
            .or_else(|| parse_tier_component(trimmed, "Coolant", |tier| Self::Coolant { tier }))
            .or_else(|| parse_tier_component(trimmed, "Capacitor", |tier| Self::Capacitor { tier }))
            .or_else(|| parse_tier_component(trimmed, "Reflector", |tier| Self::Reflector { tier }))
            .or_else(|| parse_tier_component(trimmed, "Plating", |tier| Self::Plating { tier }))
            .or_else(|| parse_tier_component(trimmed, "Plate", |tier| Self::Plating { tier }))
            .or_else(|| parse_tier_component(trimmed, "Inlet", |tier| Self::Inlet { tier }))
            .or_else(|| parse_tier_component(trimmed, "Outlet", |tier| Self::Outlet { tier }))
            .or_else(|| parse_tier_component(trimmed, "Exchanger", |tier| Self::Exchanger { tier }))
            .or_else(|| (trimmed == "Clock").then_some(Self::Clock))
    }
}

fn parse_tier_component(
    value: &str,
    prefix: &str,
    builder: impl FnOnce(u8) -> ComponentKind,
) -> Option<ComponentKind> {
    let tier = value.strip_prefix(prefix)?.parse::<u8>().ok()?;
    (1..=MAX_TIER).contains(&tier).then(|| builder(tier))
}

/// Base stats of a component type before upgrade bonuses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComponentStats {
    pub energy_per_pulse: f64,
    pub heat_per_pulse: f64,
    pub pulses_per_core: f64,
    pub number_of_cores: u32,
    pub max_durability: f64,
    pub heat_capacity: f64,
    /// Vent rate for vents; adjacent transfer rate for exchangers.
    pub self_vent_rate: f64,
    /// Hull transfer rate for inlets and outlets.
    pub reactor_vent_rate: f64,
    pub reactor_heat_capacity_increase: f64,
    pub reactor_power_capacity_increase: f64,
    pub reflects_pulses: f64,
}

impl ComponentStats {
    pub const fn zero() -> Self {
        Self {
            energy_per_pulse: 0.0,
            heat_per_pulse: 0.0,
            pulses_per_core: 0.0,
            number_of_cores: 1,
            max_durability: 0.0,
            heat_capacity: 0.0,
            self_vent_rate: 0.0,
            reactor_vent_rate: 0.0,
            reactor_heat_capacity_increase: 0.0,
            reactor_power_capacity_increase: 0.0,
            reflects_pulses: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShopSlot {
    pub page: u32,
    pub row: u32,
    pub col: u32,
    pub order: u32,
}

/// Immutable catalog entry shared by every placed instance of the type.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentType {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub cost: f64,
    pub kind: ComponentKind,
    pub stats: ComponentStats,
    pub component_type_id: u32,
    pub tier: u8,
    pub cant_lose_heat: bool,
    pub required_upgrade: Option<usize>,
    pub shop: ShopSlot,
}

impl ComponentType {
    pub fn mechanic(&self) -> Mechanic {
        self.kind.mechanic()
    }

    pub fn category(&self) -> ComponentCategory {
        self.kind.category()
    }

    pub fn pulses_produced(&self) -> u32 {
        let pulses = self.stats.pulses_per_core * f64::from(self.stats.number_of_cores);
        pulses.max(0.0) as u32
    }

    pub fn is_fuel(&self) -> bool {
        self.pulses_produced() > 0
    }

    pub fn reflects(&self) -> bool {
        self.stats.reflects_pulses > 0.0
    }

    pub fn absorbs_heat(&self) -> bool {
        self.stats.heat_capacity > 0.0
    }

    /// Footprint: one core is 1x1, two cores 2x1, four cores 2x2.
    pub fn cell_size(&self) -> (u32, u32) {
        let cores = self.stats.number_of_cores;
        let width = if cores <= 1 { 1 } else { 2 };
        let height = if cores <= 2 { 1 } else { 2 };
        (width, height)
    }

    pub fn cell_area(&self) -> u32 {
        let (width, height) = self.cell_size();
        width * height
    }

    /// `floor(log2(cores) + 1)`: how many times a cell counts its own pulses.
    pub fn self_pulse_scale(&self) -> u32 {
        let cores = self.stats.number_of_cores.max(1);
        cores.ilog2() + 1
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReactorComponent {
    pub id: u64,
    pub component_type: Arc<ComponentType>,
    pub coord: GridCoord,
    pub placed_at_tick: u64,
    pub heat: f64,
    pub durability: f64,
    pub last_power: f64,
    pub last_heat: f64,
    pub pulse_count: u32,
    pub depleted: bool,
}

impl ReactorComponent {
    pub fn new(component_type: Arc<ComponentType>, coord: GridCoord) -> Self {
        Self::new_with_metadata(component_type, coord, 0, 0)
    }

    pub fn new_with_metadata(
        component_type: Arc<ComponentType>,
        coord: GridCoord,
        id: u64,
        placed_at_tick: u64,
    ) -> Self {
        let durability = component_type.stats.max_durability;
        Self {
            id,
            component_type,
            coord,
            placed_at_tick,
            heat: 0.0,
            durability,
            last_power: 0.0,
            last_heat: 0.0,
            pulse_count: 0,
            depleted: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.component_type.name
    }

    pub fn stats(&self) -> &ComponentStats {
        &self.component_type.stats
    }

    pub fn mechanic(&self) -> Mechanic {
        self.component_type.mechanic()
    }

    pub fn is_fuel(&self) -> bool {
        self.component_type.is_fuel()
    }

    /// Whether clicking `replacement` onto this component swaps it out.
    pub fn can_be_replaced_by(&self, replacement: &ComponentType) -> bool {
        if self.component_type.name == replacement.name && !self.depleted {
            return false;
        }
        if self.is_fuel() && replacement.is_fuel() {
            return true;
        }
        self.component_type.category() == replacement.category()
    }

    /// Refund on sale: cost scaled by the square of remaining heat headroom and
    /// the square of remaining durability. Fuel cells are worth nothing.
    pub fn sell_value(&self) -> f64 {
        if self.is_fuel() {
            return 0.0;
        }
        let stats = self.stats();
        let mut value = self.component_type.cost;
        if stats.heat_capacity > 0.0 {
            let headroom = 1.0 - (self.heat / stats.heat_capacity).min(1.0);
            value *= headroom * headroom;
        }
        if stats.max_durability > 0.0 {
            let remaining = (self.durability / stats.max_durability).max(0.0);
            value *= remaining * remaining;
        }
        value
    }
}
