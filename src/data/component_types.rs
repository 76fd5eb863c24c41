use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentTypesFile {
    #[serde(rename = "_source", default)]
    pub source: String,
    #[serde(default)]
    pub components: Vec<ComponentTypeDefinition>,
}

/// One component record as supplied by the catalog loader.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentTypeDefinition {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Sprite")]
    pub sprite: String,
    #[serde(rename = "Cost")]
    pub cost: f64,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "CellData")]
    pub cell_data: Option<CellData>,
    #[serde(rename = "HeatData")]
    pub heat_data: Option<HeatData>,
    #[serde(rename = "MaxDurability")]
    pub max_durability: Option<f64>,
    #[serde(rename = "HeatCapacity")]
    pub heat_capacity: Option<f64>,
    #[serde(rename = "ReactorHeatCapacityIncrease")]
    pub reactor_heat_capacity_increase: Option<f64>,
    #[serde(rename = "ReactorPowerCapacityIncrease")]
    pub reactor_power_capacity_increase: Option<f64>,
    #[serde(rename = "ReflectsPulses")]
    pub reflects_pulses: Option<f64>,
    #[serde(rename = "_meta")]
    pub meta: ComponentMetadata,
}

impl ComponentTypeDefinition {
    /// The sprite name is the stable identifier (`Fuel7-2`, `Vent3`); the
    /// `Name` field is often a display string.
    pub fn canonical_name(&self) -> &str {
        let sprite = self.sprite.trim().trim_end_matches(".png");
        if sprite.is_empty() {
            self.name.trim()
        } else {
            sprite
        }
    }

    pub fn display_name(&self) -> &str {
        let name = self.name.trim();
        if name == self.canonical_name() { "" } else { name }
    }

    /// `(heat, power)` capacity increases. Capacitor and plating records store
    /// them in each other's field.
    pub fn capacity_increases(&self) -> (f64, f64) {
        let heat = self.reactor_heat_capacity_increase.unwrap_or(0.0);
        let power = self.reactor_power_capacity_increase.unwrap_or(0.0);
        let name = self.canonical_name();
        if name.starts_with("Capacitor") || name.starts_with("Plate") {
            (power, heat)
        } else {
            (heat, power)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellData {
    #[serde(rename = "EnergyPerPulse", default)]
    pub energy_per_pulse: f64,
    #[serde(rename = "HeatPerPulse", default)]
    pub heat_per_pulse: f64,
    #[serde(rename = "PulsesPerCore", default)]
    pub pulses_per_core: f64,
    #[serde(rename = "NumberOfCores", default)]
    pub number_of_cores: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatData {
    #[serde(rename = "SelfVentRate")]
    pub self_vent_rate: f64,
    #[serde(rename = "NeighborAffects")]
    pub neighbor_affects: bool,
    #[serde(rename = "ReactorVentRate")]
    pub reactor_vent_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentMetadata {
    pub type_of_component: String,
    pub tier: Option<u8>,
    pub cant_lose_heat: Option<bool>,
    pub required_upgrade: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::ComponentTypesFile;

    #[test]
    fn capacitor_and_plating_capacity_fields_are_swapped() {
        let file: ComponentTypesFile = serde_json::from_str(
            r#"{
                "components": [
                    {"Name": "Basic Capacitor", "Sprite": "Capacitor1", "Cost": 10,
                     "ReactorHeatCapacityIncrease": 100},
                    {"Name": "Plate1", "Cost": 10, "ReactorPowerCapacityIncrease": 250},
                    {"Name": "Coolant1", "Cost": 10, "ReactorHeatCapacityIncrease": 40}
                ]
            }"#,
        )
        .expect("records should parse");

        let capacitor = &file.components[0];
        assert_eq!(capacitor.canonical_name(), "Capacitor1");
        assert_eq!(capacitor.display_name(), "Basic Capacitor");
        assert_eq!(capacitor.capacity_increases(), (0.0, 100.0));
        assert_eq!(file.components[1].capacity_increases(), (250.0, 0.0));
        assert_eq!(file.components[2].capacity_increases(), (40.0, 0.0));
        assert_eq!(file.components[2].display_name(), "");
    }
}
