use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpgradeDataFile {
    #[serde(default)]
    pub upgrades: Vec<UpgradeRecord>,
}

/// One upgrade as supplied by the upgrade loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeRecord {
    pub index: u32,
    pub name: String,
    #[serde(default)]
    pub level_names: Vec<String>,
    #[serde(default)]
    pub description: String,
    pub base_cost: f64,
    /// Zero marks a one-time purchase.
    #[serde(default)]
    pub cost_multiplier: f64,
    #[serde(default = "default_purchasable")]
    pub purchasable: bool,
    #[serde(default)]
    pub is_prestige: bool,
    /// Index of the upgrade that must be owned first, `-1` for none.
    #[serde(default = "default_prerequisite")]
    pub prerequisite: i32,
    #[serde(default)]
    pub bonuses: Vec<UpgradeBonus>,
    #[serde(default)]
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeBonus {
    pub component_type: i32,
    pub stat_category: i32,
    #[serde(default)]
    pub additive: f64,
    #[serde(default = "default_multiplicative")]
    pub multiplicative: f64,
}

const fn default_multiplicative() -> f64 {
    1.0
}

const fn default_purchasable() -> bool {
    true
}

const fn default_prerequisite() -> i32 {
    -1
}

#[cfg(test)]
mod tests {
    use super::UpgradeDataFile;

    #[test]
    fn missing_fields_take_loader_defaults() {
        let file: UpgradeDataFile = serde_json::from_str(
            r#"{"upgrades": [{"index": 0, "name": "Grant", "base_cost": 100,
                "bonuses": [{"component_type": 1, "stat_category": 19, "additive": 1}]}]}"#,
        )
        .expect("upgrade data should parse");

        let record = &file.upgrades[0];
        assert_eq!(record.cost_multiplier, 0.0);
        assert!(record.purchasable);
        assert!(!record.is_prestige);
        assert_eq!(record.prerequisite, -1);
        assert_eq!(record.bonuses[0].multiplicative, 1.0);
    }
}
