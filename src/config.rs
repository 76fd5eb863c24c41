use serde::{Deserialize, Serialize};

/// Host-tunable settings for a new simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Grid width before Subspace Expansion levels are added.
    pub base_width: usize,
    pub base_height: usize,
    pub layers: usize,
    pub replace_mode: bool,
    pub starting_money: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            base_width: 19,
            base_height: 16,
            layers: 1,
            replace_mode: true,
            starting_money: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SimulationConfig;

    #[test]
    fn partial_config_keeps_defaults() {
        let config: SimulationConfig =
            serde_json::from_str(r#"{"base_width": 12}"#).expect("config should parse");
        assert_eq!(config.base_width, 12);
        assert_eq!(config.base_height, 16);
        assert!(config.replace_mode);
    }
}
