use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

use super::{ComponentTypesFile, UpgradeDataFile};
use crate::config::SimulationConfig;

pub fn load_component_types_from_path(path: impl AsRef<Path>) -> Result<ComponentTypesFile> {
    read_json(path.as_ref(), "component types")
}

pub fn parse_component_types(json: &str) -> Result<ComponentTypesFile> {
    serde_json::from_str(json).context("failed parsing component types JSON")
}

pub fn load_upgrade_data_from_path(path: impl AsRef<Path>) -> Result<UpgradeDataFile> {
    read_json(path.as_ref(), "upgrade data")
}

pub fn parse_upgrade_data(json: &str) -> Result<UpgradeDataFile> {
    serde_json::from_str(json).context("failed parsing upgrade data JSON")
}

pub fn load_config_from_path(path: impl AsRef<Path>) -> Result<SimulationConfig> {
    read_json(path.as_ref(), "simulation config")
}

fn read_json<T>(path: &Path, label: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed reading {label} file: {}", path.display()))?;

    serde_json::from_str(&raw)
        .with_context(|| format!("failed parsing {label} file as JSON: {}", path.display()))
}
