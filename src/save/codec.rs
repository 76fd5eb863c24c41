use anyhow::{Context, Result};
use base64::{Engine as _, engine::general_purpose::STANDARD};

use super::{RestoreReport, SaveData, apply_save_data, save_data_from_simulation};
use crate::core::Simulation;

pub fn save_to_json_string(save_data: &SaveData) -> Result<String> {
    serde_json::to_string(save_data).context("failed to serialize save data to JSON")
}

pub fn save_to_pretty_json_string(save_data: &SaveData) -> Result<String> {
    serde_json::to_string_pretty(save_data).context("failed to serialize save data to JSON")
}

pub fn load_from_json_string(json: &str) -> Result<SaveData> {
    serde_json::from_str(json).context("failed to parse save JSON")
}

pub fn export_to_base64(save_data: &SaveData) -> Result<String> {
    let json = save_to_json_string(save_data)?;
    Ok(STANDARD.encode(json.as_bytes()))
}

/// Decodes an export string. Whitespace and line breaks from copy-paste are
/// ignored.
pub fn import_from_base64(encoded: &str) -> Result<SaveData> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let raw = STANDARD
        .decode(compact.as_bytes())
        .context("failed to decode base64 save payload")?;
    let json = String::from_utf8(raw).context("decoded base64 payload is not UTF-8")?;
    load_from_json_string(&json)
}

pub fn export_simulation(sim: &Simulation) -> Result<String> {
    export_to_base64(&save_data_from_simulation(sim))
}

pub fn import_simulation(sim: &mut Simulation, encoded: &str) -> Result<RestoreReport> {
    let save = import_from_base64(encoded)?;
    apply_save_data(sim, &save).context("failed to apply imported save")
}
