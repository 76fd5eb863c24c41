//! Deterministic simulation core for a grid-based reactor idle game.
//!
//! [`Simulation`] owns the reactor grid, the placed components, the upgrade
//! ledger and the resource counters. Front-ends drive it with [`Simulation::tick`]
//! or [`Simulation::step`] and persist it through the [`save`] module.

pub mod config;
pub mod core;
pub mod data;
pub mod model;
pub mod save;

pub use crate::config::SimulationConfig;
pub use crate::core::{
    Bonus, GlobalMultipliers, PRESTIGE_THRESHOLD, PlacementError, PrestigePhase,
    RESEARCH_GRANT_UPGRADE, ResourceStore, SUBSPACE_EXPANSION_UPGRADE, Simulation, StatCategory,
    TickDeltas, UpgradeDefinition, UpgradeManager, fuel_heat, prestige_exotic_particles,
};
pub use crate::data::{
    ComponentCatalog, ComponentTypeDefinition, ComponentTypesFile, UpgradeDataFile,
    UpgradeRecord, load_component_types_from_path, load_config_from_path,
    load_upgrade_data_from_path, parse_component_types, parse_upgrade_data,
};
pub use crate::model::{
    ComponentCategory, ComponentKind, ComponentStats, ComponentType, FuelKind, GridCell,
    GridCoord, GridError, Mechanic, ReactorComponent, ReactorGrid,
};
pub use crate::save::{
    RestoreReport, SaveComponent, SaveData, SaveStore, apply_save_data, export_simulation,
    export_to_base64, import_from_base64, import_simulation, load_from_json_string,
    save_data_from_simulation, save_to_json_string,
};
