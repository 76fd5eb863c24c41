mod prestige;
mod resource_store;
mod simulation;
mod tick;
mod upgrades;

pub use prestige::{PRESTIGE_THRESHOLD, PrestigePhase, prestige_exotic_particles};
pub use resource_store::{ResourceStore, TickDeltas};
pub use simulation::{GlobalMultipliers, PlacementError, Simulation};
pub use tick::fuel_heat;
pub use upgrades::{
    Bonus, RESEARCH_GRANT_UPGRADE, SUBSPACE_EXPANSION_UPGRADE, StatCategory, UpgradeDefinition,
    UpgradeManager,
};
