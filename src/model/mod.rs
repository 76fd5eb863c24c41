mod component;
mod grid;

pub use component::{
    ComponentCategory, ComponentKind, ComponentStats, ComponentType, FuelKind, MAX_TIER, Mechanic,
    REACTOR_TYPE_ID, ReactorComponent, ShopSlot,
};
pub use grid::{GridCell, GridCoord, GridError, ReactorGrid};
