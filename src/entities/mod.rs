//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables. Each entity has a Model struct
//! for data and an Entity struct for operations.

pub mod frk_movement;
pub mod godown;
pub mod paddy_entry;
pub mod rice_entry;

// Re-export specific types to avoid conflicts
pub use frk_movement::{
    Column as FrkMovementColumn, Entity as FrkMovement, Model as FrkMovementModel,
};
pub use godown::{Column as GodownColumn, Entity as Godown, GodownKind, Model as GodownModel};
pub use paddy_entry::{
    Column as PaddyEntryColumn, Entity as PaddyEntry, Grade, Model as PaddyEntryModel,
};
pub use rice_entry::{
    Column as RiceEntryColumn, Entity as RiceEntry, Model as RiceEntryModel, Variety,
};
