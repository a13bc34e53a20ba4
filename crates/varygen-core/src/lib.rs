// Varygen - Business simulation core
// MIT License

pub mod business;
pub mod conflict;
pub mod contract;
pub mod data;
pub mod economy;
pub mod error;
pub mod events;
pub mod manager;
pub mod resources;
pub mod scenario;
pub mod simulation;
pub mod systems;

pub use simulation::SimulationApp;

// Re-export commonly used types
pub use business::{Account, Business, BusinessType, Resource};
pub use conflict::{Conflict, ConflictId, ConflictType, Resolution, ResolutionMethod};
pub use contract::{Contract, ContractId};
pub use error::EconomyError;
pub use events::*;
pub use manager::BusinessManager;
pub use resources::{EconomyConfig, GameTick, OutcomeCounters};
