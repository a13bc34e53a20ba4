use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::conflict::{ConflictId, ConflictType, Resolution};
use crate::contract::ContractId;
use crate::error::EconomyError;

/// Request to sell a resource from one business to another
#[derive(Event, Debug, Clone, Serialize, Deserialize)]
pub struct CreateContractEvent {
    pub seller: String,
    pub buyer: String,
    pub resource: String,
    pub quantity: u32,
    pub price: f64,
}

/// Request to open a dispute between businesses
#[derive(Event, Debug, Clone, Serialize, Deserialize)]
pub struct CreateConflictEvent {
    pub conflict_type: ConflictType,
    pub description: String,
    pub parties: Vec<String>,
}

/// Request to close a dispute; `mediator` names the business doing it
#[derive(Event, Debug, Clone, Serialize, Deserialize)]
pub struct ResolveConflictEvent {
    pub conflict: ConflictId,
    pub resolution: Resolution,
    pub mediator: String,
}

#[derive(Event, Debug, Clone)]
pub struct ContractSettledEvent {
    pub contract: ContractId,
}

#[derive(Event, Debug, Clone)]
pub struct ContractRejectedEvent {
    pub order: CreateContractEvent,
    pub error: EconomyError,
}

#[derive(Event, Debug, Clone)]
pub struct ConflictOpenedEvent {
    pub conflict: ConflictId,
}

#[derive(Event, Debug, Clone)]
pub struct ConflictResolvedEvent {
    pub conflict: ConflictId,
    pub resolution: Resolution,
    pub mediator: String,
}

#[derive(Event, Debug, Clone)]
pub struct ResolutionRejectedEvent {
    pub conflict: ConflictId,
    pub error: EconomyError,
}
