use bevy::prelude::*;

use crate::events::*;
use crate::manager::BusinessManager;

/// Settles queued contract requests in arrival order
pub fn contract_command_system(
    mut requests: EventReader<CreateContractEvent>,
    mut manager: ResMut<BusinessManager>,
    mut settled: EventWriter<ContractSettledEvent>,
    mut rejected: EventWriter<ContractRejectedEvent>,
) {
    for request in requests.read() {
        match manager.create_contract(
            &request.seller,
            &request.buyer,
            &request.resource,
            request.quantity,
            request.price,
        ) {
            Ok(contract) => {
                settled.send(ContractSettledEvent { contract });
            }
            Err(error) => {
                if error.is_defect() {
                    log::error!("Invalid contract request: {}", error);
                }
                rejected.send(ContractRejectedEvent {
                    order: request.clone(),
                    error,
                });
            }
        }
    }
}

pub fn conflict_command_system(
    mut requests: EventReader<CreateConflictEvent>,
    mut manager: ResMut<BusinessManager>,
    mut opened: EventWriter<ConflictOpenedEvent>,
) {
    for request in requests.read() {
        let parties: Vec<&str> = request.parties.iter().map(String::as_str).collect();
        match manager.create_conflict(request.conflict_type, &request.description, &parties) {
            Ok(conflict) => {
                opened.send(ConflictOpenedEvent { conflict });
            }
            Err(error) => log::error!("Invalid conflict request: {}", error),
        }
    }
}

pub fn resolve_command_system(
    mut requests: EventReader<ResolveConflictEvent>,
    mut manager: ResMut<BusinessManager>,
    mut resolved: EventWriter<ConflictResolvedEvent>,
    mut rejected: EventWriter<ResolutionRejectedEvent>,
) {
    for request in requests.read() {
        match manager.resolve_conflict_by(request.conflict, request.resolution, &request.mediator) {
            Ok(()) => {
                resolved.send(ConflictResolvedEvent {
                    conflict: request.conflict,
                    resolution: request.resolution,
                    mediator: request.mediator.clone(),
                });
            }
            Err(error) => {
                rejected.send(ResolutionRejectedEvent {
                    conflict: request.conflict,
                    error,
                });
            }
        }
    }
}

/// Tallies this frame's outcome events
pub fn record_outcomes_system(
    mut counters: ResMut<crate::resources::OutcomeCounters>,
    mut settled: EventReader<ContractSettledEvent>,
    mut contract_rejections: EventReader<ContractRejectedEvent>,
    mut opened: EventReader<ConflictOpenedEvent>,
    mut resolved: EventReader<ConflictResolvedEvent>,
    mut resolution_rejections: EventReader<ResolutionRejectedEvent>,
) {
    counters.contracts_settled += settled.read().count() as u64;
    counters.contracts_rejected += contract_rejections.read().count() as u64;
    counters.conflicts_opened += opened.read().count() as u64;
    counters.conflicts_resolved += resolved.read().count() as u64;
    counters.resolutions_rejected += resolution_rejections.read().count() as u64;
}
