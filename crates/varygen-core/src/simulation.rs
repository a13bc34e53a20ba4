use crate::{events::*, resources::*, systems::*};
use crate::manager::BusinessManager;
use crate::scenario::{Scenario, ScenarioReport};
use bevy::prelude::*;

/// Main simulation app that runs headless
pub struct SimulationApp {
    app: App,
}

impl SimulationApp {
    pub fn new() -> Self {
        Self::with_config(EconomyConfig::default())
    }

    pub fn with_config(config: EconomyConfig) -> Self {
        let mut app = App::new();

        // Add minimal Bevy plugins for ECS
        app.add_plugins(MinimalPlugins);

        app.init_resource::<GameTick>()
            .init_resource::<OutcomeCounters>()
            .insert_resource(BusinessManager::new(config));

        // Commands
        app.add_event::<CreateContractEvent>()
            .add_event::<CreateConflictEvent>()
            .add_event::<ResolveConflictEvent>();

        // Outcomes
        app.add_event::<ContractSettledEvent>()
            .add_event::<ContractRejectedEvent>()
            .add_event::<ConflictOpenedEvent>()
            .add_event::<ConflictResolvedEvent>()
            .add_event::<ResolutionRejectedEvent>();

        app.add_systems(
            Update,
            (
                advance_tick_system,
                contract_command_system,
                conflict_command_system,
                resolve_command_system,
                economy_update_system,
                record_outcomes_system,
            )
                .chain(),
        );

        Self { app }
    }

    /// Seed businesses, contracts and conflicts from a scenario
    pub fn load_scenario(&mut self, scenario: &Scenario) -> anyhow::Result<ScenarioReport> {
        let report = scenario.apply(&mut self.manager_mut())?;
        log::info!("Scenario loaded: {:?}", report);
        Ok(report)
    }

    /// Run a single simulation tick
    pub fn tick(&mut self) {
        self.app.update();
    }

    /// Run simulation for specified number of ticks
    pub fn run_ticks(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.tick();
        }
    }

    /// Get current tick count
    pub fn current_tick(&self) -> u64 {
        self.app.world().resource::<GameTick>().current
    }

    pub fn manager(&self) -> &BusinessManager {
        self.app.world().resource::<BusinessManager>()
    }

    pub fn manager_mut(&mut self) -> Mut<BusinessManager> {
        self.app.world_mut().resource_mut::<BusinessManager>()
    }

    pub fn outcomes(&self) -> &OutcomeCounters {
        self.app.world().resource::<OutcomeCounters>()
    }

    /// Send an event to the simulation
    pub fn send_event<T: Event>(&mut self, event: T) {
        self.app.world_mut().send_event(event);
    }

    /// Get a mutable resource from the simulation
    pub fn get_resource_mut<T: Resource>(&mut self) -> Option<Mut<T>> {
        self.app.world_mut().get_resource_mut::<T>()
    }

    /// Calculate state hash for determinism verification.
    ///
    /// Ids and timestamps are random or wall-clock, so only balances,
    /// inventories and counts go in.
    pub fn calculate_state_hash(&self) -> u64 {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        self.current_tick().hash(&mut hasher);

        let manager = self.manager();
        for business in manager.businesses() {
            business.name().hash(&mut hasher);
            business.money().to_bits().hash(&mut hasher);
            for resource in business.resources() {
                resource.name.hash(&mut hasher);
                resource.quantity.hash(&mut hasher);
                resource.unit_value.to_bits().hash(&mut hasher);
            }
        }
        manager.contracts().len().hash(&mut hasher);
        manager.open_conflicts().count().hash(&mut hasher);

        hasher.finish()
    }
}

impl Default for SimulationApp {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::business::BusinessType;
    use crate::conflict::{ConflictType, Resolution};

    fn two_traders() -> SimulationApp {
        let mut sim = SimulationApp::new();
        {
            let mut manager = sim.manager_mut();
            manager
                .create_business("Acme", BusinessType::Manufacturing, "Rupok")
                .unwrap()
                .add_resource("Widgets", 50, 10.0);
            manager
                .create_business("Globex", BusinessType::Retail, "Shoron")
                .unwrap();
        }
        sim
    }

    #[test]
    fn test_simulation_creation() {
        let mut sim = SimulationApp::new();
        assert_eq!(sim.current_tick(), 0);

        sim.tick();
        assert_eq!(sim.current_tick(), 1);
    }

    #[test]
    fn test_contract_event_settles() {
        let mut sim = two_traders();
        sim.send_event(CreateContractEvent {
            seller: "Acme".to_string(),
            buyer: "Globex".to_string(),
            resource: "Widgets".to_string(),
            quantity: 20,
            price: 300.0,
        });
        sim.tick();

        let manager = sim.manager();
        assert_eq!(manager.business("Acme").unwrap().money(), 1300.0);
        assert_eq!(manager.business("Globex").unwrap().quantity_of("Widgets"), 20);
        assert_eq!(sim.outcomes().contracts_settled, 1);
    }

    #[test]
    fn test_rejected_contract_event_is_counted() {
        let mut sim = two_traders();
        sim.send_event(CreateContractEvent {
            seller: "Acme".to_string(),
            buyer: "Globex".to_string(),
            resource: "Widgets".to_string(),
            quantity: 20,
            price: 3000.0,
        });
        sim.tick();

        assert_eq!(sim.outcomes().contracts_rejected, 1);
        assert_eq!(sim.manager().business("Globex").unwrap().money(), 1000.0);
    }

    #[test]
    fn test_conflict_lifecycle_through_events() {
        let mut sim = two_traders();
        sim.send_event(CreateConflictEvent {
            conflict_type: ConflictType::ResourceCompetition,
            description: "Both want the quarry".to_string(),
            parties: vec!["Acme".to_string(), "Globex".to_string()],
        });
        sim.tick();

        let conflict = sim.manager().open_conflicts().next().unwrap().id();

        sim.send_event(ResolveConflictEvent {
            conflict,
            resolution: Resolution::Mediation { fee: 20.0 },
            mediator: "Acme".to_string(),
        });
        sim.tick();
        assert_eq!(sim.outcomes().resolutions_rejected, 1);
        assert!(!sim.manager().conflict(conflict).unwrap().is_resolved());

        sim.send_event(ResolveConflictEvent {
            conflict,
            resolution: Resolution::Mediation { fee: 200.0 },
            mediator: "Acme".to_string(),
        });
        sim.tick();

        let outcomes = sim.outcomes();
        assert_eq!(outcomes.conflicts_opened, 1);
        assert_eq!(outcomes.conflicts_resolved, 1);
        assert!(sim.manager().conflict(conflict).unwrap().is_resolved());
        assert_eq!(sim.manager().business("Acme").unwrap().money(), 1200.0);
    }

    #[test]
    fn test_load_demo_scenario() {
        let mut sim = SimulationApp::new();
        let report = sim.load_scenario(&Scenario::demo()).unwrap();
        assert_eq!(report.contracts_settled, 1);

        sim.run_ticks(10);
        assert_eq!(sim.current_tick(), 10);
        assert_eq!(sim.manager().businesses().count(), 3);
    }

    #[test]
    fn test_deterministic_simulation() {
        let mut sim1 = SimulationApp::new();
        let mut sim2 = SimulationApp::new();

        sim1.load_scenario(&Scenario::demo()).unwrap();
        sim2.load_scenario(&Scenario::demo()).unwrap();

        sim1.run_ticks(100);
        sim2.run_ticks(100);

        assert_eq!(sim1.calculate_state_hash(), sim2.calculate_state_hash());
    }
}
