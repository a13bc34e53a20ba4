use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::business::BusinessType;
use crate::conflict::{ConflictType, Resolution};
use crate::error::EconomyError;
use crate::manager::BusinessManager;

/// Starting state and scripted deals for a session, stored as RON
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scenario {
    pub businesses: Vec<BusinessSeed>,
    #[serde(default)]
    pub contracts: Vec<ContractOrder>,
    #[serde(default)]
    pub conflicts: Vec<ConflictSeed>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessSeed {
    pub name: String,
    pub business_type: BusinessType,
    pub owner: String,
    /// Overrides the configured starting money
    #[serde(default)]
    pub money: Option<f64>,
    #[serde(default)]
    pub resources: Vec<ResourceSeed>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceSeed {
    pub name: String,
    pub quantity: u32,
    pub unit_value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractOrder {
    pub seller: String,
    pub buyer: String,
    pub resource: String,
    pub quantity: u32,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictSeed {
    pub conflict_type: ConflictType,
    pub description: String,
    pub parties: Vec<String>,
    #[serde(default)]
    pub resolution: Option<ResolutionSeed>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionSeed {
    pub resolution: Resolution,
    /// Name of the business acting as mediator
    pub mediator: String,
}

/// What happened when a scenario was applied
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScenarioReport {
    pub businesses_created: usize,
    pub contracts_settled: usize,
    pub contracts_rejected: usize,
    pub conflicts_opened: usize,
    pub conflicts_resolved: usize,
    pub resolutions_rejected: usize,
}

impl Scenario {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let scenario: Scenario =
            ron::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;

        log::info!(
            "Loaded scenario {}: {} businesses, {} contracts, {} conflicts",
            path.display(),
            scenario.businesses.len(),
            scenario.contracts.len(),
            scenario.conflicts.len()
        );
        Ok(scenario)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let serialized = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?;
        fs::write(path.as_ref(), serialized)?;
        Ok(())
    }

    /// Two traders and one dispute, enough to exercise every manager command
    pub fn demo() -> Self {
        Self {
            businesses: vec![
                BusinessSeed {
                    name: "Acme Works".to_string(),
                    business_type: BusinessType::Manufacturing,
                    owner: "Rupok".to_string(),
                    money: None,
                    resources: vec![ResourceSeed {
                        name: "Widgets".to_string(),
                        quantity: 50,
                        unit_value: 10.0,
                    }],
                },
                BusinessSeed {
                    name: "Globex Market".to_string(),
                    business_type: BusinessType::Retail,
                    owner: "Shoron".to_string(),
                    money: None,
                    resources: Vec::new(),
                },
                BusinessSeed {
                    name: "Harbor Services".to_string(),
                    business_type: BusinessType::Services,
                    owner: "Rupok".to_string(),
                    money: Some(500.0),
                    resources: Vec::new(),
                },
            ],
            contracts: vec![ContractOrder {
                seller: "Acme Works".to_string(),
                buyer: "Globex Market".to_string(),
                resource: "Widgets".to_string(),
                quantity: 20,
                price: 300.0,
            }],
            conflicts: vec![ConflictSeed {
                conflict_type: ConflictType::ContractViolation,
                description: "Globex claims part of the widget shipment was damaged".to_string(),
                parties: vec!["Acme Works".to_string(), "Globex Market".to_string()],
                resolution: Some(ResolutionSeed {
                    resolution: Resolution::Mediation { fee: 150.0 },
                    mediator: "Harbor Services".to_string(),
                }),
            }],
        }
    }

    /// Seed `manager` with this scenario.
    ///
    /// Rejected contracts and resolutions are counted and logged; defects
    /// such as unknown business names abort with an error.
    pub fn apply(&self, manager: &mut BusinessManager) -> Result<ScenarioReport> {
        let mut report = ScenarioReport::default();

        for seed in &self.businesses {
            if let Some(money) = seed.money {
                crate::error::check_amount(money)
                    .with_context(|| format!("starting money for {}", seed.name))?;
            }
            let business = manager
                .create_business(&seed.name, seed.business_type, &seed.owner)
                .with_context(|| format!("creating business {}", seed.name))?;

            if let Some(money) = seed.money {
                let current = business.money();
                if money > current {
                    business.add_money(money - current);
                } else {
                    business.remove_money(current - money);
                }
            }
            for resource in &seed.resources {
                business.add_resource(&resource.name, resource.quantity, resource.unit_value);
            }
            report.businesses_created += 1;
        }

        for order in &self.contracts {
            match manager.create_contract(
                &order.seller,
                &order.buyer,
                &order.resource,
                order.quantity,
                order.price,
            ) {
                Ok(_) => report.contracts_settled += 1,
                Err(err) if err.is_defect() => {
                    return Err(err).with_context(|| {
                        format!("contract {} -> {}", order.seller, order.buyer)
                    });
                }
                Err(_) => report.contracts_rejected += 1,
            }
        }

        for seed in &self.conflicts {
            let parties: Vec<&str> = seed.parties.iter().map(String::as_str).collect();
            let id = manager
                .create_conflict(seed.conflict_type, &seed.description, &parties)
                .with_context(|| format!("opening conflict '{}'", seed.description))?;
            report.conflicts_opened += 1;

            let Some(resolution) = &seed.resolution else {
                continue;
            };
            match manager.resolve_conflict_by(id, resolution.resolution, &resolution.mediator) {
                Ok(()) => report.conflicts_resolved += 1,
                Err(err @ EconomyError::UnknownBusiness(_)) => {
                    return Err(err).context("resolving conflict");
                }
                Err(_) => report.resolutions_rejected += 1,
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_demo_scenario() {
        let mut manager = BusinessManager::default();
        let report = Scenario::demo().apply(&mut manager).unwrap();

        assert_eq!(
            report,
            ScenarioReport {
                businesses_created: 3,
                contracts_settled: 1,
                contracts_rejected: 0,
                conflicts_opened: 1,
                conflicts_resolved: 1,
                resolutions_rejected: 0,
            }
        );

        let acme = manager.business("Acme Works").unwrap();
        let globex = manager.business("Globex Market").unwrap();
        let harbor = manager.business("Harbor Services").unwrap();
        assert_eq!(acme.money(), 1300.0);
        assert_eq!(globex.money(), 700.0);
        assert_eq!(harbor.money(), 650.0);
        assert_eq!(globex.resource("Widgets").unwrap().unit_value, 15.0);
    }

    #[test]
    fn test_rejections_are_counted() {
        let mut scenario = Scenario::demo();
        scenario.contracts[0].price = 5000.0;
        if let Some(resolution) = scenario.conflicts[0].resolution.as_mut() {
            resolution.resolution = Resolution::Mediation { fee: 50.0 };
        }

        let mut manager = BusinessManager::default();
        let report = scenario.apply(&mut manager).unwrap();

        assert_eq!(report.contracts_rejected, 1);
        assert_eq!(report.resolutions_rejected, 1);
        assert_eq!(manager.open_conflicts().count(), 1);
    }

    #[test]
    fn test_unknown_party_aborts() {
        let mut scenario = Scenario::demo();
        scenario.contracts[0].buyer = "Nobody".to_string();

        let mut manager = BusinessManager::default();
        assert!(scenario.apply(&mut manager).is_err());
    }

    #[test]
    fn test_invalid_starting_money_creates_nothing() {
        let mut scenario = Scenario::demo();
        scenario.businesses[1].money = Some(-5.0);
        let first = scenario.businesses[0].name.clone();
        let rejected = scenario.businesses[1].name.clone();

        let mut manager = BusinessManager::default();
        assert!(scenario.apply(&mut manager).is_err());
        assert!(manager.business(&first).is_some());
        assert!(manager.business(&rejected).is_none());
        assert!(manager.contracts().is_empty());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_file = NamedTempFile::new().unwrap();
        Scenario::demo().save(temp_file.path()).unwrap();

        let loaded = Scenario::load(temp_file.path()).unwrap();
        assert_eq!(loaded.businesses.len(), 3);
        assert_eq!(loaded.conflicts[0].parties.len(), 2);
    }

    #[test]
    fn test_parse_handwritten_scenario() {
        let source = r#"(
            businesses: [
                (name: "Mill", business_type: Manufacturing, owner: "Rupok",
                 resources: [(name: "Flour", quantity: 10, unit_value: 2.0)]),
                (name: "Bakery", business_type: Retail, owner: "Shoron", money: Some(50.0)),
            ],
            contracts: [
                (seller: "Mill", buyer: "Bakery", resource: "Flour", quantity: 10, price: 40.0),
            ],
        )"#;
        let scenario: Scenario = ron::from_str(source).unwrap();

        let mut manager = BusinessManager::default();
        let report = scenario.apply(&mut manager).unwrap();

        assert_eq!(report.contracts_settled, 1);
        assert_eq!(manager.business("Bakery").unwrap().money(), 10.0);
        assert!(manager.business("Mill").unwrap().resource("Flour").is_none());
    }
}
