use crate::business::Business;
use crate::conflict::{Conflict, ConflictId};
use crate::contract::{Contract, ContractId};
use crate::manager::BusinessManager;
use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

const MONEY_EPSILON: f64 = 1e-6;

/// Aggregate view of the economy at one point in time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EconomySnapshot {
    pub total_money: f64,
    pub units: BTreeMap<String, u64>,
    pub businesses: usize,
    pub contracts: usize,
    pub open_conflicts: usize,
    pub resolved_conflicts: usize,
}

impl EconomySnapshot {
    pub fn capture(manager: &BusinessManager) -> Self {
        let mut units: BTreeMap<String, u64> = BTreeMap::new();
        for resource in manager.businesses().flat_map(|b| b.resources()) {
            *units.entry(resource.name.clone()).or_insert(0) += resource.quantity as u64;
        }

        let open_conflicts = manager.open_conflicts().count();

        Self {
            total_money: manager.businesses().map(|b| b.money()).sum(),
            units,
            businesses: manager.businesses().count(),
            contracts: manager.contracts().len(),
            open_conflicts,
            resolved_conflicts: manager.conflicts().len() - open_conflicts,
        }
    }

    /// True when no money and no resource units were created or destroyed
    /// between the two snapshots.
    pub fn conserves(&self, other: &EconomySnapshot) -> bool {
        (self.total_money - other.total_money).abs() < MONEY_EPSILON && self.units == other.units
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InvariantViolation {
    NegativeMoney { business: String, money: f64 },
    EmptyResourceLine { business: String, resource: String },
    ResolutionTimestampMismatch(ConflictId),
    UnfulfilledContract(ContractId),
    ContractNotListed { contract: ContractId, business: String },
    ConflictNotListed { conflict: ConflictId, business: String },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvariantViolation::NegativeMoney { business, money } => {
                write!(f, "{business} has negative balance ${money:.2}")
            }
            InvariantViolation::EmptyResourceLine { business, resource } => {
                write!(f, "{business} keeps an empty {resource} line")
            }
            InvariantViolation::ResolutionTimestampMismatch(id) => {
                write!(f, "conflict {id} resolution flag and timestamp disagree")
            }
            InvariantViolation::UnfulfilledContract(id) => {
                write!(f, "contract {id} was recorded but never fulfilled")
            }
            InvariantViolation::ContractNotListed { contract, business } => {
                write!(f, "contract {contract} missing from {business}")
            }
            InvariantViolation::ConflictNotListed { conflict, business } => {
                write!(f, "conflict {conflict} missing from {business}")
            }
        }
    }
}

/// Check the cross-entity invariants the manager is meant to uphold
pub fn audit(manager: &BusinessManager) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();

    for business in manager.businesses() {
        if business.money() < 0.0 {
            violations.push(InvariantViolation::NegativeMoney {
                business: business.name().to_string(),
                money: business.money(),
            });
        }
        for resource in business.resources().filter(|r| r.quantity == 0) {
            violations.push(InvariantViolation::EmptyResourceLine {
                business: business.name().to_string(),
                resource: resource.name.clone(),
            });
        }
    }

    for contract in manager.contracts() {
        if !contract.is_fulfilled() {
            violations.push(InvariantViolation::UnfulfilledContract(contract.id()));
        }
        for party in [contract.seller(), contract.buyer()] {
            if !lists_contract(manager.business(party), contract) {
                violations.push(InvariantViolation::ContractNotListed {
                    contract: contract.id(),
                    business: party.to_string(),
                });
            }
        }
    }

    for conflict in manager.conflicts() {
        if conflict.is_resolved() != conflict.resolved_at().is_some() {
            violations.push(InvariantViolation::ResolutionTimestampMismatch(conflict.id()));
        }
        for party in conflict.parties() {
            if !lists_conflict(manager.business(party), conflict) {
                violations.push(InvariantViolation::ConflictNotListed {
                    conflict: conflict.id(),
                    business: party.clone(),
                });
            }
        }
    }

    violations
}

fn lists_contract(business: Option<&Business>, contract: &Contract) -> bool {
    business.is_some_and(|b| b.contract_ids().contains(&contract.id()))
}

fn lists_conflict(business: Option<&Business>, conflict: &Conflict) -> bool {
    business.is_some_and(|b| b.conflict_ids().contains(&conflict.id()))
}

/// Full read-only dump of a session, for tooling and debugging
#[derive(Debug, Serialize)]
pub struct StateReport<'a> {
    pub snapshot: EconomySnapshot,
    pub businesses: Vec<&'a Business>,
    pub contracts: &'a [Contract],
    pub conflicts: &'a [Conflict],
}

impl<'a> StateReport<'a> {
    pub fn new(manager: &'a BusinessManager) -> Self {
        Self {
            snapshot: EconomySnapshot::capture(manager),
            businesses: manager.businesses().collect(),
            contracts: manager.contracts(),
            conflicts: manager.conflicts(),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::business::BusinessType;
    use crate::conflict::{ConflictType, Resolution};

    fn traded_market() -> BusinessManager {
        let mut manager = BusinessManager::default();
        manager
            .create_business("Acme", BusinessType::Manufacturing, "Rupok")
            .unwrap()
            .add_resource("Widgets", 50, 10.0);
        manager
            .create_business("Globex", BusinessType::Retail, "Shoron")
            .unwrap();
        manager
    }

    #[test]
    fn test_snapshot_totals() {
        let manager = traded_market();
        let snapshot = EconomySnapshot::capture(&manager);

        assert_eq!(snapshot.total_money, 2000.0);
        assert_eq!(snapshot.units.get("Widgets"), Some(&50));
        assert_eq!(snapshot.businesses, 2);
        assert_eq!(snapshot.contracts, 0);
    }

    #[test]
    fn test_contract_conserves_money_and_units() {
        let mut manager = traded_market();
        let before = EconomySnapshot::capture(&manager);

        manager
            .create_contract("Acme", "Globex", "Widgets", 20, 300.0)
            .unwrap();
        manager
            .create_contract("Globex", "Acme", "Widgets", 5, 90.0)
            .unwrap();

        let after = EconomySnapshot::capture(&manager);
        assert!(before.conserves(&after));
        assert_eq!(after.contracts, 2);
    }

    #[test]
    fn test_conserves_detects_minted_money() {
        let mut manager = traded_market();
        let before = EconomySnapshot::capture(&manager);

        manager.business_mut("Acme").unwrap().add_money(1.0);

        assert!(!before.conserves(&EconomySnapshot::capture(&manager)));
    }

    #[test]
    fn test_audit_clean_after_activity() {
        let mut manager = traded_market();
        manager
            .create_contract("Acme", "Globex", "Widgets", 50, 600.0)
            .unwrap();
        let id = manager
            .create_conflict(ConflictType::ContractViolation, "Short", &["Acme", "Globex"])
            .unwrap();
        manager
            .resolve_conflict_by(id, Resolution::Negotiation, "Globex")
            .unwrap();

        assert!(audit(&manager).is_empty());

        let snapshot = EconomySnapshot::capture(&manager);
        assert_eq!(snapshot.open_conflicts, 0);
        assert_eq!(snapshot.resolved_conflicts, 1);
    }

    #[test]
    fn test_state_report_serializes() {
        let mut manager = traded_market();
        manager
            .create_contract("Acme", "Globex", "Widgets", 10, 100.0)
            .unwrap();

        let json = StateReport::new(&manager).to_json_pretty().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["businesses"].as_array().unwrap().len(), 2);
        assert_eq!(value["contracts"][0]["quantity"], 10);
        assert_eq!(value["snapshot"]["total_money"], 2000.0);
    }

    #[test]
    fn test_violation_display() {
        let violation = InvariantViolation::NegativeMoney {
            business: "Acme".to_string(),
            money: -5.0,
        };
        assert_eq!(violation.to_string(), "Acme has negative balance $-5.00");
    }
}
