use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::conflict::ConflictId;
use crate::contract::ContractId;

/// Kinds of business a player can operate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BusinessType {
    Retail,
    Technology,
    Manufacturing,
    Services,
    Finance,
}

impl fmt::Display for BusinessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BusinessType::Retail => "Retail",
            BusinessType::Technology => "Technology",
            BusinessType::Manufacturing => "Manufacturing",
            BusinessType::Services => "Services",
            BusinessType::Finance => "Finance",
        };
        f.write_str(label)
    }
}

/// A named inventory line held by a single business
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub name: String,
    pub quantity: u32,
    pub unit_value: f64,
}

impl Resource {
    pub fn new(name: impl Into<String>, quantity: u32, unit_value: f64) -> Self {
        Self {
            name: name.into(),
            quantity,
            unit_value,
        }
    }

    pub fn total_value(&self) -> f64 {
        self.quantity as f64 * self.unit_value
    }
}

/// Anything that can hold and be paid money.
///
/// Mediation fees go to whoever resolved the conflict, which is not
/// necessarily a business known to the manager.
pub trait Account {
    fn name(&self) -> &str;
    fn money(&self) -> f64;
    fn add_money(&mut self, amount: f64);
    fn remove_money(&mut self, amount: f64) -> bool;
}

/// An economic actor with cash, inventory and the deals it takes part in.
///
/// Contracts and conflicts are owned by the manager; a business only keeps
/// their ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Business {
    name: String,
    business_type: BusinessType,
    owner: String,
    money: f64,
    resources: BTreeMap<String, Resource>,
    contracts: Vec<ContractId>,
    conflicts: Vec<ConflictId>,
}

impl Business {
    pub fn new(
        name: impl Into<String>,
        business_type: BusinessType,
        owner: impl Into<String>,
        starting_money: f64,
    ) -> Self {
        Self {
            name: name.into(),
            business_type,
            owner: owner.into(),
            money: starting_money,
            resources: BTreeMap::new(),
            contracts: Vec::new(),
            conflicts: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn business_type(&self) -> BusinessType {
        self.business_type
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn money(&self) -> f64 {
        self.money
    }

    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.resources.values()
    }

    pub fn resource(&self, name: &str) -> Option<&Resource> {
        self.resources.get(name)
    }

    /// Units held of `name`, zero when the resource is absent.
    pub fn quantity_of(&self, name: &str) -> u32 {
        self.resources.get(name).map_or(0, |r| r.quantity)
    }

    pub fn contract_ids(&self) -> &[ContractId] {
        &self.contracts
    }

    pub fn conflict_ids(&self) -> &[ConflictId] {
        &self.conflicts
    }

    /// Adds units to inventory. An existing line keeps its quantity and takes
    /// the new unit value.
    ///
    /// # Panics
    ///
    /// Panics if the line would exceed `u32::MAX` units.
    pub fn add_resource(&mut self, name: &str, quantity: u32, unit_value: f64) {
        match self.resources.get_mut(name) {
            Some(resource) => {
                let Some(total) = resource.quantity.checked_add(quantity) else {
                    panic!(
                        "{} cannot hold {} more {} on top of {}",
                        self.name, quantity, name, resource.quantity
                    );
                };
                resource.quantity = total;
                resource.unit_value = unit_value;
            }
            None => {
                self.resources
                    .insert(name.to_string(), Resource::new(name, quantity, unit_value));
            }
        }
        log::debug!(
            "{} added {} {} @ ${:.2}/unit",
            self.name,
            quantity,
            name,
            unit_value
        );
    }

    /// Removes units from inventory. Returns false without touching anything
    /// if the resource is missing or short; drops the line when it hits zero.
    pub fn remove_resource(&mut self, name: &str, quantity: u32) -> bool {
        let Some(resource) = self.resources.get_mut(name) else {
            return false;
        };
        if resource.quantity < quantity {
            return false;
        }

        resource.quantity -= quantity;
        if resource.quantity == 0 {
            self.resources.remove(name);
        }

        log::debug!("{} removed {} {}", self.name, quantity, name);
        true
    }

    /// # Panics
    ///
    /// Panics if `amount` is negative or not finite.
    pub fn add_money(&mut self, amount: f64) {
        assert!(
            amount.is_finite() && amount >= 0.0,
            "add_money called with invalid amount {amount}"
        );
        self.money += amount;
        log::debug!("{} added ${:.2}", self.name, amount);
    }

    /// Refuses (returns false) rather than letting the balance go negative.
    ///
    /// # Panics
    ///
    /// Panics if `amount` is negative or not finite.
    pub fn remove_money(&mut self, amount: f64) -> bool {
        assert!(
            amount.is_finite() && amount >= 0.0,
            "remove_money called with invalid amount {amount}"
        );
        if self.money < amount {
            return false;
        }
        self.money -= amount;
        log::debug!("{} removed ${:.2}", self.name, amount);
        true
    }

    pub(crate) fn record_contract(&mut self, id: ContractId) {
        if !self.contracts.contains(&id) {
            self.contracts.push(id);
        }
    }

    pub(crate) fn record_conflict(&mut self, id: ConflictId) {
        if !self.conflicts.contains(&id) {
            self.conflicts.push(id);
        }
    }
}

impl Account for Business {
    fn name(&self) -> &str {
        Business::name(self)
    }

    fn money(&self) -> f64 {
        Business::money(self)
    }

    fn add_money(&mut self, amount: f64) {
        Business::add_money(self, amount)
    }

    fn remove_money(&mut self, amount: f64) -> bool {
        Business::remove_money(self, amount)
    }
}
