use bevy::prelude::Resource;
use std::collections::{BTreeMap, HashMap};
use std::time::SystemTime;

use crate::business::{Account, Business, BusinessType};
use crate::conflict::{Conflict, ConflictId, ConflictType, Resolution};
use crate::contract::{Contract, ContractId};
use crate::error::{check_amount, EconomyError};
use crate::resources::EconomyConfig;

/// Owns every business, contract and conflict in a session.
///
/// Contracts and conflicts live in arenas here; businesses reference them
/// by id only.
#[derive(Resource, Debug)]
pub struct BusinessManager {
    config: EconomyConfig,
    businesses: BTreeMap<String, Business>,
    contracts: Vec<Contract>,
    contract_index: HashMap<ContractId, usize>,
    conflicts: Vec<Conflict>,
    conflict_index: HashMap<ConflictId, usize>,
}

impl Default for BusinessManager {
    fn default() -> Self {
        Self::new(EconomyConfig::default())
    }
}

impl BusinessManager {
    pub fn new(config: EconomyConfig) -> Self {
        Self {
            config,
            businesses: BTreeMap::new(),
            contracts: Vec::new(),
            contract_index: HashMap::new(),
            conflicts: Vec::new(),
            conflict_index: HashMap::new(),
        }
    }

    pub fn config(&self) -> &EconomyConfig {
        &self.config
    }

    pub fn create_business(
        &mut self,
        name: &str,
        business_type: BusinessType,
        owner: &str,
    ) -> Result<&mut Business, EconomyError> {
        if self.businesses.contains_key(name) {
            return Err(EconomyError::DuplicateBusiness(name.to_string()));
        }

        let business = Business::new(name, business_type, owner, self.config.starting_money);
        log::info!("Created business: {} ({})", name, business_type);

        Ok(self.businesses.entry(name.to_string()).or_insert(business))
    }

    /// Sells `quantity` units of `resource_name` from `seller` to `buyer` for
    /// a total of `price`.
    ///
    /// Every check runs before the buyer is debited, and the debit is the
    /// last step that can fail, so an `Err` leaves both parties untouched.
    pub fn create_contract(
        &mut self,
        seller: &str,
        buyer: &str,
        resource_name: &str,
        quantity: u32,
        price: f64,
    ) -> Result<ContractId, EconomyError> {
        if quantity == 0 {
            return Err(EconomyError::ZeroQuantity);
        }
        check_amount(price)?;
        if !self.businesses.contains_key(buyer) {
            return Err(EconomyError::UnknownBusiness(buyer.to_string()));
        }

        let seller_business = self.lookup(seller)?;
        let Some(held) = seller_business.resource(resource_name) else {
            log::warn!("Contract failed: {} does not have {}", seller, resource_name);
            return Err(EconomyError::ResourceNotHeld {
                business: seller.to_string(),
                resource: resource_name.to_string(),
            });
        };
        if held.quantity < quantity {
            log::warn!("Contract failed: {} has insufficient {}", seller, resource_name);
            return Err(EconomyError::InsufficientResource {
                business: seller.to_string(),
                resource: resource_name.to_string(),
                available: held.quantity,
                requested: quantity,
            });
        }

        // A self-sale puts the units straight back, so only what is left
        // after the seller's removal counts.
        let buyer_held = if seller == buyer {
            held.quantity - quantity
        } else {
            self.lookup(buyer)?.quantity_of(resource_name)
        };
        if buyer_held.checked_add(quantity).is_none() {
            log::error!("Contract failed: {} cannot hold more {}", buyer, resource_name);
            return Err(EconomyError::QuantityOverflow {
                business: buyer.to_string(),
                resource: resource_name.to_string(),
                held: buyer_held,
                requested: quantity,
            });
        }

        let buyer_business = self.lookup_mut(buyer)?;
        if !buyer_business.remove_money(price) {
            log::warn!("Contract failed: {} has insufficient funds", buyer);
            return Err(EconomyError::InsufficientFunds {
                business: buyer.to_string(),
                available: buyer_business.money(),
                requested: price,
            });
        }

        let mut contract = Contract::new(
            seller,
            buyer,
            resource_name,
            quantity,
            price,
            SystemTime::now(),
        );
        let id = contract.id();

        // Both parties exist, the seller holds enough and the buyer has room:
        // nothing below can fail.
        if let Some(seller_business) = self.businesses.get_mut(seller) {
            seller_business.record_contract(id);
            seller_business.remove_resource(resource_name, quantity);
            seller_business.add_money(price);
        }
        if let Some(buyer_business) = self.businesses.get_mut(buyer) {
            buyer_business.record_contract(id);
            buyer_business.add_resource(resource_name, quantity, contract.unit_price());
        }

        contract.mark_fulfilled();
        log::info!("Created contract {}: {}", id, contract);

        self.contract_index.insert(id, self.contracts.len());
        self.contracts.push(contract);
        Ok(id)
    }

    /// Opens a conflict between `parties`. Party count and distinctness are
    /// not enforced; unknown names are.
    pub fn create_conflict(
        &mut self,
        conflict_type: ConflictType,
        description: &str,
        parties: &[&str],
    ) -> Result<ConflictId, EconomyError> {
        for party in parties {
            self.lookup(party)?;
        }

        let mut distinct: Vec<&str> = parties.to_vec();
        distinct.sort_unstable();
        distinct.dedup();
        if distinct.len() < 2 {
            log::warn!(
                "Conflict opened with {} distinct part{}",
                distinct.len(),
                if distinct.len() == 1 { "y" } else { "ies" }
            );
        }

        let conflict = Conflict::new(
            conflict_type,
            description,
            parties.iter().map(|p| p.to_string()).collect(),
            SystemTime::now(),
        );
        let id = conflict.id();

        for party in parties {
            if let Some(business) = self.businesses.get_mut(*party) {
                business.record_conflict(id);
            }
        }

        log::info!("Created conflict: {} between {:?}", conflict_type, parties);
        self.conflict_index.insert(id, self.conflicts.len());
        self.conflicts.push(conflict);
        Ok(id)
    }

    /// Closes a conflict on behalf of `mediator`, paying it the mediation fee
    /// when the resolution is a mediation.
    ///
    /// Rejected, with the conflict left open, when the fee is outside the
    /// configured band. Resolving twice is rejected and changes nothing.
    pub fn resolve_conflict<A: Account + ?Sized>(
        &mut self,
        id: ConflictId,
        resolution: Resolution,
        mediator: &mut A,
    ) -> Result<(), EconomyError> {
        self.settle_conflict(id, resolution, mediator.name())?;
        if let Some(fee) = resolution.fee() {
            mediator.add_money(fee);
        }
        Ok(())
    }

    /// Same as [`resolve_conflict`](Self::resolve_conflict) with a managed
    /// business acting as mediator.
    pub fn resolve_conflict_by(
        &mut self,
        id: ConflictId,
        resolution: Resolution,
        mediator: &str,
    ) -> Result<(), EconomyError> {
        self.lookup(mediator)?;
        self.settle_conflict(id, resolution, mediator)?;
        if let (Some(fee), Some(business)) = (resolution.fee(), self.businesses.get_mut(mediator)) {
            business.add_money(fee);
        }
        Ok(())
    }

    fn settle_conflict(
        &mut self,
        id: ConflictId,
        resolution: Resolution,
        mediator: &str,
    ) -> Result<(), EconomyError> {
        let index = *self
            .conflict_index
            .get(&id)
            .ok_or(EconomyError::UnknownConflict(id))?;

        if self.conflicts[index].is_resolved() {
            log::warn!("Resolution of conflict {} rejected: already resolved", id);
            return Err(EconomyError::AlreadyResolved(id));
        }

        if let Some(fee) = resolution.fee() {
            check_amount(fee)?;
            if let Err(err) = self.config.check_mediation_fee(fee) {
                log::warn!("Resolution of conflict {} rejected: {}", id, err);
                return Err(err);
            }
        }

        let conflict = &mut self.conflicts[index];
        if let Err(err) = conflict.resolve(resolution, mediator, SystemTime::now()) {
            log::warn!("Resolution of conflict {} rejected: {}", id, err);
            return Err(err);
        }
        Ok(())
    }

    /// Per-frame hook. Every contract settles the moment it is created and
    /// conflicts have no expiry or escalation, so this only walks the open
    /// items.
    pub fn update(&mut self, delta_time: f32) {
        let pending_contracts = self.contracts.iter().filter(|c| !c.is_fulfilled()).count();
        let open_conflicts = self.open_conflicts().count();
        log::trace!(
            "Economy update (dt={:.3}): {} pending contracts, {} open conflicts",
            delta_time,
            pending_contracts,
            open_conflicts
        );
    }

    pub fn businesses(&self) -> impl Iterator<Item = &Business> {
        self.businesses.values()
    }

    pub fn business(&self, name: &str) -> Option<&Business> {
        self.businesses.get(name)
    }

    /// Direct access for inventory and cash commands on one business.
    pub fn business_mut(&mut self, name: &str) -> Option<&mut Business> {
        self.businesses.get_mut(name)
    }

    pub fn contracts(&self) -> &[Contract] {
        &self.contracts
    }

    pub fn contract(&self, id: ContractId) -> Option<&Contract> {
        self.contract_index.get(&id).map(|&i| &self.contracts[i])
    }

    pub fn contracts_of<'a>(&'a self, business: &str) -> impl Iterator<Item = &'a Contract> + 'a {
        self.businesses
            .get(business)
            .map(|b| b.contract_ids())
            .unwrap_or_default()
            .iter()
            .filter_map(|id| self.contract(*id))
    }

    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }

    pub fn conflict(&self, id: ConflictId) -> Option<&Conflict> {
        self.conflict_index.get(&id).map(|&i| &self.conflicts[i])
    }

    pub fn conflicts_of<'a>(&'a self, business: &str) -> impl Iterator<Item = &'a Conflict> + 'a {
        self.businesses
            .get(business)
            .map(|b| b.conflict_ids())
            .unwrap_or_default()
            .iter()
            .filter_map(|id| self.conflict(*id))
    }

    pub fn open_conflicts(&self) -> impl Iterator<Item = &Conflict> {
        self.conflicts.iter().filter(|c| !c.is_resolved())
    }

    fn lookup(&self, name: &str) -> Result<&Business, EconomyError> {
        self.businesses
            .get(name)
            .ok_or_else(|| EconomyError::UnknownBusiness(name.to_string()))
    }

    fn lookup_mut(&mut self, name: &str) -> Result<&mut Business, EconomyError> {
        self.businesses
            .get_mut(name)
            .ok_or_else(|| EconomyError::UnknownBusiness(name.to_string()))
    }
}
