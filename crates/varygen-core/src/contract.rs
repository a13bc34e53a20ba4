use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::SystemTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContractId(pub Uuid);

impl ContractId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ContractId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Record of a completed sale of a resource between two businesses.
///
/// `price` is the total paid, not a per-unit figure. Only the manager can
/// build or mutate a contract; everyone else gets shared references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    id: ContractId,
    seller: String,
    buyer: String,
    resource_name: String,
    quantity: u32,
    price: f64,
    is_fulfilled: bool,
    created_at: SystemTime,
}

impl Contract {
    pub(crate) fn new(
        seller: &str,
        buyer: &str,
        resource_name: &str,
        quantity: u32,
        price: f64,
        created_at: SystemTime,
    ) -> Self {
        Self {
            id: ContractId::new(),
            seller: seller.to_string(),
            buyer: buyer.to_string(),
            resource_name: resource_name.to_string(),
            quantity,
            price,
            is_fulfilled: false,
            created_at,
        }
    }

    pub fn id(&self) -> ContractId {
        self.id
    }

    pub fn seller(&self) -> &str {
        &self.seller
    }

    pub fn buyer(&self) -> &str {
        &self.buyer
    }

    pub fn resource_name(&self) -> &str {
        &self.resource_name
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    /// Acquisition cost per unit as recorded on the buyer's side.
    pub fn unit_price(&self) -> f64 {
        self.price / self.quantity as f64
    }

    pub fn is_fulfilled(&self) -> bool {
        self.is_fulfilled
    }

    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }

    pub fn involves(&self, business: &str) -> bool {
        self.seller == business || self.buyer == business
    }

    pub(crate) fn mark_fulfilled(&mut self) {
        self.is_fulfilled = true;
    }
}

impl fmt::Display for Contract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} sells {} {} to {} for ${:.2}",
            self.seller, self.quantity, self.resource_name, self.buyer, self.price
        )
    }
}
