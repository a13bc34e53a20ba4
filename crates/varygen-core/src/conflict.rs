use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::SystemTime;
use uuid::Uuid;

use crate::error::EconomyError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConflictId(pub Uuid);

impl ConflictId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConflictId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConflictId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConflictType {
    BusinessDispute,
    ContractViolation,
    ResourceCompetition,
    TerritoryDispute,
}

impl fmt::Display for ConflictType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConflictType::BusinessDispute => "Business Dispute",
            ConflictType::ContractViolation => "Contract Violation",
            ConflictType::ResourceCompetition => "Resource Competition",
            ConflictType::TerritoryDispute => "Territory Dispute",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResolutionMethod {
    Mediation,
    Arbitration,
    Negotiation,
}

impl fmt::Display for ResolutionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ResolutionMethod::Mediation => "Mediation",
            ResolutionMethod::Arbitration => "Arbitration",
            ResolutionMethod::Negotiation => "Negotiation",
        };
        f.write_str(label)
    }
}

/// How a conflict is being closed. Only mediation carries a fee.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Resolution {
    Mediation { fee: f64 },
    Arbitration,
    Negotiation,
}

impl Resolution {
    pub fn method(&self) -> ResolutionMethod {
        match self {
            Resolution::Mediation { .. } => ResolutionMethod::Mediation,
            Resolution::Arbitration => ResolutionMethod::Arbitration,
            Resolution::Negotiation => ResolutionMethod::Negotiation,
        }
    }

    pub fn fee(&self) -> Option<f64> {
        match self {
            Resolution::Mediation { fee } => Some(*fee),
            _ => None,
        }
    }
}

/// A dispute between businesses.
///
/// Starts open and moves to resolved exactly once; `resolved_at` is set
/// if and only if the conflict is resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    id: ConflictId,
    conflict_type: ConflictType,
    description: String,
    parties: Vec<String>,
    resolution_method: Option<ResolutionMethod>,
    mediator: Option<String>,
    mediation_fee: Option<f64>,
    is_resolved: bool,
    created_at: SystemTime,
    resolved_at: Option<SystemTime>,
}

impl Conflict {
    pub(crate) fn new(
        conflict_type: ConflictType,
        description: &str,
        parties: Vec<String>,
        created_at: SystemTime,
    ) -> Self {
        Self {
            id: ConflictId::new(),
            conflict_type,
            description: description.to_string(),
            parties,
            resolution_method: None,
            mediator: None,
            mediation_fee: None,
            is_resolved: false,
            created_at,
            resolved_at: None,
        }
    }

    pub fn id(&self) -> ConflictId {
        self.id
    }

    pub fn conflict_type(&self) -> ConflictType {
        self.conflict_type
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn parties(&self) -> &[String] {
        &self.parties
    }

    pub fn resolution_method(&self) -> Option<ResolutionMethod> {
        self.resolution_method
    }

    pub fn mediator(&self) -> Option<&str> {
        self.mediator.as_deref()
    }

    pub fn mediation_fee(&self) -> Option<f64> {
        self.mediation_fee
    }

    pub fn is_resolved(&self) -> bool {
        self.is_resolved
    }

    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }

    pub fn resolved_at(&self) -> Option<SystemTime> {
        self.resolved_at
    }

    pub fn involves(&self, business: &str) -> bool {
        self.parties.iter().any(|p| p == business)
    }

    /// Closes the conflict. A resolved conflict stays as it is and the call
    /// is rejected. Fee bounds are checked by the manager, not here.
    pub(crate) fn resolve(
        &mut self,
        resolution: Resolution,
        mediator: &str,
        at: SystemTime,
    ) -> Result<(), EconomyError> {
        if self.is_resolved {
            return Err(EconomyError::AlreadyResolved(self.id));
        }

        self.resolution_method = Some(resolution.method());
        self.mediator = Some(mediator.to_string());
        self.mediation_fee = resolution.fee();
        self.is_resolved = true;
        self.resolved_at = Some(at);

        log::info!("Conflict {} resolved via {}", self.id, resolution.method());
        Ok(())
    }
}
