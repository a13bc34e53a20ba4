use thiserror::Error;

use crate::conflict::ConflictId;

/// Errors raised by manager operations.
///
/// Any `Err` returned from a manager operation means no state was mutated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EconomyError {
    #[error("{business} does not hold any {resource}")]
    ResourceNotHeld { business: String, resource: String },

    #[error("{business} holds {available} {resource}, {requested} requested")]
    InsufficientResource {
        business: String,
        resource: String,
        available: u32,
        requested: u32,
    },

    #[error("{business} has ${available:.2}, ${requested:.2} required")]
    InsufficientFunds {
        business: String,
        available: f64,
        requested: f64,
    },

    #[error("mediation fee ${fee:.2} outside ${min:.2}..=${max:.2}")]
    MediationFeeOutOfRange { fee: f64, min: f64, max: f64 },

    #[error("conflict {0} is already resolved")]
    AlreadyResolved(ConflictId),

    #[error("unknown business: {0}")]
    UnknownBusiness(String),

    #[error("business already exists: {0}")]
    DuplicateBusiness(String),

    #[error("unknown conflict: {0}")]
    UnknownConflict(ConflictId),

    #[error("contract quantity must be positive")]
    ZeroQuantity,

    #[error("{business} cannot hold {requested} more {resource} on top of {held}")]
    QuantityOverflow {
        business: String,
        resource: String,
        held: u32,
        requested: u32,
    },

    #[error("invalid money amount: {0}")]
    InvalidAmount(f64),

    #[error("invalid economy config: {0}")]
    InvalidConfig(String),
}

impl EconomyError {
    /// True for precondition violations, i.e. bugs in the caller rather than
    /// an economic outcome the player should be told about.
    pub fn is_defect(&self) -> bool {
        matches!(
            self,
            EconomyError::UnknownBusiness(_)
                | EconomyError::DuplicateBusiness(_)
                | EconomyError::UnknownConflict(_)
                | EconomyError::ZeroQuantity
                | EconomyError::QuantityOverflow { .. }
                | EconomyError::InvalidAmount(_)
                | EconomyError::InvalidConfig(_)
        )
    }
}

/// Rejects negative, NaN and infinite money amounts.
pub(crate) fn check_amount(amount: f64) -> Result<(), EconomyError> {
    if amount.is_finite() && amount >= 0.0 {
        Ok(())
    } else {
        Err(EconomyError::InvalidAmount(amount))
    }
}
